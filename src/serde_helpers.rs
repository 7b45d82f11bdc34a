use serde::Deserialize as _;

use crate::VfbError;

pub(crate) fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Parse a hex dump; whitespace between digits is ignored.
pub(crate) fn from_hex(s: &str) -> Result<Vec<u8>, VfbError> {
    let digits: Vec<u8> = s.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    if digits.len() % 2 != 0 {
        return Err(VfbError::invalid("hex string", "odd number of digits"));
    }
    digits
        .chunks(2)
        .map(|pair| {
            std::str::from_utf8(pair)
                .ok()
                .and_then(|p| u8::from_str_radix(p, 16).ok())
                .ok_or_else(|| VfbError::invalid("hex string", format!("{:?}", pair)))
        })
        .collect()
}

pub(crate) fn hex_bytes<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&to_hex(bytes))
}

pub(crate) fn unhex_bytes<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    from_hex(&s).map_err(serde::de::Error::custom)
}

pub(crate) fn is_zero(v: &u8) -> bool {
    *v == 0
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_hex() {
        assert_eq!(from_hex("01 09 07 01").unwrap(), vec![1, 9, 7, 1]);
        assert_eq!(to_hex(&[0xde, 0xad]), "dead");
        assert!(from_hex("abc").is_err());
        assert!(from_hex("zz").is_err());
    }
}
