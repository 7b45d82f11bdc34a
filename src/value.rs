//! The variable-width integer encoding shared by nearly every numeric field.
//!
//! It is the Type 1 charstring number encoding: one byte for -107..=107, two
//! bytes for ±108..=±1131 and a five byte long form (0xFF followed by a
//! big-endian 32-bit integer) for everything else.

use crate::{stream::Reader, VfbError};

const LONG: u8 = 0xFF;

fn read_prefix(reader: &mut Reader) -> Result<Option<i32>, VfbError> {
    let offset = reader.position();
    if reader.is_empty() {
        return Err(VfbError::EndOfData);
    }
    let v = reader.read_u8()?;
    match v {
        0 => Err(VfbError::EndOfData),
        0x01..=0x1F => Err(VfbError::InvalidEncoding { byte: v, offset }),
        0x20..=0xF6 => Ok(Some(v as i32 - 0x8B)),
        0xF7..=0xFA => {
            let v2 = reader.read_u8()? as i32;
            Ok(Some(0x100 * v as i32 - 0xF694 + v2))
        }
        0xFB..=0xFE => {
            let v2 = reader.read_u8()? as i32;
            Ok(Some(-0x100 * v as i32 + 0xFA94 - v2))
        }
        LONG => Ok(None),
    }
}

/// Decode a signed value.
pub fn decode(reader: &mut Reader) -> Result<i32, VfbError> {
    match read_prefix(reader)? {
        Some(value) => Ok(value),
        None => Ok(i32::from_be_bytes(reader.read_array()?)),
    }
}

/// Decode a value whose long form is an unsigned 32-bit integer.
pub fn decode_unsigned(reader: &mut Reader) -> Result<u32, VfbError> {
    let offset = reader.position();
    match read_prefix(reader)? {
        Some(value) => u32::try_from(value).map_err(|_| {
            VfbError::invalid(
                "unsigned value",
                format!("{} at offset {}", value, offset),
            )
        }),
        None => Ok(u32::from_be_bytes(reader.read_array()?)),
    }
}

/// Append the shortest encoding of a signed value.
pub fn encode(value: i32, out: &mut Vec<u8>) {
    match value {
        -107..=107 => out.push((value + 0x8B) as u8),
        108..=1131 => out.extend(((value + 0xF694) as u16).to_be_bytes()),
        -1131..=-108 => out.extend(((-value + 0xFA94) as u16).to_be_bytes()),
        _ => encode_long(value, out),
    }
}

/// Append the shortest encoding of an unsigned value.
pub fn encode_unsigned(value: u32, out: &mut Vec<u8>) {
    if value <= 1131 {
        encode(value as i32, out)
    } else {
        encode_long_unsigned(value, out)
    }
}

/// Append the five byte form of a signed value, regardless of its magnitude.
pub fn encode_long(value: i32, out: &mut Vec<u8>) {
    out.push(LONG);
    out.extend(value.to_be_bytes());
}

/// Append the five byte form of an unsigned value.
pub fn encode_long_unsigned(value: u32, out: &mut Vec<u8>) {
    out.push(LONG);
    out.extend(value.to_be_bytes());
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn hex(s: &str) -> Vec<u8> {
        crate::serde_helpers::from_hex(s).unwrap()
    }

    #[rstest]
    #[case("20", -107)]
    #[case("8b", 0)]
    #[case("f6", 107)]
    #[case("f700", 108)]
    #[case("f7ff", 363)]
    #[case("f800", 364)]
    #[case("fa00", 876)]
    #[case("faff", 1131)]
    #[case("fb00", -108)]
    #[case("feff", -1131)]
    #[case("ff00001000", 4096)]
    #[case("ffffffffff", -1)]
    #[case("ffffffefff", -4097)]
    fn test_decode_vectors(#[case] encoded: &str, #[case] expected: i32) {
        let data = hex(encoded);
        let mut reader = Reader::new(&data);
        assert_eq!(decode(&mut reader).unwrap(), expected);
        assert!(reader.is_empty());
    }

    #[rstest]
    #[case(107, 1)]
    #[case(108, 2)]
    #[case(1131, 2)]
    #[case(1132, 5)]
    #[case(-107, 1)]
    #[case(-108, 2)]
    #[case(-1131, 2)]
    #[case(-1132, 5)]
    fn test_tier_boundaries(#[case] value: i32, #[case] length: usize) {
        let mut out = vec![];
        encode(value, &mut out);
        assert_eq!(out.len(), length);
    }

    #[test]
    fn test_roundtrip_short_range() {
        for value in -1131..=1131 {
            let mut out = vec![];
            encode(value, &mut out);
            let mut reader = Reader::new(&out);
            assert_eq!(decode(&mut reader).unwrap(), value);
            assert!(reader.is_empty());
        }
    }

    #[rstest]
    #[case(i32::MAX)]
    #[case(i32::MIN)]
    #[case(1132)]
    #[case(-1132)]
    #[case(65536)]
    #[case(-1_000_000)]
    fn test_roundtrip_long(#[case] value: i32) {
        let mut out = vec![];
        encode(value, &mut out);
        assert_eq!(out.len(), 5);
        assert_eq!(decode(&mut Reader::new(&out)).unwrap(), value);
    }

    #[test]
    fn test_unsigned_long_form() {
        let mut out = vec![];
        encode_unsigned(u32::MAX, &mut out);
        assert_eq!(out, hex("ffffffffff"));
        assert_eq!(decode_unsigned(&mut Reader::new(&out)).unwrap(), u32::MAX);
        // The same bytes read as signed
        assert_eq!(decode(&mut Reader::new(&out)).unwrap(), -1);
    }

    #[test]
    fn test_forced_long_form() {
        let mut out = vec![];
        encode_long(0, &mut out);
        assert_eq!(out, hex("ff00000000"));
        assert_eq!(decode(&mut Reader::new(&out)).unwrap(), 0);
    }

    #[test]
    fn test_zero_byte_ends_data() {
        assert!(matches!(
            decode(&mut Reader::new(&[0])),
            Err(VfbError::EndOfData)
        ));
        assert!(matches!(
            decode(&mut Reader::new(&[])),
            Err(VfbError::EndOfData)
        ));
    }

    #[test]
    fn test_reserved_bytes_are_invalid() {
        for byte in 0x01..0x20u8 {
            assert!(matches!(
                decode(&mut Reader::new(&[byte])),
                Err(VfbError::InvalidEncoding { byte: b, offset: 0 }) if b == byte
            ));
        }
    }

    #[test]
    fn test_truncated_long_form() {
        assert!(matches!(
            decode(&mut Reader::new(&hex("ff0000"))),
            Err(VfbError::Truncated { offset: 1, wanted: 4 })
        ));
    }

    #[test]
    fn test_negative_short_form_is_not_unsigned() {
        assert!(decode_unsigned(&mut Reader::new(&hex("8a"))).is_err());
    }
}
