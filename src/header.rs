//! The fixed preamble in front of the entry stream.

use indexmap::IndexMap;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::{
    serde_helpers::{hex_bytes, unhex_bytes},
    stream::{Reader, Writer},
    text::Encoding,
    VfbError,
};

const FILETYPE: &str = "WLF10";
const APP_VERSION_KEY: u8 = 2;

/// Application information written by FontLab 4 and later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    /// Key/value pairs in file order. Key 1 is the platform, key 2 the
    /// application version and key 3 the owner.
    pub fields: IndexMap<u8, i32>,
    pub end0: u8,
    pub end1: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub header0: u8,
    pub filetype: String,
    pub header1: u16,
    #[serde(serialize_with = "hex_bytes", deserialize_with = "unhex_bytes")]
    pub chunk1: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<Creator>,
    pub end2: u16,
}

impl Default for Header {
    fn default() -> Self {
        let mut chunk1 = vec![0; 34];
        chunk1.extend([1, 0, 0, 0, 4, 0, 0, 0, 10, 0]);
        let mut fields = IndexMap::new();
        fields.insert(1, 0);
        fields.insert(APP_VERSION_KEY, 0x0500_0001);
        fields.insert(3, 0);
        Header {
            header0: 26,
            filetype: FILETYPE.to_string(),
            header1: 3,
            chunk1,
            creator: Some(Creator {
                fields,
                end0: 6,
                end1: 1,
            }),
            end2: 0,
        }
    }
}

impl Header {
    fn has_creator_block(chunk1: &[u8]) -> bool {
        chunk1.ends_with(&[10, 0])
    }

    pub fn decode(reader: &mut Reader) -> Result<Self, VfbError> {
        let header0 = reader.read_u8()?;
        let filetype = reader.read_str(5, Encoding::Windows1252)?;
        if filetype != FILETYPE {
            return Err(VfbError::BadHeader(format!(
                "file type is {:?}, not {:?}",
                filetype, FILETYPE
            )));
        }
        if header0 != 26 {
            warn!("Unexpected first header byte {}", header0);
        }
        let header1 = reader.read_u16()?;
        let size = reader.read_u16()? as usize;
        let chunk1 = reader.read_bytes(size)?.to_vec();

        let creator = if Self::has_creator_block(&chunk1) {
            let size = reader.read_u16()? as usize;
            let mut block = Reader::new(reader.read_bytes(size)?);
            let mut fields = IndexMap::new();
            loop {
                let key = block.read_u8()?;
                if key == 0 {
                    break;
                }
                fields.insert(key, block.value()?);
            }
            Some(Creator {
                fields,
                end0: reader.read_u8()?,
                end1: reader.read_u8()?,
            })
        } else {
            None
        };

        Ok(Header {
            header0,
            filetype,
            header1,
            chunk1,
            creator,
            end2: reader.read_u16()?,
        })
    }

    pub fn encode(&self) -> Result<Vec<u8>, VfbError> {
        let mut w = Writer::new();
        w.write_u8(self.header0);
        w.write_str(&self.filetype, Encoding::Windows1252, 5)?;
        w.write_u16(self.header1);
        let size = u16::try_from(self.chunk1.len())
            .map_err(|_| VfbError::BadHeader("first chunk is too long".to_string()))?;
        w.write_u16(size);
        w.write_bytes(&self.chunk1);

        match (&self.creator, Self::has_creator_block(&self.chunk1)) {
            (Some(creator), true) => {
                let mut block = Writer::new();
                for (key, value) in &creator.fields {
                    block.write_u8(*key);
                    if *key == APP_VERSION_KEY {
                        block.value_long(*value);
                    } else {
                        block.value(*value);
                    }
                }
                block.write_u8(0);
                let size = u16::try_from(block.len())
                    .map_err(|_| VfbError::BadHeader("creator block is too long".to_string()))?;
                w.write_u16(size);
                w.write_bytes(&block.into_inner());
                w.write_u8(creator.end0);
                w.write_u8(creator.end1);
            }
            (None, false) => {}
            (Some(_), false) => {
                return Err(VfbError::BadHeader(
                    "creator block present, but the first chunk does not announce it".to_string(),
                ))
            }
            (None, true) => {
                return Err(VfbError::BadHeader(
                    "the first chunk announces a creator block, but there is none".to_string(),
                ))
            }
        }
        w.write_u16(self.end2);
        Ok(w.into_inner())
    }

    /// The version of the application that wrote the file, most significant
    /// byte first, e.g. `[5, 0, 0, 1]`.
    pub fn app_version(&self) -> Option<[u8; 4]> {
        self.creator
            .as_ref()
            .and_then(|c| c.fields.get(&APP_VERSION_KEY))
            .map(|v| v.to_be_bytes())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::serde_helpers::from_hex;
    use pretty_assertions::assert_eq;

    fn header_hex(creator: &str) -> String {
        format!(
            "1a574c46313003002c{}{}000000040000000a000b00{}06010000",
            "000000000000000000".repeat(3),
            "000000000000000001",
            creator
        )
    }

    #[test]
    fn test_header_504() {
        let data = from_hex(&header_hex("018b02ff05000001038b00")).unwrap();
        assert_eq!(data.len(), 71);
        let mut reader = Reader::new(&data);
        let header = Header::decode(&mut reader).unwrap();
        assert!(reader.is_empty());
        assert_eq!(header.header0, 26);
        assert_eq!(header.filetype, "WLF10");
        assert_eq!(header.header1, 3);
        assert_eq!(header.chunk1.len(), 44);
        assert_eq!(header.app_version(), Some([5, 0, 0, 1]));
        let creator = header.creator.as_ref().unwrap();
        assert_eq!(creator.fields.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!((creator.end0, creator.end1), (6, 1));
        assert_eq!(header.end2, 0);
        assert_eq!(header.encode().unwrap(), data);
    }

    #[test]
    fn test_header_522() {
        let data = from_hex(&header_hex("018c02ff05020280038b00")).unwrap();
        let header = Header::decode(&mut Reader::new(&data)).unwrap();
        assert_eq!(header.app_version(), Some([5, 2, 2, 128]));
        assert_eq!(header.creator.as_ref().unwrap().fields[&1], 1);
        assert_eq!(header.encode().unwrap(), data);
    }

    #[test]
    fn test_default_header_matches_fontlab_5() {
        let data = from_hex(&header_hex("018b02ff05000001038b00")).unwrap();
        assert_eq!(Header::default().encode().unwrap(), data);
    }

    #[test]
    fn test_header_without_creator() {
        let data = from_hex("1a574c4631300300020001000000").unwrap();
        let mut reader = Reader::new(&data);
        let header = Header::decode(&mut reader).unwrap();
        assert!(reader.is_empty());
        assert!(header.creator.is_none());
        assert_eq!(header.app_version(), None);
        assert_eq!(header.encode().unwrap(), data);
    }

    #[test]
    fn test_not_a_vfb() {
        let data = b"\x1aPK\x03\x04\x00\x00\x00\x00\x00".to_vec();
        assert!(matches!(
            Header::decode(&mut Reader::new(&data)),
            Err(VfbError::BadHeader(_))
        ));
    }
}
