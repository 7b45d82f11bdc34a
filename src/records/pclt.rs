use serde::{Deserialize, Serialize};

use crate::{
    stream::{Reader, Writer},
    text::Encoding,
    VfbError,
};

/// The fields of the OpenType `PCLT` table as FontLab stores them.
///
/// `typeface` and `file_name` keep their padding, including NUL bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pclt {
    pub font_number: u32,
    pub pitch: i32,
    pub x_height: i32,
    pub style: i32,
    pub type_family: i32,
    pub cap_height: i32,
    pub symbol_set: i32,
    pub typeface: String,
    pub character_complement: [u8; 8],
    pub file_name: String,
    pub stroke_weight: i8,
    pub width_type: i8,
    pub serif_style: u8,
}

const TYPEFACE_LEN: usize = 16;
const FILE_NAME_LEN: usize = 6;

impl Pclt {
    pub(crate) fn decode(r: &mut Reader) -> Result<Self, VfbError> {
        Ok(Pclt {
            font_number: r.value_unsigned()?,
            pitch: r.value()?,
            x_height: r.value()?,
            style: r.value()?,
            type_family: r.value()?,
            cap_height: r.value()?,
            symbol_set: r.value()?,
            typeface: r.read_str(TYPEFACE_LEN, Encoding::Windows1252)?,
            character_complement: r.read_array()?,
            file_name: r.read_str(FILE_NAME_LEN, Encoding::Windows1252)?,
            stroke_weight: r.read_i8()?,
            width_type: r.read_i8()?,
            serif_style: r.read_u8()?,
        })
    }

    pub(crate) fn encode(&self, w: &mut Writer) -> Result<(), VfbError> {
        w.value_unsigned(self.font_number);
        for v in [
            self.pitch,
            self.x_height,
            self.style,
            self.type_family,
            self.cap_height,
            self.symbol_set,
        ] {
            w.value(v);
        }
        for (what, s, len) in [
            ("PCLT typeface", &self.typeface, TYPEFACE_LEN),
            ("PCLT file name", &self.file_name, FILE_NAME_LEN),
        ] {
            if Encoding::Windows1252.encode(s)?.len() > len {
                return Err(VfbError::invalid(what, format!("{:?} is longer than {} bytes", s, len)));
            }
        }
        w.write_str(&self.typeface, Encoding::Windows1252, TYPEFACE_LEN)?;
        w.write_bytes(&self.character_complement);
        w.write_str(&self.file_name, Encoding::Windows1252, FILE_NAME_LEN)?;
        w.write_i8(self.stroke_weight);
        w.write_i8(self.width_type);
        w.write_u8(self.serif_style);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::serde_helpers::from_hex;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_pclt() {
        let data = from_hex(
            "ffcd000003c2f88ad4ff00004002f952a4
             534d4820202020202020202020202020
             1a34567809123400
             544e5252300002fe82",
        )
        .unwrap();
        let mut reader = Reader::new(&data);
        let pclt = Pclt::decode(&mut reader).unwrap();
        assert!(reader.is_empty());
        assert_eq!(
            pclt,
            Pclt {
                font_number: 3439329283,
                pitch: 55,
                x_height: 502,
                style: 73,
                type_family: 16386,
                cap_height: 702,
                symbol_set: 25,
                typeface: "SMH             ".to_string(),
                character_complement: [0x1a, 0x34, 0x56, 0x78, 0x09, 0x12, 0x34, 0x00],
                file_name: "TNRR0\0".to_string(),
                stroke_weight: 2,
                width_type: -2,
                serif_style: 130,
            }
        );
        let mut w = Writer::new();
        pclt.encode(&mut w).unwrap();
        assert_eq!(w.into_inner(), data);
    }

    #[test]
    fn test_empty_pclt() {
        let mut data = vec![0x8b; 7];
        data.extend([0; 33]);
        let pclt = Pclt::decode(&mut Reader::new(&data)).unwrap();
        assert_eq!(pclt.typeface, "\0".repeat(16));
        let mut w = Writer::new();
        pclt.encode(&mut w).unwrap();
        assert_eq!(w.into_inner(), data);
    }
}
