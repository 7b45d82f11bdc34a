//! Visual TrueType hinting commands stored with a glyph.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::{
    stream::{Reader, Writer},
    VfbError,
};

macro_rules! tt_commands {
    ($($opcode:literal => $name:ident { $($param:ident),* }),* $(,)?) => {
        /// One hinting command with its named parameters.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(tag = "cmd", content = "params")]
        pub enum TtCommand {
            $($name { $($param: i32),* },)*
        }

        impl TtCommand {
            pub fn opcode(&self) -> u8 {
                match self {
                    $(TtCommand::$name { .. } => $opcode,)*
                }
            }

            pub fn name(&self) -> &'static str {
                match self {
                    $(TtCommand::$name { .. } => stringify!($name),)*
                }
            }

            fn decode(reader: &mut Reader) -> Result<Self, VfbError> {
                let opcode = reader.read_u8()?;
                match opcode {
                    $($opcode => Ok(TtCommand::$name { $($param: reader.value()?),* }),)*
                    _ => Err(VfbError::invalid(
                        "TrueType hinting command",
                        format!("0x{:02x}", opcode),
                    )),
                }
            }

            fn encode(&self, w: &mut Writer) {
                w.write_u8(self.opcode());
                match self {
                    $(TtCommand::$name { $($param),* } => {
                        $(w.value(*$param);)*
                    })*
                }
            }
        }
    };
}

tt_commands! {
    0x01 => AlignTop { pt, zone },
    0x02 => AlignBottom { pt, zone },
    0x03 => SingleLinkH { pt1, pt2, stem, align },
    0x04 => SingleLinkV { pt1, pt2, stem, align },
    0x05 => DoubleLinkH { pt1, pt2, stem },
    0x06 => DoubleLinkV { pt1, pt2, stem },
    0x07 => AlignH { pt, align },
    0x08 => AlignV { pt, align },
    0x0D => InterpolateH { pti, pt1, pt2, align },
    0x0E => InterpolateV { pti, pt1, pt2, align },
    0x14 => MiddleDeltaH { pt, shift, ppm1, ppm2 },
    0x15 => MiddleDeltaV { pt, shift, ppm1, ppm2 },
    0x16 => FinalDeltaH { pt, shift, ppm1, ppm2 },
    0x17 => FinalDeltaV { pt, shift, ppm1, ppm2 },
}

/// The command list of a glyph. The three values after the commands have no
/// known meaning and are kept as they were read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instructions {
    pub commands: Vec<TtCommand>,
    #[serde(default)]
    pub trailer: [i32; 3],
}

impl Instructions {
    pub fn new(commands: Vec<TtCommand>) -> Self {
        Instructions {
            commands,
            trailer: [0; 3],
        }
    }

    pub(crate) fn decode(reader: &mut Reader) -> Result<Self, VfbError> {
        let num_bytes = reader.count()?;
        let start = reader.position();
        let num_commands = reader.count()?;
        let mut commands = vec![];
        for _ in 0..num_commands {
            commands.push(TtCommand::decode(reader)?);
        }
        let trailer = [reader.value()?, reader.value()?, reader.value()?];
        let consumed = reader.position() - start;
        if consumed != num_bytes {
            warn!(
                "TrueType instructions declare {} bytes but used {}",
                num_bytes, consumed
            );
        }
        Ok(Instructions { commands, trailer })
    }

    pub(crate) fn encode(&self, w: &mut Writer) -> Result<(), VfbError> {
        let mut body = Writer::new();
        body.count(self.commands.len())?;
        for command in &self.commands {
            command.encode(&mut body);
        }
        for value in self.trailer {
            body.value(value);
        }
        w.count(body.len())?;
        w.write_bytes(&body.into_inner());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::serde_helpers::from_hex;
    use pretty_assertions::assert_eq;

    const O_INSTRUCTIONS: &str = "B1 93
        07 91 8B
        03 91 97 89 8A
        03 97 8B 8B 8A
        03 91 9D 8B 8A
        01 94 93
        02 8E 8C
        04 94 9A 8B 8A
        04 8E A0 8B 8A
        8B 8B 8B";

    #[test]
    fn test_instructions() {
        let data = from_hex(O_INSTRUCTIONS).unwrap();
        let mut reader = Reader::new(&data);
        let instructions = Instructions::decode(&mut reader).unwrap();
        assert!(reader.is_empty());
        assert_eq!(
            instructions.commands,
            vec![
                TtCommand::AlignH { pt: 6, align: 0 },
                TtCommand::SingleLinkH { pt1: 6, pt2: 12, stem: -2, align: -1 },
                TtCommand::SingleLinkH { pt1: 12, pt2: 0, stem: 0, align: -1 },
                TtCommand::SingleLinkH { pt1: 6, pt2: 18, stem: 0, align: -1 },
                TtCommand::AlignTop { pt: 9, zone: 8 },
                TtCommand::AlignBottom { pt: 3, zone: 1 },
                TtCommand::SingleLinkV { pt1: 9, pt2: 15, stem: 0, align: -1 },
                TtCommand::SingleLinkV { pt1: 3, pt2: 21, stem: 0, align: -1 },
            ]
        );
        assert_eq!(instructions.trailer, [0, 0, 0]);

        let mut w = Writer::new();
        instructions.encode(&mut w).unwrap();
        assert_eq!(w.into_inner(), data);
    }

    #[test]
    fn test_deltas() {
        let instructions = Instructions::new(vec![
            TtCommand::FinalDeltaV { pt: 4, shift: -8, ppm1: 12, ppm2: 12 },
            TtCommand::MiddleDeltaH { pt: 200, shift: 1, ppm1: 9, ppm2: 20 },
        ]);
        let mut w = Writer::new();
        instructions.encode(&mut w).unwrap();
        let bytes = w.into_inner();
        assert_eq!(bytes[2], 0x17);
        assert_eq!(Instructions::decode(&mut Reader::new(&bytes)).unwrap(), instructions);
    }

    #[test]
    fn test_json_shape() {
        let command = TtCommand::AlignTop { pt: 15, zone: 3 };
        assert_eq!(
            serde_json::to_string(&command).unwrap(),
            r#"{"cmd":"AlignTop","params":{"pt":15,"zone":3}}"#
        );
        assert_eq!(command.name(), "AlignTop");
    }

    #[test]
    fn test_unknown_opcode() {
        assert!(Instructions::decode(&mut Reader::new(&from_hex("8f 8c 09 8b").unwrap())).is_err());
    }
}
