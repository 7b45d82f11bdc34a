use serde::{Deserialize, Serialize};

use crate::{
    stream::{Reader, Writer},
    VfbError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hint {
    pub pos: i32,
    pub width: i32,
}

/// One hint replacement event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HintMask {
    H(i32),
    V(i32),
    /// Replacement point; usually a node index.
    R(i32),
}

impl HintMask {
    fn decode(reader: &mut Reader) -> Result<Self, VfbError> {
        let kind = reader.read_u8()?;
        let value = reader.value()?;
        match kind {
            0x01 => Ok(HintMask::H(value)),
            0x02 => Ok(HintMask::V(value)),
            0xFF => Ok(HintMask::R(value)),
            _ => Err(VfbError::invalid("hint mask kind", format!("0x{:02x}", kind))),
        }
    }

    fn encode(&self, w: &mut Writer) {
        let (kind, value) = match self {
            HintMask::H(v) => (0x01, v),
            HintMask::V(v) => (0x02, v),
            HintMask::R(v) => (0xFF, v),
        };
        w.write_u8(kind);
        w.value(*value);
    }
}

/// PostScript stem hints. Each hint holds one (position, width) pair per
/// master.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hints {
    pub h: Vec<Vec<Hint>>,
    pub v: Vec<Vec<Hint>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hintmasks: Vec<HintMask>,
}

impl Hints {
    pub fn is_empty(&self) -> bool {
        self.h.is_empty() && self.v.is_empty() && self.hintmasks.is_empty()
    }

    pub(crate) fn decode(reader: &mut Reader, masters: usize) -> Result<Self, VfbError> {
        let mut hints = Hints::default();
        for direction in [&mut hints.h, &mut hints.v] {
            let num_hints = reader.count()?;
            for _ in 0..num_hints {
                let mut per_master = Vec::with_capacity(masters.min(reader.remaining()));
                for _ in 0..masters {
                    per_master.push(Hint {
                        pos: reader.value()?,
                        width: reader.value()?,
                    });
                }
                direction.push(per_master);
            }
        }
        let num_masks = reader.count()?;
        for _ in 0..num_masks {
            hints.hintmasks.push(HintMask::decode(reader)?);
        }
        Ok(hints)
    }

    pub(crate) fn encode(&self, w: &mut Writer, masters: usize) -> Result<(), VfbError> {
        for (name, direction) in [("h", &self.h), ("v", &self.v)] {
            w.count(direction.len())?;
            for per_master in direction {
                check_masters(&format!("{} hint", name), per_master.len(), masters)?;
                for hint in per_master {
                    w.value(hint.pos);
                    w.value(hint.width);
                }
            }
        }
        w.count(self.hintmasks.len())?;
        for mask in &self.hintmasks {
            mask.encode(w);
        }
        Ok(())
    }
}

/// A guideline position with its slant stored as a tangent scaled by 10000.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guide {
    pub pos: i32,
    pub tangent: i32,
}

impl Guide {
    pub fn angle_degrees(&self) -> f64 {
        (self.tangent as f64).atan2(10000.0).to_degrees()
    }

    pub fn from_degrees(pos: i32, angle: f64) -> Self {
        Guide {
            pos,
            tangent: (angle.to_radians().tan() * 10000.0).round() as i32,
        }
    }
}

/// Horizontal and vertical guides, one entry per master for each guide.
/// Used both inside glyphs and for the font-wide guides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guides {
    pub h: Vec<Vec<Guide>>,
    pub v: Vec<Vec<Guide>>,
}

impl Guides {
    pub fn is_empty(&self) -> bool {
        self.h.is_empty() && self.v.is_empty()
    }

    pub(crate) fn decode(reader: &mut Reader, masters: usize) -> Result<Self, VfbError> {
        let mut guides = Guides::default();
        for direction in [&mut guides.h, &mut guides.v] {
            let num_guides = reader.count()?;
            for _ in 0..num_guides {
                let mut per_master = Vec::with_capacity(masters.min(reader.remaining()));
                for _ in 0..masters {
                    per_master.push(Guide {
                        pos: reader.value()?,
                        tangent: reader.value()?,
                    });
                }
                direction.push(per_master);
            }
        }
        Ok(guides)
    }

    pub(crate) fn encode(&self, w: &mut Writer, masters: usize) -> Result<(), VfbError> {
        for (name, direction) in [("h", &self.h), ("v", &self.v)] {
            w.count(direction.len())?;
            for per_master in direction {
                check_masters(&format!("{} guide", name), per_master.len(), masters)?;
                for guide in per_master {
                    w.value(guide.pos);
                    w.value(guide.tangent);
                }
            }
        }
        Ok(())
    }
}

pub(crate) fn check_masters(what: &str, found: usize, masters: usize) -> Result<(), VfbError> {
    if found != masters {
        return Err(VfbError::invalid(
            what,
            format!("{} master values, expected {}", found, masters),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::serde_helpers::from_hex;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_hints_one_master() {
        let data = from_hex("8f 7f c3 f818 c3 f92a 53 85 c2 8d c1 eb f802 e5 8b").unwrap();
        let hints = Hints::decode(&mut Reader::new(&data), 1).unwrap();
        let h = |pos, width| vec![Hint { pos, width }];
        assert_eq!(hints.h, vec![h(-12, 56), h(388, 56), h(662, -56), h(-6, 55)]);
        assert_eq!(hints.v, vec![h(54, 96), h(366, 90)]);
        assert!(hints.hintmasks.is_empty());

        let mut w = Writer::new();
        hints.encode(&mut w, 1).unwrap();
        assert_eq!(w.into_inner(), data);
    }

    #[test]
    fn test_hints_two_masters() {
        let data = from_hex("8c 7f c3 f818 c3 8b 8b").unwrap();
        let hints = Hints::decode(&mut Reader::new(&data), 2).unwrap();
        assert_eq!(
            hints.h,
            vec![vec![
                Hint { pos: -12, width: 56 },
                Hint { pos: 388, width: 56 }
            ]]
        );
        assert!(hints.v.is_empty());
    }

    #[test]
    fn test_hint_masks_roundtrip() {
        let hints = Hints {
            h: vec![vec![Hint { pos: 10, width: 20 }]],
            v: vec![],
            hintmasks: vec![HintMask::H(1), HintMask::V(0), HintMask::R(-3)],
        };
        let mut w = Writer::new();
        hints.encode(&mut w, 1).unwrap();
        let bytes = w.into_inner();
        assert_eq!(bytes, from_hex("8c 95 9f 8b 8e 01 8c 02 8b ff 88").unwrap());
        assert_eq!(Hints::decode(&mut Reader::new(&bytes), 1).unwrap(), hints);
    }

    #[test]
    fn test_guides() {
        let data = from_hex("8c f93a 8b 8c f715 8b").unwrap();
        let guides = Guides::decode(&mut Reader::new(&data), 1).unwrap();
        assert_eq!(guides.h, vec![vec![Guide { pos: 678, tangent: 0 }]]);
        assert_eq!(guides.v, vec![vec![Guide { pos: 129, tangent: 0 }]]);

        let mut w = Writer::new();
        guides.encode(&mut w, 1).unwrap();
        assert_eq!(w.into_inner(), data);
    }

    #[test]
    fn test_angled_guides() {
        let data = from_hex("8c f8c7 f849 8c f7e5 ff00000943").unwrap();
        let guides = Guides::decode(&mut Reader::new(&data), 1).unwrap();
        let h = guides.h[0][0];
        assert_eq!(h, Guide { pos: 563, tangent: 437 });
        assert!((h.angle_degrees() - 2.502233544934958).abs() < 1e-9);
        assert_eq!(Guide::from_degrees(563, 2.502233544934958), h);
        assert_eq!(guides.v[0][0], Guide { pos: 337, tangent: 2371 });
    }

    #[test]
    fn test_guide_angle() {
        let guide = Guide { pos: 0, tangent: 10000 };
        assert!((guide.angle_degrees() - 45.0).abs() < 1e-9);
        assert_eq!(Guide::from_degrees(0, 45.0), guide);
        assert_eq!(Guide::from_degrees(5, 0.0).tangent, 0);
    }

    #[test]
    fn test_master_count_is_checked() {
        let guides = Guides {
            h: vec![vec![Guide { pos: 1, tangent: 0 }]],
            v: vec![],
        };
        assert!(guides.encode(&mut Writer::new(), 2).is_err());
    }
}
