//! PostScript font info and hinting options.

use serde::{Deserialize, Serialize};

use crate::{
    stream::{Reader, Writer},
    VfbError,
};

use super::{bits_from_list, bits_to_list};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_snake_case)]
pub struct BoundingBox {
    pub xMin: i16,
    pub yMin: i16,
    pub xMax: i16,
    pub yMax: i16,
}

/// The PostScript Info record, one per master.
///
/// Unused alignment zone and stem snap slots are zero. The bounding box is
/// only refreshed by some FontLab actions and may be stale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PsInfo {
    pub font_matrix: [f64; 6],
    pub force_bold: i32,
    pub blue_values: [i32; 14],
    pub other_blues: [i32; 10],
    pub family_blues: [i32; 14],
    pub family_other_blues: [i32; 10],
    pub blue_scale: f64,
    pub blue_shift: u32,
    pub blue_fuzz: u32,
    pub std_hw: u32,
    pub std_vw: u32,
    pub stem_snap_h: [u32; 12],
    pub stem_snap_v: [u32; 12],
    pub bounding_box: BoundingBox,
    pub adv_width_min: i32,
    pub adv_width_max: i32,
    pub adv_width_avg: i32,
    pub ascender: i32,
    pub descender: i32,
    pub x_height: i32,
    pub cap_height: i32,
}

fn read_i32s<const N: usize>(r: &mut Reader) -> Result<[i32; N], VfbError> {
    let mut out = [0; N];
    for slot in out.iter_mut() {
        *slot = r.read_i32()?;
    }
    Ok(out)
}

fn read_u32s<const N: usize>(r: &mut Reader) -> Result<[u32; N], VfbError> {
    let mut out = [0; N];
    for slot in out.iter_mut() {
        *slot = r.read_u32()?;
    }
    Ok(out)
}

impl PsInfo {
    pub(crate) fn decode(r: &mut Reader) -> Result<Self, VfbError> {
        Ok(PsInfo {
            font_matrix: r.read_f64s()?,
            force_bold: r.read_i32()?,
            blue_values: read_i32s(r)?,
            other_blues: read_i32s(r)?,
            family_blues: read_i32s(r)?,
            family_other_blues: read_i32s(r)?,
            blue_scale: r.read_f64()?,
            blue_shift: r.read_u32()?,
            blue_fuzz: r.read_u32()?,
            std_hw: r.read_u32()?,
            std_vw: r.read_u32()?,
            stem_snap_h: read_u32s(r)?,
            stem_snap_v: read_u32s(r)?,
            bounding_box: BoundingBox {
                xMin: r.read_i16()?,
                yMin: r.read_i16()?,
                xMax: r.read_i16()?,
                yMax: r.read_i16()?,
            },
            adv_width_min: r.read_i32()?,
            adv_width_max: r.read_i32()?,
            adv_width_avg: r.read_i32()?,
            ascender: r.read_i32()?,
            descender: r.read_i32()?,
            x_height: r.read_i32()?,
            cap_height: r.read_i32()?,
        })
    }

    pub(crate) fn encode(&self, w: &mut Writer) {
        for v in self.font_matrix {
            w.write_f64(v);
        }
        w.write_i32(self.force_bold);
        for zones in [
            &self.blue_values[..],
            &self.other_blues[..],
            &self.family_blues[..],
            &self.family_other_blues[..],
        ] {
            for v in zones {
                w.write_i32(*v);
            }
        }
        w.write_f64(self.blue_scale);
        for v in [self.blue_shift, self.blue_fuzz, self.std_hw, self.std_vw] {
            w.write_u32(v);
        }
        for v in self.stem_snap_h.iter().chain(self.stem_snap_v.iter()) {
            w.write_u32(*v);
        }
        let bbox = &self.bounding_box;
        for v in [bbox.xMin, bbox.yMin, bbox.xMax, bbox.yMax] {
            w.write_i16(v);
        }
        for v in [
            self.adv_width_min,
            self.adv_width_max,
            self.adv_width_avg,
            self.ascender,
            self.descender,
            self.x_height,
            self.cap_height,
        ] {
            w.write_i32(v);
        }
    }
}

const GENERATE_FLEX: u32 = 0;

/// Font-wide PostScript hinting options, a 16-bit field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PsHintingOptions {
    #[serde(default)]
    pub generate_flex: bool,
    /// Set bits without a known meaning.
    #[serde(default)]
    pub other: Vec<u32>,
}

impl PsHintingOptions {
    pub(crate) fn decode(r: &mut Reader) -> Result<Self, VfbError> {
        let mut other = bits_to_list(r.read_u16()? as u128);
        let generate_flex = take_bit(&mut other, GENERATE_FLEX);
        Ok(PsHintingOptions {
            generate_flex,
            other,
        })
    }

    pub(crate) fn encode(&self, w: &mut Writer) -> Result<(), VfbError> {
        let mut bits = bits_from_list("hinting option", &self.other, 16)?;
        if self.generate_flex {
            bits |= 1 << GENERATE_FLEX;
        }
        w.write_u16(bits as u16);
        Ok(())
    }
}

const HINT_REPLACEMENT: u32 = 29;
const HORIZONTAL_3_STEM: u32 = 30;
const VERTICAL_3_STEM: u32 = 31;

/// Per-glyph PostScript hinting options, a 32-bit field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlyphHintingOptions {
    #[serde(default)]
    pub hint_replacement: bool,
    #[serde(default)]
    pub horizontal_3_stem: bool,
    #[serde(default)]
    pub vertical_3_stem: bool,
    #[serde(default)]
    pub other: Vec<u32>,
}

fn take_bit(bits: &mut Vec<u32>, bit: u32) -> bool {
    match bits.iter().position(|b| *b == bit) {
        Some(i) => {
            bits.remove(i);
            true
        }
        None => false,
    }
}

impl GlyphHintingOptions {
    pub(crate) fn decode(r: &mut Reader) -> Result<Self, VfbError> {
        let mut other = bits_to_list(r.read_u32()? as u128);
        Ok(GlyphHintingOptions {
            hint_replacement: take_bit(&mut other, HINT_REPLACEMENT),
            horizontal_3_stem: take_bit(&mut other, HORIZONTAL_3_STEM),
            vertical_3_stem: take_bit(&mut other, VERTICAL_3_STEM),
            other,
        })
    }

    pub(crate) fn encode(&self, w: &mut Writer) -> Result<(), VfbError> {
        let mut bits = bits_from_list("hinting option", &self.other, 32)?;
        for (set, bit) in [
            (self.hint_replacement, HINT_REPLACEMENT),
            (self.horizontal_3_stem, HORIZONTAL_3_STEM),
            (self.vertical_3_stem, VERTICAL_3_STEM),
        ] {
            if set {
                bits |= 1 << bit;
            }
        }
        w.write_u32(bits as u32);
        Ok(())
    }
}
