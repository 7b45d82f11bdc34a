//! TrueType hinting and table settings.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    context::Context,
    stream::{Reader, Writer},
    VfbError,
};

use super::{bits_from_list, bits_to_list, narrow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GaspRange {
    #[serde(rename = "maxPpem")]
    pub max_ppem: u16,
    pub flags: u16,
}

pub(crate) fn gasp(r: &mut Reader) -> Result<Vec<GaspRange>, VfbError> {
    let mut ranges = Vec::with_capacity(r.remaining() / 4);
    while r.remaining() >= 4 {
        ranges.push(GaspRange {
            max_ppem: r.read_u16()?,
            flags: r.read_u16()?,
        });
    }
    Ok(ranges)
}

pub(crate) fn write_gasp(ranges: &[GaspRange], w: &mut Writer) {
    for range in ranges {
        w.write_u16(range.max_ppem);
        w.write_u16(range.flags);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VdmxRecord {
    #[serde(rename = "pelHeight")]
    pub pel_height: i32,
    pub max: i32,
    pub min: i32,
}

pub(crate) fn vdmx(r: &mut Reader) -> Result<Vec<VdmxRecord>, VfbError> {
    let count = r.count()?;
    let mut records = Vec::with_capacity(count.min(r.remaining()));
    for _ in 0..count {
        records.push(VdmxRecord {
            pel_height: r.value()?,
            max: r.value()?,
            min: r.value()?,
        });
    }
    Ok(records)
}

pub(crate) fn write_vdmx(records: &[VdmxRecord], w: &mut Writer) -> Result<(), VfbError> {
    w.count(records.len())?;
    for record in records {
        w.value(record.pel_height);
        w.value(record.max);
        w.value(record.min);
    }
    Ok(())
}

const TTINFO_END: u8 = 0x32;
const HEAD_CREATION: &str = "head_creation";
// Seconds between the TrueType epoch and the Unix epoch, as FontLab counts them
const MAC_EPOCH_OFFSET: i64 = 2_082_841_200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TtInfoKind {
    Value,
    Unsigned,
    HeadFlags,
    Panose,
    ByteList,
    CodePages,
}

const TTINFO_KEYS: &[(u8, &str, TtInfoKind)] = &[
    (0x33, "max_zones", TtInfoKind::Value),
    (0x34, "max_twilight_points", TtInfoKind::Value),
    (0x35, "max_storage", TtInfoKind::Value),
    (0x36, "max_function_defs", TtInfoKind::Value),
    (0x37, "max_instruction_defs", TtInfoKind::Value),
    (0x38, "max_stack_elements", TtInfoKind::Value),
    (0x39, "head_flags", TtInfoKind::HeadFlags),
    (0x3A, "head_units_per_em", TtInfoKind::Value),
    (0x3B, "head_mac_style", TtInfoKind::Value),
    (0x3C, "head_lowest_rec_ppem", TtInfoKind::Value),
    (0x56, HEAD_CREATION, TtInfoKind::Unsigned),
    (0x57, "head_creation2", TtInfoKind::Unsigned),
    (0x3D, "head_font_direction_hint", TtInfoKind::Value),
    (0x3E, "os2_us_weight_class", TtInfoKind::Value),
    (0x3F, "os2_us_width_class", TtInfoKind::Value),
    (0x40, "os2_fs_type", TtInfoKind::Value),
    (0x41, "os2_y_subscript_x_size", TtInfoKind::Value),
    (0x42, "os2_y_subscript_y_size", TtInfoKind::Value),
    (0x43, "os2_y_subscript_x_offset", TtInfoKind::Value),
    (0x44, "os2_y_subscript_y_offset", TtInfoKind::Value),
    (0x45, "os2_y_superscript_x_size", TtInfoKind::Value),
    (0x46, "os2_y_superscript_y_size", TtInfoKind::Value),
    (0x47, "os2_y_superscript_x_offset", TtInfoKind::Value),
    (0x48, "os2_y_superscript_y_offset", TtInfoKind::Value),
    (0x49, "os2_y_strikeout_size", TtInfoKind::Value),
    (0x4A, "os2_y_strikeout_position", TtInfoKind::Value),
    (0x4B, "os2_s_family_class", TtInfoKind::Value),
    (0x4C, "OpenTypeOS2Panose", TtInfoKind::Panose),
    (0x4D, "os2_s_typo_ascender", TtInfoKind::Value),
    (0x4E, "os2_s_typo_descender", TtInfoKind::Value),
    (0x4F, "os2_s_typo_line_gap", TtInfoKind::Value),
    (0x50, "os2_fs_selection", TtInfoKind::Value),
    (0x51, "os2_us_win_ascent", TtInfoKind::Value),
    (0x52, "os2_us_win_descent", TtInfoKind::Value),
    (0x5C, "Average Width", TtInfoKind::Value),
    (0x53, "Hdmx PPMs 1", TtInfoKind::ByteList),
    (0x58, "Hdmx PPMs 2", TtInfoKind::ByteList),
    (0x54, "Codepages", TtInfoKind::CodePages),
    // Seen in the name table of the format, never in a file so far
    (0x59, "hhea_line_gap", TtInfoKind::Value),
    (0x5A, "hhea_ascender", TtInfoKind::Value),
    (0x5B, "hhea_descender", TtInfoKind::Value),
];

const TT_SETTINGS: [&str; 3] = ["use_custom_tt_values", "create_vdmx", "add_null_cr_space"];

/// The `head` table flags in the low 16 bits, FontLab's own settings above.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadFlags {
    pub flags: Vec<u32>,
    pub options: Vec<String>,
}

impl HeadFlags {
    fn from_value(value: u32) -> Self {
        HeadFlags {
            flags: bits_to_list((value & 0xFFFF) as u128),
            options: bits_to_list((value >> 16) as u128)
                .into_iter()
                .map(|bit| {
                    TT_SETTINGS
                        .get(bit as usize)
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| bit.to_string())
                })
                .collect(),
        }
    }

    fn to_value(&self) -> Result<u32, VfbError> {
        let flags = bits_from_list("head flag", &self.flags, 16)?;
        let mut option_bits = vec![];
        for option in &self.options {
            let bit = match TT_SETTINGS.iter().position(|s| s == option) {
                Some(bit) => bit as u32,
                None => option
                    .parse()
                    .map_err(|_| VfbError::invalid("TrueType setting", option.clone()))?,
            };
            option_bits.push(bit);
        }
        let options = bits_from_list("TrueType setting", &option_bits, 16)?;
        Ok((flags | options << 16) as u32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodePages {
    pub os2_ul_code_page_range1: u32,
    pub os2_ul_code_page_range2: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TtInfoValue {
    Number(i64),
    Bytes(Vec<u8>),
    HeadFlags(HeadFlags),
    CodePages(CodePages),
}

/// TrueType related font info, in the order it was stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TtInfo(pub IndexMap<String, TtInfoValue>);

impl TtInfo {
    pub fn get(&self, name: &str) -> Option<&TtInfoValue> {
        self.0.get(name)
    }

    /// The `head` creation timestamp.
    pub fn creation_date(&self) -> Option<DateTime<Utc>> {
        match self.get(HEAD_CREATION)? {
            TtInfoValue::Number(seconds) => {
                DateTime::from_timestamp((seconds - MAC_EPOCH_OFFSET).max(0), 0)
            }
            _ => None,
        }
    }

    pub(crate) fn decode(r: &mut Reader) -> Result<Self, VfbError> {
        let mut info = IndexMap::new();
        loop {
            let key = r.read_u8()?;
            if key == TTINFO_END {
                break;
            }
            let (name, kind) = TTINFO_KEYS
                .iter()
                .find(|(k, _, _)| *k == key)
                .map(|(_, name, kind)| (*name, *kind))
                .ok_or_else(|| VfbError::invalid("TrueType info key", format!("0x{:02x}", key)))?;
            let value = match kind {
                TtInfoKind::Value => TtInfoValue::Number(r.value()? as i64),
                TtInfoKind::Unsigned => TtInfoValue::Number(r.value_unsigned()? as i64),
                TtInfoKind::HeadFlags => {
                    TtInfoValue::HeadFlags(HeadFlags::from_value(r.value()? as u32))
                }
                TtInfoKind::Panose => TtInfoValue::Bytes(r.read_bytes(10)?.to_vec()),
                TtInfoKind::ByteList => {
                    let count = r.count()?;
                    TtInfoValue::Bytes(r.read_bytes(count)?.to_vec())
                }
                TtInfoKind::CodePages => TtInfoValue::CodePages(CodePages {
                    os2_ul_code_page_range1: r.value_unsigned()?,
                    os2_ul_code_page_range2: r.value_unsigned()?,
                }),
            };
            if info.insert(name.to_string(), value).is_some() {
                return Err(VfbError::invalid(
                    "TrueType info",
                    format!("duplicate key {}", name),
                ));
            }
        }
        Ok(TtInfo(info))
    }

    pub(crate) fn encode(&self, w: &mut Writer) -> Result<(), VfbError> {
        for (name, value) in &self.0 {
            let (key, kind) = TTINFO_KEYS
                .iter()
                .find(|(_, n, _)| n == name)
                .map(|(key, _, kind)| (*key, *kind))
                .ok_or_else(|| VfbError::invalid("TrueType info key", name.clone()))?;
            w.write_u8(key);
            match (kind, value) {
                (TtInfoKind::Value, TtInfoValue::Number(n)) => w.value(narrow(name, *n)?),
                (TtInfoKind::Unsigned, TtInfoValue::Number(n)) => {
                    w.value_unsigned(narrow(name, *n)?)
                }
                (TtInfoKind::HeadFlags, TtInfoValue::HeadFlags(flags)) => {
                    w.value(flags.to_value()? as i32)
                }
                (TtInfoKind::Panose, TtInfoValue::Bytes(bytes)) if bytes.len() == 10 => {
                    w.write_bytes(bytes)
                }
                (TtInfoKind::ByteList, TtInfoValue::Bytes(bytes)) => {
                    w.count(bytes.len())?;
                    w.write_bytes(bytes);
                }
                (TtInfoKind::CodePages, TtInfoValue::CodePages(pages)) => {
                    w.value_unsigned(pages.os2_ul_code_page_range1);
                    w.value_unsigned(pages.os2_ul_code_page_range2);
                }
                _ => {
                    return Err(VfbError::invalid(
                        format!("TrueType info {}", name),
                        format!("{:?}", value),
                    ))
                }
            }
        }
        w.write_u8(TTINFO_END);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TtStem {
    pub width: i32,
    pub name: String,
    /// Pixel size from which the stem is two pixels wide.
    pub ppm6: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TtStems {
    #[serde(rename = "ttStemsV")]
    pub v: Vec<TtStem>,
    #[serde(rename = "ttStemsH")]
    pub h: Vec<TtStem>,
}

impl TtStems {
    pub fn counts(&self) -> (usize, usize) {
        (self.v.len(), self.h.len())
    }

    pub(crate) fn decode(r: &mut Reader, ctx: &Context) -> Result<Self, VfbError> {
        let mut stems = TtStems::default();
        for direction in [&mut stems.v, &mut stems.h] {
            let count = r.count()?;
            for _ in 0..count {
                let width = r.value()?;
                let length = r.read_u8()? as usize;
                direction.push(TtStem {
                    width,
                    name: r.read_str(length, ctx.encoding)?,
                    ppm6: r.value()?,
                });
            }
        }
        Ok(stems)
    }

    pub(crate) fn encode(&self, w: &mut Writer, ctx: &Context) -> Result<(), VfbError> {
        for direction in [&self.v, &self.h] {
            w.count(direction.len())?;
            for stem in direction {
                w.value(stem.width);
                let name = ctx.encoding.encode(&stem.name)?;
                w.write_u8(narrow("stem name length", name.len())?);
                w.write_bytes(&name);
                w.value(stem.ppm6);
            }
        }
        Ok(())
    }
}

/// Pixel sizes at which each TrueType stem switches to the next width.
///
/// Depending on the entry each stem carries the thresholds for 1 pixel, for
/// 2 and 3 pixels, or for 2 to 5 pixels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StemPpems {
    #[serde(rename = "ttStemsV")]
    pub v: Vec<Vec<i32>>,
    #[serde(rename = "ttStemsH")]
    pub h: Vec<Vec<i32>>,
}

impl StemPpems {
    /// Read `per_stem` values for each stem. Without `counts` each direction
    /// starts with its own stem count.
    pub(crate) fn decode(
        r: &mut Reader,
        per_stem: usize,
        counts: Option<(usize, usize)>,
    ) -> Result<Self, VfbError> {
        let mut ppems = StemPpems::default();
        for (i, direction) in [&mut ppems.v, &mut ppems.h].into_iter().enumerate() {
            let count = match counts {
                Some((v, h)) => [v, h][i],
                None => r.count()?,
            };
            for _ in 0..count {
                let mut stem = Vec::with_capacity(per_stem);
                for _ in 0..per_stem {
                    stem.push(r.value()?);
                }
                direction.push(stem);
            }
        }
        Ok(ppems)
    }

    pub(crate) fn encode(
        &self,
        w: &mut Writer,
        per_stem: usize,
        counts: Option<(usize, usize)>,
    ) -> Result<(), VfbError> {
        for (i, direction) in [&self.v, &self.h].into_iter().enumerate() {
            match counts {
                Some((v, h)) if [v, h][i] != direction.len() => {
                    return Err(VfbError::invalid(
                        "TrueType stem ppems",
                        format!("{} stems, but the font has {}", direction.len(), [v, h][i]),
                    ))
                }
                Some(_) => {}
                None => w.count(direction.len())?,
            }
            for stem in direction {
                if stem.len() != per_stem {
                    return Err(VfbError::invalid(
                        "TrueType stem ppems",
                        format!("{} values per stem instead of {}", stem.len(), per_stem),
                    ));
                }
                for ppm in stem {
                    w.value(*ppm);
                }
            }
        }
        Ok(())
    }
}

pub(crate) fn stem_counts(ctx: &Context) -> Result<(usize, usize), VfbError> {
    ctx.stem_counts.ok_or_else(|| {
        VfbError::invalid(
            "TrueType stem ppems",
            "the stem counts are unknown until the TrueType Stems entry is read",
        )
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TtZone {
    pub position: i32,
    pub width: i32,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TtZones {
    #[serde(rename = "ttZonesT")]
    pub top: Vec<TtZone>,
    #[serde(rename = "ttZonesB")]
    pub bottom: Vec<TtZone>,
}

impl TtZones {
    pub(crate) fn decode(r: &mut Reader, ctx: &Context) -> Result<Self, VfbError> {
        let mut zones = TtZones::default();
        for side in [&mut zones.top, &mut zones.bottom] {
            let count = r.count()?;
            for _ in 0..count {
                side.push(TtZone {
                    position: r.value()?,
                    width: r.value()?,
                    name: r.str_with_len(ctx.encoding)?,
                });
            }
        }
        Ok(zones)
    }

    pub(crate) fn encode(&self, w: &mut Writer, ctx: &Context) -> Result<(), VfbError> {
        for side in [&self.top, &self.bottom] {
            w.count(side.len())?;
            for zone in side {
                w.value(zone.position);
                w.value(zone.width);
                w.str_with_len(&zone.name, ctx.encoding)?;
            }
        }
        Ok(())
    }
}

/// Zone index to pixel size to shift.
pub type ZoneDeltas = BTreeMap<i32, BTreeMap<i32, i32>>;

pub(crate) fn zone_deltas(r: &mut Reader) -> Result<ZoneDeltas, VfbError> {
    let count = r.count()?;
    let mut deltas = ZoneDeltas::new();
    for _ in 0..count {
        let zone = r.value()?;
        let ppm = r.value()?;
        let shift = r.value()?;
        deltas.entry(zone).or_default().insert(ppm, shift);
    }
    Ok(deltas)
}

pub(crate) fn write_zone_deltas(deltas: &ZoneDeltas, w: &mut Writer) -> Result<(), VfbError> {
    w.count(deltas.values().map(|d| d.len()).sum())?;
    for (zone, shifts) in deltas {
        for (ppm, shift) in shifts {
            w.value(*zone);
            w.value(*ppm);
            w.value(*shift);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::serde_helpers::from_hex;
    use pretty_assertions::assert_eq;

    const ZONES: &str = "90f8049192696e665f746f70f89a979278686569676874f94e979463617068\
        6569676874f9789792736c6173686573f9809793617363656e6465728e8b9793626173656c696e65\
        fb5c979464657363656e646572f7de91927375705f626f74";

    #[test]
    fn test_gasp() {
        let data = from_hex("08000200 10000100 ffff0300").unwrap();
        let ranges = gasp(&mut Reader::new(&data)).unwrap();
        assert_eq!(
            ranges,
            vec![
                GaspRange { max_ppem: 8, flags: 2 },
                GaspRange { max_ppem: 16, flags: 1 },
                GaspRange { max_ppem: 65535, flags: 3 },
            ]
        );
        let mut w = Writer::new();
        write_gasp(&ranges, &mut w);
        assert_eq!(w.into_inner(), data);
    }

    #[test]
    fn test_zones() {
        let ctx = Context::default();
        let data = from_hex(ZONES).unwrap();
        let mut reader = Reader::new(&data);
        let zones = TtZones::decode(&mut reader, &ctx).unwrap();
        assert!(reader.is_empty());
        let top: Vec<_> = zones
            .top
            .iter()
            .map(|z| (z.position, z.width, z.name.as_str()))
            .collect();
        assert_eq!(
            top,
            vec![
                (368, 6, "inf_top"),
                (518, 12, "xheight"),
                (698, 12, "capheight"),
                (740, 12, "slashes"),
                (748, 12, "ascender"),
            ]
        );
        assert_eq!(zones.bottom[1].position, -200);
        assert_eq!(zones.bottom[2].name, "sup_bot");

        let mut w = Writer::new();
        zones.encode(&mut w, &ctx).unwrap();
        assert_eq!(w.into_inner(), data);
    }

    #[test]
    fn test_zone_deltas_are_written_sorted() {
        let mut deltas = ZoneDeltas::new();
        deltas.insert(4, BTreeMap::from([(30, -8), (28, -8)]));
        deltas.insert(2, BTreeMap::from([(28, 8), (29, -8), (31, 8), (35, -8)]));
        deltas.insert(3, BTreeMap::from([(15, -8), (26, -8), (32, -8), (45, -8)]));
        let mut w = Writer::new();
        write_zone_deltas(&deltas, &mut w).unwrap();
        let bytes = w.into_inner();
        assert_eq!(
            bytes,
            from_hex("958da7938da8838daa938dae838e9a838ea5838eab838eb8838fa7838fa983").unwrap()
        );
        assert_eq!(zone_deltas(&mut Reader::new(&bytes)).unwrap(), deltas);
    }

    #[test]
    fn test_stems_and_ppems() {
        let ctx = Context::default();
        let stems = TtStems {
            v: vec![TtStem {
                width: 84,
                name: "X: 84".to_string(),
                ppm6: 71,
            }],
            h: vec![],
        };
        let mut w = Writer::new();
        stems.encode(&mut w, &ctx).unwrap();
        let bytes = w.into_inner();
        assert_eq!(&bytes[..3], &[0x8c, 0xdf, 0x05]);
        let decoded = TtStems::decode(&mut Reader::new(&bytes), &ctx).unwrap();
        assert_eq!(decoded, stems);
        assert_eq!(decoded.counts(), (1, 0));

        let ppems = StemPpems {
            v: vec![vec![14]],
            h: vec![],
        };
        let mut w = Writer::new();
        ppems.encode(&mut w, 1, Some((1, 0))).unwrap();
        assert_eq!(w.clone().into_inner(), vec![0x99]);
        assert_eq!(
            StemPpems::decode(&mut Reader::new(&w.into_inner()), 1, Some((1, 0))).unwrap(),
            ppems
        );
        assert!(ppems.encode(&mut Writer::new(), 1, Some((2, 0))).is_err());

        let ppems = StemPpems {
            v: vec![vec![20, 30, 40, 50]],
            h: vec![vec![21, 31, 41, 51]],
        };
        let mut w = Writer::new();
        ppems.encode(&mut w, 4, None).unwrap();
        let bytes = w.into_inner();
        assert_eq!(bytes[0], 0x8c);
        assert_eq!(StemPpems::decode(&mut Reader::new(&bytes), 4, None).unwrap(), ppems);
    }

    #[test]
    fn test_missing_stem_counts() {
        assert!(stem_counts(&Context::default()).is_err());
    }

    #[test]
    fn test_ttinfo() {
        // max_zones 2, head_flags with option create_vdmx, head_creation,
        // panose, hdmx ppms and code pages
        let data = from_hex(
            "33 8d
             39 ff0002000b
             56 ffd58de18b
             4c 020b0603050405020204
             53 8e 0a0b0c
             54 8c 8b
             32",
        )
        .unwrap();
        let mut reader = Reader::new(&data);
        let info = TtInfo::decode(&mut reader).unwrap();
        assert!(reader.is_empty());
        assert_eq!(
            info.0.keys().collect::<Vec<_>>(),
            vec![
                "max_zones",
                "head_flags",
                "head_creation",
                "OpenTypeOS2Panose",
                "Hdmx PPMs 1",
                "Codepages"
            ]
        );
        assert_eq!(
            info.get("head_flags"),
            Some(&TtInfoValue::HeadFlags(HeadFlags {
                flags: vec![0, 1, 3],
                options: vec!["create_vdmx".to_string()],
            }))
        );
        assert_eq!(
            info.creation_date().unwrap().to_rfc3339(),
            "2017-07-14T03:48:43+00:00"
        );
        assert_eq!(
            info.get("Codepages"),
            Some(&TtInfoValue::CodePages(CodePages {
                os2_ul_code_page_range1: 1,
                os2_ul_code_page_range2: 0,
            }))
        );

        let mut w = Writer::new();
        info.encode(&mut w).unwrap();
        assert_eq!(w.into_inner(), data);
    }

    #[test]
    fn test_unknown_ttinfo_key() {
        assert!(TtInfo::decode(&mut Reader::new(&[0x60, 0x8b, 0x32])).is_err());
    }
}
