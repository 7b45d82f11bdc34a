//! Text payloads: plain strings, glyph encodings, OpenType feature code,
//! name records and named class flags.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    context::Context,
    serde_helpers::{hex_bytes, unhex_bytes},
    stream::{Reader, Writer},
    text::{mac_roman_byte, mac_roman_char, Encoding},
    VfbError,
};

fn strip(s: &str) -> String {
    s.trim_matches(|c| c == '\0' || c == ' ').to_string()
}

/// The whole payload as text, without padding.
pub(crate) fn text(r: &mut Reader, ctx: &Context) -> Result<String, VfbError> {
    Ok(strip(&ctx.encoding.decode(r.read_rest())?))
}

pub(crate) fn write_text(s: &str, pad: usize, w: &mut Writer, ctx: &Context) -> Result<(), VfbError> {
    w.write_str(s, ctx.encoding, pad)
}

/// One slot of the font's encoding vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlyphEncoding {
    pub gid: u16,
    pub name: String,
}

impl GlyphEncoding {
    pub(crate) fn decode(r: &mut Reader, ctx: &Context) -> Result<Self, VfbError> {
        Ok(GlyphEncoding {
            gid: r.read_u16()?,
            name: ctx.encoding.decode(r.read_rest())?,
        })
    }

    pub(crate) fn encode(&self, w: &mut Writer, ctx: &Context) -> Result<(), VfbError> {
        w.write_u16(self.gid);
        w.write_str(&self.name, ctx.encoding, 0)
    }
}

/// OpenType feature code, one item per line.
///
/// Runs of blank lines are cut to two and the list always ends with a single
/// empty line.
pub(crate) fn feature_lines(r: &mut Reader, ctx: &Context) -> Result<Vec<String>, VfbError> {
    let code = text(r, ctx)?;
    let mut lines: Vec<String> = vec![];
    let mut blanks = 0;
    for line in code.lines() {
        if line.trim().is_empty() {
            if blanks < 2 {
                lines.push(line.to_string());
            }
            blanks += 1;
        } else {
            blanks = 0;
            lines.push(line.to_string());
        }
    }
    if lines.len() > 1 {
        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }
    }
    lines.push(String::new());
    Ok(lines)
}

pub(crate) fn write_feature_lines(lines: &[String], w: &mut Writer, ctx: &Context) -> Result<(), VfbError> {
    w.write_str(&lines.join("\n"), ctx.encoding, 0)
}

/// An OpenType name table record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameRecord {
    pub name_id: i32,
    pub platform_id: i32,
    pub encoding_id: i32,
    pub language_id: i32,
    pub name: String,
}

impl NameRecord {
    fn is_mac_roman(&self) -> bool {
        self.platform_id == 1 && self.encoding_id == 0
    }
}

pub(crate) fn name_records(r: &mut Reader) -> Result<Vec<NameRecord>, VfbError> {
    let count = r.count()?;
    let mut records = Vec::with_capacity(count.min(r.remaining()));
    for _ in 0..count {
        let mut record = NameRecord {
            name_id: r.value()?,
            platform_id: r.value()?,
            encoding_id: r.value()?,
            language_id: r.value()?,
            name: String::new(),
        };
        let length = r.count()?;
        for _ in 0..length {
            let code = r.value()?;
            let c = if record.is_mac_roman() {
                u8::try_from(code).ok().map(mac_roman_char)
            } else {
                u32::try_from(code).ok().and_then(char::from_u32)
            };
            record.name.push(c.unwrap_or('\u{FEFF}'));
        }
        records.push(record);
    }
    Ok(records)
}

pub(crate) fn write_name_records(records: &[NameRecord], w: &mut Writer) -> Result<(), VfbError> {
    w.count(records.len())?;
    for record in records {
        w.value(record.name_id);
        w.value(record.platform_id);
        w.value(record.encoding_id);
        w.value(record.language_id);
        w.count(record.name.chars().count())?;
        for c in record.name.chars() {
            let code = if record.is_mac_roman() {
                mac_roman_byte(c).unwrap_or(b'?') as i32
            } else {
                c as i32
            };
            w.value(code);
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomCmap {
    pub language_id: i32,
    pub platform_id: i32,
    pub encoding_id: i32,
    pub format: i32,
    pub option: i32,
    pub page_name: String,
}

pub(crate) fn custom_cmaps(r: &mut Reader, ctx: &Context) -> Result<Vec<CustomCmap>, VfbError> {
    let count = r.count()?;
    let mut cmaps = Vec::with_capacity(count.min(r.remaining()));
    for _ in 0..count {
        cmaps.push(CustomCmap {
            language_id: r.value()?,
            platform_id: r.value()?,
            encoding_id: r.value()?,
            format: r.value()?,
            option: r.value()?,
            page_name: r.str_with_len(ctx.encoding)?,
        });
    }
    Ok(cmaps)
}

pub(crate) fn write_custom_cmaps(cmaps: &[CustomCmap], w: &mut Writer, ctx: &Context) -> Result<(), VfbError> {
    w.count(cmaps.len())?;
    for cmap in cmaps {
        for value in [
            cmap.language_id,
            cmap.platform_id,
            cmap.encoding_id,
            cmap.format,
            cmap.option,
        ] {
            w.value(value);
        }
        w.str_with_len(&cmap.page_name, ctx.encoding)?;
    }
    Ok(())
}

/// Class name to its flag values; metrics classes carry three flags and
/// kerning classes two.
pub(crate) fn class_flags(
    r: &mut Reader,
    num_flags: usize,
    ctx: &Context,
) -> Result<IndexMap<String, Vec<i32>>, VfbError> {
    let count = r.count()?;
    let mut classes = IndexMap::new();
    for _ in 0..count {
        let name = r.str_with_len(ctx.encoding)?;
        let mut flags = Vec::with_capacity(num_flags);
        for _ in 0..num_flags {
            flags.push(r.value()?);
        }
        classes.insert(name, flags);
    }
    Ok(classes)
}

pub(crate) fn write_class_flags(
    classes: &IndexMap<String, Vec<i32>>,
    num_flags: usize,
    w: &mut Writer,
    ctx: &Context,
) -> Result<(), VfbError> {
    w.count(classes.len())?;
    for (name, flags) in classes {
        if flags.len() != num_flags {
            return Err(VfbError::invalid(
                format!("flags of class {}", name),
                format!("{} values instead of {}", flags.len(), num_flags),
            ));
        }
        w.str_with_len(name, ctx.encoding)?;
        for flag in flags {
            w.value(*flag);
        }
    }
    Ok(())
}

/// A binary TrueType table stored with its four-letter tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrueTypeTable {
    pub tag: String,
    #[serde(serialize_with = "hex_bytes", deserialize_with = "unhex_bytes")]
    pub data: Vec<u8>,
}

impl TrueTypeTable {
    pub(crate) fn decode(r: &mut Reader) -> Result<Self, VfbError> {
        Ok(TrueTypeTable {
            tag: r.read_str(4, Encoding::Windows1252)?,
            data: r.read_rest().to_vec(),
        })
    }

    pub(crate) fn encode(&self, w: &mut Writer) -> Result<(), VfbError> {
        if Encoding::Windows1252.encode(&self.tag)?.len() != 4 {
            return Err(VfbError::invalid("table tag", format!("{:?}", self.tag)));
        }
        w.write_str(&self.tag, Encoding::Windows1252, 4)?;
        w.write_bytes(&self.data);
        Ok(())
    }
}
