//! TrueType glyph data kept alongside the native outline when a glyph was
//! imported from a TrueType font.

use serde::{Deserialize, Serialize};

use crate::{
    serde_helpers::{hex_bytes, unhex_bytes},
    stream::{Reader, Writer},
    VfbError,
};

const END: u8 = 0x28;
const METRICS: u8 = 0x29;
const OUTLINE: u8 = 0x2A;
const INSTRUCTIONS: u8 = 0x2B;
const HDMX: u8 = 0x2C;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportedMetrics {
    pub width: u32,
    pub lsb: i32,
    pub unknown: [i32; 3],
    pub bbox: [i32; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportedNode {
    /// TrueType point flags; bit 0 marks an on-curve point.
    pub flags: u8,
    pub point: (i32, i32),
}

impl ImportedNode {
    pub fn on_curve(&self) -> bool {
        self.flags & 1 != 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportedOutline {
    /// -1 for a composite glyph.
    pub num_contours: i32,
    pub endpoints: Vec<u32>,
    pub nodes: Vec<ImportedNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportedGlyph {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ImportedMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outline: Option<ImportedOutline>,
    /// TrueType bytecode
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "opt_hex",
        deserialize_with = "opt_unhex"
    )]
    pub instructions: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hdmx: Option<Vec<u8>>,
}

fn opt_hex<S: serde::Serializer>(bytes: &Option<Vec<u8>>, s: S) -> Result<S::Ok, S::Error> {
    match bytes {
        Some(bytes) => hex_bytes(bytes, s),
        None => s.serialize_none(),
    }
}

fn opt_unhex<'de, D: serde::Deserializer<'de>>(d: D) -> Result<Option<Vec<u8>>, D::Error> {
    unhex_bytes(d).map(Some)
}

impl ImportedGlyph {
    pub(crate) fn decode(reader: &mut Reader) -> Result<Self, VfbError> {
        let mut imported = ImportedGlyph::default();
        loop {
            match reader.read_u8()? {
                END => break,
                METRICS => {
                    imported.metrics = Some(ImportedMetrics {
                        width: reader.value_unsigned()?,
                        lsb: reader.value()?,
                        unknown: [reader.value()?, reader.value()?, reader.value()?],
                        bbox: [
                            reader.value()?,
                            reader.value()?,
                            reader.value()?,
                            reader.value()?,
                        ],
                    });
                }
                OUTLINE => {
                    let num_contours = reader.value()?;
                    let mut endpoints = vec![];
                    for _ in 0..num_contours.max(0) {
                        endpoints.push(reader.value_unsigned()?);
                    }
                    let num_nodes = reader.value_unsigned()?;
                    let mut nodes = vec![];
                    let (mut x, mut y) = (0i32, 0i32);
                    for _ in 0..num_nodes {
                        x = x.wrapping_add(reader.value()?);
                        y = y.wrapping_add(reader.value()?);
                        nodes.push(ImportedNode {
                            point: (x, y),
                            flags: reader.read_u8()?,
                        });
                    }
                    imported.outline = Some(ImportedOutline {
                        num_contours,
                        endpoints,
                        nodes,
                    });
                }
                INSTRUCTIONS => {
                    let num_bytes = reader.value_unsigned()? as usize;
                    imported.instructions = Some(reader.read_bytes(num_bytes)?.to_vec());
                }
                HDMX => {
                    let num = reader.count()?;
                    imported.hdmx = Some(reader.read_bytes(num)?.to_vec());
                }
                other => {
                    return Err(VfbError::invalid(
                        "imported glyph block",
                        format!("0x{:02x}", other),
                    ))
                }
            }
        }
        Ok(imported)
    }

    pub(crate) fn encode(&self, w: &mut Writer) -> Result<(), VfbError> {
        if let Some(metrics) = &self.metrics {
            w.write_u8(METRICS);
            w.value_unsigned(metrics.width);
            w.value(metrics.lsb);
            for v in metrics.unknown.iter().chain(metrics.bbox.iter()) {
                w.value(*v);
            }
        }
        if let Some(outline) = &self.outline {
            if outline.num_contours.max(0) as usize != outline.endpoints.len() {
                return Err(VfbError::invalid(
                    "imported glyph outline",
                    format!(
                        "{} contours but {} endpoints",
                        outline.num_contours,
                        outline.endpoints.len()
                    ),
                ));
            }
            w.write_u8(OUTLINE);
            w.value(outline.num_contours);
            for endpoint in &outline.endpoints {
                w.value_unsigned(*endpoint);
            }
            w.count(outline.nodes.len())?;
            let (mut x0, mut y0) = (0i32, 0i32);
            for node in &outline.nodes {
                let (x, y) = node.point;
                w.value(x.wrapping_sub(x0));
                w.value(y.wrapping_sub(y0));
                w.write_u8(node.flags);
                (x0, y0) = (x, y);
            }
        }
        if let Some(instructions) = &self.instructions {
            w.write_u8(INSTRUCTIONS);
            w.count(instructions.len())?;
            w.write_bytes(instructions);
        }
        if let Some(hdmx) = &self.hdmx {
            w.write_u8(HDMX);
            w.count(hdmx.len())?;
            w.write_bytes(hdmx);
        }
        w.write_u8(END);
        Ok(())
    }
}
