mod hints;
mod imported;
mod instructions;
mod outline;

pub use hints::{Guide, Guides, Hint, HintMask, Hints};
pub use imported::{ImportedGlyph, ImportedMetrics, ImportedNode, ImportedOutline};
pub use instructions::{Instructions, TtCommand};
pub use outline::{Node, NodeKind, Outline, Point};

use hints::check_masters;
use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{
    context::Context,
    stream::{Reader, Writer},
    VfbError,
};

const GLYPH_CONSTANT: [u8; 4] = [1, 9, 7, 1];

const NAME: u8 = 0x01;
const METRICS: u8 = 0x02;
const HINTS: u8 = 0x03;
const GUIDES: u8 = 0x04;
const COMPONENTS: u8 = 0x05;
const KERNING: u8 = 0x06;
const OUTLINES: u8 = 0x08;
const IMPORTED: u8 = 0x09;
const INSTRUCTIONS: u8 = 0x0A;
const END: u8 = 0x0F;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub gid: i32,
    #[serde(rename = "offsetX")]
    pub offset_x: Vec<i32>,
    #[serde(rename = "offsetY")]
    pub offset_y: Vec<i32>,
    #[serde(rename = "scaleX")]
    pub scale_x: Vec<f64>,
    #[serde(rename = "scaleY")]
    pub scale_y: Vec<f64>,
}

/// A decoded "Glyph" entry.
///
/// Every part is optional because a glyph record only carries the
/// sub-records that were written for it; a part that was present but empty
/// is kept as `Some` so that it is written back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Glyph {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outline: Option<Outline>,
    /// Advance width and height per master.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Vec<(i32, i32)>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hints: Option<Hints>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guides: Option<Guides>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<Component>>,
    /// Right-hand glyph index to one value per master.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kerning: Option<IndexMap<i32, Vec<i32>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imported: Option<ImportedGlyph>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tth: Option<Instructions>,
}

impl Glyph {
    pub fn new(name: impl Into<String>, num_masters: usize) -> Self {
        Glyph {
            name: Some(name.into()),
            outline: Some(Outline::new(num_masters)),
            ..Default::default()
        }
    }

    /// The number of masters the per-master arrays are sized by.
    pub fn num_masters(&self, context: &Context) -> usize {
        self.outline
            .as_ref()
            .map(|o| o.num_masters)
            .unwrap_or(context.master_count)
    }

    /// Absolute points of one master, split into contours.
    pub fn contours(&self, master: usize) -> Vec<Vec<(NodeKind, Point)>> {
        self.outline
            .as_ref()
            .map(|o| o.contours(master))
            .unwrap_or_default()
    }

    pub fn decode(data: &[u8], context: &Context) -> Result<Self, VfbError> {
        let mut reader = Reader::new(data);
        let glyph = Glyph::decode_from(&mut reader, context)?;
        if !reader.is_empty() {
            return Err(VfbError::UnderOverConsumption {
                key: "Glyph".to_string(),
                length: reader.len(),
                position: reader.position(),
            });
        }
        Ok(glyph)
    }

    pub(crate) fn decode_from(reader: &mut Reader, context: &Context) -> Result<Self, VfbError> {
        let constant: [u8; 4] = reader.read_array()?;
        if constant != GLYPH_CONSTANT {
            warn!("Unexpected glyph constant {:?}", constant);
        }
        let mut glyph = Glyph::default();
        let mut masters = context.master_count;
        // Set once a sub-record sized by `masters` has been read
        let mut per_master_read = false;
        loop {
            let tag = reader.read_u8()?;
            match tag {
                NAME => glyph.name = Some(reader.str_with_len(context.encoding)?),
                METRICS => {
                    per_master_read = true;
                    let mut metrics = Vec::with_capacity(masters.min(reader.remaining()));
                    for _ in 0..masters {
                        metrics.push((reader.value()?, reader.value()?));
                    }
                    glyph.metrics = Some(metrics);
                }
                HINTS => {
                    per_master_read = true;
                    glyph.hints = Some(Hints::decode(reader, masters)?);
                }
                GUIDES => {
                    per_master_read = true;
                    glyph.guides = Some(Guides::decode(reader, masters)?);
                }
                COMPONENTS => {
                    per_master_read = true;
                    glyph.components = Some(decode_components(reader, masters)?);
                }
                KERNING => {
                    per_master_read = true;
                    let num = reader.count()?;
                    let mut kerning = IndexMap::new();
                    for _ in 0..num {
                        let gid = reader.value()?;
                        let mut values = Vec::with_capacity(masters.min(reader.remaining()));
                        for _ in 0..masters {
                            values.push(reader.value()?);
                        }
                        kerning.insert(gid, values);
                    }
                    glyph.kerning = Some(kerning);
                }
                OUTLINES => {
                    let outline = Outline::decode(reader)?;
                    if per_master_read && outline.num_masters != masters {
                        return Err(VfbError::invalid(
                            "glyph master count",
                            format!(
                                "outline has {} masters after data for {}",
                                outline.num_masters, masters
                            ),
                        ));
                    }
                    if outline.num_masters != context.master_count {
                        warn!(
                            "Glyph {:?} has {} masters, the font has {}",
                            glyph.name, outline.num_masters, context.master_count
                        );
                    }
                    masters = outline.num_masters;
                    glyph.outline = Some(outline);
                }
                IMPORTED => glyph.imported = Some(ImportedGlyph::decode(reader)?),
                INSTRUCTIONS => glyph.tth = Some(Instructions::decode(reader)?),
                END => break,
                _ => return Err(VfbError::UnknownSubRecord { tag }),
            }
        }
        Ok(glyph)
    }

    pub fn encode(&self, context: &Context) -> Result<Vec<u8>, VfbError> {
        let masters = self.num_masters(context);
        let mut w = Writer::new();
        w.write_bytes(&GLYPH_CONSTANT);

        if let Some(name) = &self.name {
            debug!("Compiling glyph '{}'", name);
            w.write_u8(NAME);
            w.str_with_len(name, context.encoding)?;
        }
        if let Some(outline) = &self.outline {
            w.write_u8(OUTLINES);
            outline.encode(&mut w)?;
        }
        if let Some(metrics) = &self.metrics {
            check_masters("glyph metrics", metrics.len(), masters)?;
            w.write_u8(METRICS);
            for (x, y) in metrics {
                w.value(*x);
                w.value(*y);
            }
        }
        if let Some(hints) = &self.hints {
            w.write_u8(HINTS);
            hints.encode(&mut w, masters)?;
        }
        if let Some(guides) = &self.guides {
            w.write_u8(GUIDES);
            guides.encode(&mut w, masters)?;
        }
        if let Some(components) = &self.components {
            w.write_u8(COMPONENTS);
            encode_components(components, &mut w, masters)?;
        }
        if let Some(kerning) = &self.kerning {
            w.write_u8(KERNING);
            w.count(kerning.len())?;
            for (gid, values) in kerning {
                check_masters("kerning", values.len(), masters)?;
                w.value(*gid);
                for value in values {
                    w.value(*value);
                }
            }
        }
        if let Some(imported) = &self.imported {
            w.write_u8(IMPORTED);
            imported.encode(&mut w)?;
        }
        if let Some(tth) = &self.tth {
            w.write_u8(INSTRUCTIONS);
            tth.encode(&mut w)?;
        }
        w.write_u8(END);
        Ok(w.into_inner())
    }
}

fn decode_components(reader: &mut Reader, masters: usize) -> Result<Vec<Component>, VfbError> {
    let num = reader.count()?;
    let mut components = vec![];
    for _ in 0..num {
        let mut component = Component {
            gid: reader.value()?,
            offset_x: vec![],
            offset_y: vec![],
            scale_x: vec![],
            scale_y: vec![],
        };
        for _ in 0..masters {
            component.offset_x.push(reader.value()?);
            component.offset_y.push(reader.value()?);
            component.scale_x.push(reader.read_f64()?);
            component.scale_y.push(reader.read_f64()?);
        }
        components.push(component);
    }
    Ok(components)
}

fn encode_components(
    components: &[Component],
    w: &mut Writer,
    masters: usize,
) -> Result<(), VfbError> {
    w.count(components.len())?;
    for component in components {
        for len in [
            component.offset_x.len(),
            component.offset_y.len(),
            component.scale_x.len(),
            component.scale_y.len(),
        ] {
            check_masters("component", len, masters)?;
        }
        w.value(component.gid);
        for m in 0..masters {
            w.value(component.offset_x[m]);
            w.value(component.offset_y[m]);
            w.write_f64(component.scale_x[m]);
            w.write_f64(component.scale_y[m]);
        }
    }
    Ok(())
}
