//! Records that follow a Glyph entry and add to it: links, masks, anchors,
//! GDEF data and the like.

use serde::{Deserialize, Serialize};

use crate::{
    context::Context,
    glyph::Outline,
    stream::{Reader, Writer},
    VfbError,
};

fn read_pairs(r: &mut Reader) -> Result<Vec<(i32, i32)>, VfbError> {
    let count = r.count()?;
    let mut pairs = Vec::with_capacity(count.min(r.remaining()));
    for _ in 0..count {
        pairs.push((r.value()?, r.value()?));
    }
    Ok(pairs)
}

fn write_pairs(pairs: &[(i32, i32)], w: &mut Writer) -> Result<(), VfbError> {
    w.count(pairs.len())?;
    for (a, b) in pairs {
        w.value(*a);
        w.value(*b);
    }
    Ok(())
}

/// TrueType hinting links between node indices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    pub x: Vec<(i32, i32)>,
    pub y: Vec<(i32, i32)>,
}

impl Links {
    pub(crate) fn decode(r: &mut Reader) -> Result<Self, VfbError> {
        let y = read_pairs(r)?;
        let x = read_pairs(r)?;
        Ok(Links { x, y })
    }

    pub(crate) fn encode(&self, w: &mut Writer) -> Result<(), VfbError> {
        write_pairs(&self.y, w)?;
        write_pairs(&self.x, w)
    }
}

pub(crate) fn sketch(r: &mut Reader) -> Result<Vec<(i32, i32, i32)>, VfbError> {
    let count = r.value_unsigned()? as usize;
    let mut triples = Vec::with_capacity(count.min(r.remaining()));
    for _ in 0..count {
        triples.push((r.value()?, r.value()?, r.value()?));
    }
    Ok(triples)
}

pub(crate) fn write_sketch(triples: &[(i32, i32, i32)], w: &mut Writer) -> Result<(), VfbError> {
    w.count(triples.len())?;
    for (a, b, c) in triples {
        w.value(*a);
        w.value(*b);
        w.value(*c);
    }
    Ok(())
}

/// A glyph's mask layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mask {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reserved: Vec<i32>,
    pub outline: Outline,
}

impl Mask {
    pub(crate) fn decode(r: &mut Reader) -> Result<Self, VfbError> {
        let num = r.count()?;
        let mut reserved = Vec::with_capacity(num.min(r.remaining()));
        for _ in 0..num {
            reserved.push(r.value()?);
        }
        Ok(Mask {
            reserved,
            outline: Outline::decode(r)?,
        })
    }

    pub(crate) fn encode(&self, w: &mut Writer) -> Result<(), VfbError> {
        w.count(self.reserved.len())?;
        for v in &self.reserved {
            w.value(*v);
        }
        self.outline.encode(w)
    }
}

/// Mask advance width and height of the first master.
pub(crate) fn mask_metrics(r: &mut Reader) -> Result<Vec<i32>, VfbError> {
    Ok(vec![r.read_i16()? as i32, r.read_i16()? as i32])
}

/// Mask advance width and height of every master but the first.
pub(crate) fn mask_metrics_mm(r: &mut Reader, ctx: &Context) -> Result<Vec<(i32, i32)>, VfbError> {
    let count = ctx.master_count.saturating_sub(1);
    let mut pairs = Vec::with_capacity(count);
    for _ in 0..count {
        pairs.push((r.value()?, r.value()?));
    }
    Ok(pairs)
}

pub(crate) fn write_mask_metrics_mm(
    pairs: &[(i32, i32)],
    w: &mut Writer,
    ctx: &Context,
) -> Result<(), VfbError> {
    let expected = ctx.master_count.saturating_sub(1);
    if pairs.len() != expected {
        return Err(VfbError::invalid(
            "mask metrics",
            format!("{} masters instead of {}", pairs.len(), expected),
        ));
    }
    for (x, y) in pairs {
        w.value(*x);
        w.value(*y);
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlyphOrigin {
    pub x: i16,
    pub y: i16,
}

impl GlyphOrigin {
    pub(crate) fn decode(r: &mut Reader) -> Result<Self, VfbError> {
        Ok(GlyphOrigin {
            x: r.read_i16()?,
            y: r.read_i16()?,
        })
    }

    pub(crate) fn encode(&self, w: &mut Writer) {
        w.write_i16(self.x);
        w.write_i16(self.y);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlyphClass {
    #[default]
    Unassigned,
    Base,
    Ligature,
    Mark,
    Component,
}

const GLYPH_CLASSES: [GlyphClass; 5] = [
    GlyphClass::Unassigned,
    GlyphClass::Base,
    GlyphClass::Ligature,
    GlyphClass::Mark,
    GlyphClass::Component,
];

impl GlyphClass {
    fn is_unassigned(&self) -> bool {
        *self == GlyphClass::Unassigned
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GdefAnchor {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub x: i32,
    pub x1: i32,
    pub y: i32,
    pub y1: i32,
}

/// The glyph's OpenType GDEF class, anchors and ligature carets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gdef {
    #[serde(default, skip_serializing_if = "GlyphClass::is_unassigned")]
    pub glyph_class: GlyphClass,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub anchors: Vec<GdefAnchor>,
    /// (position, unknown) pairs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub carets: Vec<(i32, i32)>,
    /// A trailing value list that older files leave out entirely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unknown: Option<Vec<i32>>,
}

impl Gdef {
    pub(crate) fn decode(r: &mut Reader, ctx: &Context) -> Result<Self, VfbError> {
        let class_index = r.value()?;
        let glyph_class = usize::try_from(class_index)
            .ok()
            .and_then(|i| GLYPH_CLASSES.get(i).copied())
            .ok_or_else(|| VfbError::invalid("GDEF glyph class", class_index.to_string()))?;

        let count = r.count()?;
        let mut anchors = Vec::with_capacity(count.min(r.remaining()));
        for _ in 0..count {
            anchors.push(GdefAnchor {
                name: r.str_with_len(ctx.encoding)?,
                x: r.value()?,
                x1: r.value()?,
                y: r.value()?,
                y1: r.value()?,
            });
        }
        let carets = read_pairs(r)?;

        let unknown = if r.is_empty() {
            None
        } else {
            let count = r.count()?;
            let mut values = Vec::with_capacity(count.min(r.remaining()));
            for _ in 0..count {
                values.push(r.value()?);
            }
            Some(values)
        };
        Ok(Gdef {
            glyph_class,
            anchors,
            carets,
            unknown,
        })
    }

    pub(crate) fn encode(&self, w: &mut Writer, ctx: &Context) -> Result<(), VfbError> {
        w.count(self.glyph_class as usize)?;
        w.count(self.anchors.len())?;
        for anchor in &self.anchors {
            w.str_with_len(&anchor.name, ctx.encoding)?;
            for v in [anchor.x, anchor.x1, anchor.y, anchor.y1] {
                w.value(v);
            }
        }
        write_pairs(&self.carets, w)?;
        if let Some(values) = &self.unknown {
            w.count(values.len())?;
            for v in values {
                w.value(*v);
            }
        }
        Ok(())
    }
}

/// Display color of an anchor, and a value with no known meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorSupplement {
    pub hue: i32,
    pub reserved: i32,
}

pub(crate) fn anchors_supp(r: &mut Reader) -> Result<Vec<AnchorSupplement>, VfbError> {
    Ok(read_pairs(r)?
        .into_iter()
        .map(|(hue, reserved)| AnchorSupplement { hue, reserved })
        .collect())
}

pub(crate) fn write_anchors_supp(anchors: &[AnchorSupplement], w: &mut Writer) -> Result<(), VfbError> {
    w.count(anchors.len())?;
    for anchor in anchors {
        w.value(anchor.hue);
        w.value(anchor.reserved);
    }
    Ok(())
}

/// Anchor positions, indexed by master.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MmAnchor {
    pub x: Vec<i32>,
    pub y: Vec<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MmAnchors {
    pub num_masters: usize,
    pub anchors: Vec<MmAnchor>,
}

impl MmAnchors {
    pub(crate) fn decode(r: &mut Reader) -> Result<Self, VfbError> {
        let count = r.count()?;
        let num_masters = r.count()?;
        let mut anchors = Vec::with_capacity(count.min(r.remaining()));
        for _ in 0..count {
            let mut anchor = MmAnchor::default();
            for _ in 0..num_masters {
                anchor.x.push(r.value()?);
                anchor.y.push(r.value()?);
            }
            anchors.push(anchor);
        }
        Ok(MmAnchors {
            num_masters,
            anchors,
        })
    }

    pub(crate) fn encode(&self, w: &mut Writer) -> Result<(), VfbError> {
        w.count(self.anchors.len())?;
        w.count(self.num_masters)?;
        for (i, anchor) in self.anchors.iter().enumerate() {
            if anchor.x.len() != self.num_masters || anchor.y.len() != self.num_masters {
                return Err(VfbError::invalid(
                    format!("anchor {}", i),
                    format!("positions for {} masters expected", self.num_masters),
                ));
            }
            for (x, y) in anchor.x.iter().zip(&anchor.y) {
                w.value(*x);
                w.value(*y);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::glyph::NodeKind;
    use crate::serde_helpers::from_hex;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_links() {
        let data = from_hex("8c 8d 90 8c 8b 8c").unwrap();
        let links = Links::decode(&mut Reader::new(&data)).unwrap();
        assert_eq!(links.y, vec![(2, 5)]);
        assert_eq!(links.x, vec![(0, 1)]);
        let mut w = Writer::new();
        links.encode(&mut w).unwrap();
        assert_eq!(w.into_inner(), data);
    }

    #[test]
    fn test_mask() {
        let data = from_hex("8c 90 8c 91 8c 00 95 9f").unwrap();
        let mut reader = Reader::new(&data);
        let mask = Mask::decode(&mut reader).unwrap();
        assert!(reader.is_empty());
        assert_eq!(mask.reserved, vec![5]);
        assert_eq!(mask.outline.num_masters, 1);
        assert_eq!(mask.outline.nodes[0].kind, NodeKind::Move);
        assert_eq!(mask.outline.nodes[0].points, vec![vec![(10, 20)]]);
        let mut w = Writer::new();
        mask.encode(&mut w).unwrap();
        assert_eq!(w.into_inner(), data);
    }

    #[test]
    fn test_mask_metrics_mm() {
        let ctx = Context::with_masters(3);
        let data = from_hex("f8ec 8b f8f6 8b").unwrap();
        let pairs = mask_metrics_mm(&mut Reader::new(&data), &ctx).unwrap();
        assert_eq!(pairs, vec![(600, 0), (610, 0)]);
        let mut w = Writer::new();
        write_mask_metrics_mm(&pairs, &mut w, &ctx).unwrap();
        assert_eq!(w.into_inner(), data);
        assert!(write_mask_metrics_mm(&pairs, &mut Writer::new(), &Context::default()).is_err());
    }

    #[test]
    fn test_gdef() {
        let ctx = Context::default();
        // mark, one anchor "top" at (250, 700), no carets, no trailing list
        let data = from_hex("8e 8c 8e 746f70 f78e 8a f950 8a 8b").unwrap();
        let mut reader = Reader::new(&data);
        let gdef = Gdef::decode(&mut reader, &ctx).unwrap();
        assert!(reader.is_empty());
        assert_eq!(gdef.glyph_class, GlyphClass::Mark);
        assert_eq!(
            gdef.anchors,
            vec![GdefAnchor {
                name: "top".to_string(),
                x: 250,
                x1: -1,
                y: 700,
                y1: -1,
            }]
        );
        assert_eq!(gdef.unknown, None);
        let mut w = Writer::new();
        gdef.encode(&mut w, &ctx).unwrap();
        assert_eq!(w.into_inner(), data);

        // An empty trailing list is kept
        let data = from_hex("8b 8b 8b 8b").unwrap();
        let gdef = Gdef::decode(&mut Reader::new(&data), &ctx).unwrap();
        assert_eq!(gdef.unknown, Some(vec![]));
        let mut w = Writer::new();
        gdef.encode(&mut w, &ctx).unwrap();
        assert_eq!(w.into_inner(), data);

        assert!(Gdef::decode(&mut Reader::new(&from_hex("90 8b 8b").unwrap()), &ctx).is_err());
    }

    #[test]
    fn test_mm_anchors() {
        let data = from_hex("8c 8d f8ec f950 8b 8b").unwrap();
        let anchors = MmAnchors::decode(&mut Reader::new(&data)).unwrap();
        assert_eq!(anchors.num_masters, 2);
        assert_eq!(anchors.anchors[0].x, vec![600, 0]);
        assert_eq!(anchors.anchors[0].y, vec![700, 0]);
        let mut w = Writer::new();
        anchors.encode(&mut w).unwrap();
        assert_eq!(w.into_inner(), data);
    }
}
