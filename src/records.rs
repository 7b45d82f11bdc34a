//! Payload codecs for every entry type, and the [`Record`] values they
//! produce.

use std::fmt::Display;

use indexmap::IndexMap;
use serde::Serialize;

use crate::{
    context::Context,
    glyph::{Glyph, Guides, Outline},
    serde_helpers::hex_bytes,
    stream::{Reader, Writer},
    VfbError,
};

mod bitmap;
mod glyphdata;
mod guides;
mod mm;
mod numeric;
mod options;
mod pclt;
mod postscript;
mod strings;
mod truetype;

pub use bitmap::{rle_pack, rle_unpack, GlyphBitmap, Image};
pub use glyphdata::{
    AnchorSupplement, Gdef, GdefAnchor, GlyphClass, GlyphOrigin, Links, Mask, MmAnchor, MmAnchors,
};
pub use guides::{GuideProperties, GuideProperty};
pub use mm::{MasterLocation, PrimaryInstance};
pub use options::{AutoHintOptions, ExpandKernFlags, FontOptions, MappingMode};
pub use pclt::Pclt;
pub use postscript::{BoundingBox, GlyphHintingOptions, PsHintingOptions, PsInfo};
pub use strings::{CustomCmap, GlyphEncoding, NameRecord, TrueTypeTable};
pub use truetype::{
    CodePages, GaspRange, HeadFlags, StemPpems, TtInfo, TtInfoValue, TtStem, TtStems, TtZone,
    TtZones, VdmxRecord, ZoneDeltas,
};

/// The set bit numbers of `bits`, lowest first.
pub(crate) fn bits_to_list(bits: u128) -> Vec<u32> {
    (0..128).filter(|bit| bits & (1 << bit) != 0).collect()
}

pub(crate) fn bits_from_list(what: &str, bits: &[u32], width: u32) -> Result<u128, VfbError> {
    let mut value = 0u128;
    for bit in bits {
        if *bit >= width {
            return Err(VfbError::invalid(
                what,
                format!("bit {} does not fit in {} bits", bit, width),
            ));
        }
        value |= 1 << bit;
    }
    Ok(value)
}

/// Convert to a narrower integer type, failing instead of truncating.
pub(crate) fn narrow<T, U>(what: &str, v: U) -> Result<T, VfbError>
where
    T: TryFrom<U>,
    U: Copy + Display,
{
    T::try_from(v).map_err(|_| VfbError::invalid(what, format!("{} is out of range", v)))
}

/// The payload format of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    U16,
    I16,
    I32,
    F64,
    F64List,
    U32List,
    U16List,
    Panose,
    UnicodeRanges,
    Fl3Type1410,
    Text,
    Vendor,
    GlyphEncoding,
    Features,
    NameRecords,
    CustomCmaps,
    /// Named classes with this many flag values each.
    ClassFlags(usize),
    Hex,
    TrueTypeTable,
    Gasp,
    Vdmx,
    TtInfo,
    TtStems,
    TtStemPpems,
    TtStemPpems23,
    TtStemPpems1,
    TtZones,
    TtZoneDeltas,
    PsInfo,
    PsHintingOptions,
    GlyphHintingOptions,
    MasterLocation,
    AxisMappingsCount,
    AxisMappings,
    Anisotropic,
    PrimaryInstances,
    CountedValues,
    Values,
    Pclt,
    FontOptions,
    ExportOptions,
    MappingMode,
    GlobalGuides,
    GuideProperties,
    Glyph,
    Links,
    Image,
    GlyphBitmaps,
    Sketch,
    Mask,
    GlobalMask,
    MaskMetrics,
    MaskMetricsMm,
    GlyphOrigin,
    Gdef,
    AnchorsSupp,
    AnchorsMm,
}

/// A decoded entry payload.
///
/// Serializes to the plain shape of the contained value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Int(i32),
    Float(f64),
    Floats(Vec<f64>),
    Ints(Vec<i32>),
    UInts(Vec<u32>),
    Text(String),
    Lines(Vec<String>),
    Bytes(#[serde(serialize_with = "hex_bytes")] Vec<u8>),
    GlyphEncoding(GlyphEncoding),
    NameRecords(Vec<NameRecord>),
    CustomCmaps(Vec<CustomCmap>),
    ClassFlags(IndexMap<String, Vec<i32>>),
    TrueTypeTable(TrueTypeTable),
    Gasp(Vec<GaspRange>),
    Vdmx(Vec<VdmxRecord>),
    TtInfo(TtInfo),
    TtStems(TtStems),
    StemPpems(StemPpems),
    TtZones(TtZones),
    ZoneDeltas(ZoneDeltas),
    PsInfo(Box<PsInfo>),
    PsHintingOptions(PsHintingOptions),
    GlyphHintingOptions(GlyphHintingOptions),
    MasterLocation(MasterLocation),
    AxisMappings(Vec<(f64, f64)>),
    Anisotropic(Vec<Vec<(i32, i32)>>),
    PrimaryInstances(Vec<PrimaryInstance>),
    Pclt(Box<Pclt>),
    FontOptions(FontOptions),
    Flags(Vec<String>),
    MappingMode(MappingMode),
    Guides(Guides),
    GuideProperties(GuideProperties),
    Glyph(Box<Glyph>),
    Links(Links),
    Image(Image),
    Bitmaps(Vec<GlyphBitmap>),
    Triples(Vec<(i32, i32, i32)>),
    Mask(Mask),
    Outline(Outline),
    Pairs(Vec<(i32, i32)>),
    Origin(GlyphOrigin),
    Gdef(Gdef),
    AnchorsSupp(Vec<AnchorSupplement>),
    AnchorsMm(MmAnchors),
}

impl Record {
    pub fn as_glyph(&self) -> Option<&Glyph> {
        match self {
            Record::Glyph(glyph) => Some(glyph),
            _ => None,
        }
    }

    pub fn as_glyph_mut(&mut self) -> Option<&mut Glyph> {
        match self {
            Record::Glyph(glyph) => Some(glyph),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Record::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Record::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl Codec {
    /// Decode a whole entry payload. The decoder must consume exactly all of
    /// `data`; `key` names the entry in errors.
    pub fn decode_payload(self, key: &str, data: &[u8], ctx: &Context) -> Result<Record, VfbError> {
        let mut r = Reader::new(data);
        let consumption = |position| VfbError::UnderOverConsumption {
            key: key.to_string(),
            length: data.len(),
            position,
        };
        match self.decode(&mut r, ctx) {
            Ok(_) if !r.is_empty() => Err(consumption(r.position())),
            Ok(record) => Ok(record),
            Err(VfbError::Truncated { offset, wanted }) => Err(consumption(offset + wanted)),
            Err(VfbError::EndOfData) if r.is_empty() => Err(consumption(data.len() + 1)),
            Err(e) => Err(e),
        }
    }

    fn decode(self, r: &mut Reader, ctx: &Context) -> Result<Record, VfbError> {
        Ok(match self {
            Codec::U16 => Record::Int(r.read_u16()? as i32),
            Codec::I16 => Record::Int(r.read_i16()? as i32),
            Codec::I32 => Record::Int(r.read_i32()?),
            Codec::F64 => Record::Float(r.read_f64()?),
            Codec::F64List => Record::Floats(numeric::f64_list(r)?),
            Codec::U32List => Record::UInts(numeric::u32_list(r)?),
            Codec::U16List => Record::UInts(numeric::u16_list(r)?),
            Codec::Panose => Record::Ints(numeric::panose(r)?),
            Codec::UnicodeRanges => Record::UInts(numeric::unicode_ranges(r)?),
            Codec::Fl3Type1410 => Record::Ints(numeric::fl3_1410(r)?),
            Codec::Text | Codec::Vendor => Record::Text(strings::text(r, ctx)?),
            Codec::GlyphEncoding => Record::GlyphEncoding(GlyphEncoding::decode(r, ctx)?),
            Codec::Features => Record::Lines(strings::feature_lines(r, ctx)?),
            Codec::NameRecords => Record::NameRecords(strings::name_records(r)?),
            Codec::CustomCmaps => Record::CustomCmaps(strings::custom_cmaps(r, ctx)?),
            Codec::ClassFlags(n) => Record::ClassFlags(strings::class_flags(r, n, ctx)?),
            Codec::Hex => Record::Bytes(r.read_rest().to_vec()),
            Codec::TrueTypeTable => Record::TrueTypeTable(TrueTypeTable::decode(r)?),
            Codec::Gasp => Record::Gasp(truetype::gasp(r)?),
            Codec::Vdmx => Record::Vdmx(truetype::vdmx(r)?),
            Codec::TtInfo => Record::TtInfo(TtInfo::decode(r)?),
            Codec::TtStems => Record::TtStems(TtStems::decode(r, ctx)?),
            Codec::TtStemPpems => Record::StemPpems(StemPpems::decode(r, 4, None)?),
            Codec::TtStemPpems23 => Record::StemPpems(StemPpems::decode(r, 2, None)?),
            Codec::TtStemPpems1 => {
                let counts = truetype::stem_counts(ctx)?;
                Record::StemPpems(StemPpems::decode(r, 1, Some(counts))?)
            }
            Codec::TtZones => Record::TtZones(TtZones::decode(r, ctx)?),
            Codec::TtZoneDeltas => Record::ZoneDeltas(truetype::zone_deltas(r)?),
            Codec::PsInfo => Record::PsInfo(Box::new(PsInfo::decode(r)?)),
            Codec::PsHintingOptions => Record::PsHintingOptions(PsHintingOptions::decode(r)?),
            Codec::GlyphHintingOptions => {
                Record::GlyphHintingOptions(GlyphHintingOptions::decode(r)?)
            }
            Codec::MasterLocation => Record::MasterLocation(MasterLocation::decode(r)?),
            Codec::AxisMappingsCount => {
                let mut counts = Vec::with_capacity(4);
                for _ in 0..4 {
                    counts.push(r.read_u32()?);
                }
                Record::UInts(counts)
            }
            Codec::AxisMappings => Record::AxisMappings(mm::axis_mappings(r)?),
            Codec::Anisotropic => Record::Anisotropic(mm::anisotropic(r)?),
            Codec::PrimaryInstances => Record::PrimaryInstances(mm::primary_instances(r, ctx)?),
            Codec::CountedValues => Record::Ints(numeric::counted_values(r)?),
            Codec::Values => Record::Ints(numeric::value_list(r)?),
            Codec::Pclt => Record::Pclt(Box::new(Pclt::decode(r)?)),
            Codec::FontOptions => Record::FontOptions(FontOptions::decode(r)?),
            Codec::ExportOptions => Record::Flags(options::export_options(r)?),
            Codec::MappingMode => Record::MappingMode(MappingMode::decode(r)?),
            Codec::GlobalGuides => Record::Guides(Guides::decode(r, ctx.master_count)?),
            Codec::GuideProperties => Record::GuideProperties(GuideProperties::decode(r, ctx)?),
            Codec::Glyph => Record::Glyph(Box::new(Glyph::decode_from(r, ctx)?)),
            Codec::Links => Record::Links(Links::decode(r)?),
            Codec::Image => Record::Image(Image::decode(r)?),
            Codec::GlyphBitmaps => Record::Bitmaps(bitmap::glyph_bitmaps(r)?),
            Codec::Sketch => Record::Triples(glyphdata::sketch(r)?),
            Codec::Mask => Record::Mask(Mask::decode(r)?),
            Codec::GlobalMask => Record::Outline(Outline::decode(r)?),
            Codec::MaskMetrics => Record::Ints(glyphdata::mask_metrics(r)?),
            Codec::MaskMetricsMm => Record::Pairs(glyphdata::mask_metrics_mm(r, ctx)?),
            Codec::GlyphOrigin => Record::Origin(GlyphOrigin::decode(r)?),
            Codec::Gdef => Record::Gdef(Gdef::decode(r, ctx)?),
            Codec::AnchorsSupp => Record::AnchorsSupp(glyphdata::anchors_supp(r)?),
            Codec::AnchorsMm => Record::AnchorsMm(MmAnchors::decode(r)?),
        })
    }

    /// Encode `record` in this format. Fails with
    /// [`VfbError::RecordMismatch`] if the record has a different shape.
    pub fn encode(self, key: &str, record: &Record, ctx: &Context) -> Result<Vec<u8>, VfbError> {
        let mut w = Writer::new();
        match (self, record) {
            (Codec::U16, Record::Int(v)) => w.write_u16(narrow(key, *v)?),
            (Codec::I16, Record::Int(v)) => w.write_i16(narrow(key, *v)?),
            (Codec::I32, Record::Int(v)) => w.write_i32(*v),
            (Codec::F64, Record::Float(v)) => w.write_f64(*v),
            (Codec::F64List, Record::Floats(values)) => {
                for v in values {
                    w.write_f64(*v);
                }
            }
            (Codec::U32List, Record::UInts(values)) => {
                for v in values {
                    w.write_u32(*v);
                }
            }
            (Codec::U16List, Record::UInts(values)) => numeric::write_u16_list(values, &mut w)?,
            (Codec::Panose, Record::Ints(values)) => numeric::write_panose(values, &mut w)?,
            (Codec::UnicodeRanges, Record::UInts(bits)) => {
                numeric::write_unicode_ranges(bits, &mut w)?
            }
            (Codec::Fl3Type1410, Record::Ints(values)) => {
                numeric::write_i16s(key, values, 5, &mut w)?
            }
            (Codec::Text, Record::Text(s)) => strings::write_text(s, 0, &mut w, ctx)?,
            (Codec::Vendor, Record::Text(s)) => strings::write_text(s, 4, &mut w, ctx)?,
            (Codec::GlyphEncoding, Record::GlyphEncoding(e)) => e.encode(&mut w, ctx)?,
            (Codec::Features, Record::Lines(lines)) => {
                strings::write_feature_lines(lines, &mut w, ctx)?
            }
            (Codec::NameRecords, Record::NameRecords(records)) => {
                strings::write_name_records(records, &mut w)?
            }
            (Codec::CustomCmaps, Record::CustomCmaps(cmaps)) => {
                strings::write_custom_cmaps(cmaps, &mut w, ctx)?
            }
            (Codec::ClassFlags(n), Record::ClassFlags(classes)) => {
                strings::write_class_flags(classes, n, &mut w, ctx)?
            }
            (Codec::Hex, Record::Bytes(bytes)) => w.write_bytes(bytes),
            (Codec::TrueTypeTable, Record::TrueTypeTable(table)) => table.encode(&mut w)?,
            (Codec::Gasp, Record::Gasp(ranges)) => truetype::write_gasp(ranges, &mut w),
            (Codec::Vdmx, Record::Vdmx(records)) => truetype::write_vdmx(records, &mut w)?,
            (Codec::TtInfo, Record::TtInfo(info)) => info.encode(&mut w)?,
            (Codec::TtStems, Record::TtStems(stems)) => stems.encode(&mut w, ctx)?,
            (Codec::TtStemPpems, Record::StemPpems(ppems)) => ppems.encode(&mut w, 4, None)?,
            (Codec::TtStemPpems23, Record::StemPpems(ppems)) => ppems.encode(&mut w, 2, None)?,
            (Codec::TtStemPpems1, Record::StemPpems(ppems)) => {
                ppems.encode(&mut w, 1, Some(truetype::stem_counts(ctx)?))?
            }
            (Codec::TtZones, Record::TtZones(zones)) => zones.encode(&mut w, ctx)?,
            (Codec::TtZoneDeltas, Record::ZoneDeltas(deltas)) => {
                truetype::write_zone_deltas(deltas, &mut w)?
            }
            (Codec::PsInfo, Record::PsInfo(info)) => info.encode(&mut w),
            (Codec::PsHintingOptions, Record::PsHintingOptions(o)) => o.encode(&mut w)?,
            (Codec::GlyphHintingOptions, Record::GlyphHintingOptions(o)) => o.encode(&mut w)?,
            (Codec::MasterLocation, Record::MasterLocation(location)) => location.encode(&mut w),
            (Codec::AxisMappingsCount, Record::UInts(counts)) if counts.len() == 4 => {
                for v in counts {
                    w.write_u32(*v);
                }
            }
            (Codec::AxisMappings, Record::AxisMappings(mappings)) => {
                mm::write_axis_mappings(mappings, &mut w)
            }
            (Codec::Anisotropic, Record::Anisotropic(axes)) => mm::write_anisotropic(axes, &mut w)?,
            (Codec::PrimaryInstances, Record::PrimaryInstances(instances)) => {
                mm::write_primary_instances(instances, &mut w, ctx)?
            }
            (Codec::CountedValues, Record::Ints(values)) => {
                numeric::write_counted_values(values, &mut w)?
            }
            (Codec::Values, Record::Ints(values)) => {
                for v in values {
                    w.value(*v);
                }
            }
            (Codec::Pclt, Record::Pclt(pclt)) => pclt.encode(&mut w)?,
            (Codec::FontOptions, Record::FontOptions(o)) => o.encode(&mut w)?,
            (Codec::ExportOptions, Record::Flags(flags)) => {
                options::write_export_options(flags, &mut w)?
            }
            (Codec::MappingMode, Record::MappingMode(mode)) => mode.encode(&mut w)?,
            (Codec::GlobalGuides, Record::Guides(guides)) => {
                guides.encode(&mut w, ctx.master_count)?
            }
            (Codec::GuideProperties, Record::GuideProperties(p)) => p.encode(&mut w, ctx)?,
            (Codec::Glyph, Record::Glyph(glyph)) => w.write_bytes(&glyph.encode(ctx)?),
            (Codec::Links, Record::Links(links)) => links.encode(&mut w)?,
            (Codec::Image, Record::Image(image)) => image.encode(&mut w)?,
            (Codec::GlyphBitmaps, Record::Bitmaps(bitmaps)) => {
                bitmap::write_glyph_bitmaps(bitmaps, &mut w)?
            }
            (Codec::Sketch, Record::Triples(triples)) => glyphdata::write_sketch(triples, &mut w)?,
            (Codec::Mask, Record::Mask(mask)) => mask.encode(&mut w)?,
            (Codec::GlobalMask, Record::Outline(outline)) => outline.encode(&mut w)?,
            (Codec::MaskMetrics, Record::Ints(values)) => {
                numeric::write_i16s(key, values, 2, &mut w)?
            }
            (Codec::MaskMetricsMm, Record::Pairs(pairs)) => {
                glyphdata::write_mask_metrics_mm(pairs, &mut w, ctx)?
            }
            (Codec::GlyphOrigin, Record::Origin(origin)) => origin.encode(&mut w),
            (Codec::Gdef, Record::Gdef(gdef)) => gdef.encode(&mut w, ctx)?,
            (Codec::AnchorsSupp, Record::AnchorsSupp(anchors)) => {
                glyphdata::write_anchors_supp(anchors, &mut w)?
            }
            (Codec::AnchorsMm, Record::AnchorsMm(anchors)) => anchors.encode(&mut w)?,
            _ => {
                return Err(VfbError::RecordMismatch {
                    key: key.to_string(),
                })
            }
        }
        Ok(w.into_inner())
    }
}
