//! Entry tags, their names and the codec each one uses.

use serde::{Serialize, Serializer};
use smol_str::SmolStr;

use crate::records::Codec;

macro_rules! keys {
    ($($tag:literal => $variant:ident, $name:literal, $codec:expr;)*) => {
        /// The type of an entry, identified by its 15-bit tag.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Key {
            $($variant,)*
            /// A tag with no known meaning; its payload stays opaque.
            Unknown(u16),
        }

        impl Key {
            pub fn from_tag(tag: u16) -> Key {
                match tag {
                    $($tag => Key::$variant,)*
                    other => Key::Unknown(other),
                }
            }

            pub fn tag(self) -> u16 {
                match self {
                    $(Key::$variant => $tag,)*
                    Key::Unknown(tag) => tag,
                }
            }

            /// The name consumers see; unknown tags are named by their number.
            pub fn name(self) -> SmolStr {
                match self {
                    $(Key::$variant => SmolStr::new_static($name),)*
                    Key::Unknown(tag) => SmolStr::new(tag.to_string()),
                }
            }

            pub fn codec(self) -> Codec {
                match self {
                    $(Key::$variant => $codec,)*
                    Key::Unknown(_) => Codec::Hex,
                }
            }

            /// Look a key up by its name, or by its tag written in decimal.
            pub fn from_name(name: &str) -> Option<Key> {
                match name {
                    $($name => Some(Key::$variant),)*
                    other => other.parse().ok().map(Key::from_tag),
                }
            }
        }
    };
}

keys! {
    // Font header data
    1501 => EncodingDefault, "Encoding Default", Codec::GlyphEncoding;
    1500 => Encoding, "Encoding", Codec::GlyphEncoding;
    1502 => E1502, "1502", Codec::U16;
    518 => E518, "518", Codec::Text;
    257 => E257, "257", Codec::Text;
    1026 => FontName, "font_name", Codec::Text;
    1503 => MasterCount, "Master Count", Codec::U16;
    1517 => WeightVector, "weight_vector", Codec::F64List;
    1044 => UniqueId, "unique_id", Codec::I32;
    1046 => Version, "version", Codec::Text;
    1038 => Notice, "notice", Codec::Text;
    1025 => FullName, "full_name", Codec::Text;
    1027 => FamilyName, "family_name", Codec::Text;
    1024 => PrefFamilyName, "pref_family_name", Codec::Text;
    1056 => MenuName, "menu_name", Codec::Text;
    1092 => AppleName, "apple_name", Codec::Text;
    1028 => Weight, "weight", Codec::Text;
    1065 => Width, "width", Codec::Text;
    1069 => License, "License", Codec::Text;
    1070 => LicenseUrl, "License URL", Codec::Text;
    1037 => Copyright, "copyright", Codec::Text;
    1061 => Trademark, "trademark", Codec::Text;
    1062 => Designer, "designer", Codec::Text;
    1063 => DesignerUrl, "designer_url", Codec::Text;
    1064 => VendorUrl, "vendor_url", Codec::Text;
    1039 => Source, "source", Codec::Text;
    1034 => IsFixedPitch, "is_fixed_pitch", Codec::U16;
    1048 => WeightCode, "weight_code", Codec::I16;
    1029 => ItalicAngle, "italic_angle", Codec::F64;
    1047 => SlantAngle, "slant_angle", Codec::F64;
    1030 => UnderlinePosition, "underline_position", Codec::I16;
    1031 => UnderlineThickness, "underline_thickness", Codec::U16;
    1054 => MsCharset, "ms_charset", Codec::U16;
    1118 => Panose, "panose", Codec::Panose;
    1128 => TtVersion, "tt_version", Codec::Text;
    1129 => TtUId, "tt_u_id", Codec::Text;
    1127 => StyleName, "style_name", Codec::Text;
    1137 => PrefStyleName, "pref_style_name", Codec::Text;
    1139 => MacCompatible, "mac_compatible", Codec::Text;
    1140 => E1140, "1140", Codec::Hex;
    1121 => Vendor, "vendor", Codec::Vendor;
    1133 => Xuid, "xuid", Codec::U32List;
    1134 => XuidNum, "xuid_num", Codec::U16;
    1132 => Year, "year", Codec::U16;
    1130 => VersionMajor, "version_major", Codec::U16;
    1131 => VersionMinor, "version_minor", Codec::U16;
    1135 => Upm, "upm", Codec::U16;
    1090 => FondId, "fond_id", Codec::U16;
    1093 => PostScriptHintingOptions, "PostScript Hinting Options", Codec::PsHintingOptions;
    1068 => E1068, "1068", Codec::CountedValues;
    1530 => BlueValuesNum, "blue_values_num", Codec::U16;
    1531 => OtherBluesNum, "other_blues_num", Codec::U16;
    1532 => FamilyBluesNum, "family_blues_num", Codec::U16;
    1533 => FamilyOtherBluesNum, "family_other_blues_num", Codec::U16;
    1534 => StemSnapHNum, "stem_snap_h_num", Codec::U16;
    1535 => StemSnapVNum, "stem_snap_v_num", Codec::U16;
    1267 => FontStyle, "font_style", Codec::U16;
    1057 => PclId, "pcl_id", Codec::U16;
    1058 => VpId, "vp_id", Codec::U16;
    1060 => MsId, "ms_id", Codec::U16;
    1059 => PclCharsSet, "pcl_chars_set", Codec::Text;

    // TrueType
    1261 => Cvt, "cvt", Codec::Hex;
    1262 => Prep, "prep", Codec::Hex;
    1263 => Fpgm, "fpgm", Codec::Hex;
    1265 => Gasp, "gasp", Codec::Gasp;
    1264 => TtInfo, "ttinfo", Codec::TtInfo;
    1271 => Vdmx, "vdmx", Codec::Vdmx;
    1270 => HheaLineGap, "hhea_line_gap", Codec::U16;
    1278 => HheaAscender, "hhea_ascender", Codec::I16;
    1279 => HheaDescender, "hhea_descender", Codec::I16;
    1266 => TrueTypeStemPpems2And3, "TrueType Stem PPEMs 2 And 3", Codec::TtStemPpems23;
    1268 => TrueTypeStemPpems, "TrueType Stem PPEMs", Codec::TtStemPpems;
    1269 => TrueTypeStems, "TrueType Stems", Codec::TtStems;
    1524 => TrueTypeStemPpems1, "TrueType Stem PPEMs 1", Codec::TtStemPpems1;
    1255 => TrueTypeZones, "TrueType Zones", Codec::TtZones;
    2021 => UnicodeRanges, "unicoderanges", Codec::UnicodeRanges;
    1272 => StemSnapLimit, "stemsnaplimit", Codec::U16;
    1274 => ZonePpm, "zoneppm", Codec::U16;
    1275 => CodePpm, "codeppm", Codec::U16;
    1604 => E1604, "1604", Codec::U16;
    2032 => E2032, "2032", Codec::U16;
    1273 => TrueTypeZoneDeltas, "TrueType Zone Deltas", Codec::TtZoneDeltas;

    // Names, classes and features
    1138 => FontNames, "fontnames", Codec::NameRecords;
    1141 => CustomCmaps, "Custom CMAPs", Codec::CustomCmaps;
    1136 => PcltTable, "PCLT Table", Codec::Pclt;
    2022 => ExportPcltTable, "Export PCLT Table", Codec::U16;
    2025 => Note, "note", Codec::Text;
    2030 => E2030, "2030", Codec::Hex;
    2016 => CustomData, "customdata", Codec::Text;
    2024 => MetricsClassFlags, "OpenType Metrics Class Flags", Codec::ClassFlags(3);
    2026 => KerningClassFlags, "OpenType Kerning Class Flags", Codec::ClassFlags(2);
    2014 => TrueTypeTable, "TrueTypeTable", Codec::TrueTypeTable;
    1276 => Features, "features", Codec::Features;
    1277 => OpenTypeClass, "OpenType Class", Codec::Text;
    513 => E513, "513", Codec::Hex;
    271 => E271, "271", Codec::Hex;

    // Multiple master
    1513 => AxisCount, "Axis Count", Codec::U16;
    1514 => AxisName, "Axis Name", Codec::Text;
    1523 => AnisotropicInterpolationMappings, "Anisotropic Interpolation Mappings", Codec::Anisotropic;
    1515 => AxisMappingsCount, "Axis Mappings Count", Codec::AxisMappingsCount;
    1516 => AxisMappings, "Axis Mappings", Codec::AxisMappings;
    1504 => MasterName, "Master Name", Codec::Text;
    1505 => MasterLocation, "Master Location", Codec::MasterLocation;
    1247 => PrimaryInstanceLocations, "Primary Instance Locations", Codec::F64List;
    1254 => PrimaryInstances, "Primary Instances", Codec::PrimaryInstances;
    1536 => PostScriptInfo, "PostScript Info", Codec::PsInfo;

    // Global guides and mask
    527 => E527, "527", Codec::Hex;
    1294 => GlobalGuides, "Global Guides", Codec::GlobalGuides;
    1296 => GlobalGuideProperties, "Global Guide Properties", Codec::GuideProperties;
    1295 => GlobalMask, "Global Mask", Codec::GlobalMask;
    1066 => DefaultCharacter, "default_character", Codec::Text;

    // Per glyph
    2001 => Glyph, "Glyph", Codec::Glyph;
    2008 => Links, "Links", Codec::Links;
    2007 => Image, "image", Codec::Image;
    2013 => GlyphBitmaps, "Glyph Bitmaps", Codec::GlyphBitmaps;
    2023 => E2023, "2023", Codec::Values;
    2019 => GlyphSketch, "Glyph Sketch", Codec::Sketch;
    2010 => GlyphHintingOptions, "Glyph Hinting Options", Codec::GlyphHintingOptions;
    2009 => Mask, "mask", Codec::Mask;
    2011 => MaskMetrics, "mask.metrics", Codec::MaskMetrics;
    2028 => MaskMetricsMm, "mask.metrics_mm", Codec::MaskMetricsMm;
    2027 => GlyphOrigin, "Glyph Origin", Codec::GlyphOrigin;
    1250 => Unicodes, "unicodes", Codec::U16List;
    2034 => E2034, "2034", Codec::Text;
    1253 => UnicodesNonBmp, "Glyph Unicode Non-BMP", Codec::U32List;
    2012 => Mark, "mark", Codec::U16;
    2015 => GlyphCustomData, "glyph.customdata", Codec::Text;
    2017 => GlyphNote, "glyph.note", Codec::Text;
    2018 => GlyphGdefData, "Glyph GDEF Data", Codec::Gdef;
    2020 => GlyphAnchorsSupplemental, "Glyph Anchors Supplemental", Codec::AnchorsSupp;
    2029 => GlyphAnchorsMm, "Glyph Anchors MM", Codec::AnchorsMm;
    2031 => GlyphGuideProperties, "Glyph Guide Properties", Codec::GuideProperties;

    // Export options
    1743 => OpenTypeExportOptions, "OpenType Export Options", Codec::FontOptions;
    1744 => ExportOptions, "Export Options", Codec::ExportOptions;
    1742 => MappingMode, "Mapping Mode", Codec::MappingMode;

    // Seen in older files
    272 => E272, "272", Codec::Hex;
    1410 => E1410, "1410", Codec::Fl3Type1410;
    528 => E528, "528", Codec::Hex;
}

impl Key {
    pub fn is_known(self) -> bool {
        !matches!(self, Key::Unknown(_))
    }
}

impl Serialize for Key {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.name())
    }
}
