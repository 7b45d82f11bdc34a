//! Font generation options and the encoding mapping mode.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    stream::{Reader, Writer},
    VfbError,
};

use super::{bits_from_list, bits_to_list};

const FONT_OPTIONS_END: u8 = 0x64;

const FONT_OPTIONS: &[(u8, &str)] = &[
    (1, "fit_ascender"),
    (2, "fit_descender"),
    (3, "auto_metrics_left"),
    (4, "auto_metrics_right"),
    (5, "auto_metrics_close"),
    (6, "auto_hinting_min_h_len"),
    (7, "auto_hinting_min_v_len"),
    (8, "auto_hinting_min_h_width"),
    (9, "auto_hinting_min_v_width"),
    (10, "auto_hinting_max_h_width"),
    (11, "auto_hinting_max_v_width"),
    (12, "auto_hinting_h_ratio"),
    (13, "auto_hinting_v_ratio"),
    (14, "duplicate_place_x"),
    (15, "paste_place_x"),
    (16, "opentype_name_records"),
    (17, "codepage_for_cmap_1_0"),
    (18, "dont_ignore_unicode_indexes"),
    (19, "head_bbox_savings"),
    (20, "autohinting_options"),
    (21, "export_hinted_truetype_font"),
    (22, "autohint_unhinted_glyphs"),
    (23, "keep_existing_truetype_instructions"),
    (24, "export_visual_truetype_hints"),
    (25, "apply_bbox_savings"),
    (26, "auto_win_asc_desc"),
    (27, "add_characters"),
    (28, "export_embedded_bitmaps"),
    (29, "copy_hdmx_data_from_base_to_composite_glyph"),
    (30, "dont_automatically_reorder_glyphs"),
    (31, "export_ot"),
    (32, "export_volt"),
    (33, "write_kern_feature"),
    (34, "t1_terminal"),
    (35, "t1_pfm"),
    (36, "t1_afm"),
    (37, "t1_autohint"),
    (38, "t1_unicode"),
    (39, "optimize_align"),
    (40, "optimize_reduce"),
    (41, "t1_encoding"),
    (42, "ot_write_gdef"),
    (43, "t1_use_os2"),
    (44, "subrize"),
    (45, "t1_sort"),
    (46, "export_kern_table"),
    (47, "t1_fs_type"),
    (48, "expand_kern_flags"),
    (49, "expand_kern_codepage"),
    (50, "expand_kern_count"),
    (51, "decompose"),
    (114, "duplicate_place_y"),
    (115, "paste_place_y"),
];

fn option_name(key: u8) -> String {
    FONT_OPTIONS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| key.to_string())
}

fn option_key(name: &str) -> Result<u8, VfbError> {
    match FONT_OPTIONS.iter().find(|(_, n)| *n == name) {
        Some((key, _)) => Ok(*key),
        None => name
            .parse()
            .ok()
            .filter(|key| *key != FONT_OPTIONS_END)
            .ok_or_else(|| VfbError::invalid("font option", name.to_string())),
    }
}

/// TrueType autohinting settings packed into the `autohinting_options`
/// font option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AutoHintOptions {
    pub single_link_attachment_precision: i32,
    pub generate_triple_hints: bool,
    pub generate_delta_instructions: bool,
    pub direct_links_to_center_of_the_glyph_where_possible: bool,
    pub interpolate_positions_of_cusp_points: bool,
    pub interpolate_positions_of_double_links: bool,
    pub add_link_to_rsb: bool,
}

/// Restrictions applied when class kerning is expanded on export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExpandKernFlags {
    pub limit_action: bool,
    pub limit_codepage: bool,
    pub limit_cmap_10: bool,
    pub limit_font_window: bool,
    pub limit_count: bool,
    pub limit_keep: bool,
    pub apply_to_assistance: bool,
}

/// The OpenType Export Options entry: option name to raw value, in file
/// order. Options without a known name use their decimal key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FontOptions(pub IndexMap<String, i32>);

impl FontOptions {
    pub fn get(&self, name: &str) -> Option<i32> {
        self.0.get(name).copied()
    }

    /// `auto_hinting_h_ratio` or `auto_hinting_v_ratio`, stored times 10000.
    pub fn hinting_ratio(&self, horizontal: bool) -> Option<f64> {
        let name = if horizontal {
            "auto_hinting_h_ratio"
        } else {
            "auto_hinting_v_ratio"
        };
        self.get(name).map(|v| v as f64 / 10_000.0)
    }

    pub fn autohinting_options(&self) -> Option<AutoHintOptions> {
        let v = self.get("autohinting_options")?;
        Some(AutoHintOptions {
            single_link_attachment_precision: v & 0x7,
            generate_triple_hints: v & 0x100 != 0,
            generate_delta_instructions: v & 0x200 != 0,
            direct_links_to_center_of_the_glyph_where_possible: v & 0x400 != 0,
            interpolate_positions_of_cusp_points: v & 0x800 != 0,
            interpolate_positions_of_double_links: v & 0x1000 != 0,
            add_link_to_rsb: v & 0x2000 != 0,
        })
    }

    pub fn expand_kern_flags(&self) -> Option<ExpandKernFlags> {
        let v = self.get("expand_kern_flags")?;
        Some(ExpandKernFlags {
            limit_action: v & 0x1 != 0,
            limit_codepage: v & 0x2 != 0,
            limit_cmap_10: v & 0x4 != 0,
            limit_font_window: v & 0x8 != 0,
            limit_count: v & 0x10 != 0,
            limit_keep: v & 0x20 != 0,
            apply_to_assistance: v & 0x1000 != 0,
        })
    }

    pub(crate) fn decode(r: &mut Reader) -> Result<Self, VfbError> {
        let mut options = IndexMap::new();
        loop {
            let key = r.read_u8()?;
            if key == FONT_OPTIONS_END {
                break;
            }
            options.insert(option_name(key), r.value()?);
        }
        Ok(FontOptions(options))
    }

    pub(crate) fn encode(&self, w: &mut Writer) -> Result<(), VfbError> {
        for (name, value) in &self.0 {
            w.write_u8(option_key(name)?);
            w.value(*value);
        }
        w.write_u8(FONT_OPTIONS_END);
        Ok(())
    }
}

const EXPORT_OPTIONS: [&str; 3] = [
    "use_custom_opentype_export_options",
    "use_default_opentype_export_options",
    "use_custom_cmap_encoding",
];

/// The Export Options bit field as a list of names.
pub(crate) fn export_options(r: &mut Reader) -> Result<Vec<String>, VfbError> {
    Ok(bits_to_list(r.read_u16()? as u128)
        .into_iter()
        .map(|bit| {
            EXPORT_OPTIONS
                .get(bit as usize)
                .map(|s| s.to_string())
                .unwrap_or_else(|| bit.to_string())
        })
        .collect())
}

pub(crate) fn write_export_options(options: &[String], w: &mut Writer) -> Result<(), VfbError> {
    let mut bits = Vec::with_capacity(options.len());
    for option in options {
        let bit = match EXPORT_OPTIONS.iter().position(|o| o == option) {
            Some(bit) => bit as u32,
            None => option
                .parse()
                .map_err(|_| VfbError::invalid("export option", option.clone()))?,
        };
        bits.push(bit);
    }
    w.write_u16(bits_from_list("export option", &bits, 16)? as u16);
    Ok(())
}

const MAPPING_MODES: &[(i32, &str)] = &[
    (0, "names_or_index"),
    (1, "unicode_ranges"),
    (3, "codepages"),
];

/// How the font window maps glyphs to its cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingMode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping_mode: Option<String>,
    #[serde(rename = "2", default, skip_serializing_if = "Option::is_none")]
    pub unknown2: Option<i32>,
    #[serde(rename = "3", default, skip_serializing_if = "Option::is_none")]
    pub unknown3: Option<i32>,
    /// In names mode the encoding id (-1 for glyph index mode), otherwise an
    /// index into the unicode range or codepage list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping_id: Option<i32>,
}

impl MappingMode {
    pub(crate) fn decode(r: &mut Reader) -> Result<Self, VfbError> {
        let mut mode = MappingMode::default();
        loop {
            let key = r.read_u8()?;
            if key == 0 {
                break;
            }
            let v = r.value()?;
            match key {
                1 => {
                    mode.mapping_mode = Some(
                        MAPPING_MODES
                            .iter()
                            .find(|(k, _)| *k == v)
                            .map(|(_, name)| name.to_string())
                            .unwrap_or_else(|| v.to_string()),
                    )
                }
                2 => mode.unknown2 = Some(v),
                3 => mode.unknown3 = Some(v),
                4 => mode.mapping_id = Some(v),
                _ => return Err(VfbError::invalid("mapping mode key", key.to_string())),
            }
        }
        Ok(mode)
    }

    pub(crate) fn encode(&self, w: &mut Writer) -> Result<(), VfbError> {
        if let Some(name) = &self.mapping_mode {
            let v = match MAPPING_MODES.iter().find(|(_, n)| n == name) {
                Some((v, _)) => *v,
                None => name
                    .parse()
                    .map_err(|_| VfbError::invalid("mapping mode", name.clone()))?,
            };
            w.write_u8(1);
            w.value(v);
        }
        for (key, v) in [(2, self.unknown2), (3, self.unknown3), (4, self.mapping_id)] {
            if let Some(v) = v {
                w.write_u8(key);
                w.value(v);
            }
        }
        w.write_u8(0);
        Ok(())
    }
}
