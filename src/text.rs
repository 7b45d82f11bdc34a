//! Single-byte text encodings found in VFB payloads.
//!
//! Most text is Windows-1252. Name records for the Macintosh platform carry Mac
//! Roman character codes. Files written by localized FontLab versions may be
//! read with UTF-8 instead.

use serde::{Deserialize, Serialize};

use crate::VfbError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Encoding {
    #[default]
    Windows1252,
    Utf8,
}

// 0x80..=0x9F; the undefined code points map to the C1 control of the same
// value so that every byte survives a round trip.
const WINDOWS_1252_HIGH: [char; 32] = [
    '\u{20AC}', '\u{0081}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{008D}', '\u{017D}', '\u{008F}',
    '\u{0090}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\u{009D}', '\u{017E}', '\u{0178}',
];

// 0x80..=0xFF
const MAC_ROMAN_HIGH: [char; 128] = [
    'Ä', 'Å', 'Ç', 'É', 'Ñ', 'Ö', 'Ü', 'á', 'à', 'â', 'ä', 'ã', 'å', 'ç', 'é', 'è',
    'ê', 'ë', 'í', 'ì', 'î', 'ï', 'ñ', 'ó', 'ò', 'ô', 'ö', 'õ', 'ú', 'ù', 'û', 'ü',
    '†', '°', '¢', '£', '§', '•', '¶', 'ß', '®', '©', '™', '´', '¨', '≠', 'Æ', 'Ø',
    '∞', '±', '≤', '≥', '¥', 'µ', '∂', '∑', '∏', 'π', '∫', 'ª', 'º', 'Ω', 'æ', 'ø',
    '¿', '¡', '¬', '√', 'ƒ', '≈', '∆', '«', '»', '…', '\u{00A0}', 'À', 'Ã', 'Õ', 'Œ', 'œ',
    '–', '—', '“', '”', '‘', '’', '÷', '◊', 'ÿ', 'Ÿ', '⁄', '€', '‹', '›', 'ﬁ', 'ﬂ',
    '‡', '·', '‚', '„', '‰', 'Â', 'Ê', 'Á', 'Ë', 'È', 'Í', 'Î', 'Ï', 'Ì', 'Ó', 'Ô',
    '\u{F8FF}', 'Ò', 'Ú', 'Û', 'Ù', 'ı', 'ˆ', '˜', '¯', '˘', '˙', '˚', '¸', '˝', '˛', 'ˇ',
];

fn windows_1252_char(byte: u8) -> char {
    match byte {
        0x80..=0x9F => WINDOWS_1252_HIGH[(byte - 0x80) as usize],
        _ => byte as char,
    }
}

fn windows_1252_byte(c: char) -> Option<u8> {
    match c as u32 {
        0x00..=0x7F | 0xA0..=0xFF => Some(c as u8),
        _ => WINDOWS_1252_HIGH
            .iter()
            .position(|h| *h == c)
            .map(|i| 0x80 + i as u8),
    }
}

impl Encoding {
    pub fn decode(&self, bytes: &[u8]) -> Result<String, VfbError> {
        match self {
            Encoding::Windows1252 => Ok(bytes.iter().copied().map(windows_1252_char).collect()),
            Encoding::Utf8 => String::from_utf8(bytes.to_vec())
                .map_err(|e| VfbError::invalid("UTF-8 text", e.to_string())),
        }
    }

    pub fn encode(&self, s: &str) -> Result<Vec<u8>, VfbError> {
        match self {
            Encoding::Windows1252 => s
                .chars()
                .map(|c| {
                    windows_1252_byte(c).ok_or_else(|| {
                        VfbError::invalid("Windows-1252 text", format!("cannot encode {:?}", c))
                    })
                })
                .collect(),
            Encoding::Utf8 => Ok(s.as_bytes().to_vec()),
        }
    }
}

/// Mac Roman byte to character.
pub fn mac_roman_char(byte: u8) -> char {
    match byte {
        0x80..=0xFF => MAC_ROMAN_HIGH[(byte - 0x80) as usize],
        _ => byte as char,
    }
}

/// Character to Mac Roman byte, if the character exists in Mac Roman.
pub fn mac_roman_byte(c: char) -> Option<u8> {
    if c.is_ascii() {
        return Some(c as u8);
    }
    MAC_ROMAN_HIGH
        .iter()
        .position(|h| *h == c)
        .map(|i| 0x80 + i as u8)
}
