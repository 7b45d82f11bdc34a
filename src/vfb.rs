//! The whole file: header, entry list and the font-wide decoding context.

use std::{
    collections::HashSet,
    path::Path,
};

use log::{error, warn};
use serde::Serialize;

use crate::{
    context::{Context, MAX_MASTERS},
    entry::{read_entry, write_end, Entry},
    features::Features,
    glyph::Glyph,
    header::Header,
    key::Key,
    records::Record,
    serde_helpers::to_hex,
    stream::{Reader, Writer},
    text::Encoding,
    VfbError,
};

/// Entries skipped by [`ReadOptions::minimal`]: guides, masks, bitmaps,
/// notes and mark colors.
const MINIMAL_DROPS: [Key; 9] = [
    Key::GlobalGuides,
    Key::GlobalMask,
    Key::Note,
    Key::GlyphBitmaps,
    Key::GlyphGuideProperties,
    Key::Image,
    Key::Mark,
    Key::Mask,
    Key::GlyphNote,
];

/// How a file is read.
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// Tags of entries to discard while scanning.
    pub drop_keys: HashSet<u16>,
    /// Also discard entries not needed to build a font.
    pub minimal: bool,
    /// Read the header and nothing else.
    pub only_header: bool,
    /// Decode text as UTF-8 instead of Windows-1252.
    pub unicode_strings: bool,
}

impl ReadOptions {
    fn drops(&self, key: Key) -> bool {
        self.drop_keys.contains(&key.tag()) || (self.minimal && MINIMAL_DROPS.contains(&key))
    }
}

/// A VFB file.
///
/// Entries are kept in file order and decoded lazily; see
/// [`Vfb::decode_all`].
#[derive(Debug, Clone, Serialize)]
pub struct Vfb {
    header: Header,
    entries: Vec<Entry>,
    #[serde(skip)]
    context: Context,
    #[serde(skip)]
    options: ReadOptions,
    #[serde(skip)]
    any_errors: bool,
}

impl Default for Vfb {
    fn default() -> Self {
        Vfb::new()
    }
}

impl Vfb {
    /// An empty single-master file with a FontLab 5 header.
    pub fn new() -> Self {
        Vfb {
            header: Header::default(),
            entries: vec![],
            context: Context::default(),
            options: ReadOptions::default(),
            any_errors: false,
        }
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self, VfbError> {
        Vfb::read_with(path, ReadOptions::default())
    }

    pub fn read_with(path: impl AsRef<Path>, options: ReadOptions) -> Result<Self, VfbError> {
        let data = std::fs::read(path)?;
        Vfb::from_bytes_with(&data, options)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, VfbError> {
        Vfb::from_bytes_with(data, ReadOptions::default())
    }

    /// Read the header and scan the entries without decoding them. Only the
    /// entries other codecs depend on, Master Count and TrueType Stems, are
    /// decoded right away.
    pub fn from_bytes_with(data: &[u8], options: ReadOptions) -> Result<Self, VfbError> {
        let mut reader = Reader::new(data);
        let header = Header::decode(&mut reader)?;
        let mut vfb = Vfb {
            header,
            entries: vec![],
            context: Context {
                encoding: if options.unicode_strings {
                    Encoding::Utf8
                } else {
                    Encoding::Windows1252
                },
                ..Default::default()
            },
            options,
            any_errors: false,
        };
        if vfb.options.only_header {
            return Ok(vfb);
        }
        while let Some(entry) = read_entry(&mut reader)? {
            if vfb.options.drops(entry.key()) {
                continue;
            }
            vfb.push_entry(entry)?;
        }
        if !reader.is_empty() {
            warn!(
                "Ignoring {} bytes after the end marker",
                reader.remaining()
            );
        }
        Ok(vfb)
    }

    /// Append an entry. Entries that the decoding context depends on are
    /// decoded and applied immediately.
    pub fn push_entry(&mut self, mut entry: Entry) -> Result<(), VfbError> {
        match entry.key() {
            Key::MasterCount | Key::TrueTypeStems => {
                entry.decode(&self.context)?;
                self.update_context(&entry)?;
            }
            _ => {}
        }
        self.entries.push(entry);
        Ok(())
    }

    fn update_context(&mut self, entry: &Entry) -> Result<(), VfbError> {
        match (entry.key(), entry.decoded()) {
            (Key::MasterCount, Some(Record::Int(count))) => {
                self.context.master_count = usize::try_from(*count)
                    .ok()
                    .filter(|count| *count <= MAX_MASTERS)
                    .ok_or_else(|| VfbError::invalid("master count", count.to_string()))?;
            }
            (Key::TrueTypeStems, Some(Record::TtStems(stems))) => {
                self.context.stem_counts = Some(stems.counts());
            }
            _ => {}
        }
        Ok(())
    }

    /// Re-read the context from the Master Count and TrueType Stems entries,
    /// after they were edited through [`Vfb::entries_mut`].
    pub fn refresh_context(&mut self) -> Result<(), VfbError> {
        let entries = std::mem::take(&mut self.entries);
        let result = entries
            .iter()
            .try_for_each(|entry| self.update_context(entry));
        self.entries = entries;
        result
    }

    /// Decode every entry that is still raw. A failing entry is logged and
    /// stays raw; the first error is returned after all entries were tried.
    pub fn decode_all(&mut self) -> Result<(), VfbError> {
        let mut first_error = None;
        for entry in self.entries.iter_mut() {
            if self.options.drop_keys.contains(&entry.key().tag()) {
                continue;
            }
            if let Err(e) = entry.decode(&self.context) {
                error!(
                    "Failed to decode entry {} (tag {}): {}; data: {}",
                    entry.name(),
                    entry.key().tag(),
                    e,
                    to_hex(entry.data().unwrap_or_default())
                );
                self.any_errors = true;
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Compile every modified entry. A failing entry is logged and keeps its
    /// last good bytes for writing; the first error is returned after all
    /// entries were tried.
    pub fn compile(&mut self) -> Result<(), VfbError> {
        let context = self.context;
        let mut first_error = None;
        for entry in self.entries.iter_mut() {
            if let Err(e) = entry.compile(&context, false) {
                error!(
                    "Failed to compile entry {} (tag {}): {}",
                    entry.name(),
                    entry.key().tag(),
                    e
                );
                self.any_errors = true;
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// The file as bytes. Unmodified entries are written as they were read.
    /// A modified entry that fails to compile is written with its last good
    /// bytes, or left out if it never had any. Call [`Vfb::compile`] first
    /// to see those failures.
    pub fn to_bytes(&self) -> Result<Vec<u8>, VfbError> {
        let mut w = Writer::new();
        w.write_bytes(&self.header.encode()?);
        for entry in &self.entries {
            if let Err(e) = entry.write(&mut w, &self.context) {
                error!(
                    "Leaving out entry {} (tag {}): {}",
                    entry.name(),
                    entry.key().tag(),
                    e
                );
            }
        }
        write_end(&mut w);
        Ok(w.into_inner())
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), VfbError> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    /// Decoded glyphs under unique names. A name that is already taken gets
    /// the first free `#n` suffix, counting from 1.
    fn named_glyphs(&self) -> Vec<(String, &Glyph)> {
        let mut taken: HashSet<String> = HashSet::new();
        let mut glyphs = vec![];
        for glyph in self
            .entries
            .iter()
            .filter_map(|e| e.decoded().and_then(Record::as_glyph))
        {
            let name = glyph.name.as_deref().unwrap_or_default();
            let mut unique = name.to_string();
            if taken.contains(&unique) {
                let mut i = 1;
                while taken.contains(&format!("{}#{}", name, i)) {
                    i += 1;
                }
                unique = format!("{}#{}", name, i);
                warn!(
                    "{}",
                    VfbError::DuplicateGlyphName {
                        name: name.to_string(),
                        renamed: unique.clone(),
                    }
                );
            }
            taken.insert(unique.clone());
            glyphs.push((unique, glyph));
        }
        glyphs
    }

    /// Names of the decoded glyphs in file order.
    pub fn glyph_order(&self) -> Vec<String> {
        self.named_glyphs().into_iter().map(|(name, _)| name).collect()
    }

    /// A decoded glyph by its unique name.
    pub fn glyph(&self, name: &str) -> Option<&Glyph> {
        self.named_glyphs()
            .into_iter()
            .find(|(unique, _)| unique == name)
            .map(|(_, glyph)| glyph)
    }

    /// The feature code and OpenType classes of the font.
    pub fn features(&self) -> Result<Features, VfbError> {
        let mut features = Features::default();
        for entry in &self.entries {
            match entry.key() {
                Key::Features => {
                    if let Record::Lines(lines) = entry.record(&self.context)?.as_ref() {
                        let parsed = Features::from_lines(lines);
                        features.prefixes.extend(parsed.prefixes);
                        features.features.extend(parsed.features);
                    }
                }
                Key::OpenTypeClass => {
                    if let Some(definition) = entry.record(&self.context)?.as_text() {
                        features.add_class(definition);
                    }
                }
                _ => {}
            }
        }
        Ok(features)
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut Vec<Entry> {
        &mut self.entries
    }

    /// The first entry with this key.
    pub fn find(&self, key: Key) -> Option<&Entry> {
        self.entries.iter().find(|e| e.key() == key)
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn num_masters(&self) -> usize {
        self.context.master_count
    }

    /// True if any entry failed in [`Vfb::decode_all`] or [`Vfb::compile`].
    pub fn any_errors(&self) -> bool {
        self.any_errors
    }

    pub fn to_json(&self) -> Result<serde_json::Value, VfbError> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), VfbError> {
        let file = std::io::BufWriter::new(std::fs::File::create(path)?);
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}
