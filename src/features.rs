use std::sync::LazyLock;

use indexmap::IndexMap;
use log::warn;
use regex::Regex;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

static FEATURE_START_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)] // Safe because the regex is valid
    Regex::new(r"\s*feature\s*([a-z0-9]{4})\s*\{").unwrap()
});

const ANONYMOUS_PREFIX: &str = "anonymous";

/// OpenType feature code split into manageable pieces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Features {
    /// Opentype classes
    ///
    /// The key should not start with @.
    pub classes: IndexMap<SmolStr, String>,
    /// Code placed before the first feature block, keyed by a user-defined
    /// name. Code read from a font lives under "anonymous".
    pub prefixes: IndexMap<SmolStr, String>,
    /// OpenType features
    ///
    /// A list of (feature tag, code) tuples. The code is the whole block,
    /// including the `feature` and closing lines.
    pub features: Vec<(SmolStr, String)>,
}

impl Features {
    /// Split feature code lines, as stored in the `features` entry.
    ///
    /// A block starts at a line opening a `feature` statement outside of a
    /// comment and runs until the next one.
    pub fn from_lines(lines: &[String]) -> Features {
        let mut features = Features::default();
        let mut prefix: Vec<&str> = vec![];
        let mut current: Option<(SmolStr, Vec<&str>)> = None;
        for line in lines {
            let code = line.split('#').next().unwrap_or_default();
            if let Some(captures) = FEATURE_START_REGEX.captures(code) {
                if let Some((tag, block)) = current.take() {
                    features.features.push((tag, block.join("\n")));
                }
                current = Some((SmolStr::new(&captures[1]), vec![line.as_str()]));
            } else if let Some((_, block)) = current.as_mut() {
                block.push(line);
            } else {
                prefix.push(line);
            }
        }
        if let Some((tag, block)) = current {
            features.features.push((tag, block.join("\n")));
        }
        if !prefix.is_empty() {
            features
                .prefixes
                .insert(ANONYMOUS_PREFIX.into(), prefix.join("\n"));
        }
        features
    }

    /// Add a class from an `OpenType Class` entry, `name: glyph glyph ...`.
    /// Malformed definitions are skipped with a warning.
    pub fn add_class(&mut self, definition: &str) {
        let Some((name, glyphs)) = definition.split_once(':') else {
            warn!("Malformed OpenType class definition, skipping: {}", definition);
            return;
        };
        let name = name.trim().trim_start_matches('@');
        if self.classes.contains_key(name) {
            warn!("Duplicate OpenType class {}, skipping", name);
            return;
        }
        let glyphs: Vec<&str> = glyphs.split_whitespace().collect();
        self.classes.insert(name.into(), glyphs.join(" "));
    }

    pub fn to_fea(&self) -> String {
        let mut fea = vec![];
        for (name, glyphs) in &self.classes {
            fea.push(format!("@{} = [{}];", name, glyphs));
        }
        for (prefix, code) in &self.prefixes {
            if prefix != ANONYMOUS_PREFIX {
                fea.push(format!("# Prefix: {}", prefix));
            }
            fea.push(code.clone());
        }
        for (_, code) in &self.features {
            fea.push(code.clone());
        }
        fea.join("\n")
    }
}
