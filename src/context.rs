use crate::text::Encoding;

/// FontLab keeps at most 16 masters in a multiple master font.
pub const MAX_MASTERS: usize = 16;

/// Font-wide facts that record codecs need but cannot discover from their
/// own payload.
///
/// The container fills this in from the Master Count and TrueType Stems
/// entries while scanning, and hands the same value to every decode and
/// encode call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    pub master_count: usize,
    /// Number of (vertical, horizontal) TrueType stems.
    pub stem_counts: Option<(usize, usize)>,
    pub encoding: Encoding,
}

impl Default for Context {
    fn default() -> Self {
        Context {
            master_count: 1,
            stem_counts: None,
            encoding: Encoding::Windows1252,
        }
    }
}

impl Context {
    pub fn with_masters(master_count: usize) -> Self {
        Context {
            master_count,
            ..Default::default()
        }
    }
}
