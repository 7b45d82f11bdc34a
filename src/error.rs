use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VfbError {
    /// A zero value byte, or a value read at the end of the data. Several list
    /// decoders use this as their terminator.
    #[error("End of data")]
    EndOfData,

    #[error("Invalid value encoding byte 0x{byte:02x} at offset {offset}")]
    InvalidEncoding { byte: u8, offset: usize },

    #[error("Unknown glyph sub-record 0x{tag:02x}")]
    UnknownSubRecord { tag: u8 },

    #[error("Decoder for '{key}' stopped at byte {position} of {length}")]
    UnderOverConsumption {
        key: String,
        length: usize,
        position: usize,
    },

    #[error("Duplicate glyph name {name}, renamed to {renamed}")]
    DuplicateGlyphName { name: String, renamed: String },

    #[error("No encoder for entry tag {tag}")]
    MissingEncoderForTag { tag: u16 },

    #[error("Decoded value does not fit the record format of '{key}'")]
    RecordMismatch { key: String },

    #[error("Invalid {what}: {reason}")]
    InvalidValue { what: String, reason: String },

    #[error("Wanted {wanted} bytes at offset {offset}, but the data ended")]
    Truncated { offset: usize, wanted: usize },

    #[error("Bad file header: {0}")]
    BadHeader(String),

    #[error("IO Error: {0}")]
    IO(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl VfbError {
    pub(crate) fn invalid(what: impl Into<String>, reason: impl Into<String>) -> Self {
        VfbError::InvalidValue {
            what: what.into(),
            reason: reason.into(),
        }
    }
}
