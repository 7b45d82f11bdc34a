//! The entry envelope (`u16` tag, `u16` or `u32` length, payload) and the
//! raw/decoded lifecycle of a single entry.

use std::borrow::Cow;

use log::{debug, error, warn};
use serde::Serialize;
use smol_str::SmolStr;

use crate::{
    context::Context,
    key::Key,
    records::{narrow, Record},
    serde_helpers::hex_bytes,
    stream::{Reader, Writer},
    VfbError,
};

const LONG_SIZE: u16 = 0x8000;
const END_TAG: u16 = 5;
const END_MARKER: [u8; 6] = [0, 0, 2, 0, 0, 0];
/// FontLab 3 writes entry 1410 with a length that does not match its data.
const FL3_1410_SIZE: usize = 10;

/// The payload of an entry, either still as read or decoded.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Raw(Vec<u8>),
    /// `bytes` holds the compiled form of `value` while the two agree. It
    /// is dropped as soon as the value may have been changed.
    Decoded { value: Record, bytes: Option<Vec<u8>> },
}

/// One record of the file.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    key: Key,
    payload: Payload,
    /// Length written to the envelope when it differs from the payload's.
    declared_size: Option<usize>,
    /// The last good bytes of a modified entry, written if it fails to
    /// compile.
    fallback: Option<Vec<u8>>,
}

impl Entry {
    /// A new decoded entry. It has not been compiled yet, so it counts as
    /// modified.
    pub fn new(key: Key, value: Record) -> Self {
        Entry {
            key,
            payload: Payload::Decoded { value, bytes: None },
            declared_size: None,
            fallback: None,
        }
    }

    /// An entry holding an undecoded payload.
    pub fn raw(key: Key, data: Vec<u8>) -> Self {
        Entry {
            key,
            payload: Payload::Raw(data),
            declared_size: None,
            fallback: None,
        }
    }

    pub fn key(&self) -> Key {
        self.key
    }

    pub fn name(&self) -> SmolStr {
        self.key.name()
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn is_decoded(&self) -> bool {
        matches!(self.payload, Payload::Decoded { .. })
    }

    /// True if the decoded value has no up-to-date compiled form.
    pub fn is_modified(&self) -> bool {
        matches!(self.payload, Payload::Decoded { bytes: None, .. })
    }

    pub fn decoded(&self) -> Option<&Record> {
        match &self.payload {
            Payload::Decoded { value, .. } => Some(value),
            Payload::Raw(_) => None,
        }
    }

    /// The decoded value, decoding a copy of the payload if the entry is
    /// still raw.
    pub fn record(&self, ctx: &Context) -> Result<Cow<'_, Record>, VfbError> {
        match &self.payload {
            Payload::Decoded { value, .. } => Ok(Cow::Borrowed(value)),
            Payload::Raw(data) => Ok(Cow::Owned(self.key.codec().decode_payload(
                &self.key.name(),
                data,
                ctx,
            )?)),
        }
    }

    /// Mutable access to the decoded value. The entry is treated as
    /// modified from here on and is re-encoded when written. Its current
    /// bytes are kept in case that fails.
    pub fn decoded_mut(&mut self) -> Option<&mut Record> {
        match &mut self.payload {
            Payload::Decoded { value, bytes } => {
                if let Some(previous) = bytes.take() {
                    self.fallback = Some(previous);
                }
                Some(value)
            }
            Payload::Raw(_) => None,
        }
    }

    /// The payload bytes as read or last compiled.
    pub fn data(&self) -> Option<&[u8]> {
        match &self.payload {
            Payload::Raw(data) => Some(data),
            Payload::Decoded { bytes, .. } => bytes.as_deref(),
        }
    }

    /// Decode the payload. On failure the entry keeps its raw bytes.
    pub fn decode(&mut self, ctx: &Context) -> Result<(), VfbError> {
        let Payload::Raw(data) = &mut self.payload else {
            return Ok(());
        };
        let value = self
            .key
            .codec()
            .decode_payload(&self.key.name(), data, ctx)?;
        let bytes = std::mem::take(data);
        self.payload = Payload::Decoded {
            value,
            bytes: Some(bytes),
        };
        Ok(())
    }

    /// Re-encode the decoded value if it was modified, or always if `force`
    /// is set.
    pub fn compile(&mut self, ctx: &Context, force: bool) -> Result<(), VfbError> {
        let Payload::Decoded { value, bytes } = &mut self.payload else {
            return Ok(());
        };
        if bytes.is_some() && !force {
            debug!("Skipping compilation of unmodified entry {}", self.key.name());
            return Ok(());
        }
        *bytes = Some(encode(self.key, value, ctx)?);
        self.fallback = None;
        Ok(())
    }

    /// The payload bytes to write, compiling a modified value on the fly.
    pub fn compiled(&self, ctx: &Context) -> Result<Cow<'_, [u8]>, VfbError> {
        match &self.payload {
            Payload::Raw(data) => Ok(Cow::Borrowed(data)),
            Payload::Decoded {
                bytes: Some(bytes), ..
            } => Ok(Cow::Borrowed(bytes)),
            Payload::Decoded { value, bytes: None } => Ok(Cow::Owned(encode(self.key, value, ctx)?)),
        }
    }

    /// Write the envelope and payload. A modified entry that fails to
    /// compile is written with its last good bytes if it has any.
    pub(crate) fn write(&self, w: &mut Writer, ctx: &Context) -> Result<(), VfbError> {
        let data = match (self.compiled(ctx), &self.fallback) {
            (Ok(data), _) => data,
            (Err(e), Some(previous)) => {
                error!(
                    "Failed to compile entry {} (tag {}): {}; writing its previous data",
                    self.key.name(),
                    self.key.tag(),
                    e
                );
                Cow::Borrowed(previous.as_slice())
            }
            (Err(e), None) => return Err(e),
        };
        write_envelope(w, self.key.tag(), self.declared_size.unwrap_or(data.len()))?;
        w.write_bytes(&data);
        Ok(())
    }
}

fn encode(key: Key, value: &Record, ctx: &Context) -> Result<Vec<u8>, VfbError> {
    if !key.is_known() {
        return Err(VfbError::MissingEncoderForTag { tag: key.tag() });
    }
    key.codec().encode(&key.name(), value, ctx)
}

fn write_envelope(w: &mut Writer, tag: u16, size: usize) -> Result<(), VfbError> {
    if tag & LONG_SIZE != 0 {
        return Err(VfbError::invalid(
            "entry tag",
            format!("{} does not fit in 15 bits", tag),
        ));
    }
    if size > 0xFFFF {
        let size = narrow("entry size", size)?;
        w.write_u16(tag | LONG_SIZE);
        w.write_u32(size);
    } else {
        w.write_u16(tag);
        w.write_u16(size as u16);
    }
    Ok(())
}

/// Read the next entry. Returns `None` at the end-of-stream marker, or at
/// the end of the data if the marker is missing.
pub(crate) fn read_entry(r: &mut Reader) -> Result<Option<Entry>, VfbError> {
    if r.is_empty() {
        warn!("The file ends without an end marker");
        return Ok(None);
    }
    let raw_tag = r.read_u16()?;
    let tag = raw_tag & !LONG_SIZE;
    if tag == END_TAG && r.peek(END_MARKER.len()) == Some(&END_MARKER[..]) {
        r.read_bytes(END_MARKER.len())?;
        return Ok(None);
    }
    let size = if raw_tag & LONG_SIZE != 0 {
        r.read_u32()? as usize
    } else {
        r.read_u16()? as usize
    };
    let key = Key::from_tag(tag);
    let mut declared_size = None;
    let data = if key == Key::E1410 {
        if size != 4 {
            warn!("Entry 1410 with size {}", size);
        }
        if size != FL3_1410_SIZE {
            declared_size = Some(size);
        }
        r.read_bytes(FL3_1410_SIZE)?
    } else {
        r.read_bytes(size)?
    };
    Ok(Some(Entry {
        key,
        payload: Payload::Raw(data.to_vec()),
        declared_size,
        fallback: None,
    }))
}

pub(crate) fn write_end(w: &mut Writer) {
    w.write_u16(END_TAG);
    w.write_bytes(&END_MARKER);
}

#[derive(Serialize)]
#[serde(untagged)]
enum EntryJson<'a> {
    Decoded {
        key: Key,
        decompiled: &'a Record,
    },
    Raw {
        key: Key,
        size: usize,
        #[serde(serialize_with = "hex_bytes")]
        data: &'a [u8],
    },
}

impl Serialize for Entry {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let json = match &self.payload {
            Payload::Decoded { value, .. } => EntryJson::Decoded {
                key: self.key,
                decompiled: value,
            },
            Payload::Raw(data) => EntryJson::Raw {
                key: self.key,
                size: data.len(),
                data,
            },
        };
        json.serialize(serializer)
    }
}
