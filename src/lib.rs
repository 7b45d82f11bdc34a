//! Read and write FontLab Studio 5 `.vfb` font sources.
//!
//! A VFB file is a short header followed by a flat stream of tagged entries.
//! [`Vfb`] scans the stream without decoding it; each [`Entry`] decodes its
//! payload into a [`Record`] on demand and is written back byte for byte
//! unless its value was changed.
#![deny(clippy::unwrap_used, clippy::expect_used)]

mod context;
mod entry;
mod error;
mod features;
pub mod glyph;
mod header;
mod key;
pub mod records;
mod serde_helpers;
pub mod stream;
pub mod text;
pub mod value;
mod vfb;

pub use crate::{
    context::Context,
    entry::{Entry, Payload},
    error::VfbError,
    features::Features,
    glyph::Glyph,
    header::{Creator, Header},
    key::Key,
    records::{Codec, Record},
    vfb::{ReadOptions, Vfb},
};
