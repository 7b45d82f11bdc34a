//! Background images and embedded glyph bitmaps.
//!
//! The pixel data stays in its run-length encoded form; [`rle_unpack`] and
//! [`rle_pack`] convert between that and plain bytes.

use serde::{Deserialize, Serialize};

use crate::{
    serde_helpers::{hex_bytes, unhex_bytes},
    stream::{Reader, Writer},
    VfbError,
};

const MAX_CHUNK: usize = 128;

/// Expand run-length encoded bitmap data.
///
/// A signed count byte `n >= 0` is followed by `n + 1` literal bytes, a
/// negative `n` by one byte that is repeated `1 - n` times.
pub fn rle_unpack(data: &[u8]) -> Result<Vec<u8>, VfbError> {
    let mut r = Reader::new(data);
    let mut out = Vec::with_capacity(data.len() * 2);
    while !r.is_empty() {
        let n = r.read_i8()? as isize;
        if n >= 0 {
            out.extend_from_slice(r.read_bytes(n as usize + 1)?);
        } else {
            let byte = r.read_u8()?;
            out.extend(std::iter::repeat(byte).take((1 - n) as usize));
        }
    }
    Ok(out)
}

fn flush_literals(literals: &mut Vec<u8>, out: &mut Vec<u8>) {
    for chunk in literals.chunks(MAX_CHUNK) {
        out.push((chunk.len() - 1) as u8);
        out.extend_from_slice(chunk);
    }
    literals.clear();
}

/// Run-length encode bitmap data the way FontLab does: runs of three or more
/// equal bytes are repeated, everything else is copied literally.
pub fn rle_pack(data: &[u8]) -> Vec<u8> {
    let mut out = vec![];
    let mut literals = vec![];
    let mut rest = data;
    while let Some(&byte) = rest.first() {
        let run = rest.iter().take_while(|b| **b == byte).count();
        if run > 2 {
            flush_literals(&mut literals, &mut out);
            let mut left = run;
            while left > 0 {
                let n = left.min(MAX_CHUNK);
                out.push((1 - n as isize) as i8 as u8);
                out.push(byte);
                left -= n;
            }
        } else {
            literals.extend_from_slice(&rest[..run]);
        }
        rest = &rest[run..];
    }
    flush_literals(&mut literals, &mut out);
    out
}

fn read_pair(r: &mut Reader) -> Result<(i32, i32), VfbError> {
    Ok((r.value()?, r.value()?))
}

fn read_size(r: &mut Reader) -> Result<(u32, u32), VfbError> {
    Ok((r.value_unsigned()?, r.value_unsigned()?))
}

fn read_data(r: &mut Reader) -> Result<Vec<u8>, VfbError> {
    let length = r.count()?;
    Ok(r.read_bytes(length)?.to_vec())
}

fn write_data(data: &[u8], w: &mut Writer) -> Result<(), VfbError> {
    w.count(data.len())?;
    w.write_bytes(data);
    Ok(())
}

/// The background image of a glyph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub origin: (i32, i32),
    pub size_units: (i32, i32),
    pub size_pixels: (u32, u32),
    #[serde(serialize_with = "hex_bytes", deserialize_with = "unhex_bytes")]
    pub data: Vec<u8>,
}

impl Image {
    pub(crate) fn decode(r: &mut Reader) -> Result<Self, VfbError> {
        Ok(Image {
            origin: read_pair(r)?,
            size_units: read_pair(r)?,
            size_pixels: read_size(r)?,
            data: read_data(r)?,
        })
    }

    pub(crate) fn encode(&self, w: &mut Writer) -> Result<(), VfbError> {
        for v in [self.origin.0, self.origin.1, self.size_units.0, self.size_units.1] {
            w.value(v);
        }
        w.value_unsigned(self.size_pixels.0);
        w.value_unsigned(self.size_pixels.1);
        write_data(&self.data, w)
    }
}

/// A hand-tuned bitmap for one pixel size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlyphBitmap {
    pub ppm: i32,
    pub origin: (i32, i32),
    pub adv: (i32, i32),
    pub size_pixels: (u32, u32),
    #[serde(serialize_with = "hex_bytes", deserialize_with = "unhex_bytes")]
    pub data: Vec<u8>,
}

pub(crate) fn glyph_bitmaps(r: &mut Reader) -> Result<Vec<GlyphBitmap>, VfbError> {
    let count = r.count()?;
    let mut bitmaps = Vec::with_capacity(count.min(r.remaining()));
    for _ in 0..count {
        bitmaps.push(GlyphBitmap {
            ppm: r.value()?,
            origin: read_pair(r)?,
            adv: read_pair(r)?,
            size_pixels: read_size(r)?,
            data: read_data(r)?,
        });
    }
    Ok(bitmaps)
}

pub(crate) fn write_glyph_bitmaps(bitmaps: &[GlyphBitmap], w: &mut Writer) -> Result<(), VfbError> {
    w.count(bitmaps.len())?;
    for bitmap in bitmaps {
        for v in [
            bitmap.ppm,
            bitmap.origin.0,
            bitmap.origin.1,
            bitmap.adv.0,
            bitmap.adv.1,
        ] {
            w.value(v);
        }
        w.value_unsigned(bitmap.size_pixels.0);
        w.value_unsigned(bitmap.size_pixels.1);
        write_data(&bitmap.data, w)?;
    }
    Ok(())
}
