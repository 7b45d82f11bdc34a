//! Byte-level cursor and output buffer used by every codec.
//!
//! Fixed-width scalars are little-endian; the variable-width values of
//! [`crate::value`] are read and written through the same types.

use crate::{text::Encoding, value, VfbError};

/// A forward-only cursor over a byte slice.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Reader { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Take the next `n` bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], VfbError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.data.len())
            .ok_or(VfbError::Truncated {
                offset: self.pos,
                wanted: n,
            })?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    /// Look at the next `n` bytes without consuming them.
    pub fn peek(&self, n: usize) -> Option<&'a [u8]> {
        self.data.get(self.pos..self.pos.checked_add(n)?)
    }

    /// Take everything up to the end of the data.
    pub fn read_rest(&mut self) -> &'a [u8] {
        let bytes = &self.data[self.pos.min(self.data.len())..];
        self.pos = self.data.len();
        bytes
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], VfbError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, VfbError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8, VfbError> {
        Ok(i8::from_le_bytes(self.read_array()?))
    }

    pub fn read_u16(&mut self) -> Result<u16, VfbError> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_i16(&mut self) -> Result<i16, VfbError> {
        Ok(i16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, VfbError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32, VfbError> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_f64(&mut self) -> Result<f64, VfbError> {
        Ok(f64::from_le_bytes(self.read_array()?))
    }

    pub fn read_f64s<const N: usize>(&mut self) -> Result<[f64; N], VfbError> {
        let mut out = [0.0; N];
        for slot in out.iter_mut() {
            *slot = self.read_f64()?;
        }
        Ok(out)
    }

    /// A signed variable-width value.
    pub fn value(&mut self) -> Result<i32, VfbError> {
        value::decode(self)
    }

    /// An unsigned variable-width value.
    pub fn value_unsigned(&mut self) -> Result<u32, VfbError> {
        value::decode_unsigned(self)
    }

    /// A variable-width value used as an element count.
    pub fn count(&mut self) -> Result<usize, VfbError> {
        let offset = self.pos;
        let count = self.value()?;
        usize::try_from(count)
            .map_err(|_| VfbError::invalid("count", format!("{} at offset {}", count, offset)))
    }

    /// `n` bytes of text in the given encoding.
    pub fn read_str(&mut self, n: usize, encoding: Encoding) -> Result<String, VfbError> {
        encoding.decode(self.read_bytes(n)?)
    }

    /// A string preceded by its byte length as a variable-width value.
    pub fn str_with_len(&mut self, encoding: Encoding) -> Result<String, VfbError> {
        let n = self.count()?;
        self.read_str(n, encoding)
    }
}

/// A growable output buffer with the same vocabulary as [`Reader`].
#[derive(Debug, Default, Clone)]
pub struct Writer {
    data: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Writer::default()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    pub fn write_u8(&mut self, v: u8) {
        self.data.push(v);
    }

    pub fn write_i8(&mut self, v: i8) {
        self.data.extend(v.to_le_bytes());
    }

    pub fn write_u16(&mut self, v: u16) {
        self.data.extend(v.to_le_bytes());
    }

    pub fn write_i16(&mut self, v: i16) {
        self.data.extend(v.to_le_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.data.extend(v.to_le_bytes());
    }

    pub fn write_i32(&mut self, v: i32) {
        self.data.extend(v.to_le_bytes());
    }

    pub fn write_f64(&mut self, v: f64) {
        self.data.extend(v.to_le_bytes());
    }

    pub fn value(&mut self, v: i32) {
        value::encode(v, &mut self.data);
    }

    pub fn value_unsigned(&mut self, v: u32) {
        value::encode_unsigned(v, &mut self.data);
    }

    pub fn value_long(&mut self, v: i32) {
        value::encode_long(v, &mut self.data);
    }

    pub fn value_long_unsigned(&mut self, v: u32) {
        value::encode_long_unsigned(v, &mut self.data);
    }

    /// Write a collection length as a variable-width value.
    pub fn count(&mut self, n: usize) -> Result<(), VfbError> {
        let n = i32::try_from(n).map_err(|_| VfbError::invalid("count", n.to_string()))?;
        self.value(n);
        Ok(())
    }

    /// Write text, padded with NUL bytes up to `pad` bytes.
    pub fn write_str(&mut self, s: &str, encoding: Encoding, pad: usize) -> Result<(), VfbError> {
        let bytes = encoding.encode(s)?;
        let padding = pad.saturating_sub(bytes.len());
        self.data.extend(bytes);
        self.data.extend(std::iter::repeat(0).take(padding));
        Ok(())
    }

    pub fn str_with_len(&mut self, s: &str, encoding: Encoding) -> Result<(), VfbError> {
        let bytes = encoding.encode(s)?;
        self.count(bytes.len())?;
        self.data.extend(bytes);
        Ok(())
    }
}
