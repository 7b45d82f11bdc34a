//! Fixed-width scalars and lists of them.

use crate::{
    stream::{Reader, Writer},
    VfbError,
};

use super::{bits_from_list, bits_to_list, narrow};

pub(crate) fn f64_list(r: &mut Reader) -> Result<Vec<f64>, VfbError> {
    let mut values = Vec::with_capacity(r.remaining() / 8);
    while r.remaining() >= 8 {
        values.push(r.read_f64()?);
    }
    Ok(values)
}

pub(crate) fn u16_list(r: &mut Reader) -> Result<Vec<u32>, VfbError> {
    let mut values = Vec::with_capacity(r.remaining() / 2);
    while r.remaining() >= 2 {
        values.push(r.read_u16()? as u32);
    }
    Ok(values)
}

pub(crate) fn u32_list(r: &mut Reader) -> Result<Vec<u32>, VfbError> {
    let mut values = Vec::with_capacity(r.remaining() / 4);
    while r.remaining() >= 4 {
        values.push(r.read_u32()?);
    }
    Ok(values)
}

pub(crate) fn write_u16_list(values: &[u32], w: &mut Writer) -> Result<(), VfbError> {
    for value in values {
        w.write_u16(narrow("16-bit list item", *value)?);
    }
    Ok(())
}

/// Ten signed bytes.
pub(crate) fn panose(r: &mut Reader) -> Result<Vec<i32>, VfbError> {
    let mut values = Vec::with_capacity(10);
    for _ in 0..10 {
        values.push(r.read_i8()? as i32);
    }
    Ok(values)
}

pub(crate) fn write_panose(values: &[i32], w: &mut Writer) -> Result<(), VfbError> {
    if values.len() != 10 {
        return Err(VfbError::invalid(
            "panose",
            format!("{} values instead of 10", values.len()),
        ));
    }
    for value in values {
        w.write_i8(narrow("panose digit", *value)?);
    }
    Ok(())
}

/// The rest of the payload as one little-endian bit field, returned as the
/// list of set bit numbers.
pub(crate) fn unicode_ranges(r: &mut Reader) -> Result<Vec<u32>, VfbError> {
    let bytes = r.read_rest();
    if bytes.len() > 16 {
        return Err(VfbError::invalid(
            "unicode ranges",
            format!("{} bytes is wider than 128 bits", bytes.len()),
        ));
    }
    let mut le = [0u8; 16];
    le[..bytes.len()].copy_from_slice(bytes);
    Ok(bits_to_list(u128::from_le_bytes(le)))
}

pub(crate) fn write_unicode_ranges(bits: &[u32], w: &mut Writer) -> Result<(), VfbError> {
    w.write_bytes(&bits_from_list("unicode range", bits, 128)?.to_le_bytes());
    Ok(())
}

/// Five signed 16-bit values, only written by FontLab 3.
pub(crate) fn fl3_1410(r: &mut Reader) -> Result<Vec<i32>, VfbError> {
    let mut values = Vec::with_capacity(5);
    for _ in 0..5 {
        values.push(r.read_i16()? as i32);
    }
    Ok(values)
}

pub(crate) fn write_i16s(what: &str, values: &[i32], n: usize, w: &mut Writer) -> Result<(), VfbError> {
    if values.len() != n {
        return Err(VfbError::invalid(
            what,
            format!("{} values instead of {}", values.len(), n),
        ));
    }
    for value in values {
        w.write_i16(narrow(what, *value)?);
    }
    Ok(())
}

/// Encoded values up to the end of the payload.
pub(crate) fn value_list(r: &mut Reader) -> Result<Vec<i32>, VfbError> {
    let mut values = vec![];
    while !r.is_empty() {
        values.push(r.value()?);
    }
    Ok(values)
}

pub(crate) fn counted_values(r: &mut Reader) -> Result<Vec<i32>, VfbError> {
    let count = r.count()?;
    let mut values = Vec::with_capacity(count.min(r.remaining()));
    for _ in 0..count {
        values.push(r.value()?);
    }
    Ok(values)
}

pub(crate) fn write_counted_values(values: &[i32], w: &mut Writer) -> Result<(), VfbError> {
    w.count(values.len())?;
    for value in values {
        w.value(*value);
    }
    Ok(())
}
