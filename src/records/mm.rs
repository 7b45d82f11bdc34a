//! Multiple master records: master locations, axis mappings and instances.

use serde::{Deserialize, Serialize};

use crate::{
    context::Context,
    stream::{Reader, Writer},
    VfbError,
};

/// Position of one master on all four axes, whether they are used or not.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MasterLocation {
    pub master_index: u32,
    pub location: [f64; 4],
}

impl MasterLocation {
    pub(crate) fn decode(r: &mut Reader) -> Result<Self, VfbError> {
        Ok(MasterLocation {
            master_index: r.read_u32()?,
            location: r.read_f64s()?,
        })
    }

    pub(crate) fn encode(&self, w: &mut Writer) {
        w.write_u32(self.master_index);
        for v in self.location {
            w.write_f64(v);
        }
    }
}

/// (user, design) coordinate pairs. Only the first pairs of each axis as given
/// by the Axis Mappings Count entry are in use; the rest may hold junk.
pub(crate) fn axis_mappings(r: &mut Reader) -> Result<Vec<(f64, f64)>, VfbError> {
    let mut mappings = Vec::with_capacity(r.remaining() / 16);
    while r.remaining() >= 16 {
        mappings.push((r.read_f64()?, r.read_f64()?));
    }
    Ok(mappings)
}

pub(crate) fn write_axis_mappings(mappings: &[(f64, f64)], w: &mut Writer) {
    for (user, design) in mappings {
        w.write_f64(*user);
        w.write_f64(*design);
    }
}

/// The anisotropic interpolation graph of each axis.
pub(crate) fn anisotropic(r: &mut Reader) -> Result<Vec<Vec<(i32, i32)>>, VfbError> {
    let mut axes = vec![];
    while !r.is_empty() {
        let count = r.count()?;
        let mut axis = Vec::with_capacity(count.min(r.remaining()));
        for _ in 0..count {
            axis.push((r.value()?, r.value()?));
        }
        axes.push(axis);
    }
    Ok(axes)
}

pub(crate) fn write_anisotropic(axes: &[Vec<(i32, i32)>], w: &mut Writer) -> Result<(), VfbError> {
    for axis in axes {
        w.count(axis.len())?;
        for (src, tgt) in axis {
            w.value(*src);
            w.value(*tgt);
        }
    }
    Ok(())
}

/// A named instance. The axis positions are stored as integers, scaled by
/// 10000.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryInstance {
    pub name: String,
    pub values: [i32; 4],
}

impl PrimaryInstance {
    pub fn location(&self) -> [f64; 4] {
        self.values.map(|v| v as f64 / 10000.0)
    }
}

pub(crate) fn primary_instances(r: &mut Reader, ctx: &Context) -> Result<Vec<PrimaryInstance>, VfbError> {
    let count = r.count()?;
    let mut instances = Vec::with_capacity(count.min(r.remaining()));
    for _ in 0..count {
        let name = r.str_with_len(ctx.encoding)?;
        let mut values = [0; 4];
        for slot in values.iter_mut() {
            *slot = r.value()?;
        }
        instances.push(PrimaryInstance { name, values });
    }
    Ok(instances)
}

pub(crate) fn write_primary_instances(
    instances: &[PrimaryInstance],
    w: &mut Writer,
    ctx: &Context,
) -> Result<(), VfbError> {
    w.count(instances.len())?;
    for instance in instances {
        w.str_with_len(&instance.name, ctx.encoding)?;
        for v in instance.values {
            w.value(v);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::serde_helpers::from_hex;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_master_location() {
        let data = from_hex(
            "02000000000000000000f03f000000000000000000000000000000000000000000000000",
        )
        .unwrap();
        let location = MasterLocation::decode(&mut Reader::new(&data)).unwrap();
        assert_eq!(location.master_index, 2);
        assert_eq!(location.location, [1.0, 0.0, 0.0, 0.0]);
        let mut w = Writer::new();
        location.encode(&mut w);
        assert_eq!(w.into_inner(), data);
    }

    #[test]
    fn test_anisotropic() {
        let data = from_hex("8d8b8bfa7cfa7c").unwrap();
        let axes = anisotropic(&mut Reader::new(&data)).unwrap();
        assert_eq!(axes, vec![vec![(0, 0), (1000, 1000)]]);
        let mut w = Writer::new();
        write_anisotropic(&axes, &mut w).unwrap();
        assert_eq!(w.into_inner(), data);
    }

    #[test]
    fn test_axis_mappings() {
        let data = from_hex("0000000000006940 0000000000000000 0000000000c07240 83c0caa145b6b33f")
            .unwrap();
        let mappings = axis_mappings(&mut Reader::new(&data)).unwrap();
        assert_eq!(mappings, vec![(200.0, 0.0), (300.0, 0.077)]);
        let mut w = Writer::new();
        write_axis_mappings(&mappings, &mut w);
        assert_eq!(w.into_inner(), data);
    }

    #[test]
    fn test_primary_instances() {
        let ctx = Context::default();
        let instances = vec![PrimaryInstance {
            name: "Bold".to_string(),
            values: [7500, 0, 0, 0],
        }];
        let mut w = Writer::new();
        write_primary_instances(&instances, &mut w, &ctx).unwrap();
        let bytes = w.into_inner();
        assert_eq!(bytes, from_hex("8c 8f 426f6c64 ff00001d4c 8b 8b 8b").unwrap());
        let decoded = primary_instances(&mut Reader::new(&bytes), &ctx).unwrap();
        assert_eq!(decoded, instances);
        assert_eq!(decoded[0].location(), [0.75, 0.0, 0.0, 0.0]);
    }
}
