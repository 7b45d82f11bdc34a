use serde::{Deserialize, Serialize};

use crate::{
    context::Context,
    stream::{Reader, Writer},
    VfbError,
};

/// Color and name of one guide, addressed by its 1-based index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuideProperty {
    pub index: i32,
    /// `#rrggbb`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuideProperties {
    pub h: Vec<GuideProperty>,
    pub v: Vec<GuideProperty>,
}

const NO_COLOR: i32 = -1;

/// The file stores colors as 0xBBGGRR.
fn color_from_bgr(value: i32) -> Result<Option<String>, VfbError> {
    match value {
        NO_COLOR => Ok(None),
        0..=0xFF_FFFF => {
            let [_, b, g, r] = value.to_be_bytes();
            Ok(Some(format!("#{:02x}{:02x}{:02x}", r, g, b)))
        }
        _ => Err(VfbError::invalid("guide color", value.to_string())),
    }
}

fn color_to_bgr(color: &str) -> Result<u32, VfbError> {
    let invalid = || VfbError::invalid("guide color", color.to_string());
    let hex = color.strip_prefix('#').filter(|h| h.len() == 6).ok_or_else(invalid)?;
    let rgb = u32::from_str_radix(hex, 16).map_err(|_| invalid())?;
    let [_, r, g, b] = rgb.to_be_bytes();
    Ok(u32::from_be_bytes([0, b, g, r]))
}

impl GuideProperties {
    pub(crate) fn decode(r: &mut Reader, ctx: &Context) -> Result<Self, VfbError> {
        let mut properties = GuideProperties::default();
        for direction in [&mut properties.h, &mut properties.v] {
            loop {
                let index = r.value()?;
                if index == 0 {
                    break;
                }
                let color = color_from_bgr(r.value()?)?;
                let name = r.str_with_len(ctx.encoding)?;
                direction.push(GuideProperty {
                    index,
                    color,
                    name: (!name.is_empty()).then_some(name),
                });
            }
        }
        Ok(properties)
    }

    pub(crate) fn encode(&self, w: &mut Writer, ctx: &Context) -> Result<(), VfbError> {
        for direction in [&self.h, &self.v] {
            for property in direction {
                if property.index == 0 {
                    return Err(VfbError::invalid("guide index", "0 ends the list"));
                }
                w.value(property.index);
                match &property.color {
                    Some(color) => w.value_long_unsigned(color_to_bgr(color)?),
                    None => w.value(NO_COLOR),
                }
                w.str_with_len(property.name.as_deref().unwrap_or_default(), ctx.encoding)?;
            }
            w.value(0);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::serde_helpers::from_hex;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_guide_properties() {
        let ctx = Context::default();
        // h: guide 1 red "top", v: guide 2 without color or name
        let data = from_hex("8c ff000000ff 8e 746f70 8b 8d 8a 8b 8b").unwrap();
        let mut reader = Reader::new(&data);
        let properties = GuideProperties::decode(&mut reader, &ctx).unwrap();
        assert!(reader.is_empty());
        assert_eq!(
            properties,
            GuideProperties {
                h: vec![GuideProperty {
                    index: 1,
                    color: Some("#ff0000".to_string()),
                    name: Some("top".to_string()),
                }],
                v: vec![GuideProperty {
                    index: 2,
                    color: None,
                    name: None,
                }],
            }
        );
        let mut w = Writer::new();
        properties.encode(&mut w, &ctx).unwrap();
        assert_eq!(w.into_inner(), data);
    }

    #[test]
    fn test_colors() {
        assert_eq!(color_from_bgr(0x00ff8000).unwrap().unwrap(), "#0080ff");
        assert_eq!(color_to_bgr("#0080ff").unwrap(), 0x00ff8000);
        assert!(color_from_bgr(0x0100_0000).is_err());
        assert!(color_to_bgr("red").is_err());
    }
}
