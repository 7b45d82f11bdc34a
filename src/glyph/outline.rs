use log::warn;
use serde::{Deserialize, Serialize};

use crate::{
    context::MAX_MASTERS,
    serde_helpers::is_zero,
    stream::{Reader, Writer},
    VfbError,
};

pub type Point = (i32, i32);

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Move,
    Line,
    Curve,
    QCurve,
}

impl NodeKind {
    fn from_command(cmd: u8) -> Result<Self, VfbError> {
        match cmd {
            0 => Ok(NodeKind::Move),
            1 => Ok(NodeKind::Line),
            3 => Ok(NodeKind::Curve),
            4 => Ok(NodeKind::QCurve),
            _ => Err(VfbError::invalid("path command", cmd.to_string())),
        }
    }

    fn command(self) -> u8 {
        match self {
            NodeKind::Move => 0,
            NodeKind::Line => 1,
            NodeKind::Curve => 3,
            NodeKind::QCurve => 4,
        }
    }

    /// Points stored per master: the end point, plus both control points for
    /// a cubic curve.
    pub fn point_count(self) -> usize {
        match self {
            NodeKind::Curve => 3,
            _ => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub flags: u8,
    /// Absolute points indexed by master, then by point: end point first,
    /// followed by the two control points of a curve.
    pub points: Vec<Vec<Point>>,
}

impl Node {
    pub fn new(kind: NodeKind, points: Vec<Vec<Point>>) -> Self {
        Node {
            kind,
            flags: 0,
            points,
        }
    }
}

/// A multiple-master node list, as found in glyphs, glyph masks and the
/// global mask.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    pub num_masters: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<Node>,
}

impl Outline {
    pub fn new(num_masters: usize) -> Self {
        Outline {
            num_masters,
            nodes: vec![],
        }
    }

    /// The "value count" field written before the node list: twice the
    /// number of values that follow the node count.
    pub fn value_count(&self) -> usize {
        let values: usize = self
            .nodes
            .iter()
            .map(|node| 1 + 2 * node.kind.point_count() * self.num_masters)
            .sum();
        2 * values
    }

    pub(crate) fn decode(reader: &mut Reader) -> Result<Self, VfbError> {
        let num_masters = reader.value_unsigned()? as usize;
        if num_masters > MAX_MASTERS {
            return Err(VfbError::invalid(
                "outline master count",
                format!("{} is more than {}", num_masters, MAX_MASTERS),
            ));
        }
        let stored_count = reader.value()?;
        let num_nodes = reader.count()?;

        // Deltas accumulate over the whole node list, across contours.
        let mut current = vec![(0i32, 0i32); num_masters];
        let mut nodes = Vec::with_capacity(num_nodes.min(reader.remaining()));
        for _ in 0..num_nodes {
            let byte = reader.read_u8()?;
            let kind = NodeKind::from_command(byte & 0x0F)?;
            let mut points = vec![Vec::with_capacity(kind.point_count()); num_masters];
            for _ in 0..kind.point_count() {
                for (master_points, pos) in points.iter_mut().zip(current.iter_mut()) {
                    let dx = reader.value()?;
                    let dy = reader.value()?;
                    *pos = (pos.0.wrapping_add(dx), pos.1.wrapping_add(dy));
                    master_points.push(*pos);
                }
            }
            nodes.push(Node {
                kind,
                flags: byte >> 4,
                points,
            });
        }

        let outline = Outline { num_masters, nodes };
        let computed = outline.value_count();
        if usize::try_from(stored_count).ok() != Some(computed) {
            warn!(
                "Outline value count is {}, but the nodes need {}",
                stored_count, computed
            );
        }
        Ok(outline)
    }

    pub(crate) fn encode(&self, w: &mut Writer) -> Result<(), VfbError> {
        w.count(self.num_masters)?;
        w.count(self.value_count())?;
        w.count(self.nodes.len())?;
        let mut current = vec![(0i32, 0i32); self.num_masters];
        for (index, node) in self.nodes.iter().enumerate() {
            if node.flags > 0x0F {
                return Err(VfbError::invalid(
                    format!("flags of node {}", index),
                    node.flags.to_string(),
                ));
            }
            if node.points.len() != self.num_masters
                || node
                    .points
                    .iter()
                    .any(|p| p.len() != node.kind.point_count())
            {
                return Err(VfbError::invalid(
                    format!("points of node {}", index),
                    format!(
                        "expected {} point(s) for each of {} masters",
                        node.kind.point_count(),
                        self.num_masters
                    ),
                ));
            }
            w.write_u8(node.flags << 4 | node.kind.command());
            for j in 0..node.kind.point_count() {
                for (master_points, pos) in node.points.iter().zip(current.iter_mut()) {
                    let (x, y) = master_points[j];
                    w.value(x.wrapping_sub(pos.0));
                    w.value(y.wrapping_sub(pos.1));
                    *pos = (x, y);
                }
            }
        }
        Ok(())
    }

    /// Points of one master, split into contours at each move node. Curve
    /// points are given in drawing order: both control points, then the end
    /// point.
    pub fn contours(&self, master: usize) -> Vec<Vec<(NodeKind, Point)>> {
        let mut contours: Vec<Vec<(NodeKind, Point)>> = vec![];
        for node in &self.nodes {
            let Some(points) = node.points.get(master) else {
                continue;
            };
            if node.kind == NodeKind::Move || contours.is_empty() {
                contours.push(vec![]);
            }
            if let Some(contour) = contours.last_mut() {
                match points.as_slice() {
                    [end, c1, c2] => {
                        contour.push((NodeKind::Curve, *c1));
                        contour.push((NodeKind::Curve, *c2));
                        contour.push((node.kind, *end));
                    }
                    _ => contour.extend(points.iter().map(|p| (node.kind, *p))),
                }
            }
        }
        contours
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use pretty_assertions::assert_eq;

    fn line(kind: NodeKind, x: i32, y: i32) -> Node {
        Node::new(kind, vec![vec![(x, y)]])
    }

    #[test]
    fn test_deltas_accumulate_across_contours() {
        let outline = Outline {
            num_masters: 1,
            nodes: vec![
                line(NodeKind::Move, 100, 100),
                line(NodeKind::Line, 200, 100),
                line(NodeKind::Line, 200, 200),
                line(NodeKind::Line, 100, 150),
            ],
        };
        let mut w = Writer::new();
        outline.encode(&mut w).unwrap();
        let bytes = w.into_inner();
        // masters, value count, node count, then relative coordinates
        assert_eq!(
            bytes,
            crate::serde_helpers::from_hex("8c a3 8f 00 ef ef 01 ef 8b 01 8b ef 01 27 59").unwrap()
        );

        let decoded = Outline::decode(&mut Reader::new(&bytes)).unwrap();
        let points: Vec<Point> = decoded.nodes.iter().map(|n| n.points[0][0]).collect();
        assert_eq!(points, vec![(100, 100), (200, 100), (200, 200), (100, 150)]);
    }

    #[test]
    fn test_second_contour_continues_from_first() {
        let outline = Outline {
            num_masters: 1,
            nodes: vec![
                line(NodeKind::Move, 10, 10),
                line(NodeKind::Line, 20, 10),
                line(NodeKind::Move, 30, 30),
                line(NodeKind::Line, 40, 30),
            ],
        };
        let mut w = Writer::new();
        outline.encode(&mut w).unwrap();
        let bytes = w.into_inner();
        // The second move is relative to (20, 10), not the origin
        assert_eq!(&bytes[9..12], &[0x00, 0x95, 0x9f]);
        assert_eq!(Outline::decode(&mut Reader::new(&bytes)).unwrap(), outline);
        assert_eq!(outline.contours(0).len(), 2);
    }

    #[test]
    fn test_curve_two_masters() {
        let outline = Outline {
            num_masters: 2,
            nodes: vec![
                Node::new(NodeKind::Move, vec![vec![(0, 0)], vec![(10, 0)]]),
                Node {
                    kind: NodeKind::Curve,
                    flags: 8,
                    points: vec![
                        vec![(100, 100), (0, 50), (50, 100)],
                        vec![(110, 120), (10, 60), (60, 120)],
                    ],
                },
                Node::new(NodeKind::QCurve, vec![vec![(-500, 0)], vec![(-1500, 0)]]),
            ],
        };
        let mut w = Writer::new();
        outline.encode(&mut w).unwrap();
        let bytes = w.into_inner();
        assert_eq!(bytes[8], 0x83);
        let decoded = Outline::decode(&mut Reader::new(&bytes)).unwrap();
        assert_eq!(decoded, outline);
        assert_eq!(decoded.value_count(), 2 * (3 + 2 * 5 * 2));

        let contour = &decoded.contours(1)[0];
        assert_eq!(
            contour.iter().map(|(_, p)| *p).collect::<Vec<_>>(),
            vec![(10, 0), (10, 60), (60, 120), (110, 120), (-1500, 0)]
        );
    }

    #[test]
    fn test_empty_outline() {
        let outline = Outline::new(2);
        let mut w = Writer::new();
        outline.encode(&mut w).unwrap();
        assert_eq!(w.into_inner(), vec![0x8d, 0x8b, 0x8b]);
    }

    #[test]
    fn test_wrong_point_count_is_rejected() {
        let outline = Outline {
            num_masters: 2,
            nodes: vec![line(NodeKind::Move, 0, 0)],
        };
        assert!(outline.encode(&mut Writer::new()).is_err());
    }

    #[test]
    fn test_unknown_path_command() {
        assert!(Outline::decode(&mut Reader::new(&[0x8c, 0x8f, 0x8c, 0x02, 0x8b, 0x8b])).is_err());
    }
}
