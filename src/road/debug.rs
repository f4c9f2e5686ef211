use serde::Serialize;

use crate::geom::Point3;

use super::quads::MeshQuad;
use super::road_data::RoadData;

pub type Rgba = [f32; 4];

pub const CENTER_COLOR: Rgba = [1.0, 1.0, 0.0, 1.0];
pub const LEFT_COLOR: Rgba = [0.0, 0.6, 1.0, 1.0];
pub const RIGHT_COLOR: Rgba = [1.0, 0.3, 0.0, 1.0];
pub const KNOT_COLOR: Rgba = [1.0, 0.0, 1.0, 1.0];
pub const QUAD_COLOR: Rgba = [0.4, 0.4, 0.4, 1.0];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DebugLine {
    pub start: [f64; 3],
    pub end: [f64; 3],
    pub color: Rgba,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DebugPoint {
    pub position: [f64; 3],
    pub color: Rgba,
}

/// Lines and points a renderer can draw over the road.
///
/// Owned by whoever renders the frame and passed into generation explicitly;
/// call [`clear`](Self::clear) between frames.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DebugDrawBatch {
    pub lines: Vec<DebugLine>,
    pub points: Vec<DebugPoint>,
}

impl DebugDrawBatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.points.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.points.is_empty()
    }

    pub fn line(&mut self, start: Point3, end: Point3, color: Rgba) {
        self.lines.push(DebugLine {
            start: start.to_array(),
            end: end.to_array(),
            color,
        });
    }

    pub fn point(&mut self, position: Point3, color: Rgba) {
        self.points.push(DebugPoint {
            position: position.to_array(),
            color,
        });
    }

    pub fn polyline(&mut self, points: &[Point3], closed: bool, color: Rgba) {
        for w in points.windows(2) {
            self.line(w[0], w[1], color);
        }
        if closed && points.len() > 2 {
            if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
                if first != last {
                    self.line(last, first, color);
                }
            }
        }
    }

    /// Centerline, both boundaries and the knot rows of one road.
    pub fn add_road(&mut self, road: &RoadData) {
        self.polyline(&road.center_points, road.is_closed, CENTER_COLOR);
        self.polyline(&road.left_points, road.is_closed, LEFT_COLOR);
        self.polyline(&road.right_points, road.is_closed, RIGHT_COLOR);
        for (point, _) in road
            .center_points
            .iter()
            .zip(&road.is_knot_point)
            .filter(|(_, knot)| **knot)
        {
            self.point(*point, KNOT_COLOR);
        }
    }

    pub fn add_quads(&mut self, quads: &[MeshQuad]) {
        for quad in quads {
            self.polyline(&quad.corners(), true, QUAD_COLOR);
        }
    }
}
