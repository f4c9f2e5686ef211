use std::f64::consts::PI;

use crate::geom::Point3;

use super::rebuild::rebuild_sides_from_center;
use super::road_data::RoadData;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothOptions {
    /// Blend factor in `[0, 1]`.
    pub strength: f64,
    pub iterations: usize,
    /// Used to rebuild the boundaries afterwards.
    pub half_width: f64,
}

impl SmoothOptions {
    #[must_use]
    pub const fn new(strength: f64, iterations: usize) -> Self {
        Self {
            strength,
            iterations,
            half_width: 1.0,
        }
    }

    #[must_use]
    pub const fn with_half_width(mut self, half_width: f64) -> Self {
        self.half_width = half_width;
        self
    }
}

impl Default for SmoothOptions {
    fn default() -> Self {
        Self::new(0.5, 3)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SmoothDiagnostics {
    pub moved_point_count: usize,
    pub max_displacement: f64,
    /// Rows where left and right had to be swapped after the rebuild.
    pub swapped_rows: usize,
}

/// Relaxes the centerline and rebuilds both boundaries from it.
///
/// Each iteration moves every non-knot point toward `(prev + 2·curr + next)/4`
/// by `strength · (1 − turn/π)`, so hairpins barely move. Open roads keep
/// their end points. Afterwards every point is blended back toward its
/// original position by `strength`, which bounds the total displacement no
/// matter how many iterations ran.
pub fn smooth_road(road: &mut RoadData, options: SmoothOptions) -> SmoothDiagnostics {
    let mut diagnostics = SmoothDiagnostics::default();
    let n = road.center_points.len();
    let strength = if options.strength.is_finite() {
        options.strength.clamp(0.0, 1.0)
    } else {
        0.0
    };
    if n < 3 || strength <= 0.0 || options.iterations == 0 {
        return diagnostics;
    }

    let closed = road.is_closed;
    let pinned = |i: usize| {
        road.is_knot_point.get(i).copied().unwrap_or(false) || (!closed && (i == 0 || i == n - 1))
    };

    let original = road.center_points.clone();
    let mut current = original.clone();
    for _ in 0..options.iterations {
        let previous = current.clone();
        for i in 0..n {
            if pinned(i) {
                continue;
            }
            let prev = previous[(i + n - 1) % n];
            let curr = previous[i];
            let next = previous[(i + 1) % n];

            let turn = (curr - prev).angle_to(next - curr).unwrap_or(0.0);
            let adjusted = strength * (1.0 - turn / PI);
            let target = Point3::ORIGIN + (prev.to_vec3() + curr.to_vec3() * 2.0 + next.to_vec3()) / 4.0;
            current[i] = curr.lerp(target, adjusted);
        }
    }

    for i in 0..n {
        if pinned(i) {
            continue;
        }
        let blended = original[i].lerp(current[i], strength);
        let moved = blended.distance_to(original[i]);
        if moved > 0.0 {
            diagnostics.moved_point_count += 1;
        }
        diagnostics.max_displacement = diagnostics.max_displacement.max(moved);
        current[i] = blended;
    }

    let (left, right) = rebuild_sides_from_center(&current, options.half_width, closed);
    road.center_points = current;
    road.left_points = left;
    road.right_points = right;
    diagnostics.swapped_rows = enforce_side_consistency(road);
    diagnostics
}

/// Swaps left and right wherever `tangent × (right − center)` points down.
fn enforce_side_consistency(road: &mut RoadData) -> usize {
    let n = road.center_points.len();
    if n < 2 {
        return 0;
    }
    let mut swapped = 0;
    for i in 0..n {
        let center = road.center_points[i];
        let tangent = if i + 1 < n {
            road.center_points[i + 1] - center
        } else {
            center - road.center_points[i - 1]
        };
        let offset = road.right_points[i] - center;
        if tangent.cross(offset).y < 0.0 {
            std::mem::swap(&mut road.left_points[i], &mut road.right_points[i]);
            swapped += 1;
        }
    }
    swapped
}
