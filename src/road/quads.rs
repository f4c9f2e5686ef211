//! Quad strips and their adaptive refinement.

use crate::geom::{Point3, PointGrid, Tolerance};

use super::road_data::RoadData;

/// One ribbon cell between two consecutive center rows.
///
/// Corners: `a` left-start, `b` right-start, `c` right-end, `d` left-end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshQuad {
    pub a: Point3,
    pub b: Point3,
    pub c: Point3,
    pub d: Point3,
    pub center_start: Point3,
    pub center_end: Point3,
}

impl MeshQuad {
    #[must_use]
    pub const fn corners(&self) -> [Point3; 4] {
        [self.a, self.b, self.c, self.d]
    }

    /// Longer of the two side edges (`a–d`, `b–c`).
    #[must_use]
    pub fn max_side_length(&self) -> f64 {
        self.a.distance_to(self.d).max(self.b.distance_to(self.c))
    }
}

/// Emits one quad per consecutive pair of center rows. Corners are the
/// boundary points each row was matched to by the center rebuild, or the
/// closest allowed candidates when no matches were recorded.
///
/// With `connect_end_to_start` a closing quad from the last row back to row 0
/// is added unless those two rows already share their corners.
#[must_use]
pub fn build_quads(road: &RoadData, connect_end_to_start: bool) -> Vec<MeshQuad> {
    let n = road.center_points.len();
    let corners: Vec<Option<(Point3, Point3)>> = (0..n).map(|i| road.corners_at(i)).collect();
    let mut quads = Vec::with_capacity(n);

    let mut push = |from: usize, to: usize| {
        if let (Some((a, b)), Some((d, c))) = (corners[from], corners[to]) {
            quads.push(MeshQuad {
                a,
                b,
                c,
                d,
                center_start: road.center_points[from],
                center_end: road.center_points[to],
            });
        }
    };

    for i in 1..n {
        push(i - 1, i);
    }

    if connect_end_to_start && n > 2 && corners[n - 1] != corners[0] {
        push(n - 1, 0);
    }

    quads
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubdivideOptions {
    /// Side edges longer than this are bisected. Non-positive disables.
    pub max_edge_length: f64,
}

impl SubdivideOptions {
    #[must_use]
    pub const fn new(max_edge_length: f64) -> Self {
        Self { max_edge_length }
    }
}

impl Default for SubdivideOptions {
    fn default() -> Self {
        Self::new(0.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubdivideDiagnostics {
    pub input_quad_count: usize,
    pub output_quad_count: usize,
    pub subdivided_quad_count: usize,
    /// Midpoints that were snapped onto a reference point.
    pub snapped_midpoints: usize,
}

/// Bisects quads whose side edges exceed the threshold. Single pass.
///
/// New side midpoints are snapped to the nearest point of `reference` when
/// that point is not one of the quad's own corners; otherwise the straight
/// midpoint is kept. A side collapsed to a single point is never snapped.
pub fn subdivide_quads(
    quads: &[MeshQuad],
    reference: Option<&PointGrid>,
    options: SubdivideOptions,
) -> (Vec<MeshQuad>, SubdivideDiagnostics) {
    let mut diagnostics = SubdivideDiagnostics {
        input_quad_count: quads.len(),
        output_quad_count: quads.len(),
        ..Default::default()
    };

    let threshold = options.max_edge_length;
    if !threshold.is_finite() || threshold <= 0.0 {
        return (quads.to_vec(), diagnostics);
    }

    let mut snap = |raw: Point3, ends: [Point3; 2]| -> Point3 {
        // a side pinched to one point stays pinched
        if Tolerance::WELD.approx_eq_point3(ends[0], ends[1]) {
            return raw;
        }
        let Some((_, snapped)) = reference.and_then(|grid| grid.nearest(raw)) else {
            return raw;
        };
        if ends.iter().any(|e| Tolerance::WELD.approx_eq_point3(*e, snapped)) {
            return raw;
        }
        diagnostics.snapped_midpoints += 1;
        snapped
    };

    let mut out = Vec::with_capacity(quads.len() * 2);
    let mut subdivided = 0;
    for quad in quads {
        if quad.max_side_length() <= threshold {
            out.push(*quad);
            continue;
        }

        let left_mid = snap(quad.a.midpoint(quad.d), [quad.a, quad.d]);
        let right_mid = snap(quad.b.midpoint(quad.c), [quad.b, quad.c]);
        let center_mid = quad.center_start.midpoint(quad.center_end);

        out.push(MeshQuad {
            a: quad.a,
            b: quad.b,
            c: right_mid,
            d: left_mid,
            center_start: quad.center_start,
            center_end: center_mid,
        });
        out.push(MeshQuad {
            a: left_mid,
            b: right_mid,
            c: quad.c,
            d: quad.d,
            center_start: center_mid,
            center_end: quad.center_end,
        });
        subdivided += 1;
    }

    diagnostics.subdivided_quad_count = subdivided;
    diagnostics.output_quad_count = out.len();
    (out, diagnostics)
}
