//! Polyline utilities: length, uniform resampling and self-intersection clipping.
//!
//! Closed polylines are passed around without a duplicated seam point unless
//! a function says otherwise; [`clip_self_intersections`] is the exception
//! and always returns closed rings with `first == last`.
//!
//! # Operations
//! - **Length**: cumulative segment length, optionally including the closing segment.
//! - **Resample**: re-derives uniform arc-length spacing.
//! - **Clip**: removes loops formed where non-adjacent segments pass too close.

use super::core::{BBox, Point3, Tolerance};

/// Hard cap on the number of points a resample may emit.
pub const MAX_RESAMPLE_POINTS: usize = 200_000;

/// Seam points of a closed resample closer than this fraction of the
/// spacing are merged into one.
pub const SEAM_MERGE_FACTOR: f64 = 0.65;

/// Total length of a polyline, including the closing segment when `closed`.
#[must_use]
pub fn polyline_length(points: &[Point3], closed: bool) -> f64 {
    let open: f64 = points.windows(2).map(|w| w[0].distance_to(w[1])).sum();
    match (closed, points.first(), points.last()) {
        (true, Some(first), Some(last)) if points.len() > 2 => open + last.distance_to(*first),
        _ => open,
    }
}

/// Drops consecutive points closer than `tol`.
#[must_use]
pub fn remove_degenerate_segments(points: &[Point3], tol: Tolerance) -> Vec<Point3> {
    let mut out: Vec<Point3> = Vec::with_capacity(points.len());
    for &p in points {
        if out.last().is_some_and(|last| tol.approx_eq_point3(*last, p)) {
            continue;
        }
        out.push(p);
    }
    out
}

// ============================================================================
// Resample
// ============================================================================

/// Options for uniform arc-length resampling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResampleOptions {
    /// Target distance between consecutive output points.
    pub spacing: f64,
    /// Whether the polyline is closed (the closing segment is walked too).
    pub closed: bool,
}

impl ResampleOptions {
    #[must_use]
    pub const fn new(spacing: f64) -> Self {
        Self {
            spacing,
            closed: false,
        }
    }

    #[must_use]
    pub const fn closed(mut self, closed: bool) -> Self {
        self.closed = closed;
        self
    }
}

impl Default for ResampleOptions {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Diagnostics for resampling operations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResampleDiagnostics {
    pub input_point_count: usize,
    pub output_point_count: usize,
    /// Total walked length, closing segment included.
    pub total_length: f64,
    /// Actual spacing used (total length divided by the segment count).
    pub effective_spacing: f64,
    /// Whether the closed seam was merged into a single point.
    pub seam_merged: bool,
    /// Whether the output hit [`MAX_RESAMPLE_POINTS`].
    pub capped: bool,
    /// Whether the point before the last one of an open path was moved into
    /// the endpoint bounding box.
    pub end_clamped: bool,
}

/// Resamples a polyline so consecutive points sit at (nearly) uniform arc length.
///
/// Open paths always keep their exact first and last point. The interpolated
/// point before the forced last point is clamped into the bounding box of the
/// two original endpoints, and dropped if the clamp leaves it closer than
/// [`SEAM_MERGE_FACTOR`] × spacing to the last point. Closed paths never duplicate the seam: if
/// the synthesized first and last points end up closer than
/// [`SEAM_MERGE_FACTOR`] × spacing they are averaged into one point.
///
/// Fewer than two points or a non-positive spacing return the input unchanged.
pub fn resample_polyline(
    points: &[Point3],
    options: ResampleOptions,
) -> (Vec<Point3>, ResampleDiagnostics) {
    let mut diagnostics = ResampleDiagnostics {
        input_point_count: points.len(),
        output_point_count: points.len(),
        ..Default::default()
    };

    let spacing = options.spacing;
    if points.len() < 2 || !spacing.is_finite() || spacing <= 0.0 {
        return (points.to_vec(), diagnostics);
    }

    let mut segments: Vec<(Point3, Point3, f64)> = points
        .windows(2)
        .map(|w| (w[0], w[1], w[0].distance_to(w[1])))
        .collect();
    if options.closed && points.len() > 2 {
        let (first, last) = (points[0], points[points.len() - 1]);
        let closing = last.distance_to(first);
        if !Tolerance::WELD.is_zero_length(closing) {
            segments.push((last, first, closing));
        }
    }

    let total_length: f64 = segments.iter().map(|s| s.2).sum();
    diagnostics.total_length = total_length;
    if !total_length.is_finite() || Tolerance::WELD.is_zero_length(total_length) {
        return (points.to_vec(), diagnostics);
    }

    let min_count = if options.closed { 3 } else { 1 };
    let mut count = ((total_length / spacing).round() as usize).max(min_count);
    if count > MAX_RESAMPLE_POINTS {
        count = MAX_RESAMPLE_POINTS;
        diagnostics.capped = true;
    }
    let step = total_length / count as f64;
    diagnostics.effective_spacing = step;

    let mut samples: Vec<Point3> = Vec::with_capacity(count + 1);
    let mut accumulated = 0.0;
    let mut seg_idx = 0;

    for k in 0..count {
        let target = k as f64 * step;
        while seg_idx + 1 < segments.len() && accumulated + segments[seg_idx].2 < target {
            accumulated += segments[seg_idx].2;
            seg_idx += 1;
        }
        let (start, end, len) = segments[seg_idx];
        let t = if Tolerance::ZERO_LENGTH.is_zero_length(len) {
            0.0
        } else {
            ((target - accumulated) / len).clamp(0.0, 1.0)
        };
        samples.push(start.lerp(end, t));
    }

    if options.closed {
        if samples.len() >= 2 {
            let first = samples[0];
            let last = samples[samples.len() - 1];
            if first.distance_to(last) < SEAM_MERGE_FACTOR * spacing {
                samples[0] = first.midpoint(last);
                samples.pop();
                diagnostics.seam_merged = true;
            }
        }
    } else {
        let last = points[points.len() - 1];
        let bounds = BBox::from_points(&[points[0], last]).filter(|_| samples.len() >= 2);
        if let Some(bounds) = bounds {
            let last_index = samples.len() - 1;
            let clamped = bounds.clamp_point(samples[last_index]);
            if clamped != samples[last_index] {
                diagnostics.end_clamped = true;
            }
            if clamped.distance_to(last) < SEAM_MERGE_FACTOR * spacing {
                samples.pop();
            } else {
                samples[last_index] = clamped;
            }
        }
        samples.push(last);
    }

    diagnostics.output_point_count = samples.len();
    (samples, diagnostics)
}

// ============================================================================
// Self-intersection clipping
// ============================================================================

/// Options for [`clip_self_intersections`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipOptions {
    /// Non-adjacent segments closer than this are treated as crossing.
    pub min_distance: f64,
    /// Maximum number of clip passes.
    pub max_iterations: usize,
    /// Whether the polyline is a closed ring.
    pub closed: bool,
}

impl ClipOptions {
    #[must_use]
    pub const fn new(min_distance: f64) -> Self {
        Self {
            min_distance,
            max_iterations: 64,
            closed: false,
        }
    }

    #[must_use]
    pub const fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    #[must_use]
    pub const fn closed(mut self, closed: bool) -> Self {
        self.closed = closed;
        self
    }
}

impl Default for ClipOptions {
    fn default() -> Self {
        Self::new(0.1)
    }
}

/// Diagnostics for self-intersection clipping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClipDiagnostics {
    pub input_point_count: usize,
    pub output_point_count: usize,
    /// Number of loops spliced out.
    pub intersections_clipped: usize,
    /// Total polyline length removed by the splices.
    pub removed_length: f64,
    /// Whether the iteration cap stopped the scan before it converged.
    pub hit_iteration_cap: bool,
}

/// A pair of non-adjacent segments that pass within the separation tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelfIntersection {
    /// Index of the first segment (`points[i]` → `points[i + 1]`).
    pub first_segment: usize,
    /// Index of the second segment, always greater than `first_segment`.
    pub second_segment: usize,
    /// Midpoint of the two closest points.
    pub point: Point3,
    /// Distance between the two closest points.
    pub distance: f64,
}

/// Closest points between segments `p1q1` and `p2q2`.
///
/// Returns the parameters `(s, t)` on each segment and the two points.
#[must_use]
pub fn closest_points_between_segments(
    p1: Point3,
    q1: Point3,
    p2: Point3,
    q2: Point3,
) -> (f64, f64, Point3, Point3) {
    let d1 = q1.sub_point(p1);
    let d2 = q2.sub_point(p2);
    let r = p1.sub_point(p2);
    let a = d1.dot(d1);
    let e = d2.dot(d2);
    let f = d2.dot(r);
    let eps = Tolerance::ZERO_LENGTH.eps;

    let (s, t) = if a <= eps && e <= eps {
        (0.0, 0.0)
    } else if a <= eps {
        (0.0, (f / e).clamp(0.0, 1.0))
    } else {
        let c = d1.dot(r);
        if e <= eps {
            ((-c / a).clamp(0.0, 1.0), 0.0)
        } else {
            let b = d1.dot(d2);
            let denom = a * e - b * b;
            let mut s = if denom > eps {
                ((b * f - c * e) / denom).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let mut t = (b * s + f) / e;
            if t < 0.0 {
                t = 0.0;
                s = (-c / a).clamp(0.0, 1.0);
            } else if t > 1.0 {
                t = 1.0;
                s = ((b - c) / a).clamp(0.0, 1.0);
            }
            (s, t)
        }
    };

    (s, t, p1 + d1 * s, p2 + d2 * t)
}

/// Finds the first pair of non-adjacent segments closer than `min_distance`.
///
/// `points` must be in ring form when `closed` (`first == last`), so segment
/// `0` and the last segment count as adjacent. Crossings whose closest point
/// lies within 0.1% of either segment's ends are ignored.
#[must_use]
pub fn find_self_intersection(
    points: &[Point3],
    closed: bool,
    min_distance: f64,
) -> Option<SelfIntersection> {
    if points.len() < 4 {
        return None;
    }
    let segment_count = points.len() - 1;
    let end_margin = Tolerance::SEGMENT_END.eps;
    let interior = |u: f64| u > end_margin && u < 1.0 - end_margin;

    for i in 0..segment_count {
        for j in (i + 2)..segment_count {
            if closed && i == 0 && j == segment_count - 1 {
                continue;
            }
            let (s, t, c1, c2) =
                closest_points_between_segments(points[i], points[i + 1], points[j], points[j + 1]);
            let distance = c1.distance_to(c2);
            if distance < min_distance && interior(s) && interior(t) {
                return Some(SelfIntersection {
                    first_segment: i,
                    second_segment: j,
                    point: c1.midpoint(c2),
                    distance,
                });
            }
        }
    }
    None
}

/// Removes self-crossing loops from a polyline.
///
/// Repeatedly finds the first crossing (see [`find_self_intersection`]) and
/// splices out the arc between the two crossing segments, replacing it with
/// the single crossing point. Open polylines always lose the enclosed loop;
/// closed rings lose whichever of the two arcs is shorter, the enclosed one on
/// a tie. Closed output is in ring form (`first == last`); open output never
/// repeats its first point at the end.
///
/// Stops when no crossing remains or after `max_iterations` passes, returning
/// the best result so far.
pub fn clip_self_intersections(
    points: &[Point3],
    options: ClipOptions,
) -> (Vec<Point3>, ClipDiagnostics) {
    let mut diagnostics = ClipDiagnostics {
        input_point_count: points.len(),
        ..Default::default()
    };

    let mut current = normalize_closure(remove_degenerate_segments(points, Tolerance::WELD), options.closed);
    if !options.min_distance.is_finite() || options.min_distance <= 0.0 {
        diagnostics.output_point_count = current.len();
        return (current, diagnostics);
    }

    let mut converged = false;
    for _ in 0..options.max_iterations {
        let Some(hit) = find_self_intersection(&current, options.closed, options.min_distance)
        else {
            converged = true;
            break;
        };

        let before = polyline_length(&current, false);
        let spliced = splice_crossing(&current, &hit, options.closed);
        let spliced = normalize_closure(remove_degenerate_segments(&spliced, Tolerance::WELD), options.closed);

        let min_points = if options.closed { 4 } else { 2 };
        if spliced.len() < min_points {
            log::warn!(
                "self-intersection clip would collapse the polyline ({} points), keeping previous result",
                spliced.len()
            );
            converged = true;
            break;
        }

        diagnostics.removed_length += (before - polyline_length(&spliced, false)).max(0.0);
        diagnostics.intersections_clipped += 1;
        current = spliced;
    }

    if !converged {
        diagnostics.hit_iteration_cap = true;
        log::warn!(
            "self-intersection clipping stopped after {} iterations",
            options.max_iterations
        );
    }

    diagnostics.output_point_count = current.len();
    (current, diagnostics)
}

fn splice_crossing(points: &[Point3], hit: &SelfIntersection, closed: bool) -> Vec<Point3> {
    let i = hit.first_segment;
    let j = hit.second_segment;
    let x = hit.point;

    let inner_length = x.distance_to(points[i + 1])
        + points[i + 1..=j].windows(2).map(|w| w[0].distance_to(w[1])).sum::<f64>()
        + points[j].distance_to(x);

    let remove_inner = if closed {
        let outer_length = x.distance_to(points[j + 1])
            + points[j + 1..].windows(2).map(|w| w[0].distance_to(w[1])).sum::<f64>()
            + points[..=i].windows(2).map(|w| w[0].distance_to(w[1])).sum::<f64>()
            + points[i].distance_to(x);
        inner_length <= outer_length
    } else {
        true
    };

    if remove_inner {
        let mut out = Vec::with_capacity(points.len());
        out.extend_from_slice(&points[..=i]);
        out.push(x);
        out.extend_from_slice(&points[j + 1..]);
        out
    } else {
        let mut out = Vec::with_capacity(j - i + 2);
        out.push(x);
        out.extend_from_slice(&points[i + 1..=j]);
        out.push(x);
        out
    }
}

/// Closed rings end on their first point; open polylines never do.
fn normalize_closure(mut points: Vec<Point3>, closed: bool) -> Vec<Point3> {
    if points.len() < 2 {
        return points;
    }
    let first = points[0];
    let last = points[points.len() - 1];
    let shared = Tolerance::WELD.approx_eq_point3(first, last);
    if closed {
        if shared {
            let n = points.len();
            points[n - 1] = first;
        } else {
            points.push(first);
        }
    } else if shared && points.len() > 2 {
        points.pop();
    }
    points
}
