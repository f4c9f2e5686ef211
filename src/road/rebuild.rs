//! Rebuilding one side of the road from the other.
//!
//! [`rebuild_sides_from_center`] offsets fresh boundaries from a centerline.
//! [`rebuild_center_from_sides`] goes the other way: it resamples the
//! centerline, matches every center point to its nearest left and right
//! boundary points inside a moving index window, and re-centers it between
//! the two matches.

use crate::geom::{Point3, ResampleOptions, resample_polyline};

use super::frame::RightVectorTracker;
use super::road_data::RoadData;

/// Left and right boundaries offset `half_width` from `center`.
///
/// Tangents are central differences (one-sided at the ends of open
/// centerlines, wrapping for closed ones). Boundaries stay at the height of
/// the centerline.
#[must_use]
pub fn rebuild_sides_from_center(center: &[Point3], half_width: f64, closed: bool) -> (Vec<Point3>, Vec<Point3>) {
    let n = center.len();
    let mut left = Vec::with_capacity(n);
    let mut right = Vec::with_capacity(n);
    if n < 2 {
        return (center.to_vec(), center.to_vec());
    }

    let mut tracker = RightVectorTracker::new();
    for i in 0..n {
        let tangent = if closed {
            center[(i + 1) % n] - center[(i + n - 1) % n]
        } else if i == 0 {
            center[1] - center[0]
        } else if i == n - 1 {
            center[n - 1] - center[n - 2]
        } else {
            center[i + 1] - center[i - 1]
        };
        let offset = tracker.next(tangent) * half_width;
        left.push(center[i] - offset);
        right.push(center[i] + offset);
    }

    (left, right)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CenterRebuildOptions {
    pub spacing: f64,
    /// Candidates are restricted to this many indices either side of the
    /// previous match.
    pub max_index_distance: usize,
    pub closed: bool,
}

impl CenterRebuildOptions {
    #[must_use]
    pub const fn new(spacing: f64) -> Self {
        Self {
            spacing,
            max_index_distance: 8,
            closed: false,
        }
    }

    #[must_use]
    pub const fn with_max_index_distance(mut self, distance: usize) -> Self {
        self.max_index_distance = distance;
        self
    }

    #[must_use]
    pub const fn closed(mut self, closed: bool) -> Self {
        self.closed = closed;
        self
    }
}

impl Default for CenterRebuildOptions {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CenterRebuildDiagnostics {
    pub resampled_count: usize,
    pub output_count: usize,
    /// Rows dropped because neither boundary match moved forward.
    pub dropped_count: usize,
    /// Largest distance between a resampled point and its re-centered position.
    pub max_shift: f64,
}

/// Recomputes `road.center_points` from the boundaries.
///
/// The first center point is matched against every boundary point; later
/// points only search `max_index_distance` indices around the previous match
/// (wrapping on closed roads). The candidate indices for each center point are
/// recorded in `allowed_left_from_center` / `allowed_right_from_center`, and
/// the chosen matches in `matched_left` / `matched_right`.
///
/// A row is kept only when neither match steps backwards and at least one
/// steps forward. Where clipping removed a loop from the boundaries, the
/// resampled centerline still runs around that loop; its rows keep hitting
/// the same boundary points near the crossing and are dropped here, so the
/// rebuilt centerline follows the clipped boundaries.
///
/// Closed roads come back in ring form: the last row repeats the first.
/// Empty boundaries leave the road untouched.
pub fn rebuild_center_from_sides(road: &mut RoadData, options: CenterRebuildOptions) -> CenterRebuildDiagnostics {
    let mut diagnostics = CenterRebuildDiagnostics::default();
    if road.center_points.is_empty() || road.left_points.is_empty() || road.right_points.is_empty() {
        return diagnostics;
    }

    let (resampled, _) = resample_polyline(
        &road.center_points,
        ResampleOptions::new(options.spacing).closed(options.closed),
    );
    diagnostics.resampled_count = resampled.len();

    let window = options.max_index_distance.max(1);
    let mut left_matcher = WindowMatcher::new(&road.left_points, window, options.closed);
    let mut right_matcher = WindowMatcher::new(&road.right_points, window, options.closed);
    let mut left_progress = MatchProgress::new(road.left_points.len(), options.closed);
    let mut right_progress = MatchProgress::new(road.right_points.len(), options.closed);

    let capacity = resampled.len() + 1;
    let mut center = Vec::with_capacity(capacity);
    let mut allowed_left = Vec::with_capacity(capacity);
    let mut allowed_right = Vec::with_capacity(capacity);
    let mut matched_left = Vec::with_capacity(capacity);
    let mut matched_right = Vec::with_capacity(capacity);

    for point in resampled {
        let (left_index, left_candidates) = left_matcher.next(point);
        let (right_index, right_candidates) = right_matcher.next(point);
        let left_step = left_progress.step(left_index);
        let right_step = right_progress.step(right_index);
        if !(left_progress.accepts(left_step) && right_progress.accepts(right_step))
            || !(left_progress.advances(left_step) || right_progress.advances(right_step))
            || (left_progress.completes(left_step) && right_progress.completes(right_step))
        {
            diagnostics.dropped_count += 1;
            continue;
        }
        left_progress.keep(left_step);
        right_progress.keep(right_step);

        let rebuilt = road.left_points[left_index].midpoint(road.right_points[right_index]);
        diagnostics.max_shift = diagnostics.max_shift.max(rebuilt.distance_to(point));
        center.push(rebuilt);
        allowed_left.push(left_candidates);
        allowed_right.push(right_candidates);
        matched_left.push(left_index);
        matched_right.push(right_index);
    }

    if options.closed && center.len() > 1 {
        center.push(center[0]);
        allowed_left.push(allowed_left[0].clone());
        allowed_right.push(allowed_right[0].clone());
        matched_left.push(matched_left[0]);
        matched_right.push(matched_right[0]);
    }

    diagnostics.output_count = center.len();
    road.is_knot_point = vec![false; center.len()];
    road.center_points = center;
    road.allowed_left_from_center = allowed_left;
    road.allowed_right_from_center = allowed_right;
    road.matched_left = matched_left;
    road.matched_right = matched_right;
    diagnostics
}

/// Running position of the matches along one boundary, unwrapped on closed
/// roads so that a full lap reads as `first + len`.
struct MatchProgress {
    len: i64,
    closed: bool,
    previous: Option<usize>,
    /// Unwrapped position of the latest match, kept or not.
    current: i64,
    first: Option<i64>,
    kept: Option<i64>,
}

impl MatchProgress {
    fn new(len: usize, closed: bool) -> Self {
        Self {
            len: to_i64(len),
            closed,
            previous: None,
            current: 0,
            first: None,
            kept: None,
        }
    }

    /// Unwrapped position of `index`, the next match on this boundary.
    fn step(&mut self, index: usize) -> i64 {
        let position = to_i64(index);
        self.current = match self.previous {
            None => position,
            Some(previous) => {
                let mut delta = position - to_i64(previous);
                if self.closed {
                    let half = self.len / 2;
                    if delta > half {
                        delta -= self.len;
                    } else if delta < -half {
                        delta += self.len;
                    }
                }
                self.current + delta
            }
        };
        self.previous = Some(index);
        self.current
    }

    fn accepts(&self, position: i64) -> bool {
        match (self.kept, self.first) {
            (Some(kept), Some(first)) => position >= kept && (!self.closed || position <= first + self.len),
            _ => true,
        }
    }

    fn advances(&self, position: i64) -> bool {
        self.kept.is_none_or(|kept| position > kept)
    }

    /// True when `position` is the first kept match again, one lap later.
    fn completes(&self, position: i64) -> bool {
        self.closed && self.first.is_some_and(|first| position == first + self.len)
    }

    fn keep(&mut self, position: i64) {
        self.first.get_or_insert(position);
        self.kept = Some(position);
    }
}

fn to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Nearest-point search over a boundary, restricted to a window that follows
/// the previous match.
struct WindowMatcher<'a> {
    points: &'a [Point3],
    window: usize,
    closed: bool,
    previous: Option<usize>,
}

impl<'a> WindowMatcher<'a> {
    fn new(points: &'a [Point3], window: usize, closed: bool) -> Self {
        Self {
            points,
            window,
            closed,
            previous: None,
        }
    }

    fn candidates(&self) -> Vec<usize> {
        let n = self.points.len();
        let Some(previous) = self.previous else {
            return (0..n).collect();
        };
        if self.closed && 2 * self.window + 1 < n {
            (0..=2 * self.window)
                .map(|k| (previous + n + k - self.window) % n)
                .collect()
        } else if self.closed {
            (0..n).collect()
        } else {
            let lo = previous.saturating_sub(self.window);
            let hi = (previous + self.window).min(n - 1);
            (lo..=hi).collect()
        }
    }

    fn next(&mut self, target: Point3) -> (usize, Vec<usize>) {
        let candidates = self.candidates();
        let best = candidates
            .iter()
            .copied()
            .min_by(|&a, &b| {
                self.points[a]
                    .distance_squared_to(target)
                    .total_cmp(&self.points[b].distance_squared_to(target))
            })
            .unwrap_or(0);
        self.previous = Some(best);
        (best, candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, z: f64) -> Point3 {
        Point3::new(x, 0.0, z)
    }

    fn straight_road(count: usize) -> RoadData {
        let center: Vec<Point3> = (0..count).map(|i| p(i as f64, 0.0)).collect();
        let (left, right) = rebuild_sides_from_center(&center, 1.0, false);
        RoadData {
            is_knot_point: vec![false; center.len()],
            center_points: center,
            left_points: left,
            right_points: right,
            ..RoadData::new(false)
        }
    }

    #[test]
    fn sides_are_perpendicular_offsets() {
        let road = straight_road(5);
        for i in 0..5 {
            assert!(road.left_points[i].distance_to(p(i as f64, 1.0)) < 1e-12);
            assert!(road.right_points[i].distance_to(p(i as f64, -1.0)) < 1e-12);
        }
    }

    #[test]
    fn straight_center_is_reproduced() {
        let mut road = straight_road(11);
        let diag = rebuild_center_from_sides(&mut road, CenterRebuildOptions::new(1.0));
        assert_eq!(diag.output_count, 11);
        assert!(diag.max_shift < 1e-9);
        assert_eq!(road.allowed_left_from_center.len(), 11);
        assert!(road.allowed_left_from_center[5].len() <= 17);
        for (i, c) in road.center_points.iter().enumerate() {
            assert!(c.distance_to(p(i as f64, 0.0)) < 1e-9);
        }
    }

    #[test]
    fn window_rejects_distant_fold() {
        // A U-turn whose far leg passes right next to the near leg: global
        // nearest search would jump legs, the window does not.
        let near: Vec<Point3> = (0..30).map(|i| p(i as f64, 0.0)).collect();
        let far: Vec<Point3> = (0..30).rev().map(|i| p(i as f64, 0.3)).collect();
        let boundary: Vec<Point3> = near.iter().chain(far.iter()).copied().collect();

        let mut matcher = WindowMatcher::new(&boundary, 4, false);
        let (first, candidates) = matcher.next(p(0.0, -0.5));
        assert_eq!(first, 0);
        assert_eq!(candidates.len(), boundary.len());

        let mut last = first;
        for i in 1..25 {
            // the far leg is nearer to these targets
            let (index, _) = matcher.next(p(i as f64, 0.2));
            last = index;
        }
        assert_eq!(last, 24);
    }

    #[test]
    fn rows_that_double_back_are_dropped() {
        // The boundaries run straight to x = 12 while the centerline folds
        // back from 8 to 4 before continuing, as it does around a clipped loop.
        let left: Vec<Point3> = (0..=12).map(|i| p(i as f64, 1.0)).collect();
        let right: Vec<Point3> = (0..=12).map(|i| p(i as f64, -1.0)).collect();
        let mut road = RoadData {
            center_points: vec![p(0.0, 0.0), p(8.0, 0.0), p(4.0, 0.0), p(12.0, 0.0)],
            left_points: left,
            right_points: right,
            ..RoadData::new(false)
        };

        let diag = rebuild_center_from_sides(&mut road, CenterRebuildOptions::new(1.0));
        assert_eq!(diag.resampled_count, 21);
        assert_eq!(diag.dropped_count, 8);
        assert_eq!(diag.output_count, 13);
        assert_eq!(road.matched_left.len(), road.center_points.len());
        assert!(road.matched_left.windows(2).all(|w| w[0] < w[1]));
        assert!(road.matched_right.windows(2).all(|w| w[0] < w[1]));
        assert!(road.center_points.windows(2).all(|w| w[1].x > w[0].x));
    }

    #[test]
    fn closed_output_is_a_ring() {
        let center: Vec<Point3> = (0..24)
            .map(|i| {
                let a = i as f64 / 24.0 * std::f64::consts::TAU;
                p(10.0 * a.cos(), 10.0 * a.sin())
            })
            .collect();
        let (left, right) = rebuild_sides_from_center(&center, 1.0, true);
        let mut road = RoadData {
            center_points: center,
            left_points: left,
            right_points: right,
            ..RoadData::new(true)
        };
        rebuild_center_from_sides(&mut road, CenterRebuildOptions::new(2.0).closed(true));
        let first = road.center_points[0];
        let last = *road.center_points.last().unwrap();
        assert_eq!(first, last);
        assert_eq!(road.center_points.len(), road.allowed_right_from_center.len());
        assert_eq!(road.matched_left.first(), road.matched_left.last());
    }
}
