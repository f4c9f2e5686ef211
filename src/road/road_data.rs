use crate::geom::Point3;

/// Working state for one chain during a single generation pass.
///
/// Center, left and right are index-aligned after sampling and after the
/// center rebuild. In between (clipping, resampling) the boundaries are
/// independent polylines and may have different lengths.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoadData {
    pub center_points: Vec<Point3>,
    pub left_points: Vec<Point3>,
    pub right_points: Vec<Point3>,
    /// Parallel to `center_points`: true where the sample sits on a control point.
    pub is_knot_point: Vec<bool>,
    pub is_closed: bool,
    /// Indices into `left_points` considered for each center index.
    pub allowed_left_from_center: Vec<Vec<usize>>,
    /// Indices into `right_points` considered for each center index.
    pub allowed_right_from_center: Vec<Vec<usize>>,
    /// Parallel to `center_points` after the center rebuild: the closest
    /// allowed left candidate of each row. Never decreases along the road.
    pub matched_left: Vec<usize>,
    /// Same as `matched_left`, for the right boundary.
    pub matched_right: Vec<usize>,
}

impl RoadData {
    #[must_use]
    pub fn new(is_closed: bool) -> Self {
        Self {
            is_closed,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.center_points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.center_points.is_empty()
    }

    /// Left and right boundary points together, left first.
    #[must_use]
    pub fn boundary_points(&self) -> Vec<Point3> {
        let mut out = Vec::with_capacity(self.left_points.len() + self.right_points.len());
        out.extend_from_slice(&self.left_points);
        out.extend_from_slice(&self.right_points);
        out
    }

    /// Closest allowed left/right boundary points for a center index.
    ///
    /// Uses the matches recorded by the center rebuild when present, and
    /// otherwise searches the allowed candidates around the center point.
    #[must_use]
    pub fn corners_at(&self, index: usize) -> Option<(Point3, Point3)> {
        if let (Some(&l), Some(&r)) = (self.matched_left.get(index), self.matched_right.get(index)) {
            return Some((*self.left_points.get(l)?, *self.right_points.get(r)?));
        }
        let center = *self.center_points.get(index)?;
        let left = closest_candidate(center, &self.left_points, self.allowed_left_from_center.get(index)?)?;
        let right = closest_candidate(center, &self.right_points, self.allowed_right_from_center.get(index)?)?;
        Some((left, right))
    }
}

fn closest_candidate(center: Point3, points: &[Point3], candidates: &[usize]) -> Option<Point3> {
    candidates
        .iter()
        .filter_map(|&i| points.get(i).copied())
        .min_by(|a, b| a.distance_squared_to(center).total_cmp(&b.distance_squared_to(center)))
}
