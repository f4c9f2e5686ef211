//! Arc-length sampling of a fitted centerline into road rows.

use crate::geom::{Curve3, Point3, SmoothSpline3, Tolerance, Vec3};

use super::frame::RightVectorTracker;
use super::road_data::RoadData;
use super::settings::MIN_SPACING;

/// Hard cap on samples per chain.
pub const MAX_SAMPLES: usize = 50_000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleOptions {
    pub spacing: f64,
    pub half_width: f64,
    /// Height the sampled rows are raised by.
    pub thickness: f64,
    pub max_samples: usize,
}

impl SampleOptions {
    #[must_use]
    pub const fn new(spacing: f64, half_width: f64) -> Self {
        Self {
            spacing,
            half_width,
            thickness: 0.0,
            max_samples: MAX_SAMPLES,
        }
    }

    #[must_use]
    pub const fn with_thickness(mut self, thickness: f64) -> Self {
        self.thickness = thickness;
        self
    }

    #[must_use]
    pub const fn with_max_samples(mut self, max_samples: usize) -> Self {
        self.max_samples = max_samples;
        self
    }
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleDiagnostics {
    pub sample_count: usize,
    pub knot_count: usize,
    /// Right-vector continuity flips.
    pub orientation_flips: usize,
    pub capped: bool,
}

/// Samples `spline` every `max(spacing, 0.05)` units of arc length.
///
/// Open curves end exactly at their length; closed curves stop half a step
/// short of it so the seam is not sampled twice. Every row is raised by
/// `thickness` and offset by `half_width` to either side. A row is a knot if
/// the curve point lies within 0.01 of one of `control_points`.
pub fn sample_road(
    spline: &SmoothSpline3,
    control_points: &[Point3],
    options: SampleOptions,
) -> (RoadData, SampleDiagnostics) {
    let mut diagnostics = SampleDiagnostics::default();
    let closed = spline.is_closed();
    let mut road = RoadData::new(closed);

    let step = if options.spacing.is_finite() {
        options.spacing.max(MIN_SPACING)
    } else {
        1.0
    };
    let length = spline.length();
    let end = if closed {
        length - 0.5 * step
    } else {
        length - Tolerance::WELD.eps
    };

    let mut tracker = RightVectorTracker::new();
    let mut push_row = |road: &mut RoadData, distance: f64| {
        let sample = spline.evaluate(spline.parameter_at_length(distance));
        let right = tracker.next(sample.tangent);
        let center = sample.point + Vec3::UP * options.thickness;

        road.center_points.push(center);
        road.left_points.push(center - right * options.half_width);
        road.right_points.push(center + right * options.half_width);
        road.is_knot_point.push(
            control_points
                .iter()
                .any(|cp| Tolerance::KNOT.approx_eq_point3(*cp, sample.point)),
        );
    };

    let mut k = 0usize;
    loop {
        let distance = k as f64 * step;
        if distance >= end && k > 0 {
            break;
        }
        if road.center_points.len() >= options.max_samples {
            diagnostics.capped = true;
            log::warn!("road sampling hit the {} sample cap", options.max_samples);
            break;
        }
        push_row(&mut road, distance.min(length));
        k += 1;
    }

    if !closed && !diagnostics.capped && length > Tolerance::WELD.eps {
        push_row(&mut road, length);
    }

    diagnostics.sample_count = road.center_points.len();
    diagnostics.knot_count = road.is_knot_point.iter().filter(|&&k| k).count();
    diagnostics.orientation_flips = tracker.flips();
    (road, diagnostics)
}
