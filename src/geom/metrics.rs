//! Opt-in timing hooks for the road pipeline.
//!
//! Timing is only collected when the `pipeline_metrics` feature is enabled and
//! the target is not WASM (`std::time::Instant` is unavailable there). When
//! disabled, every call compiles down to invoking the closure.
//!
//! ```ignore
//! use road_mesh_engine::geom::{GeomMetrics, TimingBucket};
//!
//! let mut metrics = GeomMetrics::default();
//! metrics.begin();
//! let spline = metrics.time(TimingBucket::CurveFitting, || SmoothSpline3::new(&points, false));
//! if let Some(report) = metrics.end() {
//!     println!("fit: {} ns", report.curve_fitting_ns);
//! }
//! ```

use serde::Serialize;

/// Pipeline stages that accumulate time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingBucket {
    /// Spline construction and arc-length table.
    CurveFitting,
    /// Arc-length sampling into left/center/right points.
    Sampling,
    /// Center smoothing and side rebuild.
    Smoothing,
    /// Boundary self-intersection clipping.
    IntersectionClipping,
    /// Uniform boundary resampling.
    Resampling,
    /// Center rebuild from the boundaries.
    CenterRebuild,
    /// Quad strip construction.
    QuadMeshing,
    /// Adaptive quad subdivision.
    Subdivision,
    /// Top/bottom/wall triangle emission.
    Extrusion,
    /// Welding, normals, tangents and topology counts.
    Finalize,
}

/// Cumulative nanoseconds per bucket.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeomTimingReport {
    pub curve_fitting_ns: u64,
    pub sampling_ns: u64,
    pub smoothing_ns: u64,
    pub intersection_clipping_ns: u64,
    pub resampling_ns: u64,
    pub center_rebuild_ns: u64,
    pub quad_meshing_ns: u64,
    pub subdivision_ns: u64,
    pub extrusion_ns: u64,
    pub finalize_ns: u64,
}

impl GeomTimingReport {
    /// Returns the total time across all buckets in nanoseconds.
    #[must_use]
    pub fn total_ns(&self) -> u64 {
        [
            self.curve_fitting_ns,
            self.sampling_ns,
            self.smoothing_ns,
            self.intersection_clipping_ns,
            self.resampling_ns,
            self.center_rebuild_ns,
            self.quad_meshing_ns,
            self.subdivision_ns,
            self.extrusion_ns,
            self.finalize_ns,
        ]
        .into_iter()
        .fold(0u64, u64::saturating_add)
    }

    /// Returns the total time in milliseconds (for display purposes).
    #[must_use]
    pub fn total_ms(&self) -> f64 {
        self.total_ns() as f64 / 1_000_000.0
    }

    #[cfg(all(feature = "pipeline_metrics", not(target_arch = "wasm32")))]
    fn bucket_mut(&mut self, bucket: TimingBucket) -> &mut u64 {
        match bucket {
            TimingBucket::CurveFitting => &mut self.curve_fitting_ns,
            TimingBucket::Sampling => &mut self.sampling_ns,
            TimingBucket::Smoothing => &mut self.smoothing_ns,
            TimingBucket::IntersectionClipping => &mut self.intersection_clipping_ns,
            TimingBucket::Resampling => &mut self.resampling_ns,
            TimingBucket::CenterRebuild => &mut self.center_rebuild_ns,
            TimingBucket::QuadMeshing => &mut self.quad_meshing_ns,
            TimingBucket::Subdivision => &mut self.subdivision_ns,
            TimingBucket::Extrusion => &mut self.extrusion_ns,
            TimingBucket::Finalize => &mut self.finalize_ns,
        }
    }
}

/// Accumulator for timing pipeline stages.
///
/// Call [`begin`](Self::begin) to reset, wrap work with [`time`](Self::time),
/// and read the report with [`end`](Self::end). Without `pipeline_metrics`
/// (or on WASM) [`end`](Self::end) always returns `None`.
#[derive(Debug, Default)]
pub struct GeomMetrics {
    #[cfg(all(feature = "pipeline_metrics", not(target_arch = "wasm32")))]
    report: GeomTimingReport,
}

impl GeomMetrics {
    /// Resets all timing counters to zero.
    pub fn begin(&mut self) {
        #[cfg(all(feature = "pipeline_metrics", not(target_arch = "wasm32")))]
        {
            self.report = GeomTimingReport::default();
        }
    }

    /// Returns the accumulated timing report, or `None` if metrics are disabled.
    #[must_use]
    pub fn end(&self) -> Option<GeomTimingReport> {
        #[cfg(all(feature = "pipeline_metrics", not(target_arch = "wasm32")))]
        {
            Some(self.report.clone())
        }
        #[cfg(not(all(feature = "pipeline_metrics", not(target_arch = "wasm32"))))]
        {
            None
        }
    }

    /// Times the execution of `f` and accumulates the elapsed time in `bucket`.
    pub fn time<R>(&mut self, bucket: TimingBucket, f: impl FnOnce() -> R) -> R {
        #[cfg(all(feature = "pipeline_metrics", not(target_arch = "wasm32")))]
        {
            let start = std::time::Instant::now();
            let result = f();
            // Cap at u64::MAX to prevent overflow
            let nanos = start.elapsed().as_nanos().min(u128::from(u64::MAX)) as u64;
            let slot = self.report.bucket_mut(bucket);
            *slot = slot.saturating_add(nanos);
            result
        }

        #[cfg(not(all(feature = "pipeline_metrics", not(target_arch = "wasm32"))))]
        {
            let _ = bucket;
            f()
        }
    }
}
