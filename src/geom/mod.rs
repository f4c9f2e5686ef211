mod core;
mod curve;
mod diagnostics;
mod mesh;
mod metrics;
mod polyline;

pub use core::{BBox, Point3, Tolerance, Vec3};
pub use curve::{Curve3, CurveSample, SmoothSpline3};
pub use diagnostics::GeomMeshDiagnostics;
pub use metrics::{GeomMetrics, GeomTimingReport, TimingBucket};
pub use mesh::{GeomMesh, IndexFormat, MAX_U16_VERTEX_COUNT, PointGrid, edge_key};
pub(crate) use mesh::finalize_mesh;
pub use polyline::{
    // Length and cleanup
    polyline_length, remove_degenerate_segments,
    // Resample
    MAX_RESAMPLE_POINTS, ResampleDiagnostics, ResampleOptions, SEAM_MERGE_FACTOR,
    resample_polyline,
    // Self-intersection clipping
    ClipDiagnostics, ClipOptions, SelfIntersection, clip_self_intersections,
    closest_points_between_segments, find_self_intersection,
};

#[cfg(test)]
mod tests;
