//! Road-specific pipeline stages built on the `geom` kernel.

mod chain;
mod debug;
mod extrude;
mod frame;
mod pipeline;
mod quads;
mod rebuild;
mod road_data;
mod sampler;
mod settings;
mod smoother;

pub use chain::{
    ChainError, ControlPointChain, ControlPointGraph, ControlPointNode, MAX_CHAIN_TRAVERSAL, PointId,
};
pub use debug::{
    CENTER_COLOR, DebugDrawBatch, DebugLine, DebugPoint, KNOT_COLOR, LEFT_COLOR, QUAD_COLOR,
    RIGHT_COLOR, Rgba,
};
pub use extrude::{ExtrudeOptions, extrude_quads, extrude_quads_with_metrics};
pub use frame::{RightVectorTracker, right_vector};
pub use pipeline::{ChainRoad, build_chain_road, generate_road, generate_road_with_debug};
pub use quads::{MeshQuad, SubdivideDiagnostics, SubdivideOptions, build_quads, subdivide_quads};
pub use rebuild::{
    CenterRebuildDiagnostics, CenterRebuildOptions, rebuild_center_from_sides,
    rebuild_sides_from_center,
};
pub use road_data::RoadData;
pub use sampler::{MAX_SAMPLES, SampleDiagnostics, SampleOptions, sample_road};
pub use settings::{MIN_SPACING, RoadSettings, SettingsError};
pub use smoother::{SmoothDiagnostics, SmoothOptions, smooth_road};

#[cfg(test)]
mod tests;
