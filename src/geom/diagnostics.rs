//! Mesh diagnostics for the road pipeline.
//!
//! Diagnostics are collected while a road mesh is generated and describe both
//! the mesh itself (counts, open and non-manifold edges) and what the pipeline
//! had to do to get there (skipped chains, clipped loops, safety caps).
//!
//! ```ignore
//! use road_mesh_engine::road::{generate_road, RoadSettings};
//!
//! let (mesh, diagnostics) = generate_road(&chains, &RoadSettings::default());
//! if !diagnostics.is_watertight() {
//!     eprintln!("road has {} open edges", diagnostics.open_edge_count);
//! }
//! ```

use std::fmt;

use serde::Serialize;

/// Diagnostics returned alongside every generated mesh.
///
/// # Topology
///
/// - `open_edge_count`: edges with only one adjacent triangle
/// - `non_manifold_edge_count`: edges with more than two adjacent triangles
///
/// A road extruded with a positive thickness is expected to have neither.
/// A flat ribbon (thickness 0) always has open edges along its rim.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeomMeshDiagnostics {
    /// Total number of vertices in the final mesh.
    pub vertex_count: usize,

    /// Total number of triangles in the final mesh.
    pub triangle_count: usize,

    /// Quads on the top surface, after subdivision.
    pub top_quad_count: usize,

    /// Quads that were bisected by the adaptive subdivider.
    pub subdivided_quad_count: usize,

    /// Side-wall quads emitted along boundary edges.
    pub side_wall_quad_count: usize,

    /// Number of vertices merged during tolerance-based welding.
    pub welded_vertex_count: usize,

    /// Number of degenerate (zero-area) triangles removed.
    pub degenerate_triangle_count: usize,

    /// Number of triangles whose winding was reversed to face up.
    pub flipped_triangle_count: usize,

    /// Number of open (boundary) edges in the mesh.
    pub open_edge_count: usize,

    /// Number of non-manifold edges in the mesh.
    pub non_manifold_edge_count: usize,

    /// Chains skipped because they had fewer than two usable points.
    pub skipped_chain_count: usize,

    /// Boundary loops removed by the self-intersection resolver.
    pub self_intersections_clipped: usize,

    /// Whether any safety cap (sample count, clip iterations, chain
    /// traversal) was reached.
    pub safety_cap_hit: bool,

    /// Optional timing breakdown by pipeline stage.
    ///
    /// Only populated when the `pipeline_metrics` feature is enabled
    /// and the target is not WASM.
    pub timing: Option<super::metrics::GeomTimingReport>,

    /// Human-readable warnings.
    pub warnings: Vec<String>,
}

impl GeomMeshDiagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the mesh has no open edges.
    #[must_use]
    pub fn is_watertight(&self) -> bool {
        self.open_edge_count == 0
    }

    /// Returns `true` if no edge is shared by more than two triangles.
    #[must_use]
    pub fn is_manifold(&self) -> bool {
        self.non_manifold_edge_count == 0
    }

    /// Returns `true` if the mesh is both watertight and manifold.
    #[must_use]
    pub fn is_valid_solid(&self) -> bool {
        self.is_watertight() && self.is_manifold()
    }

    /// Returns `true` if the mesh has no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triangle_count == 0
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Folds per-chain pipeline counters into this struct.
    ///
    /// Mesh counts (vertices, triangles, edges) are not summed since they are
    /// recomputed once over the final combined mesh. Timing is not merged.
    pub fn merge_pipeline(&mut self, other: &GeomMeshDiagnostics) {
        self.top_quad_count += other.top_quad_count;
        self.subdivided_quad_count += other.subdivided_quad_count;
        self.skipped_chain_count += other.skipped_chain_count;
        self.self_intersections_clipped += other.self_intersections_clipped;
        self.safety_cap_hit |= other.safety_cap_hit;
        self.warnings.extend(other.warnings.iter().cloned());
    }

    /// Returns a short summary string suitable for logging.
    ///
    /// Format: `"V:{vertices} T:{triangles} Q:{quads} [issues...]"`
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = vec![format!(
            "V:{} T:{} Q:{}",
            self.vertex_count, self.triangle_count, self.top_quad_count
        )];

        if self.subdivided_quad_count > 0 {
            parts.push(format!("subdivided:{}", self.subdivided_quad_count));
        }
        if self.side_wall_quad_count > 0 {
            parts.push(format!("walls:{}", self.side_wall_quad_count));
        }
        if self.welded_vertex_count > 0 {
            parts.push(format!("welded:{}", self.welded_vertex_count));
        }
        if self.open_edge_count > 0 {
            parts.push(format!("open:{}", self.open_edge_count));
        }
        if self.non_manifold_edge_count > 0 {
            parts.push(format!("non-manifold:{}", self.non_manifold_edge_count));
        }
        if self.skipped_chain_count > 0 {
            parts.push(format!("skipped:{}", self.skipped_chain_count));
        }
        if self.self_intersections_clipped > 0 {
            parts.push(format!("clipped:{}", self.self_intersections_clipped));
        }
        if self.safety_cap_hit {
            parts.push("cap-hit".to_string());
        }

        parts.join(" ")
    }
}

impl fmt::Display for GeomMeshDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Road Mesh Diagnostics:")?;
        writeln!(f, "  Vertices: {}", self.vertex_count)?;
        writeln!(f, "  Triangles: {}", self.triangle_count)?;
        writeln!(
            f,
            "  Quads: {} top, {} subdivided, {} side walls",
            self.top_quad_count, self.subdivided_quad_count, self.side_wall_quad_count
        )?;

        if self.welded_vertex_count > 0 || self.degenerate_triangle_count > 0 || self.flipped_triangle_count > 0 {
            writeln!(f, "  Repairs:")?;
            if self.welded_vertex_count > 0 {
                writeln!(f, "    - Welded vertices: {}", self.welded_vertex_count)?;
            }
            if self.degenerate_triangle_count > 0 {
                writeln!(f, "    - Degenerate triangles removed: {}", self.degenerate_triangle_count)?;
            }
            if self.flipped_triangle_count > 0 {
                writeln!(f, "    - Flipped triangles: {}", self.flipped_triangle_count)?;
            }
        }

        if self.open_edge_count > 0 || self.non_manifold_edge_count > 0 {
            writeln!(f, "  Topology issues:")?;
            if self.open_edge_count > 0 {
                writeln!(f, "    - Open edges: {}", self.open_edge_count)?;
            }
            if self.non_manifold_edge_count > 0 {
                writeln!(f, "    - Non-manifold edges: {}", self.non_manifold_edge_count)?;
            }
        }

        if self.skipped_chain_count > 0 {
            writeln!(f, "  Skipped chains: {}", self.skipped_chain_count)?;
        }
        if self.self_intersections_clipped > 0 {
            writeln!(f, "  Self-intersections clipped: {}", self.self_intersections_clipped)?;
        }
        if self.safety_cap_hit {
            writeln!(f, "  Safety cap reached")?;
        }

        if !self.warnings.is_empty() {
            writeln!(f, "  Warnings:")?;
            for warning in &self.warnings {
                writeln!(f, "    - {}", warning)?;
            }
        }

        if let Some(ref timing) = self.timing {
            writeln!(f, "  Timing: {} ms total", timing.total_ms())?;
        }

        let status = if self.is_empty() {
            "EMPTY"
        } else if self.is_valid_solid() {
            "SOLID"
        } else {
            "OPEN"
        };
        writeln!(f, "  Status: {}", status)?;

        Ok(())
    }
}
