//! End-to-end road generation.
//!
//! ```text
//! chain ─ fit ─ sample ─ smooth ─ clip ─ resample ─ rebuild center ─ quads ─ subdivide ┐
//! chain ─ ...                                                                          ├─ extrude ─ mesh
//! chain ─ ...                                                                          ┘
//! ```
//!
//! Generation never fails. Chains that cannot produce a curve are skipped and
//! counted; every safety cap returns its best partial result.

use crate::geom::{
    ClipOptions, GeomMesh, GeomMeshDiagnostics, GeomMetrics, Point3, PointGrid, ResampleOptions,
    SmoothSpline3, TimingBucket, Tolerance, clip_self_intersections, resample_polyline,
};

use super::chain::ControlPointChain;
use super::debug::DebugDrawBatch;
use super::extrude::{ExtrudeOptions, extrude_quads_with_metrics};
use super::quads::{MeshQuad, SubdivideOptions, build_quads, subdivide_quads};
use super::rebuild::{CenterRebuildOptions, rebuild_center_from_sides};
use super::road_data::RoadData;
use super::sampler::{SampleOptions, sample_road};
use super::settings::RoadSettings;
use super::smoother::{SmoothOptions, smooth_road};

/// Everything one chain contributes to the final mesh.
#[derive(Debug, Clone, Default)]
pub struct ChainRoad {
    pub road: RoadData,
    pub quads: Vec<MeshQuad>,
    pub diagnostics: GeomMeshDiagnostics,
}

/// Generates one mesh for all `chains`.
#[must_use]
pub fn generate_road(chains: &[ControlPointChain], settings: &RoadSettings) -> (GeomMesh, GeomMeshDiagnostics) {
    generate_road_with_debug(chains, settings, None)
}

/// [`generate_road`], additionally filling `debug` when
/// `settings.debug_visualization` is on.
pub fn generate_road_with_debug(
    chains: &[ControlPointChain],
    settings: &RoadSettings,
    mut debug: Option<&mut DebugDrawBatch>,
) -> (GeomMesh, GeomMeshDiagnostics) {
    let settings = settings.sanitized();
    let mut metrics = GeomMetrics::default();
    metrics.begin();

    let mut pipeline = GeomMeshDiagnostics::default();
    let mut quads = Vec::new();

    for chain in chains {
        let Some(built) = build_chain_road(chain, &settings, &mut metrics) else {
            pipeline.skipped_chain_count += 1;
            continue;
        };
        if settings.debug_visualization {
            if let Some(batch) = debug.as_deref_mut() {
                batch.add_road(&built.road);
                batch.add_quads(&built.quads);
            }
        }
        pipeline.merge_pipeline(&built.diagnostics);
        quads.extend(built.quads);
    }

    let options = ExtrudeOptions::new(settings.thickness).with_uv_length_scale(settings.width());
    let (mesh, mut diagnostics) = extrude_quads_with_metrics(&quads, options, &mut metrics);

    diagnostics.merge_pipeline(&pipeline);
    // extrusion counted the same quads again
    diagnostics.top_quad_count = quads.len();
    if diagnostics.skipped_chain_count > 0 {
        diagnostics.add_warning(format!("{} chain(s) skipped as degenerate", diagnostics.skipped_chain_count));
    }
    diagnostics.timing = metrics.end();

    log::debug!("road mesh generated: {}", diagnostics.summary());
    (mesh, diagnostics)
}

/// Runs every per-chain stage up to (and including) subdivision.
///
/// Returns `None` for chains with fewer than two usable points.
pub fn build_chain_road(
    chain: &ControlPointChain,
    settings: &RoadSettings,
    metrics: &mut GeomMetrics,
) -> Option<ChainRoad> {
    let mut diagnostics = GeomMeshDiagnostics::default();
    let controls: Vec<Point3> = chain.positions.iter().copied().filter(|p| p.is_finite()).collect();
    if controls.len() < 2 {
        log::debug!("skipping chain with {} usable points", controls.len());
        return None;
    }
    // two points cannot enclose anything; a closed pair would fold onto itself
    let closed = chain.closed && controls.len() >= 3;

    let spline = metrics.time(TimingBucket::CurveFitting, || SmoothSpline3::new(&controls, closed))?;
    let spacing = settings.effective_spacing();

    let (mut road, sampled) = metrics.time(TimingBucket::Sampling, || {
        sample_road(
            &spline,
            &controls,
            SampleOptions::new(spacing, settings.half_width).with_thickness(settings.thickness),
        )
    });
    if sampled.capped {
        diagnostics.safety_cap_hit = true;
        diagnostics.add_warning("sample cap reached");
    }
    log::debug!(
        "sampled {} rows ({} knots) over length {:.3}",
        sampled.sample_count,
        sampled.knot_count,
        spline.length()
    );
    if road.len() < 2 {
        return None;
    }

    if settings.smoothing_enabled {
        let smoothed = metrics.time(TimingBucket::Smoothing, || {
            smooth_road(
                &mut road,
                SmoothOptions::new(settings.smoothing_strength, settings.smoothing_iterations)
                    .with_half_width(settings.half_width),
            )
        });
        log::debug!(
            "smoothed {} points (max shift {:.3}, {} rows swapped)",
            smoothed.moved_point_count,
            smoothed.max_displacement,
            smoothed.swapped_rows
        );
    }

    if settings.self_intersection_enabled {
        let options = ClipOptions::new(settings.clip_min_distance())
            .with_max_iterations(settings.clip_max_iterations)
            .closed(closed);
        metrics.time(TimingBucket::IntersectionClipping, || {
            for side in [&mut road.left_points, &mut road.right_points] {
                let (clipped, clip) = clip_self_intersections(side, options);
                *side = open_ring(clipped, closed);
                diagnostics.self_intersections_clipped += clip.intersections_clipped;
                if clip.hit_iteration_cap {
                    diagnostics.safety_cap_hit = true;
                    diagnostics.add_warning("self-intersection iteration cap reached");
                }
            }
        });
        log::debug!("clipped {} boundary loops", diagnostics.self_intersections_clipped);
    }

    let reference = PointGrid::from_points(&road.boundary_points(), spacing);

    if settings.adaptive_spacing_enabled {
        metrics.time(TimingBucket::Resampling, || {
            let options = ResampleOptions::new(spacing).closed(closed);
            road.left_points = resample_polyline(&road.left_points, options).0;
            road.right_points = resample_polyline(&road.right_points, options).0;
        });
    }

    let rebuilt = metrics.time(TimingBucket::CenterRebuild, || {
        rebuild_center_from_sides(
            &mut road,
            CenterRebuildOptions::new(spacing)
                .with_max_index_distance(settings.max_index_distance)
                .closed(closed),
        )
    });
    log::debug!(
        "center rebuilt: {} -> {} rows ({} dropped, max shift {:.3})",
        rebuilt.resampled_count,
        rebuilt.output_count,
        rebuilt.dropped_count,
        rebuilt.max_shift
    );

    let mut quads = metrics.time(TimingBucket::QuadMeshing, || build_quads(&road, closed));

    if settings.max_quad_edge_length > 0.0 {
        let (refined, subdivided) = metrics.time(TimingBucket::Subdivision, || {
            subdivide_quads(
                &quads,
                reference.as_ref(),
                SubdivideOptions::new(settings.max_quad_edge_length),
            )
        });
        diagnostics.subdivided_quad_count = subdivided.subdivided_quad_count;
        quads = refined;
    }
    log::debug!("chain produced {} quads", quads.len());

    diagnostics.top_quad_count = quads.len();
    Some(ChainRoad {
        road,
        quads,
        diagnostics,
    })
}

/// Drops the repeated seam point of a closed ring.
fn open_ring(mut points: Vec<Point3>, closed: bool) -> Vec<Point3> {
    if closed && points.len() > 1 {
        let (first, last) = (points[0], points[points.len() - 1]);
        if Tolerance::WELD.approx_eq_point3(first, last) {
            points.pop();
        }
    }
    points
}
