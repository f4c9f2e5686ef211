use super::{boundary_edges, classify_triangles, face_normal, square_loop};
use crate::geom::{GeomMetrics, Point3};
use crate::road::{
    ControlPointChain, DebugDrawBatch, RoadSettings, build_chain_road, generate_road,
    generate_road_with_debug,
};

fn square_chain() -> ControlPointChain {
    ControlPointChain::from_positions(square_loop(), true)
}

#[test]
fn square_loop_produces_closed_ribbon() {
    let settings = RoadSettings::default().with_half_width(1.0).with_spacing(1.0);
    let built = build_chain_road(&square_chain(), &settings, &mut GeomMetrics::default()).unwrap();

    let center = &built.road.center_points;
    assert!((38..=47).contains(&center.len()), "got {} center rows", center.len());
    assert_eq!(center.first(), center.last());
    // the closing quad is redundant on ring-form centerlines
    assert_eq!(built.quads.len(), center.len() - 1);

    for quad in &built.quads {
        let width = quad.a.distance_to(quad.b);
        assert!(width > 1.5 && width < 2.5, "quad width {width}");
    }
}

#[test]
fn extruded_square_is_watertight_with_walls_on_every_boundary_edge() {
    let settings = RoadSettings::default().with_thickness(0.2);
    let (mesh, diag) = generate_road(&[square_chain()], &settings);

    mesh.validate().unwrap();
    assert!(diag.is_valid_solid(), "{diag}");
    assert!(diag.top_quad_count >= 38);
    assert_eq!(diag.skipped_chain_count, 0);

    let (top, bottom, walls) = classify_triangles(&mesh, 0.1);
    assert_eq!(top.len(), bottom.len());
    assert_eq!(walls.len(), 2 * diag.side_wall_quad_count);

    let rim = boundary_edges(&mesh, &top);
    assert_eq!(rim.len(), diag.side_wall_quad_count);
    for (p, q) in rim {
        assert!(
            walls.iter().any(|w| w.contains(&p) && w.contains(&q)),
            "boundary edge {p}-{q} has no wall"
        );
    }

    for tri in &top {
        assert!(face_normal(&mesh, tri).y > 0.0);
    }
    for tri in &bottom {
        assert!(face_normal(&mesh, tri).y < 0.0);
    }
}

/// Asserts a closed solid whose top faces all point up.
fn assert_solid_with_upward_top(chain: ControlPointChain) {
    let settings = RoadSettings::default().with_thickness(0.2);
    let (mesh, diag) = generate_road(&[chain], &settings);

    mesh.validate().unwrap();
    assert!(diag.triangle_count > 0);
    assert!(diag.is_valid_solid(), "{diag}");
    let (top, bottom, _) = classify_triangles(&mesh, 0.1);
    assert!(!top.is_empty());
    assert_eq!(top.len(), bottom.len());
    for tri in &top {
        assert!(face_normal(&mesh, tri).y > 0.0, "top triangle {tri:?} faces down");
    }
}

#[test]
fn lasso_is_clipped_into_a_solid() {
    // The last leg runs back across the first one.
    let chain = ControlPointChain::from_positions(
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, 10.0),
            Point3::new(5.0, 0.0, 10.0),
            Point3::new(5.0, 0.0, -10.0),
        ],
        false,
    );
    let built = build_chain_road(&chain, &RoadSettings::default(), &mut GeomMetrics::default()).unwrap();
    assert!(built.diagnostics.self_intersections_clipped > 0);
    assert_solid_with_upward_top(chain);
}

#[test]
fn flat_figure_eight_is_clipped_into_a_solid() {
    let chain = ControlPointChain::from_positions(
        vec![
            Point3::new(10.0, 0.0, 5.0),
            Point3::new(20.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, -5.0),
            Point3::new(-10.0, 0.0, 5.0),
            Point3::new(-20.0, 0.0, 0.0),
            Point3::new(-10.0, 0.0, -5.0),
        ],
        true,
    );
    assert_solid_with_upward_top(chain);
}

#[test]
fn zero_thickness_gives_a_flat_ribbon() {
    let settings = RoadSettings::default().with_thickness(0.0);
    let (mesh, diag) = generate_road(&[square_chain()], &settings);

    assert_eq!(diag.side_wall_quad_count, 0);
    assert!(diag.open_edge_count > 0);
    assert!(mesh.positions.iter().all(|p| p[1].abs() < 1e-9));
    for tri in mesh.indices.chunks_exact(3) {
        assert!(face_normal(&mesh, tri).y > 0.0);
    }
}

#[test]
fn open_s_curve_keeps_both_ends() {
    let chain = ControlPointChain::from_positions(
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, 6.0),
            Point3::new(20.0, 0.0, -6.0),
            Point3::new(30.0, 0.0, 0.0),
        ],
        false,
    );
    let settings = RoadSettings::default();
    let built = build_chain_road(&chain, &settings, &mut GeomMetrics::default()).unwrap();
    let center = &built.road.center_points;
    assert!(center[0].distance_to(Point3::new(0.0, 0.2, 0.0)) < 0.5);
    assert!(center[center.len() - 1].distance_to(Point3::new(30.0, 0.2, 0.0)) < 0.5);

    let (mesh, diag) = generate_road(&[chain], &settings);
    mesh.validate().unwrap();
    assert!(diag.is_valid_solid(), "{diag}");
}

#[test]
fn subdivision_splits_long_quads() {
    let chain = ControlPointChain::from_positions(vec![Point3::ORIGIN, Point3::new(20.0, 0.0, 0.0)], false);
    let coarse = RoadSettings::default().with_spacing(4.0);
    let fine = coarse.clone().with_max_quad_edge_length(2.0);

    let (_, coarse_diag) = generate_road(std::slice::from_ref(&chain), &coarse);
    let (mesh, fine_diag) = generate_road(&[chain], &fine);

    assert_eq!(coarse_diag.subdivided_quad_count, 0);
    assert!(fine_diag.subdivided_quad_count > 0);
    assert_eq!(
        fine_diag.top_quad_count,
        coarse_diag.top_quad_count + fine_diag.subdivided_quad_count
    );
    assert!(fine_diag.is_valid_solid(), "{fine_diag}");
    mesh.validate().unwrap();
}

#[test]
fn degenerate_chains_are_skipped() {
    let chains = [
        ControlPointChain::from_positions(vec![Point3::ORIGIN], false),
        ControlPointChain::from_positions(vec![Point3::ORIGIN, Point3::ORIGIN], false),
        ControlPointChain::from_positions(vec![Point3::ORIGIN, Point3::new(f64::NAN, 0.0, 0.0)], false),
    ];
    let (mesh, diag) = generate_road(&chains, &RoadSettings::default());
    assert!(mesh.is_empty());
    assert_eq!(diag.skipped_chain_count, 3);
    assert!(diag.has_warnings());
}

#[test]
fn empty_input_gives_empty_mesh() {
    let (mesh, diag) = generate_road(&[], &RoadSettings::default());
    assert!(mesh.is_empty());
    assert!(diag.is_empty());
    assert!(!diag.has_warnings());
}

#[test]
fn independent_chains_share_one_mesh() {
    let a = ControlPointChain::from_positions(vec![Point3::ORIGIN, Point3::new(10.0, 0.0, 0.0)], false);
    let b = ControlPointChain::from_positions(
        vec![Point3::new(0.0, 0.0, 20.0), Point3::new(10.0, 0.0, 20.0)],
        false,
    );
    let settings = RoadSettings::default();
    let (_, single) = generate_road(std::slice::from_ref(&a), &settings);
    let (mesh, both) = generate_road(&[a, b], &settings);

    assert_eq!(both.top_quad_count, single.top_quad_count * 2);
    assert_eq!(both.triangle_count, single.triangle_count * 2);
    assert!(both.is_valid_solid());
    mesh.validate().unwrap();
}

#[test]
fn debug_batch_is_filled_only_when_enabled() {
    let chain = square_chain();
    let mut batch = DebugDrawBatch::new();

    generate_road_with_debug(std::slice::from_ref(&chain), &RoadSettings::default(), Some(&mut batch));
    assert!(batch.is_empty());

    let settings = RoadSettings::default().with_debug_visualization(true);
    generate_road_with_debug(&[chain], &settings, Some(&mut batch));
    assert!(!batch.lines.is_empty());
}
