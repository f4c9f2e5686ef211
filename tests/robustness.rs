//! Randomized inputs must never panic and must always yield a well-formed mesh.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use road_mesh_engine::geom::{GeomMesh, Point3};
use road_mesh_engine::road::{ControlPointChain, ControlPointGraph, RoadSettings, generate_road};

fn random_chain(rng: &mut StdRng) -> ControlPointChain {
    let count = rng.random_range(0..8);
    let positions = (0..count)
        .map(|_| {
            Point3::new(
                rng.random_range(-15.0..15.0),
                rng.random_range(-2.0..2.0),
                rng.random_range(-15.0..15.0),
            )
        })
        .collect();
    ControlPointChain::from_positions(positions, rng.random_bool(0.4))
}

fn random_settings(rng: &mut StdRng) -> RoadSettings {
    RoadSettings::default()
        .with_half_width(rng.random_range(0.1..4.0))
        .with_thickness(if rng.random_bool(0.2) { 0.0 } else { rng.random_range(0.05..1.0) })
        .with_spacing(rng.random_range(0.5..3.0))
        .with_smoothing(rng.random_bool(0.7), rng.random_range(0.0..1.0), rng.random_range(0..6))
        .with_self_intersection(rng.random_bool(0.8))
        .with_adaptive_spacing(rng.random_bool(0.8))
        .with_max_quad_edge_length(if rng.random_bool(0.3) { rng.random_range(0.5..3.0) } else { 0.0 })
}

fn face_normal_y(mesh: &GeomMesh, tri: &[u32]) -> f64 {
    let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Point3::from_array(mesh.positions[i as usize]));
    (b - a).cross(c - a).y
}

fn assert_well_formed(mesh: &GeomMesh, context: &str) {
    assert!(mesh.validate().is_ok(), "{context}: {:?}", mesh.validate());
    assert!(
        mesh.positions.iter().flatten().all(|v| v.is_finite()),
        "{context}: non-finite position"
    );
    if let Some(uvs) = mesh.uvs.as_ref() {
        assert!(uvs.iter().flatten().all(|v| v.is_finite()), "{context}: non-finite uv");
    }
}

#[test]
fn random_chains_produce_valid_meshes() {
    let mut rng = StdRng::seed_from_u64(0x5eed_0001);
    for round in 0..40 {
        let chains: Vec<ControlPointChain> = (0..rng.random_range(1..4)).map(|_| random_chain(&mut rng)).collect();
        let settings = random_settings(&mut rng);
        let (mesh, diagnostics) = generate_road(&chains, &settings);

        let context = format!("round {round}");
        assert_well_formed(&mesh, &context);
        assert_eq!(diagnostics.vertex_count, mesh.vertex_count(), "{context}");
        assert_eq!(diagnostics.triangle_count, mesh.triangle_count(), "{context}");

        if settings.thickness > 0.0 && !mesh.is_empty() {
            assert!(diagnostics.is_valid_solid(), "{context}: {diagnostics}");
            assert_eq!(diagnostics.degenerate_triangle_count, 0, "{context}");
            // top faces come first, followed by as many bottom faces and two per wall
            let top = mesh.triangle_count() / 2 - diagnostics.side_wall_quad_count;
            for tri in mesh.indices.chunks_exact(3).take(top) {
                assert!(face_normal_y(&mesh, tri) > 0.0, "{context}: top triangle {tri:?} faces down");
            }
        }
    }
}

#[test]
fn coincident_and_collinear_points_are_survivable() {
    let same = Point3::new(3.0, 0.0, 3.0);
    let chains = vec![
        ControlPointChain::from_positions(vec![same; 6], false),
        ControlPointChain::from_positions(vec![same; 6], true),
        ControlPointChain::from_positions(
            (0..8).map(|i| Point3::new(f64::from(i), 0.0, 0.0)).collect(),
            true,
        ),
        ControlPointChain::from_positions(
            vec![Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 0.0, 0.0), Point3::new(0.0, 0.0, 0.0)],
            false,
        ),
    ];
    let (mesh, _) = generate_road(&chains, &RoadSettings::default());
    assert_well_formed(&mesh, "degenerate chains");
}

#[test]
fn extreme_settings_are_sanitized() {
    let chain = ControlPointChain::from_positions(
        vec![Point3::new(0.0, 0.0, 0.0), Point3::new(5.0, 0.0, 5.0), Point3::new(10.0, 0.0, 0.0)],
        false,
    );
    let mut settings = RoadSettings::default();
    settings.spacing = 0.0;
    settings.half_width = f64::NAN;
    settings.thickness = -1.0;
    settings.smoothing_strength = 7.0;
    settings.max_index_distance = 0;

    let (mesh, diagnostics) = generate_road(&[chain], &settings);
    assert_well_formed(&mesh, "sanitized settings");
    assert!(!mesh.is_empty());
    assert_eq!(diagnostics.side_wall_quad_count, 0);
}

#[test]
fn random_graph_edits_keep_chains_consistent() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut graph = ControlPointGraph::new();
    let mut ids = Vec::new();

    for _ in 0..80 {
        let position = Point3::new(rng.random_range(-20.0..20.0), 0.0, rng.random_range(-20.0..20.0));
        match rng.random_range(0..5) {
            0 | 1 => {
                if let Ok(id) = graph.add_point(position) {
                    ids.push(id);
                }
            }
            2 if !ids.is_empty() => {
                let after = ids[rng.random_range(0..ids.len())];
                if let Ok(id) = graph.append_point(after, position) {
                    ids.push(id);
                }
            }
            3 if !ids.is_empty() => {
                let id = ids.swap_remove(rng.random_range(0..ids.len()));
                let _ = graph.remove_point(id);
            }
            4 if !ids.is_empty() => {
                let _ = graph.close_chain(ids[rng.random_range(0..ids.len())]);
            }
            _ => {}
        }
    }

    let chains = graph.chains();
    let total: usize = chains.iter().map(ControlPointChain::len).sum();
    assert_eq!(total, graph.len());

    let (mesh, _) = generate_road(&chains, &RoadSettings::default().with_spacing(3.0));
    assert_well_formed(&mesh, "graph chains");
}
