use super::square_loop;
use crate::geom::{
    Point3, ResampleOptions, SmoothSpline3, Vec3, polyline_length, resample_polyline,
};
use crate::road::{
    CenterRebuildOptions, RoadData, SampleOptions, SmoothOptions, build_quads,
    rebuild_center_from_sides, rebuild_sides_from_center, sample_road, smooth_road,
};

fn circle_controls(count: usize, radius: f64) -> Vec<Point3> {
    (0..count)
        .map(|i| {
            let a = std::f64::consts::TAU * i as f64 / count as f64;
            Point3::new(radius * a.cos(), 0.0, radius * a.sin())
        })
        .collect()
}

fn right_dirs(road: &RoadData) -> Vec<Vec3> {
    road.center_points
        .iter()
        .zip(&road.right_points)
        .map(|(c, r)| (*r - *c).normalized().unwrap())
        .collect()
}

#[test]
fn right_vectors_never_flip_around_a_closed_loop() {
    let controls = circle_controls(8, 12.0);
    let spline = SmoothSpline3::new(&controls, true).unwrap();
    let (road, diag) = sample_road(&spline, &controls, SampleOptions::new(0.5, 1.0));

    assert_eq!(diag.orientation_flips, 0);
    let dirs = right_dirs(&road);
    for i in 0..dirs.len() {
        let next = dirs[(i + 1) % dirs.len()];
        assert!(dirs[i].dot(next) > 0.0, "flip between rows {i} and {}", i + 1);
    }
}

#[test]
fn hairpin_keeps_boundaries_on_their_sides() {
    let controls = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(20.0, 0.0, 0.0),
        Point3::new(22.0, 0.0, 3.0),
        Point3::new(20.0, 0.0, 6.0),
        Point3::new(0.0, 0.0, 6.0),
    ];
    let spline = SmoothSpline3::new(&controls, false).unwrap();
    let (mut road, _) = sample_road(&spline, &controls, SampleOptions::new(1.0, 1.0));
    smooth_road(&mut road, SmoothOptions::new(0.5, 3).with_half_width(1.0));

    for i in 0..road.len() - 1 {
        let tangent = road.center_points[i + 1] - road.center_points[i];
        let offset = road.right_points[i] - road.center_points[i];
        assert!(tangent.cross(offset).y >= 0.0, "row {i} has right on the left");
    }
    // the control points are pinned by smoothing
    assert_eq!(road.center_points[0], Point3::new(0.0, 0.0, 0.0));
    assert!(road.is_knot_point[0]);
}

#[test]
fn closed_center_rebuild_preserves_closure_and_count() {
    let controls = square_loop();
    let spline = SmoothSpline3::new(&controls, true).unwrap();
    let (sampled, _) = sample_road(&spline, &controls, SampleOptions::new(1.0, 1.0));

    let (left, right) = rebuild_sides_from_center(&sampled.center_points, 1.0, true);
    let mut road = RoadData {
        left_points: left,
        right_points: right,
        ..sampled
    };
    let diag = rebuild_center_from_sides(&mut road, CenterRebuildOptions::new(1.0).closed(true));

    assert_eq!(diag.output_count + diag.dropped_count, diag.resampled_count + 1);
    assert_eq!(road.center_points.len(), diag.output_count);
    assert_eq!(road.matched_right.len(), diag.output_count);
    assert_eq!(road.center_points.first(), road.center_points.last());
    assert_eq!(road.allowed_left_from_center.len(), road.center_points.len());
    assert!(road.is_knot_point.iter().all(|k| !k));
    // boundaries were built from this very centerline
    assert!(diag.max_shift < 0.6, "max shift {}", diag.max_shift);

    let quads = build_quads(&road, true);
    assert_eq!(quads.len(), road.center_points.len() - 1);
    assert_eq!(quads[0].a, quads[quads.len() - 1].d);
    assert_eq!(quads[0].b, quads[quads.len() - 1].c);
}

#[test]
fn resampled_boundary_is_stable_under_repeat() {
    let controls = circle_controls(6, 8.0);
    let spline = SmoothSpline3::new(&controls, true).unwrap();
    let (road, _) = sample_road(&spline, &controls, SampleOptions::new(0.7, 1.0));
    let options = ResampleOptions::new(1.0).closed(true);

    let (once, first) = resample_polyline(&road.right_points, options);
    let (twice, _) = resample_polyline(&once, options);

    assert!(twice.len().abs_diff(once.len()) <= 1);
    assert!((polyline_length(&once, true) - first.total_length).abs() < 0.5);
    for b in &twice {
        let nearest = once.iter().map(|a| a.distance_to(*b)).fold(f64::INFINITY, f64::min);
        assert!(nearest < 1.0);
    }
}
