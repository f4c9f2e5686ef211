use crate::geom::{
    ClipOptions, Point3, ResampleOptions, clip_self_intersections, find_self_intersection,
    polyline_length, resample_polyline,
};

fn arc(count: usize, radius: f64) -> Vec<Point3> {
    (0..=count)
        .map(|i| {
            let a = std::f64::consts::PI * i as f64 / count as f64;
            Point3::new(radius * a.cos(), 0.0, radius * a.sin())
        })
        .collect()
}

fn nearest_distance(points: &[Point3], target: Point3) -> f64 {
    points.iter().map(|p| p.distance_to(target)).fold(f64::INFINITY, f64::min)
}

/// Two lobes joined by a crossing at the origin, as a closed ring.
fn figure_eight() -> Vec<Point3> {
    let samples = 64;
    let mut ring: Vec<Point3> = (0..samples)
        .map(|i| {
            let t = std::f64::consts::TAU * (i as f64 + 0.5) / samples as f64;
            Point3::new(10.0 * t.sin(), 0.0, 5.0 * t.sin() * t.cos())
        })
        .collect();
    ring.push(ring[0]);
    ring
}

#[test]
fn resampling_uniform_polyline_is_idempotent() {
    let options = ResampleOptions::new(0.5);
    let (once, _) = resample_polyline(&arc(37, 6.0), options);
    let (twice, _) = resample_polyline(&once, options);

    assert!(twice.len().abs_diff(once.len()) <= 1);
    for b in &twice {
        assert!(nearest_distance(&once, *b) < 0.5);
    }
}

#[test]
fn closed_resampling_is_idempotent() {
    let mut ring = arc(40, 5.0);
    ring.extend(arc(40, 5.0).into_iter().skip(1).map(|p| Point3::new(-p.x, 0.0, -p.z)));
    ring.pop();
    let options = ResampleOptions::new(0.75).closed(true);

    let (once, _) = resample_polyline(&ring, options);
    let (twice, _) = resample_polyline(&once, options);
    assert!(twice.len().abs_diff(once.len()) <= 1);
    for b in &twice {
        assert!(nearest_distance(&once, *b) < 0.75);
    }
}

#[test]
fn figure_eight_is_clipped_to_a_simple_loop() {
    let ring = figure_eight();
    let min_distance = 0.25;
    let (clipped, diag) = clip_self_intersections(&ring, ClipOptions::new(min_distance).closed(true));

    assert!(diag.intersections_clipped >= 1);
    assert!(!diag.hit_iteration_cap);
    assert!(find_self_intersection(&clipped, true, min_distance).is_none());
    assert!(polyline_length(&clipped, false) < polyline_length(&ring, false));
    assert_eq!(clipped.first(), clipped.last());
}

#[test]
fn open_output_never_closes_on_itself() {
    // a lasso: the tail crosses back over the start segment
    let path = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(10.0, 0.0, 0.0),
        Point3::new(10.0, 0.0, 10.0),
        Point3::new(5.0, 0.0, 10.0),
        Point3::new(5.0, 0.0, -10.0),
    ];
    let (clipped, diag) = clip_self_intersections(&path, ClipOptions::new(0.1));
    assert_eq!(diag.intersections_clipped, 1);
    assert_ne!(clipped.first(), clipped.last());
    assert_eq!(clipped.last().copied(), Some(Point3::new(5.0, 0.0, -10.0)));
}

#[test]
fn raised_overpass_is_not_a_crossing() {
    let path = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(10.0, 0.0, 0.0),
        Point3::new(10.0, 2.0, 10.0),
        Point3::new(5.0, 2.0, 10.0),
        Point3::new(5.0, 2.0, -10.0),
    ];
    assert!(find_self_intersection(&path, false, 0.5).is_none());
    let (clipped, diag) = clip_self_intersections(&path, ClipOptions::new(0.5));
    assert_eq!(clipped, path);
    assert_eq!(diag.intersections_clipped, 0);
}
