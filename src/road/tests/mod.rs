mod test_pipeline_basic;
mod test_stages_basic;

use std::collections::HashMap;

use crate::geom::{GeomMesh, Point3, Vec3};

pub(super) fn square_loop() -> Vec<Point3> {
    vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(10.0, 0.0, 0.0),
        Point3::new(10.0, 0.0, 10.0),
        Point3::new(0.0, 0.0, 10.0),
    ]
}

pub(super) fn face_normal(mesh: &GeomMesh, tri: &[u32]) -> Vec3 {
    let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Point3::from_array(mesh.positions[i as usize]));
    (b - a).cross(c - a)
}

/// Splits triangles into top, bottom and wall sets by vertex height.
pub(super) fn classify_triangles(mesh: &GeomMesh, split_y: f64) -> (Vec<[u32; 3]>, Vec<[u32; 3]>, Vec<[u32; 3]>) {
    let (mut top, mut bottom, mut walls) = (Vec::new(), Vec::new(), Vec::new());
    for tri in mesh.indices.chunks_exact(3) {
        let t = [tri[0], tri[1], tri[2]];
        let above = t.iter().filter(|&&i| mesh.positions[i as usize][1] > split_y).count();
        match above {
            3 => top.push(t),
            0 => bottom.push(t),
            _ => walls.push(t),
        }
    }
    (top, bottom, walls)
}

/// Edges used by exactly one triangle of `triangles`, compared by vertex
/// position so split UV seams do not count as boundaries. Each edge is
/// reported with the vertex indices of the triangle that uses it.
pub(super) fn boundary_edges(mesh: &GeomMesh, triangles: &[[u32; 3]]) -> Vec<(u32, u32)> {
    let key = |i: u32| mesh.positions[i as usize].map(f64::to_bits);
    let mut usage: HashMap<([u64; 3], [u64; 3]), (usize, (u32, u32))> = HashMap::new();
    for t in triangles {
        for (a, b) in [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])] {
            let (ka, kb) = (key(a), key(b));
            let edge = if ka <= kb { (ka, kb) } else { (kb, ka) };
            usage.entry(edge).or_insert((0, (a, b))).0 += 1;
        }
    }
    usage.into_values().filter(|&(n, _)| n == 1).map(|(_, e)| e).collect()
}
