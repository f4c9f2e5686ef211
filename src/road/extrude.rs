//! Turning a quad ribbon into a closed triangle mesh.

use std::collections::HashMap;

use crate::geom::{
    GeomMesh, GeomMeshDiagnostics, GeomMetrics, Point3, PointGrid, TimingBucket, Tolerance, Vec3,
    edge_key, finalize_mesh,
};

use super::quads::MeshQuad;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtrudeOptions {
    /// Distance the bottom face sits below the top. `0` emits only the top.
    pub height: f64,
    /// Length that maps to one unit of `v` along the road.
    pub uv_length_scale: f64,
    pub tolerance: Tolerance,
}

impl ExtrudeOptions {
    #[must_use]
    pub const fn new(height: f64) -> Self {
        Self {
            height,
            uv_length_scale: 1.0,
            tolerance: Tolerance::WELD,
        }
    }

    #[must_use]
    pub const fn with_uv_length_scale(mut self, scale: f64) -> Self {
        self.uv_length_scale = scale;
        self
    }

    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }
}

impl Default for ExtrudeOptions {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Builds the road mesh from quads.
///
/// Every quad contributes up to two top triangles. Each triangle is wound to
/// face up on its own, and triangles that collapse onto a repeated corner are
/// skipped. With a positive height the top is mirrored downward with
/// reversed winding, and walls are added along every edge used by exactly
/// one top triangle. Edge usage is counted on welded positions, so the walls
/// close the solid even where a closed strip duplicates its seam vertices
/// for UVs.
pub fn extrude_quads(quads: &[MeshQuad], options: ExtrudeOptions) -> (GeomMesh, GeomMeshDiagnostics) {
    extrude_quads_with_metrics(quads, options, &mut GeomMetrics::default())
}

/// [`extrude_quads`], timing triangle emission and mesh finalization
/// separately.
pub fn extrude_quads_with_metrics(
    quads: &[MeshQuad],
    options: ExtrudeOptions,
    metrics: &mut GeomMetrics,
) -> (GeomMesh, GeomMeshDiagnostics) {
    let tol = options.tolerance;
    let Some(emitted) = metrics.time(TimingBucket::Extrusion, || emit_triangles(quads, options)) else {
        return (GeomMesh::default(), GeomMeshDiagnostics::default());
    };

    let (mesh, mut diagnostics) = metrics.time(TimingBucket::Finalize, || {
        finalize_mesh(emitted.points, Some(emitted.uvs), emitted.indices, tol)
    });
    diagnostics.top_quad_count = quads.len();
    diagnostics.side_wall_quad_count = emitted.side_walls;
    diagnostics.flipped_triangle_count = emitted.flipped_triangles;
    (mesh, diagnostics)
}

struct EmittedTriangles {
    points: Vec<Point3>,
    uvs: Vec<[f64; 2]>,
    indices: Vec<u32>,
    side_walls: usize,
    flipped_triangles: usize,
}

/// Render vertices on top of a position weld.
///
/// Every welded position gets one primary vertex. A closed strip that comes
/// back to its first row gets a second vertex at the same position carrying
/// the end-of-strip `v`, so no triangle interpolates across the seam.
struct TopVertices {
    grid: PointGrid,
    tol: Tolerance,
    /// Position of each welded id.
    welded: Vec<Point3>,
    points: Vec<Point3>,
    uvs: Vec<[f64; 2]>,
    /// Welded position id of each render vertex.
    topo: Vec<u32>,
    primary: HashMap<u32, u32>,
    seam: HashMap<u32, u32>,
}

impl TopVertices {
    fn new(tol: Tolerance, capacity: usize) -> Option<Self> {
        Some(Self {
            grid: PointGrid::new(tol.eps)?,
            tol,
            welded: Vec::with_capacity(capacity),
            points: Vec::with_capacity(capacity),
            uvs: Vec::with_capacity(capacity),
            topo: Vec::with_capacity(capacity),
            primary: HashMap::with_capacity(capacity),
            seam: HashMap::new(),
        })
    }

    fn weld(&mut self, p: Point3) -> u32 {
        if let Some(existing) = self.grid.find_within(p, self.tol) {
            return existing;
        }
        self.welded.push(p);
        self.grid.insert(p)
    }

    fn push(&mut self, topo: u32, uv: [f64; 2]) -> u32 {
        let index = self.points.len() as u32;
        self.points.push(self.welded[topo as usize]);
        self.uvs.push(uv);
        self.topo.push(topo);
        index
    }

    fn primary(&mut self, topo: u32, uv: [f64; 2]) -> u32 {
        if let Some(&existing) = self.primary.get(&topo) {
            return existing;
        }
        let index = self.push(topo, uv);
        self.primary.insert(topo, index);
        index
    }

    fn seam(&mut self, topo: u32, uv: [f64; 2]) -> u32 {
        if let Some(&existing) = self.seam.get(&topo) {
            return existing;
        }
        let index = self.push(topo, uv);
        self.seam.insert(topo, index);
        index
    }
}

/// One side (left or right) of the strip currently being emitted.
struct StripSide {
    start: u32,
    departed: bool,
    trailing: u32,
}

impl StripSide {
    /// Render vertex for the leading corner of a quad on this side.
    fn lead(&mut self, top: &mut TopVertices, topo: u32, uv: [f64; 2]) -> u32 {
        let index = if self.departed && topo == self.start {
            top.seam(topo, uv)
        } else if topo == top.topo[self.trailing as usize] {
            self.trailing
        } else {
            top.primary(topo, uv)
        };
        self.departed |= topo != self.start;
        self.trailing = index;
        index
    }
}

fn emit_triangles(quads: &[MeshQuad], options: ExtrudeOptions) -> Option<EmittedTriangles> {
    let tol = options.tolerance;
    let mut top = TopVertices::new(tol, quads.len() * 2 + 2)?;

    let v_scale = if options.uv_length_scale.is_finite() && options.uv_length_scale > 0.0 {
        1.0 / options.uv_length_scale
    } else {
        1.0
    };
    let min_area2 = tol.eps_squared();

    let mut indices: Vec<u32> = Vec::with_capacity(quads.len() * 6);
    let mut perimeter: Vec<(u32, u32)> = Vec::with_capacity(quads.len() * 4);
    let mut flipped_triangles = 0usize;
    let mut distance = 0.0;
    let mut last_center: Option<Point3> = None;
    let mut sides: Option<(StripSide, StripSide)> = None;

    for quad in quads {
        // v restarts whenever the strip is discontinuous (a new chain)
        if last_center.is_some_and(|c| !tol.approx_eq_point3(c, quad.center_start)) {
            distance = 0.0;
            sides = None;
        }
        let v0 = distance * v_scale;
        distance += quad.center_start.distance_to(quad.center_end);
        let v1 = distance * v_scale;
        last_center = Some(quad.center_end);

        let (ta, tb, tc, td) = (top.weld(quad.a), top.weld(quad.b), top.weld(quad.c), top.weld(quad.d));
        let (left, right) = sides.get_or_insert_with(|| {
            let a = top.primary(ta, [0.0, v0]);
            let b = top.primary(tb, [1.0, v0]);
            (
                StripSide { start: ta, departed: false, trailing: a },
                StripSide { start: tb, departed: false, trailing: b },
            )
        });
        let a = if top.topo[left.trailing as usize] == ta { left.trailing } else { top.primary(ta, [0.0, v0]) };
        let b = if top.topo[right.trailing as usize] == tb { right.trailing } else { top.primary(tb, [1.0, v0]) };
        left.trailing = a;
        right.trailing = b;
        let d = left.lead(&mut top, td, [0.0, v1]);
        let c = right.lead(&mut top, tc, [1.0, v1]);

        for [t0, t1, t2] in [[a, c, b], [a, d, c]] {
            let (k0, k1, k2) = (top.topo[t0 as usize], top.topo[t1 as usize], top.topo[t2 as usize]);
            if k0 == k1 || k1 == k2 || k0 == k2 {
                continue;
            }
            let (p0, p1, p2) = (top.points[t0 as usize], top.points[t1 as usize], top.points[t2 as usize]);
            let normal = (p1 - p0).cross(p2 - p0);
            let area2 = normal.length_squared();
            if area2.is_nan() || area2 <= min_area2 {
                continue;
            }
            let tri = if normal.y < 0.0 {
                flipped_triangles += 1;
                [t0, t2, t1]
            } else {
                [t0, t1, t2]
            };
            indices.extend_from_slice(&tri);
            perimeter.extend_from_slice(&[(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])]);
        }
    }

    let mut usage: HashMap<(u32, u32), usize> = HashMap::with_capacity(perimeter.len());
    for &(p, q) in &perimeter {
        *usage.entry(edge_key(top.topo[p as usize], top.topo[q as usize])).or_insert(0) += 1;
    }

    let top_count = top.points.len();
    let TopVertices { mut points, mut uvs, topo, .. } = top;
    let mut side_walls = 0usize;

    if options.height.is_finite() && options.height > tol.eps {
        let offset = top_count as u32;
        let drop = Vec3::UP * options.height;
        let bottom: Vec<Point3> = points.iter().map(|&p| p - drop).collect();
        points.extend(bottom);
        uvs.extend_from_within(0..top_count);

        let top_len = indices.len();
        for t in 0..top_len / 3 {
            let (i0, i1, i2) = (indices[t * 3], indices[t * 3 + 1], indices[t * 3 + 2]);
            indices.extend_from_slice(&[i0 + offset, i2 + offset, i1 + offset]);
        }

        for &(p, q) in &perimeter {
            if usage.get(&edge_key(topo[p as usize], topo[q as usize])).copied() != Some(1) {
                continue;
            }
            let (p_bot, q_bot) = (p + offset, q + offset);
            indices.extend_from_slice(&[p, q_bot, q, p, p_bot, q_bot]);
            side_walls += 1;
        }
    }

    Some(EmittedTriangles {
        points,
        uvs,
        indices,
        side_walls,
        flipped_triangles,
    })
}
