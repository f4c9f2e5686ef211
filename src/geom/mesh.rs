use std::collections::HashMap;

use super::diagnostics::GeomMeshDiagnostics;
use super::{Point3, Tolerance};

/// Largest vertex count addressable with 16-bit indices.
pub const MAX_U16_VERTEX_COUNT: usize = 65_535;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeomMesh {
    pub positions: Vec<[f64; 3]>,
    pub indices: Vec<u32>,
    pub uvs: Option<Vec<[f64; 2]>>,
    pub normals: Option<Vec<[f64; 3]>>,
    /// Tangent vectors for normal mapping (computed from UV gradients when available).
    /// Each tangent is a unit vector in the direction of increasing U.
    pub tangents: Option<Vec<[f64; 3]>>,
}

/// Index width a renderer should upload the mesh with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexFormat {
    U16,
    U32,
}

impl GeomMesh {
    /// Create a new mesh with positions and indices only.
    #[must_use]
    pub fn new(positions: Vec<[f64; 3]>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            indices,
            uvs: None,
            normals: None,
            tangents: None,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// 32-bit indices are only required past 65 535 vertices.
    #[must_use]
    pub fn index_format(&self) -> IndexFormat {
        if self.positions.len() > MAX_U16_VERTEX_COUNT {
            IndexFormat::U32
        } else {
            IndexFormat::U16
        }
    }

    /// Returns the index buffer narrowed to 16 bits, or `None` when the mesh
    /// needs [`IndexFormat::U32`].
    #[must_use]
    pub fn indices_u16(&self) -> Option<Vec<u16>> {
        if self.index_format() == IndexFormat::U32 {
            return None;
        }
        self.indices.iter().map(|&i| u16::try_from(i).ok()).collect()
    }

    /// Returns true if any vertex position contains NaN or Inf values.
    #[must_use]
    pub fn has_invalid_vertices(&self) -> bool {
        self.positions
            .iter()
            .any(|p| !p[0].is_finite() || !p[1].is_finite() || !p[2].is_finite())
    }

    /// Returns true if all vertex indices are within bounds.
    #[must_use]
    pub fn has_valid_indices(&self) -> bool {
        let n = self.positions.len();
        self.indices.iter().all(|&i| (i as usize) < n)
    }

    /// Returns true if indices represent a triangle list.
    #[must_use]
    pub fn has_triangle_indices(&self) -> bool {
        self.indices.len() % 3 == 0
    }

    /// Returns true if all optional vertex attribute buffers match `positions.len()`.
    #[must_use]
    pub fn has_valid_attribute_lengths(&self) -> bool {
        let n = self.positions.len();
        self.uvs.as_ref().is_none_or(|uvs| uvs.len() == n)
            && self.normals.as_ref().is_none_or(|normals| normals.len() == n)
            && self.tangents.as_ref().is_none_or(|tangents| tangents.len() == n)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.has_triangle_indices() {
            return Err("mesh indices are not a triangle list (len % 3 != 0)".to_string());
        }
        if self.has_invalid_vertices() {
            return Err("mesh has invalid vertex coordinates (NaN/Inf)".to_string());
        }
        if !self.has_valid_indices() {
            return Err("mesh has out-of-bounds vertex indices".to_string());
        }
        if !self.has_valid_attribute_lengths() {
            return Err("mesh attribute buffers do not match vertex count".to_string());
        }
        Ok(())
    }

    /// Position buffer as a flat slice: `[x0, y0, z0, x1, y1, z1, ...]`.
    #[must_use]
    pub fn positions_flat(&self) -> &[f64] {
        self.positions.as_flattened()
    }

    /// UV buffer as a flat slice: `[u0, v0, u1, v1, ...]`.
    #[must_use]
    pub fn uvs_flat(&self) -> Option<&[f64]> {
        self.uvs.as_deref().map(<[[f64; 2]]>::as_flattened)
    }

    /// Normal buffer as a flat slice.
    #[must_use]
    pub fn normals_flat(&self) -> Option<&[f64]> {
        self.normals.as_deref().map(<[[f64; 3]]>::as_flattened)
    }

    /// Tangent buffer as a flat slice.
    #[must_use]
    pub fn tangents_flat(&self) -> Option<&[f64]> {
        self.tangents.as_deref().map(<[[f64; 3]]>::as_flattened)
    }
}

/// Unordered edge key: the smaller vertex index first.
#[must_use]
pub fn edge_key(a: u32, b: u32) -> (u32, u32) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Welds, culls degenerates, counts edge topology and computes normals and
/// tangents. Every mesh the pipeline returns goes through here.
///
/// Vertices merge only when both position and UV agree, so a UV seam keeps
/// its split vertices. Edge topology and normals are still computed on
/// positions: a seam is neither an open edge nor a crease.
pub(crate) fn finalize_mesh(
    points: Vec<Point3>,
    uvs: Option<Vec<[f64; 2]>>,
    indices: Vec<u32>,
    tol: Tolerance,
) -> (GeomMesh, GeomMeshDiagnostics) {
    let welded = weld_mesh_vertices(points, uvs.as_deref(), indices, tol);

    let (repaired_indices, degenerate_triangle_count) =
        cull_degenerate_triangles(&welded.points, &welded.indices, tol);
    let position_indices: Vec<u32> = repaired_indices
        .iter()
        .map(|&i| welded.position_ids.get(i as usize).copied().unwrap_or(i))
        .collect();
    let (open_edge_count, non_manifold_edge_count) = count_edge_topology(&position_indices);

    let mut warnings = Vec::new();
    if non_manifold_edge_count > 0 {
        warnings.push("mesh has non-manifold edges".to_string());
    }

    let position_normals = compute_smooth_normals(&welded.positions, &position_indices);
    let normals: Vec<[f64; 3]> = welded
        .position_ids
        .iter()
        .map(|&id| position_normals.get(id as usize).copied().unwrap_or([0.0, 1.0, 0.0]))
        .collect();
    let tangents = welded
        .uvs
        .as_ref()
        .map(|uvs| compute_tangents(&welded.points, &repaired_indices, uvs, &normals));

    let mesh = GeomMesh {
        positions: welded.points.into_iter().map(Point3::to_array).collect(),
        indices: repaired_indices,
        uvs: welded.uvs,
        normals: Some(normals),
        tangents,
    };

    let diagnostics = GeomMeshDiagnostics {
        vertex_count: mesh.positions.len(),
        triangle_count: mesh.triangle_count(),
        welded_vertex_count: welded.welded,
        degenerate_triangle_count,
        open_edge_count,
        non_manifold_edge_count,
        warnings,
        ..Default::default()
    };

    (mesh, diagnostics)
}

/// Quantize a coordinate value to a grid cell index.
/// Returns None for non-finite values (NaN/Inf) so they never weld.
fn quantize(value: f64, inv: f64) -> Option<i64> {
    if !value.is_finite() {
        return None;
    }
    let q = (value * inv).floor();
    Some(q.clamp(i64::MIN as f64, i64::MAX as f64) as i64)
}

fn cell_key(p: Point3, inv: f64) -> Option<(i64, i64, i64)> {
    Some((quantize(p.x, inv)?, quantize(p.y, inv)?, quantize(p.z, inv)?))
}

/// Spatial hash over points on a uniform grid.
///
/// Used for tolerance welding (cell = tolerance) and nearest-point snapping
/// (cell = typical point spacing).
#[derive(Debug, Clone)]
pub struct PointGrid {
    inv_cell: f64,
    buckets: HashMap<(i64, i64, i64), Vec<u32>>,
    points: Vec<Point3>,
}

impl PointGrid {
    /// Returns `None` if `cell` is not a positive finite size.
    #[must_use]
    pub fn new(cell: f64) -> Option<Self> {
        if !cell.is_finite() || cell <= 0.0 {
            return None;
        }
        Some(Self {
            inv_cell: 1.0 / cell,
            buckets: HashMap::new(),
            points: Vec::new(),
        })
    }

    /// Builds a grid over `points`, indexed in input order.
    #[must_use]
    pub fn from_points(points: &[Point3], cell: f64) -> Option<Self> {
        let mut grid = Self::new(cell)?;
        for &p in points {
            grid.insert(p);
        }
        Some(grid)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn point(&self, index: u32) -> Option<Point3> {
        self.points.get(index as usize).copied()
    }

    /// Adds a point and returns its index. Non-finite points are stored but
    /// never found by lookups.
    pub fn insert(&mut self, p: Point3) -> u32 {
        let index = self.points.len() as u32;
        self.points.push(p);
        if let Some(key) = cell_key(p, self.inv_cell) {
            self.buckets.entry(key).or_default().push(index);
        }
        index
    }

    /// First stored point within `tol` of `p`, searching the 27 neighbouring cells.
    #[must_use]
    pub fn find_within(&self, p: Point3, tol: Tolerance) -> Option<u32> {
        let key = cell_key(p, self.inv_cell)?;
        for dx in -1i64..=1 {
            for dy in -1i64..=1 {
                for dz in -1i64..=1 {
                    let lookup = (key.0 + dx, key.1 + dy, key.2 + dz);
                    let Some(candidates) = self.buckets.get(&lookup) else {
                        continue;
                    };
                    if let Some(&found) = candidates
                        .iter()
                        .find(|&&cand| tol.approx_eq_point3(self.points[cand as usize], p))
                    {
                        return Some(found);
                    }
                }
            }
        }
        None
    }

    /// Nearest stored point to `p`.
    ///
    /// Searches rings of cells outward and stops once the ring distance exceeds
    /// the best match, so the result is exact rather than cell-local.
    #[must_use]
    pub fn nearest(&self, p: Point3) -> Option<(u32, Point3)> {
        let key = cell_key(p, self.inv_cell)?;
        let cell = 1.0 / self.inv_cell;
        let mut best: Option<(u32, f64)> = None;
        let mut visited = 0usize;
        let total = self.buckets.values().map(Vec::len).sum::<usize>();

        for radius in 0i64.. {
            if let Some((_, best_d2)) = best {
                let reach = (radius - 1).max(0) as f64 * cell;
                if reach * reach > best_d2 {
                    break;
                }
            }
            if visited >= total {
                break;
            }
            for dx in -radius..=radius {
                for dy in -radius..=radius {
                    for dz in -radius..=radius {
                        if dx.abs().max(dy.abs()).max(dz.abs()) != radius {
                            continue;
                        }
                        let Some(candidates) = self.buckets.get(&(key.0 + dx, key.1 + dy, key.2 + dz))
                        else {
                            continue;
                        };
                        visited += candidates.len();
                        for &cand in candidates {
                            let d2 = self.points[cand as usize].distance_squared_to(p);
                            if best.is_none_or(|(_, b)| d2 < b) {
                                best = Some((cand, d2));
                            }
                        }
                    }
                }
            }
        }

        best.map(|(index, _)| (index, self.points[index as usize]))
    }
}

/// Result of [`weld_mesh_vertices`].
pub(crate) struct WeldedVertices {
    pub points: Vec<Point3>,
    pub uvs: Option<Vec<[f64; 2]>>,
    pub indices: Vec<u32>,
    /// Input vertices merged into an earlier one.
    pub welded: usize,
    /// Distinct positions; several output vertices may share one.
    pub positions: Vec<Point3>,
    /// Index into `positions` for every output vertex.
    pub position_ids: Vec<u32>,
}

/// Merges vertices within `tol` of each other that also carry the same UV.
pub(crate) fn weld_mesh_vertices(
    points: Vec<Point3>,
    uvs: Option<&[[f64; 2]]>,
    indices: Vec<u32>,
    tol: Tolerance,
) -> WeldedVertices {
    let Some(mut grid) = PointGrid::new(tol.eps) else {
        let position_ids = (0..points.len() as u32).collect();
        return WeldedVertices {
            positions: points.clone(),
            points,
            uvs: uvs.map(<[[f64; 2]]>::to_vec),
            indices,
            welded: 0,
            position_ids,
        };
    };

    let mut remap: Vec<u32> = Vec::with_capacity(points.len());
    let mut vertices: HashMap<(u32, [u64; 2]), u32> = HashMap::with_capacity(points.len());
    let mut out_points: Vec<Point3> = Vec::with_capacity(points.len());
    let mut out_uvs: Option<Vec<[f64; 2]>> = uvs.map(|_| Vec::with_capacity(points.len()));
    let mut position_ids: Vec<u32> = Vec::with_capacity(points.len());

    for (i, p) in points.iter().copied().enumerate() {
        let position = match grid.find_within(p, tol) {
            Some(existing) => existing,
            None => grid.insert(p),
        };
        let uv = uvs.and_then(|src| src.get(i).copied()).unwrap_or([0.0, 0.0]);
        // `+ 0.0` folds -0.0 into 0.0
        let uv_bits = [(uv[0] + 0.0).to_bits(), (uv[1] + 0.0).to_bits()];
        let out_idx = *vertices.entry((position, uv_bits)).or_insert_with(|| {
            let index = out_points.len() as u32;
            out_points.push(grid.point(position).unwrap_or(p));
            if let Some(dst) = out_uvs.as_mut() {
                dst.push(uv);
            }
            position_ids.push(position);
            index
        });
        remap.push(out_idx);
    }

    let out_indices = indices
        .into_iter()
        .map(|idx| remap.get(idx as usize).copied().unwrap_or(idx))
        .collect();

    let welded = points.len().saturating_sub(out_points.len());
    WeldedVertices {
        points: out_points,
        uvs: out_uvs,
        indices: out_indices,
        welded,
        positions: grid.points,
        position_ids,
    }
}

fn cull_degenerate_triangles(points: &[Point3], indices: &[u32], tol: Tolerance) -> (Vec<u32>, usize) {
    let mut out = Vec::with_capacity(indices.len());
    let mut removed = 0usize;

    for tri in indices.chunks_exact(3) {
        let (i0, i1, i2) = (tri[0], tri[1], tri[2]);
        if i0 == i1 || i1 == i2 || i0 == i2 {
            removed += 1;
            continue;
        }

        let (Some(a), Some(b), Some(c)) = (
            points.get(i0 as usize).copied(),
            points.get(i1 as usize).copied(),
            points.get(i2 as usize).copied(),
        ) else {
            removed += 1;
            continue;
        };

        let area2 = b.sub_point(a).cross(c.sub_point(a)).length_squared();
        if !area2.is_finite() || area2 <= tol.eps_squared() * tol.eps_squared() {
            removed += 1;
            continue;
        }

        out.extend_from_slice(&[i0, i1, i2]);
    }

    (out, removed)
}

/// Counts edges used by exactly one triangle (open) and by more than two
/// (non-manifold).
fn count_edge_topology(indices: &[u32]) -> (usize, usize) {
    let mut edge_counts: HashMap<(u32, u32), u32> = HashMap::new();

    for tri in indices.chunks_exact(3) {
        let (i0, i1, i2) = (tri[0], tri[1], tri[2]);
        if i0 == i1 || i1 == i2 || i0 == i2 {
            continue;
        }
        for (ea, eb) in [(i0, i1), (i1, i2), (i2, i0)] {
            *edge_counts.entry(edge_key(ea, eb)).or_insert(0) += 1;
        }
    }

    let open_edge_count = edge_counts.values().filter(|&&c| c == 1).count();
    let non_manifold_edge_count = edge_counts.values().filter(|&&c| c > 2).count();
    (open_edge_count, non_manifold_edge_count)
}

fn compute_smooth_normals(points: &[Point3], indices: &[u32]) -> Vec<[f64; 3]> {
    let mut normals = vec![[0.0, 0.0, 0.0]; points.len()];

    for tri in indices.chunks_exact(3) {
        let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let (Some(a), Some(b), Some(c)) = (points.get(i0), points.get(i1), points.get(i2)) else {
            continue;
        };

        // Area-weighted face normal.
        let n = b.sub_point(*a).cross(c.sub_point(*a));
        for i in [i0, i1, i2] {
            normals[i][0] += n.x;
            normals[i][1] += n.y;
            normals[i][2] += n.z;
        }
    }

    for n in &mut normals {
        let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        if len.is_finite() && len > 0.0 {
            let inv = 1.0 / len;
            n[0] *= inv;
            n[1] *= inv;
            n[2] *= inv;
        } else {
            *n = [0.0, 1.0, 0.0];
        }
    }

    normals
}

/// Compute tangent vectors from UV gradients.
///
/// Each tangent is a unit vector in the direction of increasing U,
/// orthogonalized against the vertex normal. Falls back to a vector
/// perpendicular to the normal when UV gradients are degenerate.
fn compute_tangents(
    points: &[Point3],
    indices: &[u32],
    uvs: &[[f64; 2]],
    normals: &[[f64; 3]],
) -> Vec<[f64; 3]> {
    let mut tangents = vec![[0.0, 0.0, 0.0]; points.len()];

    for tri in indices.chunks_exact(3) {
        let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let (Some(p0), Some(p1), Some(p2)) = (points.get(i0), points.get(i1), points.get(i2)) else {
            continue;
        };
        let (Some(uv0), Some(uv1), Some(uv2)) = (uvs.get(i0), uvs.get(i1), uvs.get(i2)) else {
            continue;
        };

        let edge1 = p1.sub_point(*p0);
        let edge2 = p2.sub_point(*p0);

        let du1 = uv1[0] - uv0[0];
        let dv1 = uv1[1] - uv0[1];
        let du2 = uv2[0] - uv0[0];
        let dv2 = uv2[1] - uv0[1];

        let det = du1 * dv2 - du2 * dv1;
        // Zero area in UV space
        if det.abs() < 1e-12 {
            continue;
        }

        let t = (edge1 * dv2 - edge2 * dv1) * (1.0 / det);
        for i in [i0, i1, i2] {
            tangents[i][0] += t.x;
            tangents[i][1] += t.y;
            tangents[i][2] += t.z;
        }
    }

    for (i, t) in tangents.iter_mut().enumerate() {
        let n = normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]);

        // Gram-Schmidt: T' = T - (N dot T) * N
        let t_dot_n = t[0] * n[0] + t[1] * n[1] + t[2] * n[2];
        t[0] -= n[0] * t_dot_n;
        t[1] -= n[1] * t_dot_n;
        t[2] -= n[2] * t_dot_n;

        let len = (t[0] * t[0] + t[1] * t[1] + t[2] * t[2]).sqrt();
        if len.is_finite() && len > 0.0 {
            let inv = 1.0 / len;
            t[0] *= inv;
            t[1] *= inv;
            t[2] *= inv;
            continue;
        }

        let arbitrary = if n[0].abs() < 0.9 { [1.0, 0.0, 0.0] } else { [0.0, 1.0, 0.0] };
        let cx = n[1] * arbitrary[2] - n[2] * arbitrary[1];
        let cy = n[2] * arbitrary[0] - n[0] * arbitrary[2];
        let cz = n[0] * arbitrary[1] - n[1] * arbitrary[0];

        let clen = (cx * cx + cy * cy + cz * cz).sqrt();
        if clen.is_finite() && clen > 0.0 {
            let inv = 1.0 / clen;
            *t = [cx * inv, cy * inv, cz * inv];
        } else {
            *t = [1.0, 0.0, 0.0];
        }
    }

    tangents
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_points() -> Vec<Point3> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(0.0, 0.0, 1.0),
        ]
    }

    #[test]
    fn weld_merges_coincident_vertices() {
        let mut points = quad_points();
        points.push(Point3::new(1.0 + 1e-8, 0.0, 1.0));
        let indices = vec![0, 2, 1, 0, 3, 4];
        let out = weld_mesh_vertices(points, None, indices, Tolerance::WELD);
        assert_eq!(out.points.len(), 4);
        assert_eq!(out.welded, 1);
        assert_eq!(out.indices, vec![0, 2, 1, 0, 3, 2]);
    }

    #[test]
    fn uv_seam_keeps_split_vertices_but_closes_topology() {
        // Two triangles share the edge 1-2 by position, but the second one
        // carries a different v there, as at the end of a closed strip.
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(2.0, 0.0, 1.0),
        ];
        let uvs = vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [1.0, 5.0], [1.0, 6.0], [2.0, 6.0]];
        let indices = vec![0, 2, 1, 3, 4, 5];
        let (mesh, diag) = finalize_mesh(points, Some(uvs), indices, Tolerance::WELD);

        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(diag.welded_vertex_count, 0);
        // 2 triangles, 5 distinct edges, the shared one counted twice
        assert_eq!(diag.open_edge_count, 4);
        let normals = mesh.normals.unwrap();
        assert_eq!(normals[1], normals[3]);
        assert_eq!(normals[2], normals[4]);
    }

    #[test]
    fn single_quad_has_four_open_edges() {
        let (mesh, diag) = finalize_mesh(quad_points(), None, vec![0, 2, 1, 0, 3, 2], Tolerance::WELD);
        assert_eq!(diag.triangle_count, 2);
        assert_eq!(diag.open_edge_count, 4);
        assert_eq!(diag.non_manifold_edge_count, 0);
        assert!(mesh.validate().is_ok());
        let normals = mesh.normals.unwrap();
        assert!(normals.iter().all(|n| n[1] > 0.99));
    }

    #[test]
    fn degenerate_triangles_are_culled() {
        let (mesh, diag) = finalize_mesh(quad_points(), None, vec![0, 1, 1, 0, 2, 1], Tolerance::WELD);
        assert_eq!(diag.degenerate_triangle_count, 1);
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn tangents_follow_increasing_u() {
        let uvs = vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        let (mesh, _) = finalize_mesh(quad_points(), Some(uvs), vec![0, 2, 1, 0, 3, 2], Tolerance::WELD);
        let tangents = mesh.tangents.unwrap();
        for t in tangents {
            assert!((t[0] - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn index_format_switches_past_u16_range() {
        let small = GeomMesh::new(vec![[0.0; 3]; 3], vec![0, 1, 2]);
        assert_eq!(small.index_format(), IndexFormat::U16);
        assert_eq!(small.indices_u16(), Some(vec![0u16, 1, 2]));

        let large = GeomMesh::new(vec![[0.0; 3]; MAX_U16_VERTEX_COUNT + 1], vec![0, 1, 65_535]);
        assert_eq!(large.index_format(), IndexFormat::U32);
        assert!(large.indices_u16().is_none());
    }

    #[test]
    fn nearest_is_exact_across_cells() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(5.0, 0.0, 0.0),
            Point3::new(2.6, 0.0, 0.0),
        ];
        let grid = PointGrid::from_points(&points, 0.5).unwrap();
        let (index, p) = grid.nearest(Point3::new(4.0, 0.0, 0.0)).unwrap();
        assert_eq!(index, 1);
        assert_eq!(p, points[1]);
        let (index, _) = grid.nearest(Point3::new(1.2, 0.0, 0.0)).unwrap();
        assert_eq!(index, 0);
    }

    #[test]
    fn flat_views_are_packed() {
        let mesh = GeomMesh::new(vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]], vec![]);
        assert_eq!(mesh.positions_flat(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }
}
