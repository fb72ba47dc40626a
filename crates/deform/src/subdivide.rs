//! Midpoint subdivision.
//!
//! Each pass splits every triangle into four by inserting edge-midpoint
//! vertices:
//!
//! ```text
//!        C                  C
//!       / \                / \
//!      /   \      ->     ca---bc
//!     /     \           / \ / \
//!    A-------B         A--ab---B
//! ```
//!
//! Midpoints are deduplicated across adjacent triangles by position equality
//! within an epsilon, so a shared edge produces one vertex and the result
//! stays manifold-consistent (no seam duplication). Vertex attributes
//! (normal, color, UV sets) are interpolated at the midpoint.
//!
//! Uncontrolled subdivision is the system's primary foot-gun: a few levels
//! can push a mesh past 10^5 vertices and freeze interactive editing. The
//! modifier pre-checks [`projected_vertex_count`] against its configured
//! budget and refuses before any work happens.

use std::collections::HashMap;

use glam::Vec3;
use tracing::debug;

use meshdata::MeshData;

/// Smallest accepted subdivision level.
pub const MIN_LEVEL: u32 = 2;
/// Largest accepted subdivision level.
pub const MAX_LEVEL: u32 = 24;

// Positions closer than this are considered the same midpoint.
const MIDPOINT_EPSILON: f32 = 1e-5;

/// Clamp a requested level into `[MIN_LEVEL, MAX_LEVEL]`.
pub fn clamp_level(level: u32) -> u32 {
    level.clamp(MIN_LEVEL, MAX_LEVEL)
}

/// Number of 4:1 passes a level maps to: `floor(log2(level))`.
///
/// Level 2 and 3 run one pass, 4..=7 two, and the cap of 24 runs four.
pub fn passes_for_level(level: u32) -> u32 {
    clamp_level(level).ilog2()
}

/// Vertex count the mesh would have after subdividing at `level`.
///
/// Exact for shared-edge (manifold) topology: each pass adds one vertex per
/// unique edge (`3t / 2`) and quadruples the triangle count. Callers check
/// this against their vertex budget before running [`subdivide`].
pub fn projected_vertex_count(mesh: &MeshData, level: u32) -> usize {
    let mut vertices = mesh.vertex_count();
    let mut triangles = mesh.triangle_count();
    for _ in 0..passes_for_level(level) {
        vertices += triangles * 3 / 2;
        triangles *= 4;
    }
    vertices
}

/// Subdivide a mesh. Pure: the input is untouched, a denser snapshot is
/// returned.
pub fn subdivide(mesh: &MeshData, level: u32) -> MeshData {
    let passes = passes_for_level(level);
    debug!(
        level,
        passes,
        vertices = mesh.vertex_count(),
        "subdivide"
    );

    let mut current = mesh.clone();
    for _ in 0..passes {
        current = subdivide_pass(&current);
    }
    current
}

fn subdivide_pass(mesh: &MeshData) -> MeshData {
    let mut out = MeshData {
        vertices: mesh.vertices.clone(),
        triangles: Vec::with_capacity(mesh.triangles.len() * 4),
        normals: mesh.normals.clone(),
        colors: mesh.colors.clone(),
        uv0: mesh.uv0.clone(),
        uv1: mesh.uv1.clone(),
        uv2: mesh.uv2.clone(),
    };

    let mut midpoints: HashMap<(i64, i64, i64), u32> = HashMap::new();

    for tri in mesh.triangles.chunks_exact(3) {
        let (a, b, c) = (tri[0], tri[1], tri[2]);
        let ab = midpoint_index(&mut out, &mut midpoints, a, b);
        let bc = midpoint_index(&mut out, &mut midpoints, b, c);
        let ca = midpoint_index(&mut out, &mut midpoints, c, a);

        out.triangles.extend_from_slice(&[
            a, ab, ca, //
            ab, b, bc, //
            ca, bc, c, //
            ab, bc, ca,
        ]);
    }

    out
}

/// Find or create the midpoint vertex of edge `(a, b)`.
///
/// Keyed by quantized position so the midpoint of a shared edge resolves to
/// the same vertex from both sides, regardless of index order.
fn midpoint_index(
    out: &mut MeshData,
    midpoints: &mut HashMap<(i64, i64, i64), u32>,
    a: u32,
    b: u32,
) -> u32 {
    let position = (out.vertices[a as usize] + out.vertices[b as usize]) * 0.5;
    let key = quantize(position);

    if let Some(&existing) = midpoints.get(&key) {
        return existing;
    }

    let index = out.vertices.len() as u32;
    out.vertices.push(position);

    let (ia, ib) = (a as usize, b as usize);
    if !out.normals.is_empty() {
        let n = out.normals[ia].lerp(out.normals[ib], 0.5).normalize_or_zero();
        out.normals.push(n);
    }
    if !out.colors.is_empty() {
        let ca = out.colors[ia];
        let cb = out.colors[ib];
        out.colors
            .push([0, 1, 2, 3].map(|i| (ca[i] + cb[i]) * 0.5));
    }
    if !out.uv0.is_empty() {
        out.uv0.push(out.uv0[ia].lerp(out.uv0[ib], 0.5));
    }
    if !out.uv1.is_empty() {
        out.uv1.push(out.uv1[ia].lerp(out.uv1[ib], 0.5));
    }
    if !out.uv2.is_empty() {
        out.uv2.push(out.uv2[ia].lerp(out.uv2[ib], 0.5));
    }

    midpoints.insert(key, index);
    index
}

fn quantize(position: Vec3) -> (i64, i64, i64) {
    let scale = 1.0 / MIDPOINT_EPSILON;
    (
        (position.x * scale).round() as i64,
        (position.y * scale).round() as i64,
        (position.z * scale).round() as i64,
    )
}
