//! Normal recalculation.
//!
//! Two schemes are provided:
//!
//! - **Flat accumulation**: each vertex normal is the sum of the unnormalized
//!   cross products of its incident triangles (implicit area weighting),
//!   normalized at the end. This is the default after commit/restore/bake.
//! - **Angle-weighted**: a provisional averaged normal is computed first, then
//!   faces whose normal deviates from it by more than a configured angle are
//!   excluded from the final accumulation. Hard edges survive smoothing of
//!   the shading instead of being washed out.
//!
//! Both schemes accumulate strictly in triangle index order, so results are
//! deterministic for identical inputs.

use glam::Vec3;

use crate::data::MeshData;
use crate::geometry::Aabb;

/// Compute per-vertex normals by flat face-normal accumulation.
///
/// Degenerate triangles contribute a zero cross product and drop out
/// naturally; isolated vertices get a zero normal.
pub fn compute_normals(vertices: &[Vec3], triangles: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; vertices.len()];

    for tri in triangles.chunks_exact(3) {
        let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let face = (vertices[b] - vertices[a]).cross(vertices[c] - vertices[a]);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }

    for n in &mut normals {
        *n = n.normalize_or_zero();
    }
    normals
}

/// Compute per-vertex normals, excluding faces that deviate from the
/// vertex's provisional averaged normal by more than `angle_degrees`.
pub fn compute_normals_with_angle(
    vertices: &[Vec3],
    triangles: &[u32],
    angle_degrees: f32,
) -> Vec<Vec3> {
    let provisional = compute_normals(vertices, triangles);
    let cos_threshold = angle_degrees.to_radians().cos();

    let mut normals = vec![Vec3::ZERO; vertices.len()];

    for tri in triangles.chunks_exact(3) {
        let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let face = (vertices[b] - vertices[a]).cross(vertices[c] - vertices[a]);
        let face_dir = face.normalize_or_zero();

        for &v in &[a, b, c] {
            if face_dir.dot(provisional[v]) >= cos_threshold {
                normals[v] += face;
            }
        }
    }

    // A vertex whose every face was excluded falls back to the provisional
    // normal rather than going dark.
    for (n, fallback) in normals.iter_mut().zip(provisional) {
        let normalized = n.normalize_or_zero();
        *n = if normalized == Vec3::ZERO {
            fallback
        } else {
            normalized
        };
    }
    normals
}

/// Recalculate a snapshot's normal array in place.
pub fn recalculate_normals(mesh: &mut MeshData) {
    mesh.normals = compute_normals(&mesh.vertices, &mesh.triangles);
}

/// Recalculate a snapshot's normal array with the angle-weighted scheme.
pub fn recalculate_normals_with_angle(mesh: &mut MeshData, angle_degrees: f32) {
    mesh.normals = compute_normals_with_angle(&mesh.vertices, &mesh.triangles, angle_degrees);
}

/// Recompute the axis-aligned bounds of a snapshot's positions.
pub fn recalculate_bounds(mesh: &MeshData) -> Aabb {
    Aabb::from_points(&mesh.vertices)
}
