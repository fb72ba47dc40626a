//! Stand-in for the host's live renderable mesh.
//!
//! The host engine decides how a mesh is displayed; this type is the vertex
//! buffer the core authors. It carries a process-unique [`MeshId`] used as
//! the key in the ownership registry, and exposes its buffers as raw bytes
//! for GPU-style upload paths.

use std::sync::atomic::{AtomicU64, Ordering};

use glam::{Vec2, Vec3};
use tracing::trace;

use crate::data::MeshData;
use crate::geometry::Aabb;

/// Process-unique identity of a renderable mesh.
///
/// Two [`RenderMesh`] values with the same id share one underlying asset as
/// far as the ownership registry is concerned; `new_identity` breaks that
/// aliasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub u64);

static NEXT_MESH_ID: AtomicU64 = AtomicU64::new(1);

impl MeshId {
    /// Allocate a fresh, never-before-used id.
    pub fn next() -> Self {
        Self(NEXT_MESH_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// The live vertex/index buffers the host renders.
#[derive(Debug, Clone)]
pub struct RenderMesh {
    id: MeshId,
    pub vertices: Vec<Vec3>,
    pub triangles: Vec<u32>,
    pub normals: Vec<Vec3>,
    pub colors: Vec<[f32; 4]>,
    pub uv0: Vec<Vec2>,
    pub uv1: Vec<Vec2>,
    pub uv2: Vec<Vec2>,
    bounds: Aabb,
}

impl RenderMesh {
    pub fn new(vertices: Vec<Vec3>, triangles: Vec<u32>) -> Self {
        let bounds = Aabb::from_points(&vertices);
        Self {
            id: MeshId::next(),
            vertices,
            triangles,
            normals: Vec::new(),
            colors: Vec::new(),
            uv0: Vec::new(),
            uv1: Vec::new(),
            uv2: Vec::new(),
            bounds,
        }
    }

    /// Build a render mesh from a snapshot under a fresh identity.
    pub fn from_data(data: &MeshData) -> Self {
        let bounds = Aabb::from_points(&data.vertices);
        Self {
            id: MeshId::next(),
            vertices: data.vertices.clone(),
            triangles: data.triangles.clone(),
            normals: data.normals.clone(),
            colors: data.colors.clone(),
            uv0: data.uv0.clone(),
            uv1: data.uv1.clone(),
            uv2: data.uv2.clone(),
            bounds,
        }
    }

    pub fn id(&self) -> MeshId {
        self.id
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Replace the live vertex positions with a whole new array.
    ///
    /// Triangles and UVs are untouched; those are assumed stable unless a
    /// topology-changing operation explicitly replaced them.
    pub fn set_vertices(&mut self, vertices: &[Vec3]) {
        self.vertices.clear();
        self.vertices.extend_from_slice(vertices);
    }

    /// Overwrite every buffer from a snapshot (used by restore and by
    /// topology-changing operations like subdivision).
    pub fn replace_contents(&mut self, data: &MeshData) {
        trace!(
            vertices = data.vertex_count(),
            triangles = data.triangle_count(),
            "replace_contents"
        );
        self.vertices = data.vertices.clone();
        self.triangles = data.triangles.clone();
        self.normals = data.normals.clone();
        self.colors = data.colors.clone();
        self.uv0 = data.uv0.clone();
        self.uv1 = data.uv1.clone();
        self.uv2 = data.uv2.clone();
    }

    /// Deep-clone the buffers under a brand-new [`MeshId`].
    ///
    /// Breaks aliasing with any other entity sharing the same mesh asset.
    pub fn new_identity(&self) -> RenderMesh {
        let mut clone = self.clone();
        clone.id = MeshId::next();
        clone
    }

    /// Recompute the cached axis-aligned bounds from the current positions.
    pub fn recalculate_bounds(&mut self) {
        self.bounds = Aabb::from_points(&self.vertices);
    }

    /// Vertex positions as raw bytes for upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Vertex normals as raw bytes for upload.
    pub fn normal_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.normals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_ids_are_unique() {
        let a = RenderMesh::new(vec![Vec3::ZERO], Vec::new());
        let b = RenderMesh::new(vec![Vec3::ZERO], Vec::new());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_new_identity_breaks_aliasing() {
        let a = RenderMesh::new(vec![Vec3::ZERO, Vec3::ONE], vec![0, 1, 0]);
        let b = a.new_identity();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.vertices, b.vertices);
        assert_eq!(a.triangles, b.triangles);
    }

    #[test]
    fn test_set_vertices_keeps_topology() {
        let mut mesh = RenderMesh::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![0, 1, 2],
        );
        mesh.set_vertices(&[Vec3::ONE, Vec3::ONE, Vec3::ONE]);
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.triangles, vec![0, 1, 2]);
    }

    #[test]
    fn test_bounds_follow_recalculate() {
        let mut mesh = RenderMesh::new(vec![Vec3::ZERO, Vec3::ONE], Vec::new());
        assert_eq!(mesh.bounds().max, Vec3::ONE);

        mesh.set_vertices(&[Vec3::ZERO, Vec3::splat(4.0)]);
        mesh.recalculate_bounds();
        assert_eq!(mesh.bounds().max, Vec3::splat(4.0));
    }

    #[test]
    fn test_vertex_bytes_length() {
        let mesh = RenderMesh::new(vec![Vec3::ZERO, Vec3::ONE], Vec::new());
        // Vec3 is 3 f32s
        assert_eq!(mesh.vertex_bytes().len(), 2 * 3 * 4);
    }
}
