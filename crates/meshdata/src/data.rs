//! Mesh-data snapshot.
//!
//! A [`MeshData`] is the unit of copy, restore, and diff in the deformation
//! system: a deep, value-semantic bundle of vertex/triangle/normal/color/UV
//! arrays. The modifier state machine keeps three of these (initial, backup,
//! working) that must diverge independently, so snapshots never alias the
//! live render mesh or each other.

use glam::{Vec2, Vec3};

use crate::error::MeshError;
use crate::render::RenderMesh;

/// A deep snapshot of a mesh's vertex buffers.
///
/// All per-vertex arrays are either empty or share the vertex count;
/// `triangles` holds indices with stride 3. A snapshot is *initialized* iff
/// its vertex array is non-empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vec3>,
    pub triangles: Vec<u32>,
    pub normals: Vec<Vec3>,
    pub colors: Vec<[f32; 4]>,
    pub uv0: Vec<Vec2>,
    pub uv1: Vec<Vec2>,
    pub uv2: Vec<Vec2>,
}

impl MeshData {
    /// Capture a snapshot from the live render mesh.
    ///
    /// Fails with [`MeshError::EmptyMesh`] if the source has no vertices;
    /// callers must not proceed to subdivide or smooth an empty snapshot.
    pub fn capture(source: &RenderMesh) -> Result<Self, MeshError> {
        if source.vertices.is_empty() {
            return Err(MeshError::EmptyMesh);
        }

        Ok(Self {
            vertices: source.vertices.clone(),
            triangles: source.triangles.clone(),
            normals: source.normals.clone(),
            colors: source.colors.clone(),
            uv0: source.uv0.clone(),
            uv1: source.uv1.clone(),
            uv2: source.uv2.clone(),
        })
    }

    /// Whether this snapshot holds any vertex data.
    pub fn is_initialized(&self) -> bool {
        !self.vertices.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    /// Check the array-length and index invariants.
    pub fn validate(&self) -> Result<(), MeshError> {
        let n = self.vertices.len();
        if n == 0 {
            return Err(MeshError::EmptyMesh);
        }

        for (name, len) in [
            ("normals", self.normals.len()),
            ("colors", self.colors.len()),
            ("uv0", self.uv0.len()),
            ("uv1", self.uv1.len()),
            ("uv2", self.uv2.len()),
        ] {
            if len != 0 && len != n {
                return Err(MeshError::InvalidTopology(format!(
                    "{name} length {len} does not match vertex count {n}"
                )));
            }
        }

        if self.triangles.len() % 3 != 0 {
            return Err(MeshError::InvalidTopology(
                "index count not divisible by 3".to_string(),
            ));
        }
        if let Some(&bad) = self.triangles.iter().find(|&&i| i as usize >= n) {
            return Err(MeshError::InvalidTopology(format!(
                "triangle index {bad} out of range for {n} vertices"
            )));
        }

        Ok(())
    }

    /// Replace the vertex positions with a whole new array.
    ///
    /// Partial writes are not exposed; a length mismatch is refused so the
    /// shared-length invariant can never be broken by a stale buffer.
    pub fn replace_vertices(&mut self, vertices: Vec<Vec3>) -> Result<(), MeshError> {
        if vertices.len() != self.vertices.len() {
            return Err(MeshError::InvalidTopology(format!(
                "replacement vertex array length {} does not match {}",
                vertices.len(),
                self.vertices.len()
            )));
        }
        self.vertices = vertices;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> MeshData {
        MeshData {
            vertices: vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            triangles: vec![0, 1, 2, 0, 2, 3],
            normals: vec![Vec3::Z; 4],
            ..Default::default()
        }
    }

    #[test]
    fn test_capture_refuses_empty_mesh() {
        let empty = RenderMesh::new(Vec::new(), Vec::new());
        assert!(matches!(
            MeshData::capture(&empty),
            Err(MeshError::EmptyMesh)
        ));
    }

    #[test]
    fn test_capture_is_deep_copy() {
        let mut mesh = RenderMesh::new(quad().vertices, quad().triangles);
        let snapshot = MeshData::capture(&mesh).unwrap();

        mesh.set_vertices(&[Vec3::splat(9.0); 4]);
        // Snapshot must not follow the live mesh
        assert_eq!(snapshot.vertices[0], Vec3::ZERO);
    }

    #[test]
    fn test_validate_catches_length_mismatch() {
        let mut mesh = quad();
        mesh.normals.pop();
        assert!(matches!(
            mesh.validate(),
            Err(MeshError::InvalidTopology(_))
        ));
    }

    #[test]
    fn test_validate_catches_out_of_range_index() {
        let mut mesh = quad();
        mesh.triangles[0] = 99;
        assert!(mesh.validate().is_err());
    }

    #[test]
    fn test_replace_vertices_refuses_length_mismatch() {
        let mut mesh = quad();
        assert!(mesh.replace_vertices(vec![Vec3::ZERO; 3]).is_err());
        assert!(mesh.replace_vertices(vec![Vec3::ONE; 4]).is_ok());
        assert_eq!(mesh.vertices[2], Vec3::ONE);
    }

    #[test]
    fn test_is_initialized() {
        assert!(!MeshData::default().is_initialized());
        assert!(quad().is_initialized());
    }
}
