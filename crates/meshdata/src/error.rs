//! Errors for mesh-data capture and validation.

/// Errors that can occur when capturing or validating mesh data.
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    #[error("mesh has no vertex data")]
    EmptyMesh,
    #[error("invalid mesh topology: {0}")]
    InvalidTopology(String),
}
