//! Errors for deformation operations.
//!
//! Every condition here is local and recoverable: the caller decides whether
//! to prompt, skip, or retry with adjusted parameters. A refused operation
//! never leaves the working snapshot partially mutated.

use meshdata::{MeshError, MeshId};

/// Errors surfaced by the modifier, brush, and worker.
#[derive(Debug, thiserror::Error)]
pub enum DeformError {
    #[error(transparent)]
    Mesh(#[from] MeshError),
    #[error("mesh target {0:?} already hosts another vertex-owning entity")]
    OwnershipConflict(MeshId),
    #[error("no initial snapshot captured; initialize the modifier first")]
    NoInitialData,
    #[error("projected vertex count {projected} exceeds the configured budget {budget}")]
    VertexBudgetExceeded { projected: usize, budget: usize },
    #[error("background worker is already running")]
    WorkerAlreadyRunning,
    #[error("background worker has not been started")]
    WorkerNotInitialized,
}
