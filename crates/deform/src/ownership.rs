//! Mesh-target ownership registry.
//!
//! At most one vertex-owning entity may edit a given mesh target. The
//! registry maps [`MeshId`] to an [`OwnerKind`] tag and is queried and
//! updated atomically by modifier initialization and disposal. It replaces
//! the source design's reflection-based component scanning with an explicit
//! lookup.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use meshdata::MeshId;

use crate::error::DeformError;
use crate::types::OwnerKind;

/// Shared registry of vertex-owning entities keyed by mesh-target identity.
///
/// Cloning shares the underlying map; every modifier in a scene holds a
/// clone of the same registry.
#[derive(Debug, Default, Clone)]
pub struct OwnershipRegistry {
    inner: Arc<Mutex<HashMap<MeshId, OwnerKind>>>,
}

impl OwnershipRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically claim a mesh target.
    ///
    /// Fails with [`DeformError::OwnershipConflict`] if another entity holds
    /// the target; the existing owner is untouched.
    pub fn claim(&self, id: MeshId, kind: OwnerKind) -> Result<(), DeformError> {
        let mut map = self.inner.lock();
        if map.contains_key(&id) {
            return Err(DeformError::OwnershipConflict(id));
        }
        map.insert(id, kind);
        debug!(?id, ?kind, "ownership claimed");
        Ok(())
    }

    /// Release a claim. Idempotent: releasing an unclaimed id is a no-op.
    pub fn release(&self, id: MeshId) {
        if self.inner.lock().remove(&id).is_some() {
            debug!(?id, "ownership released");
        }
    }

    /// Move a claim from one mesh identity to another in one step.
    ///
    /// Used by `new_mesh_reference`: the old asset is freed for other
    /// entities while the fresh clone stays owned.
    pub fn transfer(&self, from: MeshId, to: MeshId) -> Result<(), DeformError> {
        let mut map = self.inner.lock();
        if map.contains_key(&to) {
            return Err(DeformError::OwnershipConflict(to));
        }
        let Some(kind) = map.remove(&from) else {
            return Err(DeformError::NoInitialData);
        };
        map.insert(to, kind);
        Ok(())
    }

    /// The current owner tag of a target, if any.
    pub fn owner_of(&self, id: MeshId) -> Option<OwnerKind> {
        self.inner.lock().get(&id).copied()
    }

    pub fn is_owned(&self, id: MeshId) -> bool {
        self.inner.lock().contains_key(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_and_conflict() {
        let registry = OwnershipRegistry::new();
        let id = MeshId::next();

        registry.claim(id, OwnerKind::Modifier).unwrap();
        let err = registry.claim(id, OwnerKind::Geometry).unwrap_err();
        assert!(matches!(err, DeformError::OwnershipConflict(conflict) if conflict == id));

        // The existing owner is untouched by the failed claim
        assert_eq!(registry.owner_of(id), Some(OwnerKind::Modifier));
    }

    #[test]
    fn test_release_is_idempotent() {
        let registry = OwnershipRegistry::new();
        let id = MeshId::next();

        registry.claim(id, OwnerKind::Modifier).unwrap();
        registry.release(id);
        registry.release(id);
        assert!(!registry.is_owned(id));

        // Target is claimable again after release
        registry.claim(id, OwnerKind::Geometry).unwrap();
    }

    #[test]
    fn test_transfer_moves_claim() {
        let registry = OwnershipRegistry::new();
        let from = MeshId::next();
        let to = MeshId::next();

        registry.claim(from, OwnerKind::Modifier).unwrap();
        registry.transfer(from, to).unwrap();

        assert!(!registry.is_owned(from));
        assert_eq!(registry.owner_of(to), Some(OwnerKind::Modifier));
    }

    #[test]
    fn test_clones_share_state() {
        let registry = OwnershipRegistry::new();
        let clone = registry.clone();
        let id = MeshId::next();

        registry.claim(id, OwnerKind::Modifier).unwrap();
        assert!(clone.is_owned(id));
    }
}
