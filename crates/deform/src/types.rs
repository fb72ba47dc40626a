//! Core deformation types.

use glam::Vec3;
use meshdata::{MeshData, MeshId};
use serde::{Deserialize, Serialize};

/// State of a sculpting brush, driven by the input collaborator.
///
/// Pointer-down with modifier keys selects Raise/Lower/Revert; pointer-up
/// resets to None.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum BrushStatus {
    /// No stroke active.
    #[default]
    None = 0,
    /// Displace vertices along the brush direction.
    Raise = 1,
    /// Displace vertices against the brush direction.
    Lower = 2,
    /// Pull vertices back toward their initial positions.
    Revert = 3,
}

impl BrushStatus {
    /// Displacement sign: +1 for Raise, -1 for Lower, 0 otherwise.
    pub fn sign(&self) -> f32 {
        match self {
            BrushStatus::Raise => 1.0,
            BrushStatus::Lower => -1.0,
            _ => 0.0,
        }
    }

    /// Whether a stroke is live in this status.
    pub fn is_active(&self) -> bool {
        *self != BrushStatus::None
    }
}

/// Direction along which Raise/Lower displace affected vertices.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum DeformDirection {
    /// The surface normal at the brush hit point.
    #[default]
    HitNormal,
    /// A fixed world-space direction.
    Custom(Vec3),
}

impl DeformDirection {
    /// Resolve to a unit vector given the hit normal for this frame.
    pub fn resolve(&self, hit_normal: Vec3) -> Vec3 {
        match self {
            DeformDirection::HitNormal => hit_normal.normalize_or_zero(),
            DeformDirection::Custom(dir) => dir.normalize_or_zero(),
        }
    }
}

/// Lifecycle state of a mesh modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModifierState {
    /// No snapshots captured yet.
    #[default]
    Uninitialized,
    /// Triple populated from the renderable mesh.
    Initialized,
    /// Working snapshot mutated, not yet committed.
    Dirty,
    /// Working copied into the renderable mesh; loops back to Dirty on the
    /// next edit.
    Committed,
}

/// Kind of entity claiming vertex ownership of a mesh target.
///
/// Variants replace the source design's inheritance chain: a modifier edits
/// an existing mesh in place, a geometry generates its mesh from parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OwnerKind {
    Modifier,
    Geometry,
}

/// Observable side effect of a mutating modifier operation.
///
/// External collaborators (collider refresh, editor views) subscribe to
/// resynchronize derived state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModifierEvent {
    Restored,
    Baked,
    Subdivided { level: u32 },
    Smoothed,
    NewReferenceCreated { id: MeshId },
}

/// Report returned by a processor pass over the working snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProcessReport {
    /// Number of vertices the pass modified.
    pub vertices_modified: usize,
    /// Whether the collider should refresh now.
    pub collider_refresh: bool,
}

/// Hook for concrete modifiers (sculpt brush, twist, bend, FFD, ...).
///
/// Implementations mutate the working snapshot only; the initial snapshot is
/// read-only reference for revert-style behavior. The modifier state machine
/// invokes this through `process_modifier` and owns the state transition.
pub trait MeshProcessor {
    fn process(&mut self, working: &mut MeshData, initial: &MeshData) -> ProcessReport;
}
