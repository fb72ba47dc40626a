//! Shared configuration for Maquette
//!
//! This crate provides the single source of truth for mesh-modifier behavior:
//! the interactive vertex budget, derived-data recalculation flags, undo
//! history depth, and collider-refresh policy. A [`DeformConfig`] is injected
//! at modifier construction so behavior stays reproducible in tests instead of
//! leaking in from process-wide state.

use serde::{Deserialize, Serialize};

/// Default interactive vertex budget.
///
/// Meshes above this count are routed to the background worker instead of
/// being processed on the main update path.
pub const DEFAULT_VERTEX_BUDGET: usize = 2000;

/// Default undo history depth (strokes).
pub const DEFAULT_HISTORY_CAPACITY: usize = 8;

/// Default sleep interval between background worker passes, in milliseconds.
pub const DEFAULT_WORKER_SLEEP_MS: u64 = 10;

/// When the collider of a sculpted mesh is refreshed.
///
/// Refreshing every frame keeps picking/collision exact during a stroke but
/// is costly on dense meshes; deferring to stroke-end trades accuracy during
/// the stroke for interactive frame times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum ColliderRefreshMode {
    /// Refresh on every frame that modified vertices.
    EveryFrame = 0,
    /// Refresh once, when the stroke ends.
    #[default]
    StrokeEnd = 1,
}

/// Configuration for a mesh modifier and its processing pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeformConfig {
    /// Interactive vertex budget. Subdivision is refused and smoothing is
    /// routed to the background worker once a mesh exceeds this count.
    pub vertex_budget: usize,
    /// Recalculate normals automatically after commit/restore/bake.
    pub auto_recalc_normals: bool,
    /// Angle threshold in degrees for the alternative normal scheme.
    /// `None` selects the flat face-normal accumulation.
    pub alternative_normals: Option<f32>,
    /// Recalculate axis-aligned bounds automatically after commit/restore/bake.
    pub auto_recalc_bounds: bool,
    /// Maximum number of undo records kept for brush strokes.
    pub history_capacity: usize,
    /// Whether stroke-end snapshots are recorded at all.
    pub record_history: bool,
    /// Collider refresh policy during sculpting.
    pub collider_refresh: ColliderRefreshMode,
    /// Sleep interval between background worker passes.
    pub worker_sleep_ms: u64,
}

impl Default for DeformConfig {
    fn default() -> Self {
        Self {
            vertex_budget: DEFAULT_VERTEX_BUDGET,
            auto_recalc_normals: true,
            alternative_normals: None,
            auto_recalc_bounds: true,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            record_history: true,
            collider_refresh: ColliderRefreshMode::default(),
            worker_sleep_ms: DEFAULT_WORKER_SLEEP_MS,
        }
    }
}

impl DeformConfig {
    /// Create a config with a custom vertex budget, other fields defaulted.
    pub fn with_vertex_budget(vertex_budget: usize) -> Self {
        Self {
            vertex_budget,
            ..Default::default()
        }
    }

    /// Whether a mesh of `vertex_count` vertices fits the interactive path.
    pub fn within_budget(&self, vertex_count: usize) -> bool {
        vertex_count <= self.vertex_budget
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DeformConfig::default();
        assert_eq!(config.vertex_budget, DEFAULT_VERTEX_BUDGET);
        assert_eq!(config.history_capacity, DEFAULT_HISTORY_CAPACITY);
        assert!(config.auto_recalc_normals);
        assert!(config.auto_recalc_bounds);
        assert!(config.record_history);
        assert_eq!(config.collider_refresh, ColliderRefreshMode::StrokeEnd);
        assert!(config.alternative_normals.is_none());
    }

    #[test]
    fn test_within_budget() {
        let config = DeformConfig::with_vertex_budget(100);
        assert!(config.within_budget(100));
        assert!(!config.within_budget(101));
    }
}
