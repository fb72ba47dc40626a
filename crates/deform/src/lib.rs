//! Mesh deformation engine for Maquette.
//!
//! This crate provides interactive vertex editing over [`meshdata`] snapshots:
//! - Brush-based sculpting (Raise, Lower, Revert) with bounded undo history
//! - Midpoint subdivision with shared-edge deduplication
//! - HC-filter Laplacian smoothing with volume-preserving correction
//! - The modifier state machine owning the initial/backup/working triple
//! - A background worker for meshes above the interactive vertex budget
//!
//! # Architecture
//!
//! The modifier state machine is the only writer of its three snapshots and
//! of the live render mesh; the brush borrows a mutable view of the working
//! snapshot for one call at a time, and the worker operates on a private
//! working copy published through a staging queue.
//!
//! ## Key Components
//!
//! - **Types**: Brush status, events, and the processor hook
//! - **Subdivide**: 4:1 midpoint subdivision with budget projection
//! - **Smooth**: Deterministic HC Laplacian filter
//! - **Brush**: Per-frame stroke evaluation and undo
//! - **Modifier**: Lifecycle, commit/restore/bake, observer list
//! - **Worker**: Manual-reset-gated background processing

pub mod brush;
pub mod error;
pub mod history;
pub mod modifier;
pub mod ownership;
pub mod smooth;
pub mod subdivide;
pub mod types;
pub mod worker;

pub use brush::*;
pub use error::*;
pub use history::*;
pub use modifier::*;
pub use ownership::*;
pub use smooth::*;
pub use subdivide::*;
pub use types::*;
pub use worker::*;
