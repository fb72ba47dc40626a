//! Mesh modifier state machine.
//!
//! A [`MeshModifier`] owns exactly one live snapshot triple and the render
//! mesh it authors:
//!
//! - **initial** - captured at initialization, the restore target
//! - **backup** - secondary reference, refreshed alongside working after
//!   non-destructive operations
//! - **working** - the buffer concrete modifiers mutate
//!
//! Lifecycle: Uninitialized -> Initialized -> Dirty -> Committed, looping
//! back to Dirty on the next edit. Every refusable operation checks its
//! preconditions before touching any buffer, so a refused operation leaves
//! all three snapshots and the live mesh exactly as they were.

use glam::Vec3;
use tracing::{debug, warn};

use maquette_config::DeformConfig;
use meshdata::{
    compute_normals, compute_normals_with_angle, MeshData, MeshId, RenderMesh,
};

use crate::error::DeformError;
use crate::ownership::OwnershipRegistry;
use crate::smooth::{hc_smooth, DEFAULT_BETA};
use crate::subdivide::{projected_vertex_count, subdivide};
use crate::types::{MeshProcessor, ModifierEvent, ModifierState, OwnerKind, ProcessReport};
use crate::worker::{WorkerJob, WorkerOp};

type Observer = Box<dyn FnMut(&ModifierEvent)>;

/// State machine owning the initial/backup/working snapshot triple and the
/// renderable mesh.
pub struct MeshModifier {
    config: DeformConfig,
    state: ModifierState,
    mesh: RenderMesh,
    initial: MeshData,
    backup: MeshData,
    working: MeshData,
    registry: OwnershipRegistry,
    claimed: bool,
    observers: Vec<Observer>,
}

impl std::fmt::Debug for MeshModifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeshModifier")
            .field("state", &self.state)
            .field("mesh", &self.mesh.id())
            .field("vertices", &self.working.vertex_count())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl MeshModifier {
    pub fn new(mesh: RenderMesh, config: DeformConfig, registry: OwnershipRegistry) -> Self {
        Self {
            config,
            state: ModifierState::Uninitialized,
            mesh,
            initial: MeshData::default(),
            backup: MeshData::default(),
            working: MeshData::default(),
            registry,
            claimed: false,
            observers: Vec::new(),
        }
    }

    pub fn state(&self) -> ModifierState {
        self.state
    }

    pub fn config(&self) -> &DeformConfig {
        &self.config
    }

    /// The live render mesh this modifier authors.
    pub fn mesh(&self) -> &RenderMesh {
        &self.mesh
    }

    /// Read-only view of the working snapshot.
    pub fn working(&self) -> &MeshData {
        &self.working
    }

    /// Read-only view of the initial snapshot.
    pub fn initial(&self) -> &MeshData {
        &self.initial
    }

    /// Subscribe to mutation events. Subscriptions live as long as the
    /// modifier itself.
    pub fn subscribe(&mut self, observer: impl FnMut(&ModifierEvent) + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn publish(&mut self, event: ModifierEvent) {
        debug!(?event, "modifier event");
        for observer in &mut self.observers {
            observer(&event);
        }
    }

    /// Claim vertex ownership of the target under the given owner tag and
    /// capture the snapshot triple from the current renderable mesh.
    ///
    /// Fails with [`DeformError::OwnershipConflict`] if another vertex-owning
    /// entity already claims the target, and with `EmptyMesh` if the target
    /// has no vertices; neither failure changes any state.
    pub fn initialize(&mut self, owner: OwnerKind) -> Result<(), DeformError> {
        let id = self.mesh.id();
        self.registry.claim(id, owner)?;

        let snapshot = match MeshData::capture(&self.mesh) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                // Do not hold a claim on a target we failed to initialize
                self.registry.release(id);
                return Err(err.into());
            }
        };

        self.initial = snapshot.clone();
        self.backup = snapshot.clone();
        self.working = snapshot;
        self.claimed = true;
        self.state = ModifierState::Initialized;
        debug!(?id, vertices = self.working.vertex_count(), "initialized");
        Ok(())
    }

    fn require_initialized(&self) -> Result<(), DeformError> {
        if self.initial.is_initialized() {
            Ok(())
        } else {
            Err(DeformError::NoInitialData)
        }
    }

    /// Run a concrete modifier (sculpt brush, twist, noise, ...) over the
    /// working snapshot.
    pub fn process_modifier(
        &mut self,
        processor: &mut dyn MeshProcessor,
    ) -> Result<ProcessReport, DeformError> {
        self.require_initialized()?;
        let report = processor.process(&mut self.working, &self.initial);
        if report.vertices_modified > 0 {
            self.state = ModifierState::Dirty;
        }
        Ok(report)
    }

    /// Copy the working vertices into the live render mesh and recalculate
    /// derived data per configuration.
    ///
    /// Triangles and UVs are untouched; topology-changing operations replace
    /// them explicitly.
    pub fn commit(&mut self) -> Result<(), DeformError> {
        self.require_initialized()?;
        self.mesh.set_vertices(&self.working.vertices);
        self.recalculate(false, false);
        self.state = ModifierState::Committed;
        Ok(())
    }

    /// Recompute normals and bounds on the live mesh, each gated by its
    /// configuration flag or the force override.
    pub fn recalculate(&mut self, force_normals: bool, force_bounds: bool) {
        if self.config.auto_recalc_normals || force_normals {
            self.mesh.normals = match self.config.alternative_normals {
                Some(angle) => {
                    compute_normals_with_angle(&self.mesh.vertices, &self.mesh.triangles, angle)
                }
                None => compute_normals(&self.mesh.vertices, &self.mesh.triangles),
            };
        }
        if self.config.auto_recalc_bounds || force_bounds {
            self.mesh.recalculate_bounds();
        }
    }

    /// Overwrite the live mesh from the initial snapshot and re-derive
    /// backup and working from the restored state.
    pub fn restore(&mut self) -> Result<(), DeformError> {
        self.require_initialized()?;
        self.mesh.replace_contents(&self.initial);
        self.backup = self.initial.clone();
        self.working = self.initial.clone();
        self.recalculate(false, false);
        self.state = ModifierState::Initialized;
        self.publish(ModifierEvent::Restored);
        Ok(())
    }

    /// Re-capture the snapshot triple from the current live mesh.
    ///
    /// An irreversible checkpoint: there is no restore path back to the
    /// pre-bake state.
    pub fn bake(&mut self) -> Result<(), DeformError> {
        let snapshot = MeshData::capture(&self.mesh)?;
        self.initial = snapshot.clone();
        self.backup = snapshot.clone();
        self.working = snapshot;
        self.state = ModifierState::Initialized;
        self.publish(ModifierEvent::Baked);
        Ok(())
    }

    /// Subdivide the working mesh and push the denser topology to the live
    /// mesh.
    ///
    /// The projected vertex count is checked against the configured budget
    /// before any work happens; a refusal leaves every buffer untouched.
    pub fn subdivide(&mut self, level: u32) -> Result<(), DeformError> {
        self.require_initialized()?;

        let projected = projected_vertex_count(&self.working, level);
        if projected > self.config.vertex_budget {
            warn!(
                projected,
                budget = self.config.vertex_budget,
                "subdivision refused"
            );
            return Err(DeformError::VertexBudgetExceeded {
                projected,
                budget: self.config.vertex_budget,
            });
        }

        let dense = subdivide(&self.working, level);
        self.working = dense;
        self.backup = self.working.clone();
        self.mesh.replace_contents(&self.working);
        self.recalculate(false, false);
        self.state = ModifierState::Committed;
        self.publish(ModifierEvent::Subdivided { level });
        Ok(())
    }

    /// Relax the working mesh with the HC filter and commit the result.
    ///
    /// Above the vertex budget the interactive path refuses; callers route
    /// the job through the background worker instead.
    pub fn smooth(&mut self, intensity: f32) -> Result<(), DeformError> {
        self.require_initialized()?;

        let count = self.working.vertex_count();
        if !self.config.within_budget(count) {
            warn!(count, budget = self.config.vertex_budget, "smooth refused");
            return Err(DeformError::VertexBudgetExceeded {
                projected: count,
                budget: self.config.vertex_budget,
            });
        }

        let relaxed = hc_smooth(
            &self.working.vertices,
            &self.working.triangles,
            DEFAULT_BETA,
            intensity,
        );
        self.working.vertices = relaxed;
        self.backup.vertices = self.working.vertices.clone();
        self.mesh.set_vertices(&self.working.vertices);
        self.recalculate(false, false);
        self.state = ModifierState::Committed;
        self.publish(ModifierEvent::Smoothed);
        Ok(())
    }

    /// Rebind the renderable to a deep clone under a brand-new mesh
    /// identity, breaking aliasing with any entity sharing the old asset.
    pub fn new_mesh_reference(&mut self) -> Result<MeshId, DeformError> {
        self.require_initialized()?;

        let fresh = self.mesh.new_identity();
        let id = fresh.id();
        self.registry.transfer(self.mesh.id(), id)?;
        self.mesh = fresh;
        self.publish(ModifierEvent::NewReferenceCreated { id });
        Ok(id)
    }

    /// Build a background-worker job from the current working snapshot.
    pub fn make_worker_job(&self, op: WorkerOp) -> Result<WorkerJob, DeformError> {
        self.require_initialized()?;
        Ok(WorkerJob {
            mesh: self.working.clone(),
            initial_vertices: Some(self.initial.vertices.clone()),
            op,
        })
    }

    /// Swap a finished worker buffer into the working snapshot at a safe
    /// point.
    ///
    /// Returns false when the buffer is stale (topology changed since the
    /// job was captured); a stale buffer is discarded, never partially
    /// applied.
    pub fn apply_worker_result(&mut self, vertices: Vec<Vec3>) -> Result<bool, DeformError> {
        self.require_initialized()?;
        if self.working.replace_vertices(vertices).is_err() {
            warn!("discarding stale worker buffer");
            return Ok(false);
        }
        self.state = ModifierState::Dirty;
        Ok(true)
    }
}

impl Drop for MeshModifier {
    fn drop(&mut self) {
        if self.claimed {
            self.registry.release(self.mesh.id());
        }
    }
}
