//! Sculpting brush engine.
//!
//! The brush evaluates once per active frame against the working snapshot:
//! the host resolves a raycast hit `(point, normal)` and calls
//! [`SculptBrush::stroke_tick`]; vertices within the brush radius are
//! displaced along the resolved direction (Raise/Lower) or pulled back
//! toward their initial positions (Revert). Height and distance limits are
//! independent guards applied after displacement, never before.
//!
//! Stroke-end snapshots feed the bounded undo ring; collider refresh is
//! reported per-frame or at stroke-end depending on configuration.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use maquette_config::{ColliderRefreshMode, DeformConfig};
use meshdata::MeshData;

use crate::history::{HistoryRecord, HistoryRing};
use crate::types::{BrushStatus, DeformDirection, MeshProcessor, ProcessReport};

/// Falloff curve for brush influence.
///
/// The reference behavior displaces every vertex inside the radius at full
/// strength, so Constant is the default; the other curves taper toward the
/// rim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum FalloffCurve {
    /// Full strength within the radius.
    #[default]
    Constant = 0,
    /// strength = 1 - distance/radius
    Linear = 1,
    /// Hermite smoothstep.
    Smooth = 2,
    /// Quadratic decay.
    Sharp = 3,
}

impl FalloffCurve {
    /// Falloff at a normalized distance (0.0 = center, 1.0 = rim).
    pub fn evaluate(&self, normalized_distance: f32) -> f32 {
        let d = normalized_distance.clamp(0.0, 1.0);
        match self {
            FalloffCurve::Constant => 1.0,
            FalloffCurve::Linear => 1.0 - d,
            FalloffCurve::Smooth => {
                let t = 1.0 - d;
                t * t * (3.0 - 2.0 * t)
            }
            FalloffCurve::Sharp => {
                let t = 1.0 - d;
                t * t
            }
        }
    }
}

/// Vertical clamp applied after displacement (height limitation).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeightLimit {
    pub min: f32,
    pub max: f32,
}

/// Brush parameters, host-configurable per stroke.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrushSettings {
    /// Brush radius in local space.
    pub size: f32,
    /// Displacement per second at full falloff.
    pub intensity: f32,
    /// Displacement direction for Raise/Lower.
    pub direction: DeformDirection,
    /// Optional vertex-Y clamp.
    pub height_limit: Option<HeightLimit>,
    /// Optional cap on how far a vertex may stray from its initial position.
    pub distance_limit: Option<f32>,
    pub falloff: FalloffCurve,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            size: 1.0,
            intensity: 0.5,
            direction: DeformDirection::HitNormal,
            height_limit: None,
            distance_limit: None,
            falloff: FalloffCurve::Constant,
        }
    }
}

/// Result of ending a stroke.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StrokeEndResult {
    /// Whether a history record was pushed.
    pub history_recorded: bool,
    /// Whether the collider should refresh now.
    pub collider_refresh: bool,
}

/// Displace vertices for one brush frame.
///
/// Shared by the interactive path and the background worker so both produce
/// identical results for identical inputs. `initial` is required for Revert;
/// without it Revert is a no-op. Returns the number of modified vertices.
pub fn apply_brush_frame(
    vertices: &mut [Vec3],
    initial: Option<&[Vec3]>,
    settings: &BrushSettings,
    status: BrushStatus,
    hit_point: Vec3,
    hit_normal: Vec3,
    dt: f32,
) -> usize {
    if !status.is_active() || settings.size <= 0.0 {
        return 0;
    }

    let direction = settings.direction.resolve(hit_normal);
    let step = settings.intensity * dt;
    let mut modified = 0;

    for (i, vertex) in vertices.iter_mut().enumerate() {
        let distance = vertex.distance(hit_point);
        if distance > settings.size {
            continue;
        }

        let falloff = settings.falloff.evaluate(distance / settings.size);

        match status {
            BrushStatus::Raise | BrushStatus::Lower => {
                *vertex += direction * (step * status.sign() * falloff);
            }
            BrushStatus::Revert => {
                // Smoothed pull-back toward the initial position, not a
                // hard reset.
                let Some(initial) = initial else { continue };
                *vertex = vertex.lerp(initial[i], (step * falloff).clamp(0.0, 1.0));
            }
            BrushStatus::None => unreachable!(),
        }

        if let Some(limit) = settings.height_limit {
            vertex.y = vertex.y.clamp(limit.min, limit.max);
        }
        if let (Some(limit), Some(initial)) = (settings.distance_limit, initial) {
            let offset = *vertex - initial[i];
            if offset.length() > limit {
                *vertex = initial[i] + offset.normalize_or_zero() * limit;
            }
        }

        modified += 1;
    }

    modified
}

/// Per-frame sculpting brush with bounded undo history.
#[derive(Debug)]
pub struct SculptBrush {
    pub settings: BrushSettings,
    status: BrushStatus,
    history: HistoryRing,
    record_history: bool,
    collider_refresh: ColliderRefreshMode,
    stroke_active: bool,
    /// Pre-stroke vertices, captured at the first tick of a stroke and
    /// committed to the ring at stroke-end. Undo lands on the state the
    /// stroke started from.
    pending_record: Option<Vec<Vec3>>,
}

impl SculptBrush {
    pub fn new(settings: BrushSettings, config: &DeformConfig) -> Self {
        Self {
            settings,
            status: BrushStatus::None,
            history: HistoryRing::new(config.history_capacity),
            record_history: config.record_history,
            collider_refresh: config.collider_refresh,
            stroke_active: false,
            pending_record: None,
        }
    }

    pub fn status(&self) -> BrushStatus {
        self.status
    }

    /// Set by the input collaborator on pointer-down/up.
    pub fn set_status(&mut self, status: BrushStatus) {
        trace!(?status, "brush status");
        self.status = status;
    }

    pub fn is_stroke_active(&self) -> bool {
        self.stroke_active
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Evaluate one frame of the active stroke against the working snapshot.
    ///
    /// Borrows the working buffer for this call only; the brush retains
    /// nothing past it.
    pub fn stroke_tick(
        &mut self,
        working: &mut MeshData,
        initial: &MeshData,
        hit_point: Vec3,
        hit_normal: Vec3,
        dt: f32,
    ) -> ProcessReport {
        if !self.status.is_active() {
            return ProcessReport::default();
        }

        if self.record_history && self.pending_record.is_none() {
            self.pending_record = Some(working.vertices.clone());
        }

        let modified = apply_brush_frame(
            &mut working.vertices,
            Some(&initial.vertices),
            &self.settings,
            self.status,
            hit_point,
            hit_normal,
            dt,
        );

        if modified > 0 {
            self.stroke_active = true;
        }

        ProcessReport {
            vertices_modified: modified,
            collider_refresh: modified > 0
                && self.collider_refresh == ColliderRefreshMode::EveryFrame,
        }
    }

    /// Finish the stroke on pointer-up.
    ///
    /// Pushes the exact pre-stroke vertex copy into the undo ring when
    /// recording is enabled, evicting the oldest record on overflow.
    pub fn stroke_end(&mut self) -> StrokeEndResult {
        let was_active = self.stroke_active;
        self.stroke_active = false;
        self.status = BrushStatus::None;
        let pending = self.pending_record.take();

        if !was_active {
            return StrokeEndResult::default();
        }

        let recorded = if let Some(vertices) = pending {
            self.history.push(HistoryRecord { vertices });
            true
        } else {
            false
        };

        debug!(
            recorded,
            history_len = self.history.len(),
            "stroke ended"
        );

        StrokeEndResult {
            history_recorded: recorded,
            collider_refresh: self.collider_refresh == ColliderRefreshMode::StrokeEnd,
        }
    }

    /// Restore the working vertices from the most recent history record.
    ///
    /// Returns false (and logs) when there is nothing to undo.
    pub fn undo(&mut self, working: &mut MeshData) -> bool {
        let Some(record) = self.history.pop() else {
            debug!("undo: no history records");
            return false;
        };
        if working.replace_vertices(record.vertices).is_err() {
            // Topology changed since the record was taken; discard it
            debug!("undo: stale record discarded");
            return false;
        }
        true
    }
}

/// One frame of brush input, adapted to the modifier's processor hook.
///
/// The modifier owns the state transition; the brush borrows the working
/// snapshot only for the duration of the call.
pub struct BrushTick<'a> {
    pub brush: &'a mut SculptBrush,
    pub hit_point: Vec3,
    pub hit_normal: Vec3,
    pub dt: f32,
}

impl MeshProcessor for BrushTick<'_> {
    fn process(&mut self, working: &mut MeshData, initial: &MeshData) -> ProcessReport {
        self.brush
            .stroke_tick(working, initial, self.hit_point, self.hit_normal, self.dt)
    }
}
