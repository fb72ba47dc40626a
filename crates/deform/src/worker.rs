//! Background worker for over-budget meshes.
//!
//! Meshes above the interactive vertex budget run the same smoothing/brush
//! math as the main path, but on a dedicated thread. The contract:
//!
//! - The worker owns a private working copy and never touches the live
//!   render mesh; results are handed off by full-buffer swap through a
//!   staging queue, so the main path observes whole buffers or nothing.
//! - The loop blocks on a manual-reset signal between passes and sleeps a
//!   configured interval to bound CPU usage.
//! - Stopping is safe at any time: a cooperative cancellation flag is
//!   checked at pass boundaries, never mid-buffer-write, and an in-flight
//!   result is discarded rather than partially applied.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use glam::Vec3;
use parking_lot::{Condvar, Mutex};
use tracing::{debug, trace};

use meshdata::MeshData;

use crate::brush::{apply_brush_frame, BrushSettings};
use crate::error::DeformError;
use crate::smooth::hc_smooth;
use crate::types::BrushStatus;

/// Manual-reset signal: waiters block while reset, pass while set.
#[derive(Debug, Default)]
struct ManualResetSignal {
    flag: Mutex<bool>,
    cond: Condvar,
}

impl ManualResetSignal {
    fn set(&self) {
        *self.flag.lock() = true;
        self.cond.notify_all();
    }

    fn reset(&self) {
        *self.flag.lock() = false;
    }

    fn wait(&self) {
        let mut flag = self.flag.lock();
        while !*flag {
            self.cond.wait(&mut flag);
        }
    }
}

/// Operation descriptor for one worker pass.
#[derive(Debug, Clone)]
pub enum WorkerOp {
    /// HC-filter relaxation of the captured mesh.
    Smooth { beta: f32, intensity: f32 },
    /// One brush frame, identical math to the interactive path.
    BrushFrame {
        settings: BrushSettings,
        status: BrushStatus,
        hit_point: Vec3,
        hit_normal: Vec3,
        dt: f32,
    },
}

/// Unit of background work: a captured working copy plus an operation
/// descriptor.
#[derive(Debug, Clone)]
pub struct WorkerJob {
    pub mesh: MeshData,
    /// Initial positions, needed for Revert strokes and distance limits.
    pub initial_vertices: Option<Vec<Vec3>>,
    pub op: WorkerOp,
}

#[derive(Debug, Default)]
struct Shared {
    signal: ManualResetSignal,
    pending: Mutex<Option<WorkerJob>>,
    staged: Mutex<VecDeque<Vec<Vec3>>>,
    cancel: AtomicBool,
}

/// Dedicated processing thread for one modifier instance.
#[derive(Debug, Default)]
pub struct DeformWorker {
    shared: Arc<Shared>,
    handle: Option<thread::JoinHandle<()>>,
}

impl DeformWorker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn the worker thread.
    pub fn start(&mut self, sleep_interval_ms: u64) -> Result<(), DeformError> {
        if self.is_running() {
            return Err(DeformError::WorkerAlreadyRunning);
        }

        self.shared.cancel.store(false, Ordering::SeqCst);
        self.shared.signal.reset();

        let shared = self.shared.clone();
        let sleep = Duration::from_millis(sleep_interval_ms);
        self.handle = Some(thread::spawn(move || worker_loop(&shared, sleep)));
        debug!(sleep_interval_ms, "worker started");
        Ok(())
    }

    /// Stop the worker. Safe to call at any time, including mid-pass;
    /// pending and staged buffers are discarded whole.
    pub fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };

        self.shared.cancel.store(true, Ordering::SeqCst);
        self.shared.signal.set();
        let _ = handle.join();

        self.shared.signal.reset();
        self.shared.pending.lock().take();
        self.shared.staged.lock().clear();
        debug!("worker stopped");
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Hand a job to the worker and release the signal.
    pub fn submit(&self, job: WorkerJob) -> Result<(), DeformError> {
        if !self.is_running() {
            return Err(DeformError::WorkerNotInitialized);
        }
        *self.shared.pending.lock() = Some(job);
        self.shared.signal.set();
        Ok(())
    }

    /// Poll for a finished buffer. Never blocks; a buffer is only visible
    /// here once fully written, and is consumed exactly once, FIFO.
    pub fn try_take_result(&self) -> Option<Vec<Vec3>> {
        self.shared.staged.lock().pop_front()
    }
}

impl Drop for DeformWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn worker_loop(shared: &Shared, sleep: Duration) {
    loop {
        shared.signal.wait();
        if shared.cancel.load(Ordering::SeqCst) {
            break;
        }

        // Reset before taking the job: a submit racing in after the reset
        // leaves the signal set, so the next iteration picks it up.
        shared.signal.reset();
        let job = shared.pending.lock().take();

        if let Some(job) = job {
            trace!(vertices = job.mesh.vertex_count(), "worker pass");
            let result = run_job(&job);

            // Pass boundary: exit without publishing a half-finished pass
            if shared.cancel.load(Ordering::SeqCst) {
                break;
            }
            shared.staged.lock().push_back(result);
        }

        thread::sleep(sleep);
    }
    debug!("worker loop exited");
}

fn run_job(job: &WorkerJob) -> Vec<Vec3> {
    match &job.op {
        WorkerOp::Smooth { beta, intensity } => {
            hc_smooth(&job.mesh.vertices, &job.mesh.triangles, *beta, *intensity)
        }
        WorkerOp::BrushFrame {
            settings,
            status,
            hit_point,
            hit_normal,
            dt,
        } => {
            let mut vertices = job.mesh.vertices.clone();
            apply_brush_frame(
                &mut vertices,
                job.initial_vertices.as_deref(),
                settings,
                *status,
                *hit_point,
                *hit_normal,
                *dt,
            );
            vertices
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smooth::DEFAULT_BETA;

    fn pyramid_mesh() -> MeshData {
        MeshData {
            vertices: vec![
                Vec3::new(-1.0, 0.0, -1.0),
                Vec3::new(1.0, 0.0, -1.0),
                Vec3::new(1.0, 0.0, 1.0),
                Vec3::new(-1.0, 0.0, 1.0),
                Vec3::new(0.0, 1.5, 0.0),
            ],
            triangles: vec![0, 1, 4, 1, 2, 4, 2, 3, 4, 3, 0, 4, 0, 2, 1, 0, 3, 2],
            ..Default::default()
        }
    }

    fn poll_result(worker: &DeformWorker) -> Vec<Vec3> {
        for _ in 0..500 {
            if let Some(result) = worker.try_take_result() {
                return result;
            }
            thread::sleep(Duration::from_millis(2));
        }
        panic!("worker produced no result within the polling window");
    }

    #[test]
    fn test_start_stop_lifecycle() {
        let mut worker = DeformWorker::new();
        assert!(!worker.is_running());

        worker.start(1).unwrap();
        assert!(worker.is_running());
        assert!(matches!(
            worker.start(1),
            Err(DeformError::WorkerAlreadyRunning)
        ));

        worker.stop();
        assert!(!worker.is_running());
        // Stop is idempotent
        worker.stop();

        // Restartable after a stop
        worker.start(1).unwrap();
        assert!(worker.is_running());
    }

    #[test]
    fn test_submit_requires_running_worker() {
        let worker = DeformWorker::new();
        let job = WorkerJob {
            mesh: pyramid_mesh(),
            initial_vertices: None,
            op: WorkerOp::Smooth {
                beta: DEFAULT_BETA,
                intensity: 0.5,
            },
        };
        assert!(matches!(
            worker.submit(job),
            Err(DeformError::WorkerNotInitialized)
        ));
    }

    #[test]
    fn test_smooth_job_matches_main_path() {
        let mesh = pyramid_mesh();
        let expected = hc_smooth(&mesh.vertices, &mesh.triangles, DEFAULT_BETA, 0.8);

        let mut worker = DeformWorker::new();
        worker.start(1).unwrap();
        worker
            .submit(WorkerJob {
                mesh: mesh.clone(),
                initial_vertices: None,
                op: WorkerOp::Smooth {
                    beta: DEFAULT_BETA,
                    intensity: 0.8,
                },
            })
            .unwrap();

        let result = poll_result(&worker);
        // Whole buffer, identical to the interactive computation
        assert_eq!(result, expected);
        worker.stop();
    }

    #[test]
    fn test_brush_job_matches_main_path() {
        let mesh = pyramid_mesh();
        let settings = BrushSettings::default();

        let mut expected = mesh.vertices.clone();
        apply_brush_frame(
            &mut expected,
            None,
            &settings,
            BrushStatus::Raise,
            Vec3::new(0.0, 1.5, 0.0),
            Vec3::Y,
            0.1,
        );

        let mut worker = DeformWorker::new();
        worker.start(1).unwrap();
        worker
            .submit(WorkerJob {
                mesh,
                initial_vertices: None,
                op: WorkerOp::BrushFrame {
                    settings,
                    status: BrushStatus::Raise,
                    hit_point: Vec3::new(0.0, 1.5, 0.0),
                    hit_normal: Vec3::Y,
                    dt: 0.1,
                },
            })
            .unwrap();

        let result = poll_result(&worker);
        assert_eq!(result, expected);
        worker.stop();
    }

    #[test]
    fn test_result_is_consumed_exactly_once() {
        let mut worker = DeformWorker::new();
        worker.start(1).unwrap();
        worker
            .submit(WorkerJob {
                mesh: pyramid_mesh(),
                initial_vertices: None,
                op: WorkerOp::Smooth {
                    beta: DEFAULT_BETA,
                    intensity: 0.5,
                },
            })
            .unwrap();

        let _ = poll_result(&worker);
        assert!(worker.try_take_result().is_none());
        worker.stop();
    }

    #[test]
    fn test_stop_discards_staged_buffers() {
        let mut worker = DeformWorker::new();
        worker.start(1).unwrap();
        worker
            .submit(WorkerJob {
                mesh: pyramid_mesh(),
                initial_vertices: None,
                op: WorkerOp::Smooth {
                    beta: DEFAULT_BETA,
                    intensity: 0.5,
                },
            })
            .unwrap();

        // Wait until the buffer is staged, then stop without consuming it
        for _ in 0..500 {
            if !worker.shared.staged.lock().is_empty() {
                break;
            }
            thread::sleep(Duration::from_millis(2));
        }
        worker.stop();

        // Main path observes nothing new, never a partial buffer
        assert!(worker.try_take_result().is_none());
    }

    #[test]
    fn test_sequential_jobs_are_fifo() {
        let mesh = pyramid_mesh();
        let mut worker = DeformWorker::new();
        worker.start(1).unwrap();

        for intensity in [0.25, 0.75] {
            worker
                .submit(WorkerJob {
                    mesh: mesh.clone(),
                    initial_vertices: None,
                    op: WorkerOp::Smooth {
                        beta: DEFAULT_BETA,
                        intensity,
                    },
                })
                .unwrap();
            // Let each pass finish before queueing the next
            let result = poll_result(&worker);
            let expected = hc_smooth(&mesh.vertices, &mesh.triangles, DEFAULT_BETA, intensity);
            assert_eq!(result, expected);
        }
        worker.stop();
    }
}
