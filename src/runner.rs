//! Runs a selection of tasks on a background worker and streams progress
//! back over a channel.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use crate::categories::{Catalog, Selection, Task};
use crate::cleaner::Cleaner;
use crate::error::{CleanError, EngineError, Result};
use crate::wipe::Freed;

/// Messages sent from the worker to whoever started the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanEvent {
    /// A task is about to run. `step` counts from 1.
    Stage {
        name: String,
        step: usize,
        total: usize,
    },
    /// Running total after a task finished.
    Progress { freed: u64 },
    /// The run is over. Sent exactly once.
    Done { freed: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Running,
    Done,
}

/// Run tasks in order on the calling thread.
///
/// Emits one `Stage` and one `Progress` per task, then a single `Done`.
/// A task that panics contributes nothing and the run carries on.
pub fn run_tasks(tasks: &[Task], mut emit: impl FnMut(CleanEvent)) -> Freed {
    let total = tasks.len();
    let mut freed = Freed::NONE;

    for (i, task) in tasks.iter().enumerate() {
        emit(CleanEvent::Stage {
            name: task.name().to_string(),
            step: i + 1,
            total,
        });

        let result = execute_guarded(task.as_ref());
        debug!(
            task = task.name(),
            bytes = result.bytes,
            suppressed = result.suppressed,
            "task finished"
        );
        freed += result;
        emit(CleanEvent::Progress { freed: freed.bytes });
    }

    info!(
        freed = freed.bytes,
        suppressed = freed.suppressed,
        tasks = total,
        "cleanup run complete"
    );
    emit(CleanEvent::Done { freed: freed.bytes });
    freed
}

fn execute_guarded(task: &dyn Cleaner) -> Freed {
    match panic::catch_unwind(AssertUnwindSafe(|| task.execute())) {
        Ok(freed) => freed,
        Err(_) => Freed::suppressed(&CleanError::TaskPanicked(task.name().to_string())),
    }
}

/// Owns the catalog and allows at most one run at a time.
#[derive(Debug)]
pub struct Orchestrator {
    catalog: Catalog,
    phase: Arc<Mutex<RunPhase>>,
}

impl Orchestrator {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            phase: Arc::new(Mutex::new(RunPhase::Idle)),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn phase(&self) -> RunPhase {
        *lock(&self.phase)
    }

    /// Start a run in the background.
    ///
    /// Fails with [`EngineError::AlreadyRunning`] while a previous run has
    /// not yet delivered its `Done` event.
    pub fn start(&self, selection: Selection) -> Result<RunHandle> {
        {
            let mut phase = lock(&self.phase);
            if *phase == RunPhase::Running {
                warn!("cleanup requested while a run is in progress");
                return Err(EngineError::AlreadyRunning);
            }
            *phase = RunPhase::Running;
        }

        let (tx, rx) = mpsc::channel::<CleanEvent>();
        let phase = Arc::clone(&self.phase);
        let tasks = selection.into_tasks();
        debug!(tasks = tasks.len(), "starting cleanup worker");

        let spawned = thread::Builder::new()
            .name("quickclean-worker".to_string())
            .spawn(move || {
                let _guard = PhaseGuard(Arc::clone(&phase));
                run_tasks(&tasks, |event| {
                    if matches!(event, CleanEvent::Done { .. }) {
                        *lock(&phase) = RunPhase::Done;
                    }
                    // The receiver may have been dropped; the run still finishes.
                    let _ = tx.send(event);
                })
            });

        match spawned {
            Ok(worker) => Ok(RunHandle { events: rx, worker }),
            Err(e) => {
                *lock(&self.phase) = RunPhase::Idle;
                Err(EngineError::Spawn(e))
            }
        }
    }
}

/// Marks the run finished even if the worker unwinds.
struct PhaseGuard(Arc<Mutex<RunPhase>>);

impl Drop for PhaseGuard {
    fn drop(&mut self) {
        let mut phase = lock(&self.0);
        if *phase == RunPhase::Running {
            *phase = RunPhase::Done;
        }
    }
}

fn lock(phase: &Mutex<RunPhase>) -> MutexGuard<'_, RunPhase> {
    phase.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The caller's end of a run.
#[derive(Debug)]
pub struct RunHandle {
    events: Receiver<CleanEvent>,
    worker: JoinHandle<Freed>,
}

impl RunHandle {
    /// Blocking iterator over events; ends after `Done`.
    pub fn events(&self) -> mpsc::Iter<'_, CleanEvent> {
        self.events.iter()
    }

    /// Next event without blocking, if one is queued.
    pub fn try_event(&self) -> Option<CleanEvent> {
        self.events.try_recv().ok()
    }

    /// Wait for the worker and return the run's totals.
    pub fn wait(self) -> Freed {
        self.worker.join().unwrap_or(Freed::NONE)
    }
}
