use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::store::StateStore;
use crate::transport::{TaskStatusReport, TaskTransport};

/// What a single task-status poll did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskPollOutcome {
    /// Poller is stopped, or a transient failure will be retried on the
    /// next tick.
    Idle,
    /// Display-only progress was updated.
    Progress,
    /// The task completed and the server state replaced the local one.
    Reconciled,
    /// The active-task set is empty; the poller stopped itself.
    Stopped,
}

/// Polls the task-status endpoint while timed tasks are running.
///
/// The progress cell is a display-only side channel: while a task is in
/// progress only the latest [`TaskStatusReport`] is swapped, never
/// resources or clone data. Completion triggers a server-wins wholesale
/// replacement of the local state, superseding any local prediction. The
/// cell is shared out via [`Self::progress_cell`] so consumers can read
/// the latest report without tying their lifetime to the poller's.
pub struct TaskStatusPoller {
    transport: Box<dyn TaskTransport>,
    store: Arc<StateStore>,
    progress: Arc<Mutex<Option<TaskStatusReport>>>,
    running: bool,
}

impl TaskStatusPoller {
    pub fn new(transport: Box<dyn TaskTransport>, store: Arc<StateStore>) -> Self {
        Self {
            transport,
            store,
            progress: Arc::new(Mutex::new(None)),
            running: false,
        }
    }

    pub fn start(&mut self) {
        if !self.running {
            info!("task poller starting");
        }
        self.running = true;
    }

    /// Idempotent; safe to call from teardown.
    pub fn stop(&mut self) {
        if self.running {
            info!("task poller stopped");
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Shared handle to the display-only progress of the running task.
    pub fn progress_cell(&self) -> Arc<Mutex<Option<TaskStatusReport>>> {
        Arc::clone(&self.progress)
    }

    pub fn poll_once(&mut self) -> TaskPollOutcome {
        if !self.running {
            return TaskPollOutcome::Idle;
        }
        if !self.store.snapshot().has_active_tasks() {
            // Stop deterministically instead of waiting to be torn down.
            info!("no active tasks, task poller stopping itself");
            self.running = false;
            *self.progress.lock() = None;
            return TaskPollOutcome::Stopped;
        }

        let status = match self.transport.task_status() {
            Ok(status) => status,
            Err(err) => {
                warn!(error = %err, "task status fetch failed, retrying next tick");
                return TaskPollOutcome::Idle;
            }
        };

        if status.completed {
            return self.reconcile(status.task);
        }

        if status.active {
            debug!(
                task = status.task.as_ref().map(|t| t.id.as_str()).unwrap_or(""),
                progress = status.task.as_ref().map(|t| t.progress).unwrap_or(0),
                "task in progress"
            );
            *self.progress.lock() = status.task;
            return TaskPollOutcome::Progress;
        }

        *self.progress.lock() = None;
        TaskPollOutcome::Idle
    }

    /// Server-wins reconciliation: fetch the authoritative full state and
    /// replace the local snapshot wholesale, discarding any local
    /// prediction. Feed patches that already landed are harmless because
    /// patches are idempotent against the server's totals.
    fn reconcile(&mut self, completed: Option<TaskStatusReport>) -> TaskPollOutcome {
        let mut server_state = match self.transport.fetch_state() {
            Ok(state) => state,
            Err(err) => {
                warn!(error = %err, "reconciliation fetch failed, retrying next tick");
                return TaskPollOutcome::Idle;
            }
        };
        let creates_entity = completed
            .as_ref()
            .map(|task| task.kind.creates_entity())
            .unwrap_or(false);
        if creates_entity {
            // UX affordance: focus the entity the finished task created.
            server_state.selected_clone = server_state.newest_clone_id();
        }
        let stored = self.store.replace(server_state);
        *self.progress.lock() = None;
        info!(
            version = stored.version,
            "task complete, reconciled with authoritative server state"
        );
        TaskPollOutcome::Reconciled
    }
}
