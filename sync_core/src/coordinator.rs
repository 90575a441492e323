use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use tracing::info;

use crate::config::SyncConfig;
use crate::feed::EventFeedPoller;
use crate::task_poller::TaskStatusPoller;

/// Lifecycle of the synchronization engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Stopped,
    Polling,
    Paused,
}

/// Wires the two pollers to the host lifecycle: start when a valid state
/// exists, stop on teardown, reset-and-resume on app foreground.
///
/// Each poller runs on its own thread, ticking at its configured
/// interval. A single stop channel fans out to both loops; dropping the
/// sender disconnects them, and each loop also respects its poller's own
/// running flag, so an in-flight response may still land but no new
/// request is issued after stop.
pub struct SyncCoordinator {
    feed: Arc<Mutex<EventFeedPoller>>,
    tasks: Arc<Mutex<TaskStatusPoller>>,
    feed_interval: Duration,
    task_interval: Duration,
    phase: SyncPhase,
    stop_tx: Option<Sender<()>>,
    handles: Vec<JoinHandle<()>>,
}

impl SyncCoordinator {
    pub fn new(feed: EventFeedPoller, tasks: TaskStatusPoller, config: &SyncConfig) -> Self {
        Self {
            feed: Arc::new(Mutex::new(feed)),
            tasks: Arc::new(Mutex::new(tasks)),
            feed_interval: config.feed_interval(),
            task_interval: config.task_interval(),
            phase: SyncPhase::Stopped,
            stop_tx: None,
            handles: Vec::new(),
        }
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    /// Spawn both polling loops. No-op unless currently stopped.
    pub fn start(&mut self) {
        if self.phase != SyncPhase::Stopped {
            return;
        }
        info!("sync coordinator starting");
        self.feed.lock().start();
        self.tasks.lock().start();

        let (stop_tx, stop_rx) = bounded::<()>(0);

        let feed = Arc::clone(&self.feed);
        let feed_interval = self.feed_interval;
        let feed_stop = stop_rx.clone();
        self.handles.push(
            thread::Builder::new()
                .name("feed-poller".into())
                .spawn(move || loop {
                    match feed_stop.recv_timeout(feed_interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            feed.lock().poll_once(Instant::now());
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                })
                .expect("failed to spawn feed poller thread"),
        );

        let tasks = Arc::clone(&self.tasks);
        let task_interval = self.task_interval;
        self.handles.push(
            thread::Builder::new()
                .name("task-poller".into())
                .spawn(move || loop {
                    match stop_rx.recv_timeout(task_interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            tasks.lock().poll_once();
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                })
                .expect("failed to spawn task poller thread"),
        );

        self.stop_tx = Some(stop_tx);
        self.phase = SyncPhase::Polling;
    }

    /// Tear down both polling loops. Idempotent.
    pub fn stop(&mut self) {
        if self.phase == SyncPhase::Stopped && self.handles.is_empty() {
            return;
        }
        info!("sync coordinator stopping");
        self.feed.lock().stop();
        self.tasks.lock().stop();
        // Dropping the sender disconnects both loops.
        self.stop_tx = None;
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
        self.phase = SyncPhase::Stopped;
    }

    /// App moved to the background: stop issuing requests but keep the
    /// threads parked on their intervals.
    pub fn pause_for_background(&mut self) {
        if self.phase != SyncPhase::Polling {
            return;
        }
        info!("sync paused for background");
        self.feed.lock().stop();
        self.tasks.lock().stop();
        self.phase = SyncPhase::Paused;
    }

    /// App returned to the foreground: a long background period
    /// invalidates the feed's delta assumptions (the server may have
    /// rotated its window), so the cursor and dedup window are cleared
    /// before polling resumes.
    pub fn resume_from_background(&mut self) {
        if self.phase != SyncPhase::Paused {
            return;
        }
        info!("sync resuming from background with full reset");
        {
            let mut feed = self.feed.lock();
            feed.reset();
            feed.resume();
        }
        self.tasks.lock().start();
        self.phase = SyncPhase::Polling;
    }

    /// Nudge the task poller after a user action may have queued a new
    /// timed task; it stops itself again once the active set is empty.
    pub fn kick_task_poller(&self) {
        self.tasks.lock().start();
    }

    pub fn feed_poller(&self) -> Arc<Mutex<EventFeedPoller>> {
        Arc::clone(&self.feed)
    }

    pub fn task_poller(&self) -> Arc<Mutex<TaskStatusPoller>> {
        Arc::clone(&self.tasks)
    }
}

impl Drop for SyncCoordinator {
    fn drop(&mut self) {
        self.stop();
    }
}
