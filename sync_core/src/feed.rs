use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::SyncConfig;
use crate::patcher::{feed_log_line, EventPatcher, PatchOutcome};
use crate::store::StateStore;
use crate::transport::{FeedFetch, FeedTransport};

/// Watermark into the event feed: the highest timestamp consumed plus the
/// transport's cache validator token. Process-local; cleared on explicit
/// reconnect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncCursor {
    pub last_timestamp: Option<u64>,
    pub validator: Option<String>,
}

impl SyncCursor {
    /// Advance the watermark, never moving it backwards.
    pub fn advance(&mut self, timestamp: u64) {
        self.last_timestamp = Some(match self.last_timestamp {
            Some(current) => current.max(timestamp),
            None => timestamp,
        });
    }

    pub fn reset(&mut self) {
        self.last_timestamp = None;
        self.validator = None;
    }
}

/// What a single feed poll did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedPollOutcome {
    /// Poller is stopped or nothing new arrived.
    Idle,
    /// Poller is cooling down; no request was issued.
    Paused,
    /// This many events were applied to the store.
    Applied(usize),
}

/// Polls the event feed and patches each event into the state store in
/// arrival order.
///
/// Error policy: a missing feed endpoint (404) pauses the poller for a
/// long cooldown and resumes silently; any other transport failure pauses
/// for a short cooldown. Neither surfaces to the user.
pub struct EventFeedPoller {
    transport: Box<dyn FeedTransport>,
    store: Arc<StateStore>,
    patcher: EventPatcher,
    cursor: SyncCursor,
    running: bool,
    paused_until: Option<Instant>,
    feed_missing_cooldown: Duration,
    transient_cooldown: Duration,
}

impl EventFeedPoller {
    pub fn new(transport: Box<dyn FeedTransport>, store: Arc<StateStore>, config: &SyncConfig) -> Self {
        Self {
            transport,
            store,
            patcher: EventPatcher::new(config.dedup_capacity, config.dedup_trim_to),
            cursor: SyncCursor::default(),
            running: false,
            paused_until: None,
            feed_missing_cooldown: config.feed_missing_cooldown(),
            transient_cooldown: config.transient_cooldown(),
        }
    }

    pub fn start(&mut self) {
        if !self.running {
            info!("feed poller starting");
        }
        self.running = true;
    }

    /// Idempotent; safe to call from teardown. An in-flight response may
    /// still be applied, but no new request is issued.
    pub fn stop(&mut self) {
        if self.running {
            info!("feed poller stopped");
        }
        self.running = false;
    }

    /// Clear the pause deadline and keep polling.
    pub fn resume(&mut self) {
        self.paused_until = None;
        self.running = true;
    }

    /// Forget the cursor and the dedup window. The next fetch has no
    /// lower bound and no validator, and previously seen events apply
    /// again.
    pub fn reset(&mut self) {
        info!("feed poller reset: clearing cursor and dedup window");
        self.cursor.reset();
        self.patcher.reset();
        self.paused_until = None;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn cursor(&self) -> &SyncCursor {
        &self.cursor
    }

    /// Remaining cooldown, if the poller is currently backing off.
    pub fn paused_remaining(&self, now: Instant) -> Option<Duration> {
        self.paused_until
            .and_then(|deadline| deadline.checked_duration_since(now))
    }

    pub fn poll_once(&mut self, now: Instant) -> FeedPollOutcome {
        if !self.running {
            return FeedPollOutcome::Idle;
        }
        if let Some(deadline) = self.paused_until {
            if now < deadline {
                return FeedPollOutcome::Paused;
            }
            self.paused_until = None;
            info!("feed poller resuming after cooldown");
        }

        let fetch = self
            .transport
            .fetch_events(self.cursor.last_timestamp, self.cursor.validator.as_deref());
        match fetch {
            Ok(FeedFetch::NotModified) => {
                debug!("feed not modified");
                FeedPollOutcome::Idle
            }
            Ok(FeedFetch::NotFound) => {
                // The feed is simply not deployed on this server; degrade
                // silently and check again later.
                info!(
                    cooldown_secs = self.feed_missing_cooldown.as_secs(),
                    "event feed not available, cooling down"
                );
                self.paused_until = Some(now + self.feed_missing_cooldown);
                FeedPollOutcome::Paused
            }
            Err(err) => {
                warn!(
                    error = %err,
                    cooldown_secs = self.transient_cooldown.as_secs(),
                    "feed fetch failed, backing off"
                );
                self.paused_until = Some(now + self.transient_cooldown);
                FeedPollOutcome::Paused
            }
            Ok(FeedFetch::Events { events, validator }) => {
                // A 200 without a validator means the server stopped
                // issuing them; drop the stale token instead of
                // re-presenting it and risking a false 304.
                self.cursor.validator = validator;
                let mut current = self.store.snapshot();
                let mut applied = 0usize;
                // Arrival order is load-bearing: a later event may
                // reference an entity created earlier in this batch, so
                // each patch output feeds the next patch.
                for event in &events {
                    self.cursor.advance(event.timestamp);
                    match self.patcher.apply(event, &current) {
                        PatchOutcome::Applied(next) => {
                            if let Some(line) = feed_log_line(event) {
                                info!(target: "feed", "{line}");
                            }
                            current = self.store.replace(next);
                            applied += 1;
                        }
                        PatchOutcome::NoOp => {}
                    }
                }
                FeedPollOutcome::Applied(applied)
            }
        }
    }
}
