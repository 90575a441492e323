use std::collections::{HashSet, VecDeque};

use game_schema::{
    event_type, CloneGrowPayload, ExpeditionResultPayload, GameEvent, GameState,
    ResourceTotalPayload, UploadCompletePayload, SOUL_PERCENT_MAX,
};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Bounded FIFO membership cache of already-applied event ids.
///
/// Not a ledger: on overflow the window is trimmed to the most recent
/// `trim_to` entries, so an id evicted here may be treated as new again
/// if the server redelivers it much later. That false-negative window is
/// an accepted, bounded limitation; the caps are tunable through
/// [`crate::config::SyncConfig`].
#[derive(Debug)]
pub struct DedupWindow {
    seen: HashSet<String>,
    order: VecDeque<String>,
    capacity: usize,
    trim_to: usize,
}

impl DedupWindow {
    pub fn new(capacity: usize, trim_to: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            seen: HashSet::new(),
            order: VecDeque::new(),
            capacity,
            trim_to: trim_to.min(capacity),
        }
    }

    /// Record an id; returns `false` when it was already present.
    pub fn insert(&mut self, id: &str) -> bool {
        if self.seen.contains(id) {
            return false;
        }
        self.seen.insert(id.to_string());
        self.order.push_back(id.to_string());
        if self.order.len() > self.capacity {
            while self.order.len() > self.trim_to {
                if let Some(evicted) = self.order.pop_front() {
                    self.seen.remove(&evicted);
                }
            }
        }
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.seen.clear();
        self.order.clear();
    }
}

/// Result of applying one event to a state snapshot.
#[derive(Debug, Clone)]
pub enum PatchOutcome {
    Applied(GameState),
    NoOp,
}

impl PatchOutcome {
    pub fn applied(self) -> Option<GameState> {
        match self {
            PatchOutcome::Applied(state) => Some(state),
            PatchOutcome::NoOp => None,
        }
    }
}

/// Applies server-pushed events to state snapshots, at most once per
/// event id.
///
/// Apply never mutates its input: it returns a fresh snapshot or
/// [`PatchOutcome::NoOp`], so a batch of events can be folded
/// deterministically, each patch output feeding the next patch.
#[derive(Debug)]
pub struct EventPatcher {
    window: DedupWindow,
}

impl EventPatcher {
    pub fn new(dedup_capacity: usize, dedup_trim_to: usize) -> Self {
        Self {
            window: DedupWindow::new(dedup_capacity, dedup_trim_to),
        }
    }

    /// Forget every applied event id. Used on explicit reconnect, when
    /// the feed's delta assumptions no longer hold.
    pub fn reset(&mut self) {
        self.window.clear();
    }

    pub fn seen(&self, event_id: &str) -> bool {
        self.window.contains(event_id)
    }

    pub fn seen_count(&self) -> usize {
        self.window.len()
    }

    pub fn apply(&mut self, event: &GameEvent, state: &GameState) -> PatchOutcome {
        // The id is consumed before semantic dispatch and stays consumed
        // even when the patch below is skipped, so every redelivery of
        // this event is harmless.
        if !self.window.insert(&event.id) {
            debug!(event_id = %event.id, "duplicate event, skipping");
            return PatchOutcome::NoOp;
        }

        match event.event_type.as_str() {
            event_type::RESOURCE_DELTA | event_type::GATHER_COMPLETE => {
                self.patch_resource_total(event, state)
            }
            event_type::CLONE_GROW_COMPLETE => self.patch_clone_grow(event, state),
            event_type::EXPEDITION_RESULT => self.patch_expedition_result(event, state),
            event_type::UPLOAD_COMPLETE => self.patch_upload_complete(event, state),
            other => {
                // Unknown types are inert: forward compatibility with
                // server-added events.
                debug!(event_id = %event.id, event_type = other, "unknown event type, ignoring");
                PatchOutcome::NoOp
            }
        }
    }

    fn patch_resource_total(&self, event: &GameEvent, state: &GameState) -> PatchOutcome {
        let Some(payload) = decode_payload::<ResourceTotalPayload>(event) else {
            return PatchOutcome::NoOp;
        };
        let mut next = state.clone();
        // Absolute overwrite: the server sends the authoritative total so
        // a locally predicted increment cannot double-count.
        next.resources.insert(payload.resource, payload.new_total);
        finish(next)
    }

    fn patch_clone_grow(&self, event: &GameEvent, state: &GameState) -> PatchOutcome {
        let Some(payload) = decode_payload::<CloneGrowPayload>(event) else {
            return PatchOutcome::NoOp;
        };
        let mut next = state.clone();
        next.clones
            .insert(payload.clone.id.clone(), payload.clone);
        finish(next)
    }

    fn patch_expedition_result(&self, event: &GameEvent, state: &GameState) -> PatchOutcome {
        let Some(payload) = decode_payload::<ExpeditionResultPayload>(event) else {
            return PatchOutcome::NoOp;
        };
        if !state.clones.contains_key(&payload.clone_id) {
            // Out-of-order delivery can reference a clone we have not
            // grown yet; the patch is skipped but the event id stays
            // consumed. See the dedup window docs for the trade-off.
            warn!(
                event_id = %event.id,
                clone_id = %payload.clone_id,
                "expedition result for unknown clone, patch skipped"
            );
            return PatchOutcome::NoOp;
        }
        let mut next = state.clone();
        if let Some(clone) = next.clones.get_mut(&payload.clone_id) {
            for (category, gained) in &payload.xp {
                *clone.xp.entry(category.clone()).or_insert(0) += gained;
            }
        }
        for (resource, amount) in &payload.loot {
            *next.resources.entry(resource.clone()).or_insert(0) += amount;
        }
        finish(next)
    }

    fn patch_upload_complete(&self, event: &GameEvent, state: &GameState) -> PatchOutcome {
        let Some(payload) = decode_payload::<UploadCompletePayload>(event) else {
            return PatchOutcome::NoOp;
        };
        let mut next = state.clone();
        next.soul_percent =
            (next.soul_percent + payload.soul_percent_delta).min(SOUL_PERCENT_MAX);
        next.soul_xp += payload.soul_xp_delta;
        if let Some(clone) = next.clones.get_mut(&payload.clone_id) {
            clone.uploaded = true;
            clone.alive = false;
        }
        finish(next)
    }
}

fn finish(mut next: GameState) -> PatchOutcome {
    next.recompute_derived();
    PatchOutcome::Applied(next)
}

fn decode_payload<T: DeserializeOwned>(event: &GameEvent) -> Option<T> {
    match serde_json::from_value(event.data.clone()) {
        Ok(payload) => Some(payload),
        Err(err) => {
            // Malformed payload for a known type: drop this single event
            // and let the rest of the batch continue.
            warn!(
                event_id = %event.id,
                event_type = %event.event_type,
                error = %err,
                "malformed event payload, dropping event"
            );
            None
        }
    }
}

/// Human-readable feed line for an event, keyed on type.
///
/// Pure and infallible; `None` for unknown types or payloads that do not
/// decode. Formatting never blocks patching.
pub fn feed_log_line(event: &GameEvent) -> Option<String> {
    match event.event_type.as_str() {
        event_type::RESOURCE_DELTA | event_type::GATHER_COMPLETE => {
            let payload: ResourceTotalPayload = serde_json::from_value(event.data.clone()).ok()?;
            Some(format!(
                "{} stockpile is now {}",
                payload.resource, payload.new_total
            ))
        }
        event_type::CLONE_GROW_COMPLETE => {
            let payload: CloneGrowPayload = serde_json::from_value(event.data.clone()).ok()?;
            Some(format!("Clone {} finished growing", payload.clone.name))
        }
        event_type::EXPEDITION_RESULT => {
            let payload: ExpeditionResultPayload =
                serde_json::from_value(event.data.clone()).ok()?;
            let total_xp: u64 = payload.xp.values().copied().sum();
            Some(format!(
                "Expedition returned: clone {} gained {} XP, {} loot stacks",
                payload.clone_id,
                total_xp,
                payload.loot.len()
            ))
        }
        event_type::UPLOAD_COMPLETE => {
            let payload: UploadCompletePayload =
                serde_json::from_value(event.data.clone()).ok()?;
            Some(format!("Clone {} uploaded to the soul", payload.clone_id))
        }
        _ => None,
    }
}
