#![allow(dead_code)]

use std::sync::Arc;

use game_schema::{event_type, CloneUnit, GameEvent, GameState};
use parking_lot::Mutex;
use serde_json::json;
use sync_core::{
    FeedFetch, FeedTransport, MemorySnapshotStore, StateStore, TaskStatusResponse, TaskTransport,
    TransportError,
};

pub fn new_store() -> Arc<StateStore> {
    Arc::new(StateStore::open(Arc::new(MemorySnapshotStore::new())))
}

/// Feed transport that replays a scripted sequence of fetch results and
/// records every request it receives.
pub struct ScriptedFeed {
    script: Mutex<Vec<Result<FeedFetch, TransportError>>>,
    pub requests: Mutex<Vec<(Option<u64>, Option<String>)>>,
}

/// Cloneable handle wrapping the shared feed; the orphan rule forbids
/// implementing `FeedTransport` for `Arc<ScriptedFeed>` outside sync_core.
#[derive(Clone)]
pub struct ScriptedFeedHandle(Arc<ScriptedFeed>);

impl std::ops::Deref for ScriptedFeedHandle {
    type Target = ScriptedFeed;

    fn deref(&self) -> &ScriptedFeed {
        &self.0
    }
}

impl ScriptedFeed {
    pub fn new(script: Vec<Result<FeedFetch, TransportError>>) -> ScriptedFeedHandle {
        ScriptedFeedHandle(Arc::new(Self {
            script: Mutex::new(script),
            requests: Mutex::new(Vec::new()),
        }))
    }

    pub fn push(&self, fetch: Result<FeedFetch, TransportError>) {
        self.script.lock().push(fetch);
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

impl FeedTransport for ScriptedFeedHandle {
    fn fetch_events(
        &self,
        after: Option<u64>,
        validator: Option<&str>,
    ) -> Result<FeedFetch, TransportError> {
        self.requests
            .lock()
            .push((after, validator.map(str::to_string)));
        let mut script = self.script.lock();
        if script.is_empty() {
            Ok(FeedFetch::NotModified)
        } else {
            script.remove(0)
        }
    }
}

/// Task transport backed by a mutable authoritative server state.
pub struct FakeTaskServer {
    pub statuses: Mutex<Vec<TaskStatusResponse>>,
    pub server_state: Mutex<GameState>,
}

/// Cloneable handle wrapping the shared server; same orphan-rule
/// workaround as [`ScriptedFeedHandle`].
#[derive(Clone)]
pub struct FakeTaskServerHandle(Arc<FakeTaskServer>);

impl std::ops::Deref for FakeTaskServerHandle {
    type Target = FakeTaskServer;

    fn deref(&self) -> &FakeTaskServer {
        &self.0
    }
}

impl FakeTaskServer {
    pub fn new(statuses: Vec<TaskStatusResponse>, server_state: GameState) -> FakeTaskServerHandle {
        FakeTaskServerHandle(Arc::new(Self {
            statuses: Mutex::new(statuses),
            server_state: Mutex::new(server_state),
        }))
    }
}

impl TaskTransport for FakeTaskServerHandle {
    fn task_status(&self) -> Result<TaskStatusResponse, TransportError> {
        let mut statuses = self.statuses.lock();
        if statuses.is_empty() {
            Ok(TaskStatusResponse::default())
        } else {
            Ok(statuses.remove(0))
        }
    }

    fn fetch_state(&self) -> Result<GameState, TransportError> {
        Ok(self.server_state.lock().clone())
    }
}

pub fn events_batch(events: Vec<GameEvent>) -> Result<FeedFetch, TransportError> {
    Ok(FeedFetch::Events {
        events,
        validator: None,
    })
}

pub fn resource_event(id: &str, ts: u64, resource: &str, new_total: i64) -> GameEvent {
    GameEvent::new(
        id,
        event_type::RESOURCE_DELTA,
        ts,
        json!({"resource": resource, "new_total": new_total}),
    )
}

pub fn grow_event(id: &str, ts: u64, clone_id: &str, name: &str) -> GameEvent {
    GameEvent::new(
        id,
        event_type::CLONE_GROW_COMPLETE,
        ts,
        json!({"clone": {"id": clone_id, "name": name, "alive": true}}),
    )
}

pub fn expedition_event(id: &str, ts: u64, clone_id: &str, scouting_xp: u64) -> GameEvent {
    GameEvent::new(
        id,
        event_type::EXPEDITION_RESULT,
        ts,
        json!({"clone_id": clone_id, "xp": {"scouting": scouting_xp}, "loot": {}}),
    )
}

pub fn upload_event(id: &str, ts: u64, clone_id: &str, percent: f64, xp: u64) -> GameEvent {
    GameEvent::new(
        id,
        event_type::UPLOAD_COMPLETE,
        ts,
        json!({"clone_id": clone_id, "soul_percent_delta": percent, "soul_xp_delta": xp}),
    )
}

pub fn state_with_clone(clone_id: &str, name: &str) -> GameState {
    let mut state = GameState::default();
    state
        .clones
        .insert(clone_id.to_string(), CloneUnit::new(clone_id, name));
    state
}
