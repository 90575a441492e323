use game_schema::{GameEvent, GameState, TaskKind};
use serde::{Deserialize, Serialize};

use crate::actions::PlayerAction;
use crate::error::{ActionError, TransportError};

/// Result of one event-feed fetch.
#[derive(Debug, Clone)]
pub enum FeedFetch {
    /// New events in feed order, plus the cache validator to present on
    /// the next fetch.
    Events {
        events: Vec<GameEvent>,
        validator: Option<String>,
    },
    /// Cache validator matched; nothing new since the cursor.
    NotModified,
    /// The feed endpoint is not deployed on this server.
    NotFound,
}

/// Fetches feed events strictly after the given timestamp watermark.
pub trait FeedTransport: Send {
    fn fetch_events(
        &self,
        after: Option<u64>,
        validator: Option<&str>,
    ) -> Result<FeedFetch, TransportError>;
}

/// Server-reported progress of the currently running task.
///
/// Display-only: nothing in here ever touches resources or clone data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatusReport {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    /// 0-100.
    pub progress: u8,
    pub elapsed: u64,
    pub remaining: u64,
    pub duration: u64,
    #[serde(default)]
    pub label: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskStatusResponse {
    pub active: bool,
    #[serde(default)]
    pub task: Option<TaskStatusReport>,
    #[serde(default)]
    pub completed: bool,
}

/// Task-status channel plus the authoritative full-state fetch used for
/// server-wins reconciliation.
pub trait TaskTransport: Send {
    fn task_status(&self) -> Result<TaskStatusResponse, TransportError>;
    fn fetch_state(&self) -> Result<GameState, TransportError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse {
    /// Authoritative partial state echoed by the action endpoint.
    pub state: GameState,
    #[serde(default)]
    pub message: Option<String>,
}

/// Submits a user-initiated action with the current client-held state as
/// the request body.
pub trait ActionTransport: Send {
    fn submit(
        &self,
        action: PlayerAction,
        state: &GameState,
    ) -> Result<ActionResponse, ActionError>;
}
