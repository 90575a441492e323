use std::sync::Arc;

use game_schema::GameState;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ActionError;
use crate::store::StateStore;
use crate::transport::ActionTransport;

/// User-initiated actions, each mapping to one POST endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerAction {
    Gather,
    Build,
    Grow,
    Apply,
    Expedition,
    Upload,
    Repair,
}

impl PlayerAction {
    pub fn endpoint(self) -> &'static str {
        match self {
            PlayerAction::Gather => "gather",
            PlayerAction::Build => "build",
            PlayerAction::Grow => "grow",
            PlayerAction::Apply => "apply",
            PlayerAction::Expedition => "expedition",
            PlayerAction::Upload => "upload",
            PlayerAction::Repair => "repair",
        }
    }
}

/// Merge an action endpoint's returned state over the local snapshot.
///
/// The returned state is authoritative, but the active-task maps are
/// unioned so a task started locally while this request was in flight is
/// not dropped by the race; returned entries win on key collision.
pub fn merge_action_state(local: &GameState, mut returned: GameState) -> GameState {
    for (id, task) in &local.active_tasks {
        returned
            .active_tasks
            .entry(id.clone())
            .or_insert_with(|| task.clone());
    }
    returned
}

/// Submits actions and folds the authoritative response into the store.
pub struct ActionClient {
    transport: Box<dyn ActionTransport>,
    store: Arc<StateStore>,
}

impl ActionClient {
    pub fn new(transport: Box<dyn ActionTransport>, store: Arc<StateStore>) -> Self {
        Self { transport, store }
    }

    /// Submit one action with the current snapshot as the request body.
    /// On rejection the local state is untouched and the terminal message
    /// propagates to the caller; on success the merged state replaces the
    /// local snapshot and the server's message (if any) is returned.
    pub fn submit(&self, action: PlayerAction) -> Result<Option<String>, ActionError> {
        let local = self.store.snapshot();
        let response = match self.transport.submit(action, &local) {
            Ok(response) => response,
            Err(err) => {
                warn!(action = action.endpoint(), error = %err, "action failed");
                return Err(err);
            }
        };
        let merged = merge_action_state(&local, response.state);
        let stored = self.store.replace(merged);
        info!(
            action = action.endpoint(),
            version = stored.version,
            "action applied"
        );
        Ok(response.message)
    }
}
