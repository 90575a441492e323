//! State synchronization engine for the clone-colony client.
//!
//! Keeps the locally held [`game_schema::GameState`] consistent with the
//! authoritative server across network interruption, duplicate delivery,
//! and concurrent timed tasks. Two independent channels converge on the
//! [`StateStore`]: the [`EventFeedPoller`] streams fine-grained deltas
//! and the [`TaskStatusPoller`] performs server-wins reconciliation when
//! a timed task completes. Correctness rests on idempotent patches, not
//! on mutual exclusion between the channels.

mod actions;
mod config;
mod coordinator;
mod error;
mod feed;
mod http;
mod patcher;
mod predictor;
mod store;
mod task_poller;
mod transport;

pub use actions::{merge_action_state, ActionClient, PlayerAction};
pub use config::{SyncConfig, SyncConfigError};
pub use coordinator::{SyncCoordinator, SyncPhase};
pub use error::{ActionError, TransportError};
pub use feed::{EventFeedPoller, FeedPollOutcome, SyncCursor};
pub use http::HttpTransport;
pub use patcher::{feed_log_line, DedupWindow, EventPatcher, PatchOutcome};
pub use predictor::predict_completions;
pub use store::{
    generate_session_id, unix_now, FileSnapshotStore, MemorySnapshotStore, SnapshotStore,
    SnapshotStoreError, StateStore, SESSION_ID_FILE, STATE_SNAPSHOT_FILE,
};
pub use task_poller::{TaskPollOutcome, TaskStatusPoller};
pub use transport::{
    ActionResponse, ActionTransport, FeedFetch, FeedTransport, TaskStatusReport,
    TaskStatusResponse, TaskTransport,
};
