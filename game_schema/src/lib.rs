//! Shared data model for the clone-colony client.
//!
//! Defines the canonical [`GameState`] snapshot, the timed-task and
//! server-event types exchanged with the simulation backend, and the
//! derived-field recomputation the rest of the workspace relies on.

mod event;
mod hashing;
mod state;
mod task;

pub use event::{
    event_type, CloneGrowPayload, ExpeditionResultPayload, GameEvent, ResourceTotalPayload,
    UploadCompletePayload,
};
pub use hashing::state_hash;
pub use state::{level_for_xp, CloneUnit, GameState, LEVEL_XP_THRESHOLDS, SOUL_PERCENT_MAX};
pub use task::{ActiveTask, TaskKind, TaskPayload};
