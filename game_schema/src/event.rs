use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::state::CloneUnit;

/// Known feed event types.
///
/// The event type stays a plain string on the wire so server-added types
/// decode without failure; unknown types are inert on the client.
pub mod event_type {
    pub const RESOURCE_DELTA: &str = "resource.delta";
    pub const GATHER_COMPLETE: &str = "gather.complete";
    pub const CLONE_GROW_COMPLETE: &str = "clone.grow.complete";
    pub const EXPEDITION_RESULT: &str = "expedition.result";
    pub const UPLOAD_COMPLETE: &str = "upload.complete";
}

/// One fine-grained state-change notification from the event feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Opaque unique id; applied to state at most once.
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    /// Unix seconds, non-decreasing across a feed response.
    pub timestamp: u64,
    /// Type-specific payload, parsed per known type by the patcher.
    #[serde(default)]
    pub data: JsonValue,
}

impl GameEvent {
    pub fn new(
        id: impl Into<String>,
        event_type: impl Into<String>,
        timestamp: u64,
        data: JsonValue,
    ) -> Self {
        Self {
            id: id.into(),
            event_type: event_type.into(),
            timestamp,
            data,
        }
    }
}

/// `resource.delta` / `gather.complete`: the server sends the
/// authoritative total, not an increment.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceTotalPayload {
    pub resource: String,
    pub new_total: i64,
}

/// `clone.grow.complete`: the full clone object to insert or overwrite.
#[derive(Debug, Clone, Deserialize)]
pub struct CloneGrowPayload {
    pub clone: CloneUnit,
}

/// `expedition.result`: additive XP and loot merges.
#[derive(Debug, Clone, Deserialize)]
pub struct ExpeditionResultPayload {
    pub clone_id: String,
    #[serde(default)]
    pub xp: HashMap<String, u64>,
    #[serde(default)]
    pub loot: HashMap<String, i64>,
}

/// `upload.complete`: soul progression deltas plus the clone retired by
/// the upload.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadCompletePayload {
    pub clone_id: String,
    #[serde(default)]
    pub soul_percent_delta: f64,
    #[serde(default)]
    pub soul_xp_delta: u64,
}
