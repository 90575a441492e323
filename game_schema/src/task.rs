use serde::{Deserialize, Serialize};

use crate::state::CloneUnit;

/// Kinds of server-tracked timed operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Gather,
    Build,
    Grow,
    Expedition,
    Repair,
    Upload,
}

impl TaskKind {
    /// Create-entity family: completing one of these yields a new
    /// selectable entity in the UI.
    pub fn creates_entity(self) -> bool {
        matches!(self, TaskKind::Grow)
    }
}

/// Type-specific payload describing what a task resolves into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "payload_kind", rename_all = "snake_case")]
pub enum TaskPayload {
    /// Pending resource credit (gather).
    Resource { resource: String, amount: i64 },
    /// Pending structure (build).
    Structure { structure: String },
    /// Pending clone descriptor (grow).
    Clone { clone: CloneUnit },
    /// Target of an expedition, repair, or upload.
    Target { target_id: String },
}

/// A server-tracked timed operation that has not yet resolved.
///
/// A task is due exactly when `now >= start_time + duration`; resolution
/// removes it from the active set immediately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveTask {
    pub id: String,
    pub kind: TaskKind,
    /// Unix seconds.
    pub start_time: u64,
    /// Seconds.
    pub duration: u64,
    pub payload: TaskPayload,
}

impl ActiveTask {
    pub fn ends_at(&self) -> u64 {
        self.start_time.saturating_add(self.duration)
    }

    pub fn is_due(&self, now: u64) -> bool {
        now >= self.ends_at()
    }

    pub fn elapsed(&self, now: u64) -> u64 {
        now.saturating_sub(self.start_time).min(self.duration)
    }

    pub fn remaining(&self, now: u64) -> u64 {
        self.ends_at().saturating_sub(now)
    }

    pub fn progress_percent(&self, now: u64) -> u8 {
        if self.duration == 0 {
            return 100;
        }
        ((self.elapsed(now) * 100) / self.duration).min(100) as u8
    }
}
