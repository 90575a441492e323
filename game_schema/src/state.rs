use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::task::ActiveTask;

/// Upper clamp for `soul_percent` and `attention_percent`.
pub const SOUL_PERCENT_MAX: f64 = 100.0;

/// Fixed XP thresholds backing every derived level in the game.
///
/// A level is the index of the highest threshold the XP counter has
/// reached, so the table is the single source of truth for the step
/// function: levels must always be recomputable from XP and are never
/// persisted independently of it.
pub const LEVEL_XP_THRESHOLDS: &[u64] = &[
    0, 100, 250, 500, 1_000, 2_000, 4_000, 8_000, 16_000, 32_000,
];

/// Map an XP counter onto its derived level via the fixed threshold table.
pub fn level_for_xp(xp: u64) -> u32 {
    let reached = LEVEL_XP_THRESHOLDS
        .iter()
        .take_while(|&&threshold| xp >= threshold)
        .count();
    reached.saturating_sub(1) as u32
}

/// A grown clone body, alive or already uploaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloneUnit {
    pub id: String,
    pub name: String,
    pub alive: bool,
    #[serde(default)]
    pub uploaded: bool,
    /// XP per practice category (scouting, labor, ...).
    #[serde(default)]
    pub xp: HashMap<String, u64>,
    /// Derived from total XP; see [`GameState::recompute_derived`].
    #[serde(default)]
    pub level: u32,
}

impl CloneUnit {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            alive: true,
            uploaded: false,
            xp: HashMap::new(),
            level: 0,
        }
    }

    pub fn total_xp(&self) -> u64 {
        self.xp.values().copied().sum()
    }

    pub fn recompute_level(&mut self) {
        self.level = level_for_xp(self.total_xp());
    }
}

/// The canonical client-held snapshot of the game.
///
/// Mutated only by whole-snapshot replacement through the state store;
/// every event patch and reconciliation produces a fresh value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameState {
    /// Resource name -> authoritative quantity.
    pub resources: HashMap<String, i64>,
    pub clones: HashMap<String, CloneUnit>,
    pub active_tasks: HashMap<String, ActiveTask>,
    pub soul_percent: f64,
    pub attention_percent: f64,
    pub soul_xp: u64,
    /// Derived from `soul_xp`; never trusted as persisted.
    pub soul_level: u32,
    pub practice_xp: HashMap<String, u64>,
    /// Derived from `practice_xp`; never trusted as persisted.
    pub practice_levels: HashMap<String, u32>,
    /// UI-facing selection affordance, not a correctness field.
    pub selected_clone: Option<String>,
    /// Monotonic replace counter, bumped by the state store.
    pub version: u64,
    /// Unix seconds of the last persisted replace.
    pub last_saved_ts: u64,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            resources: HashMap::new(),
            clones: HashMap::new(),
            active_tasks: HashMap::new(),
            soul_percent: 0.0,
            attention_percent: 0.0,
            soul_xp: 0,
            soul_level: 0,
            practice_xp: HashMap::new(),
            practice_levels: HashMap::new(),
            selected_clone: None,
            version: 0,
            last_saved_ts: 0,
        }
    }
}

impl GameState {
    /// Recompute every derived level from its XP source and clamp the
    /// percentage scalars into range.
    pub fn recompute_derived(&mut self) {
        self.soul_level = level_for_xp(self.soul_xp);
        self.practice_levels = self
            .practice_xp
            .iter()
            .map(|(practice, &xp)| (practice.clone(), level_for_xp(xp)))
            .collect();
        for clone in self.clones.values_mut() {
            clone.recompute_level();
        }
        self.soul_percent = self.soul_percent.clamp(0.0, SOUL_PERCENT_MAX);
        self.attention_percent = self.attention_percent.clamp(0.0, SOUL_PERCENT_MAX);
    }

    pub fn has_active_tasks(&self) -> bool {
        !self.active_tasks.is_empty()
    }

    /// The most recently grown clone, used to auto-select newly created
    /// entities after a create-family task completes.
    ///
    /// Clone ids carry a server-assigned ordinal suffix ("c-10"), so the
    /// suffix is compared numerically; ids without one fall back to
    /// string order.
    pub fn newest_clone_id(&self) -> Option<String> {
        self.clones
            .values()
            .filter(|clone| clone.alive)
            .max_by_key(|clone| (id_ordinal(&clone.id), clone.id.clone()))
            .map(|clone| clone.id.clone())
    }
}

/// Trailing decimal suffix of an entity id, if it has one.
fn id_ordinal(id: &str) -> Option<u64> {
    let start = id
        .rfind(|c: char| !c.is_ascii_digit())
        .map(|i| i + 1)
        .unwrap_or(0);
    id[start..].parse().ok()
}
