use std::time::Duration;
use std::{fs, io, path::Path, path::PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Runtime tunables for the synchronization engine.
///
/// Defaults carry the cadence observed in production. The dedup bounds
/// are heuristics with no justified "correct" value: a high-throughput
/// session with many short tasks can overflow the window and see rare
/// duplicate-application artifacts, so they stay tunable here.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub feed_interval_ms: u64,
    pub task_interval_ms: u64,
    pub feed_missing_cooldown_secs: u64,
    pub transient_cooldown_secs: u64,
    pub dedup_capacity: usize,
    pub dedup_trim_to: usize,
    pub http_timeout_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            feed_interval_ms: 1_200,
            task_interval_ms: 1_000,
            feed_missing_cooldown_secs: 30,
            transient_cooldown_secs: 5,
            dedup_capacity: 1_000,
            dedup_trim_to: 500,
            http_timeout_secs: 8,
        }
    }
}

impl SyncConfig {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_file(path: &Path) -> Result<Self, SyncConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| SyncConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_json_str(&contents)?)
    }

    pub fn feed_interval(&self) -> Duration {
        Duration::from_millis(self.feed_interval_ms)
    }

    pub fn task_interval(&self) -> Duration {
        Duration::from_millis(self.task_interval_ms)
    }

    pub fn feed_missing_cooldown(&self) -> Duration {
        Duration::from_secs(self.feed_missing_cooldown_secs)
    }

    pub fn transient_cooldown(&self) -> Duration {
        Duration::from_secs(self.transient_cooldown_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

#[derive(Debug, Error)]
pub enum SyncConfigError {
    #[error("failed to parse sync config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read sync config from {path:?}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
