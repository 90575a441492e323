use std::io;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use std::{fs, sync::Arc};

use game_schema::GameState;
use parking_lot::{Mutex, RwLock};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::{info, warn};

/// Fixed key for the persisted snapshot blob.
pub const STATE_SNAPSHOT_FILE: &str = "game_state.json";
/// Fixed key for the opaque session identifier reused across action
/// requests (server-side rate limiting).
pub const SESSION_ID_FILE: &str = "session_id";

#[derive(Debug, Error)]
pub enum SnapshotStoreError {
    #[error("failed to read snapshot from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write snapshot to {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Durable local storage for the snapshot blob and the session id.
pub trait SnapshotStore: Send + Sync {
    fn load(&self) -> Result<Option<GameState>, SnapshotStoreError>;
    fn save(&self, state: &GameState) -> Result<(), SnapshotStoreError>;
    fn session_id(&self) -> Result<String, SnapshotStoreError>;
}

pub fn generate_session_id() -> String {
    let mut rng = SmallRng::from_entropy();
    format!("sess-{:016x}", rng.gen::<u64>())
}

/// Snapshot storage in a local directory: one JSON blob plus the session
/// id file.
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn snapshot_path(&self) -> PathBuf {
        self.dir.join(STATE_SNAPSHOT_FILE)
    }

    fn session_path(&self) -> PathBuf {
        self.dir.join(SESSION_ID_FILE)
    }

    fn ensure_dir(&self) -> Result<(), SnapshotStoreError> {
        fs::create_dir_all(&self.dir).map_err(|source| SnapshotStoreError::Write {
            path: self.dir.clone(),
            source,
        })
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self) -> Result<Option<GameState>, SnapshotStoreError> {
        let path = self.snapshot_path();
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&path)
            .map_err(|source| SnapshotStoreError::Read { path, source })?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    fn save(&self, state: &GameState) -> Result<(), SnapshotStoreError> {
        self.ensure_dir()?;
        let path = self.snapshot_path();
        let encoded = serde_json::to_vec_pretty(state)?;
        fs::write(&path, encoded).map_err(|source| SnapshotStoreError::Write { path, source })
    }

    fn session_id(&self) -> Result<String, SnapshotStoreError> {
        let path = self.session_path();
        if path.exists() {
            let id = fs::read_to_string(&path)
                .map_err(|source| SnapshotStoreError::Read { path, source })?;
            return Ok(id.trim().to_string());
        }
        self.ensure_dir()?;
        let id = generate_session_id();
        fs::write(&path, &id).map_err(|source| SnapshotStoreError::Write { path, source })?;
        Ok(id)
    }
}

/// In-memory snapshot storage; backs the test suites.
#[derive(Default)]
pub struct MemorySnapshotStore {
    state: Mutex<Option<GameState>>,
    session: Mutex<Option<String>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saved(&self) -> Option<GameState> {
        self.state.lock().clone()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self) -> Result<Option<GameState>, SnapshotStoreError> {
        Ok(self.state.lock().clone())
    }

    fn save(&self, state: &GameState) -> Result<(), SnapshotStoreError> {
        *self.state.lock() = Some(state.clone());
        Ok(())
    }

    fn session_id(&self) -> Result<String, SnapshotStoreError> {
        let mut guard = self.session.lock();
        Ok(guard.get_or_insert_with(generate_session_id).clone())
    }
}

/// Unix seconds from the wall clock.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Holds the canonical in-memory snapshot and persists it on every
/// replace.
///
/// Replace is the only mutation path: it recomputes derived fields,
/// bumps the version counter, persists, then swaps the snapshot
/// atomically. Reads always see the latest replaced snapshot.
pub struct StateStore {
    state: RwLock<GameState>,
    persistence: Arc<dyn SnapshotStore>,
}

impl StateStore {
    /// Load the persisted snapshot, or start from the default state.
    pub fn open(persistence: Arc<dyn SnapshotStore>) -> Self {
        let mut state = match persistence.load() {
            Ok(Some(saved)) => {
                info!(version = saved.version, "loaded persisted snapshot");
                saved
            }
            Ok(None) => GameState::default(),
            Err(err) => {
                warn!(error = %err, "failed to load persisted snapshot, starting fresh");
                GameState::default()
            }
        };
        state.recompute_derived();
        Self {
            state: RwLock::new(state),
            persistence,
        }
    }

    pub fn snapshot(&self) -> GameState {
        self.state.read().clone()
    }

    pub fn version(&self) -> u64 {
        self.state.read().version
    }

    pub fn session_id(&self) -> Result<String, SnapshotStoreError> {
        self.persistence.session_id()
    }

    /// Replace the canonical snapshot and persist it. Returns the stored
    /// state (with derived fields and bookkeeping stamped) so callers can
    /// keep threading it through further patches.
    pub fn replace(&self, mut next: GameState) -> GameState {
        let mut guard = self.state.write();
        next.version = guard.version + 1;
        next.last_saved_ts = unix_now();
        next.recompute_derived();
        if let Err(err) = self.persistence.save(&next) {
            // The in-memory snapshot stays authoritative; persistence
            // catches up on the next replace.
            warn!(error = %err, "snapshot persistence failed");
        }
        *guard = next.clone();
        next
    }
}
