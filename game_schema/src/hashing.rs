use std::hash::{BuildHasher, Hasher};

use ahash::RandomState;

use crate::state::GameState;

/// Stable content hash of a snapshot, ignoring the bookkeeping fields the
/// state store stamps on every replace (`version`, `last_saved_ts`).
///
/// Hashes the JSON encoding because its map keys are sorted, so two
/// snapshots with equal content hash equally regardless of map insertion
/// order. Used for cheap change detection and for asserting snapshot
/// equality in tests without field-by-field comparison.
pub fn state_hash(state: &GameState) -> u64 {
    let mut clone = state.clone();
    clone.version = 0;
    clone.last_saved_ts = 0;
    let encoded = serde_json::to_vec(&clone).expect("state serialization for hashing");
    let mut hasher = RandomState::with_seeds(0, 0, 0, 0).build_hasher();
    hasher.write(&encoded);
    hasher.finish()
}
