use game_schema::{GameState, TaskPayload};
use tracing::debug;

/// Resolve every due timed task locally, without waiting for the server.
///
/// Keeps the UI responsive between polls: a gather credits its pending
/// resource, a grow inserts (and selects) its pending clone. Expedition,
/// repair, and upload effects are only known server-side, so those tasks
/// are just removed here and their effects arrive via the feed or the
/// final reconciliation. Every prediction is superseded wholesale the
/// moment the task-status channel reconciles with the server.
///
/// Returns `None` when nothing was due.
pub fn predict_completions(state: &GameState, now: u64) -> Option<GameState> {
    let due: Vec<_> = state
        .active_tasks
        .values()
        .filter(|task| task.is_due(now))
        .cloned()
        .collect();
    if due.is_empty() {
        return None;
    }

    let mut next = state.clone();
    for task in due {
        next.active_tasks.remove(&task.id);
        debug!(task_id = %task.id, kind = ?task.kind, "predicting local task completion");
        match task.payload {
            TaskPayload::Resource { resource, amount } => {
                // Additive local credit only. The authoritative feed event
                // carries an absolute total, so this cannot double-count.
                *next.resources.entry(resource).or_insert(0) += amount;
            }
            TaskPayload::Clone { clone } => {
                next.selected_clone = Some(clone.id.clone());
                next.clones.insert(clone.id.clone(), clone);
            }
            TaskPayload::Structure { .. } | TaskPayload::Target { .. } => {}
        }
    }
    next.recompute_derived();
    Some(next)
}
