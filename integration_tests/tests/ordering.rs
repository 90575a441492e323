mod common;

use std::time::Instant;

use common::{events_batch, expedition_event, grow_event, new_store, ScriptedFeed};
use sync_core::{EventFeedPoller, FeedPollOutcome, SyncConfig};

/// In-order delivery: the grow event creates clone X, then the expedition
/// result lands its XP on X within the same batch.
#[test]
fn grow_then_expedition_applies_xp() {
    let feed = ScriptedFeed::new(vec![events_batch(vec![
        grow_event("e-grow", 20, "c-7", "Vess"),
        expedition_event("e-exp", 21, "c-7", 120),
    ])]);
    let store = new_store();
    let mut poller = EventFeedPoller::new(Box::new(feed), store.clone(), &SyncConfig::default());
    poller.start();

    assert_eq!(poller.poll_once(Instant::now()), FeedPollOutcome::Applied(2));
    let state = store.snapshot();
    assert_eq!(state.clones["c-7"].xp.get("scouting"), Some(&120));
}

/// Reverse delivery: the expedition result references a clone that does
/// not exist yet. The documented behavior is that the patch is skipped
/// (the XP update is lost for that delivery) without crashing, and the
/// grow event still applies afterwards. Whether skipped patches should be
/// queued and retried once the entity appears is an open design question;
/// this test pins the current, non-queuing behavior.
#[test]
fn expedition_before_grow_is_skipped_without_crashing() {
    let feed = ScriptedFeed::new(vec![events_batch(vec![
        expedition_event("e-exp", 21, "c-7", 120),
        grow_event("e-grow", 20, "c-7", "Vess"),
    ])]);
    let store = new_store();
    let mut poller = EventFeedPoller::new(Box::new(feed), store.clone(), &SyncConfig::default());
    poller.start();

    assert_eq!(poller.poll_once(Instant::now()), FeedPollOutcome::Applied(1));
    let state = store.snapshot();
    // The clone exists once its grow event applies...
    assert!(state.clones.contains_key("c-7"));
    // ...but the out-of-order XP delivery was dropped, not misapplied.
    assert!(state.clones["c-7"].xp.is_empty());
}

/// A redelivery of the skipped expedition event is also inert, because
/// its id was consumed on first sight.
#[test]
fn skipped_event_redelivery_stays_consumed() {
    let expedition = expedition_event("e-exp", 21, "c-7", 120);
    let feed = ScriptedFeed::new(vec![
        events_batch(vec![expedition.clone()]),
        events_batch(vec![grow_event("e-grow", 22, "c-7", "Vess"), expedition]),
    ]);
    let store = new_store();
    let mut poller = EventFeedPoller::new(Box::new(feed), store.clone(), &SyncConfig::default());
    poller.start();

    assert_eq!(poller.poll_once(Instant::now()), FeedPollOutcome::Applied(0));
    assert_eq!(poller.poll_once(Instant::now()), FeedPollOutcome::Applied(1));
    assert!(store.snapshot().clones["c-7"].xp.is_empty());
}
