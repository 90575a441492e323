mod common;

use std::time::{Duration, Instant};

use common::{events_batch, new_store, resource_event, ScriptedFeed};
use sync_core::{EventFeedPoller, FeedFetch, FeedPollOutcome, SyncConfig, SyncCursor};

/// Coming back from background: the cursor and dedup window are cleared,
/// the next fetch is unbounded, and the full recent window re-applies.
#[test]
fn resume_after_reset_refetches_from_scratch() {
    let feed = ScriptedFeed::new(vec![
        Ok(FeedFetch::Events {
            events: vec![
                resource_event("e-1", 10, "Tritanium", 75),
                resource_event("e-2", 12, "Biomass", 40),
            ],
            validator: Some("tok-1".into()),
        }),
        // After reset the server replays the same window plus one more.
        events_batch(vec![
            resource_event("e-1", 10, "Tritanium", 75),
            resource_event("e-2", 12, "Biomass", 40),
            resource_event("e-3", 14, "Tritanium", 90),
        ]),
    ]);
    let store = new_store();
    let mut poller =
        EventFeedPoller::new(Box::new(feed.clone()), store.clone(), &SyncConfig::default());
    poller.start();

    assert_eq!(poller.poll_once(Instant::now()), FeedPollOutcome::Applied(2));
    assert_eq!(poller.cursor().last_timestamp, Some(12));

    poller.reset();
    poller.resume();
    assert_eq!(poller.cursor(), &SyncCursor::default());

    assert_eq!(poller.poll_once(Instant::now()), FeedPollOutcome::Applied(3));
    let requests = feed.requests.lock();
    assert_eq!(requests[1], (None, None));
    let state = store.snapshot();
    assert_eq!(state.resources.get("Tritanium"), Some(&90));
    assert_eq!(state.resources.get("Biomass"), Some(&40));
}

/// A server without the feed endpoint degrades silently: the poller sits
/// out the long cooldown and quietly tries again, and recovers on its own
/// once the endpoint appears.
#[test]
fn missing_feed_recovers_once_endpoint_appears() {
    let feed = ScriptedFeed::new(vec![
        Ok(FeedFetch::NotFound),
        events_batch(vec![resource_event("e-1", 10, "Tritanium", 75)]),
    ]);
    let store = new_store();
    let mut poller =
        EventFeedPoller::new(Box::new(feed.clone()), store.clone(), &SyncConfig::default());
    poller.start();

    let t0 = Instant::now();
    assert_eq!(poller.poll_once(t0), FeedPollOutcome::Paused);
    // Ticks during the cooldown issue no requests at all.
    for secs in [1, 10, 29] {
        assert_eq!(
            poller.poll_once(t0 + Duration::from_secs(secs)),
            FeedPollOutcome::Paused
        );
    }
    assert_eq!(feed.request_count(), 1);

    // After the cooldown the endpoint is back and events flow again.
    assert_eq!(
        poller.poll_once(t0 + Duration::from_secs(31)),
        FeedPollOutcome::Applied(1)
    );
    assert_eq!(store.snapshot().resources.get("Tritanium"), Some(&75));
}

/// Explicit resume cuts a cooldown short, for foregrounding mid-pause.
#[test]
fn resume_clears_a_pending_cooldown() {
    let feed = ScriptedFeed::new(vec![Ok(FeedFetch::NotFound)]);
    let store = new_store();
    let mut poller = EventFeedPoller::new(Box::new(feed.clone()), store, &SyncConfig::default());
    poller.start();

    let t0 = Instant::now();
    assert_eq!(poller.poll_once(t0), FeedPollOutcome::Paused);
    poller.resume();
    assert!(poller.paused_remaining(t0).is_none());
    assert_eq!(
        poller.poll_once(t0 + Duration::from_secs(1)),
        FeedPollOutcome::Idle
    );
    assert_eq!(feed.request_count(), 2);
}
