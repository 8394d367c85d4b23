//! RegistrationTracker under paused time.

use std::time::Duration;

use shardline_common::Snowflake;

use crate::tracker::RegistrationTracker;

const WINDOW: Duration = Duration::from_secs(15 * 60);

fn id(n: u64) -> Snowflake {
    Snowflake::new(n)
}

async fn sleep_minutes(minutes: u64) {
    tokio::time::sleep(Duration::from_secs(minutes * 60)).await;
}

// ---------------------------------------------------------------------------
// Register / clear
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn register_then_is_registered() {
    let tracker = RegistrationTracker::new(WINDOW);

    assert!(tracker.register(id(1)));
    assert!(tracker.is_registered(id(1)));
    assert!(!tracker.is_registered(id(2)));
    assert_eq!(tracker.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn clear_removes_registration() {
    let tracker = RegistrationTracker::new(WINDOW);
    tracker.register(id(1));

    assert!(tracker.clear(id(1)));
    assert!(!tracker.is_registered(id(1)));
    assert!(tracker.is_empty());
}

#[tokio::test(start_paused = true)]
async fn clear_is_idempotent() {
    let tracker = RegistrationTracker::new(WINDOW);
    tracker.register(id(1));

    assert!(tracker.clear(id(1)));
    assert!(!tracker.clear(id(1)));
    assert!(!tracker.clear(id(2)));
}

// ---------------------------------------------------------------------------
// Expiry
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn registration_survives_until_window_elapses() {
    let tracker = RegistrationTracker::new(WINDOW);
    tracker.register(id(1));

    sleep_minutes(14).await;
    assert!(tracker.is_registered(id(1)));

    sleep_minutes(2).await;
    assert!(!tracker.is_registered(id(1)));
    assert!(tracker.is_empty(), "expiry timer should have removed the entry");
}

#[tokio::test(start_paused = true)]
async fn reregistering_keeps_original_expiry() {
    let tracker = RegistrationTracker::new(WINDOW);
    assert!(tracker.register(id(1)));

    sleep_minutes(10).await;
    assert!(!tracker.register(id(1)), "second register should be a no-op");
    assert_eq!(tracker.len(), 1);

    sleep_minutes(6).await;
    assert!(!tracker.is_registered(id(1)));
    assert!(tracker.is_empty());
}

#[tokio::test(start_paused = true)]
async fn clear_then_register_starts_a_fresh_window() {
    let tracker = RegistrationTracker::new(WINDOW);
    tracker.register(id(1));

    sleep_minutes(10).await;
    tracker.clear(id(1));
    assert!(tracker.register(id(1)));

    // Past the first registration's deadline, inside the second one's.
    sleep_minutes(10).await;
    assert!(tracker.is_registered(id(1)));

    sleep_minutes(6).await;
    assert!(!tracker.is_registered(id(1)));
    assert!(tracker.is_empty());
}

#[tokio::test(start_paused = true)]
async fn clear_after_expiry_reports_nothing_removed() {
    let tracker = RegistrationTracker::new(WINDOW);
    tracker.register(id(1));

    sleep_minutes(16).await;
    assert!(!tracker.clear(id(1)));
}

#[tokio::test(start_paused = true)]
async fn register_at_window_boundary_replaces_expired_entry() {
    let tracker = RegistrationTracker::new(WINDOW);
    assert!(tracker.register(id(1)));

    tokio::time::advance(WINDOW).await;
    assert!(!tracker.is_registered(id(1)));
    assert!(tracker.register(id(1)), "expired entry must not block");

    tokio::task::yield_now().await;
    assert!(tracker.is_registered(id(1)));
    assert_eq!(tracker.len(), 1);

    // The first timer is gone; only the second window applies.
    sleep_minutes(14).await;
    assert!(tracker.is_registered(id(1)));
    sleep_minutes(2).await;
    assert!(!tracker.is_registered(id(1)));
}

#[tokio::test(start_paused = true)]
async fn ids_expire_independently() {
    let tracker = RegistrationTracker::new(WINDOW);
    tracker.register(id(1));
    sleep_minutes(5).await;
    tracker.register(id(2));

    sleep_minutes(11).await;
    assert!(!tracker.is_registered(id(1)));
    assert!(tracker.is_registered(id(2)));
    assert_eq!(tracker.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn custom_window_is_honored() {
    let tracker = RegistrationTracker::new(Duration::from_secs(30));
    tracker.register(id(1));

    tokio::time::sleep(Duration::from_secs(31)).await;
    assert!(!tracker.is_registered(id(1)));
}

// ---------------------------------------------------------------------------
// Teardown
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_everything() {
    let tracker = RegistrationTracker::new(WINDOW);
    for n in 1..=3 {
        tracker.register(id(n));
    }

    tracker.shutdown();

    assert!(tracker.is_empty());
    assert!((1..=3).all(|n| !tracker.is_registered(id(n))));

    // Cancelled timers must not fire against a later registration.
    tracker.register(id(1));
    sleep_minutes(14).await;
    assert!(tracker.is_registered(id(1)));
}

#[test]
fn register_outside_runtime_still_tracks() {
    let tracker = RegistrationTracker::new(WINDOW);

    assert!(tracker.register(id(1)));
    assert!(tracker.is_registered(id(1)));
    assert!(tracker.clear(id(1)));
}

#[test]
fn expired_entry_outside_runtime_is_replaced() {
    let tracker = RegistrationTracker::new(Duration::from_millis(20));
    assert!(tracker.register(id(1)));
    assert!(tracker.register(id(2)));

    std::thread::sleep(Duration::from_millis(40));
    assert!(!tracker.is_registered(id(1)));
    assert_eq!(tracker.len(), 0);

    assert!(tracker.register(id(1)));
    assert!(tracker.is_registered(id(1)));
    assert!(!tracker.register(id(1)));
    assert_eq!(tracker.len(), 1);
}
