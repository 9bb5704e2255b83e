//! End-to-end scenario: `PathTracker` pause accounting under a virtual
//! clock — pausedDuration must be fully excluded from `traversalTime`.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use knowledge_graph_engine::{FixedClock, Outcome, PathTracker, PathTrackerOptions};

#[test]
fn traversal_time_excludes_paused_duration_exactly() {
    let t0 = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let clock = Arc::new(FixedClock::new(t0));
    let mut tracker = PathTracker::with_clock(clock.clone(), PathTrackerOptions::default());

    // t = 1000 (relative): start path and add a node.
    clock.advance(std::time::Duration::from_millis(1000));
    let path_id = tracker.start_path("scenario", None, None, |_| true).unwrap();
    tracker.add_node(&path_id, "node-1", None).unwrap();

    // t = 2000: pause.
    clock.advance(std::time::Duration::from_millis(1000));
    tracker.pause_path(&path_id).unwrap();

    // t = 4000: resume.
    clock.advance(std::time::Duration::from_millis(2000));
    tracker.resume_path(&path_id).unwrap();
    tracker.add_node(&path_id, "node-2", None).unwrap();

    // t = 5000: complete.
    clock.advance(std::time::Duration::from_millis(1000));
    let experience = tracker.complete_path(&path_id, Outcome::Success, None).unwrap();

    assert_eq!(experience.traversal_time_ms, 2000);
    assert_eq!(experience.path, vec!["node-1".to_string(), "node-2".to_string()]);
}

#[test]
fn cleanup_inactive_paths_auto_completes_with_neutral_outcome() {
    let t0 = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let clock = Arc::new(FixedClock::new(t0));
    let options = PathTrackerOptions {
        auto_complete_timeout: std::time::Duration::from_secs(300),
        ..PathTrackerOptions::default()
    };
    let mut tracker = PathTracker::with_clock(clock.clone(), options);

    let path_id = tracker.start_path("idle", None, None, |_| true).unwrap();
    tracker.add_node(&path_id, "only-node", None).unwrap();

    clock.advance(std::time::Duration::from_secs(301));
    let completed = tracker.cleanup_inactive_paths();

    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].outcome, Outcome::Neutral);
    assert_eq!(tracker.active_count(), 0);
}
