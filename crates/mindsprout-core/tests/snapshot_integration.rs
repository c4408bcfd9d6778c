//! Integration tests for the reader-side snapshot provider.
//!
//! Exercises the full two-process loop: the writer records and signals,
//! the reader polls at host-determined points and materializes snapshots.

use chrono::{TimeZone, Utc};
use mindsprout_core::{
    MilestoneTable, ProgressTracker, RefreshState, SnapshotProvider, SyncGateway,
};
use tempfile::TempDir;

struct Harness {
    tracker: ProgressTracker,
    provider: SnapshotProvider,
    _dirs: [TempDir; 3],
}

fn harness() -> Harness {
    let shared = TempDir::new().unwrap();
    let local_w = TempDir::new().unwrap();
    let local_r = TempDir::new().unwrap();
    let writer = SyncGateway::open_at(shared.path(), local_w.path()).unwrap();
    let reader = SyncGateway::open_at(shared.path(), local_r.path()).unwrap();
    Harness {
        tracker: ProgressTracker::new(writer),
        provider: SnapshotProvider::new(reader, MilestoneTable::default()),
        _dirs: [shared, local_w, local_r],
    }
}

#[test]
fn test_full_record_signal_refresh_cycle() {
    let mut h = harness();
    let now = Utc::now();

    // Reader wakes with nothing to do.
    assert!(h.provider.poll(now).unwrap().is_none());

    // Writer records two sessions on consecutive days.
    let d1 = Utc.with_ymd_and_hms(2026, 8, 1, 6, 0, 0).unwrap();
    let d2 = Utc.with_ymd_and_hms(2026, 8, 2, 6, 0, 0).unwrap();
    h.tracker.record_session(20, d1).unwrap();
    h.tracker.record_session(15, d2).unwrap();

    // Reader wakes once, refreshes once, sees the final state.
    let snap = h.provider.poll(now).unwrap().expect("refresh expected");
    assert_eq!(snap.state.total_minutes, 35);
    assert_eq!(snap.state.current_streak, 2);
    assert_eq!(snap.stage_name, "Sprout");
    assert_eq!(snap.next_stage_threshold, Some(120));
    assert!(!snap.placeholder);

    // Cycle settles: Refreshed -> Idle on the next quiet wake.
    assert_eq!(h.provider.refresh_state(), RefreshState::Refreshed);
    assert!(h.provider.poll(now).unwrap().is_none());
    assert_eq!(h.provider.refresh_state(), RefreshState::Idle);
}

#[test]
fn test_snapshot_milestone_fields_track_thresholds() {
    let mut h = harness();
    let day = |d| Utc.with_ymd_and_hms(2026, 8, d, 6, 0, 0).unwrap();

    // 29 minutes: still Seed, almost at the Sprout threshold.
    h.tracker.record_session(29, day(1)).unwrap();
    let snap = h.provider.poll(Utc::now()).unwrap().unwrap();
    assert_eq!(snap.stage_name, "Seed");
    assert!((snap.progress_fraction - 29.0 / 30.0).abs() < 1e-9);

    // One more minute crosses into Sprout at zero progress.
    h.tracker.record_session(1, day(1)).unwrap();
    let snap = h.provider.poll(Utc::now()).unwrap().unwrap();
    assert_eq!(snap.stage_name, "Sprout");
    assert_eq!(snap.progress_fraction, 0.0);
}

#[test]
fn test_reset_propagates_to_reader() {
    let mut h = harness();
    h.tracker.record_session(200, Utc::now()).unwrap();
    assert!(h.provider.poll(Utc::now()).unwrap().is_some());

    h.tracker.reset_all_data().unwrap();
    let snap = h.provider.poll(Utc::now()).unwrap().expect("reset signal");
    assert_eq!(snap.state.total_minutes, 0);
    assert_eq!(snap.stage_name, "Seed");
}

#[test]
fn test_placeholder_never_reflects_real_data() {
    let h = harness();
    h.tracker.record_session(500, Utc::now()).unwrap();

    let placeholder = h.provider.placeholder(Utc::now());
    assert!(placeholder.placeholder);
    assert_eq!(placeholder.state.total_minutes, 0);

    let real = h.provider.snapshot(Utc::now()).unwrap();
    assert!(!real.placeholder);
    assert_eq!(real.state.total_minutes, 500);
}

#[test]
fn test_concurrent_snapshot_reads_are_safe() {
    use std::sync::Arc;

    let shared = TempDir::new().unwrap();
    let local_w = TempDir::new().unwrap();
    let writer = SyncGateway::open_at(shared.path(), local_w.path()).unwrap();
    let tracker = ProgressTracker::new(writer);
    tracker.record_session(45, Utc::now()).unwrap();

    // Pure reads from several reader handles in parallel.
    let mut handles = Vec::new();
    let shared = Arc::new(shared);
    for _ in 0..4 {
        let shared = Arc::clone(&shared);
        handles.push(std::thread::spawn(move || {
            let local = TempDir::new().unwrap();
            let reader = SyncGateway::open_at(shared.path(), local.path()).unwrap();
            let provider = SnapshotProvider::new(reader, MilestoneTable::default());
            provider.snapshot(Utc::now()).unwrap().state.total_minutes
        }));
    }
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 45);
    }
}
