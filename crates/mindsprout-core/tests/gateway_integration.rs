//! Integration tests for the synchronization gateway.
//!
//! The writer and reader are modeled as two gateways over the same shared
//! directory but separate local directories, mirroring two independently
//! scheduled processes whose only channel is the store plus the signal.

use chrono::Utc;
use mindsprout_core::gateway::STORE_FILE;
use mindsprout_core::storage::store::KEY_SESSIONS;
use mindsprout_core::storage::ProgressStore;
use mindsprout_core::{AggregateState, ProgressTracker, Session, SyncGateway};
use tempfile::TempDir;

#[test]
fn test_writer_commit_visible_to_reader_after_signal() {
    let shared = TempDir::new().unwrap();
    let local_w = TempDir::new().unwrap();
    let local_r = TempDir::new().unwrap();

    let writer = SyncGateway::open_at(shared.path(), local_w.path()).unwrap();
    let reader = SyncGateway::open_at(shared.path(), local_r.path()).unwrap();
    let mut watcher = reader.watcher();

    let tracker = ProgressTracker::new(writer);
    tracker.record_session(30, Utc::now()).unwrap();

    // Signal observed, and the state it announces is already committed.
    assert!(watcher.poll().unwrap());
    let state = reader.load().unwrap();
    assert_eq!(state.total_minutes, 30);
    assert_eq!(state.current_streak, 1);
}

#[test]
fn test_reader_rereads_full_state_not_a_diff() {
    let shared = TempDir::new().unwrap();
    let local_w = TempDir::new().unwrap();
    let local_r = TempDir::new().unwrap();

    let writer = SyncGateway::open_at(shared.path(), local_w.path()).unwrap();
    let reader = SyncGateway::open_at(shared.path(), local_r.path()).unwrap();
    let mut watcher = reader.watcher();

    let tracker = ProgressTracker::new(writer);
    tracker.record_session(10, Utc::now()).unwrap();
    tracker.record_session(15, Utc::now()).unwrap();
    tracker.record_session(20, Utc::now()).unwrap();

    // Three signals coalesce into one observation; the single re-read
    // reflects all three commits.
    assert!(watcher.poll().unwrap());
    assert!(!watcher.poll().unwrap());
    assert_eq!(reader.load().unwrap().total_minutes, 45);
    assert_eq!(reader.sessions().unwrap().len(), 3);
}

#[test]
fn test_degraded_mode_keeps_writer_functioning() {
    let local = TempDir::new().unwrap();
    let bogus_shared = local.path().join("occupied");
    std::fs::write(&bogus_shared, "not a directory").unwrap();

    let gateway = SyncGateway::open_at(&bogus_shared, local.path()).unwrap();
    assert!(gateway.is_degraded());

    let tracker = ProgressTracker::new(gateway);
    let state = tracker.record_session(20, Utc::now()).unwrap();
    assert_eq!(state.total_minutes, 20);
    assert!(tracker.is_degraded().unwrap());
}

#[test]
fn test_corrupt_session_entries_do_not_break_reads() {
    let shared = TempDir::new().unwrap();
    let local = TempDir::new().unwrap();

    // Seed the shared store with a history containing undecodable entries.
    let good_a = Session::new(10, Utc::now()).unwrap();
    let good_b = Session::new(15, Utc::now()).unwrap();
    {
        let store = ProgressStore::open(&shared.path().join(STORE_FILE)).unwrap();
        let list = serde_json::json!([
            good_a.clone(),
            {"duration_min": "ten", "recorded_at": 42},
            good_b.clone(),
            null,
        ]);
        store.kv_set(KEY_SESSIONS, &list.to_string()).unwrap();
    }

    let reader = SyncGateway::open_at(shared.path(), local.path()).unwrap();
    let sessions = reader.sessions().unwrap();
    assert_eq!(sessions, vec![good_a, good_b]);
    assert_eq!(sessions.iter().map(|s| s.duration_min).sum::<u64>(), 25);
}

#[test]
fn test_appends_preserve_entries_the_writer_cannot_decode() {
    let shared = TempDir::new().unwrap();
    let local = TempDir::new().unwrap();

    {
        let store = ProgressStore::open(&shared.path().join(STORE_FILE)).unwrap();
        store
            .kv_set(KEY_SESSIONS, r#"[{"future_field": true}]"#)
            .unwrap();
    }

    let gateway = SyncGateway::open_at(shared.path(), local.path()).unwrap();
    let tracker = ProgressTracker::new(gateway);
    tracker.record_session(5, Utc::now()).unwrap();

    let reader = SyncGateway::open_at(shared.path(), local.path()).unwrap();
    // Raw history keeps both; the decoded view sees the valid one.
    assert_eq!(reader.raw_sessions().unwrap().len(), 2);
    assert_eq!(reader.sessions().unwrap().len(), 1);
}

#[test]
fn test_fresh_shared_store_loads_empty_default() {
    let shared = TempDir::new().unwrap();
    let local = TempDir::new().unwrap();
    let reader = SyncGateway::open_at(shared.path(), local.path()).unwrap();
    assert_eq!(reader.load().unwrap(), AggregateState::default());
}
