//! Writer-side progress tracker.
//!
//! One `ProgressTracker` is constructed at process start and passed to
//! whatever surface completes sessions (no global singletons). Recording is
//! a critical section: the read-modify-write of the aggregate is serialized
//! through an internal mutex, so two session completions racing inside the
//! writer process cannot under-count minutes or mis-evaluate the streak gap.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::{EngineError, Result};
use crate::gateway::SyncGateway;
use crate::progress::AggregateState;
use crate::session::Session;

/// Writer handle: records sessions, folds the aggregate, commits through
/// the gateway, and fires the change signal.
pub struct ProgressTracker {
    gateway: Mutex<SyncGateway>,
}

impl ProgressTracker {
    pub fn new(gateway: SyncGateway) -> Self {
        Self {
            gateway: Mutex::new(gateway),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, SyncGateway>> {
        self.gateway
            .lock()
            .map_err(|_| EngineError::Custom("progress tracker mutex poisoned".into()))
    }

    /// Record one completed practice session and return the new aggregate.
    ///
    /// Appends the session, folds the aggregate incrementally, commits both
    /// in one transaction, then signals the reader. Commit-then-signal
    /// ordering is required: a reader waking on the signal must see the
    /// already-committed state.
    ///
    /// # Errors
    /// Returns [`EngineError::InvalidDuration`] for a zero duration (the
    /// session is rejected, not retried) or a store error if the commit
    /// fails, in which case nothing was appended.
    pub fn record_session(
        &self,
        duration_min: u64,
        at: DateTime<Utc>,
    ) -> Result<AggregateState> {
        let session = Session::new(duration_min, at)?;

        let mut gateway = self.lock()?;

        let mut state = gateway.load()?;
        let mut raw_sessions = gateway.raw_sessions()?;
        state.apply(&session);
        raw_sessions.push(serde_json::to_value(&session)?);

        gateway.commit(&state, &raw_sessions)?;
        gateway.signal_changed();

        info!(
            duration_min,
            total_minutes = state.total_minutes,
            current_streak = state.current_streak,
            "session recorded"
        );
        Ok(state)
    }

    /// Current aggregate state as committed.
    pub fn state(&self) -> Result<AggregateState> {
        self.lock()?.load()
    }

    /// Full decoded session history (corrupt entries skipped).
    pub fn sessions(&self) -> Result<Vec<Session>> {
        self.lock()?.sessions()
    }

    /// True when the underlying gateway fell back to the local store.
    pub fn is_degraded(&self) -> Result<bool> {
        Ok(self.lock()?.is_degraded())
    }

    /// Erase everything: empty session history, zeroed aggregate, committed
    /// in one transaction, then signaled so readers drop stale views.
    pub fn reset_all_data(&self) -> Result<()> {
        let mut gateway = self.lock()?;
        gateway.commit(&AggregateState::default(), &[])?;
        gateway.signal_changed();
        info!("all progress data reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn tracker() -> (ProgressTracker, TempDir, TempDir) {
        let shared = TempDir::new().unwrap();
        let local = TempDir::new().unwrap();
        let gateway = SyncGateway::open_at(shared.path(), local.path()).unwrap();
        (ProgressTracker::new(gateway), shared, local)
    }

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, day, 8, 0, 0).unwrap()
    }

    #[test]
    fn zero_duration_is_rejected_and_nothing_committed() {
        let (tracker, _s, _l) = tracker();
        assert!(tracker.record_session(0, at(1)).is_err());
        assert_eq!(tracker.state().unwrap(), AggregateState::default());
        assert!(tracker.sessions().unwrap().is_empty());
    }

    #[test]
    fn recording_accumulates_and_persists() {
        let (tracker, _s, _l) = tracker();
        tracker.record_session(10, at(1)).unwrap();
        tracker.record_session(15, at(2)).unwrap();
        let state = tracker.record_session(20, at(3)).unwrap();

        assert_eq!(state.total_minutes, 45);
        assert_eq!(state.current_streak, 3);
        assert_eq!(tracker.sessions().unwrap().len(), 3);
    }

    #[test]
    fn incremental_state_matches_replay_of_history() {
        let (tracker, _s, _l) = tracker();
        for (day, minutes) in [(1, 10), (1, 5), (2, 15), (5, 20), (6, 25)] {
            tracker.record_session(minutes, at(day)).unwrap();
        }
        let committed = tracker.state().unwrap();
        let replayed = AggregateState::replay(&tracker.sessions().unwrap());
        assert_eq!(committed, replayed);
    }

    #[test]
    fn reset_zeroes_everything() {
        let (tracker, _s, _l) = tracker();
        tracker.record_session(30, at(1)).unwrap();
        tracker.reset_all_data().unwrap();
        assert_eq!(tracker.state().unwrap(), AggregateState::default());
        assert!(tracker.sessions().unwrap().is_empty());
    }

    #[test]
    fn concurrent_recordings_are_serialized() {
        use std::sync::Arc;

        let shared = TempDir::new().unwrap();
        let local = TempDir::new().unwrap();
        let gateway = SyncGateway::open_at(shared.path(), local.path()).unwrap();
        let tracker = Arc::new(ProgressTracker::new(gateway));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let tracker = Arc::clone(&tracker);
            handles.push(std::thread::spawn(move || {
                tracker.record_session(5, at(1)).unwrap();
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let state = tracker.state().unwrap();
        assert_eq!(state.total_minutes, 40);
        assert_eq!(tracker.sessions().unwrap().len(), 8);
    }
}
