//! Reader-side materialized view.
//!
//! The snapshot provider runs in the presentation process (home-screen /
//! lock-screen surface). It never mutates anything: it reads the gateway,
//! applies the milestone resolver, and packages the result. Refresh is
//! driven by the writer's change signal through an explicit state machine:
//!
//! ```text
//! Idle -> Invalidated -> Refreshed -> Idle
//! ```
//!
//! There is no timer in the nominal design -- practice totals change only
//! when the writer records a session, so the provider relies exclusively on
//! invalidation. An optional periodic interval (config safety net, off by
//! default) folds into the same `Invalidated` path.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::gateway::{SignalWatcher, SyncGateway};
use crate::milestone::MilestoneTable;
use crate::progress::AggregateState;

/// Refresh cycle of the snapshot provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshState {
    /// The last snapshot is considered current.
    Idle,
    /// A change signal (or periodic re-evaluation) was observed; the next
    /// poll recomputes.
    Invalidated,
    /// A snapshot was just recomputed; settles back to `Idle`.
    Refreshed,
}

/// Point-in-time view of aggregate + milestone state. Ephemeral: recomputed
/// on every read, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub as_of: DateTime<Utc>,
    pub state: AggregateState,
    pub stage_name: String,
    pub icon: String,
    pub next_stage_threshold: Option<u64>,
    pub progress_fraction: f64,
    /// True for the fixed bootstrap view rendered before any real data
    /// exists. Never authoritative, never persisted.
    pub placeholder: bool,
}

impl Snapshot {
    /// Fixed non-authoritative snapshot for empty-state rendering.
    pub fn placeholder(as_of: DateTime<Utc>, table: &MilestoneTable) -> Self {
        let resolution = table.resolve(0);
        Self {
            as_of,
            state: AggregateState::default(),
            stage_name: resolution.stage.name,
            icon: resolution.stage.icon,
            next_stage_threshold: resolution.next_threshold,
            progress_fraction: resolution.progress_fraction,
            placeholder: true,
        }
    }
}

/// Read-only provider for the presentation process.
pub struct SnapshotProvider {
    gateway: SyncGateway,
    table: MilestoneTable,
    watcher: SignalWatcher,
    refresh_state: RefreshState,
    periodic: Option<Duration>,
    last_refreshed: Option<DateTime<Utc>>,
}

impl SnapshotProvider {
    pub fn new(gateway: SyncGateway, table: MilestoneTable) -> Self {
        let watcher = gateway.watcher();
        Self {
            gateway,
            table,
            watcher,
            refresh_state: RefreshState::Idle,
            periodic: None,
            last_refreshed: None,
        }
    }

    /// Enable the periodic safety-net refresh. Not the primary contract:
    /// the signal remains the trigger readers should rely on.
    pub fn with_periodic_refresh(mut self, interval_secs: u64) -> Self {
        self.periodic = Some(Duration::seconds(interval_secs as i64));
        self
    }

    pub fn refresh_state(&self) -> RefreshState {
        self.refresh_state
    }

    /// Compute a snapshot of the committed state as of `as_of`. Pure read;
    /// does not advance the refresh cycle.
    pub fn snapshot(&self, as_of: DateTime<Utc>) -> Result<Snapshot> {
        let state = self.gateway.load()?;
        let resolution = self.table.resolve(state.total_minutes);
        Ok(Snapshot {
            as_of,
            state,
            stage_name: resolution.stage.name,
            icon: resolution.stage.icon,
            next_stage_threshold: resolution.next_threshold,
            progress_fraction: resolution.progress_fraction,
            placeholder: false,
        })
    }

    /// Fixed bootstrap snapshot (see [`Snapshot::placeholder`]).
    pub fn placeholder(&self, as_of: DateTime<Utc>) -> Snapshot {
        Snapshot::placeholder(as_of, &self.table)
    }

    fn periodic_due(&self, now: DateTime<Utc>) -> bool {
        match (self.periodic, self.last_refreshed) {
            (Some(interval), Some(last)) => now - last >= interval,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    /// One turn of the refresh cycle, called at host-determined wake-ups.
    ///
    /// Observes the change signal (and the periodic safety net if enabled),
    /// recomputes when invalidated, and returns the fresh snapshot in that
    /// case. Returns `None` when the last snapshot is still current.
    pub fn poll(&mut self, now: DateTime<Utc>) -> Result<Option<Snapshot>> {
        if self.refresh_state == RefreshState::Refreshed {
            self.refresh_state = RefreshState::Idle;
        }
        if self.watcher.poll()? || self.periodic_due(now) {
            self.refresh_state = RefreshState::Invalidated;
        }
        if self.refresh_state == RefreshState::Invalidated {
            let snapshot = self.snapshot(now)?;
            self.refresh_state = RefreshState::Refreshed;
            self.last_refreshed = Some(now);
            return Ok(Some(snapshot));
        }
        Ok(None)
    }
}
