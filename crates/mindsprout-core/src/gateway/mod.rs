//! Synchronization gateway between the writer and reader processes.
//!
//! The two processes share no memory and have no call path into each other;
//! this durable store plus the change signal is the only channel. The writer
//! commits the full aggregate state and session history in one transaction,
//! then fires the signal; the reader re-reads full state whenever it wakes.
//!
//! ## Ownership contract
//!
//! Exactly one process (the app process) ever calls [`SyncGateway::commit`].
//! Commit relies on SQLite transaction atomicity only -- sufficient under a
//! single logical writer. A deployment that adds a second writer process
//! must upgrade commit to a compare-and-swap discipline (e.g. a generation
//! value checked inside the transaction); that is deliberately not built.
//!
//! ## Degraded mode
//!
//! If the shared directory cannot host a store (platform misconfiguration),
//! the gateway falls back to a process-local store so the writer keeps
//! functioning. The fallback breaks cross-process visibility and is never
//! silent: it is logged and exposed via [`SyncGateway::is_degraded`].

mod signal;

pub use signal::{ChangeSignal, SignalWatcher, SIGNAL_FILE};

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{Result, StoreError};
use crate::progress::AggregateState;
use crate::session::Session;
use crate::storage::{Config, ProgressStore};

pub const STORE_FILE: &str = "progress.db";
const LOCAL_FALLBACK_FILE: &str = "progress-local.db";

/// Durable shared store plus the invalidation signal.
pub struct SyncGateway {
    store: ProgressStore,
    signal: ChangeSignal,
    store_path: PathBuf,
    degraded: bool,
}

impl SyncGateway {
    /// Open the gateway for the configured shared directory, falling back to
    /// the process-local data directory if the shared store is unavailable.
    ///
    /// # Errors
    /// Returns an error only if the local fallback cannot be opened either.
    pub fn open(config: &Config) -> Result<Self> {
        let shared = config.shared_dir()?;
        let local = crate::storage::data_dir()?;
        Self::open_at(&shared, &local)
    }

    /// Open with explicit directories (shared first, local fallback second).
    ///
    /// # Errors
    /// Returns an error only if the local fallback cannot be opened either.
    pub fn open_at(shared_dir: &Path, local_dir: &Path) -> Result<Self> {
        let shared_path = shared_dir.join(STORE_FILE);
        match ProgressStore::open(&shared_path) {
            Ok(store) => Ok(Self {
                store,
                signal: ChangeSignal::new(shared_dir),
                store_path: shared_path,
                degraded: false,
            }),
            Err(StoreError::Unavailable { path, message }) => {
                warn!(
                    shared = %path.display(),
                    error = %message,
                    "shared store unavailable; falling back to process-local store"
                );
                let local_path = local_dir.join(LOCAL_FALLBACK_FILE);
                let store = ProgressStore::open(&local_path)?;
                Ok(Self {
                    store,
                    signal: ChangeSignal::new(local_dir),
                    store_path: local_path,
                    degraded: true,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// True when the gateway fell back to the process-local store. Commits
    /// still succeed in this mode but are invisible to the reader process.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Path of the store actually in use.
    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    /// Path of the signal file actually in use.
    pub fn signal_path(&self) -> &Path {
        self.signal.path()
    }

    /// Atomically commit the aggregate state and session history. A reader
    /// performing a single subsequent read sees either the previous commit
    /// or this one, never a mixture.
    pub fn commit(
        &mut self,
        state: &AggregateState,
        raw_sessions: &[serde_json::Value],
    ) -> Result<()> {
        self.store.commit_progress(state, raw_sessions)?;
        Ok(())
    }

    /// Fire the payload-less invalidation signal. Called by the writer
    /// immediately after a successful commit, never before.
    pub fn signal_changed(&self) {
        self.signal.notify();
    }

    /// Most recently committed state visible to this process, or the empty
    /// default when nothing has been committed yet.
    pub fn load(&self) -> Result<AggregateState> {
        Ok(self.store.load_state()?)
    }

    /// Decoded session history (corrupt entries skipped).
    pub fn sessions(&self) -> Result<Vec<Session>> {
        Ok(self.store.load_sessions()?)
    }

    /// Raw session history, preserving undecodable entries. Writer-side use
    /// only: appends must never drop history they cannot decode.
    pub fn raw_sessions(&self) -> Result<Vec<serde_json::Value>> {
        Ok(self.store.load_raw_sessions()?)
    }

    /// A watcher for this gateway's signal, for the reader process.
    pub fn watcher(&self) -> SignalWatcher {
        SignalWatcher::new(
            self.signal
                .path()
                .parent()
                .unwrap_or_else(|| Path::new(".")),
        )
    }
}
