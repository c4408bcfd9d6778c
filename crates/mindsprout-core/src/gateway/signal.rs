//! Payload-less change signal between the writer and reader processes.
//!
//! The writer bumps a counter file after every successful commit; the reader
//! compares the counter against the last value it observed. The counter is
//! never interpreted beyond inequality, so the channel stays payload-less:
//! a reader that wakes must always re-read full state from the store.
//!
//! Rapid signals coalesce naturally (the reader sees one change), and a
//! signal persists until observed, so a reader that was not scheduled when
//! the writer fired still notices on its next wake.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::Result;

pub const SIGNAL_FILE: &str = "progress.signal";

/// Writer side: fire-and-forget change broadcasts.
#[derive(Debug, Clone)]
pub struct ChangeSignal {
    path: PathBuf,
}

impl ChangeSignal {
    /// Signal file inside `dir` (conventionally beside the shared store).
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(SIGNAL_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Broadcast that committed state has changed. Fire-and-forget: no
    /// acknowledgment, no delivery-time guarantee. A failure to write is
    /// logged and swallowed; the commit it follows has already succeeded.
    pub fn notify(&self) {
        let next = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw.trim().parse::<u64>().unwrap_or(0).wrapping_add(1),
            Err(_) => 1,
        };
        if let Err(e) = std::fs::write(&self.path, next.to_string()) {
            warn!(path = %self.path.display(), error = %e, "change signal not delivered");
        }
    }
}

/// Reader side: detects that at least one signal fired since the last check.
#[derive(Debug)]
pub struct SignalWatcher {
    path: PathBuf,
    last_seen: Option<String>,
}

impl SignalWatcher {
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(SIGNAL_FILE),
            last_seen: None,
        }
    }

    fn current(&self) -> Option<String> {
        std::fs::read_to_string(&self.path).ok()
    }

    /// Returns true if the signal changed since the last call (or since
    /// construction). Consuming: a change is reported once.
    pub fn poll(&mut self) -> Result<bool> {
        let current = self.current();
        let changed = current != self.last_seen && current.is_some();
        if changed {
            self.last_seen = current;
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn watcher_sees_nothing_before_first_signal() {
        let dir = TempDir::new().unwrap();
        let mut watcher = SignalWatcher::new(dir.path());
        assert!(!watcher.poll().unwrap());
    }

    #[test]
    fn signal_observed_once_then_quiet() {
        let dir = TempDir::new().unwrap();
        let signal = ChangeSignal::new(dir.path());
        let mut watcher = SignalWatcher::new(dir.path());

        signal.notify();
        assert!(watcher.poll().unwrap());
        assert!(!watcher.poll().unwrap());
    }

    #[test]
    fn rapid_signals_coalesce_into_one_observation() {
        let dir = TempDir::new().unwrap();
        let signal = ChangeSignal::new(dir.path());
        let mut watcher = SignalWatcher::new(dir.path());

        signal.notify();
        signal.notify();
        signal.notify();
        assert!(watcher.poll().unwrap());
        assert!(!watcher.poll().unwrap());
    }

    #[test]
    fn signal_persists_until_observed() {
        let dir = TempDir::new().unwrap();
        let signal = ChangeSignal::new(dir.path());
        signal.notify();

        // Watcher constructed after the signal fired still notices it.
        let mut late_watcher = SignalWatcher::new(dir.path());
        assert!(late_watcher.poll().unwrap());
    }
}
