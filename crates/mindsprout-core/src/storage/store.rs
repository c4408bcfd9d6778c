//! SQLite-backed key/value store for progress data.
//!
//! The persisted schema is a flat namespaced key → JSON value table, shared
//! between the writer and reader processes:
//!
//! | key                 | value                          |
//! |---------------------|--------------------------------|
//! | `total_minutes`     | integer                        |
//! | `current_streak`    | integer                        |
//! | `longest_streak`    | integer                        |
//! | `last_session_date` | RFC 3339 instant, absent until the first session |
//! | `sessions`          | ordered JSON array, append-only |
//!
//! Commits write every key in one transaction so a single subsequent read
//! never observes a torn write. Decoding is defensive: a corrupt session
//! entry or aggregate field is skipped with a warning and the remaining
//! valid data is used, because the reader is a lightweight presentation
//! surface that must never fail an entire render.

use std::path::Path;

use rusqlite::{params, Connection};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::StoreError;
use crate::progress::AggregateState;
use crate::session::Session;

pub const KEY_TOTAL_MINUTES: &str = "total_minutes";
pub const KEY_CURRENT_STREAK: &str = "current_streak";
pub const KEY_LONGEST_STREAK: &str = "longest_streak";
pub const KEY_LAST_SESSION_DATE: &str = "last_session_date";
pub const KEY_SESSIONS: &str = "sessions";

/// SQLite key/value store holding the aggregate state and session history.
pub struct ProgressStore {
    conn: Connection,
}

impl ProgressStore {
    /// Open (or create) the store at `path`.
    ///
    /// # Errors
    /// Returns [`StoreError::Unavailable`] if the database cannot be opened
    /// or migrated.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError::Unavailable {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        // Reads racing a writer commit wait instead of surfacing
        // SQLITE_BUSY; the reader must never fail a render over a
        // transient lock.
        conn.busy_timeout(std::time::Duration::from_secs(5))
            .map_err(|e| StoreError::Unavailable {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        let store = Self { conn };
        store.migrate().map_err(|e| StoreError::Unavailable {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(store)
    }

    /// Open an in-memory store (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(StoreError::from)?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Get a raw value from the kv table.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set a raw value in the kv table.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Decode one aggregate field, falling back to its default when the
    /// stored value is corrupt.
    fn decode_field<T: DeserializeOwned + Default>(key: &str, raw: &str) -> T {
        match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                let err = StoreError::CorruptRecord {
                    key: key.to_string(),
                    message: e.to_string(),
                };
                warn!(%err, "skipping corrupt aggregate field");
                T::default()
            }
        }
    }

    /// Load the most recently committed aggregate state, or the empty
    /// default when nothing has been committed yet.
    ///
    /// All aggregate keys are fetched in a single statement, so the read
    /// is one implicit transaction: racing a writer commit yields either
    /// the previous state or the new one, never a mixture.
    pub fn load_state(&self) -> Result<AggregateState, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, value FROM kv WHERE key IN (?1, ?2, ?3, ?4)")?;
        let mut rows = stmt.query(params![
            KEY_TOTAL_MINUTES,
            KEY_CURRENT_STREAK,
            KEY_LONGEST_STREAK,
            KEY_LAST_SESSION_DATE,
        ])?;

        let mut state = AggregateState::default();
        while let Some(row) = rows.next()? {
            let key: String = row.get(0)?;
            let raw: String = row.get(1)?;
            match key.as_str() {
                KEY_TOTAL_MINUTES => state.total_minutes = Self::decode_field(&key, &raw),
                KEY_CURRENT_STREAK => state.current_streak = Self::decode_field(&key, &raw),
                KEY_LONGEST_STREAK => state.longest_streak = Self::decode_field(&key, &raw),
                KEY_LAST_SESSION_DATE => {
                    state.last_session_date = Self::decode_field(&key, &raw)
                }
                _ => {}
            }
        }
        Ok(state)
    }

    /// Load the stored session list as raw JSON values, preserving entries
    /// this version cannot decode. Used by the writer so an append never
    /// rewrites history it does not understand.
    pub fn load_raw_sessions(&self) -> Result<Vec<serde_json::Value>, StoreError> {
        match self.kv_get(KEY_SESSIONS)? {
            None => Ok(Vec::new()),
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(values) => Ok(values),
                Err(e) => {
                    warn!(error = %e, "session list undecodable as an array; starting empty");
                    Ok(Vec::new())
                }
            },
        }
    }

    /// Load the decoded session history in stored order, skipping corrupt
    /// entries with a warning.
    pub fn load_sessions(&self) -> Result<Vec<Session>, StoreError> {
        let raw = self.load_raw_sessions()?;
        let mut sessions = Vec::with_capacity(raw.len());
        for (index, value) in raw.into_iter().enumerate() {
            match serde_json::from_value::<Session>(value) {
                Ok(s) => sessions.push(s),
                Err(e) => {
                    let err = StoreError::CorruptRecord {
                        key: format!("{KEY_SESSIONS}[{index}]"),
                        message: e.to_string(),
                    };
                    warn!(%err, "skipping corrupt session entry");
                }
            }
        }
        Ok(sessions)
    }

    /// Commit the aggregate state and the full session list in one
    /// transaction. `last_session_date` is removed when absent so readers
    /// see the key as missing, not null-ish.
    ///
    /// # Errors
    /// Returns an error if serialization or the transaction fails; a failed
    /// transaction leaves the previous state intact.
    pub fn commit_progress(
        &mut self,
        state: &AggregateState,
        raw_sessions: &[serde_json::Value],
    ) -> Result<(), StoreError> {
        let total = serde_json::to_string(&state.total_minutes)?;
        let current = serde_json::to_string(&state.current_streak)?;
        let longest = serde_json::to_string(&state.longest_streak)?;
        let last_date = state
            .last_session_date
            .map(|d| serde_json::to_string(&d))
            .transpose()?;
        let sessions = serde_json::to_string(raw_sessions)?;

        let tx = self.conn.transaction()?;
        {
            let mut upsert = tx.prepare("INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)")?;
            upsert.execute(params![KEY_TOTAL_MINUTES, total])?;
            upsert.execute(params![KEY_CURRENT_STREAK, current])?;
            upsert.execute(params![KEY_LONGEST_STREAK, longest])?;
            match last_date {
                Some(d) => {
                    upsert.execute(params![KEY_LAST_SESSION_DATE, d])?;
                }
                None => {
                    tx.execute(
                        "DELETE FROM kv WHERE key = ?1",
                        params![KEY_LAST_SESSION_DATE],
                    )?;
                }
            }
            upsert.execute(params![KEY_SESSIONS, sessions])?;
        }
        tx.commit()?;
        Ok(())
    }
}
