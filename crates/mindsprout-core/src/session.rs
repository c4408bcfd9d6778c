//! Completed practice sessions.
//!
//! A [`Session`] is the single kind of event in the system: one finished
//! practice interval with a timestamp and a duration. Sessions are immutable
//! once appended; the store keeps them as an append-only ordered list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// One completed practice session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// When the session completed.
    pub recorded_at: DateTime<Utc>,
    /// Practice duration in whole minutes. Always > 0 for stored sessions.
    pub duration_min: u64,
}

impl Session {
    /// Create a session, rejecting non-positive durations.
    ///
    /// # Errors
    /// Returns [`EngineError::InvalidDuration`] if `duration_min` is zero.
    pub fn new(duration_min: u64, recorded_at: DateTime<Utc>) -> Result<Self> {
        if duration_min == 0 {
            return Err(EngineError::InvalidDuration {
                minutes: duration_min,
            });
        }
        Ok(Self {
            recorded_at,
            duration_min,
        })
    }
}
