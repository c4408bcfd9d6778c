//! Aggregate progress state and the fold that maintains it.
//!
//! [`AggregateState`] is a pure function of the session history: applying
//! sessions one at a time to the running state gives the same result as
//! replaying the whole history from empty. The streak rule operates on
//! calendar days (UTC), not elapsed hours, so two sessions at 23:59 and
//! 00:01 on consecutive days extend the streak while two sessions eight
//! hours apart on the same day do not.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::Session;

/// Derived progress state, maintained by the writer and mirrored to the
/// reader through the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AggregateState {
    /// Sum of all recorded session durations. Monotonically non-decreasing.
    pub total_minutes: u64,
    /// Consecutive calendar days (ending at the last session) with at least
    /// one session.
    pub current_streak: u32,
    /// High-water mark of `current_streak`. Always >= `current_streak`.
    pub longest_streak: u32,
    /// Timestamp of the most recent session, absent until the first one.
    pub last_session_date: Option<DateTime<Utc>>,
}

impl AggregateState {
    /// Fold one session into the state.
    ///
    /// Streak rule, evaluated against UTC calendar days:
    /// - no prior session: streak starts at 1
    /// - same day as the last session: unchanged
    /// - exactly the next calendar day: +1
    /// - anything else (gap of two or more days, or a timestamp earlier than
    ///   the last session): reset to 1, never negative
    pub fn apply(&mut self, session: &Session) {
        self.total_minutes += session.duration_min;

        let day = session.recorded_at.date_naive();
        self.current_streak = match self.last_session_date {
            None => 1,
            Some(last) => {
                let gap_days = (day - last.date_naive()).num_days();
                match gap_days {
                    0 => self.current_streak,
                    1 => self.current_streak + 1,
                    _ => 1,
                }
            }
        };
        self.longest_streak = self.longest_streak.max(self.current_streak);
        self.last_session_date = Some(session.recorded_at);
    }

    /// Recompute the state from scratch by replaying a session history.
    ///
    /// Equivalent to folding each session via [`apply`](Self::apply) in
    /// order, starting from the empty state.
    pub fn replay<'a>(sessions: impl IntoIterator<Item = &'a Session>) -> Self {
        let mut state = Self::default();
        for session in sessions {
            state.apply(session);
        }
        state
    }
}
