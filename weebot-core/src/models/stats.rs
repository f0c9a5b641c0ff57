use serde::{Deserialize, Serialize};

use super::session::Session;

/// Aggregates derived from a set of sessions. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub total_sessions: usize,
    /// Sum of durations in seconds
    pub total_duration: u64,
    /// Rounded mean score, 0-100. Sessions without a score count as 0.
    pub average_score: u8,
}

impl SessionStats {
    pub fn from_sessions<'a, I>(sessions: I) -> Self
    where
        I: IntoIterator<Item = &'a Session>,
    {
        let mut total_sessions = 0usize;
        let mut total_duration = 0u64;
        let mut score_sum = 0u64;

        for s in sessions {
            total_sessions += 1;
            total_duration = total_duration.saturating_add(s.duration());
            score_sum += u64::from(s.score().unwrap_or(0));
        }

        let average_score = if total_sessions == 0 {
            0
        } else {
            let n = total_sessions as u64;
            // half-up rounding of score_sum / n
            ((score_sum * 2 + n) / (n * 2)).min(100) as u8
        };

        Self {
            total_sessions,
            total_duration,
            average_score,
        }
    }
}
