use chrono::{DateTime, Utc};

use super::ids::UserId;

/// Persisted best quiz result for a user.
///
/// `max_quiz_score` is monotonically non-decreasing: it is replaced only by
/// a strictly greater score. Ties keep the stored value and do not count as
/// a new high score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighScoreRecord {
    user_id: UserId,
    max_quiz_score: u32,
    last_quiz_date: DateTime<Utc>,
}

impl HighScoreRecord {
    #[must_use]
    pub fn new(user_id: UserId, max_quiz_score: u32, last_quiz_date: DateTime<Utc>) -> Self {
        Self {
            user_id,
            max_quiz_score,
            last_quiz_date,
        }
    }

    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    #[must_use]
    pub fn max_quiz_score(&self) -> u32 {
        self.max_quiz_score
    }

    #[must_use]
    pub fn last_quiz_date(&self) -> DateTime<Utc> {
        self.last_quiz_date
    }
}
