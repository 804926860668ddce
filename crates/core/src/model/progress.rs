use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::model::ids::{TranslationId, UserId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProgressError {
    #[error("persisted {field} out of range: {value}")]
    InvalidCount { field: &'static str, value: i64 },
}

/// Cumulative learning state for one (user, translation) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressRecord {
    user_id: UserId,
    translation_id: TranslationId,
    correct_count: u32,
    incorrect_count: u32,
    last_reviewed: DateTime<Utc>,
}

impl ProgressRecord {
    /// A fresh record with zero counters, as created on first review.
    #[must_use]
    pub fn new(user_id: UserId, translation_id: TranslationId, at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            translation_id,
            correct_count: 0,
            incorrect_count: 0,
            last_reviewed: at,
        }
    }

    /// Rehydrate from storage.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::InvalidCount` if a counter is negative or
    /// does not fit in `u32`.
    pub fn from_persisted(
        user_id: UserId,
        translation_id: TranslationId,
        correct_count: i64,
        incorrect_count: i64,
        last_reviewed: DateTime<Utc>,
    ) -> Result<Self, ProgressError> {
        let count = |field: &'static str, value: i64| {
            u32::try_from(value).map_err(|_| ProgressError::InvalidCount { field, value })
        };
        Ok(Self {
            user_id,
            translation_id,
            correct_count: count("correct_count", correct_count)?,
            incorrect_count: count("incorrect_count", incorrect_count)?,
            last_reviewed,
        })
    }

    /// Count one answer and stamp the review time.
    pub fn record(&mut self, correct: bool, at: DateTime<Utc>) {
        if correct {
            self.correct_count = self.correct_count.saturating_add(1);
        } else {
            self.incorrect_count = self.incorrect_count.saturating_add(1);
        }
        self.last_reviewed = at;
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn translation_id(&self) -> TranslationId {
        self.translation_id
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn incorrect_count(&self) -> u32 {
        self.incorrect_count
    }

    #[must_use]
    pub fn last_reviewed(&self) -> DateTime<Utc> {
        self.last_reviewed
    }

    #[must_use]
    pub fn reviews(&self) -> u64 {
        u64::from(self.correct_count) + u64::from(self.incorrect_count)
    }
}
