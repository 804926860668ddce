use std::sync::Arc;

use serde::Serialize;
use storage::repository::ProgressRepository;
use tracing::debug;
use vocab_core::model::{ProgressRecord, TranslationId, UserId};

use crate::Clock;
use crate::error::ProgressError;

/// Aggregate of a user's progress records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressSummary {
    pub translations: usize,
    pub correct: u64,
    pub incorrect: u64,
    /// Share of correct answers in `[0, 1]`, `0` before any review.
    pub accuracy: f64,
}

impl ProgressSummary {
    #[must_use]
    pub fn from_records(records: &[ProgressRecord]) -> Self {
        let correct: u64 = records.iter().map(|r| u64::from(r.correct_count())).sum();
        let incorrect: u64 = records
            .iter()
            .map(|r| u64::from(r.incorrect_count()))
            .sum();
        let total = correct + incorrect;
        #[allow(clippy::cast_precision_loss)]
        let accuracy = if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64
        };
        Self {
            translations: records.len(),
            correct,
            incorrect,
            accuracy,
        }
    }
}

/// Per-user, per-translation answer counters.
///
/// `record` is the standalone entry point to the same atomic increment that
/// `apply_submission` performs inside its transaction.
#[derive(Clone)]
pub struct ProgressTracker {
    clock: Clock,
    progress: Arc<dyn ProgressRepository>,
}

impl ProgressTracker {
    #[must_use]
    pub fn new(clock: Clock, progress: Arc<dyn ProgressRepository>) -> Self {
        Self { clock, progress }
    }

    /// Count one answer, creating the record on first use. Counts add to
    /// whatever submissions have already recorded for the pair.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if persistence fails.
    pub async fn record(
        &self,
        user_id: UserId,
        translation_id: TranslationId,
        correct: bool,
    ) -> Result<ProgressRecord, ProgressError> {
        let record = self
            .progress
            .record_answer(user_id, translation_id, correct, self.clock.now())
            .await?;
        debug!(
            user_id = %user_id,
            translation_id = %translation_id,
            correct,
            reviews = record.reviews(),
            "progress recorded"
        );
        Ok(record)
    }

    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if repository access fails.
    pub async fn progress_for(&self, user_id: UserId) -> Result<Vec<ProgressRecord>, ProgressError> {
        Ok(self.progress.list_progress(user_id).await?)
    }

    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if repository access fails.
    pub async fn progress_summary(&self, user_id: UserId) -> Result<ProgressSummary, ProgressError> {
        let records = self.progress.list_progress(user_id).await?;
        Ok(ProgressSummary::from_records(&records))
    }
}
