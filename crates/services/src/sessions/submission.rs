use std::sync::Arc;

use storage::repository::{SessionRepository, SubmissionPersistence, SubmissionRecord};
use tracing::{info, instrument};
use vocab_core::grading::Answer;
use vocab_core::model::{Session, SessionId, UserId};

use super::load_owned;
use crate::Clock;
use crate::error::SessionError;

/// Grades answer batches and records them against a session.
#[derive(Clone)]
pub struct SubmissionProcessor {
    clock: Clock,
    sessions: Arc<dyn SessionRepository>,
    submissions: Arc<dyn SubmissionPersistence>,
}

impl SubmissionProcessor {
    #[must_use]
    pub fn new(
        clock: Clock,
        sessions: Arc<dyn SessionRepository>,
        submissions: Arc<dyn SubmissionPersistence>,
    ) -> Self {
        Self {
            clock,
            sessions,
            submissions,
        }
    }

    /// Apply `answers` to the session and return it reloaded.
    ///
    /// Answers for translations outside the session are dropped. Item
    /// results, the score, the completion time and the progress counters
    /// are written in one unit of work. Every call counts towards progress,
    /// so resubmitting the same answers counts them again.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotFound` if the session does not exist,
    /// `SessionError::Forbidden` if it belongs to another user and
    /// `SessionError::InvalidInput` if `answers` is empty.
    #[instrument(skip(self, answers), fields(answers = answers.len()))]
    pub async fn submit(
        &self,
        user_id: UserId,
        session_id: SessionId,
        answers: Vec<Answer>,
    ) -> Result<Session, SessionError> {
        load_owned(self.sessions.as_ref(), user_id, session_id).await?;
        if answers.is_empty() {
            return Err(SessionError::InvalidInput(
                "submission contains no answers".into(),
            ));
        }

        let record = SubmissionRecord {
            session_id,
            user_id,
            answers,
            submitted_at: self.clock.now(),
        };
        let grading = self.submissions.apply_submission(&record).await?;
        info!(
            session_id = %session_id,
            user_id = %user_id,
            matched = grading.total,
            correct = grading.correct,
            dropped = grading.dropped,
            score = grading.score.value(),
            "session submitted"
        );

        Ok(self.sessions.get_session(session_id).await?)
    }
}
