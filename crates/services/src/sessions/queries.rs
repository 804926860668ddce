use std::sync::Arc;

use storage::repository::SessionRepository;
use vocab_core::model::{Difficulty, Session, SessionId, SessionOverview, UserId};

use super::load_owned;
use crate::error::SessionError;

/// Read side of the session engine.
#[derive(Clone)]
pub struct SessionQueries {
    sessions: Arc<dyn SessionRepository>,
}

impl SessionQueries {
    #[must_use]
    pub fn new(sessions: Arc<dyn SessionRepository>) -> Self {
        Self { sessions }
    }

    /// Fetch one of `user_id`'s sessions with its items.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotFound` if the session does not exist and
    /// `SessionError::Forbidden` if it belongs to another user.
    pub async fn get_session(
        &self,
        user_id: UserId,
        session_id: SessionId,
    ) -> Result<Session, SessionError> {
        load_owned(self.sessions.as_ref(), user_id, session_id).await
    }

    /// The user's sessions, newest first.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if repository access fails.
    pub async fn list_sessions(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<SessionOverview>, SessionError> {
        Ok(self.sessions.list_sessions(user_id, limit).await?)
    }

    /// Difficulty tiers in ascending order.
    #[must_use]
    pub fn difficulties() -> [Difficulty; 3] {
        Difficulty::ALL
    }
}
