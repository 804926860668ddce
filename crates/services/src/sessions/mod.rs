mod eligibility;
mod generator;
mod queries;
mod submission;

// Public API of the session engine.
pub use crate::error::SessionError;
pub use eligibility::EligibilityResolver;
pub use generator::{GeneratorSettings, SessionGenerator};
pub use queries::SessionQueries;
pub use submission::SubmissionProcessor;

use storage::repository::SessionRepository;
use vocab_core::model::{Session, SessionId, UserId};

/// Load a session and check that `user_id` owns it.
pub(crate) async fn load_owned(
    sessions: &dyn SessionRepository,
    user_id: UserId,
    session_id: SessionId,
) -> Result<Session, SessionError> {
    let session = sessions.get_session(session_id).await?;
    if session.user_id() != user_id {
        return Err(SessionError::Forbidden);
    }
    Ok(session)
}
