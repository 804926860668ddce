use std::sync::Arc;

use storage::repository::SessionConfigRepository;
use tracing::{debug, instrument};
use vocab_core::model::{SessionConfig, SessionConfigDraft, UserId};

use crate::Clock;
use crate::error::SessionError;

/// Validates and stores session configs.
#[derive(Clone)]
pub struct SessionConfigService {
    clock: Clock,
    configs: Arc<dyn SessionConfigRepository>,
}

impl SessionConfigService {
    #[must_use]
    pub fn new(clock: Clock, configs: Arc<dyn SessionConfigRepository>) -> Self {
        Self { clock, configs }
    }

    /// Validate `draft` for `user_id` and persist it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidInput` for malformed or identical
    /// languages, a blank domain or an unknown difficulty.
    /// Returns `SessionError::Storage` if persistence fails.
    #[instrument(skip(self))]
    pub async fn create_config(
        &self,
        user_id: UserId,
        draft: SessionConfigDraft,
    ) -> Result<SessionConfig, SessionError> {
        let validated = draft.validate(user_id, self.clock.now())?;
        let id = self.configs.insert_config(&validated).await?;
        debug!(config_id = %id, "session config stored");
        Ok(validated.assign_id(id))
    }
}
