use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::config_service::SessionConfigService;
use crate::error::AppServicesError;
use crate::progress_service::ProgressTracker;
use crate::sessions::{GeneratorSettings, SessionGenerator, SessionQueries, SubmissionProcessor};

/// Assembles the session engine over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    storage: Storage,
    configs: Arc<SessionConfigService>,
    generator: Arc<SessionGenerator>,
    submissions: Arc<SubmissionProcessor>,
    queries: Arc<SessionQueries>,
    progress: Arc<ProgressTracker>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        settings: GeneratorSettings,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(storage, clock, settings))
    }

    #[must_use]
    pub fn in_memory(clock: Clock, settings: GeneratorSettings) -> Self {
        Self::from_storage(Storage::in_memory(), clock, settings)
    }

    #[must_use]
    pub fn from_storage(storage: Storage, clock: Clock, settings: GeneratorSettings) -> Self {
        let configs = Arc::new(SessionConfigService::new(
            clock,
            Arc::clone(&storage.configs),
        ));
        let generator = Arc::new(
            SessionGenerator::new(
                clock,
                Arc::clone(&storage.catalog),
                Arc::clone(&storage.configs),
                Arc::clone(&storage.sessions),
            )
            .with_settings(settings),
        );
        let submissions = Arc::new(SubmissionProcessor::new(
            clock,
            Arc::clone(&storage.sessions),
            Arc::clone(&storage.submissions),
        ));
        let queries = Arc::new(SessionQueries::new(Arc::clone(&storage.sessions)));
        let progress = Arc::new(ProgressTracker::new(clock, Arc::clone(&storage.progress)));

        Self {
            storage,
            configs,
            generator,
            submissions,
            queries,
            progress,
        }
    }

    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    #[must_use]
    pub fn configs(&self) -> Arc<SessionConfigService> {
        Arc::clone(&self.configs)
    }

    #[must_use]
    pub fn generator(&self) -> Arc<SessionGenerator> {
        Arc::clone(&self.generator)
    }

    #[must_use]
    pub fn submissions(&self) -> Arc<SubmissionProcessor> {
        Arc::clone(&self.submissions)
    }

    #[must_use]
    pub fn queries(&self) -> Arc<SessionQueries> {
        Arc::clone(&self.queries)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressTracker> {
        Arc::clone(&self.progress)
    }
}
