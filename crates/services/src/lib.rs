#![forbid(unsafe_code)]

pub mod app_services;
pub mod config_service;
pub mod error;
pub mod progress_service;
pub mod sessions;

pub use vocab_core::Clock;

pub use app_services::AppServices;
pub use config_service::SessionConfigService;
pub use error::{AppServicesError, ProgressError, SessionError};
pub use progress_service::{ProgressSummary, ProgressTracker};
pub use sessions::{
    EligibilityResolver, GeneratorSettings, SessionGenerator, SessionQueries,
    SubmissionProcessor,
};
