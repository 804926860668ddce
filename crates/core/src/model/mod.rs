mod concept;
mod config;
mod difficulty;
mod ids;
mod language;
mod progress;
mod score;
mod session;

pub use ids::{
    ConceptId, ParseIdError, SessionConfigId, SessionId, SessionItemId, TranslationId, UserId,
};

pub use concept::{CatalogError, Concept, MediaRef, NewConcept, NewTranslation, Translation, WordType};
pub use config::{
    ConfigError, SelectionCriteria, SessionConfig, SessionConfigDraft, SessionKind,
    ValidatedSessionConfig,
};
pub use difficulty::{Difficulty, DifficultyError, DifficultyMatch};
pub use language::{CodeError, Domain, DomainCode, DomainFilter, Language, LanguageCode};
pub use progress::{ProgressError, ProgressRecord};
pub use score::{Score, ScoreError};
pub use session::{
    Session, SessionHeader, SessionItem, SessionItemError, SessionOverview, SessionState,
};
