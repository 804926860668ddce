use thiserror::Error;

use crate::model::{
    CatalogError, CodeError, ConfigError, DifficultyError, ProgressError, ScoreError,
    SessionItemError,
};

/// Any validation failure raised by the domain model.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Code(#[from] CodeError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Difficulty(#[from] DifficultyError),
    #[error(transparent)]
    SessionItem(#[from] SessionItemError),
    #[error(transparent)]
    Score(#[from] ScoreError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
}
