use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::difficulty::{Difficulty, DifficultyError, DifficultyMatch};
use crate::model::ids::{SessionConfigId, UserId};
use crate::model::language::{CodeError, DomainFilter, LanguageCode};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid native language: {0}")]
    NativeLanguage(#[source] CodeError),

    #[error("invalid tested language: {0}")]
    TestedLanguage(#[source] CodeError),

    #[error("native and tested language must differ (both are {0})")]
    SameLanguage(LanguageCode),

    #[error("invalid domain: {0}")]
    Domain(#[source] CodeError),

    #[error(transparent)]
    Difficulty(#[from] DifficultyError),

    #[error("invalid session kind: {0}")]
    Kind(String),
}

//
// ─── SESSION KIND ──────────────────────────────────────────────────────────────
//

/// Direction of the quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionKind {
    /// Prompt in the tested language, answer in the native one.
    Comprehension,
    /// Prompt in the native language, answer in the tested one.
    Expression,
    Mixed,
}

impl SessionKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SessionKind::Comprehension => "COMPREHENSION",
            SessionKind::Expression => "EXPRESSION",
            SessionKind::Mixed => "MIXED",
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        [
            SessionKind::Comprehension,
            SessionKind::Expression,
            SessionKind::Mixed,
        ]
        .into_iter()
        .find(|k| k.as_str().eq_ignore_ascii_case(trimmed))
        .ok_or_else(|| ConfigError::Kind(trimmed.to_owned()))
    }
}

//
// ─── CONFIG TYPES ──────────────────────────────────────────────────────────────
//

/// Unvalidated selection criteria as received from a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfigDraft {
    pub native_language: String,
    pub tested_language: String,
    pub difficulty: Option<String>,
    pub domain: Option<String>,
    pub kind: SessionKind,
}

impl SessionConfigDraft {
    /// Validate the draft for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for malformed language codes, identical
    /// languages, a blank domain or an unknown difficulty.
    pub fn validate(
        self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<ValidatedSessionConfig, ConfigError> {
        let native_language =
            LanguageCode::parse(&self.native_language).map_err(ConfigError::NativeLanguage)?;
        let tested_language =
            LanguageCode::parse(&self.tested_language).map_err(ConfigError::TestedLanguage)?;
        if native_language == tested_language {
            return Err(ConfigError::SameLanguage(native_language));
        }

        let domain = DomainFilter::parse(self.domain.as_deref()).map_err(ConfigError::Domain)?;
        let difficulty = self
            .difficulty
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .map(str::parse::<Difficulty>)
            .transpose()?;

        Ok(ValidatedSessionConfig {
            user_id,
            native_language,
            tested_language,
            difficulty,
            domain,
            kind: self.kind,
            created_at: now,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSessionConfig {
    pub user_id: UserId,
    pub native_language: LanguageCode,
    pub tested_language: LanguageCode,
    pub difficulty: Option<Difficulty>,
    pub domain: DomainFilter,
    pub kind: SessionKind,
    pub created_at: DateTime<Utc>,
}

impl ValidatedSessionConfig {
    #[must_use]
    pub fn assign_id(self, id: SessionConfigId) -> SessionConfig {
        SessionConfig {
            id,
            user_id: self.user_id,
            native_language: self.native_language,
            tested_language: self.tested_language,
            difficulty: self.difficulty,
            domain: self.domain,
            kind: self.kind,
            created_at: self.created_at,
        }
    }
}

/// Saved selection criteria for one quiz attempt. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub id: SessionConfigId,
    pub user_id: UserId,
    pub native_language: LanguageCode,
    pub tested_language: LanguageCode,
    pub difficulty: Option<Difficulty>,
    pub domain: DomainFilter,
    pub kind: SessionKind,
    pub created_at: DateTime<Utc>,
}

impl SessionConfig {
    /// Selection criteria for this config. The native language is shown,
    /// the tested language is expected.
    #[must_use]
    pub fn criteria(&self, difficulty_match: DifficultyMatch) -> SelectionCriteria {
        SelectionCriteria {
            source: self.native_language.clone(),
            target: self.tested_language.clone(),
            domain: self.domain.clone(),
            difficulty: self.difficulty,
            difficulty_match,
        }
    }
}

/// Filters applied by the eligibility resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionCriteria {
    pub source: LanguageCode,
    pub target: LanguageCode,
    pub domain: DomainFilter,
    pub difficulty: Option<Difficulty>,
    pub difficulty_match: DifficultyMatch,
}

impl SelectionCriteria {
    #[must_use]
    pub fn new(source: LanguageCode, target: LanguageCode) -> Self {
        Self {
            source,
            target,
            domain: DomainFilter::All,
            difficulty: None,
            difficulty_match: DifficultyMatch::Ceiling,
        }
    }

    #[must_use]
    pub fn with_domain(mut self, domain: DomainFilter) -> Self {
        self.domain = domain;
        self
    }

    #[must_use]
    pub fn with_difficulty(mut self, difficulty: Option<Difficulty>) -> Self {
        self.difficulty = difficulty;
        self
    }

    #[must_use]
    pub fn with_difficulty_match(mut self, difficulty_match: DifficultyMatch) -> Self {
        self.difficulty_match = difficulty_match;
        self
    }
}
