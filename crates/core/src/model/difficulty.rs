use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DifficultyError {
    #[error("invalid difficulty: {0}")]
    Invalid(String),

    #[error("invalid difficulty rank: {0}")]
    InvalidRank(i64),
}

/// Difficulty tier of a concept, totally ordered `Easy < Medium < Hard`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Medium => "MEDIUM",
            Difficulty::Hard => "HARD",
        }
    }

    /// Position in the total order, starting at 0.
    #[must_use]
    pub fn rank(self) -> i64 {
        match self {
            Difficulty::Easy => 0,
            Difficulty::Medium => 1,
            Difficulty::Hard => 2,
        }
    }

    /// # Errors
    ///
    /// Returns `DifficultyError::InvalidRank` outside `0..=2`.
    pub fn from_rank(rank: i64) -> Result<Self, DifficultyError> {
        match rank {
            0 => Ok(Difficulty::Easy),
            1 => Ok(Difficulty::Medium),
            2 => Ok(Difficulty::Hard),
            other => Err(DifficultyError::InvalidRank(other)),
        }
    }

    /// Number of items drawn for a session configured at this difficulty.
    #[must_use]
    pub fn session_size(self) -> usize {
        match self {
            Difficulty::Easy => 10,
            Difficulty::Medium => 15,
            Difficulty::Hard => 20,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = DifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Difficulty::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| DifficultyError::Invalid(trimmed.to_owned()))
    }
}

/// How a configured difficulty restricts the eligible concepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyMatch {
    /// Concepts at or below the configured tier.
    #[default]
    Ceiling,
    /// Concepts exactly at the configured tier.
    Exact,
}

impl DifficultyMatch {
    #[must_use]
    pub fn admits(self, configured: Option<Difficulty>, concept: Difficulty) -> bool {
        match (configured, self) {
            (None, _) => true,
            (Some(limit), DifficultyMatch::Ceiling) => concept <= limit,
            (Some(limit), DifficultyMatch::Exact) => concept == limit,
        }
    }
}
