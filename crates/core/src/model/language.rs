use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CodeError {
    #[error("language code cannot be empty")]
    EmptyLanguage,

    #[error("invalid language code: {0}")]
    InvalidLanguage(String),

    #[error("domain code cannot be empty")]
    EmptyDomain,

    #[error("name cannot be empty")]
    EmptyName,
}

//
// ─── LANGUAGE ──────────────────────────────────────────────────────────────────
//

/// Normalized language code such as `en`, `fr` or `pt-br`.
///
/// Codes are lowercased and limited to 2..=8 ASCII alphanumerics or `-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LanguageCode(String);

impl LanguageCode {
    /// Parse and normalize a language code.
    ///
    /// # Errors
    ///
    /// Returns `CodeError::EmptyLanguage` for blank input and
    /// `CodeError::InvalidLanguage` when the code is malformed.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, CodeError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(CodeError::EmptyLanguage);
        }
        let well_formed = (2..=8).contains(&trimmed.len())
            && trimmed
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-');
        if !well_formed {
            return Err(CodeError::InvalidLanguage(trimmed.to_owned()));
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for LanguageCode {
    type Error = CodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<LanguageCode> for String {
    fn from(value: LanguageCode) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub code: LanguageCode,
    pub name: String,
}

impl Language {
    /// # Errors
    ///
    /// Returns `CodeError::EmptyName` if `name` is blank.
    pub fn new(code: LanguageCode, name: impl Into<String>) -> Result<Self, CodeError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CodeError::EmptyName);
        }
        Ok(Self { code, name })
    }
}

//
// ─── DOMAIN ────────────────────────────────────────────────────────────────────
//

/// Topic domain a concept belongs to (e.g. `FOOD`, `TRAVEL`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DomainCode(String);

impl DomainCode {
    /// # Errors
    ///
    /// Returns `CodeError::EmptyDomain` for blank input.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, CodeError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(CodeError::EmptyDomain);
        }
        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DomainCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DomainCode {
    type Error = CodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<DomainCode> for String {
    fn from(value: DomainCode) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    pub code: DomainCode,
    pub name: String,
}

impl Domain {
    /// # Errors
    ///
    /// Returns `CodeError::EmptyName` if `name` is blank.
    pub fn new(code: DomainCode, name: impl Into<String>) -> Result<Self, CodeError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CodeError::EmptyName);
        }
        Ok(Self { code, name })
    }
}

/// Domain restriction applied during selection.
///
/// The sentinel `ALL` (any case) and a missing value both mean "no filter".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DomainFilter {
    #[default]
    All,
    Only(DomainCode),
}

impl DomainFilter {
    pub const ALL_SENTINEL: &'static str = "ALL";

    /// # Errors
    ///
    /// Propagates `CodeError::EmptyDomain` for blank, non-absent input.
    pub fn parse(raw: Option<&str>) -> Result<Self, CodeError> {
        match raw {
            None => Ok(Self::All),
            Some(s) if s.trim().eq_ignore_ascii_case(Self::ALL_SENTINEL) => Ok(Self::All),
            Some(s) => Ok(Self::Only(DomainCode::parse(s)?)),
        }
    }

    #[must_use]
    pub fn admits(&self, domain: &DomainCode) -> bool {
        match self {
            Self::All => true,
            Self::Only(code) => code == domain,
        }
    }

    #[must_use]
    pub fn code(&self) -> Option<&DomainCode> {
        match self {
            Self::All => None,
            Self::Only(code) => Some(code),
        }
    }

    #[must_use]
    pub fn from_code(code: Option<DomainCode>) -> Self {
        code.map_or(Self::All, Self::Only)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_code_is_normalized() {
        let code = LanguageCode::parse(" FR ").unwrap();
        assert_eq!(code.as_str(), "fr");
    }

    #[test]
    fn language_code_rejects_garbage() {
        assert_eq!(LanguageCode::parse("  "), Err(CodeError::EmptyLanguage));
        assert!(matches!(
            LanguageCode::parse("e"),
            Err(CodeError::InvalidLanguage(_))
        ));
        assert!(matches!(
            LanguageCode::parse("en us"),
            Err(CodeError::InvalidLanguage(_))
        ));
    }

    #[test]
    fn domain_filter_treats_all_sentinel_as_unfiltered() {
        assert_eq!(DomainFilter::parse(None).unwrap(), DomainFilter::All);
        assert_eq!(DomainFilter::parse(Some("all")).unwrap(), DomainFilter::All);
        let food = DomainCode::parse("FOOD").unwrap();
        let filter = DomainFilter::parse(Some("FOOD")).unwrap();
        assert!(filter.admits(&food));
        assert!(!filter.admits(&DomainCode::parse("TRAVEL").unwrap()));
    }

    #[test]
    fn domain_filter_rejects_blank_domain() {
        assert_eq!(DomainFilter::parse(Some(" ")), Err(CodeError::EmptyDomain));
    }
}
