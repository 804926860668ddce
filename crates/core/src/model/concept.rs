use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use url::Url;

use crate::model::difficulty::Difficulty;
use crate::model::ids::{ConceptId, TranslationId};
use crate::model::language::{DomainCode, LanguageCode};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("concept key cannot be empty")]
    EmptyConceptKey,

    #[error("translation text cannot be empty")]
    EmptyText,

    #[error("media reference cannot be empty")]
    EmptyMediaRef,

    #[error("invalid word type: {0}")]
    InvalidWordType(String),
}

//
// ─── MEDIA ─────────────────────────────────────────────────────────────────────
//

/// Reference to an illustration or audio clip.
///
/// Absolute URLs are parsed; anything else is kept as a relative asset path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MediaRef {
    Url(Url),
    Path(String),
}

impl MediaRef {
    /// # Errors
    ///
    /// Returns `CatalogError::EmptyMediaRef` for blank input.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, CatalogError> {
        let s = raw.as_ref().trim();
        if s.is_empty() {
            return Err(CatalogError::EmptyMediaRef);
        }
        Ok(match Url::parse(s) {
            Ok(url) => MediaRef::Url(url),
            Err(_) => MediaRef::Path(s.to_owned()),
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            MediaRef::Url(u) => u.as_str(),
            MediaRef::Path(p) => p,
        }
    }
}

impl TryFrom<String> for MediaRef {
    type Error = CatalogError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<MediaRef> for String {
    fn from(value: MediaRef) -> Self {
        match value {
            MediaRef::Url(u) => u.into(),
            MediaRef::Path(p) => p,
        }
    }
}

//
// ─── WORD TYPE ─────────────────────────────────────────────────────────────────
//

/// Grammatical category of a concept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WordType {
    Noun,
    Verb,
    Adjective,
    Adverb,
    Pronoun,
    Conjunction,
    Preposition,
    Interjection,
    Other,
}

impl WordType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            WordType::Noun => "NOUN",
            WordType::Verb => "VERB",
            WordType::Adjective => "ADJECTIVE",
            WordType::Adverb => "ADVERB",
            WordType::Pronoun => "PRONOUN",
            WordType::Conjunction => "CONJUNCTION",
            WordType::Preposition => "PREPOSITION",
            WordType::Interjection => "INTERJECTION",
            WordType::Other => "OTHER",
        }
    }
}

impl fmt::Display for WordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WordType {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const ALL: [WordType; 9] = [
            WordType::Noun,
            WordType::Verb,
            WordType::Adjective,
            WordType::Adverb,
            WordType::Pronoun,
            WordType::Conjunction,
            WordType::Preposition,
            WordType::Interjection,
            WordType::Other,
        ];
        let trimmed = s.trim();
        ALL.into_iter()
            .find(|w| w.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| CatalogError::InvalidWordType(trimmed.to_owned()))
    }
}

//
// ─── CONCEPT ───────────────────────────────────────────────────────────────────
//

/// A language-independent word sense, e.g. the idea of *car*.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    pub id: ConceptId,
    /// Stable human-readable key (`car`, `to_eat`).
    pub key: String,
    pub domain: DomainCode,
    pub difficulty: Difficulty,
    pub image: Option<MediaRef>,
    pub word_type: Option<WordType>,
}

/// Catalog-side input for a new concept, before an id is assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewConcept {
    pub key: String,
    pub domain: DomainCode,
    pub difficulty: Difficulty,
    pub image: Option<MediaRef>,
    pub word_type: Option<WordType>,
}

impl NewConcept {
    /// # Errors
    ///
    /// Returns `CatalogError::EmptyConceptKey` if `key` is blank.
    pub fn new(
        key: impl Into<String>,
        domain: DomainCode,
        difficulty: Difficulty,
    ) -> Result<Self, CatalogError> {
        let key = key.into().trim().to_owned();
        if key.is_empty() {
            return Err(CatalogError::EmptyConceptKey);
        }
        Ok(Self {
            key,
            domain,
            difficulty,
            image: None,
            word_type: None,
        })
    }

    #[must_use]
    pub fn with_image(mut self, image: MediaRef) -> Self {
        self.image = Some(image);
        self
    }

    #[must_use]
    pub fn with_word_type(mut self, word_type: WordType) -> Self {
        self.word_type = Some(word_type);
        self
    }

    #[must_use]
    pub fn assign_id(self, id: ConceptId) -> Concept {
        Concept {
            id,
            key: self.key,
            domain: self.domain,
            difficulty: self.difficulty,
            image: self.image,
            word_type: self.word_type,
        }
    }
}

//
// ─── TRANSLATION ───────────────────────────────────────────────────────────────
//

/// A concept's surface form in one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub id: TranslationId,
    pub concept_id: ConceptId,
    pub language: LanguageCode,
    pub text: String,
    pub audio: Option<MediaRef>,
    pub gender: Option<String>,
    pub plural_text: Option<String>,
    pub example_sentence: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTranslation {
    pub concept_id: ConceptId,
    pub language: LanguageCode,
    pub text: String,
    pub audio: Option<MediaRef>,
    pub gender: Option<String>,
    pub plural_text: Option<String>,
    pub example_sentence: Option<String>,
}

impl NewTranslation {
    /// # Errors
    ///
    /// Returns `CatalogError::EmptyText` if `text` is blank.
    pub fn new(
        concept_id: ConceptId,
        language: LanguageCode,
        text: impl Into<String>,
    ) -> Result<Self, CatalogError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(CatalogError::EmptyText);
        }
        Ok(Self {
            concept_id,
            language,
            text,
            audio: None,
            gender: None,
            plural_text: None,
            example_sentence: None,
        })
    }

    #[must_use]
    pub fn with_example(mut self, sentence: impl Into<String>) -> Self {
        self.example_sentence = Some(sentence.into());
        self
    }

    #[must_use]
    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    #[must_use]
    pub fn with_plural(mut self, plural: impl Into<String>) -> Self {
        self.plural_text = Some(plural.into());
        self
    }

    #[must_use]
    pub fn assign_id(self, id: TranslationId) -> Translation {
        Translation {
            id,
            concept_id: self.concept_id,
            language: self.language,
            text: self.text,
            audio: self.audio,
            gender: self.gender,
            plural_text: self.plural_text,
            example_sentence: self.example_sentence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_ref_distinguishes_urls_from_paths() {
        let url = MediaRef::parse("https://cdn.example.org/car.png").unwrap();
        assert!(matches!(url, MediaRef::Url(_)));
        let path = MediaRef::parse("images/car.png").unwrap();
        assert_eq!(path, MediaRef::Path("images/car.png".into()));
        assert_eq!(MediaRef::parse(" "), Err(CatalogError::EmptyMediaRef));
    }

    #[test]
    fn word_type_parses_case_insensitively() {
        assert_eq!("noun".parse::<WordType>().unwrap(), WordType::Noun);
        assert!("gerund".parse::<WordType>().is_err());
    }

    #[test]
    fn new_concept_rejects_blank_key() {
        let domain = DomainCode::parse("FOOD").unwrap();
        let err = NewConcept::new("  ", domain, Difficulty::Easy).unwrap_err();
        assert_eq!(err, CatalogError::EmptyConceptKey);
    }

    #[test]
    fn new_translation_rejects_blank_text() {
        let lang = LanguageCode::parse("fr").unwrap();
        let err = NewTranslation::new(ConceptId::new(1), lang, " ").unwrap_err();
        assert_eq!(err, CatalogError::EmptyText);
    }
}
