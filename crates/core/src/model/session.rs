use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::concept::Translation;
use crate::model::config::SessionKind;
use crate::model::difficulty::Difficulty;
use crate::model::ids::{ConceptId, SessionConfigId, SessionId, SessionItemId, UserId};
use crate::model::language::{DomainFilter, LanguageCode};
use crate::model::score::Score;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionItemError {
    #[error("item pairs different concepts ({from:?} vs {to:?})")]
    ConceptMismatch { from: ConceptId, to: ConceptId },

    #[error("prompt is in {actual}, session expects {expected}")]
    SourceLanguageMismatch {
        expected: LanguageCode,
        actual: LanguageCode,
    },

    #[error("answer is in {actual}, session expects {expected}")]
    TargetLanguageMismatch {
        expected: LanguageCode,
        actual: LanguageCode,
    },
}

//
// ─── SESSION ITEM ──────────────────────────────────────────────────────────────
//

/// One question: a prompt translation and the expected answer translation
/// of the same concept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionItem {
    id: SessionItemId,
    translation_from: Translation,
    translation_to: Translation,
    correct: Option<bool>,
    user_answer: Option<String>,
}

impl SessionItem {
    /// Rehydrate an item from storage.
    ///
    /// # Errors
    ///
    /// Returns `SessionItemError::ConceptMismatch` when the two translations
    /// belong to different concepts.
    pub fn from_persisted(
        id: SessionItemId,
        translation_from: Translation,
        translation_to: Translation,
        correct: Option<bool>,
        user_answer: Option<String>,
    ) -> Result<Self, SessionItemError> {
        if translation_from.concept_id != translation_to.concept_id {
            return Err(SessionItemError::ConceptMismatch {
                from: translation_from.concept_id,
                to: translation_to.concept_id,
            });
        }
        Ok(Self {
            id,
            translation_from,
            translation_to,
            correct,
            user_answer,
        })
    }

    #[must_use]
    pub fn id(&self) -> SessionItemId {
        self.id
    }

    #[must_use]
    pub fn translation_from(&self) -> &Translation {
        &self.translation_from
    }

    #[must_use]
    pub fn translation_to(&self) -> &Translation {
        &self.translation_to
    }

    #[must_use]
    pub fn concept_id(&self) -> ConceptId {
        self.translation_from.concept_id
    }

    #[must_use]
    pub fn correct(&self) -> Option<bool> {
        self.correct
    }

    #[must_use]
    pub fn user_answer(&self) -> Option<&str> {
        self.user_answer.as_deref()
    }

    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.correct.is_some()
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionState {
    /// Items generated, nothing submitted yet.
    Generated,
    /// At least one submission went through.
    Completed,
}

/// Session attributes without its items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionHeader {
    pub id: SessionId,
    pub user_id: UserId,
    pub config_id: SessionConfigId,
    pub source_language: LanguageCode,
    pub target_language: LanguageCode,
    pub domain: DomainFilter,
    pub difficulty: Option<Difficulty>,
    pub kind: SessionKind,
    pub score: Option<Score>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl SessionHeader {
    #[must_use]
    pub fn state(&self) -> SessionState {
        if self.completed_at.is_some() {
            SessionState::Completed
        } else {
            SessionState::Generated
        }
    }
}

/// A fully hydrated quiz attempt: header plus ordered items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    #[serde(flatten)]
    header: SessionHeader,
    state: SessionState,
    items: Vec<SessionItem>,
}

impl Session {
    /// Assemble a session from its persisted parts.
    ///
    /// # Errors
    ///
    /// Returns `SessionItemError` if any item's languages differ from the
    /// session's source/target languages.
    pub fn from_persisted(
        header: SessionHeader,
        items: Vec<SessionItem>,
    ) -> Result<Self, SessionItemError> {
        for item in &items {
            if item.translation_from.language != header.source_language {
                return Err(SessionItemError::SourceLanguageMismatch {
                    expected: header.source_language.clone(),
                    actual: item.translation_from.language.clone(),
                });
            }
            if item.translation_to.language != header.target_language {
                return Err(SessionItemError::TargetLanguageMismatch {
                    expected: header.target_language.clone(),
                    actual: item.translation_to.language.clone(),
                });
            }
        }
        let state = header.state();
        Ok(Self {
            header,
            state,
            items,
        })
    }

    #[must_use]
    pub fn header(&self) -> &SessionHeader {
        &self.header
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.header.id
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.header.user_id
    }

    #[must_use]
    pub fn score(&self) -> Option<Score> {
        self.header.score
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.header.completed_at
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn items(&self) -> &[SessionItem] {
        &self.items
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.items.iter().filter(|i| i.is_answered()).count()
    }
}

/// Listing row for a user's session history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionOverview {
    #[serde(flatten)]
    pub header: SessionHeader,
    pub item_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ids::TranslationId;
    use crate::time::fixed_now;

    fn translation(id: u64, concept: u64, lang: &str) -> Translation {
        Translation {
            id: TranslationId::new(id),
            concept_id: ConceptId::new(concept),
            language: LanguageCode::parse(lang).unwrap(),
            text: format!("t{id}"),
            audio: None,
            gender: None,
            plural_text: None,
            example_sentence: None,
        }
    }

    fn header(completed: bool) -> SessionHeader {
        SessionHeader {
            id: SessionId::new(1),
            user_id: UserId::new(1),
            config_id: SessionConfigId::new(1),
            source_language: LanguageCode::parse("en").unwrap(),
            target_language: LanguageCode::parse("fr").unwrap(),
            domain: DomainFilter::All,
            difficulty: None,
            kind: SessionKind::Expression,
            score: None,
            created_at: fixed_now(),
            completed_at: completed.then(fixed_now),
        }
    }

    #[test]
    fn item_requires_same_concept() {
        let err = SessionItem::from_persisted(
            SessionItemId::new(1),
            translation(1, 1, "en"),
            translation(2, 2, "fr"),
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, SessionItemError::ConceptMismatch { .. }));
    }

    #[test]
    fn session_rejects_items_in_wrong_language() {
        let item = SessionItem::from_persisted(
            SessionItemId::new(1),
            translation(1, 1, "fr"),
            translation(2, 1, "en"),
            None,
            None,
        )
        .unwrap();
        let err = Session::from_persisted(header(false), vec![item]).unwrap_err();
        assert!(matches!(
            err,
            SessionItemError::SourceLanguageMismatch { .. }
        ));
    }

    #[test]
    fn state_follows_completion_time() {
        let item = SessionItem::from_persisted(
            SessionItemId::new(1),
            translation(1, 1, "en"),
            translation(2, 1, "fr"),
            None,
            None,
        )
        .unwrap();
        let fresh = Session::from_persisted(header(false), vec![item.clone()]).unwrap();
        assert_eq!(fresh.state(), SessionState::Generated);
        assert_eq!(fresh.answered_count(), 0);

        let done = Session::from_persisted(header(true), vec![item]).unwrap();
        assert_eq!(done.state(), SessionState::Completed);
    }
}
