//! Matching submitted answers to session items and scoring them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::model::{Score, SessionItemId, TranslationId};

/// One answered question as submitted by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub translation_to_id: TranslationId,
    pub correct: bool,
    #[serde(default)]
    pub user_answer: Option<String>,
}

impl Answer {
    #[must_use]
    pub fn new(translation_to_id: TranslationId, correct: bool) -> Self {
        Self {
            translation_to_id,
            correct,
            user_answer: None,
        }
    }

    #[must_use]
    pub fn with_user_answer(mut self, text: impl Into<String>) -> Self {
        self.user_answer = Some(text.into());
        self
    }
}

/// The part of a stored item needed to match answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemSlot {
    pub item_id: SessionItemId,
    pub translation_to_id: TranslationId,
}

/// An answer that matched an item of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradedAnswer {
    pub item_id: SessionItemId,
    pub translation_id: TranslationId,
    pub correct: bool,
    pub user_answer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grading {
    pub graded: Vec<GradedAnswer>,
    pub correct: u32,
    pub total: u32,
    pub dropped: usize,
    pub score: Score,
}

/// Match `answers` against `slots` by target translation and tally them.
///
/// Answers for translations outside the session are dropped. Every matching
/// answer counts, in submission order, so a translation answered twice in
/// one batch is tallied twice and its item keeps the later answer.
#[must_use]
pub fn grade(slots: &[ItemSlot], answers: &[Answer]) -> Grading {
    let by_translation: HashMap<TranslationId, SessionItemId> = slots
        .iter()
        .map(|s| (s.translation_to_id, s.item_id))
        .collect();

    let mut graded = Vec::with_capacity(answers.len());
    let mut correct = 0_u32;
    let mut total = 0_u32;

    for answer in answers {
        let Some(item_id) = by_translation.get(&answer.translation_to_id) else {
            continue;
        };
        total = total.saturating_add(1);
        if answer.correct {
            correct = correct.saturating_add(1);
        }
        graded.push(GradedAnswer {
            item_id: *item_id,
            translation_id: answer.translation_to_id,
            correct: answer.correct,
            user_answer: answer.user_answer.clone(),
        });
    }

    Grading {
        dropped: answers.len() - graded.len(),
        graded,
        correct,
        total,
        score: Score::from_tally(correct, total),
    }
}
