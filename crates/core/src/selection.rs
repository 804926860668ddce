//! Pure selection rules: which concepts qualify for a session and how many
//! of them are drawn.

use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::{BTreeMap, HashSet};

use crate::model::{Concept, ConceptId, Difficulty, SelectionCriteria, Translation};

/// Session size used when a config carries no difficulty.
pub const DEFAULT_SESSION_SIZE: usize = 10;

/// Whether a concept passes the domain and difficulty filters.
///
/// Language coverage is checked separately by [`eligible_concepts`].
#[must_use]
pub fn admits(criteria: &SelectionCriteria, concept: &Concept) -> bool {
    criteria.domain.admits(&concept.domain)
        && criteria
            .difficulty_match
            .admits(criteria.difficulty, concept.difficulty)
}

/// Concepts translated into both the source and the target language that
/// pass the criteria's filters, in ascending id order.
///
/// An empty result is not an error here; callers decide.
pub fn eligible_concepts<'a>(
    criteria: &SelectionCriteria,
    concepts: impl IntoIterator<Item = &'a Concept>,
    translations: impl IntoIterator<Item = &'a Translation>,
) -> Vec<ConceptId> {
    let admitted: HashSet<ConceptId> = concepts
        .into_iter()
        .filter(|c| admits(criteria, c))
        .map(|c| c.id)
        .collect();

    let mut coverage: BTreeMap<ConceptId, HashSet<&str>> = BTreeMap::new();
    for t in translations {
        if !admitted.contains(&t.concept_id) {
            continue;
        }
        if t.language == criteria.source || t.language == criteria.target {
            coverage
                .entry(t.concept_id)
                .or_default()
                .insert(t.language.as_str());
        }
    }

    coverage
        .into_iter()
        .filter(|(_, langs)| langs.len() == 2)
        .map(|(id, _)| id)
        .collect()
}

/// Number of items to draw for a configured difficulty.
#[must_use]
pub fn target_size(difficulty: Option<Difficulty>, default_size: usize) -> usize {
    difficulty.map_or(default_size, Difficulty::session_size)
}

/// Draw `min(candidates.len(), size)` elements uniformly at random without
/// replacement.
pub fn sample_uniform<T, R>(mut candidates: Vec<T>, size: usize, rng: &mut R) -> Vec<T>
where
    R: Rng + ?Sized,
{
    candidates.shuffle(rng);
    candidates.truncate(size);
    candidates
}
