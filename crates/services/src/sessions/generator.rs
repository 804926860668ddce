use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;
use storage::repository::{
    CatalogRepository, NewSessionItem, NewSessionRecord, SessionConfigRepository,
    SessionRepository,
};
use tracing::{debug, info, instrument, warn};
use vocab_core::model::{
    ConceptId, DifficultyMatch, LanguageCode, Session, SessionConfig, SessionConfigId,
    Translation, UserId,
};
use vocab_core::selection::{DEFAULT_SESSION_SIZE, sample_uniform, target_size};

use super::eligibility::EligibilityResolver;
use crate::Clock;
use crate::error::SessionError;

//
// ─── SETTINGS ──────────────────────────────────────────────────────────────────
//

/// Tunables for session generation, loaded from the `[generator]` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorSettings {
    pub difficulty_match: DifficultyMatch,
    /// Items drawn when a config carries no difficulty.
    pub default_session_size: usize,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            difficulty_match: DifficultyMatch::Ceiling,
            default_session_size: DEFAULT_SESSION_SIZE,
        }
    }
}

//
// ─── GENERATOR ─────────────────────────────────────────────────────────────────
//

/// Draws a random sample of eligible concepts and persists it as a session.
#[derive(Clone)]
pub struct SessionGenerator {
    clock: Clock,
    settings: GeneratorSettings,
    resolver: EligibilityResolver,
    catalog: Arc<dyn CatalogRepository>,
    configs: Arc<dyn SessionConfigRepository>,
    sessions: Arc<dyn SessionRepository>,
    rng: Option<Arc<Mutex<StdRng>>>,
}

impl SessionGenerator {
    #[must_use]
    pub fn new(
        clock: Clock,
        catalog: Arc<dyn CatalogRepository>,
        configs: Arc<dyn SessionConfigRepository>,
        sessions: Arc<dyn SessionRepository>,
    ) -> Self {
        Self {
            clock,
            settings: GeneratorSettings::default(),
            resolver: EligibilityResolver::new(Arc::clone(&catalog)),
            catalog,
            configs,
            sessions,
            rng: None,
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: GeneratorSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sample from a seeded generator instead of the thread-local one.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Some(Arc::new(Mutex::new(StdRng::seed_from_u64(seed))));
        self
    }

    #[must_use]
    pub fn settings(&self) -> GeneratorSettings {
        self.settings
    }

    /// Generate a session from one of `user_id`'s saved configs.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotFound` if the config does not exist and
    /// `SessionError::Forbidden` if it belongs to another user.
    /// Otherwise fails as [`SessionGenerator::generate_from_config`].
    #[instrument(skip(self))]
    pub async fn generate(
        &self,
        user_id: UserId,
        config_id: SessionConfigId,
    ) -> Result<Session, SessionError> {
        let config = self.configs.get_config(config_id).await?;
        if config.user_id != user_id {
            return Err(SessionError::Forbidden);
        }
        self.generate_from_config(&config).await
    }

    /// Resolve, sample and persist a session for `config`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoEligibleContent` when no concept qualifies and
    /// `SessionError::GenerationFailed` when none of the sampled concepts has
    /// both translations. Nothing is persisted in either case.
    /// Returns `SessionError::Storage` on repository failures.
    pub async fn generate_from_config(
        &self,
        config: &SessionConfig,
    ) -> Result<Session, SessionError> {
        let criteria = config.criteria(self.settings.difficulty_match);
        let eligible = self.resolver.resolve(&criteria).await?;
        if eligible.is_empty() {
            return Err(SessionError::NoEligibleContent);
        }

        let size = target_size(config.difficulty, self.settings.default_session_size);
        let sampled = self.sample(eligible, size);

        let languages = [criteria.source.clone(), criteria.target.clone()];
        let translations = self.catalog.translations_for(&sampled, &languages).await?;
        let items = pair_items(&sampled, &translations, &criteria.source, &criteria.target);
        if items.is_empty() {
            warn!(
                config_id = %config.id,
                sampled = sampled.len(),
                "no sampled concept has both translations"
            );
            return Err(SessionError::GenerationFailed);
        }

        let record = NewSessionRecord::from_config(config, self.clock.now());
        let session_id = self.sessions.create_session(&record, &items).await?;
        info!(
            session_id = %session_id,
            user_id = %config.user_id,
            items = items.len(),
            "session generated"
        );

        Ok(self.sessions.get_session(session_id).await?)
    }

    fn sample(&self, eligible: Vec<ConceptId>, size: usize) -> Vec<ConceptId> {
        match &self.rng {
            Some(rng) => {
                let mut guard = rng.lock().unwrap_or_else(PoisonError::into_inner);
                sample_uniform(eligible, size, &mut *guard)
            }
            None => sample_uniform(eligible, size, &mut rand::rng()),
        }
    }
}

/// Build one item per sampled concept, in sample order, skipping concepts
/// that lack either translation.
fn pair_items(
    sampled: &[ConceptId],
    translations: &[Translation],
    source: &LanguageCode,
    target: &LanguageCode,
) -> Vec<NewSessionItem> {
    let mut by_concept: HashMap<ConceptId, (Option<&Translation>, Option<&Translation>)> =
        HashMap::with_capacity(sampled.len());
    for t in translations {
        let slot = by_concept.entry(t.concept_id).or_default();
        if &t.language == source {
            slot.0 = Some(t);
        } else if &t.language == target {
            slot.1 = Some(t);
        }
    }

    let mut items = Vec::with_capacity(sampled.len());
    for concept in sampled {
        match by_concept.get(concept) {
            Some((Some(from), Some(to))) => items.push(NewSessionItem {
                translation_from_id: from.id,
                translation_to_id: to.id,
            }),
            _ => debug!(concept_id = %concept, "skipping concept without both translations"),
        }
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use vocab_core::model::TranslationId;

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

    #[test]
    fn pairs_follow_sample_order_and_skip_incomplete_concepts() {
        let en = LanguageCode::parse("en").unwrap();
        let it = LanguageCode::parse("it").unwrap();
        let translations = vec![
            translation(1, 1, "en"),
            translation(2, 1, "it"),
            translation(3, 2, "en"),
            translation(5, 3, "en"),
            translation(6, 3, "it"),
        ];
        let sampled = [ConceptId::new(3), ConceptId::new(2), ConceptId::new(1)];

        let items = pair_items(&sampled, &translations, &en, &it);
        let pairs: Vec<(u64, u64)> = items
            .iter()
            .map(|i| (i.translation_from_id.value(), i.translation_to_id.value()))
            .collect();
        assert_eq!(pairs, vec![(5, 6), (1, 2)]);
    }

    #[test]
    fn settings_default_to_ceiling_and_ten_items() {
        let settings = GeneratorSettings::default();
        assert_eq!(settings.difficulty_match, DifficultyMatch::Ceiling);
        assert_eq!(settings.default_session_size, 10);
    }
}
