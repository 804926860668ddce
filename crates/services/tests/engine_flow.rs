use std::collections::HashSet;
use std::sync::Arc;

use services::{
    GeneratorSettings, ProgressTracker, SessionConfigService, SessionError, SessionGenerator,
    SessionQueries, SubmissionProcessor,
};
use storage::repository::{
    CatalogRepository, InMemoryRepository, ProgressRepository, StorageError,
};
use vocab_core::grading::Answer;
use vocab_core::model::{
    ConceptId, Difficulty, DifficultyMatch, Domain, DomainCode, Language, LanguageCode,
    NewConcept, NewTranslation, SelectionCriteria, Session, SessionConfig, SessionConfigDraft,
    SessionKind, SessionState, Translation, TranslationId, UserId,
};
use vocab_core::time::{fixed_clock, fixed_now};

struct Engine {
    repo: InMemoryRepository,
    configs: SessionConfigService,
    generator: SessionGenerator,
    submissions: SubmissionProcessor,
    queries: SessionQueries,
}

fn engine_with(settings: GeneratorSettings) -> Engine {
    let repo = InMemoryRepository::new();
    let clock = fixed_clock();
    Engine {
        configs: SessionConfigService::new(clock, Arc::new(repo.clone())),
        generator: SessionGenerator::new(
            clock,
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
        )
        .with_settings(settings)
        .with_seed(42),
        submissions: SubmissionProcessor::new(clock, Arc::new(repo.clone()), Arc::new(repo.clone())),
        queries: SessionQueries::new(Arc::new(repo.clone())),
        repo,
    }
}

fn engine() -> Engine {
    engine_with(GeneratorSettings::default())
}

fn lang(code: &str) -> LanguageCode {
    LanguageCode::parse(code).unwrap()
}

/// Seed `per_tier` en/fr concepts for each difficulty in the FOOD domain.
async fn seed(repo: &InMemoryRepository, per_tier: usize) -> Vec<ConceptId> {
    for (code, name) in [("en", "English"), ("fr", "French"), ("de", "German")] {
        repo.upsert_language(&Language::new(lang(code), name).unwrap())
            .await
            .unwrap();
    }
    let food = DomainCode::parse("FOOD").unwrap();
    repo.upsert_domain(&Domain::new(food.clone(), "Food").unwrap())
        .await
        .unwrap();

    let mut ids = Vec::new();
    for difficulty in Difficulty::ALL {
        for n in 0..per_tier {
            let key = format!("{}-{n}", difficulty.as_str().to_lowercase());
            let id = repo
                .insert_concept(&NewConcept::new(&key, food.clone(), difficulty).unwrap())
                .await
                .unwrap();
            for code in ["en", "fr"] {
                repo.insert_translation(
                    &NewTranslation::new(id, lang(code), format!("{key}/{code}")).unwrap(),
                )
                .await
                .unwrap();
            }
            ids.push(id);
        }
    }
    ids
}

async fn config(engine: &Engine, user: UserId, difficulty: Option<&str>) -> SessionConfig {
    engine
        .configs
        .create_config(
            user,
            SessionConfigDraft {
                native_language: "en".into(),
                tested_language: "fr".into(),
                difficulty: difficulty.map(str::to_owned),
                domain: Some("FOOD".into()),
                kind: SessionKind::Expression,
            },
        )
        .await
        .unwrap()
}

fn answers(session: &Session, correct: usize) -> Vec<Answer> {
    session
        .items()
        .iter()
        .enumerate()
        .map(|(i, item)| Answer::new(item.translation_to().id, i < correct))
        .collect()
}

#[tokio::test]
async fn generated_session_size_follows_difficulty_table() {
    let engine = engine();
    seed(&engine.repo, 12).await;
    let user = UserId::new(1);

    for (difficulty, expected) in [
        (Some("EASY"), 10),
        // 12 easy + 12 medium eligible, table asks for 15.
        (Some("MEDIUM"), 15),
        (Some("HARD"), 20),
        (None, 10),
    ] {
        let cfg = config(&engine, user, difficulty).await;
        let session = engine.generator.generate(user, cfg.id).await.unwrap();
        assert_eq!(session.items().len(), expected, "{difficulty:?}");
    }
}

#[tokio::test]
async fn small_pools_are_used_entirely() {
    let engine = engine();
    seed(&engine.repo, 2).await;
    let user = UserId::new(1);
    let cfg = config(&engine, user, Some("MEDIUM")).await;
    let session = engine.generator.generate(user, cfg.id).await.unwrap();
    assert_eq!(session.items().len(), 4);
}

#[tokio::test]
async fn items_pair_one_concept_in_the_session_languages() {
    let engine = engine();
    seed(&engine.repo, 5).await;
    let user = UserId::new(1);
    let cfg = config(&engine, user, None).await;
    let session = engine.generator.generate(user, cfg.id).await.unwrap();

    let mut concepts = HashSet::new();
    for item in session.items() {
        assert_eq!(item.translation_from().concept_id, item.translation_to().concept_id);
        assert_eq!(item.translation_from().language, lang("en"));
        assert_eq!(item.translation_to().language, lang("fr"));
        assert!(concepts.insert(item.concept_id()), "concept drawn twice");
    }
}

#[tokio::test]
async fn fresh_session_is_unanswered() {
    let engine = engine();
    seed(&engine.repo, 3).await;
    let user = UserId::new(1);
    let cfg = config(&engine, user, Some("easy")).await;
    let generated = engine.generator.generate(user, cfg.id).await.unwrap();

    let fetched = engine
        .queries
        .get_session(user, generated.id())
        .await
        .unwrap();
    assert_eq!(fetched, generated);
    assert_eq!(fetched.state(), SessionState::Generated);
    assert_eq!(fetched.score(), None);
    assert_eq!(fetched.completed_at(), None);
    assert!(fetched.items().iter().all(|i| i.correct().is_none()));
}

#[tokio::test]
async fn exact_mode_draws_only_the_configured_tier() {
    let engine = engine_with(GeneratorSettings {
        difficulty_match: DifficultyMatch::Exact,
        ..GeneratorSettings::default()
    });
    let ids = seed(&engine.repo, 4).await;
    let user = UserId::new(1);
    let cfg = config(&engine, user, Some("MEDIUM")).await;
    let session = engine.generator.generate(user, cfg.id).await.unwrap();

    let medium: HashSet<ConceptId> = ids[4..8].iter().copied().collect();
    assert_eq!(session.items().len(), 4);
    assert!(session.items().iter().all(|i| medium.contains(&i.concept_id())));
}

#[tokio::test]
async fn no_eligible_content_persists_nothing() {
    let engine = engine();
    seed(&engine.repo, 3).await;
    let user = UserId::new(1);
    let cfg = engine
        .configs
        .create_config(
            user,
            SessionConfigDraft {
                native_language: "en".into(),
                tested_language: "de".into(),
                difficulty: None,
                domain: None,
                kind: SessionKind::Mixed,
            },
        )
        .await
        .unwrap();

    let err = engine.generator.generate(user, cfg.id).await.unwrap_err();
    assert!(matches!(err, SessionError::NoEligibleContent));
    assert_eq!(engine.repo.session_count().unwrap(), 0);
}

/// Catalog whose translation lookup loses the target-language rows of some
/// concepts, as when translations are removed between resolve and pairing.
struct LossyCatalog {
    inner: InMemoryRepository,
    target: LanguageCode,
    withheld: HashSet<ConceptId>,
}

#[async_trait::async_trait]
impl CatalogRepository for LossyCatalog {
    async fn upsert_language(&self, language: &Language) -> Result<(), StorageError> {
        self.inner.upsert_language(language).await
    }

    async fn upsert_domain(&self, domain: &Domain) -> Result<(), StorageError> {
        self.inner.upsert_domain(domain).await
    }

    async fn insert_concept(&self, concept: &NewConcept) -> Result<ConceptId, StorageError> {
        self.inner.insert_concept(concept).await
    }

    async fn insert_translation(
        &self,
        translation: &NewTranslation,
    ) -> Result<TranslationId, StorageError> {
        self.inner.insert_translation(translation).await
    }

    async fn list_languages(&self) -> Result<Vec<Language>, StorageError> {
        self.inner.list_languages().await
    }

    async fn list_domains(&self) -> Result<Vec<Domain>, StorageError> {
        self.inner.list_domains().await
    }

    async fn eligible_concepts(
        &self,
        criteria: &SelectionCriteria,
    ) -> Result<Vec<ConceptId>, StorageError> {
        self.inner.eligible_concepts(criteria).await
    }

    async fn translations_for(
        &self,
        concept_ids: &[ConceptId],
        languages: &[LanguageCode],
    ) -> Result<Vec<Translation>, StorageError> {
        let mut rows = self.inner.translations_for(concept_ids, languages).await?;
        rows.retain(|t| !(t.language == self.target && self.withheld.contains(&t.concept_id)));
        Ok(rows)
    }
}

fn lossy_generator(repo: &InMemoryRepository, withheld: &[ConceptId]) -> SessionGenerator {
    let catalog = LossyCatalog {
        inner: repo.clone(),
        target: lang("fr"),
        withheld: withheld.iter().copied().collect(),
    };
    SessionGenerator::new(
        fixed_clock(),
        Arc::new(catalog),
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
    )
    .with_seed(7)
}

#[tokio::test]
async fn unpairable_sample_fails_without_persisting() {
    let engine = engine();
    let ids = seed(&engine.repo, 2).await;
    let user = UserId::new(1);
    let cfg = config(&engine, user, None).await;

    let err = lossy_generator(&engine.repo, &ids)
        .generate(user, cfg.id)
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::GenerationFailed));
    assert_eq!(engine.repo.session_count().unwrap(), 0);
}

#[tokio::test]
async fn concepts_losing_a_translation_are_skipped() {
    let engine = engine();
    let ids = seed(&engine.repo, 2).await;
    let user = UserId::new(1);
    // Six eligible concepts, all sampled by the default size of ten.
    let cfg = config(&engine, user, None).await;
    let withheld = &ids[..2];

    let session = lossy_generator(&engine.repo, withheld)
        .generate(user, cfg.id)
        .await
        .unwrap();
    assert_eq!(session.items().len(), ids.len() - withheld.len());
    assert!(
        session
            .items()
            .iter()
            .all(|item| !withheld.contains(&item.concept_id()))
    );
    assert_eq!(engine.repo.session_count().unwrap(), 1);
}

#[tokio::test]
async fn config_of_another_user_is_forbidden() {
    let engine = engine();
    seed(&engine.repo, 3).await;
    let cfg = config(&engine, UserId::new(1), None).await;
    let err = engine
        .generator
        .generate(UserId::new(2), cfg.id)
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Forbidden));

    let missing = engine
        .generator
        .generate(UserId::new(1), vocab_core::model::SessionConfigId::new(999))
        .await
        .unwrap_err();
    assert!(matches!(missing, SessionError::NotFound));
}

#[tokio::test]
async fn seven_of_ten_scores_seventy() {
    let engine = engine();
    seed(&engine.repo, 10).await;
    let user = UserId::new(1);
    let cfg = config(&engine, user, Some("EASY")).await;
    let session = engine.generator.generate(user, cfg.id).await.unwrap();
    assert_eq!(session.items().len(), 10);

    let submitted = engine
        .submissions
        .submit(user, session.id(), answers(&session, 7))
        .await
        .unwrap();
    assert_eq!(submitted.score().map(|s| s.value()), Some(70));
    assert_eq!(submitted.state(), SessionState::Completed);
    assert_eq!(submitted.completed_at(), Some(fixed_now()));
    assert_eq!(submitted.answered_count(), 10);
}

#[tokio::test]
async fn resubmitting_accumulates_progress() {
    let engine = engine();
    seed(&engine.repo, 2).await;
    let user = UserId::new(1);
    let cfg = config(&engine, user, Some("EASY")).await;
    let session = engine.generator.generate(user, cfg.id).await.unwrap();
    let batch = answers(&session, 1);
    assert_eq!(batch.len(), 2);

    for _ in 0..2 {
        engine
            .submissions
            .submit(user, session.id(), batch.clone())
            .await
            .unwrap();
    }

    let right = engine
        .repo
        .get_progress(user, batch[0].translation_to_id)
        .await
        .unwrap()
        .unwrap();
    let wrong = engine
        .repo
        .get_progress(user, batch[1].translation_to_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!((right.correct_count(), right.incorrect_count()), (2, 0));
    assert_eq!((wrong.correct_count(), wrong.incorrect_count()), (0, 2));
}

#[tokio::test]
async fn tracker_record_continues_submitted_counters() {
    let engine = engine();
    seed(&engine.repo, 2).await;
    let user = UserId::new(1);
    let cfg = config(&engine, user, Some("EASY")).await;
    let session = engine.generator.generate(user, cfg.id).await.unwrap();
    let batch = answers(&session, 1);
    engine
        .submissions
        .submit(user, session.id(), batch.clone())
        .await
        .unwrap();

    let tracker = ProgressTracker::new(fixed_clock(), Arc::new(engine.repo.clone()));
    let right = tracker
        .record(user, batch[0].translation_to_id, true)
        .await
        .unwrap();
    assert_eq!((right.correct_count(), right.incorrect_count()), (2, 0));

    let summary = tracker.progress_summary(user).await.unwrap();
    assert_eq!(summary.translations, 2);
    assert_eq!((summary.correct, summary.incorrect), (2, 1));
}

#[tokio::test]
async fn foreign_translations_do_not_count() {
    let engine = engine();
    seed(&engine.repo, 2).await;
    let user = UserId::new(1);
    let cfg = config(&engine, user, Some("EASY")).await;
    let session = engine.generator.generate(user, cfg.id).await.unwrap();

    let foreign = TranslationId::new(10_000);
    let mut batch = vec![Answer::new(foreign, false)];
    batch.extend(answers(&session, 2));

    let submitted = engine
        .submissions
        .submit(user, session.id(), batch)
        .await
        .unwrap();
    assert_eq!(submitted.score().map(|s| s.value()), Some(100));
    assert!(
        engine
            .repo
            .get_progress(user, foreign)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn nothing_matched_still_completes_with_zero() {
    let engine = engine();
    seed(&engine.repo, 2).await;
    let user = UserId::new(1);
    let cfg = config(&engine, user, None).await;
    let session = engine.generator.generate(user, cfg.id).await.unwrap();

    let submitted = engine
        .submissions
        .submit(user, session.id(), vec![Answer::new(TranslationId::new(10_000), true)])
        .await
        .unwrap();
    assert_eq!(submitted.score().map(|s| s.value()), Some(0));
    assert_eq!(submitted.state(), SessionState::Completed);
}

#[tokio::test]
async fn submit_preconditions_are_checked_in_order() {
    let engine = engine();
    seed(&engine.repo, 2).await;
    let owner = UserId::new(1);
    let cfg = config(&engine, owner, None).await;
    let session = engine.generator.generate(owner, cfg.id).await.unwrap();

    let missing = engine
        .submissions
        .submit(owner, vocab_core::model::SessionId::new(999), Vec::new())
        .await
        .unwrap_err();
    assert!(matches!(missing, SessionError::NotFound));

    let forbidden = engine
        .submissions
        .submit(UserId::new(2), session.id(), Vec::new())
        .await
        .unwrap_err();
    assert!(matches!(forbidden, SessionError::Forbidden));

    let empty = engine
        .submissions
        .submit(owner, session.id(), Vec::new())
        .await
        .unwrap_err();
    assert!(matches!(empty, SessionError::InvalidInput(_)));

    let other = engine
        .queries
        .get_session(UserId::new(2), session.id())
        .await
        .unwrap_err();
    assert!(matches!(other, SessionError::Forbidden));
}

#[tokio::test]
async fn list_sessions_is_per_user() {
    let engine = engine();
    seed(&engine.repo, 3).await;
    let user = UserId::new(1);
    let cfg = config(&engine, user, None).await;
    let first = engine.generator.generate(user, cfg.id).await.unwrap();
    let second = engine.generator.generate(user, cfg.id).await.unwrap();

    let listed = engine.queries.list_sessions(user, 10).await.unwrap();
    let ids: Vec<_> = listed.iter().map(|s| s.header.id).collect();
    // Same timestamp under a fixed clock, so newer ids come first.
    assert_eq!(ids, vec![second.id(), first.id()]);
    assert!(listed.iter().all(|s| s.item_count == 9));
    assert!(
        engine
            .queries
            .list_sessions(UserId::new(2), 10)
            .await
            .unwrap()
            .is_empty()
    );
}
