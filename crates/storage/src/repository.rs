use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use vocab_core::grading::{Answer, Grading, ItemSlot, grade};
use vocab_core::model::{
    Concept, ConceptId, Difficulty, Domain, DomainCode, DomainFilter, Language, LanguageCode,
    NewConcept, NewTranslation, ProgressRecord, SelectionCriteria, Session, SessionConfig,
    SessionConfigId, SessionHeader, SessionId, SessionItem, SessionItemId, SessionKind,
    SessionOverview, Translation, TranslationId, UserId, ValidatedSessionConfig,
};
use vocab_core::selection::eligible_concepts;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── RECORDS ───────────────────────────────────────────────────────────────────
//

/// Session row to insert, resolved from a config at generation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSessionRecord {
    pub user_id: UserId,
    pub config_id: SessionConfigId,
    pub source_language: LanguageCode,
    pub target_language: LanguageCode,
    pub domain: DomainFilter,
    pub difficulty: Option<Difficulty>,
    pub kind: SessionKind,
    pub created_at: DateTime<Utc>,
}

impl NewSessionRecord {
    #[must_use]
    pub fn from_config(config: &SessionConfig, created_at: DateTime<Utc>) -> Self {
        Self {
            user_id: config.user_id,
            config_id: config.id,
            source_language: config.native_language.clone(),
            target_language: config.tested_language.clone(),
            domain: config.domain.clone(),
            difficulty: config.difficulty,
            kind: config.kind,
            created_at,
        }
    }
}

/// Unanswered item to insert alongside a new session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewSessionItem {
    pub translation_from_id: TranslationId,
    pub translation_to_id: TranslationId,
}

/// A batch of answers to apply to one session in a single unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRecord {
    pub session_id: SessionId,
    pub user_id: UserId,
    pub answers: Vec<Answer>,
    pub submitted_at: DateTime<Utc>,
}

//
// ─── CONTRACTS ─────────────────────────────────────────────────────────────────
//

/// Read side of the catalog used during generation, plus the seeding writes.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the language cannot be stored.
    async fn upsert_language(&self, language: &Language) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the domain cannot be stored.
    async fn upsert_domain(&self, domain: &Domain) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the domain is unknown and
    /// `StorageError::Conflict` if the concept key is taken.
    async fn insert_concept(&self, concept: &NewConcept) -> Result<ConceptId, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::Conflict` when the concept already has a
    /// translation in that language, `StorageError::NotFound` when the
    /// concept or language is unknown.
    async fn insert_translation(
        &self,
        translation: &NewTranslation,
    ) -> Result<TranslationId, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_languages(&self) -> Result<Vec<Language>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_domains(&self) -> Result<Vec<Domain>, StorageError>;

    /// Concepts translated into both languages of `criteria` that pass its
    /// domain and difficulty filters, ascending by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn eligible_concepts(
        &self,
        criteria: &SelectionCriteria,
    ) -> Result<Vec<ConceptId>, StorageError>;

    /// Translations of `concept_ids` in any of `languages`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn translations_for(
        &self,
        concept_ids: &[ConceptId],
        languages: &[LanguageCode],
    ) -> Result<Vec<Translation>, StorageError>;
}

#[async_trait]
pub trait SessionConfigRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the config cannot be stored.
    async fn insert_config(
        &self,
        config: &ValidatedSessionConfig,
    ) -> Result<SessionConfigId, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing.
    async fn get_config(&self, id: SessionConfigId) -> Result<SessionConfig, StorageError>;
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Persist a session and all of its items atomically.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if `items` is empty; nothing is
    /// written in that case or on any other failure.
    async fn create_session(
        &self,
        session: &NewSessionRecord,
        items: &[NewSessionItem],
    ) -> Result<SessionId, StorageError>;

    /// Fetch a fully hydrated session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing.
    async fn get_session(&self, id: SessionId) -> Result<Session, StorageError>;

    /// A user's sessions, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_sessions(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<SessionOverview>, StorageError>;
}

/// Applies a graded submission: items, score, completion time and progress
/// counters change together or not at all.
#[async_trait]
pub trait SubmissionPersistence: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the session does not exist for
    /// that user.
    async fn apply_submission(
        &self,
        submission: &SubmissionRecord,
    ) -> Result<Grading, StorageError>;
}

#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Count one answer for (user, translation), creating the record on
    /// first use.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn record_answer(
        &self,
        user_id: UserId,
        translation_id: TranslationId,
        correct: bool,
        at: DateTime<Utc>,
    ) -> Result<ProgressRecord, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_progress(
        &self,
        user_id: UserId,
        translation_id: TranslationId,
    ) -> Result<Option<ProgressRecord>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_progress(&self, user_id: UserId) -> Result<Vec<ProgressRecord>, StorageError>;
}

//
// ─── IN-MEMORY ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone)]
struct StoredItem {
    id: SessionItemId,
    translation_from_id: TranslationId,
    translation_to_id: TranslationId,
    correct: Option<bool>,
    user_answer: Option<String>,
}

#[derive(Debug, Clone)]
struct StoredSession {
    header: SessionHeader,
    items: Vec<StoredItem>,
}

#[derive(Debug, Default)]
struct MemoryState {
    languages: BTreeMap<LanguageCode, Language>,
    domains: BTreeMap<DomainCode, Domain>,
    concepts: BTreeMap<ConceptId, Concept>,
    translations: BTreeMap<TranslationId, Translation>,
    configs: BTreeMap<SessionConfigId, SessionConfig>,
    sessions: BTreeMap<SessionId, StoredSession>,
    progress: BTreeMap<(UserId, TranslationId), ProgressRecord>,
    last_id: u64,
}

impl MemoryState {
    fn next_id(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }

    fn hydrate(&self, stored: &StoredSession) -> Result<Session, StorageError> {
        let lookup = |id: TranslationId| {
            self.translations
                .get(&id)
                .cloned()
                .ok_or_else(|| StorageError::Serialization(format!("missing translation {id}")))
        };
        let mut items = Vec::with_capacity(stored.items.len());
        for item in &stored.items {
            let hydrated = SessionItem::from_persisted(
                item.id,
                lookup(item.translation_from_id)?,
                lookup(item.translation_to_id)?,
                item.correct,
                item.user_answer.clone(),
            )
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
            items.push(hydrated);
        }
        Session::from_persisted(stored.header.clone(), items)
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }

    fn bump_progress(
        &mut self,
        user_id: UserId,
        translation_id: TranslationId,
        correct: bool,
        at: DateTime<Utc>,
    ) -> ProgressRecord {
        let record = self
            .progress
            .entry((user_id, translation_id))
            .or_insert_with(|| ProgressRecord::new(user_id, translation_id, at));
        record.record(correct, at);
        record.clone()
    }
}

/// Simple in-memory repository implementation for testing and prototyping.
///
/// All state sits behind one mutex, so every trait call is atomic.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StorageError> {
        self.state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }

    /// Number of stored sessions, across all users.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn session_count(&self) -> Result<usize, StorageError> {
        Ok(self.lock()?.sessions.len())
    }
}

#[async_trait]
impl CatalogRepository for InMemoryRepository {
    async fn upsert_language(&self, language: &Language) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        guard
            .languages
            .insert(language.code.clone(), language.clone());
        Ok(())
    }

    async fn upsert_domain(&self, domain: &Domain) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        guard.domains.insert(domain.code.clone(), domain.clone());
        Ok(())
    }

    async fn insert_concept(&self, concept: &NewConcept) -> Result<ConceptId, StorageError> {
        let mut guard = self.lock()?;
        if !guard.domains.contains_key(&concept.domain) {
            return Err(StorageError::NotFound);
        }
        if guard.concepts.values().any(|c| c.key == concept.key) {
            return Err(StorageError::Conflict);
        }
        let id = ConceptId::new(guard.next_id());
        guard.concepts.insert(id, concept.clone().assign_id(id));
        Ok(id)
    }

    async fn insert_translation(
        &self,
        translation: &NewTranslation,
    ) -> Result<TranslationId, StorageError> {
        let mut guard = self.lock()?;
        if !guard.concepts.contains_key(&translation.concept_id)
            || !guard.languages.contains_key(&translation.language)
        {
            return Err(StorageError::NotFound);
        }
        let duplicate = guard.translations.values().any(|t| {
            t.concept_id == translation.concept_id && t.language == translation.language
        });
        if duplicate {
            return Err(StorageError::Conflict);
        }
        let id = TranslationId::new(guard.next_id());
        guard
            .translations
            .insert(id, translation.clone().assign_id(id));
        Ok(id)
    }

    async fn list_languages(&self) -> Result<Vec<Language>, StorageError> {
        Ok(self.lock()?.languages.values().cloned().collect())
    }

    async fn list_domains(&self) -> Result<Vec<Domain>, StorageError> {
        Ok(self.lock()?.domains.values().cloned().collect())
    }

    async fn eligible_concepts(
        &self,
        criteria: &SelectionCriteria,
    ) -> Result<Vec<ConceptId>, StorageError> {
        let guard = self.lock()?;
        Ok(eligible_concepts(
            criteria,
            guard.concepts.values(),
            guard.translations.values(),
        ))
    }

    async fn translations_for(
        &self,
        concept_ids: &[ConceptId],
        languages: &[LanguageCode],
    ) -> Result<Vec<Translation>, StorageError> {
        let guard = self.lock()?;
        let wanted: HashSet<ConceptId> = concept_ids.iter().copied().collect();
        Ok(guard
            .translations
            .values()
            .filter(|t| wanted.contains(&t.concept_id) && languages.contains(&t.language))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SessionConfigRepository for InMemoryRepository {
    async fn insert_config(
        &self,
        config: &ValidatedSessionConfig,
    ) -> Result<SessionConfigId, StorageError> {
        let mut guard = self.lock()?;
        let id = SessionConfigId::new(guard.next_id());
        guard.configs.insert(id, config.clone().assign_id(id));
        Ok(id)
    }

    async fn get_config(&self, id: SessionConfigId) -> Result<SessionConfig, StorageError> {
        self.lock()?
            .configs
            .get(&id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl SessionRepository for InMemoryRepository {
    async fn create_session(
        &self,
        session: &NewSessionRecord,
        items: &[NewSessionItem],
    ) -> Result<SessionId, StorageError> {
        if items.is_empty() {
            return Err(StorageError::Conflict);
        }
        let mut guard = self.lock()?;
        if !guard.configs.contains_key(&session.config_id) {
            return Err(StorageError::NotFound);
        }
        let known = items.iter().all(|i| {
            guard.translations.contains_key(&i.translation_from_id)
                && guard.translations.contains_key(&i.translation_to_id)
        });
        if !known {
            return Err(StorageError::NotFound);
        }

        let id = SessionId::new(guard.next_id());
        let mut stored_items = Vec::with_capacity(items.len());
        for item in items {
            stored_items.push(StoredItem {
                id: SessionItemId::new(guard.next_id()),
                translation_from_id: item.translation_from_id,
                translation_to_id: item.translation_to_id,
                correct: None,
                user_answer: None,
            });
        }
        let header = SessionHeader {
            id,
            user_id: session.user_id,
            config_id: session.config_id,
            source_language: session.source_language.clone(),
            target_language: session.target_language.clone(),
            domain: session.domain.clone(),
            difficulty: session.difficulty,
            kind: session.kind,
            score: None,
            created_at: session.created_at,
            completed_at: None,
        };
        guard.sessions.insert(
            id,
            StoredSession {
                header,
                items: stored_items,
            },
        );
        Ok(id)
    }

    async fn get_session(&self, id: SessionId) -> Result<Session, StorageError> {
        let guard = self.lock()?;
        let stored = guard.sessions.get(&id).ok_or(StorageError::NotFound)?;
        guard.hydrate(stored)
    }

    async fn list_sessions(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<SessionOverview>, StorageError> {
        let guard = self.lock()?;
        let mut rows: Vec<SessionOverview> = guard
            .sessions
            .values()
            .filter(|s| s.header.user_id == user_id)
            .map(|s| SessionOverview {
                header: s.header.clone(),
                item_count: u32::try_from(s.items.len()).unwrap_or(u32::MAX),
            })
            .collect();
        rows.sort_by(|a, b| {
            (b.header.created_at, b.header.id).cmp(&(a.header.created_at, a.header.id))
        });
        rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(rows)
    }
}

#[async_trait]
impl SubmissionPersistence for InMemoryRepository {
    async fn apply_submission(
        &self,
        submission: &SubmissionRecord,
    ) -> Result<Grading, StorageError> {
        let mut guard = self.lock()?;
        let grading = {
            let stored = guard
                .sessions
                .get(&submission.session_id)
                .filter(|s| s.header.user_id == submission.user_id)
                .ok_or(StorageError::NotFound)?;
            let slots: Vec<ItemSlot> = stored
                .items
                .iter()
                .map(|i| ItemSlot {
                    item_id: i.id,
                    translation_to_id: i.translation_to_id,
                })
                .collect();
            grade(&slots, &submission.answers)
        };

        if let Some(stored) = guard.sessions.get_mut(&submission.session_id) {
            for answer in &grading.graded {
                if let Some(item) = stored.items.iter_mut().find(|i| i.id == answer.item_id) {
                    item.correct = Some(answer.correct);
                    item.user_answer.clone_from(&answer.user_answer);
                }
            }
            stored.header.score = Some(grading.score);
            stored.header.completed_at = Some(submission.submitted_at);
        }

        for answer in &grading.graded {
            guard.bump_progress(
                submission.user_id,
                answer.translation_id,
                answer.correct,
                submission.submitted_at,
            );
        }

        Ok(grading)
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn record_answer(
        &self,
        user_id: UserId,
        translation_id: TranslationId,
        correct: bool,
        at: DateTime<Utc>,
    ) -> Result<ProgressRecord, StorageError> {
        Ok(self
            .lock()?
            .bump_progress(user_id, translation_id, correct, at))
    }

    async fn get_progress(
        &self,
        user_id: UserId,
        translation_id: TranslationId,
    ) -> Result<Option<ProgressRecord>, StorageError> {
        Ok(self
            .lock()?
            .progress
            .get(&(user_id, translation_id))
            .cloned())
    }

    async fn list_progress(&self, user_id: UserId) -> Result<Vec<ProgressRecord>, StorageError> {
        Ok(self
            .lock()?
            .progress
            .range((user_id, TranslationId::new(0))..=(user_id, TranslationId::new(u64::MAX)))
            .map(|(_, r)| r.clone())
            .collect())
    }
}

//
// ─── AGGREGATE ─────────────────────────────────────────────────────────────────
//

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub catalog: Arc<dyn CatalogRepository>,
    pub configs: Arc<dyn SessionConfigRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub submissions: Arc<dyn SubmissionPersistence>,
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_repository(InMemoryRepository::new())
    }

    /// Share one repository value across every contract it implements.
    #[must_use]
    pub fn from_repository<R>(repo: R) -> Self
    where
        R: CatalogRepository
            + SessionConfigRepository
            + SessionRepository
            + SubmissionPersistence
            + ProgressRepository
            + Clone
            + 'static,
    {
        Self {
            catalog: Arc::new(repo.clone()),
            configs: Arc::new(repo.clone()),
            sessions: Arc::new(repo.clone()),
            submissions: Arc::new(repo.clone()),
            progress: Arc::new(repo),
        }
    }
}
