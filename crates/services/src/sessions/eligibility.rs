use std::sync::Arc;

use storage::repository::CatalogRepository;
use tracing::debug;
use vocab_core::model::{ConceptId, SelectionCriteria};

use crate::error::SessionError;

/// Computes which concepts can back a session for the given criteria.
#[derive(Clone)]
pub struct EligibilityResolver {
    catalog: Arc<dyn CatalogRepository>,
}

impl EligibilityResolver {
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogRepository>) -> Self {
        Self { catalog }
    }

    /// Concepts translated into both languages of `criteria` that pass its
    /// domain and difficulty filters, ascending by id.
    ///
    /// An empty result is returned as-is; callers decide whether it is fatal.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the catalog cannot be queried.
    pub async fn resolve(
        &self,
        criteria: &SelectionCriteria,
    ) -> Result<Vec<ConceptId>, SessionError> {
        let eligible = self.catalog.eligible_concepts(criteria).await?;
        debug!(
            source = %criteria.source,
            target = %criteria.target,
            domain = ?criteria.domain,
            difficulty = ?criteria.difficulty,
            mode = ?criteria.difficulty_match,
            eligible = eligible.len(),
            "resolved eligible concepts"
        );
        Ok(eligible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::InMemoryRepository;
    use vocab_core::model::{
        Difficulty, Domain, DomainCode, Language, LanguageCode, NewConcept, NewTranslation,
    };

    fn lang(code: &str) -> LanguageCode {
        LanguageCode::parse(code).unwrap()
    }

    async fn catalog() -> InMemoryRepository {
        let repo = InMemoryRepository::new();
        for (code, name) in [("en", "English"), ("es", "Spanish")] {
            repo.upsert_language(&Language::new(lang(code), name).unwrap())
                .await
                .unwrap();
        }
        let domain = DomainCode::parse("HOME").unwrap();
        repo.upsert_domain(&Domain::new(domain.clone(), "Home").unwrap())
            .await
            .unwrap();
        for (key, difficulty) in [
            ("door", Difficulty::Easy),
            ("window", Difficulty::Medium),
            ("chimney", Difficulty::Hard),
        ] {
            let id = repo
                .insert_concept(&NewConcept::new(key, domain.clone(), difficulty).unwrap())
                .await
                .unwrap();
            for code in ["en", "es"] {
                repo.insert_translation(
                    &NewTranslation::new(id, lang(code), format!("{key}-{code}")).unwrap(),
                )
                .await
                .unwrap();
            }
        }
        repo
    }

    #[tokio::test]
    async fn medium_ceiling_is_a_superset_of_easy() {
        let resolver = EligibilityResolver::new(Arc::new(catalog().await));
        let base = SelectionCriteria::new(lang("en"), lang("es"));

        let easy = resolver
            .resolve(&base.clone().with_difficulty(Some(Difficulty::Easy)))
            .await
            .unwrap();
        let medium = resolver
            .resolve(&base.clone().with_difficulty(Some(Difficulty::Medium)))
            .await
            .unwrap();
        let all = resolver.resolve(&base).await.unwrap();

        assert_eq!(easy.len(), 1);
        assert_eq!(medium.len(), 2);
        assert!(easy.iter().all(|c| medium.contains(c)));
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn unknown_language_pair_resolves_to_nothing() {
        let resolver = EligibilityResolver::new(Arc::new(catalog().await));
        let criteria = SelectionCriteria::new(lang("en"), lang("ja"));
        assert!(resolver.resolve(&criteria).await.unwrap().is_empty());
    }
}
