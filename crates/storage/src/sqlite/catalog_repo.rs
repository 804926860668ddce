use sqlx::Row;
use vocab_core::model::{
    ConceptId, DifficultyMatch, Domain, DomainCode, Language, LanguageCode, NewConcept,
    NewTranslation, SelectionCriteria, Translation, TranslationId,
};

use super::SqliteRepository;
use super::mapping::{db_err, i64_to_u64, id_i64, map_translation_row, parse_language, ser};
use crate::repository::{CatalogRepository, StorageError};

#[async_trait::async_trait]
impl CatalogRepository for SqliteRepository {
    async fn upsert_language(&self, language: &Language) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO languages (code, name)
            VALUES (?1, ?2)
            ON CONFLICT(code) DO UPDATE SET name = excluded.name
            ",
        )
        .bind(language.code.as_str())
        .bind(&language.name)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn upsert_domain(&self, domain: &Domain) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO domains (code, name)
            VALUES (?1, ?2)
            ON CONFLICT(code) DO UPDATE SET name = excluded.name
            ",
        )
        .bind(domain.code.as_str())
        .bind(&domain.name)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn insert_concept(&self, concept: &NewConcept) -> Result<ConceptId, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO concepts (concept_key, domain_code, difficulty, image, word_type)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(&concept.key)
        .bind(concept.domain.as_str())
        .bind(concept.difficulty.rank())
        .bind(concept.image.as_ref().map(|m| m.as_str().to_owned()))
        .bind(concept.word_type.map(|w| w.as_str()))
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(ConceptId::new(i64_to_u64(
            "concept_id",
            res.last_insert_rowid(),
        )?))
    }

    async fn insert_translation(
        &self,
        translation: &NewTranslation,
    ) -> Result<TranslationId, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO translations (
                concept_id, language_code, text, audio, gender, plural_text, example_sentence
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
        )
        .bind(id_i64("concept_id", translation.concept_id.value())?)
        .bind(translation.language.as_str())
        .bind(&translation.text)
        .bind(translation.audio.as_ref().map(|m| m.as_str().to_owned()))
        .bind(translation.gender.as_deref())
        .bind(translation.plural_text.as_deref())
        .bind(translation.example_sentence.as_deref())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(TranslationId::new(i64_to_u64(
            "translation_id",
            res.last_insert_rowid(),
        )?))
    }

    async fn list_languages(&self) -> Result<Vec<Language>, StorageError> {
        let rows = sqlx::query("SELECT code, name FROM languages ORDER BY code")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let code: String = row.try_get("code").map_err(ser)?;
            let name: String = row.try_get("name").map_err(ser)?;
            out.push(Language::new(parse_language(&code)?, name).map_err(ser)?);
        }
        Ok(out)
    }

    async fn list_domains(&self) -> Result<Vec<Domain>, StorageError> {
        let rows = sqlx::query("SELECT code, name FROM domains ORDER BY code")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let code: String = row.try_get("code").map_err(ser)?;
            let name: String = row.try_get("name").map_err(ser)?;
            out.push(Domain::new(DomainCode::parse(code).map_err(ser)?, name).map_err(ser)?);
        }
        Ok(out)
    }

    async fn eligible_concepts(
        &self,
        criteria: &SelectionCriteria,
    ) -> Result<Vec<ConceptId>, StorageError> {
        let mut sql = String::from(
            r"
            SELECT c.id AS id
            FROM concepts c
            JOIN translations t ON t.concept_id = c.id
            WHERE t.language_code IN (?1, ?2)
            ",
        );
        let mut next = 3;
        let domain = criteria.domain.code();
        if domain.is_some() {
            sql.push_str(&format!("  AND c.domain_code = ?{next}\n"));
            next += 1;
        }
        if criteria.difficulty.is_some() {
            let op = match criteria.difficulty_match {
                DifficultyMatch::Ceiling => "<=",
                DifficultyMatch::Exact => "=",
            };
            sql.push_str(&format!("  AND c.difficulty {op} ?{next}\n"));
        }
        sql.push_str(
            r"
            GROUP BY c.id
            HAVING COUNT(DISTINCT t.language_code) = 2
            ORDER BY c.id
            ",
        );

        let mut q = sqlx::query(&sql)
            .bind(criteria.source.as_str())
            .bind(criteria.target.as_str());
        if let Some(code) = domain {
            q = q.bind(code.as_str());
        }
        if let Some(difficulty) = criteria.difficulty {
            q = q.bind(difficulty.rank());
        }

        let rows = q.fetch_all(&self.pool).await.map_err(db_err)?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let id: i64 = row.try_get("id").map_err(ser)?;
            out.push(ConceptId::new(i64_to_u64("concept_id", id)?));
        }
        Ok(out)
    }

    async fn translations_for(
        &self,
        concept_ids: &[ConceptId],
        languages: &[LanguageCode],
    ) -> Result<Vec<Translation>, StorageError> {
        if concept_ids.is_empty() || languages.is_empty() {
            return Ok(Vec::new());
        }

        let mut sql = String::from(
            r"
            SELECT
                id, concept_id, language_code, text, audio, gender, plural_text,
                example_sentence
            FROM translations
            WHERE language_code IN (
            ",
        );
        let mut param = 1;
        for i in 0..languages.len() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push('?');
            sql.push_str(&param.to_string());
            param += 1;
        }
        sql.push_str(") AND concept_id IN (");
        for i in 0..concept_ids.len() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push('?');
            sql.push_str(&param.to_string());
            param += 1;
        }
        sql.push_str(")\nORDER BY concept_id, language_code\n");

        let mut q = sqlx::query(&sql);
        for language in languages {
            q = q.bind(language.as_str());
        }
        for id in concept_ids {
            q = q.bind(id_i64("concept_id", id.value())?);
        }

        let rows = q.fetch_all(&self.pool).await.map_err(db_err)?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_translation_row(&row)?);
        }
        Ok(out)
    }
}
