use std::collections::HashMap;

use sqlx::Row;
use vocab_core::model::{
    Session, SessionId, SessionItem, SessionItemId, SessionOverview, Translation, TranslationId,
    UserId,
};

use super::SqliteRepository;
use super::mapping::{db_err, i64_to_u64, id_i64, map_header_row, map_translation_row, ser};
use crate::repository::{NewSessionItem, NewSessionRecord, SessionRepository, StorageError};

const HEADER_COLUMNS: &str = r"
    s.id AS id, s.user_id AS user_id, s.config_id AS config_id,
    s.source_language AS source_language, s.target_language AS target_language,
    s.domain_code AS domain_code, s.difficulty AS difficulty, s.kind AS kind,
    s.score AS score, s.created_at AS created_at, s.completed_at AS completed_at
";

impl SqliteRepository {
    async fn load_translations(
        &self,
        ids: &[i64],
    ) -> Result<HashMap<u64, Translation>, StorageError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let mut sql = String::from(
            r"
            SELECT
                id, concept_id, language_code, text, audio, gender, plural_text,
                example_sentence
            FROM translations
            WHERE id IN (
            ",
        );
        for i in 0..ids.len() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push('?');
            sql.push_str(&(i + 1).to_string());
        }
        sql.push_str(")\n");

        let mut q = sqlx::query(&sql);
        for id in ids {
            q = q.bind(*id);
        }
        let rows = q.fetch_all(&self.pool).await.map_err(db_err)?;

        let mut by_id = HashMap::with_capacity(rows.len());
        for row in rows {
            let t = map_translation_row(&row)?;
            by_id.insert(t.id.value(), t);
        }
        Ok(by_id)
    }
}

#[async_trait::async_trait]
impl SessionRepository for SqliteRepository {
    async fn create_session(
        &self,
        session: &NewSessionRecord,
        items: &[NewSessionItem],
    ) -> Result<SessionId, StorageError> {
        if items.is_empty() {
            return Err(StorageError::Conflict);
        }

        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let res = sqlx::query(
            r"
            INSERT INTO sessions (
                user_id, config_id, source_language, target_language, domain_code,
                difficulty, kind, score, created_at, completed_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL, ?8, NULL)
            ",
        )
        .bind(id_i64("user_id", session.user_id.value())?)
        .bind(id_i64("config_id", session.config_id.value())?)
        .bind(session.source_language.as_str())
        .bind(session.target_language.as_str())
        .bind(session.domain.code().map(|c| c.as_str()))
        .bind(session.difficulty.map(|d| d.rank()))
        .bind(session.kind.as_str())
        .bind(session.created_at)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;
        let session_id = res.last_insert_rowid();

        for (position, item) in items.iter().enumerate() {
            sqlx::query(
                r"
                INSERT INTO session_items (
                    session_id, position, translation_from_id, translation_to_id
                )
                VALUES (?1, ?2, ?3, ?4)
                ",
            )
            .bind(session_id)
            .bind(i64::try_from(position).map_err(ser)?)
            .bind(id_i64("translation_id", item.translation_from_id.value())?)
            .bind(id_i64("translation_id", item.translation_to_id.value())?)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }

        tx.commit().await.map_err(db_err)?;

        Ok(SessionId::new(i64_to_u64("session_id", session_id)?))
    }

    async fn get_session(&self, id: SessionId) -> Result<Session, StorageError> {
        let session_id = id_i64("session_id", id.value())?;
        let sql = format!("SELECT {HEADER_COLUMNS} FROM sessions s WHERE s.id = ?1");
        let header_row = sqlx::query(&sql)
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .ok_or(StorageError::NotFound)?;
        let header = map_header_row(&header_row)?;

        let item_rows = sqlx::query(
            r"
            SELECT id, translation_from_id, translation_to_id, correct, user_answer
            FROM session_items
            WHERE session_id = ?1
            ORDER BY position ASC
            ",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let mut translation_ids = Vec::with_capacity(item_rows.len() * 2);
        for row in &item_rows {
            translation_ids.push(row.try_get::<i64, _>("translation_from_id").map_err(ser)?);
            translation_ids.push(row.try_get::<i64, _>("translation_to_id").map_err(ser)?);
        }
        translation_ids.sort_unstable();
        translation_ids.dedup();
        let translations = self.load_translations(&translation_ids).await?;

        let lookup = |raw: i64| -> Result<Translation, StorageError> {
            let id = TranslationId::new(i64_to_u64("translation_id", raw)?);
            translations
                .get(&id.value())
                .cloned()
                .ok_or_else(|| StorageError::Serialization(format!("missing translation {id}")))
        };

        let mut items = Vec::with_capacity(item_rows.len());
        for row in &item_rows {
            let item_id = i64_to_u64("item_id", row.try_get::<i64, _>("id").map_err(ser)?)?;
            let correct: Option<i64> = row.try_get("correct").map_err(ser)?;
            items.push(
                SessionItem::from_persisted(
                    SessionItemId::new(item_id),
                    lookup(row.try_get("translation_from_id").map_err(ser)?)?,
                    lookup(row.try_get("translation_to_id").map_err(ser)?)?,
                    correct.map(|c| c != 0),
                    row.try_get("user_answer").map_err(ser)?,
                )
                .map_err(ser)?,
            );
        }

        Session::from_persisted(header, items).map_err(ser)
    }

    async fn list_sessions(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<SessionOverview>, StorageError> {
        let sql = format!(
            r"
            SELECT {HEADER_COLUMNS},
                (SELECT COUNT(*) FROM session_items i WHERE i.session_id = s.id) AS item_count
            FROM sessions s
            WHERE s.user_id = ?1
            ORDER BY s.created_at DESC, s.id DESC
            LIMIT ?2
            "
        );
        let rows = sqlx::query(&sql)
            .bind(id_i64("user_id", user_id.value())?)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let count: i64 = row.try_get("item_count").map_err(ser)?;
            out.push(SessionOverview {
                header: map_header_row(&row)?,
                item_count: u32::try_from(count).map_err(ser)?,
            });
        }
        Ok(out)
    }
}
