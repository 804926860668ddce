use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use vocab_core::model::{ProgressRecord, TranslationId, UserId};

use super::SqliteRepository;
use super::mapping::{db_err, id_i64, map_progress_row};
use crate::repository::{ProgressRepository, StorageError};

/// Count one answer in a single statement so concurrent writers never lose
/// an increment or race on first insert.
pub(crate) async fn bump_progress(
    conn: &mut SqliteConnection,
    user_id: UserId,
    translation_id: TranslationId,
    correct: bool,
    at: DateTime<Utc>,
) -> Result<ProgressRecord, StorageError> {
    let (correct_delta, incorrect_delta) = if correct { (1_i64, 0_i64) } else { (0, 1) };

    let row = sqlx::query(
        r"
        INSERT INTO progress_records (
            user_id, translation_id, correct_count, incorrect_count, last_reviewed
        )
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT(user_id, translation_id) DO UPDATE SET
            correct_count = correct_count + excluded.correct_count,
            incorrect_count = incorrect_count + excluded.incorrect_count,
            last_reviewed = excluded.last_reviewed
        RETURNING user_id, translation_id, correct_count, incorrect_count, last_reviewed
        ",
    )
    .bind(id_i64("user_id", user_id.value())?)
    .bind(id_i64("translation_id", translation_id.value())?)
    .bind(correct_delta)
    .bind(incorrect_delta)
    .bind(at)
    .fetch_one(&mut *conn)
    .await
    .map_err(db_err)?;

    map_progress_row(&row)
}

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn record_answer(
        &self,
        user_id: UserId,
        translation_id: TranslationId,
        correct: bool,
        at: DateTime<Utc>,
    ) -> Result<ProgressRecord, StorageError> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        bump_progress(&mut conn, user_id, translation_id, correct, at).await
    }

    async fn get_progress(
        &self,
        user_id: UserId,
        translation_id: TranslationId,
    ) -> Result<Option<ProgressRecord>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT user_id, translation_id, correct_count, incorrect_count, last_reviewed
            FROM progress_records
            WHERE user_id = ?1 AND translation_id = ?2
            ",
        )
        .bind(id_i64("user_id", user_id.value())?)
        .bind(id_i64("translation_id", translation_id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(map_progress_row).transpose()
    }

    async fn list_progress(&self, user_id: UserId) -> Result<Vec<ProgressRecord>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT user_id, translation_id, correct_count, incorrect_count, last_reviewed
            FROM progress_records
            WHERE user_id = ?1
            ORDER BY translation_id ASC
            ",
        )
        .bind(id_i64("user_id", user_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_progress_row(&row)?);
        }
        Ok(out)
    }
}
