use sqlx::Row;
use vocab_core::grading::{Grading, ItemSlot, grade};
use vocab_core::model::{SessionItemId, TranslationId};

use super::SqliteRepository;
use super::mapping::{db_err, i64_to_u64, id_i64, ser};
use super::progress_repo::bump_progress;
use crate::repository::{StorageError, SubmissionPersistence, SubmissionRecord};

#[async_trait::async_trait]
impl SubmissionPersistence for SqliteRepository {
    async fn apply_submission(
        &self,
        submission: &SubmissionRecord,
    ) -> Result<Grading, StorageError> {
        let session_id = id_i64("session_id", submission.session_id.value())?;
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        // Writing first takes the database write lock, which serializes
        // concurrent submissions for the rest of the transaction.
        let claimed = sqlx::query(
            r"
            UPDATE sessions
            SET completed_at = ?1
            WHERE id = ?2 AND user_id = ?3
            ",
        )
        .bind(submission.submitted_at)
        .bind(session_id)
        .bind(id_i64("user_id", submission.user_id.value())?)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;
        if claimed.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        let rows = sqlx::query(
            r"
            SELECT id, translation_to_id
            FROM session_items
            WHERE session_id = ?1
            ORDER BY position ASC
            ",
        )
        .bind(session_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(db_err)?;

        let mut slots = Vec::with_capacity(rows.len());
        for row in rows {
            slots.push(ItemSlot {
                item_id: SessionItemId::new(i64_to_u64(
                    "item_id",
                    row.try_get::<i64, _>("id").map_err(ser)?,
                )?),
                translation_to_id: TranslationId::new(i64_to_u64(
                    "translation_to_id",
                    row.try_get::<i64, _>("translation_to_id").map_err(ser)?,
                )?),
            });
        }

        let grading = grade(&slots, &submission.answers);

        for answer in &grading.graded {
            sqlx::query(
                r"
                UPDATE session_items
                SET correct = ?1, user_answer = ?2
                WHERE id = ?3
                ",
            )
            .bind(i64::from(answer.correct))
            .bind(answer.user_answer.as_deref())
            .bind(id_i64("item_id", answer.item_id.value())?)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

            bump_progress(
                &mut tx,
                submission.user_id,
                answer.translation_id,
                answer.correct,
                submission.submitted_at,
            )
            .await?;
        }

        sqlx::query("UPDATE sessions SET score = ?1 WHERE id = ?2")
            .bind(i64::from(grading.score.value()))
            .bind(session_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;

        Ok(grading)
    }
}
