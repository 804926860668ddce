use vocab_core::model::{SessionConfig, SessionConfigId, ValidatedSessionConfig};

use super::SqliteRepository;
use super::mapping::{db_err, i64_to_u64, id_i64, map_config_row};
use crate::repository::{SessionConfigRepository, StorageError};

#[async_trait::async_trait]
impl SessionConfigRepository for SqliteRepository {
    async fn insert_config(
        &self,
        config: &ValidatedSessionConfig,
    ) -> Result<SessionConfigId, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO session_configs (
                user_id, native_language, tested_language, difficulty, domain_code, kind,
                created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
        )
        .bind(id_i64("user_id", config.user_id.value())?)
        .bind(config.native_language.as_str())
        .bind(config.tested_language.as_str())
        .bind(config.difficulty.map(|d| d.rank()))
        .bind(config.domain.code().map(|c| c.as_str()))
        .bind(config.kind.as_str())
        .bind(config.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(SessionConfigId::new(i64_to_u64(
            "config_id",
            res.last_insert_rowid(),
        )?))
    }

    async fn get_config(&self, id: SessionConfigId) -> Result<SessionConfig, StorageError> {
        let row = sqlx::query(
            r"
            SELECT
                id, user_id, native_language, tested_language, difficulty, domain_code, kind,
                created_at
            FROM session_configs
            WHERE id = ?1
            ",
        )
        .bind(id_i64("config_id", id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or(StorageError::NotFound)?;

        map_config_row(&row)
    }
}
