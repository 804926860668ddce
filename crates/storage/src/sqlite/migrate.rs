use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Runs versioned migrations for the current schema.
///
/// Version 1 creates the catalog (languages, domains, concepts, translations),
/// session configs, sessions with their items, and per-user progress.
#[allow(clippy::too_many_lines)]
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        let statements = [
            r"
                CREATE TABLE IF NOT EXISTS languages (
                    code TEXT PRIMARY KEY,
                    name TEXT NOT NULL
                );
            ",
            r"
                CREATE TABLE IF NOT EXISTS domains (
                    code TEXT PRIMARY KEY,
                    name TEXT NOT NULL
                );
            ",
            r"
                CREATE TABLE IF NOT EXISTS concepts (
                    id INTEGER PRIMARY KEY,
                    concept_key TEXT NOT NULL UNIQUE,
                    domain_code TEXT NOT NULL,
                    difficulty INTEGER NOT NULL CHECK (difficulty BETWEEN 0 AND 2),
                    image TEXT,
                    word_type TEXT,
                    FOREIGN KEY (domain_code) REFERENCES domains(code)
                );
            ",
            r"
                CREATE TABLE IF NOT EXISTS translations (
                    id INTEGER PRIMARY KEY,
                    concept_id INTEGER NOT NULL,
                    language_code TEXT NOT NULL,
                    text TEXT NOT NULL,
                    audio TEXT,
                    gender TEXT,
                    plural_text TEXT,
                    example_sentence TEXT,
                    UNIQUE (concept_id, language_code),
                    FOREIGN KEY (concept_id) REFERENCES concepts(id) ON DELETE CASCADE,
                    FOREIGN KEY (language_code) REFERENCES languages(code)
                );
            ",
            r"
                CREATE TABLE IF NOT EXISTS session_configs (
                    id INTEGER PRIMARY KEY,
                    user_id INTEGER NOT NULL,
                    native_language TEXT NOT NULL,
                    tested_language TEXT NOT NULL,
                    difficulty INTEGER CHECK (difficulty BETWEEN 0 AND 2),
                    domain_code TEXT,
                    kind TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    CHECK (native_language <> tested_language)
                );
            ",
            r"
                CREATE TABLE IF NOT EXISTS sessions (
                    id INTEGER PRIMARY KEY,
                    user_id INTEGER NOT NULL,
                    config_id INTEGER NOT NULL,
                    source_language TEXT NOT NULL,
                    target_language TEXT NOT NULL,
                    domain_code TEXT,
                    difficulty INTEGER CHECK (difficulty BETWEEN 0 AND 2),
                    kind TEXT NOT NULL,
                    score INTEGER CHECK (score BETWEEN 0 AND 100),
                    created_at TEXT NOT NULL,
                    completed_at TEXT,
                    FOREIGN KEY (config_id) REFERENCES session_configs(id)
                );
            ",
            r"
                CREATE TABLE IF NOT EXISTS session_items (
                    id INTEGER PRIMARY KEY,
                    session_id INTEGER NOT NULL,
                    position INTEGER NOT NULL CHECK (position >= 0),
                    translation_from_id INTEGER NOT NULL,
                    translation_to_id INTEGER NOT NULL,
                    correct INTEGER CHECK (correct IN (0, 1)),
                    user_answer TEXT,
                    UNIQUE (session_id, translation_to_id),
                    FOREIGN KEY (session_id) REFERENCES sessions(id) ON DELETE CASCADE,
                    FOREIGN KEY (translation_from_id) REFERENCES translations(id),
                    FOREIGN KEY (translation_to_id) REFERENCES translations(id)
                );
            ",
            r"
                CREATE TABLE IF NOT EXISTS progress_records (
                    user_id INTEGER NOT NULL,
                    translation_id INTEGER NOT NULL,
                    correct_count INTEGER NOT NULL CHECK (correct_count >= 0),
                    incorrect_count INTEGER NOT NULL CHECK (incorrect_count >= 0),
                    last_reviewed TEXT NOT NULL,
                    PRIMARY KEY (user_id, translation_id),
                    FOREIGN KEY (translation_id) REFERENCES translations(id)
                );
            ",
            r"
                CREATE INDEX IF NOT EXISTS idx_translations_language_concept
                    ON translations (language_code, concept_id);
            ",
            r"
                CREATE INDEX IF NOT EXISTS idx_sessions_user_created
                    ON sessions (user_id, created_at);
            ",
            r"
                CREATE INDEX IF NOT EXISTS idx_session_items_session_position
                    ON session_items (session_id, position);
            ",
        ];

        for statement in statements {
            sqlx::query(statement).execute(&mut *tx).await?;
        }

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
    }

    Ok(())
}
