use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use vocab_core::model::{
    ConceptId, Difficulty, DomainCode, DomainFilter, LanguageCode, MediaRef, ProgressRecord,
    Score, SessionConfig, SessionConfigId, SessionHeader, SessionId, SessionKind, Translation,
    TranslationId, UserId,
};

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Map driver errors, turning constraint violations into domain outcomes.
pub(crate) fn db_err(e: sqlx::Error) -> StorageError {
    match &e {
        sqlx::Error::RowNotFound => StorageError::NotFound,
        sqlx::Error::Database(db) if db.is_unique_violation() => StorageError::Conflict,
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => StorageError::NotFound,
        _ => StorageError::Connection(e.to_string()),
    }
}

pub(crate) fn id_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

fn get_id(row: &SqliteRow, column: &'static str) -> Result<u64, StorageError> {
    i64_to_u64(column, row.try_get::<i64, _>(column).map_err(ser)?)
}

pub(crate) fn difficulty_from_rank(rank: Option<i64>) -> Result<Option<Difficulty>, StorageError> {
    rank.map(Difficulty::from_rank).transpose().map_err(ser)
}

pub(crate) fn parse_language(raw: &str) -> Result<LanguageCode, StorageError> {
    LanguageCode::parse(raw).map_err(ser)
}

fn parse_domain_filter(raw: Option<String>) -> Result<DomainFilter, StorageError> {
    let code = raw.map(DomainCode::parse).transpose().map_err(ser)?;
    Ok(DomainFilter::from_code(code))
}

fn parse_media(raw: Option<String>) -> Result<Option<MediaRef>, StorageError> {
    raw.map(MediaRef::parse).transpose().map_err(ser)
}

pub(crate) fn map_translation_row(row: &SqliteRow) -> Result<Translation, StorageError> {
    let language: String = row.try_get("language_code").map_err(ser)?;
    Ok(Translation {
        id: TranslationId::new(get_id(row, "id")?),
        concept_id: ConceptId::new(get_id(row, "concept_id")?),
        language: parse_language(&language)?,
        text: row.try_get("text").map_err(ser)?,
        audio: parse_media(row.try_get("audio").map_err(ser)?)?,
        gender: row.try_get("gender").map_err(ser)?,
        plural_text: row.try_get("plural_text").map_err(ser)?,
        example_sentence: row.try_get("example_sentence").map_err(ser)?,
    })
}

pub(crate) fn map_config_row(row: &SqliteRow) -> Result<SessionConfig, StorageError> {
    let native: String = row.try_get("native_language").map_err(ser)?;
    let tested: String = row.try_get("tested_language").map_err(ser)?;
    let kind: String = row.try_get("kind").map_err(ser)?;
    Ok(SessionConfig {
        id: SessionConfigId::new(get_id(row, "id")?),
        user_id: UserId::new(get_id(row, "user_id")?),
        native_language: parse_language(&native)?,
        tested_language: parse_language(&tested)?,
        difficulty: difficulty_from_rank(row.try_get("difficulty").map_err(ser)?)?,
        domain: parse_domain_filter(row.try_get("domain_code").map_err(ser)?)?,
        kind: kind.parse::<SessionKind>().map_err(ser)?,
        created_at: row.try_get("created_at").map_err(ser)?,
    })
}

pub(crate) fn map_header_row(row: &SqliteRow) -> Result<SessionHeader, StorageError> {
    let source: String = row.try_get("source_language").map_err(ser)?;
    let target: String = row.try_get("target_language").map_err(ser)?;
    let kind: String = row.try_get("kind").map_err(ser)?;
    let score = row
        .try_get::<Option<i64>, _>("score")
        .map_err(ser)?
        .map(Score::new)
        .transpose()
        .map_err(ser)?;
    Ok(SessionHeader {
        id: SessionId::new(get_id(row, "id")?),
        user_id: UserId::new(get_id(row, "user_id")?),
        config_id: SessionConfigId::new(get_id(row, "config_id")?),
        source_language: parse_language(&source)?,
        target_language: parse_language(&target)?,
        domain: parse_domain_filter(row.try_get("domain_code").map_err(ser)?)?,
        difficulty: difficulty_from_rank(row.try_get("difficulty").map_err(ser)?)?,
        kind: kind.parse::<SessionKind>().map_err(ser)?,
        score,
        created_at: row.try_get("created_at").map_err(ser)?,
        completed_at: row.try_get("completed_at").map_err(ser)?,
    })
}

pub(crate) fn map_progress_row(row: &SqliteRow) -> Result<ProgressRecord, StorageError> {
    let last_reviewed: DateTime<Utc> = row.try_get("last_reviewed").map_err(ser)?;
    ProgressRecord::from_persisted(
        UserId::new(get_id(row, "user_id")?),
        TranslationId::new(get_id(row, "translation_id")?),
        row.try_get::<i64, _>("correct_count").map_err(ser)?,
        row.try_get::<i64, _>("incorrect_count").map_err(ser)?,
        last_reviewed,
    )
    .map_err(ser)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_ids_are_rejected() {
        let err = i64_to_u64("session_id", -4).unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }

    #[test]
    fn oversized_ids_are_rejected() {
        let err = id_i64("translation_id", u64::MAX).unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }

    #[test]
    fn difficulty_ranks_round_trip() {
        assert_eq!(
            difficulty_from_rank(Some(Difficulty::Hard.rank())).unwrap(),
            Some(Difficulty::Hard)
        );
        assert_eq!(difficulty_from_rank(None).unwrap(), None);
        assert!(difficulty_from_rank(Some(7)).is_err());
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        assert!(matches!(
            db_err(sqlx::Error::RowNotFound),
            StorageError::NotFound
        ));
    }
}
