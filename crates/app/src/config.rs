use std::path::{Path, PathBuf};

use serde::Deserialize;
use services::GeneratorSettings;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigFileError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error("invalid database url: {0}")]
    DatabaseUrl(String),
}

/// Optional TOML settings file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub generator: GeneratorSettings,
}

impl AppConfig {
    /// Load settings from `path`, or defaults when no path is given.
    ///
    /// # Errors
    ///
    /// Returns `ConfigFileError` if the file cannot be read or parsed, or
    /// asks for empty sessions.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigFileError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&raw).map_err(|source| ConfigFileError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if config.generator.default_session_size == 0 {
            return Err(ConfigFileError::Invalid(
                "generator.default_session_size must be at least 1".into(),
            ));
        }
        Ok(config)
    }

    fn parse(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }
}

/// Turn `sqlite:relative.db` or a bare path into an absolute `sqlite://` URL.
pub fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" || trimmed.starts_with("sqlite://") {
        return trimmed.to_owned();
    }

    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Create the database file and its parent directory if missing.
///
/// # Errors
///
/// Returns `ConfigFileError::DatabaseUrl` for URLs without a file path and
/// `ConfigFileError::Read` when the file cannot be created.
pub fn prepare_sqlite_file(db_url: &str) -> Result<(), ConfigFileError> {
    if db_url == "sqlite::memory:" || db_url.contains("mode=memory") {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ConfigFileError::DatabaseUrl(db_url.to_owned()))?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ConfigFileError::DatabaseUrl(db_url.to_owned()));
    }

    let path = Path::new(path);
    let io_err = |source| ConfigFileError::Read {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .map_err(io_err)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vocab_core::model::DifficultyMatch;

    #[test]
    fn missing_path_gives_defaults() {
        let config = AppConfig::load(None).unwrap();
        assert_eq!(config.generator, GeneratorSettings::default());
    }

    #[test]
    fn parses_generator_table() {
        let config = AppConfig::parse(
            r#"
            [generator]
            difficulty_match = "exact"
            default_session_size = 12
            "#,
        )
        .unwrap();
        assert_eq!(config.generator.difficulty_match, DifficultyMatch::Exact);
        assert_eq!(config.generator.default_session_size, 12);
    }

    #[test]
    fn partial_table_keeps_other_defaults() {
        let config = AppConfig::parse("[generator]\ndefault_session_size = 5\n").unwrap();
        assert_eq!(config.generator.difficulty_match, DifficultyMatch::Ceiling);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(AppConfig::parse("[generator]\nsize = 3\n").is_err());
        assert!(AppConfig::parse("[scheduler]\n").is_err());
    }

    #[test]
    fn zero_session_size_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocab.toml");
        std::fs::write(&path, "[generator]\ndefault_session_size = 0\n").unwrap();
        let err = AppConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigFileError::Invalid(_)));
    }

    #[test]
    fn relative_urls_become_absolute() {
        let url = normalize_sqlite_url("sqlite:data/vocab.sqlite3");
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/vocab.sqlite3"));
        assert_eq!(normalize_sqlite_url("sqlite::memory:"), "sqlite::memory:");
    }

    #[test]
    fn prepare_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("vocab.sqlite3");
        let url = format!("sqlite://{}", path.display());
        prepare_sqlite_file(&url).unwrap();
        assert!(path.exists());
        assert!(matches!(
            prepare_sqlite_file("postgres://x"),
            Err(ConfigFileError::DatabaseUrl(_))
        ));
    }
}
