mod config;
mod seed;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use services::{AppServices, Clock, SessionQueries};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use vocab_core::grading::Answer;
use vocab_core::model::{
    SessionConfigDraft, SessionConfigId, SessionId, SessionKind, TranslationId, UserId,
};

use crate::config::{AppConfig, normalize_sqlite_url, prepare_sqlite_file};

#[derive(Parser, Debug)]
#[command(name = "vocab", version, about = "Vocabulary drill sessions")]
struct Cli {
    /// `SQLite` database URL or path.
    #[arg(long, env = "VOCAB_DB_URL", default_value = "sqlite://vocab.sqlite3")]
    db: String,

    /// TOML settings file.
    #[arg(long, env = "VOCAB_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the demo catalog.
    Seed,
    /// Save session criteria for a user.
    Config {
        #[arg(long)]
        user: u64,
        #[arg(long)]
        native: String,
        #[arg(long)]
        tested: String,
        /// EASY, MEDIUM or HARD; omit for any difficulty.
        #[arg(long)]
        difficulty: Option<String>,
        /// Domain code; omit or ALL for every domain.
        #[arg(long)]
        domain: Option<String>,
        #[arg(long, default_value = "expression", value_parser = parse_kind)]
        kind: SessionKind,
    },
    /// Generate a session from a saved config.
    Start {
        #[arg(long)]
        user: u64,
        #[arg(long)]
        config: u64,
    },
    /// Grade answers for a session.
    Submit {
        #[arg(long)]
        user: u64,
        #[arg(long)]
        session: u64,
        /// `TRANSLATION_ID:true|false[:text]`, repeatable.
        #[arg(long = "answer", required = true, value_parser = parse_answer)]
        answers: Vec<Answer>,
    },
    Show {
        #[arg(long)]
        user: u64,
        #[arg(long)]
        session: u64,
    },
    /// Most recent sessions first.
    List {
        #[arg(long)]
        user: u64,
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    Progress {
        #[arg(long)]
        user: u64,
        /// Print totals instead of per-translation records.
        #[arg(long)]
        summary: bool,
    },
    /// List difficulty tiers.
    Difficulties,
}

fn parse_kind(raw: &str) -> Result<SessionKind, String> {
    raw.parse::<SessionKind>().map_err(|e| e.to_string())
}

fn parse_answer(raw: &str) -> Result<Answer, String> {
    let mut parts = raw.splitn(3, ':');
    let id = parts
        .next()
        .unwrap_or_default()
        .trim()
        .parse::<u64>()
        .map_err(|_| format!("invalid translation id in `{raw}`"))?;
    let correct = match parts.next().map(str::trim) {
        Some("true" | "1" | "y") => true,
        Some("false" | "0" | "n") => false,
        _ => return Err(format!("expected `ID:true|false[:text]`, got `{raw}`")),
    };

    let answer = Answer::new(TranslationId::new(id), correct);
    Ok(match parts.next() {
        Some(text) if !text.is_empty() => answer.with_user_answer(text),
        _ => answer,
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Command::Difficulties = cli.command {
        return Ok(print_json(&SessionQueries::difficulties())?);
    }

    let app_config = AppConfig::load(cli.config.as_deref())?;
    let db_url = normalize_sqlite_url(&cli.db);
    prepare_sqlite_file(&db_url)?;
    debug!(db_url = %db_url, "opening database");

    let app = AppServices::new_sqlite(&db_url, Clock::system(), app_config.generator).await?;

    match cli.command {
        Command::Seed => {
            let report = seed::seed_demo_catalog(app.storage().catalog.as_ref()).await?;
            print_json(&report)?;
        }
        Command::Config {
            user,
            native,
            tested,
            difficulty,
            domain,
            kind,
        } => {
            let draft = SessionConfigDraft {
                native_language: native,
                tested_language: tested,
                difficulty,
                domain,
                kind,
            };
            let config = app.configs().create_config(UserId::new(user), draft).await?;
            print_json(&config)?;
        }
        Command::Start { user, config } => {
            let session = app
                .generator()
                .generate(UserId::new(user), SessionConfigId::new(config))
                .await?;
            print_json(&session)?;
        }
        Command::Submit {
            user,
            session,
            answers,
        } => {
            let session = app
                .submissions()
                .submit(UserId::new(user), SessionId::new(session), answers)
                .await?;
            info!(
                session_id = %session.id(),
                score = session.score().map(|s| s.value()),
                "session graded"
            );
            print_json(&session)?;
        }
        Command::Show { user, session } => {
            let session = app
                .queries()
                .get_session(UserId::new(user), SessionId::new(session))
                .await?;
            print_json(&session)?;
        }
        Command::List { user, limit } => {
            let sessions = app.queries().list_sessions(UserId::new(user), limit).await?;
            print_json(&sessions)?;
        }
        Command::Progress { user, summary } => {
            let tracker = app.progress();
            if summary {
                print_json(&tracker.progress_summary(UserId::new(user)).await?)?;
            } else {
                print_json(&tracker.progress_for(UserId::new(user)).await?)?;
            }
        }
        Command::Difficulties => {}
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli).await {
        eprintln!("error: {err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answers_parse_with_and_without_text() {
        let plain = parse_answer("17:true").unwrap();
        assert_eq!(plain.translation_to_id, TranslationId::new(17));
        assert!(plain.correct);
        assert_eq!(plain.user_answer, None);

        let typed = parse_answer("4:false:la maison").unwrap();
        assert!(!typed.correct);
        assert_eq!(typed.user_answer.as_deref(), Some("la maison"));

        let with_colon = parse_answer("4:true:a:b").unwrap();
        assert_eq!(with_colon.user_answer.as_deref(), Some("a:b"));
    }

    #[test]
    fn malformed_answers_are_rejected() {
        assert!(parse_answer("x:true").is_err());
        assert!(parse_answer("3").is_err());
        assert!(parse_answer("3:maybe").is_err());
    }

    #[test]
    fn kind_is_case_insensitive() {
        assert_eq!(parse_kind("mixed").unwrap(), SessionKind::Mixed);
        assert!(parse_kind("dictation").is_err());
    }

    #[test]
    fn cli_accepts_repeated_answers() {
        let cli = Cli::try_parse_from([
            "vocab", "--db", "sqlite::memory:", "submit", "--user", "1", "--session", "2",
            "--answer", "5:true", "--answer", "6:false",
        ])
        .unwrap();
        match cli.command {
            Command::Submit { answers, .. } => assert_eq!(answers.len(), 2),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
