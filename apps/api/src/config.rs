use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::interview::generator::{BEHAVIORAL_QUESTION_COUNT, DEFAULT_MAX_QUESTIONS};

/// Application configuration loaded from environment variables.
/// Fails at startup if a variable is present but malformed.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. When unset the service keeps sessions in memory.
    pub database_url: Option<String>,
    /// Base URL of the text-similarity scoring service. Optional.
    pub scoring_oracle_url: Option<String>,
    pub scoring_oracle_timeout: Duration,
    pub max_questions: usize,
    /// Fixed seed for question selection. Unset means entropy-seeded.
    pub question_seed: Option<u64>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let max_questions = max_questions(optional_env("MAX_QUESTIONS"))?;

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            scoring_oracle_url: optional_env("SCORING_ORACLE_URL"),
            scoring_oracle_timeout: Duration::from_millis(parse_env(
                "SCORING_ORACLE_TIMEOUT_MS",
                3000u64,
            )?),
            max_questions,
            question_seed: optional_env("QUESTION_SEED")
                .map(|s| s.parse::<u64>())
                .transpose()
                .context("QUESTION_SEED must be an unsigned integer")?,
            port: parse_env("PORT", 8080u16)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
{
    parse_value(key, optional_env(key), default)
}

fn parse_value<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: std::str::FromStr,
{
    match raw {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|_| anyhow::anyhow!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

/// The behavioral questions are always asked, so the cap must leave room for them.
fn max_questions(raw: Option<String>) -> Result<usize> {
    let max_questions = parse_value("MAX_QUESTIONS", raw, DEFAULT_MAX_QUESTIONS)?;
    if max_questions < BEHAVIORAL_QUESTION_COUNT {
        bail!("MAX_QUESTIONS must be at least {BEHAVIORAL_QUESTION_COUNT}");
    }
    Ok(max_questions)
}
