use anyhow::{Context, Result};

use crate::interview::prompts::OptimizationLevel;

/// Default maximum number of questions per interview.
pub const DEFAULT_MAX_QUESTIONS: u32 = 10;
/// Valid range for the configured maximum question count.
pub const MAX_QUESTIONS_RANGE: std::ops::RangeInclusive<u32> = 1..=50;

/// Application configuration loaded from environment variables.
///
/// The completion backend credentials are optional at startup — absence is
/// surfaced as `CompletionUnavailable` at call time, not as a boot failure.
/// The embedding endpoint is likewise optional; without it the deterministic
/// fallback embedding is used.
#[derive(Debug, Clone)]
pub struct Config {
    pub completion_endpoint: Option<String>,
    pub completion_api_key: Option<String>,
    pub embedding_endpoint: Option<String>,
    pub embedding_api_key: Option<String>,
    pub max_questions: u32,
    pub opening_optimization: OptimizationLevel,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let max_questions = match std::env::var("MAX_QUESTIONS") {
            Ok(v) => {
                let n = v
                    .parse::<u32>()
                    .context("MAX_QUESTIONS must be a positive integer")?;
                anyhow::ensure!(
                    MAX_QUESTIONS_RANGE.contains(&n),
                    "MAX_QUESTIONS must be between {} and {}",
                    MAX_QUESTIONS_RANGE.start(),
                    MAX_QUESTIONS_RANGE.end()
                );
                n
            }
            Err(_) => DEFAULT_MAX_QUESTIONS,
        };

        let opening_optimization = match std::env::var("OPENING_OPTIMIZATION_LEVEL") {
            Ok(v) => v
                .parse::<OptimizationLevel>()
                .map_err(|e| anyhow::anyhow!("OPENING_OPTIMIZATION_LEVEL: {e}"))?,
            Err(_) => OptimizationLevel::Maximum,
        };

        Ok(Config {
            completion_endpoint: optional_env("COMPLETION_ENDPOINT"),
            completion_api_key: optional_env("COMPLETION_API_KEY"),
            embedding_endpoint: optional_env("EMBEDDING_ENDPOINT"),
            embedding_api_key: optional_env("EMBEDDING_API_KEY"),
            max_questions,
            opening_optimization,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
