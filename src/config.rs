// src/config.rs

use std::{env, path::PathBuf, str::FromStr};

use dotenvy::dotenv;

use crate::error::AppError;

/// Cached answers older than this are discarded.
pub const CACHE_TTL_HOURS: i64 = 24;

/// Violations tolerated before the exam is submitted automatically.
pub const DEFAULT_MAX_VIOLATIONS: u32 = 3;

/// Quiet period before a burst of answer edits is written to the cache.
pub const DEFAULT_SAVE_DEBOUNCE_MS: u64 = 1000;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub api_token: Option<String>,
    pub rust_log: String,
    pub cache_dir: PathBuf,
    pub log_dir: PathBuf,
    pub max_violations: u32,
    pub save_debounce_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        let api_url = env::var("EXAM_API_URL")
            .map_err(|_| AppError::Config("EXAM_API_URL must be set".to_string()))?;

        let api_token = env::var("EXAM_API_TOKEN").ok().filter(|t| !t.is_empty());

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let cache_dir = env::var("EXAM_CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".exam-cache"));

        let log_dir = env::var("EXAM_LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("logs"));

        let max_violations = parse_var("EXAM_MAX_VIOLATIONS", DEFAULT_MAX_VIOLATIONS)?;
        if max_violations == 0 {
            return Err(AppError::Config(
                "EXAM_MAX_VIOLATIONS must be at least 1".to_string(),
            ));
        }

        let save_debounce_ms = parse_var("EXAM_SAVE_DEBOUNCE_MS", DEFAULT_SAVE_DEBOUNCE_MS)?;

        Ok(Self {
            api_url,
            api_token,
            rust_log,
            cache_dir,
            log_dir,
            max_violations,
            save_debounce_ms,
        })
    }
}

/// Reads an optional numeric variable, falling back to `default` when unset.
fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{} is not a valid number: {}", name, raw))),
        Err(_) => Ok(default),
    }
}
