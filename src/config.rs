//! Environment-driven settings.
//!
//! `.env` is loaded first (if present), then the process environment is read.
//! CLI flags override these per command.

use std::path::PathBuf;

use crate::error::AppError;

pub const DEFAULT_DB_PATH: &str = "proposicoes.db";
pub const DEFAULT_BASE_URL: &str = "https://dadosabertos.almg.gov.br";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// SQLite database file (`PROPSTAT_DB`).
    pub db_path: PathBuf,
    /// Open-data portal root (`PROPSTAT_BASE_URL`).
    pub base_url: String,
    /// `env_logger` filter (`RUST_LOG`).
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            base_url: DEFAULT_BASE_URL.to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup (the environment in
    /// production, a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let base_url = match non_empty("PROPSTAT_BASE_URL") {
            Some(url) => {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(AppError::new(
                        2,
                        format!("PROPSTAT_BASE_URL must be an http(s) URL, got '{url}'."),
                    ));
                }
                url.trim_end_matches('/').to_string()
            }
            None => defaults.base_url,
        };

        Ok(Self {
            db_path: non_empty("PROPSTAT_DB").map(PathBuf::from).unwrap_or(defaults.db_path),
            base_url,
            log_filter: non_empty("RUST_LOG").unwrap_or(defaults.log_filter),
        })
    }
}
