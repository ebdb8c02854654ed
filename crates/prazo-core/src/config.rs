//! prazo configuration — secrets from the environment, tunables with defaults.
//!
//! The five credentials are required and validated at startup; everything
//! else falls back to a default and can be overridden via `PRAZO_*`
//! environment variables or the CLI.

use std::path::PathBuf;

use crate::error::{PrazoError, Result};

/// Run configuration, built once at process start.
#[derive(Debug, Clone)]
pub struct Config {
    /// Notion integration token (`NOTION_API_KEY`).
    pub notion_api_key: String,
    /// Task database to query (`NOTION_DATABASE_ID`).
    pub notion_database_id: String,
    /// Telegram bot token (`TELEGRAM_BOT_TOKEN`).
    pub telegram_bot_token: String,
    /// Primary reminder chat (`TELEGRAM_CHAT_ID`).
    pub telegram_chat_id: String,
    /// Secondary plain-text broadcast chat (`TELEGRAM_CHAT_ID_WPP`).
    pub telegram_chat_id_wpp: String,

    pub cache_dir: PathBuf,
    pub log_dir: PathBuf,
    /// Notion query page size.
    pub page_size: u32,
    /// Records per worker batch.
    pub batch_size: usize,
    /// Concurrent batch workers.
    pub workers: usize,
    /// Page/title caches older than this are discarded wholesale.
    pub cache_max_age_days: u64,
    /// Log files older than this are pruned at run end.
    pub log_max_age_days: u64,
    /// Tasks due within this many days trigger a reminder.
    pub reminder_window_days: i64,
}

fn default_cache_dir() -> PathBuf { PathBuf::from("caches") }
fn default_log_dir() -> PathBuf { PathBuf::from("logs") }
fn default_page_size() -> u32 { 100 }
fn default_batch_size() -> usize { 50 }
fn default_workers() -> usize { 10 }
fn default_cache_max_age_days() -> u64 { 3 }
fn default_log_max_age_days() -> u64 { 7 }
fn default_reminder_window_days() -> i64 { 7 }

impl Config {
    /// Build the configuration from the environment.
    ///
    /// Fails with [`PrazoError::Config`] if any required credential is
    /// absent or empty — nothing useful can happen without them.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            notion_api_key: required("NOTION_API_KEY")?,
            notion_database_id: required("NOTION_DATABASE_ID")?,
            telegram_bot_token: required("TELEGRAM_BOT_TOKEN")?,
            telegram_chat_id: required("TELEGRAM_CHAT_ID")?,
            telegram_chat_id_wpp: required("TELEGRAM_CHAT_ID_WPP")?,
            cache_dir: std::env::var("PRAZO_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_cache_dir()),
            log_dir: std::env::var("PRAZO_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_log_dir()),
            page_size: env_or("PRAZO_PAGE_SIZE", default_page_size()),
            batch_size: env_or("PRAZO_BATCH_SIZE", default_batch_size()),
            workers: env_or("PRAZO_WORKERS", default_workers()),
            cache_max_age_days: env_or("PRAZO_CACHE_MAX_AGE_DAYS", default_cache_max_age_days()),
            log_max_age_days: env_or("PRAZO_LOG_MAX_AGE_DAYS", default_log_max_age_days()),
            reminder_window_days: env_or("PRAZO_REMINDER_WINDOW_DAYS", default_reminder_window_days()),
        })
    }
}

fn required(key: &str) -> Result<String> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(PrazoError::Config(format!(
            "environment variable '{key}' is not set"
        ))),
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_missing() {
        assert!(required("PRAZO_TEST_DEFINITELY_UNSET").is_err());
    }

    #[test]
    fn test_env_or_falls_back() {
        let v: u32 = env_or("PRAZO_TEST_ALSO_UNSET", 42);
        assert_eq!(v, 42);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(default_page_size(), 100);
        assert_eq!(default_batch_size(), 50);
        assert_eq!(default_workers(), 10);
        assert_eq!(default_reminder_window_days(), 7);
    }
}
