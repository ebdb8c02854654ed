//! prazo error types.
//!
//! Only fatal paths surface as errors: missing configuration and Notion
//! API failures during startup or the initial fetch, plus Telegram
//! failures (which callers log and survive). Cache I/O never errors —
//! an unreadable cache is just an empty one.

use thiserror::Error;

/// Result alias used across prazo crates.
pub type Result<T> = std::result::Result<T, PrazoError>;

#[derive(Debug, Error)]
pub enum PrazoError {
    /// Missing or invalid configuration — fatal at startup.
    #[error("config: {0}")]
    Config(String),

    /// Notion API failure.
    #[error("notion: {0}")]
    Notion(String),

    /// Telegram API failure.
    #[error("channel: {0}")]
    Channel(String),
}
