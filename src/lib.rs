//! JPO scraper: open-day session harvester
//!
//! This crate walks the paginated card directory of an admissions portal,
//! renders every card's detail page, extracts one record per open-day session
//! from its accordion sections and persists each page's records as a batch in
//! a document store.

pub mod config;
pub mod crawler;
pub mod record;
pub mod render;
pub mod server;
pub mod storage;


use thiserror::Error;

/// Main error type for scraper operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Browser error: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),

    #[error("Failed to launch browser: {0}")]
    BrowserLaunch(String),

    #[error("Timed out after {timeout_ms}ms waiting for '{selector}' on {url}")]
    Timeout {
        selector: String,
        url: String,
        timeout_ms: u64,
    },

    #[error("Element '{selector}' not found on {url}")]
    MissingElement { selector: String, url: String },

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid selector '{0}'")]
    Selector(String),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for scraper operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, run_crawl, trigger, walk, CrawlOutcome, WalkSummary};
pub use record::Record;
pub use storage::{RecordSink, SqliteStore};
