use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for the scraper
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub renderer: RendererConfig,
    pub store: StoreConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Listing page the crawl starts from
    #[serde(rename = "listing-url")]
    pub listing_url: String,

    /// Bound on iterations of the pagination loop
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,

    /// How long a detail page may take to show its structural marker (milliseconds)
    #[serde(rename = "detail-timeout-ms", default = "default_detail_timeout_ms")]
    pub detail_timeout_ms: u64,

    /// How long the listing may take to show its cards after "next" (milliseconds)
    #[serde(
        rename = "pagination-timeout-ms",
        default = "default_pagination_timeout_ms"
    )]
    pub pagination_timeout_ms: u64,
}

impl CrawlerConfig {
    pub fn detail_timeout(&self) -> Duration {
        Duration::from_millis(self.detail_timeout_ms)
    }

    pub fn pagination_timeout(&self) -> Duration {
        Duration::from_millis(self.pagination_timeout_ms)
    }
}

/// Which rendering engine drives the crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    /// Headless Chromium over CDP
    #[default]
    Chromium,
    /// Plain HTTP fetches of server-rendered HTML
    Http,
}

/// Rendering engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RendererConfig {
    #[serde(default)]
    pub kind: RendererKind,

    /// Path to the Chromium executable; auto-detected when absent
    #[serde(default)]
    pub executable: Option<String>,

    /// Extra command-line arguments passed to Chromium
    #[serde(default = "default_browser_args")]
    pub args: Vec<String>,

    #[serde(default = "default_headless")]
    pub headless: bool,

    /// User agent sent by the HTTP renderer
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout of the HTTP renderer (milliseconds)
    #[serde(
        rename = "request-timeout-ms",
        default = "default_request_timeout_ms"
    )]
    pub request_timeout_ms: u64,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            kind: RendererKind::default(),
            executable: None,
            args: default_browser_args(),
            headless: default_headless(),
            user_agent: default_user_agent(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// Document store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Logical collection the documents are written to
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Prefix prepended to the batch index to form a document id
    #[serde(rename = "document-prefix", default = "default_document_prefix")]
    pub document_prefix: String,
}

/// HTTP trigger configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind the HTTP server to (host:port)
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_max_pages() -> u32 {
    1
}

fn default_detail_timeout_ms() -> u64 {
    10_000
}

fn default_pagination_timeout_ms() -> u64 {
    30_000
}

fn default_browser_args() -> Vec<String> {
    vec!["--disable-features=IsolateOrigins,site-per-process".to_string()]
}

fn default_headless() -> bool {
    true
}

fn default_user_agent() -> String {
    format!("jpo-scraper/{}", env!("CARGO_PKG_VERSION"))
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_collection() -> String {
    "parcoursup_data".to_string()
}

fn default_document_prefix() -> String {
    "data_".to_string()
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}
