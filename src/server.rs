//! HTTP trigger
//!
//! Exposes one endpoint that runs a full crawl and answers with a plain
//! text verdict: 200 when the crawl succeeded, 500 otherwise. Crawls are
//! serialized on the store lock, so two requests never write at once.

use crate::config::Config;
use crate::crawler::{trigger, CrawlOutcome};
use crate::storage::SqliteStore;
use crate::{ConfigError, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const SUCCESS_MESSAGE: &str = "Scraping and saving completed.";
pub const FAILURE_MESSAGE: &str = "An error occurred while scraping and saving.";

/// Shared state of the trigger
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    store: Arc<Mutex<SqliteStore>>,
}

impl AppState {
    pub fn new(config: Config, store: SqliteStore) -> Self {
        Self {
            config: Arc::new(config),
            store: Arc::new(Mutex::new(store)),
        }
    }
}

/// Builds the trigger's routes
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(run_handler).post(run_handler))
        .route("/healthz", get(healthz))
        .with_state(state)
}

/// Binds `[server] bind` and serves until the process stops
pub async fn serve(config: Config, store: SqliteStore) -> Result<()> {
    let addr: SocketAddr = config.server.bind.parse().map_err(|e| {
        ConfigError::Validation(format!("Invalid bind address '{}': {}", config.server.bind, e))
    })?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Crawl trigger listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(AppState::new(config, store))).await?;
    Ok(())
}

async fn run_handler(State(state): State<AppState>) -> (StatusCode, &'static str) {
    let mut store = state.store.lock().await;
    tracing::info!("Crawl triggered");

    match trigger(&state.config, &mut *store).await {
        CrawlOutcome::Succeeded => (StatusCode::OK, SUCCESS_MESSAGE),
        CrawlOutcome::Failed => (StatusCode::INTERNAL_SERVER_ERROR, FAILURE_MESSAGE),
    }
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
