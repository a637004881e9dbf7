//! Crawl orchestration
//!
//! Wires a renderer, the listing walker and a record sink together and turns
//! the result into the coarse outcome reported to callers.

use crate::config::{Config, CrawlerConfig, RendererKind};
use crate::crawler::listing::{walk, WalkSummary};
use crate::render::{ChromiumRenderer, HttpRenderer, PageGuard, Renderer};
use crate::storage::RecordSink;
use crate::Result;
use std::time::Instant;

/// Binary result of one triggered crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlOutcome {
    Succeeded,
    Failed,
}

/// Runs one crawl on an already started renderer
///
/// Opens the listing page, walks it and releases both the listing context
/// and the renderer, on success and on failure alike.
pub async fn run_crawl<R, S>(renderer: R, sink: &mut S, config: &CrawlerConfig) -> Result<WalkSummary>
where
    R: Renderer,
    S: RecordSink + Send,
{
    let outcome = walk_listing(&renderer, sink, config).await;
    let shutdown = renderer.shutdown().await;

    let summary = outcome?;
    shutdown?;
    Ok(summary)
}

async fn walk_listing<R, S>(renderer: &R, sink: &mut S, config: &CrawlerConfig) -> Result<WalkSummary>
where
    R: Renderer,
    S: RecordSink + Send,
{
    tracing::info!("Opening listing page {}", config.listing_url);
    let listing = PageGuard::new(renderer.open(&config.listing_url).await?, &config.listing_url);

    let outcome = walk(renderer, &*listing, sink, config).await;
    let closed = listing.close().await;

    let summary = outcome?;
    closed?;
    Ok(summary)
}

/// Starts the configured renderer and runs one crawl with it
pub async fn crawl<S>(config: &Config, sink: &mut S) -> Result<WalkSummary>
where
    S: RecordSink + Send,
{
    match config.renderer.kind {
        RendererKind::Chromium => {
            let renderer = ChromiumRenderer::launch(&config.renderer).await?;
            run_crawl(renderer, sink, &config.crawler).await
        }
        RendererKind::Http => {
            let renderer = HttpRenderer::new(&config.renderer)?;
            run_crawl(renderer, sink, &config.crawler).await
        }
    }
}

/// Runs one crawl and reduces its result to success or failure
///
/// The error itself only reaches the logs.
pub async fn trigger<S>(config: &Config, sink: &mut S) -> CrawlOutcome
where
    S: RecordSink + Send,
{
    let start_time = Instant::now();

    match crawl(config, sink).await {
        Ok(summary) => {
            tracing::info!(
                "Crawl completed: {} listing page(s), {} detail page(s), {} record(s) in {:?}",
                summary.pages,
                summary.links,
                summary.records,
                start_time.elapsed()
            );
            CrawlOutcome::Succeeded
        }
        Err(e) => {
            tracing::error!("Crawl failed after {:?}: {}", start_time.elapsed(), e);
            CrawlOutcome::Failed
        }
    }
}
