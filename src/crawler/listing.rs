//! Listing walker
//!
//! Harvests the detail links of the current listing page, extracts and
//! flushes each one in turn, then clicks through to the next listing page.

use crate::config::CrawlerConfig;
use crate::crawler::detail::extract;
use crate::crawler::selectors::{compile, CARD, CARD_ACTION, NEXT_PAGE};
use crate::render::{RenderedPage, Renderer, Wait};
use crate::storage::RecordSink;
use crate::Result;
use scraper::Html;
use std::time::Duration;
use url::Url;

/// Counters of one walk, for logging
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkSummary {
    /// Listing pages harvested
    pub pages: u32,
    /// Detail pages extracted and flushed
    pub links: usize,
    /// Records handed to the sink
    pub records: usize,
}

/// Walks the listing and flushes the records of every detail page
///
/// The outer loop runs at most `config.max_pages` times. Each iteration:
/// 1. harvests the card links of the current listing page
/// 2. extracts every link, one at a time, flushing its records immediately
/// 3. tries to advance the listing, stopping the walk when there is no
///    "next" control
///
/// Any extraction or flush failure aborts the walk; no link after the
/// failing one is visited.
///
/// # Arguments
///
/// * `renderer` - Opens the detail pages, each in its own context
/// * `listing` - Context already positioned on the first listing page
/// * `sink` - Receives one batch per detail page
/// * `config` - Page bound and timeouts
pub async fn walk<R, S>(
    renderer: &R,
    listing: &R::Page,
    sink: &mut S,
    config: &CrawlerConfig,
) -> Result<WalkSummary>
where
    R: Renderer,
    S: RecordSink + Send,
{
    let mut summary = WalkSummary::default();
    let mut page_count = 0;

    while page_count < config.max_pages {
        let base_url = listing.url().await?;
        let html = listing.html().await?;
        let links = harvest_links(&html, &base_url)?;
        summary.pages += 1;

        tracing::info!(
            "Listing page {}: {} detail link(s) at {}",
            summary.pages,
            links.len(),
            base_url
        );

        for link in &links {
            let records = extract(renderer, link, config.detail_timeout()).await?;
            sink.flush(&records)?;

            summary.links += 1;
            summary.records += records.len();
        }

        if !advance(listing, config.pagination_timeout()).await? {
            tracing::info!("No next listing page, walk complete");
            break;
        }
        page_count += 1;
    }

    Ok(summary)
}

/// Clicks the "next" control and waits for the cards to come back
///
/// Returns `Ok(false)` when the control is absent.
pub async fn advance<P: RenderedPage>(listing: &P, timeout: Duration) -> Result<bool> {
    if !listing.click(NEXT_PAGE).await? {
        return Ok(false);
    }

    listing.wait_for(CARD, Wait::visible(timeout)).await?;
    tracing::debug!("Advanced to next listing page");
    Ok(true)
}

/// Extracts the detail links of a listing page, in document order
///
/// Cards without an action link, or whose link has no `href`, are skipped.
/// Links are resolved against `base_url`; an `href` that does not resolve
/// fails the whole harvest.
pub fn harvest_links(html: &str, base_url: &str) -> Result<Vec<String>> {
    let base = Url::parse(base_url)?;
    let cards = compile(CARD)?;
    let action = compile(CARD_ACTION)?;
    let document = Html::parse_document(html);

    let links = document
        .select(&cards)
        .filter_map(|card| card.select(&action).next())
        .filter_map(|button| button.value().attr("href"))
        .map(|href| base.join(href.trim()).map(|url| url.to_string()))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(links)
}
