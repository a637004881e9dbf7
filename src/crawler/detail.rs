//! Detail page extraction
//!
//! A detail page describes one programme. Its title gives the `formation`
//! and every accordion section below it is one open-day session.

use crate::crawler::selectors::{DetailSelectors, COMMENT_LABEL, DETAIL_MARKER, TITLE};
use crate::record::Record;
use crate::render::{PageGuard, RenderedPage, Renderer, Wait};
use crate::{Result, ScrapeError};
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;

/// Extracts the records of one detail page
///
/// Opens `url` in its own rendering context, waits for the page structure,
/// reads it and closes the context again, whatever the outcome.
///
/// # Errors
///
/// * `Timeout` - The structural marker did not show up within `timeout`
/// * `MissingElement` - The page has no programme title
/// * Any navigation or close failure of the renderer
pub async fn extract<R: Renderer>(renderer: &R, url: &str, timeout: Duration) -> Result<Vec<Record>> {
    tracing::debug!("Opening detail page {}", url);
    let page = PageGuard::new(renderer.open(url).await?, url);

    let outcome = read_page(&*page, url, timeout).await;
    let closed = page.close().await;

    let records = outcome?;
    closed?;

    tracing::debug!("Extracted {} record(s) from {}", records.len(), url);
    Ok(records)
}

async fn read_page<P: RenderedPage>(page: &P, url: &str, timeout: Duration) -> Result<Vec<Record>> {
    page.wait_for(DETAIL_MARKER, Wait::present(timeout)).await?;
    let html = page.html().await?;
    parse_detail(&html, url)
}

/// Parses detail page markup into records
///
/// A page without sections yields a single placeholder record carrying only
/// the programme name; otherwise there is one record per section, in
/// document order.
pub fn parse_detail(html: &str, url: &str) -> Result<Vec<Record>> {
    let selectors = DetailSelectors::compile()?;
    let document = Html::parse_document(html);

    let formation = document
        .select(&selectors.title)
        .next()
        .map(text_of)
        .ok_or_else(|| ScrapeError::MissingElement {
            selector: TITLE.to_string(),
            url: url.to_string(),
        })?;

    let sections: Vec<ElementRef> = document.select(&selectors.section).collect();
    if sections.is_empty() {
        return Ok(vec![Record::no_sessions(formation)]);
    }

    let records = sections
        .into_iter()
        .map(|section| Record {
            formation: formation.clone(),
            date: optional_text(section, &selectors.date).unwrap_or_default(),
            horaire: optional_text(section, &selectors.schedule).unwrap_or_default(),
            presence: optional_text(section, &selectors.presence).unwrap_or_default(),
            commentaire: comment(section, &selectors.labels).unwrap_or_default(),
            lien: optional_attr(section, &selectors.link, "href").unwrap_or_default(),
        })
        .collect();

    Ok(records)
}

/// Trimmed text content of an element and its descendants
fn text_of(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Text of the first match of `selector` inside `scope`
fn optional_text(scope: ElementRef, selector: &Selector) -> Option<String> {
    scope.select(selector).next().map(text_of)
}

/// Attribute of the first match of `selector` inside `scope`
fn optional_attr(scope: ElementRef, selector: &Selector, attr: &str) -> Option<String> {
    scope
        .select(selector)
        .next()
        .and_then(|element| element.value().attr(attr))
        .map(str::to_string)
}

/// Text of the element right after the comment label
fn comment(scope: ElementRef, labels: &Selector) -> Option<String> {
    scope
        .select(labels)
        .find(|label| text_of(*label) == COMMENT_LABEL)
        .and_then(|label| label.next_siblings().find_map(ElementRef::wrap))
        .map(text_of)
}
