//! Static HTML renderer
//!
//! Fetches server-rendered pages with reqwest and answers every query from
//! the fetched markup. No script runs, so:
//! - waits succeed or fail at once, there is nothing to wait for
//! - a click follows the clicked element's `href` (or `data-href`) and
//!   replaces the page content with the target document

use crate::config::RendererConfig;
use crate::crawler::selectors::compile;
use crate::render::{RenderedPage, Renderer, Wait};
use crate::{Result, ScrapeError};
use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;
use std::time::Duration;
use tokio::sync::Mutex;
use url::Url;

/// Builds the HTTP client used by [`HttpRenderer`]
///
/// # Arguments
///
/// * `user_agent` - Value of the User-Agent header
/// * `timeout` - Whole-request timeout
pub fn build_http_client(user_agent: &str, timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Markup of a page together with the URL it was served from
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Snapshot {
    pub url: String,
    pub html: String,
}

impl Snapshot {
    /// Returns true if `selector` matches anything in the markup
    pub fn contains(&self, selector: &str) -> Result<bool> {
        let selector = compile(selector)?;
        let document = Html::parse_document(&self.html);
        let found = document.select(&selector).next().is_some();
        Ok(found)
    }

    /// Resolves where clicking the first match of `selector` leads
    ///
    /// `Ok(None)` when nothing matches; `Unsupported` when the element
    /// carries neither `href` nor `data-href`.
    pub fn link_target(&self, selector: &str) -> Result<Option<String>> {
        let compiled = compile(selector)?;
        let document = Html::parse_document(&self.html);

        let Some(element) = document.select(&compiled).next() else {
            return Ok(None);
        };

        let href = element
            .value()
            .attr("href")
            .or_else(|| element.value().attr("data-href"))
            .ok_or_else(|| {
                ScrapeError::Unsupported(format!(
                    "'{}' on {} has no href to follow without a script engine",
                    selector, self.url
                ))
            })?;

        let target = Url::parse(&self.url)?.join(href.trim())?;
        Ok(Some(target.to_string()))
    }

    /// Fails with a timeout error unless `selector` matches
    pub fn require(&self, selector: &str, wait: Wait) -> Result<()> {
        if self.contains(selector)? {
            return Ok(());
        }
        Err(ScrapeError::Timeout {
            selector: selector.to_string(),
            url: self.url.clone(),
            timeout_ms: wait.timeout.as_millis() as u64,
        })
    }
}

/// Fetches `url` and returns the body with the final URL
async fn fetch(client: &Client, url: &str) -> Result<Snapshot> {
    let http_error = |source| ScrapeError::Http {
        url: url.to_string(),
        source,
    };

    let response = client
        .get(url)
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(http_error)?;

    let final_url = response.url().to_string();
    let html = response.text().await.map_err(http_error)?;

    tracing::debug!("Fetched {} ({} bytes)", final_url, html.len());
    Ok(Snapshot {
        url: final_url,
        html,
    })
}

/// Renderer backed by plain HTTP requests
pub struct HttpRenderer {
    client: Client,
}

impl HttpRenderer {
    pub fn new(config: &RendererConfig) -> Result<Self> {
        let client = build_http_client(
            &config.user_agent,
            Duration::from_millis(config.request_timeout_ms),
        )?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Renderer for HttpRenderer {
    type Page = HttpPage;

    async fn open(&self, url: &str) -> Result<HttpPage> {
        let snapshot = fetch(&self.client, url).await?;
        Ok(HttpPage {
            client: self.client.clone(),
            snapshot: Mutex::new(snapshot),
        })
    }

    async fn shutdown(self) -> Result<()> {
        Ok(())
    }
}

/// A fetched document
pub struct HttpPage {
    client: Client,
    snapshot: Mutex<Snapshot>,
}

#[async_trait]
impl RenderedPage for HttpPage {
    async fn url(&self) -> Result<String> {
        Ok(self.snapshot.lock().await.url.clone())
    }

    async fn html(&self) -> Result<String> {
        Ok(self.snapshot.lock().await.html.clone())
    }

    async fn wait_for(&self, selector: &str, wait: Wait) -> Result<()> {
        self.snapshot.lock().await.require(selector, wait)
    }

    async fn click(&self, selector: &str) -> Result<bool> {
        let mut snapshot = self.snapshot.lock().await;

        let Some(target) = snapshot.link_target(selector)? else {
            return Ok(false);
        };

        *snapshot = fetch(&self.client, &target).await?;
        Ok(true)
    }

    async fn close(self) -> Result<()> {
        Ok(())
    }
}
