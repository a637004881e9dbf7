//! Headless Chromium renderer
//!
//! Launches a Chromium process with the configured executable and argument
//! set, drives its CDP event handler on a background task and exposes each
//! tab as a [`RenderedPage`].

use crate::config::RendererConfig;
use crate::render::{RenderedPage, Renderer, Wait};
use crate::{Result, ScrapeError};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Delay between two DOM probes while waiting on a selector
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A running Chromium instance
pub struct ChromiumRenderer {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl ChromiumRenderer {
    /// Launches the browser
    ///
    /// # Arguments
    ///
    /// * `config` - Executable path, extra arguments and headless flag
    ///
    /// # Returns
    ///
    /// * `Ok(ChromiumRenderer)` - Browser is up and its handler task is running
    /// * `Err(ScrapeError)` - The configuration was rejected or the process failed to start
    pub async fn launch(config: &RendererConfig) -> Result<Self> {
        let mut builder = BrowserConfig::builder().args(config.args.clone());
        if let Some(executable) = &config.executable {
            builder = builder.chrome_executable(executable);
        }
        if !config.headless {
            builder = builder.with_head();
        }
        let browser_config = builder.build().map_err(ScrapeError::BrowserLaunch)?;

        let (browser, mut handler) = Browser::launch(browser_config).await?;
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("Browser handler stopped: {}", e);
                    break;
                }
            }
        });

        tracing::info!(
            "Launched Chromium (executable: {}, headless: {})",
            config.executable.as_deref().unwrap_or("auto-detected"),
            config.headless
        );

        Ok(Self { browser, handler })
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    type Page = ChromiumPage;

    async fn open(&self, url: &str) -> Result<ChromiumPage> {
        let page = self
            .browser
            .new_page(url)
            .await
            .map_err(|e| ScrapeError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        Ok(ChromiumPage {
            page,
            url: url.to_string(),
        })
    }

    async fn shutdown(mut self) -> Result<()> {
        self.browser.close().await?;
        self.browser.wait().await?;
        self.handler.abort();
        tracing::debug!("Browser closed");
        Ok(())
    }
}

/// Runs `probe` every [`POLL_INTERVAL`] until it reports a match or the
/// wait times out
///
/// A failed probe counts as "not yet": navigation replaces the execution
/// context the probe evaluates in, and the next page may still match.
async fn poll_until_found<F, Fut>(selector: &str, url: &str, wait: Wait, mut probe: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let deadline = Instant::now() + wait.timeout;

    loop {
        match probe().await {
            Ok(true) => return Ok(()),
            Ok(false) => {}
            Err(e) => tracing::debug!("Probe for '{}' on {} failed: {}", selector, url, e),
        }
        if Instant::now() >= deadline {
            return Err(ScrapeError::Timeout {
                selector: selector.to_string(),
                url: url.to_string(),
                timeout_ms: wait.timeout.as_millis() as u64,
            });
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// One Chromium tab
pub struct ChromiumPage {
    page: Page,
    url: String,
}

impl ChromiumPage {
    /// Evaluates whether `selector` currently matches (and is displayed, if asked)
    async fn probe(&self, selector: &str, visible: bool) -> Result<bool> {
        let selector = serde_json::to_string(selector)?;
        let script = format!(
            r#"(() => {{
                const el = document.querySelector({selector});
                if (!el) return false;
                if (!{visible}) return true;
                const style = window.getComputedStyle(el);
                return style.display !== 'none'
                    && style.visibility !== 'hidden'
                    && el.getClientRects().length > 0;
            }})()"#
        );

        let result = self.page.evaluate(script).await?;
        Ok(result.into_value::<bool>()?)
    }
}

#[async_trait]
impl RenderedPage for ChromiumPage {
    async fn url(&self) -> Result<String> {
        Ok(self.page.url().await?.unwrap_or_else(|| self.url.clone()))
    }

    async fn html(&self) -> Result<String> {
        Ok(self.page.content().await?)
    }

    async fn wait_for(&self, selector: &str, wait: Wait) -> Result<()> {
        poll_until_found(selector, &self.url, wait, || self.probe(selector, wait.visible)).await
    }

    async fn click(&self, selector: &str) -> Result<bool> {
        if !self.probe(selector, false).await? {
            return Ok(false);
        }

        self.page.find_element(selector).await?.click().await?;
        Ok(true)
    }

    async fn close(self) -> Result<()> {
        self.page.close().await?;
        Ok(())
    }
}
