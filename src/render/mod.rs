//! Rendering adapters
//!
//! The crawler never talks to a browser directly. It goes through two small
//! traits:
//! - [`Renderer`] opens pages and owns the engine process
//! - [`RenderedPage`] is one open rendering context that can be queried,
//!   clicked and waited on
//!
//! Two engines are provided: headless Chromium for the live site and a plain
//! HTTP fetcher for server-rendered pages.

mod chromium;
mod http;

pub use chromium::{ChromiumPage, ChromiumRenderer};
pub use http::{build_http_client, HttpPage, HttpRenderer};

#[cfg(test)]
pub(crate) use http::Snapshot;

use crate::Result;
use async_trait::async_trait;
use std::ops::Deref;
use std::time::Duration;

/// How long and for what to wait on a selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wait {
    pub timeout: Duration,
    /// Also require the element to be displayed
    pub visible: bool,
}

impl Wait {
    /// Wait for the element to exist in the DOM
    pub fn present(timeout: Duration) -> Self {
        Self {
            timeout,
            visible: false,
        }
    }

    /// Wait for the element to exist and be displayed
    pub fn visible(timeout: Duration) -> Self {
        Self {
            timeout,
            visible: true,
        }
    }
}

/// One open rendering context
#[async_trait]
pub trait RenderedPage: Send + Sync + 'static {
    /// Current URL of the context, after redirects and clicks
    async fn url(&self) -> Result<String>;

    /// Serialized DOM as it stands now
    async fn html(&self) -> Result<String>;

    /// Waits until `selector` matches, failing with a timeout error otherwise
    async fn wait_for(&self, selector: &str, wait: Wait) -> Result<()>;

    /// Clicks the first element matching `selector`
    ///
    /// Returns `Ok(false)` without side effects when nothing matches.
    async fn click(&self, selector: &str) -> Result<bool>;

    /// Releases the context
    async fn close(self) -> Result<()>;
}

/// A rendering engine able to open pages
#[async_trait]
pub trait Renderer: Send + Sync {
    type Page: RenderedPage;

    /// Opens a fresh context navigated to `url`
    async fn open(&self, url: &str) -> Result<Self::Page>;

    /// Releases the engine itself
    async fn shutdown(self) -> Result<()>;
}

/// Scoped owner of one open page
///
/// [`PageGuard::close`] releases the page and reports the outcome. A guard
/// dropped without being closed (early return, panic, cancelled future)
/// schedules the release on the current tokio runtime instead.
pub struct PageGuard<P: RenderedPage> {
    page: Option<P>,
    label: String,
}

impl<P: RenderedPage> PageGuard<P> {
    pub fn new(page: P, label: impl Into<String>) -> Self {
        Self {
            page: Some(page),
            label: label.into(),
        }
    }

    /// Closes the page, consuming the guard
    pub async fn close(mut self) -> Result<()> {
        match self.page.take() {
            Some(page) => {
                let result = page.close().await;
                match &result {
                    Ok(()) => tracing::debug!("Closed page {}", self.label),
                    Err(e) => tracing::warn!("Failed to close page {}: {}", self.label, e),
                }
                result
            }
            None => Ok(()),
        }
    }
}

impl<P: RenderedPage> Deref for PageGuard<P> {
    type Target = P;

    fn deref(&self) -> &P {
        self.page
            .as_ref()
            .expect("PageGuard: page is only taken by close or drop")
    }
}

impl<P: RenderedPage> Drop for PageGuard<P> {
    fn drop(&mut self) {
        let Some(page) = self.page.take() else {
            return;
        };
        let label = std::mem::take(&mut self.label);

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = page.close().await {
                        tracing::warn!("Deferred close of {} failed: {}", label, e);
                    }
                });
            }
            Err(_) => tracing::warn!("No runtime to close {}; page leaked", label),
        }
    }
}
