//! Rendering-engine acquisition for script-driven listing pages.
//!
//! The listings page populates through page scripts, so the first
//! acquisition tier drives a real browser engine via chromiumoxide (CDP).
//! The engine session is scoped to a single render call and torn down on
//! every exit path.

mod provision;
mod version;

pub use provision::{provision, EngineStrategy, ProvisionContext};
pub use version::{resolve_release, STABLE_FALLBACK_RELEASE};

use std::path::PathBuf;

use thiserror::Error;

#[cfg(feature = "browser")]
use std::time::Duration;

#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
#[cfg(feature = "browser")]
use chromiumoxide::{Browser, BrowserConfig, Page};
#[cfg(feature = "browser")]
use futures::StreamExt;
#[cfg(feature = "browser")]
use tracing::{debug, warn};

/// Rendered-page acquisition failure. Every variant is recoverable: the
/// pipeline falls through to the static fetch.
#[derive(Debug, Error)]
pub enum AcquireError {
    #[error("no rendering engine available")]
    Unavailable,
    #[error("engine launch failed: {0}")]
    Launch(String),
    #[error("navigation failed: {0}")]
    Navigation(String),
    #[error("page capture failed: {0}")]
    Capture(String),
}

/// Markup captured from a rendered page.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// URL that was requested.
    pub url: String,
    /// URL after redirects.
    pub final_url: String,
    /// Serialized document markup.
    pub content: String,
}

/// Rendering-engine options.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub headless: bool,
    /// Ceiling in seconds for navigation and page-ready waits.
    pub navigation_timeout: u64,
    /// Managed cache directory for downloaded engines.
    pub cache_dir: PathBuf,
}

impl EngineOptions {
    pub fn new(headless: bool, navigation_timeout: u64, cache_dir: PathBuf) -> Self {
        Self {
            headless,
            navigation_timeout,
            cache_dir,
        }
    }
}

/// User agent presented by the rendering engine.
#[cfg(feature = "browser")]
const RENDER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// JavaScript to wait for page ready state.
#[cfg(feature = "browser")]
const WAIT_FOR_READY_SCRIPT: &str = r#"
    new Promise((resolve) => {
        if (document.readyState === 'complete' || document.readyState === 'interactive') {
            resolve(document.readyState);
        } else {
            document.addEventListener('DOMContentLoaded', () => resolve(document.readyState));
            setTimeout(() => resolve('timeout'), 10000);
        }
    })
"#;

/// Browser-based page fetcher.
#[cfg(feature = "browser")]
pub struct BrowserFetcher {
    options: EngineOptions,
}

#[cfg(feature = "browser")]
impl BrowserFetcher {
    /// Create a new browser fetcher.
    pub fn new(options: EngineOptions) -> Self {
        Self { options }
    }

    /// Render a page and capture its markup.
    ///
    /// Provisions an engine, launches it, navigates, and captures the
    /// document. The engine is shut down before returning, whether the
    /// render succeeded, failed, or timed out.
    pub async fn render(&self, url: &str) -> Result<RenderedPage, AcquireError> {
        let ctx = ProvisionContext::new(self.options.cache_dir.clone());
        let executable = provision::provision(&ctx).await?;

        let mut builder = BrowserConfig::builder().chrome_executable(executable);
        if !self.options.headless {
            builder = builder.with_head();
        }
        builder = builder
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .arg("--disable-extensions")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--no-sandbox") // Often needed for headless in containers
            .arg("--window-size=1920,1080");

        let config = builder.build().map_err(AcquireError::Launch)?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| AcquireError::Launch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        // Inner function so the engine is always torn down
        let result = self.render_inner(&browser, url).await;

        let _ = browser.close().await;
        handler_task.abort();

        result
    }

    /// Inner render logic - engine teardown handled by the caller.
    async fn render_inner(&self, browser: &Browser, url: &str) -> Result<RenderedPage, AcquireError> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| AcquireError::Navigation(e.to_string()))?;

        let result = self.render_on_page(&page, url).await;
        let _ = page.close().await;
        result
    }

    async fn render_on_page(&self, page: &Page, url: &str) -> Result<RenderedPage, AcquireError> {
        // Set realistic user agent before any navigation
        page.execute(SetUserAgentOverrideParams::new(
            RENDER_USER_AGENT.to_string(),
        ))
        .await
        .map_err(|e| AcquireError::Navigation(e.to_string()))?;

        self.navigate(page, url).await?;
        self.wait_for_page_ready(page).await;

        let final_url = page
            .url()
            .await
            .ok()
            .flatten()
            .map(|u| u.to_string())
            .unwrap_or_else(|| url.to_string());

        let content = page
            .content()
            .await
            .map_err(|e| AcquireError::Capture(e.to_string()))?;

        Ok(RenderedPage {
            url: url.to_string(),
            final_url,
            content,
        })
    }

    /// Navigate to a URL with timeout handling.
    async fn navigate(&self, page: &Page, url: &str) -> Result<(), AcquireError> {
        debug!("Navigating to {}", url);

        let nav_params = NavigateParams::builder()
            .url(url)
            .build()
            .map_err(AcquireError::Navigation)?;

        let nav_timeout = Duration::from_secs(self.options.navigation_timeout);
        tokio::time::timeout(nav_timeout, page.execute(nav_params))
            .await
            .map_err(|_| {
                AcquireError::Navigation(format!(
                    "navigation timed out after {}s for {}",
                    self.options.navigation_timeout, url
                ))
            })?
            .map_err(|e| AcquireError::Navigation(e.to_string()))?;

        Ok(())
    }

    /// Wait for the page to reach a ready state.
    async fn wait_for_page_ready(&self, page: &Page) {
        let ready_timeout = Duration::from_secs(self.options.navigation_timeout);
        match tokio::time::timeout(
            ready_timeout,
            page.evaluate(WAIT_FOR_READY_SCRIPT.to_string()),
        )
        .await
        {
            Ok(Ok(result)) => {
                let state: String = result
                    .into_value()
                    .unwrap_or_else(|_| "unknown".to_string());
                debug!("Page ready state: {}", state);
            }
            Ok(Err(e)) => {
                debug!("Could not check ready state: {}", e);
            }
            Err(_) => {
                warn!("Timeout waiting for page ready state");
            }
        }
    }
}

// Stub for when browser feature is disabled
#[cfg(not(feature = "browser"))]
pub struct BrowserFetcher {
    #[allow(dead_code)]
    options: EngineOptions,
}

#[cfg(not(feature = "browser"))]
impl BrowserFetcher {
    pub fn new(options: EngineOptions) -> Self {
        Self { options }
    }

    pub async fn render(&self, _url: &str) -> Result<RenderedPage, AcquireError> {
        Err(AcquireError::Unavailable)
    }
}
