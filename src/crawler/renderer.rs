//! Renderer adapter
//!
//! The pipeline only sees three operations: `launch` a renderer session, `open` a URL
//! in it, and `close` it. [`HttpRenderer`] is the built-in implementation; it fetches
//! the server-rendered document over HTTP and treats the response as the rendered page.

use crate::config::RendererConfig;
use crate::convert::parse_selector;
use crate::{RenderError, RenderResult};
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use scraper::Html;
use std::time::Duration;

/// Navigation and readiness bounds for one `open`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTimeouts {
    /// Bound on reaching the page (request sent, response headers received)
    pub navigation: Duration,

    /// Bound on the document becoming usable after navigation
    pub readiness: Duration,
}

impl RenderTimeouts {
    /// Upper bound on a whole `open` call
    pub fn total(&self) -> Duration {
        self.navigation + self.readiness
    }
}

impl From<&RendererConfig> for RenderTimeouts {
    fn from(config: &RendererConfig) -> Self {
        Self {
            navigation: Duration::from_millis(config.navigation_timeout_ms),
            readiness: Duration::from_millis(config.readiness_timeout_ms),
        }
    }
}

/// A page as captured by the renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    /// Rendered HTML of the whole document
    pub html: String,

    /// Document title as reported by the renderer (may be empty)
    pub title: String,

    /// URL after redirects
    pub final_url: String,
}

/// Source of renderer sessions
///
/// One session is launched per page attempt and owned exclusively by it.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn launch(&self) -> RenderResult<Box<dyn RenderSession>>;
}

/// An open renderer session
#[async_trait]
pub trait RenderSession: Send {
    /// Navigates to `url` and captures the rendered document
    async fn open(&mut self, url: &str, timeouts: &RenderTimeouts) -> RenderResult<RenderedPage>;

    /// Releases the session; called on every exit path of an attempt
    async fn close(&mut self);
}

/// Renderer backed by a plain HTTP client
#[derive(Debug, Clone)]
pub struct HttpRenderer {
    client: Client,
}

impl HttpRenderer {
    /// Builds the renderer
    ///
    /// # Arguments
    ///
    /// * `config` - Renderer configuration (user agent, timeouts)
    ///
    /// # Returns
    ///
    /// * `Ok(HttpRenderer)` - Ready to launch sessions
    /// * `Err(RenderError::Launch)` - The HTTP client could not be built
    pub fn new(config: &RendererConfig) -> RenderResult<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .connect_timeout(Duration::from_millis(config.navigation_timeout_ms))
            .redirect(Policy::limited(10))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Renderer for HttpRenderer {
    async fn launch(&self) -> RenderResult<Box<dyn RenderSession>> {
        Ok(Box::new(HttpSession {
            client: self.client.clone(),
            open: true,
        }))
    }
}

/// One HTTP "tab"; holds a handle on the shared connection pool
struct HttpSession {
    client: Client,
    open: bool,
}

#[async_trait]
impl RenderSession for HttpSession {
    async fn open(&mut self, url: &str, timeouts: &RenderTimeouts) -> RenderResult<RenderedPage> {
        if !self.open {
            return Err(RenderError::Navigation {
                url: url.to_string(),
                message: "session already closed".to_string(),
            });
        }

        let response = tokio::time::timeout(timeouts.navigation, self.client.get(url).send())
            .await
            .map_err(|_| RenderError::Timeout {
                url: url.to_string(),
                after: timeouts.navigation,
            })?
            .map_err(|e| navigation_error(url, &e, timeouts.navigation))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::Navigation {
                url: url.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();
        if !content_type.is_empty() && !content_type.contains("html") {
            return Err(RenderError::Navigation {
                url: url.to_string(),
                message: format!("unsupported content type {}", content_type),
            });
        }

        let final_url = response.url().to_string();

        let html = tokio::time::timeout(timeouts.readiness, response.text())
            .await
            .map_err(|_| RenderError::Timeout {
                url: url.to_string(),
                after: timeouts.readiness,
            })?
            .map_err(|e| navigation_error(url, &e, timeouts.readiness))?;

        if html.trim().is_empty() {
            return Err(RenderError::NotReady {
                url: url.to_string(),
            });
        }

        let title = document_title(&html);
        tracing::debug!(url, final_url = %final_url, bytes = html.len(), "Rendered page");

        Ok(RenderedPage {
            html,
            title,
            final_url,
        })
    }

    async fn close(&mut self) {
        self.open = false;
    }
}

/// Maps a client error; `limit` is the timeout that was in force for the failed step
fn navigation_error(url: &str, error: &reqwest::Error, limit: Duration) -> RenderError {
    if error.is_timeout() {
        return RenderError::Timeout {
            url: url.to_string(),
            after: limit,
        };
    }

    let message = if error.is_connect() {
        "connection refused".to_string()
    } else {
        error.to_string()
    };
    RenderError::Navigation {
        url: url.to_string(),
        message,
    }
}

/// The `<title>` text as a browser would report it: whitespace collapsed, empty if absent
fn document_title(html: &str) -> String {
    let document = Html::parse_document(html);
    let Ok(selector) = parse_selector("title") else {
        return String::new();
    };

    document
        .select(&selector)
        .next()
        .map(|el| el.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" "))
        .unwrap_or_default()
}
