//! URL collector: same-origin link discovery from one seed page

use crate::crawler::{RenderTimeouts, Renderer};
use crate::{RenderError, RenderResult};
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Collects the documentation pages linked from a seed page
///
/// The visited set belongs to this instance and only grows; two collectors never
/// share state.
#[derive(Debug, Clone)]
pub struct UrlCollector {
    base: Url,
    visited: HashSet<String>,
}

impl UrlCollector {
    /// Creates a collector scoped to `base_url`
    ///
    /// # Returns
    ///
    /// * `Ok(UrlCollector)` - Base URL parsed
    /// * `Err(url::ParseError)` - Base URL is not an absolute URL
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            base: Url::parse(base_url)?,
            visited: HashSet::new(),
        })
    }

    /// URLs accepted so far
    pub fn visited(&self) -> &HashSet<String> {
        &self.visited
    }

    /// Renders `seed_url` and collects its links
    ///
    /// The session is closed whether or not rendering succeeded. A render failure is
    /// returned as is; no partial link list is produced.
    pub async fn collect(
        &mut self,
        renderer: &dyn Renderer,
        seed_url: &str,
        timeouts: &RenderTimeouts,
    ) -> RenderResult<Vec<String>> {
        tracing::info!("Collecting URLs from {}", seed_url);

        let mut session = renderer.launch().await?;
        let limit = timeouts.total();
        let rendered = match tokio::time::timeout(limit, session.open(seed_url, timeouts)).await {
            Ok(result) => result,
            Err(_) => Err(RenderError::Timeout {
                url: seed_url.to_string(),
                after: limit,
            }),
        };
        session.close().await;

        let page = rendered?;
        let urls = self.extract(&page.html);
        tracing::info!("Found {} URLs on {}", urls.len(), seed_url);

        Ok(urls)
    }

    /// Extracts new, in-scope absolute URLs from `html` in first-seen order
    pub fn extract(&mut self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let mut urls = Vec::new();

        if let Ok(a_selector) = Selector::parse("a[href]") {
            for element in document.select(&a_selector) {
                // Download links point at files, not pages
                if element.value().attr("download").is_some() {
                    continue;
                }

                let Some(url) = element.value().attr("href").and_then(|h| self.resolve(h)) else {
                    continue;
                };

                if self.visited.insert(url.clone()) {
                    urls.push(url);
                }
            }
        }

        urls
    }

    /// Resolves an href against the base URL, or `None` when it is out of scope
    ///
    /// Accepted: root-relative paths, and absolute URLs under the base URL.
    /// Rejected: fragment-only links, relative paths, other origins and schemes.
    /// The fragment of an accepted URL is dropped.
    pub fn resolve(&self, href: &str) -> Option<String> {
        let href = href.trim();
        if href.is_empty() || href.starts_with('#') {
            return None;
        }

        let mut url = if href.starts_with('/') {
            self.base.join(href).ok()?
        } else {
            let absolute = Url::parse(href).ok()?;
            if !absolute.path().starts_with(self.base.path()) {
                return None;
            }
            absolute
        };

        // `//other.host/x` is root-relative in form only
        if url.origin() != self.base.origin() {
            return None;
        }

        url.set_fragment(None);
        Some(url.to_string())
    }
}
