//! Page processor: one render attempt for one URL
//!
//! An attempt walks the [`PageState`] machine. Whatever happens, the renderer session
//! is closed before the attempt returns, and failures come back as a failed
//! [`ScrapingResult`] rather than an error.

use crate::convert::{convert, ConvertedPage};
use crate::crawler::renderer::{RenderTimeouts, RenderedPage, Renderer};
use crate::state::PageState;
use crate::types::{PageMetadata, ScrapingResult};
use crate::{RenderError, ScribeError};
use std::sync::Arc;
use url::Url;

/// Renders and converts single pages
#[derive(Clone)]
pub struct PageProcessor {
    renderer: Arc<dyn Renderer>,
    timeouts: RenderTimeouts,
}

impl PageProcessor {
    pub fn new(renderer: Arc<dyn Renderer>, timeouts: RenderTimeouts) -> Self {
        Self { renderer, timeouts }
    }

    /// Runs one attempt for `url`
    ///
    /// # Returns
    ///
    /// A successful result with Markdown and metadata, or a failed result carrying
    /// the URL, an empty title, empty content and the error message.
    pub async fn process(&self, url: &str) -> ScrapingResult {
        let mut state = PageState::Pending;

        match self.attempt(url, &mut state).await {
            Ok(result) => result,
            Err(e) => {
                let failed_in = state;
                if !state.is_terminal() {
                    state = PageState::Failed;
                }
                tracing::debug!(url, failed_in = %failed_in, state = %state, "Attempt failed: {}", e);
                ScrapingResult::failed(url, e.to_string())
            }
        }
    }

    async fn attempt(&self, url: &str, state: &mut PageState) -> Result<ScrapingResult, ScribeError> {
        state.transition(PageState::Rendering)?;
        let page = self.render(url).await?;

        state.transition(PageState::Converting)?;
        let converted = convert(&page.html)?;

        state.transition(PageState::Succeeded)?;
        let metadata = assemble_metadata(&page, &converted);
        tracing::info!(url, title = %metadata.title, "Processed page");

        Ok(ScrapingResult::succeeded(metadata, converted.markdown))
    }

    /// Launches a session, captures the page, and closes the session on every path
    async fn render(&self, url: &str) -> Result<RenderedPage, RenderError> {
        let mut session = self.renderer.launch().await?;

        let limit = self.timeouts.total();
        let rendered = match tokio::time::timeout(limit, session.open(url, &self.timeouts)).await {
            Ok(result) => result,
            Err(_) => Err(RenderError::Timeout {
                url: url.to_string(),
                after: limit,
            }),
        };

        session.close().await;
        rendered
    }
}

/// Combines renderer output with converter-extracted fields
///
/// The URL is the final URL after redirects. The renderer's title wins when it is
/// non-empty; otherwise the converter's fallback chain applies.
fn assemble_metadata(page: &RenderedPage, converted: &ConvertedPage) -> PageMetadata {
    let extracted = &converted.metadata;

    let title = if page.title.trim().is_empty() {
        extracted.title.clone()
    } else {
        page.title.trim().to_string()
    };

    PageMetadata {
        url: page.final_url.clone(),
        title,
        description: extracted.description.clone(),
        last_modified: extracted.last_modified.clone(),
        category: extracted.category.clone(),
        parent_page: parent_page(&page.final_url, &extracted.breadcrumb_links),
    }
}

/// Last breadcrumb link that resolves to a page other than `page_url`
fn parent_page(page_url: &str, breadcrumb_links: &[String]) -> Option<String> {
    let base = Url::parse(page_url).ok()?;

    breadcrumb_links
        .iter()
        .rev()
        .filter_map(|href| base.join(href).ok())
        .filter(|link| matches!(link.scheme(), "http" | "https"))
        .find(|link| !same_page(link, &base))
        .map(String::from)
}

fn same_page(a: &Url, b: &Url) -> bool {
    let mut a = a.clone();
    let mut b = b.clone();
    a.set_fragment(None);
    b.set_fragment(None);
    a.as_str().trim_end_matches('/') == b.as_str().trim_end_matches('/')
}
