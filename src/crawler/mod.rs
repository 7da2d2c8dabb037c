//! Crawler module: page acquisition and batch processing
//!
//! This module contains the core pipeline, including:
//! - The renderer adapter and its HTTP implementation
//! - A token bucket shared by all page tasks
//! - The per-URL page processor and its retry policy
//! - The batch driver and overall run orchestration

mod driver;
mod processor;
mod rate_limiter;
mod renderer;
mod retry;

#[cfg(test)]
pub(crate) mod testing;

pub use driver::{BatchDriver, PageOutcome};
pub use processor::PageProcessor;
pub use rate_limiter::{BucketState, TokenBucket};
pub use renderer::{HttpRenderer, RenderSession, RenderTimeouts, RenderedPage, Renderer};
pub use retry::{RetryOutcome, RetryPolicy};

use crate::config::Config;
use crate::output::{write_summary, BatchReport, FileStore, ResultSink};
use crate::url::UrlCollector;
use crate::validate::ContentValidator;
use crate::ScribeError;
use std::sync::Arc;

/// Per-run choices that do not come from the config file
#[derive(Debug, Clone, Default)]
pub struct CrawlOptions {
    /// Process exactly these URLs instead of collecting them from the seed page
    pub urls: Option<Vec<String>>,

    /// Hash of the config file, recorded in the summary
    pub config_hash: Option<String>,
}

/// Renders the seed page and returns the URLs it links to
///
/// # Returns
///
/// * `Ok(Vec<String>)` - Same-site URLs in first-seen order
/// * `Err(ScribeError)` - The seed page could not be rendered
pub async fn collect_urls(config: &Config, renderer: &dyn Renderer) -> Result<Vec<String>, ScribeError> {
    let mut collector = UrlCollector::new(&config.site.base_url)?;
    let timeouts = RenderTimeouts::from(&config.renderer);
    Ok(collector
        .collect(renderer, config.site.seed(), &timeouts)
        .await?)
}

/// Runs a complete crawl with the given renderer
///
/// This is the main pipeline. It will:
/// 1. Create the output directories
/// 2. Collect URLs from the seed page (unless URLs were given)
/// 3. Process every URL under the concurrency cap and rate limit
/// 4. Persist successes and write the run summary
///
/// Startup problems (output directory, seed page, limiter parameters) abort the run;
/// individual page failures only show up in the returned report.
pub async fn run_crawl(
    config: &Config,
    renderer: Arc<dyn Renderer>,
    options: CrawlOptions,
) -> Result<BatchReport, ScribeError> {
    let store = Arc::new(FileStore::from_config(&config.output)?);
    let limiter = Arc::new(TokenBucket::new(&config.rate_limit)?);

    let urls = match options.urls {
        Some(urls) => {
            tracing::info!("Processing {} URLs given on the command line", urls.len());
            urls
        }
        None => collect_urls(config, renderer.as_ref()).await?,
    };

    if urls.is_empty() {
        tracing::warn!("No URLs to process");
    }

    let processor = PageProcessor::new(renderer, RenderTimeouts::from(&config.renderer));
    let driver = BatchDriver::new(
        processor,
        limiter,
        RetryPolicy::from(&config.crawler),
        config.crawler.max_concurrent as usize,
    )
    .with_validation(
        ContentValidator::new(&config.validation),
        config.validation.enforce,
    );

    let sink: Arc<dyn ResultSink> = store.clone();
    let mut report = driver.process_all(urls, sink).await;
    report.config_hash = options.config_hash;

    if config.output.summary {
        let path = write_summary(&report, store.root())?;
        tracing::info!("Summary written to {}", path.display());
    }

    Ok(report)
}

/// Runs a complete crawl with the built-in HTTP renderer
///
/// Failing to build the renderer is fatal.
pub async fn crawl(config: &Config, options: CrawlOptions) -> Result<BatchReport, ScribeError> {
    let renderer = HttpRenderer::new(&config.renderer)?;
    run_crawl(config, Arc::new(renderer), options).await
}
