//! Batch driver: fans the page processor out over a URL set
//!
//! Each URL runs as its own task. A task holds a concurrency permit for its whole
//! lifetime, takes one rate-limiter token, then runs the retry loop. One URL failing
//! for good never stops the others.

use crate::crawler::processor::PageProcessor;
use crate::crawler::rate_limiter::TokenBucket;
use crate::crawler::retry::{RetryOutcome, RetryPolicy};
use crate::output::{BatchReport, FlaggedPage, PageFailure, PersistedPage, ResultSink};
use crate::validate::ContentValidator;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;

/// Final disposition of one URL
#[derive(Debug, Clone)]
pub enum PageOutcome {
    /// Written by the sink; `issues` holds validation findings that were tolerated
    Persisted {
        page: PersistedPage,
        issues: Vec<String>,
    },

    /// Produced content, but failed validation with enforcement on
    Rejected { url: String, issues: Vec<String> },

    /// Every attempt failed, or the sink could not write the result
    Failed(PageFailure),
}

impl PageOutcome {
    pub fn url(&self) -> &str {
        match self {
            Self::Persisted { page, .. } => &page.url,
            Self::Rejected { url, .. } => url,
            Self::Failed(failure) => &failure.url,
        }
    }
}

/// Runs a batch of URLs through render, convert, validate and persist
pub struct BatchDriver {
    processor: PageProcessor,
    limiter: Arc<TokenBucket>,
    retry: RetryPolicy,
    max_concurrent: usize,
    validator: ContentValidator,
    enforce: bool,
}

impl BatchDriver {
    /// Creates a driver with the default validator, not enforcing
    ///
    /// # Arguments
    ///
    /// * `processor` - Page processor (owns the renderer handle)
    /// * `limiter` - Token bucket shared by every task of the batch
    /// * `retry` - Attempt budget and backoff
    /// * `max_concurrent` - Ceiling on simultaneously open renderer sessions
    pub fn new(
        processor: PageProcessor,
        limiter: Arc<TokenBucket>,
        retry: RetryPolicy,
        max_concurrent: usize,
    ) -> Self {
        Self {
            processor,
            limiter,
            retry,
            max_concurrent: max_concurrent.max(1),
            validator: ContentValidator::default(),
            enforce: false,
        }
    }

    /// Replaces the validator; with `enforce`, invalid results are not persisted
    pub fn with_validation(mut self, validator: ContentValidator, enforce: bool) -> Self {
        self.validator = validator;
        self.enforce = enforce;
        self
    }

    /// Processes every URL and hands successes to `sink`
    ///
    /// Results of different URLs complete in no particular order; the report lists
    /// them sorted by URL.
    pub async fn process_all(&self, urls: Vec<String>, sink: Arc<dyn ResultSink>) -> BatchReport {
        let started = Instant::now();
        let mut report = BatchReport::new(urls.len());
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut tasks = JoinSet::new();

        // URLs whose task has not reported back yet
        let mut pending: HashMap<String, usize> = HashMap::new();
        for url in &urls {
            *pending.entry(url.clone()).or_default() += 1;
        }

        tracing::info!(
            "Processing {} URLs (max {} concurrent)",
            urls.len(),
            self.max_concurrent
        );

        for url in urls {
            let semaphore = semaphore.clone();
            let limiter = self.limiter.clone();
            let processor = self.processor.clone();
            let validator = self.validator.clone();
            let retry = self.retry;
            let enforce = self.enforce;
            let sink = sink.clone();

            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        return PageOutcome::Failed(PageFailure {
                            url,
                            error: format!("Scheduler closed: {}", e),
                            attempts: 0,
                        })
                    }
                };

                limiter.acquire().await;

                let url_ref = url.as_str();
                let processor = &processor;
                let outcome = retry.run(url_ref, |_| processor.process(url_ref)).await;

                settle(url, outcome, &validator, enforce, sink.as_ref())
            });
        }

        let mut aborted = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => {
                    if let Some(count) = pending.get_mut(outcome.url()) {
                        *count -= 1;
                    }
                    report.record(outcome);
                }
                Err(e) => {
                    tracing::error!("Page task aborted: {}", e);
                    aborted.push(e.to_string());
                }
            }
        }

        // A failed join does not carry its URL; every URL left without an outcome was aborted
        let mut reasons = aborted.into_iter();
        for (url, count) in pending {
            for _ in 0..count {
                let reason = reasons.next().unwrap_or_else(|| "task did not complete".to_string());
                tracing::error!(url = %url, "No result for page: {}", reason);
                report.record(PageOutcome::Failed(PageFailure {
                    url: url.clone(),
                    error: format!("Page task aborted: {}", reason),
                    attempts: 0,
                }));
            }
        }

        report.elapsed = started.elapsed();
        report.sort();

        tracing::info!(
            persisted = report.persisted.len(),
            failed = report.failed.len(),
            rejected = report.rejected_count(),
            "Batch complete in {:.1}s",
            report.elapsed.as_secs_f64()
        );

        report
    }
}

/// Validates a final result and persists it when allowed
fn settle(
    url: String,
    outcome: RetryOutcome,
    validator: &ContentValidator,
    enforce: bool,
    sink: &dyn ResultSink,
) -> PageOutcome {
    let RetryOutcome { result, attempts } = outcome;

    if !result.success {
        return PageOutcome::Failed(PageFailure {
            url,
            error: result.error.unwrap_or_else(|| "unknown error".to_string()),
            attempts,
        });
    }

    let validation = validator.validate(&result);
    if !validation.is_valid {
        if enforce {
            tracing::warn!(url = %url, issues = ?validation.issues, "Rejected invalid page");
            return PageOutcome::Rejected {
                url,
                issues: validation.issues,
            };
        }
        tracing::warn!(url = %url, issues = ?validation.issues, "Persisting page with validation issues");
    }

    match sink.persist(&result) {
        Ok(path) => PageOutcome::Persisted {
            page: PersistedPage { url, path },
            issues: validation.issues,
        },
        Err(e) => {
            tracing::error!(url = %url, "Failed to persist page: {}", e);
            PageOutcome::Failed(PageFailure {
                url,
                error: format!("Persistence failed: {}", e),
                attempts,
            })
        }
    }
}

impl BatchReport {
    fn record(&mut self, outcome: PageOutcome) {
        match outcome {
            PageOutcome::Persisted { page, issues } => {
                if !issues.is_empty() {
                    self.flagged.push(FlaggedPage {
                        url: page.url.clone(),
                        issues,
                        persisted: true,
                    });
                }
                self.persisted.push(page);
            }
            PageOutcome::Rejected { url, issues } => self.flagged.push(FlaggedPage {
                url,
                issues,
                persisted: false,
            }),
            PageOutcome::Failed(failure) => self.failed.push(failure),
        }
    }
}
