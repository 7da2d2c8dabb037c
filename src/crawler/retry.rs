//! Linear-backoff retry around page attempts

use crate::config::CrawlerConfig;
use crate::types::ScrapingResult;
use std::future::Future;
use std::time::Duration;

/// How many attempts a URL gets and how long to wait between them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,

    /// Delay after attempt `n` is `n * base_delay`
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&CrawlerConfig::default())
    }
}

impl From<&CrawlerConfig> for RetryPolicy {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            max_attempts: config.max_retries.max(1),
            base_delay: config.retry_base_delay(),
        }
    }
}

/// Final result of a retried URL
#[derive(Debug, Clone)]
pub struct RetryOutcome {
    pub result: ScrapingResult,

    /// Attempts actually made (1-based)
    pub attempts: u32,
}

impl RetryPolicy {
    /// Backoff after the given 1-based attempt
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }

    /// Runs `attempt` until it yields a successful result or the budget is spent
    ///
    /// Attempts are strictly sequential. Every failure is retried the same way
    /// regardless of what went wrong.
    pub async fn run<F, Fut>(&self, url: &str, mut attempt: F) -> RetryOutcome
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = ScrapingResult>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut n = 1;

        loop {
            let result = attempt(n).await;

            if result.success {
                if n > 1 {
                    tracing::info!(url, attempts = n, "Succeeded after retry");
                }
                return RetryOutcome {
                    result,
                    attempts: n,
                };
            }

            let error = result.error.as_deref().unwrap_or("unknown error");
            if n >= max_attempts {
                tracing::error!(url, attempts = n, "Giving up on {}: {}", url, error);
                return RetryOutcome {
                    result,
                    attempts: n,
                };
            }

            let delay = self.delay_after(n);
            tracing::warn!(
                url,
                attempt = n,
                delay_ms = delay.as_millis() as u64,
                "Attempt failed, retrying: {}",
                error
            );
            tokio::time::sleep(delay).await;
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1000),
        }
    }

    fn ok(url: &str) -> ScrapingResult {
        ScrapingResult::succeeded(crate::types::PageMetadata::failed(url), "body".to_string())
    }

    #[test]
    fn test_delay_is_linear() {
        let p = policy(3);
        assert_eq!(p.delay_after(1), Duration::from_secs(1));
        assert_eq!(p.delay_after(2), Duration::from_secs(2));
        assert_eq!(p.delay_after(3), Duration::from_secs(3));
    }

    #[test]
    fn test_from_config() {
        let p = RetryPolicy::default();
        assert_eq!(p.max_attempts, 3);
        assert_eq!(p.base_delay, Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_failures_then_success() {
        let starts = Arc::new(Mutex::new(Vec::new()));
        let recorder = starts.clone();

        let outcome = policy(3)
            .run("https://docs.example.com/a", move |n| {
                recorder.lock().unwrap().push(Instant::now());
                async move {
                    if n < 3 {
                        ScrapingResult::failed("https://docs.example.com/a", "Navigation timeout")
                    } else {
                        ok("https://docs.example.com/a")
                    }
                }
            })
            .await;

        assert!(outcome.result.success);
        assert_eq!(outcome.attempts, 3);

        let starts = starts.lock().unwrap();
        assert_eq!(starts.len(), 3);
        let first_gap = starts[1] - starts[0];
        let second_gap = starts[2] - starts[1];
        assert!(first_gap >= Duration::from_millis(1000) && first_gap < Duration::from_millis(1100));
        assert!(second_gap >= Duration::from_millis(2000) && second_gap < Duration::from_millis(2100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_budget() {
        let calls = Arc::new(Mutex::new(0u32));
        let counter = calls.clone();
        let start = Instant::now();

        let outcome = policy(3)
            .run("https://docs.example.com/b", move |_| {
                *counter.lock().unwrap() += 1;
                async { ScrapingResult::failed("https://docs.example.com/b", "HTTP 500") }
            })
            .await;

        assert!(!outcome.result.success);
        assert_eq!(outcome.result.error.as_deref(), Some("HTTP 500"));
        assert_eq!(outcome.attempts, 3);
        assert_eq!(*calls.lock().unwrap(), 3);
        // 1s + 2s of backoff, no sleep after the last attempt
        assert!(start.elapsed() >= Duration::from_secs(3));
        assert!(start.elapsed() < Duration::from_millis(3100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_success_does_not_sleep() {
        let start = Instant::now();
        let outcome = policy(3)
            .run("https://docs.example.com/c", |_| async {
                ok("https://docs.example.com/c")
            })
            .await;

        assert!(outcome.result.success);
        assert_eq!(outcome.attempts, 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
