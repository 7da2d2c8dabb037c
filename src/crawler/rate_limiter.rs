//! Token bucket rate limiter
//!
//! One bucket is shared by every page task of a run. Refill is lazy: it is computed
//! from the elapsed time whenever a caller checks the bucket, never by a timer. The
//! read-modify-write of the token count happens under a single lock per check.

use crate::config::RateLimitConfig;
use crate::ConfigError;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Token count and refill bookkeeping
///
/// Methods take the current instant explicitly so the refill arithmetic can be
/// driven by tests without a clock.
#[derive(Debug, Clone)]
pub struct BucketState {
    tokens: u32,
    max_tokens: u32,
    refill_rate: f64,
    last_refill: Instant,
}

impl BucketState {
    /// Creates a full bucket
    pub fn new(max_tokens: u32, refill_rate: f64, now: Instant) -> Self {
        Self {
            tokens: max_tokens,
            max_tokens,
            refill_rate,
            last_refill: now,
        }
    }

    /// Adds `floor(elapsed_ms * rate / 1000)` tokens, capped at capacity
    ///
    /// `last_refill` only advances when at least one whole token was added, so
    /// partial progress toward the next token is kept across checks.
    pub fn refill(&mut self, now: Instant) {
        let elapsed_ms = now.saturating_duration_since(self.last_refill).as_millis() as f64;
        let new_tokens = (elapsed_ms * self.refill_rate / 1000.0).floor();

        if new_tokens >= 1.0 {
            let room = f64::from(self.max_tokens - self.tokens);
            self.tokens += new_tokens.min(room) as u32;
            self.last_refill = now;
        }
    }

    /// Refills, then takes one token if any is available
    pub fn try_take(&mut self, now: Instant) -> bool {
        self.refill(now);

        if self.tokens > 0 {
            self.tokens -= 1;
            true
        } else {
            false
        }
    }

    pub fn tokens(&self) -> u32 {
        self.tokens
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}

/// Admission gate shared by all in-flight page tasks
#[derive(Debug)]
pub struct TokenBucket {
    state: Mutex<BucketState>,
    poll_interval: Duration,
}

impl TokenBucket {
    /// Creates a full bucket from the `[rate-limit]` configuration
    ///
    /// # Returns
    ///
    /// * `Ok(TokenBucket)` - Parameters are usable
    /// * `Err(ConfigError::Validation)` - Zero capacity, a non-positive rate, or a zero poll interval
    pub fn new(config: &RateLimitConfig) -> Result<Self, ConfigError> {
        Self::with_params(
            config.max_tokens,
            config.refill_rate,
            Duration::from_millis(config.poll_interval_ms),
        )
    }

    pub fn with_params(
        max_tokens: u32,
        refill_rate: f64,
        poll_interval: Duration,
    ) -> Result<Self, ConfigError> {
        // A zero-capacity bucket never admits anyone
        if max_tokens == 0 {
            return Err(ConfigError::Validation(
                "rate limiter max-tokens must be at least 1".to_string(),
            ));
        }
        if !refill_rate.is_finite() || refill_rate <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "rate limiter refill-rate must be a positive number, got {}",
                refill_rate
            )));
        }
        if poll_interval.is_zero() {
            return Err(ConfigError::Validation(
                "rate limiter poll interval must be non-zero".to_string(),
            ));
        }

        Ok(Self {
            state: Mutex::new(BucketState::new(max_tokens, refill_rate, Instant::now())),
            poll_interval,
        })
    }

    /// Takes a token if one is available right now
    pub async fn try_acquire(&self) -> bool {
        self.state.lock().await.try_take(Instant::now())
    }

    /// Waits until a token is available, then consumes exactly one
    ///
    /// Between checks the caller sleeps for the poll interval; the lock is not held
    /// while sleeping.
    pub async fn acquire(&self) {
        let mut waited = false;
        while !self.try_acquire().await {
            if !waited {
                tracing::trace!("Rate limit reached, waiting for a token");
                waited = true;
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Current token count (after a refill check)
    pub async fn available(&self) -> u32 {
        let mut state = self.state.lock().await;
        state.refill(Instant::now());
        state.tokens()
    }
}
