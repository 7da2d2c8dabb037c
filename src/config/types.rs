use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Docs-Scribe
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "rate-limit", default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub renderer: RendererConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
}

/// The documentation site being harvested
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Origin (and root) that discovered links must belong to
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Page whose links seed the crawl; defaults to the base URL
    #[serde(rename = "seed-url", default)]
    pub seed_url: Option<String>,
}

impl SiteConfig {
    /// Returns the seed URL, falling back to the base URL
    pub fn seed(&self) -> &str {
        self.seed_url.as_deref().unwrap_or(&self.base_url)
    }
}

/// Batch driver behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of pages rendered at the same time
    #[serde(rename = "max-concurrent")]
    pub max_concurrent: u32,

    /// Attempts per URL before it is reported as failed
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Base of the linear backoff between attempts (milliseconds)
    #[serde(rename = "retry-base-delay-ms")]
    pub retry_base_delay_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 5,
            max_retries: 3,
            retry_base_delay_ms: 1000,
        }
    }
}

impl CrawlerConfig {
    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}

/// Token bucket parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Bucket capacity (burst size)
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Tokens added per second
    #[serde(rename = "refill-rate")]
    pub refill_rate: f64,

    /// How long a waiting caller sleeps before re-checking the bucket (milliseconds)
    #[serde(rename = "poll-interval-ms")]
    pub poll_interval_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_tokens: 5,
            refill_rate: 2.0,
            poll_interval_ms: 100,
        }
    }
}

/// Renderer timeouts and identification
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    #[serde(rename = "navigation-timeout-ms")]
    pub navigation_timeout_ms: u64,

    #[serde(rename = "readiness-timeout-ms")]
    pub readiness_timeout_ms: u64,

    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            navigation_timeout_ms: 30_000,
            readiness_timeout_ms: 5_000,
            user_agent: format!("docs-scribe/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Output locations
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory; content/ and metadata/ are created beneath it
    #[serde(rename = "output-dir")]
    pub output_dir: PathBuf,

    /// Directory holding info.log and error.log
    #[serde(rename = "log-dir")]
    pub log_dir: PathBuf,

    /// Prefix Markdown files with a front matter block
    #[serde(rename = "front-matter")]
    pub front_matter: bool,

    /// Write summary.md under the output root after the run
    pub summary: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            log_dir: PathBuf::from("logs"),
            front_matter: true,
            summary: true,
        }
    }
}

/// Content validator bounds
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    #[serde(rename = "min-length")]
    pub min_length: usize,

    #[serde(rename = "max-length")]
    pub max_length: usize,

    /// Reject invalid results instead of persisting them with a warning
    pub enforce: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_length: 100,
            max_length: 1_000_000,
            enforce: false,
        }
    }
}
