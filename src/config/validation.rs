use crate::config::types::{
    Config, CrawlerConfig, OutputConfig, RateLimitConfig, RendererConfig, SiteConfig,
    ValidationConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    validate_rate_limit_config(&config.rate_limit)?;
    validate_renderer_config(&config.renderer)?;
    validate_output_config(&config.output)?;
    validate_validation_config(&config.validation)?;
    Ok(())
}

/// Validates the site URLs
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let base = parse_http_url("base_url", &config.base_url)?;

    if let Some(seed) = &config.seed_url {
        let seed = parse_http_url("seed_url", seed)?;
        if seed.origin() != base.origin() {
            return Err(ConfigError::Validation(format!(
                "seed_url '{}' must share the origin of base_url '{}'",
                seed, base
            )));
        }
    }

    Ok(())
}

fn parse_http_url(field: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    Ok(url)
}

/// Validates batch driver settings
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent < 1 || config.max_concurrent > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent must be between 1 and 100, got {}",
            config.max_concurrent
        )));
    }

    if config.max_retries < 1 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be >= 1, got {}",
            config.max_retries
        )));
    }

    Ok(())
}

/// Validates token bucket parameters
fn validate_rate_limit_config(config: &RateLimitConfig) -> Result<(), ConfigError> {
    if config.max_tokens < 1 {
        return Err(ConfigError::Validation(
            "max_tokens must be >= 1 (a zero-capacity bucket never admits)".to_string(),
        ));
    }

    if !config.refill_rate.is_finite() || config.refill_rate <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "refill_rate must be a positive number, got {}",
            config.refill_rate
        )));
    }

    if config.poll_interval_ms < 1 {
        return Err(ConfigError::Validation(
            "poll_interval_ms must be >= 1ms".to_string(),
        ));
    }

    Ok(())
}

fn validate_renderer_config(config: &RendererConfig) -> Result<(), ConfigError> {
    if config.navigation_timeout_ms < 1 || config.readiness_timeout_ms < 1 {
        return Err(ConfigError::Validation(format!(
            "renderer timeouts must be >= 1ms, got navigation={}ms readiness={}ms",
            config.navigation_timeout_ms, config.readiness_timeout_ms
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.output_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output_dir cannot be empty".to_string(),
        ));
    }

    if config.log_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation("log_dir cannot be empty".to_string()));
    }

    Ok(())
}

fn validate_validation_config(config: &ValidationConfig) -> Result<(), ConfigError> {
    if config.min_length > config.max_length {
        return Err(ConfigError::Validation(format!(
            "min_length ({}) cannot exceed max_length ({})",
            config.min_length, config.max_length
        )));
    }

    Ok(())
}
