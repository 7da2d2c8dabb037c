use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use docs_scribe::config::load_config;
///
/// let config = load_config(Path::new("docs-scribe.toml")).unwrap();
/// println!("Seed page: {}", config.site.seed());
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;

    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// The hash is logged at startup so a run can be matched to the exact file that drove it.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok((Config, String))` - Successfully loaded configuration and its hash
/// * `Err(ConfigError)` - Failed to load or parse the configuration
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[site]
base-url = "https://docs.example.com"
seed-url = "https://docs.example.com/start"

[crawler]
max-concurrent = 3
max-retries = 4
retry-base-delay-ms = 250

[rate-limit]
max-tokens = 10
refill-rate = 0.5

[output]
output-dir = "./out"
front-matter = false

[validation]
min-length = 20
enforce = true
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.site.seed(), "https://docs.example.com/start");
        assert_eq!(config.crawler.max_concurrent, 3);
        assert_eq!(config.crawler.max_retries, 4);
        assert_eq!(config.rate_limit.max_tokens, 10);
        assert_eq!(config.rate_limit.refill_rate, 0.5);
        assert_eq!(config.rate_limit.poll_interval_ms, 100);
        assert!(!config.output.front_matter);
        assert_eq!(config.validation.min_length, 20);
        assert_eq!(config.validation.max_length, 1_000_000);
        assert!(config.validation.enforce);
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let file = create_temp_config("[site]\nbase-url = \"https://docs.example.com\"\n");
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.site.seed(), "https://docs.example.com");
        assert_eq!(config.crawler.max_concurrent, 5);
        assert_eq!(config.crawler.max_retries, 3);
        assert_eq!(config.rate_limit.max_tokens, 5);
        assert_eq!(config.renderer.navigation_timeout_ms, 30_000);
        assert_eq!(config.renderer.readiness_timeout_ms, 5_000);
        assert!(config.output.front_matter);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let config_content = "this is not valid TOML {{{";
        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let config_content = r#"
[site]
base-url = "https://docs.example.com"

[rate-limit]
max-tokens = 0
"#;

        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_compute_config_hash() {
        let config_content = "test content";
        let file = create_temp_config(config_content);

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }
}
