//! Configuration module for Docs-Scribe
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Only `[site]` is required; every other section falls back to its defaults.
//!
//! # Example
//!
//! ```no_run
//! use docs_scribe::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("docs-scribe.toml")).unwrap();
//! println!("Crawling at most {} pages at once", config.crawler.max_concurrent);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, OutputConfig, RateLimitConfig, RendererConfig, SiteConfig,
    ValidationConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
