//! Docs-Scribe: a documentation site harvester
//!
//! This crate discovers the pages of a documentation site from a seed page, renders
//! each one under a shared rate limit, converts the HTML body into normalized
//! Markdown plus structured metadata, and persists both under an output root.

pub mod config;
pub mod convert;
pub mod crawler;
pub mod logging;
pub mod output;
pub mod state;
pub mod types;
pub mod url;
pub mod validate;

use std::time::Duration;
use thiserror::Error;

/// Main error type for Docs-Scribe operations
#[derive(Debug, Error)]
pub enum ScribeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Conversion error: {0}")]
    Conversion(#[from] ConversionError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::PageState,
        to: state::PageState,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Failures reported by the page renderer
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Renderer failed to launch: {0}")]
    Launch(String),

    #[error("Navigation to {url} timed out after {after:?}")]
    Timeout { url: String, after: Duration },

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Page {url} never became ready (no document body)")]
    NotReady { url: String },
}

/// Failures of the HTML to Markdown conversion
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("Document is empty")]
    EmptyDocument,

    #[error("Invalid selector: {0}")]
    Selector(String),
}

/// Result type alias for Docs-Scribe operations
pub type Result<T> = std::result::Result<T, ScribeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for renderer operations
pub type RenderResult<T> = std::result::Result<T, RenderError>;

// Re-export commonly used types
pub use config::Config;
pub use convert::{convert, ConvertedPage};
pub use state::PageState;
pub use types::{PageMetadata, ScrapingResult, ValidationResult};
pub use validate::ContentValidator;
