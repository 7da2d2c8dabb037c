//! Output module: persistence of results and the run summary
//!
//! This module handles:
//! - Writing each successful page as a Markdown file plus a JSON metadata file
//! - Collecting per-URL outcomes into a batch report
//! - Rendering that report to the console and to `summary.md`

mod store;
mod summary;
mod traits;

pub use store::{front_matter, sanitize_filename, FileStore, MAX_STEM_LEN};
pub use summary::{format_summary, print_summary, write_summary, SUMMARY_FILE};
pub use traits::{BatchReport, FlaggedPage, PageFailure, PersistedPage, ResultSink};

use thiserror::Error;

/// Errors that can occur while writing output
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize metadata: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
