//! Result sink trait and batch report types

use crate::output::OutputResult;
use crate::types::ScrapingResult;
use std::path::PathBuf;
use std::time::Duration;

/// Destination for successful results
///
/// Implementations are shared by every page task of a batch and must be thread-safe.
pub trait ResultSink: Send + Sync {
    /// Persists one result
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - Location of the written content
    /// * `Err(OutputError)` - The result could not be written
    fn persist(&self, result: &ScrapingResult) -> OutputResult<PathBuf>;
}

/// A page written by the sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedPage {
    pub url: String,
    pub path: PathBuf,
}

/// A URL that produced no persisted result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFailure {
    pub url: String,

    /// Error of the last attempt
    pub error: String,

    /// Number of attempts made
    pub attempts: u32,
}

/// A page with validation issues
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlaggedPage {
    pub url: String,
    pub issues: Vec<String>,

    /// False when enforcement rejected the page
    pub persisted: bool,
}

/// Outcome of one batch run
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    // Run metadata
    pub started_at: String,
    pub elapsed: Duration,
    pub config_hash: Option<String>,

    /// URLs handed to the batch
    pub total: usize,

    pub persisted: Vec<PersistedPage>,
    pub failed: Vec<PageFailure>,
    pub flagged: Vec<FlaggedPage>,
}

impl BatchReport {
    /// Creates an empty report for a batch of `total` URLs, stamped with the current time
    pub fn new(total: usize) -> Self {
        Self {
            started_at: chrono::Utc::now().to_rfc3339(),
            total,
            ..Self::default()
        }
    }

    /// Pages produced but not persisted because they failed validation
    pub fn rejected_count(&self) -> usize {
        self.flagged.iter().filter(|f| !f.persisted).count()
    }

    /// Percentage of URLs that ended up persisted
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.persisted.len() as f64 / self.total as f64) * 100.0
    }

    /// True when every URL was persisted
    pub fn is_complete(&self) -> bool {
        self.persisted.len() == self.total
    }

    /// Orders every list by URL so reports are reproducible
    pub fn sort(&mut self) {
        self.persisted.sort_by(|a, b| a.url.cmp(&b.url));
        self.failed.sort_by(|a, b| a.url.cmp(&b.url));
        self.flagged.sort_by(|a, b| a.url.cmp(&b.url));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn persisted(url: &str) -> PersistedPage {
        PersistedPage {
            url: url.to_string(),
            path: PathBuf::from("x.md"),
        }
    }

    #[test]
    fn test_new_report() {
        let report = BatchReport::new(4);
        assert_eq!(report.total, 4);
        assert!(report.persisted.is_empty());
        assert!(!report.started_at.is_empty());
    }

    #[test]
    fn test_success_rate() {
        let mut report = BatchReport::new(4);
        report.persisted = vec![persisted("a"), persisted("b"), persisted("c")];
        assert!((report.success_rate() - 75.0).abs() < 0.01);
        assert!(!report.is_complete());
    }

    #[test]
    fn test_success_rate_empty_batch() {
        assert_eq!(BatchReport::new(0).success_rate(), 0.0);
    }

    #[test]
    fn test_rejected_count_and_sort() {
        let mut report = BatchReport::new(3);
        report.flagged = vec![
            FlaggedPage {
                url: "z".to_string(),
                issues: vec!["short".to_string()],
                persisted: false,
            },
            FlaggedPage {
                url: "a".to_string(),
                issues: vec!["short".to_string()],
                persisted: true,
            },
        ];
        report.sort();

        assert_eq!(report.rejected_count(), 1);
        assert_eq!(report.flagged[0].url, "a");
    }
}
