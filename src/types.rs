//! Page data produced by the pipeline
//!
//! These values are created once per render attempt and never mutated afterwards:
//! a retry produces a fresh `ScrapingResult` rather than updating the previous one.

use serde::{Deserialize, Serialize};

/// Metadata describing one rendered page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    /// Absolute URL of the page
    pub url: String,

    /// Page title (empty when the attempt failed)
    pub title: String,

    /// Meta description, if the page declares one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Last modification date as published by the page (not validated here)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,

    /// Category mined from the breadcrumb trail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Absolute URL of the parent page in the breadcrumb trail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_page: Option<String>,
}

impl PageMetadata {
    /// Metadata for a page that could not be rendered or converted
    pub fn failed(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: String::new(),
            description: None,
            last_modified: None,
            category: None,
            parent_page: None,
        }
    }
}

/// Outcome of processing a single page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapingResult {
    pub metadata: PageMetadata,

    /// Markdown body
    pub content: String,

    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScrapingResult {
    /// Builds a successful result
    pub fn succeeded(metadata: PageMetadata, content: String) -> Self {
        Self {
            metadata,
            content,
            success: true,
            error: None,
        }
    }

    /// Builds a failed result: empty title, empty content, and the error message
    pub fn failed(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            metadata: PageMetadata::failed(url),
            content: String::new(),
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Outcome of the content validator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub issues: Vec<String>,
}

impl ValidationResult {
    /// Builds a result from the collected issues; valid iff there are none
    pub fn from_issues(issues: Vec<String>) -> Self {
        Self {
            is_valid: issues.is_empty(),
            issues,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_result_shape() {
        let result = ScrapingResult::failed("https://docs.example.com/a", "timed out");
        assert!(!result.success);
        assert!(result.content.is_empty());
        assert_eq!(result.metadata.title, "");
        assert_eq!(result.error.as_deref(), Some("timed out"));
    }

    #[test]
    fn test_metadata_json_omits_absent_fields() {
        let metadata = PageMetadata {
            url: "https://docs.example.com/a".to_string(),
            title: "A".to_string(),
            description: None,
            last_modified: Some("2024-01-01".to_string()),
            category: None,
            parent_page: None,
        };

        let json = serde_json::to_string(&metadata).unwrap();
        assert!(json.contains("\"lastModified\":\"2024-01-01\""));
        assert!(!json.contains("category"));
        assert!(!json.contains("description"));
    }

    #[test]
    fn test_validation_result_from_issues() {
        assert!(ValidationResult::from_issues(vec![]).is_valid);
        assert!(!ValidationResult::from_issues(vec!["x".to_string()]).is_valid);
    }
}
