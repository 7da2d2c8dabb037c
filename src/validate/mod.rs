//! Content validator
//!
//! Post-hoc acceptance check on a finished [`ScrapingResult`]. Every check runs on
//! its own and all findings are collected; nothing short-circuits except a result
//! that already failed.

use crate::config::ValidationConfig;
use crate::types::{ScrapingResult, ValidationResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

static RE_HTML_TAG: OnceLock<Regex> = OnceLock::new();
static RE_INLINE_CODE: OnceLock<Regex> = OnceLock::new();
static RE_LINK: OnceLock<Regex> = OnceLock::new();

/// Date layouts accepted for `lastModified` besides RFC 3339 and RFC 2822
const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%B %d, %Y", "%b %d, %Y", "%d %B %Y"];

/// Validates scraped pages against length bounds and structural heuristics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentValidator {
    min_length: usize,
    max_length: usize,
}

impl Default for ContentValidator {
    fn default() -> Self {
        Self::new(&ValidationConfig::default())
    }
}

impl ContentValidator {
    pub fn new(config: &ValidationConfig) -> Self {
        Self::with_bounds(config.min_length, config.max_length)
    }

    /// Creates a validator accepting content of `min_length..=max_length` characters
    pub fn with_bounds(min_length: usize, max_length: usize) -> Self {
        Self {
            min_length,
            max_length,
        }
    }

    /// Checks a result and reports every issue found
    ///
    /// A failed result yields exactly one issue carrying its error.
    pub fn validate(&self, result: &ScrapingResult) -> ValidationResult {
        if !result.success {
            let error = result.error.as_deref().unwrap_or("unknown error");
            return ValidationResult::from_issues(vec![format!("Scraping failed: {}", error)]);
        }

        let mut issues = Vec::new();
        check_metadata(result, &mut issues);
        self.check_length(&result.content, &mut issues);
        check_structure(&result.content, &mut issues);

        let prose = strip_code(&result.content);
        check_html(&prose, &mut issues);
        check_links(&prose, &mut issues);

        ValidationResult::from_issues(issues)
    }

    fn check_length(&self, content: &str, issues: &mut Vec<String>) {
        let length = content.chars().count();

        if length < self.min_length {
            issues.push(format!(
                "Content length {} is below the minimum of {} characters",
                length, self.min_length
            ));
        } else if length > self.max_length {
            issues.push(format!(
                "Content length {} exceeds the maximum of {} characters",
                length, self.max_length
            ));
        }
    }
}

fn check_metadata(result: &ScrapingResult, issues: &mut Vec<String>) {
    let metadata = &result.metadata;

    if metadata.title.trim().is_empty() {
        issues.push("Missing title in metadata".to_string());
    }

    if metadata.url.trim().is_empty() {
        issues.push("Missing URL in metadata".to_string());
    } else if !matches!(
        Url::parse(&metadata.url).as_ref().map(Url::scheme),
        Ok("http" | "https")
    ) {
        issues.push(format!("Invalid URL format: {}", metadata.url));
    }

    if let Some(date) = &metadata.last_modified {
        if !is_valid_date(date) {
            issues.push(format!("Invalid last modified date format: {}", date));
        }
    }
}

/// Accepts RFC 3339, RFC 2822 and a handful of common publishing layouts
pub fn is_valid_date(value: &str) -> bool {
    let value = value.trim();

    DateTime::parse_from_rfc3339(value).is_ok()
        || DateTime::parse_from_rfc2822(value).is_ok()
        || DATE_TIME_FORMATS
            .iter()
            .any(|f| NaiveDateTime::parse_from_str(value, f).is_ok())
        || DATE_FORMATS
            .iter()
            .any(|f| NaiveDate::parse_from_str(value, f).is_ok())
}

/// Unclosed fences and table rows that do not line up with their header
fn check_structure(content: &str, issues: &mut Vec<String>) {
    let mut fence = Fence::default();
    let mut table: Option<usize> = None;

    for (index, line) in content.lines().enumerate() {
        let line_no = index + 1;
        let trimmed = line.trim();

        if fence.advance(trimmed, line_no) {
            table = None;
            continue;
        }
        if fence.is_open() {
            continue;
        }

        if !trimmed.starts_with('|') {
            table = None;
            continue;
        }

        if !trimmed.ends_with('|') || trimmed.len() < 2 {
            issues.push(format!("Malformed table row at line {}", line_no));
            continue;
        }

        let columns = count_cells(trimmed);
        match table {
            None => table = Some(columns),
            Some(expected) if expected != columns => issues.push(format!(
                "Malformed table row at line {}: expected {} columns, found {}",
                line_no, expected, columns
            )),
            Some(_) => {}
        }
    }

    if let Some(opened_at) = fence.opened_at() {
        issues.push(format!("Unclosed code fence opened at line {}", opened_at));
    }
}

/// Tracks backtick fences; a fence closes only on a bare run at least as long as its opener
#[derive(Debug, Default)]
struct Fence {
    /// Opening run length and line number
    open: Option<(usize, usize)>,
}

impl Fence {
    /// Consumes one trimmed line; true when the line opened or closed a fence
    fn advance(&mut self, trimmed: &str, line_no: usize) -> bool {
        let run = trimmed.chars().take_while(|&c| c == '`').count();
        if run < 3 {
            return false;
        }

        match self.open {
            None => {
                self.open = Some((run, line_no));
                true
            }
            Some((opener, _)) if run >= opener && run == trimmed.len() => {
                self.open = None;
                true
            }
            Some(_) => false,
        }
    }

    fn is_open(&self) -> bool {
        self.open.is_some()
    }

    fn opened_at(&self) -> Option<usize> {
        self.open.map(|(_, line)| line)
    }
}

/// Cells in a `| a | b |` row, ignoring escaped pipes
fn count_cells(row: &str) -> usize {
    let mut pipes = 0usize;
    let mut escaped = false;

    for c in row.chars() {
        match c {
            '\\' if !escaped => escaped = true,
            '|' if !escaped => pipes += 1,
            _ => escaped = false,
        }
        if c != '\\' {
            escaped = false;
        }
    }

    pipes.saturating_sub(1)
}

/// Content with fenced blocks and inline code spans blanked out
fn strip_code(content: &str) -> String {
    let inline = RE_INLINE_CODE.get_or_init(|| Regex::new(r"`[^`\n]*`").expect("valid regex"));

    let mut fence = Fence::default();
    let mut prose = String::with_capacity(content.len());
    for (index, line) in content.lines().enumerate() {
        let delimiter = fence.advance(line.trim(), index + 1);
        if !delimiter && !fence.is_open() {
            prose.push_str(&inline.replace_all(line, ""));
        }
        prose.push('\n');
    }
    prose
}

fn check_html(prose: &str, issues: &mut Vec<String>) {
    let re = RE_HTML_TAG.get_or_init(|| {
        Regex::new(r"</?[a-zA-Z][a-zA-Z0-9-]*(?:\s[^<>]*)?/?>").expect("valid regex")
    });

    let mut tags: Vec<&str> = Vec::new();
    for m in re.find_iter(prose) {
        // `\<` is an escaped angle bracket, not markup
        if prose[..m.start()].ends_with('\\') {
            continue;
        }
        if !tags.contains(&m.as_str()) {
            tags.push(m.as_str());
        }
    }

    if !tags.is_empty() {
        let shown: Vec<_> = tags.iter().take(3).copied().collect();
        issues.push(format!("Leftover HTML tags: {}", shown.join(", ")));
    }
}

fn check_links(prose: &str, issues: &mut Vec<String>) {
    let re = RE_LINK.get_or_init(|| Regex::new(r"\[[^\]]*\]\(([^)]*)\)").expect("valid regex"));

    for caps in re.captures_iter(prose) {
        let target = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
        if !is_valid_link_target(target) {
            issues.push(format!("Invalid link target: '{}'", target));
        }
    }
}

/// Absolute URL, root-relative path, or same-page fragment
fn is_valid_link_target(target: &str) -> bool {
    if target.starts_with('/') || target.starts_with('#') {
        return true;
    }
    Url::parse(target).is_ok()
}
