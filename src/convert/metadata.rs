//! Page metadata extraction
//!
//! Runs on the document as rendered, before the cleanup pass strips the
//! breadcrumb and head elements it reads from.

use crate::convert::markdown::collapsed_text;
use crate::convert::parse_selector;
use crate::ConversionError;
use scraper::{Html, Selector};

/// Title used when a page has neither `<title>` nor `<h1>`
pub const UNTITLED: &str = "Untitled Document";

/// Meta tags consulted for the last-modified date, in priority order
const LAST_MODIFIED_META: &[&str] = &[
    "meta[property='article:modified_time']",
    "meta[name='last-modified']",
    "meta[http-equiv='last-modified']",
    "meta[name='dcterms.modified']",
    "meta[property='og:updated_time']",
];

/// Metadata mined from the HTML itself
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedMetadata {
    /// Title from `<title>`, then the first `<h1>`, then [`UNTITLED`]
    pub title: String,

    pub description: Option<String>,

    /// Raw date string as published; never defaulted to an empty string
    pub last_modified: Option<String>,

    /// Text of the first non-empty breadcrumb element
    pub category: Option<String>,

    /// Link targets inside that breadcrumb, in document order
    pub breadcrumb_links: Vec<String>,
}

/// Extracts title, description, last-modified date and breadcrumb data
pub fn extract_metadata(document: &Html) -> Result<ExtractedMetadata, ConversionError> {
    let title = first_text(document, &parse_selector("title")?)
        .or(first_text(document, &parse_selector("h1")?))
        .unwrap_or_else(|| UNTITLED.to_string());

    let description = first_attr(
        document,
        &parse_selector("meta[name='description']")?,
        "content",
    )
    .or(first_attr(
        document,
        &parse_selector("meta[property='og:description'], meta[name='og:description']")?,
        "content",
    ));

    let mut last_modified = None;
    for selector in LAST_MODIFIED_META {
        last_modified = first_attr(document, &parse_selector(selector)?, "content");
        if last_modified.is_some() {
            break;
        }
    }
    if last_modified.is_none() {
        last_modified = first_attr(document, &parse_selector("time[datetime]")?, "datetime");
    }

    let (category, breadcrumb_links) = breadcrumb(document)?;

    Ok(ExtractedMetadata {
        title,
        description,
        last_modified,
        category,
        breadcrumb_links,
    })
}

/// Category text and links from the first non-empty breadcrumb
///
/// Falls back to a `data-category` attribute when the page has no breadcrumb.
fn breadcrumb(document: &Html) -> Result<(Option<String>, Vec<String>), ConversionError> {
    let crumbs = parse_selector("[class*='breadcrumb']")?;
    let anchors = parse_selector("a[href]")?;

    let trail = document
        .select(&crumbs)
        .map(|el| (collapsed_text(&el), el))
        .find(|(text, _)| !text.is_empty());

    if let Some((text, element)) = trail {
        let links = element
            .select(&anchors)
            .filter_map(|a| a.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty() && !href.starts_with('#'))
            .map(str::to_string)
            .collect();
        return Ok((Some(text), links));
    }

    let category = first_attr(document, &parse_selector("[data-category]")?, "data-category");
    Ok((category, Vec::new()))
}

fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .map(|el| collapsed_text(&el))
        .find(|text| !text.is_empty())
}

fn first_attr(document: &Html, selector: &Selector, attr: &str) -> Option<String> {
    document
        .select(selector)
        .filter_map(|el| el.value().attr(attr))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}
