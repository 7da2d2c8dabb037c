//! Content converter: rendered HTML to normalized Markdown plus metadata
//!
//! Conversion is a pure function of the input HTML:
//! 1. Metadata is read from the document as rendered
//! 2. The cleanup pass strips chrome and empty containers
//! 3. The body is emitted as Markdown blocks in document order
//! 4. The joined text is normalized (line endings, blank-line runs, outer whitespace)

mod cleanup;
mod markdown;
mod metadata;

pub use cleanup::clean_document;
pub use metadata::{extract_metadata, ExtractedMetadata, UNTITLED};

use crate::ConversionError;
use scraper::{Html, Selector};

/// Output of the content converter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedPage {
    pub markdown: String,
    pub metadata: ExtractedMetadata,
}

/// Converts rendered HTML into Markdown and page metadata
///
/// Missing elements degrade gracefully (no title → placeholder, no body → empty
/// Markdown); only empty input or an unusable selector is an error.
///
/// # Example
///
/// ```
/// use docs_scribe::convert;
///
/// let page = convert("<html><head><title>Intro</title></head><body><h2>Setup</h2></body></html>").unwrap();
/// assert_eq!(page.markdown, "## Setup");
/// assert_eq!(page.metadata.title, "Intro");
/// ```
pub fn convert(html: &str) -> Result<ConvertedPage, ConversionError> {
    if html.trim().is_empty() {
        return Err(ConversionError::EmptyDocument);
    }

    let mut document = Html::parse_document(html);
    let metadata = extract_metadata(&document)?;

    clean_document(&mut document)?;
    let blocks = markdown::render_body(&document)?;

    Ok(ConvertedPage {
        markdown: normalize_markdown(&blocks.join("\n\n")),
        metadata,
    })
}

/// Normalizes line endings, drops trailing spaces, collapses 3+ newlines to 2 and trims
pub fn normalize_markdown(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");

    let mut out = String::with_capacity(unified.len());
    let mut newlines = 0;
    for (i, line) in unified.split('\n').enumerate() {
        if i > 0 {
            newlines += 1;
            if newlines <= 2 {
                out.push('\n');
            }
        }

        let line = line.trim_end();
        if !line.is_empty() {
            newlines = 0;
            out.push_str(line);
        }
    }

    out.trim().to_string()
}

pub(crate) fn parse_selector(selector: &str) -> Result<Selector, ConversionError> {
    Selector::parse(selector)
        .map_err(|e| ConversionError::Selector(format!("{}: {:?}", selector, e)))
}
