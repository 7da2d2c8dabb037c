//! Cleanup pass run before Markdown extraction
//!
//! Removes chrome (scripts, styles, navigation, headers, footers, frames) and then
//! empty containers, mutating the parsed tree in place. `class` and `id` values are
//! never copied into the output; the only one consulted later is the `language-*`
//! hint on code blocks.

use crate::convert::parse_selector;
use crate::ConversionError;
use scraper::{ElementRef, Html, Selector};

/// Elements that never carry page content
const CHROME_SELECTOR: &str = "script, style, noscript, template, nav, header, footer, iframe, \
     [role='navigation'], [role='menu'], [role='menubar'], [aria-label='breadcrumb'], \
     .nav, .navbar, .navigation, .menu, .sidebar, .toc, .breadcrumb, .breadcrumbs, \
     .skip-link";

/// Block and text containers that are dropped when they hold nothing
const CONTAINER_SELECTOR: &str = "div, span, p, section, article, aside, main, ul, ol, li, \
     blockquote, figure, strong, em, b, i, a, h1, h2, h3, h4, h5, h6";

/// Descendants that make a container worth keeping even without text
const MEDIA_SELECTOR: &str = "img, pre, table";

/// Strips chrome and empty containers from the document
///
/// Chrome goes first so that a container left empty by its removal is caught
/// by the second sweep.
pub fn clean_document(document: &mut Html) -> Result<(), ConversionError> {
    let chrome = parse_selector(CHROME_SELECTOR)?;
    let containers = parse_selector(CONTAINER_SELECTOR)?;
    let media = parse_selector(MEDIA_SELECTOR)?;

    let removed_chrome = detach_where(document, &chrome, |_| true);
    let removed_empty = detach_where(document, &containers, |el| is_empty(el, &media));

    tracing::trace!(removed_chrome, removed_empty, "cleaned document");
    Ok(())
}

/// A container is empty when it has no visible text and no media
fn is_empty(element: &ElementRef<'_>, media: &Selector) -> bool {
    element.text().all(|t| t.trim().is_empty()) && element.select(media).next().is_none()
}

/// Detaches every element matched by `selector` that satisfies `predicate`
///
/// Emptiness is judged on the whole subtree, so nested empty containers are all
/// matched in one sweep.
fn detach_where<F>(document: &mut Html, selector: &Selector, predicate: F) -> usize
where
    F: Fn(&ElementRef<'_>) -> bool,
{
    let ids: Vec<_> = document
        .select(selector)
        .filter(|el| predicate(el))
        .map(|el| el.id())
        .collect();

    let count = ids.len();
    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
    count
}
