//! Structural Markdown emitter
//!
//! Walks the cleaned body in document order and turns each block element into one
//! Markdown block. Runs of inline content between blocks become paragraphs.

use crate::convert::parse_selector;
use crate::ConversionError;
use ego_tree::NodeRef;
use scraper::{ElementRef, Html, Node, Selector};

/// Elements that start a new Markdown block
const BLOCK_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "body",
    "dd",
    "details",
    "div",
    "dl",
    "dt",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hr",
    "html",
    "li",
    "main",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "summary",
    "table",
    "tbody",
    "td",
    "tfoot",
    "th",
    "thead",
    "tr",
    "ul",
];

fn is_block(element: &ElementRef<'_>) -> bool {
    BLOCK_TAGS.contains(&element.value().name())
}

/// Renders the document body as a sequence of Markdown blocks
pub fn render_body(document: &Html) -> Result<Vec<String>, ConversionError> {
    let body_selector = parse_selector("body")?;
    let rows = parse_selector("tr")?;
    let cells = parse_selector("th, td")?;

    let emitter = Emitter {
        rows,
        cells,
        blocks: Vec::new(),
    };

    let root = document
        .select(&body_selector)
        .next()
        .unwrap_or_else(|| document.root_element());

    Ok(emitter.run(root))
}

struct Emitter {
    rows: Selector,
    cells: Selector,
    blocks: Vec<String>,
}

impl Emitter {
    fn run(mut self, root: ElementRef<'_>) -> Vec<String> {
        self.container(root);
        self.blocks
    }

    fn push(&mut self, block: String) {
        let block = block.trim_end().to_string();
        if !block.trim().is_empty() {
            self.blocks.push(block);
        }
    }

    /// Emits the children of a container, grouping inline runs into paragraphs
    fn container(&mut self, element: ElementRef<'_>) {
        let mut inline = String::new();

        for child in element.children() {
            match ElementRef::wrap(child) {
                Some(el) if is_block(&el) => {
                    self.flush_paragraph(&mut inline);
                    self.block(el);
                }
                _ => render_inline(child, &mut inline),
            }
        }

        self.flush_paragraph(&mut inline);
    }

    fn flush_paragraph(&mut self, inline: &mut String) {
        let text = inline.trim().to_string();
        inline.clear();
        self.push(text);
    }

    fn block(&mut self, element: ElementRef<'_>) {
        match element.value().name() {
            name @ ("h1" | "h2" | "h3" | "h4" | "h5" | "h6") => {
                let level = usize::from(name.as_bytes()[1] - b'0');
                let text = escape_text(&collapsed_text(&element));
                if !text.is_empty() {
                    self.push(format!("{} {}", "#".repeat(level), text));
                }
            }
            "p" => {
                let mut inline = String::new();
                render_inline_children(element, &mut inline);
                self.flush_paragraph(&mut inline);
            }
            "ul" | "ol" => {
                let mut lines = Vec::new();
                collect_list_items(element, &mut lines);
                self.push(lines.join("\n"));
            }
            "pre" => {
                if let Some(block) = code_block(&element) {
                    self.push(block);
                }
            }
            "table" => {
                if let Some(block) = self.table(&element) {
                    self.push(block);
                }
            }
            "hr" => {}
            _ => self.container(element),
        }
    }

    /// Pipe table: first row is the header, then a separator, then body rows
    fn table(&self, table: &ElementRef<'_>) -> Option<String> {
        let rows: Vec<Vec<String>> = table
            .select(&self.rows)
            .map(|row| {
                row.select(&self.cells)
                    .map(|cell| escape_text(&collapsed_text(&cell)).replace('|', "\\|"))
                    .collect()
            })
            .collect();

        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        if rows.is_empty() || width == 0 {
            return None;
        }

        let format_row = |cells: &[String]| {
            let mut line = String::from("|");
            for i in 0..width {
                let cell = cells.get(i).map(String::as_str).unwrap_or("");
                line.push(' ');
                line.push_str(cell);
                line.push_str(" |");
            }
            line
        };

        let mut lines = Vec::with_capacity(rows.len() + 1);
        lines.push(format_row(rows[0].as_slice()));
        lines.push(format!("|{}", " --- |".repeat(width)));
        lines.extend(rows[1..].iter().map(|row| format_row(row.as_slice())));

        Some(lines.join("\n"))
    }
}

/// One `- item` line per list item; nested lists are flattened after their parent item
fn collect_list_items(list: ElementRef<'_>, lines: &mut Vec<String>) {
    for child in list.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "li" => {
                let mut text = String::new();
                let mut nested = Vec::new();

                for node in child.children() {
                    match ElementRef::wrap(node) {
                        Some(el) if matches!(el.value().name(), "ul" | "ol") => nested.push(el),
                        _ => render_inline(node, &mut text),
                    }
                }

                let text = text.trim();
                if !text.is_empty() {
                    lines.push(format!("- {}", text));
                }
                for list in nested {
                    collect_list_items(list, lines);
                }
            }
            "ul" | "ol" => collect_list_items(child, lines),
            _ => {}
        }
    }
}

/// Fenced code block with an optional `language-<lang>` tag from the inner `<code>`
fn code_block(pre: &ElementRef<'_>) -> Option<String> {
    let code = pre
        .children()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "code");

    let language = code
        .and_then(|el| {
            el.value()
                .classes()
                .find_map(|class| class.strip_prefix("language-"))
                .map(str::to_string)
        })
        .unwrap_or_default();

    let text: String = pre.text().collect();
    let text = text.trim_start_matches(|c: char| c == '\r' || c == '\n').trim_end();
    if text.is_empty() {
        return None;
    }

    let fence = "`".repeat((longest_backtick_run(text) + 1).max(3));
    Some(format!("{fence}{}\n{}\n{fence}", language, text))
}

/// Inline code span delimited by more backticks than the text contains
fn code_span(text: &str) -> String {
    let ticks = "`".repeat(longest_backtick_run(text) + 1);
    if text.starts_with('`') || text.ends_with('`') {
        format!("{ticks} {text} {ticks}")
    } else {
        format!("{ticks}{text}{ticks}")
    }
}

fn longest_backtick_run(text: &str) -> usize {
    text.split(|c| c != '`').map(str::len).max().unwrap_or(0)
}

fn render_inline_children(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        render_inline(child, out);
    }
}

/// Appends the inline Markdown for one node
fn render_inline(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Text(text) => push_text(out, text),
        Node::Element(_) => {
            if let Some(element) = ElementRef::wrap(node) {
                render_inline_element(element, out);
            }
        }
        _ => {}
    }
}

fn render_inline_element(element: ElementRef<'_>, out: &mut String) {
    match element.value().name() {
        "a" => {
            let mut text = String::new();
            render_inline_children(element, &mut text);
            let text = text.trim();

            match element.value().attr("href").map(str::trim) {
                Some(href) if !href.is_empty() && !href.starts_with('#') && !text.is_empty() => {
                    out.push_str(&format!("[{}]({})", text, href));
                }
                _ => push_words(out, text),
            }
        }
        "img" => {
            let alt = element.value().attr("alt").unwrap_or("").trim();
            let src = element.value().attr("src").unwrap_or("").trim();
            out.push_str(&format!("![{}]({})", alt, src));
        }
        "code" | "kbd" | "samp" => {
            let text = collapsed_text(&element);
            if !text.is_empty() {
                out.push_str(&code_span(&text));
            }
        }
        "strong" | "b" => wrap_inline(element, out, "**"),
        "em" | "i" => wrap_inline(element, out, "*"),
        "br" => push_text(out, " "),
        "script" | "style" => {}
        _ => render_inline_children(element, out),
    }
}

fn wrap_inline(element: ElementRef<'_>, out: &mut String, marker: &str) {
    let mut text = String::new();
    render_inline_children(element, &mut text);
    let text = text.trim();
    if !text.is_empty() {
        out.push_str(marker);
        out.push_str(text);
        out.push_str(marker);
    }
}

/// Appends a text node with HTML whitespace collapsing
fn push_text(out: &mut String, text: &str) {
    push_words(out, &escape_text(text));
}

/// `<` in prose is escaped so decoded entities never read as markup
fn escape_text(text: &str) -> String {
    text.replace('<', "\\<")
}

/// Appends already rendered text with HTML whitespace collapsing
fn push_words(out: &mut String, text: &str) {
    let mut separate = text.starts_with(char::is_whitespace);

    for word in text.split_whitespace() {
        if separate && !out.is_empty() && !out.ends_with(' ') {
            out.push(' ');
        }
        out.push_str(word);
        separate = true;
    }

    if text.ends_with(char::is_whitespace) && !out.is_empty() && !out.ends_with(' ') {
        out.push(' ');
    }
}

/// Element text with whitespace runs collapsed to single spaces
pub(crate) fn collapsed_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
