//! Paragraph extraction from raw page text.
//!
//! PDF text extraction yields hard-wrapped lines with blank lines between
//! blocks. This module turns one page of such text into single-line,
//! whitespace-normalized paragraphs suitable for [`crate::chunk::build_chunks`].

use once_cell::sync::Lazy;
use regex::Regex;

/// Paragraphs shorter than this are dropped unless they look like a
/// section marker.
pub const MIN_PARAGRAPH_CHARS: usize = 25;

static BLOCK_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static SECTION_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9IVX]+\.").unwrap());

/// Split one page of extracted text into normalized paragraphs.
///
/// - Non-breaking spaces become plain spaces.
/// - Blocks are separated by blank lines (a newline, optional whitespace,
///   another newline).
/// - Lines inside a block are trimmed and joined with a single space, then
///   whitespace runs collapse to one space.
/// - Empty blocks are dropped, as are blocks under
///   [`MIN_PARAGRAPH_CHARS`] characters unless [`is_section_marker`].
pub fn split_paragraphs(page_text: &str) -> Vec<String> {
    let text = page_text.replace('\u{00a0}', " ");

    BLOCK_SEPARATOR
        .split(&text)
        .filter_map(|block| {
            let joined = block.lines().map(str::trim).collect::<Vec<_>>().join(" ");
            let normalized = WHITESPACE_RUN.replace_all(&joined, " ").trim().to_string();
            if normalized.is_empty() {
                return None;
            }
            if normalized.chars().count() < MIN_PARAGRAPH_CHARS && !is_section_marker(&normalized)
            {
                return None;
            }
            Some(normalized)
        })
        .collect()
}

/// Whether a short block looks like a numbered or roman-numeral heading
/// (`"3."`, `"IV. 결론"`).
pub fn is_section_marker(text: &str) -> bool {
    SECTION_MARKER.is_match(text)
}

/// Split every page and concatenate the results in page order.
pub fn split_pages<S: AsRef<str>>(pages: &[S]) -> Vec<String> {
    pages
        .iter()
        .flat_map(|page| split_paragraphs(page.as_ref()))
        .collect()
}
