//! PDF text extraction.
//!
//! Reads a PDF, extracts text page by page with `pdf-extract`, and hands
//! each page to [`caseseed_core::paragraph::split_paragraphs`]. Pages are
//! kept separate so that a paragraph never spans a page break.

use std::path::Path;

use caseseed_core::paragraph::split_pages;
use thiserror::Error;

/// Magic bytes every PDF starts with.
pub const PDF_MAGIC: &[u8] = b"%PDF";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
}

/// Extract the text of each page, in page order.
pub fn extract_pages(bytes: &[u8]) -> Result<Vec<String>, ExtractError> {
    pdf_extract::extract_text_from_mem_by_pages(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))
}

/// Read a PDF from disk and return its normalized paragraphs.
///
/// An empty result is not an error here; the seed command decides what
/// to do with a document that yields no text.
pub fn extract_paragraphs(path: &Path) -> Result<Vec<String>, ExtractError> {
    let bytes = std::fs::read(path).map_err(|source| ExtractError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let pages = extract_pages(&bytes)?;
    tracing::debug!(pages = pages.len(), path = %path.display(), "extracted PDF text");
    Ok(split_pages(&pages))
}

/// Whether `bytes` look like a PDF and are at least `min_bytes` long.
pub fn looks_like_pdf(bytes: &[u8], min_bytes: u64) -> bool {
    bytes.starts_with(PDF_MAGIC) && bytes.len() as u64 >= min_bytes
}
