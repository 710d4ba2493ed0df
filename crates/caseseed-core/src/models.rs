//! Data types shared by the seed pipeline.

use serde::Deserialize;

/// The document row a seed file inserts into the docs table.
#[derive(Debug, Clone)]
pub struct SeedDocument {
    /// Human-readable title (e.g. `"2014년 치과 보험 청구 지침"`).
    pub title: String,
    /// Source identifier, usually the PDF file name.
    pub source: String,
}

/// A chunk paired with its embedding.
///
/// `index` is the chunk's 0-based position in the chunk sequence and is
/// written to the `chunk_index` column.
#[derive(Debug, Clone)]
pub struct EmbeddedChunk {
    pub index: usize,
    pub content: String,
    pub embedding: Vec<f64>,
}

/// Target table names for the generated SQL.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SeedTables {
    #[serde(default = "default_docs_table")]
    pub docs_table: String,
    #[serde(default = "default_chunks_table")]
    pub chunks_table: String,
}

impl Default for SeedTables {
    fn default() -> Self {
        Self {
            docs_table: default_docs_table(),
            chunks_table: default_chunks_table(),
        }
    }
}

fn default_docs_table() -> String {
    "insurance_docs".to_string()
}

fn default_chunks_table() -> String {
    "insurance_chunks".to_string()
}
