//! Seed SQL rendering for a pgvector-backed chunk table.
//!
//! The generated script wipes both tables, inserts one document row, and
//! inserts every chunk in a single statement that references the new
//! document id through a CTE:
//!
//! ```text
//! truncate chunks; truncate docs;
//! with doc as (insert into docs ... returning id)
//! insert into chunks (doc_id, chunk_index, content, embedding)
//! select ... from doc, lateral (values (0, '...', '[...]'::vector(N)), ...) as payload(...);
//! ```

use crate::models::{EmbeddedChunk, SeedDocument, SeedTables};

/// Escape a value for use inside a single-quoted SQL string literal.
pub fn sql_escape(value: &str) -> String {
    value.replace('\'', "''")
}

/// Format an embedding as a pgvector literal with 8 decimal places per
/// component: `[0.12345678, -0.00000100]`.
pub fn format_vector(values: &[f64]) -> String {
    let parts: Vec<String> = values.iter().map(|v| format!("{:.8}", v)).collect();
    format!("[{}]", parts.join(", "))
}

/// Render one `(chunk_index, content, embedding)` row of the `values` list.
fn render_row(chunk: &EmbeddedChunk, dims: usize) -> String {
    format!(
        "({}, '{}', '{}'::vector({}))",
        chunk.index,
        sql_escape(&chunk.content),
        format_vector(&chunk.embedding),
        dims
    )
}

/// Render the complete seed script. The result ends with a single newline.
///
/// Table names are inserted verbatim; validating them is the caller's job.
pub fn render_seed_sql(
    doc: &SeedDocument,
    chunks: &[EmbeddedChunk],
    tables: &SeedTables,
    dims: usize,
) -> String {
    let rows: Vec<String> = chunks.iter().map(|c| render_row(c, dims)).collect();
    let values_sql = rows.join(",\n    ");
    let docs = &tables.docs_table;
    let chunk_table = &tables.chunks_table;
    let title = sql_escape(&doc.title);
    let source = sql_escape(&doc.source);

    format!(
        "-- Seed generated with OpenAI embeddings from {source}\n\
         truncate table {chunk_table} restart identity cascade;\n\
         truncate table {docs} restart identity cascade;\n\
         \n\
         with doc as (\n  \
           insert into {docs} (title, source)\n  \
           values ('{title}', '{source}')\n  \
           returning id\n\
         )\n\
         insert into {chunk_table} (doc_id, chunk_index, content, embedding)\n\
         select doc.id, payload.chunk_index, payload.content, payload.embedding\n\
         from doc,\n\
         lateral (values\n    \
           {values_sql}\n\
         ) as payload(chunk_index, content, embedding);\n"
    )
}
