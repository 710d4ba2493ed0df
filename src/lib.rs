//! # caseseed
//!
//! Two small pipelines around legal and policy PDFs:
//!
//! - **fetch** walks a range of case IDs on the tax-law case archive and
//!   saves each case's attachment as a PDF.
//! - **seed** turns one PDF into a pgvector seed script: text extraction,
//!   paragraph splitting, chunk packing, one embedding per chunk, SQL.
//!
//! ## Architecture
//!
//! ```text
//!  fetch:  ID range ──▶ /action.do detail ──▶ /downloadPDFFile.do ──▶ out/*.pdf
//!                                         └─▶ fleDwldUri (fallback)
//!
//!  seed:   PDF ──▶ pages ──▶ paragraphs ──▶ chunks ──▶ embeddings ──▶ seed.sql
//!                   (extract)  (core)        (core)    (OpenAI)      (core)
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and defaults |
//! | [`logging`] | Console and log-file tracing setup |
//! | [`archive`] | Case archive HTTP client |
//! | [`filename`] | File naming for downloaded cases |
//! | [`fetch_cmd`] | The `fetch` loop |
//! | [`extract`] | PDF text extraction |
//! | [`embedding`] | Embedding provider abstraction |
//! | [`seed_cmd`] | The `seed` pipeline |
//!
//! Chunking, paragraph normalization and SQL rendering live in
//! [`caseseed_core`].

pub mod archive;
pub mod config;
pub mod embedding;
pub mod extract;
pub mod fetch_cmd;
pub mod filename;
pub mod logging;
pub mod seed_cmd;
