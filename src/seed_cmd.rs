//! PDF → paragraphs → chunks → embeddings → seed SQL.
//!
//! Every failure is fatal and nothing is written unless all chunks were
//! embedded: the output file either holds a complete seed or does not
//! exist.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

use caseseed_core::chunk::build_chunks;
use caseseed_core::models::{EmbeddedChunk, SeedDocument};
use caseseed_core::seed::render_seed_sql;

use crate::config::Config;
use crate::embedding::{self, EmbeddingProvider};
use crate::extract::extract_paragraphs;

/// Parameters of one `caseseed seed` run that are not part of [`Config`].
#[derive(Debug, Clone)]
pub struct SeedArgs {
    pub pdf: PathBuf,
    pub title: String,
    pub source: String,
    pub output: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    pub paragraphs: usize,
    pub chunks: usize,
    pub output: PathBuf,
}

/// Run the pipeline with the provider named in `config.embedding`.
pub async fn run_seed(config: &Config, args: &SeedArgs) -> Result<SeedSummary> {
    if !args.pdf.exists() {
        bail!("PDF not found: {}", args.pdf.display());
    }
    if !config.embedding.is_enabled() {
        bail!("seed requires an embedding provider, but embedding.provider is \"disabled\"");
    }
    let provider = embedding::create_provider(&config.embedding)?;
    run_seed_with_provider(config, args, provider.as_ref()).await
}

/// Run the pipeline with an explicit provider.
pub async fn run_seed_with_provider(
    config: &Config,
    args: &SeedArgs,
    provider: &dyn EmbeddingProvider,
) -> Result<SeedSummary> {
    if !args.pdf.exists() {
        bail!("PDF not found: {}", args.pdf.display());
    }

    let paragraphs = extract_paragraphs(&args.pdf)?;
    seed_from_paragraphs(config, args, &paragraphs, provider).await
}

/// Chunk, embed and render already-extracted paragraphs.
pub async fn seed_from_paragraphs(
    config: &Config,
    args: &SeedArgs,
    paragraphs: &[String],
    provider: &dyn EmbeddingProvider,
) -> Result<SeedSummary> {
    if paragraphs.is_empty() {
        bail!("No text extracted from PDF.");
    }
    tracing::debug!(paragraphs = paragraphs.len(), "split paragraphs");

    let chunking = &config.chunking;
    let chunks = build_chunks(
        paragraphs,
        chunking.max_chars,
        chunking.min_chars,
        chunking.max_chunks,
    );
    if chunks.is_empty() {
        bail!("Chunking produced no output.");
    }

    let embedded = embed_chunks(provider, chunks).await?;

    let doc = SeedDocument {
        title: args.title.clone(),
        source: args.source.clone(),
    };
    let sql = render_seed_sql(&doc, &embedded, &config.seed, provider.dims());
    write_output(&args.output, &sql)?;
    tracing::info!("Wrote {} chunks to {}", embedded.len(), args.output.display());

    Ok(SeedSummary {
        paragraphs: paragraphs.len(),
        chunks: embedded.len(),
        output: args.output.clone(),
    })
}

/// Embed chunks one at a time, in order. Stops at the first failure.
async fn embed_chunks(
    provider: &dyn EmbeddingProvider,
    chunks: Vec<String>,
) -> Result<Vec<EmbeddedChunk>> {
    let total = chunks.len();
    let mut embedded = Vec::with_capacity(total);

    for (index, content) in chunks.into_iter().enumerate() {
        tracing::info!(
            "Embedding chunk {}/{} (len={})...",
            index + 1,
            total,
            content.chars().count()
        );
        let embedding = provider
            .embed(&content)
            .await
            .with_context(|| format!("Embedding chunk {} failed", index + 1))?;
        embedded.push(EmbeddedChunk {
            index,
            content,
            embedding,
        });
    }

    Ok(embedded)
}

fn write_output(path: &Path, sql: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    std::fs::write(path, sql).with_context(|| format!("Failed to write {}", path.display()))
}
