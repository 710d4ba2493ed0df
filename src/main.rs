//! # caseseed CLI
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `caseseed fetch` | Download case PDFs for an ID range |
//! | `caseseed seed` | Build pgvector seed SQL from a PDF |
//!
//! ## Examples
//!
//! ```bash
//! caseseed fetch --out ./pdf_out \
//!     --start 200000000000014300 --end 200000000000014350 --delay 0.5
//!
//! OPENAI_API_KEY=sk-... caseseed seed --pdf 2014.pdf \
//!     --title "2014년 치과 보험 청구 지침" --source 2014.pdf \
//!     --output supabase/seed/2014_chunks.sql
//! ```

use caseseed::config::{self, Config};
use caseseed::fetch_cmd::{self, FetchArgs};
use caseseed::logging;
use caseseed::seed_cmd::{self, SeedArgs};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Download tax-law case PDFs and turn PDFs into pgvector seed SQL.
#[derive(Parser)]
#[command(name = "caseseed", version)]
struct Cli {
    /// Optional configuration file (TOML). Built-in defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download case PDFs by document ID.
    ///
    /// Every ID in the inclusive range is tried once; cases without a
    /// downloadable PDF are skipped.
    Fetch {
        /// Output directory.
        #[arg(long)]
        out: PathBuf,

        /// Start document ID (inclusive).
        #[arg(long)]
        start: u64,

        /// End document ID (inclusive).
        #[arg(long)]
        end: u64,

        /// Delay between requests, in seconds.
        #[arg(long)]
        delay: Option<f64>,

        /// Minimum PDF size in KB.
        #[arg(long)]
        min_kb: Option<u64>,

        /// Document group code sent with detail lookups.
        #[arg(long)]
        group: Option<String>,

        /// Log file path (appended to).
        #[arg(long)]
        log: Option<PathBuf>,

        /// Directory for timestamped log files when --log is omitted.
        #[arg(long)]
        log_dir: Option<PathBuf>,
    },

    /// Generate chunk embeddings from a PDF and write seed SQL.
    ///
    /// Requires OPENAI_API_KEY.
    Seed {
        /// Path to the source PDF.
        #[arg(long)]
        pdf: PathBuf,

        /// Human-readable document title.
        #[arg(long)]
        title: String,

        /// Source identifier (e.g. filename).
        #[arg(long)]
        source: String,

        /// Destination SQL file.
        #[arg(long)]
        output: PathBuf,

        /// Maximum characters per chunk.
        #[arg(long)]
        max_chars: Option<usize>,

        /// Minimum characters per chunk.
        #[arg(long)]
        min_chars: Option<usize>,

        /// Maximum chunks to generate.
        #[arg(long)]
        max_chunks: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut cfg: Config = config::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Fetch {
            out,
            start,
            end,
            delay,
            min_kb,
            group,
            log,
            log_dir,
        } => {
            // Checked before the log file exists so a typo leaves no trace on disk.
            if start > end {
                anyhow::bail!("start must be <= end");
            }
            if let Some(delay) = delay {
                cfg.archive.delay_secs = delay;
            }
            if let Some(min_kb) = min_kb {
                cfg.archive.min_kb = min_kb;
            }
            if let Some(group) = group {
                cfg.archive.group_code = group;
            }
            if let Some(log_dir) = log_dir {
                cfg.logging.dir = log_dir;
            }

            let log_path =
                logging::resolve_log_path(log.as_deref(), &cfg.logging.dir, chrono::Local::now());
            let _guard = logging::init(&cfg.logging.level, Some(&log_path))?;
            cfg.validate()?;

            fetch_cmd::run_fetch(
                &cfg,
                &FetchArgs {
                    out_dir: out,
                    start,
                    end,
                },
            )
            .await?;
        }
        Commands::Seed {
            pdf,
            title,
            source,
            output,
            max_chars,
            min_chars,
            max_chunks,
        } => {
            if let Some(max_chars) = max_chars {
                cfg.chunking.max_chars = max_chars;
            }
            if let Some(min_chars) = min_chars {
                cfg.chunking.min_chars = min_chars;
            }
            if let Some(max_chunks) = max_chunks {
                cfg.chunking.max_chunks = max_chunks;
            }

            let _guard = logging::init(&cfg.logging.level, None)?;
            cfg.validate()?;

            seed_cmd::run_seed(
                &cfg,
                &SeedArgs {
                    pdf,
                    title,
                    source,
                    output,
                },
            )
            .await?;
        }
    }

    Ok(())
}
