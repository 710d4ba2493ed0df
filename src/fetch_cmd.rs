//! Sequential case downloader.
//!
//! Walks an inclusive ID range one case at a time. Every ID ends as either
//! saved or skipped; nothing short of a bad range or an unwritable output
//! directory aborts the run.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::archive::ArchiveClient;
use crate::config::Config;
use crate::filename::resolve_filename;

/// Parameters of one `caseseed fetch` run that are not part of [`Config`].
#[derive(Debug, Clone)]
pub struct FetchArgs {
    pub out_dir: PathBuf,
    pub start: u64,
    pub end: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchSummary {
    pub saved: u64,
    pub skipped: u64,
    pub total: u64,
}

/// Try to save one case as `<out_dir>/<name>.pdf`.
///
/// `Ok(false)` covers every "nothing to save" outcome: unknown case, no
/// convertible attachment, or both download routes refused. Metadata and
/// fallback failures are logged here and also end as `Ok(false)`; only a
/// failure of the primary download is returned as an error.
pub async fn fetch_case(
    client: &ArchiveClient,
    case_id: u64,
    out_dir: &Path,
    min_kb: u64,
    group_code: Option<&str>,
) -> Result<bool> {
    let case_id = case_id.to_string();

    let detail = match client.fetch_detail(&case_id, group_code).await {
        Ok(Some(detail)) => detail,
        Ok(None) => return Ok(false),
        Err(e) => {
            tracing::warn!("    detail fetch error: {}", e);
            return Ok(false);
        }
    };

    let Some(target) = detail.pdf_attachment() else {
        return Ok(false);
    };
    let (file_id, file_serial) = match (target.file_id.as_deref(), target.file_serial.as_ref()) {
        (Some(id), Some(sn)) if !id.is_empty() => (id, sn),
        _ => return Ok(false),
    };

    let out_path = out_dir.join(format!("{}.pdf", resolve_filename(&case_id, &detail)));

    if client
        .download_pdf(file_id, file_serial, &out_path, min_kb)
        .await?
    {
        return Ok(true);
    }

    // The PDF endpoint refused; some records expose a direct download URI.
    match client.fetch_file_info(file_id, file_serial).await {
        Ok(Some(info)) => match info.download_uri.as_deref().filter(|u| !u.is_empty()) {
            Some(uri) => match client.download_uri(uri, &out_path, min_kb).await {
                Ok(saved) => Ok(saved),
                Err(e) => {
                    tracing::warn!("    fallback download error: {}", e);
                    Ok(false)
                }
            },
            None => Ok(false),
        },
        Ok(None) => Ok(false),
        Err(e) => {
            tracing::warn!("    fallback download error: {}", e);
            Ok(false)
        }
    }
}

/// Download every case in `args.start..=args.end` into `args.out_dir`.
///
/// Sleeps `archive.delay_secs` after each ID, including the last.
pub async fn run_fetch(config: &Config, args: &FetchArgs) -> Result<FetchSummary> {
    if args.start > args.end {
        bail!("start must be <= end");
    }
    let Some(total) = (args.end - args.start).checked_add(1) else {
        bail!("ID range {}..={} is too large", args.start, args.end);
    };

    let archive = &config.archive;
    let delay = Duration::try_from_secs_f64(archive.delay_secs)
        .with_context(|| format!("Invalid delay: {}", archive.delay_secs))?;

    std::fs::create_dir_all(&args.out_dir).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            args.out_dir.display()
        )
    })?;

    let client = ArchiveClient::new(archive)?;
    let group_code = Some(archive.group_code.as_str()).filter(|g| !g.is_empty());

    let mut summary = FetchSummary {
        saved: 0,
        skipped: 0,
        total,
    };

    for (idx, case_id) in (args.start..=args.end).enumerate() {
        let idx = idx as u64 + 1;
        let saved = match fetch_case(&client, case_id, &args.out_dir, archive.min_kb, group_code)
            .await
        {
            Ok(saved) => saved,
            Err(e) => {
                tracing::warn!("[{}/{}] {} error: {:#}", idx, total, case_id, e);
                false
            }
        };

        if saved {
            summary.saved += 1;
            tracing::info!("[{}/{}] {} saved", idx, total, case_id);
        } else {
            summary.skipped += 1;
            tracing::info!("[{}/{}] {} skipped", idx, total, case_id);
        }

        tokio::time::sleep(delay).await;
    }

    tracing::info!(
        "[DONE] saved={}, skipped={}, total={}",
        summary.saved,
        summary.skipped,
        summary.total
    );

    Ok(summary)
}
