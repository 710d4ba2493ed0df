//! Tracing subscriber setup.
//!
//! Console output always goes to stderr so stdout stays clean. When a log
//! file is requested (the `fetch` command always requests one), a second
//! layer appends plain-text records to it through a non-blocking writer.
//! The returned [`LogGuard`] must be held until the program exits or the
//! tail of the file may be lost.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Keeps the file writer alive; flushes on drop.
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Install the global subscriber.
///
/// `RUST_LOG` overrides `level`. `log_file`, when given, is created (with
/// its parent directories) or appended to, and starts with a
/// `# Command: ...` header naming the invocation.
///
/// Installing twice is not an error; the second call leaves the first
/// subscriber in place.
pub fn init(level: &str, log_file: Option<&Path>) -> Result<LogGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false);

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    match log_file {
        Some(path) => {
            let command_line = std::env::args().collect::<Vec<_>>().join(" ");
            let file = open_log_file(path, &command_line)?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            let file_layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false);
            let _ = registry.with(file_layer).try_init();
            Ok(LogGuard { _file: Some(guard) })
        }
        None => {
            let _ = registry.try_init();
            Ok(LogGuard { _file: None })
        }
    }
}

/// Open `path` for appending and write the command header.
pub fn open_log_file(path: &Path, command_line: &str) -> Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create log directory: {}", parent.display())
            })?;
        }
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;
    writeln!(file, "# Command: {}", command_line)?;
    file.flush()?;
    Ok(file)
}

/// `explicit` if given, otherwise `<log_dir>/<YYYYmmdd_HHMMSS_micros>.log`.
pub fn resolve_log_path(explicit: Option<&Path>, log_dir: &Path, now: DateTime<Local>) -> PathBuf {
    match explicit {
        Some(path) => path.to_path_buf(),
        None => log_dir.join(format!("{}.log", now.format("%Y%m%d_%H%M%S_%6f"))),
    }
}
