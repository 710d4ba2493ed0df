use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn caseseed_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_caseseed"))
}

/// Config pointing the archive at a port nothing listens on.
fn write_offline_config(root: &Path) -> PathBuf {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config_path = root.join("caseseed.toml");
    fs::write(
        &config_path,
        format!(
            r#"[archive]
base_url = "http://{}"
delay_secs = 0.0
action_timeout_secs = 2
"#,
            addr
        ),
    )
    .unwrap();
    config_path
}

fn run_caseseed(args: &[&str], envs: &[(&str, Option<&str>)]) -> (String, String, bool) {
    let binary = caseseed_binary();
    let mut command = Command::new(&binary);
    command.args(args);
    for (key, value) in envs {
        match value {
            Some(v) => command.env(key, v),
            None => command.env_remove(key),
        };
    }
    let output = command
        .output()
        .unwrap_or_else(|e| panic!("Failed to run caseseed binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

fn strip_ansi(line: &str) -> String {
    let mut out = String::new();
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        if c == '\u{1b}' {
            for c in chars.by_ref() {
                if c == 'm' {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[test]
fn test_fetch_rejects_reversed_range_before_logging() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("out");
    let log_dir = tmp.path().join("log");

    let (_, stderr, success) = run_caseseed(
        &[
            "fetch",
            "--out",
            out.to_str().unwrap(),
            "--start",
            "10",
            "--end",
            "9",
            "--log-dir",
            log_dir.to_str().unwrap(),
        ],
        &[],
    );
    assert!(!success);
    assert!(stderr.contains("start must be <= end"), "stderr={}", stderr);
    assert!(!log_dir.exists());
    assert!(!out.exists());
}

#[test]
fn test_fetch_writes_log_file() {
    let tmp = TempDir::new().unwrap();
    let config_path = write_offline_config(tmp.path());
    let out = tmp.path().join("out");
    let log_path = tmp.path().join("logs/run.log");

    let (stdout, stderr, success) = run_caseseed(
        &[
            "--config",
            config_path.to_str().unwrap(),
            "fetch",
            "--out",
            out.to_str().unwrap(),
            "--start",
            "7",
            "--end",
            "8",
            "--log",
            log_path.to_str().unwrap(),
        ],
        &[("RUST_LOG", None)],
    );
    assert!(success, "fetch failed: stdout={}, stderr={}", stdout, stderr);
    assert!(out.is_dir());
    assert!(stderr.contains("[1/2] 7 skipped"), "stderr={}", stderr);
    assert!(stderr.contains("[DONE] saved=0, skipped=2, total=2"), "stderr={}", stderr);

    // Console lines carry the level but no timestamp.
    let done = stderr
        .lines()
        .map(strip_ansi)
        .find(|l| l.contains("[DONE]"))
        .unwrap();
    assert!(done.trim_start().starts_with("INFO"), "line={}", done);

    let log = fs::read_to_string(&log_path).unwrap();
    assert!(log.starts_with("# Command: "), "log={}", log);
    assert!(log.contains("--start 7 --end 8"), "log={}", log);
    assert!(log.contains("[2/2] 8 skipped"), "log={}", log);
    assert!(log.contains("[DONE] saved=0, skipped=2, total=2"), "log={}", log);
}

#[test]
fn test_fetch_defaults_to_timestamped_log() {
    let tmp = TempDir::new().unwrap();
    let config_path = write_offline_config(tmp.path());
    let log_dir = tmp.path().join("log");

    let (_, stderr, success) = run_caseseed(
        &[
            "--config",
            config_path.to_str().unwrap(),
            "fetch",
            "--out",
            tmp.path().join("out").to_str().unwrap(),
            "--start",
            "1",
            "--end",
            "1",
            "--log-dir",
            log_dir.to_str().unwrap(),
        ],
        &[("RUST_LOG", None)],
    );
    assert!(success, "stderr={}", stderr);

    let logs: Vec<_> = fs::read_dir(&log_dir).unwrap().collect();
    assert_eq!(logs.len(), 1);
    let name = logs[0].as_ref().unwrap().file_name();
    let name = name.to_string_lossy();
    // YYYYmmdd_HHMMSS_micros.log
    assert_eq!(name.len(), "20240305_070809_000000.log".len(), "{}", name);
    assert!(name.ends_with(".log"));
}

#[test]
fn test_seed_requires_api_key() {
    let tmp = TempDir::new().unwrap();
    let pdf = tmp.path().join("doc.pdf");
    fs::write(&pdf, b"%PDF-1.4\n").unwrap();
    let output = tmp.path().join("seed.sql");

    let (_, stderr, success) = run_caseseed(
        &[
            "seed",
            "--pdf",
            pdf.to_str().unwrap(),
            "--title",
            "Doc",
            "--source",
            "doc.pdf",
            "--output",
            output.to_str().unwrap(),
        ],
        &[("OPENAI_API_KEY", None)],
    );
    assert!(!success);
    assert!(
        stderr.contains("OPENAI_API_KEY is required to generate embeddings."),
        "stderr={}",
        stderr
    );
    assert!(!output.exists());
}

#[test]
fn test_seed_missing_pdf() {
    let tmp = TempDir::new().unwrap();
    let (_, stderr, success) = run_caseseed(
        &[
            "seed",
            "--pdf",
            tmp.path().join("nope.pdf").to_str().unwrap(),
            "--title",
            "Doc",
            "--source",
            "nope.pdf",
            "--output",
            tmp.path().join("seed.sql").to_str().unwrap(),
        ],
        &[],
    );
    assert!(!success);
    assert!(stderr.contains("PDF not found"), "stderr={}", stderr);
}

#[test]
fn test_seed_rejects_zero_max_chunks() {
    let tmp = TempDir::new().unwrap();
    let pdf = tmp.path().join("doc.pdf");
    fs::write(&pdf, b"%PDF-1.4\n").unwrap();

    let (_, stderr, success) = run_caseseed(
        &[
            "seed",
            "--pdf",
            pdf.to_str().unwrap(),
            "--title",
            "Doc",
            "--source",
            "doc.pdf",
            "--output",
            tmp.path().join("seed.sql").to_str().unwrap(),
            "--max-chunks",
            "0",
        ],
        &[],
    );
    assert!(!success);
    assert!(stderr.contains("chunking.max_chunks must be > 0"), "stderr={}", stderr);
}
