use anyhow::{Context, Result};
use caseseed_core::models::SeedTables;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub archive: ArchiveConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub seed: SeedTables,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ArchiveConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_action_timeout_secs")]
    pub action_timeout_secs: u64,
    #[serde(default = "default_download_timeout_secs")]
    pub download_timeout_secs: u64,
    #[serde(default = "default_group_code")]
    pub group_code: String,
    #[serde(default = "default_min_kb")]
    pub min_kb: u64,
    #[serde(default = "default_delay_secs")]
    pub delay_secs: f64,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            action_timeout_secs: default_action_timeout_secs(),
            download_timeout_secs: default_download_timeout_secs(),
            group_code: default_group_code(),
            min_kb: default_min_kb(),
            delay_secs: default_delay_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://taxlaw.nts.go.kr".to_string()
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/117.0 Safari/537.36"
        .to_string()
}
fn default_action_timeout_secs() -> u64 {
    15
}
fn default_download_timeout_secs() -> u64 {
    20
}
fn default_group_code() -> String {
    "01".to_string()
}
fn default_min_kb() -> u64 {
    10
}
fn default_delay_secs() -> f64 {
    0.5
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_dims")]
    pub dims: usize,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            dims: default_dims(),
            api_base: default_api_base(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl EmbeddingConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

fn default_provider() -> String {
    "openai".to_string()
}
fn default_model() -> String {
    "text-embedding-3-small".to_string()
}
fn default_dims() -> usize {
    1536
}
fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
    #[serde(default = "default_min_chars")]
    pub min_chars: usize,
    #[serde(default = "default_max_chunks")]
    pub max_chunks: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
            min_chars: default_min_chars(),
            max_chunks: default_max_chunks(),
        }
    }
}

fn default_max_chars() -> usize {
    1100
}
fn default_min_chars() -> usize {
    200
}
fn default_max_chunks() -> usize {
    120
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            level: default_log_level(),
        }
    }
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("./log")
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Check the invariants `load_config` enforces. Called again by the
    /// commands after CLI overrides have been applied.
    pub fn validate(&self) -> Result<()> {
        if self.chunking.max_chars == 0 {
            anyhow::bail!("chunking.max_chars must be > 0");
        }
        if self.chunking.max_chunks == 0 {
            anyhow::bail!("chunking.max_chunks must be > 0");
        }
        if self.chunking.min_chars > self.chunking.max_chars {
            tracing::warn!(
                min_chars = self.chunking.min_chars,
                max_chars = self.chunking.max_chars,
                "chunking.min_chars exceeds max_chars; only oversized paragraphs can become chunks"
            );
        }

        if Duration::try_from_secs_f64(self.archive.delay_secs).is_err() {
            anyhow::bail!(
                "archive.delay_secs must be >= 0 and a representable duration, got {}",
                self.archive.delay_secs
            );
        }

        match self.embedding.provider.as_str() {
            "disabled" | "openai" => {}
            other => anyhow::bail!(
                "Unknown embedding provider: '{}'. Must be disabled or openai.",
                other
            ),
        }
        if self.embedding.is_enabled() && self.embedding.dims == 0 {
            anyhow::bail!(
                "embedding.dims must be > 0 when provider is '{}'",
                self.embedding.provider
            );
        }

        for (key, name) in [
            ("seed.docs_table", &self.seed.docs_table),
            ("seed.chunks_table", &self.seed.chunks_table),
        ] {
            if !is_sql_identifier(name) {
                anyhow::bail!("{} must be a plain SQL identifier, got '{}'", key, name);
            }
        }

        Ok(())
    }
}

/// `schema.table` or `table`, each part `[A-Za-z_][A-Za-z0-9_]*`.
fn is_sql_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').count() <= 2
        && name.split('.').all(|part| {
            let mut chars = part.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    config.validate()?;

    Ok(config)
}

/// Load `path` if given, otherwise fall back to built-in defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(p) => load_config(p),
        None => Ok(Config::default()),
    }
}
