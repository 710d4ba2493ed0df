//! Embedding provider abstraction and implementations.
//!
//! Defines the [`EmbeddingProvider`] trait and concrete implementations:
//! - **[`DisabledProvider`]** returns errors; used when embeddings are turned off.
//! - **[`OpenAIProvider`]** calls the OpenAI embeddings API, one text per request.
//!
//! # Provider Selection
//!
//! Use [`create_provider`] to instantiate the appropriate provider based
//! on the configuration:
//!
//! ```rust,no_run
//! # use caseseed::config::EmbeddingConfig;
//! # use caseseed::embedding::create_provider;
//! let mut config = EmbeddingConfig::default();
//! config.provider = "disabled".to_string();
//! let provider = create_provider(&config).unwrap();
//! assert_eq!(provider.model_name(), "disabled");
//! ```
//!
//! # Failure Policy
//!
//! There is no retry. Any non-2xx response, transport error, malformed
//! body, or vector of the wrong length is returned as an error, and the
//! seed command aborts the whole run on the first one.

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::time::Duration;

use crate::config::EmbeddingConfig;

/// Environment variable holding the OpenAI API key.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Trait for embedding providers.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Returns the model identifier (e.g. `"text-embedding-3-small"`).
    fn model_name(&self) -> &str;
    /// Returns the embedding vector dimensionality (e.g. `1536`).
    fn dims(&self) -> usize;
    /// Embed a single text. The returned vector has exactly [`dims`](Self::dims) entries.
    async fn embed(&self, text: &str) -> Result<Vec<f64>>;
}

// ============ Disabled Provider ============

/// A no-op embedding provider that always returns errors.
///
/// Used when `embedding.provider = "disabled"` in the configuration.
pub struct DisabledProvider;

#[async_trait]
impl EmbeddingProvider for DisabledProvider {
    fn model_name(&self) -> &str {
        "disabled"
    }
    fn dims(&self) -> usize {
        0
    }
    async fn embed(&self, _text: &str) -> Result<Vec<f64>> {
        bail!("Embedding provider is disabled")
    }
}

// ============ OpenAI Provider ============

/// Embedding provider using the OpenAI API.
///
/// Calls `POST {api_base}/embeddings` with the configured model. Requires
/// the `OPENAI_API_KEY` environment variable to be set.
pub struct OpenAIProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    dims: usize,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider, reading the key from `OPENAI_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is missing or empty, or the HTTP client
    /// cannot be built.
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let api_key = std::env::var(OPENAI_API_KEY_ENV).unwrap_or_default();
        if api_key.is_empty() {
            bail!("{} is required to generate embeddings.", OPENAI_API_KEY_ENV);
        }
        Self::with_api_key(config, api_key)
    }

    /// Create a provider with an explicit API key.
    pub fn with_api_key(config: &EmbeddingConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", config.api_base.trim_end_matches('/')),
            api_key: api_key.into(),
            model: config.model.clone(),
            dims: config.dims,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, text: &str) -> Result<Vec<f64>> {
        let body = serde_json::json!({
            "input": text,
            "model": self.model,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("OpenAI embeddings failed {}: {}", status.as_u16(), body_text);
        }

        let json: serde_json::Value = response.json().await?;
        let embedding = parse_openai_response(&json)?;
        if embedding.len() != self.dims {
            bail!(
                "Expected embedding dim {}, got {}",
                self.dims,
                embedding.len()
            );
        }
        Ok(embedding)
    }
}

/// Parse the OpenAI embeddings API response JSON.
///
/// Returns `data[0].embedding`; the request carries a single input.
fn parse_openai_response(json: &serde_json::Value) -> Result<Vec<f64>> {
    let first = json
        .get("data")
        .and_then(|d| d.as_array())
        .and_then(|d| d.first())
        .ok_or_else(|| anyhow::anyhow!("Invalid OpenAI response: missing data array"))?;

    let embedding = first
        .get("embedding")
        .and_then(|e| e.as_array())
        .ok_or_else(|| anyhow::anyhow!("Invalid OpenAI response: missing embedding"))?;

    embedding
        .iter()
        .map(|v| {
            v.as_f64()
                .ok_or_else(|| anyhow::anyhow!("Invalid OpenAI response: non-numeric component"))
        })
        .collect()
}

/// Create the appropriate [`EmbeddingProvider`] based on configuration.
///
/// | Config Value | Provider |
/// |-------------|----------|
/// | `"disabled"` | [`DisabledProvider`] |
/// | `"openai"` | [`OpenAIProvider`] |
pub fn create_provider(config: &EmbeddingConfig) -> Result<Box<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "disabled" => Ok(Box::new(DisabledProvider)),
        "openai" => Ok(Box::new(OpenAIProvider::new(config)?)),
        other => bail!("Unknown embedding provider: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_first_embedding() {
        let json = serde_json::json!({
            "object": "list",
            "data": [{"object": "embedding", "index": 0, "embedding": [0.5, -0.25, 1.0]}],
            "model": "text-embedding-3-small"
        });
        assert_eq!(parse_openai_response(&json).unwrap(), vec![0.5, -0.25, 1.0]);
    }

    #[test]
    fn test_parse_keeps_full_precision() {
        let json = serde_json::json!({"data": [{"embedding": [0.3, 0.98765432]}]});
        assert_eq!(parse_openai_response(&json).unwrap(), vec![0.3, 0.98765432]);
    }

    #[test]
    fn test_parse_missing_data() {
        let json = serde_json::json!({"error": {"message": "bad"}});
        let err = parse_openai_response(&json).unwrap_err();
        assert!(err.to_string().contains("missing data array"));
    }

    #[test]
    fn test_parse_empty_data() {
        let json = serde_json::json!({"data": []});
        assert!(parse_openai_response(&json).is_err());
    }

    #[test]
    fn test_parse_non_numeric() {
        let json = serde_json::json!({"data": [{"embedding": [0.1, "x"]}]});
        let err = parse_openai_response(&json).unwrap_err();
        assert!(err.to_string().contains("non-numeric"));
    }

    #[test]
    fn test_endpoint_from_api_base() {
        let mut config = EmbeddingConfig::default();
        config.api_base = "http://127.0.0.1:1234/v1/".to_string();
        let provider = OpenAIProvider::with_api_key(&config, "sk-test").unwrap();
        assert_eq!(provider.endpoint, "http://127.0.0.1:1234/v1/embeddings");
        assert_eq!(provider.model_name(), "text-embedding-3-small");
        assert_eq!(provider.dims(), 1536);
    }

    #[tokio::test]
    async fn test_disabled_provider_errors() {
        let mut config = EmbeddingConfig::default();
        config.provider = "disabled".to_string();
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.model_name(), "disabled");
        assert!(provider.embed("text").await.is_err());
    }

    #[test]
    fn test_unknown_provider() {
        let mut config = EmbeddingConfig::default();
        config.provider = "cohere".to_string();
        assert!(create_provider(&config).is_err());
    }
}
