//! Ollama embedding provider.
//!
//! Implements [`EmbeddingProvider`] against a local Ollama server:
//! `POST /api/embed` for vectors and `POST /api/pull` to fetch the model.
//!
//! Uses the blocking `reqwest` client. It must be built and used off the
//! async runtime's worker threads (inside `spawn_blocking` or plain sync code).

use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::EmbeddingProvider;
use crate::config::EmbeddingConfig;

const EMBED_TIMEOUT: Duration = Duration::from_secs(60);

/// Pulling a model downloads hundreds of megabytes.
const PULL_TIMEOUT: Duration = Duration::from_secs(30 * 60);

pub struct OllamaEmbeddingProvider {
    client: reqwest::blocking::Client,
    base_url: String,
    model: String,
    /// Set once the model is known to be present.
    pulled: OnceLock<()>,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Serialize)]
struct PullRequest<'a> {
    model: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct PullResponse {
    status: String,
}

impl OllamaEmbeddingProvider {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(EMBED_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            pulled: OnceLock::new(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl EmbeddingProvider for OllamaEmbeddingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text])?
            .into_iter()
            .next()
            .context("Ollama returned no embedding")
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let response = self
            .client
            .post(self.url("/api/embed"))
            .json(&EmbedRequest {
                model: &self.model,
                input: texts,
            })
            .send()
            .with_context(|| format!("Ollama not reachable at {}", self.base_url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            anyhow::bail!("Ollama embed returned HTTP {status}: {body}");
        }

        let parsed: EmbedResponse = response
            .json()
            .context("failed to parse Ollama embed response")?;

        anyhow::ensure!(
            parsed.embeddings.len() == texts.len(),
            "Ollama returned {} embeddings for {} inputs",
            parsed.embeddings.len(),
            texts.len()
        );
        Ok(parsed.embeddings)
    }

    fn ensure_model_available(&self) -> Result<()> {
        if self.pulled.get().is_some() {
            return Ok(());
        }

        tracing::info!(model = %self.model, "pulling embedding model");
        let response = self
            .client
            .post(self.url("/api/pull"))
            .timeout(PULL_TIMEOUT)
            .json(&PullRequest {
                model: &self.model,
                stream: false,
            })
            .send()
            .with_context(|| format!("Ollama not reachable at {}", self.base_url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            anyhow::bail!("pulling model {} failed with HTTP {status}: {body}", self.model);
        }

        let parsed: PullResponse = response
            .json()
            .context("failed to parse Ollama pull response")?;
        tracing::info!(model = %self.model, status = %parsed.status, "embedding model ready");

        let _ = self.pulled.set(());
        Ok(())
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> EmbeddingConfig {
        EmbeddingConfig {
            provider: "ollama".into(),
            base_url: "http://localhost:11434/".into(),
            ..EmbeddingConfig::default()
        }
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let provider = OllamaEmbeddingProvider::new(&test_config()).unwrap();
        assert_eq!(provider.url("/api/embed"), "http://localhost:11434/api/embed");
    }

    #[test]
    fn embed_request_shape() {
        let body = serde_json::to_value(EmbedRequest {
            model: "nomic-embed-text",
            input: &["a", "b"],
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"model": "nomic-embed-text", "input": ["a", "b"]}));
    }

    #[test]
    #[ignore] // Requires a running Ollama server — run with: cargo test -- --ignored
    fn embed_against_local_server() {
        let provider = OllamaEmbeddingProvider::new(&test_config()).unwrap();
        provider.ensure_model_available().unwrap();
        let v = provider.embed("Hello world").unwrap();
        assert!(!v.is_empty());
    }
}
