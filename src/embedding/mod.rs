//! Text-to-vector embedding providers.
//!
//! Provides the [`EmbeddingProvider`] trait and two implementations: an
//! [Ollama](https://ollama.com) HTTP client and an offline hashing provider.
//! The provider is created via [`create_provider`] from configuration.

pub mod hashed;
pub mod ollama;

use anyhow::Result;

/// Trait for embedding text into vectors.
///
/// All methods are synchronous and may block on I/O. Callers in async
/// contexts should use `tokio::task::spawn_blocking`.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text string into a vector.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of text strings. Implementations may override for batched inference.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    /// Make sure the configured model can serve requests (e.g. pull it).
    /// Idempotent; providers without a model to fetch return `Ok(())`.
    fn ensure_model_available(&self) -> Result<()> {
        Ok(())
    }

    /// Name of the model producing the vectors.
    fn model(&self) -> &str;
}

/// Create an embedding provider from config.
///
/// `"ollama"` talks to an Ollama server at `base_url`; `"hash"` needs no
/// model and is meant for offline use and tests.
pub fn create_provider(
    config: &crate::config::EmbeddingConfig,
) -> Result<Box<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "ollama" => {
            let provider = ollama::OllamaEmbeddingProvider::new(config)?;
            Ok(Box::new(provider))
        }
        "hash" => Ok(Box::new(hashed::HashEmbeddingProvider::new(
            config.dimensions,
        ))),
        other => anyhow::bail!("unknown embedding provider: {other}. Supported: ollama, hash"),
    }
}
