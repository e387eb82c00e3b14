use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct CarekgConfig {
    pub server: ServerConfig,
    pub embedding: EmbeddingConfig,
    pub retrieval: RetrievalConfig,
    pub knowledge: KnowledgeConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: String,
    pub model: String,
    pub base_url: String,
    /// Vector size of the `hash` provider. Ignored by `ollama`.
    pub dimensions: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Matching nodes per `retrieve_information` call.
    pub top_n: usize,
    /// Hops expanded around each matching node.
    pub neighbor_distance: usize,
    /// Hops around `user` included in the initial context.
    pub initial_distance: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct KnowledgeConfig {
    /// TOML file with the people, events and connections to load at startup.
    pub path: String,
    /// If set, a JSON snapshot of the graph is written here after every mutation.
    pub snapshot_path: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SessionConfig {
    pub time: String,
    pub day: String,
    pub location: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".into(),
            model: "nomic-embed-text".into(),
            base_url: "http://localhost:11434".into(),
            dimensions: 256,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_n: 2,
            neighbor_distance: 1,
            initial_distance: 0,
        }
    }
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        let path = default_carekg_dir()
            .join("knowledge.toml")
            .to_string_lossy()
            .into_owned();
        Self {
            path,
            snapshot_path: None,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            time: "08:55".into(),
            day: "Monday".into(),
            location: "Living Room".into(),
        }
    }
}

/// Returns `~/.carekg/`
pub fn default_carekg_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".carekg")
}

/// Returns the default config file path: `~/.carekg/config.toml`
pub fn default_config_path() -> PathBuf {
    default_carekg_dir().join("config.toml")
}

impl CarekgConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            CarekgConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    /// (CAREKG_KNOWLEDGE, CAREKG_EMBED_MODEL, CAREKG_LOG_LEVEL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("CAREKG_KNOWLEDGE") {
            self.knowledge.path = val;
        }
        if let Ok(val) = std::env::var("CAREKG_EMBED_MODEL") {
            self.embedding.model = val;
        }
        if let Ok(val) = std::env::var("CAREKG_LOG_LEVEL") {
            self.server.log_level = val;
        }
    }

    /// Resolve the knowledge-base path, expanding `~` if needed.
    pub fn resolved_knowledge_path(&self) -> PathBuf {
        expand_tilde(&self.knowledge.path)
    }

    pub fn resolved_snapshot_path(&self) -> Option<PathBuf> {
        self.knowledge.snapshot_path.as_deref().map(expand_tilde)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
