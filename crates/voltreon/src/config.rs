//! Configuration management for voltreon.
//!
//! A workspace's settings live in `.voltreon/config.yaml`:
//!
//! ```yaml
//! storage:
//!   backend: sqlite
//!   database: .voltreon/voltreon.db
//! dependencies:
//!   cycle-detection: transitive
//! summarizer:
//!   backend: template
//!   url: http://localhost:11434/v1/chat/completions
//!   model: llama3.2
//!   api-key-env: null
//!   timeout-secs: 30
//!   include-upstream: false
//!   fallback-to-template: false
//! server:
//!   bind: 127.0.0.1:3001
//! ```
//!
//! Every section and key is optional; missing values take the defaults shown.
//! `VOLTREON_LLM_URL` and `VOLTREON_LLM_MODEL` override the summarizer's
//! endpoint and model.

use crate::dependency::CyclePolicy;
use crate::error::{Error, Result};
use crate::store::StoreBackend;
use crate::summary::{
    DEFAULT_LLM_MODEL, DEFAULT_LLM_URL, LlmSettings, LlmSummarizer, Summarizer, SummaryOptions,
    TemplateSummarizer,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;

/// Environment variable overriding `summarizer.url`.
pub const LLM_URL_ENV: &str = "VOLTREON_LLM_URL";

/// Environment variable overriding `summarizer.model`.
pub const LLM_MODEL_ENV: &str = "VOLTREON_LLM_MODEL";

/// Default path of the SQLite database, relative to the workspace root.
pub const DEFAULT_DATABASE: &str = ".voltreon/voltreon.db";

/// Default server bind address.
pub const DEFAULT_BIND: &str = "127.0.0.1:3001";

/// Configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct VoltreonConfig {
    /// Storage section
    pub storage: StorageConfig,

    /// Dependency validation section
    pub dependencies: DependencyConfig,

    /// Summarizer section
    pub summarizer: SummarizerConfig,

    /// HTTP server section
    pub server: ServerConfig,
}

/// Which store backend to open
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// SQLite database file
    #[default]
    Sqlite,
    /// Ephemeral in-memory store
    Memory,
}

/// Storage configuration section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct StorageConfig {
    /// Backend type
    pub backend: StorageKind,

    /// Path to the database file, relative to the workspace root
    pub database: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageKind::Sqlite,
            database: DEFAULT_DATABASE.to_string(),
        }
    }
}

impl StorageConfig {
    /// Resolve to a store backend, with relative paths anchored at `root`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the SQLite database path is empty.
    pub fn to_backend(&self, root: &Path) -> Result<StoreBackend> {
        match self.backend {
            StorageKind::Memory => Ok(StoreBackend::InMemory),
            StorageKind::Sqlite => {
                if self.database.trim().is_empty() {
                    return Err(Error::Config(
                        "storage.database must be set for the sqlite backend".to_string(),
                    ));
                }
                let path = Path::new(&self.database);
                let path = if path.is_absolute() {
                    path.to_path_buf()
                } else {
                    root.join(path)
                };
                Ok(StoreBackend::Sqlite(path))
            }
        }
    }
}

/// Dependency validation section
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct DependencyConfig {
    /// How far the cycle check looks
    pub cycle_detection: CyclePolicy,
}

/// Which summarizer backend to use
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SummarizerKind {
    /// Fixed text template
    #[default]
    Template,
    /// OpenAI-compatible chat endpoint
    Llm,
}

/// Summarizer configuration section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct SummarizerConfig {
    /// Backend type
    pub backend: SummarizerKind,

    /// Chat-completions endpoint URL
    pub url: String,

    /// Model name
    pub model: String,

    /// Name of the environment variable holding the API key
    pub api_key_env: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Include the full upstream chain in the context
    pub include_upstream: bool,

    /// Fall back to the template when the AI backend fails
    pub fallback_to_template: bool,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            backend: SummarizerKind::Template,
            url: DEFAULT_LLM_URL.to_string(),
            model: DEFAULT_LLM_MODEL.to_string(),
            api_key_env: None,
            timeout_secs: 30,
            include_upstream: false,
            fallback_to_template: false,
        }
    }
}

impl SummarizerConfig {
    /// Options for the summary service.
    pub fn options(&self) -> SummaryOptions {
        SummaryOptions {
            include_upstream: self.include_upstream,
            fallback_to_template: self.fallback_to_template,
        }
    }

    /// Construct the configured backend.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the timeout is zero or the HTTP client
    /// cannot be built.
    pub fn build(&self) -> Result<Arc<dyn Summarizer>> {
        match self.backend {
            SummarizerKind::Template => Ok(Arc::new(TemplateSummarizer)),
            SummarizerKind::Llm => {
                if self.timeout_secs == 0 {
                    return Err(Error::Config(
                        "summarizer.timeout-secs must be greater than 0".to_string(),
                    ));
                }
                let api_key = self
                    .api_key_env
                    .as_deref()
                    .and_then(|var| std::env::var(var).ok())
                    .filter(|k| !k.is_empty());

                let summarizer = LlmSummarizer::new(LlmSettings {
                    url: self.url.clone(),
                    model: self.model.clone(),
                    api_key,
                    timeout: Duration::from_secs(self.timeout_secs),
                })?;
                Ok(Arc::new(summarizer))
            }
        }
    }
}

/// HTTP server section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

impl VoltreonConfig {
    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file can't be read, `Error::Config` if it
    /// isn't valid YAML for this structure.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        serde_yaml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a file
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file can't be written.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {}", e)))?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Apply `VOLTREON_LLM_URL` / `VOLTREON_LLM_MODEL` from the process
    /// environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup (empty values are ignored).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v: &String| !v.trim().is_empty());
        if let Some(url) = get(LLM_URL_ENV) {
            tracing::debug!(%url, "Summarizer URL overridden from environment");
            self.summarizer.url = url;
        }
        if let Some(model) = get(LLM_MODEL_ENV) {
            tracing::debug!(%model, "Summarizer model overridden from environment");
            self.summarizer.model = model;
        }
    }
}
