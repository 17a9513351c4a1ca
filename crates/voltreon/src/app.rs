//! Application context for CLI command execution.
//!
//! This module provides the `App` struct that opens the workspace's store
//! and wires the dependency and summary services on top of it.
//!
//! # Example
//!
//! ```no_run
//! use voltreon::app::App;
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let app = App::from_directory(Path::new(".")).await?;
//!     let projects = app.store().list_projects().await?;
//!     println!("{} projects", projects.len());
//!     Ok(())
//! }
//! ```

use crate::commands::init::{CONFIG_FILE_NAME, VOLTREON_DIR_NAME, find_voltreon_root};
use crate::config::VoltreonConfig;
use crate::dependency::DependencyService;
use crate::error::{Error, Result};
use crate::store::{EntityStore, SharedStore, open_store};
use crate::summary::SummaryService;
use std::path::{Path, PathBuf};

/// Application context shared by the CLI and the HTTP server.
///
/// Holds the opened store and the services built from the workspace
/// configuration. Cloning is cheap; every clone shares the same store.
#[derive(Clone)]
pub struct App {
    store: SharedStore,
    config: VoltreonConfig,
    root_dir: PathBuf,
    dependencies: DependencyService,
    summaries: SummaryService,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("root_dir", &self.root_dir)
            .field("config", &self.config)
            .field("store", &"<dyn EntityStore>")
            .finish_non_exhaustive()
    }
}

impl App {
    /// Create an App instance from the given working directory.
    ///
    /// Searches up the directory tree to find a `.voltreon/` directory,
    /// loads its configuration (with environment overrides applied), and
    /// opens the configured store.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No voltreon workspace is found in the directory tree
    /// - Configuration cannot be loaded
    /// - The store or summarizer cannot be created
    pub async fn from_directory(working_dir: &Path) -> Result<Self> {
        let root_dir = find_voltreon_root(working_dir).ok_or_else(|| {
            Error::Config(
                "Not a voltreon workspace (or any parent directory). Run 'voltreon init' first."
                    .to_string(),
            )
        })?;

        let config_path = root_dir.join(VOLTREON_DIR_NAME).join(CONFIG_FILE_NAME);
        let mut config = VoltreonConfig::load(&config_path).await?;
        config.apply_env_overrides();

        Self::from_config(config, root_dir)
    }

    /// Create an App from an already-loaded configuration.
    ///
    /// Relative storage paths are resolved against `root_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store or the summarizer cannot be created.
    pub fn from_config(config: VoltreonConfig, root_dir: PathBuf) -> Result<Self> {
        let backend = config.storage.to_backend(&root_dir)?;
        let store = open_store(&backend)?;
        let summarizer = config.summarizer.build()?;

        tracing::debug!(%backend, summarizer = summarizer.name(), "Opened workspace");

        let dependencies =
            DependencyService::new(store.clone(), config.dependencies.cycle_detection);
        let summaries = SummaryService::new(store.clone(), summarizer, config.summarizer.options());

        Ok(Self {
            store,
            config,
            root_dir,
            dependencies,
            summaries,
        })
    }

    /// The entity store.
    pub fn store(&self) -> &dyn EntityStore {
        self.store.as_ref()
    }

    /// A shared handle to the entity store.
    pub fn shared_store(&self) -> SharedStore {
        self.store.clone()
    }

    /// The loaded configuration.
    pub fn config(&self) -> &VoltreonConfig {
        &self.config
    }

    /// The workspace root (the directory containing `.voltreon/`).
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Path to the `.voltreon` directory.
    pub fn voltreon_dir(&self) -> PathBuf {
        self.root_dir.join(VOLTREON_DIR_NAME)
    }

    /// The dependency service.
    pub fn dependencies(&self) -> &DependencyService {
        &self.dependencies
    }

    /// The summary service.
    pub fn summaries(&self) -> &SummaryService {
        &self.summaries
    }
}
