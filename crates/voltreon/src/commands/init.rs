//! Implementation of the `init` command.
//!
//! This module handles initialization of a new voltreon workspace, creating
//! the `.voltreon/` directory with its configuration and database.

use crate::config::{StorageKind, VoltreonConfig};
use crate::error::{Error, Result};
use crate::store::sqlite::SqliteStore;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Name of the voltreon directory
pub const VOLTREON_DIR_NAME: &str = ".voltreon";

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Name of the SQLite database file
pub const DATABASE_FILE_NAME: &str = "voltreon.db";

/// Name of the gitignore file within .voltreon
pub const GITIGNORE_FILE_NAME: &str = ".gitignore";

/// Maximum directory depth to traverse when searching for the workspace root
pub const MAX_TRAVERSAL_DEPTH: usize = 256;

/// Result of the init command
#[derive(Debug)]
pub struct InitResult {
    /// Path to the created voltreon directory
    pub voltreon_dir: PathBuf,
    /// Path to the created config file
    pub config_file: PathBuf,
    /// Path to the created database, if the backend is SQLite
    pub database_file: Option<PathBuf>,
    /// Path to the created gitignore file
    pub gitignore_file: PathBuf,
    /// The storage backend written to the config
    pub backend: StorageKind,
}

/// Initialize a new voltreon workspace in the given directory.
///
/// # Arguments
///
/// * `base_dir` - The directory where `.voltreon/` will be created
/// * `backend` - Storage backend to configure (defaults to SQLite)
///
/// # Errors
///
/// Returns an error if:
/// - The `.voltreon/` directory already exists
/// - File system operations fail
/// - The database cannot be created
pub async fn init(base_dir: &Path, backend: Option<StorageKind>) -> Result<InitResult> {
    let voltreon_dir = base_dir.join(VOLTREON_DIR_NAME);

    if voltreon_dir.exists() {
        return Err(Error::Config(format!(
            "Voltreon is already initialized in this directory. Found existing '{}'",
            VOLTREON_DIR_NAME
        )));
    }

    fs::create_dir_all(&voltreon_dir).await?;

    let mut config = VoltreonConfig::default();
    config.storage.backend = backend.unwrap_or_default();
    config.storage.database = format!("{}/{}", VOLTREON_DIR_NAME, DATABASE_FILE_NAME);

    let config_file = voltreon_dir.join(CONFIG_FILE_NAME);
    config.save(&config_file).await?;

    // Create the database now so schema problems surface at init time.
    let database_file = match config.storage.backend {
        StorageKind::Sqlite => {
            let path = voltreon_dir.join(DATABASE_FILE_NAME);
            SqliteStore::open(&path)?;
            Some(path)
        }
        StorageKind::Memory => None,
    };

    let gitignore_file = voltreon_dir.join(GITIGNORE_FILE_NAME);
    let gitignore_content = "\
# SQLite write-ahead log and shared-memory files
voltreon.db-wal
voltreon.db-shm
";
    fs::write(&gitignore_file, gitignore_content).await?;

    tracing::info!(
        dir = %voltreon_dir.display(),
        backend = ?config.storage.backend,
        "Initialized workspace"
    );

    Ok(InitResult {
        voltreon_dir,
        config_file,
        database_file,
        gitignore_file,
        backend: config.storage.backend,
    })
}

/// Check if a directory has been initialized with voltreon.
///
/// Returns `true` if the `.voltreon/` directory exists.
pub fn is_initialized(base_dir: &Path) -> bool {
    base_dir.join(VOLTREON_DIR_NAME).exists()
}

/// Find the workspace root by searching up the directory tree.
///
/// Starts from the given directory and traverses parent directories until a
/// `.voltreon/` directory is found, the filesystem root is reached, or the
/// maximum traversal depth is exceeded.
pub fn find_voltreon_root(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    let mut depth = 0;

    loop {
        if current.join(VOLTREON_DIR_NAME).is_dir() {
            return Some(current);
        }

        depth += 1;
        if depth > MAX_TRAVERSAL_DEPTH || !current.pop() {
            return None;
        }
    }
}
