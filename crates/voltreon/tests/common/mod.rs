//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::process::{Command, Output};
use std::sync::Arc;
use tempfile::TempDir;
use voltreon::domain::{NewProject, NewTicket, ProjectId, TicketId};
use voltreon::store::sqlite::SqliteStore;
use voltreon::store::{SharedStore, in_memory::new_in_memory_store};

/// Which backend a contract test runs against.
#[derive(Debug, Clone, Copy)]
pub enum Backend {
    Memory,
    Sqlite,
}

/// A store plus whatever keeps it alive (the SQLite file's directory).
pub struct TestStore {
    pub store: SharedStore,
    _dir: Option<TempDir>,
}

impl std::ops::Deref for TestStore {
    type Target = SharedStore;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

/// Open a fresh, empty store for the backend.
pub fn open(backend: Backend) -> TestStore {
    match backend {
        Backend::Memory => TestStore {
            store: new_in_memory_store(),
            _dir: None,
        },
        Backend::Sqlite => {
            let dir = TempDir::new().expect("Failed to create temp directory");
            let store = SqliteStore::open(&dir.path().join("voltreon.db"))
                .expect("Failed to open SQLite store");
            TestStore {
                store: Arc::new(store),
                _dir: Some(dir),
            }
        }
    }
}

/// Create a project named `name`.
pub async fn project(store: &SharedStore, name: &str) -> ProjectId {
    store
        .create_project(NewProject {
            name: name.to_string(),
            description: None,
        })
        .await
        .expect("create project")
        .id
}

/// Create one ticket per title under a fresh project, returning their ids in
/// order.
pub async fn tickets(store: &SharedStore, titles: &[&str]) -> Vec<TicketId> {
    let project_id = project(store, "Fixture").await;
    let mut ids = Vec::with_capacity(titles.len());
    for title in titles {
        let ticket = store
            .create_ticket(NewTicket {
                project_id,
                title: (*title).to_string(),
                ..Default::default()
            })
            .await
            .expect("create ticket");
        ids.push(ticket.id);
    }
    ids
}

/// Run the voltreon binary in the specified directory.
pub fn run_voltreon_in_dir(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_voltreon"))
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("VOLTREON_LLM_URL")
        .env_remove("VOLTREON_LLM_MODEL")
        .output()
        .expect("Failed to execute voltreon binary")
}

/// Run the binary with `--json` and parse stdout, asserting success.
pub fn run_json(dir: &Path, args: &[&str]) -> serde_json::Value {
    let mut full = vec!["--json"];
    full.extend_from_slice(args);
    let output = run_voltreon_in_dir(dir, &full);
    assert!(
        output.status.success(),
        "voltreon {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}
