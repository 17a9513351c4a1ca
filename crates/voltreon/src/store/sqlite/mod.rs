//! SQLite store backend.
//!
//! SQLite is the durable source of truth for a voltreon workspace. The schema
//! lives in `schema`, row conversion in `helpers`, and the `EntityStore`
//! implementation in `trait_impl`.
//!
//! ## Atomic edge insertion
//!
//! `add_dependency` opens an `IMMEDIATE` transaction, which takes the database
//! write lock up front, then runs every validation query and the insert inside
//! it. A second writer blocks until the first commits, so it sees the first
//! writer's edge when it runs its own duplicate and cycle checks. The table's
//! composite primary key and `CHECK` constraint back this up.

mod helpers;
mod schema;
mod trait_impl;

use crate::dependency::EdgeView;
use crate::domain::TicketId;
use crate::error::{Error, Result};
use rusqlite::{Connection, OptionalExtension, params};
use schema::SCHEMA;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// SQLite-backed entity store.
///
/// The connection is wrapped in a `Mutex` so the store can be shared as
/// `Arc<dyn EntityStore>` across tasks.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open or create the database at `path` and apply the schema.
    ///
    /// # Errors
    ///
    /// - `Error::Io` if the parent directory cannot be created
    /// - `Error::Database` if the file cannot be opened or migrated
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::init(conn, Some(path.to_path_buf()))
    }

    /// Open a private in-process database. Nothing is written to disk.
    ///
    /// # Errors
    ///
    /// Returns `Error::Database` if the schema cannot be applied.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?, None)
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        conn.execute_batch(SCHEMA)?;

        tracing::debug!(path = ?path, "Opened SQLite store");

        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    /// The database file, if this store is file-backed.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Acquire the connection lock.
    pub(crate) fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            Error::Storage(format!(
                "database connection mutex poisoned (a thread panicked while holding the lock): {e}"
            ))
        })
    }
}

impl EdgeView for Connection {
    fn ticket_exists(&self, id: TicketId) -> Result<bool> {
        let found = self
            .query_row("SELECT 1 FROM tickets WHERE id = ?1", params![id.get()], |_| {
                Ok(())
            })
            .optional()?;
        Ok(found.is_some())
    }

    fn edge_exists(&self, from: TicketId, to: TicketId) -> Result<bool> {
        let found = self
            .query_row(
                "SELECT 1 FROM ticket_dependencies
                 WHERE ticket_id = ?1 AND depends_on_ticket_id = ?2",
                params![from.get(), to.get()],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn path_exists(&self, from: TicketId, to: TicketId) -> Result<bool> {
        // UNION (not UNION ALL) drops revisited rows, so the walk terminates
        // even when the table already holds a cycle.
        let reachable: bool = self.query_row(
            "WITH RECURSIVE reachable(ticket_id) AS (
                SELECT depends_on_ticket_id
                FROM ticket_dependencies
                WHERE ticket_id = ?1

                UNION

                SELECT d.depends_on_ticket_id
                FROM ticket_dependencies d
                JOIN reachable r ON d.ticket_id = r.ticket_id
            )
            SELECT EXISTS (SELECT 1 FROM reachable WHERE ticket_id = ?2)",
            params![from.get(), to.get()],
            |row| row.get(0),
        )?;
        Ok(reachable)
    }
}
