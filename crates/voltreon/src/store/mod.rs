//! Entity store abstraction for voltreon.
//!
//! This module provides the storage trait and the factory for creating store
//! backends. Two implementations exist:
//!
//! - **In-memory**: ephemeral, backed by `HashMap`s and a petgraph graph
//! - **SQLite**: persistent, backed by a single rusqlite connection
//!
//! # Architecture
//!
//! The trait is async and object-safe so callers hold a [`SharedStore`]
//! (`Arc<dyn EntityStore>`) regardless of backend. Every method takes `&self`;
//! backends use interior mutability (a tokio mutex around the in-memory state,
//! a std mutex around the SQLite connection), which lets one store be shared
//! by the CLI, the dependency service and every HTTP handler.
//!
//! # Example
//!
//! ```no_run
//! use voltreon::domain::{NewProject, NewTicket};
//! use voltreon::store::{open_store, StoreBackend};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let store = open_store(&StoreBackend::InMemory)?;
//!
//!     let project = store
//!         .create_project(NewProject {
//!             name: "Platform".to_string(),
//!             description: None,
//!         })
//!         .await?;
//!     let ticket = store
//!         .create_ticket(NewTicket {
//!             project_id: project.id,
//!             title: "Set up CI".to_string(),
//!             ..Default::default()
//!         })
//!         .await?;
//!     println!("Created ticket #{}", ticket.id);
//!
//!     Ok(())
//! }
//! ```

use crate::dependency::CyclePolicy;
use crate::domain::{
    NewPerson, NewProject, NewTicket, Person, PersonId, PersonUpdate, Project, ProjectId,
    ProjectUpdate, Ticket, TicketDependency, TicketFilter, TicketId, TicketPerson, TicketUpdate,
};
use crate::error::Result;
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod in_memory;
pub mod sqlite;

/// Shared, dynamically dispatched store handle.
pub type SharedStore = Arc<dyn EntityStore>;

/// Storage trait for projects, tickets, people and their links.
///
/// # Method Categories
///
/// - **Projects**: `create_project`, `get_project`, `list_projects`, `update_project`,
///   `delete_project`
/// - **Tickets**: `create_ticket`, `get_ticket`, `list_tickets`, `update_ticket`, `delete_ticket`
/// - **People**: `create_person`, `get_person`, `list_people`, `update_person`, `delete_person`
/// - **Assignments**: `assign_person`, `unassign_person`, `people_for_ticket`, `tickets_for_person`
/// - **Dependencies**: `add_dependency`, `remove_dependency`, `dependencies_of`, `dependents_of`
///
/// # Implementation Requirements
///
/// - `create_*` and `update_*` **MUST** run the input's validation before
///   touching state.
/// - `add_dependency` **MUST** run [`crate::dependency::check_edge`] and the
///   insert as one atomic unit, so two concurrent proposals cannot both pass
///   validation.
/// - `delete_ticket` removes the ticket's edges (both directions) and its
///   assignments.
/// - Neighbour queries return tickets in ascending id order.
#[async_trait]
pub trait EntityStore: Send + Sync {
    // ========== Projects ==========

    /// Create a new project.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if the name is empty or too long.
    async fn create_project(&self, project: NewProject) -> Result<Project>;

    /// Get a project by ID. Returns `None` if it doesn't exist.
    async fn get_project(&self, id: ProjectId) -> Result<Option<Project>>;

    /// List all projects, newest first.
    async fn list_projects(&self) -> Result<Vec<Project>>;

    /// Apply a partial update to a project.
    ///
    /// # Errors
    ///
    /// - `Error::ProjectNotFound` if the project doesn't exist
    /// - `Error::Validation` if the new name is invalid
    async fn update_project(&self, id: ProjectId, update: ProjectUpdate) -> Result<Project>;

    /// Delete a project.
    ///
    /// # Errors
    ///
    /// - `Error::ProjectNotFound` if the project doesn't exist
    /// - `Error::ProjectHasTickets` if tickets still belong to it
    async fn delete_project(&self, id: ProjectId) -> Result<()>;

    // ========== Tickets ==========

    /// Create a new ticket under an existing project.
    ///
    /// # Errors
    ///
    /// - `Error::ProjectNotFound` if the owning project doesn't exist
    /// - `Error::Validation` if the title is empty or too long
    async fn create_ticket(&self, ticket: NewTicket) -> Result<Ticket>;

    /// Get a ticket by ID. Returns `None` if it doesn't exist.
    async fn get_ticket(&self, id: TicketId) -> Result<Option<Ticket>>;

    /// List tickets matching the filter, newest first.
    async fn list_tickets(&self, filter: &TicketFilter) -> Result<Vec<Ticket>>;

    /// Apply a partial update to a ticket. Only supplied fields change.
    ///
    /// # Errors
    ///
    /// - `Error::TicketNotFound` if the ticket doesn't exist
    /// - `Error::Validation` if the new title is invalid
    async fn update_ticket(&self, id: TicketId, update: TicketUpdate) -> Result<Ticket>;

    /// Delete a ticket together with its dependency edges and assignments.
    ///
    /// # Errors
    ///
    /// Returns `Error::TicketNotFound` if the ticket doesn't exist.
    async fn delete_ticket(&self, id: TicketId) -> Result<()>;

    // ========== People ==========

    /// Create a new person.
    ///
    /// # Errors
    ///
    /// - `Error::Validation` for an empty name or malformed contact fields
    /// - `Error::DuplicatePerson` if the email or username is taken
    async fn create_person(&self, person: NewPerson) -> Result<Person>;

    /// Get a person by ID. Returns `None` if they don't exist.
    async fn get_person(&self, id: PersonId) -> Result<Option<Person>>;

    /// List all people, ordered by name.
    async fn list_people(&self) -> Result<Vec<Person>>;

    /// Apply a partial update to a person.
    ///
    /// # Errors
    ///
    /// - `Error::PersonNotFound` if the person doesn't exist
    /// - `Error::Validation` or `Error::DuplicatePerson` for invalid new values
    async fn update_person(&self, id: PersonId, update: PersonUpdate) -> Result<Person>;

    /// Delete a person together with their assignments.
    ///
    /// # Errors
    ///
    /// Returns `Error::PersonNotFound` if the person doesn't exist.
    async fn delete_person(&self, id: PersonId) -> Result<()>;

    // ========== Assignments ==========

    /// Assign a person to a ticket.
    ///
    /// # Errors
    ///
    /// - `Error::TicketNotFound` / `Error::PersonNotFound` for a missing end
    /// - `Error::DuplicateAssignment` if the pair already exists
    async fn assign_person(&self, ticket: TicketId, person: PersonId) -> Result<TicketPerson>;

    /// Remove an assignment.
    ///
    /// # Errors
    ///
    /// Returns `Error::AssignmentNotFound` if the pair doesn't exist.
    async fn unassign_person(&self, ticket: TicketId, person: PersonId) -> Result<()>;

    /// People assigned to a ticket, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `Error::TicketNotFound` if the ticket doesn't exist.
    async fn people_for_ticket(&self, ticket: TicketId) -> Result<Vec<Person>>;

    /// Tickets a person is assigned to, in ascending id order.
    ///
    /// # Errors
    ///
    /// Returns `Error::PersonNotFound` if the person doesn't exist.
    async fn tickets_for_person(&self, person: PersonId) -> Result<Vec<Ticket>>;

    // ========== Dependencies ==========

    /// Validate and insert the edge `ticket -> depends_on` atomically.
    ///
    /// # Errors
    ///
    /// Returns `Error::EdgeRejected` with the first failing check. A rejected
    /// proposal leaves the store untouched.
    async fn add_dependency(
        &self,
        ticket: TicketId,
        depends_on: TicketId,
        policy: CyclePolicy,
    ) -> Result<TicketDependency>;

    /// Remove the edge `ticket -> depends_on`.
    ///
    /// # Errors
    ///
    /// Returns `Error::DependencyNotFound` if the edge doesn't exist.
    async fn remove_dependency(&self, ticket: TicketId, depends_on: TicketId) -> Result<()>;

    /// Tickets that `ticket` directly depends on, in ascending id order.
    ///
    /// # Errors
    ///
    /// Returns `Error::TicketNotFound` if the ticket doesn't exist.
    async fn dependencies_of(&self, ticket: TicketId) -> Result<Vec<Ticket>>;

    /// Tickets that directly depend on `ticket`, in ascending id order.
    ///
    /// # Errors
    ///
    /// Returns `Error::TicketNotFound` if the ticket doesn't exist.
    async fn dependents_of(&self, ticket: TicketId) -> Result<Vec<Ticket>>;
}

/// Store backend selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// In-memory store (ephemeral)
    InMemory,

    /// SQLite database file (persistent)
    Sqlite(PathBuf),
}

impl StoreBackend {
    /// Returns the database path for file-based backends.
    pub fn data_path(&self) -> Option<&Path> {
        match self {
            StoreBackend::Sqlite(path) => Some(path),
            StoreBackend::InMemory => None,
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::InMemory => f.write_str("memory"),
            StoreBackend::Sqlite(path) => write!(f, "sqlite ({})", path.display()),
        }
    }
}

/// Open a store for the given backend.
///
/// # Errors
///
/// - `Error::Database` if the SQLite file cannot be opened or migrated
/// - `Error::Io` if the database's parent directory cannot be created
pub fn open_store(backend: &StoreBackend) -> Result<SharedStore> {
    match backend {
        StoreBackend::InMemory => Ok(in_memory::new_in_memory_store()),
        StoreBackend::Sqlite(path) => {
            let store = sqlite::SqliteStore::open(path)?;
            Ok(Arc::new(store))
        }
    }
}
