//! Error types for voltreon operations.
//!
//! Errors fall into five kinds (see [`ErrorKind`]):
//!
//! - **NotFound**: a referenced project, ticket, person, edge, or assignment is missing
//! - **Validation**: malformed input (empty title, self-dependency, bad email)
//! - **Conflict**: uniqueness or graph-shape violations (duplicate edge, cycle)
//! - **UpstreamService**: the external summarization backend failed or timed out
//! - **Store**: the persistence layer failed; fatal to the request, not the process
//!
//! Every kind except `Store` is a reported, recoverable rejection.

use crate::dependency::EdgeRejection;
use crate::domain::{PersonId, ProjectId, TicketId};
use serde::Serialize;
use std::fmt;
use std::io;
use thiserror::Error;

/// The error type for voltreon operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Project not found.
    #[error("Project not found: {0}")]
    ProjectNotFound(ProjectId),

    /// Ticket not found.
    #[error("Ticket not found: {0}")]
    TicketNotFound(TicketId),

    /// Person not found.
    #[error("Person not found: {0}")]
    PersonNotFound(PersonId),

    /// Dependency edge not found.
    #[error("Dependency not found: {ticket} -> {depends_on}")]
    DependencyNotFound {
        /// The dependent ticket
        ticket: TicketId,
        /// The ticket depended upon
        depends_on: TicketId,
    },

    /// Assignment not found.
    #[error("Person {person} is not assigned to ticket {ticket}")]
    AssignmentNotFound {
        /// The ticket
        ticket: TicketId,
        /// The person
        person: PersonId,
    },

    /// A proposed dependency edge was rejected.
    #[error(transparent)]
    EdgeRejected(#[from] EdgeRejection),

    /// Input failed validation.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The person is already assigned to the ticket.
    #[error("Person {person} is already assigned to ticket {ticket}")]
    DuplicateAssignment {
        /// The ticket
        ticket: TicketId,
        /// The person
        person: PersonId,
    },

    /// A unique person field (email or username) is already taken.
    #[error("A person with {field} '{value}' already exists")]
    DuplicatePerson {
        /// The conflicting field name
        field: &'static str,
        /// The conflicting value
        value: String,
    },

    /// Cannot delete a project that still owns tickets.
    #[error("Cannot delete project {project_id}: it still has {ticket_count} ticket(s)")]
    ProjectHasTickets {
        /// The project
        project_id: ProjectId,
        /// Number of tickets still owned
        ticket_count: usize,
    },

    /// The summarization backend failed or timed out.
    #[error("Summarization failed: {0}")]
    SummarizationFailed(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Storage error.
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Machine-readable classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A referenced entity does not exist
    NotFound,
    /// The request was malformed
    Validation,
    /// The request conflicts with existing state
    Conflict,
    /// An external service failed
    UpstreamService,
    /// The persistence layer failed
    Store,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Validation => "validation",
            ErrorKind::Conflict => "conflict",
            ErrorKind::UpstreamService => "upstream_service",
            ErrorKind::Store => "store",
        };
        f.write_str(s)
    }
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ProjectNotFound(_)
            | Error::TicketNotFound(_)
            | Error::PersonNotFound(_)
            | Error::DependencyNotFound { .. }
            | Error::AssignmentNotFound { .. } => ErrorKind::NotFound,
            Error::EdgeRejected(rejection) => rejection.kind(),
            Error::Validation(_) | Error::Config(_) => ErrorKind::Validation,
            Error::DuplicateAssignment { .. }
            | Error::DuplicatePerson { .. }
            | Error::ProjectHasTickets { .. } => ErrorKind::Conflict,
            Error::SummarizationFailed(_) => ErrorKind::UpstreamService,
            Error::Database(_) | Error::Storage(_) | Error::Io(_) => ErrorKind::Store,
        }
    }

    /// Returns `true` for rejections the caller can act on (everything except
    /// store failures).
    pub fn is_recoverable(&self) -> bool {
        self.kind() != ErrorKind::Store
    }
}

/// A specialized Result type for voltreon operations.
pub type Result<T> = std::result::Result<T, Error>;
