//! Dependency edge validation.
//!
//! A proposed edge `(ticket, depends_on)` passes through four checks, in
//! order, stopping at the first failure:
//!
//! 1. **Self-reference**: a ticket may not depend on itself
//! 2. **Existence**: both tickets must exist (the source is checked first)
//! 3. **Duplicate**: the ordered pair must not already be an edge
//! 4. **Cycle**: the edge must not close a cycle
//!
//! The checks read through an [`EdgeView`], which each store backend
//! implements over whatever it holds while the insert is in flight (the
//! locked in-memory graph, or an open SQLite transaction). Running the checks
//! and the insert under the same guard is what makes a proposal atomic.

use crate::domain::TicketId;
use crate::error::{ErrorKind, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Which end of a proposed edge a rejection refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeEnd {
    /// The dependent ticket (`ticketId`)
    Source,
    /// The ticket depended upon (`dependsOnTicketId`)
    Target,
}

impl fmt::Display for EdgeEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeEnd::Source => f.write_str("Source"),
            EdgeEnd::Target => f.write_str("Target"),
        }
    }
}

/// Reasons a proposed dependency edge is refused.
///
/// Rejections never touch the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EdgeRejection {
    /// The ticket would depend on itself.
    #[error("Ticket {0} cannot depend on itself")]
    SelfDependency(TicketId),

    /// One of the two tickets does not exist.
    #[error("{end} ticket not found: {id}")]
    TicketNotFound {
        /// Which end is missing
        end: EdgeEnd,
        /// The missing ticket ID
        id: TicketId,
    },

    /// The edge already exists.
    #[error("Dependency already exists: {ticket} -> {depends_on}")]
    DuplicateEdge {
        /// The dependent ticket
        ticket: TicketId,
        /// The ticket depended upon
        depends_on: TicketId,
    },

    /// The edge would close a cycle.
    #[error(
        "Circular dependency: ticket {depends_on} already depends on ticket {ticket}, \
         directly or transitively"
    )]
    CircularDependency {
        /// The dependent ticket
        ticket: TicketId,
        /// The ticket depended upon
        depends_on: TicketId,
    },
}

impl EdgeRejection {
    /// Classify this rejection.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EdgeRejection::SelfDependency(_) => ErrorKind::Validation,
            EdgeRejection::TicketNotFound { .. } => ErrorKind::NotFound,
            EdgeRejection::DuplicateEdge { .. } | EdgeRejection::CircularDependency { .. } => {
                ErrorKind::Conflict
            }
        }
    }
}

/// How far the cycle check looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CyclePolicy {
    /// Reject only when the reverse edge exists (2-cycles).
    Immediate,

    /// Reject when `ticket` is reachable from `depends_on` by any path.
    #[default]
    Transitive,
}

impl fmt::Display for CyclePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CyclePolicy::Immediate => f.write_str("immediate"),
            CyclePolicy::Transitive => f.write_str("transitive"),
        }
    }
}

/// Read access to the dependency graph needed by [`check_edge`].
pub trait EdgeView {
    /// Whether the ticket exists.
    fn ticket_exists(&self, id: TicketId) -> Result<bool>;

    /// Whether the directed edge `from -> to` exists.
    fn edge_exists(&self, from: TicketId, to: TicketId) -> Result<bool>;

    /// Whether `to` is reachable from `from` by following edges (`from` depends
    /// on `to`, directly or transitively).
    fn path_exists(&self, from: TicketId, to: TicketId) -> Result<bool>;
}

/// Validate a proposed edge without inserting it.
///
/// # Errors
///
/// Returns [`crate::error::Error::EdgeRejected`] for the first failing check,
/// or a store error if the view cannot be read.
pub fn check_edge<V: EdgeView + ?Sized>(
    view: &V,
    ticket: TicketId,
    depends_on: TicketId,
    policy: CyclePolicy,
) -> Result<()> {
    if ticket == depends_on {
        return Err(EdgeRejection::SelfDependency(ticket).into());
    }

    if !view.ticket_exists(ticket)? {
        return Err(EdgeRejection::TicketNotFound {
            end: EdgeEnd::Source,
            id: ticket,
        }
        .into());
    }
    if !view.ticket_exists(depends_on)? {
        return Err(EdgeRejection::TicketNotFound {
            end: EdgeEnd::Target,
            id: depends_on,
        }
        .into());
    }

    if view.edge_exists(ticket, depends_on)? {
        return Err(EdgeRejection::DuplicateEdge { ticket, depends_on }.into());
    }

    let closes_cycle = match policy {
        CyclePolicy::Immediate => view.edge_exists(depends_on, ticket)?,
        CyclePolicy::Transitive => view.path_exists(depends_on, ticket)?,
    };
    if closes_cycle {
        return Err(EdgeRejection::CircularDependency { ticket, depends_on }.into());
    }

    Ok(())
}
