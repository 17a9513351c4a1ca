//! CLI value enums and domain type conversions.
//!
//! This module contains the value enums used for CLI argument parsing
//! and their conversions to/from domain types.

use clap::ValueEnum;

use crate::config::StorageKind;
use crate::domain::TicketStatus;

/// Ticket status for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketStatusArg {
    /// Not yet scheduled
    Backlog,
    /// Scheduled for work
    #[value(name = "todo", alias = "to-do")]
    ToDo,
    /// Currently being worked on
    #[value(name = "in_progress", alias = "in-progress")]
    InProgress,
    /// Awaiting review
    #[value(name = "in_review", alias = "in-review")]
    InReview,
    /// Completed
    Done,
    /// Abandoned
    #[value(alias = "canceled")]
    Cancelled,
}

impl std::fmt::Display for TicketStatusArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Backlog => write!(f, "backlog"),
            Self::ToDo => write!(f, "todo"),
            Self::InProgress => write!(f, "in_progress"),
            Self::InReview => write!(f, "in_review"),
            Self::Done => write!(f, "done"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl From<TicketStatusArg> for TicketStatus {
    fn from(arg: TicketStatusArg) -> Self {
        match arg {
            TicketStatusArg::Backlog => TicketStatus::Backlog,
            TicketStatusArg::ToDo => TicketStatus::ToDo,
            TicketStatusArg::InProgress => TicketStatus::InProgress,
            TicketStatusArg::InReview => TicketStatus::InReview,
            TicketStatusArg::Done => TicketStatus::Done,
            TicketStatusArg::Cancelled => TicketStatus::Cancelled,
        }
    }
}

impl From<TicketStatus> for TicketStatusArg {
    fn from(s: TicketStatus) -> Self {
        match s {
            TicketStatus::Backlog => TicketStatusArg::Backlog,
            TicketStatus::ToDo => TicketStatusArg::ToDo,
            TicketStatus::InProgress => TicketStatusArg::InProgress,
            TicketStatus::InReview => TicketStatusArg::InReview,
            TicketStatus::Done => TicketStatusArg::Done,
            TicketStatus::Cancelled => TicketStatusArg::Cancelled,
        }
    }
}

/// Storage backend for `init`
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendArg {
    /// SQLite database in `.voltreon/voltreon.db`
    #[default]
    Sqlite,
    /// Ephemeral in-memory store (nothing persists between runs)
    Memory,
}

impl std::fmt::Display for BackendArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite => write!(f, "sqlite"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

impl From<BackendArg> for StorageKind {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Sqlite => StorageKind::Sqlite,
            BackendArg::Memory => StorageKind::Memory,
        }
    }
}
