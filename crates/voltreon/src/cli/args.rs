//! CLI argument structs for all commands.
//!
//! Each command has its own argument struct with clap derive attributes
//! for parsing and validation.

use clap::{Parser, Subcommand};

use super::types::{BackendArg, TicketStatusArg};
use super::validators::{validate_email, validate_text, validate_title, validate_username};
use crate::domain::{PersonId, ProjectId, TicketId};

/// Arguments for the `init` command
#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Storage backend to configure
    #[arg(short, long, value_enum, default_value = "sqlite")]
    pub backend: BackendArg,

    /// Suppress output messages
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug, Clone, Default)]
pub struct InfoArgs {}

// ========== Projects ==========

/// Arguments for the `project` command
#[derive(Parser, Debug, Clone)]
pub struct ProjectArgs {
    /// Project subcommand
    #[command(subcommand)]
    pub action: ProjectAction,
}

/// Project management actions
#[derive(Subcommand, Debug, Clone)]
pub enum ProjectAction {
    /// Create a project
    Create {
        /// Project name (maximum 200 characters)
        #[arg(value_parser = validate_title)]
        name: String,

        /// Project description
        #[arg(short = 'D', long, value_parser = validate_text)]
        description: Option<String>,
    },

    /// List projects, newest first
    List,

    /// Show a project and its tickets
    Show {
        /// Project ID
        id: ProjectId,
    },

    /// Update a project
    Update {
        /// Project ID
        id: ProjectId,

        /// New name
        #[arg(long, value_parser = validate_title)]
        name: Option<String>,

        /// New description
        #[arg(short = 'D', long, value_parser = validate_text)]
        description: Option<String>,

        /// Remove the description
        #[arg(long, conflicts_with = "description")]
        clear_description: bool,
    },

    /// Delete a project (it must have no tickets)
    Delete {
        /// Project ID
        id: ProjectId,
    },
}

// ========== Tickets ==========

/// Arguments for the `ticket` command
#[derive(Parser, Debug, Clone)]
pub struct TicketArgs {
    /// Ticket subcommand
    #[command(subcommand)]
    pub action: TicketAction,
}

/// Ticket management actions
#[derive(Subcommand, Debug, Clone)]
pub enum TicketAction {
    /// Create a ticket
    Create(TicketCreateArgs),

    /// List tickets, newest first
    List(TicketListArgs),

    /// Show a ticket with its assignees and direct dependencies
    Show {
        /// Ticket ID
        id: TicketId,
    },

    /// Update a ticket
    Update(TicketUpdateArgs),

    /// Delete a ticket with its dependency edges and assignments
    Delete {
        /// Ticket ID
        id: TicketId,
    },
}

/// Arguments for `ticket create`
#[derive(Parser, Debug, Clone)]
pub struct TicketCreateArgs {
    /// Owning project ID
    #[arg(short, long)]
    pub project: ProjectId,

    /// Ticket title (maximum 200 characters)
    #[arg(long, value_parser = validate_title)]
    pub title: String,

    /// ADR context
    #[arg(long, value_parser = validate_text)]
    pub context: Option<String>,

    /// ADR decision
    #[arg(long, value_parser = validate_text)]
    pub decision: Option<String>,

    /// ADR consequences
    #[arg(long, value_parser = validate_text)]
    pub consequences: Option<String>,

    /// Initial status
    #[arg(short, long, value_enum, default_value = "backlog")]
    pub status: TicketStatusArg,

    /// Mark the ticket as AI generated
    #[arg(long)]
    pub ai_generated: bool,
}

/// Arguments for `ticket list`
#[derive(Parser, Debug, Clone, Default)]
pub struct TicketListArgs {
    /// Filter by project
    #[arg(short, long)]
    pub project: Option<ProjectId>,

    /// Filter by status
    #[arg(short, long, value_enum)]
    pub status: Option<TicketStatusArg>,

    /// Maximum number of tickets to display
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

/// Arguments for `ticket update`
#[derive(Parser, Debug, Clone)]
pub struct TicketUpdateArgs {
    /// Ticket ID to update
    pub id: TicketId,

    /// New title (maximum 200 characters)
    #[arg(long, value_parser = validate_title)]
    pub title: Option<String>,

    /// New ADR context
    #[arg(long, value_parser = validate_text)]
    pub context: Option<String>,

    /// Remove the ADR context
    #[arg(long, conflicts_with = "context")]
    pub clear_context: bool,

    /// New ADR decision
    #[arg(long, value_parser = validate_text)]
    pub decision: Option<String>,

    /// Remove the ADR decision
    #[arg(long, conflicts_with = "decision")]
    pub clear_decision: bool,

    /// New ADR consequences
    #[arg(long, value_parser = validate_text)]
    pub consequences: Option<String>,

    /// Remove the ADR consequences
    #[arg(long, conflicts_with = "consequences")]
    pub clear_consequences: bool,

    /// New status
    #[arg(short, long, value_enum)]
    pub status: Option<TicketStatusArg>,

    /// Set or unset the AI-generated flag
    #[arg(long)]
    pub ai_generated: Option<bool>,
}

// ========== People ==========

/// Arguments for the `person` command
#[derive(Parser, Debug, Clone)]
pub struct PersonArgs {
    /// Person subcommand
    #[command(subcommand)]
    pub action: PersonAction,
}

/// Person management actions
#[derive(Subcommand, Debug, Clone)]
pub enum PersonAction {
    /// Create a person
    Create {
        /// Display name
        #[arg(value_parser = validate_title)]
        name: String,

        /// Email address (unique)
        #[arg(short, long, value_parser = validate_email)]
        email: Option<String>,

        /// Username (unique, no whitespace)
        #[arg(short, long, value_parser = validate_username)]
        username: Option<String>,
    },

    /// List people by name
    List,

    /// Update a person
    Update {
        /// Person ID
        id: PersonId,

        /// New display name
        #[arg(long, value_parser = validate_title)]
        name: Option<String>,

        /// New email address
        #[arg(short, long, value_parser = validate_email)]
        email: Option<String>,

        /// Remove the email address
        #[arg(long, conflicts_with = "email")]
        clear_email: bool,

        /// New username
        #[arg(short, long, value_parser = validate_username)]
        username: Option<String>,

        /// Remove the username
        #[arg(long, conflicts_with = "username")]
        clear_username: bool,
    },

    /// Delete a person and their assignments
    Delete {
        /// Person ID
        id: PersonId,
    },
}

/// Arguments for `assign` and `unassign`
#[derive(Parser, Debug, Clone)]
pub struct AssignArgs {
    /// Ticket ID
    pub ticket: TicketId,

    /// Person ID
    pub person: PersonId,
}

// ========== Dependencies ==========

/// Arguments for the `dep` command
#[derive(Parser, Debug, Clone)]
pub struct DepArgs {
    /// Dependency subcommand
    #[command(subcommand)]
    pub action: DepAction,
}

/// Dependency management actions
#[derive(Subcommand, Debug, Clone)]
pub enum DepAction {
    /// Add a dependency: TICKET cannot complete until DEPENDS_ON completes
    Add {
        /// Ticket that depends on another
        ticket: TicketId,

        /// Ticket being depended on
        depends_on: TicketId,
    },

    /// Remove a dependency
    Remove {
        /// Ticket that depends on another
        ticket: TicketId,

        /// Ticket being depended on
        depends_on: TicketId,
    },

    /// List direct dependencies and dependents of a ticket
    List {
        /// Ticket ID
        ticket: TicketId,
    },

    /// Show the full upstream and downstream dependency trees
    Graph {
        /// Ticket ID
        ticket: TicketId,

        /// Stop expanding below this depth
        #[arg(short = 'd', long)]
        max_depth: Option<usize>,
    },
}

/// Arguments for the `summarize` command
#[derive(Parser, Debug, Clone)]
pub struct SummarizeArgs {
    /// Ticket ID
    pub ticket: TicketId,
}
