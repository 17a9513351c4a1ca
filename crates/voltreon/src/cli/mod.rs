//! CLI argument parsing and command dispatch.
//!
//! This module provides the command-line interface for voltreon using clap's
//! derive API. Each command has its own argument struct with validation and
//! helpful error messages.
//!
//! # Commands
//!
//! - `init`: Initialize a new voltreon workspace
//! - `info`: Show workspace information
//! - `project`: Create, list, show, update and delete projects
//! - `ticket`: Create, list, show, update and delete tickets
//! - `person`: Create, list, update and delete people
//! - `assign` / `unassign`: Manage ticket assignments
//! - `dep`: Add, remove, list and graph ticket dependencies
//! - `summarize`: Summarize a ticket's dependencies
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format (applies to all commands)
//!
//! # Example
//!
//! ```bash
//! voltreon project create "Platform"
//! voltreon ticket create --project 1 --title "Set up CI"
//! voltreon dep add 2 1
//! voltreon dep graph 2
//! ```

mod args;
mod execute;
mod types;
mod validators;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub use args::{
    AssignArgs, DepAction, DepArgs, InfoArgs, InitArgs, PersonAction, PersonArgs, ProjectAction,
    ProjectArgs, SummarizeArgs, TicketAction, TicketArgs, TicketCreateArgs, TicketListArgs,
    TicketUpdateArgs,
};
pub use types::{BackendArg, TicketStatusArg};
pub use validators::{validate_email, validate_text, validate_title, validate_username};

/// Voltreon - project and ticket tracking with a ticket dependency graph
///
/// Tickets are architecture decision records. Dependencies between them form
/// an acyclic graph; proposals that would create a cycle are rejected.
#[derive(Parser, Debug)]
#[command(name = "voltreon")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Initialize a new voltreon workspace
    ///
    /// Creates the `.voltreon/` directory with configuration and database.
    Init(InitArgs),

    /// Show workspace information
    ///
    /// Displays storage backend, validation policy, summarizer and counts.
    Info(InfoArgs),

    /// Manage projects
    Project(ProjectArgs),

    /// Manage tickets
    Ticket(TicketArgs),

    /// Manage people
    Person(PersonArgs),

    /// Assign a person to a ticket
    Assign(AssignArgs),

    /// Remove a person from a ticket
    Unassign(AssignArgs),

    /// Manage ticket dependencies
    ///
    /// Edges are validated before insertion: no self-dependencies, both
    /// tickets must exist, no duplicates and no cycles.
    Dep(DepArgs),

    /// Summarize the dependencies of a ticket
    ///
    /// Uses the summarizer configured in `.voltreon/config.yaml`.
    Summarize(SummarizeArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    pub async fn execute(&self) -> Result<()> {
        use crate::app::App;
        use crate::output::OutputMode;

        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        let Some(command) = &self.command else {
            println!("Voltreon ticket tracking");
            println!("Use --help for more information");
            return Ok(());
        };

        if let Commands::Init(args) = command {
            return execute::execute_init(args).await;
        }

        let app = App::from_directory(&std::env::current_dir()?).await?;

        match command {
            Commands::Init(_) => Ok(()),
            Commands::Info(args) => execute::execute_info(&app, args, output_mode).await,
            Commands::Project(args) => execute::execute_project(&app, args, output_mode).await,
            Commands::Ticket(args) => execute::execute_ticket(&app, args, output_mode).await,
            Commands::Person(args) => execute::execute_person(&app, args, output_mode).await,
            Commands::Assign(args) => execute::execute_assign(&app, args, output_mode).await,
            Commands::Unassign(args) => execute::execute_unassign(&app, args, output_mode).await,
            Commands::Dep(args) => execute::execute_dep(&app, args, output_mode).await,
            Commands::Summarize(args) => execute::execute_summarize(&app, args, output_mode).await,
        }
    }
}
