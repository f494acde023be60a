//! CLI argument parsing and command dispatch.
//!
//! This module provides the command-line interface for tk using clap's derive API.
//! Each command has its own argument struct with validation and helpful error messages.
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format (applies to all reporting commands)
//! - `--dir`: Tickets directory (also `TK_DIR`)
//!
//! # Example
//!
//! ```bash
//! tk new Fix the parser -p 1 -t bug
//! tk dep nw-5c46 nw-a1b2
//! tk dep tree nw-5c46
//! tk close 5c46
//! ```

mod args;
mod execute;
mod types;
mod validators;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

// Re-export argument structs
pub use args::{
    ClosedArgs, DepAction, DepArgs, FixArgs, IdArgs, LinkArgs, ListArgs, NewArgs, NoteArgs,
    RmArgs, StatusArgs, UndepArgs, UnlinkArgs,
};

// Re-export types
pub use types::{TicketStatusArg, TicketTypeArg};

// Re-export validators for external use
pub use validators::{validate_field_value, validate_text, validate_ticket_id, validate_title};

use crate::config::TICKETS_DIR_ENV;
use crate::domain::TicketStatus;

/// tk - a file-based ticket tracker
///
/// Tickets are Markdown files with a small header block, stored in
/// `.tickets/` next to your code.
#[derive(Parser, Debug)]
#[command(name = "tk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Tickets directory (default: nearest `.tickets/` upwards)
    #[arg(long, global = true, env = TICKETS_DIR_ENV, value_name = "PATH")]
    pub dir: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Create a new ticket and print its ID
    New(NewArgs),

    /// Show a ticket with its relationships
    Show(IdArgs),

    /// List tickets, sorted by ID
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Show open tickets whose dependencies are all closed
    Ready,

    /// Show open tickets waiting on unclosed dependencies
    Blocked,

    /// Show recently closed tickets
    Closed(ClosedArgs),

    /// Set the status of a ticket
    Status(StatusArgs),

    /// Set a ticket's status to in_progress
    Start(IdArgs),

    /// Set a ticket's status to closed
    Close(IdArgs),

    /// Set a ticket's status to open
    Reopen(IdArgs),

    /// Add a dependency, or show a dependency tree
    ///
    /// `tk dep <id> <dep-id>` makes the first ticket depend on the second.
    /// `tk dep tree [--full] <id>` renders the dependency tree.
    Dep(DepArgs),

    /// Remove a dependency
    Undep(UndepArgs),

    /// Link tickets with each other
    Link(LinkArgs),

    /// Remove the link between two tickets
    Unlink(UnlinkArgs),

    /// Delete a ticket
    ///
    /// Refuses when other tickets depend on it or have it as parent, and
    /// when it has links unless `--force` is given.
    Rm(RmArgs),

    /// Report or remove references to tickets that no longer exist
    Prune(FixArgs),

    /// Report or delete closed tickets nothing refers to
    Clean(FixArgs),

    /// Open a ticket in `$EDITOR`
    Edit(IdArgs),

    /// Append a timestamped note to a ticket
    Note(NoteArgs),

    /// Print every ticket as one JSON object per line
    Query,
}

impl Cli {
    /// Parse CLI arguments from command line
    #[must_use]
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    ///
    /// # Errors
    ///
    /// Returns the clap error for invalid arguments.
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    ///
    /// # Errors
    ///
    /// Returns any error from locating the tickets directory or running the
    /// command.
    pub fn execute(&self) -> Result<()> {
        use crate::app::App;
        use crate::output::OutputMode;

        let Some(command) = &self.command else {
            println!("tk - file-based ticket tracker");
            println!("Use --help for more information");
            return Ok(());
        };

        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        let app = App::from_directory(&std::env::current_dir()?, self.dir.as_deref())?;

        match command {
            Commands::New(args) => execute::execute_new(&app, args, output_mode),
            Commands::Show(args) => execute::execute_show(&app, args, output_mode),
            Commands::List(args) => execute::execute_list(&app, args, output_mode),
            Commands::Ready => execute::execute_ready(&app, output_mode),
            Commands::Blocked => execute::execute_blocked(&app, output_mode),
            Commands::Closed(args) => execute::execute_closed(&app, args, output_mode),
            Commands::Status(args) => execute::execute_status(&app, args, output_mode),
            Commands::Start(args) => {
                execute::execute_set_status(&app, &args.id, TicketStatus::InProgress, output_mode)
            }
            Commands::Close(args) => {
                execute::execute_set_status(&app, &args.id, TicketStatus::Closed, output_mode)
            }
            Commands::Reopen(args) => {
                execute::execute_set_status(&app, &args.id, TicketStatus::Open, output_mode)
            }
            Commands::Dep(args) => execute::execute_dep(&app, args, output_mode),
            Commands::Undep(args) => execute::execute_undep(&app, args, output_mode),
            Commands::Link(args) => execute::execute_link(&app, args, output_mode),
            Commands::Unlink(args) => execute::execute_unlink(&app, args, output_mode),
            Commands::Rm(args) => execute::execute_rm(&app, args, output_mode),
            Commands::Prune(args) => execute::execute_prune(&app, args),
            Commands::Clean(args) => execute::execute_clean(&app, args),
            Commands::Edit(args) => execute::execute_edit(&app, args, output_mode),
            Commands::Note(args) => execute::execute_note(&app, args, output_mode),
            Commands::Query => execute::execute_query(&app),
        }
    }
}
