//! CLI argument structs for all commands.
//!
//! Each command has its own argument struct with clap derive attributes
//! for parsing and validation.

use clap::{Parser, Subcommand};

use super::types::{TicketStatusArg, TicketTypeArg};
use super::validators::{
    validate_field_value, validate_text, validate_ticket_id, validate_title,
};
use crate::domain::{MAX_PRIORITY, MIN_PRIORITY};

/// Arguments for the `new` command
#[derive(Parser, Debug, Clone)]
pub struct NewArgs {
    /// Title words, joined with spaces ("Untitled" when omitted)
    #[arg(value_parser = validate_title)]
    pub title: Vec<String>,

    /// Description, the first part of the body
    #[arg(short, long, value_parser = validate_text)]
    pub description: Option<String>,

    /// Design notes, added under a "Design" heading
    #[arg(long, value_parser = validate_text)]
    pub design: Option<String>,

    /// Acceptance criteria, added under an "Acceptance Criteria" heading
    #[arg(long, value_parser = validate_text)]
    pub acceptance: Option<String>,

    /// Priority level (0=critical, 1=high, 2=medium, 3=low, 4=backlog)
    #[arg(
        short,
        long,
        value_parser = clap::value_parser!(u8).range(i64::from(MIN_PRIORITY)..=i64::from(MAX_PRIORITY)),
        default_value = "2"
    )]
    pub priority: u8,

    /// Ticket type
    #[arg(short = 't', long = "type", value_enum, default_value = "task")]
    pub ticket_type: TicketTypeArg,

    /// Assignee (defaults to the configured assignee, then `git config user.name`)
    #[arg(short, long, value_parser = validate_field_value)]
    pub assignee: Option<String>,

    /// External reference (e.g., an upstream issue number)
    #[arg(long, value_parser = validate_field_value)]
    pub external_ref: Option<String>,

    /// Parent ticket ID
    #[arg(long, value_parser = validate_ticket_id)]
    pub parent: Option<String>,
}

/// Arguments for commands that take a single ticket ID
#[derive(Parser, Debug, Clone)]
pub struct IdArgs {
    /// Ticket ID (full or partial)
    #[arg(value_parser = validate_ticket_id)]
    pub id: String,
}

/// Arguments for the `list` command
#[derive(Parser, Debug, Clone, Default)]
pub struct ListArgs {
    /// Only show tickets with this status
    #[arg(short, long, value_enum)]
    pub status: Option<TicketStatusArg>,
}

/// Arguments for the `closed` command
#[derive(Parser, Debug, Clone)]
pub struct ClosedArgs {
    /// Maximum number of tickets to display
    #[arg(short = 'n', long, default_value = "20")]
    pub limit: usize,
}

/// Arguments for the `status` command
#[derive(Parser, Debug, Clone)]
pub struct StatusArgs {
    /// Ticket ID (full or partial)
    #[arg(value_parser = validate_ticket_id)]
    pub id: String,

    /// New status
    #[arg(value_enum)]
    pub status: TicketStatusArg,
}

/// Arguments for the `dep` command
///
/// `tk dep <id> <dep-id>` adds a dependency; `tk dep tree <id>` renders the
/// dependency tree.
#[derive(Parser, Debug, Clone)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
pub struct DepArgs {
    /// Dependency subcommand
    #[command(subcommand)]
    pub action: Option<DepAction>,

    /// Ticket that gains the dependency
    #[arg(required = true, value_parser = validate_ticket_id)]
    pub id: Option<String>,

    /// Ticket it depends on
    #[arg(required = true, value_parser = validate_ticket_id)]
    pub dep_id: Option<String>,
}

/// Dependency actions other than adding one
#[derive(Subcommand, Debug, Clone)]
pub enum DepAction {
    /// Show the dependency tree of a ticket
    ///
    /// Each ticket is shown once, at its deepest position. Use `--full` to
    /// show every path.
    Tree {
        /// Show every path to each ticket instead of deduplicating
        #[arg(long)]
        full: bool,

        /// Root ticket ID (full or partial)
        #[arg(value_parser = validate_ticket_id)]
        id: String,
    },
}

/// Arguments for the `undep` command
#[derive(Parser, Debug, Clone)]
pub struct UndepArgs {
    /// Ticket that loses the dependency
    #[arg(value_parser = validate_ticket_id)]
    pub id: String,

    /// Dependency to remove
    #[arg(value_parser = validate_ticket_id)]
    pub dep_id: String,
}

/// Arguments for the `link` command
#[derive(Parser, Debug, Clone)]
pub struct LinkArgs {
    /// Tickets to link with each other (at least two)
    #[arg(required = true, num_args = 2.., value_parser = validate_ticket_id)]
    pub ids: Vec<String>,
}

/// Arguments for the `unlink` command
#[derive(Parser, Debug, Clone)]
pub struct UnlinkArgs {
    /// First ticket
    #[arg(value_parser = validate_ticket_id)]
    pub id: String,

    /// Second ticket
    #[arg(value_parser = validate_ticket_id)]
    pub other_id: String,
}

/// Arguments for the `rm` command
#[derive(Parser, Debug, Clone)]
pub struct RmArgs {
    /// Ticket ID (full or partial)
    #[arg(value_parser = validate_ticket_id)]
    pub id: String,

    /// Remove links from the linked tickets and delete anyway
    ///
    /// Dependants and children still prevent deletion.
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for the `prune` and `clean` commands
#[derive(Parser, Debug, Clone, Default)]
pub struct FixArgs {
    /// Apply the changes instead of reporting them
    #[arg(long)]
    pub fix: bool,
}

/// Arguments for the `note` command
#[derive(Parser, Debug, Clone)]
pub struct NoteArgs {
    /// Ticket ID (full or partial)
    #[arg(value_parser = validate_ticket_id)]
    pub id: String,

    /// Note text, joined with spaces (read from stdin when omitted)
    #[arg(value_parser = validate_text)]
    pub text: Vec<String>,
}
