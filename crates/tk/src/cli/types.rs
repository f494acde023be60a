//! CLI value enums and domain type conversions.

use clap::ValueEnum;

use crate::domain::{TicketStatus, TicketType};

/// Ticket type for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketTypeArg {
    /// Bug fix
    Bug,
    /// New feature
    Feature,
    /// General task
    Task,
    /// Epic (parent ticket)
    Epic,
    /// Maintenance/chore
    Chore,
}

impl std::fmt::Display for TicketTypeArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", TicketType::from(*self))
    }
}

/// Ticket status for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketStatusArg {
    /// Not started
    Open,
    /// Currently being worked on
    #[value(name = "in_progress", alias = "in-progress")]
    InProgress,
    /// Done
    Closed,
}

impl std::fmt::Display for TicketStatusArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", TicketStatus::from(*self))
    }
}

impl From<TicketTypeArg> for TicketType {
    fn from(arg: TicketTypeArg) -> Self {
        match arg {
            TicketTypeArg::Bug => TicketType::Bug,
            TicketTypeArg::Feature => TicketType::Feature,
            TicketTypeArg::Task => TicketType::Task,
            TicketTypeArg::Epic => TicketType::Epic,
            TicketTypeArg::Chore => TicketType::Chore,
        }
    }
}

impl From<TicketStatusArg> for TicketStatus {
    fn from(arg: TicketStatusArg) -> Self {
        match arg {
            TicketStatusArg::Open => TicketStatus::Open,
            TicketStatusArg::InProgress => TicketStatus::InProgress,
            TicketStatusArg::Closed => TicketStatus::Closed,
        }
    }
}
