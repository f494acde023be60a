//! Domain types for ticket tracking.
//!
//! This module contains the core domain types for the tk ticket tracker.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Minimum (most urgent) priority value.
pub const MIN_PRIORITY: u8 = 0;

/// Maximum (least urgent) priority value.
pub const MAX_PRIORITY: u8 = 4;

/// Priority given to tickets that do not specify one.
pub const DEFAULT_PRIORITY: u8 = 2;

/// A ticket in the tracking system
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ticket {
    /// Unique identifier, also the record's file stem
    pub id: String,

    /// Current status
    pub status: TicketStatus,

    /// IDs this ticket depends on, in declaration order
    pub deps: Vec<String>,

    /// IDs of related tickets
    pub links: Vec<String>,

    /// Creation time, second precision
    pub created: DateTime<Utc>,

    /// Ticket type
    #[serde(rename = "type")]
    pub ticket_type: TicketType,

    /// Priority level (0 = highest, 4 = lowest)
    pub priority: u8,

    /// Assignee (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,

    /// External reference such as an upstream issue number
    #[serde(rename = "external-ref", skip_serializing_if = "Option::is_none")]
    pub external_ref: Option<String>,

    /// Parent ticket ID (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    /// Title, taken from the first heading of the record body
    pub title: String,

    /// Free-form text after the title
    pub body: String,
}

impl Ticket {
    /// Create an open task with default priority, created now.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: TicketStatus::Open,
            deps: Vec::new(),
            links: Vec::new(),
            created: Utc::now().trunc_subsecs(0),
            ticket_type: TicketType::Task,
            priority: DEFAULT_PRIORITY,
            assignee: None,
            external_ref: None,
            parent: None,
            title: title.into(),
            body: String::new(),
        }
    }

    /// Whether this ticket has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.status == TicketStatus::Closed
    }
}

/// Status of a ticket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Not started
    #[default]
    Open,

    /// Currently being worked on
    #[serde(alias = "in-progress")]
    InProgress,

    /// Done
    Closed,
}

impl TicketStatus {
    /// The on-disk spelling.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "in_progress" | "in-progress" => Ok(Self::InProgress),
            "closed" => Ok(Self::Closed),
            other => Err(format!(
                "invalid status '{other}' (expected open, in_progress or closed)"
            )),
        }
    }
}

/// Type of ticket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketType {
    /// Bug fix
    Bug,

    /// New feature
    Feature,

    /// General task
    #[default]
    Task,

    /// Epic (parent ticket)
    Epic,

    /// Maintenance/chore
    Chore,
}

impl TicketType {
    /// The on-disk spelling.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bug => "bug",
            Self::Feature => "feature",
            Self::Task => "task",
            Self::Epic => "epic",
            Self::Chore => "chore",
        }
    }
}

impl fmt::Display for TicketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bug" => Ok(Self::Bug),
            "feature" => Ok(Self::Feature),
            "task" => Ok(Self::Task),
            "epic" => Ok(Self::Epic),
            "chore" => Ok(Self::Chore),
            other => Err(format!("invalid type '{other}'")),
        }
    }
}

/// Check that `priority` is in the accepted range.
///
/// # Errors
///
/// Returns a message naming the valid range when it is not.
pub fn validate_priority(priority: u8) -> Result<u8, String> {
    if (MIN_PRIORITY..=MAX_PRIORITY).contains(&priority) {
        Ok(priority)
    } else {
        Err(format!(
            "priority must be between {MIN_PRIORITY} and {MAX_PRIORITY}, got {priority}"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn new_ticket_defaults() {
        let ticket = Ticket::new("a-1111", "Title");
        assert_eq!(ticket.status, TicketStatus::Open);
        assert_eq!(ticket.ticket_type, TicketType::Task);
        assert_eq!(ticket.priority, DEFAULT_PRIORITY);
        assert!(ticket.deps.is_empty());
        assert!(ticket.links.is_empty());
        assert_eq!(ticket.created.timestamp_subsec_nanos(), 0);
    }

    #[rstest]
    #[case("open", TicketStatus::Open)]
    #[case("in_progress", TicketStatus::InProgress)]
    #[case("in-progress", TicketStatus::InProgress)]
    #[case("closed", TicketStatus::Closed)]
    fn status_from_str(#[case] input: &str, #[case] expected: TicketStatus) {
        assert_eq!(input.parse::<TicketStatus>().unwrap(), expected);
    }

    #[test]
    fn status_rejects_unknown() {
        assert!("blocked".parse::<TicketStatus>().is_err());
        assert!("Open".parse::<TicketStatus>().is_err());
    }

    #[test]
    fn status_display_matches_serde() {
        for status in [
            TicketStatus::Open,
            TicketStatus::InProgress,
            TicketStatus::Closed,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
        }
    }

    #[test]
    fn type_round_trips_through_display() {
        for ty in [
            TicketType::Bug,
            TicketType::Feature,
            TicketType::Task,
            TicketType::Epic,
            TicketType::Chore,
        ] {
            assert_eq!(ty.to_string().parse::<TicketType>().unwrap(), ty);
        }
    }

    #[test]
    fn priority_range() {
        assert_eq!(validate_priority(0), Ok(0));
        assert_eq!(validate_priority(4), Ok(4));
        assert!(validate_priority(5).is_err());
    }

    #[test]
    fn json_uses_record_field_names() {
        let mut ticket = Ticket::new("a-1111", "T");
        ticket.external_ref = Some("gh-12".to_string());
        let value = serde_json::to_value(&ticket).unwrap();
        assert_eq!(value["type"], "task");
        assert_eq!(value["external-ref"], "gh-12");
        assert!(value.get("assignee").is_none());
        assert_eq!(value["deps"], serde_json::json!([]));
    }
}
