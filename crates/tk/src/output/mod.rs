//! Output formatting for CLI commands.
//!
//! This module provides utilities for formatting command output in both
//! human-readable text format and JSON format for programmatic use.
//!
//! Submodules:
//! - [`color`]: Color and styling helpers
//! - [`tree`]: Dependency tree rendering with ASCII/Unicode connectors

pub mod color;
pub mod tree;

use crate::codec::format_timestamp;
use crate::domain::Ticket;
use serde::Serialize;
use std::env;
use std::io::{self, IsTerminal, Write};
use tk_frontmatter::format_inline_list;

pub use color::warning;
pub use tree::{print_dep_tree, write_dep_tree};

use color::{bold, colorize_id, colorize_priority, colorize_status, dimmed};

/// Width the ID column is padded to in list output.
const ID_COLUMN_WIDTH: usize = 8;

/// Output mode for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for programmatic use
    Json,
}

/// Configuration for output formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Whether to use ASCII-only tree connectors instead of Unicode.
    pub use_ascii: bool,
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create a new `OutputConfig` with explicit values.
    #[must_use]
    pub fn new(use_ascii: bool, use_colors: bool) -> Self {
        Self {
            use_ascii,
            use_colors,
        }
    }

    /// Create an `OutputConfig` by reading from environment variables.
    ///
    /// Reads:
    /// - `TK_ASCII`: Set to "1" or "true" for ASCII-only connectors (default: false)
    /// - `NO_COLOR`: Standard env var to disable colors (any value disables colors)
    /// - `TK_COLOR`: Set to "0" or "false" to disable colors (default: true)
    ///
    /// Colors are also disabled when stdout is not a terminal.
    #[must_use]
    pub fn from_env() -> Self {
        let use_ascii = match env::var("TK_ASCII") {
            Ok(v) if v == "1" || v.eq_ignore_ascii_case("true") => true,
            Ok(v) if v == "0" || v.eq_ignore_ascii_case("false") || v.is_empty() => false,
            Ok(v) => {
                tracing::warn!(
                    env_var = "TK_ASCII",
                    value = %v,
                    "Invalid value (expected '1', 'true', '0', or 'false'), using default"
                );
                false
            }
            Err(_) => false,
        };

        // Respect NO_COLOR (https://no-color.org/), with TK_COLOR for explicit control
        let use_colors = env::var_os("NO_COLOR").is_none()
            && env::var("TK_COLOR").map_or(true, |v| v != "0" && !v.eq_ignore_ascii_case("false"))
            && io::stdout().is_terminal();

        Self {
            use_ascii,
            use_colors,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            use_ascii: false,
            use_colors: true,
        }
    }
}

/// A ticket as emitted by `--json` output and `query`.
#[derive(Debug, Serialize)]
pub struct TicketJson<'a> {
    id: &'a str,
    status: &'static str,
    deps: &'a [String],
    links: &'a [String],
    created: String,
    #[serde(rename = "type")]
    ticket_type: &'static str,
    priority: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    assignee: Option<&'a str>,
    #[serde(rename = "external-ref", skip_serializing_if = "Option::is_none")]
    external_ref: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent: Option<&'a str>,
    title: &'a str,
}

impl<'a> From<&'a Ticket> for TicketJson<'a> {
    fn from(ticket: &'a Ticket) -> Self {
        Self {
            id: &ticket.id,
            status: ticket.status.as_str(),
            deps: &ticket.deps,
            links: &ticket.links,
            created: format_timestamp(&ticket.created),
            ticket_type: ticket.ticket_type.as_str(),
            priority: ticket.priority,
            assignee: ticket.assignee.as_deref(),
            external_ref: ticket.external_ref.as_deref(),
            parent: ticket.parent.as_deref(),
            title: &ticket.title,
        }
    }
}

/// Print a value as pretty JSON on stdout.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    writeln!(handle, "{json}")
}

/// Write tickets as JSON, one compact object per line.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json_lines<W: Write>(w: &mut W, tickets: &[Ticket]) -> io::Result<()> {
    for ticket in tickets {
        let line = serde_json::to_string(&TicketJson::from(ticket)).map_err(io::Error::other)?;
        writeln!(w, "{line}")?;
    }
    Ok(())
}

/// Print a list of tickets in the given mode.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn print_tickets(tickets: &[Ticket], mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Json => {
            let json: Vec<TicketJson<'_>> = tickets.iter().map(TicketJson::from).collect();
            print_json(&json)
        }
        OutputMode::Text => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            write_ticket_list(&mut handle, tickets, &OutputConfig::from_env())
        }
    }
}

fn padded_id(id: &str, config: &OutputConfig) -> String {
    colorize_id(&format!("{id:<ID_COLUMN_WIDTH$}"), config)
}

/// Write `<id> [status] - title <- [deps]` lines.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_ticket_list<W: Write>(
    w: &mut W,
    tickets: &[Ticket],
    config: &OutputConfig,
) -> io::Result<()> {
    for ticket in tickets {
        let deps = if ticket.deps.is_empty() {
            String::new()
        } else {
            format!(" <- {}", format_inline_list(&ticket.deps))
        };
        writeln!(
            w,
            "{} [{}] - {}{}",
            padded_id(&ticket.id, config),
            colorize_status(ticket.status, config),
            ticket.title,
            deps
        )?;
    }
    Ok(())
}

/// Write `<id> [status] - title` lines.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_ticket_summaries<W: Write>(
    w: &mut W,
    tickets: &[&Ticket],
    config: &OutputConfig,
) -> io::Result<()> {
    for ticket in tickets {
        writeln!(
            w,
            "{} [{}] - {}",
            padded_id(&ticket.id, config),
            colorize_status(ticket.status, config),
            ticket.title
        )?;
    }
    Ok(())
}

/// Write `<id> [Pn][status] - title` lines, optionally followed by
/// ` <- [blockers]` for each ticket.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_priority_list<W: Write>(
    w: &mut W,
    entries: &[(&Ticket, Vec<&str>)],
    config: &OutputConfig,
) -> io::Result<()> {
    for (ticket, blockers) in entries {
        let suffix = if blockers.is_empty() {
            String::new()
        } else {
            format!(" <- {}", format_inline_list(blockers))
        };
        writeln!(
            w,
            "{} [{}][{}] - {}{}",
            padded_id(&ticket.id, config),
            colorize_priority(ticket.priority, config),
            colorize_status(ticket.status, config),
            ticket.title,
            suffix
        )?;
    }
    Ok(())
}

/// Related tickets shown below a ticket by `show`.
#[derive(Debug, Default)]
pub struct Related<'a> {
    /// Title of the parent ticket, when it exists.
    pub parent_title: Option<&'a str>,
    /// Unclosed deps of the ticket.
    pub blockers: Vec<&'a Ticket>,
    /// Unclosed tickets that depend on the ticket.
    pub blocking: Vec<&'a Ticket>,
    /// Tickets whose parent is the ticket.
    pub children: Vec<&'a Ticket>,
    /// Existing tickets in the ticket's links.
    pub linked: Vec<&'a Ticket>,
}

/// Write a ticket in record layout followed by its relationship sections.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_ticket_details<W: Write>(
    w: &mut W,
    ticket: &Ticket,
    related: &Related<'_>,
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(w, "---")?;
    writeln!(w, "id: {}", colorize_id(&ticket.id, config))?;
    writeln!(w, "status: {}", colorize_status(ticket.status, config))?;
    writeln!(w, "deps: {}", format_inline_list(&ticket.deps))?;
    writeln!(w, "links: {}", format_inline_list(&ticket.links))?;
    writeln!(w, "created: {}", format_timestamp(&ticket.created))?;
    writeln!(w, "type: {}", ticket.ticket_type)?;
    writeln!(w, "priority: {}", ticket.priority)?;
    if let Some(assignee) = &ticket.assignee {
        writeln!(w, "assignee: {assignee}")?;
    }
    if let Some(external_ref) = &ticket.external_ref {
        writeln!(w, "external-ref: {external_ref}")?;
    }
    if let Some(parent) = &ticket.parent {
        match related.parent_title {
            Some(title) => writeln!(
                w,
                "parent: {parent}  {}",
                dimmed(&format!("# {title}"), config)
            )?,
            None => writeln!(w, "parent: {parent}")?,
        }
    }
    writeln!(w, "---")?;
    writeln!(w, "{}", bold(&format!("# {}", ticket.title), config))?;

    if !ticket.body.is_empty() {
        writeln!(w)?;
        write!(w, "{}", ticket.body)?;
        if !ticket.body.ends_with('\n') {
            writeln!(w)?;
        }
    }

    for (heading, tickets) in [
        ("Blockers", &related.blockers),
        ("Blocking", &related.blocking),
        ("Children", &related.children),
        ("Linked", &related.linked),
    ] {
        if tickets.is_empty() {
            continue;
        }
        writeln!(w)?;
        writeln!(w, "{}", bold(&format!("## {heading}"), config))?;
        writeln!(w)?;
        for other in tickets {
            writeln!(
                w,
                "- {} [{}] {}",
                colorize_id(&other.id, config),
                colorize_status(other.status, config),
                other.title
            )?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TicketStatus;
    use chrono::{TimeZone, Utc};

    fn plain() -> OutputConfig {
        OutputConfig::new(false, false)
    }

    fn ticket(id: &str, title: &str) -> Ticket {
        let mut ticket = Ticket::new(id, title);
        ticket.created = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        ticket
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn ticket_list_lines() {
        let mut a = ticket("a-1111", "First");
        a.deps = vec!["b-2222".to_string()];
        let b = ticket("b-2222", "Second");

        let out = render(|w| write_ticket_list(w, &[a, b], &plain()));

        assert_eq!(
            out,
            "a-1111   [open] - First <- [b-2222]\nb-2222   [open] - Second\n"
        );
    }

    #[test]
    fn summaries_omit_deps() {
        let mut a = ticket("a-1111", "Done thing");
        a.status = TicketStatus::Closed;
        a.deps = vec!["b-2222".to_string()];

        let out = render(|w| write_ticket_summaries(w, &[&a], &plain()));

        assert_eq!(out, "a-1111   [closed] - Done thing\n");
    }

    #[test]
    fn priority_list_with_blockers() {
        let mut a = ticket("a-1111", "First");
        a.priority = 0;
        a.status = TicketStatus::InProgress;

        let out = render(|w| write_priority_list(w, &[(&a, vec!["b-2222"])], &plain()));

        assert_eq!(out, "a-1111   [P0][in_progress] - First <- [b-2222]\n");
    }

    #[test]
    fn details_annotate_parent_and_list_sections() {
        let mut a = ticket("a-1111", "Child");
        a.parent = Some("p-0000".to_string());
        a.body = "Body text".to_string();
        let blocker = ticket("b-2222", "Blocker");
        let related = Related {
            parent_title: Some("Epic"),
            blockers: vec![&blocker],
            ..Related::default()
        };

        let out = render(|w| write_ticket_details(w, &a, &related, &plain()));

        assert!(out.contains("parent: p-0000  # Epic\n"));
        assert!(out.contains("---\n# Child\n\nBody text\n"));
        assert!(out.ends_with("\n## Blockers\n\n- b-2222 [open] Blocker\n"));
        assert!(!out.contains("## Blocking"));
    }

    #[test]
    fn json_lines_are_compact_objects() {
        let mut a = ticket("a-1111", "First");
        a.assignee = Some("alice".to_string());

        let out = render(|w| write_json_lines(w, &[a]));
        let value: serde_json::Value = serde_json::from_str(out.trim_end()).unwrap();

        assert_eq!(out.lines().count(), 1);
        assert_eq!(value["id"], "a-1111");
        assert_eq!(value["created"], "2024-05-01T12:00:00Z");
        assert_eq!(value["assignee"], "alice");
        assert!(value.get("parent").is_none());
    }
}
