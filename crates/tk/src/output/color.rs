//! Terminal styling for CLI output.
//!
//! Every helper returns the text untouched when colors are off, so callers
//! never check [`OutputConfig::use_colors`] themselves. Status colors follow
//! progress: open is plain white, `in_progress` yellow, closed green. IDs are
//! cyan; tree connectors and annotations are dimmed.

use colored::{Color, ColoredString, Colorize};

use super::OutputConfig;
use crate::domain::TicketStatus;

fn paint(text: &str, config: &OutputConfig, style: impl FnOnce(&str) -> ColoredString) -> String {
    if config.use_colors {
        style(text).to_string()
    } else {
        text.to_string()
    }
}

/// Yellow text for warnings printed alongside normal output.
pub fn warning(text: &str, config: &OutputConfig) -> String {
    paint(text, config, |t| t.yellow())
}

pub(crate) fn colorize_status(status: TicketStatus, config: &OutputConfig) -> String {
    let color = match status {
        TicketStatus::Open => Color::White,
        TicketStatus::InProgress => Color::Yellow,
        TicketStatus::Closed => Color::Green,
    };
    paint(status.as_str(), config, |t| t.color(color))
}

/// `P<n>`, red and bold for P0, yellow for P1.
pub(crate) fn colorize_priority(priority: u8, config: &OutputConfig) -> String {
    paint(&format!("P{priority}"), config, |t| match priority {
        0 => t.red().bold(),
        1 => t.yellow(),
        _ => t.normal(),
    })
}

pub(crate) fn colorize_id(id: &str, config: &OutputConfig) -> String {
    paint(id, config, |t| t.cyan())
}

pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    paint(text, config, |t| t.dimmed())
}

pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    paint(text, config, |t| t.bold())
}
