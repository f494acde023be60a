//! Dependency tree rendering for `tk dep tree` output.

use std::io::{self, Write};

use serde::Serialize;

use super::color::{colorize_id, colorize_status, dimmed};
use super::{OutputConfig, OutputMode, print_json};
use crate::deptree::TreeRow;

/// One tree row in JSON output.
#[derive(Debug, Serialize)]
struct TreeRowJson<'a> {
    id: &'a str,
    status: &'static str,
    title: &'a str,
    depth: usize,
}

/// Print tree rows to stdout.
///
/// Renders a tree like:
/// ```text
/// a-1111 [open] Ship it
/// ├── c-3333 [closed] Write docs
/// └── b-2222 [in_progress] Build
///     └── d-4444 [open] Design
/// ```
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn print_dep_tree(rows: &[TreeRow<'_>], mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Text => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            write_dep_tree(&mut handle, rows, &OutputConfig::from_env())
        }
        OutputMode::Json => {
            let json: Vec<TreeRowJson<'_>> = rows
                .iter()
                .map(|row| TreeRowJson {
                    id: &row.ticket.id,
                    status: row.ticket.status.as_str(),
                    title: &row.ticket.title,
                    depth: row.depth,
                })
                .collect();
            print_json(&json)
        }
    }
}

/// Render tree rows with ASCII art connectors.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_dep_tree<W: Write>(
    w: &mut W,
    rows: &[TreeRow<'_>],
    config: &OutputConfig,
) -> io::Result<()> {
    let (branch, corner, pipe, space) = if config.use_ascii {
        ("|-- ", "`-- ", "|   ", "    ")
    } else {
        ("├── ", "└── ", "│   ", "    ")
    };

    for row in rows {
        let mut prefix = String::new();
        if row.depth > 0 {
            for &has_more in &row.guides {
                prefix.push_str(if has_more { pipe } else { space });
            }
            prefix.push_str(if row.is_last { corner } else { branch });
        }

        let ticket = row.ticket;
        let title = if ticket.title.is_empty() {
            String::new()
        } else {
            format!(" {}", ticket.title)
        };

        writeln!(
            w,
            "{}{} [{}]{}",
            dimmed(&prefix, config),
            colorize_id(&ticket.id, config),
            colorize_status(ticket.status, config),
            title
        )?;
    }

    Ok(())
}
