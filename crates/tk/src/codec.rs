//! Conversion between [`Ticket`] values and record text.
//!
//! A record is a header block of `key: value` lines followed by a markdown
//! body whose first `# ` heading is the ticket title:
//!
//! ```text
//! ---
//! id: nw-5c46
//! status: open
//! deps: [nw-1a2b]
//! links: []
//! created: 2024-05-01T12:00:00Z
//! type: task
//! priority: 2
//! ---
//! # Write the parser
//!
//! Body text.
//! ```
//!
//! [`format`] always emits the header fields in the order above, followed by
//! `assignee`, `external-ref` and `parent` when they are set.

use crate::domain::{
    DEFAULT_PRIORITY, MAX_PRIORITY, MIN_PRIORITY, Ticket, TicketStatus, TicketType,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use std::borrow::Cow;
use std::fmt::Write as _;
use thiserror::Error;
use tk_frontmatter::{DELIMITER, format_inline_list};

/// Reasons a record cannot be turned into a [`Ticket`].
#[derive(Debug, Error)]
pub enum CodecError {
    /// The header block is missing or unterminated.
    #[error(transparent)]
    Frontmatter(#[from] tk_frontmatter::Error),

    /// The header block is not valid YAML for a ticket.
    #[error("invalid header: {0}")]
    Header(#[from] serde_yaml::Error),
}

#[derive(Debug, Deserialize)]
struct Header {
    id: String,
    #[serde(default)]
    status: TicketStatus,
    #[serde(default)]
    deps: Option<Vec<String>>,
    #[serde(default)]
    links: Option<Vec<String>>,
    #[serde(default)]
    created: Option<String>,
    #[serde(rename = "type", default)]
    ticket_type: TicketType,
    #[serde(default)]
    priority: Option<i64>,
    #[serde(default)]
    assignee: Option<String>,
    #[serde(rename = "external-ref", default)]
    external_ref: Option<String>,
    #[serde(default)]
    parent: Option<String>,
}

/// Parse record text into a ticket.
///
/// # Errors
///
/// Returns a [`CodecError`] when the header block is missing or is not
/// valid YAML with an `id`.
///
/// A missing or unparseable `created` becomes the Unix epoch and an
/// out-of-range `priority` becomes the default; both are logged.
pub fn parse(content: &str) -> Result<Ticket, CodecError> {
    let document = tk_frontmatter::split(content)?;
    let header: Header = serde_yaml::from_str(&document.header_text())?;

    let created = parse_created(&header.id, header.created.as_deref());
    let priority = header
        .priority
        .map_or(DEFAULT_PRIORITY, |value| parse_priority(&header.id, value));

    let (title, body) = split_title(&document.body);

    Ok(Ticket {
        id: header.id,
        status: header.status,
        deps: header.deps.unwrap_or_default(),
        links: header.links.unwrap_or_default(),
        created,
        ticket_type: header.ticket_type,
        priority,
        assignee: non_empty(header.assignee),
        external_ref: non_empty(header.external_ref),
        parent: non_empty(header.parent),
        title,
        body,
    })
}

/// Render a ticket as record text.
#[must_use]
pub fn format(ticket: &Ticket) -> String {
    let mut out = String::with_capacity(256 + ticket.body.len());

    out.push_str(DELIMITER);
    out.push('\n');
    push_field(&mut out, "id", &ticket.id);
    push_field(&mut out, "status", ticket.status.as_str());
    push_field(&mut out, "deps", &format_inline_list(&ticket.deps));
    push_field(&mut out, "links", &format_inline_list(&ticket.links));
    push_field(&mut out, "created", &format_timestamp(&ticket.created));
    push_field(&mut out, "type", ticket.ticket_type.as_str());
    push_field(&mut out, "priority", &ticket.priority.to_string());
    for (key, value) in [
        ("assignee", &ticket.assignee),
        ("external-ref", &ticket.external_ref),
        ("parent", &ticket.parent),
    ] {
        if let Some(value) = value.as_deref().filter(|v| !v.trim().is_empty()) {
            push_field(&mut out, key, &yaml_scalar(value));
        }
    }
    out.push_str(DELIMITER);
    out.push('\n');

    let _ = writeln!(out, "# {}", ticket.title);
    if !ticket.body.is_empty() {
        out.push('\n');
        out.push_str(&ticket.body);
        if !ticket.body.ends_with('\n') {
            out.push('\n');
        }
    }

    out
}

/// Timestamp in the record's `created` format (`YYYY-MM-DDTHH:MM:SSZ`).
#[must_use]
pub fn format_timestamp(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_created(id: &str, value: Option<&str>) -> DateTime<Utc> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        tracing::warn!(%id, "ticket has no created timestamp, using the epoch");
        return DateTime::<Utc>::UNIX_EPOCH;
    };

    match DateTime::parse_from_rfc3339(value) {
        Ok(created) => created.with_timezone(&Utc),
        Err(e) => {
            tracing::warn!(%id, value, error = %e, "unparseable created timestamp, using the epoch");
            DateTime::<Utc>::UNIX_EPOCH
        }
    }
}

fn parse_priority(id: &str, value: i64) -> u8 {
    match u8::try_from(value) {
        Ok(priority) if (MIN_PRIORITY..=MAX_PRIORITY).contains(&priority) => priority,
        _ => {
            tracing::warn!(%id, priority = value, "priority out of range, using the default");
            DEFAULT_PRIORITY
        }
    }
}

/// Words a YAML reader resolves to null or a boolean.
const RESERVED_WORDS: &[&str] = &["null", "true", "false", "yes", "no", "on", "off", "y", "n"];

/// Render a free-form value so the header reads it back unchanged.
///
/// Text that YAML would take literally is written plain. Anything else is
/// single-quoted, or double-quoted with escapes when it holds control
/// characters or line separators.
fn yaml_scalar(value: &str) -> Cow<'_, str> {
    if is_plain_scalar(value) {
        Cow::Borrowed(value)
    } else if value.chars().any(needs_escape) {
        Cow::Owned(double_quoted(value))
    } else {
        Cow::Owned(format!("'{}'", value.replace('\'', "''")))
    }
}

fn is_plain_scalar(value: &str) -> bool {
    let Some(first) = value.chars().next() else {
        return false;
    };

    first.is_alphabetic()
        && !value.ends_with(char::is_whitespace)
        && !value.ends_with(':')
        && !value.contains(": ")
        && !value.contains(" #")
        && !value.chars().any(needs_escape)
        && !RESERVED_WORDS.iter().any(|word| value.eq_ignore_ascii_case(word))
}

/// Characters YAML treats as line breaks or drops from unquoted text.
fn needs_escape(c: char) -> bool {
    c.is_control() || matches!(c, '\u{2028}' | '\u{2029}' | '\u{feff}')
}

fn double_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if needs_escape(c) => {
                let _ = write!(out, "\\u{:04x}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn push_field(out: &mut String, key: &str, value: &str) {
    out.push_str(key);
    out.push_str(": ");
    out.push_str(value);
    out.push('\n');
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Separate the title heading from the rest of the body.
///
/// Only blank lines may precede the heading; otherwise the record has no
/// title and the whole body is kept.
fn split_title(body: &str) -> (String, String) {
    let lines: Vec<&str> = body.lines().collect();

    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let title = if trimmed == "#" {
            Some("")
        } else {
            trimmed.strip_prefix("# ")
        };
        return match title {
            Some(title) => (
                title.trim().to_string(),
                lines[i + 1..].join("\n").trim().to_string(),
            ),
            None => (String::new(), body.trim().to_string()),
        };
    }

    (String::new(), String::new())
}
