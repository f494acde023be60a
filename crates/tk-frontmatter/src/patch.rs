//! Targeted rewriting of a single header line.
//!
//! Rewriting a record by parsing it, changing one field and serializing it
//! again would normalize every other header line too. The functions here
//! edit the raw text instead: exactly one `key: value` line inside the header
//! block changes and every other byte of the document is preserved.

use crate::document::DELIMITER;
use crate::{Error, Result};

/// Format a list of values in the inline form used in header lines.
///
/// ```
/// use tk_frontmatter::format_inline_list;
///
/// assert_eq!(format_inline_list(&["a-1", "b-2"]), "[a-1, b-2]");
/// assert_eq!(format_inline_list::<&str>(&[]), "[]");
/// ```
pub fn format_inline_list<S: AsRef<str>>(items: &[S]) -> String {
    let joined = items
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{joined}]")
}

/// Set `key` to `value` inside the header block of `content`.
///
/// If a `key:` line exists in the header it is replaced, keeping its line
/// ending. Otherwise a new line is inserted directly after the opening
/// delimiter. Lines outside the header block are never inspected, so a body
/// line that happens to start with `key:` is left alone.
///
/// # Errors
///
/// Returns [`Error::MissingHeader`] or [`Error::UnterminatedHeader`] if
/// `content` has no complete header block.
pub fn set_field(content: &str, key: &str, value: &str) -> Result<String> {
    let lines: Vec<&str> = content.split_inclusive('\n').collect();

    let open = lines
        .iter()
        .position(|line| strip_eol(line) == DELIMITER)
        .ok_or(Error::MissingHeader)?;
    let close = lines[open + 1..]
        .iter()
        .position(|line| strip_eol(line) == DELIMITER)
        .map(|offset| open + 1 + offset)
        .ok_or(Error::UnterminatedHeader)?;

    let new_line = format!("{key}: {value}");
    let existing = (open + 1..close).find(|&i| is_key_line(lines[i], key));

    let mut out = String::with_capacity(content.len() + new_line.len() + 1);
    for (i, line) in lines.iter().enumerate() {
        if Some(i) == existing {
            out.push_str(&new_line);
            out.push_str(line_ending(line));
            continue;
        }

        out.push_str(line);
        if i == open && existing.is_none() {
            if !line.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&new_line);
            out.push('\n');
        }
    }

    Ok(out)
}

fn is_key_line(line: &str, key: &str) -> bool {
    line.strip_prefix(key)
        .is_some_and(|rest| rest.starts_with(':'))
}

fn strip_eol(line: &str) -> &str {
    line.strip_suffix('\n')
        .map_or(line, |l| l.strip_suffix('\r').unwrap_or(l))
}

fn line_ending(line: &str) -> &str {
    &line[strip_eol(line).len()..]
}
