//! Splitting documents into header block and body.

use crate::{Error, Result};

/// Line that opens and closes the header block.
pub const DELIMITER: &str = "---";

/// A document split into its header block and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Raw lines between the opening and closing delimiters.
    pub header: Vec<String>,

    /// Lines after the closing delimiter, joined with `\n`.
    pub body: String,
}

impl Document {
    /// The header block joined into a single string, one line per entry.
    #[must_use]
    pub fn header_text(&self) -> String {
        self.header.join("\n")
    }
}

/// Split `content` into header and body.
///
/// Lines before the opening delimiter are ignored. Line endings (`\n` or
/// `\r\n`) are normalized away.
///
/// # Errors
///
/// Returns [`Error::MissingHeader`] if no line equals [`DELIMITER`], and
/// [`Error::UnterminatedHeader`] if the header is never closed.
pub fn split(content: &str) -> Result<Document> {
    let mut lines = content.lines();

    if !lines.by_ref().any(|line| line == DELIMITER) {
        return Err(Error::MissingHeader);
    }

    let mut header = Vec::new();
    let mut closed = false;
    for line in lines.by_ref() {
        if line == DELIMITER {
            closed = true;
            break;
        }
        header.push(line.to_string());
    }

    if !closed {
        return Err(Error::UnterminatedHeader);
    }

    let body = lines.collect::<Vec<_>>().join("\n");
    Ok(Document { header, body })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_header_and_body() {
        let doc = split("---\nid: a-1\nstatus: open\n---\n# Title\n\nBody\n").unwrap();
        assert_eq!(doc.header, vec!["id: a-1", "status: open"]);
        assert_eq!(doc.body, "# Title\n\nBody");
    }

    #[test]
    fn split_empty_body() {
        let doc = split("---\nid: a-1\n---\n").unwrap();
        assert_eq!(doc.header, vec!["id: a-1"]);
        assert_eq!(doc.body, "");
    }

    #[test]
    fn split_ignores_preamble() {
        let doc = split("stray\n---\nid: a-1\n---\nbody").unwrap();
        assert_eq!(doc.header_text(), "id: a-1");
        assert_eq!(doc.body, "body");
    }

    #[test]
    fn split_keeps_later_delimiters_in_body() {
        let doc = split("---\nid: a-1\n---\nabove\n---\nbelow").unwrap();
        assert_eq!(doc.body, "above\n---\nbelow");
    }

    #[test]
    fn split_crlf() {
        let doc = split("---\r\nid: a-1\r\n---\r\n# T\r\n").unwrap();
        assert_eq!(doc.header, vec!["id: a-1"]);
        assert_eq!(doc.body, "# T");
    }

    #[test]
    fn split_missing_header() {
        assert!(matches!(split("# Just a title\n"), Err(Error::MissingHeader)));
        assert!(matches!(split(""), Err(Error::MissingHeader)));
    }

    #[test]
    fn split_unterminated_header() {
        assert!(matches!(
            split("---\nid: a-1\nstatus: open\n"),
            Err(Error::UnterminatedHeader)
        ));
    }
}
