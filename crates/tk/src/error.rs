//! Error types for tk operations.

use crate::id_generation::IdGenerationError;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The error type for tk operations.
#[derive(Debug, Error)]
pub enum Error {
    /// No ticket matches the given identifier.
    #[error("ticket '{id}' not found")]
    NotFound {
        /// The identifier as the caller supplied it.
        id: String,
    },

    /// A partial identifier matches more than one ticket.
    #[error("ambiguous ID '{id}' matches multiple tickets: {}", matches.join(", "))]
    Ambiguous {
        /// The identifier as the caller supplied it.
        id: String,
        /// Every matching ticket ID, in directory enumeration order.
        matches: Vec<String>,
    },

    /// A record with this ID is already present.
    #[error("ticket '{id}' already exists")]
    AlreadyExists {
        /// The colliding ID.
        id: String,
    },

    /// A filesystem operation on the tickets directory failed.
    #[error("failed {operation} {}: {source}", path.display())]
    Persistence {
        /// What the store was doing when the error occurred.
        operation: Operation,
        /// The file or directory involved.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// A record exists but cannot be parsed.
    #[error("malformed ticket {}: {reason}", path.display())]
    Malformed {
        /// Path of the offending record.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// ID generation failed.
    #[error(transparent)]
    IdGeneration(#[from] IdGenerationError),
}

/// Filesystem operations named in [`Error::Persistence`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Creating the tickets directory.
    CreateDir,
    /// Enumerating the tickets directory.
    ReadDir,
    /// Reading a record.
    Read,
    /// Writing a record (or its temporary file).
    Write,
    /// Renaming a temporary file over a record.
    Rename,
    /// Removing a record.
    Remove,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::CreateDir => "creating directory",
            Self::ReadDir => "reading directory",
            Self::Read => "reading",
            Self::Write => "writing",
            Self::Rename => "renaming temporary file to",
            Self::Remove => "removing",
        };
        f.write_str(text)
    }
}

impl Error {
    pub(crate) fn persistence(operation: Operation, path: &Path, source: io::Error) -> Self {
        Self::Persistence {
            operation,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Map a record-format error raised while handling the file at `path`.
    pub(crate) fn from_frontmatter(err: tk_frontmatter::Error, path: &Path) -> Self {
        match err {
            tk_frontmatter::Error::Stage { path, source } => Self::Persistence {
                operation: Operation::Write,
                path,
                source,
            },
            tk_frontmatter::Error::Rename { to, source, .. } => Self::Persistence {
                operation: Operation::Rename,
                path: to,
                source,
            },
            err @ (tk_frontmatter::Error::MissingHeader
            | tk_frontmatter::Error::UnterminatedHeader) => Self::Malformed {
                path: path.to_path_buf(),
                reason: err.to_string(),
            },
        }
    }

    /// Whether this error means the requested ticket does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// A specialized Result type for tk operations.
pub type Result<T> = std::result::Result<T, Error>;
