//! Error types for tk-frontmatter operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The error type for tk-frontmatter operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Writing the temporary file for an atomic replace failed.
    #[error("failed to write temporary file {}: {source}", path.display())]
    Stage {
        /// Path of the temporary file.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Renaming the temporary file over the target failed.
    #[error("failed to rename {} to {}: {source}", from.display(), to.display())]
    Rename {
        /// Path of the temporary file.
        from: PathBuf,
        /// Path of the target file.
        to: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// The document has no opening `---` line.
    #[error("missing header block: document has no opening '---' line")]
    MissingHeader,

    /// The header block was opened but never closed.
    #[error("unterminated header block: no closing '---' line")]
    UnterminatedHeader,
}

/// A specialized Result type for tk-frontmatter operations.
pub type Result<T> = std::result::Result<T, Error>;
