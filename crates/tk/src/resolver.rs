//! Resolution of abbreviated ticket identifiers.
//!
//! Users rarely type a full ID. [`Resolver::resolve`] accepts any substring
//! of an ID and maps it to the single ticket it names:
//!
//! 1. If `<dir>/<input>.md` exists, the input is returned unchanged, even
//!    when it is also a substring of other IDs.
//! 2. Otherwise every record in the directory whose ID contains the input
//!    is a candidate. Exactly one candidate is the answer; none is
//!    [`Error::NotFound`] and several is [`Error::Ambiguous`].

use crate::error::{Error, Operation, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File extension of ticket records.
pub const TICKET_EXTENSION: &str = "md";

/// Maps full or partial identifiers to ticket IDs.
#[derive(Debug, Clone)]
pub struct Resolver {
    dir: PathBuf,
}

impl Resolver {
    /// Create a resolver over the records in `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory holding the records.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the record for the exact ID `id`.
    #[must_use]
    pub fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.{TICKET_EXTENSION}"))
    }

    /// Resolve `partial` to a full ticket ID.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if no ID contains `partial` (including when the
    ///   directory does not exist)
    /// - [`Error::Ambiguous`] if several IDs contain it and none equals it
    /// - [`Error::Persistence`] if the directory cannot be enumerated
    pub fn resolve(&self, partial: &str) -> Result<String> {
        if partial.is_empty() {
            return Err(Error::NotFound { id: String::new() });
        }

        if is_plain_name(partial) && self.path_for(partial).is_file() {
            return Ok(partial.to_string());
        }

        let mut matches: Vec<String> = ticket_entries(&self.dir)?
            .into_iter()
            .map(|entry| entry.id)
            .filter(|id| id.contains(partial))
            .collect();

        tracing::trace!(partial, candidates = matches.len(), "resolved by substring");

        match matches.len() {
            0 => Err(Error::NotFound {
                id: partial.to_string(),
            }),
            1 => Ok(matches.remove(0)),
            _ => Err(Error::Ambiguous {
                id: partial.to_string(),
                matches,
            }),
        }
    }

    /// Resolve several identifiers, failing on the first that does not
    /// resolve.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by [`resolve`](Self::resolve).
    pub fn resolve_all<S: AsRef<str>>(&self, partials: &[S]) -> Result<Vec<String>> {
        partials
            .iter()
            .map(|partial| self.resolve(partial.as_ref()))
            .collect()
    }
}

/// A record file found in the tickets directory.
#[derive(Debug, Clone)]
pub(crate) struct TicketEntry {
    pub id: String,
    pub path: PathBuf,
}

/// Enumerate the record files in `dir`, in directory order.
///
/// A missing directory has no entries. Subdirectories, non-UTF-8 names and
/// files without the record extension are ignored.
pub(crate) fn ticket_entries(dir: &Path) -> Result<Vec<TicketEntry>> {
    let read_dir = match fs::read_dir(dir) {
        Ok(read_dir) => read_dir,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(Error::persistence(Operation::ReadDir, dir, e)),
    };

    let mut entries = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|e| Error::persistence(Operation::ReadDir, dir, e))?;
        if entry.file_type().is_ok_and(|ty| ty.is_dir()) {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some(TICKET_EXTENSION) {
            continue;
        }
        let Some(id) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        if id.is_empty() {
            continue;
        }
        entries.push(TicketEntry {
            id: id.to_string(),
            path,
        });
    }

    Ok(entries)
}

/// Whether `id` can name a file directly inside the tickets directory.
fn is_plain_name(id: &str) -> bool {
    !id.contains(['/', '\\']) && id != "." && id != ".."
}
