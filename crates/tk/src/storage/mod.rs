//! Storage abstraction layer for tk.
//!
//! Tickets live one per file in a tickets directory (usually `.tickets/`),
//! each named `<id>.md`. The [`TicketStore`] trait is the interface the
//! command layer works against; [`FileStore`] is the implementation over a
//! real directory.
//!
//! # Architecture
//!
//! Every read goes to disk; nothing is cached between calls. Every write
//! that replaces an existing record stages the new content in a temporary
//! file next to it and renames it into place, so a reader never observes a
//! half-written record. There is no locking: two processes writing the same
//! record race, and the last rename wins.
//!
//! Identifiers passed as `id_or_partial` go through the
//! [`Resolver`](crate::resolver::Resolver) and may be any unambiguous
//! substring of a ticket ID.
//!
//! # Example
//!
//! ```no_run
//! use tk::domain::Ticket;
//! use tk::storage::{FileStore, TicketStore};
//!
//! fn main() -> anyhow::Result<()> {
//!     let store = FileStore::new(".tickets");
//!
//!     let ticket = Ticket::new("nw-5c46", "Write the parser");
//!     store.create(&ticket)?;
//!
//!     store.update_field("5c46", "status", "in_progress")?;
//!     let loaded = store.get("5c46")?;
//!     println!("{} is {}", loaded.id, loaded.status);
//!     Ok(())
//! }
//! ```

use crate::domain::Ticket;
use crate::error::Result;
use std::path::{Path, PathBuf};

mod file;

pub use file::FileStore;

/// Core storage trait for ticket records.
///
/// The trait is object safe so the application can hold a
/// `Box<dyn TicketStore>`.
///
/// # Method Categories
///
/// - **CRUD**: `create`, `get`, `update`, `delete`
/// - **Targeted edits**: `update_field`, `append`
/// - **Queries**: `list`, `list_by_mod_time`, `exists`, `resolve`
/// - **Raw access**: `path`, `read_raw`
///
/// # Error Handling
///
/// - `NotFound` / `Ambiguous`: the identifier did not resolve to one ticket
/// - `AlreadyExists`: `create` found a record with the same ID
/// - `Malformed`: a record could not be parsed
/// - `Persistence`: a filesystem operation failed
pub trait TicketStore {
    /// The tickets directory.
    fn dir(&self) -> &Path;

    /// Resolve a full or partial identifier to a ticket ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `Ambiguous` as described in
    /// [`Resolver::resolve`](crate::resolver::Resolver::resolve).
    fn resolve(&self, id_or_partial: &str) -> Result<String>;

    /// Path of the record for a full or partial identifier.
    ///
    /// # Errors
    ///
    /// Returns resolution errors.
    fn path(&self, id_or_partial: &str) -> Result<PathBuf>;

    /// Whether a record with exactly this ID exists. No partial matching.
    fn exists(&self, id: &str) -> bool;

    /// Write a new record, creating the tickets directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyExists` if a record with the ticket's ID is present,
    /// or `Persistence` if the directory or file cannot be written.
    fn create(&self, ticket: &Ticket) -> Result<()>;

    /// Load the ticket named by a full or partial identifier.
    ///
    /// # Errors
    ///
    /// Returns resolution errors, `Persistence` if the file cannot be read,
    /// or `Malformed` if it cannot be parsed.
    fn get(&self, id_or_partial: &str) -> Result<Ticket>;

    /// Load every well-formed ticket. Malformed records are skipped.
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if the directory cannot be enumerated. A missing
    /// directory yields an empty list.
    fn list(&self) -> Result<Vec<Ticket>>;

    /// Like [`list`](Self::list), most recently modified first, keeping at
    /// most `limit` tickets (`0` keeps all).
    ///
    /// # Errors
    ///
    /// Same as [`list`](Self::list).
    fn list_by_mod_time(&self, limit: usize) -> Result<Vec<Ticket>>;

    /// Replace the record for `ticket.id` with the serialized ticket.
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if staging or renaming fails. The previous
    /// record is left intact in that case.
    fn update(&self, ticket: &Ticket) -> Result<()>;

    /// Set one header field, leaving every other byte of the record alone.
    /// Returns the resolved ID.
    ///
    /// # Errors
    ///
    /// Returns resolution errors, `Malformed` if the record has no header
    /// block, or `Persistence` on IO failure.
    fn update_field(&self, id_or_partial: &str, field: &str, value: &str) -> Result<String>;

    /// Remove a record. Returns the resolved ID. References held by other
    /// tickets are not checked.
    ///
    /// # Errors
    ///
    /// Returns resolution errors or `Persistence` if removal fails.
    fn delete(&self, id_or_partial: &str) -> Result<String>;

    /// The resolved ID and the unparsed record text.
    ///
    /// # Errors
    ///
    /// Returns resolution errors or `Persistence` if the file cannot be read.
    fn read_raw(&self, id_or_partial: &str) -> Result<(String, String)>;

    /// Append `text` to the end of a record. Returns the resolved ID.
    ///
    /// # Errors
    ///
    /// Returns resolution errors or `Persistence` on IO failure.
    fn append(&self, id_or_partial: &str, text: &str) -> Result<String>;
}
