//! Application context for CLI command execution.
//!
//! This module provides the `App` struct that locates the tickets
//! directory, loads configuration and owns the store every command works
//! against.
//!
//! # Example
//!
//! ```no_run
//! use tk::app::App;
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let app = App::from_directory(Path::new("."), None)?;
//!     for ticket in app.store().list()? {
//!         println!("{}", ticket.id);
//!     }
//!     Ok(())
//! }
//! ```

use crate::config::{CONFIG_FILE_NAME, TkConfig, resolve_tickets_dir};
use crate::domain::Ticket;
use crate::error::Result;
use crate::id_generation::{FALLBACK_PREFIX, prefix_from_dir_name};
use crate::storage::{FileStore, TicketStore};
use std::collections::HashMap;
use std::path::Path;

/// Application context for CLI operations.
pub struct App {
    /// The storage backend (trait object for polymorphism)
    store: Box<dyn TicketStore>,

    /// Settings from `config.yaml`
    config: TkConfig,

    /// Prefix for generated IDs
    prefix: String,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("tickets_dir", &self.store.dir())
            .field("prefix", &self.prefix)
            .field("config", &self.config)
            .field("store", &"<dyn TicketStore>")
            .finish()
    }
}

impl App {
    /// Create an App for `working_dir`.
    ///
    /// `tickets_dir` overrides the directory search (see [`crate::config`]).
    ///
    /// # Errors
    ///
    /// Returns an error if `config.yaml` exists but cannot be loaded.
    pub fn from_directory(working_dir: &Path, tickets_dir: Option<&Path>) -> Result<Self> {
        let dir = resolve_tickets_dir(working_dir, tickets_dir);
        let config = TkConfig::load(&dir.join(CONFIG_FILE_NAME))?;

        let prefix = config.id_prefix.clone().unwrap_or_else(|| {
            dir.parent()
                .and_then(Path::file_name)
                .and_then(|name| name.to_str())
                .map_or_else(|| FALLBACK_PREFIX.to_string(), prefix_from_dir_name)
        });

        tracing::debug!(tickets_dir = %dir.display(), %prefix, "opened tickets directory");
        Ok(Self::new(Box::new(FileStore::new(dir)), config, prefix))
    }

    /// Create an App from its parts.
    #[must_use]
    pub fn new(store: Box<dyn TicketStore>, config: TkConfig, prefix: String) -> Self {
        Self {
            store,
            config,
            prefix,
        }
    }

    /// Get a reference to the store.
    pub fn store(&self) -> &dyn TicketStore {
        self.store.as_ref()
    }

    /// Get the ID prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Assignee for new tickets when none is given.
    #[must_use]
    pub fn default_assignee(&self) -> Option<&str> {
        self.config.default_assignee.as_deref()
    }

    /// Get the path to the tickets directory.
    pub fn tickets_dir(&self) -> &Path {
        self.store.dir()
    }

    /// Every well-formed ticket, keyed by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the tickets directory cannot be listed.
    pub fn ticket_map(&self) -> Result<HashMap<String, Ticket>> {
        Ok(self
            .store
            .list()?
            .into_iter()
            .map(|ticket| (ticket.id.clone(), ticket))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TICKETS_DIR_NAME;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn prefix_comes_from_project_directory() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("new-world");
        fs::create_dir_all(project.join(TICKETS_DIR_NAME)).unwrap();

        let app = App::from_directory(&project, None).unwrap();

        assert_eq!(app.prefix(), "nw");
        assert_eq!(app.tickets_dir(), project.join(TICKETS_DIR_NAME));
        assert_eq!(app.default_assignee(), None);
    }

    #[test]
    fn config_prefix_wins() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(TICKETS_DIR_NAME);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join(CONFIG_FILE_NAME),
            "id-prefix: abc\ndefault-assignee: bob\n",
        )
        .unwrap();

        let app = App::from_directory(temp.path(), None).unwrap();

        assert_eq!(app.prefix(), "abc");
        assert_eq!(app.default_assignee(), Some("bob"));
    }

    #[test]
    fn ticket_map_is_keyed_by_id() {
        let temp = TempDir::new().unwrap();
        let app = App::from_directory(temp.path(), Some(Path::new("t"))).unwrap();
        app.store().create(&Ticket::new("x-0001", "One")).unwrap();

        let map = app.ticket_map().unwrap();

        assert_eq!(map.len(), 1);
        assert_eq!(map["x-0001"].title, "One");
    }
}
