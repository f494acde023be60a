//! Directory-backed ticket store.

use super::TicketStore;
use crate::codec;
use crate::domain::Ticket;
use crate::error::{Error, Operation, Result};
use crate::resolver::{Resolver, TicketEntry, ticket_entries};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tk_frontmatter::{set_field, write_atomic};

/// A [`TicketStore`] over one directory of `<id>.md` records.
#[derive(Debug, Clone)]
pub struct FileStore {
    resolver: Resolver,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created on the
    /// first [`create`](TicketStore::create), not here.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            resolver: Resolver::new(dir),
        }
    }

    /// The resolver used for partial identifiers.
    #[must_use]
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    fn read_file(path: &Path) -> Result<String> {
        fs::read_to_string(path).map_err(|e| Error::persistence(Operation::Read, path, e))
    }

    fn parse_file(path: &Path) -> Result<Ticket> {
        let content = Self::read_file(path)?;
        codec::parse(&content).map_err(|e| Error::Malformed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    fn replace(path: &Path, content: &str) -> Result<()> {
        write_atomic(path, content.as_bytes()).map_err(|e| Error::from_frontmatter(e, path))
    }

    /// Parse `entries` in order, skipping records that cannot be loaded.
    fn load_entries(entries: impl IntoIterator<Item = TicketEntry>) -> Vec<Ticket> {
        entries
            .into_iter()
            .filter_map(|entry| match Self::parse_file(&entry.path) {
                Ok(ticket) => Some(ticket),
                Err(e) => {
                    tracing::warn!(path = %entry.path.display(), error = %e, "skipping unreadable ticket");
                    None
                }
            })
            .collect()
    }
}

impl TicketStore for FileStore {
    fn dir(&self) -> &Path {
        self.resolver.dir()
    }

    fn resolve(&self, id_or_partial: &str) -> Result<String> {
        self.resolver.resolve(id_or_partial)
    }

    fn path(&self, id_or_partial: &str) -> Result<PathBuf> {
        let id = self.resolve(id_or_partial)?;
        Ok(self.resolver.path_for(&id))
    }

    fn exists(&self, id: &str) -> bool {
        self.resolver.path_for(id).is_file()
    }

    fn create(&self, ticket: &Ticket) -> Result<()> {
        let dir = self.dir();
        fs::create_dir_all(dir).map_err(|e| Error::persistence(Operation::CreateDir, dir, e))?;

        let path = self.resolver.path_for(&ticket.id);
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(Error::AlreadyExists {
                    id: ticket.id.clone(),
                });
            }
            Err(e) => return Err(Error::persistence(Operation::Write, &path, e)),
        };

        let content = codec::format(ticket);
        if let Err(e) = file
            .write_all(content.as_bytes())
            .and_then(|()| file.sync_all())
        {
            drop(file);
            let _ = fs::remove_file(&path);
            return Err(Error::persistence(Operation::Write, &path, e));
        }

        tracing::debug!(id = %ticket.id, path = %path.display(), "created ticket");
        Ok(())
    }

    fn get(&self, id_or_partial: &str) -> Result<Ticket> {
        let path = self.path(id_or_partial)?;
        Self::parse_file(&path)
    }

    fn list(&self) -> Result<Vec<Ticket>> {
        let entries = ticket_entries(self.dir())?;
        let tickets = Self::load_entries(entries);
        tracing::debug!(count = tickets.len(), "listed tickets");
        Ok(tickets)
    }

    fn list_by_mod_time(&self, limit: usize) -> Result<Vec<Ticket>> {
        let mut dated: Vec<(SystemTime, TicketEntry)> = ticket_entries(self.dir())?
            .into_iter()
            .filter_map(|entry| match fs::metadata(&entry.path).and_then(|m| m.modified()) {
                Ok(modified) => Some((modified, entry)),
                Err(e) => {
                    tracing::warn!(path = %entry.path.display(), error = %e, "skipping ticket without mtime");
                    None
                }
            })
            .collect();

        dated.sort_by(|(a_time, a), (b_time, b)| b_time.cmp(a_time).then_with(|| a.id.cmp(&b.id)));

        let mut tickets = Self::load_entries(dated.into_iter().map(|(_, entry)| entry));
        if limit > 0 {
            tickets.truncate(limit);
        }
        Ok(tickets)
    }

    fn update(&self, ticket: &Ticket) -> Result<()> {
        let path = self.resolver.path_for(&ticket.id);
        Self::replace(&path, &codec::format(ticket))?;
        tracing::debug!(id = %ticket.id, "updated ticket");
        Ok(())
    }

    fn update_field(&self, id_or_partial: &str, field: &str, value: &str) -> Result<String> {
        let id = self.resolve(id_or_partial)?;
        let path = self.resolver.path_for(&id);

        let content = Self::read_file(&path)?;
        let patched =
            set_field(&content, field, value).map_err(|e| Error::from_frontmatter(e, &path))?;
        Self::replace(&path, &patched)?;

        tracing::debug!(%id, field, value, "updated field");
        Ok(id)
    }

    fn delete(&self, id_or_partial: &str) -> Result<String> {
        let id = self.resolve(id_or_partial)?;
        let path = self.resolver.path_for(&id);
        fs::remove_file(&path).map_err(|e| Error::persistence(Operation::Remove, &path, e))?;
        tracing::debug!(%id, "deleted ticket");
        Ok(id)
    }

    fn read_raw(&self, id_or_partial: &str) -> Result<(String, String)> {
        let id = self.resolve(id_or_partial)?;
        let content = Self::read_file(&self.resolver.path_for(&id))?;
        Ok((id, content))
    }

    fn append(&self, id_or_partial: &str, text: &str) -> Result<String> {
        let (id, mut content) = self.read_raw(id_or_partial)?;
        content.push_str(text);
        Self::replace(&self.resolver.path_for(&id), &content)?;
        tracing::debug!(%id, bytes = text.len(), "appended to ticket");
        Ok(id)
    }
}
