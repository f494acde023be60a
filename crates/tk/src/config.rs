//! Configuration management for tk.
//!
//! Tickets live in a tickets directory, located as follows:
//!
//! 1. the `--dir` flag, or the `TK_DIR` environment variable (handled by
//!    the CLI parser);
//! 2. otherwise the nearest `.tickets/` directory in the working directory
//!    or one of its ancestors;
//! 3. otherwise `.tickets/` in the working directory, created on the first
//!    write.
//!
//! An optional `config.yaml` inside the tickets directory holds settings:
//!
//! ```yaml
//! id-prefix: nw
//! default-assignee: alice
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default tickets directory name.
pub const TICKETS_DIR_NAME: &str = ".tickets";

/// Configuration file name inside the tickets directory.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Environment variable naming the tickets directory.
pub const TICKETS_DIR_ENV: &str = "TK_DIR";

/// Maximum number of parent directories searched for `.tickets/`.
pub const MAX_TRAVERSAL_DEPTH: usize = 256;

/// Settings loaded from `config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct TkConfig {
    /// Prefix for generated IDs. Derived from the project directory name
    /// when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_prefix: Option<String>,

    /// Assignee for new tickets when `--assignee` is not given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_assignee: Option<String>,
}

impl TkConfig {
    /// Load configuration from `path`. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file exists but cannot be read or
    /// parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(Error::Config(format!(
                    "cannot read {}: {e}",
                    path.display()
                )));
            }
        };

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| Error::Config(format!("invalid {}: {e}", path.display())))?;
        tracing::debug!(path = %path.display(), ?config, "loaded configuration");
        Ok(config)
    }
}

/// Search `start_dir` and its ancestors for a directory containing
/// `.tickets/`. Returns the directory that contains it.
pub fn find_tickets_root(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    let mut depth = 0;

    loop {
        if current.join(TICKETS_DIR_NAME).is_dir() {
            return Some(current);
        }

        depth += 1;
        if depth > MAX_TRAVERSAL_DEPTH || !current.pop() {
            return None;
        }
    }
}

/// Locate the tickets directory for `working_dir`.
///
/// An explicit directory wins and is taken relative to `working_dir`.
#[must_use]
pub fn resolve_tickets_dir(working_dir: &Path, explicit: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit {
        return working_dir.join(dir);
    }

    find_tickets_root(working_dir)
        .unwrap_or_else(|| working_dir.to_path_buf())
        .join(TICKETS_DIR_NAME)
}
