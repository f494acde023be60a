//! Atomic file replacement.
//!
//! Files are replaced with the temp-file-then-rename pattern:
//!
//! 1. The new content is written to a temporary file next to the target
//!    (same directory, so the rename never crosses a filesystem).
//! 2. The temporary file is flushed and synced.
//! 3. The temporary file is renamed over the target.
//!
//! On POSIX systems a rename within one filesystem is atomic, so a reader
//! of the target path sees either the complete old content or the complete
//! new content. A crash before step 3 leaves the target untouched; the
//! temporary file may be left behind.
//!
//! # Examples
//!
//! ```no_run
//! use tk_frontmatter::write_atomic;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! write_atomic(".tickets/nw-5c46.md", b"---\nid: nw-5c46\n---\n# Title\n")?;
//! # Ok(())
//! # }
//! ```

use crate::{Error, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Atomically replaces the file at `path` with `contents`.
///
/// # Errors
///
/// Returns [`Error::Stage`] if the temporary file cannot be written and
/// [`Error::Rename`] if the final rename fails. In both cases the target
/// file is unchanged and the temporary file has been removed.
pub fn write_atomic<P: AsRef<Path>>(path: P, contents: &[u8]) -> Result<()> {
    StagedWrite::stage(path, contents)?.commit()
}

/// A fully written temporary file waiting to be renamed over its target.
///
/// Dropping a `StagedWrite` without calling [`commit`](Self::commit)
/// removes the temporary file and leaves the target untouched.
#[derive(Debug)]
pub struct StagedWrite {
    target: PathBuf,
    temp: PathBuf,
    committed: bool,
}

impl StagedWrite {
    /// Write `contents` to the temporary file for `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Stage`] if the temporary file cannot be created,
    /// written or synced.
    pub fn stage<P: AsRef<Path>>(path: P, contents: &[u8]) -> Result<Self> {
        let target = path.as_ref().to_path_buf();
        let temp = make_temp_path(&target);

        if let Err(source) = write_to_temp_file(&temp, contents) {
            // Best-effort cleanup of temp file
            let _ = fs::remove_file(&temp);
            return Err(Error::Stage { path: temp, source });
        }

        tracing::trace!(temp = %temp.display(), bytes = contents.len(), "staged write");
        Ok(Self {
            target,
            temp,
            committed: false,
        })
    }

    /// Path of the temporary file holding the staged content.
    #[must_use]
    pub fn temp_path(&self) -> &Path {
        &self.temp
    }

    /// Path the staged content will replace.
    #[must_use]
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Rename the temporary file over the target.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Rename`] if the rename fails; the temporary file is
    /// removed and the target is unchanged.
    pub fn commit(mut self) -> Result<()> {
        self.committed = true;
        if let Err(source) = fs::rename(&self.temp, &self.target) {
            let _ = fs::remove_file(&self.temp);
            return Err(Error::Rename {
                from: self.temp.clone(),
                to: self.target.clone(),
                source,
            });
        }
        Ok(())
    }
}

impl Drop for StagedWrite {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.temp);
        }
    }
}

/// Creates a temporary file path for atomic write operations.
///
/// The temp path is created by appending `.tmp` to the original filename.
/// If the original path has no extension, `.tmp` is appended directly.
/// If it has an extension, the extension is replaced with `{ext}.tmp`.
fn make_temp_path(path: &Path) -> PathBuf {
    let mut temp_path = path.to_path_buf();
    let new_extension = match path.extension() {
        Some(ext) => {
            let mut new_ext = ext.to_os_string();
            new_ext.push(".tmp");
            new_ext
        }
        None => std::ffi::OsString::from("tmp"),
    };
    temp_path.set_extension(new_extension);
    temp_path
}

fn write_to_temp_file(temp_path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(temp_path)?;
    file.write_all(contents)?;
    file.flush()?;
    file.sync_all()
}
