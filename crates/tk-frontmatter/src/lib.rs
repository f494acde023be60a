//! Header-block documents for one-file-per-record stores.
//!
//! A document is a block of `key: value` lines fenced by `---` delimiter
//! lines, followed by a free-form body:
//!
//! ```text
//! ---
//! id: nw-5c46
//! status: open
//! ---
//! # Title
//!
//! Body text.
//! ```
//!
//! This crate provides splitting of such documents, targeted rewriting of a
//! single header line without touching the rest of the file, and crash-safe
//! replacement of files on disk.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod atomic;
pub mod document;
pub mod error;
pub mod patch;

pub use atomic::{StagedWrite, write_atomic};
pub use document::{DELIMITER, Document, split};
pub use error::{Error, Result};
pub use patch::{format_inline_list, set_field};
