//! tk - a file-based ticket tracker.
//!
//! Each ticket is a Markdown record with a small header block, stored one
//! file per ticket in a `.tickets/` directory. This crate provides the
//! ticket model, the record store, partial-ID resolution and the
//! dependency tree engine, plus the `tk` command-line interface built on
//! top of them.

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod codec;
pub mod deptree;
pub mod domain;
pub mod error;
pub mod id_generation;
pub mod relations;
pub mod resolver;
pub mod storage;

// Public CLI module (needed by binary)
pub mod app;
pub mod cli;
pub mod config;
pub mod output;
