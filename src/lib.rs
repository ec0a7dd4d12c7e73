#![forbid(unsafe_code)]

//! bulk_mv (bmv) — editor-driven bulk file renamer.
//!
//! The flow: walk a directory tree (respecting nested `.gitignore` rules),
//! write the file listing to a scratch file, let an external editor mutate
//! it, then apply the implied renames as one consistent operation. Either
//! every implied move succeeds or the tree is left exactly as it started.
//!
//! # Library usage
//!
//! Use the [`prelude`] for convenient access to the most common types:
//!
//! ```rust,no_run
//! use bulk_mv::prelude::*;
//! ```
//!
//! Individual modules can also be imported directly:
//!
//! ```rust,no_run
//! use bulk_mv::walker::walk::collect_files;
//! use bulk_mv::rename::transaction::{RenameTransaction, TransactionConfig};
//! ```

pub mod prelude;

pub mod core;
#[cfg(feature = "cli")]
pub mod editor;
pub mod logger;
#[cfg(feature = "cli")]
pub mod picker;
pub mod rename;
pub mod walker;
