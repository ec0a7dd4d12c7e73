//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use bulk_mv::prelude::*;
//! ```

// Core
pub use crate::core::config::Config;
pub use crate::core::errors::{BmvError, Result};

// Walker
pub use crate::walker::ignores::{IGNORE_FILENAME, IgnoreSet};
pub use crate::walker::walk::{WalkEntry, collect_files, prune_empty_ancestors, walk};

// Rename
pub use crate::rename::diff::{DiffOutcome, MoveIntent, compute_moves, parse_listing};
pub use crate::rename::transaction::{ApplyReport, RenameTransaction, TransactionConfig};

// Logger
pub use crate::logger::journal::Journal;
