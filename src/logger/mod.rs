//! Rename activity journaling.

pub mod journal;

pub use journal::{EventType, Journal, JournalEntry, Severity};
