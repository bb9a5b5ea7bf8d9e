//! Bounded clipboard-text history
//!
//! This crate owns the in-memory history: a capacity-bounded, ordered
//! sequence of text entries where index 0 is always the most recent.
//! Everything else in the system reads and mutates it through
//! [`HistoryStore`], never through direct references to entries.

mod entry;
mod store;
pub mod text;

pub use entry::Entry;
pub use store::HistoryStore;

/// Number of entries the history retains by default.
pub const DEFAULT_CAPACITY: usize = 10;

/// Largest accepted text payload in bytes (256 KiB).
pub const MAX_TEXT_BYTES: usize = 256 * 1024;
