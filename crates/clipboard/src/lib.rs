//! Clipboard capture for clipring
//!
//! This crate watches the system clipboard and feeds new text into the
//! history, and serves clipboard writes for the COPY command. The daemon
//! talks to a [`Clipboard`] trait object so tests and headless hosts can
//! swap in the in-memory backend.

mod system;
mod watcher;

pub use system::{MemoryClipboard, SystemClipboard};
pub use watcher::{ClipboardWatcher, DEFAULT_POLL_INTERVAL};

/// Result type for clipboard operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for clipboard operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The platform clipboard backend refused the operation.
    #[error("clipboard backend error: {0}")]
    Backend(String),
}

/// Read and write access to one clipboard.
pub trait Clipboard: Send + Sync {
    /// Replace the clipboard contents.
    ///
    /// The write is remembered so [`Clipboard::poll_new_text`] does not
    /// report it back as externally-sourced text.
    fn write_text(&self, text: &str) -> Result<()>;

    /// Text that appeared on the clipboard since the previous poll, or
    /// `None` when nothing new (or only our own write) is present.
    fn poll_new_text(&self) -> Result<Option<String>>;
}
