//! Clipboard backends

use copypasta::{ClipboardContext, ClipboardProvider};
use parking_lot::Mutex;

use crate::{Clipboard, Error, Result};

/// Change detection shared by the backends.
///
/// `last_seen` is the previous observation, `last_written` the most recent
/// text this process put on the clipboard itself. A write is suppressed
/// exactly once, standing in for the pasteboard ownership marker platforms
/// offer natively.
#[derive(Debug, Default)]
struct Observation {
    last_seen: Option<String>,
    last_written: Option<String>,
}

impl Observation {
    fn filter(&mut self, current: String) -> Option<String> {
        if self.last_seen.as_deref() == Some(current.as_str()) {
            return None;
        }
        self.last_seen = Some(current.clone());
        if self.last_written.as_deref() == Some(current.as_str()) {
            self.last_written = None;
            return None;
        }
        Some(current)
    }
}

/// The platform clipboard.
///
/// A fresh backend context is constructed per call and never held across
/// an await, which keeps the type `Send + Sync` for use from any task.
#[derive(Default)]
pub struct SystemClipboard {
    observation: Mutex<Observation>,
}

impl SystemClipboard {
    /// Connect to the platform clipboard.
    ///
    /// Opens the backend once so a missing display server surfaces at
    /// daemon startup rather than on the first poll.
    pub fn new() -> Result<Self> {
        ClipboardContext::new().map_err(|err| Error::Backend(err.to_string()))?;
        Ok(Self::default())
    }
}

impl Clipboard for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        let mut ctx = ClipboardContext::new().map_err(|err| Error::Backend(err.to_string()))?;
        ctx.set_contents(text.to_string())
            .map_err(|err| Error::Backend(err.to_string()))?;
        self.observation.lock().last_written = Some(text.to_string());
        Ok(())
    }

    fn poll_new_text(&self) -> Result<Option<String>> {
        let mut ctx = ClipboardContext::new().map_err(|err| Error::Backend(err.to_string()))?;
        let current = match ctx.get_contents() {
            Ok(text) => text,
            // An empty clipboard reads as an error on some platforms.
            Err(_) => return Ok(None),
        };
        Ok(self.observation.lock().filter(current))
    }
}

/// In-memory clipboard with the same observation semantics, for tests and
/// headless hosts.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
    observation: Mutex<Observation>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place text on the clipboard the way an external application would.
    pub fn set_external(&self, text: &str) {
        *self.contents.lock() = Some(text.to_string());
    }

    /// Current contents, for assertions.
    pub fn contents(&self) -> Option<String> {
        self.contents.lock().clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        *self.contents.lock() = Some(text.to_string());
        self.observation.lock().last_written = Some(text.to_string());
        Ok(())
    }

    fn poll_new_text(&self) -> Result<Option<String>> {
        let current = match self.contents.lock().clone() {
            Some(text) => text,
            None => return Ok(None),
        };
        Ok(self.observation.lock().filter(current))
    }
}
