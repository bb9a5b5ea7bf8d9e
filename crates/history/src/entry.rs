//! One stored history slot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::text;

/// A single text snippet held by the history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    /// Stored text, already normalized and non-blank.
    pub text: String,
    /// When the text first entered the history.
    pub created_at: DateTime<Utc>,
    /// Refreshed whenever the entry is retrieved or re-pushed.
    pub last_used_at: DateTime<Utc>,
    /// UTF-8 length of `text`, cached at insertion time.
    pub size_bytes: usize,
    /// Text up to its first line break, cached for list rows.
    pub preview: String,
}

impl Entry {
    /// Create an entry from normalized text, deriving the cached fields.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let now = Utc::now();
        Self {
            size_bytes: text.len(),
            preview: text::first_line(&text).to_string(),
            created_at: now,
            last_used_at: now,
            text,
        }
    }
}
