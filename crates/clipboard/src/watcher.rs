//! Clipboard poller feeding the history

use std::sync::Arc;
use std::time::Duration;

use history::{text, HistoryStore, MAX_TEXT_BYTES};
use tracing::{debug, info, warn};

use crate::Clipboard;

/// How often the clipboard is sampled.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(150);

/// Polls a clipboard and pushes new text into the history.
///
/// Change detection lives in the clipboard backend; this loop applies the
/// content rules (normalize, drop blank, drop oversize) and stores what
/// passes. It calls nothing on the store but `push`.
pub struct ClipboardWatcher {
    clipboard: Arc<dyn Clipboard>,
    store: Arc<HistoryStore>,
    interval: Duration,
}

impl ClipboardWatcher {
    pub fn new(clipboard: Arc<dyn Clipboard>, store: Arc<HistoryStore>) -> Self {
        Self {
            clipboard,
            store,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Override the sampling interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run until the owning task is aborted.
    pub async fn run(self) {
        info!(
            interval_ms = self.interval.as_millis() as u64,
            "clipboard watcher started"
        );
        let mut ticker = tokio::time::interval(self.interval);
        loop {
            ticker.tick().await;
            self.tick().await;
        }
    }

    /// One poll: capture new text when it passes the content rules.
    async fn tick(&self) {
        let observed = match self.clipboard.poll_new_text() {
            Ok(Some(text)) => text,
            Ok(None) => return,
            Err(err) => {
                debug!("clipboard poll failed: {err}");
                return;
            }
        };

        let text = text::normalize(&observed);
        if text::is_blank(&text) {
            return;
        }
        if text.len() > MAX_TEXT_BYTES {
            warn!(bytes = text.len(), "skipped clipboard text over the size limit");
            return;
        }

        let preview: String = text::escape_preview(text::first_line(&text))
            .chars()
            .take(40)
            .collect();
        self.store.push(text).await;
        info!(preview = %preview, "captured clipboard text");
    }
}
