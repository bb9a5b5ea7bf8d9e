//! Command resolution
//!
//! The single mapping from parsed commands to store operations and reply
//! text. The socket server and the interactive shell both resolve through
//! here, so command semantics cannot diverge between entry points.

use std::sync::Arc;

use clipboard::Clipboard;
use history::{text, Entry, HistoryStore, MAX_TEXT_BYTES};
use ipc::Command;
use tracing::{debug, warn};

const VERSION_LINE: &str = concat!("clipring ", env!("CARGO_PKG_VERSION"), "\n");

/// Resolves one command against the store and formats the exact reply.
///
/// Index-taking commands are asymmetric on purpose: DEL/UP/DOWN/TOP only
/// reject an argument that fails to parse and treat an out-of-range index
/// as a silent no-op, while COPY distinguishes `ERR bad index` from
/// `ERR no-such-index`. Callers branch on these strings.
pub struct CommandRouter {
    store: Arc<HistoryStore>,
    clipboard: Arc<dyn Clipboard>,
}

impl CommandRouter {
    pub fn new(store: Arc<HistoryStore>, clipboard: Arc<dyn Clipboard>) -> Self {
        Self { store, clipboard }
    }

    /// Resolve one command to its newline-terminated reply text.
    pub async fn handle(&self, command: Command) -> String {
        debug!(command = command.name(), "dispatch");
        match command {
            Command::Ping => "PONG\n".to_string(),
            Command::Version => VERSION_LINE.to_string(),
            Command::List => self.rows(None).await,
            Command::Find(query) => {
                let query = query
                    .map(|q| q.trim().to_string())
                    .filter(|q| !q.is_empty());
                match query {
                    Some(query) => self.rows(Some(query)).await,
                    None => "ERR missing query\n".to_string(),
                }
            }
            Command::Add(text) => self.add(text).await,
            Command::Copy(arg) => self.copy(arg).await,
            Command::Del(arg) => match parse_index(arg) {
                Some(index) => {
                    if let Ok(index) = usize::try_from(index) {
                        self.store.delete(index).await;
                    }
                    "OK\n".to_string()
                }
                None => "ERR bad index\n".to_string(),
            },
            Command::Clear => {
                self.store.clear().await;
                "OK\n".to_string()
            }
            Command::Up(arg) => match parse_index(arg) {
                Some(index) => {
                    if let Ok(index) = usize::try_from(index) {
                        self.store.move_up(index).await;
                    }
                    "OK\n".to_string()
                }
                None => "ERR bad index\n".to_string(),
            },
            Command::Down(arg) => match parse_index(arg) {
                Some(index) => {
                    if let Ok(index) = usize::try_from(index) {
                        self.store.move_down(index).await;
                    }
                    "OK\n".to_string()
                }
                None => "ERR bad index\n".to_string(),
            },
            Command::Top(arg) => match parse_index(arg) {
                Some(index) => {
                    if let Ok(index) = usize::try_from(index) {
                        self.store.move_top(index).await;
                    }
                    "OK\n".to_string()
                }
                None => "ERR bad index\n".to_string(),
            },
            // Shutdown is signaled by the server before routing; a direct
            // caller still gets the acknowledgment.
            Command::Quit => "OK\n".to_string(),
            Command::Unknown(token) => {
                if !token.is_empty() {
                    debug!(token = %token, "unknown command");
                }
                "ERR unknown\n".to_string()
            }
        }
    }

    /// LIST and FIND share one row pipeline; FIND filters it.
    async fn rows(&self, query: Option<String>) -> String {
        let entries = self.store.list().await;
        let needle = query.map(|q| q.to_lowercase());
        let mut out = String::new();
        for (index, entry) in entries.iter().enumerate() {
            if let Some(needle) = &needle {
                let hit = entry.preview.to_lowercase().contains(needle)
                    || entry.text.to_lowercase().contains(needle);
                if !hit {
                    continue;
                }
            }
            out.push_str(&format_row(index, entry));
        }
        if out.is_empty() {
            "EMPTY\n".to_string()
        } else {
            out
        }
    }

    async fn add(&self, arg: Option<String>) -> String {
        let raw = match arg {
            Some(raw) => raw,
            None => return "ERR missing text\n".to_string(),
        };
        let text = text::normalize(&raw);
        if text::is_blank(&text) {
            return "ERR blank\n".to_string();
        }
        if text.len() > MAX_TEXT_BYTES {
            return "ERR oversize\n".to_string();
        }
        self.store.push(text).await;
        "OK\n".to_string()
    }

    async fn copy(&self, arg: Option<String>) -> String {
        let index = match parse_index(arg) {
            Some(index) => index,
            None => return "ERR bad index\n".to_string(),
        };
        let entry = match usize::try_from(index) {
            Ok(index) => self.store.get(index).await.map(|entry| (index, entry)),
            Err(_) => None,
        };
        match entry {
            Some((index, entry)) => {
                if let Err(err) = self.clipboard.write_text(&entry.text) {
                    warn!("clipboard write failed: {err}");
                }
                self.store.touch(index).await;
                "OK\n".to_string()
            }
            None => "ERR no-such-index\n".to_string(),
        }
    }
}

/// Parse an index argument exactly as written: no trimming, signed so a
/// negative lands in the out-of-range branch rather than the parse error.
fn parse_index(arg: Option<String>) -> Option<i64> {
    arg?.parse().ok()
}

/// One list row: `<index>  "<escaped preview>"  <size>[ · <lineCount>L]`.
fn format_row(index: usize, entry: &Entry) -> String {
    let preview = text::escape_preview(&entry.preview);
    let mut row = format!(
        "{index}  \"{preview}\"  {}",
        text::human_bytes(entry.size_bytes)
    );
    let lines = text::line_count(&entry.text);
    if lines > 1 {
        row.push_str(&format!(" · {lines}L"));
    }
    row.push('\n');
    row
}

#[cfg(test)]
mod tests {
    use clipboard::MemoryClipboard;

    use super::*;

    fn fixture() -> (CommandRouter, Arc<HistoryStore>, Arc<MemoryClipboard>) {
        let store = Arc::new(HistoryStore::new(10));
        let clipboard = Arc::new(MemoryClipboard::new());
        let router = CommandRouter::new(store.clone(), clipboard.clone());
        (router, store, clipboard)
    }

    async fn send(router: &CommandRouter, line: &str) -> String {
        router.handle(ipc::parse_line(line)).await
    }

    #[tokio::test]
    async fn ping_pongs() {
        let (router, _, _) = fixture();
        assert_eq!(send(&router, "PING").await, "PONG\n");
    }

    #[tokio::test]
    async fn version_names_the_daemon() {
        let (router, _, _) = fixture();
        let reply = send(&router, "VERSION").await;
        assert!(reply.starts_with("clipring "));
        assert!(reply.ends_with('\n'));
    }

    #[tokio::test]
    async fn empty_list_is_the_empty_literal() {
        let (router, _, _) = fixture();
        assert_eq!(send(&router, "LIST").await, "EMPTY\n");
    }

    #[tokio::test]
    async fn list_rows_carry_index_preview_and_size() {
        let (router, _, _) = fixture();
        assert_eq!(send(&router, "ADD hello").await, "OK\n");
        assert_eq!(send(&router, "LIST").await, "0  \"hello\"  5B\n");

        assert_eq!(send(&router, "ADD newer").await, "OK\n");
        assert_eq!(
            send(&router, "LIST").await,
            "0  \"newer\"  5B\n1  \"hello\"  5B\n"
        );
    }

    #[tokio::test]
    async fn multiline_text_lists_first_line_and_count() {
        let (router, _, _) = fixture();
        let reply = router
            .handle(Command::Add(Some("line1\nline2".into())))
            .await;
        assert_eq!(reply, "OK\n");
        assert_eq!(send(&router, "LIST").await, "0  \"line1\"  11B · 2L\n");
    }

    #[tokio::test]
    async fn list_escapes_quotes_in_previews() {
        let (router, _, _) = fixture();
        send(&router, r#"ADD say "hi""#).await;
        assert_eq!(send(&router, "LIST").await, "0  \"say \\\"hi\\\"\"  8B\n");
    }

    #[tokio::test]
    async fn add_validates_presence_blank_and_size() {
        let (router, store, _) = fixture();
        assert_eq!(send(&router, "ADD").await, "ERR missing text\n");
        assert_eq!(router.handle(Command::Add(Some(" \t ".into()))).await, "ERR blank\n");
        let oversize = "x".repeat(MAX_TEXT_BYTES + 1);
        assert_eq!(
            router.handle(Command::Add(Some(oversize))).await,
            "ERR oversize\n"
        );
        assert!(store.is_empty().await);

        let exactly_max = "y".repeat(MAX_TEXT_BYTES);
        assert_eq!(router.handle(Command::Add(Some(exactly_max))).await, "OK\n");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn add_promotes_duplicates() {
        let (router, store, _) = fixture();
        send(&router, "ADD first").await;
        send(&router, "ADD second").await;
        send(&router, "ADD first").await;
        assert_eq!(store.len().await, 2);
        assert_eq!(store.get(0).await.unwrap().text, "first");
    }

    #[tokio::test]
    async fn copy_writes_the_clipboard_and_touches() {
        let (router, store, clipboard) = fixture();
        send(&router, "ADD hello").await;
        let before = store.get(0).await.unwrap().last_used_at;

        assert_eq!(send(&router, "COPY 0").await, "OK\n");
        assert_eq!(clipboard.contents(), Some("hello".to_string()));
        assert!(store.get(0).await.unwrap().last_used_at >= before);
    }

    #[tokio::test]
    async fn copy_distinguishes_unparseable_from_out_of_range() {
        let (router, _, clipboard) = fixture();
        send(&router, "ADD only").await;

        assert_eq!(send(&router, "COPY abc").await, "ERR bad index\n");
        assert_eq!(send(&router, "COPY").await, "ERR bad index\n");
        assert_eq!(send(&router, "COPY 99").await, "ERR no-such-index\n");
        assert_eq!(send(&router, "COPY -1").await, "ERR no-such-index\n");
        assert_eq!(clipboard.contents(), None);
    }

    #[tokio::test]
    async fn del_noops_out_of_range_but_rejects_garbage() {
        let (router, store, _) = fixture();
        send(&router, "ADD keep").await;

        assert_eq!(send(&router, "DEL 99").await, "OK\n");
        assert_eq!(send(&router, "DEL -3").await, "OK\n");
        assert_eq!(store.len().await, 1);

        assert_eq!(send(&router, "DEL abc").await, "ERR bad index\n");
        assert_eq!(send(&router, "DEL").await, "ERR bad index\n");

        assert_eq!(send(&router, "DEL 0").await, "OK\n");
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn reorder_commands_share_the_del_taxonomy() {
        let (router, store, _) = fixture();
        for text in ["c", "b", "a"] {
            router.handle(Command::Add(Some(text.into()))).await;
        }

        assert_eq!(send(&router, "UP abc").await, "ERR bad index\n");
        assert_eq!(send(&router, "UP 99").await, "OK\n");
        assert_eq!(send(&router, "DOWN 99").await, "OK\n");
        assert_eq!(send(&router, "TOP 99").await, "OK\n");

        assert_eq!(send(&router, "UP 2").await, "OK\n");
        assert_eq!(store.get(1).await.unwrap().text, "c");
        assert_eq!(send(&router, "DOWN 0").await, "OK\n");
        assert_eq!(store.get(0).await.unwrap().text, "c");
        assert_eq!(send(&router, "TOP 2").await, "OK\n");
        assert_eq!(store.get(0).await.unwrap().text, "b");
    }

    #[tokio::test]
    async fn find_filters_but_keeps_original_indices() {
        let (router, _, _) = fixture();
        send(&router, "ADD apple pie").await;
        send(&router, "ADD banana").await;

        assert_eq!(send(&router, "FIND apple").await, "1  \"apple pie\"  9B\n");
        assert_eq!(send(&router, "FIND nothing here").await, "EMPTY\n");
    }

    #[tokio::test]
    async fn find_is_case_insensitive_and_reads_full_text() {
        let (router, _, _) = fixture();
        send(&router, "ADD Hello World").await;
        router
            .handle(Command::Add(Some("top\nneedle below".into())))
            .await;

        assert_eq!(send(&router, "FIND hello").await, "1  \"Hello World\"  11B\n");
        // Matches in the body, not the preview.
        assert_eq!(send(&router, "FIND needle").await, "0  \"top\"  16B · 2L\n");
    }

    #[tokio::test]
    async fn find_requires_a_query() {
        let (router, _, _) = fixture();
        assert_eq!(send(&router, "FIND").await, "ERR missing query\n");
        assert_eq!(send(&router, "FIND   ").await, "ERR missing query\n");
        assert_eq!(
            router.handle(Command::Find(Some("  ".into()))).await,
            "ERR missing query\n"
        );
    }

    #[tokio::test]
    async fn clear_empties_and_acknowledges() {
        let (router, store, _) = fixture();
        send(&router, "ADD gone soon").await;
        assert_eq!(send(&router, "CLEAR").await, "OK\n");
        assert!(store.is_empty().await);
        assert_eq!(send(&router, "LIST").await, "EMPTY\n");
    }

    #[tokio::test]
    async fn unknown_commands_and_blank_lines_err() {
        let (router, _, _) = fixture();
        assert_eq!(send(&router, "BOGUS").await, "ERR unknown\n");
        assert_eq!(send(&router, "").await, "ERR unknown\n");
        assert_eq!(send(&router, "   ").await, "ERR unknown\n");
    }

    #[tokio::test]
    async fn quit_is_acknowledged() {
        let (router, _, _) = fixture();
        assert_eq!(send(&router, "QUIT").await, "OK\n");
    }
}
