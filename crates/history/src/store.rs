//! Synchronized access to the bounded history

use chrono::Utc;
use tokio::sync::RwLock;

use crate::{Entry, DEFAULT_CAPACITY};

/// Capacity-bounded, order-preserving store of text entries.
///
/// Index 0 is always the most recent entry. Indices are positional, not
/// stable identifiers: every mutation shifts the positions after it.
/// Reads clone snapshots out under a shared lock; mutations take the
/// write lock and apply atomically.
#[derive(Debug)]
pub struct HistoryStore {
    capacity: usize,
    entries: RwLock<Vec<Entry>>,
}

impl HistoryStore {
    /// Create an empty store bounded to `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: RwLock::new(Vec::with_capacity(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Snapshot of all entries, most recent first.
    pub async fn list(&self) -> Vec<Entry> {
        self.entries.read().await.clone()
    }

    /// Entry at `index`, or `None` when out of range.
    pub async fn get(&self, index: usize) -> Option<Entry> {
        self.entries.read().await.get(index).cloned()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Insert `text` at the front, or promote an existing equal entry.
    ///
    /// Callers pass text that is already normalized, non-blank and within
    /// the size limit. Promotion keeps the entry's original `created_at`
    /// and refreshes `last_used_at`. A fresh insert that pushes the length
    /// past the capacity drops the tail entry.
    pub async fn push(&self, text: impl Into<String>) {
        let text = text.into();
        let mut entries = self.entries.write().await;
        if let Some(pos) = entries.iter().position(|e| e.text == text) {
            let mut entry = entries.remove(pos);
            entry.last_used_at = Utc::now();
            entries.insert(0, entry);
            return;
        }
        entries.insert(0, Entry::new(text));
        if entries.len() > self.capacity {
            entries.truncate(self.capacity);
        }
    }

    /// Refresh `last_used_at` at `index`; no-op when out of range.
    pub async fn touch(&self, index: usize) {
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get_mut(index) {
            entry.last_used_at = Utc::now();
        }
    }

    /// Remove the entry at `index`; no-op when out of range.
    pub async fn delete(&self, index: usize) {
        let mut entries = self.entries.write().await;
        if index < entries.len() {
            entries.remove(index);
        }
    }

    /// Swap the entry with its newer neighbor; no-op at index 0 or out of range.
    pub async fn move_up(&self, index: usize) {
        let mut entries = self.entries.write().await;
        if index > 0 && index < entries.len() {
            entries.swap(index, index - 1);
        }
    }

    /// Swap the entry with its older neighbor; no-op at the tail or out of range.
    pub async fn move_down(&self, index: usize) {
        let mut entries = self.entries.write().await;
        if index + 1 < entries.len() {
            entries.swap(index, index + 1);
        }
    }

    /// Move the entry at `index` to the front; no-op when out of range.
    pub async fn move_top(&self, index: usize) {
        let mut entries = self.entries.write().await;
        if index < entries.len() {
            let entry = entries.remove(index);
            entries.insert(0, entry);
        }
    }

    /// Drop every entry.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::*;

    async fn texts(store: &HistoryStore) -> Vec<String> {
        store.list().await.into_iter().map(|e| e.text).collect()
    }

    #[tokio::test]
    async fn push_inserts_most_recent_first() {
        let store = HistoryStore::new(10);
        store.push("first").await;
        store.push("second").await;
        assert_eq!(texts(&store).await, ["second", "first"]);
    }

    #[tokio::test]
    async fn push_never_exceeds_capacity() {
        let store = HistoryStore::new(3);
        for i in 0..10 {
            store.push(format!("text {i}")).await;
        }
        assert_eq!(texts(&store).await, ["text 9", "text 8", "text 7"]);
    }

    #[tokio::test]
    async fn duplicate_push_promotes_without_growing() {
        let store = HistoryStore::new(10);
        store.push("keep me").await;
        store.push("other").await;
        let original = store.get(1).await.unwrap();

        store.push("keep me").await;

        let entries = store.list().await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].text, "keep me");
        assert_eq!(entries[0].created_at, original.created_at);
        assert!(entries[0].last_used_at >= original.last_used_at);
    }

    #[tokio::test]
    async fn promotion_does_not_evict() {
        let store = HistoryStore::new(2);
        store.push("a").await;
        store.push("b").await;
        store.push("a").await;
        assert_eq!(texts(&store).await, ["a", "b"]);
    }

    #[tokio::test]
    async fn get_out_of_range_is_none() {
        let store = HistoryStore::new(10);
        assert!(store.get(0).await.is_none());
        store.push("x").await;
        assert!(store.get(0).await.is_some());
        assert!(store.get(1).await.is_none());
    }

    #[tokio::test]
    async fn touch_refreshes_last_used() {
        let store = HistoryStore::new(10);
        store.push("x").await;
        let before = store.get(0).await.unwrap().last_used_at;
        store.touch(0).await;
        assert!(store.get(0).await.unwrap().last_used_at >= before);
        store.touch(99).await;
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn delete_removes_only_valid_indices() {
        let store = HistoryStore::new(10);
        store.push("a").await;
        store.push("b").await;
        store.delete(5).await;
        assert_eq!(store.len().await, 2);
        store.delete(0).await;
        assert_eq!(texts(&store).await, ["a"]);
    }

    #[tokio::test]
    async fn reorder_operations_respect_bounds() {
        let store = HistoryStore::new(10);
        for t in ["c", "b", "a"] {
            store.push(t).await;
        }
        store.move_up(0).await;
        store.move_down(2).await;
        store.move_up(5).await;
        store.move_top(9).await;
        assert_eq!(texts(&store).await, ["a", "b", "c"]);

        store.move_up(2).await;
        assert_eq!(texts(&store).await, ["a", "c", "b"]);
        store.move_down(0).await;
        assert_eq!(texts(&store).await, ["c", "a", "b"]);
        store.move_top(2).await;
        assert_eq!(texts(&store).await, ["b", "c", "a"]);
    }

    #[tokio::test]
    async fn clear_empties_the_history() {
        let store = HistoryStore::new(10);
        store.push("a").await;
        store.push("b").await;
        store.clear().await;
        assert!(store.is_empty().await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_pushes_stay_within_capacity() {
        let store = Arc::new(HistoryStore::new(10));
        let mut handles = Vec::new();
        for i in 0..32 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.push(format!("payload {i}")).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let entries = store.list().await;
        assert_eq!(entries.len(), 10);
        let mut seen = HashSet::new();
        for entry in &entries {
            assert!(entry.text.starts_with("payload "));
            assert!(seen.insert(entry.text.clone()), "duplicate slot: {}", entry.text);
            assert_eq!(entry.size_bytes, entry.text.len());
        }
    }
}
