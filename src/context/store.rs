//! In-memory context store with ranked search.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::debug;

use crate::context::item::ContextItem;
use crate::error::ContextError;

/// Metadata key linking an item to a project.
pub const PROJECT_ID_KEY: &str = "project_id";

/// Shared store of context items.
///
/// Items live for the process lifetime — the store appends or overwrites by
/// id, never deletes. The lock is held only for the duration of a single
/// mutation or read snapshot, never across a provider call.
pub struct ContextStore {
    inner: RwLock<StoreInner>,
}

#[derive(Default)]
struct StoreInner {
    items: HashMap<String, ContextItem>,
    /// Insertion order of ids — the tie-break for ranked search and the
    /// iteration order for project queries. Overwrites keep the original
    /// position.
    order: Vec<String>,
}

impl ContextStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner::default()),
        }
    }

    /// Insert an item, or overwrite the existing item with the same id.
    ///
    /// Importance outside [0, 1] is a caller error; the item is not stored.
    pub async fn add(&self, item: ContextItem) -> Result<(), ContextError> {
        if !(0.0..=1.0).contains(&item.importance) {
            return Err(ContextError::ImportanceOutOfRange {
                id: item.id.clone(),
                importance: item.importance,
            });
        }

        debug!(id = %item.id, kind = %item.kind, importance = item.importance, "Context added");

        let id = item.id.clone();
        let mut inner = self.inner.write().await;
        if inner.items.insert(id.clone(), item).is_none() {
            inner.order.push(id);
        }
        Ok(())
    }

    /// Ranked substring search over content, kind label, and metadata values.
    ///
    /// Case-insensitive. Results are ordered by importance descending; ties
    /// keep insertion order. An empty vec means no match — never an error.
    pub async fn search(&self, query: &str, limit: usize) -> Vec<ContextItem> {
        let needle = query.to_lowercase();
        let inner = self.inner.read().await;

        let mut hits: Vec<ContextItem> = inner
            .order
            .iter()
            .filter_map(|id| inner.items.get(id))
            .filter(|item| matches_query(item, &needle))
            .cloned()
            .collect();

        // sort_by is stable, so equal importance keeps insertion order.
        hits.sort_by(|a, b| {
            b.importance
                .partial_cmp(&a.importance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(limit);
        hits
    }

    /// All items tagged with the given project id, in store order.
    pub async fn by_project(&self, project_id: &str) -> Vec<ContextItem> {
        let inner = self.inner.read().await;
        inner
            .order
            .iter()
            .filter_map(|id| inner.items.get(id))
            .filter(|item| {
                item.metadata
                    .get(PROJECT_ID_KEY)
                    .is_some_and(|v| v == project_id)
            })
            .cloned()
            .collect()
    }

    /// Number of stored items.
    pub async fn len(&self) -> usize {
        self.inner.read().await.items.len()
    }

    /// Check if the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.items.is_empty()
    }
}

impl Default for ContextStore {
    fn default() -> Self {
        Self::new()
    }
}

fn matches_query(item: &ContextItem, needle: &str) -> bool {
    item.content.to_lowercase().contains(needle)
        || item.kind.label().contains(needle)
        || item
            .metadata
            .values()
            .any(|v| v.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::item::ContextKind;

    fn item(id: &str, content: &str, importance: f64) -> ContextItem {
        ContextItem::new(id, ContextKind::Conversation, content, "test")
            .with_importance(importance)
    }

    #[tokio::test]
    async fn search_orders_by_importance_desc() {
        let store = ContextStore::new();
        store.add(item("low", "alpha topic", 0.2)).await.unwrap();
        store.add(item("high", "alpha topic", 0.9)).await.unwrap();
        store.add(item("mid", "alpha topic", 0.5)).await.unwrap();

        let hits = store.search("alpha", 10).await;
        let ids: Vec<&str> = hits.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["high", "mid", "low"]);
    }

    #[tokio::test]
    async fn search_ties_keep_insertion_order() {
        let store = ContextStore::new();
        store.add(item("first", "beta topic", 0.5)).await.unwrap();
        store.add(item("second", "beta topic", 0.5)).await.unwrap();
        store.add(item("third", "beta topic", 0.5)).await.unwrap();

        let hits = store.search("beta", 10).await;
        let ids: Vec<&str> = hits.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn search_truncates_to_limit() {
        let store = ContextStore::new();
        for i in 0..5 {
            store
                .add(item(&format!("i{i}"), "gamma topic", 0.5))
                .await
                .unwrap();
        }
        assert_eq!(store.search("gamma", 2).await.len(), 2);
    }

    #[tokio::test]
    async fn search_is_case_insensitive() {
        let store = ContextStore::new();
        store.add(item("a", "Deploy to STAGING", 0.5)).await.unwrap();
        assert_eq!(store.search("staging", 10).await.len(), 1);
        assert_eq!(store.search("DEPLOY", 10).await.len(), 1);
    }

    #[tokio::test]
    async fn search_matches_kind_and_metadata() {
        let store = ContextStore::new();
        store
            .add(
                ContextItem::new("d1", ContextKind::Decision, "use postgres", "conductor")
                    .with_importance(0.9)
                    .with_metadata("participants", "Alice,Bob"),
            )
            .await
            .unwrap();

        // kind label
        assert_eq!(store.search("decision", 10).await.len(), 1);
        // metadata value
        assert_eq!(store.search("alice", 10).await.len(), 1);
        // no match
        assert!(store.search("kubernetes", 10).await.is_empty());
    }

    #[tokio::test]
    async fn readd_overwrites_in_place() {
        let store = ContextStore::new();
        store.add(item("a", "delta one", 0.3)).await.unwrap();
        store.add(item("b", "delta two", 0.3)).await.unwrap();
        store.add(item("a", "delta updated", 0.3)).await.unwrap();

        assert_eq!(store.len().await, 2);
        let hits = store.search("delta", 10).await;
        assert_eq!(hits[0].id, "a");
        assert_eq!(hits[0].content, "delta updated");
        assert_eq!(hits[1].id, "b");
    }

    #[tokio::test]
    async fn out_of_range_importance_rejected() {
        let store = ContextStore::new();
        assert!(store.add(item("a", "x", 1.5)).await.is_err());
        assert!(store.add(item("b", "x", -0.1)).await.is_err());
        assert!(store.is_empty().await);

        // Boundaries are valid.
        assert!(store.add(item("c", "x", 0.0)).await.is_ok());
        assert!(store.add(item("d", "x", 1.0)).await.is_ok());
    }

    #[tokio::test]
    async fn by_project_filters_in_store_order() {
        let store = ContextStore::new();
        store
            .add(item("a", "one", 0.9).with_metadata(PROJECT_ID_KEY, "atlas"))
            .await
            .unwrap();
        store
            .add(item("b", "two", 0.1).with_metadata(PROJECT_ID_KEY, "atlas"))
            .await
            .unwrap();
        store
            .add(item("c", "three", 0.5).with_metadata(PROJECT_ID_KEY, "borealis"))
            .await
            .unwrap();
        store.add(item("d", "four", 0.5)).await.unwrap();

        let atlas = store.by_project("atlas").await;
        let ids: Vec<&str> = atlas.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn empty_search_result_is_not_an_error() {
        let store = ContextStore::new();
        assert!(store.search("anything", 10).await.is_empty());
    }
}
