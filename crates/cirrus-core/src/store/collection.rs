// ── Generic reactive entity collection ──
//
// Concurrent storage with O(1) lookups, API-order snapshots, and
// push-based change notification via `watch` channels. Each collection
// also carries its own fetch status (loading flag + error payload).

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::watch;

/// Fetch status of one collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectionStatus {
    /// A fetch is in flight.
    pub loading: bool,
    /// Message of the last failed fetch; cleared by the next success.
    pub error: Option<String>,
    /// Completion time of the last successful fetch.
    pub last_updated: Option<DateTime<Utc>>,
}

impl CollectionStatus {
    /// Status of a collection that has never been fetched: a fetch is
    /// assumed to be on its way.
    pub fn pending() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.last_updated.is_some()
    }
}

/// A reactive collection for a single entity type.
///
/// Uses `DashMap` for concurrent lookups and a `watch` channel for
/// push-based change notification. Every replacement rebuilds the snapshot
/// that subscribers receive. The snapshot keeps the order in which the API
/// returned entities.
pub(crate) struct EntityCollection<T: Clone + Send + Sync + 'static> {
    /// Primary storage: key string -> entity.
    by_key: DashMap<String, Arc<T>>,

    /// Keys in API order.
    order: Mutex<Vec<String>>,

    /// Full snapshot, rebuilt on mutation for efficient subscription.
    snapshot: watch::Sender<Arc<Vec<Arc<T>>>>,

    status: watch::Sender<CollectionStatus>,
}

impl<T: Clone + Send + Sync + 'static> EntityCollection<T> {
    pub(crate) fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        let (status, _) = watch::channel(CollectionStatus::pending());

        Self {
            by_key: DashMap::new(),
            order: Mutex::new(Vec::new()),
            snapshot,
            status,
        }
    }

    /// Replace the whole collection with a fresh fetch.
    ///
    /// Inserts every incoming entity, prunes keys that are gone, adopts the
    /// incoming order, and marks the collection loaded. Subscribers see a
    /// single change; there is no intermediate empty state.
    pub(crate) fn replace_all(&self, items: Vec<(String, T)>) {
        let mut seen = HashSet::new();
        let mut ordered = Vec::with_capacity(items.len());
        for (key, entity) in items {
            if seen.insert(key.clone()) {
                ordered.push(key.clone());
            }
            self.by_key.insert(key, Arc::new(entity));
        }
        self.by_key.retain(|k, _| seen.contains(k));
        *self.order.lock().unwrap_or_else(PoisonError::into_inner) = ordered;

        self.rebuild_snapshot();
        self.status.send_modify(|s| {
            s.loading = false;
            s.error = None;
            s.last_updated = Some(Utc::now());
        });
    }

    /// Look up an entity by its primary key string.
    pub(crate) fn get_by_key(&self, key: &str) -> Option<Arc<T>> {
        self.by_key.get(key).map(|r| Arc::clone(r.value()))
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes via a `watch::Receiver`.
    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<T>>>> {
        self.snapshot.subscribe()
    }

    // ── Status ───────────────────────────────────────────────────────

    pub(crate) fn status(&self) -> CollectionStatus {
        self.status.borrow().clone()
    }

    pub(crate) fn subscribe_status(&self) -> watch::Receiver<CollectionStatus> {
        self.status.subscribe()
    }

    /// A fetch started. Existing data and error stay visible until it ends.
    pub(crate) fn mark_loading(&self) {
        self.status.send_modify(|s| s.loading = true);
    }

    /// A fetch failed. Existing data is kept; the error is recorded.
    pub(crate) fn mark_failed(&self, message: String) {
        self.status.send_modify(|s| {
            s.loading = false;
            s.error = Some(message);
        });
    }

    pub(crate) fn len(&self) -> usize {
        self.by_key.len()
    }

    /// Collect all values in API order and broadcast to subscribers.
    fn rebuild_snapshot(&self) {
        let order = self.order.lock().unwrap_or_else(PoisonError::into_inner);
        let values: Vec<Arc<T>> = order
            .iter()
            .filter_map(|k| self.by_key.get(k).map(|r| Arc::clone(r.value())))
            .collect();
        drop(order);
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn entries(keys: &[&str]) -> Vec<(String, String)> {
        keys.iter()
            .map(|k| ((*k).to_owned(), k.to_uppercase()))
            .collect()
    }

    fn labels(col: &EntityCollection<String>) -> Vec<String> {
        col.snapshot().iter().map(|s| (**s).clone()).collect()
    }

    #[test]
    fn snapshot_keeps_api_order() {
        let col: EntityCollection<String> = EntityCollection::new();
        col.replace_all(entries(&["c", "a", "b"]));
        assert_eq!(labels(&col), vec!["C", "A", "B"]);
    }

    #[test]
    fn replace_all_prunes_and_reorders() {
        let col: EntityCollection<String> = EntityCollection::new();
        col.replace_all(entries(&["a", "b", "c"]));
        col.replace_all(entries(&["c", "a"]));

        assert_eq!(col.len(), 2);
        assert!(col.get_by_key("b").is_none());
        assert_eq!(*col.get_by_key("c").unwrap(), "C");
        assert_eq!(labels(&col), vec!["C", "A"]);
    }

    #[test]
    fn duplicate_keys_keep_the_last_value_once() {
        let col: EntityCollection<String> = EntityCollection::new();
        col.replace_all(vec![
            ("a".into(), "first".into()),
            ("a".into(), "second".into()),
        ]);
        assert_eq!(labels(&col), vec!["second"]);
    }

    #[test]
    fn replace_all_is_a_single_change() {
        let col: EntityCollection<String> = EntityCollection::new();
        let mut rx = col.subscribe();
        rx.borrow_and_update();
        col.replace_all(entries(&["a", "b", "c"]));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 3);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn status_lifecycle() {
        let col: EntityCollection<String> = EntityCollection::new();
        assert!(col.status().loading);
        assert!(!col.status().is_loaded());

        col.mark_failed("boom".into());
        let status = col.status();
        assert!(!status.loading);
        assert_eq!(status.error.as_deref(), Some("boom"));

        col.mark_loading();
        assert!(col.status().loading);
        assert_eq!(col.status().error.as_deref(), Some("boom"));

        col.replace_all(entries(&["a"]));
        let status = col.status();
        assert!(!status.loading);
        assert!(status.error.is_none());
        assert!(status.is_loaded());
    }
}
