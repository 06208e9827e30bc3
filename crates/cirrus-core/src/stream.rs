// ── Reactive entity streams ──
//
// Subscription types for consuming entity changes from the DataStore.

use std::sync::Arc;

use tokio::sync::watch;

/// A subscription to one collection of entities.
///
/// Wraps the collection's `watch` channel; each [`changed()`](Self::changed)
/// resolves with the snapshot that replaced the previous one.
pub struct EntityStream<T: Clone + Send + Sync + 'static> {
    receiver: watch::Receiver<Arc<Vec<Arc<T>>>>,
}

impl<T: Clone + Send + Sync + 'static> EntityStream<T> {
    pub(crate) fn new(receiver: watch::Receiver<Arc<Vec<Arc<T>>>>) -> Self {
        Self { receiver }
    }

    /// Wait for the next change, returning the new snapshot.
    /// Returns `None` if the sender (DataStore) has been dropped.
    pub async fn changed(&mut self) -> Option<Arc<Vec<Arc<T>>>> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::model::{Backups, EntityId, Server, ServerStatus};
    use crate::store::{DataStore, RefreshOutcome};

    fn server(id: u64) -> Server {
        Server {
            id: EntityId::Numeric(id),
            label: format!("srv-{id}"),
            region: "us-east".into(),
            status: ServerStatus::Running,
            server_type: None,
            image: None,
            ipv4: Vec::new(),
            backups: Backups::default(),
            tags: Vec::new(),
            created: None,
            recent_event: None,
        }
    }

    #[tokio::test]
    async fn changed_yields_new_snapshot() {
        let store = DataStore::new();
        let mut stream = store.subscribe_servers();

        store.apply_refresh(RefreshOutcome {
            servers: Some(Ok(vec![server(1), server(2)])),
            ..RefreshOutcome::default()
        });

        let snap = stream.changed().await.unwrap();
        assert_eq!(snap.len(), 2);
    }

    #[tokio::test]
    async fn untouched_collections_do_not_wake_subscribers() {
        let store = DataStore::new();
        let mut volumes = store.subscribe_volumes();

        store.apply_refresh(RefreshOutcome {
            servers: Some(Ok(vec![server(1)])),
            ..RefreshOutcome::default()
        });
        assert!(!volumes.receiver.has_changed().unwrap());

        store.apply_refresh(RefreshOutcome {
            volumes: Some(Ok(Vec::new())),
            ..RefreshOutcome::default()
        });

        let snap = volumes.changed().await.unwrap();
        assert!(snap.is_empty());
    }
}
