// ── Full refresh application logic ──
//
// Applies the result of one refresh cycle to the DataStore. Each
// collection succeeds or fails on its own: a failed fetch records its
// error and keeps the previous data, a successful one replaces it.

use tracing::{debug, warn};

use super::DataStore;
use super::collection::EntityCollection;
use super::data_store::Collection;
use crate::model::{
    AccountNotice, Domain, Event, Image, LoadBalancer, Server, ServerType, Volume,
};

/// Per-collection result of a fetch. `None` means the collection was not
/// part of this refresh and is left untouched.
pub type Fetched<T> = Option<Result<Vec<T>, String>>;

/// Everything fetched during a single refresh cycle.
#[derive(Debug, Default)]
pub struct RefreshOutcome {
    pub servers: Fetched<Server>,
    pub volumes: Fetched<Volume>,
    pub domains: Fetched<Domain>,
    pub load_balancers: Fetched<LoadBalancer>,
    pub images: Fetched<Image>,
    pub server_types: Fetched<ServerType>,
    pub events: Fetched<Event>,
    pub notices: Fetched<AccountNotice>,
}

impl RefreshOutcome {
    /// Collections that failed, with their messages.
    pub fn failures(&self) -> Vec<(Collection, &str)> {
        fn err<T>(f: &Fetched<T>) -> Option<&str> {
            match f {
                Some(Err(e)) => Some(e.as_str()),
                _ => None,
            }
        }

        [
            (Collection::Servers, err(&self.servers)),
            (Collection::Volumes, err(&self.volumes)),
            (Collection::Domains, err(&self.domains)),
            (Collection::LoadBalancers, err(&self.load_balancers)),
            (Collection::Images, err(&self.images)),
            (Collection::ServerTypes, err(&self.server_types)),
            (Collection::Events, err(&self.events)),
            (Collection::Notices, err(&self.notices)),
        ]
        .into_iter()
        .filter_map(|(c, e)| e.map(|e| (c, e)))
        .collect()
    }
}

/// Apply one fetched collection: replace on success, record the error on
/// failure.
fn apply<T, F>(collection: &EntityCollection<T>, name: Collection, fetched: Fetched<T>, key: F)
where
    T: Clone + Send + Sync + 'static,
    F: Fn(&T) -> String,
{
    match fetched {
        None => {}
        Some(Ok(items)) => {
            debug!(collection = %name, count = items.len(), "collection refreshed");
            let entries = items.into_iter().map(|item| (key(&item), item)).collect();
            collection.replace_all(entries);
        }
        Some(Err(message)) => {
            warn!(collection = %name, error = %message, "collection fetch failed");
            collection.mark_failed(message);
        }
    }
}

impl DataStore {
    /// Flag the given collections as loading ahead of a fetch.
    pub(crate) fn mark_loading(&self, collections: &[Collection]) {
        for c in collections {
            match c {
                Collection::Servers => self.servers.mark_loading(),
                Collection::Volumes => self.volumes.mark_loading(),
                Collection::Domains => self.domains.mark_loading(),
                Collection::LoadBalancers => self.load_balancers.mark_loading(),
                Collection::Images => self.images.mark_loading(),
                Collection::ServerTypes => self.server_types.mark_loading(),
                Collection::Events => self.events.mark_loading(),
                Collection::Notices => self.notices.mark_loading(),
            }
        }
    }

    /// Apply a refresh cycle. This is the store's only bulk write path.
    pub fn apply_refresh(&self, outcome: RefreshOutcome) {
        apply(&self.servers, Collection::Servers, outcome.servers, |s| {
            format!("server:{}", s.id)
        });
        apply(&self.volumes, Collection::Volumes, outcome.volumes, |v| {
            format!("volume:{}", v.id)
        });
        apply(&self.domains, Collection::Domains, outcome.domains, |d| {
            format!("domain:{}", d.id)
        });
        apply(
            &self.load_balancers,
            Collection::LoadBalancers,
            outcome.load_balancers,
            |lb| format!("lb:{}", lb.id),
        );
        apply(&self.images, Collection::Images, outcome.images, |i| {
            format!("image:{}", i.id)
        });
        // Plans are keyed by their bare id so `server_type()` can look them up.
        apply(
            &self.server_types,
            Collection::ServerTypes,
            outcome.server_types,
            |t| t.id.clone(),
        );
        apply(&self.events, Collection::Events, outcome.events, |e| {
            format!("event:{}", e.id)
        });
        // Notices carry no id of their own; position in the feed is stable
        // within a single fetch.
        match outcome.notices {
            None => {}
            Some(Ok(items)) => {
                debug!(collection = %Collection::Notices, count = items.len(), "collection refreshed");
                self.notices.replace_all(
                    items
                        .into_iter()
                        .zip(1u64..)
                        .map(|(n, pos)| (format!("notice:{pos}"), n))
                        .collect(),
                );
            }
            Some(Err(message)) => {
                warn!(collection = %Collection::Notices, error = %message, "collection fetch failed");
                self.notices.mark_failed(message);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{Backups, EntityId, ServerStatus};

    fn server(id: u64, label: &str) -> Server {
        Server {
            id: EntityId::Numeric(id),
            label: label.into(),
            region: "us-east".into(),
            status: ServerStatus::Running,
            server_type: Some("std-2gb".into()),
            image: None,
            ipv4: Vec::new(),
            backups: Backups::default(),
            tags: Vec::new(),
            created: None,
            recent_event: None,
        }
    }

    #[test]
    fn successful_fetch_replaces_collection() {
        let store = DataStore::new();
        store.apply_refresh(RefreshOutcome {
            servers: Some(Ok(vec![server(1, "a"), server(2, "b")])),
            ..RefreshOutcome::default()
        });

        assert_eq!(store.server_count(), 2);
        let status = store.status(Collection::Servers);
        assert!(!status.loading);
        assert!(status.error.is_none());
        assert!(status.is_loaded());
    }

    #[test]
    fn failed_fetch_keeps_data_and_records_error() {
        let store = DataStore::new();
        store.apply_refresh(RefreshOutcome {
            servers: Some(Ok(vec![server(1, "a")])),
            ..RefreshOutcome::default()
        });
        store.mark_loading(&[Collection::Servers]);
        store.apply_refresh(RefreshOutcome {
            servers: Some(Err("HTTP 500".into())),
            ..RefreshOutcome::default()
        });

        assert_eq!(store.server_count(), 1);
        let status = store.status(Collection::Servers);
        assert!(!status.loading);
        assert_eq!(status.error.as_deref(), Some("HTTP 500"));
    }

    #[test]
    fn untouched_collections_stay_pending() {
        let store = DataStore::new();
        store.apply_refresh(RefreshOutcome {
            servers: Some(Ok(Vec::new())),
            ..RefreshOutcome::default()
        });
        assert!(store.status(Collection::Volumes).loading);
    }

    #[test]
    fn server_types_are_looked_up_by_plan_id() {
        let store = DataStore::new();
        store.apply_refresh(RefreshOutcome {
            server_types: Some(Ok(vec![ServerType {
                id: "std-2gb".into(),
                label: "Standard 2GB".into(),
                memory_mb: 2048,
                disk_mb: 51_200,
                vcpus: 1,
                class: Some("standard".into()),
            }])),
            ..RefreshOutcome::default()
        });

        assert_eq!(
            store.plan_label(&server(1, "a")).as_deref(),
            Some("Standard 2GB")
        );
    }

    #[test]
    fn failures_lists_failed_collections() {
        let outcome = RefreshOutcome {
            servers: Some(Ok(Vec::new())),
            domains: Some(Err("timeout".into())),
            ..RefreshOutcome::default()
        };
        assert_eq!(outcome.failures(), vec![(Collection::Domains, "timeout")]);
    }
}
