// ── Central reactive data store ──
//
// Thread-safe storage for all Cirrus domain entities. Mutations are
// broadcast to subscribers via `watch` channels. Only the controller's
// refresh path writes; every other consumer reads snapshots.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use strum::{Display, EnumIter};
use tokio::sync::watch;

use super::collection::{CollectionStatus, EntityCollection};
use crate::model::{
    AccountNotice, Domain, EntityId, EntityKind, Event, Image, LoadBalancer, Server, ServerType,
    Volume,
};
use crate::stream::EntityStream;

/// Names each collection held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Collection {
    Servers,
    Volumes,
    Domains,
    LoadBalancers,
    Images,
    ServerTypes,
    Events,
    Notices,
}

/// Central reactive store for all Cirrus domain entities.
///
/// Reads are cheap `Arc` clones of the latest snapshot; writes use
/// fine-grained per-shard locks within `DashMap`.
pub struct DataStore {
    pub(crate) servers: EntityCollection<Server>,
    pub(crate) volumes: EntityCollection<Volume>,
    pub(crate) domains: EntityCollection<Domain>,
    pub(crate) load_balancers: EntityCollection<LoadBalancer>,
    pub(crate) images: EntityCollection<Image>,
    pub(crate) server_types: EntityCollection<ServerType>,
    pub(crate) events: EntityCollection<Event>,
    pub(crate) notices: EntityCollection<AccountNotice>,
}

impl DataStore {
    pub fn new() -> Self {
        Self {
            servers: EntityCollection::new(),
            volumes: EntityCollection::new(),
            domains: EntityCollection::new(),
            load_balancers: EntityCollection::new(),
            images: EntityCollection::new(),
            server_types: EntityCollection::new(),
            events: EntityCollection::new(),
            notices: EntityCollection::new(),
        }
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    pub fn servers_snapshot(&self) -> Arc<Vec<Arc<Server>>> {
        self.servers.snapshot()
    }

    pub fn volumes_snapshot(&self) -> Arc<Vec<Arc<Volume>>> {
        self.volumes.snapshot()
    }

    pub fn domains_snapshot(&self) -> Arc<Vec<Arc<Domain>>> {
        self.domains.snapshot()
    }

    pub fn load_balancers_snapshot(&self) -> Arc<Vec<Arc<LoadBalancer>>> {
        self.load_balancers.snapshot()
    }

    pub fn images_snapshot(&self) -> Arc<Vec<Arc<Image>>> {
        self.images.snapshot()
    }

    /// Event log, newest first (API order).
    pub fn events_snapshot(&self) -> Arc<Vec<Arc<Event>>> {
        self.events.snapshot()
    }

    pub fn notices_snapshot(&self) -> Arc<Vec<Arc<AccountNotice>>> {
        self.notices.snapshot()
    }

    // ── Single-entity lookups ────────────────────────────────────────

    /// Resolve a plan id (`"std-2gb"`) to its server type.
    pub fn server_type(&self, plan_id: &str) -> Option<Arc<ServerType>> {
        self.server_types.get_by_key(plan_id)
    }

    /// Type-derived display name for a server ("Standard 2GB"), if known.
    pub fn plan_label(&self, server: &Server) -> Option<String> {
        let plan = server.server_type.as_deref()?;
        self.server_type(plan).map(|t| t.label.clone())
    }

    /// Plan id -> display name for every known server type.
    pub fn plan_labels(&self) -> HashMap<String, String> {
        self.server_types
            .snapshot()
            .iter()
            .map(|t| (t.id.clone(), t.label.clone()))
            .collect()
    }

    /// Notices about one entity.
    pub fn notices_for(&self, kind: EntityKind, id: &EntityId) -> Vec<Arc<AccountNotice>> {
        self.notices
            .snapshot()
            .iter()
            .filter(|n| {
                n.entity
                    .as_ref()
                    .is_some_and(|e| e.kind == kind && &e.id == id)
            })
            .cloned()
            .collect()
    }

    // ── Count accessors ──────────────────────────────────────────────

    pub fn server_count(&self) -> usize {
        self.servers.len()
    }

    pub fn volume_count(&self) -> usize {
        self.volumes.len()
    }

    pub fn domain_count(&self) -> usize {
        self.domains.len()
    }

    pub fn load_balancer_count(&self) -> usize {
        self.load_balancers.len()
    }

    // ── Status ───────────────────────────────────────────────────────

    pub fn status(&self, collection: Collection) -> CollectionStatus {
        match collection {
            Collection::Servers => self.servers.status(),
            Collection::Volumes => self.volumes.status(),
            Collection::Domains => self.domains.status(),
            Collection::LoadBalancers => self.load_balancers.status(),
            Collection::Images => self.images.status(),
            Collection::ServerTypes => self.server_types.status(),
            Collection::Events => self.events.status(),
            Collection::Notices => self.notices.status(),
        }
    }

    pub fn subscribe_status(&self, collection: Collection) -> watch::Receiver<CollectionStatus> {
        match collection {
            Collection::Servers => self.servers.subscribe_status(),
            Collection::Volumes => self.volumes.subscribe_status(),
            Collection::Domains => self.domains.subscribe_status(),
            Collection::LoadBalancers => self.load_balancers.subscribe_status(),
            Collection::Images => self.images.subscribe_status(),
            Collection::ServerTypes => self.server_types.subscribe_status(),
            Collection::Events => self.events.subscribe_status(),
            Collection::Notices => self.notices.subscribe_status(),
        }
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_servers(&self) -> EntityStream<Server> {
        EntityStream::new(self.servers.subscribe())
    }

    pub fn subscribe_volumes(&self) -> EntityStream<Volume> {
        EntityStream::new(self.volumes.subscribe())
    }

    pub fn subscribe_domains(&self) -> EntityStream<Domain> {
        EntityStream::new(self.domains.subscribe())
    }

    pub fn subscribe_load_balancers(&self) -> EntityStream<LoadBalancer> {
        EntityStream::new(self.load_balancers.subscribe())
    }

    pub fn subscribe_events(&self) -> EntityStream<Event> {
        EntityStream::new(self.events.subscribe())
    }

    pub fn subscribe_notices(&self) -> EntityStream<AccountNotice> {
        EntityStream::new(self.notices.subscribe())
    }
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}
