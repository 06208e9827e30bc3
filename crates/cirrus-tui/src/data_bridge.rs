//! Data bridge: connects [`Controller`] streams to TUI actions.
//!
//! Runs as a background task: connects, then watches every collection the
//! screens show and forwards a fresh [`AccountSnapshot`] as an [`Action`]
//! whenever data or a collection's load status changes.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use cirrus_core::presentation::{
    DashboardCard, DocsSidebar, PlanLabels, dashboard_cards, default_docs,
};
use cirrus_core::{
    AccountNotice, Collection, ConnectionState, Controller, DataStore, EntityId, EntityKind,
    Event, ListingPolicy, Server, Volume, merge_events,
};

use crate::action::Action;

/// Everything the screens render, captured from the store in one go.
#[derive(Debug, Clone, Default)]
pub struct AccountSnapshot {
    pub cards: Vec<DashboardCard>,
    pub sidebar: Option<DocsSidebar>,
    pub servers: Arc<Vec<Arc<Server>>>,
    pub volumes: Arc<Vec<Arc<Volume>>>,
    pub events: Arc<Vec<Arc<Event>>>,
    pub notices: Arc<Vec<Arc<AccountNotice>>>,
    pub plans: PlanLabels,
}

impl AccountSnapshot {
    pub fn capture(store: &DataStore, policy: ListingPolicy) -> Self {
        let servers = store.servers_snapshot();
        Self {
            cards: dashboard_cards(store, policy),
            sidebar: DocsSidebar::build(&default_docs(), servers.as_slice()),
            servers,
            volumes: store.volumes_snapshot(),
            events: store.events_snapshot(),
            notices: store.notices_snapshot(),
            plans: store.plan_labels(),
        }
    }

    /// A server with its running event folded in.
    pub fn server(&self, id: &EntityId) -> Option<Arc<Server>> {
        let found = self.servers.iter().find(|s| &s.id == id)?;
        merge_events(std::slice::from_ref(found), self.events.as_slice())
            .into_iter()
            .next()
    }

    pub fn plan_label(&self, server: &Server) -> Option<String> {
        server
            .server_type
            .as_ref()
            .and_then(|plan| self.plans.get(plan).cloned())
    }

    pub fn notices_for(&self, kind: EntityKind, id: &EntityId) -> Vec<Arc<AccountNotice>> {
        self.notices
            .iter()
            .filter(|n| n.entity.as_ref().is_some_and(|e| e.kind == kind && &e.id == id))
            .cloned()
            .collect()
    }

    pub fn in_progress_events(&self) -> Vec<Arc<Event>> {
        self.events
            .iter()
            .filter(|e| e.is_in_progress())
            .cloned()
            .collect()
    }

    /// Newest unseen event id; marking it seen covers everything older.
    pub fn newest_unseen_event(&self) -> Option<u64> {
        self.events.iter().filter(|e| !e.seen).map(|e| e.id).max()
    }
}

/// Spawn-able bridge between the controller and the action loop. Returns
/// when cancelled or when the initial connect fails.
pub async fn spawn_data_bridge(
    controller: Controller,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let _ = action_tx.send(Action::Reconnecting);

    let policy = controller.config().listing;
    let store = Arc::clone(controller.store());

    // Subscribe before connecting so the loading states show up as cards.
    let mut servers = controller.servers();
    let mut volumes = controller.volumes();
    let mut domains = controller.domains();
    let mut load_balancers = controller.load_balancers();
    let mut events = controller.events();
    let mut notices = controller.notices();
    let mut server_status = store.subscribe_status(Collection::Servers);
    let mut volume_status = store.subscribe_status(Collection::Volumes);
    let mut domain_status = store.subscribe_status(Collection::Domains);
    let mut lb_status = store.subscribe_status(Collection::LoadBalancers);
    let mut conn_state = controller.connection_state();

    let publish = |reason: &str| {
        debug!(reason, "publishing account snapshot");
        let _ = action_tx.send(Action::AccountUpdated(Arc::new(AccountSnapshot::capture(
            &store, policy,
        ))));
    };

    publish("initial");

    if let Err(e) = controller.connect().await {
        warn!(error = %e, "failed to connect to the API");
        publish("connect failed");
        let _ = action_tx.send(Action::Disconnected(e.summary()));
        return;
    }
    let _ = action_tx.send(Action::Connected);
    publish("connected");

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            Some(_) = servers.changed() => publish("servers"),
            Some(_) = volumes.changed() => publish("volumes"),
            Some(_) = domains.changed() => publish("domains"),
            Some(_) = load_balancers.changed() => publish("load balancers"),
            Some(_) = events.changed() => publish("events"),
            Some(_) = notices.changed() => publish("notices"),
            Ok(()) = server_status.changed() => publish("server status"),
            Ok(()) = volume_status.changed() => publish("volume status"),
            Ok(()) = domain_status.changed() => publish("domain status"),
            Ok(()) = lb_status.changed() => publish("load balancer status"),

            Ok(()) = conn_state.changed() => {
                let state = conn_state.borrow_and_update().clone();
                let action = match state {
                    ConnectionState::Connected => Some(Action::Connected),
                    ConnectionState::Disconnected => Some(Action::Disconnected("disconnected".into())),
                    ConnectionState::Failed => Some(Action::Disconnected("connection failed".into())),
                    ConnectionState::Connecting => None,
                };
                if let Some(action) = action {
                    let _ = action_tx.send(action);
                }
            }
        }
    }

    controller.disconnect().await;
    debug!("data bridge shut down");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::test_support::{boot_event, server};

    use super::*;

    #[test]
    fn server_lookup_merges_running_event() {
        let snapshot = AccountSnapshot {
            servers: Arc::new(vec![Arc::new(server(1, "web-01")), Arc::new(server(2, "db-01"))]),
            events: Arc::new(vec![Arc::new(boot_event(9, 2, Some(50)))]),
            plans: [("std-2gb".to_owned(), "Standard 2GB".to_owned())].into(),
            ..AccountSnapshot::default()
        };

        let db = snapshot.server(&EntityId::Numeric(2)).unwrap();
        assert_eq!(db.recent_event.as_ref().map(|e| e.id), Some(9));
        let web = snapshot.server(&EntityId::Numeric(1)).unwrap();
        assert!(web.recent_event.is_none());
        assert!(snapshot.server(&EntityId::Numeric(3)).is_none());
        assert_eq!(snapshot.plan_label(&web).as_deref(), Some("Standard 2GB"));
    }

    #[test]
    fn newest_unseen_event_skips_seen_ones() {
        let mut seen = boot_event(12, 1, None);
        seen.seen = true;
        let snapshot = AccountSnapshot {
            events: Arc::new(vec![
                Arc::new(boot_event(7, 1, None)),
                Arc::new(boot_event(8, 1, Some(100))),
                Arc::new(seen),
            ]),
            ..AccountSnapshot::default()
        };
        assert_eq!(snapshot.newest_unseen_event(), Some(8));
        assert_eq!(snapshot.in_progress_events().len(), 2);
    }
}
