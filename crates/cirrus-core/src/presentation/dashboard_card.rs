use std::borrow::Borrow;
use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::listing::{DisplayState, ListingPolicy, select_for_display, show_view_all};
use crate::merge::merge_events;
use crate::model::{Domain, Entity, EntityId, EntityKind, Event, LoadBalancer, Server, Volume};
use crate::store::{Collection, CollectionStatus, DataStore};

/// Row text shown when a card's collection is empty.
pub const EMPTY_MESSAGE: &str = "No items to display.";

/// Plan id -> plan display name ("Standard 2GB").
pub type PlanLabels = HashMap<String, String>;

/// One row of a dashboard card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardRow {
    pub id: EntityId,
    pub label: String,
    pub status: Option<String>,
    /// Secondary line: plan display name, size, zone kind or hostname.
    pub detail: Option<String>,
    pub region: Option<String>,
    /// "Booting (40%)" while an operation is in flight.
    pub progress: Option<String>,
    pub path: String,
}

/// Entities that can fill a dashboard card.
pub trait CardSource: Entity + Clone {
    fn card_row(&self, plans: &PlanLabels) -> CardRow;

    /// Fold in-flight events into the selected rows. Kinds that never
    /// carry events pass through.
    fn with_events<E: Borrow<Event>>(selected: Vec<Self>, _events: &[E]) -> Vec<Self> {
        selected
    }
}

fn base_row<T: Entity>(entity: &T) -> CardRow {
    CardRow {
        id: entity.id().clone(),
        label: entity.label().to_owned(),
        status: None,
        detail: None,
        region: None,
        progress: None,
        path: T::KIND.detail_path(entity.id()),
    }
}

impl CardSource for Server {
    fn card_row(&self, plans: &PlanLabels) -> CardRow {
        CardRow {
            status: Some(self.status.to_string()),
            detail: self
                .server_type
                .as_ref()
                .and_then(|plan| plans.get(plan).cloned()),
            region: Some(self.region.clone()),
            progress: self.recent_event.as_ref().map(Event::progress_label),
            ..base_row(self)
        }
    }

    fn with_events<E: Borrow<Event>>(selected: Vec<Self>, events: &[E]) -> Vec<Self> {
        merge_events(&selected, events)
    }
}

impl CardSource for Volume {
    fn card_row(&self, _plans: &PlanLabels) -> CardRow {
        CardRow {
            status: Some(self.status.to_string()),
            detail: Some(format!("{} GB", self.size_gb)),
            region: Some(self.region.clone()),
            progress: self.recent_event.as_ref().map(Event::progress_label),
            ..base_row(self)
        }
    }

    fn with_events<E: Borrow<Event>>(selected: Vec<Self>, events: &[E]) -> Vec<Self> {
        merge_events(&selected, events)
    }
}

impl CardSource for Domain {
    fn card_row(&self, _plans: &PlanLabels) -> CardRow {
        CardRow {
            status: Some(self.status.to_string()),
            detail: Some(format!("{} zone", self.zone_kind)),
            ..base_row(self)
        }
    }
}

impl CardSource for LoadBalancer {
    fn card_row(&self, _plans: &PlanLabels) -> CardRow {
        CardRow {
            detail: self.hostname.clone(),
            region: Some(self.region.clone()),
            ..base_row(self)
        }
    }
}

impl<T: CardSource> CardSource for Arc<T> {
    fn card_row(&self, plans: &PlanLabels) -> CardRow {
        T::card_row(self, plans)
    }

    fn with_events<E: Borrow<Event>>(selected: Vec<Self>, events: &[E]) -> Vec<Self> {
        let inner: Vec<T> = selected.iter().map(|a| T::clone(a)).collect();
        T::with_events(inner, events)
            .into_iter()
            .map(Arc::new)
            .collect()
    }
}

/// View model of one dashboard card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardCard {
    pub kind: EntityKind,
    pub title: &'static str,
    pub state: DisplayState<CardRow>,
    /// Length of the full collection, not of the rows shown.
    pub total: usize,
    /// Target of the "View All" link, when offered.
    pub view_all: Option<String>,
}

impl DashboardCard {
    /// Sort by label, take the card limit, merge in-flight events, then
    /// resolve the display state from the collection status.
    pub fn build<T, E>(
        entities: &[T],
        events: &[E],
        status: &CollectionStatus,
        plans: &PlanLabels,
        policy: ListingPolicy,
    ) -> Self
    where
        T: CardSource,
        E: Borrow<Event>,
    {
        let selected = select_for_display(entities, policy.card_limit);
        let rows: Vec<CardRow> = T::with_events(selected, events)
            .iter()
            .map(|e| e.card_row(plans))
            .collect();

        let view_all = show_view_all(entities.len(), policy.view_all_threshold)
            .then(|| T::KIND.path_prefix().to_owned());

        Self {
            kind: T::KIND,
            title: T::KIND.display_name(),
            state: DisplayState::resolve(status, rows),
            total: entities.len(),
            view_all,
        }
    }

    /// Single-row message for the error and empty states.
    pub fn message(&self) -> Option<String> {
        match &self.state {
            DisplayState::Error(_) => Some(format!("Unable to load {}.", self.title)),
            DisplayState::Empty => Some(EMPTY_MESSAGE.to_owned()),
            DisplayState::Loading | DisplayState::Rows(_) => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, DisplayState::Loading)
    }
}

/// Servers, volumes, domains and load balancers cards, in dashboard order.
pub fn dashboard_cards(store: &DataStore, policy: ListingPolicy) -> Vec<DashboardCard> {
    let plans = store.plan_labels();
    let events = store.events_snapshot();
    let events = events.as_slice();

    let servers = store.servers_snapshot();
    let volumes = store.volumes_snapshot();
    let domains = store.domains_snapshot();
    let load_balancers = store.load_balancers_snapshot();

    vec![
        DashboardCard::build(
            servers.as_slice(),
            events,
            &store.status(Collection::Servers),
            &plans,
            policy,
        ),
        DashboardCard::build(
            volumes.as_slice(),
            events,
            &store.status(Collection::Volumes),
            &plans,
            policy,
        ),
        DashboardCard::build(
            domains.as_slice(),
            events,
            &store.status(Collection::Domains),
            &plans,
            policy,
        ),
        DashboardCard::build(
            load_balancers.as_slice(),
            events,
            &store.status(Collection::LoadBalancers),
            &plans,
            policy,
        ),
    ]
}
