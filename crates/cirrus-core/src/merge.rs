// ── Event merge ──
//
// Folds in-progress lifecycle events into an entity list so that list
// views can show in-flight operations (a server booting, a volume
// attaching) without waiting for the next refresh.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::sync::Arc;

use crate::model::{Entity, EntityId, Event, Server, Volume};

/// An entity that can carry a `recent_event`.
pub trait Trackable: Entity {
    fn attach_event(&mut self, event: Event);
}

impl Trackable for Server {
    fn attach_event(&mut self, event: Event) {
        self.recent_event = Some(event);
    }
}

impl Trackable for Volume {
    fn attach_event(&mut self, event: Event) {
        self.recent_event = Some(event);
    }
}

impl<T: Trackable + Clone> Trackable for Arc<T> {
    fn attach_event(&mut self, event: Event) {
        Arc::make_mut(self).attach_event(event);
    }
}

/// Does `event` belong on a list of `T`?
fn is_wanted<T: Trackable>(event: &Event) -> bool {
    event.is_in_progress()
        && event
            .entity
            .as_ref()
            .is_some_and(|target| target.kind == T::KIND)
}

/// Attach in-progress events to the entities they target.
///
/// Events are folded in log order, so a later qualifying event for the
/// same entity wins. Entities without a matching event pass through
/// unchanged, and the output has the same length and order as the input.
pub fn merge_events<T, E>(entities: &[T], events: &[E]) -> Vec<T>
where
    T: Trackable + Clone,
    E: Borrow<Event>,
{
    let mut latest: HashMap<&EntityId, &Event> = HashMap::new();
    for event in events.iter().map(<E as Borrow<Event>>::borrow) {
        if !is_wanted::<T>(event) {
            continue;
        }
        if let Some(target) = &event.entity {
            latest.insert(&target.id, event);
        }
    }

    entities
        .iter()
        .map(|entity| {
            let mut out = entity.clone();
            if let Some(event) = latest.get(entity.id()) {
                out.attach_event((*event).clone());
            }
            out
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{
        Backups, EntityKind, EntityRef, EventAction, EventStatus, ServerStatus, VolumeStatus,
    };

    fn server(id: u64, label: &str) -> Server {
        Server {
            id: EntityId::Numeric(id),
            label: label.into(),
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

    fn volume(id: u64) -> Volume {
        Volume {
            id: EntityId::Numeric(id),
            label: format!("vol-{id}"),
            region: "us-east".into(),
            size_gb: 20,
            status: VolumeStatus::Active,
            server_id: None,
            filesystem_path: None,
            tags: Vec::new(),
            recent_event: None,
        }
    }

    fn event(id: u64, kind: EntityKind, target: u64, status: EventStatus) -> Event {
        Event {
            id,
            action: EventAction::ServerBoot,
            status,
            entity: Some(EntityRef {
                id: EntityId::Numeric(target),
                kind,
                label: None,
            }),
            created: None,
            percent_complete: Some(30),
            seen: false,
            username: None,
        }
    }

    fn attached(list: &[Server]) -> Vec<Option<u64>> {
        list.iter()
            .map(|s| s.recent_event.as_ref().map(|e| e.id))
            .collect()
    }

    #[test]
    fn only_the_targeted_server_gains_an_event() {
        let servers = vec![server(1, "a"), server(2, "b")];
        let events = vec![event(10, EntityKind::Server, 1, EventStatus::Started)];

        let merged = merge_events(&servers, &events);
        assert_eq!(attached(&merged), vec![Some(10), None]);
    }

    #[test]
    fn no_events_is_identity() {
        let servers = vec![server(1, "a"), server(2, "b")];
        let merged = merge_events::<_, Event>(&servers, &[]);
        assert_eq!(merged.len(), 2);
        assert_eq!(attached(&merged), vec![None, None]);
        assert_eq!(merged[0].label, "a");
        assert_eq!(merged[1].label, "b");
    }

    #[test]
    fn preserves_length_and_order() {
        let servers = vec![server(3, "c"), server(1, "a"), server(2, "b")];
        let events = vec![
            event(10, EntityKind::Server, 2, EventStatus::Started),
            event(11, EntityKind::Server, 3, EventStatus::Scheduled),
        ];
        let merged = merge_events(&servers, &events);
        let ids: Vec<_> = merged.iter().map(|s| s.id.clone()).collect();
        assert_eq!(
            ids,
            vec![EntityId::Numeric(3), EntityId::Numeric(1), EntityId::Numeric(2)]
        );
        assert_eq!(attached(&merged), vec![Some(11), None, Some(10)]);
    }

    #[test]
    fn later_event_overwrites_earlier() {
        let servers = vec![server(1, "a")];
        let events = vec![
            event(10, EntityKind::Server, 1, EventStatus::Started),
            event(11, EntityKind::Server, 1, EventStatus::Started),
        ];
        let merged = merge_events(&servers, &events);
        assert_eq!(attached(&merged), vec![Some(11)]);
    }

    #[test]
    fn finished_and_foreign_kind_events_are_ignored() {
        let servers = vec![server(1, "a")];
        let events = vec![
            event(10, EntityKind::Server, 1, EventStatus::Finished),
            event(11, EntityKind::Volume, 1, EventStatus::Started),
        ];
        let merged = merge_events(&servers, &events);
        assert_eq!(attached(&merged), vec![None]);
    }

    #[test]
    fn event_for_missing_entity_has_no_effect() {
        let servers = vec![server(1, "a")];
        let events = vec![event(10, EntityKind::Server, 99, EventStatus::Started)];
        let merged = merge_events(&servers, &events);
        assert_eq!(attached(&merged), vec![None]);
    }

    #[test]
    fn events_without_entity_are_ignored() {
        let servers = vec![server(1, "a")];
        let mut ev = event(10, EntityKind::Server, 1, EventStatus::Started);
        ev.entity = None;
        let merged = merge_events(&servers, &[ev]);
        assert_eq!(attached(&merged), vec![None]);
    }

    #[test]
    fn volumes_take_volume_events() {
        let volumes = vec![volume(5)];
        let events = vec![Arc::new(event(
            20,
            EntityKind::Volume,
            5,
            EventStatus::Started,
        ))];
        let merged = merge_events(&volumes, &events);
        assert_eq!(merged[0].recent_event.as_ref().map(|e| e.id), Some(20));
    }

    #[test]
    fn arc_entities_are_copied_on_write() {
        let original = Arc::new(server(1, "a"));
        let list = vec![Arc::clone(&original)];
        let events = vec![event(10, EntityKind::Server, 1, EventStatus::Started)];

        let merged = merge_events(&list, &events);
        assert!(merged[0].recent_event.is_some());
        assert!(original.recent_event.is_none());
    }
}
