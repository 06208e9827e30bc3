// ── Unified domain model ──
//
// Every type in this module is the canonical representation of a Cirrus
// entity. Consumers (CLI/TUI) depend on these, never on wire types.

pub mod entity_id;
pub mod kind;

pub mod domain;
pub mod event;
pub mod image;
pub mod load_balancer;
pub mod notice;
pub mod server;
pub mod server_type;
pub mod volume;

use std::sync::Arc;

// ── Re-exports ──────────────────────────────────────────────────────
// Flat access: `use cirrus_core::model::*` gives you everything.

pub use entity_id::EntityId;
pub use kind::EntityKind;

pub use domain::{Domain, DomainStatus, ZoneKind};
pub use event::{EntityRef, Event, EventAction, EventStatus};
pub use image::Image;
pub use load_balancer::LoadBalancer;
pub use notice::{AccountNotice, NoticeKind, NoticeSeverity};
pub use server::{Backups, Server, ServerStatus};
pub use server_type::ServerType;
pub use volume::{Volume, VolumeStatus};

// ── Shared accessors ────────────────────────────────────────────────

/// Anything with an id, a kind and a human label.
pub trait Entity {
    const KIND: EntityKind;

    fn id(&self) -> &EntityId;
    fn label(&self) -> &str;
}

impl<T: Entity> Entity for Arc<T> {
    const KIND: EntityKind = T::KIND;

    fn id(&self) -> &EntityId {
        T::id(self)
    }

    fn label(&self) -> &str {
        T::label(self)
    }
}

macro_rules! impl_entity {
    ($ty:ty, $kind:expr, $label:ident) => {
        impl Entity for $ty {
            const KIND: EntityKind = $kind;

            fn id(&self) -> &EntityId {
                &self.id
            }

            fn label(&self) -> &str {
                &self.$label
            }
        }
    };
}

impl_entity!(Server, EntityKind::Server, label);
impl_entity!(Volume, EntityKind::Volume, label);
impl_entity!(Domain, EntityKind::Domain, domain);
impl_entity!(LoadBalancer, EntityKind::LoadBalancer, label);
impl_entity!(Image, EntityKind::Image, label);
