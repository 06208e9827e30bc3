// Test fixtures shared by the unit tests of this crate.

use crate::model::{
    Backups, Domain, DomainStatus, EntityId, EntityKind, EntityRef, Event, EventAction,
    EventStatus, Image, LoadBalancer, Server, ServerStatus, ServerType, Volume, VolumeStatus,
    ZoneKind,
};

pub(crate) fn server(id: u64, label: &str) -> Server {
    Server {
        id: EntityId::Numeric(id),
        label: label.into(),
        region: "us-east".into(),
        status: ServerStatus::Running,
        server_type: Some("std-2gb".into()),
        image: Some("public/debian-12".into()),
        ipv4: vec!["203.0.113.10".into()],
        backups: Backups { enabled: true },
        tags: Vec::new(),
        created: None,
        recent_event: None,
    }
}

pub(crate) fn volume(id: u64, label: &str, region: &str, server_id: Option<u64>) -> Volume {
    Volume {
        id: EntityId::Numeric(id),
        label: label.into(),
        region: region.into(),
        size_gb: 20,
        status: VolumeStatus::Active,
        server_id: server_id.map(EntityId::Numeric),
        filesystem_path: None,
        tags: Vec::new(),
        recent_event: None,
    }
}

pub(crate) fn domain(id: u64, name: &str) -> Domain {
    Domain {
        id: EntityId::Numeric(id),
        domain: name.into(),
        zone_kind: ZoneKind::Master,
        status: DomainStatus::Active,
        soa_email: None,
        tags: Vec::new(),
    }
}

pub(crate) fn load_balancer(id: u64, label: &str) -> LoadBalancer {
    LoadBalancer {
        id: EntityId::Numeric(id),
        label: label.into(),
        region: "us-east".into(),
        hostname: Some(format!("lb-{id}.cirrus.example")),
        ipv4: None,
        client_conn_throttle: 0,
        tags: Vec::new(),
    }
}

pub(crate) fn image(id: &str, label: &str, is_public: bool) -> Image {
    Image {
        id: EntityId::Slug(id.into()),
        label: label.into(),
        description: None,
        is_public,
        size_mb: 2500,
        vendor: Some("Debian".into()),
    }
}

pub(crate) fn server_type(id: &str, label: &str) -> ServerType {
    ServerType {
        id: id.into(),
        label: label.into(),
        memory_mb: 2048,
        disk_mb: 51_200,
        vcpus: 1,
        class: Some("standard".into()),
    }
}

/// In-progress boot event for server `target`.
pub(crate) fn server_event(id: u64, target: u64) -> Event {
    Event {
        id,
        action: EventAction::ServerBoot,
        status: EventStatus::Started,
        entity: Some(EntityRef {
            id: EntityId::Numeric(target),
            kind: EntityKind::Server,
            label: None,
        }),
        created: None,
        percent_complete: Some(50),
        seen: false,
        username: Some("ops".into()),
    }
}
