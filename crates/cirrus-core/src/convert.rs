// ── API-to-domain type conversions ──
//
// Bridges raw `cirrus_api` response types into canonical `cirrus_core::model`
// domain types. Each `From` impl normalizes field names, parses strings into
// strong types, and fills sensible defaults for missing optional data.

use chrono::{DateTime, NaiveDateTime, Utc};

use cirrus_api::types;

use crate::model::{
    AccountNotice, Backups, Domain, DomainStatus, EntityId, EntityKind, EntityRef, Event,
    EventAction, EventStatus, Image, LoadBalancer, NoticeKind, NoticeSeverity, Server,
    ServerStatus, ServerType, Volume, VolumeStatus, ZoneKind,
};

// ── Helpers ────────────────────────────────────────────────────────

/// Parse an API timestamp. The API emits naive UTC (`2026-01-02T03:04:05`);
/// RFC 3339 with an offset is accepted too.
fn parse_datetime(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

fn parse_server_status(raw: &str) -> ServerStatus {
    match raw {
        "running" => ServerStatus::Running,
        "offline" => ServerStatus::Offline,
        "booting" => ServerStatus::Booting,
        "rebooting" => ServerStatus::Rebooting,
        "shutting_down" => ServerStatus::ShuttingDown,
        "provisioning" => ServerStatus::Provisioning,
        "deleting" => ServerStatus::Deleting,
        "migrating" => ServerStatus::Migrating,
        "rebuilding" => ServerStatus::Rebuilding,
        "cloning" => ServerStatus::Cloning,
        "restoring" => ServerStatus::Restoring,
        "resizing" => ServerStatus::Resizing,
        "stopped" => ServerStatus::Stopped,
        _ => ServerStatus::Unknown,
    }
}

fn parse_volume_status(raw: &str) -> VolumeStatus {
    match raw {
        "creating" => VolumeStatus::Creating,
        "active" => VolumeStatus::Active,
        "resizing" => VolumeStatus::Resizing,
        _ => VolumeStatus::Unknown,
    }
}

fn parse_domain_status(raw: &str) -> DomainStatus {
    match raw {
        "active" => DomainStatus::Active,
        "disabled" => DomainStatus::Disabled,
        "edit_mode" => DomainStatus::EditMode,
        "has_errors" => DomainStatus::HasErrors,
        _ => DomainStatus::Unknown,
    }
}

fn parse_event_status(raw: &str) -> EventStatus {
    match raw {
        "scheduled" => EventStatus::Scheduled,
        "started" => EventStatus::Started,
        "finished" => EventStatus::Finished,
        "failed" => EventStatus::Failed,
        "notification" => EventStatus::Notification,
        _ => EventStatus::Unknown,
    }
}

fn parse_notice_kind(raw: &str) -> NoticeKind {
    match raw {
        "migration_scheduled" => NoticeKind::MigrationScheduled,
        "migration_pending" => NoticeKind::MigrationPending,
        "maintenance" => NoticeKind::Maintenance,
        "outage" => NoticeKind::Outage,
        _ => NoticeKind::Other,
    }
}

fn parse_severity(raw: Option<&str>) -> NoticeSeverity {
    match raw {
        Some("major") => NoticeSeverity::Major,
        Some("critical") => NoticeSeverity::Critical,
        _ => NoticeSeverity::Minor,
    }
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.trim().is_empty())
}

// ── Compute ────────────────────────────────────────────────────────

impl From<types::ServerResponse> for Server {
    fn from(s: types::ServerResponse) -> Self {
        Self {
            id: EntityId::Numeric(s.id),
            status: parse_server_status(&s.status),
            created: parse_datetime(s.created.as_deref()),
            label: s.label,
            region: s.region,
            server_type: non_empty(s.plan),
            image: non_empty(s.image),
            ipv4: s.ipv4,
            backups: Backups {
                enabled: s.backups.enabled,
            },
            tags: s.tags,
            recent_event: None,
        }
    }
}

impl From<types::ServerTypeResponse> for ServerType {
    fn from(t: types::ServerTypeResponse) -> Self {
        Self {
            id: t.id,
            label: t.label,
            memory_mb: t.memory,
            disk_mb: t.disk,
            vcpus: t.vcpus,
            class: t.class,
        }
    }
}

impl From<types::ImageResponse> for Image {
    fn from(i: types::ImageResponse) -> Self {
        Self {
            id: EntityId::Slug(i.id),
            label: i.label,
            description: non_empty(i.description),
            is_public: i.is_public,
            size_mb: i.size,
            vendor: non_empty(i.vendor),
        }
    }
}

// ── Storage ────────────────────────────────────────────────────────

impl From<types::VolumeResponse> for Volume {
    fn from(v: types::VolumeResponse) -> Self {
        Self {
            id: EntityId::Numeric(v.id),
            status: parse_volume_status(&v.status),
            label: v.label,
            region: v.region,
            size_gb: v.size,
            server_id: v.server_id.map(EntityId::Numeric),
            filesystem_path: non_empty(v.filesystem_path),
            tags: v.tags,
            recent_event: None,
        }
    }
}

// ── Networking ─────────────────────────────────────────────────────

impl From<types::DomainResponse> for Domain {
    fn from(d: types::DomainResponse) -> Self {
        let zone_kind = match d.zone_type.as_str() {
            "master" => ZoneKind::Master,
            "slave" => ZoneKind::Slave,
            _ => ZoneKind::Unknown,
        };
        Self {
            id: EntityId::Numeric(d.id),
            status: parse_domain_status(&d.status),
            domain: d.domain,
            zone_kind,
            soa_email: non_empty(d.soa_email),
            tags: d.tags,
        }
    }
}

impl From<types::LoadBalancerResponse> for LoadBalancer {
    fn from(lb: types::LoadBalancerResponse) -> Self {
        Self {
            id: EntityId::Numeric(lb.id),
            label: lb.label,
            region: lb.region,
            hostname: non_empty(lb.hostname),
            ipv4: non_empty(lb.ipv4),
            client_conn_throttle: lb.client_conn_throttle,
            tags: lb.tags,
        }
    }
}

// ── Account ────────────────────────────────────────────────────────

impl From<types::EntityRefResponse> for EntityRef {
    fn from(e: types::EntityRefResponse) -> Self {
        Self {
            id: EntityId::from(e.id),
            kind: EntityKind::from_wire(&e.kind),
            label: e.label,
        }
    }
}

impl From<types::EventResponse> for Event {
    fn from(e: types::EventResponse) -> Self {
        Self {
            id: e.id,
            action: EventAction::from(e.action),
            status: parse_event_status(&e.status),
            entity: e.entity.map(EntityRef::from),
            created: parse_datetime(Some(&e.created)),
            percent_complete: e.percent_complete,
            seen: e.seen,
            username: e.username,
        }
    }
}

impl From<types::NoticeResponse> for AccountNotice {
    fn from(n: types::NoticeResponse) -> Self {
        Self {
            kind: parse_notice_kind(&n.kind),
            severity: parse_severity(n.severity.as_deref()),
            message: n.message,
            label: n.label,
            entity: n.entity.map(EntityRef::from),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn naive_timestamps_are_utc() {
        let dt = parse_datetime(Some("2026-01-02T03:04:05")).unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2026, 1, 2));
        assert_eq!(dt.hour(), 3);
    }

    #[test]
    fn garbage_timestamp_is_none() {
        assert!(parse_datetime(Some("yesterday")).is_none());
        assert!(parse_datetime(None).is_none());
    }

    #[test]
    fn server_conversion() {
        let raw: types::ServerResponse = serde_json::from_value(serde_json::json!({
            "id": 12,
            "label": "web-01",
            "region": "eu-west",
            "status": "shutting_down",
            "type": "std-2gb",
            "image": "",
            "backups": { "enabled": true }
        }))
        .unwrap();

        let server = Server::from(raw);
        assert_eq!(server.id, EntityId::Numeric(12));
        assert_eq!(server.status, ServerStatus::ShuttingDown);
        assert_eq!(server.server_type.as_deref(), Some("std-2gb"));
        assert!(server.image.is_none());
        assert!(server.backups.enabled);
        assert!(server.recent_event.is_none());
    }

    #[test]
    fn event_entity_kind_and_id() {
        let raw: types::EventResponse = serde_json::from_value(serde_json::json!({
            "id": 5,
            "action": "volume_attach",
            "status": "started",
            "entity": { "id": 33, "type": "volume", "label": "data" },
            "created": "2026-03-01T10:00:00"
        }))
        .unwrap();

        let event = Event::from(raw);
        assert_eq!(event.action, EventAction::VolumeAttach);
        assert!(event.targets(EntityKind::Volume, &EntityId::Numeric(33)));
        assert!(event.is_in_progress());
    }

    #[test]
    fn unknown_notice_kind_is_other() {
        let raw: types::NoticeResponse = serde_json::from_value(serde_json::json!({
            "type": "payment_due",
            "message": "Invoice overdue"
        }))
        .unwrap();
        let notice = AccountNotice::from(raw);
        assert_eq!(notice.kind, NoticeKind::Other);
        assert_eq!(notice.severity, NoticeSeverity::Minor);
    }
}
