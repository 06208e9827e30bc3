// Fixtures and render helpers shared by the screen tests.
#![allow(clippy::unwrap_used)]

use ratatui::{Terminal, backend::TestBackend, buffer::Buffer};

use cirrus_core::{
    AccountNotice, Backups, EntityId, EntityKind, EntityRef, Event, EventAction, EventStatus,
    NoticeKind, NoticeSeverity, Server, ServerStatus, Volume, VolumeStatus,
};

use crate::component::Component;

pub fn server(id: u64, label: &str) -> Server {
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

pub fn volume(id: u64, label: &str, region: &str, server_id: Option<u64>) -> Volume {
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

/// Started boot event for server `target`.
pub fn boot_event(id: u64, target: u64, pct: Option<u8>) -> Event {
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
        percent_complete: pct,
        seen: false,
        username: None,
    }
}

pub fn migration_notice(target: u64, kind: NoticeKind, message: &str) -> AccountNotice {
    AccountNotice {
        kind,
        message: message.into(),
        label: None,
        severity: NoticeSeverity::Major,
        entity: Some(EntityRef {
            id: EntityId::Numeric(target),
            kind: EntityKind::Server,
            label: None,
        }),
    }
}

/// Render a component into a `TestBackend` and return the screen text,
/// one line per row.
pub fn render_text(component: &dyn Component, width: u16, height: u16) -> String {
    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal
        .draw(|frame| component.render(frame, frame.area()))
        .unwrap();
    buffer_text(terminal.backend().buffer())
}

pub fn buffer_text(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut out = String::new();
    for y in 0..area.height {
        for x in 0..area.width {
            out.push_str(buffer[(x, y)].symbol());
        }
        out.push('\n');
    }
    out
}
