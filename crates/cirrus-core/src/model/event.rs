// ── Account event domain types ──
//
// Events are the API's lifecycle log: every boot, resize, attach and so on
// is recorded with a status and, while running, a completion percentage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;

use super::entity_id::EntityId;
use super::kind::EntityKind;

/// What happened. Unrecognized actions are preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventAction {
    ServerCreate,
    ServerDelete,
    ServerBoot,
    ServerReboot,
    ServerShutdown,
    ServerMigrate,
    ServerResize,
    ServerRebuild,
    ServerClone,
    BackupsRestore,
    VolumeCreate,
    VolumeAttach,
    VolumeDetach,
    VolumeResize,
    VolumeDelete,
    Other(String),
}

impl EventAction {
    pub fn as_str(&self) -> &str {
        match self {
            Self::ServerCreate => "server_create",
            Self::ServerDelete => "server_delete",
            Self::ServerBoot => "server_boot",
            Self::ServerReboot => "server_reboot",
            Self::ServerShutdown => "server_shutdown",
            Self::ServerMigrate => "server_migrate",
            Self::ServerResize => "server_resize",
            Self::ServerRebuild => "server_rebuild",
            Self::ServerClone => "server_clone",
            Self::BackupsRestore => "backups_restore",
            Self::VolumeCreate => "volume_create",
            Self::VolumeAttach => "volume_attach",
            Self::VolumeDetach => "volume_detach",
            Self::VolumeResize => "volume_resize",
            Self::VolumeDelete => "volume_delete",
            Self::Other(raw) => raw,
        }
    }

    /// Present-participle wording for progress rows ("Booting").
    pub fn progress_verb(&self) -> String {
        match self {
            Self::ServerCreate | Self::VolumeCreate => "Provisioning".into(),
            Self::ServerDelete | Self::VolumeDelete => "Deleting".into(),
            Self::ServerBoot => "Booting".into(),
            Self::ServerReboot => "Rebooting".into(),
            Self::ServerShutdown => "Shutting down".into(),
            Self::ServerMigrate => "Migrating".into(),
            Self::ServerResize | Self::VolumeResize => "Resizing".into(),
            Self::ServerRebuild => "Rebuilding".into(),
            Self::ServerClone => "Cloning".into(),
            Self::BackupsRestore => "Restoring".into(),
            Self::VolumeAttach => "Attaching".into(),
            Self::VolumeDetach => "Detaching".into(),
            Self::Other(raw) => raw.replace('_', " "),
        }
    }
}

impl From<String> for EventAction {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "server_create" => Self::ServerCreate,
            "server_delete" => Self::ServerDelete,
            "server_boot" => Self::ServerBoot,
            "server_reboot" => Self::ServerReboot,
            "server_shutdown" => Self::ServerShutdown,
            "server_migrate" => Self::ServerMigrate,
            "server_resize" => Self::ServerResize,
            "server_rebuild" => Self::ServerRebuild,
            "server_clone" => Self::ServerClone,
            "backups_restore" => Self::BackupsRestore,
            "volume_create" => Self::VolumeCreate,
            "volume_attach" => Self::VolumeAttach,
            "volume_detach" => Self::VolumeDetach,
            "volume_resize" => Self::VolumeResize,
            "volume_delete" => Self::VolumeDelete,
            _ => Self::Other(raw),
        }
    }
}

impl From<EventAction> for String {
    fn from(action: EventAction) -> Self {
        match action {
            EventAction::Other(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventStatus {
    Scheduled,
    Started,
    Finished,
    Failed,
    Notification,
    #[serde(other)]
    Unknown,
}

/// Reference to the resource an event or notice is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: EntityId,
    pub kind: EntityKind,
    pub label: Option<String>,
}

/// One entry of the account event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: u64,
    pub action: EventAction,
    pub status: EventStatus,
    pub entity: Option<EntityRef>,
    pub created: Option<DateTime<Utc>>,
    pub percent_complete: Option<u8>,
    pub seen: bool,
    pub username: Option<String>,
}

impl Event {
    /// The event targets a concrete resource.
    pub fn is_entity_event(&self) -> bool {
        self.entity.is_some()
    }

    /// Scheduled or started, and not yet at 100%.
    pub fn is_in_progress(&self) -> bool {
        matches!(self.status, EventStatus::Scheduled | EventStatus::Started)
            && self.percent_complete.is_none_or(|p| p < 100)
    }

    /// Does this event target the entity `(kind, id)`?
    pub fn targets(&self, kind: EntityKind, id: &EntityId) -> bool {
        self.entity
            .as_ref()
            .is_some_and(|e| e.kind == kind && &e.id == id)
    }

    /// "Booting (40%)" style summary for list rows.
    pub fn progress_label(&self) -> String {
        let verb = self.action.progress_verb();
        match (self.status, self.percent_complete) {
            (EventStatus::Scheduled, _) => format!("{verb} (scheduled)"),
            (_, Some(pct)) => format!("{verb} ({pct}%)"),
            (_, None) => verb,
        }
    }
}
