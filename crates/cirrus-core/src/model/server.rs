// ── Server domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;

use super::entity_id::EntityId;
use super::event::Event;

/// Server power / lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[non_exhaustive]
pub enum ServerStatus {
    Running,
    Offline,
    Booting,
    Rebooting,
    ShuttingDown,
    Provisioning,
    Deleting,
    Migrating,
    Rebuilding,
    Cloning,
    Restoring,
    Resizing,
    Stopped,
    Unknown,
}

impl ServerStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    pub fn is_transitional(&self) -> bool {
        !matches!(
            self,
            Self::Running | Self::Offline | Self::Stopped | Self::Unknown
        )
    }
}

/// Backup service enrollment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Backups {
    pub enabled: bool,
}

/// A compute instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub id: EntityId,
    pub label: String,
    pub region: String,
    pub status: ServerStatus,
    /// Plan id, resolved to a display name through the server-type table.
    pub server_type: Option<String>,
    pub image: Option<String>,
    pub ipv4: Vec<String>,
    pub backups: Backups,
    pub tags: Vec<String>,
    pub created: Option<DateTime<Utc>>,

    /// In-flight lifecycle event attached by `merge_events`. Never read
    /// from the API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent_event: Option<Event>,
}
