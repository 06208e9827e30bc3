// ── Block storage volume ──

use serde::{Deserialize, Serialize};
use strum::Display;

use super::entity_id::EntityId;
use super::event::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[non_exhaustive]
pub enum VolumeStatus {
    Creating,
    Active,
    Resizing,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Volume {
    pub id: EntityId,
    pub label: String,
    pub region: String,
    pub size_gb: u32,
    pub status: VolumeStatus,
    /// Server the volume is attached to, if any.
    pub server_id: Option<EntityId>,
    pub filesystem_path: Option<String>,
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent_event: Option<Event>,
}

impl Volume {
    pub fn is_attached(&self) -> bool {
        self.server_id.is_some()
    }
}
