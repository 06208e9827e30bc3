// ── DNS zone ──

use serde::{Deserialize, Serialize};
use strum::Display;

use super::entity_id::EntityId;

/// Whether we are authoritative for the zone or mirror it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ZoneKind {
    Master,
    Slave,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[non_exhaustive]
pub enum DomainStatus {
    Active,
    Disabled,
    EditMode,
    HasErrors,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Domain {
    pub id: EntityId,
    /// Zone apex; doubles as the display label.
    pub domain: String,
    pub zone_kind: ZoneKind,
    pub status: DomainStatus,
    pub soa_email: Option<String>,
    pub tags: Vec<String>,
}
