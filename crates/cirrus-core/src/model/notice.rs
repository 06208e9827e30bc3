// ── Account notices ──
//
// Standing notices about the account or a resource: scheduled migrations,
// maintenance windows, outages.

use serde::{Deserialize, Serialize};
use strum::Display;

use super::event::EntityRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NoticeKind {
    MigrationScheduled,
    MigrationPending,
    Maintenance,
    Outage,
    #[serde(other)]
    Other,
}

impl NoticeKind {
    pub fn is_migration(self) -> bool {
        matches!(self, Self::MigrationScheduled | Self::MigrationPending)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeSeverity {
    #[default]
    Minor,
    Major,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountNotice {
    pub kind: NoticeKind,
    pub message: String,
    pub label: Option<String>,
    pub severity: NoticeSeverity,
    pub entity: Option<EntityRef>,
}
