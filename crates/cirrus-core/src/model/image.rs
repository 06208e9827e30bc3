// ── Disk image ──

use serde::{Deserialize, Serialize};

use super::entity_id::EntityId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    /// Slug id, e.g. `public/debian-12` or `private/42`.
    pub id: EntityId,
    pub label: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub size_mb: u64,
    pub vendor: Option<String>,
}
