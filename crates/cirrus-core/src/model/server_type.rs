// ── Server plan ──

use serde::{Deserialize, Serialize};

/// A purchasable server plan. Servers reference it by `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerType {
    pub id: String,
    /// Display name, e.g. "Standard 2GB".
    pub label: String,
    pub memory_mb: u64,
    pub disk_mb: u64,
    pub vcpus: u32,
    pub class: Option<String>,
}
