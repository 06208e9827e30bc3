// ── Load balancer ──

use serde::{Deserialize, Serialize};

use super::entity_id::EntityId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadBalancer {
    pub id: EntityId,
    pub label: String,
    pub region: String,
    pub hostname: Option<String>,
    pub ipv4: Option<String>,
    /// New connections per second allowed from a single client. 0 = off.
    pub client_conn_throttle: u32,
    pub tags: Vec<String>,
}
