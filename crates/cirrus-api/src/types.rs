// Wire types for the Cirrus v4 REST API.
//
// These mirror the JSON payloads exactly. `cirrus-core` converts them into
// canonical domain types; nothing outside the core should depend on them.

use std::fmt;

use serde::{Deserialize, Serialize};

// ── Pagination ───────────────────────────────────────────────────────

/// One page of a paginated collection.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    /// 1-based page number.
    #[serde(default = "first_page")]
    pub page: u32,
    /// Total number of pages.
    #[serde(default = "first_page")]
    pub pages: u32,
    /// Total number of items across all pages.
    #[serde(default)]
    pub results: u64,
}

fn first_page() -> u32 {
    1
}

// ── Identifiers ──────────────────────────────────────────────────────

/// Resource id as it appears on the wire: numeric for most resources,
/// a slug for catalog entries (images, server types).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ResourceId {
    Numeric(u64),
    Slug(String),
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Slug(s) => f.write_str(s),
        }
    }
}

// ── Errors ───────────────────────────────────────────────────────────

/// Error body: `{"errors": [{"reason": "...", "field": "..."}]}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default)]
    pub errors: Vec<ErrorReason>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorReason {
    pub reason: String,
    #[serde(default)]
    pub field: Option<String>,
}

// ── Compute ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BackupsResponse {
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerResponse {
    pub id: u64,
    pub label: String,
    pub region: String,
    pub status: String,
    /// Plan id (e.g. `"std-2gb"`).
    #[serde(rename = "type", default)]
    pub plan: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub ipv4: Vec<String>,
    #[serde(default)]
    pub backups: BackupsResponse,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerTypeResponse {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub memory: u64,
    #[serde(default)]
    pub disk: u64,
    #[serde(default)]
    pub vcpus: u32,
    #[serde(default)]
    pub class: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImageResponse {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    /// Size in MB.
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub vendor: Option<String>,
}

// ── Storage ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VolumeResponse {
    pub id: u64,
    pub label: String,
    pub region: String,
    /// Size in GB.
    pub size: u32,
    pub status: String,
    #[serde(default)]
    pub server_id: Option<u64>,
    #[serde(default)]
    pub filesystem_path: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

// ── Networking ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DomainResponse {
    pub id: u64,
    pub domain: String,
    /// Zone kind: `master` or `slave`.
    #[serde(rename = "type")]
    pub zone_type: String,
    pub status: String,
    #[serde(default)]
    pub soa_email: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoadBalancerResponse {
    pub id: u64,
    pub label: String,
    pub region: String,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub ipv4: Option<String>,
    #[serde(default)]
    pub client_conn_throttle: u32,
    #[serde(default)]
    pub tags: Vec<String>,
}

// ── Account ──────────────────────────────────────────────────────────

/// Target of an event or notice.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EntityRefResponse {
    pub id: ResourceId,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EventResponse {
    pub id: u64,
    pub action: String,
    pub status: String,
    #[serde(default)]
    pub entity: Option<EntityRefResponse>,
    pub created: String,
    #[serde(default)]
    pub percent_complete: Option<u8>,
    #[serde(default)]
    pub seen: bool,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NoticeResponse {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub entity: Option<EntityRefResponse>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn resource_id_accepts_numbers_and_slugs() {
        let n: ResourceId = serde_json::from_str("42").unwrap();
        let s: ResourceId = serde_json::from_str("\"public/debian-12\"").unwrap();
        assert_eq!(n, ResourceId::Numeric(42));
        assert_eq!(s.to_string(), "public/debian-12");
    }

    #[test]
    fn page_defaults_when_metadata_missing() {
        let page: Page<u32> = serde_json::from_str(r#"{"data": [1, 2]}"#).unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.pages, 1);
        assert_eq!(page.data, vec![1, 2]);
    }

    #[test]
    fn server_plan_reads_type_field() {
        let server: ServerResponse = serde_json::from_str(
            r#"{"id": 7, "label": "web-01", "region": "us-east", "status": "running", "type": "std-2gb"}"#,
        )
        .unwrap();
        assert_eq!(server.plan.as_deref(), Some("std-2gb"));
        assert!(!server.backups.enabled);
        assert!(server.tags.is_empty());
    }
}
