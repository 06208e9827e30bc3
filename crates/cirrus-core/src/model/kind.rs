// ── Entity kinds ──
//
// The closed set of entity kinds the panel knows how to list, search and
// link to. Unknown wire values are kept as `Unknown` so events about
// resources we do not model still deserialize.

use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};

use super::EntityId;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
    Server,
    Volume,
    Domain,
    LoadBalancer,
    Image,
    #[serde(other)]
    Unknown,
}

impl EntityKind {
    /// Order in which search result groups are presented.
    pub const DISPLAY_ORDER: [EntityKind; 5] = [
        Self::Server,
        Self::Domain,
        Self::Volume,
        Self::LoadBalancer,
        Self::Image,
    ];

    /// Parse a wire name, mapping anything unrecognized to `Unknown`.
    pub fn from_wire(raw: &str) -> Self {
        match raw {
            "server" => Self::Server,
            "volume" => Self::Volume,
            "domain" => Self::Domain,
            "load_balancer" => Self::LoadBalancer,
            "image" => Self::Image,
            _ => Self::Unknown,
        }
    }

    /// Plural heading ("Servers", "Load Balancers", ...).
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Server => "Servers",
            Self::Volume => "Volumes",
            Self::Domain => "Domains",
            Self::LoadBalancer => "Load Balancers",
            Self::Image => "Images",
            Self::Unknown => "Other",
        }
    }

    /// Route prefix for detail views.
    pub fn path_prefix(self) -> &'static str {
        match self {
            Self::Server => "/servers",
            Self::Volume => "/volumes",
            Self::Domain => "/domains",
            Self::LoadBalancer => "/load-balancers",
            Self::Image => "/images",
            Self::Unknown => "/",
        }
    }

    /// Route of the detail view for one entity of this kind.
    pub fn detail_path(self, id: &EntityId) -> String {
        format!("{}/{id}", self.path_prefix())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_are_snake_case() {
        let kind: EntityKind = serde_json::from_str("\"load_balancer\"").unwrap();
        assert_eq!(kind, EntityKind::LoadBalancer);
        assert_eq!(EntityKind::LoadBalancer.to_string(), "load_balancer");
    }

    #[test]
    fn unknown_wire_value_is_kept() {
        let kind: EntityKind = serde_json::from_str("\"stackscript\"").unwrap();
        assert_eq!(kind, EntityKind::Unknown);
        assert_eq!(EntityKind::from_wire("stackscript"), EntityKind::Unknown);
    }

    #[test]
    fn display_order_starts_with_servers_then_domains() {
        let names: Vec<_> = EntityKind::DISPLAY_ORDER
            .iter()
            .map(|k| k.display_name())
            .collect();
        assert_eq!(
            names,
            vec!["Servers", "Domains", "Volumes", "Load Balancers", "Images"]
        );
    }

    #[test]
    fn detail_paths() {
        assert_eq!(
            EntityKind::Image.detail_path(&EntityId::from("private/12")),
            "/images/private/12"
        );
        assert_eq!(
            EntityKind::LoadBalancer.detail_path(&EntityId::Numeric(3)),
            "/load-balancers/3"
        );
    }
}
