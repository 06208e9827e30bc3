// ── Core identity type ──
//
// EntityId is the foundation of every domain type. It unifies numeric
// resource ids (servers, volumes, ...) and string slugs (images, plans)
// behind a single ergonomic interface.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical identifier for any Cirrus entity.
///
/// Transparently wraps either a numeric id or a string slug such as
/// `"public/debian-12"`. Consumers never care which.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Numeric(u64),
    Slug(String),
}

impl EntityId {
    pub fn as_numeric(&self) -> Option<u64> {
        match self {
            Self::Numeric(n) => Some(*n),
            Self::Slug(_) => None,
        }
    }

    pub fn as_slug(&self) -> Option<&str> {
        match self {
            Self::Slug(s) => Some(s),
            Self::Numeric(_) => None,
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Slug(s) => f.write_str(s),
        }
    }
}

impl FromStr for EntityId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_owned()))
    }
}

impl From<u64> for EntityId {
    fn from(n: u64) -> Self {
        Self::Numeric(n)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        match s.parse::<u64>() {
            Ok(n) => Self::Numeric(n),
            Err(_) => Self::Slug(s),
        }
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self::from(s.to_owned())
    }
}

impl From<cirrus_api::types::ResourceId> for EntityId {
    fn from(id: cirrus_api::types::ResourceId) -> Self {
        match id {
            cirrus_api::types::ResourceId::Numeric(n) => Self::Numeric(n),
            cirrus_api::types::ResourceId::Slug(s) => Self::Slug(s),
        }
    }
}
