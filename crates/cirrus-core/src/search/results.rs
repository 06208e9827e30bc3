// ── Search result types ──

use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;

use crate::model::{EntityId, EntityKind};

/// Shown when fetching the search corpus fails.
pub const SEARCH_ERROR_MESSAGE: &str = "There was an error retrieving your search results.";

/// How well a hit matched. Lower sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Relevance {
    /// Label equals the query.
    Exact,
    /// Label starts with the query.
    Prefix,
    /// Query appears inside the label.
    Substring,
    /// Only the server's plan name matched.
    TypeName,
}

/// One matched entity, ready to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub kind: EntityKind,
    pub id: EntityId,
    pub label: String,
    pub description: String,
    /// Route of the entity's detail view.
    pub path: String,
    pub tags: Vec<String>,
    pub relevance: Relevance,
}

/// Hits grouped by kind. Every kind in [`EntityKind::DISPLAY_ORDER`] is
/// always present, in that order, possibly with no hits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SearchResults {
    groups: IndexMap<EntityKind, Vec<SearchHit>>,
}

impl SearchResults {
    /// The canonical "no hits" value.
    pub fn empty() -> Self {
        Self {
            groups: EntityKind::DISPLAY_ORDER
                .iter()
                .map(|k| (*k, Vec::new()))
                .collect(),
        }
    }

    /// Replace the hits of one kind. Unknown kinds are ignored.
    pub(crate) fn set(&mut self, kind: EntityKind, hits: Vec<SearchHit>) {
        if let Some(slot) = self.groups.get_mut(&kind) {
            *slot = hits;
        }
    }

    pub fn get(&self, kind: EntityKind) -> &[SearchHit] {
        self.groups.get(&kind).map_or(&[], Vec::as_slice)
    }

    /// Groups in display order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityKind, &[SearchHit])> {
        self.groups.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    pub fn total(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl Default for SearchResults {
    fn default() -> Self {
        Self::empty()
    }
}

/// Where a search view is in its lifecycle.
///
/// `Idle` (nothing searched yet) is distinct from `Done` with empty
/// results, so "no results" only renders after a completed search.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchState {
    #[default]
    Idle,
    Loading,
    Done(Arc<SearchResults>),
    Failed(String),
}

impl SearchState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn results(&self) -> Option<&Arc<SearchResults>> {
        match self {
            Self::Done(r) => Some(r),
            _ => None,
        }
    }

    /// A completed search that found nothing.
    pub fn is_no_results(&self) -> bool {
        self.results().is_some_and(|r| r.is_empty())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_results_have_every_kind() {
        let results = SearchResults::empty();
        let kinds: Vec<_> = results.iter().map(|(k, _)| k).collect();
        assert_eq!(kinds, EntityKind::DISPLAY_ORDER.to_vec());
        assert!(results.iter().all(|(_, hits)| hits.is_empty()));
        assert!(results.is_empty());
    }

    #[test]
    fn set_ignores_unknown_kind() {
        let mut results = SearchResults::empty();
        results.set(EntityKind::Unknown, Vec::new());
        assert_eq!(results.iter().count(), 5);
        assert!(results.get(EntityKind::Unknown).is_empty());
    }

    #[test]
    fn idle_is_not_no_results() {
        assert!(!SearchState::Idle.is_no_results());
        assert!(SearchState::Done(Arc::new(SearchResults::empty())).is_no_results());
    }

    #[test]
    fn serializes_as_map_in_display_order() {
        let json = serde_json::to_string(&SearchResults::empty()).unwrap();
        insta::assert_snapshot!(json, @r#"{"server":[],"domain":[],"volume":[],"load_balancer":[],"image":[]}"#);
    }
}
