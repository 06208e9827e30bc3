use serde::Serialize;

use crate::model::EntityKind;
use crate::search::{SearchHit, SearchResults, SearchState};

/// Hits of one kind, capped for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultGroup {
    pub kind: EntityKind,
    pub title: &'static str,
    pub hits: Vec<SearchHit>,
    /// Hits before the cap.
    pub total: usize,
}

impl ResultGroup {
    pub fn is_truncated(&self) -> bool {
        self.total > self.hits.len()
    }

    /// "showing 100 of 240" when capped.
    pub fn showing(&self) -> Option<String> {
        self.is_truncated()
            .then(|| format!("showing {} of {}", self.hits.len(), self.total))
    }
}

/// The search view body: one group per kind, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultGroups {
    pub loading: bool,
    pub groups: Vec<ResultGroup>,
    pub error: Option<String>,
    /// A completed search with zero hits.
    pub no_results: bool,
}

impl ResultGroups {
    pub fn from_results(results: &SearchResults, group_size: usize) -> Vec<ResultGroup> {
        results
            .iter()
            .map(|(kind, hits)| ResultGroup {
                kind,
                title: kind.display_name(),
                hits: hits.iter().take(group_size).cloned().collect(),
                total: hits.len(),
            })
            .collect()
    }

    pub fn build(state: &SearchState, group_size: usize) -> Self {
        let groups = state
            .results()
            .map(|r| Self::from_results(r, group_size))
            .unwrap_or_default();
        Self {
            loading: state.is_loading(),
            groups,
            error: match state {
                SearchState::Failed(msg) => Some(msg.clone()),
                _ => None,
            },
            no_results: state.is_no_results(),
        }
    }

    /// Groups that have at least one hit.
    pub fn non_empty(&self) -> impl Iterator<Item = &ResultGroup> {
        self.groups.iter().filter(|g| !g.hits.is_empty())
    }
}
