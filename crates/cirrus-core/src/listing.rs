// ── List selection & display policy ──
//
// How a collection becomes the handful of rows a dashboard card shows:
// sort by label, cut to a limit, fold in running events, and pick one of
// four display states.

use std::borrow::Borrow;

use serde::{Deserialize, Serialize};

use crate::merge::{Trackable, merge_events};
use crate::model::{Entity, Event};
use crate::store::CollectionStatus;

/// Default number of rows on a dashboard card.
pub const DEFAULT_CARD_LIMIT: usize = 5;

/// Slicing rules for dashboard cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingPolicy {
    /// Rows shown per card.
    pub card_limit: usize,
    /// "View all" appears when the full collection is longer than this.
    pub view_all_threshold: usize,
}

impl Default for ListingPolicy {
    fn default() -> Self {
        Self {
            card_limit: DEFAULT_CARD_LIMIT,
            view_all_threshold: DEFAULT_CARD_LIMIT,
        }
    }
}

/// Stable sort by label ascending, then keep the first `limit`.
pub fn select_for_display<T: Entity + Clone>(entities: &[T], limit: usize) -> Vec<T> {
    let mut sorted: Vec<T> = entities.to_vec();
    sorted.sort_by(|a, b| a.label().cmp(b.label()));
    sorted.truncate(limit);
    sorted
}

/// Whether to offer a "View all" link. Compares the full collection
/// length, never the truncated one.
pub fn show_view_all(total: usize, threshold: usize) -> bool {
    total > threshold
}

/// What a list view renders. Exactly one state applies.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum DisplayState<T> {
    Loading,
    Error(String),
    Rows(Vec<T>),
    Empty,
}

impl<T> DisplayState<T> {
    /// Precedence: loading, then error, then rows, then the empty
    /// placeholder.
    pub fn resolve(status: &CollectionStatus, rows: Vec<T>) -> Self {
        if status.loading {
            Self::Loading
        } else if let Some(err) = &status.error {
            Self::Error(err.clone())
        } else if rows.is_empty() {
            Self::Empty
        } else {
            Self::Rows(rows)
        }
    }

    pub fn rows(&self) -> &[T] {
        match self {
            Self::Rows(rows) => rows,
            _ => &[],
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> DisplayState<U> {
        match self {
            Self::Loading => DisplayState::Loading,
            Self::Error(e) => DisplayState::Error(e),
            Self::Rows(rows) => DisplayState::Rows(rows.into_iter().map(f).collect()),
            Self::Empty => DisplayState::Empty,
        }
    }
}

/// Rows picked for one dashboard card.
#[derive(Debug, Clone)]
pub struct CardSlice<T> {
    pub rows: Vec<T>,
    /// Length of the full collection.
    pub total: usize,
    pub view_all: bool,
}

/// Dashboard pipeline: sort by label, take N, merge events of the
/// card's kind.
pub fn card_slice<T, E>(entities: &[T], events: &[E], policy: ListingPolicy) -> CardSlice<T>
where
    T: Trackable + Clone,
    E: Borrow<Event>,
{
    let selected = select_for_display(entities, policy.card_limit);
    CardSlice {
        rows: merge_events(&selected, events),
        total: entities.len(),
        view_all: show_view_all(entities.len(), policy.view_all_threshold),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::fixtures::{server, server_event};

    fn labels<T: Entity>(list: &[T]) -> Vec<&str> {
        list.iter().map(Entity::label).collect()
    }

    #[test]
    fn sorts_then_truncates() {
        let servers = vec![server(1, "b"), server(2, "a"), server(3, "c")];
        let picked = select_for_display(&servers, 2);
        assert_eq!(labels(&picked), vec!["a", "b"]);
    }

    #[test]
    fn sort_is_stable_for_equal_labels() {
        let servers = vec![server(1, "same"), server(2, "same"), server(3, "alpha")];
        let picked = select_for_display(&servers, 3);
        let ids: Vec<_> = picked.iter().map(|s| s.id.to_string()).collect();
        assert_eq!(ids, vec!["3", "1", "2"]);
    }

    #[test]
    fn limit_larger_than_list_keeps_everything() {
        let servers = vec![server(1, "b"), server(2, "a")];
        assert_eq!(select_for_display(&servers, 5).len(), 2);
        assert!(select_for_display(&servers, 0).is_empty());
    }

    #[test]
    fn view_all_uses_full_length() {
        assert!(!show_view_all(5, 5));
        assert!(show_view_all(6, 5));
        assert!(!show_view_all(0, 5));
    }

    #[test]
    fn display_state_precedence() {
        let loading_with_error = CollectionStatus {
            loading: true,
            error: Some("boom".into()),
            last_updated: None,
        };
        assert_eq!(
            DisplayState::resolve(&loading_with_error, vec![1]),
            DisplayState::Loading
        );

        let errored = CollectionStatus {
            error: Some("boom".into()),
            ..CollectionStatus::default()
        };
        assert_eq!(
            DisplayState::resolve(&errored, vec![1]),
            DisplayState::Error("boom".into())
        );

        let ok = CollectionStatus::default();
        assert_eq!(
            DisplayState::resolve(&ok, vec![1, 2]),
            DisplayState::Rows(vec![1, 2])
        );
        assert_eq!(
            DisplayState::<u8>::resolve(&ok, Vec::new()),
            DisplayState::Empty
        );
    }

    #[test]
    fn card_slice_merges_after_truncation() {
        let servers: Vec<_> = ["f", "e", "d", "c", "b", "a"]
            .iter()
            .zip(1u64..)
            .map(|(label, id)| server(id, label))
            .collect();
        // "f" (id 1) is cut by the limit; "a" (id 6) is kept.
        let events = vec![server_event(100, 1), server_event(101, 6)];

        let slice = card_slice(&servers, &events, ListingPolicy::default());
        assert_eq!(labels(&slice.rows), vec!["a", "b", "c", "d", "e"]);
        assert_eq!(slice.total, 6);
        assert!(slice.view_all);
        assert_eq!(
            slice.rows[0].recent_event.as_ref().map(|e| e.id),
            Some(101)
        );
        assert!(slice.rows[1..].iter().all(|s| s.recent_event.is_none()));
    }
}
