// ── Search session ──
//
// Owns the state of one search view. Each fetch carries a ticket stamped
// with the session's generation; a completion is applied only if its
// ticket is still the newest one and the view is still mounted.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tracing::{debug, warn};

use super::results::{SEARCH_ERROR_MESSAGE, SearchResults, SearchState};
use crate::error::CoreError;

/// Results carried along with a navigation, keyed by the query that
/// produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarriedResults {
    pub query: String,
    pub results: Arc<SearchResults>,
}

/// What a navigation into the search view hands over.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    pub query: String,
    pub carried: Option<CarriedResults>,
}

impl NavigationState {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            carried: None,
        }
    }

    #[must_use]
    pub fn with_results(mut self, query: impl Into<String>, results: Arc<SearchResults>) -> Self {
        self.carried = Some(CarriedResults {
            query: query.into(),
            results,
        });
        self
    }
}

/// Proof of which fetch a completion belongs to.
///
/// Tickets are `Send` and can be moved into the task doing the fetch.
#[derive(Debug, Clone)]
pub struct SearchTicket {
    generation: u64,
    query: String,
    current: Arc<AtomicU64>,
    mounted: Arc<AtomicBool>,
}

impl SearchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Still the newest fetch of a mounted session.
    pub fn is_current(&self) -> bool {
        self.mounted.load(Ordering::Acquire)
            && self.current.load(Ordering::Acquire) == self.generation
    }
}

/// Search view state plus its liveness guard.
#[derive(Debug)]
pub struct SearchSession {
    query: String,
    state: SearchState,
    generation: Arc<AtomicU64>,
    mounted: Arc<AtomicBool>,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchSession {
    pub fn new() -> Self {
        Self {
            query: String::new(),
            state: SearchState::Idle,
            generation: Arc::new(AtomicU64::new(0)),
            mounted: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Acquire)
    }

    /// Enter the view. Reuses carried results when they were produced by
    /// the same query; otherwise returns a ticket for a fresh fetch.
    pub fn mount(&mut self, nav: NavigationState) -> Option<SearchTicket> {
        self.mounted.store(true, Ordering::Release);
        let NavigationState { query, carried } = nav;

        if let Some(carried) = carried.filter(|c| c.query == query) {
            debug!(query = %query, "reusing carried search results");
            // Invalidate anything still in flight from an earlier mount.
            self.generation.fetch_add(1, Ordering::AcqRel);
            self.query = query;
            self.state = SearchState::Done(carried.results);
            return None;
        }

        Some(self.begin(query))
    }

    /// Follow a navigation while mounted. Fetches again only when the
    /// query text changed.
    pub fn navigate(&mut self, nav: NavigationState) -> Option<SearchTicket> {
        if !self.is_mounted() {
            return self.mount(nav);
        }
        if nav.query == self.query && !matches!(self.state, SearchState::Idle) {
            return None;
        }
        self.mount(nav)
    }

    /// Start a fetch for `query`, superseding any fetch in flight.
    pub fn begin(&mut self, query: impl Into<String>) -> SearchTicket {
        let query = query.into();
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        debug!(generation, query = %query, "search started");
        self.query.clone_from(&query);
        self.state = SearchState::Loading;
        SearchTicket {
            generation,
            query,
            current: Arc::clone(&self.generation),
            mounted: Arc::clone(&self.mounted),
        }
    }

    /// Apply a finished fetch. Returns `false` (and changes nothing) when
    /// the ticket was superseded or the view was unmounted.
    pub fn complete(
        &mut self,
        ticket: &SearchTicket,
        outcome: Result<SearchResults, CoreError>,
    ) -> bool {
        if !ticket.is_current() {
            warn!(
                generation = ticket.generation,
                query = %ticket.query,
                "discarding stale search result"
            );
            return false;
        }

        self.state = match outcome {
            Ok(results) => SearchState::Done(Arc::new(results)),
            Err(e) => {
                warn!(error = %e, query = %ticket.query, "search fetch failed");
                SearchState::Failed(SEARCH_ERROR_MESSAGE.to_owned())
            }
        };
        true
    }

    /// Leave the view. In-flight fetches will be discarded.
    pub fn unmount(&mut self) {
        self.mounted.store(false, Ordering::Release);
    }

    /// State to hand to the next navigation so coming back is free.
    pub fn navigation_state(&self) -> NavigationState {
        let carried = self.state.results().map(|results| CarriedResults {
            query: self.query.clone(),
            results: Arc::clone(results),
        });
        NavigationState {
            query: self.query.clone(),
            carried,
        }
    }
}
