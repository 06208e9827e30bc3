// ── Search ──
//
// Free-text search across the entity collections, grouped by kind, plus
// the session that guards the asynchronous fetch-then-compute path.

mod aggregator;
mod query;
mod results;
mod session;

use serde::{Deserialize, Serialize};

pub use aggregator::{RankingPolicy, SearchCorpus, search};
pub use query::{query_from_location, search_location};
pub use results::{Relevance, SEARCH_ERROR_MESSAGE, SearchHit, SearchResults, SearchState};
pub use session::{CarriedResults, NavigationState, SearchSession, SearchTicket};

/// Display cap per result group.
pub const DEFAULT_GROUP_SIZE: usize = 100;

/// Search tuning carried in `ControllerConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub ranking: RankingPolicy,
    pub group_size: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            ranking: RankingPolicy::default(),
            group_size: DEFAULT_GROUP_SIZE,
        }
    }
}
