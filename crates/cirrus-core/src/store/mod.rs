// ── Reactive data store ──
//
// Entity storage with push-based change notification and per-collection
// fetch status.

mod collection;
mod data_store;
mod refresh;

pub use collection::CollectionStatus;
pub use data_store::{Collection, DataStore};
pub use refresh::{Fetched, RefreshOutcome};
