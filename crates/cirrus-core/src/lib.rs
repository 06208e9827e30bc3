//! Reactive data layer between `cirrus-api` and UI consumers (CLI / TUI).
//!
//! This crate owns the business logic, domain model, and reactive data
//! infrastructure for the Cirrus workspace:
//!
//! - **[`Controller`]**: Central facade managing the full lifecycle:
//!   [`connect()`](Controller::connect) builds the API client, fetches an
//!   initial snapshot, then spawns background tasks for periodic refresh and
//!   command processing. [`Controller::oneshot()`](Controller::oneshot)
//!   provides a lightweight mode for single CLI invocations.
//!
//! - **[`DataStore`]**: Lock-free reactive storage built on
//!   `EntityCollection<T>` (`DashMap` + `tokio::sync::watch` channels). Each
//!   collection carries its own loading flag and error.
//!
//! - **[`EntityStream<T>`]**: Subscription handle vended by the `DataStore`.
//!   Exposes `current()` / `latest()` / `changed()` for TUI reactive rendering.
//!
//! - **[`merge_events`]**, **[`listing`]** and **[`search`]**: Pure
//!   transforms: fold in-flight events into lists, pick what a card shows,
//!   and search across collections. [`SearchSession`] guards the async
//!   fetch-then-search path with a generation counter.
//!
//! - **[`presentation`]**: View models shared by the CLI and TUI.
//!
//! - **[`Command`]**: Typed mutation requests routed through an `mpsc`
//!   channel to the controller's command processor.

pub mod command;
pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod listing;
pub mod merge;
pub mod model;
pub mod presentation;
pub mod search;
pub mod store;
pub mod stream;

#[cfg(test)]
mod fixtures;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{Command, CommandResult};
pub use config::{AuthCredentials, ControllerConfig, TlsVerification};
pub use controller::{ConnectionState, Controller};
pub use error::CoreError;
pub use listing::{DisplayState, ListingPolicy, card_slice, select_for_display, show_view_all};
pub use merge::{Trackable, merge_events};
pub use search::{
    NavigationState, RankingPolicy, SearchCorpus, SearchResults, SearchSession, SearchSettings,
    SearchState, SearchTicket,
};
pub use store::{Collection, CollectionStatus, DataStore};
pub use stream::EntityStream;

// Re-export model types at the crate root for ergonomics.
pub use model::{
    AccountNotice, Backups, Domain, DomainStatus, Entity, EntityId, EntityKind, EntityRef, Event,
    EventAction, EventStatus, Image, LoadBalancer, NoticeKind, NoticeSeverity, Server,
    ServerStatus, ServerType, Volume, VolumeStatus, ZoneKind,
};
