// cirrus-api: Async Rust client for the Cirrus cloud REST API (v4)

pub mod auth;
pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use auth::Credentials;
pub use client::{CloudClient, EntityBundle};
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
