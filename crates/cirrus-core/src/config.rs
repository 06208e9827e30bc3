// ── Runtime connection configuration ──
//
// These types describe *how* to talk to the Cirrus API and how the views
// should slice the data. They carry credential data and tuning, but never
// touch disk. The CLI/TUI constructs a `ControllerConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::listing::ListingPolicy;
use crate::search::SearchSettings;

/// How to authenticate with the API.
#[derive(Debug, Clone)]
pub enum AuthCredentials {
    /// Personal access token, sent as a bearer token.
    Token(SecretString),
    /// No credentials (public catalog endpoints, local mocks).
    Anonymous,
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (local API mocks).
    DangerAcceptInvalid,
}

/// Configuration for a single API account.
///
/// Built by CLI/TUI, passed to `Controller` -- core never reads config files.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// API root (e.g., `https://api.cirrus.example`).
    pub url: Url,
    pub auth: AuthCredentials,
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
    /// Items requested per page when walking collections.
    pub page_size: u32,
    /// How often to perform a full refresh (seconds). 0 = never.
    pub refresh_interval_secs: u64,
    /// Dashboard card slicing.
    pub listing: ListingPolicy,
    /// Search ranking and grouping.
    pub search: SearchSettings,
}

impl ControllerConfig {
    /// Config with default tuning for the given endpoint and credentials.
    pub fn new(url: Url, auth: AuthCredentials) -> Self {
        Self {
            url,
            auth,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            page_size: cirrus_api::client::DEFAULT_PAGE_SIZE,
            refresh_interval_secs: 60,
            listing: ListingPolicy::default(),
            search: SearchSettings::default(),
        }
    }
}
