//! Shared configuration for the Cirrus CLI and TUI.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `cirrus_core::ControllerConfig`. Both binaries
//! depend on this crate; the CLI layers its global flags on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use cirrus_core::{AuthCredentials, ControllerConfig, ListingPolicy, SearchSettings, TlsVerification};

/// Keyring service name; entries are keyed `{profile}/token`.
pub const KEYRING_SERVICE: &str = "cirrus";

/// Environment prefix. Nested keys use `__`, e.g. `CIRRUS_SEARCH__RANKING`.
pub const ENV_PREFIX: &str = "CIRRUS_";

pub const DEFAULT_API_URL: &str = "https://api.cirrus.example";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration shared by CLI and TUI.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is absent.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Dashboard card slicing.
    #[serde(default)]
    pub dashboard: ListingPolicy,

    /// Search ranking and result-group size.
    #[serde(default)]
    pub search: SearchSettings,

    /// Named account profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            dashboard: ListingPolicy::default(),
            search: SearchSettings::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use: the explicit one, else the configured
    /// default, else `"default"`.
    pub fn profile_name(&self, explicit: Option<&str>) -> String {
        explicit
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound { name: name.into() })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named account profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// API root (e.g., "https://api.cirrus.example").
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Personal access token (plaintext; prefer keyring or env var).
    pub token: Option<String>,

    /// Environment variable holding the token.
    pub token_env: Option<String>,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Skip TLS verification (local mocks only).
    pub insecure: Option<bool>,

    /// Override the global timeout (seconds).
    pub timeout: Option<u64>,

    /// Items per page when walking collections.
    pub page_size: Option<u32>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.into()
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token: None,
            token_env: None,
            ca_cert: None,
            insecure: None,
            timeout: None,
            page_size: None,
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "cirrus", "cirrus").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("cirrus");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file. A missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    tracing::debug!(path = %path.display(), profiles = config.profiles.len(), "config loaded");
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/token"))
}

/// Resolve a token from the credential chain (no CLI flag step).
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Profile's token_env -> env var lookup
    if let Some(ref env_name) = profile.token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(ref token) = profile.token {
        return Ok(SecretString::from(token.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store a token in the system keyring under `{profile}/token`.
pub fn store_token(profile_name: &str, token: &SecretString) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(token.expose_secret())?;
    Ok(())
}

/// Parse and check a profile's API URL.
pub fn parse_api_url(raw: &str) -> Result<url::Url, ConfigError> {
    let url: url::Url = raw.parse().map_err(|_| ConfigError::Validation {
        field: "api_url".into(),
        reason: format!("invalid URL: {raw}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "api_url".into(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(url)
}

/// TLS strategy for a profile.
pub fn profile_tls(profile: &Profile) -> TlsVerification {
    if profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    }
}

/// Build a `ControllerConfig` from a profile with no CLI overrides.
///
/// Suitable for the TUI: background refresh every 30 seconds.
pub fn profile_to_controller_config(
    cfg: &Config,
    profile: &Profile,
    profile_name: &str,
) -> Result<ControllerConfig, ConfigError> {
    let url = parse_api_url(&profile.api_url)?;
    let token = resolve_token(profile, profile_name)?;

    let mut controller = ControllerConfig::new(url, AuthCredentials::Token(token));
    controller.tls = profile_tls(profile);
    controller.timeout = Duration::from_secs(profile.timeout.unwrap_or(cfg.defaults.timeout));
    if let Some(page_size) = profile.page_size {
        if page_size == 0 {
            return Err(ConfigError::Validation {
                field: "page_size".into(),
                reason: "must be at least 1".into(),
            });
        }
        controller.page_size = page_size;
    }
    controller.refresh_interval_secs = 30;
    controller.listing = cfg.dashboard;
    controller.search = cfg.search;
    Ok(controller)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cirrus_core::RankingPolicy;
    use pretty_assertions::assert_eq;

    use super::*;

    fn write(dir: &tempfile::TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert_eq!(cfg.defaults.output, "table");
        assert_eq!(cfg.dashboard, ListingPolicy::default());
        assert_eq!(cfg.search.group_size, 100);
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn sections_and_profiles_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            r#"
default_profile = "work"

[dashboard]
card_limit = 3

[search]
ranking = "label"

[profiles.work]
api_url = "https://api.example.net"
token = "plain"
page_size = 50
"#,
        );
        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.profile_name(None), "work");
        assert_eq!(cfg.profile_name(Some("home")), "home");
        assert_eq!(cfg.dashboard.card_limit, 3);
        // Unset keys keep their defaults.
        assert_eq!(cfg.dashboard.view_all_threshold, 5);
        assert_eq!(cfg.search.ranking, RankingPolicy::Label);

        let work = cfg.profile("work").unwrap();
        assert_eq!(work.api_url, "https://api.example.net");
        assert_eq!(work.page_size, Some(50));
        assert!(matches!(
            cfg.profile("home"),
            Err(ConfigError::ProfileNotFound { .. })
        ));
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.search.ranking = RankingPolicy::Source;
        cfg.profiles.insert(
            "default".into(),
            Profile {
                token: Some("abc".into()),
                ..Profile::default()
            },
        );
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.search.ranking, RankingPolicy::Source);
        assert_eq!(loaded.profile("default").unwrap().token.as_deref(), Some("abc"));
    }

    #[test]
    fn token_env_wins_over_plaintext() {
        // PATH is set in every test environment.
        let expected = std::env::var("PATH").unwrap();
        let profile = Profile {
            token: Some("plain".into()),
            token_env: Some("PATH".into()),
            ..Profile::default()
        };
        let token = resolve_token(&profile, "cirrus-test-env").unwrap();
        assert_eq!(token.expose_secret(), expected);
    }

    #[test]
    fn missing_credentials_are_reported() {
        let profile = Profile {
            token_env: Some("CIRRUS_TEST_SURELY_UNSET_TOKEN".into()),
            ..Profile::default()
        };
        let err = resolve_token(&profile, "cirrus-test-none").unwrap_err();
        assert!(matches!(err, ConfigError::NoCredentials { .. }));
    }

    #[test]
    fn api_url_must_be_http() {
        assert!(parse_api_url("https://api.cirrus.example").is_ok());
        assert!(matches!(
            parse_api_url("ftp://api.cirrus.example"),
            Err(ConfigError::Validation { .. })
        ));
        assert!(parse_api_url("not a url").is_err());
    }

    #[test]
    fn controller_config_carries_sections() {
        let mut cfg = Config::default();
        cfg.dashboard.card_limit = 7;
        cfg.defaults.timeout = 12;
        let profile = Profile {
            token: Some("plain".into()),
            page_size: Some(25),
            insecure: Some(true),
            ..Profile::default()
        };
        let controller = profile_to_controller_config(&cfg, &profile, "cirrus-test-plain").unwrap();
        assert_eq!(controller.listing.card_limit, 7);
        assert_eq!(controller.timeout, Duration::from_secs(12));
        assert_eq!(controller.page_size, 25);
        assert_eq!(controller.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(controller.url.as_str(), "https://api.cirrus.example/");
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let profile = Profile {
            token: Some("plain".into()),
            page_size: Some(0),
            ..Profile::default()
        };
        let err =
            profile_to_controller_config(&Config::default(), &profile, "cirrus-test-zero").unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }
}
