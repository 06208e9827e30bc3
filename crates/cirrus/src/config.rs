//! CLI configuration: thin wrapper around `cirrus_config` shared types.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` flag overrides (--api-url, --token, --timeout, ...).

use std::time::Duration;

use secrecy::SecretString;

use cirrus_core::{AuthCredentials, ControllerConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use cirrus_config::{Config, Profile, config_path, load_config, load_config_or_default};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.profile_name(global.profile.as_deref())
}

/// Translate the config file, the active profile and global flags into a
/// `ControllerConfig`. Flags take priority over profile values; with no
/// profile at all, `--api-url` falls back to the default endpoint.
pub fn build_controller_config(
    cfg: &Config,
    global: &GlobalOpts,
) -> Result<ControllerConfig, CliError> {
    let profile_name = active_profile_name(global, cfg);
    let fallback = Profile::default();
    let profile = match cfg.profiles.get(&profile_name) {
        Some(p) => p,
        None if global.token.is_some() => &fallback,
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(cfg),
            });
        }
        None => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    // 1. API URL (flag > env > profile)
    let url = cirrus_config::parse_api_url(global.api_url.as_deref().unwrap_or(&profile.api_url))?;

    // 2. Token (flag > token_env > keyring > plaintext)
    let token = match global.token {
        Some(ref token) => SecretString::from(token.clone()),
        None => cirrus_config::resolve_token(profile, &profile_name)?,
    };

    let mut controller = ControllerConfig::new(url, AuthCredentials::Token(token));

    // 3. TLS verification
    controller.tls = if global.insecure {
        TlsVerification::DangerAcceptInvalid
    } else {
        cirrus_config::profile_tls(profile)
    };

    // 4. Timeout (flag > profile > defaults)
    let timeout = global
        .timeout
        .or(profile.timeout)
        .unwrap_or(cfg.defaults.timeout);
    controller.timeout = Duration::from_secs(timeout);

    if let Some(page_size) = profile.page_size {
        controller.page_size = page_size.max(1);
    }
    controller.refresh_interval_secs = 0;
    controller.listing = cfg.dashboard;
    controller.search = cfg.search;
    Ok(controller)
}

pub fn available_profiles(cfg: &Config) -> String {
    let mut names: Vec<_> = cfg.profiles.keys().cloned().collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort();
    names.join(", ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;
    use secrecy::ExposeSecret;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["cirrus"];
        argv.extend_from_slice(args);
        argv.push("dashboard");
        Cli::try_parse_from(argv).unwrap().global
    }

    fn config_with_work_profile() -> Config {
        let mut cfg = Config::default();
        cfg.default_profile = Some("work".into());
        cfg.profiles.insert(
            "work".into(),
            Profile {
                api_url: "https://api.example.net".into(),
                token: Some("from-profile".into()),
                timeout: Some(9),
                ..Profile::default()
            },
        );
        cfg
    }

    #[test]
    fn flags_override_profile() {
        let cfg = config_with_work_profile();
        let opts = global(&[
            "--api-url",
            "http://localhost:9000",
            "--token",
            "from-flag",
            "--timeout",
            "3",
        ]);
        let controller = build_controller_config(&cfg, &opts).unwrap();
        assert_eq!(controller.url.as_str(), "http://localhost:9000/");
        assert_eq!(controller.timeout, Duration::from_secs(3));
        match controller.auth {
            AuthCredentials::Token(ref t) => assert_eq!(t.expose_secret(), "from-flag"),
            AuthCredentials::Anonymous => panic!("expected a token"),
        }
    }

    #[test]
    fn profile_values_apply_without_flags() {
        let cfg = config_with_work_profile();
        let controller = build_controller_config(&cfg, &global(&[])).unwrap();
        assert_eq!(controller.url.as_str(), "https://api.example.net/");
        assert_eq!(controller.timeout, Duration::from_secs(9));
        assert_eq!(controller.refresh_interval_secs, 0);
    }

    #[test]
    fn unknown_profile_lists_available() {
        let cfg = config_with_work_profile();
        let err = build_controller_config(&cfg, &global(&["--profile", "home"])).unwrap_err();
        match err {
            CliError::ProfileNotFound { available, .. } => assert_eq!(available, "work"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn no_config_and_no_token_asks_for_init() {
        let err = build_controller_config(&Config::default(), &global(&[])).unwrap_err();
        assert!(matches!(err, CliError::NoConfig { .. }));
    }
}
