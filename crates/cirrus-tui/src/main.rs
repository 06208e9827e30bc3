//! `cirrus-tui`: terminal dashboard for a Cirrus cloud account.
//!
//! Built on [ratatui](https://ratatui.rs) with reactive data from
//! `cirrus-core`'s [`EntityStream`](cirrus_core::EntityStream). Screens:
//! the dashboard (resource cards, docs sidebar, running operations),
//! account-wide search, and a server detail view with power actions.
//!
//! Logs are written to a file (default `/tmp/cirrus-tui.log`) to avoid
//! corrupting the terminal UI. A background data bridge task streams
//! store updates from the controller into the TUI action loop.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screen;
mod screens;
mod theme;
mod tui;
mod widgets;

#[cfg(test)]
mod test_support;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, bail};
use secrecy::SecretString;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use cirrus_config::{Profile, parse_api_url, profile_tls, profile_to_controller_config};
use cirrus_core::{AuthCredentials, Controller, ControllerConfig};

use crate::app::App;

/// Background refresh cadence for the dashboard.
const REFRESH_INTERVAL_SECS: u64 = 30;

/// Terminal dashboard for a Cirrus cloud account.
#[derive(Parser, Debug)]
#[command(name = "cirrus-tui", version, about)]
struct Cli {
    /// Profile from the config file (defaults to the configured default)
    #[arg(short = 'p', long, env = "CIRRUS_PROFILE")]
    profile: Option<String>,

    /// API root, overriding the profile's
    #[arg(long, env = "CIRRUS_API_URL")]
    api_url: Option<String>,

    /// Personal access token, overriding the profile's credentials
    #[arg(long, env = "CIRRUS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Log file path (defaults to /tmp/cirrus-tui.log)
    #[arg(long, default_value = "/tmp/cirrus-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. Logging to stdout/stderr would corrupt the
/// TUI output. The returned guard must live as long as the app so logs
/// are flushed.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("cirrus_tui={log_level},cirrus_core={log_level}"))
    });

    let log_dir = cli
        .log_file
        .parent()
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("cirrus-tui.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

/// Resolve the account to watch: flags first, then the config file's
/// profile. `None` when neither names an account.
fn controller_config(cli: &Cli) -> Result<Option<ControllerConfig>> {
    let cfg = cirrus_config::load_config()?;
    let name = cfg.profile_name(cli.profile.as_deref());
    let fallback = Profile::default();
    let profile = match cfg.profiles.get(&name) {
        Some(profile) => profile,
        None if cli.token.is_some() => &fallback,
        None if cli.profile.is_some() => bail!("profile '{name}' not found in the config file"),
        None => return Ok(None),
    };

    let mut config = match &cli.token {
        Some(token) => {
            let url = parse_api_url(&profile.api_url)?;
            let auth = AuthCredentials::Token(SecretString::from(token.clone()));
            let mut config = ControllerConfig::new(url, auth);
            config.tls = profile_tls(profile);
            config.timeout =
                Duration::from_secs(profile.timeout.unwrap_or(cfg.defaults.timeout));
            config.listing = cfg.dashboard;
            config.search = cfg.search;
            config
        }
        None => profile_to_controller_config(&cfg, profile, &name)?,
    };

    if let Some(url) = &cli.api_url {
        config.url = parse_api_url(url)?;
    }
    config.refresh_interval_secs = REFRESH_INTERVAL_SECS;
    Ok(Some(config))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Install panic/error hooks BEFORE entering the terminal
    tui::install_hooks()?;

    // Tracing to file; hold the guard so logs flush on exit
    let _log_guard = setup_tracing(&cli);

    let Some(config) = controller_config(&cli)? else {
        bail!("no Cirrus account configured. Run `cirrus config init` or pass --token");
    };

    info!(url = %config.url, profile = ?cli.profile, "starting cirrus-tui");

    let mut app = App::new(Some(Controller::new(config)));
    app.run().await?;

    Ok(())
}
