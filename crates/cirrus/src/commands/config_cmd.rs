//! Config subcommand handlers.

use std::fmt::Write;

use dialoguer::{Input, Password, Select};
use secrecy::SecretString;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display, masking the token.
fn format_config_redacted(cfg: &Config) -> String {
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    let _ = writeln!(out);
    let _ = writeln!(out, "[dashboard]");
    let _ = writeln!(out, "card_limit = {}", cfg.dashboard.card_limit);
    let _ = writeln!(out, "view_all_threshold = {}", cfg.dashboard.view_all_threshold);

    let _ = writeln!(out);
    let _ = writeln!(out, "[search]");
    let _ = writeln!(out, "ranking = \"{}\"", cfg.search.ranking);
    let _ = writeln!(out, "group_size = {}", cfg.search.group_size);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let Some(p) = cfg.profiles.get(name) else {
            continue;
        };
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "api_url = \"{}\"", p.api_url);
        if p.token.is_some() {
            let _ = writeln!(out, "token = \"****\"");
        }
        if let Some(ref env) = p.token_env {
            let _ = writeln!(out, "token_env = \"{env}\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(page_size) = p.page_size {
            let _ = writeln!(out, "page_size = {page_size}");
        }
    }

    out.trim_end().to_owned()
}

/// Copy of the config with plaintext tokens masked, for structured output.
fn redacted(cfg: &Config) -> Config {
    let mut copy = cfg.clone();
    for profile in copy.profiles.values_mut() {
        if profile.token.is_some() {
            profile.token = Some("****".into());
        }
    }
    copy
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn prompt_token() -> Result<String, CliError> {
    let token = Password::new()
        .with_prompt("Personal access token")
        .interact()
        .map_err(prompt_err)?;
    if token.is_empty() {
        return Err(CliError::Validation {
            field: "token".into(),
            reason: "token cannot be empty".into(),
        });
    }
    Ok(token)
}

fn store_in_keyring(profile_name: &str, token: String) -> Result<(), CliError> {
    cirrus_config::store_token(profile_name, &SecretString::from(token)).map_err(|e| {
        CliError::Validation {
            field: "keyring".into(),
            reason: format!("failed to store token in keyring: {e}"),
        }
    })
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("Cirrus CLI configuration");
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let api_url: String = Input::new()
                .with_prompt("API URL")
                .default(cirrus_config::DEFAULT_API_URL.into())
                .interact_text()
                .map_err(prompt_err)?;
            cirrus_config::parse_api_url(&api_url)?;

            let token = prompt_token()?;
            let choices = &[
                "Store in system keyring (recommended)",
                "Save to config file (plaintext)",
            ];
            let selection = Select::new()
                .with_prompt("Where to store the token?")
                .items(choices)
                .default(0)
                .interact()
                .map_err(prompt_err)?;
            let plaintext = if selection == 0 {
                store_in_keyring(&profile_name, token)?;
                eprintln!("   ✓ Token stored in system keyring");
                None
            } else {
                Some(token)
            };

            let mut cfg = config::load_config_or_default();
            cfg.default_profile = Some(profile_name.clone());
            cfg.profiles.insert(
                profile_name.clone(),
                Profile {
                    api_url,
                    token: plaintext,
                    ..Profile::default()
                },
            );
            let path = cirrus_config::save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: cirrus dashboard");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config()?);
            let out = output::render_single(global.output, &cfg, format_config_redacted, |_| {
                "config".into()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── SetToken ────────────────────────────────────────────────
        ConfigCommand::SetToken { profile } => {
            let cfg = config::load_config_or_default();
            let profile_name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));

            if !cfg.profiles.contains_key(&profile_name) {
                return Err(CliError::ProfileNotFound {
                    name: profile_name,
                    available: config::available_profiles(&cfg),
                });
            }

            store_in_keyring(&profile_name, prompt_token()?)?;
            eprintln!("✓ Token stored in system keyring for profile '{profile_name}'");
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: cirrus config init");
            } else {
                let mut names: Vec<_> = cfg.profiles.keys().collect();
                names.sort();
                for name in names {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_masks_tokens() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "work".into(),
            Profile {
                token: Some("very-secret".into()),
                token_env: Some("WORK_TOKEN".into()),
                ..Profile::default()
            },
        );
        let text = format_config_redacted(&cfg);
        assert!(!text.contains("very-secret"));
        assert!(text.contains("token = \"****\""));
        assert!(text.contains("token_env = \"WORK_TOKEN\""));
        assert!(text.contains("ranking = \"relevance\""));

        let masked = redacted(&cfg);
        assert_eq!(
            masked.profiles.get("work").and_then(|p| p.token.as_deref()),
            Some("****")
        );
    }
}
