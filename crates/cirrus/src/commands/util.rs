//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::sync::Arc;

use cirrus_core::{Controller, Entity, Server};

use crate::cli::ListArgs;
use crate::error::CliError;

/// Resolve a server identifier (numeric ID or exact label) via snapshot
/// lookup.
pub fn resolve_server(controller: &Controller, identifier: &str) -> Result<Arc<Server>, CliError> {
    let snap = controller.servers_snapshot();
    snap.iter()
        .find(|s| s.id.to_string() == identifier)
        .or_else(|| snap.iter().find(|s| s.label == identifier))
        .cloned()
        .ok_or_else(|| CliError::NotFound {
            resource_type: "server".into(),
            identifier: identifier.into(),
            list_command: "servers list".into(),
        })
}

/// Apply `--filter` and `--limit` to a label-sorted collection.
pub fn apply_list_args<T: Entity + Clone>(items: &[T], args: &ListArgs) -> Vec<T> {
    let needle = args.filter.as_deref().map(str::to_lowercase);
    let mut rows: Vec<T> = items
        .iter()
        .filter(|item| {
            needle
                .as_deref()
                .is_none_or(|n| item.label().to_lowercase().contains(n))
        })
        .cloned()
        .collect();
    rows.sort_by(|a, b| a.label().cmp(b.label()));
    if args.limit > 0 {
        rows.truncate(args.limit);
    }
    rows
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// "-" for absent values in detail views.
pub fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("-")
}

#[cfg(test)]
mod tests {
    use cirrus_core::{EntityId, Volume, VolumeStatus};

    use super::*;

    fn volume(id: u64, label: &str) -> Volume {
        Volume {
            id: EntityId::Numeric(id),
            label: label.into(),
            region: "us-east".into(),
            size_gb: 20,
            status: VolumeStatus::Active,
            server_id: None,
            filesystem_path: None,
            tags: Vec::new(),
            recent_event: None,
        }
    }

    fn args(limit: usize, filter: Option<&str>) -> ListArgs {
        ListArgs {
            limit,
            filter: filter.map(str::to_owned),
        }
    }

    #[test]
    fn filter_is_case_insensitive_and_sorted() {
        let items = vec![volume(1, "Web-b"), volume(2, "db"), volume(3, "web-a")];
        let rows = apply_list_args(&items, &args(0, Some("WEB")));
        let labels: Vec<_> = rows.iter().map(|v| v.label.as_str()).collect();
        assert_eq!(labels, vec!["Web-b", "web-a"]);
    }

    #[test]
    fn limit_zero_means_all() {
        let items = vec![volume(1, "c"), volume(2, "a"), volume(3, "b")];
        assert_eq!(apply_list_args(&items, &args(0, None)).len(), 3);
        let rows = apply_list_args(&items, &args(2, None));
        let labels: Vec<_> = rows.iter().map(|v| v.label.as_str()).collect();
        assert_eq!(labels, vec!["a", "b"]);
    }

    #[test]
    fn yes_flag_skips_prompt() {
        assert!(confirm("Reboot?", "reboot", true).unwrap_or(false));
    }
}
