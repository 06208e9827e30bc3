//! Server command handlers.

use std::sync::Arc;

use serde::Serialize;
use tabled::Tabled;

use cirrus_core::presentation::{MigrationNotice, RescueDevices};
use cirrus_core::{
    Command as CoreCommand, CommandResult, Controller, EntityKind, Server, merge_events,
};

use crate::cli::{GlobalOpts, ServersArgs, ServersCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct ServerRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Plan")]
    plan: String,
    #[tabled(rename = "Region")]
    region: String,
    #[tabled(rename = "IPv4")]
    ipv4: String,
    #[tabled(rename = "Backups")]
    backups: String,
}

impl ServerRow {
    fn new(s: &Server, plan: Option<String>, color: bool) -> Self {
        let status = s.recent_event.as_ref().map_or_else(
            || output::paint_status(&s.status.to_string(), color),
            cirrus_core::Event::progress_label,
        );
        Self {
            id: s.id.to_string(),
            label: s.label.clone(),
            status,
            plan: plan.or_else(|| s.server_type.clone()).unwrap_or_default(),
            region: s.region.clone(),
            ipv4: s.ipv4.first().cloned().unwrap_or_default(),
            backups: if s.backups.enabled { "on" } else { "off" }.into(),
        }
    }
}

#[derive(Tabled)]
struct RescueRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Attached")]
    attached: String,
}

// ── Detail view ─────────────────────────────────────────────────────

#[derive(Serialize)]
struct ServerDetail {
    #[serde(flatten)]
    server: Server,
    plan_label: Option<String>,
    migration_notice: Option<MigrationNotice>,
}

fn detail(d: &ServerDetail) -> String {
    let s = &d.server;
    let mut lines = vec![
        format!("ID:       {}", s.id),
        format!("Label:    {}", s.label),
        format!("Status:   {}", s.status),
        format!(
            "Plan:     {}",
            util::or_dash(d.plan_label.as_deref().or(s.server_type.as_deref()))
        ),
        format!("Region:   {}", s.region),
        format!("Image:    {}", util::or_dash(s.image.as_deref())),
        format!(
            "IPv4:     {}",
            if s.ipv4.is_empty() {
                "-".to_owned()
            } else {
                s.ipv4.join(", ")
            }
        ),
        format!(
            "Backups:  {}",
            if s.backups.enabled { "enabled" } else { "disabled" }
        ),
    ];
    if !s.tags.is_empty() {
        lines.push(format!("Tags:     {}", s.tags.join(", ")));
    }
    if let Some(created) = s.created {
        lines.push(format!("Created:  {}", created.format("%Y-%m-%d %H:%M UTC")));
    }
    if let Some(ref event) = s.recent_event {
        lines.push(format!("Activity: {}", event.progress_label()));
    }
    if let Some(ref notice) = d.migration_notice {
        lines.push(String::new());
        let (lead, _link, tail) = notice.parts();
        lines.push(format!("{lead}run: cirrus servers migrate {}{tail}", s.id));
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: ServersArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(global.color);
    let store = controller.store();

    match args.command {
        ServersCommand::List(list) => {
            let all = controller.servers_snapshot();
            let events = controller.events_snapshot();
            let merged = merge_events(all.as_slice(), events.as_slice());
            let snap = util::apply_list_args(&merged, &list);
            let out = output::render_list(
                global.output,
                &snap,
                |s| ServerRow::new(s, store.plan_label(s), color),
                |s| s.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ServersCommand::Get { server } => {
            let known = util::resolve_server(controller, &server)?;
            let fresh = controller.get_server(&known.id).await?;
            let events = controller.events_snapshot();
            let server = merge_events(std::slice::from_ref(&fresh), events.as_slice())
                .into_iter()
                .next()
                .unwrap_or_else(|| (*known).clone());

            let notices = store.notices_for(EntityKind::Server, &server.id);
            let view = ServerDetail {
                plan_label: store.plan_label(&server),
                migration_notice: MigrationNotice::from_notices(notices.as_slice()),
                server,
            };
            let out = output::render_single(global.output, &view, detail, |d| {
                d.server.id.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ServersCommand::Boot { server } => {
            let target = util::resolve_server(controller, &server)?;
            run_action(controller, global, &target, CoreCommand::BootServer {
                id: target.id.clone(),
            })
            .await
        }

        ServersCommand::Reboot { server } => {
            let target = util::resolve_server(controller, &server)?;
            run_action(controller, global, &target, CoreCommand::RebootServer {
                id: target.id.clone(),
            })
            .await
        }

        ServersCommand::Shutdown { server } => {
            let target = util::resolve_server(controller, &server)?;
            run_action(controller, global, &target, CoreCommand::ShutdownServer {
                id: target.id.clone(),
            })
            .await
        }

        ServersCommand::Migrate { server } => {
            let target = util::resolve_server(controller, &server)?;
            run_action(controller, global, &target, CoreCommand::MigrateServer {
                id: target.id.clone(),
            })
            .await
        }

        ServersCommand::RescueDevices { server } => {
            let target = util::resolve_server(controller, &server)?;
            let volumes = controller.volumes_snapshot();
            let rescue = RescueDevices::build(&target, volumes.as_slice());
            let out = output::render_list(
                global.output,
                &rescue.volumes,
                |v| RescueRow {
                    id: v.id.to_string(),
                    label: v.label.clone(),
                    size: format!("{} GB", v.size_gb),
                    attached: if v.is_attached() { "this server" } else { "-" }.into(),
                },
                |v| v.id.to_string(),
            )?;
            if rescue.is_empty() && global.output == crate::cli::OutputFormat::Table {
                let hint = format!("No volumes in {} can be used as rescue devices.", rescue.region);
                output::print_output(&output::dim(&hint, color), global.quiet);
            } else {
                output::print_output(&out, global.quiet);
            }
            Ok(())
        }
    }
}

/// Confirm destructive commands, execute, and report acceptance.
async fn run_action(
    controller: &Controller,
    global: &GlobalOpts,
    target: &Arc<Server>,
    command: CoreCommand,
) -> Result<(), CliError> {
    let verb = command.verb();
    if command.is_destructive()
        && !util::confirm(
            &format!("{verb} server '{}'?", target.label),
            verb,
            global.yes,
        )?
    {
        return Ok(());
    }

    let result = controller.execute(command).await?;
    if !global.quiet {
        match result {
            CommandResult::Accepted => eprintln!(
                "✓ {verb} accepted for '{}'. Follow it with: cirrus events list --in-progress",
                target.label
            ),
            CommandResult::Ok => eprintln!("✓ {verb} done for '{}'", target.label),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use cirrus_core::{Backups, EntityId, NoticeKind, ServerStatus};

    use super::*;

    fn server() -> Server {
        Server {
            id: EntityId::Numeric(7),
            label: "web-01".into(),
            region: "us-east".into(),
            status: ServerStatus::Running,
            server_type: Some("std-2gb".into()),
            image: None,
            ipv4: vec!["203.0.113.7".into()],
            backups: Backups { enabled: false },
            tags: Vec::new(),
            created: None,
            recent_event: None,
        }
    }

    #[test]
    fn detail_shows_plan_and_migration_hint() {
        let view = ServerDetail {
            server: server(),
            plan_label: Some("Standard 2GB".into()),
            migration_notice: Some(MigrationNotice::new(
                "web-01 has a scheduled migration.",
                NoticeKind::MigrationScheduled,
            )),
        };
        let text = detail(&view);
        assert!(text.contains("Plan:     Standard 2GB"));
        assert!(text.contains("Backups:  disabled"));
        insta::assert_snapshot!(
            text.lines().last().unwrap_or_default(),
            @"web-01 has a scheduled migration. To enter the migration queue right now, please run: cirrus servers migrate 7."
        );
    }

    #[test]
    fn list_row_prefers_plan_label() {
        let row = ServerRow::new(&server(), Some("Standard 2GB".into()), false);
        assert_eq!(row.plan, "Standard 2GB");
        assert_eq!(row.status, "running");
        assert_eq!(row.backups, "off");
        let row = ServerRow::new(&server(), None, false);
        assert_eq!(row.plan, "std-2gb");
    }
}
