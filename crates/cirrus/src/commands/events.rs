//! Event log handlers.

use tabled::Tabled;

use cirrus_core::{Command as CoreCommand, Controller, Event};

use crate::cli::{EventsArgs, EventsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct EventRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Entity")]
    entity: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Seen")]
    seen: String,
}

impl EventRow {
    fn new(e: &Event, color: bool) -> Self {
        let status = if e.is_in_progress() {
            e.progress_label()
        } else {
            output::paint_status(&e.status.to_string(), color)
        };
        Self {
            id: e.id,
            action: e.action.as_str().to_owned(),
            status,
            entity: e
                .entity
                .as_ref()
                .map(|r| r.label.clone().unwrap_or_else(|| format!("{} {}", r.kind, r.id)))
                .unwrap_or_default(),
            created: e
                .created
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
            seen: if e.seen { "yes" } else { "" }.into(),
        }
    }
}

pub async fn handle(
    controller: &Controller,
    args: EventsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        EventsCommand::List { in_progress, list } => {
            let color = output::should_color(global.color);
            let needle = list.filter.as_deref().map(str::to_lowercase);
            let mut rows: Vec<Event> = controller
                .events_snapshot()
                .iter()
                .filter(|e| !in_progress || e.is_in_progress())
                .filter(|e| {
                    needle.as_deref().is_none_or(|n| {
                        e.entity
                            .as_ref()
                            .and_then(|r| r.label.as_deref())
                            .is_some_and(|l| l.to_lowercase().contains(n))
                    })
                })
                .map(|e| (**e).clone())
                .collect();
            if list.limit > 0 {
                rows.truncate(list.limit);
            }

            let out = output::render_list(
                global.output,
                &rows,
                |e| EventRow::new(e, color),
                |e| e.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        EventsCommand::Seen { id } => {
            controller.execute(CoreCommand::MarkEventSeen { id }).await?;
            if !global.quiet {
                eprintln!("✓ Events up to {id} marked as seen");
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use cirrus_core::{EntityId, EntityKind, EntityRef, EventAction, EventStatus};

    use super::*;

    #[test]
    fn running_event_shows_progress() {
        let event = Event {
            id: 9,
            action: EventAction::ServerBoot,
            status: EventStatus::Started,
            entity: Some(EntityRef {
                id: EntityId::Numeric(1),
                kind: EntityKind::Server,
                label: None,
            }),
            created: None,
            percent_complete: Some(30),
            seen: false,
            username: None,
        };
        let row = EventRow::new(&event, false);
        assert_eq!(row.status, "Booting (30%)");
        assert_eq!(row.entity, "server 1");
        assert_eq!(row.action, "server_boot");
    }
}
