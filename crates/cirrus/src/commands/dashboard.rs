//! Dashboard command: one card per collection plus the docs sidebar and
//! running operations.

use std::fmt::Write;

use serde::Serialize;
use tabled::Tabled;

use cirrus_core::presentation::{CardRow, DashboardCard, DocsSidebar, dashboard_cards, default_docs};
use cirrus_core::{Controller, DisplayState, Event};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

// ── View ────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct DashboardView {
    cards: Vec<DashboardCard>,
    sidebar: Option<DocsSidebar>,
    in_progress: Vec<Event>,
}

#[derive(Tabled)]
struct CardTableRow {
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Details")]
    detail: String,
    #[tabled(rename = "Region")]
    region: String,
}

impl CardTableRow {
    fn new(row: &CardRow, color: bool) -> Self {
        let status = row.progress.clone().unwrap_or_else(|| {
            output::paint_status(row.status.as_deref().unwrap_or_default(), color)
        });
        Self {
            label: row.label.clone(),
            status,
            detail: row.detail.clone().unwrap_or_default(),
            region: row.region.clone().unwrap_or_default(),
        }
    }
}

fn render_card(out: &mut String, card: &DashboardCard, color: bool) {
    let _ = writeln!(out, "{}", output::heading(card.title, color));
    match &card.state {
        DisplayState::Rows(rows) => {
            let rows: Vec<_> = rows.iter().map(|r| CardTableRow::new(r, color)).collect();
            let _ = writeln!(out, "{}", output::render_table(&rows));
        }
        DisplayState::Loading => {
            let _ = writeln!(out, "{}", output::dim("Loading...", color));
        }
        DisplayState::Error(_) | DisplayState::Empty => {
            let message = card.message().unwrap_or_default();
            let _ = writeln!(out, "{}", output::dim(&message, color));
        }
    }
    if let Some(ref path) = card.view_all {
        let hint = format!("View all {} ({path})", card.total);
        let _ = writeln!(out, "{}", output::dim(&hint, color));
    }
}

fn render(view: &DashboardView, color: bool) -> String {
    let mut out = String::new();
    for card in &view.cards {
        render_card(&mut out, card, color);
        out.push('\n');
    }

    if !view.in_progress.is_empty() {
        let _ = writeln!(out, "{}", output::heading("In progress", color));
        for event in &view.in_progress {
            let target = event
                .entity
                .as_ref()
                .and_then(|e| e.label.as_deref())
                .unwrap_or("-");
            let _ = writeln!(out, "  {target}: {}", event.progress_label());
        }
        out.push('\n');
    }

    if let Some(ref sidebar) = view.sidebar {
        let _ = writeln!(out, "{}", output::heading(sidebar.title, color));
        if let Some(ref cta) = sidebar.backups_cta {
            let _ = writeln!(out, "  {}", cta.message());
        }
        for doc in &sidebar.docs {
            let _ = writeln!(out, "  {} - {}", doc.title, doc.src);
        }
    }
    out.trim_end().to_owned()
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let store = controller.store();
    let servers = controller.servers_snapshot();
    let view = DashboardView {
        cards: dashboard_cards(store, controller.config().listing),
        sidebar: DocsSidebar::build(&default_docs(), servers.as_slice()),
        in_progress: controller
            .events_snapshot()
            .iter()
            .filter(|e| e.is_in_progress())
            .map(|e| (**e).clone())
            .collect(),
    };

    let color = output::should_color(global.color);
    let out = output::render_single(
        global.output,
        &view,
        |v| render(v, color),
        |v| {
            v.cards
                .iter()
                .map(|c| format!("{}\t{}", c.kind, c.total))
                .collect::<Vec<_>>()
                .join("\n")
        },
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
