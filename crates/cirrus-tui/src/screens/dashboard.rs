//! Dashboard screen: the four resource cards, the docs sidebar and the
//! operations currently in flight.
//!
//! Layout:
//! ┌─ Servers ──────────┐ ┌─ Volumes ──────────┐ ┌─ Cirrus Docs ────┐
//! │                    │ │                    │ │                  │
//! └────────────────────┘ └────────────────────┘ │                  │
//! ┌─ Domains ──────────┐ ┌─ Load Balancers ───┐ ├─ In Progress ────┤
//! │                    │ │                    │ │                  │
//! └────────────────────┘ └────────────────────┘ └──────────────────┘

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState, Wrap};

use cirrus_core::presentation::{CardRow, DashboardCard, DocsSidebar};
use cirrus_core::{DisplayState, EntityKind};

use crate::action::Action;
use crate::component::Component;
use crate::data_bridge::AccountSnapshot;
use crate::theme;
use crate::widgets::status_span;

const SIDEBAR_WIDTH: u16 = 42;

pub struct DashboardScreen {
    focused: bool,
    snapshot: Arc<AccountSnapshot>,
    table_state: TableState,
}

impl DashboardScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            snapshot: Arc::new(AccountSnapshot::default()),
            table_state: TableState::default().with_selected(Some(0)),
        }
    }

    fn server_rows(&self) -> &[CardRow] {
        self.snapshot
            .cards
            .iter()
            .find(|c| c.kind == EntityKind::Server)
            .map(|c| c.state.rows())
            .unwrap_or_default()
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.server_rows().len();
        if len == 0 {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0);
        let next = current.saturating_add_signed(delta).min(len - 1);
        self.table_state.select(Some(next));
    }

    fn selected_server(&self) -> Option<&CardRow> {
        self.server_rows().get(self.table_state.selected().unwrap_or(0))
    }

    fn render_card(&self, frame: &mut Frame, area: Rect, card: &DashboardCard) {
        let selectable = card.kind == EntityKind::Server;
        let border = if selectable && self.focused {
            theme::border_focused()
        } else {
            theme::border_default()
        };

        let mut block = Block::default()
            .title(Line::from(Span::styled(
                format!(" {} ", card.title),
                theme::title_style(),
            )))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border);
        if let Some(path) = &card.view_all {
            block = block.title_bottom(
                Line::from(vec![
                    Span::styled(format!(" View all {} ", card.total), theme::link()),
                    Span::styled(format!("{path} "), theme::key_hint()),
                ])
                .right_aligned(),
            );
        }

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = match &card.state {
            DisplayState::Rows(rows) => rows,
            DisplayState::Loading => {
                frame.render_widget(
                    Paragraph::new(Span::styled("  Loading…", theme::message())),
                    inner,
                );
                return;
            }
            DisplayState::Error(_) => {
                let msg = card.message().unwrap_or_default();
                frame.render_widget(
                    Paragraph::new(Span::styled(format!("  {msg}"), theme::error_text())),
                    inner,
                );
                return;
            }
            DisplayState::Empty => {
                let msg = card.message().unwrap_or_default();
                frame.render_widget(
                    Paragraph::new(Span::styled(format!("  {msg}"), theme::message())),
                    inner,
                );
                return;
            }
        };

        let table_rows: Vec<Row> = rows
            .iter()
            .map(|row| {
                let status = row
                    .status
                    .as_deref()
                    .map_or_else(|| Span::raw(""), |s| status_span(s, row.progress.as_deref()));
                Row::new(vec![
                    Cell::from(row.label.clone()),
                    Cell::from(Line::from(status)),
                    Cell::from(row.detail.clone().unwrap_or_default()),
                    Cell::from(row.region.clone().unwrap_or_default()),
                ])
                .style(theme::table_row())
            })
            .collect();

        let widths = [
            Constraint::Fill(2),
            Constraint::Length(20),
            Constraint::Fill(2),
            Constraint::Length(10),
        ];
        let mut table = Table::new(table_rows, widths).column_spacing(1);
        if selectable && self.focused {
            table = table
                .row_highlight_style(theme::table_selected())
                .highlight_symbol("▸ ");
        }

        let mut state = self.table_state.clone();
        frame.render_stateful_widget(table, inner, &mut state);
    }

    fn render_sidebar(frame: &mut Frame, area: Rect, sidebar: &DocsSidebar) {
        let block = Block::default()
            .title(Line::from(Span::styled(
                format!(" {} ", sidebar.title),
                theme::title_style(),
            )))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut lines = Vec::new();
        if let Some(cta) = &sidebar.backups_cta {
            lines.push(Line::from(Span::styled(
                cta.message(),
                Style::default().fg(theme::AMBER),
            )));
            lines.push(Line::from(""));
        }
        for doc in &sidebar.docs {
            lines.push(Line::from(Span::styled(
                doc.title.clone(),
                theme::link().add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(Span::styled(doc.body.clone(), theme::message())));
            lines.push(Line::from(Span::styled(doc.src.clone(), theme::key_hint())));
            lines.push(Line::from(""));
        }

        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
    }

    fn render_in_progress(&self, frame: &mut Frame, area: Rect) {
        let events = self.snapshot.in_progress_events();
        let block = Block::default()
            .title(Line::from(Span::styled(" In Progress ", theme::title_style())))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if events.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled("  Nothing running.", theme::message())),
                inner,
            );
            return;
        }

        let lines: Vec<Line> = events
            .iter()
            .map(|event| {
                let target = event
                    .entity
                    .as_ref()
                    .map(|e| e.label.clone().unwrap_or_else(|| e.id.to_string()))
                    .unwrap_or_default();
                let marker = if event.seen { "  " } else { "• " };
                Line::from(vec![
                    Span::styled(marker, Style::default().fg(theme::SKY)),
                    Span::styled(event.progress_label(), Style::default().fg(theme::AMBER)),
                    Span::styled(format!(" {target}"), theme::table_row()),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

impl Default for DashboardScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for DashboardScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_selection(1);
                Ok(None)
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_selection(-1);
                Ok(None)
            }
            KeyCode::Char('g') => {
                self.table_state.select(Some(0));
                Ok(None)
            }
            KeyCode::Enter => Ok(self
                .selected_server()
                .map(|row| Action::OpenServer(row.id.clone()))),
            KeyCode::Char('e') => Ok(self
                .snapshot
                .newest_unseen_event()
                .map(|_| Action::MarkEventsSeen)),
            _ => Ok(None),
        }
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        if let Action::AccountUpdated(snapshot) = action {
            self.snapshot = Arc::clone(snapshot);
            let len = self.server_rows().len();
            let selected = self.table_state.selected().unwrap_or(0);
            self.table_state
                .select(Some(selected.min(len.saturating_sub(1))));
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let [main, side] =
            Layout::horizontal([Constraint::Min(50), Constraint::Length(SIDEBAR_WIDTH)])
                .areas(area);

        let [top, bottom] =
            Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(main);
        let halves = |row: Rect| {
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(row)
                .to_vec()
        };
        let slots: Vec<Rect> = halves(top).into_iter().chain(halves(bottom)).collect();

        for (card, slot) in self.snapshot.cards.iter().zip(slots) {
            self.render_card(frame, slot, card);
        }

        match &self.snapshot.sidebar {
            Some(sidebar) => {
                let [docs, running] =
                    Layout::vertical([Constraint::Min(8), Constraint::Length(8)]).areas(side);
                Self::render_sidebar(frame, docs, sidebar);
                self.render_in_progress(frame, running);
            }
            None => self.render_in_progress(frame, side),
        }
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crossterm::event::KeyModifiers;

    use cirrus_core::presentation::{PlanLabels, default_docs};
    use cirrus_core::{CollectionStatus, Domain, EntityId, Event, ListingPolicy, LoadBalancer};

    use super::*;
    use crate::test_support::{boot_event, render_text, server, volume};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn loaded() -> CollectionStatus {
        CollectionStatus::default()
    }

    fn snapshot() -> AccountSnapshot {
        let plans = PlanLabels::from([("std-2gb".to_owned(), "Standard 2GB".to_owned())]);
        let policy = ListingPolicy::default();
        let mut bare = server(2, "db-01");
        bare.backups.enabled = false;
        let servers = vec![Arc::new(server(1, "web-01")), Arc::new(bare)];
        let events = vec![boot_event(9, 2, Some(40))];

        let failed = CollectionStatus {
            error: Some("HTTP 500".into()),
            ..CollectionStatus::default()
        };
        let cards = vec![
            DashboardCard::build(&servers, &events, &loaded(), &plans, policy),
            DashboardCard::build(
                &[volume(5, "web-data", "us-east", Some(1))],
                &events,
                &failed,
                &plans,
                policy,
            ),
            DashboardCard::build::<Domain, Event>(&[], &[], &loaded(), &plans, policy),
            DashboardCard::build::<LoadBalancer, Event>(
                &[],
                &[],
                &CollectionStatus::pending(),
                &plans,
                policy,
            ),
        ];

        AccountSnapshot {
            cards,
            sidebar: DocsSidebar::build(&default_docs(), &servers),
            servers: Arc::new(servers),
            events: Arc::new(events.into_iter().map(Arc::new).collect()),
            plans,
            ..AccountSnapshot::default()
        }
    }

    fn screen() -> DashboardScreen {
        let mut screen = DashboardScreen::new();
        screen.set_focused(true);
        screen
            .update(&Action::AccountUpdated(Arc::new(snapshot())))
            .unwrap();
        screen
    }

    #[test]
    fn renders_every_card_state() {
        let text = render_text(&screen(), 150, 30);
        assert!(text.contains("Servers"));
        assert!(text.contains("web-01"));
        assert!(text.contains("Booting (40%)"));
        assert!(text.contains("Unable to load Volumes."));
        assert!(text.contains("No items to display."));
        assert!(text.contains("Loading…"));
        assert!(text.contains("Cirrus Docs"));
        assert!(text.contains("without backups"));
    }

    #[test]
    fn enter_opens_the_selected_server() {
        let mut screen = screen();
        // Rows are sorted by label: db-01 first.
        let open = screen.handle_key_event(key(KeyCode::Enter)).unwrap();
        assert!(matches!(open, Some(Action::OpenServer(EntityId::Numeric(2)))));

        screen.handle_key_event(key(KeyCode::Char('j'))).unwrap();
        screen.handle_key_event(key(KeyCode::Char('j'))).unwrap();
        let open = screen.handle_key_event(key(KeyCode::Enter)).unwrap();
        assert!(matches!(open, Some(Action::OpenServer(EntityId::Numeric(1)))));
    }

    #[test]
    fn mark_seen_needs_an_unseen_event() {
        let mut screen = screen();
        let action = screen.handle_key_event(key(KeyCode::Char('e'))).unwrap();
        assert!(matches!(action, Some(Action::MarkEventsSeen)));

        let mut empty = DashboardScreen::new();
        assert!(
            empty
                .handle_key_event(key(KeyCode::Char('e')))
                .unwrap()
                .is_none()
        );
        assert!(empty.handle_key_event(key(KeyCode::Enter)).unwrap().is_none());
    }

    #[test]
    fn selection_clamps_when_servers_disappear() {
        let mut screen = screen();
        screen.handle_key_event(key(KeyCode::Down)).unwrap();
        screen
            .update(&Action::AccountUpdated(Arc::new(AccountSnapshot::default())))
            .unwrap();
        assert_eq!(screen.table_state.selected(), Some(0));
    }
}
