//! Search screen: a query line and the grouped hits below it.
//!
//! The screen owns the [`SearchSession`]. Submitting a query hands a
//! ticket to the app, which fetches a fresh corpus and runs the search;
//! results for superseded tickets, or that arrive after the screen lost
//! focus, are dropped by the session.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use throbber_widgets_tui::{Throbber, ThrobberState};
use tokio::sync::mpsc::UnboundedSender;

use cirrus_core::presentation::ResultGroups;
use cirrus_core::search::{SEARCH_ERROR_MESSAGE, SearchHit};
use cirrus_core::{CoreError, EntityKind, NavigationState, SearchSession, SearchState};

use crate::action::Action;
use crate::component::Component;
use crate::theme;

pub struct SearchScreen {
    focused: bool,
    action_tx: Option<UnboundedSender<Action>>,
    session: SearchSession,
    input: String,
    editing: bool,
    group_size: usize,
    selected: usize,
    throbber: ThrobberState,
}

impl SearchScreen {
    pub fn new(group_size: usize) -> Self {
        Self {
            focused: false,
            action_tx: None,
            session: SearchSession::new(),
            input: String::new(),
            editing: false,
            group_size,
            selected: 0,
            throbber: ThrobberState::default(),
        }
    }

    fn groups(&self) -> ResultGroups {
        ResultGroups::build(self.session.state(), self.group_size)
    }

    /// Hits in display order, flattened across groups.
    fn visible_hits(&self) -> Vec<SearchHit> {
        self.groups()
            .non_empty()
            .flat_map(|g| g.hits.iter().cloned())
            .collect()
    }

    fn submit(&mut self, query: &str) -> Option<Action> {
        self.selected = 0;
        self.session
            .navigate(NavigationState::new(query))
            .map(Action::RunSearch)
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.visible_hits().len();
        if len == 0 {
            return;
        }
        self.selected = self.selected.saturating_add_signed(delta).min(len - 1);
    }

    fn handle_editing_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Enter => {
                self.editing = false;
                Some(Action::SearchSubmit(self.input.trim().to_owned()))
            }
            KeyCode::Esc => {
                self.editing = false;
                None
            }
            KeyCode::Backspace => {
                self.input.pop();
                None
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.clear();
                None
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                None
            }
            _ => None,
        }
    }

    fn render_input(&self, frame: &mut Frame, area: Rect) {
        let border = if self.editing {
            theme::border_focused()
        } else {
            theme::border_default()
        };
        let block = Block::default()
            .title(Line::from(Span::styled(" Search ", theme::title_style())))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border);

        let mut spans = vec![
            Span::styled(" / ", theme::key_hint_key()),
            Span::styled(self.input.clone(), Style::default().fg(theme::TEXT)),
        ];
        if self.editing {
            spans.push(Span::styled("▏", Style::default().fg(theme::SKY)));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
    }

    fn render_results(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused && !self.editing {
                theme::border_focused()
            } else {
                theme::border_default()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if matches!(self.session.state(), SearchState::Idle) {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    "  Press / and type to search the account.",
                    theme::message(),
                )),
                inner,
            );
            return;
        }

        let groups = self.groups();
        if groups.loading {
            let throbber = Throbber::default()
                .label(format!("  Searching for \"{}\"…", self.session.query()))
                .style(theme::message())
                .throbber_style(Style::default().fg(theme::SKY));
            frame.render_stateful_widget(throbber, inner, &mut self.throbber.clone());
            return;
        }
        if groups.error.is_some() {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    format!("  {SEARCH_ERROR_MESSAGE}"),
                    theme::error_text(),
                )),
                inner,
            );
            return;
        }
        if groups.no_results {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    format!("  No results for \"{}\".", self.session.query()),
                    theme::message(),
                )),
                inner,
            );
            return;
        }

        let mut lines = Vec::new();
        let mut selected_line = 0;
        let mut index = 0;
        for group in groups.non_empty() {
            let mut header = vec![Span::styled(
                format!(" {} ({})", group.title, group.total),
                theme::title_style(),
            )];
            if let Some(showing) = group.showing() {
                header.push(Span::styled(format!("  {showing}"), theme::key_hint()));
            }
            lines.push(Line::from(header));

            for hit in &group.hits {
                let selected = index == self.selected;
                if selected {
                    selected_line = lines.len();
                }
                let style = if selected && !self.editing {
                    theme::table_selected()
                } else {
                    theme::table_row()
                };
                let marker = if selected && !self.editing { "▸ " } else { "  " };
                let mut spans = vec![
                    Span::styled(format!(" {marker}"), Style::default().fg(theme::SKY)),
                    Span::styled(hit.label.clone(), style.add_modifier(Modifier::BOLD)),
                    Span::styled(format!("  {}", hit.description), theme::message()),
                ];
                if !hit.tags.is_empty() {
                    spans.push(Span::styled(
                        format!("  #{}", hit.tags.join(" #")),
                        theme::key_hint(),
                    ));
                }
                lines.push(Line::from(spans));
                index += 1;
            }
            lines.push(Line::from(""));
        }

        let height = usize::from(inner.height.max(1));
        let scroll = u16::try_from(selected_line.saturating_sub(height - 1)).unwrap_or(u16::MAX);
        frame.render_widget(Paragraph::new(lines).scroll((scroll, 0)), inner);
    }
}

impl Component for SearchScreen {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(action_tx);
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.editing {
            return Ok(self.handle_editing_key(key));
        }

        match key.code {
            KeyCode::Char('/') | KeyCode::Char('i') => {
                self.editing = true;
                Ok(None)
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_selection(1);
                Ok(None)
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_selection(-1);
                Ok(None)
            }
            KeyCode::Enter => {
                let hit = self.visible_hits().into_iter().nth(self.selected);
                Ok(hit
                    .filter(|h| h.kind == EntityKind::Server)
                    .map(|h| Action::OpenServer(h.id)))
            }
            _ => Ok(None),
        }
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::OpenSearch => {
                self.editing = true;
                Ok(None)
            }
            Action::SearchSubmit(query) => Ok(self.submit(query)),
            Action::SearchCompleted(outcome) => {
                let applied = self.session.complete(
                    &outcome.ticket,
                    outcome.result.clone().map_err(CoreError::Internal),
                );
                if applied {
                    self.selected = 0;
                }
                Ok(None)
            }
            Action::Tick => {
                if self.session.state().is_loading() {
                    self.throbber.calc_next();
                }
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let [input, results] =
            Layout::vertical([Constraint::Length(3), Constraint::Min(3)]).areas(area);
        self.render_input(frame, input);
        self.render_results(frame, results);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
        if !focused {
            self.editing = false;
            self.session.unmount();
            return;
        }
        // Coming back: carried results are reused, anything else refetches.
        if !self.session.is_mounted() && !self.session.query().is_empty() {
            let nav = self.session.navigation_state();
            if let (Some(ticket), Some(tx)) = (self.session.mount(nav), &self.action_tx) {
                let _ = tx.send(Action::RunSearch(ticket));
            }
        }
    }

    fn captures_input(&self) -> bool {
        self.editing
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use cirrus_core::search::search;
    use cirrus_core::{RankingPolicy, SearchCorpus, SearchResults, SearchTicket};

    use super::*;
    use crate::action::SearchOutcome;
    use crate::test_support::{render_text, server, volume};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn corpus() -> SearchCorpus {
        SearchCorpus {
            servers: vec![
                Arc::new(server(1, "web-01")),
                Arc::new(server(2, "db-01")),
            ],
            volumes: vec![Arc::new(volume(5, "web-data", "us-east", Some(1)))],
            ..SearchCorpus::default()
        }
    }

    fn ticket_for(screen: &mut SearchScreen, query: &str) -> SearchTicket {
        match screen
            .update(&Action::SearchSubmit(query.to_owned()))
            .unwrap()
        {
            Some(Action::RunSearch(ticket)) => ticket,
            other => panic!("expected a search ticket, got {other:?}"),
        }
    }

    fn complete(screen: &mut SearchScreen, ticket: SearchTicket, result: Result<SearchResults, String>) {
        screen
            .update(&Action::SearchCompleted(Box::new(SearchOutcome { ticket, result })))
            .unwrap();
    }

    fn run(screen: &mut SearchScreen, query: &str) {
        let ticket = ticket_for(screen, query);
        let results = search(ticket.query(), &corpus(), RankingPolicy::Relevance);
        complete(screen, ticket, Ok(results));
    }

    #[test]
    fn typing_then_enter_submits_the_query() {
        let mut screen = SearchScreen::new(100);
        screen.update(&Action::OpenSearch).unwrap();
        assert!(screen.captures_input());
        for c in " web ".chars() {
            screen.handle_key_event(key(KeyCode::Char(c))).unwrap();
        }
        let action = screen.handle_key_event(key(KeyCode::Enter)).unwrap();
        assert!(matches!(action, Some(Action::SearchSubmit(q)) if q == "web"));
        assert!(!screen.captures_input());
    }

    #[test]
    fn results_render_grouped() {
        let mut screen = SearchScreen::new(100);
        run(&mut screen, "web");
        let text = render_text(&screen, 80, 20);
        assert!(text.contains("Servers (1)"));
        assert!(text.contains("web-01"));
        assert!(text.contains("Volumes (1)"));
        assert!(text.contains("web-data"));
        assert!(!text.contains("db-01"));
    }

    #[test]
    fn group_cap_shows_counts() {
        let mut screen = SearchScreen::new(1);
        run(&mut screen, "01");
        let text = render_text(&screen, 80, 20);
        assert!(text.contains("Servers (2)"));
        assert!(text.contains("showing 1 of 2"));
    }

    #[test]
    fn empty_and_failed_searches() {
        let mut screen = SearchScreen::new(100);
        run(&mut screen, "zzz");
        assert!(render_text(&screen, 80, 10).contains("No results for \"zzz\"."));

        let ticket = ticket_for(&mut screen, "web");
        complete(&mut screen, ticket, Err("HTTP 503".into()));
        assert!(render_text(&screen, 80, 10).contains(SEARCH_ERROR_MESSAGE));
    }

    #[test]
    fn stale_ticket_is_ignored() {
        let mut screen = SearchScreen::new(100);
        let first = ticket_for(&mut screen, "db");
        let second = ticket_for(&mut screen, "web");

        let stale = search(first.query(), &corpus(), RankingPolicy::Relevance);
        complete(&mut screen, first, Ok(stale));
        assert!(screen.session.state().is_loading());
        assert!(render_text(&screen, 80, 10).contains("Searching"));

        let fresh = search(second.query(), &corpus(), RankingPolicy::Relevance);
        complete(&mut screen, second, Ok(fresh));
        let text = render_text(&screen, 80, 20);
        assert!(text.contains("web-01"));
        assert!(!text.contains("db-01"));
    }

    #[test]
    fn leaving_drops_in_flight_results() {
        let mut screen = SearchScreen::new(100);
        let ticket = ticket_for(&mut screen, "web");
        screen.set_focused(false);
        let results = search(ticket.query(), &corpus(), RankingPolicy::Relevance);
        complete(&mut screen, ticket, Ok(results));
        assert!(screen.session.state().is_loading());
    }

    #[test]
    fn enter_opens_server_hits_only() {
        let mut screen = SearchScreen::new(100);
        run(&mut screen, "web");

        let open = screen.handle_key_event(key(KeyCode::Enter)).unwrap();
        assert!(matches!(
            open,
            Some(Action::OpenServer(cirrus_core::EntityId::Numeric(1)))
        ));

        screen.handle_key_event(key(KeyCode::Char('j'))).unwrap();
        assert!(screen.handle_key_event(key(KeyCode::Enter)).unwrap().is_none());
    }
}
