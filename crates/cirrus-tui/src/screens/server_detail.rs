//! Server detail: status, plan, migration banner, rescue devices and the
//! power actions.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};

use cirrus_core::presentation::{MigrationNotice, RescueDevices};
use cirrus_core::{EntityId, EntityKind, Server};

use crate::action::{Action, ServerAction};
use crate::component::Component;
use crate::data_bridge::AccountSnapshot;
use crate::theme;
use crate::widgets::status_span;

pub struct ServerDetailScreen {
    focused: bool,
    server_id: Option<EntityId>,
    snapshot: Arc<AccountSnapshot>,
}

impl ServerDetailScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            server_id: None,
            snapshot: Arc::new(AccountSnapshot::default()),
        }
    }

    fn server(&self) -> Option<Arc<Server>> {
        self.snapshot.server(self.server_id.as_ref()?)
    }

    fn migration_notice(&self, id: &EntityId) -> Option<MigrationNotice> {
        MigrationNotice::from_notices(&self.snapshot.notices_for(EntityKind::Server, id))
    }

    fn field(name: &str, value: impl Into<String>) -> Line<'static> {
        Line::from(vec![
            Span::styled(format!("  {name:<10}"), theme::key_hint()),
            Span::styled(value.into(), theme::table_row()),
        ])
    }

    fn render_banner(frame: &mut Frame, area: Rect, notice: &MigrationNotice) {
        let (lead, link, tail) = notice.parts();
        let text = Line::from(vec![
            Span::styled(" ! ", Style::default().fg(theme::AMBER)),
            Span::styled(lead, Style::default().fg(theme::TEXT)),
            Span::styled(link, theme::link().add_modifier(Modifier::UNDERLINED)),
            Span::styled(tail, Style::default().fg(theme::TEXT)),
            Span::styled("  (c)", theme::key_hint_key()),
        ]);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme::AMBER));
        frame.render_widget(
            Paragraph::new(text).block(block).wrap(Wrap { trim: true }),
            area,
        );
    }

    fn info_lines(&self, server: &Server) -> Vec<Line<'static>> {
        let progress = server.recent_event.as_ref().map(|e| e.progress_label());
        let status = status_span(&server.status.to_string(), progress.as_deref());
        let plan = self
            .snapshot
            .plan_label(server)
            .or_else(|| server.server_type.clone())
            .unwrap_or_else(|| "-".into());

        let mut lines = vec![
            Line::from(vec![
                Span::styled(format!("  {:<10}", "Status"), theme::key_hint()),
                status,
            ]),
            Self::field("Plan", plan),
            Self::field("Region", server.region.clone()),
            Self::field("IPv4", server.ipv4.join(", ")),
            Self::field("Image", server.image.clone().unwrap_or_else(|| "-".into())),
            Self::field(
                "Backups",
                if server.backups.enabled {
                    "enabled"
                } else {
                    "disabled"
                },
            ),
        ];
        if !server.tags.is_empty() {
            lines.push(Self::field("Tags", server.tags.join(", ")));
        }
        lines
    }

    fn rescue_lines(&self, server: &Server) -> Vec<Line<'static>> {
        let devices = RescueDevices::build(server, self.snapshot.volumes.as_slice());
        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("  Rescue devices ({})", devices.region),
                theme::title_style(),
            )),
        ];
        if devices.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("    No volumes available in {}.", devices.region),
                theme::message(),
            )));
        } else {
            for (slot, label) in ('a'..='h').zip(devices.labels()) {
                lines.push(Line::from(vec![
                    Span::styled(format!("    sd{slot}  "), theme::key_hint()),
                    Span::styled(label.to_owned(), theme::table_row()),
                ]));
            }
        }
        lines
    }

    fn hints() -> Line<'static> {
        let mut spans = Vec::new();
        for (key, what) in [
            ("b", "boot"),
            ("r", "reboot"),
            ("s", "shut down"),
            ("m", "migrate"),
            ("Esc", "back"),
        ] {
            spans.push(Span::styled(format!(" {key} "), theme::key_hint_key()));
            spans.push(Span::styled(format!("{what} "), theme::key_hint()));
        }
        Line::from(spans)
    }

    fn request(&self, action: ServerAction) -> Option<Action> {
        let id = self.server_id.clone()?;
        Some(Action::RequestServerAction(action, id))
    }
}

impl Default for ServerDetailScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for ServerDetailScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Char('b') => self.request(ServerAction::Boot),
            KeyCode::Char('r') => self.request(ServerAction::Reboot),
            KeyCode::Char('s') => self.request(ServerAction::Shutdown),
            KeyCode::Char('m') => self.request(ServerAction::Migrate),
            KeyCode::Char('c') => self.server_id.as_ref().and_then(|id| {
                let notice = self.migration_notice(id)?;
                Some(notice.activate(|kind| Action::MigrationNoticeActivated(kind, id.clone())))
            }),
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::OpenServer(id) => self.server_id = Some(id.clone()),
            Action::AccountUpdated(snapshot) => self.snapshot = Arc::clone(snapshot),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let Some(server) = self.server() else {
            let msg = match &self.server_id {
                Some(id) => format!("  Server {id} is not in this account."),
                None => "  No server selected.".to_owned(),
            };
            frame.render_widget(
                Paragraph::new(Span::styled(msg, theme::message())).block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_type(BorderType::Rounded)
                        .border_style(theme::border_default()),
                ),
                area,
            );
            return;
        };

        let notice = self.migration_notice(&server.id);
        let banner_height = if notice.is_some() { 4 } else { 0 };
        let [banner, body, footer] = Layout::vertical([
            Constraint::Length(banner_height),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .areas(area);

        if let Some(notice) = &notice {
            Self::render_banner(frame, banner, notice);
        }

        let block = Block::default()
            .title(Line::from(Span::styled(
                format!(" {} ", server.label),
                theme::title_style(),
            )))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });
        let mut lines = self.info_lines(&server);
        lines.extend(self.rescue_lines(&server));
        frame.render_widget(Paragraph::new(lines).block(block), body);
        frame.render_widget(Paragraph::new(Self::hints()), footer);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crossterm::event::KeyModifiers;

    use cirrus_core::NoticeKind;

    use super::*;
    use crate::test_support::{boot_event, migration_notice, render_text, server, volume};

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn open(notices: Vec<cirrus_core::AccountNotice>) -> ServerDetailScreen {
        let snapshot = AccountSnapshot {
            servers: Arc::new(vec![Arc::new(server(7, "web-01"))]),
            volumes: Arc::new(vec![
                Arc::new(volume(1, "scratch", "us-east", None)),
                Arc::new(volume(2, "other-dc", "eu-west", None)),
                Arc::new(volume(3, "taken", "us-east", Some(99))),
            ]),
            events: Arc::new(vec![Arc::new(boot_event(4, 7, Some(60)))]),
            notices: Arc::new(notices.into_iter().map(Arc::new).collect()),
            plans: [("std-2gb".to_owned(), "Standard 2GB".to_owned())].into(),
            ..AccountSnapshot::default()
        };
        let mut screen = ServerDetailScreen::new();
        screen
            .update(&Action::AccountUpdated(Arc::new(snapshot)))
            .unwrap();
        screen
            .update(&Action::OpenServer(EntityId::Numeric(7)))
            .unwrap();
        screen
    }

    #[test]
    fn renders_status_plan_and_rescue_devices() {
        let text = render_text(&open(Vec::new()), 100, 24);
        assert!(text.contains("web-01"));
        assert!(text.contains("Booting (60%)"));
        assert!(text.contains("Standard 2GB"));
        assert!(text.contains("sda  scratch"));
        assert!(!text.contains("other-dc"));
        assert!(!text.contains("taken"));
    }

    #[test]
    fn scheduled_migration_banner_offers_the_queue() {
        let notice = migration_notice(7, NoticeKind::MigrationScheduled, "Migration scheduled.");
        let mut screen = open(vec![notice]);
        let text = render_text(&screen, 120, 24);
        assert!(text.contains("To enter the migration queue right now, please click here."));

        let action = screen.handle_key_event(key('c')).unwrap();
        assert!(matches!(
            action,
            Some(Action::MigrationNoticeActivated(
                NoticeKind::MigrationScheduled,
                EntityId::Numeric(7)
            ))
        ));
    }

    #[test]
    fn no_banner_means_c_does_nothing() {
        let mut screen = open(Vec::new());
        assert!(screen.handle_key_event(key('c')).unwrap().is_none());
    }

    #[test]
    fn power_keys_request_actions() {
        let mut screen = open(Vec::new());
        let action = screen.handle_key_event(key('r')).unwrap();
        assert!(matches!(
            action,
            Some(Action::RequestServerAction(ServerAction::Reboot, EntityId::Numeric(7)))
        ));
        assert!(
            ServerDetailScreen::new()
                .handle_key_event(key('b'))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn unknown_server_says_so() {
        let mut screen = ServerDetailScreen::new();
        screen
            .update(&Action::OpenServer(EntityId::Numeric(42)))
            .unwrap();
        assert!(render_text(&screen, 60, 5).contains("Server 42 is not in this account."));
    }
}
