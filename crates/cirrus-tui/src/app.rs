//! Application core: the event loop, screen management and action dispatch.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Tabs},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use cirrus_core::search::search;
use cirrus_core::{Command, Controller, EntityId, NoticeKind, SearchSettings, SearchTicket};

use crate::action::{Action, ConfirmAction, Notification, SearchOutcome, ServerAction};
use crate::component::Component;
use crate::data_bridge::AccountSnapshot;
use crate::event::{Event, EventReader};
use crate::screen::ScreenId;
use crate::screens::create_screens;
use crate::theme;
use crate::tui::Tui;
use crate::widgets::overlay;

/// Connection status as seen by the TUI.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Connecting,
    Connected,
    Disconnected(String),
}

/// Top-level application state and event loop.
pub struct App {
    /// Current active screen.
    active_screen: ScreenId,
    /// Previous screen for GoBack.
    previous_screen: Option<ScreenId>,
    /// All screen components, keyed by ScreenId.
    screens: HashMap<ScreenId, Box<dyn Component>>,
    /// Whether the app should keep running.
    running: bool,
    connection_status: ConnectionStatus,
    help_visible: bool,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    controller: Option<Controller>,
    /// Cancellation token for the data bridge task.
    data_cancel: CancellationToken,
    /// Pending confirmation dialog (blocks other input while active).
    pending_confirm: Option<ConfirmAction>,
    /// Active notification toast with display timestamp.
    notification: Option<(Notification, Instant)>,
    /// Latest account data, for resolving labels in prompts.
    snapshot: Arc<AccountSnapshot>,
    search: SearchSettings,
}

impl App {
    /// Create a new App with all screens. Without a [`Controller`] the
    /// screens stay empty and every command reports "Not connected".
    pub fn new(controller: Option<Controller>) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let search = controller
            .as_ref()
            .map(|c| c.config().search)
            .unwrap_or_default();
        let connection_status = if controller.is_some() {
            ConnectionStatus::Connecting
        } else {
            ConnectionStatus::Disconnected("no account configured".into())
        };

        Self {
            active_screen: ScreenId::Dashboard,
            previous_screen: None,
            screens: create_screens(search).into_iter().collect(),
            running: true,
            connection_status,
            help_visible: false,
            action_tx,
            action_rx,
            controller,
            data_cancel: CancellationToken::new(),
            pending_confirm: None,
            notification: None,
            snapshot: Arc::new(AccountSnapshot::default()),
            search,
        }
    }

    /// Initialize all screen components with the action sender.
    fn init_screens(&mut self) -> Result<()> {
        for screen in self.screens.values_mut() {
            screen.init(self.action_tx.clone())?;
        }
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(true);
        }
        Ok(())
    }

    /// Run the main event loop.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        self.init_screens()?;

        if let Some(controller) = self.controller.clone() {
            let cancel = self.data_cancel.clone();
            let tx = self.action_tx.clone();
            tokio::spawn(async move {
                crate::data_bridge::spawn_data_bridge(controller, tx, cancel).await;
            });
        }

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(33),  // ~30 FPS render
        );

        info!("TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => self.action_tx.send(Action::Resize(w, h))?,
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Render => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        self.data_cancel.cancel();
        events.stop();
        info!("TUI event loop ended");
        Ok(())
    }

    /// Map a key event to an action. Global keys are handled here;
    /// screen-specific keys are delegated to the active screen component.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        // Confirmation dialog captures all input
        if self.pending_confirm.is_some() {
            return match key.code {
                KeyCode::Char('y' | 'Y') => Ok(Some(Action::ConfirmYes)),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => Ok(Some(Action::ConfirmNo)),
                _ => Ok(None),
            };
        }

        if self.help_visible {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Ok(Some(Action::ToggleHelp)),
                _ => Ok(None),
            };
        }

        // A screen that is taking text gets every key.
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            if screen.captures_input() {
                return screen.handle_key_event(key);
            }
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(Some(Action::Quit)),
            (KeyModifiers::NONE, KeyCode::Char('?')) => return Ok(Some(Action::ToggleHelp)),
            (KeyModifiers::NONE, KeyCode::Char('/')) => return Ok(Some(Action::OpenSearch)),
            (KeyModifiers::CONTROL, KeyCode::Char('r')) => return Ok(Some(Action::Refresh)),

            (KeyModifiers::NONE, KeyCode::Char(c @ '1'..='9')) => {
                let n = u8::try_from(c).unwrap_or(b'0') - b'0';
                if let Some(screen) = ScreenId::from_number(n) {
                    return Ok(Some(Action::SwitchScreen(screen)));
                }
            }

            (KeyModifiers::NONE, KeyCode::Tab) => {
                return Ok(Some(Action::SwitchScreen(self.active_screen.next())));
            }

            (KeyModifiers::NONE, KeyCode::Esc) => return Ok(Some(Action::GoBack)),

            _ => {}
        }

        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            return screen.handle_key_event(key);
        }

        Ok(None)
    }

    fn switch_to(&mut self, target: ScreenId) {
        if target == self.active_screen {
            return;
        }
        debug!("switching screen: {} → {}", self.active_screen, target);
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(false);
        }
        // Detail views are not a useful place to come back to.
        if self.active_screen != ScreenId::ServerDetail {
            self.previous_screen = Some(self.active_screen);
        }
        self.active_screen = target;
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(true);
        }
    }

    /// Send an action to one screen, regardless of which one is active.
    fn forward_to(&mut self, id: ScreenId, action: &Action) -> Result<()> {
        if let Some(screen) = self.screens.get_mut(&id) {
            if let Some(follow_up) = screen.update(action)? {
                self.action_tx.send(follow_up)?;
            }
        }
        Ok(())
    }

    /// Process a single action: update app state and propagate to components.
    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => {
                self.running = false;
            }

            Action::Resize(w, h) => {
                debug!(width = w, height = h, "terminal resized");
            }

            Action::SwitchScreen(target) => self.switch_to(*target),

            Action::GoBack => {
                let target = self.previous_screen.take().or(
                    (self.active_screen != ScreenId::Dashboard).then_some(ScreenId::Dashboard),
                );
                if let Some(prev) = target {
                    self.switch_to(prev);
                }
            }

            Action::OpenServer(_) => {
                self.forward_to(ScreenId::ServerDetail, action)?;
                self.switch_to(ScreenId::ServerDetail);
            }

            Action::OpenSearch => {
                self.switch_to(ScreenId::Search);
                self.forward_to(ScreenId::Search, action)?;
            }

            Action::SearchSubmit(_) | Action::SearchCompleted(_) => {
                self.forward_to(ScreenId::Search, action)?;
            }

            Action::RunSearch(ticket) => self.run_search(ticket.clone()),

            Action::ToggleHelp => {
                self.help_visible = !self.help_visible;
            }

            Action::Connected => {
                self.connection_status = ConnectionStatus::Connected;
            }

            Action::Disconnected(reason) => {
                self.connection_status = ConnectionStatus::Disconnected(reason.clone());
            }

            Action::Reconnecting => {
                self.connection_status = ConnectionStatus::Connecting;
            }

            Action::Render => {}

            Action::Tick => {
                // Auto-dismiss notifications after 3 seconds
                if self
                    .notification
                    .as_ref()
                    .is_some_and(|(_, created)| created.elapsed() > Duration::from_secs(3))
                {
                    self.notification = None;
                }
                self.forward_to(self.active_screen, action)?;
            }

            // Data updates go to ALL screens so they stay in sync
            Action::AccountUpdated(snapshot) => {
                self.snapshot = Arc::clone(snapshot);
                for screen in self.screens.values_mut() {
                    if let Some(follow_up) = screen.update(action)? {
                        self.action_tx.send(follow_up)?;
                    }
                }
            }

            Action::Refresh => self.refresh(),

            // ── Command pipeline ──────────────────────────────────────
            Action::RequestServerAction(server_action, id) => {
                let label = self.resolve_server_label(id);
                if server_action.needs_confirm() {
                    self.action_tx
                        .send(Action::ShowConfirm(ConfirmAction::Server {
                            action: *server_action,
                            id: id.clone(),
                            label,
                        }))?;
                } else {
                    self.execute_server_action(*server_action, id.clone(), &label);
                }
            }

            Action::MigrationNoticeActivated(kind, id) => {
                let label = self.resolve_server_label(id);
                self.action_tx
                    .send(Action::ShowConfirm(ConfirmAction::EnterMigrationQueue {
                        id: id.clone(),
                        label,
                        queue: *kind == NoticeKind::MigrationScheduled,
                    }))?;
            }

            Action::MarkEventsSeen => {
                if let Some(id) = self.snapshot.newest_unseen_event() {
                    self.execute_command(
                        Command::MarkEventSeen { id },
                        "Events marked as seen".into(),
                    );
                }
            }

            // Confirmation dialog management
            Action::ShowConfirm(confirm) => {
                self.pending_confirm = Some(confirm.clone());
            }

            Action::ConfirmYes => {
                if let Some(confirm) = self.pending_confirm.take() {
                    self.execute_confirm(confirm);
                }
            }

            Action::ConfirmNo => {
                self.pending_confirm = None;
            }

            Action::Notify(n) => {
                self.notification = Some((n.clone(), Instant::now()));
            }

            Action::DismissNotification => {
                self.notification = None;
            }
        }
        Ok(())
    }

    fn resolve_server_label(&self, id: &EntityId) -> String {
        self.snapshot
            .server(id)
            .map_or_else(|| id.to_string(), |s| s.label.clone())
    }

    // ── Command execution ─────────────────────────────────────────

    /// Spawn a command execution task. Sends a Notify action on completion.
    fn execute_command(&self, cmd: Command, success_msg: String) {
        let Some(controller) = self.controller.clone() else {
            let _ = self
                .action_tx
                .send(Action::Notify(Notification::error("Not connected")));
            return;
        };

        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            match controller.execute(cmd).await {
                Ok(_) => {
                    let _ = tx.send(Action::Notify(Notification::success(success_msg)));
                }
                Err(e) => {
                    warn!(error = %e, "command execution failed");
                    let _ = tx.send(Action::Notify(Notification::error(e.summary())));
                }
            }
        });
    }

    fn execute_server_action(&self, action: ServerAction, id: EntityId, label: &str) {
        let cmd = match action {
            ServerAction::Boot => Command::BootServer { id },
            ServerAction::Reboot => Command::RebootServer { id },
            ServerAction::Shutdown => Command::ShutdownServer { id },
            ServerAction::Migrate => Command::MigrateServer { id },
        };
        self.execute_command(cmd, format!("{} requested for {label}", action.verb()));
    }

    /// Map a confirmed action to its Command and execute it.
    fn execute_confirm(&self, action: ConfirmAction) {
        match action {
            ConfirmAction::Server { action, id, label } => {
                self.execute_server_action(action, id, &label);
            }
            ConfirmAction::EnterMigrationQueue { id, label, queue } => {
                let msg = if queue {
                    format!("{label} entered the migration queue")
                } else {
                    format!("Migration requested for {label}")
                };
                self.execute_command(Command::MigrateServer { id }, msg);
            }
        }
    }

    fn refresh(&self) {
        let Some(controller) = self.controller.clone() else {
            let _ = self
                .action_tx
                .send(Action::Notify(Notification::error("Not connected")));
            return;
        };

        let tx = self.action_tx.clone();
        let _ = tx.send(Action::Notify(Notification::info("Refreshing…")));
        tokio::spawn(async move {
            if let Err(e) = controller.full_refresh().await {
                warn!(error = %e, "manual refresh failed");
                let _ = tx.send(Action::Notify(Notification::error(e.summary())));
            }
        });
    }

    /// Fetch a fresh corpus and search it for the ticket's query. The
    /// search screen decides whether the outcome is still wanted.
    fn run_search(&self, ticket: SearchTicket) {
        let tx = self.action_tx.clone();
        let Some(controller) = self.controller.clone() else {
            let _ = tx.send(Action::SearchCompleted(Box::new(SearchOutcome {
                ticket,
                result: Err("not connected".into()),
            })));
            return;
        };

        let ranking = self.search.ranking;
        tokio::spawn(async move {
            let result = controller
                .fetch_search_corpus()
                .await
                .map(|corpus| search(ticket.query(), &corpus, ranking))
                .map_err(|e| e.to_string());
            let _ = tx.send(Action::SearchCompleted(Box::new(SearchOutcome {
                ticket,
                result,
            })));
        });
    }

    // ── Rendering ─────────────────────────────────────────────────

    /// Render the full application frame.
    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        // Layout: [screen content] [tab bar] [status bar]
        let [content_area, tab_area, status_area] = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

        if let Some(screen) = self.screens.get(&self.active_screen) {
            screen.render(frame, content_area);
        }

        self.render_tab_bar(frame, tab_area);
        self.render_status_bar(frame, status_area);

        // Overlays on top (last = topmost)
        if let Some((ref notif, _)) = self.notification {
            overlay::render_toast(frame, area, notif);
        }

        if let Some(ref confirm) = self.pending_confirm {
            overlay::render_confirm(frame, area, confirm);
        }

        if self.help_visible {
            overlay::render_help(frame, area);
        }
    }

    fn render_tab_bar(&self, frame: &mut Frame, area: Rect) {
        // Off-bar screens keep their parent tab lit.
        let current = if ScreenId::ALL.contains(&self.active_screen) {
            self.active_screen
        } else {
            self.previous_screen.unwrap_or_default()
        };

        let mut titles: Vec<Line> = ScreenId::ALL
            .iter()
            .map(|&id| {
                let style = if id == current {
                    theme::tab_active()
                } else {
                    theme::tab_inactive()
                };
                Line::from(Span::styled(
                    format!(" {} {} ", id.number(), id.label()),
                    style,
                ))
            })
            .collect();

        if self.active_screen == ScreenId::ServerDetail {
            titles.push(Line::from(Span::styled(
                format!(" {} ", ScreenId::ServerDetail.label()),
                theme::tab_active(),
            )));
        }

        let tabs = Tabs::new(titles)
            .divider(Span::styled(" ", theme::key_hint()))
            .select(
                ScreenId::ALL
                    .iter()
                    .position(|&s| s == current)
                    .unwrap_or(0),
            );

        frame.render_widget(tabs, area);
    }

    /// Render the bottom status bar with connection status and key hints.
    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let connection_indicator = match &self.connection_status {
            ConnectionStatus::Connected => {
                Span::styled("● connected", Style::default().fg(theme::MINT))
            }
            ConnectionStatus::Disconnected(reason) => Span::styled(
                format!("○ disconnected: {reason}"),
                Style::default().fg(theme::ROSE),
            ),
            ConnectionStatus::Connecting => {
                Span::styled("◐ connecting", Style::default().fg(theme::AMBER))
            }
        };

        let hints = Span::styled(
            " │ / search  Ctrl+r refresh  ? help  q quit",
            theme::key_hint(),
        );

        let line = Line::from(vec![Span::raw(" "), connection_indicator, hints]);
        frame.render_widget(Paragraph::new(line), area);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;
    use crate::test_support::{buffer_text, migration_notice, server};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app() -> App {
        let mut app = App::new(None);
        app.init_screens().unwrap();
        let snapshot = AccountSnapshot {
            servers: Arc::new(vec![Arc::new(server(1, "web-01"))]),
            notices: Arc::new(vec![Arc::new(migration_notice(
                1,
                NoticeKind::MigrationScheduled,
                "Migration scheduled.",
            ))]),
            ..AccountSnapshot::default()
        };
        app.process_action(&Action::AccountUpdated(Arc::new(snapshot)))
            .unwrap();
        app
    }

    /// Feed a key through the app and process everything it queues.
    fn press(app: &mut App, code: KeyCode) {
        if let Some(action) = app.handle_key_event(key(code)).unwrap() {
            app.action_tx.send(action).unwrap();
        }
        drain(app);
    }

    fn drain(app: &mut App) {
        while let Ok(action) = app.action_rx.try_recv() {
            app.process_action(&action).unwrap();
        }
    }

    fn screen_text(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();
        buffer_text(terminal.backend().buffer())
    }

    #[test]
    fn q_quits_outside_text_input() {
        let mut app = app();
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.running);
    }

    #[test]
    fn search_input_swallows_global_keys() {
        let mut app = app();
        press(&mut app, KeyCode::Char('/'));
        assert_eq!(app.active_screen, ScreenId::Search);

        press(&mut app, KeyCode::Char('q'));
        assert!(app.running);

        // Without a controller the search fails and says so.
        press(&mut app, KeyCode::Enter);
        assert!(screen_text(&app).contains("There was an error retrieving your search results."));

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.active_screen, ScreenId::Dashboard);
    }

    #[test]
    fn reboot_asks_before_running() {
        let mut app = app();
        app.action_tx
            .send(Action::OpenServer(EntityId::Numeric(1)))
            .unwrap();
        drain(&mut app);
        assert_eq!(app.active_screen, ScreenId::ServerDetail);

        press(&mut app, KeyCode::Char('r'));
        assert_eq!(
            app.pending_confirm,
            Some(ConfirmAction::Server {
                action: ServerAction::Reboot,
                id: EntityId::Numeric(1),
                label: "web-01".into(),
            })
        );
        assert!(screen_text(&app).contains("Reboot web-01?"));

        press(&mut app, KeyCode::Char('n'));
        assert!(app.pending_confirm.is_none());
        assert!(app.notification.is_none());

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.active_screen, ScreenId::Dashboard);
    }

    #[test]
    fn boot_runs_without_confirmation() {
        let mut app = app();
        app.action_tx
            .send(Action::RequestServerAction(
                ServerAction::Boot,
                EntityId::Numeric(1),
            ))
            .unwrap();
        drain(&mut app);
        assert!(app.pending_confirm.is_none());
        let (notif, _) = app.notification.clone().unwrap();
        assert_eq!(notif.message, "Not connected");
    }

    #[test]
    fn migration_banner_confirms_queue_entry() {
        let mut app = app();
        app.action_tx
            .send(Action::OpenServer(EntityId::Numeric(1)))
            .unwrap();
        drain(&mut app);

        press(&mut app, KeyCode::Char('c'));
        assert_eq!(
            app.pending_confirm,
            Some(ConfirmAction::EnterMigrationQueue {
                id: EntityId::Numeric(1),
                label: "web-01".into(),
                queue: true,
            })
        );
    }

    #[test]
    fn status_bar_shows_connection_and_tabs() {
        let mut app = app();
        assert!(screen_text(&app).contains("○ disconnected: no account configured"));
        app.process_action(&Action::Connected).unwrap();
        let text = screen_text(&app);
        assert!(text.contains("● connected"));
        assert!(text.contains("1 Dashboard"));
        assert!(text.contains("2 Search"));
    }

    #[test]
    fn help_overlay_toggles() {
        let mut app = app();
        press(&mut app, KeyCode::Char('?'));
        assert!(screen_text(&app).contains("Keyboard Shortcuts"));
        press(&mut app, KeyCode::Char('q'));
        assert!(app.running);
        press(&mut app, KeyCode::Esc);
        assert!(!app.help_visible);
    }
}
