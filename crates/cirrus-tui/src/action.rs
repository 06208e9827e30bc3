//! All possible UI actions. Actions are the sole mechanism for state mutation.

use std::fmt;
use std::sync::Arc;

use cirrus_core::{EntityId, NoticeKind, SearchResults, SearchTicket};

use crate::data_bridge::AccountSnapshot;
use crate::screen::ScreenId;

/// Notification severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A toast notification.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Info,
        }
    }
}

/// Server power and migration actions offered on the detail screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerAction {
    Boot,
    Reboot,
    Shutdown,
    Migrate,
}

impl ServerAction {
    /// Everything except boot asks first.
    pub fn needs_confirm(self) -> bool {
        !matches!(self, Self::Boot)
    }

    pub fn verb(self) -> &'static str {
        match self {
            Self::Boot => "Boot",
            Self::Reboot => "Reboot",
            Self::Shutdown => "Shut down",
            Self::Migrate => "Migrate",
        }
    }
}

/// Pending confirmation action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    Server {
        action: ServerAction,
        id: EntityId,
        label: String,
    },
    /// Raised from the migration banner; `queue` is true for scheduled
    /// migrations, which enter the queue immediately.
    EnterMigrationQueue {
        id: EntityId,
        label: String,
        queue: bool,
    },
}

impl fmt::Display for ConfirmAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Server { action, label, .. } => write!(f, "{} {label}?", action.verb()),
            Self::EnterMigrationQueue {
                label, queue: true, ..
            } => write!(f, "Enter the migration queue for {label} now?"),
            Self::EnterMigrationQueue { label, .. } => write!(f, "Migrate {label} now?"),
        }
    }
}

/// Result of a search fetch, tagged with the ticket that started it.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub ticket: SearchTicket,
    pub result: Result<SearchResults, String>,
}

/// Every state transition in the TUI is expressed as an Action.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Navigation ────────────────────────────────────────────────
    SwitchScreen(ScreenId),
    GoBack,
    OpenServer(EntityId),

    // ── Data (from the data bridge) ───────────────────────────────
    AccountUpdated(Arc<AccountSnapshot>),
    Refresh,

    // ── Connection Status ─────────────────────────────────────────
    Connected,
    Disconnected(String),
    Reconnecting,

    // ── Search ────────────────────────────────────────────────────
    OpenSearch,
    SearchSubmit(String),
    /// Run the fetch for a ticket issued by the search session.
    RunSearch(SearchTicket),
    SearchCompleted(Box<SearchOutcome>),

    // ── Commands ──────────────────────────────────────────────────
    RequestServerAction(ServerAction, EntityId),
    MigrationNoticeActivated(NoticeKind, EntityId),
    MarkEventsSeen,

    // ── Confirm Dialog ────────────────────────────────────────────
    ShowConfirm(ConfirmAction),
    ConfirmYes,
    ConfirmNo,

    // ── Help ──────────────────────────────────────────────────────
    ToggleHelp,

    // ── Notifications ─────────────────────────────────────────────
    Notify(Notification),
    DismissNotification,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirm_prompts_name_the_server() {
        let reboot = ConfirmAction::Server {
            action: ServerAction::Reboot,
            id: EntityId::Numeric(1),
            label: "web-01".into(),
        };
        insta::assert_snapshot!(reboot.to_string(), @"Reboot web-01?");

        let queue = ConfirmAction::EnterMigrationQueue {
            id: EntityId::Numeric(1),
            label: "web-01".into(),
            queue: true,
        };
        insta::assert_snapshot!(queue.to_string(), @"Enter the migration queue for web-01 now?");
    }

    #[test]
    fn only_boot_skips_confirmation() {
        assert!(!ServerAction::Boot.needs_confirm());
        assert!(ServerAction::Reboot.needs_confirm());
        assert!(ServerAction::Shutdown.needs_confirm());
        assert!(ServerAction::Migrate.needs_confirm());
    }
}
