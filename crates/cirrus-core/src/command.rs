// ── Command API ──
//
// All write operations flow through a unified `Command` enum. The
// controller routes each variant to the matching API call and refreshes
// the affected collections afterwards.

use crate::error::CoreError;
use crate::model::EntityId;
use crate::store::Collection;

/// A command envelope sent through the command channel.
/// Contains the command and a oneshot response channel.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub response_tx: tokio::sync::oneshot::Sender<Result<CommandResult, CoreError>>,
}

/// All possible write operations against the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // ── Server power ─────────────────────────────────────────────────
    BootServer { id: EntityId },
    RebootServer { id: EntityId },
    ShutdownServer { id: EntityId },

    // ── Migration ────────────────────────────────────────────────────
    /// Enter the migration queue now (what a migration banner triggers).
    MigrateServer { id: EntityId },

    // ── Account ──────────────────────────────────────────────────────
    /// Mark the event log as read up to and including `id`.
    MarkEventSeen { id: u64 },
}

impl Command {
    /// Short verb for logs and confirmations.
    pub fn verb(&self) -> &'static str {
        match self {
            Self::BootServer { .. } => "boot",
            Self::RebootServer { .. } => "reboot",
            Self::ShutdownServer { .. } => "shut down",
            Self::MigrateServer { .. } => "migrate",
            Self::MarkEventSeen { .. } => "mark seen",
        }
    }

    /// Whether a confirmation prompt should guard this command.
    pub fn is_destructive(&self) -> bool {
        matches!(
            self,
            Self::RebootServer { .. } | Self::ShutdownServer { .. } | Self::MigrateServer { .. }
        )
    }

    /// Collections whose contents change once the command is accepted.
    pub fn affects(&self) -> &'static [Collection] {
        match self {
            Self::BootServer { .. }
            | Self::RebootServer { .. }
            | Self::ShutdownServer { .. }
            | Self::MigrateServer { .. } => &[
                Collection::Servers,
                Collection::Events,
                Collection::Notices,
            ],
            Self::MarkEventSeen { .. } => &[Collection::Events],
        }
    }
}

/// Outcome of an accepted command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// The API accepted the request; the operation runs asynchronously and
    /// shows up in the event log.
    Accepted,
    Ok,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destructive_commands_need_confirmation() {
        let id = EntityId::Numeric(1);
        assert!(!Command::BootServer { id: id.clone() }.is_destructive());
        assert!(Command::ShutdownServer { id: id.clone() }.is_destructive());
        assert!(Command::MigrateServer { id }.is_destructive());
        assert!(!Command::MarkEventSeen { id: 5 }.is_destructive());
    }

    #[test]
    fn seen_touches_only_events() {
        assert_eq!(
            Command::MarkEventSeen { id: 5 }.affects(),
            &[Collection::Events]
        );
    }
}
