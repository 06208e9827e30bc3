//! Command dispatch: bridges CLI args -> core queries and Commands ->
//! output formatting.

pub mod config_cmd;
pub mod dashboard;
pub mod events;
pub mod resources;
pub mod search;
pub mod servers;
pub mod util;

use cirrus_core::{Controller, CoreError};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch an API-bound command to the appropriate handler.
///
/// `connected` is the outcome of loading the account; search reports a
/// failed load itself, every other command stops on it.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    connected: Result<(), CoreError>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if let Command::Search(args) = cmd {
        return search::handle(controller, args, connected, global).await;
    }
    connected?;

    match cmd {
        Command::Dashboard => dashboard::handle(controller, global),
        Command::Servers(args) => servers::handle(controller, args, global).await,
        Command::Volumes(args) => resources::volumes(controller, args, global),
        Command::Domains(args) => resources::domains(controller, args, global),
        Command::LoadBalancers(args) => resources::load_balancers(controller, args, global),
        Command::Images(args) => resources::images(controller, args, global),
        Command::Events(args) => events::handle(controller, args, global).await,
        // Search returned above; Config and Completions are handled before dispatch
        Command::Search(_) | Command::Config(_) | Command::Completions(_) => {
            Err(CliError::Validation {
                field: "command".into(),
                reason: "handled without an API connection".into(),
            })
        }
    }
}
