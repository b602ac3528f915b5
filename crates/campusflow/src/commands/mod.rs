//! Command handlers, one module per top-level subcommand.

pub mod activity;
pub mod alerts;
pub mod config_cmd;
pub mod dashboard;
pub mod entities;
pub mod security;
pub mod spaceflow;

use campusflow_core::Controller;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a parsed command to its handler.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Dashboard(args) => dashboard::handle(controller, args, global).await,
        Command::Entities(args) => entities::handle(controller, args, global).await,
        Command::Security(args) => security::handle(controller, args, global).await,
        Command::Alerts(args) => alerts::handle(controller, args, global).await,
        Command::Spaceflow(args) => spaceflow::handle(controller, args, global).await,
        Command::Activity(args) => activity::handle(controller, args, global).await,
        Command::Health => dashboard::handle_health(controller, global).await,
        // Handled before a controller is built
        Command::Config(_) => unreachable!("config commands are dispatched in main"),
    }
}
