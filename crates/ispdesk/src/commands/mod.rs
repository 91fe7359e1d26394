//! Command dispatch: bridges CLI args -> core Commands -> output formatting.

pub mod clients;
pub mod config_cmd;
pub mod contracts;
pub mod installations;
pub mod plans;
pub mod routers;
pub mod util;

use ispdesk_core::Controller;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a store-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Routers(args) => routers::handle(controller, args, global).await,
        Command::Plans(args) => plans::handle(controller, args, global).await,
        Command::Clients(args) => clients::handle(controller, args, global).await,
        Command::Installations(args) => installations::handle(controller, args, global).await,
        Command::Contracts(args) => contracts::handle(controller, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
