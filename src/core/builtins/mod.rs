// src/core/builtins/mod.rs

//! The built-in commands every server instance carries.

mod auth;
mod help;

pub use auth::{AUTH_FAIL_LINE, AUTH_OK_LINE, AuthHandler};
pub use help::HelpHandler;

use crate::core::RconError;
use crate::core::state::ServerState;
use std::sync::Arc;

/// Registers the built-in commands. Called once during setup, before the
/// listener accepts its first connection.
pub fn register_builtins(state: &Arc<ServerState>) -> Result<(), RconError> {
    state.registry.register(
        "auth",
        r"/auth (\S+)",
        "Authenticates the client using the configured RCON password",
        Arc::new(AuthHandler::new(state.config.password.clone())),
        false,
    )?;
    state.registry.register(
        "help",
        r"/help",
        "Lists all registered commands",
        Arc::new(HelpHandler::new(&state.registry)),
        true,
    )?;
    Ok(())
}
