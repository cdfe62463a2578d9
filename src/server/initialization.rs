// src/server/initialization.rs

//! Handles the server initialization process: state setup, built-in command
//! registration, and binding the listener.

use super::context::ServerContext;
use crate::config::Config;
use crate::core::broadcaster::Broadcaster;
use crate::core::builtins;
use crate::core::console::ConsoleSink;
use crate::core::state::ServerState;
use anyhow::Result;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{Semaphore, broadcast};
use tracing::info;

/// Initializes all server components before starting the accept loop.
pub async fn setup(config: Config, console: Arc<dyn ConsoleSink>) -> Result<ServerContext> {
    let (shutdown_tx, _) = broadcast::channel(1);

    let state = ServerState::new(config, console);
    builtins::register_builtins(&state)?;
    info!(
        "Server state initialized with {} built-in commands.",
        state.registry.len()
    );

    let broadcaster = Broadcaster::new(state.clone());

    // Tokio sets SO_REUSEADDR on bind, so a restart can take the port back
    // immediately.
    let listener = TcpListener::bind((state.config.host.as_str(), state.config.port)).await?;
    info!("RCON server listening on {}", listener.local_addr()?);
    let connection_permits = Arc::new(Semaphore::new(state.config.max_clients));

    Ok(ServerContext {
        state,
        listener,
        shutdown_tx,
        connection_permits,
        broadcaster,
    })
}
