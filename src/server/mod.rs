// src/server/mod.rs

use crate::config::Config;
use crate::core::console::ConsoleSink;
use crate::core::state::ServerState;
use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

mod connection_loop;
mod context;
mod initialization;

pub use context::ServerContext;

/// A running server instance. This is the embedding surface: the host process
/// keeps the handle, publishes console output through `state()`, and calls
/// `shutdown()` to disable the subsystem.
pub struct ServerHandle {
    state: Arc<ServerState>,
    addr: SocketAddr,
    shutdown_tx: broadcast::Sender<()>,
    join: JoinHandle<()>,
}

impl ServerHandle {
    /// The shared server state: session registry, command registry, and the
    /// console-output publish point.
    pub fn state(&self) -> &Arc<ServerState> {
        &self.state
    }

    /// The address the listener is actually bound to (useful when the
    /// configured port is 0).
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stops accepting, forces every open session's transport closed, and
    /// waits for the accept loop to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        let _ = self.join.await;
    }
}

/// Starts the subsystem: initializes all components, spawns the accept loop
/// in the background, and returns a handle to the running server.
pub async fn start(config: Config, console: Arc<dyn ConsoleSink>) -> Result<ServerHandle> {
    let ctx = initialization::setup(config, console).await?;
    let addr = ctx.local_addr()?;
    let state = ctx.state.clone();
    let shutdown_tx = ctx.shutdown_tx.clone();
    let join = tokio::spawn(connection_loop::run(ctx));
    Ok(ServerHandle {
        state,
        addr,
        shutdown_tx,
        join,
    })
}
