// src/server/context.rs

use crate::core::broadcaster::Broadcaster;
use crate::core::state::ServerState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{Semaphore, broadcast};

/// Holds all the initialized state required to run the server's main loop.
pub struct ServerContext {
    pub state: Arc<ServerState>,
    pub listener: TcpListener,
    pub shutdown_tx: broadcast::Sender<()>,
    pub connection_permits: Arc<Semaphore>,
    /// Subscribed to console output at setup time, so lines published before
    /// the loop task is first polled are still delivered.
    pub(crate) broadcaster: Broadcaster,
}

impl ServerContext {
    /// The address the listener is actually bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}
