// src/connection/guard.rs

//! Defines `ConnectionGuard`, an RAII guard for session deregistration.

use crate::core::state::ServerState;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::debug;

/// An RAII guard to ensure a session is always removed from the registry when
/// its connection handler's scope is exited, whatever the exit path.
pub struct ConnectionGuard {
    state: Arc<ServerState>,
    session_id: u64,
    addr: SocketAddr,
}

impl ConnectionGuard {
    pub(crate) fn new(state: Arc<ServerState>, session_id: u64, addr: SocketAddr) -> Self {
        Self {
            state,
            session_id,
            addr,
        }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        if self.state.sessions.remove(self.session_id).is_some() {
            debug!(
                "ConnectionGuard dropping, session {} ({}) deregistered.",
                self.session_id, self.addr
            );
        }
    }
}
