// src/connection/handler.rs

//! Defines the `ConnectionHandler` which manages the full lifecycle of a
//! client connection.

use super::guard::ConnectionGuard;
use super::session::ClientSession;
use crate::core::RconError;
use crate::core::dispatch::Dispatcher;
use crate::core::errors::is_normal_disconnect;
use crate::core::state::ServerState;
use futures::StreamExt;
use std::sync::Arc;
use tokio::net::tcp::OwnedReadHalf;
use tokio::sync::broadcast;
use tokio_util::codec::{FramedRead, LinesCodec};
use tracing::{debug, info, warn};

/// Reply sent to peers rejected by the IP whitelist.
const WHITELIST_REJECT_LINE: &str = "ERROR: Not on whitelist";

/// Upper bound on one line of client input.
const MAX_LINE_LENGTH: usize = 8 * 1024;

/// Manages the full lifecycle of one client connection: the whitelist gate,
/// session registration, and the line read loop.
pub struct ConnectionHandler {
    reader: FramedRead<OwnedReadHalf, LinesCodec>,
    session: Arc<ClientSession>,
    state: Arc<ServerState>,
    kill_rx: broadcast::Receiver<()>,
    global_shutdown_rx: broadcast::Receiver<()>,
}

impl ConnectionHandler {
    pub fn new(
        read_half: OwnedReadHalf,
        session: Arc<ClientSession>,
        state: Arc<ServerState>,
        global_shutdown_rx: broadcast::Receiver<()>,
    ) -> Self {
        let kill_rx = session.subscribe_kill();
        Self {
            reader: FramedRead::new(read_half, LinesCodec::new_with_max_length(MAX_LINE_LENGTH)),
            session,
            state,
            kill_rx,
            global_shutdown_rx,
        }
    }

    /// The main event loop for the connection: the whitelist gate, then one
    /// line at a time to the dispatcher until the peer disconnects or a
    /// shutdown signal arrives.
    pub async fn run(&mut self) -> Result<(), RconError> {
        if !self.check_whitelist().await {
            return Ok(());
        }

        self.state.sessions.insert(self.session.clone());
        let _guard = ConnectionGuard::new(
            self.state.clone(),
            self.session.id(),
            self.session.addr(),
        );
        let dispatcher = Dispatcher::new(self.state.clone());

        loop {
            tokio::select! {
                // Prioritize shutdown signals over pending input.
                biased;
                _ = self.global_shutdown_rx.recv() => {
                    info!(
                        "Connection handler for {} received shutdown signal.",
                        self.session.addr()
                    );
                    break;
                }
                _ = self.kill_rx.recv() => {
                    debug!(
                        "Connection handler for {} received kill signal.",
                        self.session.addr()
                    );
                    break;
                }
                result = self.reader.next() => {
                    match result {
                        Some(Ok(line)) => {
                            let line = line.trim();
                            if line.is_empty() {
                                continue;
                            }
                            // Deciding where the line goes is synchronous;
                            // any matched handler runs detached.
                            dispatcher.dispatch(line, &self.session).await;
                        }
                        Some(Err(e)) => {
                            let e = RconError::from(e);
                            if is_normal_disconnect(&e) {
                                debug!(
                                    "Connection from {} closed by peer: {}",
                                    self.session.addr(), e
                                );
                            } else {
                                warn!("Connection error for {}: {}", self.session.addr(), e);
                            }
                            break;
                        }
                        None => {
                            debug!("Connection from {} closed by peer.", self.session.addr());
                            break;
                        }
                    }
                }
            }
        }

        self.session.shutdown_transport().await;
        Ok(())
    }

    /// Applies the IP whitelist gate. Returns false when the peer was
    /// rejected; the rejection line is the only thing such a peer ever
    /// receives, and none of its input is processed.
    async fn check_whitelist(&self) -> bool {
        let config = &self.state.config;
        if !config.use_whitelist {
            return true;
        }
        let peer_ip = self.session.addr().ip().to_string();
        if config.whitelisted_ips.iter().any(|ip| *ip == peer_ip) {
            return true;
        }
        info!(
            "Rejected connection from non-whitelisted address {}.",
            self.session.addr()
        );
        self.session.writeline(WHITELIST_REJECT_LINE).await;
        self.session.shutdown_transport().await;
        false
    }
}
