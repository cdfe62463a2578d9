// src/core/broadcaster.rs

//! Fans host console output out to every open session.

use crate::core::state::ServerState;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

/// Receives host console-output events and delivers each line to every
/// session in the registry. A failed write tears down only the session it
/// failed on (see `ClientSession::writeline`) and never reaches the event
/// producer.
pub struct Broadcaster {
    state: Arc<ServerState>,
    output_rx: broadcast::Receiver<String>,
}

impl Broadcaster {
    /// Subscribes to the console-output channel immediately, so no line
    /// published after construction can be missed.
    pub fn new(state: Arc<ServerState>) -> Self {
        let output_rx = state.subscribe_console_output();
        Self { state, output_rx }
    }

    pub async fn run(mut self, mut shutdown_rx: broadcast::Receiver<()>) {
        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => {
                    debug!("Broadcaster received shutdown signal.");
                    break;
                }
                result = self.output_rx.recv() => match result {
                    Ok(line) => self.deliver(&line).await,
                    Err(RecvError::Lagged(missed)) => {
                        warn!("Broadcaster lagged behind console output; {missed} lines dropped.");
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }
    }

    /// Delivers one line to a stable snapshot of the registry. Sessions that
    /// fail the write are closed by `writeline` itself; delivery to the rest
    /// continues regardless.
    async fn deliver(&self, line: &str) {
        for session in self.state.sessions.snapshot() {
            session.writeline(line).await;
        }
    }
}
