// src/connection/session.rs

//! Defines the state associated with a single client session.

use futures::SinkExt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::{Mutex, broadcast};
use tokio_util::codec::{FramedWrite, LinesCodec};
use tracing::debug;

/// Lifecycle of a client connection. `Closed` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Connecting,
    Open,
    Closed,
}

/// Per-connection state: peer address, authentication flag, and the write
/// half of the transport. The read half stays with the `ConnectionHandler`;
/// the write half lives here so the broadcaster and command handlers can
/// reach it through the session registry.
pub struct ClientSession {
    session_id: u64,
    addr: SocketAddr,
    /// Mutated only by the auth handler. Never shared across sessions.
    authenticated: AtomicBool,
    phase: parking_lot::Mutex<SessionPhase>,
    writer: Mutex<FramedWrite<OwnedWriteHalf, LinesCodec>>,
    /// Signals this session's read loop to terminate.
    kill_tx: broadcast::Sender<()>,
}

impl ClientSession {
    pub(crate) fn new(
        session_id: u64,
        addr: SocketAddr,
        write_half: OwnedWriteHalf,
        kill_tx: broadcast::Sender<()>,
    ) -> Self {
        Self {
            session_id,
            addr,
            authenticated: AtomicBool::new(false),
            phase: parking_lot::Mutex::new(SessionPhase::Connecting),
            writer: Mutex::new(FramedWrite::new(write_half, LinesCodec::new())),
            kill_tx,
        }
    }

    pub fn id(&self) -> u64 {
        self.session_id
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    pub fn set_authenticated(&self, value: bool) {
        self.authenticated.store(value, Ordering::SeqCst);
    }

    pub fn phase(&self) -> SessionPhase {
        *self.phase.lock()
    }

    pub(crate) fn set_phase(&self, phase: SessionPhase) {
        *self.phase.lock() = phase;
    }

    pub(crate) fn subscribe_kill(&self) -> broadcast::Receiver<()> {
        self.kill_tx.subscribe()
    }

    /// Writes one newline-terminated line to the peer.
    ///
    /// A failed write is treated like a read failure: the session is
    /// signalled to close and deregister. The error itself never reaches the
    /// caller; the return value only reports whether the write succeeded.
    pub async fn writeline(&self, text: &str) -> bool {
        let mut writer = self.writer.lock().await;
        match writer.send(text).await {
            Ok(()) => true,
            Err(e) => {
                debug!(
                    "Write to session {} ({}) failed: {}. Closing session.",
                    self.session_id, self.addr, e
                );
                let _ = self.kill_tx.send(());
                false
            }
        }
    }

    /// Forcibly shuts the transport down. The peer observes EOF; any error
    /// here means the socket is already gone.
    pub(crate) async fn shutdown_transport(&self) {
        let mut writer = self.writer.lock().await;
        let _ = writer.get_mut().shutdown().await;
    }
}
