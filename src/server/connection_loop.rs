// src/server/connection_loop.rs

//! Contains the main server loop for accepting connections and handling
//! graceful shutdown.

use super::context::ServerContext;
use crate::connection::{ClientSession, ConnectionHandler};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// How long shutdown waits for in-flight detached command handlers.
const HANDLER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// The main server loop that accepts connections until a shutdown signal is
/// observed on the context's shutdown channel.
pub async fn run(ctx: ServerContext) {
    let mut session_id_counter: u64 = 0;
    let mut client_tasks = JoinSet::new();
    let mut shutdown_rx = ctx.shutdown_tx.subscribe();

    let broadcaster_handle = tokio::spawn(ctx.broadcaster.run(ctx.shutdown_tx.subscribe()));

    loop {
        tokio::select! {
            biased;

            _ = shutdown_rx.recv() => {
                info!("Shutdown signal received, no longer accepting connections.");
                break;
            }

            res = ctx.listener.accept() => {
                match res {
                    Ok((socket, addr)) => {
                        let Ok(permit) = ctx.connection_permits.clone().try_acquire_owned() else {
                            warn!("Connection from {} refused: max_clients reached.", addr);
                            drop(socket);
                            continue;
                        };
                        info!("Accepted new connection from: {}", addr);

                        session_id_counter = session_id_counter.wrapping_add(1);
                        let session_id = session_id_counter;
                        let state = ctx.state.clone();
                        let global_shutdown_rx = ctx.shutdown_tx.subscribe();

                        let (read_half, write_half) = socket.into_split();
                        let (kill_tx, _) = broadcast::channel(1);
                        let session =
                            Arc::new(ClientSession::new(session_id, addr, write_half, kill_tx));

                        client_tasks.spawn(async move {
                            let _permit = permit;
                            let mut handler = ConnectionHandler::new(
                                read_half,
                                session,
                                state,
                                global_shutdown_rx,
                            );
                            if let Err(e) = handler.run().await {
                                warn!("Connection from {} terminated unexpectedly: {}", addr, e);
                            }
                        });
                    }
                    Err(e) => error!("Failed to accept connection: {}", e),
                }
            },

            Some(res) = client_tasks.join_next() => {
                if let Err(e) = res {
                    if e.is_panic() {
                        error!("A client handler panicked: {e:?}");
                    }
                }
            },
        }
    }

    // Force every open session's transport closed so a read blocked on a
    // silent peer unwinds; the shutdown broadcast above already woke the
    // select loops.
    for session in ctx.state.sessions.snapshot() {
        session.shutdown_transport().await;
    }
    client_tasks.shutdown().await;
    info!("All client connections closed.");

    let _ = broadcaster_handle.await;

    // Detached command handlers are tracked, not leaked: give them a bounded
    // window to finish.
    ctx.state.handler_tasks.close();
    if tokio::time::timeout(HANDLER_DRAIN_TIMEOUT, ctx.state.handler_tasks.wait())
        .await
        .is_err()
    {
        warn!("Timed out waiting for in-flight command handlers to finish.");
    }
    info!("Server shutdown complete.");
}
