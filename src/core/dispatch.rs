// src/core/dispatch.rs

//! The central component for routing one line of client input.

use crate::connection::ClientSession;
use crate::core::registry::Invocation;
use crate::core::state::ServerState;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Routes a line of input to its destination: a registered command handler,
/// the host console, or nowhere.
pub struct Dispatcher {
    state: Arc<ServerState>,
}

impl Dispatcher {
    pub fn new(state: Arc<ServerState>) -> Self {
        Self { state }
    }

    /// Matches `line` against the registry in registration order and acts on
    /// the first eligible match. Matched handlers run as detached tasks; this
    /// method only decides, it never waits on a handler or observes its
    /// result.
    pub async fn dispatch(&self, line: &str, session: &Arc<ClientSession>) {
        for definition in self.state.registry.snapshot() {
            let Some(captures) = definition.match_at_start(line) else {
                continue;
            };

            if definition.requires_auth && !session.is_authenticated() {
                // An unauthorized match does not stop the scan: a later open
                // command sharing the prefix may still claim the line.
                trace!(
                    "Session {}: unauthorized match on '{}', continuing scan.",
                    session.id(),
                    definition.name
                );
                continue;
            }

            debug!(
                "Session {}: dispatching line to command '{}'.",
                session.id(),
                definition.name
            );
            let handler = definition.handler.clone();
            let invocation = Invocation {
                captures,
                session: session.clone(),
            };
            self.state.handler_tasks.spawn(async move {
                handler.handle(invocation).await;
            });
            return;
        }

        if session.is_authenticated() {
            debug!(
                "Session {}: forwarding unmatched line to host console.",
                session.id()
            );
            if let Err(e) = self.state.console.submit(line).await {
                warn!(
                    "Failed to forward line from {} to the host console: {}",
                    session.addr(),
                    e
                );
            }
        } else {
            trace!(
                "Session {}: dropping unmatched line from unauthenticated client.",
                session.id()
            );
        }
    }
}
