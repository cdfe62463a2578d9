// src/core/state.rs

//! Defines the central `ServerState` struct, holding all shared state.

use crate::config::Config;
use crate::core::console::ConsoleSink;
use crate::core::registry::CommandRegistry;
use crate::core::sessions::SessionRegistry;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_util::task::TaskTracker;

/// The capacity of the console-output broadcast channel.
const CONSOLE_OUTPUT_CAPACITY: usize = 128;

/// The central struct holding all shared, server-wide state. Wrapped in an
/// `Arc` and passed explicitly to every connection handler and background
/// task; nothing here is reachable through globals.
pub struct ServerState {
    /// The resolved configuration. Read-only for the lifetime of the server.
    pub config: Config,
    /// The ordered command registry.
    pub registry: Arc<CommandRegistry>,
    /// All currently open sessions.
    pub sessions: SessionRegistry,
    /// The host's console input.
    pub console: Arc<dyn ConsoleSink>,
    /// Fan-in point for host console output destined for every session.
    console_output_tx: broadcast::Sender<String>,
    /// Tracks detached command-handler tasks so shutdown can wait for them.
    pub handler_tasks: TaskTracker,
}

impl ServerState {
    pub fn new(config: Config, console: Arc<dyn ConsoleSink>) -> Arc<Self> {
        let (console_output_tx, _) = broadcast::channel(CONSOLE_OUTPUT_CAPACITY);
        Arc::new(Self {
            config,
            registry: Arc::new(CommandRegistry::new()),
            sessions: SessionRegistry::new(),
            console,
            console_output_tx,
            handler_tasks: TaskTracker::new(),
        })
    }

    /// Publishes one line of host console output to every open session.
    /// Returns the number of listeners the line was queued for.
    pub fn publish_console_output(&self, line: &str) -> usize {
        self.console_output_tx.send(line.to_string()).unwrap_or(0)
    }

    pub fn subscribe_console_output(&self) -> broadcast::Receiver<String> {
        self.console_output_tx.subscribe()
    }
}
