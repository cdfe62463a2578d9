// src/core/console.rs

//! The boundary to the host process's console input.

use crate::core::RconError;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// The host's console input. Unmatched lines from authenticated sessions are
/// forwarded here verbatim. Injected into the dispatcher, never reached
/// through globals.
#[async_trait]
pub trait ConsoleSink: Send + Sync {
    async fn submit(&self, line: &str) -> Result<(), RconError>;
}

/// A sink backed by an mpsc channel, for hosts that pump console commands
/// from their own loop. Tests use it as the console double.
pub struct ChannelConsole {
    tx: mpsc::Sender<String>,
}

impl ChannelConsole {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

#[async_trait]
impl ConsoleSink for ChannelConsole {
    async fn submit(&self, line: &str) -> Result<(), RconError> {
        self.tx
            .send(line.to_string())
            .await
            .map_err(|_| RconError::ConsoleClosed)
    }
}

/// Prints forwarded commands to stdout; used by the standalone binary.
#[derive(Debug, Default)]
pub struct StdoutConsole;

#[async_trait]
impl ConsoleSink for StdoutConsole {
    async fn submit(&self, line: &str) -> Result<(), RconError> {
        println!("{line}");
        Ok(())
    }
}
