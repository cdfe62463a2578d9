// tests/integration/test_helpers.rs

//! Test helpers and utilities for integration tests

use async_trait::async_trait;
use rcond::config::Config;
use rcond::core::console::ChannelConsole;
use rcond::core::registry::{CommandHandler, Invocation};
use rcond::server::{self, ServerHandle};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::mpsc;
use tokio::time::timeout;

pub const TEST_PASSWORD: &str = "unit-test-secret";

/// Generous upper bound for a reply that is expected to arrive.
const IO_TIMEOUT: Duration = Duration::from_secs(5);
/// Window used to assert that something does *not* arrive.
pub const SILENCE_WINDOW: Duration = Duration::from_millis(200);

/// A complete test environment: a running server on an ephemeral port and
/// the receiving end of the host-console double.
pub struct TestContext {
    pub handle: ServerHandle,
    pub console_rx: mpsc::Receiver<String>,
}

pub fn base_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        password: TEST_PASSWORD.to_string(),
        use_whitelist: false,
        whitelisted_ips: Vec::new(),
        log_level: "warn".to_string(),
        max_clients: 16,
    }
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_config(base_config()).await
    }

    pub async fn with_config(config: Config) -> Self {
        let (console, console_rx) = ChannelConsole::new(64);
        let handle = server::start(config, Arc::new(console))
            .await
            .expect("Failed to start test server");
        Self { handle, console_rx }
    }

    pub fn addr(&self) -> SocketAddr {
        self.handle.addr()
    }

    pub async fn connect(&self) -> TestClient {
        let stream = TcpStream::connect(self.addr())
            .await
            .expect("Failed to connect to test server");
        stream.set_nodelay(true).ok();
        let (read_half, write_half) = stream.into_split();
        TestClient {
            reader: BufReader::new(read_half),
            writer: write_half,
        }
    }

    /// The next line forwarded to the host console.
    pub async fn expect_console_line(&mut self) -> String {
        timeout(IO_TIMEOUT, self.console_rx.recv())
            .await
            .expect("Timed out waiting for a forwarded console command")
            .expect("Console channel closed")
    }

    /// Asserts that nothing reaches the host console within the silence
    /// window.
    pub async fn expect_no_console_line(&mut self) {
        if let Ok(Some(line)) = timeout(SILENCE_WINDOW, self.console_rx.recv()).await {
            panic!("Unexpected line forwarded to the host console: {line:?}");
        }
    }

    /// Polls until exactly `count` sessions are registered.
    pub async fn wait_for_session_count(&self, count: usize) {
        let deadline = tokio::time::Instant::now() + IO_TIMEOUT;
        loop {
            if self.handle.state().sessions.len() == count {
                return;
            }
            if tokio::time::Instant::now() > deadline {
                panic!(
                    "Timed out waiting for {count} sessions; registry holds {}",
                    self.handle.state().sessions.len()
                );
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    pub async fn shutdown(self) {
        self.handle.shutdown().await;
    }
}

/// One TCP client speaking the newline protocol.
pub struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl TestClient {
    pub async fn send_line(&mut self, line: &str) {
        self.writer
            .write_all(line.as_bytes())
            .await
            .expect("Failed to write to server");
        self.writer
            .write_all(b"\n")
            .await
            .expect("Failed to write terminator");
    }

    pub async fn read_line(&mut self) -> String {
        let mut line = String::new();
        let n = timeout(IO_TIMEOUT, self.reader.read_line(&mut line))
            .await
            .expect("Timed out waiting for a line from the server")
            .expect("Read error");
        assert!(n > 0, "Connection closed while expecting a line");
        line.trim_end_matches(['\r', '\n']).to_string()
    }

    /// Authenticates and returns the server's reply line.
    pub async fn auth(&mut self, password: &str) -> String {
        self.send_line(&format!("/auth {password}")).await;
        self.read_line().await
    }

    /// Asserts that the server sends nothing within the silence window.
    pub async fn expect_silence(&mut self) {
        let mut buf = [0u8; 1];
        match timeout(SILENCE_WINDOW, self.reader.read(&mut buf)).await {
            Err(_) => {}
            Ok(Ok(0)) => panic!("Connection closed while expecting silence"),
            Ok(Ok(_)) => panic!("Unexpected byte received while expecting silence"),
            Ok(Err(e)) => panic!("Read error while expecting silence: {e}"),
        }
    }

    /// Asserts that the server closes the connection. A reset counts as
    /// closed: the server may drop the socket with unread client bytes still
    /// buffered, which surfaces as RST rather than a clean FIN.
    pub async fn expect_closed(&mut self) {
        let mut buf = [0u8; 64];
        loop {
            let result = timeout(IO_TIMEOUT, self.reader.read(&mut buf))
                .await
                .expect("Timed out waiting for the server to close the connection");
            match result {
                Ok(0) => return,
                Ok(_) => continue,
                Err(e) if e.kind() == std::io::ErrorKind::ConnectionReset => return,
                Err(e) => panic!("Read error while waiting for close: {e}"),
            }
        }
    }
}

/// A command handler that records every invocation on an mpsc channel as
/// `tag:capture1,capture2,...`.
pub struct RecordingHandler {
    pub tag: &'static str,
    pub tx: mpsc::Sender<String>,
}

#[async_trait]
impl CommandHandler for RecordingHandler {
    async fn handle(&self, invocation: Invocation) {
        let _ = self
            .tx
            .send(format!("{}:{}", self.tag, invocation.captures.join(",")))
            .await;
    }
}
