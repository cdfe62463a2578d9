// src/main.rs

//! The standalone rcond binary: runs the RCON server with stdout as the host
//! console sink and stdin as the host console-output feed, so a terminal
//! operator can exercise forwarding and broadcast end to end.

use anyhow::Result;
use rcond::config::Config;
use rcond::core::console::StdoutConsole;
use rcond::server;
use std::env;
use std::sync::Arc;
use tokio::io::AsyncBufReadExt;
use tokio::signal::unix::{SignalKind, signal};
use tracing::info;
use tracing_subscriber::{filter::EnvFilter, prelude::*, reload};

#[tokio::main]
async fn main() -> Result<()> {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    let args: Vec<String> = env::args().collect();

    if args.contains(&"--version".to_string()) {
        println!("rcond version {VERSION}");
        return Ok(());
    }

    let config_path = args
        .iter()
        .position(|arg| arg == "--config")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
        .unwrap_or("rcond.toml");

    // Logging comes up before the config is loaded so that a generated
    // password is visible; the filter is reloaded with the configured level
    // afterwards unless RUST_LOG already pinned one.
    let env_log_level = std::env::var("RUST_LOG").ok();
    let initial_log_level = env_log_level.clone().unwrap_or_else(|| "info".to_string());
    let (filter, reload_handle) = reload::Layer::new(EnvFilter::new(initial_log_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact() // Use the compact, single-line format.
                .with_ansi(true),
        )
        .init();

    let mut config = match Config::load_or_generate(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration from \"{config_path}\": {e}");
            std::process::exit(1);
        }
    };

    // Override port if provided as a command-line argument.
    if let Some(port_index) = args.iter().position(|arg| arg == "--port") {
        if let Some(port_str) = args.get(port_index + 1) {
            match port_str.parse::<u16>() {
                Ok(port) => config.port = port,
                Err(_) => {
                    eprintln!("Invalid port number: {port_str}");
                    std::process::exit(1);
                }
            }
        } else {
            eprintln!("--port flag requires a value");
            std::process::exit(1);
        }
    }

    if env_log_level.is_none() && config.log_level != "info" {
        let _ = reload_handle.reload(EnvFilter::new(&config.log_level));
    }

    let handle = server::start(config, Arc::new(StdoutConsole)).await?;
    info!("rcond {VERSION} ready on {}", handle.addr());

    // Lines typed on stdin become host console output, broadcast to every
    // connected session.
    let state = handle.state().clone();
    let stdin_task = tokio::spawn(async move {
        let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            state.publish_console_output(&line);
        }
    });

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        _ = sigint.recv() => info!("SIGINT received, initiating graceful shutdown."),
        _ = sigterm.recv() => info!("SIGTERM received, initiating graceful shutdown."),
    }

    stdin_task.abort();
    handle.shutdown().await;
    Ok(())
}
