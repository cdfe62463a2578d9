// src/config.rs

//! Manages server configuration: loading, first-run generation, and validation.

use anyhow::{Context, Result, anyhow};
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// The length of a generated RCON password.
const GENERATED_PASSWORD_LEN: usize = 16;

/// A raw representation of the config file before validation and resolution.
#[derive(Deserialize)]
struct RawConfig {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
    password: Option<String>,
    #[serde(default)]
    use_whitelist: bool,
    #[serde(default)]
    whitelisted_ips: Vec<String>,
    #[serde(default = "default_log_level")]
    log_level: String,
    #[serde(default = "default_max_clients")]
    max_clients: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    25575
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_max_clients() -> usize {
    64
}

/// Represents the final, validated, and resolved server configuration.
/// Read-only for the lifetime of the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// The shared secret clients present via `/auth`.
    pub password: String,
    /// When true, only peers whose IP appears in `whitelisted_ips` may connect.
    pub use_whitelist: bool,
    pub whitelisted_ips: Vec<String>,
    pub log_level: String,
    pub max_clients: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            password: generate_password(),
            use_whitelist: false,
            whitelisted_ips: Vec::new(),
            log_level: default_log_level(),
            max_clients: default_max_clients(),
        }
    }
}

impl Config {
    /// Creates a new `Config` instance by reading and parsing a TOML file.
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at '{path}'"))?;
        let raw: RawConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse TOML from '{path}'"))?;

        let password = match raw.password {
            Some(p) => p,
            None => {
                let generated = generate_password();
                info!(
                    "No password set in '{path}'. Use the password {generated} to authenticate."
                );
                generated
            }
        };

        let config = Config {
            host: raw.host,
            port: raw.port,
            password,
            use_whitelist: raw.use_whitelist,
            whitelisted_ips: raw.whitelisted_ips,
            log_level: raw.log_level,
            max_clients: raw.max_clients,
        };

        config.validate()?;
        Ok(config)
    }

    /// Loads the config from `path`, generating and persisting a fresh one
    /// (including a random password) when the file does not exist yet.
    pub fn load_or_generate(path: &str) -> Result<Self> {
        if Path::new(path).is_file() {
            return Self::from_file(path);
        }

        let config = Config::default();
        let serialized =
            toml::to_string_pretty(&config).context("Failed to serialize generated config")?;
        fs::write(path, serialized)
            .with_context(|| format!("Failed to write generated config to '{path}'"))?;
        info!(
            "Generated new config at '{path}'. Use the password {} to authenticate.",
            config.password
        );
        Ok(config)
    }

    /// Validates the resolved configuration to ensure logical consistency.
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(anyhow!("port cannot be 0"));
        }
        if self.host.trim().is_empty() {
            return Err(anyhow!("host cannot be empty"));
        }
        if self.max_clients == 0 {
            return Err(anyhow!("max_clients cannot be 0"));
        }
        if self.password.is_empty() {
            return Err(anyhow!("password cannot be empty"));
        }
        if self.use_whitelist && self.whitelisted_ips.is_empty() {
            warn!(
                "use_whitelist is enabled but whitelisted_ips is empty; every connection will be rejected."
            );
        }
        Ok(())
    }
}

/// Generates a random alphanumeric RCON password.
fn generate_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_PASSWORD_LEN)
        .map(char::from)
        .collect()
}
