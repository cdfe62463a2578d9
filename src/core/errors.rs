// src/core/errors.rs

//! Defines the primary error type for the subsystem.

use std::sync::Arc;
use thiserror::Error;
use tokio_util::codec::LinesCodecError;

/// The main error enum, representing all possible failures within the server.
/// Using `thiserror` allows for clean error definitions and automatic `From`
/// trait implementations.
#[derive(Error, Debug, Clone)]
pub enum RconError {
    #[error("IO Error: {0}")]
    Io(Arc<std::io::Error>),

    #[error("Line exceeds the maximum allowed length")]
    LineTooLong,

    #[error("Host console sink is closed")]
    ConsoleClosed,

    #[error("Invalid pattern for command '{name}': {source}")]
    Pattern { name: String, source: regex::Error },

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for RconError {
    fn from(e: std::io::Error) -> Self {
        RconError::Io(Arc::new(e))
    }
}

impl From<LinesCodecError> for RconError {
    fn from(e: LinesCodecError) -> Self {
        match e {
            LinesCodecError::MaxLineLengthExceeded => RconError::LineTooLong,
            LinesCodecError::Io(io) => RconError::Io(Arc::new(io)),
        }
    }
}

/// Helper function to check for non-critical disconnection errors.
pub fn is_normal_disconnect(e: &RconError) -> bool {
    matches!(e, RconError::Io(arc_err) if matches!(
        arc_err.kind(),
        std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::BrokenPipe
            | std::io::ErrorKind::UnexpectedEof
            | std::io::ErrorKind::ConnectionAborted
    ))
}
