// src/core/mod.rs

//! The central module containing the core logic of the RCON subsystem.

pub mod broadcaster;
pub mod builtins;
pub mod console;
pub mod dispatch;
pub mod errors;
pub mod registry;
pub mod sessions;
pub mod state;

pub use errors::RconError;
