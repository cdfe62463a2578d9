// src/core/builtins/auth.rs

use crate::core::registry::{CommandHandler, Invocation};
use async_trait::async_trait;
use tracing::{debug, info};

/// Reply for a successful `/auth`.
pub const AUTH_OK_LINE: &str = "AUTH: Client authenticated successfully";
/// Reply for a failed `/auth`.
pub const AUTH_FAIL_LINE: &str = "AUTH: Invalid RCON password";

/// Handles `/auth <token>`: a byte-for-byte comparison against the configured
/// password. A mismatch explicitly revokes any prior authentication. There is
/// no attempt counter, lockout, or timing-safe comparison; brute-force
/// protection is out of scope for this subsystem.
pub struct AuthHandler {
    password: String,
}

impl AuthHandler {
    pub fn new(password: String) -> Self {
        Self { password }
    }
}

#[async_trait]
impl CommandHandler for AuthHandler {
    async fn handle(&self, invocation: Invocation) {
        let session = &invocation.session;
        let token = invocation
            .captures
            .first()
            .map(String::as_str)
            .unwrap_or_default();

        if token == self.password {
            session.set_authenticated(true);
            info!("Session {} ({}) authenticated.", session.id(), session.addr());
            session.writeline(AUTH_OK_LINE).await;
        } else {
            session.set_authenticated(false);
            debug!(
                "Session {} ({}) presented an invalid password.",
                session.id(),
                session.addr()
            );
            session.writeline(AUTH_FAIL_LINE).await;
        }
    }
}
