// src/core/builtins/help.rs

use crate::core::registry::{CommandHandler, CommandRegistry, Invocation};
use async_trait::async_trait;
use std::sync::{Arc, Weak};

/// Handles `/help`: writes every registered command back to the session as
/// `name - description`, one line each, in priority order.
///
/// Holds a `Weak` reference to the registry because the registry also owns
/// this handler.
pub struct HelpHandler {
    registry: Weak<CommandRegistry>,
}

impl HelpHandler {
    pub fn new(registry: &Arc<CommandRegistry>) -> Self {
        Self {
            registry: Arc::downgrade(registry),
        }
    }
}

#[async_trait]
impl CommandHandler for HelpHandler {
    async fn handle(&self, invocation: Invocation) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        for definition in registry.snapshot() {
            let line = format!("{} - {}", definition.name, definition.description);
            if !invocation.session.writeline(&line).await {
                break;
            }
        }
    }
}
