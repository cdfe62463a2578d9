// src/core/registry.rs

//! The ordered command registry and the handler trait its entries point at.

use crate::connection::ClientSession;
use crate::core::RconError;
use async_trait::async_trait;
use parking_lot::RwLock;
use regex::Regex;
use std::sync::Arc;

/// One parsed invocation handed to a command handler.
pub struct Invocation {
    /// The capture groups extracted from the matching pattern, in order.
    /// Groups that did not participate in the match are empty strings.
    pub captures: Vec<String>,
    /// The session that sent the line.
    pub session: Arc<ClientSession>,
}

/// A registered command's logic. Handlers run as detached tasks; everything
/// they need beyond the invocation must be injected at construction time.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, invocation: Invocation);
}

/// A single command entry. Immutable once registered.
pub struct CommandDefinition {
    /// Display name, used for command listings only.
    pub name: String,
    /// The compiled match pattern. Patterns are prefix matchers: a match must
    /// start at the first byte of the line but need not consume all of it.
    pub pattern: Regex,
    pub description: String,
    pub handler: Arc<dyn CommandHandler>,
    pub requires_auth: bool,
}

impl CommandDefinition {
    /// Returns the capture groups iff the pattern matches at the start of
    /// `line`. The regex crate returns the leftmost match, so a returned
    /// match starting past byte 0 proves no match exists at the start.
    pub fn match_at_start(&self, line: &str) -> Option<Vec<String>> {
        let caps = self.pattern.captures(line)?;
        if caps.get(0)?.start() != 0 {
            return None;
        }
        Some(
            caps.iter()
                .skip(1)
                .map(|m| m.map_or_else(String::new, |m| m.as_str().to_string()))
                .collect(),
        )
    }
}

/// An append-only, ordered list of command definitions. Registration order is
/// priority order: the first matching entry wins.
///
/// The list is read-mostly: registration happens during setup, dispatching
/// reads a cloned snapshot, so a reader can never observe a torn list.
#[derive(Default)]
pub struct CommandRegistry {
    commands: RwLock<Vec<Arc<CommandDefinition>>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Default::default()
    }

    /// Compiles `pattern` and appends a new definition. No duplicate-name
    /// checking: a colliding later registration is simply lower priority.
    pub fn register(
        &self,
        name: &str,
        pattern: &str,
        description: &str,
        handler: Arc<dyn CommandHandler>,
        requires_auth: bool,
    ) -> Result<(), RconError> {
        let compiled = Regex::new(pattern).map_err(|source| RconError::Pattern {
            name: name.to_string(),
            source,
        })?;
        let definition = Arc::new(CommandDefinition {
            name: name.to_string(),
            pattern: compiled,
            description: description.to_string(),
            handler,
            requires_auth,
        });
        self.commands.write().push(definition);
        Ok(())
    }

    /// A stable snapshot of the registry in priority (registration) order.
    pub fn snapshot(&self) -> Vec<Arc<CommandDefinition>> {
        self.commands.read().clone()
    }

    pub fn len(&self) -> usize {
        self.commands.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.read().is_empty()
    }
}
