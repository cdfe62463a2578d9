// src/core/sessions.rs

//! The live set of currently open sessions, used for broadcast and shutdown.

use crate::connection::{ClientSession, SessionPhase};
use dashmap::DashMap;
use std::sync::Arc;

/// A concurrency-safe map of all open sessions, keyed by session id.
///
/// Membership tracks the `Open` phase: `insert` transitions the session to
/// `Open` and `remove` to `Closed`, so a broadcast snapshot only ever holds
/// sessions whose transport is usable. Insertion happens only after the
/// whitelist gate has passed.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashMap<u64, Arc<ClientSession>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn insert(&self, session: Arc<ClientSession>) {
        session.set_phase(SessionPhase::Open);
        self.sessions.insert(session.id(), session);
    }

    pub fn remove(&self, session_id: u64) -> Option<Arc<ClientSession>> {
        let removed = self.sessions.remove(&session_id).map(|(_, session)| session);
        if let Some(session) = &removed {
            session.set_phase(SessionPhase::Closed);
        }
        removed
    }

    /// A stable snapshot of every open session. Iterating the snapshot holds
    /// no lock on the underlying map.
    pub fn snapshot(&self) -> Vec<Arc<ClientSession>> {
        self.sessions.iter().map(|e| e.value().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
