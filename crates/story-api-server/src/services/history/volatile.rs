use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use super::HistoryStore;
use crate::models::chat::ChatTurn;
use crate::utils::error::ApiError;

/// In-process chat history, used when no database is available.
///
/// Sessions live in a `DashMap` keyed by session id with turns in insertion
/// order. Contents are lost on restart and grow unbounded for the process
/// lifetime; there is no eviction.
#[derive(Default)]
pub struct VolatileHistory {
    sessions: DashMap<String, Vec<ChatTurn>>,
}

impl VolatileHistory {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Number of sessions currently held.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl HistoryStore for VolatileHistory {
    async fn load_history(&self, session_id: &str) -> Result<Vec<ChatTurn>, ApiError> {
        let turns = self
            .sessions
            .get(session_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();

        debug!(
            "Loaded {} turns for session {} from memory",
            turns.len(),
            session_id
        );

        Ok(turns)
    }

    async fn append_turn(&self, session_id: &str, turn: ChatTurn) -> Result<(), ApiError> {
        self.sessions
            .entry(session_id.to_string())
            .or_default()
            .push(turn);

        Ok(())
    }

    fn name(&self) -> &'static str {
        "in-memory"
    }
}
