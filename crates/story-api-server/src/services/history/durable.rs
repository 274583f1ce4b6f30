use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::HistoryStore;
use crate::config::HistoryConfig;
use crate::database::MessageRepository;
use crate::models::chat::ChatTurn;
use crate::utils::error::ApiError;

/// Database-backed chat history. Turns live under the fixed
/// `{app_id}/{user_id}/{session_id}` path; chronological order is recovered
/// at read time from the row sequence marker.
pub struct DurableHistory {
    repository: Arc<MessageRepository>,
    config: HistoryConfig,
}

impl DurableHistory {
    pub fn new(repository: Arc<MessageRepository>, config: HistoryConfig) -> Self {
        Self { repository, config }
    }
}

#[async_trait]
impl HistoryStore for DurableHistory {
    async fn load_history(&self, session_id: &str) -> Result<Vec<ChatTurn>, ApiError> {
        let rows = self
            .repository
            .load_messages(&self.config.app_id, &self.config.user_id, session_id)
            .await
            .map_err(|e| ApiError::StoreUnavailable(e.to_string()))?;

        let mut turns = Vec::with_capacity(rows.len());
        for row in rows {
            turns.push(row.into_turn().map_err(|e| ApiError::Internal(e.to_string()))?);
        }

        debug!(
            "Loaded {} turns for session {} from database",
            turns.len(),
            session_id
        );

        Ok(turns)
    }

    async fn append_turn(&self, session_id: &str, turn: ChatTurn) -> Result<(), ApiError> {
        self.repository
            .append_message(
                &self.config.app_id,
                &self.config.user_id,
                session_id,
                turn.role.as_str(),
                &turn.text,
                turn.annotation.as_deref(),
            )
            .await
            .map_err(|e| ApiError::StoreUnavailable(e.to_string()))?;

        Ok(())
    }

    fn name(&self) -> &'static str {
        "database"
    }
}
