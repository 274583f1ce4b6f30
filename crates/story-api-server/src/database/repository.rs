use super::{DbPool, StoredMessage};
use anyhow::Result;
use tracing::debug;

pub struct MessageRepository {
    pool: DbPool,
}

impl MessageRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Creates the chat history table and its session index when missing, so
    /// the server can start against a bare database.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS chat_messages (
                id BIGSERIAL PRIMARY KEY,
                app_id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                session_id TEXT NOT NULL,
                role TEXT NOT NULL,
                text TEXT NOT NULL,
                admin_note TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(self.pool.get_pool())
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_chat_messages_session
            ON chat_messages (app_id, user_id, session_id, created_at, id)
            "#,
        )
        .execute(self.pool.get_pool())
        .await?;

        Ok(())
    }

    /// All messages of one session, oldest first. Ordering by
    /// `(created_at, id)` keeps same-timestamp rows in insertion order.
    pub async fn load_messages(
        &self,
        app_id: &str,
        user_id: &str,
        session_id: &str,
    ) -> Result<Vec<StoredMessage>> {
        let messages = sqlx::query_as::<_, StoredMessage>(
            r#"SELECT id, role, text, admin_note, created_at
               FROM chat_messages
               WHERE app_id = $1 AND user_id = $2 AND session_id = $3
               ORDER BY created_at, id"#,
        )
        .bind(app_id)
        .bind(user_id)
        .bind(session_id)
        .fetch_all(self.pool.get_pool())
        .await?;

        debug!(
            "Loaded {} stored messages for session {}",
            messages.len(),
            session_id
        );

        Ok(messages)
    }

    /// Appends one message; the database assigns the id and timestamp.
    pub async fn append_message(
        &self,
        app_id: &str,
        user_id: &str,
        session_id: &str,
        role: &str,
        text: &str,
        admin_note: Option<&str>,
    ) -> Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"INSERT INTO chat_messages (app_id, user_id, session_id, role, text, admin_note)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING id"#,
        )
        .bind(app_id)
        .bind(user_id)
        .bind(session_id)
        .bind(role)
        .bind(text)
        .bind(admin_note)
        .fetch_one(self.pool.get_pool())
        .await?;

        Ok(id)
    }
}
