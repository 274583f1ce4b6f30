use anyhow::anyhow;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::models::chat::{ChatTurn, Role};

/// Row of the `chat_messages` table. `id` is the sequence marker tiebreaker
/// for rows sharing a timestamp.
#[derive(Debug, Clone, FromRow)]
pub struct StoredMessage {
    pub id: i64,
    pub role: String,
    pub text: String,
    pub admin_note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl StoredMessage {
    pub fn into_turn(self) -> anyhow::Result<ChatTurn> {
        let role = Role::parse(&self.role)
            .ok_or_else(|| anyhow!("unknown role '{}' in stored message {}", self.role, self.id))?;

        Ok(ChatTurn {
            role,
            text: self.text,
            annotation: self.admin_note,
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_roles_convert() {
        let row = StoredMessage {
            id: 1,
            role: "model".to_string(),
            text: "a story".to_string(),
            admin_note: Some("note".to_string()),
            created_at: Utc::now(),
        };

        let turn = row.into_turn().unwrap();
        assert_eq!(turn.role, Role::Model);
        assert_eq!(turn.annotation.as_deref(), Some("note"));
    }

    #[test]
    fn unknown_role_is_an_error() {
        let row = StoredMessage {
            id: 2,
            role: "system".to_string(),
            text: String::new(),
            admin_note: None,
            created_at: Utc::now(),
        };

        assert!(row.into_turn().is_err());
    }
}
