use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ===== REQUEST / RESPONSE MODELS =====

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default, rename = "sessionId")]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub story: String,
}

// ===== DOMAIN MODELS =====

/// Who produced a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "model" => Some(Role::Model),
            _ => None,
        }
    }
}

/// One stored turn of a session.
///
/// `annotation` is operator-facing diagnostics attached to model turns; it is
/// persisted alongside the text but never enters the conversational context
/// sent to the RAG engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            annotation: None,
            created_at: Utc::now(),
        }
    }

    pub fn model(text: impl Into<String>, annotation: Option<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
            annotation,
            created_at: Utc::now(),
        }
    }
}

/// The only message shape handed to the RAG engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RagMessage {
    pub role: Role,
    pub text: String,
}
