//! Chat history persistence behind a single backend-agnostic trait.
//!
//! The backend is picked once at startup: durable (PostgreSQL) when a
//! database is configured and reachable, in-memory otherwise. Request code
//! only ever sees `Arc<dyn HistoryStore>`.

mod durable;
mod volatile;

pub use durable::DurableHistory;
pub use volatile::VolatileHistory;

use async_trait::async_trait;

use crate::models::chat::ChatTurn;
use crate::utils::error::ApiError;

/// Per-session chat turn storage.
///
/// Concurrent requests against the same session race on load-then-append:
/// two in-flight requests may interleave their appended turns, and one may
/// load history that misses the other's turns. Individual appends are
/// atomic; no ordering beyond that is guaranteed.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// All turns previously recorded for the session, oldest first. Empty
    /// when the session has no turns yet.
    async fn load_history(&self, session_id: &str) -> Result<Vec<ChatTurn>, ApiError>;

    /// Records one turn and derives its sequence marker. Not idempotent:
    /// duplicate calls store duplicate turns.
    async fn append_turn(&self, session_id: &str, turn: ChatTurn) -> Result<(), ApiError>;

    /// Backend name, for startup logging and readiness reporting.
    fn name(&self) -> &'static str;
}
