pub mod conversation;
pub mod history;
pub mod rag_client;

pub use history::{DurableHistory, HistoryStore, VolatileHistory};
pub use rag_client::{RagClient, RagOutcome, RagProvider};
