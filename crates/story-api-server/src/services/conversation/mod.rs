//! Conversation assembly for the RAG engine.

mod context_builder;

pub use context_builder::build_request_context;
