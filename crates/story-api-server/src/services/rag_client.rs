use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::RagConfig;
use crate::models::chat::RagMessage;
use crate::utils::error::ApiError;

#[cfg(test)]
use mockall::automock;

/// What the RAG engine produces for one conversation: the story text for the
/// caller and a diagnostic note for operators.
#[derive(Debug, Clone, PartialEq)]
pub struct RagOutcome {
    pub story: String,
    pub admin_note: String,
}

/// Seam over the external RAG engine so handlers can be exercised without a
/// live engine.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RagProvider: Send + Sync {
    /// Single attempt, no retries; runs to completion or fails.
    async fn generate(&self, conversation: &[RagMessage]) -> Result<RagOutcome, ApiError>;
}

#[derive(Serialize)]
struct RagQueryRequest<'a> {
    contents: &'a [RagMessage],
    chunk_store_path: &'a str,
    embeddings_source_path: &'a str,
}

#[derive(Deserialize)]
struct RagQueryResponse {
    story: String,
    admin_note: String,
}

/// HTTP client for the external RAG engine. Retrieval, embedding and prompt
/// construction all live on the other side of this call.
pub struct RagClient {
    client: Client,
    config: RagConfig,
}

impl RagClient {
    pub fn new(config: RagConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(config.timeout_seconds))
                .build()
                .unwrap_or_else(|_| Client::new()),
            config,
        }
    }
}

#[async_trait]
impl RagProvider for RagClient {
    async fn generate(&self, conversation: &[RagMessage]) -> Result<RagOutcome, ApiError> {
        debug!("Calling RAG engine with {} messages", conversation.len());

        let request = RagQueryRequest {
            contents: conversation,
            chunk_store_path: &self.config.chunk_store_path,
            embeddings_source_path: &self.config.embeddings_source_path,
        };

        let response = self
            .client
            .post(format!("{}/rag/query", self.config.base_url))
            .header("X-Free-Tier-Key", &self.config.free_tier_api_key)
            .header("X-Paid-Key", &self.config.paid_api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ApiError::RagError(format!("Failed to call RAG engine: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::RagError(format!(
                "RAG engine error: {} - {}",
                status, body
            )));
        }

        let body: RagQueryResponse = response
            .json()
            .await
            .map_err(|e| ApiError::RagError(format!("Failed to parse RAG response: {}", e)))?;

        Ok(RagOutcome {
            story: body.story,
            admin_note: body.admin_note,
        })
    }
}
