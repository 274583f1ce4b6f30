use axum::{extract::Extension, Json};
use std::sync::Arc;
use tracing::{debug, info};

use crate::models::chat::{ChatTurn, QueryRequest, QueryResponse};
use crate::services::conversation::build_request_context;
use crate::services::{HistoryStore, RagProvider};
use crate::utils::error::ApiError;

/// One chat request end to end: validate, load the session's history, hand
/// the assembled conversation to the RAG engine, persist the user turn and
/// the model's reply, answer with the story.
///
/// Turns are persisted only after the RAG call succeeds, so a failed request
/// leaves the session exactly as it found it.
pub async fn query_handler(
    Extension(history): Extension<Arc<dyn HistoryStore>>,
    Extension(rag): Extension<Arc<dyn RagProvider>>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    let (Some(query), Some(session_id)) = (
        request.query.as_deref().filter(|q| !q.is_empty()),
        request.session_id.as_deref().filter(|s| !s.is_empty()),
    ) else {
        return Err(ApiError::BadRequest(
            "Query or Session ID not provided".to_string(),
        ));
    };

    info!(
        "Chat query: session={}, query_len={}",
        session_id,
        query.len()
    );

    let history_turns = history.load_history(session_id).await?;
    debug!(
        "{} previous turns loaded for session {}",
        history_turns.len(),
        session_id
    );

    let conversation = build_request_context(&history_turns, query);

    let outcome = rag.generate(&conversation).await?;

    history
        .append_turn(session_id, ChatTurn::user(query))
        .await?;
    history
        .append_turn(
            session_id,
            ChatTurn::model(outcome.story.clone(), Some(outcome.admin_note)),
        )
        .await?;

    Ok(Json(QueryResponse {
        story: outcome.story,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::Role;
    use crate::services::history::VolatileHistory;
    use crate::services::rag_client::{MockRagProvider, RagOutcome};

    fn request(query: Option<&str>, session_id: Option<&str>) -> QueryRequest {
        QueryRequest {
            query: query.map(String::from),
            session_id: session_id.map(String::from),
        }
    }

    async fn run(
        store: &Arc<VolatileHistory>,
        rag: MockRagProvider,
        req: QueryRequest,
    ) -> Result<Json<QueryResponse>, ApiError> {
        let history: Arc<dyn HistoryStore> = store.clone();
        query_handler(
            Extension(history),
            Extension(Arc::new(rag) as Arc<dyn RagProvider>),
            Json(req),
        )
        .await
    }

    #[tokio::test]
    async fn empty_query_is_rejected_without_side_effects() {
        let store = Arc::new(VolatileHistory::new());
        let mut rag = MockRagProvider::new();
        rag.expect_generate().never();

        let result = run(&store, rag, request(Some(""), Some("s1"))).await;

        assert!(matches!(result, Err(ApiError::BadRequest(_))));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn missing_session_id_is_rejected_without_side_effects() {
        let store = Arc::new(VolatileHistory::new());
        let mut rag = MockRagProvider::new();
        rag.expect_generate().never();

        let result = run(&store, rag, request(Some("a query"), None)).await;

        assert!(matches!(result, Err(ApiError::BadRequest(_))));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn success_persists_user_then_model_turn() {
        let store = Arc::new(VolatileHistory::new());
        let mut rag = MockRagProvider::new();
        rag.expect_generate()
            .withf(|conversation| {
                conversation.len() == 1
                    && conversation[0].role == Role::User
                    && conversation[0].text == "Tell me about aqueducts"
            })
            .returning(|_| {
                Ok(RagOutcome {
                    story: "A story of aqueducts".to_string(),
                    admin_note: "retrieved 3 chunks".to_string(),
                })
            });

        let response = run(
            &store,
            rag,
            request(Some("Tell me about aqueducts"), Some("s1")),
        )
        .await
        .unwrap();

        assert_eq!(response.0.story, "A story of aqueducts");

        let turns = store.load_history("s1").await.unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[0].text, "Tell me about aqueducts");
        assert!(turns[0].annotation.is_none());
        assert_eq!(turns[1].role, Role::Model);
        assert_eq!(turns[1].text, "A story of aqueducts");
        assert_eq!(turns[1].annotation.as_deref(), Some("retrieved 3 chunks"));
    }

    #[tokio::test]
    async fn second_request_sees_prior_turns_and_extends_the_session() {
        let store = Arc::new(VolatileHistory::new());

        let mut first = MockRagProvider::new();
        first
            .expect_generate()
            .withf(|conversation| conversation.len() == 1 && conversation[0].text == "A")
            .returning(|_| {
                Ok(RagOutcome {
                    story: "first reply".to_string(),
                    admin_note: "n1".to_string(),
                })
            });
        run(&store, first, request(Some("A"), Some("s1")))
            .await
            .unwrap();

        let mut second = MockRagProvider::new();
        second
            .expect_generate()
            .withf(|conversation| {
                conversation.len() == 3
                    && conversation[0].role == Role::User
                    && conversation[0].text == "A"
                    && conversation[1].role == Role::Model
                    && conversation[1].text == "first reply"
                    && conversation[2].role == Role::User
                    && conversation[2].text == "B"
            })
            .returning(|_| {
                Ok(RagOutcome {
                    story: "second reply".to_string(),
                    admin_note: "n2".to_string(),
                })
            });
        run(&store, second, request(Some("B"), Some("s1")))
            .await
            .unwrap();

        let turns = store.load_history("s1").await.unwrap();
        let summary: Vec<(Role, &str)> = turns
            .iter()
            .map(|t| (t.role, t.text.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (Role::User, "A"),
                (Role::Model, "first reply"),
                (Role::User, "B"),
                (Role::Model, "second reply"),
            ]
        );
    }

    #[tokio::test]
    async fn rag_failure_persists_nothing() {
        let store = Arc::new(VolatileHistory::new());
        let mut rag = MockRagProvider::new();
        rag.expect_generate()
            .returning(|_| Err(ApiError::RagError("engine down".to_string())));

        let result = run(&store, rag, request(Some("a query"), Some("s1"))).await;

        assert!(matches!(result, Err(ApiError::RagError(_))));
        assert!(store.load_history("s1").await.unwrap().is_empty());
    }
}
