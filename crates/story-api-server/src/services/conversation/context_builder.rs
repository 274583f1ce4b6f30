use crate::models::chat::{ChatTurn, RagMessage, Role};

/// Merges stored history with the incoming query into the sequence sent to
/// the RAG engine.
///
/// Annotations never cross this boundary: the output carries `{role, text}`
/// only, in chronological order, ending with the new user entry. Pure, no
/// side effects.
pub fn build_request_context(history: &[ChatTurn], new_query: &str) -> Vec<RagMessage> {
    let mut context: Vec<RagMessage> = history
        .iter()
        .map(|turn| RagMessage {
            role: turn.role,
            text: turn.text.clone(),
        })
        .collect();

    context.push(RagMessage {
        role: Role::User,
        text: new_query.to_string(),
    });

    context
}
