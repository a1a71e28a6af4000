//! Chat API handler
//!
//! POST /chat relays a message history to the text model behind the
//! Cris persona pre-prompt.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::services::chat_client::ChatMessage;
use crate::services::prompts;
use crate::AppState;

/// One message submitted by the client
#[derive(Debug, Deserialize)]
pub struct InboundMessage {
    pub content: String,
}

/// POST /chat request
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<InboundMessage>,
}

/// POST /chat response
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

/// POST /chat
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    let mut history = Vec::with_capacity(request.messages.len() + 1);
    history.push(ChatMessage::user(prompts::chat_preprompt()));
    history.extend(request.messages.into_iter().map(|m| ChatMessage::user(m.content)));

    let response = state
        .text_model
        .complete(&history)
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    Ok(Json(ChatResponse { response }))
}

/// Build chat routes
pub fn chat_routes() -> Router<AppState> {
    Router::new().route("/chat", post(chat))
}
