//! Lesson introduction API handler
//!
//! POST /generate-introduction returns a short, phase-specific welcome
//! text voiced by Cris.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::services::chat_client::ChatMessage;
use crate::services::prompts;
use crate::AppState;

/// POST /generate-introduction request
#[derive(Debug, Deserialize)]
pub struct IntroductionRequest {
    pub tema: String,
    /// palavras | frases | jogos; validated by hand so unknown phases
    /// yield 400
    pub fase: String,
}

/// POST /generate-introduction response
#[derive(Debug, Serialize)]
pub struct IntroductionResponse {
    pub introduction: String,
}

/// POST /generate-introduction
pub async fn generate_introduction(
    State(state): State<AppState>,
    Json(request): Json<IntroductionRequest>,
) -> ApiResult<Json<IntroductionResponse>> {
    let prompt = prompts::introduction_prompt(&request.tema, &request.fase)
        .ok_or_else(|| ApiError::Validation(format!("Unknown phase: {}", request.fase)))?;

    tracing::info!(tema = %request.tema, fase = %request.fase, "Generating introduction");

    let introduction = state
        .text_model
        .complete(&[ChatMessage::user(prompt)])
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    Ok(Json(IntroductionResponse { introduction }))
}

/// Build introduction routes
pub fn introduction_routes() -> Router<AppState> {
    Router::new().route("/generate-introduction", post(generate_introduction))
}
