//! Roadmap API handlers
//!
//! POST /api/student-roadmap, POST /api/parent-roadmap,
//! GET /api/roadmaps/{user_id}, DELETE /api/roadmaps/{user_id}

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{Roadmap, RoadmapKind};
use crate::services::roadmap_generator::RoadmapGenerator;
use crate::{db, AppState};

/// POST /api/student-roadmap and /api/parent-roadmap request
#[derive(Debug, Deserialize)]
pub struct CreateRoadmapRequest {
    pub interest: String,
    pub user_id: Uuid,
}

/// DELETE /api/roadmaps/{user_id} response
#[derive(Debug, Serialize)]
pub struct DeleteRoadmapsResponse {
    pub success: bool,
    pub deleted: u64,
}

/// POST /api/student-roadmap
pub async fn create_student_roadmap(
    State(state): State<AppState>,
    Json(request): Json<CreateRoadmapRequest>,
) -> ApiResult<Json<Roadmap>> {
    create_roadmap(state, RoadmapKind::Student, request).await
}

/// POST /api/parent-roadmap
///
/// Same pipeline as the student variant; the prompt frames the plan for a
/// guardian mediating the child's learning.
pub async fn create_parent_roadmap(
    State(state): State<AppState>,
    Json(request): Json<CreateRoadmapRequest>,
) -> ApiResult<Json<Roadmap>> {
    create_roadmap(state, RoadmapKind::Parent, request).await
}

async fn create_roadmap(
    state: AppState,
    kind: RoadmapKind,
    request: CreateRoadmapRequest,
) -> ApiResult<Json<Roadmap>> {
    let generator = RoadmapGenerator::new(state.db.clone(), state.text_model.clone());
    let roadmap = generator
        .generate(kind, request.user_id, &request.interest)
        .await?;

    Ok(Json(roadmap))
}

/// GET /api/roadmaps/{user_id}
///
/// Returns the user's roadmap topics as one flat ordered list.
pub async fn list_roadmap_topics(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<Vec<String>>> {
    ensure_user_exists(&state, user_id).await?;

    let roadmaps = db::roadmaps::list_roadmaps(&state.db, user_id).await?;
    let topics: Vec<String> = roadmaps
        .into_iter()
        .flat_map(|roadmap| roadmap.topics)
        .collect();

    Ok(Json(topics))
}

/// DELETE /api/roadmaps/{user_id}
///
/// Removes the user's roadmaps only; the user record is untouched.
pub async fn delete_roadmaps(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<DeleteRoadmapsResponse>> {
    ensure_user_exists(&state, user_id).await?;

    let deleted = db::roadmaps::delete_roadmaps(&state.db, user_id).await?;

    tracing::info!(user_id = %user_id, deleted, "Roadmaps deleted");

    Ok(Json(DeleteRoadmapsResponse {
        success: true,
        deleted,
    }))
}

async fn ensure_user_exists(state: &AppState, user_id: Uuid) -> ApiResult<()> {
    db::users::get_user(&state.db, user_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| ApiError::NotFound(format!("User not found: {}", user_id)))
}

/// Build roadmap routes
pub fn roadmap_routes() -> Router<AppState> {
    Router::new()
        .route("/api/student-roadmap", post(create_student_roadmap))
        .route("/api/parent-roadmap", post(create_parent_roadmap))
        .route(
            "/api/roadmaps/:user_id",
            get(list_roadmap_topics).delete(delete_roadmaps),
        )
}
