//! User registration and profile API handlers
//!
//! POST /users/register, GET /users/{id}, PUT /users/{id}/update-roadmap,
//! POST /check/user

use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{is_valid_learning_time, ExperienceLevel, User, LEARNING_TIMES};
use crate::{db, AppState};

/// POST /users/register request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub image_url: String,
    pub age: u32,
    /// Validated by hand so bad values yield 400, not a serde rejection
    pub experience_level: String,
    pub interest: String,
    pub learning_time: u32,
}

/// PUT /users/{id}/update-roadmap request
#[derive(Debug, Deserialize)]
pub struct UpdateRoadmapRequest {
    pub roadmap_level: i64,
}

/// POST /check/user request
#[derive(Debug, Deserialize)]
pub struct CheckUserRequest {
    pub email: String,
}

/// POST /check/user response
#[derive(Debug, Serialize)]
pub struct CheckUserResponse {
    pub exists: bool,
    pub id: Option<Uuid>,
}

/// POST /users/register
///
/// Registers a new user. Email is the duplicate key.
pub async fn register_user(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<Json<User>> {
    let experience_level = ExperienceLevel::parse(&request.experience_level).ok_or_else(|| {
        ApiError::Validation(format!(
            "Invalid experience_level: {} (expected beginner, intermediated or advanced)",
            request.experience_level
        ))
    })?;

    if !is_valid_learning_time(request.learning_time) {
        return Err(ApiError::Validation(format!(
            "Invalid learning_time: {} (expected one of {:?})",
            request.learning_time, LEARNING_TIMES
        )));
    }

    if request.email.trim().is_empty() {
        return Err(ApiError::Validation("Email must not be empty".to_string()));
    }

    if db::users::find_user_by_email(&state.db, &request.email)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(format!(
            "Email already registered: {}",
            request.email
        )));
    }

    let user = User {
        id: Uuid::new_v4(),
        name: request.name,
        email: request.email,
        image_url: request.image_url,
        age: request.age,
        experience_level,
        interest: request.interest,
        learning_time: request.learning_time,
        roadmap_level: 0,
        created_at: Utc::now(),
    };
    db::users::create_user(&state.db, &user).await?;

    tracing::info!(user_id = %user.id, email = %user.email, "User registered");

    Ok(Json(user))
}

/// GET /users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<User>> {
    let user = db::users::get_user(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User not found: {}", user_id)))?;

    Ok(Json(user))
}

/// PUT /users/{id}/update-roadmap
///
/// Roadmap progress only changes through this endpoint.
pub async fn update_roadmap_level(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<UpdateRoadmapRequest>,
) -> ApiResult<Json<User>> {
    if request.roadmap_level < 0 {
        return Err(ApiError::Validation(format!(
            "roadmap_level must be non-negative, got {}",
            request.roadmap_level
        )));
    }

    let user = db::users::update_roadmap_level(&state.db, user_id, request.roadmap_level)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User not found: {}", user_id)))?;

    tracing::info!(user_id = %user_id, roadmap_level = request.roadmap_level, "Roadmap level updated");

    Ok(Json(user))
}

/// POST /check/user
///
/// Existence probe used before registration; always 200.
pub async fn check_user(
    State(state): State<AppState>,
    Json(request): Json<CheckUserRequest>,
) -> ApiResult<Json<CheckUserResponse>> {
    let id = db::users::find_user_by_email(&state.db, &request.email).await?;

    Ok(Json(CheckUserResponse {
        exists: id.is_some(),
        id,
    }))
}

/// Build user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/register", post(register_user))
        .route("/users/:id", get(get_user))
        .route("/users/:id/update-roadmap", put(update_roadmap_level))
        .route("/check/user", post(check_user))
}
