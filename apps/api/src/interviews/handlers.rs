//! Axum route handlers for the interview API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::auth::handlers::require_user;
use crate::errors::AppError;
use crate::interviews::generator::{generate_interview, GenerateInterviewRequest};
use crate::models::feedback::Feedback;
use crate::models::interview::Interview;
use crate::state::AppState;

const DEFAULT_LATEST_LIMIT: i64 = 20;

/// GET /api/generate — health check kept for wire compatibility with the
/// original endpoint.
pub async fn handle_generate_health() -> Json<Value> {
    Json(json!({ "success": true, "data": "THANK YOU" }))
}

/// POST /api/generate
///
/// Validates the request, generates questions, and persists one interview.
/// Missing fields answer 400; provider and store failures answer 500 with
/// the underlying message.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateInterviewRequest>,
) -> Result<Json<Value>, AppError> {
    generate_interview(state.store.as_ref(), state.llm.as_ref(), request).await?;
    Ok(Json(json!({ "success": true })))
}

/// GET /api/interviews/mine
pub async fn handle_my_interviews(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<Json<Vec<Interview>>, AppError> {
    let user = require_user(&state, &cookies).await?;
    let interviews = state.store.interviews_by_user(&user.id).await?;
    Ok(Json(interviews))
}

#[derive(Debug, Deserialize)]
pub struct LatestInterviewsQuery {
    pub limit: Option<i64>,
}

/// GET /api/interviews/latest?limit=N
///
/// Finalized interviews from other users, newest first.
pub async fn handle_latest_interviews(
    State(state): State<AppState>,
    cookies: Cookies,
    Query(query): Query<LatestInterviewsQuery>,
) -> Result<Json<Vec<Interview>>, AppError> {
    let user = require_user(&state, &cookies).await?;
    let limit = query.limit.unwrap_or(DEFAULT_LATEST_LIMIT).clamp(1, 100);
    let interviews = state.store.latest_interviews(&user.id, limit).await?;
    Ok(Json(interviews))
}

/// GET /api/interviews/:id
pub async fn handle_interview_detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Interview>, AppError> {
    let interview = state
        .store
        .interview_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Interview {id} not found")))?;
    Ok(Json(interview))
}

/// GET /api/interviews/:id/feedback
///
/// The caller's own feedback for an interview; `{"feedback": null}` when no
/// record matches both keys.
pub async fn handle_interview_feedback(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let user = require_user(&state, &cookies).await?;
    let feedback: Option<Feedback> = state.store.feedback_by_interview(id, &user.id).await?;
    Ok(Json(json!({ "feedback": feedback })))
}
