//! Axum route handler for the feedback API.

use axum::{extract::State, Json};

use crate::feedback::generator::{create_feedback, CreateFeedbackParams, CreateFeedbackResult};
use crate::state::AppState;

/// POST /api/feedback
///
/// Always answers 200 with `{success, feedbackId?}`; failures are logged by
/// the flow and folded into `{success: false}`.
pub async fn handle_create_feedback(
    State(state): State<AppState>,
    Json(params): Json<CreateFeedbackParams>,
) -> Json<CreateFeedbackResult> {
    let result = create_feedback(state.store.as_ref(), state.llm.as_ref(), params).await;
    Json(result)
}
