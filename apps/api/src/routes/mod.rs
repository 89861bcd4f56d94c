pub mod health;

use axum::{
    routing::{get, post},
    Router,
};
use tower_cookies::CookieManagerLayer;

use crate::auth::handlers as auth_handlers;
use crate::call::handlers as call_handlers;
use crate::feedback::handlers as feedback_handlers;
use crate::interviews::handlers as interview_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Auth API
        .route("/api/auth/sign-up", post(auth_handlers::handle_sign_up))
        .route("/api/auth/sign-in", post(auth_handlers::handle_sign_in))
        .route("/api/auth/sign-out", post(auth_handlers::handle_sign_out))
        .route("/api/auth/me", get(auth_handlers::handle_me))
        // Interview generation + read queries
        .route(
            "/api/generate",
            get(interview_handlers::handle_generate_health)
                .post(interview_handlers::handle_generate),
        )
        .route(
            "/api/interviews/mine",
            get(interview_handlers::handle_my_interviews),
        )
        .route(
            "/api/interviews/latest",
            get(interview_handlers::handle_latest_interviews),
        )
        .route(
            "/api/interviews/:id",
            get(interview_handlers::handle_interview_detail),
        )
        .route(
            "/api/interviews/:id/feedback",
            get(interview_handlers::handle_interview_feedback),
        )
        // Feedback API
        .route(
            "/api/feedback",
            post(feedback_handlers::handle_create_feedback),
        )
        // Live call API + provider webhook
        .route("/api/calls", post(call_handlers::handle_start_call))
        .route("/api/calls/:id/end", post(call_handlers::handle_end_call))
        .route("/api/vapi/webhook", post(call_handlers::handle_webhook))
        .layer(CookieManagerLayer::new())
        .with_state(state)
}
