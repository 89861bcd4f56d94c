//! Axum route handlers for the auth API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_cookies::Cookies;
use tracing::warn;

use crate::auth::{self, session, SignUpParams};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub uid: String,
    pub name: String,
    pub email: String,
    /// Accepted for wire compatibility; the credential store already holds
    /// the password, so it is never used here.
    #[serde(default)]
    #[allow(dead_code)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    pub email: String,
    pub id_token: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
}

/// POST /api/auth/sign-up
pub async fn handle_sign_up(
    State(state): State<AppState>,
    Json(request): Json<SignUpRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let outcome = auth::sign_up(
        state.store.as_ref(),
        SignUpParams {
            uid: request.uid,
            name: request.name,
            email: request.email,
        },
    )
    .await?;

    Ok(Json(AuthResponse {
        success: outcome.success,
        message: outcome.message,
    }))
}

/// POST /api/auth/sign-in
///
/// Exchanges a credential-store id token for the `session` cookie.
/// Failures come back as a structured `{success:false}` body, matching the
/// sign-up surface.
pub async fn handle_sign_in(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(request): Json<SignInRequest>,
) -> Json<AuthResponse> {
    match auth::sign_in(state.identity.as_ref(), &request.email, &request.id_token).await {
        Ok(cookie_value) => {
            cookies.add(session::session_cookie(
                cookie_value,
                state.config.production,
            ));
            Json(AuthResponse {
                success: true,
                message: "Signed in successfully.".to_string(),
            })
        }
        Err(e) => {
            warn!("sign-in failed: {e}");
            Json(AuthResponse {
                success: false,
                message: "Failed to sign in. Please try again.".to_string(),
            })
        }
    }
}

/// POST /api/auth/sign-out
pub async fn handle_sign_out(cookies: Cookies) -> Json<AuthResponse> {
    cookies.add(session::expired_session_cookie());
    Json(AuthResponse {
        success: true,
        message: "Signed out.".to_string(),
    })
}

/// Resolves the current user from the request's cookies, or fails with
/// `Unauthorized`. Used by the guarded routes.
pub(crate) async fn require_user(
    state: &AppState,
    cookies: &Cookies,
) -> Result<crate::models::user::User, AppError> {
    let session_cookie = cookies.get(session::SESSION_COOKIE);
    auth::current_user(
        state.identity.as_ref(),
        state.store.as_ref(),
        session_cookie.as_ref().map(|c| c.value()),
    )
    .await?
    .ok_or(AppError::Unauthorized)
}

/// GET /api/auth/me
///
/// Returns `{"user": null}` for unauthenticated requests rather than 401 so
/// the client can branch without error handling.
pub async fn handle_me(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<Json<Value>, AppError> {
    let session_cookie = cookies.get(session::SESSION_COOKIE);
    let user = auth::current_user(
        state.identity.as_ref(),
        state.store.as_ref(),
        session_cookie.as_ref().map(|c| c.value()),
    )
    .await?;

    Ok(Json(json!({ "user": user })))
}
