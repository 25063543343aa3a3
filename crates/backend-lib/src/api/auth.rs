// ============================
// crates/backend-lib/src/api/auth.rs
// ============================
//! Auth route handlers.

use super::extract::AuthUser;
use super::response::{self, ApiResponse};
use crate::error::AppError;
use crate::store::Store;
use crate::AppState;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use flowtodo_common::{
    EmailCheck, EmailCheckResponse, LoginRequest, LoginResponse, LogoutAllResponse,
    RefreshRequest, RegisterRequest, TokenPairResponse, UserView,
};
use std::sync::Arc;

/// `POST /auth/register`
pub async fn register<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, ApiResponse<UserView>), AppError> {
    let user = state.sessions.register(payload).await?;
    Ok(response::created(user))
}

/// `POST /auth/check-email`
pub async fn check_email<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Json(payload): Json<EmailCheck>,
) -> Result<ApiResponse<EmailCheckResponse>, AppError> {
    let exists = state.sessions.check_email(&payload.email).await?;
    Ok(response::ok(EmailCheckResponse { exists }))
}

/// `POST /auth/login`
pub async fn login<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> Result<ApiResponse<LoginResponse>, AppError> {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let login = state
        .sessions
        .login(&payload.email, &payload.password, user_agent)
        .await?;
    Ok(response::ok(login))
}

/// `POST /auth/refresh`
pub async fn refresh<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Json(payload): Json<RefreshRequest>,
) -> Result<ApiResponse<TokenPairResponse>, AppError> {
    let tokens = state.sessions.refresh(&payload.refresh_token).await?;
    Ok(response::ok(tokens))
}

/// `POST /auth/logout`. Always succeeds, even for unknown tokens.
pub async fn logout<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Json(payload): Json<RefreshRequest>,
) -> Result<ApiResponse<()>, AppError> {
    state.sessions.logout(&payload.refresh_token).await?;
    Ok(response::message("Logged out from this device"))
}

/// `POST /auth/logout-all`
pub async fn logout_all<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
) -> Result<ApiResponse<LogoutAllResponse>, AppError> {
    let devices_logged_out = state.sessions.logout_all(user.id).await?;
    Ok(response::ok(LogoutAllResponse { devices_logged_out }))
}
