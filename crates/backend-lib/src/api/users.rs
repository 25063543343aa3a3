// ============================
// crates/backend-lib/src/api/users.rs
// ============================
//! User profile handlers.

use super::extract::AuthUser;
use super::response::{self, ApiResponse};
use crate::error::AppError;
use crate::store::Store;
use crate::AppState;
use axum::extract::State;
use flowtodo_common::UserView;
use std::sync::Arc;

/// `GET /users/me`
pub async fn me<S: Store + 'static>(
    AuthUser(user): AuthUser,
) -> Result<ApiResponse<UserView>, AppError> {
    Ok(response::ok(UserView::from(&user)))
}

/// `DELETE /users/me`: cascading account deletion.
pub async fn delete_me<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
) -> Result<ApiResponse<()>, AppError> {
    state.sessions.delete_account(user.id).await?;
    Ok(response::message("Account deleted"))
}
