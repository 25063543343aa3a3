// ============================
// crates/backend-lib/src/api/extract.rs
// ============================
//! Bearer-token authentication extractor.

use crate::error::AppError;
use crate::store::{Store, UserRecord};
use crate::AppState;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use std::sync::Arc;

/// The authenticated caller, resolved from `Authorization: Bearer <token>`.
///
/// Extracting this is the precondition of every protected route: it fails
/// with `Unauthorized` when the header is missing or malformed,
/// `InvalidToken` on a bad signature or expired access token, and
/// `UserNotFound` when the subject no longer exists.
pub struct AuthUser(pub UserRecord);

impl<S: Store + 'static> FromRequestParts<Arc<AppState<S>>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<S>>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("missing Authorization header".to_string()))?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("expected a bearer token".to_string()))?;

        let user = state.sessions.authenticate(token).await?;
        Ok(AuthUser(user))
    }
}
