// ============================
// crates/backend-lib/src/api/response.rs
// ============================
//! Standardized success envelope.
//!
//! Every successful response is `{success: true, data?, meta?, message?}`;
//! errors are rendered by `AppError::into_response` with the matching
//! `{success: false, message, error_code}` shape.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use flowtodo_common::ListMeta;
use serde::Serialize;

#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ListMeta>,
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// 200 with data.
pub fn ok<T: Serialize>(data: T) -> ApiResponse<T> {
    ApiResponse {
        success: true,
        message: None,
        data: Some(data),
        meta: None,
    }
}

/// 200 with data and pagination meta.
pub fn ok_with_meta<T: Serialize>(data: T, meta: ListMeta) -> ApiResponse<T> {
    ApiResponse {
        success: true,
        message: None,
        data: Some(data),
        meta: Some(meta),
    }
}

/// 201 with data.
pub fn created<T: Serialize>(data: T) -> (StatusCode, ApiResponse<T>) {
    (
        StatusCode::CREATED,
        ApiResponse {
            success: true,
            message: None,
            data: Some(data),
            meta: None,
        },
    )
}

/// 200 with a message only.
pub fn message(msg: &str) -> ApiResponse<()> {
    ApiResponse {
        success: true,
        message: Some(msg.to_string()),
        data: None,
        meta: None,
    }
}
