// ============================
// crates/backend-lib/src/api/todos.rs
// ============================
//! Todo route handlers.

use super::extract::AuthUser;
use super::response::{self, ApiResponse};
use crate::error::AppError;
use crate::store::Store;
use crate::todos::ListParams;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use flowtodo_common::{
    BulkCreateRequest, BulkCreateResponse, DeleteAllResponse, ListMeta, NewTodo, TodoPatch,
    TodoView,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

/// Query string of `GET /todos`.
#[derive(Debug, Deserialize, Default)]
pub struct ListQuery {
    pub cursor: Option<i64>,
    pub limit: Option<usize>,
    pub is_completed: Option<bool>,
    pub priority: Option<u8>,
}

/// `GET /todos`
pub async fn list_todos<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<ApiResponse<Vec<TodoView>>, AppError> {
    let params = ListParams {
        cursor: query.cursor,
        limit: query.limit,
        is_completed: query.is_completed,
        priority: query.priority,
    };
    let (data, pagination) = state.todos.list(user.id, params).await?;
    Ok(response::ok_with_meta(data, ListMeta { pagination }))
}

/// `GET /todos/{id}`
pub async fn get_todo<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<TodoView>, AppError> {
    let todo = state.todos.get(user.id, id).await?;
    Ok(response::ok(todo))
}

/// `POST /todos`
pub async fn create_todo<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
    Json(payload): Json<NewTodo>,
) -> Result<(StatusCode, ApiResponse<TodoView>), AppError> {
    let todo = state.todos.create(user.id, payload).await?;
    Ok(response::created(todo))
}

/// `POST /todos/bulk/create`
pub async fn bulk_create_todos<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
    Json(payload): Json<BulkCreateRequest>,
) -> Result<ApiResponse<BulkCreateResponse>, AppError> {
    let result = state.todos.bulk_create(user.id, payload.todos).await?;
    Ok(response::ok(result))
}

/// `PUT /todos/{id}`: full replacement of mutable fields.
pub async fn update_todo<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<NewTodo>,
) -> Result<ApiResponse<TodoView>, AppError> {
    let todo = state.todos.update(user.id, id, payload).await?;
    Ok(response::ok(todo))
}

/// `PATCH /todos/{id}`: only fields present in the body change.
pub async fn patch_todo<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<TodoPatch>,
) -> Result<ApiResponse<TodoView>, AppError> {
    let todo = state.todos.patch(user.id, id, payload).await?;
    Ok(response::ok(todo))
}

/// `DELETE /todos/{id}`: soft delete.
pub async fn delete_todo<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<()>, AppError> {
    state.todos.delete(user.id, id).await?;
    Ok(response::message("Todo deleted"))
}

/// `DELETE /todos`: owner-scoped bulk soft delete (reset tooling).
pub async fn delete_all_todos<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
) -> Result<ApiResponse<DeleteAllResponse>, AppError> {
    let deleted_count = state.todos.delete_all(user.id).await?;
    Ok(response::ok(DeleteAllResponse { deleted_count }))
}
