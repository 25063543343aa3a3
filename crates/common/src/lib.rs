// ================
// crates/common/src/lib.rs
// ================
//! Shared wire types for the Flow Todo API.
//! These are the request and response payloads exchanged between clients
//! and the backend; the backend's internal records live in `backend-lib`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Auth payloads
// ---------------------------------------------------------------------------

/// Body of `POST /auth/register`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Body of `POST /auth/login`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of `POST /auth/check-email`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct EmailCheck {
    pub email: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct EmailCheckResponse {
    pub exists: bool,
}

/// Body of `POST /auth/refresh` and `POST /auth/logout`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Public view of a user. Never carries the password hash.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserView {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
}

/// Access/refresh token pair returned by login and refresh.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

impl TokenPairResponse {
    pub fn bearer(access_token: String, refresh_token: String) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "bearer".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub tokens: TokenPairResponse,
    pub user: UserView,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LogoutAllResponse {
    pub devices_logged_out: u64,
}

// ---------------------------------------------------------------------------
// Todo payloads
// ---------------------------------------------------------------------------

/// Public view of a todo item.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TodoView {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: u8,
    pub is_completed: bool,
    pub is_synced: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub reminder_at: Option<DateTime<Utc>>,
}

/// Body of `POST /todos` and `PUT /todos/{id}`.
///
/// Everything except `title` defaults when omitted, mirroring the column
/// defaults of the todos table.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct NewTodo {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: u8,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub is_synced: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reminder_at: Option<DateTime<Utc>>,
}

/// Body of `PATCH /todos/{id}`.
///
/// Every field is doubly optional: the outer `Option` is whether the key
/// appeared in the JSON at all, the inner one is its value. `None` means
/// "leave untouched"; `Some(None)` means an explicit `null`, which clears
/// nullable fields and is rejected for non-nullable ones.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct TodoPatch {
    #[serde(default, deserialize_with = "double_option")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub priority: Option<Option<u8>>,
    #[serde(default, deserialize_with = "double_option")]
    pub is_completed: Option<Option<bool>>,
    #[serde(default, deserialize_with = "double_option")]
    pub is_synced: Option<Option<bool>>,
    #[serde(default, deserialize_with = "double_option")]
    pub completed_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "double_option")]
    pub reminder_at: Option<Option<DateTime<Utc>>>,
}

impl TodoPatch {
    /// True when no field was present in the request body.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.is_completed.is_none()
            && self.is_synced.is_none()
            && self.completed_at.is_none()
            && self.reminder_at.is_none()
    }
}

/// Deserialize a field so that a present `null` becomes `Some(None)` while
/// an absent field stays `None` (via `#[serde(default)]`).
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

/// Body of `POST /todos/bulk/create`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BulkCreateRequest {
    pub todos: Vec<NewTodo>,
}

/// One rejected item of a bulk create, identified by its input position.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BulkFailure {
    pub index: usize,
    pub error: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BulkCreateResponse {
    pub created: Vec<TodoView>,
    pub failed: Vec<BulkFailure>,
    pub created_count: usize,
    pub failed_count: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DeleteAllResponse {
    pub deleted_count: u64,
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// Cursor pagination block nested under `meta.pagination` in list responses.
/// The cursor is the `updated_at` of the last row on the page, in
/// microseconds since the Unix epoch; the next page holds strictly older
/// rows.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PaginationMeta {
    pub next_cursor: Option<i64>,
    pub has_more: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ListMeta {
    pub pagination: PaginationMeta,
}
