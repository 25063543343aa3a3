// ============================
// crates/backend-lib/src/store/mod.rs
// ============================
//! Storage abstraction: records and store traits.
//!
//! The backing engine is treated as an ACID transactional store; every
//! trait method is one transaction. Multi-step mutations that must be
//! atomic (token rotation, cascade delete, batch insert) are therefore
//! single trait methods rather than call sequences.

pub mod memory;

use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use flowtodo_common::{TodoView, UserView};
use uuid::Uuid;

pub use memory::MemoryStore;

/// A persisted user. The hash never leaves the backend.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub password_hash: String,
}

impl From<&UserRecord> for UserView {
    fn from(user: &UserRecord) -> Self {
        UserView {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
        }
    }
}

/// A persisted refresh token. Single-use: any successful refresh or logout
/// removes the row.
#[derive(Debug, Clone)]
pub struct RefreshTokenRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// A persisted todo. `is_deleted` rows stay in storage for audit/sync but
/// are invisible to every read path.
#[derive(Debug, Clone)]
pub struct TodoRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: u8,
    pub is_completed: bool,
    pub is_deleted: bool,
    pub is_synced: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub reminder_at: Option<DateTime<Utc>>,
}

impl From<&TodoRecord> for TodoView {
    fn from(todo: &TodoRecord) -> Self {
        TodoView {
            id: todo.id,
            title: todo.title.clone(),
            description: todo.description.clone(),
            priority: todo.priority,
            is_completed: todo.is_completed,
            is_synced: todo.is_synced,
            created_at: todo.created_at,
            updated_at: todo.updated_at,
            completed_at: todo.completed_at,
            reminder_at: todo.reminder_at,
        }
    }
}

/// Filters and window for one page of a todo listing.
#[derive(Debug, Clone, Default)]
pub struct TodoQuery {
    /// `updated_at` of the last-seen row in microseconds; only strictly
    /// older rows are returned.
    pub cursor: Option<i64>,
    /// Maximum number of rows to fetch (the service passes `limit + 1` to
    /// detect `has_more`).
    pub fetch: usize,
    pub is_completed: Option<bool>,
    pub priority: Option<u8>,
}

/// Trait for user persistence.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user; fails with `DuplicateEmail` when the email is taken
    /// (case-sensitive exact match).
    async fn insert_user(&self, user: UserRecord) -> Result<UserRecord, AppError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, AppError>;

    async fn email_exists(&self, email: &str) -> Result<bool, AppError>;

    /// Delete a user and cascade to their refresh tokens and todos, all in
    /// one transaction. Returns false when no such user exists.
    async fn delete_user(&self, id: Uuid) -> Result<bool, AppError>;
}

/// Trait for the refresh-token ledger.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    async fn insert_refresh_token(
        &self,
        token: RefreshTokenRecord,
    ) -> Result<RefreshTokenRecord, AppError>;

    async fn find_refresh_token(&self, token: &str) -> Result<Option<RefreshTokenRecord>, AppError>;

    /// Idempotent remove-by-value. Returns whether a row was deleted.
    async fn remove_refresh_token(&self, token: &str) -> Result<bool, AppError>;

    /// Atomically delete `old` and insert `new`. Returns `None` when the
    /// old token was already gone, which is how the second of two
    /// concurrent uses of one token loses.
    async fn rotate_refresh_token(
        &self,
        old: &str,
        new: RefreshTokenRecord,
    ) -> Result<Option<RefreshTokenRecord>, AppError>;

    /// Delete every refresh token owned by `user_id`; returns the count.
    async fn remove_refresh_tokens_for_user(&self, user_id: Uuid) -> Result<u64, AppError>;
}

/// Trait for todo persistence.
///
/// Implementations must stamp `updated_at` strictly monotonically across
/// writes so the raw timestamp works as a collision-free pagination cursor.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Insert one todo, returning it with its final `updated_at` stamp.
    async fn insert_todo(&self, todo: TodoRecord) -> Result<TodoRecord, AppError>;

    /// Insert a batch atomically: either every row is durable or none is.
    async fn insert_todos(&self, todos: Vec<TodoRecord>) -> Result<Vec<TodoRecord>, AppError>;

    /// Find a visible (non-deleted) todo owned by `owner_id`.
    async fn find_todo(&self, owner_id: Uuid, id: Uuid) -> Result<Option<TodoRecord>, AppError>;

    /// List visible todos for `owner_id`, newest `updated_at` first,
    /// strictly older than the cursor when one is given.
    async fn list_todos(
        &self,
        owner_id: Uuid,
        query: &TodoQuery,
    ) -> Result<Vec<TodoRecord>, AppError>;

    /// Replace a visible row's mutable fields and re-stamp `updated_at`.
    /// Fails with `NotFound` when the row is absent, soft-deleted, or owned
    /// by someone else.
    async fn update_todo(&self, todo: TodoRecord) -> Result<TodoRecord, AppError>;

    /// Soft-delete one visible todo. Returns false when there was nothing
    /// visible to delete.
    async fn soft_delete_todo(&self, owner_id: Uuid, id: Uuid) -> Result<bool, AppError>;

    /// Soft-delete every visible todo owned by `owner_id`; returns the
    /// count affected.
    async fn soft_delete_all_todos(&self, owner_id: Uuid) -> Result<u64, AppError>;
}

/// Everything `AppState` needs from a storage backend.
pub trait Store: UserStore + RefreshTokenStore + TodoStore {}

impl<T: UserStore + RefreshTokenStore + TodoStore> Store for T {}
