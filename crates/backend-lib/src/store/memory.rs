// ============================
// crates/backend-lib/src/store/memory.rs
// ============================
//! In-memory implementation of the store traits.
//!
//! Every table lives behind a single `RwLock`, so each trait method runs as
//! one critical section. That is the in-memory equivalent of a storage
//! transaction: rotation, cascade delete, and batch insert are atomic, and
//! the second concurrent rotation of one token finds the row already gone.

use super::{RefreshTokenRecord, TodoQuery, TodoRecord, UserRecord};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Timelike, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Database {
    users: HashMap<Uuid, UserRecord>,
    /// Unique index: email -> user id (case-sensitive exact match)
    emails: HashMap<String, Uuid>,
    /// Keyed by token value; `token` is globally unique
    refresh_tokens: HashMap<String, RefreshTokenRecord>,
    todos: HashMap<Uuid, TodoRecord>,
    last_stamp: Option<DateTime<Utc>>,
}

impl Database {
    /// Produce a strictly increasing write stamp, unique at microsecond
    /// resolution since that is what the pagination cursor compares.
    /// The wall clock is truncated to whole microseconds first; comparing
    /// at nanosecond resolution would let two writes in the same
    /// microsecond pass the guard with equal `timestamp_micros`.
    fn next_stamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let now = now
            .with_nanosecond(now.nanosecond() / 1_000 * 1_000)
            .unwrap_or(now);
        let stamp = match self.last_stamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_stamp = Some(stamp);
        stamp
    }
}

/// In-memory transactional store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    db: Arc<RwLock<Database>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look a todo up regardless of its soft-delete flag.
    ///
    /// Storage-level inspection for tests and audit tooling; the service
    /// never reads deleted rows.
    pub async fn find_todo_raw(&self, id: Uuid) -> Option<TodoRecord> {
        let db = self.db.read().await;
        db.todos.get(&id).cloned()
    }
}

#[async_trait]
impl super::UserStore for MemoryStore {
    async fn insert_user(&self, user: UserRecord) -> Result<UserRecord, AppError> {
        let mut db = self.db.write().await;
        if db.emails.contains_key(&user.email) {
            return Err(AppError::DuplicateEmail);
        }
        db.emails.insert(user.email.clone(), user.id);
        db.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError> {
        let db = self.db.read().await;
        Ok(db
            .emails
            .get(email)
            .and_then(|id| db.users.get(id))
            .cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, AppError> {
        let db = self.db.read().await;
        Ok(db.users.get(&id).cloned())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        let db = self.db.read().await;
        Ok(db.emails.contains_key(email))
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, AppError> {
        let mut db = self.db.write().await;
        let Some(user) = db.users.remove(&id) else {
            return Ok(false);
        };
        db.emails.remove(&user.email);
        db.refresh_tokens.retain(|_, t| t.user_id != id);
        db.todos.retain(|_, t| t.owner_id != id);
        Ok(true)
    }
}

#[async_trait]
impl super::RefreshTokenStore for MemoryStore {
    async fn insert_refresh_token(
        &self,
        token: RefreshTokenRecord,
    ) -> Result<RefreshTokenRecord, AppError> {
        let mut db = self.db.write().await;
        db.refresh_tokens.insert(token.token.clone(), token.clone());
        Ok(token)
    }

    async fn find_refresh_token(
        &self,
        token: &str,
    ) -> Result<Option<RefreshTokenRecord>, AppError> {
        let db = self.db.read().await;
        Ok(db.refresh_tokens.get(token).cloned())
    }

    async fn remove_refresh_token(&self, token: &str) -> Result<bool, AppError> {
        let mut db = self.db.write().await;
        Ok(db.refresh_tokens.remove(token).is_some())
    }

    async fn rotate_refresh_token(
        &self,
        old: &str,
        new: RefreshTokenRecord,
    ) -> Result<Option<RefreshTokenRecord>, AppError> {
        let mut db = self.db.write().await;
        if db.refresh_tokens.remove(old).is_none() {
            // Already rotated out, revoked, or never existed.
            return Ok(None);
        }
        db.refresh_tokens.insert(new.token.clone(), new.clone());
        Ok(Some(new))
    }

    async fn remove_refresh_tokens_for_user(&self, user_id: Uuid) -> Result<u64, AppError> {
        let mut db = self.db.write().await;
        let before = db.refresh_tokens.len();
        db.refresh_tokens.retain(|_, t| t.user_id != user_id);
        Ok((before - db.refresh_tokens.len()) as u64)
    }
}

#[async_trait]
impl super::TodoStore for MemoryStore {
    async fn insert_todo(&self, mut todo: TodoRecord) -> Result<TodoRecord, AppError> {
        let mut db = self.db.write().await;
        let stamp = db.next_stamp();
        todo.created_at = stamp;
        todo.updated_at = stamp;
        db.todos.insert(todo.id, todo.clone());
        Ok(todo)
    }

    async fn insert_todos(&self, todos: Vec<TodoRecord>) -> Result<Vec<TodoRecord>, AppError> {
        let mut db = self.db.write().await;
        let mut inserted = Vec::with_capacity(todos.len());
        for mut todo in todos {
            let stamp = db.next_stamp();
            todo.created_at = stamp;
            todo.updated_at = stamp;
            db.todos.insert(todo.id, todo.clone());
            inserted.push(todo);
        }
        Ok(inserted)
    }

    async fn find_todo(&self, owner_id: Uuid, id: Uuid) -> Result<Option<TodoRecord>, AppError> {
        let db = self.db.read().await;
        Ok(db
            .todos
            .get(&id)
            .filter(|t| t.owner_id == owner_id && !t.is_deleted)
            .cloned())
    }

    async fn list_todos(
        &self,
        owner_id: Uuid,
        query: &TodoQuery,
    ) -> Result<Vec<TodoRecord>, AppError> {
        let db = self.db.read().await;
        let mut rows: Vec<TodoRecord> = db
            .todos
            .values()
            .filter(|t| t.owner_id == owner_id && !t.is_deleted)
            .filter(|t| query.is_completed.is_none_or(|c| t.is_completed == c))
            .filter(|t| query.priority.is_none_or(|p| t.priority == p))
            .filter(|t| {
                query
                    .cursor
                    .is_none_or(|c| t.updated_at.timestamp_micros() < c)
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        rows.truncate(query.fetch);
        Ok(rows)
    }

    async fn update_todo(&self, todo: TodoRecord) -> Result<TodoRecord, AppError> {
        let mut db = self.db.write().await;
        let stamp = db.next_stamp();
        let row = db
            .todos
            .get_mut(&todo.id)
            .filter(|t| t.owner_id == todo.owner_id && !t.is_deleted)
            .ok_or_else(|| AppError::NotFound("todo".to_string()))?;
        row.title = todo.title;
        row.description = todo.description;
        row.priority = todo.priority;
        row.is_completed = todo.is_completed;
        row.is_synced = todo.is_synced;
        row.completed_at = todo.completed_at;
        row.reminder_at = todo.reminder_at;
        row.updated_at = stamp;
        Ok(row.clone())
    }

    async fn soft_delete_todo(&self, owner_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut db = self.db.write().await;
        let stamp = db.next_stamp();
        match db
            .todos
            .get_mut(&id)
            .filter(|t| t.owner_id == owner_id && !t.is_deleted)
        {
            Some(row) => {
                row.is_deleted = true;
                row.updated_at = stamp;
                Ok(true)
            },
            None => Ok(false),
        }
    }

    async fn soft_delete_all_todos(&self, owner_id: Uuid) -> Result<u64, AppError> {
        let mut db = self.db.write().await;
        let stamp = db.next_stamp();
        let mut count = 0;
        for row in db
            .todos
            .values_mut()
            .filter(|t| t.owner_id == owner_id && !t.is_deleted)
        {
            row.is_deleted = true;
            row.updated_at = stamp;
            count += 1;
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{RefreshTokenStore, TodoStore, UserStore};

    fn user(email: &str) -> UserRecord {
        UserRecord {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: None,
            password_hash: "hash".to_string(),
        }
    }

    fn refresh_token(user_id: Uuid, value: &str) -> RefreshTokenRecord {
        let now = Utc::now();
        RefreshTokenRecord {
            id: Uuid::new_v4(),
            user_id,
            token: value.to_string(),
            user_agent: None,
            created_at: now,
            expires_at: now + Duration::days(7),
        }
    }

    fn todo(owner_id: Uuid, title: &str) -> TodoRecord {
        let now = Utc::now();
        TodoRecord {
            id: Uuid::new_v4(),
            owner_id,
            title: title.to_string(),
            description: None,
            priority: 0,
            is_completed: false,
            is_deleted: false,
            is_synced: false,
            created_at: now,
            updated_at: now,
            completed_at: None,
            reminder_at: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryStore::new();
        store.insert_user(user("a@x.com")).await.unwrap();
        assert!(matches!(
            store.insert_user(user("a@x.com")).await,
            Err(AppError::DuplicateEmail)
        ));
        // Case-sensitive: a different casing is a different email.
        assert!(store.insert_user(user("A@x.com")).await.is_ok());
    }

    #[tokio::test]
    async fn test_rotate_is_single_use() {
        let store = MemoryStore::new();
        let uid = Uuid::new_v4();
        store
            .insert_refresh_token(refresh_token(uid, "old"))
            .await
            .unwrap();

        let rotated = store
            .rotate_refresh_token("old", refresh_token(uid, "new"))
            .await
            .unwrap();
        assert!(rotated.is_some());
        assert!(store.find_refresh_token("old").await.unwrap().is_none());
        assert!(store.find_refresh_token("new").await.unwrap().is_some());

        // Second use of the rotated-out token loses.
        let replayed = store
            .rotate_refresh_token("old", refresh_token(uid, "newer"))
            .await
            .unwrap();
        assert!(replayed.is_none());
        assert!(store.find_refresh_token("newer").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_refresh_token_idempotent() {
        let store = MemoryStore::new();
        let uid = Uuid::new_v4();
        store
            .insert_refresh_token(refresh_token(uid, "t"))
            .await
            .unwrap();
        assert!(store.remove_refresh_token("t").await.unwrap());
        assert!(!store.remove_refresh_token("t").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_user_cascades() {
        let store = MemoryStore::new();
        let u = store.insert_user(user("a@x.com")).await.unwrap();
        store
            .insert_refresh_token(refresh_token(u.id, "t1"))
            .await
            .unwrap();
        let t = store.insert_todo(todo(u.id, "buy milk")).await.unwrap();

        assert!(store.delete_user(u.id).await.unwrap());
        assert!(store.find_user_by_email("a@x.com").await.unwrap().is_none());
        assert!(store.find_refresh_token("t1").await.unwrap().is_none());
        assert!(store.find_todo_raw(t.id).await.is_none());

        // Email is free again after deletion.
        assert!(store.insert_user(user("a@x.com")).await.is_ok());
        // Second delete is a no-op.
        assert!(!store.delete_user(u.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_write_stamps_strictly_increase() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let mut stamps = Vec::new();
        for i in 0..50 {
            let t = store
                .insert_todo(todo(owner, &format!("todo {i}")))
                .await
                .unwrap();
            stamps.push(t.updated_at);
        }
        for pair in stamps.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[tokio::test]
    async fn test_write_stamps_unique_at_cursor_resolution() {
        // The cursor compares truncated microseconds, so stamps must stay
        // unique after truncation even when inserts land back-to-back,
        // faster than the clock ticks over.
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let mut micros = std::collections::HashSet::new();
        for i in 0..2_000 {
            let t = store
                .insert_todo(todo(owner, &format!("todo {i}")))
                .await
                .unwrap();
            assert!(
                micros.insert(t.updated_at.timestamp_micros()),
                "duplicate microsecond stamp at insert {i}"
            );
        }
    }

    #[tokio::test]
    async fn test_soft_delete_keeps_row() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let t = store.insert_todo(todo(owner, "buy milk")).await.unwrap();

        assert!(store.soft_delete_todo(owner, t.id).await.unwrap());
        assert!(store.find_todo(owner, t.id).await.unwrap().is_none());
        let raw = store.find_todo_raw(t.id).await.unwrap();
        assert!(raw.is_deleted);

        // Already-deleted rows are invisible to a second delete.
        assert!(!store.soft_delete_todo(owner, t.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_enforces_ownership_and_visibility() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let t = store.insert_todo(todo(owner, "buy milk")).await.unwrap();

        let mut stolen = t.clone();
        stolen.owner_id = Uuid::new_v4();
        stolen.title = "stolen".to_string();
        assert!(matches!(
            store.update_todo(stolen).await,
            Err(AppError::NotFound(_))
        ));

        store.soft_delete_todo(owner, t.id).await.unwrap();
        assert!(matches!(
            store.update_todo(t).await,
            Err(AppError::NotFound(_))
        ));
    }
}
