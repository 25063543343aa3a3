// ============================
// crates/backend-lib/src/todos/mod.rs
// ============================
//! Todo service: CRUD, cursor pagination, bulk creation, soft delete.
//!
//! Every read and write is owner-scoped. A todo that is missing,
//! soft-deleted, or owned by someone else surfaces as the same `NotFound`,
//! so existence cannot be probed across accounts.

use crate::config::PaginationSettings;
use crate::error::AppError;
use crate::metrics as keys;
use crate::store::{TodoQuery, TodoRecord, TodoStore};
use crate::validation;
use chrono::Utc;
use flowtodo_common::{BulkCreateResponse, BulkFailure, NewTodo, PaginationMeta, TodoPatch, TodoView};
use metrics::{counter, histogram};
use std::sync::Arc;
use uuid::Uuid;

/// Listing parameters as they arrive from the query string.
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub cursor: Option<i64>,
    pub limit: Option<usize>,
    pub is_completed: Option<bool>,
    pub priority: Option<u8>,
}

/// Owner-scoped todo operations over a [`TodoStore`].
pub struct TodoService<S> {
    store: Arc<S>,
    pagination: PaginationSettings,
}

impl<S> Clone for TodoService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            pagination: self.pagination.clone(),
        }
    }
}

impl<S: TodoStore> TodoService<S> {
    pub fn new(store: Arc<S>, pagination: PaginationSettings) -> Self {
        Self { store, pagination }
    }

    /// List visible todos, newest `updated_at` first.
    ///
    /// Out-of-range limits are clamped into `1..=max_limit`. One extra row
    /// is fetched to detect `has_more` without a second query; the cursor
    /// is emitted only when more rows exist.
    pub async fn list(
        &self,
        owner: Uuid,
        params: ListParams,
    ) -> Result<(Vec<TodoView>, PaginationMeta), AppError> {
        if let Some(priority) = params.priority {
            validation::validate_priority(priority)?;
        }
        let limit = params
            .limit
            .unwrap_or(self.pagination.default_limit)
            .clamp(1, self.pagination.max_limit);

        let query = TodoQuery {
            cursor: params.cursor,
            fetch: limit + 1,
            is_completed: params.is_completed,
            priority: params.priority,
        };
        let mut rows = self.store.list_todos(owner, &query).await?;

        let has_more = rows.len() > limit;
        rows.truncate(limit);
        let next_cursor = if has_more {
            rows.last().map(|t| t.updated_at.timestamp_micros())
        } else {
            None
        };

        let data = rows.iter().map(TodoView::from).collect();
        Ok((data, PaginationMeta { next_cursor, has_more }))
    }

    /// Fetch one visible todo.
    pub async fn get(&self, owner: Uuid, id: Uuid) -> Result<TodoView, AppError> {
        self.store
            .find_todo(owner, id)
            .await?
            .map(|t| TodoView::from(&t))
            .ok_or_else(|| AppError::NotFound("todo".to_string()))
    }

    /// Create one todo.
    pub async fn create(&self, owner: Uuid, fields: NewTodo) -> Result<TodoView, AppError> {
        validate_fields(&fields)?;
        let record = self.store.insert_todo(build_record(owner, fields)).await?;
        counter!(keys::TODO_CREATED).increment(1);
        Ok(TodoView::from(&record))
    }

    /// Create a batch of todos with per-item failure isolation.
    ///
    /// Lenient mode: items that fail validation are reported as
    /// `{index, error}` and skipped; every valid item is committed together
    /// in one atomic batch.
    pub async fn bulk_create(
        &self,
        owner: Uuid,
        items: Vec<NewTodo>,
    ) -> Result<BulkCreateResponse, AppError> {
        histogram!(keys::TODO_BULK_SIZE).record(items.len() as f64);

        let mut records = Vec::new();
        let mut failed = Vec::new();
        for (index, fields) in items.into_iter().enumerate() {
            match validate_fields(&fields) {
                Ok(()) => records.push(build_record(owner, fields)),
                Err(err) => failed.push(BulkFailure {
                    index,
                    error: err.sanitized_message(),
                }),
            }
        }

        let inserted = self.store.insert_todos(records).await?;
        counter!(keys::TODO_CREATED).increment(inserted.len() as u64);

        let created: Vec<TodoView> = inserted.iter().map(TodoView::from).collect();
        Ok(BulkCreateResponse {
            created_count: created.len(),
            failed_count: failed.len(),
            created,
            failed,
        })
    }

    /// Replace every mutable field of a todo.
    pub async fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        fields: NewTodo,
    ) -> Result<TodoView, AppError> {
        validate_fields(&fields)?;
        let mut record = build_record(owner, fields);
        record.id = id;
        let updated = self.store.update_todo(record).await?;
        counter!(keys::TODO_UPDATED).increment(1);
        Ok(TodoView::from(&updated))
    }

    /// Apply a partial update: only fields present in the request change.
    pub async fn patch(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: TodoPatch,
    ) -> Result<TodoView, AppError> {
        let mut record = self
            .store
            .find_todo(owner, id)
            .await?
            .ok_or_else(|| AppError::NotFound("todo".to_string()))?;
        apply_patch(&mut record, patch)?;

        validation::validate_title(&record.title)?;
        validation::validate_description(record.description.as_deref())?;
        validation::validate_priority(record.priority)?;

        let updated = self.store.update_todo(record).await?;
        counter!(keys::TODO_UPDATED).increment(1);
        Ok(TodoView::from(&updated))
    }

    /// Soft-delete one todo. The row stays in storage for audit/sync but
    /// disappears from every read.
    pub async fn delete(&self, owner: Uuid, id: Uuid) -> Result<(), AppError> {
        if !self.store.soft_delete_todo(owner, id).await? {
            return Err(AppError::NotFound("todo".to_string()));
        }
        counter!(keys::TODO_DELETED).increment(1);
        Ok(())
    }

    /// Soft-delete every visible todo the owner has; returns the count.
    pub async fn delete_all(&self, owner: Uuid) -> Result<u64, AppError> {
        let count = self.store.soft_delete_all_todos(owner).await?;
        counter!(keys::TODO_DELETED).increment(count);
        tracing::info!(owner_id = %owner, count, "bulk soft-delete");
        Ok(count)
    }
}

fn validate_fields(fields: &NewTodo) -> Result<(), AppError> {
    validation::validate_title(&fields.title)?;
    validation::validate_description(fields.description.as_deref())?;
    validation::validate_priority(fields.priority)?;
    Ok(())
}

fn build_record(owner: Uuid, fields: NewTodo) -> TodoRecord {
    let now = Utc::now();
    TodoRecord {
        id: Uuid::new_v4(),
        owner_id: owner,
        title: fields.title,
        description: fields.description,
        priority: fields.priority,
        is_completed: fields.is_completed,
        is_deleted: false,
        is_synced: fields.is_synced,
        created_at: now,
        updated_at: now,
        completed_at: fields.completed_at,
        reminder_at: fields.reminder_at,
    }
}

/// Explicit per-field merge of a patch into a record.
///
/// Absent fields are untouched. An explicit `null` clears nullable fields
/// and is rejected for required ones.
fn apply_patch(record: &mut TodoRecord, patch: TodoPatch) -> Result<(), AppError> {
    if let Some(title) = patch.title {
        record.title = title.ok_or_else(|| null_field("title"))?;
    }
    if let Some(description) = patch.description {
        record.description = description;
    }
    if let Some(priority) = patch.priority {
        record.priority = priority.ok_or_else(|| null_field("priority"))?;
    }
    if let Some(is_completed) = patch.is_completed {
        record.is_completed = is_completed.ok_or_else(|| null_field("is_completed"))?;
    }
    if let Some(is_synced) = patch.is_synced {
        record.is_synced = is_synced.ok_or_else(|| null_field("is_synced"))?;
    }
    if let Some(completed_at) = patch.completed_at {
        record.completed_at = completed_at;
    }
    if let Some(reminder_at) = patch.reminder_at {
        record.reminder_at = reminder_at;
    }
    Ok(())
}

fn null_field(field: &str) -> AppError {
    AppError::Validation(format!("{field} cannot be null"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> TodoRecord {
        build_record(
            Uuid::new_v4(),
            NewTodo {
                title: "buy milk".to_string(),
                description: Some("two litres".to_string()),
                priority: 1,
                ..NewTodo::default()
            },
        )
    }

    #[test]
    fn test_apply_patch_absent_fields_untouched() {
        let mut rec = record();
        apply_patch(&mut rec, TodoPatch::default()).unwrap();
        assert_eq!(rec.title, "buy milk");
        assert_eq!(rec.description.as_deref(), Some("two litres"));
        assert_eq!(rec.priority, 1);
    }

    #[test]
    fn test_apply_patch_null_clears_nullable() {
        let mut rec = record();
        let patch = TodoPatch {
            description: Some(None),
            ..TodoPatch::default()
        };
        apply_patch(&mut rec, patch).unwrap();
        assert!(rec.description.is_none());
    }

    #[test]
    fn test_apply_patch_null_rejected_for_required() {
        let mut rec = record();
        let patch = TodoPatch {
            title: Some(None),
            ..TodoPatch::default()
        };
        assert!(matches!(
            apply_patch(&mut rec, patch),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_apply_patch_sets_values() {
        let mut rec = record();
        let patch = TodoPatch {
            title: Some(Some("buy bread".to_string())),
            is_completed: Some(Some(true)),
            priority: Some(Some(3)),
            ..TodoPatch::default()
        };
        apply_patch(&mut rec, patch).unwrap();
        assert_eq!(rec.title, "buy bread");
        assert!(rec.is_completed);
        assert_eq!(rec.priority, 3);
    }
}
