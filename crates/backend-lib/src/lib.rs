// ============================
// crates/backend-lib/src/lib.rs
// ============================
//! Core backend functionality for the Flow Todo API: session/credential
//! lifecycle, todo resource protocol, and the HTTP surface over them.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod metrics;
pub mod store;
pub mod todos;
pub mod validation;

use crate::auth::SessionManager;
use crate::config::Settings;
use crate::store::Store;
use crate::todos::TodoService;
use std::sync::Arc;

/// Application state shared across all handlers.
pub struct AppState<S> {
    /// Session and credential lifecycle
    pub sessions: SessionManager<S>,
    /// Owner-scoped todo operations
    pub todos: TodoService<S>,
    /// Immutable settings
    pub settings: Arc<Settings>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            sessions: self.sessions.clone(),
            todos: self.todos.clone(),
            settings: Arc::clone(&self.settings),
        }
    }
}

impl<S: Store> AppState<S> {
    /// Create application state over a storage backend.
    pub fn new(store: S, settings: Settings) -> Self {
        let store = Arc::new(store);
        let sessions = SessionManager::new(Arc::clone(&store), &settings);
        let todos = TodoService::new(store, settings.pagination.clone());
        Self {
            sessions,
            todos,
            settings: Arc::new(settings),
        }
    }
}
