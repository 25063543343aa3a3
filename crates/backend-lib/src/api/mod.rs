// ============================
// crates/backend-lib/src/api/mod.rs
// ============================
//! HTTP surface: router, handlers, auth extractor, response envelope.

pub mod auth;
pub mod extract;
pub mod response;
pub mod todos;
pub mod users;

use crate::store::Store;
use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use extract::AuthUser;

/// Build the application router.
pub fn create_router<S: Store + 'static>(state: Arc<AppState<S>>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register::<S>))
        .route("/auth/check-email", post(auth::check_email::<S>))
        .route("/auth/login", post(auth::login::<S>))
        .route("/auth/refresh", post(auth::refresh::<S>))
        .route("/auth/logout", post(auth::logout::<S>))
        .route("/auth/logout-all", post(auth::logout_all::<S>))
        .route(
            "/todos",
            get(todos::list_todos::<S>)
                .post(todos::create_todo::<S>)
                .delete(todos::delete_all_todos::<S>),
        )
        .route(
            "/todos/{id}",
            get(todos::get_todo::<S>)
                .put(todos::update_todo::<S>)
                .patch(todos::patch_todo::<S>)
                .delete(todos::delete_todo::<S>),
        )
        .route("/todos/bulk/create", post(todos::bulk_create_todos::<S>))
        .route(
            "/users/me",
            get(users::me::<S>).delete(users::delete_me::<S>),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Liveness probe.
async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}
