// crates/backend-lib/tests/http_api.rs
//! End-to-end tests driving the router over in-process HTTP.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::DateTime;
use flowtodo_backend::config::Settings;
use flowtodo_backend::store::MemoryStore;
use flowtodo_backend::{api, AppState};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    let state = Arc::new(AppState::new(MemoryStore::new(), Settings::default()));
    api::create_router(state)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register_and_login(app: &Router, email: &str) -> String {
    let (status, _) = send(
        app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({"email": email, "password": "p1"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({"email": email, "password": "p1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["access_token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_public() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn example_scenario_end_to_end() {
    let app = app();

    // register -> 201
    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({"email": "a@x.com", "password": "p1"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["email"], "a@x.com");
    assert!(body["data"].get("password_hash").is_none());

    // login -> 200 with tokens
    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({"email": "a@x.com", "password": "p1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["token_type"], "bearer");
    let token = body["data"]["access_token"].as_str().unwrap().to_string();

    // create todo -> 201 with generated id and is_completed=false
    let (status, body) = send(
        &app,
        Method::POST,
        "/todos",
        Some(&token),
        Some(json!({"title": "buy milk"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["is_completed"], false);
    let id = body["data"]["id"].as_str().unwrap().to_string();
    let created_at = DateTime::parse_from_rfc3339(body["data"]["created_at"].as_str().unwrap())
        .unwrap();

    // patch -> 200 reflecting the change with a later updated_at
    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/todos/{id}"),
        Some(&token),
        Some(json!({"is_completed": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_completed"], true);
    let updated_at = DateTime::parse_from_rfc3339(body["data"]["updated_at"].as_str().unwrap())
        .unwrap();
    assert!(updated_at > created_at);

    // delete -> 200
    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/todos/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // get same id -> 404
    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/todos/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error_code"], "NOT_FOUND");
}

#[tokio::test]
async fn protected_routes_require_a_bearer_token() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/todos", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_code"], "UNAUTHORIZED");

    let (status, body) = send(&app, Method::GET, "/users/me", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = app();
    register_and_login(&app, "a@x.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({"email": "a@x.com", "password": "p2"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error_code"], "EMAIL_ALREADY_EXISTS");
}

#[tokio::test]
async fn check_email_endpoint() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/check-email",
        None,
        Some(json!({"email": "a@x.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["exists"], false);

    register_and_login(&app, "a@x.com").await;

    let (_, body) = send(
        &app,
        Method::POST,
        "/auth/check-email",
        None,
        Some(json!({"email": "a@x.com"})),
    )
    .await;
    assert_eq!(body["data"]["exists"], true);
}

#[tokio::test]
async fn refresh_rotation_over_http() {
    let app = app();
    let (_, body) = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({"email": "a@x.com", "password": "p1"})),
    )
    .await;
    assert_eq!(body["success"], true);
    let (_, body) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({"email": "a@x.com", "password": "p1"})),
    )
    .await;
    let refresh_token = body["data"]["refresh_token"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/refresh",
        None,
        Some(json!({"refresh_token": refresh_token})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(body["data"]["refresh_token"], refresh_token);

    // Replaying the rotated-out token fails.
    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/refresh",
        None,
        Some(json!({"refresh_token": refresh_token})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn logout_all_reports_device_count() {
    let app = app();
    let token = register_and_login(&app, "a@x.com").await;
    // A second login opens a second session.
    let (_, _) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({"email": "a@x.com", "password": "p1"})),
    )
    .await;

    let (status, body) = send(&app, Method::POST, "/auth/logout-all", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["devices_logged_out"], 2);
}

#[tokio::test]
async fn bulk_create_reports_failures_by_index() {
    let app = app();
    let token = register_and_login(&app, "a@x.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/todos/bulk/create",
        Some(&token),
        Some(json!({"todos": [
            {"title": "one"},
            {"title": "two"},
            {"title": ""},
            {"title": "three"}
        ]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["created_count"], 3);
    assert_eq!(body["data"]["failed_count"], 1);
    assert_eq!(body["data"]["failed"][0]["index"], 2);
}

#[tokio::test]
async fn list_carries_pagination_meta() {
    let app = app();
    let token = register_and_login(&app, "a@x.com").await;

    for i in 0..3 {
        let (status, _) = send(
            &app,
            Method::POST,
            "/todos",
            Some(&token),
            Some(json!({"title": format!("todo {i}")})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, Method::GET, "/todos?limit=2", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["meta"]["pagination"]["has_more"], true);
    let cursor = body["meta"]["pagination"]["next_cursor"].as_i64().unwrap();

    let (_, body) = send(
        &app,
        Method::GET,
        &format!("/todos?limit=2&cursor={cursor}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["meta"]["pagination"]["has_more"], false);
    assert!(body["meta"]["pagination"]["next_cursor"].is_null());
}

#[tokio::test]
async fn account_deletion_cascades() {
    let app = app();
    let token = register_and_login(&app, "a@x.com").await;
    send(
        &app,
        Method::POST,
        "/todos",
        Some(&token),
        Some(json!({"title": "buy milk"})),
    )
    .await;

    let (status, body) = send(&app, Method::GET, "/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "a@x.com");

    let (status, _) = send(&app, Method::DELETE, "/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    // The access token is still signed and unexpired, but the subject is gone.
    let (status, body) = send(&app, Method::GET, "/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_code"], "USER_NOT_FOUND");

    // The email is free for registration again.
    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({"email": "a@x.com", "password": "p1"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}
