#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use chronica::db::models::Role;
use chronica::db::Db;
use chronica::moderation::ContentFilter;
use chronica::AppState;

pub async fn create_test_db() -> Db {
    use std::sync::atomic::{AtomicU32, Ordering};
    static COUNTER: AtomicU32 = AtomicU32::new(0);
    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    let path =
        std::env::temp_dir().join(format!("chronica_test_{}_{}.db", std::process::id(), id));
    // Clean up leftover files from previous runs
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
    }
    let url = format!("sqlite://{}", path.display());
    Db::new(&url).await.expect("failed to create test database")
}

pub async fn app() -> (Router, Db) {
    let db = create_test_db().await;
    let router = chronica::router(AppState {
        db: db.clone(),
        filter: ContentFilter::default(),
    });
    (router, db)
}

pub fn request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("request should build"),
        None => builder.body(Body::empty()).expect("request should build"),
    }
}

/// Fire a request at the router and return status plus parsed JSON body
/// (Null for empty or non-JSON bodies).
pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app
        .clone()
        .oneshot(req)
        .await
        .expect("router should respond");
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body should read");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

/// Register a fresh user and return (id, bearer token).
pub async fn register(app: &Router, name: &str, email: &str) -> (i64, String) {
    let (status, body) = send(
        app,
        request(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({ "name": name, "email": email, "password": "correct-horse" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "registration failed: {body}");
    (
        body["user"]["id"].as_i64().expect("user id"),
        body["token"].as_str().expect("token").to_owned(),
    )
}

/// Register and promote in one step; roles have no HTTP surface.
pub async fn register_with_role(
    app: &Router,
    db: &Db,
    name: &str,
    email: &str,
    role: Role,
) -> (i64, String) {
    let (user_id, token) = register(app, name, email).await;
    db.set_user_role(user_id, role)
        .await
        .expect("role change should succeed");
    (user_id, token)
}

pub async fn first_category_id(app: &Router) -> i64 {
    let (status, body) = send(app, request(Method::GET, "/categories", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    body["categories"][0]["id"].as_i64().expect("category id")
}

/// Create a page as the given admin and return its id.
pub async fn create_page(app: &Router, admin_token: &str, title: &str) -> i64 {
    let category_id = first_category_id(app).await;
    let (status, body) = send(
        app,
        request(
            Method::POST,
            "/pages",
            Some(admin_token),
            Some(json!({
                "title": title,
                "content": "Достаточно длинное содержание страницы.",
                "categoryId": category_id,
                "imagePath": "/uploads/page.jpg",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "page creation failed: {body}");
    body["page"]["id"].as_i64().expect("page id")
}

/// Create a comment and return (status, flagged, comment id).
pub async fn post_comment(
    app: &Router,
    token: &str,
    page_id: i64,
    text: &str,
    parent_id: Option<i64>,
) -> (StatusCode, Value) {
    let mut body = json!({ "text": text, "pageId": page_id });
    if let Some(parent_id) = parent_id {
        body["parentId"] = json!(parent_id);
    }
    send(app, request(Method::POST, "/comments", Some(token), Some(body))).await
}
