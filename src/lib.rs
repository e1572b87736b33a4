pub mod db;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod moderation;
pub mod names;
pub mod rejections;
pub mod scoring;

use axum::{routing::get, Json, Router};
use serde_json::json;

#[derive(Clone)]
pub struct AppState {
    pub db: db::Db,
    pub filter: moderation::ContentFilter,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(handlers::auth::routes())
        .merge(handlers::comments::routes())
        .merge(handlers::tests::routes())
        .merge(handlers::pages::routes())
        .merge(handlers::categories::routes())
        .merge(handlers::users::routes())
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "OK" }))
}
