use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;

use crate::{
    rejections::{AppError, ResultExt},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list))
        .route("/categories/{id}", get(get_one))
}

async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let categories = state
        .db
        .list_categories()
        .await
        .reject("could not list categories")?;

    Ok(Json(json!({ "categories": categories })))
}

async fn get_one(
    State(state): State<AppState>,
    Path(category_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let (category, pages) = state
        .db
        .get_category(category_id)
        .await
        .reject("could not load category")?
        .ok_or(AppError::NotFound("Category not found"))?;

    Ok(Json(json!({
        "id": category.id,
        "name": category.name,
        "pageCount": category.page_count,
        "pages": pages,
    })))
}
