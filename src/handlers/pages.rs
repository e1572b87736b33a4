use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    db::models::PageRef,
    extractors::AuthGuard,
    models::PageBody,
    names,
    rejections::{AppError, FieldError, ResultExt},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pages", get(list).post(create))
        .route("/pages/by-comments", get(by_comments))
        .route("/pages/{id}", get(get_one).put(update).delete(remove))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    #[serde(default)]
    page: Option<i64>,
    #[serde(default)]
    limit: Option<i64>,
    #[serde(default)]
    category_id: Option<i64>,
    #[serde(default)]
    search: Option<String>,
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = query.page.unwrap_or(names::DEFAULT_PAGE_NUMBER).max(1);
    let limit = query.limit.unwrap_or(names::DEFAULT_PAGE_LIMIT).max(1);
    let search = query.search.as_deref().filter(|s| !s.trim().is_empty());

    let (pages, total) = state
        .db
        .list_pages((page - 1) * limit, limit, query.category_id, search)
        .await
        .reject("could not list pages")?;

    Ok(Json(json!({
        "pages": pages,
        "pagination": {
            "page": page,
            "limit": limit,
            "total": total,
            "pages": (total as u64).div_ceil(limit as u64),
        },
    })))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PageWithCommentCount {
    #[serde(flatten)]
    page: PageRef,
    comment_count: i64,
}

/// Pages ranked by comment volume, for the moderation panel's filter.
async fn by_comments(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let pages = state
        .db
        .pages_by_comment_count(names::BY_COMMENTS_LIMIT)
        .await
        .reject("could not rank pages")?;

    let pages: Vec<PageWithCommentCount> = pages
        .into_iter()
        .map(|(page, comment_count)| PageWithCommentCount {
            page,
            comment_count,
        })
        .collect();

    Ok(Json(json!({ "pages": pages })))
}

async fn get_one(
    State(state): State<AppState>,
    Path(page_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let page = state
        .db
        .get_page(page_id)
        .await
        .reject("could not load page")?
        .ok_or(AppError::NotFound("Page not found"))?;

    Ok(Json(page))
}

fn validate(body: &PageBody) -> Result<(), AppError> {
    let mut errors = Vec::new();
    if body.title.trim().is_empty() {
        errors.push(FieldError {
            field: "title",
            message: "Title is required",
        });
    }
    if body.content.trim().chars().count() < names::MIN_PAGE_CONTENT_LEN {
        errors.push(FieldError {
            field: "content",
            message: "Content must be at least 10 characters",
        });
    }
    if body.image_path.trim().is_empty() {
        errors.push(FieldError {
            field: "imagePath",
            message: "Image path is required",
        });
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

async fn create(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    Json(body): Json<PageBody>,
) -> Result<impl IntoResponse, AppError> {
    if !user.role.is_admin() {
        return Err(AppError::Forbidden);
    }
    validate(&body)?;

    if !state
        .db
        .category_exists(body.category_id)
        .await
        .reject("could not check category")?
    {
        return Err(AppError::BadRequest("Category not found"));
    }

    let page = state
        .db
        .create_page(
            body.title.trim(),
            body.content.trim(),
            body.image_path.trim(),
            body.category_id,
            user.id,
        )
        .await
        .reject("could not create page")?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Page created successfully",
            "page": page,
        })),
    ))
}

async fn update(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    Path(page_id): Path<i64>,
    Json(body): Json<PageBody>,
) -> Result<impl IntoResponse, AppError> {
    if !user.role.is_admin() {
        return Err(AppError::Forbidden);
    }
    validate(&body)?;

    if !state
        .db
        .category_exists(body.category_id)
        .await
        .reject("could not check category")?
    {
        return Err(AppError::BadRequest("Category not found"));
    }

    let page = state
        .db
        .update_page(
            page_id,
            body.title.trim(),
            body.content.trim(),
            body.image_path.trim(),
            body.category_id,
        )
        .await
        .reject("could not update page")?
        .ok_or(AppError::NotFound("Page not found"))?;

    Ok(Json(json!({
        "message": "Page updated successfully",
        "page": page,
    })))
}

async fn remove(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    Path(page_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !user.role.is_admin() {
        return Err(AppError::Forbidden);
    }

    let deleted = state
        .db
        .delete_page(page_id)
        .await
        .reject("could not delete page")?;
    if !deleted {
        return Err(AppError::NotFound("Page not found"));
    }

    Ok(Json(json!({ "message": "Page deleted successfully" })))
}
