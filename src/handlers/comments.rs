use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    extractors::{AuthGuard, MaybeAuth},
    models::CreateCommentBody,
    names,
    rejections::{AppError, FieldError, ResultExt},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/comments", post(create))
        .route("/comments/page/{page_id}", get(list_for_page))
        .route("/comments/all", get(list_all))
        .route("/comments/{id}/approve", patch(approve))
        .route("/comments/{id}", delete(remove))
}

/// Classify-and-create: scan the text against the banned-word lists, then
/// persist the comment with the resulting flag. The response carries the
/// flag explicitly so the client can show a "pending moderation" notice.
async fn create(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    Json(body): Json<CreateCommentBody>,
) -> Result<impl IntoResponse, AppError> {
    let text = body.text.trim();
    let length = text.chars().count();
    if length < names::COMMENT_MIN_LEN || length > names::COMMENT_MAX_LEN {
        return Err(AppError::Validation(vec![FieldError {
            field: "text",
            message: "Comment must be between 1 and 1000 characters",
        }]));
    }

    if !state
        .db
        .page_exists(body.page_id)
        .await
        .reject("could not check page")?
    {
        return Err(AppError::NotFound("Page not found"));
    }

    if let Some(parent_id) = body.parent_id {
        let parent = state
            .db
            .get_comment(parent_id)
            .await
            .reject("could not check parent comment")?
            .ok_or(AppError::NotFound("Parent comment not found"))?;

        if parent.page_id != body.page_id {
            return Err(AppError::Validation(vec![FieldError {
                field: "parentId",
                message: "Parent comment belongs to another page",
            }]));
        }
    }

    let flagged = state.filter.requires_review(text);

    let comment = state
        .db
        .create_comment(text, body.page_id, user.id, body.parent_id, flagged)
        .await
        .reject("could not create comment")?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Comment created successfully",
            "flagged": flagged,
            "comment": comment,
        })),
    ))
}

/// Threaded view for a page: top-level newest-first, replies in reading
/// order. Moderators see everything; everyone else only what has cleared
/// moderation.
async fn list_for_page(
    MaybeAuth(user): MaybeAuth,
    State(state): State<AppState>,
    Path(page_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let include_flagged = user.is_some_and(|u| u.role.can_moderate());

    let comments = state
        .db
        .comments_for_page(page_id, include_flagged)
        .await
        .reject("could not list comments")?;

    Ok(Json(json!({ "comments": comments })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListAllQuery {
    #[serde(default)]
    page_id: Option<i64>,
    #[serde(default)]
    flagged_only: Option<bool>,
}

/// Flat moderation-panel listing across pages.
async fn list_all(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    Query(query): Query<ListAllQuery>,
) -> Result<impl IntoResponse, AppError> {
    if !user.role.can_moderate() {
        return Err(AppError::Forbidden);
    }

    let comments = state
        .db
        .all_comments(query.page_id, query.flagged_only.unwrap_or(false))
        .await
        .reject("could not list comments")?;

    Ok(Json(json!({ "comments": comments })))
}

/// Clear the moderation flag. A no-op on an already-visible comment, by
/// design: approving twice must succeed.
async fn approve(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    Path(comment_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !user.role.can_moderate() {
        return Err(AppError::Forbidden);
    }

    let updated = state
        .db
        .approve_comment(comment_id)
        .await
        .reject("could not approve comment")?
        .ok_or(AppError::NotFound("Comment not found"))?;

    Ok(Json(json!({
        "message": "Comment approved successfully",
        "updated": updated,
    })))
}

async fn remove(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    Path(comment_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !user.role.can_moderate() {
        return Err(AppError::Forbidden);
    }

    let deleted = state
        .db
        .delete_comment(comment_id)
        .await
        .reject("could not delete comment")?;
    if !deleted {
        return Err(AppError::NotFound("Comment not found"));
    }

    Ok(Json(json!({ "message": "Comment deleted successfully" })))
}
