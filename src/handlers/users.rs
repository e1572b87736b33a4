use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use crate::{
    extractors::AuthGuard,
    rejections::{AppError, ResultExt},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/all", get(list))
        .route("/users/{id}", post(toggle_disabled).delete(remove))
}

async fn list(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    if !user.role.is_admin() {
        return Err(AppError::Forbidden);
    }

    let users = state.db.list_users().await.reject("could not list users")?;

    Ok(Json(json!({ "users": users })))
}

/// Soft-disable toggle: a disabled account cannot log in but its content
/// stays up. Flipping it again re-enables the account.
async fn toggle_disabled(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !user.role.is_admin() {
        return Err(AppError::Forbidden);
    }

    let disabled = state
        .db
        .toggle_user_disabled(user_id)
        .await
        .reject("could not update user")?
        .ok_or(AppError::NotFound("User not found"))?;

    let message = if disabled {
        "User disabled successfully"
    } else {
        "User re-enabled successfully"
    };
    Ok(Json(json!({ "message": message, "disabled": disabled })))
}

async fn remove(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !user.role.is_admin() {
        return Err(AppError::Forbidden);
    }

    let deleted = state
        .db
        .delete_user(user_id)
        .await
        .reject("could not delete user")?;
    if !deleted {
        return Err(AppError::NotFound("User not found"));
    }

    Ok(Json(json!({ "message": "User deleted permanently" })))
}
