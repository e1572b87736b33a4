use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use crate::{
    extractors::AuthGuard,
    models::{LoginBody, RegisterBody},
    names,
    rejections::{AppError, FieldError, ResultExt},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}

async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, AppError> {
    let mut errors = Vec::new();
    if body.name.trim().chars().count() < names::MIN_NAME_LEN {
        errors.push(FieldError {
            field: "name",
            message: "Name must be at least 2 characters",
        });
    }
    if !looks_like_email(&body.email) {
        errors.push(FieldError {
            field: "email",
            message: "Please provide a valid email",
        });
    }
    if body.password.len() < names::MIN_PASSWORD_LEN {
        errors.push(FieldError {
            field: "password",
            message: "Password must be at least 6 characters",
        });
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let email = body.email.trim().to_lowercase();

    if state
        .db
        .email_exists(&email)
        .await
        .reject("could not check email")?
    {
        return Err(AppError::BadRequest("User already exists"));
    }

    let user_id = state
        .db
        .create_user(body.name.trim(), &email, &body.password)
        .await
        .reject("could not create user")?;

    let user = state
        .db
        .get_user(user_id)
        .await
        .reject("could not load user")?
        .ok_or(AppError::Internal("user missing after registration"))?;

    let token = state
        .db
        .create_user_session(user_id)
        .await
        .reject("could not create session")?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User created successfully",
            "user": user,
            "token": token,
        })),
    ))
}

async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<impl IntoResponse, AppError> {
    let email = body.email.trim().to_lowercase();

    let user = state
        .db
        .find_user_by_email(&email)
        .await
        .reject("could not look up user")?
        .ok_or(AppError::BadRequest("User not found"))?;

    let password_ok = state
        .db
        .verify_user_password(&email, &body.password)
        .await
        .reject("could not verify password")?;
    if !password_ok {
        return Err(AppError::BadRequest("Wrong password"));
    }

    if user.is_deleted {
        return Err(AppError::BadRequest("Account is disabled"));
    }

    let token = state
        .db
        .create_user_session(user.id)
        .await
        .reject("could not create session")?;

    Ok(Json(json!({
        "message": "Login successful",
        "user": user,
        "token": token,
    })))
}

async fn me(AuthGuard(user): AuthGuard) -> Json<serde_json::Value> {
    Json(json!({ "user": user }))
}
