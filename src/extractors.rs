use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};

use crate::{db::models::AuthUser, rejections::AppError, AppState};

/// Guard extractor that resolves the `Authorization: Bearer` token against
/// the session store. Carries the authenticated caller's identity and role
/// for use in handlers; disabled accounts are rejected outright.
pub struct AuthGuard(pub AuthUser);

impl FromRequestParts<AppState> for AuthGuard {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(&parts.headers) else {
            return Err(AppError::Unauthorized);
        };

        match state.db.get_user_by_session(token).await {
            Ok(Some(user)) if !user.is_deleted => Ok(AuthGuard(user)),
            Ok(_) => Err(AppError::Unauthorized),
            Err(err) => {
                tracing::error!("could not resolve session: {err:?}");
                Err(AppError::Internal("could not resolve session"))
            }
        }
    }
}

/// Optional variant for routes that serve both visitors and signed-in
/// users. A missing, stale or unresolvable token degrades to anonymous.
pub struct MaybeAuth(pub Option<AuthUser>);

impl FromRequestParts<AppState> for MaybeAuth {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(&parts.headers) else {
            return Ok(MaybeAuth(None));
        };

        let user = state
            .db
            .get_user_by_session(token)
            .await
            .unwrap_or_default()
            .filter(|user| !user.is_deleted);

        Ok(MaybeAuth(user))
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
