use axum::{
    extract::{Request, State},
    http::header::{AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use quill_core::UserId;

use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated request identity, inserted into request extensions
#[derive(Clone, Copy, Debug)]
pub struct CurrentUser(pub UserId);

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Middleware that resolves `Authorization: Bearer <token>` into a user id
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| {
            ApiError::Unauthenticated("Authentication credentials were not provided.".into())
        })?
        .to_string();

    let user = state.accounts.resolve_token(&token).await?;
    request.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(request).await)
}
