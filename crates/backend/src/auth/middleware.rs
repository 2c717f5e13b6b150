//! Authentication middleware layer for protecting routes.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;
use crate::AppState;

use super::jwt;
use super::types::AuthUser;

/// Middleware function that requires a valid bearer token.
///
/// Use with `axum::middleware::from_fn_with_state`. On success the
/// [`AuthUser`] is available to handlers as an `Extension`.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = match extract_bearer_token(request.headers()) {
        Some(t) => t,
        None => return ApiError::MissingCredentials.into_response(),
    };

    let claims = match jwt::validate_token(&state.auth_config, token) {
        Ok(c) => c,
        Err(e) => return ApiError::from(e).into_response(),
    };

    let user = AuthUser::from(claims);
    tracing::debug!("Authenticated {} with role {}", user.email, user.role);
    request.extensions_mut().insert(user);
    next.run(request).await
}

/// The token from an `Authorization: Bearer <token>` header, if present.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
