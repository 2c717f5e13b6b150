//! Authentication HTTP handlers.

use axum::{
    extract::{Query, State},
    response::{Html, Redirect},
    Extension, Json,
};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::views;
use crate::AppState;

use super::{
    jwt,
    types::{AuthUser, AuthUserResponse, LoginResponse},
};

pub async fn root() -> Redirect {
    Redirect::temporary("/home")
}

/// Login page with the Google authorization link.
pub async fn home(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let html = views::render_home(&state.google.authorization_url())?;
    Ok(Html(html))
}

/// Start Google OAuth login flow.
pub async fn auth_login(State(state): State<AppState>) -> Redirect {
    Redirect::temporary(&state.google.authorization_url())
}

#[derive(Debug, Deserialize)]
pub struct AuthCallbackParams {
    pub code: Option<String>,
    /// Set by Google instead of `code` when consent was refused.
    pub error: Option<String>,
}

/// Handle Google OAuth callback.
///
/// Exchanges the authorization code for the user's profile and answers with
/// a freshly issued session token. The one-time code email, when enabled, is
/// queued and never awaited here.
pub async fn auth_callback(
    State(state): State<AppState>,
    Query(params): Query<AuthCallbackParams>,
) -> ApiResult<Json<LoginResponse>> {
    if let Some(error) = params.error {
        tracing::warn!("Google returned an authorization error: {}", error);
        return Err(ApiError::bad_request("Google sign-in was not completed"));
    }

    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing authorization code"))?;

    let profile = state.google.exchange_code(&code).await?;
    tracing::info!("OAuth login from: {}", profile.email);

    let token = jwt::create_token(&state.auth_config, &profile)?;

    if let Some(notifier) = &state.notifier {
        notifier.notify(&profile.email);
    }

    tracing::info!("Successful login for: {}", profile.email);
    Ok(Json(LoginResponse::bearer(profile.email, token)))
}

/// Get current authenticated user info.
pub async fn auth_me(Extension(user): Extension<AuthUser>) -> Json<AuthUserResponse> {
    Json(AuthUserResponse { email: user.email })
}

/// Logout - the session lives only in the client, so just leave via Google.
pub async fn auth_logout(State(state): State<AppState>) -> Redirect {
    Redirect::temporary(state.google.logout_url())
}
