//! Unified error handling for the HTTP layer.
//!
//! Handlers return [`ApiResult`] and use `?`; every error is rendered through
//! the single HTML error view with a status code and a client-safe message.
//! Internal details only go to the log.

use axum::{
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::auth::{ProviderError, TokenError};
use crate::views;

/// Unified error type for API handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// The identity provider did not complete the login
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Session token could not be issued or verified
    #[error(transparent)]
    Token(#[from] TokenError),

    /// No bearer token on a protected route
    #[error("Not authenticated")]
    MissingCredentials,

    /// Invalid request data
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Page rendering error
    #[error("View error: {0}")]
    View(#[from] handlebars::RenderError),

    /// Generic internal error
    #[error("{0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    /// Status code and the message shown to the client.
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::Provider(ProviderError::TokenExchange(_)) => (
                StatusCode::BAD_REQUEST,
                "Error getting access token from Google".to_string(),
            ),
            ApiError::Provider(ProviderError::ProfileFetch(_)) => (
                StatusCode::BAD_REQUEST,
                "Error fetching user info from Google".to_string(),
            ),
            ApiError::Provider(ProviderError::Discovery(_)) => (
                StatusCode::BAD_GATEWAY,
                "Identity provider unavailable".to_string(),
            ),
            ApiError::Token(TokenError::Signing(_))
            | ApiError::Token(TokenError::Lifetime(_))
            | ApiError::Provider(ProviderError::Client(_))
            | ApiError::View(_)
            | ApiError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
            ApiError::Token(_) => (
                StatusCode::FORBIDDEN,
                "Could not validate credentials".to_string(),
            ),
            ApiError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "Not authenticated".to_string())
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        match &self {
            ApiError::Provider(e) => tracing::error!("Provider error ({}): {}", e.code(), e),
            ApiError::Token(TokenError::Signing(e)) => {
                tracing::error!("Failed to sign session token: {:?}", e)
            }
            ApiError::Token(e @ TokenError::Lifetime(_)) => {
                tracing::error!("Failed to issue session token: {}", e)
            }
            ApiError::Token(e) => tracing::warn!("Rejected session token: {}", e),
            ApiError::View(e) => tracing::error!("View error: {:?}", e),
            ApiError::Internal(e) => tracing::error!("Internal error: {:?}", e),
            ApiError::MissingCredentials | ApiError::BadRequest(_) => {
                tracing::debug!("{} {}", status, message)
            }
        }

        let mut response = match views::render_error(status, &message) {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => {
                tracing::error!("Failed to render error view: {:?}", e);
                (status, message).into_response()
            }
        };

        if matches!(self, ApiError::MissingCredentials) {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                header::HeaderValue::from_static("Bearer"),
            );
        }

        response
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
