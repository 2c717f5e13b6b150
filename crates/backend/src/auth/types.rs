//! Auth-related types and configuration.

use anyhow::{bail, Result};
use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::EnvLookup;

// Re-export shared types for convenience
pub use shared_types::{AuthUserResponse, LoginResponse};

/// Role given to every user signing in through the provider.
pub const DEFAULT_ROLE: &str = "user";

const DEFAULT_TOKEN_TTL_MINUTES: i64 = 60;
/// One week.
pub const MAX_TOKEN_TTL_MINUTES: i64 = 7 * 24 * 60;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_LOGOUT_URL: &str = "https://accounts.google.com/Logout";

/// JWT Claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user email)
    pub sub: String,
    pub role: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// Normalized profile built from the provider's userinfo response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub email: String,
    pub display_name: Option<String>,
    pub role: String,
}

impl UserProfile {
    pub fn new(email: impl Into<String>, display_name: Option<String>) -> Self {
        Self {
            email: email.into(),
            display_name,
            role: DEFAULT_ROLE.to_string(),
        }
    }
}

/// Validated user from JWT
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub email: String,
    pub role: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            email: claims.sub,
            role: claims.role,
        }
    }
}

/// Session token configuration loaded from environment
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub algorithm: Algorithm,
    pub token_ttl_minutes: i64,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .finish()
    }
}

impl AuthConfig {
    /// Required env vars:
    /// - `SECRET_KEY`: Secret key for signing session tokens
    /// - `ALGORITHM`: `HS256`, `HS384` or `HS512`
    ///
    /// `ACCESS_TOKEN_EXPIRE_MINUTES` defaults to 60 and may not exceed one week.
    pub(crate) fn load(env: &EnvLookup<'_>) -> Result<Self> {
        let jwt_secret = env.required("SECRET_KEY")?;

        let algorithm: Algorithm = env.parsed("ALGORITHM")?;
        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            bail!(
                "ALGORITHM {:?} is not supported, use HS256, HS384 or HS512",
                algorithm
            );
        }

        let token_ttl_minutes =
            env.parsed_or("ACCESS_TOKEN_EXPIRE_MINUTES", DEFAULT_TOKEN_TTL_MINUTES)?;
        if token_ttl_minutes <= 0 {
            bail!("ACCESS_TOKEN_EXPIRE_MINUTES must be greater than zero");
        }
        if token_ttl_minutes > MAX_TOKEN_TTL_MINUTES {
            bail!(
                "ACCESS_TOKEN_EXPIRE_MINUTES must be at most {} (one week), got {}",
                MAX_TOKEN_TTL_MINUTES,
                token_ttl_minutes
            );
        }

        Ok(Self {
            jwt_secret,
            algorithm,
            token_ttl_minutes,
        })
    }
}

/// Google OAuth client settings.
#[derive(Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub discovery_url: String,
    /// Used both in the authorization URL and in the code exchange.
    pub redirect_uri: String,
    /// Sign-out page used when the discovery document has no `end_session_endpoint`.
    pub logout_url: String,
    pub http_timeout: Duration,
}

impl std::fmt::Debug for GoogleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("discovery_url", &self.discovery_url)
            .field("redirect_uri", &self.redirect_uri)
            .field("logout_url", &self.logout_url)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

impl GoogleConfig {
    /// Required env vars:
    /// - `GOOGLE_CLIENT_ID`, `GOOGLE_CLIENT_SECRET`: OAuth client credentials
    /// - `GOOGLE_DISCOVERY_URL`: OpenID configuration document
    /// - `GOOGLE_REDIRECT_URI`: callback registered with Google
    pub(crate) fn load(env: &EnvLookup<'_>) -> Result<Self> {
        let timeout_secs: u64 =
            env.parsed_or("GOOGLE_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            bail!("GOOGLE_HTTP_TIMEOUT_SECS must be greater than zero");
        }

        Ok(Self {
            client_id: env.required("GOOGLE_CLIENT_ID")?,
            client_secret: env.required("GOOGLE_CLIENT_SECRET")?,
            discovery_url: env.required("GOOGLE_DISCOVERY_URL")?,
            redirect_uri: env.required("GOOGLE_REDIRECT_URI")?,
            logout_url: env
                .optional("GOOGLE_LOGOUT_URL")
                .unwrap_or_else(|| DEFAULT_LOGOUT_URL.to_string()),
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }
}
