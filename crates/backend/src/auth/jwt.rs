//! JWT token creation and validation.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use super::types::{AuthConfig, Claims, UserProfile};

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("token lifetime of {0} minutes is out of range")]
    Lifetime(i64),
}

/// Create a new JWT token for a user.
pub fn create_token(config: &AuthConfig, profile: &UserProfile) -> Result<String, TokenError> {
    create_token_at(config, profile, Utc::now())
}

pub fn create_token_at(
    config: &AuthConfig,
    profile: &UserProfile,
    now: DateTime<Utc>,
) -> Result<String, TokenError> {
    let exp = Duration::try_minutes(config.token_ttl_minutes)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or(TokenError::Lifetime(config.token_ttl_minutes))?;

    let claims = Claims {
        sub: profile.email.clone(),
        role: profile.role.clone(),
        iat: now.timestamp(),
        exp: exp.timestamp(),
    };

    encode(
        &Header::new(config.algorithm),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(TokenError::Signing)
}

/// Validate a JWT token and return claims.
pub fn validate_token(config: &AuthConfig, token: &str) -> Result<Claims, TokenError> {
    validate_token_at(config, token, Utc::now())
}

/// Validate against `now` instead of the system clock. Expiry has no leeway.
pub fn validate_token_at(
    config: &AuthConfig,
    token: &str,
    now: DateTime<Utc>,
) -> Result<Claims, TokenError> {
    let mut validation = Validation::new(config.algorithm);
    validation.validate_exp = false;
    validation.leeway = 0;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )?;

    if token_data.claims.exp <= now.timestamp() {
        return Err(TokenError::Expired);
    }

    Ok(token_data.claims)
}
