use serde::{Deserialize, Serialize};

/// Token type reported alongside every session token.
pub const BEARER_TOKEN_TYPE: &str = "bearer";

/// Body returned by the OAuth callback once the session token is issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub email: String,
    pub access_token: String,
    pub token_type: String,
}

impl LoginResponse {
    pub fn bearer(email: impl Into<String>, access_token: impl Into<String>) -> Self {
        LoginResponse {
            email: email.into(),
            access_token: access_token.into(),
            token_type: BEARER_TOKEN_TYPE.to_string(),
        }
    }
}

/// Profile view served by `/users/me`, built only from the token subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUserResponse {
    pub email: String,
}
