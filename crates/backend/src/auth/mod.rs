//! Authentication module for JWT-based sessions with Google OAuth login.
//!
//! This module provides:
//! - Session token creation and validation
//! - Google authorization-code exchange
//! - `require_auth` middleware for protecting routes
//! - The login, callback, profile and logout handlers

pub mod google;
mod handlers;
pub mod jwt;
mod middleware;
pub mod types;

pub use google::{GoogleClient, ProviderEndpoints, ProviderError};
pub use handlers::{auth_callback, auth_login, auth_logout, auth_me, home, root};
pub use jwt::TokenError;
pub use middleware::{extract_bearer_token, require_auth};
