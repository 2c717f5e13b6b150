//! Google sign-in backend.
//!
//! Sends the browser to Google, exchanges the returned authorization code for
//! the user's profile and answers with a short-lived signed session token.
//! Nothing about a session is stored server-side.

pub mod auth;
pub mod config;
pub mod error;
pub mod notify;
pub mod routes;
pub mod views;

use std::sync::Arc;

use auth::types::AuthConfig;
use auth::GoogleClient;
use notify::Notifier;

/// Read-only state shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub auth_config: Arc<AuthConfig>,
    pub google: Arc<GoogleClient>,
    /// Absent when mail delivery is not configured.
    pub notifier: Option<Notifier>,
}

impl AppState {
    pub fn new(auth_config: AuthConfig, google: GoogleClient, notifier: Option<Notifier>) -> Self {
        Self {
            auth_config: Arc::new(auth_config),
            google: Arc::new(google),
            notifier,
        }
    }
}
