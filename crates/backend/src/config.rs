//! Process-wide configuration, read once at startup.
//!
//! Every value comes from the environment (optionally seeded from a `.env`
//! file by `main`). Loading fails on the first missing or malformed required
//! value so a misconfigured server never starts accepting logins.

use anyhow::{anyhow, Context, Result};
use std::fmt::Display;
use std::str::FromStr;

use crate::auth::types::{AuthConfig, GoogleConfig};
use crate::notify::MailConfig;

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub auth: AuthConfig,
    pub google: GoogleConfig,
    /// `None` disables the one-time code notification.
    pub mail: Option<MailConfig>,
    pub cors_allowed_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvLookup::new(&lookup);

        let cors_allowed_origins = env
            .optional("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            auth: AuthConfig::load(&env).context("invalid session token configuration")?,
            google: GoogleConfig::load(&env).context("invalid Google OAuth configuration")?,
            mail: MailConfig::load(&env).context("invalid mail configuration")?,
            cors_allowed_origins,
        })
    }
}

/// Typed access to configuration variables. Blank values count as unset.
pub(crate) struct EnvLookup<'a> {
    lookup: &'a dyn Fn(&str) -> Option<String>,
}

impl<'a> EnvLookup<'a> {
    pub(crate) fn new(lookup: &'a dyn Fn(&str) -> Option<String>) -> Self {
        Self { lookup }
    }

    pub(crate) fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    pub(crate) fn required(&self, key: &str) -> Result<String> {
        self.optional(key)
            .ok_or_else(|| anyhow!("{} must be set", key))
    }

    pub(crate) fn parsed<T>(&self, key: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        let raw = self.required(key)?;
        raw.parse()
            .map_err(|e| anyhow!("{} has an invalid value {:?}: {}", key, raw, e))
    }

    pub(crate) fn parsed_or<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.optional(key) {
            Some(_) => self.parsed(key),
            None => Ok(default),
        }
    }
}
