//! Environment-driven configuration

use crate::auth::{ParseRoleError, Role};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no credentials configured; set CAREER_GUIDE_GATEWAY or GEMINI_API_KEY")]
    MissingCredentials,
    #[error("CAREER_GUIDE_TIMEOUT_SECS must be a whole number of seconds, got {0:?}")]
    InvalidTimeout(String),
    #[error(transparent)]
    InvalidRole(#[from] ParseRoleError),
}

/// How the generative service is reached
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Server-side proxy that holds the provider key
    Gateway(String),
    /// Provider key used directly
    ApiKey(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuideConfig {
    pub credentials: Credentials,
    pub model: String,
    /// `None` disables the per-call limit
    pub timeout: Option<Duration>,
    pub role: Role,
    pub user_id: String,
    pub log_json: bool,
}

impl GuideConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        // The gateway wins when both are present
        let credentials = match (var("CAREER_GUIDE_GATEWAY"), var("GEMINI_API_KEY")) {
            (Some(gateway), _) => Credentials::Gateway(gateway.trim_end_matches('/').to_string()),
            (None, Some(key)) => Credentials::ApiKey(key),
            (None, None) => return Err(ConfigError::MissingCredentials),
        };

        let timeout = match var("CAREER_GUIDE_TIMEOUT_SECS") {
            None => Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(0) => None,
                Ok(secs) => Some(Duration::from_secs(secs)),
                Err(_) => return Err(ConfigError::InvalidTimeout(raw)),
            },
        };

        let role = match var("CAREER_GUIDE_ROLE") {
            Some(raw) => raw.parse()?,
            None => Role::Student,
        };

        let user_id = var("CAREER_GUIDE_USER")
            .or_else(|| var("USER"))
            .unwrap_or_else(|| "local".to_string());

        let log_json = var("CAREER_GUIDE_LOG_JSON")
            .is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"));

        Ok(Self {
            credentials,
            model: var("CAREER_GUIDE_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            timeout,
            role,
            user_id,
            log_json,
        })
    }

    pub fn uses_gateway(&self) -> bool {
        matches!(self.credentials, Credentials::Gateway(_))
    }
}
