//! Client configuration sourced from the environment.

use std::env;

/// Environment variable holding the API base address.
pub const BASE_URL_ENV: &str = "CATALOG_API_BASE";

/// Local development address of the backend.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Name under which the bearer token is persisted.
pub const TOKEN_KEY: &str = "access_token";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl ClientConfig {
    /// Reads `CATALOG_API_BASE`, falling back to the development address when
    /// it is unset or blank.
    pub fn from_env() -> Self {
        Self::from_base_url(env::var(BASE_URL_ENV).ok())
    }

    fn from_base_url(value: Option<String>) -> Self {
        match value {
            Some(base_url) if !base_url.trim().is_empty() => Self {
                base_url: base_url.trim().to_string(),
            },
            _ => Self::default(),
        }
    }
}
