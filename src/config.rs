// Configuration module: credentials and API endpoint settings read once at
// startup and passed by reference to the components that need them.

use std::fmt;
use thiserror::Error;

pub const ENV_BUSINESS_ID: &str = "IG_BUSINESS_ID";
pub const ENV_ACCESS_TOKEN: &str = "IG_ACCESS_TOKEN";
pub const ENV_DEFAULT_LOCATION: &str = "DEFAULT_LOCATION";
pub const ENV_API_VERSION: &str = "IG_API_VERSION";
pub const ENV_API_BASE: &str = "IG_API_BASE";

pub const DEFAULT_LOCATION: &str = "自家菜園";
pub const DEFAULT_API_BASE: &str = "https://graph.facebook.com";
pub const DEFAULT_API_VERSION: &str = "v21.0";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing IG creds in .env (IG_BUSINESS_ID / IG_ACCESS_TOKEN)")]
    MissingCredentials,
}

/// Everything the publisher needs to talk to the Graph API.
#[derive(Clone)]
pub struct Config {
    pub business_id: String,
    pub access_token: String,
    /// Location used when the filename carries no place token.
    pub default_location: String,
    pub api_base: String,
    pub api_version: String,
}

impl Config {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup. Empty values are treated
    /// as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let (business_id, access_token) = match (get(ENV_BUSINESS_ID), get(ENV_ACCESS_TOKEN)) {
            (Some(id), Some(token)) => (id, token),
            _ => return Err(ConfigError::MissingCredentials),
        };
        Ok(Config {
            business_id,
            access_token,
            default_location: get(ENV_DEFAULT_LOCATION)
                .unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            api_base: get(ENV_API_BASE).unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            api_version: get(ENV_API_VERSION).unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("business_id", &self.business_id)
            .field("access_token", &"<redacted>")
            .field("default_location", &self.default_location)
            .field("api_base", &self.api_base)
            .field("api_version", &self.api_version)
            .finish()
    }
}
