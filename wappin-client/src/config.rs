//! Client configuration.
//!
//! A [`WappinConfig`] can be built in code, read from `WAPPIN_*` environment
//! variables, or (with the `config-file` feature) loaded from a TOML file.
//!
//! ## Environment Variables
//!
//! | Variable | Field |
//! |---|---|
//! | `WAPPIN_BASE_URL` | base URL (default `https://api.wappin.id`) |
//! | `WAPPIN_CLIENT_ID` | client id (required) |
//! | `WAPPIN_SECRET_KEY` | secret key (required) |
//! | `WAPPIN_PROJECT_ID` | project id |
//! | `WAPPIN_CLIENT_KEY` | client key |
//! | `WAPPIN_TIMEOUT` | HTTP timeout in seconds |
//! | `WAPPIN_TOKEN_CACHE_KEY` | fixed token cache key |
//! | `WAPPIN_CACHE_URL` | Redis URL of a shared token cache |

use std::time::Duration;

#[cfg(feature = "config-file")]
use serde::Deserialize;
use url::Url;
use wappin_core::{Credential, Secret, WappinError};

/// Default base URL of the v1 API.
pub const DEFAULT_BASE_URL: &str = "https://api.wappin.id";

/// Default HTTP timeout. Shorter timeouts are raised to this value.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Token endpoint of the v1 API.
pub const ENDPOINT_TOKEN: &str = "/v1/token/get";

/// HSM send endpoint of the v1 API.
pub const ENDPOINT_SEND_HSM: &str = "/v1/message/do-send-hsm";

const ENV_PREFIX: &str = "WAPPIN";

/// Configuration for the v1 client.
#[derive(Debug, Clone)]
pub struct WappinConfig {
    /// Base URL of the gateway.
    pub base_url: String,

    /// Client id, used for token requests and as the default `client_id` of messages.
    pub client_id: String,

    /// Project id, used as the default `project_id` of messages.
    pub project_id: String,

    /// Secret key paired with the client id for token requests.
    pub secret_key: Secret,

    /// Client key issued alongside the secret key.
    pub client_key: Secret,

    /// HTTP timeout.
    pub timeout: Duration,

    /// Fixed token cache key; derived from the client id when `None`.
    pub token_cache_key: Option<String>,

    /// Redis URL of a token cache shared across processes.
    ///
    /// Only read by [`crate::WappinClientBuilder::build_with_configured_store`].
    pub cache_url: Option<String>,
}

impl WappinConfig {
    /// Create a configuration with the default base URL and timeout.
    pub fn new(client_id: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            client_id: client_id.into(),
            project_id: String::new(),
            secret_key: Secret::new(secret_key),
            client_key: Secret::new(""),
            timeout: DEFAULT_TIMEOUT,
            token_cache_key: None,
            cache_url: None,
        }
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the project id.
    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = project_id.into();
        self
    }

    /// Set the client key.
    pub fn with_client_key(mut self, client_key: impl Into<String>) -> Self {
        self.client_key = Secret::new(client_key);
        self
    }

    /// Set the HTTP timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Cache the token under a fixed key.
    pub fn with_token_cache_key(mut self, key: impl Into<String>) -> Self {
        self.token_cache_key = Some(key.into());
        self
    }

    /// Share tokens through the Redis instance at `url`.
    pub fn with_cache_url(mut self, url: impl Into<String>) -> Self {
        self.cache_url = Some(url.into());
        self
    }

    /// Read the configuration from `WAPPIN_*` environment variables.
    pub fn from_env() -> Result<Self, WappinError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, WappinError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |suffix: &str| {
            lookup(&format!("{}_{}", ENV_PREFIX, suffix)).filter(|v| !v.trim().is_empty())
        };

        let client_id = var("CLIENT_ID")
            .ok_or_else(|| WappinError::config("WAPPIN_CLIENT_ID is not set"))?;
        let secret_key = var("SECRET_KEY")
            .ok_or_else(|| WappinError::config("WAPPIN_SECRET_KEY is not set"))?;

        let mut config = Self::new(client_id, secret_key);
        if let Some(base_url) = var("BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(project_id) = var("PROJECT_ID") {
            config.project_id = project_id;
        }
        if let Some(client_key) = var("CLIENT_KEY") {
            config.client_key = Secret::new(client_key);
        }
        if let Some(timeout) = var("TIMEOUT") {
            config.timeout = parse_timeout_secs(&timeout)?;
        }
        config.token_cache_key = var("TOKEN_CACHE_KEY");
        config.cache_url = var("CACHE_URL");

        Ok(config)
    }

    /// Load the configuration from a TOML file.
    ///
    /// ```toml
    /// base_url = "https://api.wappin.id"
    /// client_id = "0123"
    /// secret_key = "..."
    /// project_id = "4567"
    /// timeout_secs = 45
    /// cache_url = "redis://127.0.0.1:6379/0"
    /// ```
    #[cfg(feature = "config-file")]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, WappinError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            WappinError::config(format!("failed to read config from {:?}: {}", path, e))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parse the configuration from TOML text.
    #[cfg(feature = "config-file")]
    pub fn from_toml_str(contents: &str) -> Result<Self, WappinError> {
        let file: ConfigFile = toml::from_str(contents)
            .map_err(|e| WappinError::config(format!("failed to parse config: {}", e)))?;

        let mut config = Self::new(file.client_id, file.secret_key);
        if let Some(base_url) = file.base_url {
            config.base_url = base_url;
        }
        config.project_id = file.project_id.unwrap_or_default();
        if let Some(client_key) = file.client_key {
            config.client_key = Secret::new(client_key);
        }
        if let Some(secs) = file.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        config.token_cache_key = file.token_cache_key;
        config.cache_url = file.cache_url;

        Ok(config)
    }

    /// The credential used against the token endpoint.
    pub fn credential(&self) -> Credential {
        Credential::new(self.client_id.clone(), self.secret_key.expose())
    }

    /// The base URL, validated and without a trailing slash.
    pub fn normalized_base_url(&self) -> Result<String, WappinError> {
        normalize_base_url(&self.base_url)
    }

    /// The timeout actually applied to requests.
    pub fn effective_timeout(&self) -> Duration {
        self.timeout.max(DEFAULT_TIMEOUT)
    }
}

#[cfg(feature = "config-file")]
#[derive(Debug, Deserialize)]
struct ConfigFile {
    base_url: Option<String>,
    client_id: String,
    secret_key: String,
    project_id: Option<String>,
    client_key: Option<String>,
    timeout_secs: Option<u64>,
    token_cache_key: Option<String>,
    cache_url: Option<String>,
}

/// Validate an `http(s)` base URL and strip trailing slashes.
pub(crate) fn normalize_base_url(raw: &str) -> Result<String, WappinError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed)
        .map_err(|e| WappinError::config(format!("invalid base URL {:?}: {}", raw, e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        other => Err(WappinError::config(format!(
            "unsupported base URL scheme {:?}",
            other
        ))),
    }
}

pub(crate) fn parse_timeout_secs(raw: &str) -> Result<Duration, WappinError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| WappinError::config(format!("invalid timeout {:?}, expected seconds", raw)))
}
