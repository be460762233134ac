//! v2 client configuration.

use std::time::Duration;

use wappin_core::{Credential, Secret, WappinError};

use crate::config::{normalize_base_url, parse_timeout_secs, DEFAULT_TIMEOUT};

/// Default base URL of the v2 API.
pub const DEFAULT_V2_BASE_URL: &str = "https://api.chat.wappin.app";

/// Default login path.
pub const DEFAULT_LOGIN_PATH: &str = "/v1/users/login";

/// Default messages path.
pub const DEFAULT_MESSAGES_PATH: &str = "/v1/messages";

/// Configuration for the v2 client.
///
/// Read from the environment with [`V2Config::from_env`]:
/// `WAPPIN_V2_BASE_URL`, `WAPPIN_V2_LOGIN_URL`, `WAPPIN_V2_MESSAGES_URL`,
/// `WAPPIN_V2_USERNAME`, `WAPPIN_V2_PASSWORD`, `WAPPIN_V2_NAMESPACE`,
/// `WAPPIN_V2_TOKEN_CACHE_KEY`, `WAPPIN_V2_CACHE_URL` and `WAPPIN_V2_TIMEOUT`.
#[derive(Debug, Clone)]
pub struct V2Config {
    /// Base URL of the gateway.
    pub base_url: String,

    /// Login path, or an absolute login URL.
    pub login_path: String,

    /// Messages path, or an absolute messages URL.
    pub messages_path: String,

    /// Login username.
    pub username: String,

    /// Login password.
    pub password: Secret,

    /// Template namespace used when a request leaves it empty.
    pub namespace: String,

    /// Fixed token cache key; derived from the username when `None`.
    pub token_cache_key: Option<String>,

    /// Redis URL of a token cache shared across processes.
    ///
    /// Only read by [`crate::v2::V2ClientBuilder::build_with_configured_store`].
    pub cache_url: Option<String>,

    /// HTTP timeout.
    pub timeout: Duration,
}

impl V2Config {
    /// Create a configuration with default URLs and timeout.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_V2_BASE_URL.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            messages_path: DEFAULT_MESSAGES_PATH.to_string(),
            username: username.into(),
            password: Secret::new(password),
            namespace: String::new(),
            token_cache_key: None,
            cache_url: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the login path.
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    /// Set the messages path.
    pub fn with_messages_path(mut self, path: impl Into<String>) -> Self {
        self.messages_path = path.into();
        self
    }

    /// Set the default template namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
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

    /// Set the HTTP timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read the configuration from `WAPPIN_V2_*` environment variables.
    pub fn from_env() -> Result<Self, WappinError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, WappinError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |suffix: &str| {
            lookup(&format!("WAPPIN_V2_{}", suffix)).filter(|v| !v.trim().is_empty())
        };

        let username = var("USERNAME")
            .ok_or_else(|| WappinError::config("WAPPIN_V2_USERNAME is not set"))?;
        let password = var("PASSWORD")
            .ok_or_else(|| WappinError::config("WAPPIN_V2_PASSWORD is not set"))?;

        let mut config = Self::new(username, password);
        if let Some(base_url) = var("BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(path) = var("LOGIN_URL") {
            config.login_path = path;
        }
        if let Some(path) = var("MESSAGES_URL") {
            config.messages_path = path;
        }
        if let Some(namespace) = var("NAMESPACE") {
            config.namespace = namespace;
        }
        if let Some(timeout) = var("TIMEOUT") {
            config.timeout = parse_timeout_secs(&timeout)?;
        }
        config.token_cache_key = var("TOKEN_CACHE_KEY");
        config.cache_url = var("CACHE_URL");

        Ok(config)
    }

    /// The login credential.
    pub fn credential(&self) -> Credential {
        Credential::new(self.username.clone(), self.password.expose())
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
