//! Gateway access tokens.
//!
//! This module provides:
//! - [`Token`] - A bearer token with its absolute expiry
//! - [`TokenError`] - Failures while acquiring or caching a token
//! - [`TokenFetcher`] - Trait for calling the gateway's authentication endpoint
//! - [`TokenManager`] - Trait for serving tokens from a cache

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::expiry::ExpiryError;
use crate::model::Credential;
use crate::store::{Secret, StoreError};

/// Error type for token operations.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The gateway answered but refused to issue a token.
    #[error("authentication failed (status {status}): {message}")]
    Authentication { status: String, message: String },

    /// The request never produced a response (connection, DNS, timeout).
    #[error("network error: {message}")]
    Network { message: String },

    /// The response body could not be decoded.
    #[error("failed to decode token response: {message}")]
    Decode { message: String },

    /// The expiry reported by the gateway could not be parsed.
    #[error(transparent)]
    InvalidExpiry(#[from] ExpiryError),

    /// Reading or writing the token cache failed.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

/// A bearer token issued by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The token value.
    pub access_token: Secret,

    /// Token type (the gateway always reports "Bearer").
    pub token_type: String,

    /// When the gateway stops accepting this token.
    pub expires_at: DateTime<Utc>,
}

impl Token {
    /// Create a new bearer token.
    pub fn new(access_token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            access_token: Secret::new(access_token),
            token_type: "Bearer".to_string(),
            expires_at,
        }
    }

    /// Override the token type.
    ///
    /// An empty value keeps the default.
    pub fn with_token_type(mut self, token_type: impl Into<String>) -> Self {
        let token_type = token_type.into();
        if !token_type.is_empty() {
            self.token_type = token_type;
        }
        self
    }

    /// Check if this token has expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// Value for the `Authorization` header.
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.access_token.expose())
    }
}

/// Calls the gateway's authentication endpoint.
///
/// Implementations perform exactly one request per call; retrying and
/// circuit-breaking belong to the HTTP transport they are built on.
#[async_trait]
pub trait TokenFetcher: Send + Sync {
    /// Exchange a credential for a fresh token.
    async fn fetch_token(&self, credential: &Credential) -> Result<Token, TokenError>;
}

/// Serves tokens for a credential, fetching them when the cache misses.
///
/// # Example
///
/// ```rust,ignore
/// use wappin_core::{Credential, TokenManager};
///
/// async fn bearer(manager: &impl TokenManager) -> Result<String, wappin_core::TokenError> {
///     let credential = Credential::new("client-id", "secret-key");
///     let token = manager.obtain_token(&credential).await?;
///     Ok(token.authorization_header())
/// }
/// ```
#[async_trait]
pub trait TokenManager: Send + Sync {
    /// Return the cached token, or fetch and cache a new one.
    async fn obtain_token(&self, credential: &Credential) -> Result<Token, TokenError>;

    /// Fetch a new token without consulting the cache and overwrite the entry.
    async fn refresh_token(&self, credential: &Credential) -> Result<Token, TokenError>;

    /// Drop the cached token for a credential.
    async fn invalidate(&self, credential: &Credential) -> Result<(), TokenError>;
}
