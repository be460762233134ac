//! Top-level error types for the Wappin core crate.

use thiserror::Error;

/// Errors raised while assembling a client, before any gateway call.
///
/// Runtime failures have their own types: [`crate::TokenError`] for token
/// acquisition and [`crate::StoreError`] for the cache.
#[derive(Debug, Error)]
pub enum WappinError {
    /// Configuration error.
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl WappinError {
    /// Shorthand for a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
