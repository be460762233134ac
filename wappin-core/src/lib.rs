//! # Wappin Core
//!
//! Core library for the Wappin WhatsApp gateway client.
//!
//! This crate provides:
//! - Domain types for credentials, tokens and gateway status codes
//! - The [`CredentialStore`] trait with in-memory and (optionally) Redis backends
//! - [`CachedTokenManager`], which serves tokens from the store and fetches
//!   new ones through a [`TokenFetcher`] on a miss
//! - Helpers for the gateway's expiry timestamps and recipient numbers
//!
//! The HTTP side (fetchers and message senders) lives in `wappin-client`.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use wappin_core::{CachedTokenManager, Credential, MemoryStore, TokenManager};
//!
//! async fn bearer(fetcher: impl wappin_core::TokenFetcher + 'static) -> Result<String, wappin_core::TokenError> {
//!     let manager = CachedTokenManager::new(MemoryStore::new(), fetcher);
//!     let credential = Credential::new("client-id", "secret-key");
//!     let token = manager.obtain_token(&credential).await?;
//!     Ok(token.authorization_header())
//! }
//! ```

pub mod error;
pub mod expiry;
pub mod model;
pub mod phone;
pub mod store;
pub mod token;
pub mod token_manager;

// Re-export commonly used types at crate root
pub use model::{
    Credential,
    GatewayStatus,
    DEFAULT_TOKEN_KEY_PREFIX,
};

pub use store::{
    Secret,
    CredentialStore,
    SaveOptions,
    StoreError,
    MemoryStore,
    create_store,
};

#[cfg(feature = "redis-store")]
pub use store::RedisStore;

pub use token::{
    Token,
    TokenError,
    TokenFetcher,
    TokenManager,
};

pub use token_manager::{
    CachedTokenManager,
    ACCESS_TOKEN_TAG,
};

pub use expiry::ExpiryError;

pub use error::WappinError;
