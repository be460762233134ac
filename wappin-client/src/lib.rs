//! Wappin Client Library
//!
//! Async client for the Wappin WhatsApp messaging gateway. Handles token
//! acquisition and caching, so callers only build a message and send it.
//!
//! # Overview
//!
//! The gateway issues short-lived bearer tokens. [`WappinClient`] keeps the
//! current token in a [`wappin_core::CredentialStore`] (in memory by default,
//! Redis with the `redis-store` feature), fetches a new one when the cache is
//! empty, and retries a send once with a fresh token when the gateway reports
//! the token as invalid.
//!
//! Two API generations are supported:
//!
//! - **v1** ([`WappinClient`]): HSM messages via `/v1/message/do-send-hsm`,
//!   authenticated with a client id and secret key.
//! - **v2** ([`v2::V2Client`]): template messages in the WhatsApp Business API
//!   shape, authenticated with a username and password.
//!
//! # Quick Start
//!
//! ```no_run
//! use wappin_client::{RequestWhatsappMessage, WappinClient, WappinConfig};
//!
//! #[tokio::main]
//! async fn main() -> wappin_client::Result<()> {
//!     let config = WappinConfig::new("0123", "secret-key").with_project_id("4567");
//!     let client = WappinClient::new(config)?;
//!
//!     let request = RequestWhatsappMessage::new("otp_code", "081213141516")
//!         .with_param("1", "202404");
//!     let response = client.send_message(Some(&request)).await?;
//!     println!("sent {}", response.message_id);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variable Format
//!
//! [`WappinConfig::from_env`] reads:
//! - `WAPPIN_CLIENT_ID`, `WAPPIN_SECRET_KEY` (required)
//! - `WAPPIN_PROJECT_ID`, `WAPPIN_CLIENT_KEY`, `WAPPIN_BASE_URL`
//! - `WAPPIN_TIMEOUT` (seconds), `WAPPIN_TOKEN_CACHE_KEY`
//!
//! # Feature Flags
//!
//! - `config-file` (default): Load [`WappinConfig`] from a TOML file
//! - `redis-store`: Enable [`wappin_core::RedisStore`]

mod client;
pub mod config;
pub mod error;
pub mod fetcher;
mod http;
pub mod payload;
pub mod retry;
pub mod v2;

pub use client::{WappinClient, WappinClientBuilder};
pub use config::{
    WappinConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, ENDPOINT_SEND_HSM, ENDPOINT_TOKEN,
};
pub use error::{ClientError, GatewayError, Result};
pub use fetcher::WappinTokenFetcher;
pub use payload::{
    AccessTokenData, AccessTokenResponse, CallbackData, RequestWhatsappMessage, ResponseMessage,
};
pub use retry::Attempt;

// Re-export the core types callers need to plug in their own cache.
pub use wappin_core::{CredentialStore, GatewayStatus, MemoryStore, Token, TokenManager};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api_accessible() {
        let config = WappinConfig::new("0123", "sk");
        let _: WappinClient = WappinClient::new(config).unwrap();
        let _: v2::V2Client = v2::V2Client::new(v2::V2Config::new("user", "pass")).unwrap();
        let _: Attempt = Attempt::First;
    }
}
