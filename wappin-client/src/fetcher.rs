//! Token acquisition against the v1 `/v1/token/get` endpoint.

use async_trait::async_trait;
use tracing::{debug, error};
use wappin_core::{expiry, Credential, Token, TokenError, TokenFetcher};

use crate::config::ENDPOINT_TOKEN;
use crate::http::post_basic_auth;
use crate::payload::AccessTokenResponse;

/// Fetches v1 tokens with HTTP basic auth (`client_id:secret_key`).
#[derive(Debug, Clone)]
pub struct WappinTokenFetcher {
    http: reqwest::Client,
    token_url: String,
}

impl WappinTokenFetcher {
    /// Create a fetcher for the gateway at `base_url` (no trailing slash).
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            token_url: format!("{}{}", base_url, ENDPOINT_TOKEN),
        }
    }
}

#[async_trait]
impl TokenFetcher for WappinTokenFetcher {
    async fn fetch_token(&self, credential: &Credential) -> Result<Token, TokenError> {
        debug!("Requesting token for client {}", credential.identifier());

        let raw = post_basic_auth(
            &self.http,
            &self.token_url,
            credential.identifier(),
            credential.secret().expose(),
        )
        .await?;

        let body: AccessTokenResponse =
            serde_json::from_slice(&raw.body).map_err(|e| TokenError::Decode {
                message: e.to_string(),
            })?;

        if body.status != "200" || raw.status >= 400 {
            error!(
                "Failed to get token for client {} (http {}, status {}): {}",
                credential.identifier(),
                raw.status,
                body.status,
                body.message
            );
            return Err(TokenError::Authentication {
                status: body.status,
                message: body.message,
            });
        }

        let data = body.data.ok_or_else(|| TokenError::Decode {
            message: "token response has no data".to_string(),
        })?;
        let expires_at = expiry::parse_gateway_datetime(&data.expired_datetime)?;

        Ok(Token::new(data.access_token, expires_at).with_token_type(data.token_type))
    }
}
