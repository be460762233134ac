//! v1 message sender.

use std::sync::Arc;

use tracing::{debug, info, warn};
use wappin_core::{
    create_store, CachedTokenManager, Credential, CredentialStore, GatewayStatus, MemoryStore,
    Token, TokenManager,
};

use crate::config::{WappinConfig, ENDPOINT_SEND_HSM};
use crate::error::{ClientError, GatewayError, Result};
use crate::fetcher::WappinTokenFetcher;
use crate::http::{build_http_client, RawResponse};
use crate::payload::{RequestWhatsappMessage, ResponseMessage};
use crate::retry::Attempt;

type SharedStore = Arc<dyn CredentialStore>;

/// Builder for [`WappinClient`].
pub struct WappinClientBuilder {
    config: WappinConfig,
    store: Option<SharedStore>,
    http: Option<reqwest::Client>,
}

impl WappinClientBuilder {
    /// Cache tokens in `store` instead of a private [`MemoryStore`].
    pub fn store(mut self, store: SharedStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Use a preconfigured transport.
    ///
    /// Its own timeout and middleware apply; the configured timeout is ignored.
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Build the client with the token cache named by the configured `cache_url`.
    ///
    /// A reachable Redis URL selects a shared cache when the `redis-store`
    /// feature is enabled. Anything else falls back to a private
    /// [`MemoryStore`]. A store set with [`store`](Self::store) wins.
    pub async fn build_with_configured_store(mut self) -> Result<WappinClient> {
        if self.store.is_none() {
            self.store = Some(create_store(self.config.cache_url.as_deref()).await);
        }
        self.build()
    }

    /// Validate the configuration and build the client.
    pub fn build(self) -> Result<WappinClient> {
        let base_url = self.config.normalized_base_url()?;
        let http = match self.http {
            Some(http) => http,
            None => build_http_client(self.config.effective_timeout())?,
        };
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()) as SharedStore);

        let fetcher = WappinTokenFetcher::new(http.clone(), &base_url);
        let mut tokens = CachedTokenManager::new(store, fetcher);
        if let Some(key) = &self.config.token_cache_key {
            tokens = tokens.with_cache_key(key.clone());
        }

        Ok(WappinClient {
            credential: self.config.credential(),
            send_url: format!("{}{}", base_url, ENDPOINT_SEND_HSM),
            config: self.config,
            http,
            tokens,
        })
    }
}

/// Client for the v1 HSM API.
///
/// # Example
///
/// ```no_run
/// use wappin_client::{RequestWhatsappMessage, WappinClient, WappinConfig};
///
/// #[tokio::main]
/// async fn main() -> wappin_client::Result<()> {
///     let client = WappinClient::new(WappinConfig::from_env()?)?;
///
///     let request = RequestWhatsappMessage::new("otp_code", "081213141516")
///         .with_param("1", "202404");
///     let response = client.send_message(Some(&request)).await?;
///     println!("sent {}", response.message_id);
///
///     Ok(())
/// }
/// ```
pub struct WappinClient {
    config: WappinConfig,
    credential: Credential,
    http: reqwest::Client,
    send_url: String,
    tokens: CachedTokenManager<SharedStore, WappinTokenFetcher>,
}

impl WappinClient {
    /// Create a client with an in-memory token cache.
    pub fn new(config: WappinConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    /// Start building a client.
    pub fn builder(config: WappinConfig) -> WappinClientBuilder {
        WappinClientBuilder {
            config,
            store: None,
            http: None,
        }
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &WappinConfig {
        &self.config
    }

    /// The token manager serving this client's bearer tokens.
    pub fn token_manager(&self) -> &CachedTokenManager<SharedStore, WappinTokenFetcher> {
        &self.tokens
    }

    /// Get the current token, from the cache when possible.
    pub async fn obtain_token(&self) -> Result<Token> {
        Ok(self.tokens.obtain_token(&self.credential).await?)
    }

    /// Send an HSM message.
    ///
    /// `None` is rejected with [`ClientError::NilArguments`] before any I/O.
    /// If the gateway answers with status `401`, the token is fetched again
    /// past the cache and the message is sent once more. A second `401` is
    /// returned as is.
    ///
    /// A response with HTTP status ≥ 400 or a status field ≥ 400 becomes
    /// [`ClientError::Gateway`], which still carries the decoded response.
    pub async fn send_message(
        &self,
        request: Option<&RequestWhatsappMessage>,
    ) -> Result<ResponseMessage> {
        let request = request.ok_or(ClientError::NilArguments)?;
        let body = request.normalized(&self.config);

        let mut attempt = Attempt::First;
        loop {
            let token = match attempt {
                Attempt::First => self.tokens.obtain_token(&self.credential).await?,
                Attempt::ForcedRefresh => self.tokens.refresh_token(&self.credential).await?,
            };

            let response = self.post_message(&body, &token).await?;

            if response.gateway_status() == GatewayStatus::InvalidCredential {
                if let Some(next) = attempt.next() {
                    warn!(
                        "Gateway rejected token for client {}, refreshing and resending",
                        self.credential.identifier()
                    );
                    attempt = next;
                    continue;
                }
            }

            return classify(response);
        }
    }

    async fn post_message(
        &self,
        body: &RequestWhatsappMessage,
        token: &Token,
    ) -> Result<ResponseMessage> {
        debug!("Sending {} to {}", body.template_type, body.recipient_number);

        let response = self
            .http
            .post(&self.send_url)
            .bearer_auth(token.access_token.expose())
            .json(body)
            .send()
            .await?;
        let raw = RawResponse::read(response).await?;

        let mut decoded: ResponseMessage = serde_json::from_slice(&raw.body)?;
        decoded.http_status_code = raw.status;
        decoded.raw_data = raw.body_text();

        Ok(decoded)
    }
}

fn classify(response: ResponseMessage) -> Result<ResponseMessage> {
    if response.is_error() {
        warn!(
            "Gateway rejected message (http {}, status {}): {}",
            response.http_status_code, response.status, response.message
        );
        return Err(ClientError::Gateway {
            error: GatewayError::new(response.status.clone(), response.message.clone()),
            response: Box::new(response),
        });
    }

    info!("Message accepted with id {}", response.message_id);
    Ok(response)
}
