//! v2 login and message sender.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};
use wappin_core::{
    create_store, expiry, CachedTokenManager, Credential, CredentialStore, MemoryStore, Token,
    TokenError, TokenFetcher, TokenManager,
};

use super::config::V2Config;
use super::payload::RequestMessage;
use super::response::{ResponseLogin, ResponseMessage};
use crate::error::{ClientError, Result};
use crate::http::{build_http_client, post_basic_auth, RawResponse};
use crate::retry::Attempt;

/// Hours subtracted from the login expiry before caching the token.
pub const TOKEN_EXPIRY_MARGIN_HOURS: i64 = 36;

type SharedStore = Arc<dyn CredentialStore>;

/// Logs in with HTTP basic auth (`username:password`).
#[derive(Debug, Clone)]
pub struct LoginTokenFetcher {
    http: reqwest::Client,
    login_url: String,
}

impl LoginTokenFetcher {
    /// Create a fetcher posting to `login_url`.
    pub fn new(http: reqwest::Client, login_url: impl Into<String>) -> Self {
        Self {
            http,
            login_url: login_url.into(),
        }
    }
}

#[async_trait]
impl TokenFetcher for LoginTokenFetcher {
    async fn fetch_token(&self, credential: &Credential) -> std::result::Result<Token, TokenError> {
        debug!("Logging in as {}", credential.identifier());

        let raw = post_basic_auth(
            &self.http,
            &self.login_url,
            credential.identifier(),
            credential.secret().expose(),
        )
        .await?;

        let body: ResponseLogin =
            serde_json::from_slice(&raw.body).map_err(|e| TokenError::Decode {
                message: e.to_string(),
            })?;

        let user = match body.users.into_iter().next() {
            Some(user) if raw.status < 400 && !user.token.is_empty() => user,
            _ => {
                let (status, message) = match body.errors.into_iter().next() {
                    Some(e) => (e.code, format!("{}: {}", e.title, e.details)),
                    None => (raw.status.to_string(), "login returned no token".to_string()),
                };
                error!(
                    "Login failed for {} (http {}, code {}): {}",
                    credential.identifier(),
                    raw.status,
                    status,
                    message
                );
                return Err(TokenError::Authentication { status, message });
            }
        };

        let expires_at = expiry::parse_rfc3339(&user.expired_after)?;
        Ok(Token::new(user.token, expires_at))
    }
}

/// Builder for [`V2Client`].
pub struct V2ClientBuilder {
    config: V2Config,
    store: Option<SharedStore>,
    http: Option<reqwest::Client>,
}

impl V2ClientBuilder {
    /// Cache tokens in `store` instead of a private [`MemoryStore`].
    pub fn store(mut self, store: SharedStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Use a preconfigured transport.
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Build the client with the token cache named by the configured `cache_url`.
    ///
    /// A reachable Redis URL selects a shared cache when the `redis-store`
    /// feature is enabled. Anything else falls back to a private
    /// [`MemoryStore`]. A store set with [`store`](Self::store) wins.
    pub async fn build_with_configured_store(mut self) -> Result<V2Client> {
        if self.store.is_none() {
            self.store = Some(create_store(self.config.cache_url.as_deref()).await);
        }
        self.build()
    }

    /// Validate the configuration and build the client.
    pub fn build(self) -> Result<V2Client> {
        let base_url = self.config.normalized_base_url()?;
        let http = match self.http {
            Some(http) => http,
            None => build_http_client(self.config.effective_timeout())?,
        };
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()) as SharedStore);

        let login_url = join_url(&base_url, &self.config.login_path);
        let fetcher = LoginTokenFetcher::new(http.clone(), login_url);
        let mut tokens = CachedTokenManager::new(store, fetcher)
            .with_expiry_buffer(chrono::Duration::hours(TOKEN_EXPIRY_MARGIN_HOURS));
        if let Some(key) = &self.config.token_cache_key {
            tokens = tokens.with_cache_key(key.clone());
        }

        Ok(V2Client {
            credential: self.config.credential(),
            messages_url: join_url(&base_url, &self.config.messages_path),
            config: self.config,
            http,
            tokens,
        })
    }
}

/// Client for the v2 messages API.
pub struct V2Client {
    config: V2Config,
    credential: Credential,
    http: reqwest::Client,
    messages_url: String,
    tokens: CachedTokenManager<SharedStore, LoginTokenFetcher>,
}

impl V2Client {
    /// Create a client with an in-memory token cache.
    pub fn new(config: V2Config) -> Result<Self> {
        Self::builder(config).build()
    }

    /// Start building a client.
    pub fn builder(config: V2Config) -> V2ClientBuilder {
        V2ClientBuilder {
            config,
            store: None,
            http: None,
        }
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &V2Config {
        &self.config
    }

    /// The token manager serving this client's bearer tokens.
    pub fn token_manager(&self) -> &CachedTokenManager<SharedStore, LoginTokenFetcher> {
        &self.tokens
    }

    /// Send a template message.
    ///
    /// An HTTP 401 forces a fresh login and one resend. Any other response
    /// with HTTP status ≥ 400 or a non-empty `errors` array becomes
    /// [`ClientError::Api`].
    pub async fn send_message(&self, request: Option<&RequestMessage>) -> Result<ResponseMessage> {
        let request = request.ok_or(ClientError::NilArguments)?;
        let body = request.normalized(&self.config.namespace);

        let mut attempt = Attempt::First;
        loop {
            let token = match attempt {
                Attempt::First => self.tokens.obtain_token(&self.credential).await?,
                Attempt::ForcedRefresh => self.tokens.refresh_token(&self.credential).await?,
            };

            let response = self.post_message(&body, &token).await?;

            if response.http_status_code == 401 {
                if let Some(next) = attempt.next() {
                    warn!(
                        "Gateway rejected token for {}, logging in again",
                        self.credential.identifier()
                    );
                    attempt = next;
                    continue;
                }
            }

            return classify(response);
        }
    }

    async fn post_message(&self, body: &RequestMessage, token: &Token) -> Result<ResponseMessage> {
        debug!("Sending template {} to {}", body.template.name, body.to);

        let response = self
            .http
            .post(&self.messages_url)
            .bearer_auth(token.access_token.expose())
            .json(body)
            .send()
            .await?;
        let raw = RawResponse::read(response).await?;

        // Some gateway errors come back with an empty body.
        let mut decoded: ResponseMessage = if raw.body.iter().all(u8::is_ascii_whitespace) {
            ResponseMessage::default()
        } else {
            serde_json::from_slice(&raw.body)?
        };
        decoded.http_status_code = raw.status;
        decoded.raw_data = raw.body_text();

        Ok(decoded)
    }
}

fn classify(response: ResponseMessage) -> Result<ResponseMessage> {
    if response.http_status_code >= 400 || !response.errors.is_empty() {
        warn!("Gateway rejected message: {}", super::describe_failure(&response));
        return Err(ClientError::Api {
            response: Box::new(response),
        });
    }

    info!(
        "Message accepted with id {}",
        response.message_id().unwrap_or_default()
    );
    Ok(response)
}

/// Paths given as absolute URLs are used as is.
fn join_url(base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else if path.starts_with('/') {
        format!("{}{}", base_url, path)
    } else {
        format!("{}/{}", base_url, path)
    }
}
