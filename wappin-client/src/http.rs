//! Shared HTTP plumbing for both API generations.

use std::time::Duration;

use reqwest::header::{HeaderValue, CONTENT_TYPE};
use wappin_core::TokenError;

/// Body and status of a response, read in full.
pub(crate) struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub async fn read(response: reqwest::Response) -> Result<Self, reqwest::Error> {
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        Ok(Self { status, body })
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Build the default transport with the given timeout.
pub(crate) fn build_http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().timeout(timeout).build()
}

/// POST an empty JSON request with basic auth, as both token endpoints expect.
pub(crate) async fn post_basic_auth(
    http: &reqwest::Client,
    url: &str,
    username: &str,
    password: &str,
) -> Result<RawResponse, TokenError> {
    let response = http
        .post(url)
        .basic_auth(username, Some(password))
        .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
        .send()
        .await
        .map_err(network)?;

    RawResponse::read(response).await.map_err(network)
}

fn network(e: reqwest::Error) -> TokenError {
    TokenError::Network {
        message: e.to_string(),
    }
}
