//! Domain model types.
//!
//! This module defines:
//! - [`Credential`] - The identifier/secret pair used to obtain gateway tokens
//! - [`GatewayStatus`] - Status codes the gateway reports in its JSON bodies

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::store::Secret;

/// Key prefix used when a cache key is derived from a credential.
pub const DEFAULT_TOKEN_KEY_PREFIX: &str = "manager:token:wappin";

/// Immutable identifier/secret pair used to authenticate against the gateway.
///
/// For the v1 API this is the client id and secret key; for v2 it is the
/// login username and password.
///
/// # Examples
///
/// ```
/// use wappin_core::Credential;
///
/// let credential = Credential::new("client-1", "secret");
/// assert_eq!(credential.cache_key(), "manager:token:wappin:client-1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    identifier: String,
    secret: Secret,
}

impl Credential {
    /// Create a new credential.
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: Secret::new(secret),
        }
    }

    /// The public half of the pair (client id or username).
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The private half of the pair.
    pub fn secret(&self) -> &Secret {
        &self.secret
    }

    /// Cache key under [`DEFAULT_TOKEN_KEY_PREFIX`].
    pub fn cache_key(&self) -> String {
        self.cache_key_with_prefix(DEFAULT_TOKEN_KEY_PREFIX)
    }

    /// Cache key under a custom prefix.
    ///
    /// Distinct identifiers always map to distinct keys, and the secret
    /// never appears in the key.
    pub fn cache_key_with_prefix(&self, prefix: &str) -> String {
        format!("{}:{}", prefix, self.identifier)
    }
}

/// Status codes the gateway reports in the `status` field of its bodies.
///
/// The field is a string on the wire; unknown values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GatewayStatus {
    /// `200`
    Success,
    /// `400` - the request carried no input.
    NoInputReceived,
    /// `401` - the bearer token is invalid or expired.
    InvalidCredential,
    /// `404` - the HSM template is missing or inactive.
    TemplateNotFoundOrInactive,
    /// `406`
    AuthNotRecognized,
    /// `407` - the caller's IP is not allow-listed.
    IpAddressNotAllowed,
    /// `601`
    ContactInvalid,
    /// Any other value.
    Other(String),
}

impl GatewayStatus {
    /// Map a status string to a known code.
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "200" => Self::Success,
            "400" => Self::NoInputReceived,
            "401" => Self::InvalidCredential,
            "404" => Self::TemplateNotFoundOrInactive,
            "406" => Self::AuthNotRecognized,
            "407" => Self::IpAddressNotAllowed,
            "601" => Self::ContactInvalid,
            other => Self::Other(other.to_string()),
        }
    }

    /// The wire representation.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => "200",
            Self::NoInputReceived => "400",
            Self::InvalidCredential => "401",
            Self::TemplateNotFoundOrInactive => "404",
            Self::AuthNotRecognized => "406",
            Self::IpAddressNotAllowed => "407",
            Self::ContactInvalid => "601",
            Self::Other(code) => code,
        }
    }

    /// Numeric value of the status, if it parses.
    pub fn numeric(&self) -> Option<u16> {
        self.as_str().parse().ok()
    }

    /// Whether the gateway reports an application error (numeric status ≥ 400).
    pub fn is_error(&self) -> bool {
        self.numeric().map(|code| code >= 400).unwrap_or(false)
    }
}

impl From<String> for GatewayStatus {
    fn from(s: String) -> Self {
        Self::from_code(&s)
    }
}

impl From<GatewayStatus> for String {
    fn from(status: GatewayStatus) -> Self {
        status.as_str().to_string()
    }
}

impl Default for GatewayStatus {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl fmt::Display for GatewayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
