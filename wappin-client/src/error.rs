//! Errors returned by the gateway clients.

use thiserror::Error;
use wappin_core::{TokenError, WappinError};

use crate::payload::ResponseMessage;
use crate::v2;

/// A well-formed gateway response that reports a failure.
///
/// Status and message are the gateway's own, verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("error Wappin status:{status} message:{message}")]
pub struct GatewayError {
    pub status: String,
    pub message: String,
}

impl GatewayError {
    /// Create a gateway error.
    pub fn new(status: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            message: message.into(),
        }
    }
}

/// Errors that can occur when talking to the gateway.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No request was given. Nothing was sent.
    #[error("nil arguments")]
    NilArguments,

    /// The v1 gateway rejected the message.
    ///
    /// The decoded response is kept for its raw body and HTTP status.
    #[error("{error}")]
    Gateway {
        #[source]
        error: GatewayError,
        response: Box<ResponseMessage>,
    },

    /// The v2 gateway rejected the message.
    #[error("{}", v2::describe_failure(.response))]
    Api { response: Box<v2::ResponseMessage> },

    /// The request never produced a response (connection, DNS, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not valid JSON of the expected shape.
    #[error("failed to decode gateway response: {0}")]
    Decode(#[from] serde_json::Error),

    /// No token could be obtained.
    #[error("token error: {0}")]
    Token(#[from] TokenError),

    /// The client configuration is invalid.
    #[error(transparent)]
    Config(#[from] WappinError),
}

impl ClientError {
    /// The gateway error, if the gateway rejected the request.
    pub fn gateway_error(&self) -> Option<&GatewayError> {
        match self {
            Self::Gateway { error, .. } => Some(error),
            _ => None,
        }
    }

    /// The decoded v1 response carried by a gateway rejection.
    pub fn response(&self) -> Option<&ResponseMessage> {
        match self {
            Self::Gateway { response, .. } => Some(response),
            _ => None,
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_display() {
        let err = GatewayError::new("404", "Template not found");
        assert_eq!(err.to_string(), "error Wappin status:404 message:Template not found");
    }

    #[test]
    fn test_nil_arguments_message() {
        assert_eq!(ClientError::NilArguments.to_string(), "nil arguments");
    }

    #[test]
    fn test_config_error_is_not_prefixed_twice() {
        let err = ClientError::from(WappinError::config("invalid base URL \"x\""));
        assert_eq!(err.to_string(), "configuration error: invalid base URL \"x\"");
    }

    #[test]
    fn test_gateway_variant_exposes_response() {
        let response = ResponseMessage {
            status: "601".to_string(),
            message: "Contact invalid".to_string(),
            http_status_code: 200,
            raw_data: "{}".to_string(),
            ..Default::default()
        };
        let err = ClientError::Gateway {
            error: GatewayError::new("601", "Contact invalid"),
            response: Box::new(response),
        };

        assert_eq!(err.gateway_error().unwrap().status, "601");
        assert_eq!(err.response().unwrap().raw_data, "{}");
        assert_eq!(err.to_string(), "error Wappin status:601 message:Contact invalid");
    }
}
