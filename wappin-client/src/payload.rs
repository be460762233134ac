//! Request and response bodies of the v1 API.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use wappin_core::{phone, GatewayStatus};

use crate::config::WappinConfig;

/// Request for sending an HSM (template) message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestWhatsappMessage {
    /// Client id; filled from the configuration when empty.
    #[serde(default)]
    pub client_id: String,

    /// Project id; filled from the configuration when empty.
    #[serde(default)]
    pub project_id: String,

    /// Template name registered with the gateway.
    #[serde(rename = "type")]
    pub template_type: String,

    /// Recipient phone number.
    pub recipient_number: String,

    /// Template parameters keyed by position (`"1"`, `"2"`, ...).
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

impl RequestWhatsappMessage {
    /// Create a request for a template and recipient.
    pub fn new(template_type: impl Into<String>, recipient_number: impl Into<String>) -> Self {
        Self {
            template_type: template_type.into(),
            recipient_number: recipient_number.into(),
            ..Default::default()
        }
    }

    /// Add a template parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Copy of this request as it goes on the wire: recipient number in
    /// international form and missing ids taken from `config`.
    pub fn normalized(&self, config: &WappinConfig) -> Self {
        let mut request = self.clone();
        request.recipient_number = phone::normalize_id(&self.recipient_number);
        if request.client_id.is_empty() {
            request.client_id = config.client_id.clone();
        }
        if request.project_id.is_empty() {
            request.project_id = config.project_id.clone();
        }
        request
    }
}

/// Response of the HSM send endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMessage {
    /// Id assigned to the message by the gateway.
    #[serde(default)]
    pub message_id: String,

    /// Gateway status code, as sent.
    #[serde(default)]
    pub status: String,

    /// Gateway message, as sent.
    #[serde(default)]
    pub message: String,

    /// Extra data, if any.
    #[serde(default)]
    pub data: Option<serde_json::Value>,

    /// HTTP status code of the response.
    #[serde(skip)]
    pub http_status_code: u16,

    /// Response body exactly as received.
    #[serde(skip)]
    pub raw_data: String,
}

impl ResponseMessage {
    /// The status field mapped to a known gateway code.
    pub fn gateway_status(&self) -> GatewayStatus {
        GatewayStatus::from_code(&self.status)
    }

    /// Whether the HTTP status or the status field reports an error.
    pub fn is_error(&self) -> bool {
        self.http_status_code >= 400 || self.gateway_status().is_error()
    }
}

/// Body of the token endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccessTokenResponse {
    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub data: Option<AccessTokenData>,
}

/// Token details inside [`AccessTokenResponse`].
#[derive(Clone, Default, Deserialize)]
pub struct AccessTokenData {
    pub access_token: String,

    /// `YYYY-MM-DD HH:MM:SS` at UTC+7.
    pub expired_datetime: String,

    #[serde(default)]
    pub token_type: String,
}

impl std::fmt::Debug for AccessTokenData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessTokenData")
            .field("access_token", &"[REDACTED]")
            .field("expired_datetime", &self.expired_datetime)
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// Delivery callback posted by the gateway to the caller's webhook.
///
/// This crate only defines the shape; handling it is up to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallbackData {
    pub message_id: String,
    pub client_id: String,
    pub client_name: String,
    pub project_id: String,
    pub project_name: String,
    pub status_messages: String,
    pub message_content: String,
    pub environment: String,
    pub timestamp: String,
    pub sender_number: String,
    pub callback_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_type_field() {
        let request =
            RequestWhatsappMessage::new("otp_code", "6281213141516").with_param("1", "202404");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["type"], "otp_code");
        assert_eq!(json["recipient_number"], "6281213141516");
        assert_eq!(json["params"]["1"], "202404");
    }

    #[test]
    fn test_normalized_fills_ids_and_number() {
        let config = WappinConfig::new("0123", "sk").with_project_id("4567");
        let request = RequestWhatsappMessage::new("otp_code", "0812-1314-1516");

        let normalized = request.normalized(&config);

        assert_eq!(normalized.recipient_number, "6281213141516");
        assert_eq!(normalized.client_id, "0123");
        assert_eq!(normalized.project_id, "4567");
        // original untouched
        assert_eq!(request.recipient_number, "0812-1314-1516");
    }

    #[test]
    fn test_normalized_keeps_explicit_ids() {
        let config = WappinConfig::new("0123", "sk").with_project_id("4567");
        let mut request = RequestWhatsappMessage::new("otp_code", "0812");
        request.client_id = "override".to_string();

        assert_eq!(request.normalized(&config).client_id, "override");
    }

    #[test]
    fn test_response_error_classification() {
        let mut response: ResponseMessage = serde_json::from_str(
            r#"{"message_id":"id-124","status":"600","message":"Not delivered, Contact validate Failed"}"#,
        )
        .unwrap();
        response.http_status_code = 200;
        assert!(response.is_error());

        response.status = "200".to_string();
        assert!(!response.is_error());

        response.http_status_code = 502;
        assert!(response.is_error());
    }

    #[test]
    fn test_token_response_with_null_data() {
        let body: AccessTokenResponse = serde_json::from_str(
            r#"{ "status": "401", "message": "Invalid credential", "data": null }"#,
        )
        .unwrap();
        assert_eq!(body.status, "401");
        assert!(body.data.is_none());
    }

    #[test]
    fn test_token_data_debug_redacts_token() {
        let data = AccessTokenData {
            access_token: "677b800f".to_string(),
            expired_datetime: "2020-12-28 10:20:23".to_string(),
            token_type: "Bearer".to_string(),
        };
        assert!(!format!("{:?}", data).contains("677b800f"));
    }

    #[test]
    fn test_callback_tolerates_missing_fields() {
        let callback: CallbackData =
            serde_json::from_str(r#"{"message_id":"id-1","status_messages":"delivered"}"#).unwrap();
        assert_eq!(callback.message_id, "id-1");
        assert_eq!(callback.status_messages, "delivered");
        assert!(callback.sender_number.is_empty());
    }
}
