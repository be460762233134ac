//! v2 response bodies.

use serde::{Deserialize, Deserializer, Serialize};

/// API version reported by the gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaResponse {
    #[serde(default)]
    pub version: String,
}

/// One entry of the `errors` array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code; the gateway sends it as a number or a string.
    #[serde(default, deserialize_with = "code_from_any")]
    pub code: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub details: String,
}

/// Id of an accepted message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub id: String,
}

/// Response of the messages endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub meta: MetaResponse,

    #[serde(default)]
    pub errors: Vec<ApiError>,

    #[serde(default)]
    pub messages: Vec<MessageResponse>,

    /// HTTP status code of the response.
    #[serde(skip)]
    pub http_status_code: u16,

    /// Response body exactly as received.
    #[serde(skip)]
    pub raw_data: String,
}

impl ResponseMessage {
    /// Id of the first accepted message.
    pub fn message_id(&self) -> Option<&str> {
        self.messages.first().map(|m| m.id.as_str())
    }
}

/// Token issued by the login endpoint.
#[derive(Clone, Default, Deserialize)]
pub struct UserResponse {
    pub token: String,
    /// RFC 3339 timestamp, normally at `+07:00`.
    #[serde(alias = "expires_after")]
    pub expired_after: String,
}

impl std::fmt::Debug for UserResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserResponse")
            .field("token", &"[REDACTED]")
            .field("expired_after", &self.expired_after)
            .finish()
    }
}

/// Response of the login endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseLogin {
    #[serde(default)]
    pub meta: MetaResponse,

    #[serde(default)]
    pub errors: Vec<ApiError>,

    #[serde(default, alias = "user")]
    pub users: Vec<UserResponse>,
}

fn code_from_any<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_accepts_number_and_string() {
        let body: ResponseMessage = serde_json::from_str(
            r#"{"meta":{"version":"1.0.4"},"errors":[{"code":1005,"title":"Access Denied","details":"Missing or invalid authentication credentials."}]}"#,
        )
        .unwrap();
        assert_eq!(body.errors[0].code, "1005");
        assert_eq!(body.meta.version, "1.0.4");

        let error: ApiError = serde_json::from_str(r#"{"code":"470","title":"t"}"#).unwrap();
        assert_eq!(error.code, "470");
    }

    #[test]
    fn test_message_id() {
        let body: ResponseMessage = serde_json::from_str(
            r#"{"meta":{"version":"1.0.4"},"messages":[{"id":"gBEGkYiEB1VXAglK1ZEqA1YKPrU"}]}"#,
        )
        .unwrap();
        assert_eq!(body.message_id(), Some("gBEGkYiEB1VXAglK1ZEqA1YKPrU"));
        assert!(body.errors.is_empty());
    }

    #[test]
    fn test_login_accepts_user_alias() {
        let login: ResponseLogin = serde_json::from_str(
            r#"{"user":[{"token":"t","expired_after":"2030-01-01T00:00:00+07:00"}]}"#,
        )
        .unwrap();
        assert_eq!(login.users.len(), 1);
        assert!(!format!("{:?}", login).contains("\"t\""));
    }
}
