//! Client for the v2 API.
//!
//! v2 logs in with a username and password, caches the returned token
//! (36 hours short of its stated expiry) and sends template messages in the
//! WhatsApp Business API shape.

mod client;
mod config;
mod payload;
mod response;

pub use client::{LoginTokenFetcher, V2Client, V2ClientBuilder, TOKEN_EXPIRY_MARGIN_HOURS};
pub use config::{V2Config, DEFAULT_LOGIN_PATH, DEFAULT_MESSAGES_PATH, DEFAULT_V2_BASE_URL};
pub use payload::{
    ComponentParameterRequest, ComponentRequest, LanguageRequest, RequestMessage, TemplateRequest,
    COMPONENT_TYPE_BODY, COMPONENT_TYPE_BUTTON, COMPONENT_TYPE_HEADER, DEFAULT_LANGUAGE_POLICY,
    MESSAGE_TYPE_TEMPLATE, MESSAGE_TYPE_TEXT, RECIPIENT_TYPE_INDIVIDUAL,
};
pub use response::{
    ApiError, MessageResponse, MetaResponse, ResponseLogin, ResponseMessage, UserResponse,
};

/// One-line description of a rejected v2 response.
pub(crate) fn describe_failure(response: &ResponseMessage) -> String {
    match response.errors.first() {
        Some(error) => format!(
            "error Wappin code:{}, title:{} and details:{}",
            error.code, error.title, error.details
        ),
        None => format!("error Wappin http status:{}", response.http_status_code),
    }
}
