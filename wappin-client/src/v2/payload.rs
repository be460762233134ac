//! v2 request bodies.

use serde::{Deserialize, Serialize};
use wappin_core::phone;

/// Message type for template messages.
pub const MESSAGE_TYPE_TEMPLATE: &str = "template";
/// Message and parameter type for plain text.
pub const MESSAGE_TYPE_TEXT: &str = "text";

/// Template component carrying header parameters.
pub const COMPONENT_TYPE_HEADER: &str = "header";
/// Template component carrying body parameters.
pub const COMPONENT_TYPE_BODY: &str = "body";
/// Template component carrying button parameters.
pub const COMPONENT_TYPE_BUTTON: &str = "button";

/// Recipient type for a single user.
pub const RECIPIENT_TYPE_INDIVIDUAL: &str = "individual";

/// Language policy used when none is given.
pub const DEFAULT_LANGUAGE_POLICY: &str = "deterministic";

/// Request for sending a message. Only template messages are supported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMessage {
    /// Recipient phone number.
    pub to: String,

    /// Message type, e.g. [`MESSAGE_TYPE_TEMPLATE`].
    #[serde(rename = "type")]
    pub message_type: String,

    #[serde(default)]
    pub recipient_type: String,

    pub template: TemplateRequest,
}

/// Template reference and its dynamic values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRequest {
    pub name: String,
    pub language: LanguageRequest,
    /// Filled from the client configuration when empty.
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub components: Vec<ComponentRequest>,
}

/// Template language selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageRequest {
    /// Defaults to [`DEFAULT_LANGUAGE_POLICY`] when empty.
    #[serde(default)]
    pub policy: String,
    pub code: String,
}

/// One component of a template with its parameters.
///
/// `sub_type` and `index` only apply to button components.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRequest {
    #[serde(rename = "type")]
    pub component_type: String,
    #[serde(rename = "subType", default)]
    pub sub_type: String,
    #[serde(default)]
    pub parameters: Vec<ComponentParameterRequest>,
    #[serde(default)]
    pub index: i32,
}

/// A single template parameter value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentParameterRequest {
    #[serde(rename = "type")]
    pub parameter_type: String,
    pub text: String,
}

impl ComponentParameterRequest {
    /// A text parameter.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            parameter_type: MESSAGE_TYPE_TEXT.to_string(),
            text: text.into(),
        }
    }
}

impl ComponentRequest {
    /// A body component with text parameters.
    pub fn body<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            component_type: COMPONENT_TYPE_BODY.to_string(),
            parameters: texts.into_iter().map(ComponentParameterRequest::text).collect(),
            ..Default::default()
        }
    }
}

impl RequestMessage {
    /// A template message to `to` in language `language_code`.
    pub fn template(
        to: impl Into<String>,
        name: impl Into<String>,
        language_code: impl Into<String>,
    ) -> Self {
        Self {
            to: to.into(),
            message_type: MESSAGE_TYPE_TEMPLATE.to_string(),
            recipient_type: RECIPIENT_TYPE_INDIVIDUAL.to_string(),
            template: TemplateRequest {
                name: name.into(),
                language: LanguageRequest {
                    policy: DEFAULT_LANGUAGE_POLICY.to_string(),
                    code: language_code.into(),
                },
                ..Default::default()
            },
        }
    }

    /// Add a component.
    pub fn with_component(mut self, component: ComponentRequest) -> Self {
        self.template.components.push(component);
        self
    }

    /// Copy of this request as it goes on the wire.
    pub(crate) fn normalized(&self, default_namespace: &str) -> Self {
        let mut request = self.clone();
        request.to = phone::normalize_id(&self.to);
        if request.template.namespace.is_empty() {
            request.template.namespace = default_namespace.to_string();
        }
        if request.template.language.policy.is_empty() {
            request.template.language.policy = DEFAULT_LANGUAGE_POLICY.to_string();
        }
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_request_wire_shape() {
        let request = RequestMessage::template("6288889999", "testing_webhook_marketing", "id")
            .with_component(ComponentRequest::body(["hari ini", "Rp. 999999999"]));
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["type"], "template");
        assert_eq!(json["recipient_type"], "individual");
        assert_eq!(json["template"]["language"]["policy"], "deterministic");
        assert_eq!(json["template"]["components"][0]["type"], "body");
        assert_eq!(json["template"]["components"][0]["subType"], "");
        assert_eq!(json["template"]["components"][0]["parameters"][1]["text"], "Rp. 999999999");
    }

    #[test]
    fn test_normalized_fills_defaults() {
        let mut request = RequestMessage::template("088889999", "promo", "id");
        request.template.language.policy.clear();

        let normalized = request.normalized("ns-1");

        assert_eq!(normalized.to, "6288889999");
        assert_eq!(normalized.template.namespace, "ns-1");
        assert_eq!(normalized.template.language.policy, DEFAULT_LANGUAGE_POLICY);
    }

    #[test]
    fn test_normalized_keeps_explicit_namespace() {
        let mut request = RequestMessage::template("6288889999", "promo", "id");
        request.template.namespace = "explicit".to_string();

        assert_eq!(request.normalized("ns-1").template.namespace, "explicit");
    }
}
