use std::collections::HashMap;

use crate::errors::BridgeError;

/// Typed value attached to a published or queued message.
///
/// The variants mirror the attribute data types understood by SNS and SQS.
/// Custom type labels such as `Number.float` collapse onto their base kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageAttribute {
    String(String),
    Number(String),
    /// A JSON array encoded as a string, e.g. `["a","b"]`.
    StringArray(String),
    Binary(Vec<u8>),
}

impl MessageAttribute {
    /// The wire data type label for this attribute.
    pub fn data_type(&self) -> &'static str {
        match self {
            MessageAttribute::String(_) => "String",
            MessageAttribute::Number(_) => "Number",
            MessageAttribute::StringArray(_) => "String.Array",
            MessageAttribute::Binary(_) => "Binary",
        }
    }

    /// The textual value, if this attribute is not binary.
    pub fn string_value(&self) -> Option<&str> {
        match self {
            MessageAttribute::String(v)
            | MessageAttribute::Number(v)
            | MessageAttribute::StringArray(v) => Some(v.as_str()),
            MessageAttribute::Binary(_) => None,
        }
    }

    pub fn binary_value(&self) -> Option<&[u8]> {
        match self {
            MessageAttribute::Binary(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// Rebuilds an attribute from its wire form. Returns `None` when the data
    /// type and the supplied value do not match.
    pub fn from_parts(
        data_type: &str,
        string_value: Option<&str>,
        binary_value: Option<&[u8]>,
    ) -> Option<Self> {
        if data_type.starts_with("Binary") {
            return binary_value.map(|v| MessageAttribute::Binary(v.to_vec()));
        }

        let value = string_value?.to_string();
        if data_type.starts_with("Number") {
            Some(MessageAttribute::Number(value))
        } else if data_type.starts_with("String.Array") {
            Some(MessageAttribute::StringArray(value))
        } else {
            Some(MessageAttribute::String(value))
        }
    }
}

/// Attribute set of a message. Keys are unique and order is irrelevant.
pub type MessageAttributes = HashMap<String, MessageAttribute>;

/// Single-use token binding one delivery to its acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReceiptHandle(String);

impl ReceiptHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        ReceiptHandle(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ReceiptHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A delivery received from a queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub message_id: String,
    pub body: String,
    pub attributes: MessageAttributes,
    /// Only valid between receipt and the end of handling.
    pub receipt_handle: ReceiptHandle,
}

/// Destination of a publish call. Exactly one addressing mode applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishTarget {
    Topic(String),
    /// A specific subscriber endpoint, e.g. a mobile application endpoint.
    Target(String),
    PhoneNumber(String),
}

impl PublishTarget {
    pub fn value(&self) -> &str {
        match self {
            PublishTarget::Topic(v) | PublishTarget::Target(v) | PublishTarget::PhoneNumber(v) => {
                v.as_str()
            }
        }
    }

    /// Rejects blank addresses before they reach the transport.
    pub fn validate(&self) -> Result<(), BridgeError> {
        if self.value().trim().is_empty() {
            let kind = match self {
                PublishTarget::Topic(_) => "topic identifier",
                PublishTarget::Target(_) => "target identifier",
                PublishTarget::PhoneNumber(_) => "phone number",
            };
            return Err(BridgeError::InvalidPublishTarget(format!("{kind} is empty")));
        }
        Ok(())
    }
}

/// A message to publish to a topic, a subscriber target or a phone number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    pub message: String,
    pub attributes: MessageAttributes,
    pub target: PublishTarget,
    pub subject: Option<String>,
    /// Set to `json` to deliver a different payload per protocol.
    pub message_structure: Option<String>,
}

impl PublishRequest {
    pub fn new(message: impl Into<String>, target: PublishTarget) -> Self {
        PublishRequest {
            message: message.into(),
            attributes: MessageAttributes::new(),
            target,
            subject: None,
            message_structure: None,
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: MessageAttribute) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }
}
