use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Boxed cause carried by the bridge errors and returned by message handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error types for topic, queue and consume-loop operations.
///
/// Every failure is recoverable at the batch level: the next consume cycle
/// or the next call may succeed.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Creating a topic or a queue failed at the transport level.
    #[error("failed to create {resource} '{name}': {source}")]
    CreateFailed {
        resource: &'static str,
        name: String,
        #[source]
        source: BoxError,
    },

    /// The queue address could not be resolved from its name.
    #[error("failed to resolve address of queue '{queue_name}': {source}")]
    ResolveFailed {
        queue_name: String,
        #[source]
        source: BoxError,
    },

    /// Subscribing an endpoint to a topic failed.
    #[error("unable to subscribe '{endpoint}' to topic '{topic_id}': {source}")]
    SubscriptionFailed {
        topic_id: String,
        endpoint: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to publish message: {source}")]
    PublishFailed {
        #[source]
        source: BoxError,
    },

    #[error("failed to send message to queue '{queue_name}': {source}")]
    SendFailed {
        queue_name: String,
        #[source]
        source: BoxError,
    },

    #[error("unable to receive messages from queue '{queue_name}': {source}")]
    ReceiveFailed {
        queue_name: String,
        #[source]
        source: BoxError,
    },

    /// Acknowledging a delivery failed; the message stays on the queue and
    /// becomes visible again once its visibility timeout expires.
    #[error("unable to delete message with receipt handle '{receipt_handle}': {source}")]
    DeleteFailed {
        receipt_handle: String,
        #[source]
        source: BoxError,
    },

    /// The transport call succeeded but returned no usable identifier or address.
    #[error("{operation} returned no {field}")]
    EmptyResult {
        operation: &'static str,
        field: &'static str,
    },

    /// The application handler rejected a message.
    #[error("handler failed for message '{message_id}': {source}")]
    HandlerFailed {
        message_id: String,
        #[source]
        source: BoxError,
    },

    #[error("invalid publish target: {0}")]
    InvalidPublishTarget(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A consume cycle did not complete within its deadline.
    #[error("consume cycle exceeded its deadline of {0:?}")]
    DeadlineExceeded(Duration),
}

/// Transport-level failure reported by a topic or queue collaborator.
#[derive(Debug, Error)]
pub struct TransportError(String);

impl TransportError {
    /// Creates a new `TransportError` with the provided message.
    pub fn new(message: impl Into<String>) -> Self {
        TransportError(message.into())
    }

    /// Captures the full context of an AWS SDK error, including the service
    /// error code and message.
    pub fn from_sdk<E>(err: &E) -> Self
    where
        E: std::error::Error,
    {
        TransportError(format!("{}", aws_sdk_sqs::error::DisplayErrorContext(err)))
    }
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TransportError {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(TransportError::new(s))
    }
}

impl From<String> for TransportError {
    fn from(s: String) -> Self {
        TransportError::new(s)
    }
}

impl From<&str> for TransportError {
    fn from(s: &str) -> Self {
        TransportError::new(s)
    }
}
