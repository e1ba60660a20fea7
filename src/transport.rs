//! Collaborator interfaces the bridge consumes.
//!
//! Each method is one network call. Identifiers come back as `Option` so the
//! services can tell a transport fault apart from a successful call that
//! returned nothing usable.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::errors::TransportError;
use crate::message::{Message, MessageAttributes, PublishRequest, ReceiptHandle};

mod sns;
mod sqs;

pub use sns::SnsTopicTransport;
pub use sqs::SqsQueueTransport;

/// Topic operations of a fan-out broker.
#[async_trait]
pub trait TopicTransport: Send + Sync {
    async fn create_topic(&self, name: &str) -> Result<Option<String>, TransportError>;

    async fn subscribe(
        &self,
        topic_id: &str,
        endpoint: &str,
        protocol: &str,
    ) -> Result<Option<String>, TransportError>;

    async fn publish(&self, request: &PublishRequest) -> Result<Option<String>, TransportError>;
}

/// Queue operations of a message broker.
#[async_trait]
pub trait QueueTransport: Send + Sync {
    async fn create_queue(
        &self,
        name: &str,
        attributes: Option<&HashMap<String, String>>,
    ) -> Result<Option<String>, TransportError>;

    async fn resolve_queue_address(&self, name: &str) -> Result<Option<String>, TransportError>;

    async fn send_message(
        &self,
        queue_address: &str,
        body: &str,
        attributes: &MessageAttributes,
    ) -> Result<Option<String>, TransportError>;

    /// Requests up to `max_count` deliveries, waiting at most
    /// `wait_time_seconds` for the first one to arrive.
    async fn receive_messages(
        &self,
        queue_address: &str,
        max_count: i32,
        wait_time_seconds: i32,
    ) -> Result<Vec<Message>, TransportError>;

    async fn delete_message(
        &self,
        queue_address: &str,
        receipt_handle: &ReceiptHandle,
    ) -> Result<(), TransportError>;
}
