use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::config::QueueConfig;
use crate::errors::{BoxError, BridgeError};
use crate::message::{Message, MessageAttributes, ReceiptHandle};
use crate::transport::QueueTransport;

/// Largest batch a single receive call may request.
pub const MAX_RECEIVE_BATCH: i32 = 10;

/// Longest long-poll wait a single receive call may request.
pub const MAX_WAIT_TIME_SECONDS: i32 = 20;

/// Queue primitives used by publishers and by the consume loop.
///
/// The queue address is resolved from the queue name before each send,
/// receive and delete unless `QueueConfig::cache_address` is set.
#[derive(Clone)]
pub struct QueueService {
    transport: Arc<dyn QueueTransport>,
    config: QueueConfig,
    address: Arc<OnceCell<String>>,
}

impl QueueService {
    pub fn new(transport: Arc<dyn QueueTransport>, config: QueueConfig) -> Self {
        QueueService {
            transport,
            config,
            address: Arc::new(OnceCell::new()),
        }
    }

    pub fn queue_name(&self) -> &str {
        &self.config.queue_name
    }

    /// Creates the queue, optionally with attributes such as
    /// `MessageRetentionPeriod` or `VisibilityTimeout`.
    pub async fn create(
        &self,
        attributes: Option<&HashMap<String, String>>,
    ) -> Result<String, BridgeError> {
        let queue_name = self.queue_name();
        let queue_address = self
            .transport
            .create_queue(queue_name, attributes)
            .await
            .map_err(|e| BridgeError::CreateFailed {
                resource: "queue",
                name: queue_name.to_string(),
                source: Box::new(e),
            })?
            .filter(|address| !address.is_empty())
            .ok_or(BridgeError::EmptyResult {
                operation: "create queue",
                field: "queue address",
            })?;

        tracing::info!(queue = %queue_name, address = %queue_address, "queue created");
        Ok(queue_address)
    }

    pub async fn create_without_attributes(&self) -> Result<String, BridgeError> {
        self.create(None).await
    }

    /// Resolves the queue address from the configured queue name.
    pub async fn resolve_address(&self) -> Result<String, BridgeError> {
        if self.config.cache_address {
            return self
                .address
                .get_or_try_init(|| self.lookup_address())
                .await
                .cloned();
        }
        self.lookup_address().await
    }

    async fn lookup_address(&self) -> Result<String, BridgeError> {
        let queue_name = self.queue_name();
        self.transport
            .resolve_queue_address(queue_name)
            .await
            .map_err(|e| BridgeError::ResolveFailed {
                queue_name: queue_name.to_string(),
                source: Box::new(e),
            })?
            .filter(|address| !address.is_empty())
            .ok_or(BridgeError::EmptyResult {
                operation: "resolve queue address",
                field: "queue address",
            })
    }

    /// Puts a message without attributes into the queue.
    pub async fn send(&self, body: &str) -> Result<String, BridgeError> {
        self.send_with_attributes(body, &MessageAttributes::new())
            .await
    }

    pub async fn send_with_attributes(
        &self,
        body: &str,
        attributes: &MessageAttributes,
    ) -> Result<String, BridgeError> {
        let queue_address = self.resolve_address().await?;

        let message_id = self
            .transport
            .send_message(&queue_address, body, attributes)
            .await
            .map_err(|e| BridgeError::SendFailed {
                queue_name: self.queue_name().to_string(),
                source: Box::new(e),
            })?
            .filter(|id| !id.is_empty())
            .ok_or(BridgeError::EmptyResult {
                operation: "send message",
                field: "message identifier",
            })?;

        tracing::debug!(queue = %self.queue_name(), %message_id, "message sent");
        Ok(message_id)
    }

    /// Requests up to `max_messages` deliveries, long polling for at most
    /// `wait_time_seconds`. An empty queue yields an empty batch.
    pub async fn receive(
        &self,
        max_messages: i32,
        wait_time_seconds: i32,
    ) -> Result<Vec<Message>, BridgeError> {
        let queue_address = self.resolve_address().await?;
        let max_messages = max_messages.clamp(1, MAX_RECEIVE_BATCH);
        let wait_time_seconds = wait_time_seconds.clamp(0, MAX_WAIT_TIME_SECONDS);

        let messages = self
            .transport
            .receive_messages(&queue_address, max_messages, wait_time_seconds)
            .await
            .map_err(|e| BridgeError::ReceiveFailed {
                queue_name: self.queue_name().to_string(),
                source: Box::new(e),
            })?;

        tracing::debug!(queue = %self.queue_name(), received = messages.len(), "receive completed");
        Ok(messages)
    }

    /// Acknowledges one delivery. Any failure, including resolving the queue
    /// address, is reported as `DeleteFailed`.
    pub async fn delete(&self, receipt_handle: &ReceiptHandle) -> Result<(), BridgeError> {
        let delete_failed = |source: BoxError| BridgeError::DeleteFailed {
            receipt_handle: receipt_handle.to_string(),
            source,
        };

        let queue_address = self
            .resolve_address()
            .await
            .map_err(|e| delete_failed(Box::new(e)))?;

        self.transport
            .delete_message(&queue_address, receipt_handle)
            .await
            .map_err(|e| delete_failed(Box::new(e)))
    }
}
