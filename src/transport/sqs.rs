use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_sqs::primitives::Blob;
use aws_sdk_sqs::types::{MessageAttributeValue, QueueAttributeName};

use crate::errors::TransportError;
use crate::message::{Message, MessageAttribute, MessageAttributes, ReceiptHandle};
use crate::transport::QueueTransport;

/// `QueueTransport` backed by an AWS SQS client.
#[derive(Debug, Clone)]
pub struct SqsQueueTransport {
    sqs_client: aws_sdk_sqs::Client,
}

impl SqsQueueTransport {
    pub fn new(sqs_client: aws_sdk_sqs::Client) -> Self {
        SqsQueueTransport { sqs_client }
    }
}

fn to_sqs_attribute(value: &MessageAttribute) -> Result<MessageAttributeValue, TransportError> {
    let builder = MessageAttributeValue::builder().data_type(value.data_type());
    let builder = match value {
        MessageAttribute::Binary(bytes) => builder.binary_value(Blob::new(bytes.clone())),
        other => builder.set_string_value(other.string_value().map(str::to_string)),
    };
    builder
        .build()
        .map_err(|e| TransportError::new(format!("invalid message attribute: {e}")))
}

fn from_sqs_attribute(value: &MessageAttributeValue) -> Option<MessageAttribute> {
    MessageAttribute::from_parts(
        value.data_type(),
        value.string_value(),
        value.binary_value().map(|b| b.as_ref()),
    )
}

fn from_sqs_message(message: &aws_sdk_sqs::types::Message) -> Option<Message> {
    let Some(receipt_handle) = message.receipt_handle() else {
        tracing::warn!(
            message_id = ?message.message_id(),
            "received a message without receipt handle"
        );
        return None;
    };
    let Some(body) = message.body() else {
        tracing::warn!(message_id = ?message.message_id(), "received a message with no body");
        return None;
    };

    let attributes = message
        .message_attributes()
        .map(|attrs| {
            attrs
                .iter()
                .filter_map(|(key, value)| from_sqs_attribute(value).map(|v| (key.clone(), v)))
                .collect()
        })
        .unwrap_or_default();

    Some(Message {
        message_id: message.message_id().unwrap_or_default().to_string(),
        body: body.to_string(),
        attributes,
        receipt_handle: ReceiptHandle::new(receipt_handle),
    })
}

#[async_trait]
impl QueueTransport for SqsQueueTransport {
    async fn create_queue(
        &self,
        name: &str,
        attributes: Option<&HashMap<String, String>>,
    ) -> Result<Option<String>, TransportError> {
        let attributes = attributes.map(|attrs| {
            attrs
                .iter()
                .map(|(k, v)| (QueueAttributeName::from(k.as_str()), v.clone()))
                .collect::<HashMap<_, _>>()
        });

        let output = self
            .sqs_client
            .create_queue()
            .queue_name(name)
            .set_attributes(attributes)
            .send()
            .await
            .map_err(|e| TransportError::from_sdk(&e))?;

        Ok(output.queue_url().map(str::to_string))
    }

    async fn resolve_queue_address(&self, name: &str) -> Result<Option<String>, TransportError> {
        let output = self
            .sqs_client
            .get_queue_url()
            .queue_name(name)
            .send()
            .await
            .map_err(|e| TransportError::from_sdk(&e))?;

        Ok(output.queue_url().map(str::to_string))
    }

    async fn send_message(
        &self,
        queue_address: &str,
        body: &str,
        attributes: &MessageAttributes,
    ) -> Result<Option<String>, TransportError> {
        let mut request = self
            .sqs_client
            .send_message()
            .queue_url(queue_address)
            .message_body(body);
        for (key, value) in attributes {
            request = request.message_attributes(key, to_sqs_attribute(value)?);
        }

        let output = request
            .send()
            .await
            .map_err(|e| TransportError::from_sdk(&e))?;

        Ok(output.message_id().map(str::to_string))
    }

    async fn receive_messages(
        &self,
        queue_address: &str,
        max_count: i32,
        wait_time_seconds: i32,
    ) -> Result<Vec<Message>, TransportError> {
        let output = self
            .sqs_client
            .receive_message()
            .queue_url(queue_address)
            .max_number_of_messages(max_count)
            .wait_time_seconds(wait_time_seconds)
            .message_attribute_names("All")
            .send()
            .await
            .map_err(|e| TransportError::from_sdk(&e))?;

        Ok(output.messages().iter().filter_map(from_sqs_message).collect())
    }

    async fn delete_message(
        &self,
        queue_address: &str,
        receipt_handle: &ReceiptHandle,
    ) -> Result<(), TransportError> {
        self.sqs_client
            .delete_message()
            .queue_url(queue_address)
            .receipt_handle(receipt_handle.as_str())
            .send()
            .await
            .map_err(|e| TransportError::from_sdk(&e))?;

        Ok(())
    }
}
