use async_trait::async_trait;
use aws_sdk_sns::primitives::Blob;
use aws_sdk_sns::types::MessageAttributeValue;

use crate::errors::TransportError;
use crate::message::{MessageAttribute, PublishRequest, PublishTarget};
use crate::transport::TopicTransport;

/// `TopicTransport` backed by an AWS SNS client.
#[derive(Debug, Clone)]
pub struct SnsTopicTransport {
    sns_client: aws_sdk_sns::Client,
}

impl SnsTopicTransport {
    pub fn new(sns_client: aws_sdk_sns::Client) -> Self {
        SnsTopicTransport { sns_client }
    }
}

fn to_sns_attribute(value: &MessageAttribute) -> Result<MessageAttributeValue, TransportError> {
    let builder = MessageAttributeValue::builder().data_type(value.data_type());
    let builder = match value {
        MessageAttribute::Binary(bytes) => builder.binary_value(Blob::new(bytes.clone())),
        other => builder.set_string_value(other.string_value().map(str::to_string)),
    };
    builder
        .build()
        .map_err(|e| TransportError::new(format!("invalid message attribute: {e}")))
}

#[async_trait]
impl TopicTransport for SnsTopicTransport {
    async fn create_topic(&self, name: &str) -> Result<Option<String>, TransportError> {
        let output = self
            .sns_client
            .create_topic()
            .name(name)
            .send()
            .await
            .map_err(|e| TransportError::from_sdk(&e))?;

        Ok(output.topic_arn().map(str::to_string))
    }

    async fn subscribe(
        &self,
        topic_id: &str,
        endpoint: &str,
        protocol: &str,
    ) -> Result<Option<String>, TransportError> {
        let output = self
            .sns_client
            .subscribe()
            .topic_arn(topic_id)
            .endpoint(endpoint)
            .protocol(protocol)
            .send()
            .await
            .map_err(|e| TransportError::from_sdk(&e))?;

        Ok(output.subscription_arn().map(str::to_string))
    }

    async fn publish(&self, request: &PublishRequest) -> Result<Option<String>, TransportError> {
        let mut publish = self
            .sns_client
            .publish()
            .message(&request.message)
            .set_subject(request.subject.clone())
            .set_message_structure(request.message_structure.clone());
        publish = match &request.target {
            PublishTarget::Topic(arn) => publish.topic_arn(arn),
            PublishTarget::Target(arn) => publish.target_arn(arn),
            PublishTarget::PhoneNumber(number) => publish.phone_number(number),
        };
        for (key, value) in &request.attributes {
            publish = publish.message_attributes(key, to_sns_attribute(value)?);
        }

        let output = publish
            .send()
            .await
            .map_err(|e| TransportError::from_sdk(&e))?;

        Ok(output.message_id().map(str::to_string))
    }
}
