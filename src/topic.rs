use std::str::FromStr;
use std::sync::Arc;

use crate::config::TopicConfig;
use crate::errors::BridgeError;
use crate::message::PublishRequest;
use crate::transport::TopicTransport;

/// Protocol token of topic identifiers.
const TOPIC_PROTOCOL_TOKEN: &str = "sns";
/// Protocol token of queue identifiers.
const QUEUE_PROTOCOL_TOKEN: &str = "sqs";

/// Delivery protocols a topic subscription can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriptionProtocol {
    Sqs,
    Http,
    Https,
    Email,
    EmailJson,
    Sms,
    Lambda,
    Application,
    Firehose,
}

impl SubscriptionProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionProtocol::Sqs => "sqs",
            SubscriptionProtocol::Http => "http",
            SubscriptionProtocol::Https => "https",
            SubscriptionProtocol::Email => "email",
            SubscriptionProtocol::EmailJson => "email-json",
            SubscriptionProtocol::Sms => "sms",
            SubscriptionProtocol::Lambda => "lambda",
            SubscriptionProtocol::Application => "application",
            SubscriptionProtocol::Firehose => "firehose",
        }
    }

    /// Whether subscribers of this kind are queues, whose endpoint is derived
    /// from the topic identifier.
    pub fn is_queue(&self) -> bool {
        matches!(self, SubscriptionProtocol::Sqs)
    }
}

impl std::fmt::Display for SubscriptionProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionProtocol {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let protocol = match s.trim().to_ascii_lowercase().as_str() {
            "sqs" => SubscriptionProtocol::Sqs,
            "http" => SubscriptionProtocol::Http,
            "https" => SubscriptionProtocol::Https,
            "email" => SubscriptionProtocol::Email,
            "email-json" => SubscriptionProtocol::EmailJson,
            "sms" => SubscriptionProtocol::Sms,
            "lambda" => SubscriptionProtocol::Lambda,
            "application" => SubscriptionProtocol::Application,
            "firehose" => SubscriptionProtocol::Firehose,
            other => {
                return Err(BridgeError::InvalidConfiguration(format!(
                    "unknown subscription protocol '{other}'"
                )));
            }
        };
        Ok(protocol)
    }
}

/// Derives the queue endpoint that subscribes to a topic from the topic's
/// identifier by swapping the first protocol token.
///
/// This relies on topic and queue identifiers sharing the same shape apart
/// from that token (`arn:aws:sns:...` vs `arn:aws:sqs:...`). It is a vendor
/// naming convention, not a general address transform; swap this function
/// for an explicit mapping if the convention does not hold.
pub fn derive_queue_endpoint(topic_id: &str) -> String {
    topic_id.replacen(TOPIC_PROTOCOL_TOKEN, QUEUE_PROTOCOL_TOKEN, 1)
}

/// Creates topics, wires their subscriptions and publishes to them.
#[derive(Clone)]
pub struct TopicService {
    transport: Arc<dyn TopicTransport>,
    config: TopicConfig,
}

impl TopicService {
    pub fn new(transport: Arc<dyn TopicTransport>, config: TopicConfig) -> Self {
        TopicService { transport, config }
    }

    pub fn config(&self) -> &TopicConfig {
        &self.config
    }

    /// Creates the configured topic and subscribes, in order, the derived
    /// queue endpoint and the configured external subscriber.
    ///
    /// Fails with `InvalidConfiguration` before any transport call when the
    /// queue protocol is not a queue kind.
    ///
    /// A failing subscription step is not rolled back: the topic may remain
    /// without its queue subscriber until `create` is retried.
    pub async fn create(&self) -> Result<String, BridgeError> {
        if !self.config.queue_protocol.is_queue() {
            return Err(BridgeError::InvalidConfiguration(format!(
                "queue protocol '{}' is not a queue subscription",
                self.config.queue_protocol
            )));
        }

        let topic_name = &self.config.topic_name;
        let topic_id = self
            .transport
            .create_topic(topic_name)
            .await
            .map_err(|e| BridgeError::CreateFailed {
                resource: "topic",
                name: topic_name.clone(),
                source: Box::new(e),
            })?
            .filter(|id| !id.is_empty())
            .ok_or(BridgeError::EmptyResult {
                operation: "create topic",
                field: "topic identifier",
            })?;
        tracing::info!(topic = %topic_id, "topic created");

        let queue_endpoint = derive_queue_endpoint(&topic_id);
        self.subscribe_step(&topic_id, &queue_endpoint, self.config.queue_protocol)
            .await?;

        self.subscribe_step(
            &topic_id,
            &self.config.subscriber_endpoint,
            self.config.subscriber_protocol,
        )
        .await?;

        Ok(topic_id)
    }

    async fn subscribe_step(
        &self,
        topic_id: &str,
        endpoint: &str,
        protocol: SubscriptionProtocol,
    ) -> Result<String, BridgeError> {
        match self.subscribe_topic(topic_id, endpoint, protocol).await {
            Err(err @ BridgeError::EmptyResult { .. }) => Err(BridgeError::SubscriptionFailed {
                topic_id: topic_id.to_string(),
                endpoint: endpoint.to_string(),
                source: Box::new(err),
            }),
            other => other,
        }
    }

    /// Subscribes an endpoint with the given protocol to a topic.
    pub async fn subscribe_topic(
        &self,
        topic_id: &str,
        endpoint: &str,
        protocol: SubscriptionProtocol,
    ) -> Result<String, BridgeError> {
        let subscription_id = self
            .transport
            .subscribe(topic_id, endpoint, protocol.as_str())
            .await
            .map_err(|e| BridgeError::SubscriptionFailed {
                topic_id: topic_id.to_string(),
                endpoint: endpoint.to_string(),
                source: Box::new(e),
            })?
            .filter(|id| !id.is_empty())
            .ok_or(BridgeError::EmptyResult {
                operation: "subscribe",
                field: "subscription identifier",
            })?;

        tracing::info!(topic = %topic_id, %endpoint, %protocol, "endpoint subscribed");
        Ok(subscription_id)
    }

    /// Publishes a message to the request's topic, target or phone number.
    pub async fn publish_to_topic(&self, request: &PublishRequest) -> Result<String, BridgeError> {
        request.target.validate()?;

        let message_id = self
            .transport
            .publish(request)
            .await
            .map_err(|e| BridgeError::PublishFailed { source: Box::new(e) })?
            .filter(|id| !id.is_empty())
            .ok_or(BridgeError::EmptyResult {
                operation: "publish",
                field: "message identifier",
            })?;

        tracing::debug!(destination = %request.target.value(), %message_id, "message published");
        Ok(message_id)
    }
}
