//! Configuration values for the bridge.
//!
//! Connection parameters are an explicit value handed to the client
//! factories; nothing here is process-global.

use std::time::Duration;

use crate::errors::BridgeError;
use crate::receiver::ConsumerConfig;
use crate::topic::SubscriptionProtocol;

/// Transport connection parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Endpoint override, e.g. `http://localhost:4566` for LocalStack.
    pub endpoint: Option<String>,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

/// Topic to create and the two subscribers wired to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicConfig {
    pub topic_name: String,
    /// Protocol of the durable queue subscriber. Its endpoint is derived from
    /// the topic identifier.
    pub queue_protocol: SubscriptionProtocol,
    pub subscriber_endpoint: String,
    pub subscriber_protocol: SubscriptionProtocol,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueConfig {
    pub queue_name: String,
    /// Resolve the queue address once and reuse it instead of resolving it
    /// before every call.
    pub cache_address: bool,
}

impl QueueConfig {
    pub fn new(queue_name: impl Into<String>) -> Self {
        QueueConfig {
            queue_name: queue_name.into(),
            cache_address: false,
        }
    }
}

/// Every recognized option of the bridge.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub connection: ConnectionConfig,
    pub topic: TopicConfig,
    pub queue: QueueConfig,
    pub consumer: ConsumerConfig,
}

impl BridgeConfig {
    /// Loads the configuration from process environment variables.
    ///
    /// Recognized variables:
    /// - `BRIDGE_TOPIC_NAME`, `BRIDGE_QUEUE_NAME` (required)
    /// - `BRIDGE_SUBSCRIBER_ENDPOINT`, `BRIDGE_SUBSCRIBER_PROTOCOL` (required)
    /// - `BRIDGE_QUEUE_PROTOCOL` (default `sqs`)
    /// - `BRIDGE_CACHE_QUEUE_ADDRESS` (default `false`)
    /// - `BRIDGE_MAX_MESSAGES`, `BRIDGE_WAIT_TIME_SECONDS`, `BRIDGE_CYCLE_DEADLINE_MS`,
    ///   `BRIDGE_IDLE_PAUSE_MS`
    /// - `AWS_ENDPOINT_URL`, `AWS_REGION`, `AWS_ACCESS_KEY_ID`,
    ///   `AWS_SECRET_ACCESS_KEY`, `AWS_SESSION_TOKEN`
    pub fn from_env() -> Result<Self, BridgeError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads the configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BridgeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| BridgeError::InvalidConfiguration(format!("{key} is not set")))
        };

        let connection = ConnectionConfig {
            endpoint: get("AWS_ENDPOINT_URL"),
            region: required("AWS_REGION")?,
            access_key_id: required("AWS_ACCESS_KEY_ID")?,
            secret_access_key: required("AWS_SECRET_ACCESS_KEY")?,
            session_token: get("AWS_SESSION_TOKEN"),
        };

        let topic = TopicConfig {
            topic_name: required("BRIDGE_TOPIC_NAME")?,
            queue_protocol: get("BRIDGE_QUEUE_PROTOCOL")
                .as_deref()
                .unwrap_or("sqs")
                .parse()?,
            subscriber_endpoint: required("BRIDGE_SUBSCRIBER_ENDPOINT")?,
            subscriber_protocol: required("BRIDGE_SUBSCRIBER_PROTOCOL")?.parse()?,
        };
        if !topic.queue_protocol.is_queue() {
            return Err(BridgeError::InvalidConfiguration(format!(
                "BRIDGE_QUEUE_PROTOCOL '{}' is not a queue protocol",
                topic.queue_protocol
            )));
        }

        let queue = QueueConfig {
            queue_name: required("BRIDGE_QUEUE_NAME")?,
            cache_address: parse_or(
                get("BRIDGE_CACHE_QUEUE_ADDRESS"),
                "BRIDGE_CACHE_QUEUE_ADDRESS",
                false,
            )?,
        };

        let defaults = ConsumerConfig::default();
        let consumer = ConsumerConfig {
            max_number_of_messages: parse_or(
                get("BRIDGE_MAX_MESSAGES"),
                "BRIDGE_MAX_MESSAGES",
                defaults.max_number_of_messages,
            )?,
            wait_time_seconds: parse_or(
                get("BRIDGE_WAIT_TIME_SECONDS"),
                "BRIDGE_WAIT_TIME_SECONDS",
                defaults.wait_time_seconds,
            )?,
            cycle_deadline: get("BRIDGE_CYCLE_DEADLINE_MS")
                .map(|v| parse_value::<u64>(&v, "BRIDGE_CYCLE_DEADLINE_MS"))
                .transpose()?
                .map(Duration::from_millis),
            idle_pause: get("BRIDGE_IDLE_PAUSE_MS")
                .map(|v| parse_value::<u64>(&v, "BRIDGE_IDLE_PAUSE_MS"))
                .transpose()?
                .map_or(defaults.idle_pause, Duration::from_millis),
            ..defaults
        };

        Ok(BridgeConfig {
            connection,
            topic,
            queue,
            consumer,
        })
    }
}

fn parse_value<T: std::str::FromStr>(value: &str, key: &str) -> Result<T, BridgeError> {
    value
        .trim()
        .parse()
        .map_err(|_| {
            BridgeError::InvalidConfiguration(format!("{key} has invalid value '{value}'"))
        })
}

fn parse_or<T: std::str::FromStr>(
    value: Option<String>,
    key: &str,
    default: T,
) -> Result<T, BridgeError> {
    match value {
        Some(v) => parse_value(&v, key),
        None => Ok(default),
    }
}
