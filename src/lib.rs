//! # SNS/SQS Bridge
//!
//! An asynchronous message-delivery bridge over AWS SNS and SQS. It creates a
//! fan-out topic, subscribes a durable queue plus an independent endpoint to
//! it, and drives a receive-handle-delete loop that acknowledges a message
//! only after the application handler accepted it.
//!
//! ## Features
//!
//! - Topic creation with a derived queue subscription and an external subscriber
//! - Publishing with typed message attributes
//! - Queue creation, address resolution, send, receive and delete primitives
//! - At-least-once consume loop with single-method handlers
//! - Functional handlers with shared resources
//! - Optional per-cycle deadline and graceful shutdown of many loops
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use rs_sns_sqs_bridge::{
//!     client::{create_sns_client, create_sqs_client},
//!     config::BridgeConfig,
//!     errors::BoxError,
//!     queue::QueueService,
//!     receiver::ConsumeLoop,
//!     topic::TopicService,
//!     transport::{SnsTopicTransport, SqsQueueTransport},
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BridgeConfig::from_env()?;
//!     let sns = SnsTopicTransport::new(create_sns_client(&config.connection));
//!     let sqs = SqsQueueTransport::new(create_sqs_client(&config.connection));
//!
//!     let queue = QueueService::new(Arc::new(sqs), config.queue.clone());
//!     queue.create_without_attributes().await?;
//!     let topic = TopicService::new(Arc::new(sns), config.topic.clone());
//!     topic.create().await?;
//!
//!     let consumer = ConsumeLoop::with_handler_fn(
//!         queue,
//!         |body: String, prefix: String| async move {
//!             println!("{prefix}: {body}");
//!             Ok::<(), BoxError>(())
//!         },
//!         "orders".to_string(),
//!         config.consumer.clone(),
//!     );
//!     let summary = consumer.run_cycle().await?;
//!     println!("acknowledged {} messages", summary.acknowledged);
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod errors;
pub mod message;
pub mod queue;
pub mod receiver;
pub mod topic;
pub mod transport;

#[cfg(test)]
mod test_utils;
