use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::{oneshot, watch};

use crate::errors::{BoxError, BridgeError};
use crate::queue::QueueService;

mod config;
mod functions;

pub use config::ConsumerConfig;
pub use functions::{HandlerFn, MessageHandler};

/// Outcome of one successful consume cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CycleSummary {
    /// Deliveries returned by the receive call.
    pub received: usize,
    /// Deliveries handled and deleted.
    pub acknowledged: usize,
}

/// Receive-handle-delete loop over one queue.
///
/// Each cycle receives a batch, hands every message to the handler in
/// receive order and deletes it only after the handler succeeded. The first
/// handler or delete failure ends the cycle; messages left undeleted become
/// visible again after the queue's visibility timeout.
pub struct ConsumeLoop {
    queue: QueueService,
    handler: Arc<dyn MessageHandler>,
    config: ConsumerConfig,
}

impl ConsumeLoop {
    pub fn new(
        queue: QueueService,
        handler: Arc<dyn MessageHandler>,
        config: ConsumerConfig,
    ) -> Self {
        ConsumeLoop {
            queue,
            handler,
            config,
        }
    }

    /// Builds a loop around an async function and a shared resource.
    pub fn with_handler_fn<RFn, Fut, TShared>(
        queue: QueueService,
        rv_fn: RFn,
        shared_resources: TShared,
        config: ConsumerConfig,
    ) -> Self
    where
        RFn: Fn(String, TShared) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
        TShared: Send + Sync + Clone + 'static,
    {
        let handler = HandlerFn::new(rv_fn, shared_resources);
        ConsumeLoop::new(queue, Arc::new(handler), config)
    }

    pub fn config(&self) -> &ConsumerConfig {
        &self.config
    }

    /// Runs one cycle, bounded by `cycle_deadline` when configured.
    pub async fn run_cycle(&self) -> Result<CycleSummary, BridgeError> {
        match self.config.cycle_deadline {
            Some(deadline) => tokio::time::timeout(deadline, self.consume_batch())
                .await
                .map_err(|_| BridgeError::DeadlineExceeded(deadline))?,
            None => self.consume_batch().await,
        }
    }

    async fn consume_batch(&self) -> Result<CycleSummary, BridgeError> {
        let queue_name = self.queue.queue_name();
        let messages = self
            .queue
            .receive(self.config.max_number_of_messages, self.config.wait_time_seconds)
            .await?;

        if messages.is_empty() {
            tracing::debug!(queue = %queue_name, "no messages in queue");
            return Ok(CycleSummary::default());
        }

        let received = messages.len();
        tracing::info!(queue = %queue_name, received, "received messages");

        for (acknowledged, message) in messages.iter().enumerate() {
            if let Err(source) = self.handler.handle(&message.body).await {
                tracing::error!(
                    queue = %queue_name,
                    message_id = %message.message_id,
                    skipped = received - acknowledged - 1,
                    error = %source,
                    "handler failed, aborting batch"
                );
                return Err(BridgeError::HandlerFailed {
                    message_id: message.message_id.clone(),
                    source,
                });
            }

            if let Err(err) = self.queue.delete(&message.receipt_handle).await {
                tracing::error!(
                    queue = %queue_name,
                    message_id = %message.message_id,
                    error = %err,
                    "handled message could not be deleted and will be redelivered"
                );
                return Err(err);
            }
        }

        Ok(CycleSummary {
            received,
            acknowledged: received,
        })
    }

    /// Repeats cycles until `shutdown` flips to `true` or its sender is
    /// dropped.
    ///
    /// Failed cycles are logged and followed by `error_backoff`, empty ones by
    /// `idle_pause`. A cycle interrupted by shutdown leaves its undeleted
    /// messages for redelivery.
    pub async fn run_until_shutdown(&self, mut shutdown: watch::Receiver<bool>) {
        let queue_name = self.queue.queue_name();
        tracing::info!(queue = %queue_name, "consume loop started");

        while !*shutdown.borrow() {
            let result = tokio::select! {
                _ = shutdown.changed() => break,
                result = self.run_cycle() => result,
            };

            let pause = match result {
                Ok(summary) if summary.received == 0 => self.config.idle_pause,
                Ok(_) => Duration::ZERO,
                Err(err) => {
                    tracing::warn!(queue = %queue_name, error = %err, "consume cycle failed");
                    self.config.error_backoff
                }
            };

            if pause.is_zero() {
                tokio::task::yield_now().await;
                continue;
            }
            tokio::select! {
                _ = shutdown.changed() => break,
                _ = tokio::time::sleep(pause) => {}
            }
        }

        tracing::info!(queue = %queue_name, "consume loop stopped");
    }
}

/// Runs several consume loops side by side, one per registered handler.
#[derive(Default)]
pub struct BridgeReceiver {
    consumers: Vec<ConsumeLoop>,
}

impl BridgeReceiver {
    pub fn new() -> Self {
        BridgeReceiver {
            consumers: Vec::new(),
        }
    }

    /// Registers a handler for `queue`. `None` uses the default consumer config.
    pub fn add_handler(
        &mut self,
        queue: QueueService,
        handler: Arc<dyn MessageHandler>,
        config: Option<ConsumerConfig>,
    ) {
        self.consumers
            .push(ConsumeLoop::new(queue, handler, config.unwrap_or_default()));
    }

    /// Registers an async function with a shared resource for `queue`.
    pub fn add_handler_fn<RFn, Fut, TShared>(
        &mut self,
        queue: QueueService,
        rv_fn: RFn,
        shared_resources: TShared,
        config: Option<ConsumerConfig>,
    ) where
        RFn: Fn(String, TShared) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
        TShared: Send + Sync + Clone + 'static,
    {
        self.consumers.push(ConsumeLoop::with_handler_fn(
            queue,
            rv_fn,
            shared_resources,
            config.unwrap_or_default(),
        ));
    }

    pub fn len(&self) -> usize {
        self.consumers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumers.is_empty()
    }

    /// Runs every registered loop until the process ends.
    pub async fn start_all_handlers(&self) {
        let (_shutdown_tx, shutdown_rx) = oneshot::channel();
        self.start_all_handlers_with_shutdown(shutdown_rx).await;
    }

    /// Runs every registered loop until `shutdown` fires, then waits for all
    /// of them to stop.
    pub async fn start_all_handlers_with_shutdown(&self, shutdown: oneshot::Receiver<()>) {
        let (stop_tx, stop_rx) = watch::channel(false);

        let signal = async move {
            // a dropped sender counts as a shutdown request
            let _ = shutdown.await;
            tracing::info!("shutdown requested, stopping consume loops");
            let _ = stop_tx.send(true);
        };
        let loops = join_all(
            self.consumers
                .iter()
                .map(|consumer| consumer.run_until_shutdown(stop_rx.clone())),
        );

        tokio::join!(signal, loops);
    }
}
