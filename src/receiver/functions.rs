use crate::errors::BoxError;
use async_trait::async_trait;
use std::future::Future;

/// Application capability invoked once per delivered message.
///
/// Returning `Ok` acknowledges the delivery; returning an error leaves it on
/// the queue for redelivery and aborts the rest of the batch. Deliveries are
/// at-least-once, so implementations must tolerate duplicates.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, body: &str) -> Result<(), BoxError>;
}

/// `MessageHandler` built from an async function and a shared resource.
///
/// The resource is cloned into every call, so it is typically an `Arc` or a
/// cheap handle such as a connection pool.
///
/// # Type Parameters
///
/// * `RFn` - The message handler function type
/// * `TShared` - The type of shared resources passed to the handler
pub struct HandlerFn<RFn, TShared> {
    rv_fn: RFn,
    shared_resources: TShared,
}

impl<RFn, Fut, TShared> HandlerFn<RFn, TShared>
where
    RFn: Fn(String, TShared) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    TShared: Send + Sync + Clone + 'static,
{
    /// Wraps `rv_fn`, which receives the message body and a clone of
    /// `shared_resources`.
    pub fn new(rv_fn: RFn, shared_resources: TShared) -> Self {
        HandlerFn {
            rv_fn,
            shared_resources,
        }
    }
}

#[async_trait]
impl<RFn, Fut, TShared> MessageHandler for HandlerFn<RFn, TShared>
where
    RFn: Fn(String, TShared) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    TShared: Send + Sync + Clone + 'static,
{
    async fn handle(&self, body: &str) -> Result<(), BoxError> {
        (self.rv_fn)(body.to_string(), self.shared_resources.clone()).await
    }
}
