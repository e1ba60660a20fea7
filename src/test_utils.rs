//! Recording in-memory transports for unit tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::errors::TransportError;
use crate::message::{Message, MessageAttributes, PublishRequest, ReceiptHandle};
use crate::transport::{QueueTransport, TopicTransport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicCall {
    CreateTopic(String),
    Subscribe {
        topic_id: String,
        endpoint: String,
        protocol: String,
    },
    Publish(PublishRequest),
}

#[derive(Default)]
struct TopicFaults {
    fail_create_topic: bool,
    fail_subscribe_on: Option<usize>,
    empty_subscribe_on: Option<usize>,
    fail_publish: bool,
    empty_publish: bool,
}

/// Topic transport that records every call and returns scripted results.
pub struct RecordingTopic {
    topic_id: Option<String>,
    calls: Mutex<Vec<TopicCall>>,
    subscribe_count: Mutex<usize>,
    faults: Mutex<TopicFaults>,
}

impl RecordingTopic {
    pub fn new(topic_id: Option<&str>) -> Self {
        RecordingTopic {
            topic_id: topic_id.map(str::to_string),
            calls: Mutex::new(Vec::new()),
            subscribe_count: Mutex::new(0),
            faults: Mutex::new(TopicFaults::default()),
        }
    }

    pub fn calls(&self) -> Vec<TopicCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fail_create_topic(&self) {
        self.faults.lock().unwrap().fail_create_topic = true;
    }

    /// Makes the n-th subscribe call (1-based) fail at the transport level.
    pub fn fail_subscribe_on(&self, n: usize) {
        self.faults.lock().unwrap().fail_subscribe_on = Some(n);
    }

    /// Makes the n-th subscribe call (1-based) return no identifier.
    pub fn empty_subscribe_on(&self, n: usize) {
        self.faults.lock().unwrap().empty_subscribe_on = Some(n);
    }

    pub fn fail_publish(&self) {
        self.faults.lock().unwrap().fail_publish = true;
    }

    pub fn empty_publish(&self) {
        self.faults.lock().unwrap().empty_publish = true;
    }
}

#[async_trait]
impl TopicTransport for RecordingTopic {
    async fn create_topic(&self, name: &str) -> Result<Option<String>, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push(TopicCall::CreateTopic(name.to_string()));
        if self.faults.lock().unwrap().fail_create_topic {
            return Err(TransportError::new("InternalError"));
        }
        Ok(self.topic_id.clone())
    }

    async fn subscribe(
        &self,
        topic_id: &str,
        endpoint: &str,
        protocol: &str,
    ) -> Result<Option<String>, TransportError> {
        self.calls.lock().unwrap().push(TopicCall::Subscribe {
            topic_id: topic_id.to_string(),
            endpoint: endpoint.to_string(),
            protocol: protocol.to_string(),
        });
        let n = {
            let mut count = self.subscribe_count.lock().unwrap();
            *count += 1;
            *count
        };
        let faults = self.faults.lock().unwrap();
        if faults.fail_subscribe_on == Some(n) {
            return Err(TransportError::new("AuthorizationError"));
        }
        if faults.empty_subscribe_on == Some(n) {
            return Ok(None);
        }
        Ok(Some(format!("{topic_id}:sub-{n}")))
    }

    async fn publish(&self, request: &PublishRequest) -> Result<Option<String>, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push(TopicCall::Publish(request.clone()));
        let faults = self.faults.lock().unwrap();
        if faults.fail_publish {
            return Err(TransportError::new("Throttling"));
        }
        if faults.empty_publish {
            return Ok(None);
        }
        Ok(Some("msg-1".to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueCall {
    CreateQueue {
        name: String,
        attributes: Option<HashMap<String, String>>,
    },
    Resolve(String),
    Send {
        queue_address: String,
        body: String,
    },
    Receive {
        queue_address: String,
        max_count: i32,
        wait_time_seconds: i32,
    },
    Delete {
        queue_address: String,
        receipt_handle: ReceiptHandle,
    },
}

#[derive(Default)]
struct QueueState {
    pending: VecDeque<Message>,
    in_flight: HashSet<ReceiptHandle>,
    next_id: usize,
    fail_resolve: bool,
    empty_resolve: bool,
    fail_receive: bool,
    fail_send: bool,
    fail_delete: HashSet<ReceiptHandle>,
    receive_delay: Option<Duration>,
}

/// Queue transport holding deliveries in memory. Received messages are moved
/// in flight until deleted with their own receipt handle.
pub struct InMemoryQueue {
    address: String,
    calls: Mutex<Vec<QueueCall>>,
    state: Mutex<QueueState>,
}

impl InMemoryQueue {
    pub fn new(address: &str) -> Self {
        InMemoryQueue {
            address: address.to_string(),
            calls: Mutex::new(Vec::new()),
            state: Mutex::new(QueueState::default()),
        }
    }

    /// Enqueues a delivery with an explicit receipt handle.
    pub fn push(&self, body: &str, receipt_handle: &str) {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let message_id = format!("m-{}", state.next_id);
        state.pending.push_back(Message {
            message_id,
            body: body.to_string(),
            attributes: MessageAttributes::new(),
            receipt_handle: ReceiptHandle::new(receipt_handle),
        });
    }

    pub fn calls(&self) -> Vec<QueueCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn deleted_handles(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                QueueCall::Delete { receipt_handle, .. } => Some(receipt_handle.to_string()),
                _ => None,
            })
            .collect()
    }

    pub fn pending_len(&self) -> usize {
        self.state.lock().unwrap().pending.len()
    }

    pub fn in_flight_len(&self) -> usize {
        self.state.lock().unwrap().in_flight.len()
    }

    pub fn fail_resolve(&self) {
        self.state.lock().unwrap().fail_resolve = true;
    }

    pub fn empty_resolve(&self) {
        self.state.lock().unwrap().empty_resolve = true;
    }

    pub fn fail_receive(&self) {
        self.state.lock().unwrap().fail_receive = true;
    }

    pub fn fail_send(&self) {
        self.state.lock().unwrap().fail_send = true;
    }

    pub fn fail_delete_of(&self, receipt_handle: &str) {
        self.state
            .lock()
            .unwrap()
            .fail_delete
            .insert(ReceiptHandle::new(receipt_handle));
    }

    pub fn delay_receive(&self, delay: Duration) {
        self.state.lock().unwrap().receive_delay = Some(delay);
    }
}

#[async_trait]
impl QueueTransport for InMemoryQueue {
    async fn create_queue(
        &self,
        name: &str,
        attributes: Option<&HashMap<String, String>>,
    ) -> Result<Option<String>, TransportError> {
        self.calls.lock().unwrap().push(QueueCall::CreateQueue {
            name: name.to_string(),
            attributes: attributes.cloned(),
        });
        Ok(Some(self.address.clone()))
    }

    async fn resolve_queue_address(&self, name: &str) -> Result<Option<String>, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push(QueueCall::Resolve(name.to_string()));
        let state = self.state.lock().unwrap();
        if state.fail_resolve {
            return Err(TransportError::new("AWS.SimpleQueueService.NonExistentQueue"));
        }
        if state.empty_resolve {
            return Ok(None);
        }
        Ok(Some(self.address.clone()))
    }

    async fn send_message(
        &self,
        queue_address: &str,
        body: &str,
        attributes: &MessageAttributes,
    ) -> Result<Option<String>, TransportError> {
        self.calls.lock().unwrap().push(QueueCall::Send {
            queue_address: queue_address.to_string(),
            body: body.to_string(),
        });
        let mut state = self.state.lock().unwrap();
        if state.fail_send {
            return Err(TransportError::new("InvalidMessageContents"));
        }
        state.next_id += 1;
        let message_id = format!("m-{}", state.next_id);
        let receipt_handle = ReceiptHandle::new(format!("r-{}", state.next_id));
        state.pending.push_back(Message {
            message_id: message_id.clone(),
            body: body.to_string(),
            attributes: attributes.clone(),
            receipt_handle,
        });
        Ok(Some(message_id))
    }

    async fn receive_messages(
        &self,
        queue_address: &str,
        max_count: i32,
        wait_time_seconds: i32,
    ) -> Result<Vec<Message>, TransportError> {
        self.calls.lock().unwrap().push(QueueCall::Receive {
            queue_address: queue_address.to_string(),
            max_count,
            wait_time_seconds,
        });
        let delay = self.state.lock().unwrap().receive_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock().unwrap();
        if state.fail_receive {
            return Err(TransportError::new("OverLimit"));
        }
        let take = (max_count.max(0) as usize).min(state.pending.len());
        let batch: Vec<Message> = state.pending.drain(..take).collect();
        for message in &batch {
            state.in_flight.insert(message.receipt_handle.clone());
        }
        Ok(batch)
    }

    async fn delete_message(
        &self,
        queue_address: &str,
        receipt_handle: &ReceiptHandle,
    ) -> Result<(), TransportError> {
        self.calls.lock().unwrap().push(QueueCall::Delete {
            queue_address: queue_address.to_string(),
            receipt_handle: receipt_handle.clone(),
        });
        let mut state = self.state.lock().unwrap();
        if state.fail_delete.contains(receipt_handle) {
            return Err(TransportError::new("ReceiptHandleIsInvalid"));
        }
        // stale handles leave other deliveries untouched
        state.in_flight.remove(receipt_handle);
        Ok(())
    }
}
