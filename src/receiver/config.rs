use std::time::Duration;

/// Configuration for a consume loop.
///
/// This struct defines the parameters for receiving messages from a queue,
/// including the maximum number of messages per receive call, the wait time
/// for long polling and the optional deadline of a whole cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerConfig {
    /// The maximum number of messages to receive in a single request (1 to 10).
    pub max_number_of_messages: i32,

    /// The wait time for long polling, in seconds (0 to 20).
    pub wait_time_seconds: i32,

    /// Upper bound on one receive-handle-delete cycle. `None` waits as long
    /// as the transport does.
    pub cycle_deadline: Option<Duration>,

    /// Pause before the next cycle after a failed one.
    pub error_backoff: Duration,

    /// Pause before the next cycle after one that received nothing. Keeps a
    /// short-polling loop from spinning on an empty queue.
    pub idle_pause: Duration,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        ConsumerConfig {
            max_number_of_messages: 10,
            wait_time_seconds: 20,
            cycle_deadline: None,
            error_backoff: Duration::from_secs(1),
            idle_pause: Duration::from_millis(100),
        }
    }
}
