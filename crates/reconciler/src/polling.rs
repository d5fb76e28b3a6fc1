//! Re-checking objects whose upstream can change without a spec edit.
//!
//! The reconcilers never sleep. They hand the object key and a delay to a
//! [`DelayedQueue`], the host's delayed-dispatch primitive, which feeds the key
//! back into the work queue once the delay has passed.

use std::sync::Arc;
use std::time::Duration;

use kiln_core::ObjectKey;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::error::QueueError;

/// The host's "enqueue this key after a delay" primitive.
pub trait DelayedQueue: Send + Sync {
    /// Enqueue `key` once `delay` has elapsed.
    ///
    /// # Errors
    ///
    /// Returns a [`QueueError`] if the delay cannot be scheduled.
    fn add_after(&self, key: ObjectKey, delay: Duration) -> Result<(), QueueError>;
}

/// Schedules the next poll of an object at a fixed delay.
#[derive(Clone)]
pub struct PollingScheduler {
    queue: Arc<dyn DelayedQueue>,
    delay: Duration,
}

impl PollingScheduler {
    /// Create a scheduler polling every `delay`.
    pub fn new(queue: Arc<dyn DelayedQueue>, delay: Duration) -> Self {
        Self { queue, delay }
    }

    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Re-enqueue `key` after the configured delay.
    ///
    /// # Errors
    ///
    /// Propagates the queue's [`QueueError`].
    pub fn enqueue(&self, key: &ObjectKey) -> Result<(), QueueError> {
        debug!(key = %key, delay_secs = self.delay.as_secs(), "Scheduling poll");
        self.queue.add_after(key.clone(), self.delay)
    }
}

impl std::fmt::Debug for PollingScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollingScheduler")
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

/// [`DelayedQueue`] backed by tokio timers.
///
/// Each delayed key is delivered on the channel returned by
/// [`TokioDelayedQueue::channel`]; the host's worker loop drains it.
#[derive(Debug, Clone)]
pub struct TokioDelayedQueue {
    sender: mpsc::UnboundedSender<ObjectKey>,
}

impl TokioDelayedQueue {
    /// Create a queue and the receiver its keys are delivered on.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ObjectKey>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl DelayedQueue for TokioDelayedQueue {
    fn add_after(&self, key: ObjectKey, delay: Duration) -> Result<(), QueueError> {
        if self.sender.is_closed() {
            return Err(QueueError::Closed);
        }
        let handle = Handle::try_current().map_err(|_| QueueError::NoRuntime)?;
        let sender = self.sender.clone();

        handle.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(mpsc::error::SendError(key)) = sender.send(key) {
                trace!(key = %key, "Delayed queue closed before delivery");
            }
        });
        Ok(())
    }
}
