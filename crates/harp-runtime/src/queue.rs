//! Priority-ordered message queue.
//!
//! Each component owns one [`MessageQueue`]. Anyone holding a
//! [`ComponentHandle`](crate::ComponentHandle) may push; only the owning
//! component pops.
//!
//! # Ordering
//!
//! ```text
//! push(m) ──▶ key = priority(m), seq = next_seq++
//!
//! pop order: ascending (key, seq)
//!            lower key first, equal keys in push order
//! ```
//!
//! The default key is the message timestamp in microseconds, which makes
//! the queue FIFO by creation time.
//!
//! # Wake-up
//!
//! Every successful push signals a [`Notify`] permit. An idle worker can
//! `notified().await` instead of polling; `pop_next_message` itself never
//! waits.

use harp_component::ComponentError;
use harp_event::Message;
use parking_lot::Mutex;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::warn;

/// Computes a message's priority key. Lower pops first.
pub type PriorityFn = Arc<dyn Fn(&Message) -> i64 + Send + Sync>;

/// Default priority: creation time in microseconds.
#[must_use]
pub fn timestamp_priority() -> PriorityFn {
    Arc::new(|msg: &Message| msg.timestamp().timestamp_micros())
}

struct Entry {
    key: i64,
    seq: u64,
    message: Message,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // BinaryHeap is a max-heap; invert so the smallest (key, seq) is on top.
    fn cmp(&self, other: &Self) -> Ordering {
        (other.key, other.seq).cmp(&(self.key, self.seq))
    }
}

#[derive(Default)]
struct Inner {
    heap: BinaryHeap<Entry>,
    next_seq: u64,
}

/// A component's inbox.
///
/// # Example
///
/// ```
/// use harp_auth::Context;
/// use harp_event::Message;
/// use harp_runtime::MessageQueue;
/// use harp_types::ComponentId;
///
/// let queue = MessageQueue::new("mem");
/// let src = ComponentId::new("cpu");
/// queue.push_message(Message::new(src.clone(), "get", Context::system())).unwrap();
/// queue.push_message(Message::new(src, "update", Context::system())).unwrap();
///
/// assert_eq!(queue.pop_next_message().unwrap().operation(), "get");
/// assert_eq!(queue.pop_next_message().unwrap().operation(), "update");
/// assert!(queue.pop_next_message().is_none());
/// ```
pub struct MessageQueue {
    owner: String,
    inner: Mutex<Inner>,
    capacity: Option<usize>,
    priority: PriorityFn,
    notify: Notify,
}

impl MessageQueue {
    /// Creates an unbounded FIFO queue.
    pub fn new(owner: impl Into<String>) -> Self {
        Self::with_priority(owner, timestamp_priority(), None)
    }

    /// Creates a queue with a custom priority function and optional bound.
    ///
    /// A capacity of `0` means unbounded.
    pub fn with_priority(owner: impl Into<String>, priority: PriorityFn, capacity: Option<usize>) -> Self {
        Self {
            owner: owner.into(),
            inner: Mutex::new(Inner::default()),
            capacity: capacity.filter(|&c| c > 0),
            priority,
            notify: Notify::new(),
        }
    }

    /// Inserts a message in priority order.
    ///
    /// # Errors
    ///
    /// `QueueFull` when the queue is bounded and at capacity. The message
    /// is dropped.
    pub fn push_message(&self, message: Message) -> Result<(), ComponentError> {
        // Computed outside the lock: the priority function is caller code.
        let key = (self.priority)(&message);
        {
            let mut inner = self.inner.lock();
            if let Some(capacity) = self.capacity {
                if inner.heap.len() >= capacity {
                    drop(inner);
                    warn!(
                        component = %self.owner,
                        message = %message.id(),
                        operation = message.operation(),
                        capacity,
                        "queue full, dropping message"
                    );
                    return Err(ComponentError::QueueFull {
                        component: self.owner.clone(),
                        capacity,
                    });
                }
            }
            let seq = inner.next_seq;
            inner.next_seq += 1;
            inner.heap.push(Entry { key, seq, message });
        }
        self.notify.notify_one();
        Ok(())
    }

    /// Removes and returns the highest-priority message, or `None` if empty.
    pub fn pop_next_message(&self) -> Option<Message> {
        self.inner.lock().heap.pop().map(|e| e.message)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().heap.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().heap.is_empty()
    }

    /// Configured bound, if any.
    #[must_use]
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Name of the owning component.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Waits until a push happens after (or just before) this call.
    ///
    /// A push with no waiter leaves a single permit, so a worker that
    /// drains the queue and then awaits will not miss it.
    pub async fn notified(&self) {
        self.notify.notified().await;
    }
}

impl fmt::Debug for MessageQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageQueue")
            .field("owner", &self.owner)
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}
