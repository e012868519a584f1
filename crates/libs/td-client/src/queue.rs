use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::Notify;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PushOutcome {
    Queued,
    /// The queue was full; the oldest item was discarded to make room.
    DroppedOldest,
    /// The receiving side is gone; the item was discarded.
    Closed,
}

struct QueueState<T> {
    items: VecDeque<T>,
    dropped: u64,
    closed: bool,
}

/// Bounded single-consumer queue with drop-oldest overflow.
///
/// Pushing never blocks, so a slow consumer only loses its own oldest items.
pub struct BoundedQueue<T> {
    capacity: usize,
    state: Mutex<QueueState<T>>,
    notify: Notify,
}

impl<T> BoundedQueue<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            state: Mutex::new(QueueState { items: VecDeque::new(), dropped: 0, closed: false }),
            notify: Notify::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn push(&self, item: T) -> PushOutcome {
        let outcome = {
            let mut state = self.state.lock().expect("queue mutex poisoned");
            if state.closed {
                return PushOutcome::Closed;
            }
            let outcome = if state.items.len() >= self.capacity {
                state.items.pop_front();
                state.dropped = state.dropped.saturating_add(1);
                PushOutcome::DroppedOldest
            } else {
                PushOutcome::Queued
            };
            state.items.push_back(item);
            outcome
        };
        self.notify.notify_one();
        outcome
    }

    pub fn try_recv(&self) -> Option<T> {
        self.state.lock().expect("queue mutex poisoned").items.pop_front()
    }

    /// Waits for the next item; `None` once the queue is closed and empty.
    pub async fn recv(&self) -> Option<T> {
        loop {
            {
                let mut state = self.state.lock().expect("queue mutex poisoned");
                if let Some(item) = state.items.pop_front() {
                    return Some(item);
                }
                if state.closed {
                    return None;
                }
            }
            self.notify.notified().await;
        }
    }

    pub fn drain(&self) -> Vec<T> {
        self.state.lock().expect("queue mutex poisoned").items.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.state.lock().expect("queue mutex poisoned").items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dropped_count(&self) -> u64 {
        self.state.lock().expect("queue mutex poisoned").dropped
    }

    /// Rejects further pushes. Items already queued stay readable.
    pub fn close(&self) {
        self.state.lock().expect("queue mutex poisoned").closed = true;
        self.notify.notify_one();
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().expect("queue mutex poisoned").closed
    }
}

impl<T> std::fmt::Debug for BoundedQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedQueue")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .field("dropped", &self.dropped_count())
            .finish()
    }
}
