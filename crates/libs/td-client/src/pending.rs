use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tokio::sync::oneshot;

#[derive(Debug, Default)]
struct PendingState {
    waiters: HashMap<u64, oneshot::Sender<JsonValue>>,
    closed: bool,
}

/// Requests awaiting a response, keyed by the `@extra` the client stamped.
#[derive(Debug)]
pub(crate) struct PendingRequests {
    next_extra: AtomicU64,
    state: Mutex<PendingState>,
}

impl PendingRequests {
    pub(crate) fn new() -> Self {
        Self { next_extra: AtomicU64::new(1), state: Mutex::new(PendingState::default()) }
    }

    pub(crate) fn next_extra(&self) -> u64 {
        self.next_extra.fetch_add(1, Ordering::Relaxed)
    }

    /// `None` once the table has been closed.
    pub(crate) fn register(&self, extra: u64) -> Option<oneshot::Receiver<JsonValue>> {
        let mut state = self.state.lock().expect("pending mutex poisoned");
        if state.closed {
            return None;
        }
        let (tx, rx) = oneshot::channel();
        state.waiters.insert(extra, tx);
        Some(rx)
    }

    pub(crate) fn forget(&self, extra: u64) {
        self.state.lock().expect("pending mutex poisoned").waiters.remove(&extra);
    }

    pub(crate) fn take(&self, extra: u64) -> Option<oneshot::Sender<JsonValue>> {
        self.state.lock().expect("pending mutex poisoned").waiters.remove(&extra)
    }

    /// Drops every waiter so their futures resolve as closed.
    pub(crate) fn close(&self) -> usize {
        let mut state = self.state.lock().expect("pending mutex poisoned");
        state.closed = true;
        let count = state.waiters.len();
        state.waiters.clear();
        count
    }

    pub(crate) fn len(&self) -> usize {
        self.state.lock().expect("pending mutex poisoned").waiters.len()
    }
}
