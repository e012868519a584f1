use crate::queue::{BoundedQueue, PushOutcome};
use std::collections::BTreeSet;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, ThreadId};
use td_updates::{Update, UpdateTag};

pub type UpdateCallback = Box<dyn Fn(&Arc<Update>) + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Filter {
    #[default]
    All,
    Tags(BTreeSet<UpdateTag>),
}

impl Filter {
    pub fn all() -> Self {
        Self::All
    }

    pub fn tag(tag: UpdateTag) -> Self {
        Self::Tags(BTreeSet::from([tag]))
    }

    pub fn tags(tags: impl IntoIterator<Item = UpdateTag>) -> Self {
        Self::Tags(tags.into_iter().collect())
    }

    pub fn matches(&self, tag: UpdateTag) -> bool {
        match self {
            Self::All => true,
            Self::Tags(tags) => tags.contains(&tag),
        }
    }
}

/// Queue-backed subscription handle. Dropping it closes the queue and the
/// manager forgets the subscription on the next dispatch.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    queue: Arc<BoundedQueue<Arc<Update>>>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Waits for the next update; `None` after the subscription is cancelled
    /// and its backlog is drained.
    pub async fn recv(&self) -> Option<Arc<Update>> {
        self.queue.recv().await
    }

    pub fn try_recv(&self) -> Option<Arc<Update>> {
        self.queue.try_recv()
    }

    pub fn drain(&self) -> Vec<Arc<Update>> {
        self.queue.drain()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Updates discarded because this subscription's queue was full.
    pub fn dropped_count(&self) -> u64 {
        self.queue.dropped_count()
    }

    pub fn is_cancelled(&self) -> bool {
        self.queue.is_closed()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.queue.close();
    }
}

enum Target {
    Callback(UpdateCallback),
    Queue(Arc<BoundedQueue<Arc<Update>>>),
}

struct SlotState {
    active: bool,
    delivering: Option<ThreadId>,
}

struct Slot {
    id: SubscriptionId,
    filter: Filter,
    target: Target,
    state: Mutex<SlotState>,
    idle: Condvar,
}

enum Delivery {
    Delivered,
    Skipped,
    Gone,
}

impl Slot {
    fn deliver(&self, update: &Arc<Update>) -> Delivery {
        let callback = {
            let mut state = self.state.lock().expect("subscription mutex poisoned");
            if !state.active {
                return Delivery::Skipped;
            }
            match &self.target {
                Target::Queue(queue) => {
                    return match queue.push(Arc::clone(update)) {
                        PushOutcome::Queued => Delivery::Delivered,
                        PushOutcome::DroppedOldest => {
                            log::debug!("dispatch: {} queue full, dropped oldest update", self.id);
                            Delivery::Delivered
                        }
                        PushOutcome::Closed => Delivery::Gone,
                    };
                }
                Target::Callback(callback) => {
                    state.delivering = Some(thread::current().id());
                    callback
                }
            }
        };

        if catch_unwind(AssertUnwindSafe(|| callback(update))).is_err() {
            log::error!("dispatch: {} callback panicked on {}", self.id, update.tag());
        }

        self.state.lock().expect("subscription mutex poisoned").delivering = None;
        self.idle.notify_all();
        Delivery::Delivered
    }

    fn deactivate(&self) {
        let current = thread::current().id();
        let mut state = self.state.lock().expect("subscription mutex poisoned");
        state.active = false;
        while let Some(owner) = state.delivering {
            if owner == current {
                break;
            }
            state = self.idle.wait(state).expect("subscription mutex poisoned");
        }
        drop(state);
        if let Target::Queue(queue) = &self.target {
            queue.close();
        }
    }
}

/// Registry of live subscriptions in registration order.
pub struct SubscriptionManager {
    next_id: AtomicU64,
    slots: Mutex<Vec<Arc<Slot>>>,
    default_capacity: usize,
}

impl SubscriptionManager {
    pub fn new(default_capacity: usize) -> Self {
        Self { next_id: AtomicU64::new(1), slots: Mutex::new(Vec::new()), default_capacity }
    }

    pub fn subscribe(&self, filter: Filter) -> Subscription {
        self.subscribe_with_capacity(filter, self.default_capacity)
    }

    pub fn subscribe_with_capacity(&self, filter: Filter, capacity: usize) -> Subscription {
        let queue = Arc::new(BoundedQueue::new(capacity));
        let id = self.register(filter, Target::Queue(Arc::clone(&queue)));
        Subscription { id, queue }
    }

    /// Registers a callback run on the dispatching thread. The callback may
    /// call [`SubscriptionManager::unsubscribe`] for its own id.
    pub fn subscribe_callback<F>(&self, filter: Filter, callback: F) -> SubscriptionId
    where
        F: Fn(&Arc<Update>) + Send + Sync + 'static,
    {
        self.register(filter, Target::Callback(Box::new(callback)))
    }

    /// Removes a subscription. On return no further delivery will start; a
    /// delivery running on another thread has completed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let slot = {
            let mut slots = self.slots.lock().expect("subscriptions mutex poisoned");
            match slots.iter().position(|slot| slot.id == id) {
                Some(index) => slots.remove(index),
                None => return false,
            }
        };
        slot.deactivate();
        log::debug!("dispatch: unsubscribed {}", id);
        true
    }

    pub fn contains(&self, id: SubscriptionId) -> bool {
        self.slots.lock().expect("subscriptions mutex poisoned").iter().any(|slot| slot.id == id)
    }

    pub fn len(&self) -> usize {
        self.slots.lock().expect("subscriptions mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Delivers to every live matching subscription in registration order and
    /// returns how many received the update.
    pub(crate) fn publish(&self, update: &Arc<Update>) -> usize {
        let tag = update.tag();
        let snapshot: Vec<Arc<Slot>> =
            self.slots.lock().expect("subscriptions mutex poisoned").clone();
        let mut delivered = 0;
        let mut gone = Vec::new();
        for slot in snapshot.iter().filter(|slot| slot.filter.matches(tag)) {
            match slot.deliver(update) {
                Delivery::Delivered => delivered += 1,
                Delivery::Skipped => {}
                Delivery::Gone => gone.push(slot.id),
            }
        }
        if !gone.is_empty() {
            self.slots
                .lock()
                .expect("subscriptions mutex poisoned")
                .retain(|slot| !gone.contains(&slot.id));
        }
        delivered
    }

    fn register(&self, filter: Filter, target: Target) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let slot = Slot {
            id,
            filter,
            target,
            state: Mutex::new(SlotState { active: true, delivering: None }),
            idle: Condvar::new(),
        };
        self.slots.lock().expect("subscriptions mutex poisoned").push(Arc::new(slot));
        log::debug!("dispatch: subscribed {}", id);
        id
    }
}

impl fmt::Debug for SubscriptionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionManager")
            .field("subscriptions", &self.len())
            .field("default_capacity", &self.default_capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize};
    use std::sync::OnceLock;
    use td_updates::catalog::{UpdateChatTitle, UpdateSpeedLimitNotification};

    fn title(chat_id: i64) -> Arc<Update> {
        Arc::new(Update::ChatTitle(UpdateChatTitle { chat_id, title: format!("chat {chat_id}") }))
    }

    fn speed_limit() -> Arc<Update> {
        Arc::new(Update::SpeedLimitNotification(UpdateSpeedLimitNotification { is_upload: false }))
    }

    #[test]
    fn filters_select_by_tag() {
        let manager = SubscriptionManager::new(8);
        let titles = manager.subscribe(Filter::tag(UpdateTag::ChatTitle));
        let everything = manager.subscribe(Filter::all());
        assert_eq!(manager.publish(&title(1)), 2);
        assert_eq!(manager.publish(&speed_limit()), 1);
        assert_eq!(titles.drain().len(), 1);
        assert_eq!(everything.drain().len(), 2);
    }

    #[test]
    fn queue_preserves_order_and_counts_drops() {
        let manager = SubscriptionManager::new(8);
        let sub = manager.subscribe_with_capacity(Filter::all(), 2);
        for chat_id in 1..=3 {
            manager.publish(&title(chat_id));
        }
        let seen: Vec<UpdateTag> = sub.drain().iter().map(|update| update.tag()).collect();
        assert_eq!(seen.len(), 2);
        assert_eq!(sub.dropped_count(), 1);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let manager = SubscriptionManager::new(8);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let id = manager.subscribe_callback(Filter::all(), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        manager.publish(&title(1));
        assert!(manager.unsubscribe(id));
        assert!(!manager.unsubscribe(id));
        manager.publish(&title(2));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn callback_can_unsubscribe_itself() {
        let manager = Arc::new(SubscriptionManager::new(8));
        let own_id: Arc<OnceLock<SubscriptionId>> = Arc::new(OnceLock::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let id = {
            let inner = Arc::clone(&manager);
            let own_id = Arc::clone(&own_id);
            let calls = Arc::clone(&calls);
            manager.subscribe_callback(Filter::all(), move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                if let Some(id) = own_id.get() {
                    assert!(inner.unsubscribe(*id));
                }
            })
        };
        own_id.set(id).expect("set once");
        manager.publish(&title(1));
        manager.publish(&title(2));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(manager.is_empty());
    }

    #[test]
    fn unsubscribe_from_other_thread_waits_for_in_flight_callback() {
        let manager = Arc::new(SubscriptionManager::new(8));
        let (entered_tx, entered_rx) = std::sync::mpsc::channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
        let release_rx = Mutex::new(release_rx);
        let calls = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicBool::new(false));
        let id = {
            let calls = Arc::clone(&calls);
            let finished = Arc::clone(&finished);
            manager.subscribe_callback(Filter::all(), move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                entered_tx.send(()).expect("entered");
                release_rx.lock().expect("release").recv().expect("release signal");
                finished.store(true, Ordering::SeqCst);
            })
        };

        let publisher = {
            let manager = Arc::clone(&manager);
            thread::spawn(move || manager.publish(&title(1)))
        };
        entered_rx.recv().expect("callback entered");

        let returned = Arc::new(AtomicBool::new(false));
        let remover = {
            let manager = Arc::clone(&manager);
            let finished = Arc::clone(&finished);
            let returned = Arc::clone(&returned);
            thread::spawn(move || {
                let removed = manager.unsubscribe(id);
                returned.store(true, Ordering::SeqCst);
                (removed, finished.load(Ordering::SeqCst))
            })
        };
        thread::sleep(std::time::Duration::from_millis(50));
        assert!(!returned.load(Ordering::SeqCst));

        release_tx.send(()).expect("release");
        let (removed, finished_first) = remover.join().expect("remover thread");
        assert!(removed);
        assert!(finished_first);
        assert_eq!(publisher.join().expect("publisher thread"), 1);

        assert_eq!(manager.publish(&title(2)), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dropped_handle_is_pruned() {
        let manager = SubscriptionManager::new(8);
        let sub = manager.subscribe(Filter::all());
        let id = sub.id();
        drop(sub);
        assert_eq!(manager.publish(&title(1)), 0);
        assert!(!manager.contains(id));
    }

    #[test]
    fn panicking_callback_does_not_stop_later_subscribers() {
        let manager = SubscriptionManager::new(8);
        manager.subscribe_callback(Filter::all(), |_| panic!("subscriber bug"));
        let sub = manager.subscribe(Filter::all());
        assert_eq!(manager.publish(&title(1)), 2);
        assert_eq!(sub.len(), 1);
    }
}
