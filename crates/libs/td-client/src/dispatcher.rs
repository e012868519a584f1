use crate::authorization::{AuthorizationStateMachine, ClientMethod, Transition};
use crate::config::{ClientConfig, RedactionConfig};
use crate::error::ClientError;
use crate::queue::{BoundedQueue, PushOutcome};
use crate::subscription::{Filter, Subscription, SubscriptionId, SubscriptionManager};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};
use td_updates::{AuthorizationPhase, DecodeError, DecodeReason, Update, UpdateTag};

/// What happened to one dispatched update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DispatchReport {
    pub tag: UpdateTag,
    /// Set only for `updateAuthorizationState`.
    pub transition: Option<Transition>,
    pub delivered: usize,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DispatchStats {
    pub dispatched: u64,
    pub deliveries: u64,
    pub unknown_tags: u64,
    pub malformed: u64,
    pub illegal_transitions: u64,
    pub unhandled_dropped: u64,
}

/// Routes narrowed updates to the authorization state machine and then to
/// subscribers, one update at a time.
///
/// Subscriber callbacks run on the dispatching thread and must not call
/// [`Dispatcher::dispatch`] themselves.
pub struct Dispatcher {
    authorization: Mutex<AuthorizationStateMachine>,
    subscriptions: SubscriptionManager,
    unhandled: BoundedQueue<DecodeError>,
    dispatch_lock: Mutex<()>,
    dispatching: Mutex<Option<ThreadId>>,
    closed: AtomicBool,
    close_deferred: AtomicBool,
    stats: Mutex<DispatchStats>,
    redaction: RedactionConfig,
}

impl Dispatcher {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_state_machine(AuthorizationStateMachine::new(), config)
    }

    pub fn with_state_machine(machine: AuthorizationStateMachine, config: &ClientConfig) -> Self {
        Self {
            authorization: Mutex::new(machine),
            subscriptions: SubscriptionManager::new(config.subscription_queue_capacity),
            unhandled: BoundedQueue::new(config.unhandled_queue_capacity),
            dispatch_lock: Mutex::new(()),
            dispatching: Mutex::new(None),
            closed: AtomicBool::new(false),
            close_deferred: AtomicBool::new(false),
            stats: Mutex::new(DispatchStats::default()),
            redaction: config.redaction.clone(),
        }
    }

    pub fn phase(&self) -> AuthorizationPhase {
        self.authorization.lock().expect("authorization mutex poisoned").phase()
    }

    /// Snapshot of the session's authorization state machine.
    pub fn authorization(&self) -> AuthorizationStateMachine {
        self.authorization.lock().expect("authorization mutex poisoned").clone()
    }

    pub fn ensure_method_legal(&self, method: ClientMethod) -> Result<(), ClientError> {
        self.authorization.lock().expect("authorization mutex poisoned").ensure_method_legal(method)
    }

    pub fn ensure_request_legal(&self, method: ClientMethod, request_type: &str) -> Result<(), ClientError> {
        self.authorization
            .lock()
            .expect("authorization mutex poisoned")
            .ensure_request_legal(method, request_type)
    }

    pub fn subscriptions(&self) -> &SubscriptionManager {
        &self.subscriptions
    }

    pub fn subscribe(&self, filter: Filter) -> Subscription {
        self.subscriptions.subscribe(filter)
    }

    pub fn subscribe_with_capacity(&self, filter: Filter, capacity: usize) -> Subscription {
        self.subscriptions.subscribe_with_capacity(filter, capacity)
    }

    pub fn subscribe_callback<F>(&self, filter: Filter, callback: F) -> SubscriptionId
    where
        F: Fn(&Arc<Update>) + Send + Sync + 'static,
    {
        self.subscriptions.subscribe_callback(filter, callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscriptions.unsubscribe(id)
    }

    /// Decode failures that never reached subscribers, oldest first.
    pub fn unhandled(&self) -> &BoundedQueue<DecodeError> {
        &self.unhandled
    }

    pub fn stats(&self) -> DispatchStats {
        *self.stats.lock().expect("stats mutex poisoned")
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn dispatch(&self, update: Update) -> Result<DispatchReport, ClientError> {
        if self.is_closed() {
            return Err(ClientError::Closed);
        }
        let _serial = self.dispatch_lock.lock().expect("dispatch mutex poisoned");
        if self.is_closed() {
            return Err(ClientError::Closed);
        }
        *self.dispatching.lock().expect("dispatching mutex poisoned") = Some(thread::current().id());

        let update = Arc::new(update);
        let tag = update.tag();
        let transition = update.as_authorization_state().map(|auth| {
            self.authorization.lock().expect("authorization mutex poisoned").apply(auth)
        });
        let delivered = self.subscriptions.publish(&update);

        *self.dispatching.lock().expect("dispatching mutex poisoned") = None;
        if self.close_deferred.swap(false, Ordering::AcqRel) {
            self.close_now();
        }

        let mut stats = self.stats.lock().expect("stats mutex poisoned");
        stats.dispatched += 1;
        stats.deliveries += delivered as u64;
        if transition.is_some_and(|transition| !transition.legal) {
            stats.illegal_transitions += 1;
        }
        drop(stats);

        log::trace!("dispatch: {} delivered to {} subscriber(s)", tag, delivered);
        Ok(DispatchReport { tag, transition, delivered })
    }

    /// Logs a narrowing failure and routes it to the unhandled channel.
    pub fn report_decode_error(&self, err: DecodeError) {
        match err.reason {
            DecodeReason::UnknownTag => log::debug!("narrow: {}", err),
            DecodeReason::ShapeMismatch | DecodeReason::MissingField => {
                if self.redaction.enabled {
                    log::warn!("narrow: {}", err);
                } else {
                    log::warn!("narrow: {} raw={}", err, err.raw.clone().into_value());
                }
            }
        }

        let mut stats = self.stats.lock().expect("stats mutex poisoned");
        if err.is_unknown_tag() {
            stats.unknown_tags += 1;
        } else {
            stats.malformed += 1;
        }
        drop(stats);

        if self.unhandled.push(err) == PushOutcome::DroppedOldest {
            self.stats.lock().expect("stats mutex poisoned").unhandled_dropped += 1;
        }
    }

    /// Stops accepting updates once the in-flight dispatch has finished and
    /// drives the state machine to `Closed`.
    ///
    /// Called from inside a subscriber callback it returns at once; the
    /// current update still reaches the remaining subscribers and the forced
    /// close runs when that dispatch ends.
    pub fn shutdown(&self) -> Vec<Transition> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            log::debug!("dispatch: shutting down");
        }
        let on_dispatch_thread =
            *self.dispatching.lock().expect("dispatching mutex poisoned") == Some(thread::current().id());
        if on_dispatch_thread {
            self.close_deferred.store(true, Ordering::Release);
            return Vec::new();
        }
        let _serial = self.dispatch_lock.lock().expect("dispatch mutex poisoned");
        self.close_now()
    }

    fn close_now(&self) -> Vec<Transition> {
        let transitions = self.authorization.lock().expect("authorization mutex poisoned").force_close();
        self.unhandled.close();
        transitions
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("phase", &self.phase())
            .field("subscriptions", &self.subscriptions)
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use td_updates::catalog::{UpdateChatTitle, UpdateOption};
    use td_updates::{AuthorizationState, Narrower, TdObject, UpdateAuthorizationState};

    fn auth(phase: AuthorizationPhase) -> Update {
        Update::AuthorizationState(UpdateAuthorizationState {
            authorization_state: AuthorizationState::bare(phase).expect("wire phase"),
        })
    }

    fn title(chat_id: i64) -> Update {
        Update::ChatTitle(UpdateChatTitle { chat_id, title: "t".to_owned() })
    }

    #[test]
    fn state_machine_runs_before_subscribers() {
        let dispatcher = Arc::new(Dispatcher::new(&ClientConfig::default()));
        let observed = Arc::new(Mutex::new(Vec::new()));
        {
            let inner = Arc::clone(&dispatcher);
            let observed = Arc::clone(&observed);
            dispatcher.subscribe_callback(Filter::tag(UpdateTag::AuthorizationState), move |_| {
                observed.lock().expect("observed").push(inner.phase());
            });
        }
        dispatcher.dispatch(auth(AuthorizationPhase::WaitTdlibParameters)).expect("dispatch");
        let report = dispatcher.dispatch(auth(AuthorizationPhase::WaitPhoneNumber)).expect("dispatch");
        assert_eq!(report.delivered, 1);
        assert!(report.transition.is_some_and(|transition| transition.legal));
        assert_eq!(
            *observed.lock().expect("observed"),
            vec![AuthorizationPhase::WaitTdlibParameters, AuthorizationPhase::WaitPhoneNumber]
        );
    }

    #[test]
    fn illegal_transition_is_counted_and_applied() {
        let dispatcher = Dispatcher::new(&ClientConfig::default());
        let report = dispatcher.dispatch(auth(AuthorizationPhase::Ready)).expect("dispatch");
        assert!(report.transition.is_some_and(|transition| !transition.legal));
        assert_eq!(dispatcher.phase(), AuthorizationPhase::Ready);
        assert_eq!(dispatcher.stats().illegal_transitions, 1);
    }

    #[test]
    fn decode_errors_go_to_unhandled_channel() {
        let dispatcher = Dispatcher::new(&ClientConfig::default());
        let sub = dispatcher.subscribe(Filter::all());
        let narrower = Narrower::global();
        for raw in [
            serde_json::json!({"@type": "updateSomeFutureThing"}),
            serde_json::json!({"@type": "updateChatTitle", "chat_id": 1}),
        ] {
            let err = narrower.narrow_value(raw).expect_err("bad envelope");
            dispatcher.report_decode_error(err);
        }
        assert!(sub.is_empty());
        let stats = dispatcher.stats();
        assert_eq!((stats.unknown_tags, stats.malformed), (1, 1));
        let reasons: Vec<DecodeReason> = dispatcher.unhandled().drain().iter().map(|err| err.reason).collect();
        assert_eq!(reasons, [DecodeReason::UnknownTag, DecodeReason::MissingField]);
    }

    #[test]
    fn shutdown_closes_and_rejects_later_dispatch() {
        let dispatcher = Dispatcher::new(&ClientConfig::default());
        dispatcher.dispatch(auth(AuthorizationPhase::WaitTdlibParameters)).expect("dispatch");
        let transitions = dispatcher.shutdown();
        assert_eq!(transitions.len(), 2);
        assert_eq!(dispatcher.phase(), AuthorizationPhase::Closed);
        assert_eq!(dispatcher.dispatch(title(1)), Err(ClientError::Closed));
        assert!(dispatcher.shutdown().is_empty());
    }

    #[test]
    fn shutdown_from_callback_does_not_deadlock() {
        let dispatcher = Arc::new(Dispatcher::new(&ClientConfig::default()));
        let calls = Arc::new(AtomicUsize::new(0));
        {
            let inner = Arc::clone(&dispatcher);
            let calls = Arc::clone(&calls);
            dispatcher.subscribe_callback(Filter::all(), move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                inner.shutdown();
            });
        }
        dispatcher.dispatch(title(1)).expect("first dispatch");
        assert!(dispatcher.is_closed());
        assert!(dispatcher.dispatch(title(2)).is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn shutdown_from_callback_closes_after_current_update() {
        let dispatcher = Arc::new(Dispatcher::new(&ClientConfig::default()));
        dispatcher.dispatch(auth(AuthorizationPhase::WaitTdlibParameters)).expect("dispatch");
        {
            let inner = Arc::clone(&dispatcher);
            dispatcher.subscribe_callback(Filter::all(), move |_| {
                assert!(inner.shutdown().is_empty());
            });
        }
        let later = Arc::new(Mutex::new(Vec::new()));
        {
            let inner = Arc::clone(&dispatcher);
            let later = Arc::clone(&later);
            dispatcher.subscribe_callback(Filter::all(), move |_| {
                later.lock().expect("later").push(inner.phase());
            });
        }
        let report = dispatcher.dispatch(title(1)).expect("dispatch");
        assert_eq!(report.delivered, 2);
        assert_eq!(*later.lock().expect("later"), vec![AuthorizationPhase::WaitTdlibParameters]);
        assert_eq!(dispatcher.phase(), AuthorizationPhase::Closed);
        assert!(dispatcher.unhandled().is_closed());
    }

    #[test]
    fn shutdown_waits_for_in_flight_dispatch() {
        let dispatcher = Arc::new(Dispatcher::new(&ClientConfig::default()));
        let (entered_tx, entered_rx) = std::sync::mpsc::channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
        let release_rx = Mutex::new(release_rx);
        let finished = Arc::new(AtomicBool::new(false));
        {
            let finished = Arc::clone(&finished);
            dispatcher.subscribe_callback(Filter::all(), move |_| {
                entered_tx.send(()).expect("entered");
                release_rx.lock().expect("release").recv().expect("release signal");
                finished.store(true, Ordering::SeqCst);
            });
        }
        let worker = {
            let dispatcher = Arc::clone(&dispatcher);
            thread::spawn(move || dispatcher.dispatch(title(1)))
        };
        entered_rx.recv().expect("callback entered");
        let closer = {
            let dispatcher = Arc::clone(&dispatcher);
            thread::spawn(move || dispatcher.shutdown())
        };
        release_tx.send(()).expect("release");
        closer.join().expect("closer thread");
        assert!(finished.load(Ordering::SeqCst));
        assert!(worker.join().expect("worker thread").is_ok());
        assert_eq!(dispatcher.phase(), AuthorizationPhase::Closed);
    }

    #[test]
    fn reports_carry_tag_for_option_updates() {
        let dispatcher = Dispatcher::new(&ClientConfig::default());
        let update = Update::Option(UpdateOption {
            name: "version".to_owned(),
            value: TdObject::new("optionValueString", serde_json::Map::new()),
        });
        let report = dispatcher.dispatch(update).expect("dispatch");
        assert_eq!(report.tag, UpdateTag::Option);
        assert_eq!(report.transition, None);
        assert_eq!(report.delivered, 0);
    }
}
