use crate::dispatcher::Dispatcher;
use crate::error::ClientError;
use crate::pending::PendingRequests;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use td_updates::{AuthorizationPhase, Narrower, EXTRA_KEY, TYPE_KEY, UPDATES_CONTAINER_TAG};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PumpSummary {
    pub received: u64,
    pub responses: u64,
    pub dispatched: u64,
    pub delivered: u64,
    pub decode_errors: u64,
    pub final_phase: AuthorizationPhase,
}

/// The single dispatch loop of a session.
///
/// Reads inbound objects in order, routes correlated responses to waiting
/// requests and narrows everything else into the dispatcher.
pub struct UpdatePump {
    narrower: Narrower<'static>,
    dispatcher: Arc<Dispatcher>,
    pending: Arc<PendingRequests>,
    inbound: mpsc::Receiver<JsonValue>,
    shutdown: CancellationToken,
    summary: PumpSummary,
}

impl UpdatePump {
    pub(crate) fn new(
        dispatcher: Arc<Dispatcher>,
        pending: Arc<PendingRequests>,
        inbound: mpsc::Receiver<JsonValue>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            narrower: Narrower::global(),
            dispatcher,
            pending,
            inbound,
            shutdown,
            summary: PumpSummary::default(),
        }
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn summary(&self) -> PumpSummary {
        PumpSummary { final_phase: self.dispatcher.phase(), ..self.summary }
    }

    /// Handles one inbound object. Fails once the session has shut down.
    pub fn process(&mut self, value: JsonValue) -> Result<(), ClientError> {
        if self.shutdown.is_cancelled() || self.dispatcher.is_closed() {
            return Err(ClientError::Closed);
        }
        self.summary.received += 1;
        let value = match self.route_response(value) {
            Some(value) => value,
            None => return Ok(()),
        };

        for result in self.narrower.narrow_batch(value) {
            match result {
                Ok(update) => {
                    let report = self.dispatcher.dispatch(update)?;
                    self.summary.dispatched += 1;
                    self.summary.delivered += report.delivered as u64;
                }
                Err(err) => {
                    self.summary.decode_errors += 1;
                    self.dispatcher.report_decode_error(err);
                }
            }
        }
        Ok(())
    }

    /// Runs until the shutdown token fires or the inbound channel closes, then
    /// closes the dispatcher and fails outstanding requests.
    pub async fn run(mut self) -> PumpSummary {
        log::debug!("pump: started");
        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    log::debug!("pump: shutdown requested");
                    break;
                }
                next = self.inbound.recv() => match next {
                    Some(value) => {
                        if self.process(value).is_err() {
                            log::debug!("pump: dispatcher closed");
                            break;
                        }
                    }
                    None => {
                        log::debug!("pump: inbound channel closed");
                        break;
                    }
                },
            }
        }
        self.finish()
    }

    fn finish(mut self) -> PumpSummary {
        self.inbound.close();
        self.shutdown.cancel();
        let transitions = self.dispatcher.shutdown();
        let failed = self.pending.close();
        let summary = self.summary();
        log::debug!(
            "pump: stopped after {} object(s), {} forced transition(s), {} request(s) failed",
            summary.received,
            transitions.len(),
            failed
        );
        summary
    }

    /// Returns the value back when it is not a response to a pending request.
    fn route_response(&mut self, value: JsonValue) -> Option<JsonValue> {
        let Some(extra) = value.get(EXTRA_KEY).and_then(JsonValue::as_u64) else {
            return Some(value);
        };
        if let Some(waiter) = self.pending.take(extra) {
            self.summary.responses += 1;
            if waiter.send(value).is_err() {
                log::trace!("pump: requester for @extra {} went away", extra);
            }
            return None;
        }

        let tag = value.get(TYPE_KEY).and_then(JsonValue::as_str).unwrap_or_default();
        if tag == UPDATES_CONTAINER_TAG || self.narrower.registry().contains(tag) {
            return Some(value);
        }
        self.summary.responses += 1;
        if tag == "error" {
            log::debug!("pump: uncorrelated error response for @extra {}", extra);
        } else {
            log::trace!("pump: discarding {} response for @extra {}", tag, extra);
        }
        None
    }
}

impl std::fmt::Debug for UpdatePump {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdatePump").field("summary", &self.summary).finish()
    }
}
