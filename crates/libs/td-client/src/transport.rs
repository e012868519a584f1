use crate::error::TransportError;
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// Outbound half of the native client core.
///
/// Inbound envelopes arrive separately on a `tokio::sync::mpsc` channel read
/// by [`crate::UpdatePump`].
pub trait Transport: Send + Sync {
    fn send(&self, request: &JsonValue) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: &JsonValue) -> Result<(), TransportError> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, request: &JsonValue) -> Result<(), TransportError> {
        (**self).send(request)
    }
}
