use crate::catalog::Update;
use crate::envelope::Envelope;
use crate::error::DecodeError;
use crate::registry::Registry;
use serde_json::Value as JsonValue;

/// Tag of the upstream container object that batches several updates.
pub const UPDATES_CONTAINER_TAG: &str = "updates";

/// Turns envelopes into typed updates using a [`Registry`].
///
/// A narrower holds nothing but a shared reference to the registry, so it is
/// `Copy` and every call is a pure function of its input.
#[derive(Clone, Copy, Debug)]
pub struct Narrower<'r> {
    registry: &'r Registry,
}

impl Narrower<'static> {
    pub fn global() -> Self {
        Self { registry: Registry::global() }
    }
}

impl<'r> Narrower<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    pub fn narrow(&self, envelope: Envelope) -> Result<Update, DecodeError> {
        let Some(rule) = self.registry.lookup(envelope.tag()) else {
            return Err(DecodeError::unknown_tag(envelope));
        };
        for field in rule.fields() {
            if let Err(fault) = field.check(envelope.fields()) {
                return Err(DecodeError::field_fault(rule.tag(), fault, envelope));
            }
        }
        match rule.build(envelope.fields()) {
            Ok(update) => Ok(update),
            Err(fault) => Err(DecodeError::field_fault(rule.tag(), fault, envelope)),
        }
    }

    pub fn narrow_value(&self, value: JsonValue) -> Result<Update, DecodeError> {
        self.narrow(Envelope::from_value(value)?)
    }

    /// Narrows one inbound object, expanding an `updates` container into its
    /// members in order. Each member succeeds or fails on its own.
    pub fn narrow_batch(&self, value: JsonValue) -> Vec<Result<Update, DecodeError>> {
        let envelope = match Envelope::from_value(value) {
            Ok(envelope) => envelope,
            Err(err) => return vec![Err(err)],
        };
        if envelope.tag() != UPDATES_CONTAINER_TAG {
            return vec![self.narrow(envelope)];
        }
        let members = match envelope.get(UPDATES_CONTAINER_TAG) {
            Some(JsonValue::Array(members)) => members.clone(),
            _ => return vec![self.narrow(envelope)],
        };
        members.into_iter().map(|member| self.narrow_value(member)).collect()
    }
}
