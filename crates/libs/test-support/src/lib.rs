//! Fixtures shared by the conformance suite: well-formed sample envelopes for
//! every catalog tag and a transport that records outbound requests.

use serde_json::{json, Map as JsonMap, Value as JsonValue};
use std::sync::Mutex;
use td_client::{Transport, TransportError};
use td_updates::{AuthorizationPhase, FieldShape, Registry, UpdateTag, ValueShape};

#[cfg(test)]
mod conformance;

pub fn sample_value(shape: ValueShape) -> JsonValue {
    match shape {
        ValueShape::Int32 => json!(7),
        ValueShape::Int53 => json!(1_000_000_007_i64),
        ValueShape::Int64 => json!("9007199254740993"),
        ValueShape::Double => json!(1.5),
        ValueShape::Bool => json!(true),
        ValueShape::String => json!("sample"),
        ValueShape::Object => json!({"@type": "sampleObject", "id": 1}),
        ValueShape::AuthorizationState => json!({"@type": "authorizationStateReady"}),
    }
}

pub fn sample_field(shape: FieldShape) -> JsonValue {
    match shape {
        FieldShape::Scalar(value) => sample_value(value),
        FieldShape::Array(value) => json!([sample_value(value), sample_value(value)]),
    }
}

/// Envelope for `tag` with every declared field present.
pub fn sample_envelope(tag: UpdateTag) -> JsonValue {
    build_envelope(tag, true)
}

/// Envelope for `tag` carrying only its required fields.
pub fn minimal_envelope(tag: UpdateTag) -> JsonValue {
    build_envelope(tag, false)
}

fn build_envelope(tag: UpdateTag, with_optional: bool) -> JsonValue {
    let mut fields = JsonMap::new();
    fields.insert("@type".to_owned(), json!(tag.as_str()));
    for rule in Registry::global().rule(tag).fields() {
        if rule.optional && !with_optional {
            continue;
        }
        fields.insert(rule.name.to_owned(), sample_field(rule.shape));
    }
    JsonValue::Object(fields)
}

pub fn authorization_envelope(phase: AuthorizationPhase) -> JsonValue {
    json!({
        "@type": "updateAuthorizationState",
        "authorization_state": {"@type": phase.constructor().unwrap_or("authorizationStateUnstarted")},
    })
}

pub fn new_message_envelope(chat_id: i64, message_id: i64, text: &str) -> JsonValue {
    json!({
        "@type": "updateNewMessage",
        "message": {
            "@type": "message",
            "id": message_id,
            "chat_id": chat_id,
            "content": {"@type": "messageText", "text": {"@type": "formattedText", "text": text}},
        },
    })
}

/// Transport that keeps every outbound request for later inspection.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    requests: Mutex<Vec<JsonValue>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<JsonValue> {
        self.requests.lock().expect("recording transport mutex poisoned").clone()
    }

    pub fn request_types(&self) -> Vec<String> {
        self.requests()
            .iter()
            .filter_map(|request| request.get("@type").and_then(JsonValue::as_str).map(str::to_owned))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.requests.lock().expect("recording transport mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Transport for RecordingTransport {
    fn send(&self, request: &JsonValue) -> Result<(), TransportError> {
        self.requests.lock().expect("recording transport mutex poisoned").push(request.clone());
        Ok(())
    }
}
