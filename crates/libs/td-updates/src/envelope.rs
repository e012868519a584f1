use crate::error::{DecodeError, DecodeReason, TagRef};
use serde::Serialize;
use serde_json::{Map as JsonMap, Value as JsonValue};

/// Key carrying the constructor name of every upstream object.
pub const TYPE_KEY: &str = "@type";
/// Key the upstream core echoes back on responses to correlate requests.
pub const EXTRA_KEY: &str = "@extra";
/// Key naming the upstream client instance that produced the object.
pub const CLIENT_ID_KEY: &str = "@client_id";

/// Raw tagged object as received from the transport, before narrowing.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Envelope {
    #[serde(rename = "@type")]
    tag: String,
    #[serde(flatten)]
    fields: JsonMap<String, JsonValue>,
}

impl Envelope {
    pub fn new(tag: impl Into<String>, fields: JsonMap<String, JsonValue>) -> Self {
        Self { tag: tag.into(), fields }
    }

    /// Splits a raw JSON object into its `@type` tag and remaining fields.
    pub fn from_value(value: JsonValue) -> Result<Self, DecodeError> {
        let mut fields = match value {
            JsonValue::Object(fields) => fields,
            other => {
                let mut fields = JsonMap::new();
                fields.insert("@value".to_owned(), other);
                return Err(missing_type(Self::new(String::new(), fields)));
            }
        };
        match fields.remove(TYPE_KEY) {
            Some(JsonValue::String(tag)) => Ok(Self { tag, fields }),
            Some(other) => {
                fields.insert(TYPE_KEY.to_owned(), other);
                Err(missing_type(Self::new(String::new(), fields)))
            }
            None => Err(missing_type(Self::new(String::new(), fields))),
        }
    }

    pub fn tag(&self) -> &str {
        self.tag.as_str()
    }

    pub fn fields(&self) -> &JsonMap<String, JsonValue> {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.fields.get(key)
    }

    pub fn extra(&self) -> Option<&JsonValue> {
        self.fields.get(EXTRA_KEY).filter(|value| !value.is_null())
    }

    pub fn client_id(&self) -> Option<i64> {
        self.fields.get(CLIENT_ID_KEY).and_then(JsonValue::as_i64)
    }

    pub fn into_value(self) -> JsonValue {
        let mut fields = self.fields;
        if !self.tag.is_empty() {
            fields.insert(TYPE_KEY.to_owned(), JsonValue::String(self.tag));
        }
        JsonValue::Object(fields)
    }
}

fn missing_type(raw: Envelope) -> DecodeError {
    DecodeError {
        tag: TagRef::Unknown(String::new()),
        reason: DecodeReason::MissingField,
        field: Some(TYPE_KEY.to_owned()),
        raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn splits_tag_from_fields() {
        let envelope = Envelope::from_value(json!({
            "@type": "updateChatTitle",
            "chat_id": 5,
            "title": "ops",
            "@extra": 11
        }))
        .expect("envelope");
        assert_eq!(envelope.tag(), "updateChatTitle");
        assert!(envelope.get("@type").is_none());
        assert_eq!(envelope.extra(), Some(&json!(11)));
        assert_eq!(envelope.into_value()["@type"], json!("updateChatTitle"));
    }

    #[test]
    fn missing_or_non_string_tag_is_a_missing_field() {
        let err = Envelope::from_value(json!({"chat_id": 5})).expect_err("no tag");
        assert_eq!(err.reason, DecodeReason::MissingField);
        assert_eq!(err.field.as_deref(), Some("@type"));

        let err = Envelope::from_value(json!({"@type": 3})).expect_err("numeric tag");
        assert_eq!(err.reason, DecodeReason::MissingField);
        assert_eq!(err.raw.get("@type"), Some(&json!(3)));

        let err = Envelope::from_value(json!([1, 2])).expect_err("not an object");
        assert_eq!(err.tag, TagRef::Unknown(String::new()));
    }
}
