//! Field shapes and the typed values a catalog field can decode into.
//!
//! Every payload field in the catalog is declared with a Rust type implementing
//! [`TdField`]. The type carries its wire shape as an associated constant so the
//! narrower can validate an envelope generically before any payload is built.

use crate::authorization::{AuthorizationPhase, AuthorizationState};
use serde::{Serialize, Serializer};
use serde_json::{Map as JsonMap, Value as JsonValue};
use std::fmt;

/// Wire shape of a single JSON value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueShape {
    /// `int32`: integer that fits in 32 bits.
    Int32,
    /// `int53`: integer transported as a JSON number.
    Int53,
    /// `int64`: decimal string, integers are tolerated.
    Int64,
    Double,
    Bool,
    /// `string` and `bytes` (base64) alike.
    String,
    /// Nested object carrying its own `@type`.
    Object,
    /// An `authorizationState*` object.
    AuthorizationState,
}

impl ValueShape {
    pub fn matches(self, value: &JsonValue) -> bool {
        match self {
            Self::Int32 => i32::from_json(value).is_some(),
            Self::Int53 => i64::from_json(value).is_some(),
            Self::Int64 => TdInt64::from_json(value).is_some(),
            Self::Double => value.is_number(),
            Self::Bool => value.is_boolean(),
            Self::String => value.is_string(),
            Self::Object => object_type_name(value).is_some(),
            Self::AuthorizationState => object_type_name(value)
                .and_then(AuthorizationPhase::from_constructor)
                .is_some(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Int32 => "int32",
            Self::Int53 => "int53",
            Self::Int64 => "int64",
            Self::Double => "double",
            Self::Bool => "Bool",
            Self::String => "string",
            Self::Object => "object",
            Self::AuthorizationState => "AuthorizationState",
        }
    }
}

/// Wire shape of a catalog field: a single value or a vector of values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldShape {
    Scalar(ValueShape),
    Array(ValueShape),
}

impl FieldShape {
    pub const fn value(self) -> ValueShape {
        match self {
            Self::Scalar(value) | Self::Array(value) => value,
        }
    }

    pub fn matches(self, value: &JsonValue) -> bool {
        match self {
            Self::Scalar(shape) => shape.matches(value),
            Self::Array(shape) => value
                .as_array()
                .is_some_and(|items| items.iter().all(|item| shape.matches(item))),
        }
    }
}

impl fmt::Display for FieldShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(shape) => f.write_str(shape.as_str()),
            Self::Array(shape) => write!(f, "vector<{}>", shape.as_str()),
        }
    }
}

/// Why a single field failed validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaultKind {
    Missing,
    Shape,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldFault {
    pub field: &'static str,
    pub kind: FaultKind,
}

impl FieldFault {
    pub fn missing(field: &'static str) -> Self {
        Self { field, kind: FaultKind::Missing }
    }

    pub fn shape(field: &'static str) -> Self {
        Self { field, kind: FaultKind::Shape }
    }
}

/// One entry in a decode rule: the field name on the wire and its shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldRule {
    pub name: &'static str,
    pub shape: FieldShape,
    pub optional: bool,
}

impl FieldRule {
    /// Validates the field against an envelope's fields. `null` counts as absent.
    pub fn check(&self, fields: &JsonMap<String, JsonValue>) -> Result<(), FieldFault> {
        match fields.get(self.name) {
            None | Some(JsonValue::Null) if self.optional => Ok(()),
            None | Some(JsonValue::Null) => Err(FieldFault::missing(self.name)),
            Some(value) if self.shape.matches(value) => Ok(()),
            Some(_) => Err(FieldFault::shape(self.name)),
        }
    }
}

/// A Rust type that a catalog field decodes into.
pub trait TdField: Sized {
    const SHAPE: FieldShape;
    const OPTIONAL: bool = false;

    fn from_json(value: &JsonValue) -> Option<Self>;

    fn decode_field(
        fields: &JsonMap<String, JsonValue>,
        name: &'static str,
    ) -> Result<Self, FieldFault> {
        match fields.get(name) {
            None | Some(JsonValue::Null) => Err(FieldFault::missing(name)),
            Some(value) => Self::from_json(value).ok_or(FieldFault::shape(name)),
        }
    }
}

impl TdField for i32 {
    const SHAPE: FieldShape = FieldShape::Scalar(ValueShape::Int32);

    fn from_json(value: &JsonValue) -> Option<Self> {
        value.as_i64().and_then(|raw| i32::try_from(raw).ok())
    }
}

impl TdField for i64 {
    const SHAPE: FieldShape = FieldShape::Scalar(ValueShape::Int53);

    fn from_json(value: &JsonValue) -> Option<Self> {
        value.as_i64()
    }
}

impl TdField for f64 {
    const SHAPE: FieldShape = FieldShape::Scalar(ValueShape::Double);

    fn from_json(value: &JsonValue) -> Option<Self> {
        value.as_f64()
    }
}

impl TdField for bool {
    const SHAPE: FieldShape = FieldShape::Scalar(ValueShape::Bool);

    fn from_json(value: &JsonValue) -> Option<Self> {
        value.as_bool()
    }
}

impl TdField for String {
    const SHAPE: FieldShape = FieldShape::Scalar(ValueShape::String);

    fn from_json(value: &JsonValue) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }
}

impl<T: TdField> TdField for Option<T> {
    const SHAPE: FieldShape = T::SHAPE;
    const OPTIONAL: bool = true;

    fn from_json(value: &JsonValue) -> Option<Self> {
        if value.is_null() {
            return Some(None);
        }
        T::from_json(value).map(Some)
    }

    fn decode_field(
        fields: &JsonMap<String, JsonValue>,
        name: &'static str,
    ) -> Result<Self, FieldFault> {
        match fields.get(name) {
            None | Some(JsonValue::Null) => Ok(None),
            Some(value) => T::from_json(value).map(Some).ok_or(FieldFault::shape(name)),
        }
    }
}

// Nested vectors do not occur in the update catalog, so the element shape is flat.
impl<T: TdField> TdField for Vec<T> {
    const SHAPE: FieldShape = FieldShape::Array(T::SHAPE.value());

    fn from_json(value: &JsonValue) -> Option<Self> {
        value.as_array()?.iter().map(T::from_json).collect()
    }
}

/// Upstream `int64`, which travels as a decimal string to survive JSON doubles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TdInt64(pub i64);

impl TdInt64 {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for TdInt64 {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for TdInt64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for TdInt64 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl TdField for TdInt64 {
    const SHAPE: FieldShape = FieldShape::Scalar(ValueShape::Int64);

    fn from_json(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::String(raw) => raw.trim().parse().ok().map(Self),
            JsonValue::Number(number) => number.as_i64().map(Self),
            _ => None,
        }
    }
}

/// A nested upstream object kept in its JSON form.
///
/// The update catalog only pins the top-level payload; nested objects such as
/// `message` or `chat` are carried with their constructor name so consumers
/// can match on [`TdObject::type_name`] and read the fields they need.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TdObject {
    #[serde(rename = "@type")]
    type_name: String,
    #[serde(flatten)]
    fields: JsonMap<String, JsonValue>,
}

impl TdObject {
    pub fn new(type_name: impl Into<String>, fields: JsonMap<String, JsonValue>) -> Self {
        Self { type_name: type_name.into(), fields }
    }

    pub fn type_name(&self) -> &str {
        self.type_name.as_str()
    }

    pub fn fields(&self) -> &JsonMap<String, JsonValue> {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.fields.get(key)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(JsonValue::as_i64)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(JsonValue::as_str)
    }

    pub fn get_object(&self, key: &str) -> Option<TdObject> {
        self.get(key).and_then(TdObject::from_json)
    }

    pub fn into_value(self) -> JsonValue {
        let mut fields = self.fields;
        fields.insert("@type".to_owned(), JsonValue::String(self.type_name));
        JsonValue::Object(fields)
    }
}

impl TdField for TdObject {
    const SHAPE: FieldShape = FieldShape::Scalar(ValueShape::Object);

    fn from_json(value: &JsonValue) -> Option<Self> {
        let object = value.as_object()?;
        let type_name = object.get("@type")?.as_str()?.to_owned();
        let mut fields = object.clone();
        fields.remove("@type");
        Some(Self { type_name, fields })
    }
}

impl TdField for AuthorizationState {
    const SHAPE: FieldShape = FieldShape::Scalar(ValueShape::AuthorizationState);

    fn from_json(value: &JsonValue) -> Option<Self> {
        AuthorizationState::from_object(TdObject::from_json(value)?)
    }
}

fn object_type_name(value: &JsonValue) -> Option<&str> {
    value.as_object()?.get("@type")?.as_str()
}
