use crate::catalog::UpdateTag;
use crate::envelope::Envelope;
use crate::shape::{FaultKind, FieldFault};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DecodeReason {
    /// The tag is not in the registry, usually a newer server than the catalog.
    UnknownTag,
    ShapeMismatch,
    MissingField,
}

impl DecodeReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnknownTag => "unknown_tag",
            Self::ShapeMismatch => "shape_mismatch",
            Self::MissingField => "missing_field",
        }
    }
}

impl fmt::Display for DecodeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<FaultKind> for DecodeReason {
    fn from(kind: FaultKind) -> Self {
        match kind {
            FaultKind::Missing => Self::MissingField,
            FaultKind::Shape => Self::ShapeMismatch,
        }
    }
}

/// Tag of a failed envelope: a catalog tag, or whatever string the wire carried.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TagRef {
    Known(UpdateTag),
    Unknown(String),
}

impl TagRef {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Known(tag) => tag.as_str(),
            Self::Unknown(raw) => raw.as_str(),
        }
    }

    pub fn known(&self) -> Option<UpdateTag> {
        match self {
            Self::Known(tag) => Some(*tag),
            Self::Unknown(_) => None,
        }
    }
}

impl fmt::Display for TagRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(tag) => f.write_str(tag.as_str()),
            Self::Unknown(raw) if raw.is_empty() => f.write_str("<untagged>"),
            Self::Unknown(raw) => f.write_str(raw),
        }
    }
}

/// An envelope that could not be narrowed. Carries the raw envelope so the
/// failure can be diagnosed or re-routed.
#[derive(Clone, Debug, PartialEq, Error)]
#[error("{reason} decoding '{tag}'{}", field_suffix(.field))]
pub struct DecodeError {
    pub tag: TagRef,
    pub reason: DecodeReason,
    pub field: Option<String>,
    pub raw: Envelope,
}

impl DecodeError {
    pub fn unknown_tag(raw: Envelope) -> Self {
        Self {
            tag: TagRef::Unknown(raw.tag().to_owned()),
            reason: DecodeReason::UnknownTag,
            field: None,
            raw,
        }
    }

    pub fn field_fault(tag: UpdateTag, fault: FieldFault, raw: Envelope) -> Self {
        Self {
            tag: TagRef::Known(tag),
            reason: fault.kind.into(),
            field: Some(fault.field.to_owned()),
            raw,
        }
    }

    pub fn is_unknown_tag(&self) -> bool {
        self.reason == DecodeReason::UnknownTag
    }
}

fn field_suffix(field: &Option<String>) -> String {
    match field {
        Some(name) => format!(" (field '{name}')"),
        None => String::new(),
    }
}
