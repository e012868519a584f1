//! Typed update catalog for the TDLib JSON interface.
//!
//! - [`Envelope`]: a raw `@type`-tagged object as received from the client core
//! - [`Registry`]: immutable tag → [`DecodeRule`] table built from the catalog
//! - [`Narrower`]: validates an envelope against its rule and builds an [`Update`]
//! - [`DecodeError`]: classified narrowing failure carrying the raw envelope

pub mod authorization;
pub mod catalog;
pub mod envelope;
pub mod error;
pub mod narrow;
pub mod registry;
pub mod shape;

pub use authorization::{AuthorizationPhase, AuthorizationState};
pub use catalog::{CatalogPayload, Update, UpdateAuthorizationState, UpdateTag};
pub use envelope::{Envelope, CLIENT_ID_KEY, EXTRA_KEY, TYPE_KEY};
pub use error::{DecodeError, DecodeReason, TagRef};
pub use narrow::{Narrower, UPDATES_CONTAINER_TAG};
pub use registry::{DecodeRule, Registry};
pub use shape::{FieldRule, FieldShape, TdField, TdInt64, TdObject, ValueShape};
