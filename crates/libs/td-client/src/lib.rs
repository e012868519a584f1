//! Session-level dispatch for the TDLib JSON interface.
//!
//! Inbound objects flow through [`UpdatePump`] into the [`Dispatcher`], which
//! feeds the [`AuthorizationStateMachine`] first and then every matching
//! subscription. Outbound requests go through [`Client`], whose gate rejects
//! operations that are not legal in the current authorization phase.

pub mod authorization;
pub mod client;
pub mod config;
pub mod dispatcher;
pub mod error;
mod pending;
pub mod params;
pub mod pump;
pub mod queue;
pub mod subscription;
pub mod transport;

pub use authorization::{
    is_legal_transition, legal_phases_for_method, AuthorizationStateMachine, ClientMethod, Transition,
};
pub use client::Client;
pub use config::{ClientConfig, RedactionConfig};
pub use dispatcher::{DispatchReport, DispatchStats, Dispatcher};
pub use error::{ClientError, TransportError};
pub use params::TdlibParameters;
pub use pump::{PumpSummary, UpdatePump};
pub use queue::{BoundedQueue, PushOutcome};
pub use subscription::{Filter, Subscription, SubscriptionId, SubscriptionManager, UpdateCallback};
pub use transport::Transport;

pub use td_updates;
