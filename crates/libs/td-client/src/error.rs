use serde::{Deserialize, Serialize};
use td_updates::AuthorizationPhase;

pub mod code {
    pub const NOT_AUTHORIZED: &str = "CLIENT_NOT_AUTHORIZED";
    pub const TRANSPORT: &str = "CLIENT_TRANSPORT_ERROR";
    pub const INVALID_REQUEST: &str = "CLIENT_INVALID_REQUEST";
    pub const REMOTE: &str = "CLIENT_REMOTE_ERROR";
    pub const CLOSED: &str = "CLIENT_CLOSED";
    pub const CONFIG: &str = "CLIENT_CONFIG_INVALID";
}

/// Errors returned to callers of the client surface.
///
/// `NotAuthorized` is a caller error raised locally by the authorization gate;
/// the request never reaches the transport.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum ClientError {
    #[error("not authorized: '{method}' is not legal in phase '{phase}'")]
    NotAuthorized { method: String, phase: AuthorizationPhase },

    #[error("transport error: {message}")]
    Transport { message: String },

    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("remote error {code}: {message}")]
    Remote { code: i64, message: String },

    #[error("client is closed")]
    Closed,

    #[error("invalid config: {message}")]
    Config { message: String },
}

impl ClientError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotAuthorized { .. } => code::NOT_AUTHORIZED,
            Self::Transport { .. } => code::TRANSPORT,
            Self::InvalidRequest { .. } => code::INVALID_REQUEST,
            Self::Remote { .. } => code::REMOTE,
            Self::Closed => code::CLOSED,
            Self::Config { .. } => code::CONFIG,
        }
    }

    /// Returns `true` for transient errors that may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    pub fn is_not_authorized(&self) -> bool {
        matches!(self, Self::NotAuthorized { .. })
    }

    pub fn not_authorized(method: impl Into<String>, phase: AuthorizationPhase) -> Self {
        Self::NotAuthorized { method: method.into(), phase }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest { message: message.into() }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }
}

/// Failure reported by a [`crate::Transport`] implementation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum TransportError {
    #[error("transport is closed")]
    Closed,

    #[error("send failed: {0}")]
    Send(String),
}

impl From<TransportError> for ClientError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Closed => Self::Closed,
            TransportError::Send(message) => Self::Transport { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        let err = ClientError::not_authorized("sendMessage", AuthorizationPhase::WaitCode);
        assert_eq!(err.code(), code::NOT_AUTHORIZED);
        assert_eq!(err.to_string(), "not authorized: 'sendMessage' is not legal in phase 'wait_code'");
        assert!(!err.is_retryable());
        assert!(ClientError::from(TransportError::Send("pipe".into())).is_retryable());
        assert_eq!(ClientError::from(TransportError::Closed), ClientError::Closed);
    }
}
