use crate::shape::TdObject;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Position of a session in the login lifecycle.
///
/// `Unstarted` is the pre-phase a session holds before the first
/// `updateAuthorizationState` arrives; it never appears on the wire.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationPhase {
    #[default]
    Unstarted,
    WaitTdlibParameters,
    WaitPhoneNumber,
    WaitEmailAddress,
    WaitEmailCode,
    WaitCode,
    WaitOtherDeviceConfirmation,
    WaitRegistration,
    WaitPassword,
    Ready,
    LoggingOut,
    Closing,
    Closed,
}

impl AuthorizationPhase {
    pub const ALL: [AuthorizationPhase; 13] = [
        Self::Unstarted,
        Self::WaitTdlibParameters,
        Self::WaitPhoneNumber,
        Self::WaitEmailAddress,
        Self::WaitEmailCode,
        Self::WaitCode,
        Self::WaitOtherDeviceConfirmation,
        Self::WaitRegistration,
        Self::WaitPassword,
        Self::Ready,
        Self::LoggingOut,
        Self::Closing,
        Self::Closed,
    ];

    /// Maps an `authorizationState*` constructor name to its phase.
    pub fn from_constructor(name: &str) -> Option<Self> {
        let phase = match name {
            "authorizationStateWaitTdlibParameters" => Self::WaitTdlibParameters,
            "authorizationStateWaitPhoneNumber" => Self::WaitPhoneNumber,
            "authorizationStateWaitEmailAddress" => Self::WaitEmailAddress,
            "authorizationStateWaitEmailCode" => Self::WaitEmailCode,
            "authorizationStateWaitCode" => Self::WaitCode,
            "authorizationStateWaitOtherDeviceConfirmation" => Self::WaitOtherDeviceConfirmation,
            "authorizationStateWaitRegistration" => Self::WaitRegistration,
            "authorizationStateWaitPassword" => Self::WaitPassword,
            "authorizationStateReady" => Self::Ready,
            "authorizationStateLoggingOut" => Self::LoggingOut,
            "authorizationStateClosing" => Self::Closing,
            "authorizationStateClosed" => Self::Closed,
            _ => return None,
        };
        Some(phase)
    }

    pub fn constructor(self) -> Option<&'static str> {
        let name = match self {
            Self::Unstarted => return None,
            Self::WaitTdlibParameters => "authorizationStateWaitTdlibParameters",
            Self::WaitPhoneNumber => "authorizationStateWaitPhoneNumber",
            Self::WaitEmailAddress => "authorizationStateWaitEmailAddress",
            Self::WaitEmailCode => "authorizationStateWaitEmailCode",
            Self::WaitCode => "authorizationStateWaitCode",
            Self::WaitOtherDeviceConfirmation => "authorizationStateWaitOtherDeviceConfirmation",
            Self::WaitRegistration => "authorizationStateWaitRegistration",
            Self::WaitPassword => "authorizationStateWaitPassword",
            Self::Ready => "authorizationStateReady",
            Self::LoggingOut => "authorizationStateLoggingOut",
            Self::Closing => "authorizationStateClosing",
            Self::Closed => "authorizationStateClosed",
        };
        Some(name)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unstarted => "unstarted",
            Self::WaitTdlibParameters => "wait_tdlib_parameters",
            Self::WaitPhoneNumber => "wait_phone_number",
            Self::WaitEmailAddress => "wait_email_address",
            Self::WaitEmailCode => "wait_email_code",
            Self::WaitCode => "wait_code",
            Self::WaitOtherDeviceConfirmation => "wait_other_device_confirmation",
            Self::WaitRegistration => "wait_registration",
            Self::WaitPassword => "wait_password",
            Self::Ready => "ready",
            Self::LoggingOut => "logging_out",
            Self::Closing => "closing",
            Self::Closed => "closed",
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Self::Closed
    }
}

impl fmt::Display for AuthorizationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of an `authorization_state` field: the phase plus the
/// constructor's own fields (code info, password hint, QR link, ...).
#[derive(Clone, Debug, PartialEq)]
pub struct AuthorizationState {
    phase: AuthorizationPhase,
    details: TdObject,
}

impl AuthorizationState {
    pub fn from_object(details: TdObject) -> Option<Self> {
        let phase = AuthorizationPhase::from_constructor(details.type_name())?;
        Some(Self { phase, details })
    }

    /// Builds a state with no constructor fields; `None` for `Unstarted`.
    pub fn bare(phase: AuthorizationPhase) -> Option<Self> {
        let constructor = phase.constructor()?;
        Some(Self { phase, details: TdObject::new(constructor, Default::default()) })
    }

    pub fn phase(&self) -> AuthorizationPhase {
        self.phase
    }

    pub fn details(&self) -> &TdObject {
        &self.details
    }
}

impl Serialize for AuthorizationState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.details.serialize(serializer)
    }
}
