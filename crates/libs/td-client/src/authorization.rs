use crate::error::ClientError;
use serde::{Deserialize, Serialize};
use td_updates::{AuthorizationPhase, AuthorizationState, UpdateAuthorizationState};

/// Outbound operations known to the authorization gate.
///
/// Every request type not listed here is an ordinary operation and maps to
/// [`ClientMethod::Other`], which requires [`AuthorizationPhase::Ready`].
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ClientMethod {
    SetTdlibParameters,
    SetAuthenticationPhoneNumber,
    SetAuthenticationEmailAddress,
    CheckAuthenticationEmailCode,
    CheckAuthenticationCode,
    ResendAuthenticationCode,
    RequestQrCodeAuthentication,
    RegisterUser,
    CheckAuthenticationPassword,
    RequestAuthenticationPasswordRecovery,
    RecoverAuthenticationPassword,
    GetAuthorizationState,
    GetOption,
    SetOption,
    SetLogVerbosityLevel,
    GetLogVerbosityLevel,
    LogOut,
    Close,
    Destroy,
    SendMessage,
    Other,
}

impl ClientMethod {
    pub const ALL: [ClientMethod; 21] = [
        Self::SetTdlibParameters,
        Self::SetAuthenticationPhoneNumber,
        Self::SetAuthenticationEmailAddress,
        Self::CheckAuthenticationEmailCode,
        Self::CheckAuthenticationCode,
        Self::ResendAuthenticationCode,
        Self::RequestQrCodeAuthentication,
        Self::RegisterUser,
        Self::CheckAuthenticationPassword,
        Self::RequestAuthenticationPasswordRecovery,
        Self::RecoverAuthenticationPassword,
        Self::GetAuthorizationState,
        Self::GetOption,
        Self::SetOption,
        Self::SetLogVerbosityLevel,
        Self::GetLogVerbosityLevel,
        Self::LogOut,
        Self::Close,
        Self::Destroy,
        Self::SendMessage,
        Self::Other,
    ];

    /// Request `@type` of the operation; `Other` has no fixed name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SetTdlibParameters => "setTdlibParameters",
            Self::SetAuthenticationPhoneNumber => "setAuthenticationPhoneNumber",
            Self::SetAuthenticationEmailAddress => "setAuthenticationEmailAddress",
            Self::CheckAuthenticationEmailCode => "checkAuthenticationEmailCode",
            Self::CheckAuthenticationCode => "checkAuthenticationCode",
            Self::ResendAuthenticationCode => "resendAuthenticationCode",
            Self::RequestQrCodeAuthentication => "requestQrCodeAuthentication",
            Self::RegisterUser => "registerUser",
            Self::CheckAuthenticationPassword => "checkAuthenticationPassword",
            Self::RequestAuthenticationPasswordRecovery => "requestAuthenticationPasswordRecovery",
            Self::RecoverAuthenticationPassword => "recoverAuthenticationPassword",
            Self::GetAuthorizationState => "getAuthorizationState",
            Self::GetOption => "getOption",
            Self::SetOption => "setOption",
            Self::SetLogVerbosityLevel => "setLogVerbosityLevel",
            Self::GetLogVerbosityLevel => "getLogVerbosityLevel",
            Self::LogOut => "logOut",
            Self::Close => "close",
            Self::Destroy => "destroy",
            Self::SendMessage => "sendMessage",
            Self::Other => "other",
        }
    }

    pub fn from_request_type(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|method| *method != Self::Other && method.as_str() == name)
            .unwrap_or(Self::Other)
    }
}

/// Outcome of applying one `updateAuthorizationState`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transition {
    pub from: AuthorizationPhase,
    pub to: AuthorizationPhase,
    pub legal: bool,
}

/// Per-session authorization phase, driven only by the server's reports.
///
/// Transitions outside the known graph are still applied because the server is
/// authoritative; they are flagged and counted. Once `Closed` is reached the
/// machine is frozen.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthorizationStateMachine {
    phase: AuthorizationPhase,
    last_state: Option<AuthorizationState>,
    transitions: u64,
    illegal_transitions: u64,
}

impl AuthorizationStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> AuthorizationPhase {
        self.phase
    }

    /// Constructor details of the last reported state (code info, password hint, ...).
    pub fn last_state(&self) -> Option<&AuthorizationState> {
        self.last_state.as_ref()
    }

    pub fn transitions(&self) -> u64 {
        self.transitions
    }

    pub fn illegal_transitions(&self) -> u64 {
        self.illegal_transitions
    }

    pub fn is_ready(&self) -> bool {
        self.phase == AuthorizationPhase::Ready
    }

    pub fn apply(&mut self, update: &UpdateAuthorizationState) -> Transition {
        self.apply_state(&update.authorization_state)
    }

    pub fn apply_state(&mut self, state: &AuthorizationState) -> Transition {
        let from = self.phase;
        let to = state.phase();
        if from.is_terminal() {
            self.illegal_transitions += 1;
            log::warn!("auth: ignoring {} reported after session closed", to);
            return Transition { from, to: from, legal: false };
        }

        let legal = is_legal_transition(from, to);
        if !legal {
            self.illegal_transitions += 1;
            log::warn!("auth: unexpected transition {} -> {}", from, to);
        } else if from != to {
            log::debug!("auth: {} -> {}", from, to);
        }
        self.phase = to;
        self.last_state = Some(state.clone());
        self.transitions += 1;
        Transition { from, to, legal }
    }

    /// Drives the machine to `Closed` through `Closing` without a server report.
    pub fn force_close(&mut self) -> Vec<Transition> {
        let mut applied = Vec::new();
        for target in [AuthorizationPhase::Closing, AuthorizationPhase::Closed] {
            if self.phase == target || self.phase.is_terminal() {
                continue;
            }
            if let Some(state) = AuthorizationState::bare(target) {
                applied.push(self.apply_state(&state));
            }
        }
        applied
    }

    pub fn ensure_method_legal(&self, method: ClientMethod) -> Result<(), ClientError> {
        self.ensure_request_legal(method, method.as_str())
    }

    /// Gate check for a raw request whose `@type` is `request_type`.
    pub fn ensure_request_legal(&self, method: ClientMethod, request_type: &str) -> Result<(), ClientError> {
        if legal_phases_for_method(method).contains(&self.phase) {
            return Ok(());
        }
        Err(ClientError::not_authorized(request_type, self.phase))
    }
}

/// Whether `from -> to` is an edge of the authorization graph.
///
/// Re-reporting the current phase is a legal refresh and any phase may move to
/// `Closing`.
pub fn is_legal_transition(from: AuthorizationPhase, to: AuthorizationPhase) -> bool {
    use AuthorizationPhase as P;
    if from.is_terminal() {
        return false;
    }
    if from == to || to == P::Closing {
        return true;
    }
    let next: &[AuthorizationPhase] = match from {
        P::Unstarted => &[P::WaitTdlibParameters],
        P::WaitTdlibParameters => &[P::WaitPhoneNumber, P::WaitOtherDeviceConfirmation],
        P::WaitPhoneNumber => {
            &[P::WaitEmailAddress, P::WaitCode, P::WaitRegistration, P::WaitOtherDeviceConfirmation]
        }
        P::WaitEmailAddress => &[P::WaitEmailCode],
        P::WaitEmailCode => &[P::WaitCode, P::WaitPhoneNumber],
        P::WaitCode => &[P::WaitRegistration, P::WaitPassword, P::Ready],
        P::WaitRegistration | P::WaitPassword => &[P::Ready],
        P::WaitOtherDeviceConfirmation => {
            &[P::WaitPhoneNumber, P::WaitEmailAddress, P::WaitCode, P::WaitRegistration, P::Ready]
        }
        P::Ready => &[P::LoggingOut],
        P::LoggingOut => &[],
        P::Closing => &[P::Closed],
        P::Closed => &[],
    };
    next.contains(&to)
}

pub fn legal_phases_for_method(method: ClientMethod) -> &'static [AuthorizationPhase] {
    use AuthorizationPhase as P;
    const ALWAYS: &[AuthorizationPhase] = &[
        P::Unstarted,
        P::WaitTdlibParameters,
        P::WaitPhoneNumber,
        P::WaitEmailAddress,
        P::WaitEmailCode,
        P::WaitCode,
        P::WaitOtherDeviceConfirmation,
        P::WaitRegistration,
        P::WaitPassword,
        P::Ready,
        P::LoggingOut,
        P::Closing,
        P::Closed,
    ];
    match method {
        ClientMethod::SetTdlibParameters => &[P::Unstarted, P::WaitTdlibParameters],
        ClientMethod::SetAuthenticationPhoneNumber => &[P::WaitPhoneNumber],
        ClientMethod::SetAuthenticationEmailAddress => &[P::WaitEmailAddress],
        ClientMethod::CheckAuthenticationEmailCode => &[P::WaitEmailCode],
        ClientMethod::CheckAuthenticationCode | ClientMethod::ResendAuthenticationCode => &[P::WaitCode],
        ClientMethod::RequestQrCodeAuthentication => &[
            P::WaitPhoneNumber,
            P::WaitEmailAddress,
            P::WaitEmailCode,
            P::WaitCode,
            P::WaitRegistration,
            P::WaitPassword,
        ],
        ClientMethod::RegisterUser => &[P::WaitRegistration],
        ClientMethod::CheckAuthenticationPassword
        | ClientMethod::RequestAuthenticationPasswordRecovery
        | ClientMethod::RecoverAuthenticationPassword => &[P::WaitPassword],
        ClientMethod::LogOut => &[
            P::WaitPhoneNumber,
            P::WaitEmailAddress,
            P::WaitEmailCode,
            P::WaitCode,
            P::WaitOtherDeviceConfirmation,
            P::WaitRegistration,
            P::WaitPassword,
            P::Ready,
        ],
        ClientMethod::GetAuthorizationState
        | ClientMethod::GetOption
        | ClientMethod::SetOption
        | ClientMethod::SetLogVerbosityLevel
        | ClientMethod::GetLogVerbosityLevel
        | ClientMethod::Close
        | ClientMethod::Destroy => ALWAYS,
        ClientMethod::SendMessage | ClientMethod::Other => &[P::Ready],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use td_updates::AuthorizationPhase as P;

    fn state(phase: AuthorizationPhase) -> UpdateAuthorizationState {
        UpdateAuthorizationState {
            authorization_state: AuthorizationState::bare(phase).expect("wire phase"),
        }
    }

    fn drive(machine: &mut AuthorizationStateMachine, phases: &[AuthorizationPhase]) -> Vec<Transition> {
        phases.iter().map(|phase| machine.apply(&state(*phase))).collect()
    }

    #[test]
    fn phone_login_flow_is_legal() {
        let mut machine = AuthorizationStateMachine::new();
        let transitions = drive(
            &mut machine,
            &[P::WaitTdlibParameters, P::WaitPhoneNumber, P::WaitCode, P::WaitPassword, P::Ready],
        );
        assert!(transitions.iter().all(|transition| transition.legal));
        assert_eq!(machine.phase(), P::Ready);
        assert_eq!(machine.transitions(), 5);
        assert_eq!(machine.illegal_transitions(), 0);
    }

    #[test]
    fn regression_is_flagged_but_applied() {
        let mut machine = AuthorizationStateMachine::new();
        drive(&mut machine, &[P::WaitTdlibParameters, P::WaitPhoneNumber, P::WaitCode, P::Ready]);
        let transition = machine.apply(&state(P::WaitCode));
        assert_eq!(transition, Transition { from: P::Ready, to: P::WaitCode, legal: false });
        assert_eq!(machine.phase(), P::WaitCode);
        assert_eq!(machine.illegal_transitions(), 1);
    }

    #[test]
    fn repeated_phase_is_a_refresh_that_keeps_latest_details() {
        let mut machine = AuthorizationStateMachine::new();
        drive(&mut machine, &[P::WaitTdlibParameters, P::WaitPhoneNumber, P::WaitCode]);
        let details = td_updates::TdObject::new(
            "authorizationStateWaitCode",
            serde_json::json!({"code_info": {"@type": "authenticationCodeInfo", "timeout": 60}})
                .as_object()
                .cloned()
                .expect("object"),
        );
        let refreshed = AuthorizationState::from_object(details).expect("wait code");
        let transition = machine.apply_state(&refreshed);
        assert!(transition.legal);
        assert_eq!(transition.from, transition.to);
        let last = machine.last_state().expect("last state");
        assert!(last.details().get_object("code_info").is_some());
    }

    #[test]
    fn closed_machine_is_frozen() {
        let mut machine = AuthorizationStateMachine::new();
        drive(&mut machine, &[P::WaitTdlibParameters, P::Closing, P::Closed]);
        let transition = machine.apply(&state(P::WaitPhoneNumber));
        assert!(!transition.legal);
        assert_eq!(transition.to, P::Closed);
        assert_eq!(machine.phase(), P::Closed);
    }

    #[test]
    fn force_close_walks_through_closing() {
        let mut machine = AuthorizationStateMachine::new();
        drive(&mut machine, &[P::WaitTdlibParameters, P::WaitPhoneNumber]);
        let applied = machine.force_close();
        assert_eq!(applied.len(), 2);
        assert_eq!(applied[0], Transition { from: P::WaitPhoneNumber, to: P::Closing, legal: true });
        assert_eq!(applied[1], Transition { from: P::Closing, to: P::Closed, legal: true });
        assert!(machine.force_close().is_empty());
    }

    #[test]
    fn request_types_map_to_methods() {
        assert_eq!(ClientMethod::from_request_type("sendMessage"), ClientMethod::SendMessage);
        assert_eq!(ClientMethod::from_request_type("getChats"), ClientMethod::Other);
        assert_eq!(ClientMethod::from_request_type("other"), ClientMethod::Other);
        for method in ClientMethod::ALL {
            if method != ClientMethod::Other {
                assert_eq!(ClientMethod::from_request_type(method.as_str()), method);
            }
        }
    }

    #[test]
    fn gate_rejects_ready_operations_before_login() {
        let mut machine = AuthorizationStateMachine::new();
        assert!(machine.ensure_method_legal(ClientMethod::SetTdlibParameters).is_ok());
        let err = machine.ensure_method_legal(ClientMethod::SendMessage).expect_err("not ready");
        assert_eq!(err, ClientError::not_authorized("sendMessage", P::Unstarted));

        drive(&mut machine, &[P::WaitTdlibParameters, P::WaitPhoneNumber]);
        assert!(machine.ensure_method_legal(ClientMethod::SetAuthenticationPhoneNumber).is_ok());
        assert!(machine.ensure_method_legal(ClientMethod::CheckAuthenticationCode).is_err());
        assert!(machine.ensure_method_legal(ClientMethod::GetOption).is_ok());
        assert!(machine.ensure_request_legal(ClientMethod::Other, "getChats").is_err());
    }

    // Reference model of the authorization graph, checked exhaustively
    // against the machine over every short report sequence.
    fn model_edges(from: AuthorizationPhase) -> Vec<AuthorizationPhase> {
        let mut edges = match from {
            P::Unstarted => vec![P::WaitTdlibParameters],
            P::WaitTdlibParameters => vec![P::WaitPhoneNumber, P::WaitOtherDeviceConfirmation],
            P::WaitPhoneNumber => vec![
                P::WaitEmailAddress,
                P::WaitCode,
                P::WaitRegistration,
                P::WaitOtherDeviceConfirmation,
            ],
            P::WaitEmailAddress => vec![P::WaitEmailCode],
            P::WaitEmailCode => vec![P::WaitCode, P::WaitPhoneNumber],
            P::WaitCode => vec![P::WaitRegistration, P::WaitPassword, P::Ready],
            P::WaitRegistration => vec![P::Ready],
            P::WaitPassword => vec![P::Ready],
            P::WaitOtherDeviceConfirmation => vec![
                P::WaitPhoneNumber,
                P::WaitEmailAddress,
                P::WaitCode,
                P::WaitRegistration,
                P::Ready,
            ],
            P::Ready => vec![P::LoggingOut],
            P::LoggingOut => vec![],
            P::Closing => vec![P::Closed],
            P::Closed => return vec![],
        };
        edges.push(from);
        edges.push(P::Closing);
        edges
    }

    fn model_method_legal(phase: AuthorizationPhase, method: ClientMethod) -> bool {
        match method {
            ClientMethod::SendMessage | ClientMethod::Other => phase == P::Ready,
            ClientMethod::SetTdlibParameters => matches!(phase, P::Unstarted | P::WaitTdlibParameters),
            ClientMethod::SetAuthenticationPhoneNumber => phase == P::WaitPhoneNumber,
            ClientMethod::CheckAuthenticationCode | ClientMethod::ResendAuthenticationCode => {
                phase == P::WaitCode
            }
            ClientMethod::RegisterUser => phase == P::WaitRegistration,
            ClientMethod::GetOption | ClientMethod::SetOption | ClientMethod::Close => true,
            _ => legal_phases_for_method(method).contains(&phase),
        }
    }

    fn wire_phases() -> Vec<AuthorizationPhase> {
        P::ALL.into_iter().filter(|phase| *phase != P::Unstarted).collect()
    }

    fn generate_sequences(max_len: usize) -> Vec<Vec<AuthorizationPhase>> {
        fn recurse(
            target_len: usize,
            phases: &[AuthorizationPhase],
            current: &mut Vec<AuthorizationPhase>,
            out: &mut Vec<Vec<AuthorizationPhase>>,
        ) {
            if current.len() == target_len {
                out.push(current.clone());
                return;
            }
            for phase in phases {
                current.push(*phase);
                recurse(target_len, phases, current, out);
                current.pop();
            }
        }

        let phases = wire_phases();
        let mut out = Vec::new();
        for len in 1..=max_len {
            let mut current = Vec::new();
            recurse(len, &phases, &mut current, &mut out);
        }
        out
    }

    #[test]
    fn machine_matches_reference_model_over_short_sequences() {
        for sequence in generate_sequences(3) {
            let mut machine = AuthorizationStateMachine::new();
            let mut model_phase = P::Unstarted;
            let mut model_illegal = 0_u64;

            for reported in &sequence {
                let expected_legal = model_edges(model_phase).contains(reported);
                let transition = machine.apply(&state(*reported));
                assert_eq!(
                    transition.legal, expected_legal,
                    "legality mismatch: {:?} -> {:?} in {:?}",
                    model_phase, reported, sequence
                );
                if !expected_legal {
                    model_illegal += 1;
                }
                if model_phase != P::Closed {
                    model_phase = *reported;
                }
                assert_eq!(machine.phase(), model_phase, "phase mismatch in {:?}", sequence);

                for method in ClientMethod::ALL {
                    assert_eq!(
                        machine.ensure_method_legal(method).is_ok(),
                        model_method_legal(model_phase, method),
                        "gate mismatch for {:?} in {:?}",
                        method,
                        model_phase
                    );
                }
            }
            assert_eq!(machine.illegal_transitions(), model_illegal);
        }
    }
}
