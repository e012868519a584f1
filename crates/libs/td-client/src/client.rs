use crate::authorization::ClientMethod;
use crate::config::ClientConfig;
use crate::dispatcher::Dispatcher;
use crate::error::ClientError;
use crate::params::TdlibParameters;
use crate::pending::PendingRequests;
use crate::pump::UpdatePump;
use crate::subscription::{Filter, Subscription, SubscriptionId};
use crate::transport::Transport;
use serde_json::{json, Value as JsonValue};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use td_updates::{AuthorizationPhase, Update, EXTRA_KEY, TYPE_KEY};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Outbound request surface of one session.
///
/// Every request passes the authorization gate before it reaches the
/// transport; a rejected request never produces an outbound call.
pub struct Client<T: Transport> {
    transport: T,
    config: ClientConfig,
    dispatcher: Arc<Dispatcher>,
    pending: Arc<PendingRequests>,
    shutdown: CancellationToken,
    pump_started: AtomicBool,
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T, config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let dispatcher = Arc::new(Dispatcher::new(&config));
        Ok(Self {
            transport,
            config,
            dispatcher,
            pending: Arc::new(PendingRequests::new()),
            shutdown: CancellationToken::new(),
            pump_started: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn phase(&self) -> AuthorizationPhase {
        self.dispatcher.phase()
    }

    pub fn subscribe(&self, filter: Filter) -> Subscription {
        self.dispatcher.subscribe(filter)
    }

    pub fn subscribe_with_capacity(&self, filter: Filter, capacity: usize) -> Subscription {
        self.dispatcher.subscribe_with_capacity(filter, capacity)
    }

    pub fn subscribe_callback<F>(&self, filter: Filter, callback: F) -> SubscriptionId
    where
        F: Fn(&Arc<Update>) + Send + Sync + 'static,
    {
        self.dispatcher.subscribe_callback(filter, callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.dispatcher.unsubscribe(id)
    }

    /// Channel sized by `inbound_channel_capacity` for feeding [`Client::pump`].
    pub fn inbound_channel(&self) -> (mpsc::Sender<JsonValue>, mpsc::Receiver<JsonValue>) {
        mpsc::channel(self.config.inbound_channel_capacity)
    }

    /// Builds the session's dispatch loop. Only one pump may exist per client.
    pub fn pump(&self, inbound: mpsc::Receiver<JsonValue>) -> Result<UpdatePump, ClientError> {
        if self.pump_started.swap(true, Ordering::AcqRel) {
            return Err(ClientError::invalid_request("update pump already started"));
        }
        Ok(UpdatePump::new(
            Arc::clone(&self.dispatcher),
            Arc::clone(&self.pending),
            inbound,
            self.shutdown.clone(),
        ))
    }

    /// Stops the session once the in-flight update has been delivered. The
    /// authorization phase ends at `Closed`, outstanding requests fail, and
    /// the pump rejects further input.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        self.dispatcher.shutdown();
        let failed = self.pending.close();
        if failed > 0 {
            log::debug!("client: shutdown failed {} outstanding request(s)", failed);
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Gates and sends a request without waiting for its response. Returns the
    /// `@extra` stamped on the request.
    pub fn send(&self, request: JsonValue) -> Result<u64, ClientError> {
        let (extra, request) = self.prepare(request)?;
        self.transport.send(&request)?;
        Ok(extra)
    }

    /// Gates and sends a request, then waits for the correlated response.
    pub async fn request(&self, request: JsonValue) -> Result<JsonValue, ClientError> {
        let (extra, request) = self.prepare(request)?;
        let response = self.pending.register(extra).ok_or(ClientError::Closed)?;
        let _waiting = PendingGuard { pending: &self.pending, extra };
        self.transport.send(&request)?;
        let response = response.await.map_err(|_| ClientError::Closed)?;
        remote_error(&response).map_or(Ok(response), Err)
    }

    pub fn set_tdlib_parameters(&self, parameters: &TdlibParameters) -> Result<u64, ClientError> {
        let mut request = serde_json::to_value(parameters)
            .map_err(|err| ClientError::invalid_request(format!("tdlib parameters: {err}")))?;
        if let Some(fields) = request.as_object_mut() {
            fields.insert(TYPE_KEY.to_owned(), json!(ClientMethod::SetTdlibParameters.as_str()));
        }
        self.send(request)
    }

    pub fn set_authentication_phone_number(&self, phone_number: &str) -> Result<u64, ClientError> {
        self.send(json!({
            "@type": ClientMethod::SetAuthenticationPhoneNumber.as_str(),
            "phone_number": phone_number,
        }))
    }

    pub fn set_authentication_email_address(&self, email_address: &str) -> Result<u64, ClientError> {
        self.send(json!({
            "@type": ClientMethod::SetAuthenticationEmailAddress.as_str(),
            "email_address": email_address,
        }))
    }

    pub fn check_authentication_email_code(&self, code: &str) -> Result<u64, ClientError> {
        self.send(json!({
            "@type": ClientMethod::CheckAuthenticationEmailCode.as_str(),
            "code": {"@type": "emailAddressAuthenticationCode", "code": code},
        }))
    }

    pub fn check_authentication_code(&self, code: &str) -> Result<u64, ClientError> {
        self.send(json!({"@type": ClientMethod::CheckAuthenticationCode.as_str(), "code": code}))
    }

    pub fn resend_authentication_code(&self) -> Result<u64, ClientError> {
        self.send(json!({"@type": ClientMethod::ResendAuthenticationCode.as_str()}))
    }

    pub fn request_qr_code_authentication(&self, other_user_ids: &[i64]) -> Result<u64, ClientError> {
        self.send(json!({
            "@type": ClientMethod::RequestQrCodeAuthentication.as_str(),
            "other_user_ids": other_user_ids,
        }))
    }

    pub fn register_user(&self, first_name: &str, last_name: &str) -> Result<u64, ClientError> {
        self.send(json!({
            "@type": ClientMethod::RegisterUser.as_str(),
            "first_name": first_name,
            "last_name": last_name,
        }))
    }

    pub fn check_authentication_password(&self, password: &str) -> Result<u64, ClientError> {
        self.send(json!({"@type": ClientMethod::CheckAuthenticationPassword.as_str(), "password": password}))
    }

    pub fn get_option(&self, name: &str) -> Result<u64, ClientError> {
        self.send(json!({"@type": ClientMethod::GetOption.as_str(), "name": name}))
    }

    pub fn set_option(&self, name: &str, value: JsonValue) -> Result<u64, ClientError> {
        self.send(json!({"@type": ClientMethod::SetOption.as_str(), "name": name, "value": value}))
    }

    pub fn set_log_verbosity_level(&self, level: i32) -> Result<u64, ClientError> {
        self.send(json!({"@type": ClientMethod::SetLogVerbosityLevel.as_str(), "new_verbosity_level": level}))
    }

    pub fn send_message(&self, chat_id: i64, input_message_content: JsonValue) -> Result<u64, ClientError> {
        self.send(json!({
            "@type": ClientMethod::SendMessage.as_str(),
            "chat_id": chat_id,
            "input_message_content": input_message_content,
        }))
    }

    pub fn send_text_message(&self, chat_id: i64, text: &str) -> Result<u64, ClientError> {
        self.send_message(
            chat_id,
            json!({
                "@type": "inputMessageText",
                "text": {"@type": "formattedText", "text": text},
            }),
        )
    }

    pub fn log_out(&self) -> Result<u64, ClientError> {
        self.send(json!({"@type": ClientMethod::LogOut.as_str()}))
    }

    pub fn close(&self) -> Result<u64, ClientError> {
        self.send(json!({"@type": ClientMethod::Close.as_str()}))
    }

    fn prepare(&self, mut request: JsonValue) -> Result<(u64, JsonValue), ClientError> {
        if self.is_shut_down() {
            return Err(ClientError::Closed);
        }
        let Some(fields) = request.as_object_mut() else {
            return Err(ClientError::invalid_request("request must be a JSON object"));
        };
        let request_type = match fields.get(TYPE_KEY).and_then(JsonValue::as_str) {
            Some(name) if !name.is_empty() => name.to_owned(),
            _ => return Err(ClientError::invalid_request("request is missing a string '@type'")),
        };
        let method = ClientMethod::from_request_type(&request_type);
        self.dispatcher.ensure_request_legal(method, &request_type)?;

        let extra = self.pending.next_extra();
        fields.insert(EXTRA_KEY.to_owned(), json!(extra));
        log::trace!("client: {} @extra {}", request_type, extra);
        Ok((extra, request))
    }
}

impl<T: Transport> std::fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("dispatcher", &self.dispatcher)
            .field("pending", &self.pending.len())
            .finish()
    }
}

/// Removes the `@extra` entry when a request future finishes or is dropped.
struct PendingGuard<'a> {
    pending: &'a PendingRequests,
    extra: u64,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.pending.forget(self.extra);
    }
}

fn remote_error(response: &JsonValue) -> Option<ClientError> {
    if response.get(TYPE_KEY).and_then(JsonValue::as_str) != Some("error") {
        return None;
    }
    Some(ClientError::Remote {
        code: response.get("code").and_then(JsonValue::as_i64).unwrap_or_default(),
        message: response.get("message").and_then(JsonValue::as_str).unwrap_or_default().to_owned(),
    })
}
