use super::Session;
use crate::{authorization_envelope, new_message_envelope, sample_envelope, RecordingTransport};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use td_client::{Client, ClientConfig, ClientError, Filter};
use td_updates::{AuthorizationPhase, DecodeReason, UpdateTag};

#[test]
fn conformance_login_scenario_delivers_in_order_and_gates_sends() {
    let mut session = Session::new();
    let all = session.client.subscribe(Filter::all());

    session.feed(authorization_envelope(AuthorizationPhase::WaitPhoneNumber));
    session.feed(new_message_envelope(100, 1, "hello"));
    let err = session.client.send_text_message(100, "reply").expect_err("not ready yet");
    assert_eq!(err, ClientError::not_authorized("sendMessage", AuthorizationPhase::WaitPhoneNumber));
    session.feed(authorization_envelope(AuthorizationPhase::Ready));

    let tags: Vec<UpdateTag> = all.drain().iter().map(|update| update.tag()).collect();
    assert_eq!(tags, [UpdateTag::AuthorizationState, UpdateTag::NewMessage, UpdateTag::AuthorizationState]);
    assert_eq!(session.client.phase(), AuthorizationPhase::Ready);
    assert!(session.transport.is_empty());
}

#[test]
fn conformance_unknown_tag_is_reported_without_deliveries() {
    let mut session = Session::new();
    let all = session.client.subscribe(Filter::all());

    session.feed(json!({"@type": "updateSomeFutureThing", "payload": {"@type": "x"}}));
    assert!(all.is_empty());
    let unhandled = session.client.dispatcher().unhandled().drain();
    assert_eq!(unhandled.len(), 1);
    assert_eq!(unhandled[0].reason, DecodeReason::UnknownTag);
    assert_eq!(unhandled[0].tag.as_str(), "updateSomeFutureThing");

    session.feed(sample_envelope(UpdateTag::ChatTitle));
    assert_eq!(all.len(), 1);
}

#[test]
fn conformance_illegal_transition_is_applied_and_counted() {
    let mut session = Session::new();
    for phase in [
        AuthorizationPhase::WaitTdlibParameters,
        AuthorizationPhase::WaitPhoneNumber,
        AuthorizationPhase::WaitCode,
        AuthorizationPhase::Ready,
        AuthorizationPhase::WaitCode,
    ] {
        session.feed(authorization_envelope(phase));
    }
    let machine = session.client.dispatcher().authorization();
    assert_eq!(machine.phase(), AuthorizationPhase::WaitCode);
    assert_eq!(machine.illegal_transitions(), 1);
    assert_eq!(session.client.dispatcher().stats().illegal_transitions, 1);
}

#[tokio::test]
async fn conformance_pump_task_runs_until_shutdown() {
    let transport = Arc::new(RecordingTransport::new());
    let client = Client::new(Arc::clone(&transport), ClientConfig::default()).expect("client");
    let (tx, rx) = client.inbound_channel();
    let sub = client.subscribe(Filter::tag(UpdateTag::NewMessage));
    let pump = tokio::spawn(client.pump(rx).expect("pump").run());

    tx.send(authorization_envelope(AuthorizationPhase::WaitTdlibParameters)).await.expect("send");
    for id in 1..=3 {
        tx.send(new_message_envelope(7, id, "x")).await.expect("send");
    }
    for _ in 0..3 {
        let update = tokio::time::timeout(Duration::from_secs(5), sub.recv())
            .await
            .expect("update in time")
            .expect("subscription open");
        assert_eq!(update.tag(), UpdateTag::NewMessage);
    }

    client.shutdown();
    let summary = pump.await.expect("pump task");
    assert_eq!(summary.dispatched, 4);
    assert_eq!(summary.final_phase, AuthorizationPhase::Closed);
    assert!(tx.send(sample_envelope(UpdateTag::ChatTitle)).await.is_err());
    assert!(client.send_text_message(7, "late").is_err());
}

#[test]
fn conformance_shutdown_closes_hand_driven_session() {
    let mut session = Session::new();
    let all = session.client.subscribe(Filter::all());
    session.feed(authorization_envelope(AuthorizationPhase::WaitTdlibParameters));

    session.client.shutdown();
    assert_eq!(session.client.phase(), AuthorizationPhase::Closed);
    let err = session.pump.process(new_message_envelope(100, 1, "late")).expect_err("session closed");
    assert_eq!(err, ClientError::Closed);
    assert_eq!(session.client.get_option("version"), Err(ClientError::Closed));

    let tags: Vec<UpdateTag> = all.drain().iter().map(|update| update.tag()).collect();
    assert_eq!(tags, [UpdateTag::AuthorizationState]);
    assert!(session.transport.is_empty());
}
