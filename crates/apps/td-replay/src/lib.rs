//! Feeds a newline-delimited JSON capture through the narrowing and dispatch
//! pipeline and reports what each subscriber-visible step produced.

use anyhow::{bail, Context};
use serde_json::Value as JsonValue;
use std::io::{BufRead, Write};
use std::sync::{Arc, Mutex};
use td_client::{Client, ClientConfig, Filter, Transport, TransportError};
use td_updates::{AuthorizationPhase, DecodeReason, UpdateTag};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReplayOptions {
    pub config: ClientConfig,
    /// Only these tags are printed; every tag is still dispatched.
    pub filter: Option<Vec<UpdateTag>>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub lines: u64,
    pub delivered: u64,
    pub unknown: u64,
    pub malformed: u64,
    pub invalid_json: u64,
    pub final_phase: AuthorizationPhase,
}

impl std::fmt::Display for ReplaySummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "lines={} delivered={} unknown={} malformed={} invalid_json={} final_phase={}",
            self.lines, self.delivered, self.unknown, self.malformed, self.invalid_json, self.final_phase
        )
    }
}

/// Replay never talks to a native core.
struct OfflineTransport;

impl Transport for OfflineTransport {
    fn send(&self, _request: &JsonValue) -> Result<(), TransportError> {
        Err(TransportError::Closed)
    }
}

pub fn parse_filter(raw: &str) -> anyhow::Result<Vec<UpdateTag>> {
    let mut tags = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|name| !name.is_empty()) {
        match UpdateTag::from_name(name) {
            Some(tag) => tags.push(tag),
            None => bail!("unknown update tag in filter: {name}"),
        }
    }
    if tags.is_empty() {
        bail!("filter names no update tags");
    }
    Ok(tags)
}

pub fn replay<R: BufRead, W: Write>(input: R, out: &mut W, options: &ReplayOptions) -> anyhow::Result<ReplaySummary> {
    let client = Client::new(OfflineTransport, options.config.clone())?;
    let (_tx, rx) = client.inbound_channel();
    let mut pump = client.pump(rx)?;

    let printed = Arc::new(Mutex::new(Vec::new()));
    let filter = match &options.filter {
        Some(tags) => Filter::tags(tags.iter().copied()),
        None => Filter::all(),
    };
    {
        let printed = Arc::clone(&printed);
        client.subscribe_callback(filter, move |update| {
            printed.lock().expect("printed mutex poisoned").push(update.tag());
        });
    }

    let mut summary = ReplaySummary::default();
    for (index, line) in input.lines().enumerate() {
        let line_no = index + 1;
        let line = line.with_context(|| format!("read line {line_no}"))?;
        if line.trim().is_empty() {
            continue;
        }
        summary.lines += 1;
        let value: JsonValue = match serde_json::from_str(&line) {
            Ok(value) => value,
            Err(err) => {
                summary.invalid_json += 1;
                writeln!(out, "{line_no}\t! invalid json: {err}")?;
                continue;
            }
        };
        pump.process(value)?;

        for tag in printed.lock().expect("printed mutex poisoned").drain(..) {
            writeln!(out, "{line_no}\t{tag}")?;
        }
        for err in client.dispatcher().unhandled().drain() {
            match err.reason {
                DecodeReason::UnknownTag => summary.unknown += 1,
                DecodeReason::ShapeMismatch | DecodeReason::MissingField => summary.malformed += 1,
            }
            writeln!(out, "{line_no}\t! {err}")?;
        }
    }

    let pump_summary = pump.summary();
    summary.delivered = pump_summary.dispatched;
    summary.final_phase = pump_summary.final_phase;
    writeln!(out, "{summary}")?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAPTURE: &str = r#"{"@type":"updateAuthorizationState","authorization_state":{"@type":"authorizationStateWaitTdlibParameters"}}
{"@type":"updateOption","name":"version","value":{"@type":"optionValueString","value":"1.8.0"}}

{"@type":"updateSomeFutureThing"}
{"@type":"updateChatTitle","chat_id":1}
not json
{"@type":"updates","updates":[{"@type":"updateChatTitle","chat_id":1,"title":"a"},{"@type":"updateChatReadOutbox","chat_id":1,"last_read_outbox_message_id":3}]}
"#;

    #[test]
    fn replay_counts_every_outcome() {
        let mut out = Vec::new();
        let summary = replay(CAPTURE.as_bytes(), &mut out, &ReplayOptions::default()).expect("replay");
        assert_eq!(
            summary,
            ReplaySummary {
                lines: 6,
                delivered: 4,
                unknown: 1,
                malformed: 1,
                invalid_json: 1,
                final_phase: AuthorizationPhase::WaitTdlibParameters,
            }
        );
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("2\tupdateOption"));
        assert!(text.contains("4\t! unknown_tag decoding 'updateSomeFutureThing'"));
        assert!(text.contains("(field 'title')"));
        assert!(text.ends_with("final_phase=wait_tdlib_parameters\n"));
    }

    #[test]
    fn filter_limits_printed_tags() {
        let options = ReplayOptions {
            filter: Some(parse_filter("updateChatTitle").expect("filter")),
            ..ReplayOptions::default()
        };
        let mut out = Vec::new();
        let summary = replay(CAPTURE.as_bytes(), &mut out, &options).expect("replay");
        assert_eq!(summary.delivered, 4);
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("7\tupdateChatTitle"));
        assert!(!text.contains("\tupdateOption"));
    }

    #[test]
    fn unknown_filter_tag_is_an_error() {
        assert!(parse_filter("updateChatTitle, updateNope").is_err());
        assert!(parse_filter(" , ").is_err());
        assert_eq!(
            parse_filter("updateNewMessage,updateChatTitle").expect("filter"),
            [UpdateTag::NewMessage, UpdateTag::ChatTitle]
        );
    }
}
