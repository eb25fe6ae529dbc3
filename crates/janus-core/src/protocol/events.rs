//! Event-handler notifications.
//!
//! Event handlers post JSON objects (or arrays of them) discriminated by an
//! integer `type` bit rather than the `janus` string.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{JanusError, Result};

/// Closed set of event-handler event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Session,
    Handle,
    External,
    Jsep,
    WebRtc,
    Media,
    Plugin,
    Transport,
    Core,
}

impl EventKind {
    /// Resolve the integer discriminator.
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(EventKind::Session),
            2 => Some(EventKind::Handle),
            4 => Some(EventKind::External),
            8 => Some(EventKind::Jsep),
            16 => Some(EventKind::WebRtc),
            32 => Some(EventKind::Media),
            64 => Some(EventKind::Plugin),
            128 => Some(EventKind::Transport),
            256 => Some(EventKind::Core),
            _ => None,
        }
    }

    pub fn code(self) -> u32 {
        match self {
            EventKind::Session => 1,
            EventKind::Handle => 2,
            EventKind::External => 4,
            EventKind::Jsep => 8,
            EventKind::WebRtc => 16,
            EventKind::Media => 32,
            EventKind::Plugin => 64,
            EventKind::Transport => 128,
            EventKind::Core => 256,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Session => "session",
            EventKind::Handle => "handle",
            EventKind::External => "external",
            EventKind::Jsep => "jsep",
            EventKind::WebRtc => "webrtc",
            EventKind::Media => "media",
            EventKind::Plugin => "plugin",
            EventKind::Transport => "transport",
            EventKind::Core => "core",
        }
    }

    fn decode_body(self, event: Value) -> Result<EventBody> {
        let body = match self {
            EventKind::Session => serde_json::from_value(event).map(EventBody::Session),
            EventKind::Handle => serde_json::from_value(event).map(EventBody::Handle),
            EventKind::External => serde_json::from_value(event).map(EventBody::External),
            EventKind::Jsep => serde_json::from_value(event).map(EventBody::Jsep),
            EventKind::Plugin => serde_json::from_value(event).map(EventBody::Plugin),
            EventKind::Transport => serde_json::from_value(event).map(EventBody::Transport),
            // no dedicated body shape
            EventKind::WebRtc | EventKind::Media | EventKind::Core => {
                return Ok(EventBody::Opaque(event));
            }
        };
        body.map_err(|e| JanusError::malformed_payload(format!("event:{}", self.as_str()), e))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionEventBody {
    pub name: String,
    pub transport: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct HandleEventBody {
    pub name: String,
    pub plugin: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExternalEventBody {
    pub schema: String,
    pub data: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct JsepInfo {
    #[serde(rename = "type")]
    pub jsep_type: String,
    pub sdp: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct JsepEventBody {
    pub owner: String,
    pub jsep: JsepInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PluginEventBody {
    pub plugin: String,
    pub data: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TransportEventBody {
    pub transport: String,
    pub id: String,
    pub data: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventBody {
    Session(SessionEventBody),
    Handle(HandleEventBody),
    External(ExternalEventBody),
    Jsep(JsepEventBody),
    Plugin(PluginEventBody),
    Transport(TransportEventBody),
    /// webrtc, media and core events keep the raw `event` value.
    Opaque(Value),
}

/// Header shared by every event-handler event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
struct RawEvent {
    #[serde(default)]
    emitter: String,
    #[serde(rename = "type")]
    event_type: u32,
    #[serde(default)]
    subtype: Option<u32>,
    #[serde(default)]
    timestamp: i64,
    #[serde(default)]
    session_id: Option<u64>,
    #[serde(default)]
    handle_id: Option<u64>,
    #[serde(default)]
    opaque_id: Option<String>,
    #[serde(default)]
    event: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GatewayEvent {
    pub kind: EventKind,
    pub emitter: String,
    pub subtype: Option<u32>,
    pub timestamp: i64,
    pub session_id: Option<u64>,
    pub handle_id: Option<u64>,
    pub opaque_id: Option<String>,
    pub body: EventBody,
}

fn from_raw(raw: RawEvent) -> Result<GatewayEvent> {
    let kind = EventKind::from_code(raw.event_type)
        .ok_or_else(|| JanusError::UnknownMessageType(format!("event type {}", raw.event_type)))?;
    let body = kind.decode_body(raw.event)?;
    Ok(GatewayEvent {
        kind,
        emitter: raw.emitter,
        subtype: raw.subtype,
        timestamp: raw.timestamp,
        session_id: raw.session_id,
        handle_id: raw.handle_id,
        opaque_id: raw.opaque_id,
        body,
    })
}

/// Decode a single event-handler event.
pub fn decode_event(data: &[u8]) -> Result<GatewayEvent> {
    let raw: RawEvent = serde_json::from_slice(data)
        .map_err(|e| JanusError::MalformedEnvelope(format!("invalid event json: {e}")))?;
    from_raw(raw)
}

/// Decode an event-handler POST body, which may batch events in an array.
pub fn decode_events(data: &[u8]) -> Result<Vec<GatewayEvent>> {
    let value: Value = serde_json::from_slice(data)
        .map_err(|e| JanusError::MalformedEnvelope(format!("invalid event json: {e}")))?;

    let items = match value {
        Value::Array(items) => items,
        single @ Value::Object(_) => vec![single],
        other => {
            return Err(JanusError::MalformedEnvelope(format!(
                "event body must be an object or array, got {other}"
            )))
        }
    };

    items
        .into_iter()
        .map(|item| {
            let raw: RawEvent = serde_json::from_value(item)
                .map_err(|e| JanusError::MalformedEnvelope(format!("invalid event json: {e}")))?;
            from_raw(raw)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::panic)]

    use super::*;

    #[test]
    fn handle_event_decodes_body() {
        let ev = decode_event(
            br#"{"emitter":"gw1","type":2,"timestamp":10,"session_id":1,"handle_id":2,
                 "event":{"name":"attached","plugin":"janus.plugin.echotest"}}"#,
        )
        .unwrap();
        assert_eq!(ev.kind, EventKind::Handle);
        assert_eq!(ev.handle_id, Some(2));
        match ev.body {
            EventBody::Handle(b) => assert_eq!(b.plugin, "janus.plugin.echotest"),
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn media_event_keeps_raw_body() {
        let ev = decode_event(br#"{"type":32,"event":{"media":"audio","receiving":true}}"#).unwrap();
        assert_eq!(ev.kind, EventKind::Media);
        assert!(matches!(ev.body, EventBody::Opaque(Value::Object(_))));
    }

    #[test]
    fn batch_and_unknown_type() {
        let evs = decode_events(br#"[{"type":1,"event":{"name":"created"}},{"type":256,"event":{}}]"#)
            .unwrap();
        assert_eq!(evs.len(), 2);
        assert_eq!(evs[1].kind, EventKind::Core);

        let err = decode_event(br#"{"type":3,"event":{}}"#).unwrap_err();
        assert_eq!(err.code().as_str(), "UNKNOWN_MESSAGE_TYPE");
    }

    #[test]
    fn wrong_body_kind_is_malformed_payload() {
        let err = decode_event(br#"{"type":8,"event":{"owner":5}}"#).unwrap_err();
        assert_eq!(err.code().as_str(), "MALFORMED_PAYLOAD");
    }
}
