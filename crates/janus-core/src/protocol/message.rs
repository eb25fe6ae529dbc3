//! Typed gateway messages (client API + admin/monitor API).

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{JanusError, Result};
use crate::protocol::admin::{
    HandleInfoResponse, ListHandlesResponse, ListSessionsResponse, ListTokensResponse,
    MessagePluginResponse,
};
use crate::protocol::plugin::{PluginData, PluginPayload};

/// `error` body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ErrorData {
    pub code: i64,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ErrorMsg {
    pub error: ErrorData,
}

/// Generic success. `data` carries e.g. the new session/handle id, or the
/// admin API result for actions without a dedicated type.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SuccessMsg {
    #[serde(default)]
    pub data: Option<Map<String, Value>>,
    #[serde(default, rename = "plugindata")]
    pub plugin_data: Option<PluginData>,
    #[serde(default)]
    pub session_id: Option<u64>,
    #[serde(default)]
    pub sender: Option<u64>,
}

impl SuccessMsg {
    /// `data.id` of `create`/`attach` responses.
    pub fn id(&self) -> Option<u64> {
        self.data.as_ref()?.get("id")?.as_u64()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DetachedMsg {
    #[serde(default)]
    pub session_id: Option<u64>,
    #[serde(default)]
    pub sender: Option<u64>,
}

/// Plugin or transport description inside `server_info`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ComponentInfo {
    pub name: String,
    pub author: String,
    pub description: String,
    pub version: i64,
    pub version_string: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct InfoMsg {
    pub name: String,
    pub version: i64,
    pub version_string: String,
    pub author: String,
    pub data_channels: bool,
    pub ipv6: bool,
    #[serde(rename = "local-ip")]
    pub local_ip: String,
    #[serde(rename = "ice-tcp")]
    pub ice_tcp: bool,
    pub transports: HashMap<String, ComponentInfo>,
    pub plugins: HashMap<String, ComponentInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AckMsg {
    #[serde(default)]
    pub hint: Option<String>,
}

/// Plugin event, either unsolicited or the async answer to a `message`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EventMsg {
    #[serde(default, rename = "plugindata")]
    pub plugin_data: Option<PluginData>,
    #[serde(default)]
    pub jsep: Option<Map<String, Value>>,
    #[serde(default)]
    pub session_id: Option<u64>,
    #[serde(default)]
    pub sender: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WebRtcUpMsg {
    #[serde(default)]
    pub session_id: Option<u64>,
    #[serde(default)]
    pub sender: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MediaMsg {
    #[serde(rename = "type")]
    pub media_type: String,
    pub receiving: bool,
    #[serde(default)]
    pub session_id: Option<u64>,
    #[serde(default)]
    pub sender: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HangupMsg {
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub session_id: Option<u64>,
    #[serde(default)]
    pub sender: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SlowLinkMsg {
    pub uplink: bool,
    #[serde(default)]
    pub nacks: i64,
    #[serde(default)]
    pub session_id: Option<u64>,
    #[serde(default)]
    pub sender: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TimeoutMsg {
    #[serde(default)]
    pub session_id: Option<u64>,
}

/// Every message shape the client knows how to decode.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Error(ErrorMsg),
    Success(SuccessMsg),
    Detached(DetachedMsg),
    ServerInfo(InfoMsg),
    Ack(AckMsg),
    Event(EventMsg),
    WebRtcUp(WebRtcUpMsg),
    Media(MediaMsg),
    Hangup(HangupMsg),
    SlowLink(SlowLinkMsg),
    Timeout(TimeoutMsg),
    ListTokens(ListTokensResponse),
    ListSessions(ListSessionsResponse),
    MessagePlugin(MessagePluginResponse),
    ListHandles(ListHandlesResponse),
    HandleInfo(HandleInfoResponse),
}

impl Message {
    /// Plugin payload carried by this message, if any.
    pub fn plugin_payload(&self) -> Option<&PluginPayload> {
        match self {
            Message::Success(m) => m.plugin_data.as_ref().map(|d| &d.data),
            Message::Event(m) => m.plugin_data.as_ref().map(|d| &d.data),
            Message::MessagePlugin(m) => Some(&m.response),
            _ => None,
        }
    }

    pub(crate) fn plugin_payload_mut(&mut self) -> Option<&mut PluginPayload> {
        match self {
            Message::Success(m) => m.plugin_data.as_mut().map(|d| &mut d.data),
            Message::Event(m) => m.plugin_data.as_mut().map(|d| &mut d.data),
            Message::MessagePlugin(m) => Some(&mut m.response),
            _ => None,
        }
    }

    /// Turn gateway and plugin error answers into `Err`.
    pub fn into_result(self) -> Result<Message> {
        if let Message::Error(e) = self {
            return Err(JanusError::Remote {
                code: e.error.code,
                reason: e.error.reason,
            });
        }

        let plugin_error = self
            .plugin_payload()
            .and_then(PluginPayload::typed)
            .and_then(|t| t.as_error().map(|err| (t.plugin(), err.code, err.reason.clone())));

        match plugin_error {
            Some((plugin, code, reason)) => Err(JanusError::PluginRemote {
                plugin: plugin.to_string(),
                code,
                reason,
            }),
            None => Ok(self),
        }
    }
}
