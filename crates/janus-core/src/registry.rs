//! Discriminator registries.
//!
//! Three tables: flat discriminators, the action-keyed table that gives a
//! `"success"` answer its real type, and the nested (plugin, action) table.
//! They are built once and then only read, so a `Registry` can be shared
//! across tasks behind an `Arc` without locking.

use std::collections::HashMap;

use crate::error::{JanusError, Result};
use crate::plugins::{PluginKind, TEXTROOM, VIDEOROOM};
use crate::protocol::message::Message;

/// Flat registry entry: which `Message` variant a discriminator decodes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Error,
    Success,
    Detached,
    ServerInfo,
    Ack,
    Event,
    WebRtcUp,
    Media,
    Hangup,
    SlowLink,
    Timeout,
    ListTokens,
    ListSessions,
    MessagePlugin,
    ListHandles,
    HandleInfo,
}

impl MessageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Error => "error",
            MessageKind::Success => "success",
            MessageKind::Detached => "detached",
            MessageKind::ServerInfo => "server_info",
            MessageKind::Ack => "ack",
            MessageKind::Event => "event",
            MessageKind::WebRtcUp => "webrtcup",
            MessageKind::Media => "media",
            MessageKind::Hangup => "hangup",
            MessageKind::SlowLink => "slowlink",
            MessageKind::Timeout => "timeout",
            MessageKind::ListTokens => "list_tokens",
            MessageKind::ListSessions => "list_sessions",
            MessageKind::MessagePlugin => "message_plugin",
            MessageKind::ListHandles => "list_handles",
            MessageKind::HandleInfo => "handle_info",
        }
    }

    /// Decode a full frame into this kind's type.
    pub fn decode(self, raw: &[u8]) -> Result<Message> {
        let decoded = match self {
            MessageKind::Error => serde_json::from_slice(raw).map(Message::Error),
            MessageKind::Success => serde_json::from_slice(raw).map(Message::Success),
            MessageKind::Detached => serde_json::from_slice(raw).map(Message::Detached),
            MessageKind::ServerInfo => serde_json::from_slice(raw).map(Message::ServerInfo),
            MessageKind::Ack => serde_json::from_slice(raw).map(Message::Ack),
            MessageKind::Event => serde_json::from_slice(raw).map(Message::Event),
            MessageKind::WebRtcUp => serde_json::from_slice(raw).map(Message::WebRtcUp),
            MessageKind::Media => serde_json::from_slice(raw).map(Message::Media),
            MessageKind::Hangup => serde_json::from_slice(raw).map(Message::Hangup),
            MessageKind::SlowLink => serde_json::from_slice(raw).map(Message::SlowLink),
            MessageKind::Timeout => serde_json::from_slice(raw).map(Message::Timeout),
            MessageKind::ListTokens => serde_json::from_slice(raw).map(Message::ListTokens),
            MessageKind::ListSessions => serde_json::from_slice(raw).map(Message::ListSessions),
            MessageKind::MessagePlugin => serde_json::from_slice(raw).map(Message::MessagePlugin),
            MessageKind::ListHandles => serde_json::from_slice(raw).map(Message::ListHandles),
            MessageKind::HandleInfo => serde_json::from_slice(raw).map(Message::HandleInfo),
        };
        decoded.map_err(|e| JanusError::malformed_payload(self.as_str(), e))
    }

    /// Kind a decoded message came from.
    pub fn of(message: &Message) -> Self {
        match message {
            Message::Error(_) => MessageKind::Error,
            Message::Success(_) => MessageKind::Success,
            Message::Detached(_) => MessageKind::Detached,
            Message::ServerInfo(_) => MessageKind::ServerInfo,
            Message::Ack(_) => MessageKind::Ack,
            Message::Event(_) => MessageKind::Event,
            Message::WebRtcUp(_) => MessageKind::WebRtcUp,
            Message::Media(_) => MessageKind::Media,
            Message::Hangup(_) => MessageKind::Hangup,
            Message::SlowLink(_) => MessageKind::SlowLink,
            Message::Timeout(_) => MessageKind::Timeout,
            Message::ListTokens(_) => MessageKind::ListTokens,
            Message::ListSessions(_) => MessageKind::ListSessions,
            Message::MessagePlugin(_) => MessageKind::MessagePlugin,
            Message::ListHandles(_) => MessageKind::ListHandles,
            Message::HandleInfo(_) => MessageKind::HandleInfo,
        }
    }
}

const FLAT: [MessageKind; 16] = [
    MessageKind::Error,
    MessageKind::Success,
    MessageKind::Detached,
    MessageKind::ServerInfo,
    MessageKind::Ack,
    MessageKind::Event,
    MessageKind::WebRtcUp,
    MessageKind::Media,
    MessageKind::Hangup,
    MessageKind::SlowLink,
    MessageKind::Timeout,
    MessageKind::ListTokens,
    MessageKind::ListSessions,
    MessageKind::MessagePlugin,
    MessageKind::ListHandles,
    MessageKind::HandleInfo,
];

/// Admin actions whose `"success"` answer has a dedicated shape.
const SUCCESS_BY_ACTION: [MessageKind; 5] = [
    MessageKind::ListTokens,
    MessageKind::ListSessions,
    MessageKind::MessagePlugin,
    MessageKind::ListHandles,
    MessageKind::HandleInfo,
];

const VIDEOROOM_ACTIONS: [(&str, PluginKind); 5] = [
    ("error", PluginKind::VideoroomError),
    ("list", PluginKind::VideoroomList),
    ("create", PluginKind::VideoroomCreate),
    ("edit", PluginKind::VideoroomEdit),
    ("destroy", PluginKind::VideoroomDestroy),
];

const TEXTROOM_ACTIONS: [(&str, PluginKind); 5] = [
    ("error", PluginKind::TextroomError),
    ("list", PluginKind::TextroomList),
    ("create", PluginKind::TextroomCreate),
    ("edit", PluginKind::TextroomEdit),
    ("destroy", PluginKind::TextroomDestroy),
];

/// Mutable half of the registry; consumed by `build`.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    flat: HashMap<String, MessageKind>,
    success: HashMap<String, MessageKind>,
    nested: HashMap<String, HashMap<String, PluginKind>>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder preloaded with the client, admin and plugin tables.
    pub fn standard() -> Self {
        let mut b = Self::new();
        for kind in FLAT {
            b = b.register_flat(kind.as_str(), kind);
        }
        for kind in SUCCESS_BY_ACTION {
            b = b.register_success(kind.as_str(), kind);
        }
        for (action, kind) in VIDEOROOM_ACTIONS {
            b = b.register_nested(VIDEOROOM, action, kind);
        }
        for (action, kind) in TEXTROOM_ACTIONS {
            b = b.register_nested(TEXTROOM, action, kind);
        }
        b
    }

    pub fn register_flat(mut self, key: impl Into<String>, kind: MessageKind) -> Self {
        self.flat.insert(key.into(), kind);
        self
    }

    /// Type of the `"success"` answer to requests with this action.
    pub fn register_success(mut self, action: impl Into<String>, kind: MessageKind) -> Self {
        self.success.insert(action.into(), kind);
        self
    }

    pub fn register_nested(
        mut self,
        plugin: impl Into<String>,
        action: impl Into<String>,
        kind: PluginKind,
    ) -> Self {
        self.nested
            .entry(plugin.into())
            .or_default()
            .insert(action.into(), kind);
        self
    }

    pub fn build(self) -> Registry {
        Registry {
            flat: self.flat,
            success: self.success,
            nested: self.nested,
        }
    }
}

/// Immutable discriminator tables.
#[derive(Debug, Clone)]
pub struct Registry {
    flat: HashMap<String, MessageKind>,
    success: HashMap<String, MessageKind>,
    nested: HashMap<String, HashMap<String, PluginKind>>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn standard() -> Self {
        RegistryBuilder::standard().build()
    }

    pub fn resolve_flat(&self, key: &str) -> Option<MessageKind> {
        self.flat.get(key).copied()
    }

    pub fn resolve_success(&self, action: &str) -> Option<MessageKind> {
        self.success.get(action).copied()
    }

    pub fn resolve_nested(&self, plugin: &str, action: &str) -> Option<PluginKind> {
        self.nested.get(plugin)?.get(action).copied()
    }

    pub fn flat_keys(&self) -> Vec<&str> {
        self.flat.keys().map(String::as_str).collect()
    }
}
