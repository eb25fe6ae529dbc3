//! Plugin-specific payloads and request builders.
//!
//! The outer protocol wraps every plugin answer the same way; the types here
//! are what the nested resolver turns those generic maps into.

pub mod textroom;
pub mod videoroom;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{JanusError, Result};

pub const VIDEOROOM: &str = "janus.plugin.videoroom";
pub const TEXTROOM: &str = "janus.plugin.textroom";

/// Error body a plugin puts inside its payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PluginError {
    #[serde(default, rename = "error_code")]
    pub code: i64,
    #[serde(default, rename = "error")]
    pub reason: String,
}

impl fmt::Display for PluginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.reason, self.code)
    }
}

/// Room identifier. Gateways may be configured for numeric or string ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoomId {
    Number(u64),
    Text(String),
}

impl Default for RoomId {
    fn default() -> Self {
        RoomId::Number(0)
    }
}

impl From<u64> for RoomId {
    fn from(v: u64) -> Self {
        RoomId::Number(v)
    }
}

impl From<&str> for RoomId {
    fn from(v: &str) -> Self {
        RoomId::Text(v.to_string())
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomId::Number(n) => write!(f, "{n}"),
            RoomId::Text(s) => f.write_str(s),
        }
    }
}

/// Nested registry entry: which concrete type a (plugin, action) decodes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginKind {
    VideoroomError,
    VideoroomList,
    VideoroomCreate,
    VideoroomEdit,
    VideoroomDestroy,
    TextroomError,
    TextroomList,
    TextroomCreate,
    TextroomEdit,
    TextroomDestroy,
}

impl PluginKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PluginKind::VideoroomError => "videoroom.error",
            PluginKind::VideoroomList => "videoroom.list",
            PluginKind::VideoroomCreate => "videoroom.create",
            PluginKind::VideoroomEdit => "videoroom.edit",
            PluginKind::VideoroomDestroy => "videoroom.destroy",
            PluginKind::TextroomError => "textroom.error",
            PluginKind::TextroomList => "textroom.list",
            PluginKind::TextroomCreate => "textroom.create",
            PluginKind::TextroomEdit => "textroom.edit",
            PluginKind::TextroomDestroy => "textroom.destroy",
        }
    }

    /// Decode a generic plugin map into this kind's type.
    pub fn decode(self, payload: Map<String, Value>) -> Result<PluginMessage> {
        let v = Value::Object(payload);
        let decoded = match self {
            PluginKind::VideoroomError => serde_json::from_value(v).map(PluginMessage::VideoroomError),
            PluginKind::VideoroomList => serde_json::from_value(v).map(PluginMessage::VideoroomList),
            PluginKind::VideoroomCreate => {
                serde_json::from_value(v).map(PluginMessage::VideoroomCreate)
            }
            PluginKind::VideoroomEdit => serde_json::from_value(v).map(PluginMessage::VideoroomEdit),
            PluginKind::VideoroomDestroy => {
                serde_json::from_value(v).map(PluginMessage::VideoroomDestroy)
            }
            PluginKind::TextroomError => serde_json::from_value(v).map(PluginMessage::TextroomError),
            PluginKind::TextroomList => serde_json::from_value(v).map(PluginMessage::TextroomList),
            PluginKind::TextroomCreate => serde_json::from_value(v).map(PluginMessage::TextroomCreate),
            PluginKind::TextroomEdit => serde_json::from_value(v).map(PluginMessage::TextroomEdit),
            PluginKind::TextroomDestroy => {
                serde_json::from_value(v).map(PluginMessage::TextroomDestroy)
            }
        };
        decoded.map_err(|e| JanusError::malformed_payload(self.as_str(), e))
    }
}

/// Typed plugin payload.
#[derive(Debug, Clone, PartialEq)]
pub enum PluginMessage {
    VideoroomError(videoroom::VideoroomError),
    VideoroomList(videoroom::ListResponse),
    VideoroomCreate(videoroom::CreateResponse),
    VideoroomEdit(videoroom::EditResponse),
    VideoroomDestroy(videoroom::DestroyResponse),
    TextroomError(textroom::TextroomError),
    TextroomList(textroom::ListResponse),
    TextroomCreate(textroom::CreateResponse),
    TextroomEdit(textroom::EditResponse),
    TextroomDestroy(textroom::DestroyResponse),
}

impl PluginMessage {
    pub fn kind(&self) -> PluginKind {
        match self {
            PluginMessage::VideoroomError(_) => PluginKind::VideoroomError,
            PluginMessage::VideoroomList(_) => PluginKind::VideoroomList,
            PluginMessage::VideoroomCreate(_) => PluginKind::VideoroomCreate,
            PluginMessage::VideoroomEdit(_) => PluginKind::VideoroomEdit,
            PluginMessage::VideoroomDestroy(_) => PluginKind::VideoroomDestroy,
            PluginMessage::TextroomError(_) => PluginKind::TextroomError,
            PluginMessage::TextroomList(_) => PluginKind::TextroomList,
            PluginMessage::TextroomCreate(_) => PluginKind::TextroomCreate,
            PluginMessage::TextroomEdit(_) => PluginKind::TextroomEdit,
            PluginMessage::TextroomDestroy(_) => PluginKind::TextroomDestroy,
        }
    }

    /// Plugin family this type belongs to.
    pub fn plugin(&self) -> &'static str {
        match self {
            PluginMessage::VideoroomError(_)
            | PluginMessage::VideoroomList(_)
            | PluginMessage::VideoroomCreate(_)
            | PluginMessage::VideoroomEdit(_)
            | PluginMessage::VideoroomDestroy(_) => VIDEOROOM,
            PluginMessage::TextroomError(_)
            | PluginMessage::TextroomList(_)
            | PluginMessage::TextroomCreate(_)
            | PluginMessage::TextroomEdit(_)
            | PluginMessage::TextroomDestroy(_) => TEXTROOM,
        }
    }

    pub fn as_error(&self) -> Option<&PluginError> {
        match self {
            PluginMessage::VideoroomError(e) => Some(&e.error),
            PluginMessage::TextroomError(e) => Some(&e.error),
            _ => None,
        }
    }

    /// Room id of create/edit/destroy answers.
    pub fn room(&self) -> Option<&RoomId> {
        match self {
            PluginMessage::VideoroomCreate(r) => Some(&r.room),
            PluginMessage::VideoroomEdit(r) => Some(&r.room),
            PluginMessage::VideoroomDestroy(r) => Some(&r.room),
            PluginMessage::TextroomCreate(r) => Some(&r.room),
            PluginMessage::TextroomEdit(r) => Some(&r.room),
            PluginMessage::TextroomDestroy(r) => Some(&r.room),
            _ => None,
        }
    }
}

/// A request addressed to a plugin.
pub trait PluginRequest: Send + Sync {
    fn plugin(&self) -> &str;
    fn action(&self) -> &str;
    /// Inner request object (`request` for admin, `body` for the client API).
    fn payload(&self) -> Result<Map<String, Value>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasePluginRequest {
    pub plugin: String,
    pub action: String,
    pub admin_key: Option<String>,
}

impl PluginRequest for BasePluginRequest {
    fn plugin(&self) -> &str {
        &self.plugin
    }

    fn action(&self) -> &str {
        &self.action
    }

    fn payload(&self) -> Result<Map<String, Value>> {
        let mut m = Map::new();
        m.insert("request".into(), Value::String(self.action.clone()));
        if let Some(key) = self.admin_key.as_ref().filter(|k| !k.is_empty()) {
            m.insert("admin_key".into(), Value::String(key.clone()));
        }
        Ok(m)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginRequestFactory {
    pub plugin: String,
    pub admin_key: Option<String>,
}

impl PluginRequestFactory {
    pub fn new(plugin: impl Into<String>, admin_key: Option<String>) -> Self {
        Self {
            plugin: plugin.into(),
            admin_key,
        }
    }

    pub fn make(&self, action: &str) -> BasePluginRequest {
        BasePluginRequest {
            plugin: self.plugin.clone(),
            action: action.to_string(),
            admin_key: self.admin_key.clone(),
        }
    }
}

/// Flatten a serializable descriptor into a request payload.
pub(crate) fn merge_into<T: Serialize>(payload: &mut Map<String, Value>, value: &T) -> Result<()> {
    match serde_json::to_value(value).map_err(|e| JanusError::Encode(e.to_string()))? {
        Value::Object(m) => {
            payload.extend(m);
            Ok(())
        }
        other => Err(JanusError::Encode(format!(
            "descriptor must serialize to an object, got {other}"
        ))),
    }
}

/// Common optional fields of room create/edit/destroy requests.
pub(crate) fn insert_room_options(
    payload: &mut Map<String, Value>,
    permanent: bool,
    secret: Option<&str>,
) {
    payload.insert("permanent".into(), Value::Bool(permanent));
    if let Some(secret) = secret.filter(|s| !s.is_empty()) {
        payload.insert("secret".into(), Value::String(secret.to_string()));
    }
}

pub(crate) fn is_zero(v: &u64) -> bool {
    *v == 0
}
