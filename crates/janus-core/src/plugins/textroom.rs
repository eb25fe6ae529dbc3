//! `janus.plugin.textroom` room management and chat posts.
//!
//! Textroom inner requests carry their own `transaction`, independent of the
//! outer one.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{
    insert_room_options, merge_into, BasePluginRequest, PluginError, PluginRequest,
    PluginRequestFactory, RoomId, TEXTROOM,
};
use crate::error::{JanusError, Result};
use crate::protocol::{CorrelationId, GatewayDateTime};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TextroomError {
    #[serde(default)]
    pub textroom: String,
    #[serde(flatten)]
    pub error: PluginError,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextroomRoom {
    pub room: RoomId,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub is_private: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub secret: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pin: String,
    /// HTTP backend messages are forwarded to.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub post: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TextroomRoomEdit {
    pub room: RoomId,
    #[serde(rename = "new_description", skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(rename = "new_is_private")]
    pub is_private: bool,
    #[serde(rename = "new_secret", skip_serializing_if = "String::is_empty")]
    pub secret: String,
    #[serde(rename = "new_pin", skip_serializing_if = "String::is_empty")]
    pub pin: String,
    #[serde(rename = "new_post", skip_serializing_if = "String::is_empty")]
    pub post: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ListedRoom {
    #[serde(flatten)]
    pub room: TextroomRoom,
    #[serde(default)]
    pub pin_required: bool,
    #[serde(default)]
    pub num_participants: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ListResponse {
    #[serde(default)]
    pub textroom: String,
    #[serde(default)]
    pub list: Vec<ListedRoom>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CreateResponse {
    #[serde(default)]
    pub textroom: String,
    pub room: RoomId,
    #[serde(default)]
    pub permanent: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EditResponse {
    #[serde(default)]
    pub textroom: String,
    pub room: RoomId,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DestroyResponse {
    #[serde(default)]
    pub textroom: String,
    pub room: RoomId,
}

/// Chat message as posted by the textroom plugin to its HTTP backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextroomPost {
    pub textroom: String,
    pub room: RoomId,
    pub from: String,
    pub date: GatewayDateTime,
    pub text: String,
    pub whisper: bool,
}

pub fn parse_post(data: &[u8]) -> Result<TextroomPost> {
    serde_json::from_slice(data).map_err(|e| JanusError::malformed_payload("textroom.post", e))
}

/// Base textroom request; adds the inner `transaction`.
#[derive(Debug, Clone)]
pub struct TextroomRequest {
    pub base: BasePluginRequest,
    pub transaction: CorrelationId,
}

impl PluginRequest for TextroomRequest {
    fn plugin(&self) -> &str {
        self.base.plugin()
    }

    fn action(&self) -> &str {
        self.base.action()
    }

    fn payload(&self) -> Result<Map<String, Value>> {
        let mut m = self.base.payload()?;
        m.insert(
            "transaction".into(),
            Value::String(self.transaction.as_str().to_string()),
        );
        Ok(m)
    }
}

#[derive(Debug, Clone)]
pub struct TextroomRequestFactory {
    inner: PluginRequestFactory,
}

impl TextroomRequestFactory {
    pub fn new(admin_key: Option<String>) -> Self {
        Self {
            inner: PluginRequestFactory::new(TEXTROOM, admin_key),
        }
    }

    fn make(&self, action: &str) -> TextroomRequest {
        TextroomRequest {
            base: self.inner.make(action),
            transaction: CorrelationId::generate(),
        }
    }

    pub fn list(&self) -> TextroomRequest {
        self.make("list")
    }

    pub fn create(&self, room: TextroomRoom, permanent: bool, allowed: Vec<String>) -> CreateRequest {
        CreateRequest {
            base: self.make("create"),
            room,
            permanent,
            allowed,
        }
    }

    pub fn edit(&self, room: TextroomRoomEdit, permanent: bool, secret: Option<String>) -> EditRequest {
        EditRequest {
            base: self.make("edit"),
            room,
            permanent,
            secret,
        }
    }

    pub fn destroy(&self, room: RoomId, permanent: bool, secret: Option<String>) -> DestroyRequest {
        DestroyRequest {
            base: self.make("destroy"),
            room,
            permanent,
            secret,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateRequest {
    pub base: TextroomRequest,
    pub room: TextroomRoom,
    pub permanent: bool,
    pub allowed: Vec<String>,
}

impl PluginRequest for CreateRequest {
    fn plugin(&self) -> &str {
        self.base.plugin()
    }

    fn action(&self) -> &str {
        self.base.action()
    }

    fn payload(&self) -> Result<Map<String, Value>> {
        let mut payload = self.base.payload()?;
        insert_room_options(&mut payload, self.permanent, None);
        payload.insert(
            "allowed".into(),
            Value::Array(self.allowed.iter().cloned().map(Value::String).collect()),
        );
        merge_into(&mut payload, &self.room)?;
        Ok(payload)
    }
}

#[derive(Debug, Clone)]
pub struct EditRequest {
    pub base: TextroomRequest,
    pub room: TextroomRoomEdit,
    pub permanent: bool,
    pub secret: Option<String>,
}

impl PluginRequest for EditRequest {
    fn plugin(&self) -> &str {
        self.base.plugin()
    }

    fn action(&self) -> &str {
        self.base.action()
    }

    fn payload(&self) -> Result<Map<String, Value>> {
        let mut payload = self.base.payload()?;
        insert_room_options(&mut payload, self.permanent, self.secret.as_deref());
        merge_into(&mut payload, &self.room)?;
        Ok(payload)
    }
}

#[derive(Debug, Clone)]
pub struct DestroyRequest {
    pub base: TextroomRequest,
    pub room: RoomId,
    pub permanent: bool,
    pub secret: Option<String>,
}

impl PluginRequest for DestroyRequest {
    fn plugin(&self) -> &str {
        self.base.plugin()
    }

    fn action(&self) -> &str {
        self.base.action()
    }

    fn payload(&self) -> Result<Map<String, Value>> {
        let mut payload = self.base.payload()?;
        let room = serde_json::to_value(&self.room).map_err(|e| JanusError::Encode(e.to_string()))?;
        payload.insert("room".into(), room);
        insert_room_options(&mut payload, self.permanent, self.secret.as_deref());
        Ok(payload)
    }
}
