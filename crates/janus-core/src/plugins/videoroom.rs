//! `janus.plugin.videoroom` room management.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{
    insert_room_options, is_zero, merge_into, BasePluginRequest, PluginError, PluginRequest,
    PluginRequestFactory, RoomId, VIDEOROOM,
};
use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VideoroomError {
    #[serde(default)]
    pub videoroom: String,
    #[serde(flatten)]
    pub error: PluginError,
}

/// Room descriptor used by `create` and returned by `list`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoroomRoom {
    pub room: RoomId,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub is_private: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub secret: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pin: String,
    pub require_pvtid: bool,
    pub require_e2ee: bool,
    pub publishers: u64,
    pub bitrate: u64,
    pub fir_freq: u64,
    #[serde(rename = "audiocodec", skip_serializing_if = "String::is_empty")]
    pub audio_codec: String,
    #[serde(rename = "videocodec", skip_serializing_if = "String::is_empty")]
    pub video_codec: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub vp9_profile: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub h264_profile: String,
    pub opus_fec: bool,
    pub video_svc: bool,
    #[serde(rename = "audiolevel_ext")]
    pub audio_level_ext: bool,
    #[serde(rename = "audiolevel_event")]
    pub audio_level_event: bool,
    #[serde(skip_serializing_if = "is_zero")]
    pub audio_active_packets: u64,
    #[serde(skip_serializing_if = "is_zero")]
    pub audio_level_average: u64,
    #[serde(rename = "videoorient_ext")]
    pub video_orient_ext: bool,
    #[serde(rename = "playoutdelay_ext")]
    pub playout_delay_ext: bool,
    pub transport_wide_cc_ext: bool,
    pub record: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub rec_dir: String,
    pub lock_record: bool,
    pub notify_joining: bool,
}

/// `edit` descriptor; the gateway expects `new_` prefixed fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VideoroomRoomEdit {
    pub room: RoomId,
    #[serde(rename = "new_description", skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(rename = "new_is_private")]
    pub is_private: bool,
    #[serde(rename = "new_secret", skip_serializing_if = "String::is_empty")]
    pub secret: String,
    #[serde(rename = "new_pin", skip_serializing_if = "String::is_empty")]
    pub pin: String,
    #[serde(rename = "new_require_pvtid")]
    pub require_pvtid: bool,
    #[serde(rename = "new_publishers")]
    pub publishers: u64,
    #[serde(rename = "new_bitrate")]
    pub bitrate: u64,
    #[serde(rename = "new_fir_freq")]
    pub fir_freq: u64,
    #[serde(rename = "new_lock_record")]
    pub lock_record: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ListedRoom {
    #[serde(flatten)]
    pub room: VideoroomRoom,
    #[serde(default)]
    pub pin_required: bool,
    #[serde(default)]
    pub max_publishers: u64,
    #[serde(default)]
    pub bitrate_cap: bool,
    #[serde(default)]
    pub num_participants: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ListResponse {
    #[serde(default)]
    pub videoroom: String,
    #[serde(default)]
    pub list: Vec<ListedRoom>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CreateResponse {
    #[serde(default)]
    pub videoroom: String,
    pub room: RoomId,
    #[serde(default)]
    pub permanent: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EditResponse {
    #[serde(default)]
    pub videoroom: String,
    pub room: RoomId,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DestroyResponse {
    #[serde(default)]
    pub videoroom: String,
    pub room: RoomId,
}

/// Builds videoroom admin requests sharing one `admin_key`.
#[derive(Debug, Clone)]
pub struct VideoroomRequestFactory {
    inner: PluginRequestFactory,
}

impl VideoroomRequestFactory {
    pub fn new(admin_key: Option<String>) -> Self {
        Self {
            inner: PluginRequestFactory::new(VIDEOROOM, admin_key),
        }
    }

    pub fn list(&self) -> BasePluginRequest {
        self.inner.make("list")
    }

    pub fn create(&self, room: VideoroomRoom, permanent: bool, allowed: Vec<String>) -> CreateRequest {
        CreateRequest {
            base: self.inner.make("create"),
            room,
            permanent,
            allowed,
        }
    }

    pub fn edit(&self, room: VideoroomRoomEdit, permanent: bool, secret: Option<String>) -> EditRequest {
        EditRequest {
            base: self.inner.make("edit"),
            room,
            permanent,
            secret,
        }
    }

    pub fn destroy(&self, room: RoomId, permanent: bool, secret: Option<String>) -> DestroyRequest {
        DestroyRequest {
            base: self.inner.make("destroy"),
            room,
            permanent,
            secret,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateRequest {
    pub base: BasePluginRequest,
    pub room: VideoroomRoom,
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
    pub base: BasePluginRequest,
    pub room: VideoroomRoomEdit,
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
    pub base: BasePluginRequest,
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
        let room = serde_json::to_value(&self.room)
            .map_err(|e| crate::error::JanusError::Encode(e.to_string()))?;
        payload.insert("room".into(), room);
        insert_room_options(&mut payload, self.permanent, self.secret.as_deref());
        Ok(payload)
    }
}
