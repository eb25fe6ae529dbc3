//! Admin/monitor API response bodies.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::protocol::plugin::PluginPayload;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StoredToken {
    pub token: String,
    #[serde(default, rename = "allowed_plugins")]
    pub plugins: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ListTokensResponse {
    #[serde(default)]
    pub data: HashMap<String, Vec<StoredToken>>,
}

impl ListTokensResponse {
    pub fn tokens(&self) -> &[StoredToken] {
        self.data.get("tokens").map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn find(&self, token: &str) -> Option<&StoredToken> {
        self.tokens().iter().find(|t| t.token == token)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ListSessionsResponse {
    #[serde(default)]
    pub sessions: Vec<u64>,
}

/// `message_plugin` answer; `response` is whatever the plugin returned.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MessagePluginResponse {
    #[serde(default)]
    pub response: PluginPayload,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ListHandlesResponse {
    pub session_id: u64,
    #[serde(default)]
    pub handles: Vec<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HandleInfoResponse {
    pub session_id: u64,
    pub handle_id: u64,
    #[serde(default)]
    pub info: Map<String, Value>,
}
