//! Plugin payload carried inside generic gateway messages.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::plugins::PluginMessage;

/// Key whose presence marks a plugin payload as an error.
pub const ERROR_MARKER: &str = "error";

/// Inner payload produced by a plugin.
///
/// Always decoded as `Generic` first; the nested resolver may replace it with
/// a `Typed` value once the originating plugin action is known.
#[derive(Debug, Clone, PartialEq)]
pub enum PluginPayload {
    Generic(Map<String, Value>),
    Typed(PluginMessage),
}

impl Default for PluginPayload {
    fn default() -> Self {
        PluginPayload::Generic(Map::new())
    }
}

impl<'de> Deserialize<'de> for PluginPayload {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Map::deserialize(deserializer).map(PluginPayload::Generic)
    }
}

impl PluginPayload {
    pub fn generic(&self) -> Option<&Map<String, Value>> {
        match self {
            PluginPayload::Generic(m) => Some(m),
            PluginPayload::Typed(_) => None,
        }
    }

    pub fn typed(&self) -> Option<&PluginMessage> {
        match self {
            PluginPayload::Typed(t) => Some(t),
            PluginPayload::Generic(_) => None,
        }
    }

    /// True when a generic payload carries the plugin error marker.
    pub fn has_error_marker(&self) -> bool {
        self.generic()
            .map(|m| m.contains_key(ERROR_MARKER))
            .unwrap_or(false)
    }
}

/// `plugindata` block of client-API messages.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PluginData {
    #[serde(default)]
    pub plugin: String,
    #[serde(default)]
    pub data: PluginPayload,
}
