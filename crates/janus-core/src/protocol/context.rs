//! Request-side context needed to decode a response.

/// Plugin addressed by a request, and the action it was asked to perform.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PluginTarget {
    /// Plugin package name (e.g. `janus.plugin.videoroom`).
    pub plugin: String,
    /// Inner `request` action (e.g. `create`).
    pub action: String,
}

impl PluginTarget {
    pub fn new(plugin: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            plugin: plugin.into(),
            action: action.into(),
        }
    }
}

/// What the originating request looked like.
///
/// A `"success"` discriminator only has meaning relative to the action that
/// produced it, and a plugin payload only relative to the plugin action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Top-level action (`janus` field of the request); empty when unsolicited.
    pub action: String,
    /// Set when the request was addressed to a plugin.
    pub plugin: Option<PluginTarget>,
}

impl RequestContext {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            plugin: None,
        }
    }

    /// Context for frames nobody asked for.
    pub fn unsolicited() -> Self {
        Self::default()
    }

    pub fn with_plugin(mut self, target: PluginTarget) -> Self {
        self.plugin = Some(target);
        self
    }

    pub fn is_unsolicited(&self) -> bool {
        self.action.is_empty()
    }
}
