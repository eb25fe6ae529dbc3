use serde::Deserialize;

use janus_core::error::{JanusError, Result};

use crate::router::OverflowPolicy;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    pub version: u32,

    #[serde(default)]
    pub client: ClientSection,

    #[serde(default)]
    pub admin: AdminSection,
}

impl ClientConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(JanusError::UnsupportedVersion);
        }

        self.client.validate()?;
        self.admin.validate()?;

        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            version: 1,
            client: ClientSection::default(),
            admin: AdminSection::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientSection {
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Per-subscriber event queue capacity.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,

    #[serde(default)]
    pub event_overflow: OverflowPolicy,

    /// How many answered/cancelled transactions are remembered.
    #[serde(default = "default_retired_capacity")]
    pub retired_capacity: usize,
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            request_timeout_ms: default_request_timeout_ms(),
            event_buffer: default_event_buffer(),
            event_overflow: OverflowPolicy::default(),
            retired_capacity: default_retired_capacity(),
        }
    }
}

impl ClientSection {
    pub fn validate(&self) -> Result<()> {
        if !(100..=600_000).contains(&self.request_timeout_ms) {
            return Err(JanusError::BadConfig(
                "client.request_timeout_ms must be between 100 and 600000".into(),
            ));
        }
        if !(1..=65_536).contains(&self.event_buffer) {
            return Err(JanusError::BadConfig(
                "client.event_buffer must be between 1 and 65536".into(),
            ));
        }
        if !(16..=1_000_000).contains(&self.retired_capacity) {
            return Err(JanusError::BadConfig(
                "client.retired_capacity must be between 16 and 1000000".into(),
            ));
        }
        Ok(())
    }
}

fn default_request_timeout_ms() -> u64 {
    10_000
}
fn default_event_buffer() -> usize {
    64
}
fn default_retired_capacity() -> usize {
    1024
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdminSection {
    /// Sent as `admin_secret` on every admin request.
    #[serde(default)]
    pub secret: Option<String>,

    /// Path prefix of the admin API (e.g. `/admin`).
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl AdminSection {
    pub fn validate(&self) -> Result<()> {
        if let Some(ep) = &self.endpoint {
            if !ep.starts_with('/') {
                return Err(JanusError::BadConfig("admin.endpoint must start with '/'".into()));
            }
        }
        Ok(())
    }
}
