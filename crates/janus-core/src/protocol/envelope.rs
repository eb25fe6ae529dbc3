//! Base envelope (JSON).
//!
//! Only the routing fields are read here; the body is decoded later once the
//! concrete type is known.

use serde::Deserialize;

use crate::protocol::CorrelationId;

/// Outer fields present on every gateway message.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    /// Discriminator (field name is `janus` in JSON).
    #[serde(rename = "janus")]
    pub msg_type: String,
    /// Transaction echoed from the request; absent on unsolicited events.
    #[serde(default)]
    pub transaction: Option<CorrelationId>,
    /// Session the message belongs to.
    #[serde(default)]
    pub session_id: Option<u64>,
    /// Handle that emitted the message (client API).
    #[serde(default)]
    pub sender: Option<u64>,
    /// Handle id as spelled by the admin API.
    #[serde(default)]
    pub handle_id: Option<u64>,
}

impl Envelope {
    /// Routing metadata handed to the correlation router.
    pub fn meta(&self) -> EnvelopeMeta {
        EnvelopeMeta {
            correlation_id: self.transaction.clone().filter(|id| !id.is_empty()),
            session_id: self.session_id,
            handle_id: self.sender.or(self.handle_id),
        }
    }
}

/// Where a decoded message should go.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvelopeMeta {
    /// `None` for unsolicited events.
    pub correlation_id: Option<CorrelationId>,
    pub session_id: Option<u64>,
    pub handle_id: Option<u64>,
}

impl EnvelopeMeta {
    /// Subscription key for unsolicited delivery, if the message carries one.
    pub fn identity(&self) -> Option<(u64, Option<u64>)> {
        self.session_id.map(|s| (s, self.handle_id))
    }
}
