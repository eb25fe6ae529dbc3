//! Envelope decoder.
//!
//! Decoding is a function of the frame *and* of the request that produced
//! it: a `"success"` discriminator takes its meaning from the requesting
//! action, and a plugin payload from the requesting plugin action.

use std::sync::Arc;

use crate::error::{JanusError, Result};
use crate::protocol::{Envelope, EnvelopeMeta, Message, RequestContext};
use crate::registry::{MessageKind, Registry};
use crate::resolver::{resolve_nested, NestedOutcome};

const SUCCESS: &str = "success";
const ERROR: &str = "error";

/// A fully decoded frame plus what the router needs to place it.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub message: Message,
    pub meta: EnvelopeMeta,
    pub nested: NestedOutcome,
}

#[derive(Debug, Clone)]
pub struct Decoder {
    registry: Arc<Registry>,
}

impl Decoder {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    pub fn standard() -> Self {
        Self::new(Arc::new(Registry::standard()))
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Read only the envelope fields.
    pub fn peek(&self, raw: &[u8]) -> Result<Envelope> {
        serde_json::from_slice(raw).map_err(|e| JanusError::MalformedEnvelope(e.to_string()))
    }

    /// Map (discriminator, requesting action) to a flat kind.
    ///
    /// A `"success"` answer takes its type from the action-keyed table, so
    /// a request named like a notification still gets a plain `Success`.
    pub fn resolve_kind(&self, discriminator: &str, action: &str) -> Result<MessageKind> {
        if discriminator == SUCCESS {
            return Ok(self
                .registry
                .resolve_success(action)
                .unwrap_or(MessageKind::Success));
        }

        if let Some(kind) = self.registry.resolve_flat(discriminator) {
            return Ok(kind);
        }
        match discriminator {
            ERROR => Ok(MessageKind::Error),
            other => Err(JanusError::UnknownMessageType(other.to_string())),
        }
    }

    pub fn decode(&self, raw: &[u8], ctx: &RequestContext) -> Result<Decoded> {
        let envelope = self.peek(raw)?;
        self.decode_envelope(&envelope, raw, ctx)
    }

    /// Second half of `decode` for callers that already peeked.
    pub fn decode_envelope(
        &self,
        envelope: &Envelope,
        raw: &[u8],
        ctx: &RequestContext,
    ) -> Result<Decoded> {
        let kind = self.resolve_kind(&envelope.msg_type, &ctx.action)?;
        let mut message = kind.decode(raw)?;

        let mut nested = NestedOutcome::NotApplicable;
        if let (Some(target), Some(slot)) = (ctx.plugin.as_ref(), message.plugin_payload_mut()) {
            let (payload, outcome) = resolve_nested(&self.registry, target, std::mem::take(slot))?;
            *slot = payload;
            nested = outcome;
        }

        Ok(Decoded {
            message,
            meta: envelope.meta(),
            nested,
        })
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::standard()
    }
}
