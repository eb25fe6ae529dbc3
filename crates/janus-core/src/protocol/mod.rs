//! Wire types: envelope, messages, admin bodies and event-handler events.

pub mod admin;
pub mod context;
pub mod correlation;
pub mod datetime;
pub mod envelope;
pub mod events;
pub mod message;
pub mod plugin;

pub use context::{PluginTarget, RequestContext};
pub use correlation::CorrelationId;
pub use datetime::GatewayDateTime;
pub use envelope::{Envelope, EnvelopeMeta};
pub use message::Message;
pub use plugin::{PluginData, PluginPayload};
