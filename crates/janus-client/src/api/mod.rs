//! Typed API surfaces over `GatewayClient`.

pub mod admin;
pub mod gateway;

pub use admin::AdminApi;
pub use gateway::GatewayApi;

use janus_core::error::JanusError;
use janus_core::protocol::Message;
use janus_core::MessageKind;

fn unexpected(expected: &str, got: &Message) -> JanusError {
    JanusError::MalformedPayload {
        kind: expected.to_string(),
        reason: format!("unexpected {} answer", MessageKind::of(got).as_str()),
    }
}
