//! Janus gateway client runtime.
//!
//! Wires a `Transport` to the core decoder: one reader task decodes inbound
//! frames with the context of the request that caused them, the correlation
//! router hands responses to their callers and fans unsolicited messages out
//! to subscribers. `api` layers the typed client and admin surfaces on top.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod api;
pub mod client;
pub mod config;
pub mod logging;
pub mod obs;
pub mod router;
pub mod transport;

pub use api::{AdminApi, GatewayApi};
pub use client::{ClientOptions, GatewayClient};
pub use router::{EventStream, OverflowPolicy};
pub use transport::{MemoryPeer, MemoryTransport, OutboundFrame, Transport, TransportPtr};
