//! Transport seam.
//!
//! The client only needs to push encoded requests out and pull raw frames
//! in. HTTP long-poll, WebSocket or anything else lives behind this trait.

pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use janus_core::error::Result;

pub use memory::{MemoryPeer, MemoryTransport};

/// One encoded request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundFrame {
    /// Path relative to the API root (`""`, `/{session}`, `/{session}/{handle}`).
    pub path: String,
    pub body: Bytes,
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, frame: OutboundFrame) -> Result<()>;

    /// Next inbound frame. Fails with `ConnectionClosed` once the
    /// connection is gone.
    async fn receive_next(&self) -> Result<Bytes>;

    async fn close(&self) -> Result<()>;
}

pub type TransportPtr = Arc<dyn Transport>;
