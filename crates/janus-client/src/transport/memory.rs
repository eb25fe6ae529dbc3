//! In-process transport.
//!
//! `MemoryTransport::pair` returns the client half and a `MemoryPeer` that
//! plays the gateway: it reads what the client sent and pushes frames back.
//! Dropping the peer closes the connection from the client's point of view.

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::{mpsc, watch, Mutex};

use janus_core::error::{JanusError, Result};

use super::{OutboundFrame, Transport};

pub struct MemoryTransport {
    outbound: mpsc::Sender<OutboundFrame>,
    inbound: Mutex<mpsc::Receiver<Bytes>>,
    closed_tx: watch::Sender<bool>,
    closed_rx: watch::Receiver<bool>,
}

impl MemoryTransport {
    pub fn pair(capacity: usize) -> (MemoryTransport, MemoryPeer) {
        let (out_tx, out_rx) = mpsc::channel(capacity);
        let (in_tx, in_rx) = mpsc::channel(capacity);
        let (closed_tx, closed_rx) = watch::channel(false);

        let transport = MemoryTransport {
            outbound: out_tx,
            inbound: Mutex::new(in_rx),
            closed_tx,
            closed_rx,
        };
        let peer = MemoryPeer {
            inbound: in_tx,
            outbound: out_rx,
        };
        (transport, peer)
    }

    fn is_closed(&self) -> bool {
        *self.closed_rx.borrow()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&self, frame: OutboundFrame) -> Result<()> {
        if self.is_closed() {
            return Err(JanusError::ConnectionClosed);
        }
        self.outbound
            .send(frame)
            .await
            .map_err(|_| JanusError::ConnectionClosed)
    }

    async fn receive_next(&self) -> Result<Bytes> {
        let mut closed = self.closed_rx.clone();
        if *closed.borrow_and_update() {
            return Err(JanusError::ConnectionClosed);
        }

        let mut inbound = self.inbound.lock().await;
        tokio::select! {
            frame = inbound.recv() => frame.ok_or(JanusError::ConnectionClosed),
            _ = closed.changed() => Err(JanusError::ConnectionClosed),
        }
    }

    async fn close(&self) -> Result<()> {
        let _ = self.closed_tx.send(true);
        Ok(())
    }
}

/// Gateway side of a memory connection.
pub struct MemoryPeer {
    inbound: mpsc::Sender<Bytes>,
    outbound: mpsc::Receiver<OutboundFrame>,
}

impl MemoryPeer {
    /// Deliver a raw frame to the client.
    pub async fn push(&self, frame: impl Into<Bytes>) -> Result<()> {
        self.inbound
            .send(frame.into())
            .await
            .map_err(|_| JanusError::ConnectionClosed)
    }

    pub async fn push_json(&self, value: &serde_json::Value) -> Result<()> {
        let body = serde_json::to_vec(value).map_err(|e| JanusError::Encode(e.to_string()))?;
        self.push(body).await
    }

    /// Next frame the client sent, or `None` once the client side is gone.
    pub async fn next_sent(&mut self) -> Option<OutboundFrame> {
        self.outbound.recv().await
    }

    /// Next request body decoded as JSON, with its path.
    pub async fn next_request(&mut self) -> Option<(String, serde_json::Value)> {
        let frame = self.next_sent().await?;
        let body = serde_json::from_slice(&frame.body).ok()?;
        Some((frame.path, body))
    }
}
