//! Gateway client: request/response over a `Transport`, plus event
//! subscriptions.
//!
//! One reader task pulls frames, peeks the envelope, looks up the originating
//! request's context, decodes without holding any lock and hands the result
//! to the router. Per-frame failures are logged and counted; only a
//! transport failure stops the reader, and it takes every waiter with it.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use bytes::Bytes;
use tokio::task::JoinHandle;
use tracing::Instrument;

use janus_core::error::{ErrorCode, JanusError, Result};
use janus_core::protocol::Message;
use janus_core::request::ApiRequest;
use janus_core::{Decoded, Decoder, MessageKind, NestedOutcome};

use crate::config::ClientSection;
use crate::obs::ClientMetrics;
use crate::router::{CorrelationRouter, Delivery, EventStream, OverflowPolicy};
use crate::transport::{OutboundFrame, TransportPtr};

/// Runtime knobs, usually taken from `ClientConfig::client`.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub request_timeout: Duration,
    pub event_buffer: usize,
    pub event_overflow: OverflowPolicy,
    pub retired_capacity: usize,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self::from(&ClientSection::default())
    }
}

impl From<&ClientSection> for ClientOptions {
    fn from(c: &ClientSection) -> Self {
        Self {
            request_timeout: Duration::from_millis(c.request_timeout_ms),
            event_buffer: c.event_buffer,
            event_overflow: c.event_overflow,
            retired_capacity: c.retired_capacity,
        }
    }
}

struct Inner {
    transport: TransportPtr,
    decoder: Decoder,
    router: CorrelationRouter,
    metrics: Arc<ClientMetrics>,
    options: ClientOptions,
}

/// Cheap to clone; clones share the connection and reader task.
#[derive(Clone)]
pub struct GatewayClient {
    inner: Arc<Inner>,
    reader: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl GatewayClient {
    /// Wrap a connected transport and start the reader task.
    ///
    /// Must be called inside a tokio runtime.
    pub fn connect(transport: TransportPtr, decoder: Decoder, options: ClientOptions) -> Self {
        let inner = Arc::new(Inner {
            transport,
            decoder,
            router: CorrelationRouter::new(options.retired_capacity),
            metrics: Arc::new(ClientMetrics::default()),
            options,
        });

        let reader_inner = inner.clone();
        let handle = tokio::spawn(
            async move { reader_inner.run_reader().await }.instrument(tracing::info_span!("janus_reader")),
        );

        Self {
            inner,
            reader: Arc::new(Mutex::new(Some(handle))),
        }
    }

    pub fn metrics(&self) -> &Arc<ClientMetrics> {
        &self.inner.metrics
    }

    pub fn decoder(&self) -> &Decoder {
        &self.inner.decoder
    }

    pub fn options(&self) -> &ClientOptions {
        &self.inner.options
    }

    pub fn pending(&self) -> usize {
        self.inner.router.pending_len()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.router.is_closed()
    }

    /// Send a request and wait for its answer with the default timeout.
    /// Gateway and plugin error answers come back as `Err`.
    pub async fn request(&self, req: &dyn ApiRequest) -> Result<Message> {
        self.request_timeout(req, self.inner.options.request_timeout)
            .await
    }

    pub async fn request_timeout(&self, req: &dyn ApiRequest, timeout: Duration) -> Result<Message> {
        let decoded = self.request_at(req, "", timeout).await?;
        self.check_remote(decoded.message.into_result())
    }

    /// Like `request_timeout`, but returns the raw decoded frame (error
    /// answers included) and prefixes the request path.
    pub async fn request_at(
        &self,
        req: &dyn ApiRequest,
        path_prefix: &str,
        timeout: Duration,
    ) -> Result<Decoded> {
        let body = Bytes::from(req.encode()?);
        let id = req.transaction().clone();
        let action = req.action().to_string();

        let waiter = self.inner.router.register(id.clone(), req.context())?;
        let metrics = &self.inner.metrics;
        metrics.pending_requests.inc(&[]);

        let frame = OutboundFrame {
            path: format!("{path_prefix}{}", req.endpoint()),
            body,
        };
        tracing::debug!(transaction = %id, action = %action, path = %frame.path, "sending request");

        let result = match self.inner.transport.send(frame).await {
            Err(e) => {
                self.inner.router.cancel(&id);
                Err(e)
            }
            Ok(()) => match tokio::time::timeout(timeout, waiter.recv()).await {
                Ok(res) => res,
                Err(_) => {
                    self.inner.router.cancel(&id);
                    metrics.request_timeouts.inc(&[("action", action.as_str())]);
                    tracing::warn!(transaction = %id, action = %action, ?timeout, "request timed out");
                    Err(JanusError::Timeout)
                }
            },
        };
        metrics.pending_requests.dec(&[]);
        result
    }

    pub(crate) fn check_remote(&self, res: Result<Message>) -> Result<Message> {
        if let Err(e) = &res {
            match e {
                JanusError::Remote { code, .. } | JanusError::PluginRemote { code, .. } => {
                    let code = code.to_string();
                    self.inner
                        .metrics
                        .remote_errors
                        .inc(&[("kind", e.code().as_str()), ("code", code.as_str())]);
                }
                _ => {}
            }
        }
        res
    }

    /// Unsolicited messages for (session, handle) using the configured
    /// buffer and overflow policy. `handle = None` receives session-level
    /// messages only.
    pub fn subscribe(&self, session_id: u64, handle_id: Option<u64>) -> Result<EventStream> {
        let o = &self.inner.options;
        self.subscribe_with(session_id, handle_id, o.event_buffer, o.event_overflow)
    }

    pub fn subscribe_with(
        &self,
        session_id: u64,
        handle_id: Option<u64>,
        capacity: usize,
        policy: OverflowPolicy,
    ) -> Result<EventStream> {
        self.inner
            .router
            .subscribe(session_id, handle_id, capacity, policy)
    }

    /// Close the transport, fail outstanding requests and wait for the
    /// reader to finish.
    pub async fn close(&self) -> Result<()> {
        let res = self.inner.transport.close().await;
        self.inner.router.close_all();

        let handle = self
            .reader
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(h) = handle {
            let _ = h.await;
        }
        res
    }
}

impl Inner {
    async fn run_reader(self: Arc<Self>) {
        tracing::debug!("reader started");
        loop {
            let frame = match self.transport.receive_next().await {
                Ok(f) => f,
                Err(JanusError::ConnectionClosed) => {
                    tracing::info!("connection closed");
                    break;
                }
                Err(e) => {
                    tracing::warn!(code = %e.code().as_str(), error = %e, "transport receive failed");
                    break;
                }
            };
            self.metrics.frames_received.inc(&[]);

            if let Err(e) = self.handle_frame(&frame) {
                self.report(&e);
            }
        }
        self.router.close_all();
    }

    fn handle_frame(&self, raw: &[u8]) -> Result<()> {
        let envelope = self.decoder.peek(raw)?;
        let meta = envelope.meta();
        let ctx = meta
            .correlation_id
            .as_ref()
            .and_then(|id| self.router.context_for(id))
            .unwrap_or_default();

        let decoded = match self.decoder.decode_envelope(&envelope, raw, &ctx) {
            Ok(d) => d,
            Err(e) => {
                // the waiter should hear about it rather than time out
                if let Some(id) = &meta.correlation_id {
                    self.router.fail(id, e.clone());
                }
                return Err(e);
            }
        };

        let kind = MessageKind::of(&decoded.message).as_str();
        self.metrics.frames_decoded.inc(&[("kind", kind)]);
        if let NestedOutcome::Unmodelled { plugin, action } = &decoded.nested {
            self.metrics
                .nested_unresolved
                .inc(&[("plugin", plugin.as_str()), ("action", action.as_str())]);
        }

        match self.router.deliver(decoded)? {
            Delivery::Response { id, elapsed } => {
                self.metrics.round_trip.observe(&[("kind", kind)], elapsed);
                tracing::trace!(transaction = %id, kind, "response delivered");
            }
            Delivery::Discarded { id } => {
                tracing::debug!(transaction = %id, kind, "answer for cancelled request discarded");
            }
            Delivery::Event {
                subscribers,
                overflowed,
            } => {
                if overflowed > 0 {
                    self.metrics.dropped_events.add(&[], overflowed as u64);
                }
                tracing::trace!(kind, subscribers, "event fanned out");
            }
        }
        Ok(())
    }

    fn report(&self, e: &JanusError) {
        let code = e.code();
        self.metrics.decode_errors.inc(&[("code", code.as_str())]);
        match code {
            ErrorCode::OrphanMessage => {
                self.metrics.orphan_messages.inc(&[]);
                tracing::debug!(error = %e, "orphan message dropped");
            }
            ErrorCode::UnexpectedLateResponse => {
                self.metrics.late_responses.inc(&[]);
                tracing::warn!(error = %e, "late response dropped");
            }
            _ => tracing::warn!(code = %code.as_str(), error = %e, "frame dropped"),
        }
    }
}
