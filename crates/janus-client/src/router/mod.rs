//! Correlation router.
//!
//! Responses carrying a known transaction go to the single waiter registered
//! for it; everything else is treated as unsolicited and fanned out to the
//! subscribers of its exact (session, handle) pair. A transaction answered
//! with `ack` stays open for fan-out: its plugin result arrives later as an
//! event carrying the same transaction. All state sits behind
//! one mutex that is never held across a decode or an `.await`.

mod ledger;
mod subscriber;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::oneshot;

use janus_core::error::{JanusError, Result};
use janus_core::protocol::{CorrelationId, Message, RequestContext};
use janus_core::Decoded;

pub use ledger::Retired;
pub use subscriber::{EventStream, OverflowPolicy};

use ledger::RetiredLedger;
use subscriber::{EventQueue, Push};

type Identity = (u64, Option<u64>);

/// Where `deliver` put a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Handed to the waiter of `id`.
    Response { id: CorrelationId, elapsed: Duration },
    /// Answer to a cancelled request; dropped.
    Discarded { id: CorrelationId },
    /// Fanned out to `subscribers` live streams; `overflowed` of them lost
    /// an event to their overflow policy.
    Event { subscribers: usize, overflowed: usize },
}

/// Receiving half of a registered request.
pub struct Waiter {
    id: CorrelationId,
    rx: oneshot::Receiver<Result<Decoded>>,
}

impl Waiter {
    pub fn id(&self) -> &CorrelationId {
        &self.id
    }

    /// Wait for the response. A dropped sender means the router shut down.
    pub async fn recv(self) -> Result<Decoded> {
        self.rx.await.unwrap_or(Err(JanusError::ConnectionClosed))
    }
}

struct Pending {
    tx: oneshot::Sender<Result<Decoded>>,
    context: RequestContext,
    since: Instant,
}

struct RouterState {
    pending: HashMap<CorrelationId, Pending>,
    subscribers: HashMap<Identity, Vec<Arc<EventQueue>>>,
    retired: RetiredLedger,
    closed: bool,
}

pub struct CorrelationRouter {
    state: Mutex<RouterState>,
}

impl CorrelationRouter {
    pub fn new(retired_capacity: usize) -> Self {
        Self {
            state: Mutex::new(RouterState {
                pending: HashMap::new(),
                subscribers: HashMap::new(),
                retired: RetiredLedger::new(retired_capacity),
                closed: false,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RouterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a waiter. Must happen before the request is sent.
    pub fn register(&self, id: CorrelationId, context: RequestContext) -> Result<Waiter> {
        let mut st = self.lock();
        if st.closed {
            return Err(JanusError::ConnectionClosed);
        }
        if st.pending.contains_key(&id) {
            return Err(JanusError::DuplicateTransaction(id.to_string()));
        }
        st.retired.forget(&id);

        let (tx, rx) = oneshot::channel();
        st.pending.insert(
            id.clone(),
            Pending {
                tx,
                context,
                since: Instant::now(),
            },
        );
        Ok(Waiter { id, rx })
    }

    /// Context of a live request, for decoding its response.
    pub fn context_for(&self, id: &CorrelationId) -> Option<RequestContext> {
        self.lock().pending.get(id).map(|p| p.context.clone())
    }

    pub fn deliver(&self, decoded: Decoded) -> Result<Delivery> {
        let mut st = self.lock();

        if let Some(id) = decoded.meta.correlation_id.clone() {
            if let Some(p) = st.pending.remove(&id) {
                let state = match &decoded.message {
                    Message::Ack(_) => Retired::Acked,
                    _ => Retired::Delivered,
                };
                st.retired.insert(id.clone(), state);
                drop(st);
                let elapsed = p.since.elapsed();
                // receiver gone means the caller timed out concurrently
                let _ = p.tx.send(Ok(decoded));
                return Ok(Delivery::Response { id, elapsed });
            }
            match st.retired.get(&id) {
                Some(Retired::Delivered) => {
                    return Err(JanusError::UnexpectedLateResponse(id.to_string()))
                }
                Some(Retired::Cancelled) => return Ok(Delivery::Discarded { id }),
                // asynchronous result of an acked request
                Some(Retired::Acked) | None => {}
            }
        }

        let Some(identity) = decoded.meta.identity() else {
            return Err(JanusError::OrphanMessage(orphan_label(&decoded)));
        };

        let queues: Vec<Arc<EventQueue>> = match st.subscribers.get_mut(&identity) {
            Some(list) => {
                list.retain(|q| !q.is_closed());
                list.clone()
            }
            None => Vec::new(),
        };
        if queues.is_empty() {
            st.subscribers.remove(&identity);
            return Err(JanusError::OrphanMessage(orphan_label(&decoded)));
        }
        drop(st);

        let mut subscribers = 0;
        let mut overflowed = 0;
        for q in queues {
            match q.push(decoded.message.clone()) {
                Push::Queued => subscribers += 1,
                Push::Overflowed => {
                    subscribers += 1;
                    overflowed += 1;
                }
                Push::Closed => {}
            }
        }
        Ok(Delivery::Event {
            subscribers,
            overflowed,
        })
    }

    /// Fail a live request with a per-frame error (its answer could not be
    /// decoded). Returns false if nobody was waiting.
    pub fn fail(&self, id: &CorrelationId, err: JanusError) -> bool {
        let mut st = self.lock();
        let Some(p) = st.pending.remove(id) else {
            return false;
        };
        st.retired.insert(id.clone(), Retired::Delivered);
        drop(st);
        let _ = p.tx.send(Err(err));
        true
    }

    /// Give up on a request; a later answer for it is dropped silently.
    pub fn cancel(&self, id: &CorrelationId) -> bool {
        let mut st = self.lock();
        if st.pending.remove(id).is_some() {
            st.retired.insert(id.clone(), Retired::Cancelled);
            true
        } else {
            false
        }
    }

    pub fn subscribe(
        &self,
        session_id: u64,
        handle_id: Option<u64>,
        capacity: usize,
        policy: OverflowPolicy,
    ) -> Result<EventStream> {
        let queue = Arc::new(EventQueue::new(capacity, policy));
        let mut st = self.lock();
        if st.closed {
            return Err(JanusError::ConnectionClosed);
        }
        st.subscribers
            .entry((session_id, handle_id))
            .or_default()
            .push(queue.clone());
        Ok(EventStream::new(queue))
    }

    /// Fail every waiter with `ConnectionClosed` and end every stream.
    /// Later registrations are refused.
    pub fn close_all(&self) {
        let (pending, subscribers) = {
            let mut guard = self.lock();
            let st = &mut *guard;
            st.closed = true;
            (
                std::mem::take(&mut st.pending),
                std::mem::take(&mut st.subscribers),
            )
        };
        for (_, p) in pending {
            let _ = p.tx.send(Err(JanusError::ConnectionClosed));
        }
        for q in subscribers.into_values().flatten() {
            q.close();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn pending_len(&self) -> usize {
        self.lock().pending.len()
    }

    /// Live subscriber count for a pair.
    pub fn subscriber_count(&self, session_id: u64, handle_id: Option<u64>) -> usize {
        self.lock()
            .subscribers
            .get(&(session_id, handle_id))
            .map(|l| l.iter().filter(|q| !q.is_closed()).count())
            .unwrap_or(0)
    }

    pub fn retired_state(&self, id: &CorrelationId) -> Option<Retired> {
        self.lock().retired.get(id)
    }

    /// Number of remembered retired transactions.
    pub fn retired_len(&self) -> usize {
        self.lock().retired.len()
    }
}

fn orphan_label(decoded: &Decoded) -> String {
    let kind = janus_core::MessageKind::of(&decoded.message).as_str();
    match (decoded.meta.session_id, decoded.meta.handle_id) {
        (Some(s), Some(h)) => format!("{kind} for session {s} handle {h}"),
        (Some(s), None) => format!("{kind} for session {s}"),
        _ => format!("{kind} without session"),
    }
}
