//! Per-subscriber bounded event queues.
//!
//! The reader loop pushes without ever awaiting; when a queue is full the
//! subscriber's `OverflowPolicy` decides which event is lost.
//!
//! `mpsc::Sender::try_send` only ever rejects the incoming item, and the
//! sending side cannot pop from the receiver, so `DropOldest` needs a queue
//! both sides can reach.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::stream::{self, Stream};
use serde::Deserialize;
use tokio::sync::Notify;

use janus_core::protocol::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Evict the oldest queued event to make room.
    #[default]
    DropOldest,
    /// Discard the incoming event.
    DropNewest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Push {
    Queued,
    /// Queued, but an event was lost to the overflow policy.
    Overflowed,
    Closed,
}

#[derive(Default)]
struct QueueState {
    items: VecDeque<Message>,
    closed: bool,
}

pub(crate) struct EventQueue {
    state: Mutex<QueueState>,
    notify: Notify,
    capacity: usize,
    policy: OverflowPolicy,
    dropped: AtomicU64,
}

impl EventQueue {
    pub(crate) fn new(capacity: usize, policy: OverflowPolicy) -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            notify: Notify::new(),
            capacity: capacity.max(1),
            policy,
            dropped: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn push(&self, msg: Message) -> Push {
        let outcome = {
            let mut st = self.lock();
            if st.closed {
                return Push::Closed;
            }
            if st.items.len() < self.capacity {
                st.items.push_back(msg);
                Push::Queued
            } else {
                match self.policy {
                    OverflowPolicy::DropOldest => {
                        st.items.pop_front();
                        st.items.push_back(msg);
                    }
                    OverflowPolicy::DropNewest => {}
                }
                self.dropped.fetch_add(1, Ordering::Relaxed);
                Push::Overflowed
            }
        };
        // single consumer: a stored permit covers a push that races the wait
        self.notify.notify_one();
        outcome
    }

    pub(crate) fn close(&self) {
        self.lock().closed = true;
        self.notify.notify_one();
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.lock().closed
    }

    async fn recv(&self) -> Option<Message> {
        loop {
            {
                let mut st = self.lock();
                if let Some(m) = st.items.pop_front() {
                    return Some(m);
                }
                if st.closed {
                    return None;
                }
            }
            self.notify.notified().await;
        }
    }

    fn try_recv(&self) -> Option<Message> {
        self.lock().items.pop_front()
    }
}

/// Unsolicited messages for one (session, handle) pair.
///
/// Ends once the client closes. Dropping it unsubscribes.
pub struct EventStream {
    queue: Arc<EventQueue>,
}

impl EventStream {
    pub(crate) fn new(queue: Arc<EventQueue>) -> Self {
        Self { queue }
    }

    /// Next event; `None` once the stream is closed and drained.
    pub async fn recv(&mut self) -> Option<Message> {
        self.queue.recv().await
    }

    /// Next already-queued event, without waiting.
    pub fn try_recv(&mut self) -> Option<Message> {
        self.queue.try_recv()
    }

    /// Events lost to the overflow policy so far.
    pub fn dropped(&self) -> u64 {
        self.queue.dropped.load(Ordering::Relaxed)
    }

    pub fn into_stream(self) -> impl Stream<Item = Message> + Send {
        stream::unfold(self, |mut s| async move {
            let msg = s.recv().await?;
            Some((msg, s))
        })
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        self.queue.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use janus_core::protocol::message::HangupMsg;

    fn hangup(reason: &str) -> Message {
        Message::Hangup(HangupMsg {
            reason: reason.into(),
            ..Default::default()
        })
    }

    fn reason(m: Option<Message>) -> String {
        match m {
            Some(Message::Hangup(h)) => h.reason,
            other => format!("{other:?}"),
        }
    }

    #[test]
    fn drop_oldest_keeps_latest() {
        let q = Arc::new(EventQueue::new(2, OverflowPolicy::DropOldest));
        let mut s = EventStream::new(q.clone());
        assert_eq!(q.push(hangup("1")), Push::Queued);
        assert_eq!(q.push(hangup("2")), Push::Queued);
        assert_eq!(q.push(hangup("3")), Push::Overflowed);

        assert_eq!(reason(s.try_recv()), "2");
        assert_eq!(reason(s.try_recv()), "3");
        assert_eq!(s.dropped(), 1);
    }

    #[test]
    fn drop_newest_keeps_earliest() {
        let q = Arc::new(EventQueue::new(2, OverflowPolicy::DropNewest));
        let mut s = EventStream::new(q.clone());
        q.push(hangup("1"));
        q.push(hangup("2"));
        q.push(hangup("3"));

        assert_eq!(reason(s.try_recv()), "1");
        assert_eq!(reason(s.try_recv()), "2");
        assert!(s.try_recv().is_none());
    }

    #[tokio::test]
    async fn closed_queue_drains_then_ends() {
        let q = Arc::new(EventQueue::new(4, OverflowPolicy::DropOldest));
        let mut s = EventStream::new(q.clone());
        q.push(hangup("last"));
        q.close();

        assert_eq!(q.push(hangup("late")), Push::Closed);
        assert_eq!(reason(s.recv().await), "last");
        assert!(s.recv().await.is_none());
    }

    #[tokio::test]
    async fn recv_wakes_on_push() {
        let q = Arc::new(EventQueue::new(4, OverflowPolicy::DropOldest));
        let mut s = EventStream::new(q.clone());
        let pusher = {
            let q = q.clone();
            tokio::spawn(async move {
                tokio::task::yield_now().await;
                q.push(hangup("woke"));
            })
        };
        assert_eq!(reason(s.recv().await), "woke");
        pusher.await.ok();
    }

    #[test]
    fn dropping_stream_closes_queue() {
        let q = Arc::new(EventQueue::new(1, OverflowPolicy::DropOldest));
        drop(EventStream::new(q.clone()));
        assert!(q.is_closed());
    }
}
