//! Bounded memory of transactions that are no longer waited on.

use std::collections::{HashMap, VecDeque};

use janus_core::protocol::CorrelationId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retired {
    /// A response was handed to the waiter.
    Delivered,
    /// The waiter got an `ack`; the real result follows as an event with
    /// the same transaction.
    Acked,
    /// The caller gave up before any response arrived.
    Cancelled,
}

/// FIFO-evicting map of retired ids. Each entry carries a generation so a
/// re-retired id is not evicted by its own stale queue slot.
#[derive(Debug)]
pub struct RetiredLedger {
    capacity: usize,
    next_gen: u64,
    entries: HashMap<CorrelationId, (Retired, u64)>,
    order: VecDeque<(CorrelationId, u64)>,
}

impl RetiredLedger {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            next_gen: 0,
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    pub fn insert(&mut self, id: CorrelationId, state: Retired) {
        let gen = self.next_gen;
        self.next_gen += 1;
        self.entries.insert(id.clone(), (state, gen));
        self.order.push_back((id, gen));

        while self.order.len() > self.capacity {
            if let Some((old, old_gen)) = self.order.pop_front() {
                if self.entries.get(&old).map(|(_, g)| *g) == Some(old_gen) {
                    self.entries.remove(&old);
                }
            }
        }
    }

    pub fn get(&self, id: &CorrelationId) -> Option<Retired> {
        self.entries.get(id).map(|(s, _)| *s)
    }

    /// Forget an id (it is being registered again).
    pub fn forget(&mut self, id: &CorrelationId) {
        self.entries.remove(id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_first() {
        let mut l = RetiredLedger::new(2);
        l.insert("a".into(), Retired::Delivered);
        l.insert("b".into(), Retired::Cancelled);
        l.insert("c".into(), Retired::Delivered);

        assert_eq!(l.get(&"a".into()), None);
        assert_eq!(l.get(&"b".into()), Some(Retired::Cancelled));
        assert_eq!(l.get(&"c".into()), Some(Retired::Delivered));
        assert_eq!(l.len(), 2);
    }

    #[test]
    fn stale_slot_does_not_evict_newer_entry() {
        let mut l = RetiredLedger::new(2);
        l.insert("a".into(), Retired::Cancelled);
        l.forget(&"a".into());
        l.insert("a".into(), Retired::Delivered);
        l.insert("b".into(), Retired::Delivered);

        // the first "a" slot is evicted, the second one survives
        assert_eq!(l.get(&"a".into()), Some(Retired::Delivered));
        assert_eq!(l.get(&"b".into()), Some(Retired::Delivered));
    }
}
