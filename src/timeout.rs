//! The reactor's deadline index.
//!
//! An ordered multimap from absolute deadline to the token of the transfer
//! that expires then. The reactor keeps its single poll timeout equal to the
//! distance to the minimum key, so the whole index collapses to one
//! next-fire timer; an already-due deadline makes the reactor fire on the
//! next iteration.

use std::collections::BTreeMap;
use std::time::Instant;

/// Position of one entry in the index, stored on the owning transfer so the
/// entry can be removed when the transfer completes before its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct TimeoutKey {
    deadline: Instant,
    seq: u64,
}

/// Ordered deadline -> transfer-token multimap.
///
/// `BTreeMap` cannot hold duplicate keys, so equal deadlines are
/// disambiguated with an insertion sequence number; iteration order over
/// equal deadlines is insertion order.
#[derive(Debug, Default)]
pub(crate) struct TimeoutQueue {
    entries: BTreeMap<TimeoutKey, usize>,
    next_seq: u64,
}

impl TimeoutQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers `token` to expire at `deadline` and returns the key the
    /// owning transfer must hold on to for removal.
    pub(crate) fn insert(&mut self, deadline: Instant, token: usize) -> TimeoutKey {
        let key = TimeoutKey {
            deadline,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.entries.insert(key, token);
        key
    }

    /// Removes a previously inserted entry.
    pub(crate) fn remove(&mut self, key: TimeoutKey) -> Option<usize> {
        self.entries.remove(&key)
    }

    /// The minimum deadline currently registered.
    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        self.entries.keys().next().map(|key| key.deadline)
    }

    /// Removes and returns every entry whose deadline is at or before `now`,
    /// in deadline order.
    pub(crate) fn pop_due(&mut self, now: Instant) -> Vec<(TimeoutKey, usize)> {
        let mut due = Vec::new();
        while let Some((&key, &token)) = self.entries.iter().next() {
            if key.deadline > now {
                break;
            }
            self.entries.remove(&key);
            due.push((key, token));
        }
        due
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn ordered_by_deadline_then_insertion() {
        let now = Instant::now();
        let mut queue = TimeoutQueue::new();

        queue.insert(now + Duration::from_millis(20), 2);
        queue.insert(now + Duration::from_millis(10), 1);
        queue.insert(now + Duration::from_millis(10), 3);

        let due = queue.pop_due(now + Duration::from_millis(30));
        let tokens: Vec<usize> = due.iter().map(|(_, t)| *t).collect();
        assert_eq!(tokens, vec![1, 3, 2]);
        assert!(queue.is_empty());
    }

    #[test]
    fn pop_due_leaves_future_entries() {
        let now = Instant::now();
        let mut queue = TimeoutQueue::new();

        queue.insert(now + Duration::from_millis(5), 1);
        queue.insert(now + Duration::from_millis(500), 2);

        let due = queue.pop_due(now + Duration::from_millis(5));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].1, 1);
        assert_eq!(queue.next_deadline(), Some(now + Duration::from_millis(500)));
    }

    #[test]
    fn remove_by_key() {
        let now = Instant::now();
        let mut queue = TimeoutQueue::new();

        let key = queue.insert(now + Duration::from_millis(5), 7);
        assert_eq!(queue.next_deadline(), Some(now + Duration::from_millis(5)));
        assert_eq!(queue.remove(key), Some(7));
        assert_eq!(queue.remove(key), None);
        assert!(queue.is_empty());
        assert_eq!(queue.next_deadline(), None);
    }

    #[test]
    fn due_entries_at_exact_instant_fire() {
        let now = Instant::now();
        let mut queue = TimeoutQueue::new();

        queue.insert(now, 1);
        let due = queue.pop_due(now);
        assert_eq!(due.len(), 1);
    }
}
