//! Cooperative timer queue.
//!
//! Stands in for the browser's `setTimeout`/`clearTimeout` on a single
//! event loop. Nothing runs on its own: the owner calls [`TimerQueue::pop_due`]
//! with the current time and handles each expired timer in deadline order.
//! Timers scheduled for the same deadline pop in scheduling order.

use std::collections::BTreeMap;

/// Handle returned by [`TimerQueue::schedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
pub struct TimerQueue<K> {
    next_id: u64,
    entries: BTreeMap<(u64, TimerId), K>,
}

impl<K> Default for TimerQueue<K> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: BTreeMap::new(),
        }
    }
}

impl<K> TimerQueue<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, deadline_ms: u64, kind: K) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.insert((deadline_ms, id), kind);
        id
    }

    /// Cancel a pending timer. Returns false if it already ran or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let key = self.entries.keys().find(|(_, tid)| *tid == id).copied();
        match key {
            Some(key) => self.entries.remove(&key).is_some(),
            None => false,
        }
    }

    /// Cancel every pending timer, returning how many were dropped.
    pub fn clear(&mut self) -> usize {
        let n = self.entries.len();
        self.entries.clear();
        n
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.entries.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Remove and return the earliest timer whose deadline is `<= now_ms`.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(u64, TimerId, K)> {
        let key = *self.entries.keys().next()?;
        if key.0 > now_ms {
            return None;
        }
        self.entries
            .remove(&key)
            .map(|kind| (key.0, key.1, kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_deadline_order() {
        let mut q = TimerQueue::new();
        q.schedule(300, "c");
        q.schedule(100, "a");
        q.schedule(200, "b");

        assert!(q.pop_due(50).is_none());
        let popped: Vec<_> = std::iter::from_fn(|| q.pop_due(1_000))
            .map(|(_, _, k)| k)
            .collect();
        assert_eq!(popped, vec!["a", "b", "c"]);
        assert!(q.is_empty());
    }

    #[test]
    fn same_deadline_keeps_schedule_order() {
        let mut q = TimerQueue::new();
        q.schedule(100, 1);
        q.schedule(100, 2);
        assert_eq!(q.pop_due(100).map(|(_, _, k)| k), Some(1));
        assert_eq!(q.pop_due(100).map(|(_, _, k)| k), Some(2));
    }

    #[test]
    fn cancel_removes_only_that_timer() {
        let mut q = TimerQueue::new();
        let a = q.schedule(100, "a");
        q.schedule(100, "b");
        assert!(q.cancel(a));
        assert!(!q.cancel(a));
        assert_eq!(q.len(), 1);
        assert_eq!(q.next_deadline(), Some(100));
    }

    #[test]
    fn clear_reports_count() {
        let mut q = TimerQueue::new();
        q.schedule(1, ());
        q.schedule(2, ());
        assert_eq!(q.clear(), 2);
        assert!(q.pop_due(u64::MAX).is_none());
    }
}
