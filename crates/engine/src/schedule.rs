//! Deadline-keyed event table advanced by the tick driver.
//!
//! Entries fire in `(deadline, insertion)` order. Time is simulation time in
//! milliseconds; nothing here reads a clock.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug, Clone)]
struct Entry<E> {
    due_ms: u64,
    seq: u64,
    event: E,
}

impl<E> PartialEq for Entry<E> {
    fn eq(&self, other: &Self) -> bool {
        self.due_ms == other.due_ms && self.seq == other.seq
    }
}

impl<E> Eq for Entry<E> {}

impl<E> PartialOrd for Entry<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> Ord for Entry<E> {
    // Reversed so the max-heap pops the earliest entry first.
    fn cmp(&self, other: &Self) -> Ordering {
        (other.due_ms, other.seq).cmp(&(self.due_ms, self.seq))
    }
}

#[derive(Debug, Clone)]
pub struct Schedule<E> {
    heap: BinaryHeap<Entry<E>>,
    next_seq: u64,
}

impl<E> Schedule<E> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    pub fn push(&mut self, due_ms: u64, event: E) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry { due_ms, seq, event });
    }

    /// Pop the earliest entry whose deadline is `<= now_ms`.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<E> {
        if self.heap.peek()?.due_ms > now_ms {
            return None;
        }
        self.heap.pop().map(|entry| entry.event)
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.heap.peek().map(|entry| entry.due_ms)
    }

    /// Cancel everything still pending.
    pub fn clear(&mut self) {
        self.heap.clear();
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl<E> Default for Schedule<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_in_deadline_then_insertion_order() {
        let mut s = Schedule::new();
        s.push(500, "b");
        s.push(100, "a");
        s.push(500, "c");

        assert_eq!(s.pop_due(99), None);
        assert_eq!(s.pop_due(100), Some("a"));
        assert_eq!(s.pop_due(499), None);
        assert_eq!(s.pop_due(1000), Some("b"));
        assert_eq!(s.pop_due(1000), Some("c"));
        assert!(s.is_empty());
    }

    #[test]
    fn clear_cancels_pending() {
        let mut s = Schedule::new();
        s.push(10, 1u32);
        s.push(20, 2u32);
        assert_eq!(s.next_deadline(), Some(10));

        s.clear();
        assert_eq!(s.pop_due(u64::MAX), None);
        assert_eq!(s.len(), 0);
    }
}
