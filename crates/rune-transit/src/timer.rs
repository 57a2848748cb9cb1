//! One-shot timers for deferred-ready batches.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::Duration;

use crate::types::{BatchId, Category};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Timer {
    due: Duration,
    // Ties on `due` fire in scheduling order.
    seq: u64,
    category: Category,
    batch: BatchId,
}

/// Min-heap of pending batch timers keyed by due time.
#[derive(Debug, Default)]
pub(crate) struct DeferredTimers {
    queue: BinaryHeap<Reverse<Timer>>,
    next_seq: u64,
}

impl DeferredTimers {
    pub fn schedule(&mut self, due: Duration, category: Category, batch: BatchId) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(Timer {
            due,
            seq,
            category,
            batch,
        }));
    }

    /// Pop the earliest timer whose due time is at or before `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<(Category, BatchId)> {
        if self.queue.peek()?.0.due > now {
            return None;
        }
        self.queue.pop().map(|Reverse(t)| (t.category, t.batch))
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.queue.peek().map(|Reverse(t)| t.due)
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.queue.len()
    }
}
