//! Best-first search frontier with deterministic ordering.
//!
//! A priority queue that ensures:
//! - Entries are popped in ascending bound order
//! - Ties are broken by insertion order (sequence number)
//! - Reproducible across runs

use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// A queued entry with its bound and sequence number.
#[derive(Debug, Clone)]
pub struct QueuedNode<T> {
    /// Lower bound on the entry's eventual cost.
    pub bound: usize,
    /// Sequence number for deterministic tie-breaking.
    pub sequence: u64,
    /// The queued payload.
    pub node: T,
}

// Custom ordering for BinaryHeap (min-heap by bound, then sequence)
impl<T> PartialEq for QueuedNode<T> {
    fn eq(&self, other: &Self) -> bool {
        self.bound == other.bound && self.sequence == other.sequence
    }
}

impl<T> Eq for QueuedNode<T> {}

impl<T> PartialOrd for QueuedNode<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for QueuedNode<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match self.bound.cmp(&other.bound) {
            std::cmp::Ordering::Equal => self.sequence.cmp(&other.sequence),
            ord => ord,
        }
    }
}

/// Min-priority queue ordered by (bound, sequence).
#[derive(Debug)]
pub struct SearchFrontier<T> {
    queue: BinaryHeap<Reverse<QueuedNode<T>>>,
    sequence: u64,
}

impl<T> Default for SearchFrontier<T> {
    fn default() -> Self {
        Self {
            queue: BinaryHeap::new(),
            sequence: 0,
        }
    }
}

impl<T> SearchFrontier<T> {
    /// Create an empty frontier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a node with the given bound.
    pub fn push(&mut self, bound: usize, node: T) {
        let seq = self.sequence;
        self.sequence += 1;
        self.queue.push(Reverse(QueuedNode {
            bound,
            sequence: seq,
            node,
        }));
    }

    /// Remove the lowest-bound node.
    pub fn pop(&mut self) -> Option<QueuedNode<T>> {
        self.queue.pop().map(|Reverse(e)| e)
    }

    /// Bound of the next node to be popped.
    #[must_use]
    pub fn peek_bound(&self) -> Option<usize> {
        self.queue.peek().map(|Reverse(e)| e.bound)
    }

    /// Check if the frontier is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of queued nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }
}
