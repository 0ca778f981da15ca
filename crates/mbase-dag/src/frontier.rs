//! Generation-ordered worklist.
//!
//! [`FrontierQueue`] pops the queued node with the greatest generation. Among
//! equal generations it is strictly FIFO by the order nodes were first
//! pushed. Nothing else (identifier value, hash) takes part in ordering.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};
use std::hash::Hash;

#[derive(Debug, PartialEq, Eq)]
struct Entry<N> {
    generation: u64,
    seq: Reverse<u64>,
    node: N,
}

impl<N: Eq> Ord for Entry<N> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.generation
            .cmp(&other.generation)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl<N: Eq> PartialOrd for Entry<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Max-generation priority queue with FIFO tie-breaking.
///
/// Re-pushing a node that is still queued raises its generation to the
/// maximum of the old and new values and keeps its original FIFO position.
/// Superseded heap entries are skipped lazily on pop.
#[derive(Debug)]
pub struct FrontierQueue<N> {
    heap: BinaryHeap<Entry<N>>,
    /// Live entry per queued node: (generation, seq).
    queued: HashMap<N, (u64, u64)>,
    next_seq: u64,
}

impl<N: Copy + Eq + Hash> FrontierQueue<N> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            queued: HashMap::new(),
            next_seq: 0,
        }
    }

    /// Queue `node` at `generation`. Returns `true` if the node was not
    /// already queued.
    pub fn push(&mut self, node: N, generation: u64) -> bool {
        match self.queued.get_mut(&node) {
            Some((current, seq)) => {
                if generation > *current {
                    *current = generation;
                    self.heap.push(Entry {
                        generation,
                        seq: Reverse(*seq),
                        node,
                    });
                }
                false
            }
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.queued.insert(node, (generation, seq));
                self.heap.push(Entry {
                    generation,
                    seq: Reverse(seq),
                    node,
                });
                true
            }
        }
    }

    /// Remove and return the node with the greatest generation.
    pub fn pop_max(&mut self) -> Option<(N, u64)> {
        while let Some(entry) = self.heap.pop() {
            let live = self.queued.get(&entry.node) == Some(&(entry.generation, entry.seq.0));
            if live {
                self.queued.remove(&entry.node);
                return Some((entry.node, entry.generation));
            }
        }
        None
    }

    pub fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }

    /// Number of queued nodes.
    pub fn len(&self) -> usize {
        self.queued.len()
    }

    pub fn contains(&self, node: &N) -> bool {
        self.queued.contains_key(node)
    }
}

impl<N: Copy + Eq + Hash> Default for FrontierQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}
