//! Discovery of the history reachable from a set of starting revisions.
//!
//! [`Subgraph::discover`] loads every parent list reachable from the starts
//! exactly once, with an explicit stack so deep histories never grow the call
//! stack. Along the way it drops duplicate parent entries, detects cycles,
//! enforces the visited-revision budget, and assigns every node its
//! generation.
//!
//! # Generation
//!
//! A node's generation is the length of the longest parent chain below it
//! inside the discovered subgraph; subgraph roots have generation 0. Every
//! child's generation is strictly greater than each of its parents', so
//! popping a [`FrontierQueue`] by greatest generation visits children before
//! parents.

use std::collections::HashMap;

use tracing::{trace, warn};

use mbase_store::RevisionStore;
use mbase_types::RevisionId;

use crate::config::AncestryConfig;
use crate::error::{AncestryError, Result};
use crate::frontier::FrontierQueue;

/// A revision inside a discovered [`Subgraph`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubgraphNode {
    pub id: RevisionId,
    /// Parent node indices, duplicates removed, in store order.
    pub parents: Vec<usize>,
    /// Child node indices within the subgraph.
    pub children: Vec<usize>,
    pub generation: u64,
}

/// The part of the history reachable from a set of starting revisions.
#[derive(Clone, Debug)]
pub struct Subgraph {
    nodes: Vec<SubgraphNode>,
    index: HashMap<RevisionId, usize>,
    starts: Vec<usize>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

struct Discovery<'a, S: ?Sized> {
    store: &'a S,
    budget: usize,
    nodes: Vec<SubgraphNode>,
    index: HashMap<RevisionId, usize>,
    /// De-duplicated parent IDs still to be linked, per node.
    pending: Vec<Vec<RevisionId>>,
    visit: Vec<Visit>,
}

impl<S: RevisionStore + ?Sized> Discovery<'_, S> {
    fn intern(&mut self, id: RevisionId) -> Result<usize> {
        if self.nodes.len() >= self.budget {
            warn!(budget = self.budget, "ancestry walk exceeded visited-revision budget");
            return Err(AncestryError::TooComplex {
                budget: self.budget,
                visited: self.nodes.len() + 1,
            });
        }

        let mut parents = self.store.parents(&id)?;
        let mut seen = Vec::with_capacity(parents.len());
        parents.retain(|p| {
            if seen.contains(p) {
                false
            } else {
                seen.push(*p);
                true
            }
        });

        let idx = self.nodes.len();
        self.nodes.push(SubgraphNode {
            id,
            parents: Vec::with_capacity(parents.len()),
            children: Vec::new(),
            generation: 0,
        });
        self.index.insert(id, idx);
        self.pending.push(parents);
        self.visit.push(Visit::InProgress);
        Ok(idx)
    }

    /// Iterative post-order DFS from `start`.
    fn explore(&mut self, start: usize) -> Result<()> {
        let mut stack: Vec<(usize, usize)> = vec![(start, 0)];

        while let Some(top) = stack.last_mut() {
            let idx = top.0;
            if top.1 < self.pending[idx].len() {
                let parent_id = self.pending[idx][top.1];
                top.1 += 1;

                let parent = match self.index.get(&parent_id) {
                    Some(&p) if self.visit[p] == Visit::InProgress => {
                        return Err(AncestryError::CycleDetected(parent_id));
                    }
                    Some(&p) => p,
                    None => {
                        let p = self.intern(parent_id)?;
                        stack.push((p, 0));
                        p
                    }
                };
                self.nodes[idx].parents.push(parent);
                self.nodes[parent].children.push(idx);
            } else {
                let generation = self.nodes[idx]
                    .parents
                    .iter()
                    .map(|&p| self.nodes[p].generation + 1)
                    .max()
                    .unwrap_or(0);
                self.nodes[idx].generation = generation;
                self.visit[idx] = Visit::Done;
                trace!(revision = %self.nodes[idx].id.short_hex(), generation, "discovered");
                stack.pop();
            }
        }

        Ok(())
    }
}

impl Subgraph {
    /// Load everything reachable from `starts` through parent edges.
    ///
    /// Duplicate starts are collapsed. Fails with
    /// [`AncestryError::UnknownRevision`] if any start or reachable parent is
    /// unknown to the store.
    pub fn discover<S: RevisionStore + ?Sized>(
        store: &S,
        starts: &[RevisionId],
        config: &AncestryConfig,
    ) -> Result<Self> {
        let mut discovery = Discovery {
            store,
            budget: config.max_visited,
            nodes: Vec::new(),
            index: HashMap::new(),
            pending: Vec::new(),
            visit: Vec::new(),
        };

        let mut start_indices = Vec::with_capacity(starts.len());
        for &id in starts {
            if let Some(&idx) = discovery.index.get(&id) {
                if !start_indices.contains(&idx) {
                    start_indices.push(idx);
                }
                continue;
            }
            let idx = discovery.intern(id)?;
            start_indices.push(idx);
            discovery.explore(idx)?;
        }

        Ok(Self {
            nodes: discovery.nodes,
            index: discovery.index,
            starts: start_indices,
        })
    }

    /// Number of discovered revisions.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, idx: usize) -> &SubgraphNode {
        &self.nodes[idx]
    }

    pub fn nodes(&self) -> &[SubgraphNode] {
        &self.nodes
    }

    pub fn index_of(&self, id: &RevisionId) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Indices of the starting revisions, duplicates removed, in the order
    /// they were supplied.
    pub fn starts(&self) -> &[usize] {
        &self.starts
    }

    /// Every node, children before parents.
    ///
    /// Driven by a [`FrontierQueue`] seeded with the starts, so equal
    /// generations come out in discovery order.
    pub fn topological_order(&self) -> Vec<usize> {
        let mut queue = FrontierQueue::new();
        for &s in &self.starts {
            queue.push(s, self.nodes[s].generation);
        }

        let mut popped = vec![false; self.nodes.len()];
        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some((idx, _)) = queue.pop_max() {
            popped[idx] = true;
            order.push(idx);
            for &p in &self.nodes[idx].parents {
                if !popped[p] {
                    queue.push(p, self.nodes[p].generation);
                }
            }
        }
        order
    }

    pub(crate) fn into_nodes(self) -> (Vec<SubgraphNode>, Vec<usize>) {
        (self.nodes, self.starts)
    }
}
