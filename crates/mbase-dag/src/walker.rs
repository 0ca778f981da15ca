//! The ancestry walker: origin-bit propagation over a discovered subgraph.
//!
//! Every leaf owns one origin bit. The walker pops revisions from a
//! [`FrontierQueue`] (greatest generation first), finalizes them, and ORs
//! their origin set into each parent. A revision whose contributions (the
//! sets of its children, plus its own leaf bit if it is a leaf) are not all
//! equal to their union is a *join*: the first place where distinct lines
//! of history meet. Joins are given a fresh origin bit, so ancestors further
//! down can tell "reached through this join" apart from "reached through
//! some other path that happens to cover the same leaves".
//!
//! Only topology influences which revisions are joins and which bits they
//! end up holding; bit numbering depends on processing order and is not
//! meaningful on its own.

use std::collections::HashMap;

use tracing::{debug, trace};

use mbase_store::RevisionStore;
use mbase_types::RevisionId;

use crate::config::AncestryConfig;
use crate::error::{AncestryError, Result};
use crate::frontier::FrontierQueue;
use crate::graph::Subgraph;
use crate::origin::{OriginPool, OriginSet};

/// Per-revision walk state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub id: RevisionId,
    /// Origins that reach this revision.
    pub origins: OriginSet,
    pub generation: u64,
    pub finalized: bool,
    /// Bit owned by this revision when it is one of the leaves.
    pub leaf_bit: Option<usize>,
    /// Bit allocated to this revision when it is a join.
    pub join_bit: Option<usize>,
    /// Parent record indices.
    pub parents: Vec<usize>,
    /// Child record indices (the contributors to `origins`).
    pub children: Vec<usize>,
}

impl Record {
    pub fn is_join(&self) -> bool {
        self.join_bit.is_some()
    }
}

/// The finalized output of one walk.
#[derive(Clone, Debug)]
pub struct Records {
    records: Vec<Record>,
    index: HashMap<RevisionId, usize>,
    /// Record index of each leaf, by leaf bit.
    leaves: Vec<usize>,
    /// Record indices in the order they were finalized.
    order: Vec<usize>,
    origin_bits: usize,
}

impl Records {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, idx: usize) -> &Record {
        &self.records[idx]
    }

    pub fn by_id(&self, id: &RevisionId) -> Option<&Record> {
        self.index.get(id).map(|&idx| &self.records[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// Number of distinct leaves; leaf bits are `0..leaf_count()`.
    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Leaf revision owning `bit`.
    pub fn leaf_id(&self, bit: usize) -> Option<RevisionId> {
        self.leaves.get(bit).map(|&idx| self.records[idx].id)
    }

    /// Record indices, descendants before ancestors.
    pub fn finalization_order(&self) -> &[usize] {
        &self.order
    }

    /// Total origin bits handed out (leaf bits plus join bits).
    pub fn origin_bits(&self) -> usize {
        self.origin_bits
    }

    pub fn join_count(&self) -> usize {
        self.origin_bits - self.leaves.len()
    }
}

/// Walks the ancestry of a leaf set and assigns origin bits.
#[derive(Clone, Debug, Default)]
pub struct AncestryWalker {
    config: AncestryConfig,
}

impl AncestryWalker {
    pub fn new(config: AncestryConfig) -> Self {
        Self { config }
    }

    /// Discover the ancestry of `leaves` and propagate origin bits through it.
    ///
    /// Duplicate leaves are collapsed; leaf bits follow first occurrence.
    pub fn walk<S: RevisionStore + ?Sized>(&self, store: &S, leaves: &[RevisionId]) -> Result<Records> {
        if leaves.is_empty() {
            return Err(AncestryError::EmptyLeafSet);
        }
        let graph = Subgraph::discover(store, leaves, &self.config)?;
        debug!(
            leaves = graph.starts().len(),
            revisions = graph.len(),
            "ancestry subgraph discovered"
        );
        propagate(graph)
    }
}

fn propagate(graph: Subgraph) -> Result<Records> {
    let (nodes, starts) = graph.into_nodes();
    let mut records: Vec<Record> = nodes
        .into_iter()
        .map(|node| Record {
            id: node.id,
            origins: OriginSet::new(),
            generation: node.generation,
            finalized: false,
            leaf_bit: None,
            join_bit: None,
            parents: node.parents,
            children: node.children,
        })
        .collect();
    let index: HashMap<RevisionId, usize> = records
        .iter()
        .enumerate()
        .map(|(idx, r)| (r.id, idx))
        .collect();

    let mut pool = OriginPool::new();
    let mut queue = FrontierQueue::new();
    for &leaf in &starts {
        let bit = pool.allocate();
        records[leaf].leaf_bit = Some(bit);
        records[leaf].origins.insert(bit);
        queue.push(leaf, records[leaf].generation);
    }

    let mut order = Vec::with_capacity(records.len());
    while let Some((idx, _)) = queue.pop_max() {
        finalize(&mut records, idx, &mut pool)?;
        order.push(idx);

        let child_id = records[idx].id;
        let origins = records[idx].origins.clone();
        for p in records[idx].parents.clone() {
            let parent = &mut records[p];
            if parent.finalized {
                return Err(AncestryError::Inconsistent(format!(
                    "parent {} finalized before child {}",
                    parent.id.short_hex(),
                    child_id.short_hex()
                )));
            }
            parent.origins.union_with(&origins);
            queue.push(p, parent.generation);
        }
    }

    if order.len() != records.len() {
        return Err(AncestryError::Inconsistent(format!(
            "{} of {} revisions were never finalized",
            records.len() - order.len(),
            records.len()
        )));
    }

    debug!(
        revisions = records.len(),
        joins = pool.len() - starts.len(),
        "origin propagation complete"
    );

    Ok(Records {
        records,
        index,
        leaves: starts,
        order,
        origin_bits: pool.len(),
    })
}

/// Close a record: check that every contribution has arrived, then decide
/// whether it is a join.
fn finalize(records: &mut [Record], idx: usize, pool: &mut OriginPool) -> Result<()> {
    let record = &records[idx];
    if record.finalized {
        return Err(AncestryError::Inconsistent(format!(
            "revision {} finalized twice",
            record.id.short_hex()
        )));
    }

    let mut contributions: Vec<&OriginSet> = Vec::with_capacity(record.children.len() + 1);
    for &c in &record.children {
        let child = &records[c];
        if !child.finalized {
            return Err(AncestryError::Inconsistent(format!(
                "revision {} reached before its child {}",
                record.id.short_hex(),
                child.id.short_hex()
            )));
        }
        contributions.push(&child.origins);
    }
    let own = record.leaf_bit.map(OriginSet::with_bit);
    contributions.extend(own.as_ref());

    let mut union = OriginSet::new();
    for set in &contributions {
        union.union_with(set);
    }
    if union != record.origins {
        return Err(AncestryError::Inconsistent(format!(
            "origin set of {} does not match its contributions",
            record.id.short_hex()
        )));
    }

    let is_join = contributions.len() > 1 && contributions.iter().all(|set| **set != union);
    let record = &mut records[idx];
    if is_join {
        let bit = pool.allocate();
        record.origins.insert(bit);
        record.join_bit = Some(bit);
        trace!(revision = %record.id.short_hex(), bit, "join");
    }
    record.finalized = true;
    Ok(())
}
