//! Merge ancestry resolution for branching revision histories.
//!
//! Given two or more leaf revisions, [`resolve_ancestry`] finds their Lowest
//! Common Ancestors (LCA) and, on request, the Surplus Common Ancestors
//! (SPCA) that per-path merge-base selection falls back to when the LCA does
//! not settle a path.
//!
//! The pipeline is:
//!
//! 1. [`Subgraph::discover`] loads the ancestry of the leaves (iteratively,
//!    under a visited-revision budget) and assigns generations.
//! 2. [`AncestryWalker`] propagates growable origin bitsets from the leaves
//!    towards the roots through a [`FrontierQueue`], allocating a new bit at
//!    every join.
//! 3. [`ResultClassifier`] reads the finalized records and emits the LCA and
//!    SPCA sets.
//!
//! # Invariants
//!
//! - Results depend on topology only: not on leaf order, parent order, or
//!   identifier values.
//! - No state survives a call.

pub mod classify;
pub mod config;
pub mod error;
pub mod frontier;
pub mod graph;
pub mod origin;
pub mod resolve;
pub mod result;
pub mod walker;

pub use classify::{Classification, ResultClassifier};
pub use config::AncestryConfig;
pub use error::{AncestryError, Result};
pub use frontier::FrontierQueue;
pub use graph::{Subgraph, SubgraphNode};
pub use origin::{OriginPool, OriginSet};
pub use resolve::{AncestryResolver, resolve_ancestry};
pub use result::{AncestryResult, AncestryStats};
pub use walker::{AncestryWalker, Record, Records};
