//! Error types for merge-base selection.

use mbase_dag::AncestryError;
use mbase_store::StoreError;
use mbase_types::{RepoPath, RevisionId};

/// Errors that can occur while selecting a merge base for a path.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// Resolving the ancestry of divergent candidates failed.
    #[error("ancestry error: {0}")]
    Ancestry(#[from] AncestryError),

    /// Reading path content from the store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A leaf of the pair is not one of the leaves the ancestry result was
    /// computed for.
    #[error("revision {0:?} is not a leaf of the supplied ancestry result")]
    LeafNotInAncestry(RevisionId),

    /// Candidates kept disagreeing on content after `rounds` recursions.
    #[error("no merge base for {path}: candidates still diverge after {rounds} rounds")]
    Unresolvable { path: RepoPath, rounds: usize },

    /// The configuration is unusable.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Convenience alias for selector results.
pub type MergeResult<T> = Result<T, MergeError>;
