//! Error types for ancestry resolution.

use mbase_store::StoreError;
use mbase_types::RevisionId;

/// Errors that can occur while resolving merge ancestry.
#[derive(Debug, thiserror::Error)]
pub enum AncestryError {
    /// A leaf, or a parent named by a stored revision, is unknown to the
    /// store.
    #[error("unknown revision: {0}")]
    UnknownRevision(RevisionId),

    /// The store failed for a reason other than a missing revision.
    #[error("store error: {0}")]
    Store(StoreError),

    /// No leaves were supplied.
    #[error("ancestry query needs at least one leaf")]
    EmptyLeafSet,

    /// The parent edges reachable from the leaves form a cycle.
    #[error("cycle detected involving revision {0:?}")]
    CycleDetected(RevisionId),

    /// Walker or classifier state contradicts its own invariants.
    #[error("internal inconsistency: {0}")]
    Inconsistent(String),

    /// The walk needed more revisions than the configured budget allows.
    #[error("ancestry too complex to resolve: visited {visited} revisions (budget {budget})")]
    TooComplex {
        /// Configured `max_visited`.
        budget: usize,
        /// Revisions visited when the walk was aborted.
        visited: usize,
    },

    /// The configuration is unusable.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl AncestryError {
    /// Returns `true` for errors that indicate a defect in the store or the
    /// walker rather than a property of the history being merged.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::CycleDetected(_) | Self::Inconsistent(_))
    }
}

impl From<StoreError> for AncestryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::UnknownRevision(id),
            other => Self::Store(other),
        }
    }
}

/// Convenience alias for ancestry results.
pub type Result<T> = std::result::Result<T, AncestryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_unknown_revision() {
        let id = RevisionId::from_bytes(b"x");
        let err: AncestryError = StoreError::NotFound(id).into();
        assert!(matches!(err, AncestryError::UnknownRevision(got) if got == id));
    }

    #[test]
    fn other_store_errors_are_wrapped() {
        let err: AncestryError = StoreError::Serialization("bad".into()).into();
        assert!(matches!(err, AncestryError::Store(_)));
        assert!(!err.is_internal());
    }

    #[test]
    fn internal_errors_are_flagged() {
        assert!(AncestryError::CycleDetected(RevisionId::from_bytes(b"c")).is_internal());
        assert!(AncestryError::Inconsistent("x".into()).is_internal());
        assert!(!AncestryError::TooComplex { budget: 1, visited: 2 }.is_internal());
    }
}
