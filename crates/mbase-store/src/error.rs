use mbase_types::{RevisionId, TypeError};

/// Errors from revision store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested revision is unknown to the store.
    #[error("revision not found: {0}")]
    NotFound(RevisionId),

    /// A revision names a parent the store does not hold.
    #[error("dangling parent reference: revision {revision:?} references missing parent {parent:?}")]
    DanglingParent {
        /// The revision containing the bad reference.
        revision: RevisionId,
        /// The missing parent.
        parent: RevisionId,
    },

    /// Attempted to insert a revision whose ID already exists.
    #[error("duplicate revision: {0:?}")]
    DuplicateRevision(RevisionId),

    /// Snapshot serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Malformed identifier or path.
    #[error(transparent)]
    Type(#[from] TypeError),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
