use std::sync::Arc;

use mbase_types::{ContentId, RepoPath, RevisionId};

use crate::error::{StoreError, StoreResult};

/// Read-only view of a revision history.
///
/// All implementations must satisfy these invariants:
/// - Revisions are immutable: repeated calls return the same answer.
/// - Parent edges never form a cycle.
/// - Concurrent reads are always safe.
/// - Unknown revisions are reported as [`StoreError::NotFound`], never as an
///   empty parent list.
pub trait RevisionStore: Send + Sync {
    /// Parent IDs of a revision, in the order they were recorded.
    fn parents(&self, id: &RevisionId) -> StoreResult<Vec<RevisionId>>;

    /// Content at `path` inside revision `id`.
    ///
    /// Returns `Ok(None)` if the revision exists but does not contain the
    /// path, and `Err(StoreError::NotFound)` if the revision is unknown.
    fn path_content(&self, id: &RevisionId, path: &RepoPath) -> StoreResult<Option<ContentId>>;

    /// Check whether a revision exists in the store.
    ///
    /// Default implementation probes [`parents`](RevisionStore::parents).
    /// Backends may override when existence is cheaper to answer.
    fn contains(&self, id: &RevisionId) -> StoreResult<bool> {
        match self.parents(id) {
            Ok(_) => Ok(true),
            Err(StoreError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

impl<S: RevisionStore + ?Sized> RevisionStore for &S {
    fn parents(&self, id: &RevisionId) -> StoreResult<Vec<RevisionId>> {
        (**self).parents(id)
    }

    fn path_content(&self, id: &RevisionId, path: &RepoPath) -> StoreResult<Option<ContentId>> {
        (**self).path_content(id, path)
    }

    fn contains(&self, id: &RevisionId) -> StoreResult<bool> {
        (**self).contains(id)
    }
}

impl<S: RevisionStore + ?Sized> RevisionStore for Arc<S> {
    fn parents(&self, id: &RevisionId) -> StoreResult<Vec<RevisionId>> {
        (**self).parents(id)
    }

    fn path_content(&self, id: &RevisionId, path: &RepoPath) -> StoreResult<Option<ContentId>> {
        (**self).path_content(id, path)
    }

    fn contains(&self, id: &RevisionId) -> StoreResult<bool> {
        (**self).contains(id)
    }
}
