use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::debug;

use mbase_types::{ContentId, RepoPath, RevisionId};

use crate::error::{StoreError, StoreResult};
use crate::revision::Revision;
use crate::traits::RevisionStore;

#[derive(Default)]
struct Inner {
    revisions: HashMap<RevisionId, Revision>,
    /// Insertion order. Parents always precede children.
    order: Vec<RevisionId>,
}

/// In-memory, HashMap-based revision store.
///
/// Intended for tests and embedding. Revisions are held behind a `RwLock` for
/// safe concurrent access and cloned on read. Insertion is append-only and
/// requires every parent to be present already, so the history held here is
/// acyclic by construction.
pub struct InMemoryRevisionStore {
    inner: RwLock<Inner>,
}

/// Serializable form of an [`InMemoryRevisionStore`]: revisions in insertion
/// order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub revisions: Vec<Revision>,
}

impl InMemoryRevisionStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Number of revisions currently stored.
    pub fn len(&self) -> usize {
        self.inner.read().expect("lock poisoned").revisions.len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.read().expect("lock poisoned").revisions.is_empty()
    }

    /// Add a revision.
    ///
    /// All parents must already be stored. Returns an error if the ID already
    /// exists or if a parent reference dangles.
    pub fn insert(&self, revision: Revision) -> StoreResult<()> {
        let mut inner = self.inner.write().expect("lock poisoned");

        if inner.revisions.contains_key(&revision.id) {
            return Err(StoreError::DuplicateRevision(revision.id));
        }
        for parent in &revision.parents {
            if !inner.revisions.contains_key(parent) {
                return Err(StoreError::DanglingParent {
                    revision: revision.id,
                    parent: *parent,
                });
            }
        }

        debug!(
            revision = %revision.id.short_hex(),
            parents = revision.parents.len(),
            "stored revision"
        );
        inner.order.push(revision.id);
        inner.revisions.insert(revision.id, revision);
        Ok(())
    }

    /// Retrieve a full revision by ID.
    pub fn get(&self, id: &RevisionId) -> Option<Revision> {
        self.inner
            .read()
            .expect("lock poisoned")
            .revisions
            .get(id)
            .cloned()
    }

    /// Return a sorted list of all revision IDs in the store.
    pub fn all_ids(&self) -> Vec<RevisionId> {
        let inner = self.inner.read().expect("lock poisoned");
        let mut ids: Vec<RevisionId> = inner.revisions.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Capture every revision in insertion order.
    pub fn snapshot(&self) -> StoreSnapshot {
        let inner = self.inner.read().expect("lock poisoned");
        StoreSnapshot {
            revisions: inner
                .order
                .iter()
                .filter_map(|id| inner.revisions.get(id).cloned())
                .collect(),
        }
    }

    /// Rebuild a store from a snapshot, re-validating every parent edge.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> StoreResult<Self> {
        let store = Self::new();
        for revision in snapshot.revisions {
            store.insert(revision)?;
        }
        Ok(store)
    }

    /// Serialize the store to a JSON snapshot.
    pub fn to_json(&self) -> StoreResult<String> {
        serde_json::to_string_pretty(&self.snapshot())
            .map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Load a store from a JSON snapshot.
    pub fn from_json(json: &str) -> StoreResult<Self> {
        let snapshot: StoreSnapshot =
            serde_json::from_str(json).map_err(|e| StoreError::Serialization(e.to_string()))?;
        Self::from_snapshot(snapshot)
    }
}

impl Default for InMemoryRevisionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RevisionStore for InMemoryRevisionStore {
    fn parents(&self, id: &RevisionId) -> StoreResult<Vec<RevisionId>> {
        let inner = self.inner.read().expect("lock poisoned");
        inner
            .revisions
            .get(id)
            .map(|rev| rev.parents.clone())
            .ok_or(StoreError::NotFound(*id))
    }

    fn path_content(&self, id: &RevisionId, path: &RepoPath) -> StoreResult<Option<ContentId>> {
        let inner = self.inner.read().expect("lock poisoned");
        inner
            .revisions
            .get(id)
            .map(|rev| rev.content(path))
            .ok_or(StoreError::NotFound(*id))
    }

    fn contains(&self, id: &RevisionId) -> StoreResult<bool> {
        Ok(self
            .inner
            .read()
            .expect("lock poisoned")
            .revisions
            .contains_key(id))
    }
}

impl std::fmt::Debug for InMemoryRevisionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRevisionStore")
            .field("revision_count", &self.len())
            .finish()
    }
}
