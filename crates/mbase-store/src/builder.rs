//! Label-based construction of in-memory histories.
//!
//! [`HistoryBuilder`] names revisions by human-readable labels and derives
//! their [`RevisionId`] from `namespace/label`. Building the same topology
//! under two namespaces yields the same graph with every identifier
//! relabeled, which is how callers check that ancestry results depend on
//! topology alone.

use std::collections::BTreeMap;

use mbase_types::{ContentId, RepoPath, RevisionId};

use crate::error::StoreResult;
use crate::memory::InMemoryRevisionStore;
use crate::revision::Revision;

/// Incrementally builds an [`InMemoryRevisionStore`] from labelled commits.
#[derive(Debug, Default)]
pub struct HistoryBuilder {
    namespace: String,
    store: InMemoryRevisionStore,
    labels: BTreeMap<RevisionId, String>,
}

impl HistoryBuilder {
    /// Create a builder with the empty namespace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder whose identifiers are salted with `namespace`.
    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    /// The identifier `label` has (or will have) in this builder's namespace.
    pub fn id(&self, label: &str) -> RevisionId {
        RevisionId::from_bytes(format!("{}/{}", self.namespace, label).as_bytes())
    }

    /// Label of a revision created by this builder.
    pub fn label(&self, id: &RevisionId) -> Option<&str> {
        self.labels.get(id).map(String::as_str)
    }

    /// Labels for a list of ids, in the same order. Unknown ids map to `"?"`.
    pub fn labels<'a>(&self, ids: impl IntoIterator<Item = &'a RevisionId>) -> Vec<String> {
        ids.into_iter()
            .map(|id| self.label(id).unwrap_or("?").to_string())
            .collect()
    }

    /// Commit a revision with an empty tree.
    pub fn commit(&mut self, label: &str, parents: &[&str]) -> StoreResult<RevisionId> {
        self.commit_with(label, parents, &[])
    }

    /// Commit a revision whose tree holds exactly `files` (`(path, text)`).
    ///
    /// Content identifiers are derived from the text, so equal text means
    /// equal content across revisions.
    pub fn commit_with(
        &mut self,
        label: &str,
        parents: &[&str],
        files: &[(&str, &str)],
    ) -> StoreResult<RevisionId> {
        let id = self.id(label);
        let mut revision = Revision::new(id, parents.iter().map(|p| self.id(p)).collect());
        for (path, text) in files {
            revision = revision.with_entry(RepoPath::new(*path)?, ContentId::from_bytes(text.as_bytes()));
        }
        self.store.insert(revision)?;
        self.labels.insert(id, label.to_string());
        Ok(id)
    }

    /// Borrow the store built so far.
    pub fn store(&self) -> &InMemoryRevisionStore {
        &self.store
    }

    /// Finish building and take the store.
    pub fn into_store(self) -> InMemoryRevisionStore {
        self.store
    }
}
