//! The revision record held by stores.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use mbase_types::{ContentId, RepoPath, RevisionId};

/// An immutable snapshot node in the history graph.
///
/// `parents` keeps the order the revision was created with (first parent
/// first). Ancestry resolution never depends on that order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    /// Content-addressed identifier for this revision.
    pub id: RevisionId,
    /// Parent revisions (empty for roots, two or more for merges).
    pub parents: Vec<RevisionId>,
    /// Flattened tree: every path present in this revision and its content.
    #[serde(default)]
    pub tree: BTreeMap<RepoPath, ContentId>,
}

impl Revision {
    /// Create a revision with an empty tree.
    pub fn new(id: RevisionId, parents: Vec<RevisionId>) -> Self {
        Self {
            id,
            parents,
            tree: BTreeMap::new(),
        }
    }

    /// Builder-style helper adding one tree entry.
    pub fn with_entry(mut self, path: RepoPath, content: ContentId) -> Self {
        self.tree.insert(path, content);
        self
    }

    /// Returns `true` if this revision has no parents.
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// Returns `true` if this revision has two or more parents.
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    /// Content at `path`, if the path exists in this revision.
    pub fn content(&self, path: &RepoPath) -> Option<ContentId> {
        self.tree.get(path).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rid(label: &str) -> RevisionId {
        RevisionId::from_bytes(label.as_bytes())
    }

    #[test]
    fn root_and_merge_classification() {
        let root = Revision::new(rid("r"), vec![]);
        assert!(root.is_root());
        assert!(!root.is_merge());

        let merge = Revision::new(rid("m"), vec![rid("a"), rid("b")]);
        assert!(!merge.is_root());
        assert!(merge.is_merge());
    }

    #[test]
    fn content_lookup() {
        let path = RepoPath::new("a.txt").unwrap();
        let content = ContentId::from_bytes(b"hello");
        let rev = Revision::new(rid("r"), vec![]).with_entry(path.clone(), content);

        assert_eq!(rev.content(&path), Some(content));
        assert_eq!(rev.content(&RepoPath::new("b.txt").unwrap()), None);
    }
}
