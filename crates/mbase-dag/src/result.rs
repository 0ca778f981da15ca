//! The immutable outcome of one ancestry query.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use mbase_types::RevisionId;

/// Counters describing how much work one query did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AncestryStats {
    /// Distinct revisions loaded from the store.
    pub visited: usize,
    /// Join bits allocated beyond the leaf bits.
    pub joins: usize,
    /// Criss-cross reduction rounds.
    pub rounds: usize,
}

/// LCA and SPCA sets for a leaf set.
///
/// All id lists are sorted by canonical identifier. That order is for
/// presentation only; membership never depends on it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AncestryResult {
    leaves: Vec<RevisionId>,
    lca: Vec<RevisionId>,
    spca: Vec<RevisionId>,
    /// For every LCA and SPCA entry, the leaves it is an ancestor of.
    coverage: BTreeMap<RevisionId, Vec<RevisionId>>,
    stats: AncestryStats,
}

impl AncestryResult {
    pub(crate) fn new(
        mut leaves: Vec<RevisionId>,
        mut lca: Vec<RevisionId>,
        mut spca: Vec<RevisionId>,
        mut coverage: BTreeMap<RevisionId, Vec<RevisionId>>,
        stats: AncestryStats,
    ) -> Self {
        leaves.sort();
        leaves.dedup();
        lca.sort();
        spca.sort();
        for covered in coverage.values_mut() {
            covered.sort();
        }
        Self {
            leaves,
            lca,
            spca,
            coverage,
            stats,
        }
    }

    /// The distinct leaves the query was made for.
    pub fn leaves(&self) -> &[RevisionId] {
        &self.leaves
    }

    pub fn lca(&self) -> &[RevisionId] {
        &self.lca
    }

    pub fn spca(&self) -> &[RevisionId] {
        &self.spca
    }

    /// The single LCA, if there is exactly one.
    pub fn unique_lca(&self) -> Option<RevisionId> {
        match self.lca.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    /// Returns `true` when the leaves share no ancestor at all.
    pub fn is_disconnected(&self) -> bool {
        self.lca.is_empty()
    }

    /// Leaves that `id` (an LCA or SPCA entry) is a common ancestor of.
    pub fn coverage_of(&self, id: &RevisionId) -> Option<&[RevisionId]> {
        self.coverage.get(id).map(Vec::as_slice)
    }

    /// Returns `true` if `id` is a reported ancestor of every revision in
    /// `leaves`.
    pub fn covers(&self, id: &RevisionId, leaves: &[RevisionId]) -> bool {
        self.coverage_of(id)
            .is_some_and(|covered| leaves.iter().all(|leaf| covered.contains(leaf)))
    }

    pub fn stats(&self) -> AncestryStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rid(label: &str) -> RevisionId {
        RevisionId::from_bytes(label.as_bytes())
    }

    fn sample() -> AncestryResult {
        let (x, y, z) = (rid("x"), rid("y"), rid("z"));
        let coverage = BTreeMap::from([
            (rid("root"), vec![z, y, x]),
            (rid("xy"), vec![y, x]),
        ]);
        AncestryResult::new(
            vec![z, x, y, x],
            vec![rid("root")],
            vec![rid("xy")],
            coverage,
            AncestryStats::default(),
        )
    }

    #[test]
    fn construction_sorts_and_dedups() {
        let result = sample();
        let mut expected = vec![rid("x"), rid("y"), rid("z")];
        expected.sort();
        assert_eq!(result.leaves(), expected.as_slice());
        assert_eq!(result.coverage_of(&rid("root")).unwrap(), expected.as_slice());
    }

    #[test]
    fn covers_checks_every_leaf() {
        let result = sample();
        assert!(result.covers(&rid("xy"), &[rid("x"), rid("y")]));
        assert!(!result.covers(&rid("xy"), &[rid("x"), rid("z")]));
        assert!(!result.covers(&rid("unknown"), &[rid("x")]));
    }

    #[test]
    fn unique_lca_and_disconnection() {
        let result = sample();
        assert_eq!(result.unique_lca(), Some(rid("root")));
        assert!(!result.is_disconnected());

        let empty = AncestryResult::new(
            vec![rid("a"), rid("b")],
            vec![],
            vec![],
            BTreeMap::new(),
            AncestryStats::default(),
        );
        assert_eq!(empty.unique_lca(), None);
        assert!(empty.is_disconnected());
    }

    #[test]
    fn serializes_for_diagnostic_dumps() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["lca"][0], rid("root").to_hex());
        assert!(json["coverage"].is_object());
    }
}
