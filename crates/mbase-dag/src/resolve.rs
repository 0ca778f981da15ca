//! Entry point: resolve the merge ancestry of a leaf set.

use std::collections::BTreeMap;

use tracing::debug;

use mbase_store::RevisionStore;
use mbase_types::RevisionId;

use crate::classify::ResultClassifier;
use crate::config::AncestryConfig;
use crate::error::{AncestryError, Result};
use crate::result::{AncestryResult, AncestryStats};
use crate::walker::{AncestryWalker, Records};

/// Resolves LCA / SPCA sets with a fixed configuration.
///
/// Holds no state between calls: every [`resolve`](Self::resolve) allocates
/// its own records, origin pool and frontier, so one resolver can be shared
/// across threads.
#[derive(Clone, Debug, Default)]
pub struct AncestryResolver {
    config: AncestryConfig,
}

impl AncestryResolver {
    pub fn new(config: AncestryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AncestryConfig {
        &self.config
    }

    /// Resolve the ancestry of `leaves`.
    ///
    /// Duplicate leaves are collapsed. A single distinct leaf is its own LCA.
    /// Leaves with no common ancestor produce an empty result rather than an
    /// error.
    pub fn resolve<S: RevisionStore + ?Sized>(
        &self,
        store: &S,
        leaves: &[RevisionId],
        want_spca: bool,
    ) -> Result<AncestryResult> {
        self.config.validate()?;

        let mut distinct: Vec<RevisionId> = Vec::with_capacity(leaves.len());
        for leaf in leaves {
            if !distinct.contains(leaf) {
                distinct.push(*leaf);
            }
        }

        if distinct.is_empty() {
            return Err(AncestryError::EmptyLeafSet);
        }
        if let [only] = distinct[..] {
            if !store.contains(&only)? {
                return Err(AncestryError::UnknownRevision(only));
            }
            return Ok(AncestryResult::new(
                vec![only],
                vec![only],
                Vec::new(),
                BTreeMap::from([(only, vec![only])]),
                AncestryStats {
                    visited: 1,
                    ..AncestryStats::default()
                },
            ));
        }

        let records = AncestryWalker::new(self.config.clone()).walk(store, &distinct)?;
        let classification = ResultClassifier::classify(&records, records.leaf_count(), want_spca)?;

        let ids = |indices: &[usize]| -> Vec<RevisionId> {
            indices.iter().map(|&i| records.get(i).id).collect()
        };
        let lca = ids(&classification.lca);
        let spca = ids(&classification.spca);
        let coverage = lca
            .iter()
            .chain(&spca)
            .map(|id| (*id, covered_leaves(&records, id)))
            .collect();

        let stats = AncestryStats {
            visited: records.len(),
            joins: records.join_count(),
            rounds: classification.rounds,
        };
        debug!(
            leaves = distinct.len(),
            lca = lca.len(),
            spca = spca.len(),
            visited = stats.visited,
            "ancestry resolved"
        );
        Ok(AncestryResult::new(distinct, lca, spca, coverage, stats))
    }
}

fn covered_leaves(records: &Records, id: &RevisionId) -> Vec<RevisionId> {
    let Some(record) = records.by_id(id) else {
        return Vec::new();
    };
    (0..records.leaf_count())
        .filter(|&bit| record.origins.contains(bit))
        .filter_map(|bit| records.leaf_id(bit))
        .collect()
}

/// Resolve the ancestry of `leaves` with the default configuration.
///
/// ```
/// use mbase_dag::resolve_ancestry;
/// use mbase_store::HistoryBuilder;
///
/// let mut h = HistoryBuilder::new();
/// let root = h.commit("R", &[]).unwrap();
/// let c = h.commit("C", &["R"]).unwrap();
/// let d = h.commit("D", &["R"]).unwrap();
///
/// let result = resolve_ancestry(h.store(), &[c, d], false).unwrap();
/// assert_eq!(result.lca(), &[root]);
/// assert!(result.spca().is_empty());
/// ```
pub fn resolve_ancestry<S: RevisionStore + ?Sized>(
    store: &S,
    leaves: &[RevisionId],
    want_spca: bool,
) -> Result<AncestryResult> {
    AncestryResolver::default().resolve(store, leaves, want_spca)
}
