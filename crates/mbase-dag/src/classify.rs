//! Turns finalized walk records into LCA and SPCA sets.
//!
//! A revision is a common ancestor when its origin set holds every leaf bit.
//! The LCA set is the maximal common ancestors: those that are not an
//! ancestor of another common ancestor. Maximality is decided by pushing a
//! "dominated" mark along the recorded parent edges in finalization order,
//! so no transitive closure is ever built.
//!
//! # Criss-cross reduction
//!
//! When several maximal common ancestors exist, they are surplus ancestors
//! and the search repeats one level down: the next candidates are the
//! revisions carrying every leaf bit *and* the join bit of every current
//! candidate, i.e. the common ancestors of the current candidates. This
//! continues until a single revision remains. If a level has no common
//! ancestor at all, the current candidates are returned as the LCA set.
//!
//! # Partial joins
//!
//! For queries over more than two leaves, every join whose leaf bits cover at
//! least two but not all leaves is also reported as a surplus ancestor,
//! provided the leaves have at least one common ancestor.

use tracing::debug;

use crate::error::{AncestryError, Result};
use crate::origin::OriginSet;
use crate::walker::Records;

/// Output of [`ResultClassifier::classify`], as record indices.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Classification {
    pub lca: Vec<usize>,
    pub spca: Vec<usize>,
    /// Criss-cross reduction rounds performed.
    pub rounds: usize,
}

/// Classifies the records produced by one walk.
#[derive(Debug)]
pub struct ResultClassifier<'a> {
    records: &'a Records,
}

impl<'a> ResultClassifier<'a> {
    pub fn new(records: &'a Records) -> Self {
        Self { records }
    }

    /// Compute the LCA set and, when `want_spca` is set, the SPCA set.
    ///
    /// `leaf_count` must equal the number of leaves the walk seeded; a
    /// mismatch is reported as [`AncestryError::Inconsistent`]. When the
    /// leaves share no common ancestor both sets are empty, even if some of
    /// the leaves share partial joins.
    pub fn classify(records: &Records, leaf_count: usize, want_spca: bool) -> Result<Classification> {
        if leaf_count != records.leaf_count() {
            return Err(AncestryError::Inconsistent(format!(
                "classifying {leaf_count} leaves but the walk seeded {}",
                records.leaf_count()
            )));
        }
        ResultClassifier::new(records).run(leaf_count, want_spca)
    }

    fn run(&self, leaf_count: usize, want_spca: bool) -> Result<Classification> {
        let mut target = OriginSet::prefix(leaf_count);
        let mut maximal = self.maximal_covering(&target);
        let mut surplus = Vec::new();
        let mut rounds = 0;

        while maximal.len() > 1 {
            for &m in &maximal {
                let record = self.records.get(m);
                let bit = record.join_bit.ok_or_else(|| {
                    AncestryError::Inconsistent(format!(
                        "maximal common ancestor {} holds no join bit",
                        record.id.short_hex()
                    ))
                })?;
                target.insert(bit);
            }
            rounds += 1;

            let next = self.maximal_covering(&target);
            if next.is_empty() {
                break;
            }
            surplus.append(&mut maximal);
            maximal = next;
        }

        // Disconnected leaves report no surplus ancestors either.
        let spca = if want_spca && !maximal.is_empty() {
            let mut spca = surplus;
            spca.extend(self.partial_joins(leaf_count));
            spca.sort_unstable();
            spca.dedup();
            spca.retain(|idx| !maximal.contains(idx));
            spca
        } else {
            Vec::new()
        };

        debug!(
            lca = maximal.len(),
            spca = spca.len(),
            rounds,
            "ancestry classified"
        );

        Ok(Classification {
            lca: maximal,
            spca,
            rounds,
        })
    }

    /// Records whose origins cover `target` and that are not an ancestor of
    /// another such record.
    fn maximal_covering(&self, target: &OriginSet) -> Vec<usize> {
        let mut dominated = vec![false; self.records.len()];
        let mut maximal = Vec::new();

        for &idx in self.records.finalization_order() {
            let record = self.records.get(idx);
            let covering = record.origins.is_superset(target);
            if covering && !dominated[idx] {
                maximal.push(idx);
            }
            if covering || dominated[idx] {
                for &p in &record.parents {
                    dominated[p] = true;
                }
            }
        }

        maximal
    }

    /// Joins covering a proper subset of two or more leaves.
    fn partial_joins(&self, leaf_count: usize) -> Vec<usize> {
        self.records
            .finalization_order()
            .iter()
            .copied()
            .filter(|&idx| {
                let record = self.records.get(idx);
                let covered = record.origins.count_below(leaf_count);
                record.is_join() && covered >= 2 && covered < leaf_count
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walker::AncestryWalker;
    use mbase_store::HistoryBuilder;
    use mbase_types::RevisionId;

    fn classify(h: &HistoryBuilder, leaves: &[&str], want_spca: bool) -> (Vec<String>, Vec<String>) {
        let ids: Vec<RevisionId> = leaves.iter().map(|l| h.id(l)).collect();
        let records = AncestryWalker::default().walk(h.store(), &ids).unwrap();
        let c = ResultClassifier::classify(&records, records.leaf_count(), want_spca).unwrap();

        let mut lca = h.labels(c.lca.iter().map(|&i| &records.get(i).id));
        let mut spca = h.labels(c.spca.iter().map(|&i| &records.get(i).id));
        lca.sort();
        spca.sort();
        (lca, spca)
    }

    #[test]
    fn fork_has_root_as_lca() {
        let mut h = HistoryBuilder::new();
        h.commit("R", &[]).unwrap();
        h.commit("C", &["R"]).unwrap();
        h.commit("D", &["R"]).unwrap();

        assert_eq!(classify(&h, &["C", "D"], true), (vec!["R".into()], vec![]));
    }

    #[test]
    fn ancestor_leaf_is_its_own_lca() {
        let mut h = HistoryBuilder::new();
        h.commit("R", &[]).unwrap();
        h.commit("A", &["R"]).unwrap();
        h.commit("B", &["A"]).unwrap();

        assert_eq!(classify(&h, &["B", "A"], false).0, vec!["A".to_string()]);
    }

    #[test]
    fn nearest_common_ancestor_wins_over_older_ones() {
        let mut h = HistoryBuilder::new();
        h.commit("R", &[]).unwrap();
        h.commit("P", &["R"]).unwrap();
        h.commit("X", &["P"]).unwrap();
        h.commit("Y", &["P"]).unwrap();

        assert_eq!(classify(&h, &["X", "Y"], false).0, vec!["P".to_string()]);
    }

    #[test]
    fn criss_cross_reduces_to_root() {
        let mut h = HistoryBuilder::new();
        h.commit("R", &[]).unwrap();
        h.commit("A1", &["R"]).unwrap();
        h.commit("B1", &["R"]).unwrap();
        h.commit("A2", &["A1", "B1"]).unwrap();
        h.commit("B2", &["B1", "A1"]).unwrap();

        let (lca, spca) = classify(&h, &["A2", "B2"], true);
        assert_eq!(lca, vec!["R".to_string()]);
        assert_eq!(spca, vec!["A1".to_string(), "B1".to_string()]);
    }

    #[test]
    fn criss_cross_surplus_only_on_request() {
        let mut h = HistoryBuilder::new();
        h.commit("R", &[]).unwrap();
        h.commit("A1", &["R"]).unwrap();
        h.commit("B1", &["R"]).unwrap();
        h.commit("A2", &["A1", "B1"]).unwrap();
        h.commit("B2", &["B1", "A1"]).unwrap();

        let (lca, spca) = classify(&h, &["A2", "B2"], false);
        assert_eq!(lca, vec!["R".to_string()]);
        assert!(spca.is_empty());
    }

    #[test]
    fn unconverged_criss_cross_keeps_multiple_lcas() {
        // Two unrelated roots merged into each other: no single base exists.
        let mut h = HistoryBuilder::new();
        h.commit("A", &[]).unwrap();
        h.commit("B", &[]).unwrap();
        h.commit("X", &["A", "B"]).unwrap();
        h.commit("Y", &["B", "A"]).unwrap();

        let (lca, spca) = classify(&h, &["X", "Y"], true);
        assert_eq!(lca, vec!["A".to_string(), "B".to_string()]);
        assert!(spca.is_empty());
    }

    #[test]
    fn disconnected_leaves_have_no_lca() {
        let mut h = HistoryBuilder::new();
        h.commit("A", &[]).unwrap();
        h.commit("B", &[]).unwrap();

        assert_eq!(classify(&h, &["A", "B"], true), (vec![], vec![]));
    }

    #[test]
    fn three_way_reports_pairwise_joins() {
        //        R
        //      /   \
        //     P     Z
        //    / \
        //   X   Y
        let mut h = HistoryBuilder::new();
        h.commit("R", &[]).unwrap();
        h.commit("P", &["R"]).unwrap();
        h.commit("X", &["P"]).unwrap();
        h.commit("Y", &["P"]).unwrap();
        h.commit("Z", &["R"]).unwrap();

        let (lca, spca) = classify(&h, &["X", "Y", "Z"], true);
        assert_eq!(lca, vec!["R".to_string()]);
        assert_eq!(spca, vec!["P".to_string()]);
    }

    #[test]
    fn partial_joins_are_dropped_when_leaves_are_disconnected() {
        //   P     Z
        //  / \
        // X   Y
        let mut h = HistoryBuilder::new();
        h.commit("P", &[]).unwrap();
        h.commit("X", &["P"]).unwrap();
        h.commit("Y", &["P"]).unwrap();
        h.commit("Z", &[]).unwrap();

        assert_eq!(classify(&h, &["X", "Y", "Z"], true), (vec![], vec![]));
    }

    #[test]
    fn pass_through_ancestors_are_not_partial_joins() {
        let mut h = HistoryBuilder::new();
        h.commit("R", &[]).unwrap();
        h.commit("Q", &["R"]).unwrap();
        h.commit("P", &["Q"]).unwrap();
        h.commit("X", &["P"]).unwrap();
        h.commit("Y", &["P"]).unwrap();
        h.commit("Z", &["R"]).unwrap();

        let (_, spca) = classify(&h, &["X", "Y", "Z"], true);
        assert_eq!(spca, vec!["P".to_string()]);
    }

    #[test]
    fn leaf_count_mismatch_is_inconsistent() {
        let mut h = HistoryBuilder::new();
        h.commit("R", &[]).unwrap();
        h.commit("C", &["R"]).unwrap();
        let records = AncestryWalker::default()
            .walk(h.store(), &[h.id("C"), h.id("R")])
            .unwrap();
        assert!(matches!(
            ResultClassifier::classify(&records, 3, false),
            Err(AncestryError::Inconsistent(_))
        ));
    }
}
