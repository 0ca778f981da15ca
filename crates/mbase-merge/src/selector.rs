//! Per-path merge-base selection.
//!
//! An [`AncestryResult`] says which revisions are common ancestors of the
//! merged leaves; it does not say which of them should supply the base
//! content for one particular path. [`MergeBaseSelector`] answers that:
//!
//! 1. A unique LCA that holds the path supplies it directly, unless the
//!    pair has a nearer common ancestor of its own among the SPCA entries
//!    (an N-way query where only some leaves share a join).
//! 2. Otherwise the LCA set, the SPCA entries shared by both leaves of the
//!    pair, and all their ancestors are searched for the *nearest* revisions
//!    holding the path: those with no descendant in the searched set that
//!    also holds it.
//! 3. Candidates that agree on content settle the base. If there is more
//!    than one, the smallest identifier is reported as the source and the
//!    result is marked `tie_broken`.
//! 4. No candidate at all means the path has no base. Disconnected leaves
//!    have no LCA and no SPCA, so every path ends up here.
//! 5. Candidates that disagree are resolved against each other, and the
//!    search repeats on their own ancestry, up to
//!    [`SelectorConfig::max_rounds`] times.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use mbase_dag::{AncestryConfig, AncestryResolver, AncestryResult, Subgraph};
use mbase_store::RevisionStore;
use mbase_types::{ContentId, RepoPath, RevisionId};

use crate::config::SelectorConfig;
use crate::error::{MergeError, MergeResult};

/// The merge base chosen for one path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeBase {
    /// Base content, or `None` when no common ancestor holds the path.
    pub content: Option<ContentId>,
    /// Several nearest ancestors held identical content and `source` was
    /// picked among them by identifier.
    pub tie_broken: bool,
    /// Revision whose content was chosen.
    pub source: Option<RevisionId>,
}

impl MergeBase {
    fn absent() -> Self {
        Self {
            content: None,
            tie_broken: false,
            source: None,
        }
    }

    fn chosen(source: RevisionId, content: ContentId, tie_broken: bool) -> Self {
        Self {
            content: Some(content),
            tie_broken,
            source: Some(source),
        }
    }

    /// Returns `true` when the path has no base, so both sides introduced it
    /// independently.
    pub fn is_existence_conflict(&self) -> bool {
        self.content.is_none()
    }
}

enum Step {
    Settled(MergeBase),
    Divergent(Vec<RevisionId>),
}

/// Picks base content for a path given an ancestry result.
#[derive(Clone, Debug, Default)]
pub struct MergeBaseSelector {
    config: SelectorConfig,
}

impl MergeBaseSelector {
    pub fn new(config: SelectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// Select the merge base of `path` for `leaf_pair`.
    ///
    /// `ancestry` must have been resolved (with SPCA) for a leaf set that
    /// contains both leaves of the pair. The selector only reads the store,
    /// so repeated calls give the same answer.
    ///
    /// Each round loads the ancestry below its start revisions and reads
    /// `path` from every revision not shadowed by a nearer holder. A path no
    /// ancestor holds therefore costs a walk of the whole shared history,
    /// bounded by [`AncestryConfig::max_visited`] in
    /// [`SelectorConfig::ancestry`].
    pub fn select<S: RevisionStore + ?Sized>(
        &self,
        store: &S,
        leaf_pair: [RevisionId; 2],
        path: &RepoPath,
        ancestry: &AncestryResult,
    ) -> MergeResult<MergeBase> {
        for leaf in &leaf_pair {
            if !ancestry.leaves().contains(leaf) {
                return Err(MergeError::LeafNotInAncestry(*leaf));
            }
        }

        let resolver = AncestryResolver::new(self.config.ancestry.clone());
        let mut required = leaf_pair.to_vec();
        let mut resolved: Option<AncestryResult> = None;
        let mut rounds = 0;

        loop {
            let current = resolved.as_ref().unwrap_or(ancestry);
            match self.step(store, &required, path, current)? {
                Step::Settled(base) => {
                    debug!(
                        path = %path,
                        source = ?base.source,
                        tie_broken = base.tie_broken,
                        rounds,
                        "merge base selected"
                    );
                    return Ok(base);
                }
                Step::Divergent(candidates) => {
                    if rounds >= self.config.max_rounds {
                        warn!(path = %path, rounds, "merge-base candidates never converged");
                        return Err(MergeError::Unresolvable {
                            path: path.clone(),
                            rounds,
                        });
                    }
                    rounds += 1;
                    debug!(
                        path = %path,
                        candidates = candidates.len(),
                        round = rounds,
                        "re-resolving divergent merge-base candidates"
                    );
                    resolved = Some(resolver.resolve(store, &candidates, true)?);
                    required = candidates;
                }
            }
        }
    }

    fn step<S: RevisionStore + ?Sized>(
        &self,
        store: &S,
        required: &[RevisionId],
        path: &RepoPath,
        ancestry: &AncestryResult,
    ) -> MergeResult<Step> {
        let shared: Vec<RevisionId> = ancestry
            .spca()
            .iter()
            .filter(|id| ancestry.covers(id, required))
            .copied()
            .collect();
        // SPCA entries covering the pair but not every leaf sit nearer to the
        // pair than the LCA of the whole leaf set.
        let pair_local = shared
            .iter()
            .any(|id| !ancestry.covers(id, ancestry.leaves()));

        if let Some(lca) = ancestry.unique_lca().filter(|_| !pair_local) {
            if let Some(content) = store.path_content(&lca, path)? {
                return Ok(Step::Settled(MergeBase::chosen(lca, content, false)));
            }
        }

        let mut starts = ancestry.lca().to_vec();
        starts.extend(shared);
        if starts.is_empty() {
            return Ok(Step::Settled(MergeBase::absent()));
        }

        let candidates = nearest_holding(store, &starts, path, &self.config.ancestry)?;
        let Some(&(first, content)) = candidates.first() else {
            return Ok(Step::Settled(MergeBase::absent()));
        };
        if candidates.iter().all(|(_, c)| *c == content) {
            Ok(Step::Settled(MergeBase::chosen(
                first,
                content,
                candidates.len() > 1,
            )))
        } else {
            Ok(Step::Divergent(
                candidates.into_iter().map(|(id, _)| id).collect(),
            ))
        }
    }
}

/// Revisions reachable from `starts` that hold `path` and have no descendant
/// in that reachable set which also holds it. Sorted by identifier.
fn nearest_holding<S: RevisionStore + ?Sized>(
    store: &S,
    starts: &[RevisionId],
    path: &RepoPath,
    config: &AncestryConfig,
) -> MergeResult<Vec<(RevisionId, ContentId)>> {
    let graph = Subgraph::discover(store, starts, config)?;
    let mut shadowed = vec![false; graph.len()];
    let mut found = Vec::new();

    for idx in graph.topological_order() {
        let node = graph.node(idx);
        if !shadowed[idx] {
            if let Some(content) = store.path_content(&node.id, path)? {
                trace!(revision = %node.id.short_hex(), "merge-base candidate");
                found.push((node.id, content));
                shadowed[idx] = true;
            }
        }
        if shadowed[idx] {
            for &p in &node.parents {
                shadowed[p] = true;
            }
        }
    }

    found.sort_by_key(|(id, _)| *id);
    Ok(found)
}

/// Select the merge base of `path` for `leaf_pair` with the default
/// configuration.
///
/// ```
/// use mbase_dag::resolve_ancestry;
/// use mbase_merge::select_merge_base;
/// use mbase_store::HistoryBuilder;
/// use mbase_types::{ContentId, RepoPath};
///
/// let mut h = HistoryBuilder::new();
/// h.commit_with("R", &[], &[("notes.txt", "base")]).unwrap();
/// let x = h.commit_with("X", &["R"], &[("notes.txt", "ours")]).unwrap();
/// let y = h.commit_with("Y", &["R"], &[("notes.txt", "theirs")]).unwrap();
///
/// let ancestry = resolve_ancestry(h.store(), &[x, y], true).unwrap();
/// let path = RepoPath::new("notes.txt").unwrap();
/// let base = select_merge_base(h.store(), [x, y], &path, &ancestry).unwrap();
/// assert_eq!(base.content, Some(ContentId::from_bytes(b"base")));
/// assert!(!base.tie_broken);
/// ```
pub fn select_merge_base<S: RevisionStore + ?Sized>(
    store: &S,
    leaf_pair: [RevisionId; 2],
    path: &RepoPath,
    ancestry: &AncestryResult,
) -> MergeResult<MergeBase> {
    MergeBaseSelector::default().select(store, leaf_pair, path, ancestry)
}
