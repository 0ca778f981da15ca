//! Per-path merge-base selection.
//!
//! Builds on [`mbase_dag`]: once the LCA and SPCA sets of a merge are known,
//! [`MergeBaseSelector`] decides, path by path, which ancestor supplies the
//! base content for a three-way merge of two leaves.

pub mod config;
pub mod error;
pub mod selector;

pub use config::SelectorConfig;
pub use error::{MergeError, MergeResult};
pub use selector::{MergeBase, MergeBaseSelector, select_merge_base};
