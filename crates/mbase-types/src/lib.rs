//! Foundation types for mbase.
//!
//! Every other mbase crate depends on `mbase-types`.
//!
//! # Key Types
//!
//! - [`RevisionId`]: Content-addressed identifier of a revision (BLAKE3)
//! - [`ContentId`]: Content-addressed identifier of a path's content
//! - [`RepoPath`]: Validated repository-relative path

pub mod error;
pub mod id;
pub mod path;

pub use error::TypeError;
pub use id::{ContentId, RevisionId};
pub use path::RepoPath;
