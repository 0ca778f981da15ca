//! Revision storage for mbase.
//!
//! Ancestry resolution treats the history graph as read-only. Everything it
//! needs from storage goes through the [`RevisionStore`] trait: the parent
//! list of a revision, and the content a revision holds at a path.
//!
//! # Backends
//!
//! - [`InMemoryRevisionStore`] -- `HashMap`-based store for tests and
//!   embedding, with JSON snapshot import/export
//!
//! [`HistoryBuilder`] builds in-memory histories from labelled commits.

pub mod builder;
pub mod error;
pub mod memory;
pub mod revision;
pub mod traits;

pub use builder::HistoryBuilder;
pub use error::{StoreError, StoreResult};
pub use memory::{InMemoryRevisionStore, StoreSnapshot};
pub use revision::Revision;
pub use traits::RevisionStore;
