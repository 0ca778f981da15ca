//! Repository-relative path validation.
//!
//! Valid paths:
//! - Must be non-empty
//! - Must not start or end with `/`
//! - Components between slashes must be non-empty, and must not be `.` or `..`
//! - Must not contain NUL

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// A validated, `/`-separated path inside a revision's tree.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepoPath(String);

impl RepoPath {
    /// Validate and wrap a path.
    ///
    /// ```
    /// use mbase_types::RepoPath;
    ///
    /// assert!(RepoPath::new("src/lib.rs").is_ok());
    /// assert!(RepoPath::new("").is_err());
    /// assert!(RepoPath::new("src/../etc").is_err());
    /// ```
    pub fn new(path: impl Into<String>) -> Result<Self, TypeError> {
        let path = path.into();
        let invalid = |reason: &str| TypeError::InvalidPath {
            path: path.clone(),
            reason: reason.into(),
        };

        if path.is_empty() {
            return Err(invalid("path must not be empty"));
        }
        if path.contains('\0') {
            return Err(invalid("contains NUL"));
        }
        if path.starts_with('/') || path.ends_with('/') {
            return Err(invalid("must not start or end with '/'"));
        }
        for component in path.split('/') {
            match component {
                "" => return Err(invalid("empty path component")),
                "." | ".." => return Err(invalid("relative path component")),
                _ => {}
            }
        }

        Ok(Self(path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last component of the path.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Debug for RepoPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RepoPath({:?})", self.0)
    }
}

impl fmt::Display for RepoPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for RepoPath {
    type Error = TypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl Serialize for RepoPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RepoPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_nested_paths() {
        let path = RepoPath::new("src/merge/base.rs").unwrap();
        assert_eq!(path.as_str(), "src/merge/base.rs");
        assert_eq!(path.file_name(), "base.rs");
    }

    #[test]
    fn rejects_malformed_paths() {
        for bad in ["", "/abs", "trailing/", "a//b", "./a", "a/..", "nul\0byte"] {
            assert!(RepoPath::new(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn error_carries_reason() {
        let err = RepoPath::new("a//b").unwrap_err();
        assert_eq!(
            err,
            TypeError::InvalidPath {
                path: "a//b".into(),
                reason: "empty path component".into(),
            }
        );
    }

    #[test]
    fn deserialize_validates() {
        assert!(serde_json::from_str::<RepoPath>("\"ok/path\"").is_ok());
        assert!(serde_json::from_str::<RepoPath>("\"../escape\"").is_err());
    }
}
