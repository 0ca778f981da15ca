//! Resolver configuration.

use serde::{Deserialize, Serialize};

use crate::error::{AncestryError, Result};

/// Configuration for [`AncestryResolver`](crate::AncestryResolver).
///
/// ```toml
/// max_visited = 250000
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AncestryConfig {
    /// Maximum number of distinct revisions a single walk may load before it
    /// aborts with [`AncestryError::TooComplex`] (default: 1,000,000).
    pub max_visited: usize,
}

impl Default for AncestryConfig {
    fn default() -> Self {
        Self {
            max_visited: 1_000_000,
        }
    }
}

impl AncestryConfig {
    /// Parse from TOML. Missing keys take their default values.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).map_err(|e| AncestryError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_visited == 0 {
            return Err(AncestryError::Config("max_visited must be at least 1".into()));
        }
        Ok(())
    }
}
