//! Selector configuration.

use serde::{Deserialize, Serialize};

use mbase_dag::AncestryConfig;

use crate::error::{MergeError, MergeResult};

/// Configuration for [`MergeBaseSelector`](crate::MergeBaseSelector).
///
/// ```toml
/// max_rounds = 4
///
/// [ancestry]
/// max_visited = 250000
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SelectorConfig {
    /// Budget for every walk the selector performs. Each selection round
    /// loads the whole history below its start revisions, so this also caps
    /// the cost of a path that no common ancestor holds.
    pub ancestry: AncestryConfig,
    /// How many times divergent candidates may be re-resolved before the
    /// selector gives up (default: 8).
    pub max_rounds: usize,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            ancestry: AncestryConfig::default(),
            max_rounds: 8,
        }
    }
}

impl SelectorConfig {
    /// Parse from TOML. Missing keys take their default values.
    pub fn from_toml_str(s: &str) -> MergeResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| MergeError::Config(e.to_string()))?;
        config.ancestry.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SelectorConfig::default();
        assert_eq!(config.max_rounds, 8);
        assert_eq!(config.ancestry, AncestryConfig::default());
    }

    #[test]
    fn parses_nested_ancestry_table() {
        let config = SelectorConfig::from_toml_str(
            "max_rounds = 2\n\n[ancestry]\nmax_visited = 99\n",
        )
        .unwrap();
        assert_eq!(config.max_rounds, 2);
        assert_eq!(config.ancestry.max_visited, 99);
    }

    #[test]
    fn invalid_ancestry_budget_is_rejected() {
        assert!(matches!(
            SelectorConfig::from_toml_str("[ancestry]\nmax_visited = 0\n"),
            Err(MergeError::Ancestry(_))
        ));
        assert!(matches!(
            SelectorConfig::from_toml_str("rounds = 3"),
            Err(MergeError::Config(_))
        ));
    }
}
