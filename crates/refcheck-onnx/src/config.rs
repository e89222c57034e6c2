//! Config - Harness Settings
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use serde::{Deserialize, Serialize};

use crate::harness::DEFAULT_DECIMAL;

/// How a conformance run compares and selects cases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Decimal places outputs must agree to
    #[serde(default = "default_decimal")]
    pub decimal: u32,

    /// Seed for randomly generated case inputs
    #[serde(default)]
    pub seed: u64,

    /// Only run cases whose name contains this substring
    #[serde(default)]
    pub filter: Option<String>,

    /// Run cases on the rayon thread pool
    #[serde(default)]
    pub parallel: bool,
}

fn default_decimal() -> u32 {
    DEFAULT_DECIMAL
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            decimal: default_decimal(),
            seed: 0,
            filter: None,
            parallel: false,
        }
    }
}

impl HarnessConfig {
    /// Returns true if the case named `name` passes the filter.
    pub fn selects(&self, name: &str) -> bool {
        self.filter.as_deref().map_or(true, |f| name.contains(f))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HarnessConfig::default();
        assert_eq!(config.decimal, 5);
        assert_eq!(config.seed, 0);
        assert!(config.selects("anything"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: HarnessConfig = serde_json::from_str(r#"{"filter": "maxpool"}"#).unwrap();
        assert_eq!(config.decimal, 5);
        assert!(config.selects("maxpool_2d_pads"));
        assert!(!config.selects("averagepool_2d_pads"));
    }
}
