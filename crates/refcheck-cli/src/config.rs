//! Config - Configuration File Handling
//!
//! Loads harness settings from `refcheck.toml`.
//!
//! @version 0.1.0
//! @author `AutomataNexus` Development Team

use std::path::Path;

use refcheck_onnx::HarnessConfig;
use serde::{Deserialize, Serialize};

use crate::error::{CliError, CliResult};

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "refcheck.toml";

// =============================================================================
// Project Configuration
// =============================================================================

/// Project configuration (refcheck.toml)
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct ProjectConfig {
    /// Harness settings
    #[serde(default)]
    pub harness: HarnessConfig,
}

impl ProjectConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> CliResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> CliResult<Self> {
        let config: ProjectConfig = toml::from_str(content)?;
        if config.harness.decimal > 15 {
            return Err(CliError::Config(format!(
                "decimal must be at most 15, got {}",
                config.harness.decimal
            )));
        }
        Ok(config)
    }

    /// Loads `path` if given, else `refcheck.toml` if present, else defaults.
    pub fn discover(path: Option<&Path>) -> CliResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Self::load(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full() {
        let config = ProjectConfig::parse(
            r#"
[harness]
decimal = 4
seed = 9
filter = "maxpool"
parallel = true
"#,
        )
        .unwrap();
        assert_eq!(config.harness.decimal, 4);
        assert_eq!(config.harness.seed, 9);
        assert_eq!(config.harness.filter.as_deref(), Some("maxpool"));
        assert!(config.harness.parallel);
    }

    #[test]
    fn test_parse_defaults() {
        let config = ProjectConfig::parse("").unwrap();
        assert_eq!(config.harness, HarnessConfig::default());
    }

    #[test]
    fn test_parse_rejects_bad_values() {
        assert!(ProjectConfig::parse("[harness]\ndecimal = \"five\"").is_err());
        assert!(ProjectConfig::parse("[harness]\ndecimal = 40").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let result = ProjectConfig::load("/nonexistent/refcheck.toml");
        assert!(matches!(result, Err(CliError::Config(_))));
    }
}
