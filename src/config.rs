//! Resolver configuration
//!
//! Tunables for the translator. Every field has a default, so an empty YAML
//! or JSON document yields [`ResolverConfig::default`].

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Tolerance (in minimae) for capacity and remainder checks
    pub tolerance: f64,

    /// Retry once with minima-per-brevis doubled when no assignment fits
    pub allow_doubling: bool,

    /// How deep the multi-downstem sub-problem may recurse
    pub max_recursion_depth: usize,

    /// Bound on independent semiminima-rest runs per trial (2^n variants)
    pub max_rest_runs: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-4,
            allow_doubling: true,
            max_recursion_depth: 1,
            max_rest_runs: 12,
        }
    }
}

impl ResolverConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: ResolverConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: ResolverConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.json` file, or YAML for any other extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));

        log::debug!("Loading resolver config from {}", path.display());
        if is_json {
            Self::from_json_str(&contents)
        } else {
            Self::from_yaml_str(&contents)
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "tolerance must be a positive number, got {}",
                self.tolerance
            )));
        }
        if self.max_rest_runs > 20 {
            return Err(ConfigError::Invalid(format!(
                "max_rest_runs {} would enumerate more than 2^20 variants",
                self.max_rest_runs
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_yaml_is_default() {
        let config = ResolverConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, ResolverConfig::default());
    }

    #[test]
    fn test_partial_yaml_override() {
        let config = ResolverConfig::from_yaml_str("allow_doubling: false\ntolerance: 0.001\n").unwrap();
        assert!(!config.allow_doubling);
        assert_eq!(config.tolerance, 0.001);
        assert_eq!(config.max_recursion_depth, 1);
    }

    #[test]
    fn test_rejects_non_positive_tolerance() {
        let err = ResolverConfig::from_json_str(r#"{"tolerance": 0.0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_from_file_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("resolver.json");
        let mut f = std::fs::File::create(&json_path).unwrap();
        write!(f, r#"{{"max_recursion_depth": 0}}"#).unwrap();
        assert_eq!(ResolverConfig::from_file(&json_path).unwrap().max_recursion_depth, 0);

        let yaml_path = dir.path().join("resolver.yaml");
        std::fs::write(&yaml_path, "max_rest_runs: 4\n").unwrap();
        assert_eq!(ResolverConfig::from_file(&yaml_path).unwrap().max_rest_runs, 4);
    }

    #[test]
    fn test_missing_file() {
        let err = ResolverConfig::from_file("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
