/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Configuration for neighbor graph construction

use super::errors::{GraphError, Result};
use serde::{Deserialize, Serialize};

/// How periodic images of the same target atom are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImagePolicy {
    /// Every image within the cutoff is a separate neighbor
    #[default]
    AllImages,
    /// Only the closest image of each distinct target atom is kept
    ClosestImage,
}

/// Gaussian radial basis expansion of edge distances
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RbfConfig {
    /// Whether edge distances are expanded at all
    pub enabled: bool,
    /// Number of evenly spaced centers over [0, cutoff]
    pub num_centers: usize,
    /// Gaussian width; defaults to a third of the cutoff
    pub sigma: Option<f64>,
    /// Scale each Gaussian by 1 / (σ√(2π))
    pub normalize: bool,
}

impl Default for RbfConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            num_centers: 100,
            sigma: None,
            normalize: false,
        }
    }
}

/// Neighbor graph configuration
///
/// Every field has a default, so a partial JSON document such as
/// `{"image_policy": "closest_image"}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Treatment of multiple images of one target atom
    pub image_policy: ImagePolicy,
    /// Deepest replication shell the index may be widened to
    pub max_shell_depth: u32,
    /// Whether rayon is used for image generation and neighbor queries
    pub parallel: bool,
    /// Atom count below which the serial path is used
    pub parallel_threshold: usize,
    /// Edge distance encoding
    pub rbf: RbfConfig,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            image_policy: ImagePolicy::AllImages,
            max_shell_depth: 4,
            parallel: true,
            parallel_threshold: 64,
            rbf: RbfConfig::default(),
        }
    }
}

impl GraphConfig {
    /// Parse a configuration from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)
            .map_err(|e| GraphError::InvalidParameter(format!("configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration values are usable
    pub fn validate(&self) -> Result<()> {
        if self.max_shell_depth == 0 {
            return Err(GraphError::InvalidParameter(
                "max_shell_depth must be at least 1".to_string(),
            ));
        }
        if self.rbf.enabled && self.rbf.num_centers == 0 {
            return Err(GraphError::InvalidParameter(
                "rbf.num_centers must be at least 1".to_string(),
            ));
        }
        if let Some(sigma) = self.rbf.sigma {
            if !(sigma.is_finite() && sigma > 0.0) {
                return Err(GraphError::InvalidParameter(format!(
                    "rbf.sigma must be positive, got {}",
                    sigma
                )));
            }
        }
        Ok(())
    }

    /// Whether a structure with `num_atoms` atoms takes the parallel path
    pub fn use_parallel(&self, num_atoms: usize) -> bool {
        self.parallel && num_atoms >= self.parallel_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GraphConfig::default();
        assert_eq!(config.image_policy, ImagePolicy::AllImages);
        assert_eq!(config.max_shell_depth, 4);
        assert!(!config.rbf.enabled);
        assert!(config.validate().is_ok());
        assert!(config.use_parallel(64));
        assert!(!config.use_parallel(63));
    }

    #[test]
    fn test_partial_json() {
        let config =
            GraphConfig::from_json(r#"{"image_policy": "closest_image", "rbf": {"enabled": true}}"#)
                .unwrap();
        assert_eq!(config.image_policy, ImagePolicy::ClosestImage);
        assert!(config.rbf.enabled);
        assert_eq!(config.rbf.num_centers, 100);
        assert_eq!(config.max_shell_depth, 4);
    }

    #[test]
    fn test_invalid_json() {
        assert!(GraphConfig::from_json(r#"{"max_shell_depth": 0}"#).is_err());
        assert!(GraphConfig::from_json(r#"{"rbf": {"sigma": -1.0}}"#).is_err());
        assert!(GraphConfig::from_json("not json").is_err());
    }
}
