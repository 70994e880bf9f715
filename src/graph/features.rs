/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Gaussian radial basis expansion of edge distances

use super::config::RbfConfig;
use super::errors::{GraphError, Result};
use ndarray::Array2;
use std::f64::consts::PI;

/// Expands a scalar distance into Gaussian responses at fixed centers
///
/// Component `k` is `exp(-(d - μ_k)² / (2σ²))`, optionally scaled by
/// `1 / (σ√(2π))`. Centers are evenly spaced over `[0, r_cutoff]`.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianRbf {
    centers: Vec<f64>,
    sigma: f64,
    normalize: bool,
}

impl GaussianRbf {
    /// Create an expansion with `num_centers` centers over `[0, r_cutoff]`
    pub fn new(r_cutoff: f64, num_centers: usize, sigma: f64) -> Result<Self> {
        if !(r_cutoff.is_finite() && r_cutoff > 0.0) {
            return Err(GraphError::InvalidParameter(format!(
                "RBF cutoff must be positive, got {}",
                r_cutoff
            )));
        }
        if num_centers == 0 {
            return Err(GraphError::InvalidParameter(
                "RBF needs at least one center".to_string(),
            ));
        }
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(GraphError::InvalidParameter(format!(
                "RBF width must be positive, got {}",
                sigma
            )));
        }

        let centers = if num_centers == 1 {
            vec![0.0]
        } else {
            let step = r_cutoff / (num_centers - 1) as f64;
            (0..num_centers).map(|k| k as f64 * step).collect()
        };

        Ok(Self {
            centers,
            sigma,
            normalize: false,
        })
    }

    /// Build the expansion described by `config` for a given cutoff
    ///
    /// The width defaults to a third of the cutoff.
    pub fn from_config(config: &RbfConfig, r_cutoff: f64) -> Result<Self> {
        let sigma = config.sigma.unwrap_or(r_cutoff / 3.0);
        let mut rbf = Self::new(r_cutoff, config.num_centers, sigma)?;
        rbf.normalize = config.normalize;
        Ok(rbf)
    }

    /// Scale responses into normalized Gaussian densities
    pub fn normalized(mut self) -> Self {
        self.normalize = true;
        self
    }

    /// Center positions μ_k
    pub fn centers(&self) -> &[f64] {
        &self.centers
    }

    /// Number of components per distance
    pub fn num_centers(&self) -> usize {
        self.centers.len()
    }

    /// Gaussian width σ
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Expand one distance
    pub fn expand(&self, distance: f64) -> Vec<f64> {
        let inv_two_sigma_sq = 1.0 / (2.0 * self.sigma * self.sigma);
        let norm = if self.normalize {
            1.0 / (self.sigma * (2.0 * PI).sqrt())
        } else {
            1.0
        };
        self.centers
            .iter()
            .map(|mu| norm * (-(distance - mu).powi(2) * inv_two_sigma_sq).exp())
            .collect()
    }

    /// Expand many distances into a (distances × centers) matrix
    pub fn expand_all(&self, distances: &[f64]) -> Array2<f64> {
        let mut features = Array2::<f64>::zeros((distances.len(), self.centers.len()));
        for (mut row, &d) in features.rows_mut().into_iter().zip(distances) {
            for (value, g) in row.iter_mut().zip(self.expand(d)) {
                *value = g;
            }
        }
        features
    }
}
