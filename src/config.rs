//! Engine configuration.
//!
//! All tunables that the numeric components need are carried in an explicit
//! [`EngineConfig`] handed to [`crate::engine::ModelingEngine::new`]; nothing
//! is read from process-wide state.
//!
//! # Examples
//!
//! ```
//! use u_modeling::config::EngineConfig;
//!
//! let config = EngineConfig::default()
//!     .with_ridge_alpha(0.5)
//!     .with_max_iterations(200);
//! assert!(config.validate().is_ok());
//! assert_eq!(config.ridge_alpha, 0.5);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ModelingError, Result};

/// Numeric configuration shared by every engine component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Numeric tolerance for convergence and near-singularity checks.
    pub tolerance: f64,
    /// Iteration cap for iterative solvers (lasso, logistic, Nelder-Mead).
    pub max_iterations: usize,
    /// L2 penalty for ridge regression.
    pub ridge_alpha: f64,
    /// L1 penalty for lasso regression.
    pub lasso_alpha: f64,
    /// Inverse L2 regularization strength for logistic regression.
    pub logistic_c: f64,
    /// VIF above this value raises the collinearity warning.
    pub vif_warning_threshold: f64,
    /// Value reported in place of an unbounded VIF.
    pub vif_ceiling: f64,
    /// Significance level used when interpreting p-values.
    pub significance_level: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 1000,
            ridge_alpha: 1.0,
            lasso_alpha: 0.1,
            logistic_c: 1.0,
            vif_warning_threshold: 5.0,
            vif_ceiling: 10.0,
            significance_level: 0.05,
        }
    }
}

impl EngineConfig {
    /// Sets the numeric tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the iteration cap for iterative solvers.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the ridge penalty.
    pub fn with_ridge_alpha(mut self, alpha: f64) -> Self {
        self.ridge_alpha = alpha;
        self
    }

    /// Sets the lasso penalty.
    pub fn with_lasso_alpha(mut self, alpha: f64) -> Self {
        self.lasso_alpha = alpha;
        self
    }

    /// Sets the logistic inverse regularization strength.
    pub fn with_logistic_c(mut self, c: f64) -> Self {
        self.logistic_c = c;
        self
    }

    /// Checks that every field is finite and in range.
    pub fn validate(&self) -> Result<()> {
        positive("tolerance", self.tolerance)?;
        if self.max_iterations == 0 {
            return Err(ModelingError::InvalidConfig {
                name: "max_iterations",
                reason: "must be at least 1".to_string(),
            });
        }
        non_negative("ridge_alpha", self.ridge_alpha)?;
        non_negative("lasso_alpha", self.lasso_alpha)?;
        positive("logistic_c", self.logistic_c)?;
        positive("vif_warning_threshold", self.vif_warning_threshold)?;
        positive("vif_ceiling", self.vif_ceiling)?;
        if !(self.significance_level > 0.0 && self.significance_level < 1.0) {
            return Err(ModelingError::InvalidConfig {
                name: "significance_level",
                reason: "must be between 0 and 1 (exclusive)".to_string(),
            });
        }
        Ok(())
    }
}

fn positive(name: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ModelingError::InvalidConfig {
            name,
            reason: format!("must be positive and finite, got {value}"),
        });
    }
    Ok(())
}

fn non_negative(name: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ModelingError::InvalidConfig {
            name,
            reason: format!("must be non-negative and finite, got {value}"),
        });
    }
    Ok(())
}
