//! # u-modeling
//!
//! Statistical modeling and forecasting: regression with inferential
//! diagnostics, prediction against fitted models, correlation and principal
//! component analysis, and time-series forecasting with automatic
//! seasonality and method selection.
//!
//! The crate operates on clean numeric inputs (`Vec<Vec<f64>>`, dated
//! series) and returns serde-serializable records. Transport, request
//! routing and data cleaning belong to the caller.
//!
//! ## Modules
//!
//! - [`engine`]: [`ModelingEngine`] facade, one method per capability
//! - [`linalg`]: Matrix arithmetic, determinant, inverse, eigenvalues, SVD
//! - [`correlation`]: Pearson, Spearman, Kendall tau-b, correlation reports
//! - [`pca`]: Standardized principal component analysis
//! - [`regression`]: Linear, polynomial, ridge, lasso and logistic fits with
//!   diagnostics (R², F-test, coefficient p-values, VIF, ROC/AUC)
//! - [`prediction`]: Point prediction with equation terms and intervals
//! - [`forecast`]: Seasonality detection, ARIMA(1,1,1), exponential smoothing
//! - [`smoothing`]: Holt and additive Holt-Winters smoothers
//! - [`optimize`]: Nelder-Mead minimization
//! - [`special`], [`stats`]: Distribution functions and descriptive statistics
//! - [`sanitize`]: Non-finite float replacement at the transport boundary
//!
//! ## Design Philosophy
//!
//! - **Explicit configuration**: every tunable lives in [`EngineConfig`]
//! - **Graceful degradation**: statistics that can be undefined fall back to
//!   documented defaults instead of failing the request
//! - **Research-backed**: algorithms reference the literature they implement

pub mod config;
pub mod correlation;
pub mod engine;
pub mod error;
pub mod forecast;
pub mod linalg;
pub mod optimize;
pub mod pca;
pub mod prediction;
pub mod regression;
pub mod sanitize;
pub mod smoothing;
pub mod special;
pub mod stats;

pub use config::EngineConfig;
pub use engine::ModelingEngine;
pub use error::{ModelingError, Result};
