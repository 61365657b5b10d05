//! Engine facade.
//!
//! [`ModelingEngine`] holds a validated [`EngineConfig`] and exposes one
//! method per capability. Every response passes through
//! [`TransportSafe::sanitize_for_transport`] before it is returned.
//!
//! # Examples
//!
//! ```
//! use u_modeling::engine::ModelingEngine;
//! use u_modeling::linalg::{MatrixOperation, MatrixOutput, MatrixRequest};
//! use u_modeling::EngineConfig;
//!
//! let engine = ModelingEngine::new(EngineConfig::default()).unwrap();
//! let request = MatrixRequest {
//!     matrix_a: vec![vec![2.0, 0.0], vec![0.0, 3.0]],
//!     matrix_b: None,
//!     operation: MatrixOperation::Determinant,
//! };
//! match engine.matrix_operation(&request).unwrap() {
//!     MatrixOutput::Scalar { result } => assert!((result - 6.0).abs() < 1e-12),
//!     other => panic!("unexpected output: {other:?}"),
//! }
//! ```

use crate::config::EngineConfig;
use crate::correlation::{
    analyze_labeled, correlation_report, pearson_matrix, CellValue, CorrelationAnalysis,
    CorrelationMethod, CorrelationReport,
};
use crate::error::{ModelingError, Result};
use crate::forecast::{self, ForecastRequest, ForecastResult};
use crate::linalg::{self, MatrixOperation, MatrixOutput, MatrixRequest, NumericMatrix};
use crate::pca::{self, PcaResult};
use crate::prediction::{self, PredictionRequest, PredictionResult};
use crate::regression::{self, RegressionRequest, RegressionResult};
use crate::sanitize::TransportSafe;

/// Stateless modeling engine.
///
/// Immutable after construction; share it freely across threads.
#[derive(Debug, Clone)]
pub struct ModelingEngine {
    config: EngineConfig,
}

impl Default for ModelingEngine {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }
}

impl ModelingEngine {
    /// Creates an engine after validating `config`.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs one matrix operation.
    ///
    /// # Errors
    ///
    /// `MissingParameters` when a binary operation has no `matrix_b`, plus
    /// the shape errors of the underlying operation.
    pub fn matrix_operation(&self, request: &MatrixRequest) -> Result<MatrixOutput> {
        let a = &request.matrix_a;
        let op = request.operation;
        log::debug!("matrix operation {op}");

        let output = match (op, request.matrix_b.as_ref()) {
            (MatrixOperation::Add, Some(b)) => MatrixOutput::Matrix {
                result: linalg::add(a, b)?,
            },
            (MatrixOperation::Subtract, Some(b)) => MatrixOutput::Matrix {
                result: linalg::subtract(a, b)?,
            },
            (MatrixOperation::Multiply, Some(b)) => MatrixOutput::Matrix {
                result: linalg::multiply(a, b)?,
            },
            (MatrixOperation::Transpose, _) => MatrixOutput::Matrix {
                result: linalg::transpose(a)?,
            },
            (MatrixOperation::Determinant, _) => MatrixOutput::Scalar {
                result: linalg::determinant(a)?,
            },
            (MatrixOperation::Inverse, _) => MatrixOutput::Matrix {
                result: linalg::inverse(a)?,
            },
            (MatrixOperation::Eigenvalues, _) => MatrixOutput::Eigenvalues {
                result: linalg::eigenvalues(a)?,
            },
            (MatrixOperation::Svd, _) => MatrixOutput::Svd(linalg::svd(a)?),
            (MatrixOperation::Pca, _) => MatrixOutput::Pca(pca::pca(a)?),
            (MatrixOperation::Correlation, _) => MatrixOutput::Matrix {
                result: pearson_matrix(a)?,
            },
            // Binary operations without a second operand.
            (_, None) => {
                return Err(ModelingError::MissingParameters(format!(
                    "operation '{op}' requires matrix_b"
                )))
            }
        };
        Ok(output.sanitize_for_transport())
    }

    /// Pairwise correlation report of the columns of `data`.
    pub fn correlation(
        &self,
        data: &NumericMatrix,
        columns: &[String],
        method: CorrelationMethod,
    ) -> Result<CorrelationReport> {
        log::debug!("{method} correlation report");
        Ok(correlation_report(data, columns, method)?.sanitize_for_transport())
    }

    /// Correlation analysis of a labeled table, interpreted at the
    /// configured significance level.
    pub fn correlation_analysis(
        &self,
        columns: &[String],
        rows: &[Vec<CellValue>],
    ) -> Result<CorrelationAnalysis> {
        Ok(analyze_labeled(columns, rows, self.config.significance_level)?
            .sanitize_for_transport())
    }

    pub fn pca(&self, data: &NumericMatrix) -> Result<PcaResult> {
        Ok(pca::pca(data)?.sanitize_for_transport())
    }

    /// Fits a regression model with full diagnostics.
    pub fn regression(&self, request: &RegressionRequest) -> Result<RegressionResult> {
        log::debug!(
            "{} regression on {} observations",
            request.regression_type,
            request.dependent.len()
        );
        Ok(regression::fit(request, &self.config)?.sanitize_for_transport())
    }

    /// Predicts one observation against a previously fitted model.
    pub fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult> {
        Ok(prediction::predict(request)?.sanitize_for_transport())
    }

    /// Forecasts a time series.
    pub fn forecast(&self, request: &ForecastRequest) -> Result<ForecastResult> {
        Ok(forecast::forecast(request, &self.config)?.sanitize_for_transport())
    }
}
