//! Regression analysis.
//!
//! Linear, polynomial, ridge, lasso, and binary logistic regression with the
//! full diagnostic suite: R², adjusted R², residual standard error, F-test,
//! coefficient p-values, VIF, and (for logistic models) classification
//! metrics with the ROC curve.
//!
//! # Examples
//!
//! ```
//! use u_modeling::config::EngineConfig;
//! use u_modeling::regression::{fit, Diagnostics, RegressionRequest, RegressionType};
//!
//! let request = RegressionRequest {
//!     regression_type: RegressionType::Linear,
//!     dependent: vec![5.0, 7.0, 9.0, 11.0, 13.0],
//!     independent: vec![vec![1.0], vec![2.0], vec![3.0], vec![4.0], vec![5.0]],
//!     column_names: vec!["x".to_string()],
//!     polynomial_degree: 2,
//! };
//! let result = fit(&request, &EngineConfig::default()).unwrap();
//! assert!((result.model.intercept - 3.0).abs() < 1e-10);
//! assert!((result.model.coefficients[0] - 2.0).abs() < 1e-10);
//! match result.diagnostics {
//!     Diagnostics::Continuous(report) => assert!((report.r_squared - 1.0).abs() < 1e-12),
//!     Diagnostics::Logistic(_) => unreachable!(),
//! }
//! ```

pub mod classification;
pub mod diagnostics;
pub mod least_squares;
pub mod logistic;

use std::fmt;
use std::str::FromStr;

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::{ModelingError, Result};
use crate::linalg::{shape, NumericMatrix};
use crate::sanitize::TransportSafe;

pub use classification::{ClassEntry, ClassMetrics, ClassificationReport, RocPoint};
pub use diagnostics::{VifEntry, VifSummary};

/// Fallback p-value when the coefficient covariance cannot be computed.
pub const FALLBACK_P_VALUE: f64 = 0.05;

/// Default degree of the polynomial expansion.
pub const DEFAULT_POLYNOMIAL_DEGREE: usize = 2;

/// Model family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegressionType {
    #[default]
    Linear,
    Polynomial,
    Ridge,
    Lasso,
    Logistic,
}

impl RegressionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Polynomial => "polynomial",
            Self::Ridge => "ridge",
            Self::Lasso => "lasso",
            Self::Logistic => "logistic",
        }
    }
}

impl fmt::Display for RegressionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegressionType {
    type Err = ModelingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(Self::Linear),
            "polynomial" => Ok(Self::Polynomial),
            "ridge" => Ok(Self::Ridge),
            "lasso" => Ok(Self::Lasso),
            "logistic" => Ok(Self::Logistic),
            other => Err(ModelingError::UnsupportedOperation(other.to_string())),
        }
    }
}

fn default_degree() -> usize {
    DEFAULT_POLYNOMIAL_DEGREE
}

/// A regression request. Rows of `independent` are observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionRequest {
    #[serde(default)]
    pub regression_type: RegressionType,
    pub dependent: Vec<f64>,
    pub independent: NumericMatrix,
    #[serde(default)]
    pub column_names: Vec<String>,
    #[serde(default = "default_degree")]
    pub polynomial_degree: usize,
}

/// Parameters of a fitted model, sufficient to replay predictions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    pub kind: RegressionType,
    pub intercept: f64,
    pub coefficients: Vec<f64>,
    /// Original class values of a logistic model (encoded 0 and 1).
    #[serde(default)]
    pub classes: Option<[f64; 2]>,
    #[serde(default)]
    pub polynomial_degree: Option<usize>,
    /// Residual standard error of a continuous model.
    #[serde(default)]
    pub standard_error: Option<f64>,
}

/// Diagnostics of a continuous (non-logistic) fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticReport {
    pub r_squared: f64,
    pub adjusted_r_squared: f64,
    pub standard_error: f64,
    pub f_statistic: f64,
    pub p_value: f64,
    pub intercept_p_value: f64,
    pub coefficient_p_values: Vec<f64>,
    pub predicted_values: Vec<f64>,
    pub residuals: Vec<f64>,
    pub vif_values: Vec<VifEntry>,
    pub collinearity_warning: bool,
}

/// Diagnostics of a logistic fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticReport {
    pub classes: [f64; 2],
    pub accuracy: f64,
    pub confusion_matrix: [[usize; 2]; 2],
    pub classification_report: ClassificationReport,
    pub auc_score: Option<f64>,
    pub roc_points: Option<Vec<RocPoint>>,
    /// P(class 1) per observation.
    pub predicted_probabilities: Vec<f64>,
    /// Encoded predicted class (0 or 1) per observation.
    pub predicted_classes: Vec<usize>,
    pub vif_values: Vec<VifEntry>,
    pub collinearity_warning: bool,
}

/// Diagnostics by model family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "lowercase")]
pub enum Diagnostics {
    Continuous(DiagnosticReport),
    Logistic(LogisticReport),
}

/// Fitted model with its feature names and diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionResult {
    pub model: FittedModel,
    pub feature_names: Vec<String>,
    pub diagnostics: Diagnostics,
}

// ---------------------------------------------------------------------------
// Fitting
// ---------------------------------------------------------------------------

/// Fits the requested model and computes its diagnostics.
///
/// # Errors
///
/// - `MissingParameters` for an empty target or design.
/// - `ShapeMismatch` when the row count differs from the target length.
/// - `DimensionMismatch` / `InvalidInput` for ragged or non-finite input.
/// - `UnsupportedShape` for polynomial regression on more than one column.
/// - `NotBinary` for logistic regression on a non-binary target.
pub fn fit(request: &RegressionRequest, config: &EngineConfig) -> Result<RegressionResult> {
    let y = &request.dependent;
    if y.is_empty() || request.independent.is_empty() {
        return Err(ModelingError::MissingParameters(
            "dependent and independent variables are required".to_string(),
        ));
    }
    if request.independent.len() != y.len() {
        return Err(ModelingError::ShapeMismatch {
            expected: y.len(),
            actual: request.independent.len(),
        });
    }
    let (rows, cols) = shape(&request.independent)?;
    if y.iter().any(|v| !v.is_finite()) {
        return Err(ModelingError::InvalidInput(
            "dependent variable contains NaN or infinite values".to_string(),
        ));
    }

    let names = feature_names(&request.column_names, cols);
    let x = DMatrix::from_fn(rows, cols, |i, j| request.independent[i][j]);

    let result = match request.regression_type {
        RegressionType::Logistic => fit_logistic(&x, y, names, config)?,
        RegressionType::Polynomial => {
            if cols != 1 {
                return Err(ModelingError::UnsupportedShape(format!(
                    "polynomial regression supports one independent variable, got {cols}"
                )));
            }
            let degree = request.polynomial_degree;
            if degree == 0 {
                return Err(ModelingError::InvalidInput(
                    "polynomial degree must be at least 1".to_string(),
                ));
            }
            let column: Vec<f64> = x.column(0).iter().copied().collect();
            let expanded = least_squares::polynomial_features(&column, degree);
            let expanded_names = (1..=degree).map(|k| format!("{}^{k}", names[0])).collect();
            fit_continuous(
                RegressionType::Polynomial,
                &expanded,
                y,
                expanded_names,
                Some(degree),
                config,
            )?
        }
        kind => fit_continuous(kind, &x, y, names, None, config)?,
    };

    Ok(result.sanitize_for_transport())
}

fn feature_names(column_names: &[String], cols: usize) -> Vec<String> {
    if column_names.len() == cols {
        column_names.to_vec()
    } else {
        (1..=cols).map(|i| format!("X{i}")).collect()
    }
}

fn fit_continuous(
    kind: RegressionType,
    x: &DMatrix<f64>,
    y: &[f64],
    names: Vec<String>,
    polynomial_degree: Option<usize>,
    config: &EngineConfig,
) -> Result<RegressionResult> {
    let target = DVector::from_column_slice(y);
    let fitted = match kind {
        RegressionType::Ridge => least_squares::ridge(x, &target, config.ridge_alpha),
        RegressionType::Lasso => least_squares::lasso(
            x,
            &target,
            config.lasso_alpha,
            config.max_iterations,
            config.tolerance,
        ),
        _ => least_squares::ordinary_least_squares(x, &target),
    }
    .ok_or_else(|| ModelingError::InvalidInput(format!("{kind} regression could not be solved")))?;

    let predicted_values = fitted.predict(x);
    let residuals: Vec<f64> = y
        .iter()
        .zip(predicted_values.iter())
        .map(|(a, b)| a - b)
        .collect();
    let p = x.ncols();
    let stats = diagnostics::fit_statistics(y, &predicted_values, p);

    let (intercept_p_value, coefficient_p_values) = match diagnostics::coefficient_tests(
        x,
        fitted.intercept,
        &fitted.coefficients,
        stats.ssr,
        stats.df,
    ) {
        Some(tests) => (tests.intercept_p_value, tests.coefficient_p_values),
        None => {
            log::warn!("coefficient covariance unavailable, reporting p = {FALLBACK_P_VALUE}");
            (FALLBACK_P_VALUE, vec![FALLBACK_P_VALUE; p])
        }
    };

    let vif = if polynomial_degree.is_none() {
        vif_summary(x, &names, config)
    } else {
        VifSummary::default()
    };

    log::debug!(
        "{kind} fit: n={}, p={p}, r2={:.4}",
        y.len(),
        stats.r_squared
    );

    Ok(RegressionResult {
        model: FittedModel {
            kind,
            intercept: fitted.intercept,
            coefficients: fitted.coefficients,
            classes: None,
            polynomial_degree,
            standard_error: Some(stats.standard_error),
        },
        feature_names: names,
        diagnostics: Diagnostics::Continuous(DiagnosticReport {
            r_squared: stats.r_squared,
            adjusted_r_squared: stats.adjusted_r_squared,
            standard_error: stats.standard_error,
            f_statistic: stats.f_statistic,
            p_value: stats.f_p_value,
            intercept_p_value,
            coefficient_p_values,
            predicted_values,
            residuals,
            vif_values: vif.values,
            collinearity_warning: vif.collinearity_warning,
        }),
    })
}

fn fit_logistic(
    x: &DMatrix<f64>,
    y: &[f64],
    names: Vec<String>,
    config: &EngineConfig,
) -> Result<RegressionResult> {
    let (classes, encoded) = logistic::encode_binary(y)?;
    let fitted = logistic::fit_logistic(
        x,
        &encoded,
        config.logistic_c,
        config.max_iterations,
        config.tolerance,
    )
    .ok_or_else(|| ModelingError::InvalidInput("logistic regression could not be solved".into()))?;

    let predicted_probabilities = fitted.probabilities(x);
    let actual: Vec<usize> = encoded.iter().map(|&v| v as usize).collect();
    let predicted_classes: Vec<usize> = predicted_probabilities
        .iter()
        .map(|&p| usize::from(p >= 0.5))
        .collect();

    let roc_points = classification::roc_curve(&actual, &predicted_probabilities);
    if roc_points.is_none() {
        log::warn!("ROC curve undefined for this sample");
    }
    let auc_score = roc_points.as_deref().map(classification::auc);

    let vif = vif_summary(x, &names, config);

    log::debug!(
        "logistic fit: n={}, iterations={}, converged={}",
        y.len(),
        fitted.iterations,
        fitted.converged
    );

    Ok(RegressionResult {
        model: FittedModel {
            kind: RegressionType::Logistic,
            intercept: fitted.intercept,
            coefficients: fitted.coefficients,
            classes: Some(classes),
            polynomial_degree: None,
            standard_error: None,
        },
        feature_names: names,
        diagnostics: Diagnostics::Logistic(LogisticReport {
            classes,
            accuracy: classification::accuracy(&actual, &predicted_classes),
            confusion_matrix: classification::confusion_matrix(&actual, &predicted_classes),
            classification_report: classification::classification_report(
                &actual,
                &predicted_classes,
                classes,
            ),
            auc_score,
            roc_points,
            predicted_probabilities,
            predicted_classes,
            vif_values: vif.values,
            collinearity_warning: vif.collinearity_warning,
        }),
    })
}

fn vif_summary(x: &DMatrix<f64>, names: &[String], config: &EngineConfig) -> VifSummary {
    let summary = diagnostics::variance_inflation(
        x,
        names,
        config.tolerance,
        config.vif_ceiling,
        config.vif_warning_threshold,
    );
    if summary.collinearity_warning {
        log::warn!("collinearity detected: VIF above {}", config.vif_warning_threshold);
    }
    summary
}

// ---------------------------------------------------------------------------
// Transport sanitization
// ---------------------------------------------------------------------------

impl TransportSafe for VifEntry {
    fn sanitize_for_transport(self) -> Self {
        Self {
            vif: self.vif.sanitize_for_transport(),
            ..self
        }
    }
}

impl TransportSafe for ClassMetrics {
    fn sanitize_for_transport(self) -> Self {
        Self {
            precision: self.precision.sanitize_for_transport(),
            recall: self.recall.sanitize_for_transport(),
            f1_score: self.f1_score.sanitize_for_transport(),
            support: self.support,
        }
    }
}

impl TransportSafe for RocPoint {
    fn sanitize_for_transport(self) -> Self {
        Self {
            fpr: self.fpr.sanitize_for_transport(),
            tpr: self.tpr.sanitize_for_transport(),
        }
    }
}

impl TransportSafe for FittedModel {
    fn sanitize_for_transport(self) -> Self {
        Self {
            intercept: self.intercept.sanitize_for_transport(),
            coefficients: self.coefficients.sanitize_for_transport(),
            classes: self.classes.sanitize_for_transport(),
            standard_error: self.standard_error.sanitize_for_transport(),
            ..self
        }
    }
}

impl TransportSafe for Diagnostics {
    fn sanitize_for_transport(self) -> Self {
        match self {
            Self::Continuous(r) => Self::Continuous(DiagnosticReport {
                r_squared: r.r_squared.sanitize_for_transport(),
                adjusted_r_squared: r.adjusted_r_squared.sanitize_for_transport(),
                standard_error: r.standard_error.sanitize_for_transport(),
                f_statistic: r.f_statistic.sanitize_for_transport(),
                p_value: r.p_value.sanitize_for_transport(),
                intercept_p_value: r.intercept_p_value.sanitize_for_transport(),
                coefficient_p_values: r.coefficient_p_values.sanitize_for_transport(),
                predicted_values: r.predicted_values.sanitize_for_transport(),
                residuals: r.residuals.sanitize_for_transport(),
                vif_values: r.vif_values.sanitize_for_transport(),
                collinearity_warning: r.collinearity_warning,
            }),
            Self::Logistic(r) => {
                let report = r.classification_report;
                Self::Logistic(LogisticReport {
                    classes: r.classes.sanitize_for_transport(),
                    accuracy: r.accuracy.sanitize_for_transport(),
                    confusion_matrix: r.confusion_matrix,
                    classification_report: ClassificationReport {
                        per_class: report
                            .per_class
                            .into_iter()
                            .map(|e| ClassEntry {
                                class: e.class.sanitize_for_transport(),
                                metrics: e.metrics.sanitize_for_transport(),
                            })
                            .collect(),
                        accuracy: report.accuracy.sanitize_for_transport(),
                        macro_avg: report.macro_avg.sanitize_for_transport(),
                        weighted_avg: report.weighted_avg.sanitize_for_transport(),
                    },
                    auc_score: r.auc_score.sanitize_for_transport(),
                    roc_points: r.roc_points.sanitize_for_transport(),
                    predicted_probabilities: r.predicted_probabilities.sanitize_for_transport(),
                    predicted_classes: r.predicted_classes,
                    vif_values: r.vif_values.sanitize_for_transport(),
                    collinearity_warning: r.collinearity_warning,
                })
            }
        }
    }
}

impl TransportSafe for RegressionResult {
    fn sanitize_for_transport(self) -> Self {
        Self {
            model: self.model.sanitize_for_transport(),
            feature_names: self.feature_names,
            diagnostics: self.diagnostics.sanitize_for_transport(),
        }
    }
}
