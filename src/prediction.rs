//! Point prediction from a fitted model.
//!
//! Replays the stored intercept and coefficients against one observation and
//! reports the per-term contribution breakdown. Continuous models with a
//! residual standard error also get normal-theory 90 % and 95 % intervals.
//!
//! # Examples
//!
//! ```
//! use u_modeling::prediction::{predict, PredictionRequest};
//! use u_modeling::regression::{FittedModel, RegressionType};
//!
//! let model = FittedModel {
//!     kind: RegressionType::Linear,
//!     intercept: 3.0,
//!     coefficients: vec![2.0],
//!     classes: None,
//!     polynomial_degree: None,
//!     standard_error: Some(0.5),
//! };
//! let request = PredictionRequest {
//!     model,
//!     input_values: vec![4.0],
//!     column_names: vec!["x".to_string()],
//! };
//! let result = predict(&request).unwrap();
//! assert_eq!(result.predicted_value, 11.0);
//! let ci = result.confidence_intervals.unwrap();
//! assert!((ci.ci_95.lower - (11.0 - 1.96 * 0.5)).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ModelingError, Result};
use crate::regression::logistic::sigmoid;
use crate::regression::{FittedModel, RegressionType};
use crate::sanitize::TransportSafe;

/// z-score of the 95 % normal interval.
pub const Z_95: f64 = 1.96;
/// z-score of the 90 % normal interval.
pub const Z_90: f64 = 1.645;

/// A prediction request: one observation against a fitted model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub model: FittedModel,
    pub input_values: Vec<f64>,
    #[serde(default)]
    pub column_names: Vec<String>,
}

/// One additive term of the model equation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquationTerm {
    pub term: String,
    pub coefficient: f64,
    pub value: f64,
    pub contribution: f64,
}

/// A symmetric interval around the point prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub lower: f64,
    pub upper: f64,
}

/// 95 % and 90 % intervals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceIntervals {
    pub ci_95: Interval,
    pub ci_90: Interval,
}

/// Classification outcome of a logistic model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassPrediction {
    /// Original class value (from the model's classes, default 0/1).
    pub predicted_class: f64,
    /// P(class 1).
    pub probability: f64,
    pub log_odds: f64,
}

/// Prediction with its explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Linear predictor: the response for continuous models, the
    /// log-odds for logistic models.
    pub predicted_value: f64,
    pub intercept: f64,
    pub equation_terms: Vec<EquationTerm>,
    pub confidence_intervals: Option<ConfidenceIntervals>,
    pub classification: Option<ClassPrediction>,
}

/// Predicts one observation.
///
/// # Algorithm
///
/// - Linear, ridge, lasso: ŷ = b₀ + Σ bᵢxᵢ; with a non-zero standard error
///   s the intervals are ŷ ± 1.96·s and ŷ ± 1.645·s.
/// - Polynomial: ŷ = b₀ + Σₖ bₖ·xᵏ for k = 1..len(b); no intervals.
/// - Logistic: η = b₀ + Σ bᵢxᵢ, p = σ(η), class = classes[p ≥ 0.5].
///
/// # Errors
///
/// - `MissingParameters` if the model has no coefficients or no input is given.
/// - `UnsupportedShape` for a polynomial model with more than one input.
/// - `ShapeMismatch` when the input count differs from the coefficient count
///   (or, for polynomial models, the stored degree differs from it).
/// - `InvalidInput` for non-finite inputs.
pub fn predict(request: &PredictionRequest) -> Result<PredictionResult> {
    let model = &request.model;
    let input = &request.input_values;
    if model.coefficients.is_empty() {
        return Err(ModelingError::MissingParameters(
            "model coefficients are required".to_string(),
        ));
    }
    if input.is_empty() {
        return Err(ModelingError::MissingParameters(
            "input values are required".to_string(),
        ));
    }
    if input.iter().any(|v| !v.is_finite()) {
        return Err(ModelingError::InvalidInput(
            "input values contain NaN or infinite values".to_string(),
        ));
    }

    let result = match model.kind {
        RegressionType::Polynomial => predict_polynomial(model, input, &request.column_names)?,
        RegressionType::Logistic => predict_logistic(model, input, &request.column_names)?,
        _ => predict_linear(model, input, &request.column_names)?,
    };
    Ok(result.sanitize_for_transport())
}

fn term_name(column_names: &[String], i: usize) -> String {
    column_names
        .get(i)
        .cloned()
        .unwrap_or_else(|| format!("X{}", i + 1))
}

fn linear_terms(
    model: &FittedModel,
    input: &[f64],
    column_names: &[String],
) -> Result<Vec<EquationTerm>> {
    if input.len() != model.coefficients.len() {
        return Err(ModelingError::ShapeMismatch {
            expected: model.coefficients.len(),
            actual: input.len(),
        });
    }
    Ok(model
        .coefficients
        .iter()
        .zip(input.iter())
        .enumerate()
        .map(|(i, (&coefficient, &value))| EquationTerm {
            term: term_name(column_names, i),
            coefficient,
            value,
            contribution: coefficient * value,
        })
        .collect())
}

fn total(intercept: f64, terms: &[EquationTerm]) -> f64 {
    intercept + terms.iter().map(|t| t.contribution).sum::<f64>()
}

fn predict_linear(
    model: &FittedModel,
    input: &[f64],
    column_names: &[String],
) -> Result<PredictionResult> {
    let equation_terms = linear_terms(model, input, column_names)?;
    let predicted_value = total(model.intercept, &equation_terms);

    let confidence_intervals = model
        .standard_error
        .filter(|&se| se != 0.0 && se.is_finite())
        .map(|se| ConfidenceIntervals {
            ci_95: Interval {
                lower: predicted_value - Z_95 * se,
                upper: predicted_value + Z_95 * se,
            },
            ci_90: Interval {
                lower: predicted_value - Z_90 * se,
                upper: predicted_value + Z_90 * se,
            },
        });

    Ok(PredictionResult {
        predicted_value,
        intercept: model.intercept,
        equation_terms,
        confidence_intervals,
        classification: None,
    })
}

fn predict_polynomial(
    model: &FittedModel,
    input: &[f64],
    column_names: &[String],
) -> Result<PredictionResult> {
    if input.len() != 1 {
        return Err(ModelingError::UnsupportedShape(format!(
            "polynomial prediction supports one independent variable, got {}",
            input.len()
        )));
    }
    let degree = model.coefficients.len();
    if let Some(stored) = model.polynomial_degree {
        if stored != degree {
            return Err(ModelingError::ShapeMismatch {
                expected: stored,
                actual: degree,
            });
        }
    }

    let x = input[0];
    let base = column_names.first().map_or("X", String::as_str);
    let equation_terms: Vec<EquationTerm> = model
        .coefficients
        .iter()
        .enumerate()
        .map(|(k, &coefficient)| {
            let value = x.powi(k as i32 + 1);
            EquationTerm {
                term: format!("{base}^{}", k + 1),
                coefficient,
                value,
                contribution: coefficient * value,
            }
        })
        .collect();

    Ok(PredictionResult {
        predicted_value: total(model.intercept, &equation_terms),
        intercept: model.intercept,
        equation_terms,
        confidence_intervals: None,
        classification: None,
    })
}

fn predict_logistic(
    model: &FittedModel,
    input: &[f64],
    column_names: &[String],
) -> Result<PredictionResult> {
    let equation_terms = linear_terms(model, input, column_names)?;
    let log_odds = total(model.intercept, &equation_terms);
    let probability = sigmoid(log_odds);
    let classes = model.classes.unwrap_or([0.0, 1.0]);
    let predicted_class = if probability >= 0.5 {
        classes[1]
    } else {
        classes[0]
    };

    Ok(PredictionResult {
        predicted_value: log_odds,
        intercept: model.intercept,
        equation_terms,
        confidence_intervals: None,
        classification: Some(ClassPrediction {
            predicted_class,
            probability,
            log_odds,
        }),
    })
}

impl TransportSafe for EquationTerm {
    fn sanitize_for_transport(self) -> Self {
        Self {
            coefficient: self.coefficient.sanitize_for_transport(),
            value: self.value.sanitize_for_transport(),
            contribution: self.contribution.sanitize_for_transport(),
            ..self
        }
    }
}

impl TransportSafe for Interval {
    fn sanitize_for_transport(self) -> Self {
        Self {
            lower: self.lower.sanitize_for_transport(),
            upper: self.upper.sanitize_for_transport(),
        }
    }
}

impl TransportSafe for PredictionResult {
    fn sanitize_for_transport(self) -> Self {
        Self {
            predicted_value: self.predicted_value.sanitize_for_transport(),
            intercept: self.intercept.sanitize_for_transport(),
            equation_terms: self.equation_terms.sanitize_for_transport(),
            confidence_intervals: self.confidence_intervals.map(|ci| ConfidenceIntervals {
                ci_95: ci.ci_95.sanitize_for_transport(),
                ci_90: ci.ci_90.sanitize_for_transport(),
            }),
            classification: self.classification.map(|c| ClassPrediction {
                predicted_class: c.predicted_class.sanitize_for_transport(),
                probability: c.probability.sanitize_for_transport(),
                log_odds: c.log_odds.sanitize_for_transport(),
            }),
        }
    }
}
