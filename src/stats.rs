//! Descriptive statistics.
//!
//! `Option`-returning wrappers over [`statrs::statistics::Statistics`]:
//! `None` replaces the `NaN` that statrs yields for empty or too-short input.

use statrs::statistics::Statistics;

/// Arithmetic mean. `None` for empty input.
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().mean())
}

/// Sample standard deviation (denominator n − 1). `None` if fewer than 2 values.
pub fn std_dev(data: &[f64]) -> Option<f64> {
    if data.len() < 2 {
        return None;
    }
    Some(data.iter().std_dev())
}

/// Population standard deviation (denominator n). `None` for empty input.
pub fn population_std_dev(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().population_std_dev())
}

/// Sample covariance (denominator n − 1).
///
/// `None` if the slices differ in length or hold fewer than 2 values.
pub fn covariance(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    Some(x.iter().covariance(y.iter()))
}
