//! Goodness-of-fit statistics, coefficient significance, and variance
//! inflation factors.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::linalg::{least_squares, pseudo_inverse};
use crate::special;

/// Floor applied to coefficient standard errors before forming t-statistics.
const MIN_STANDARD_ERROR: f64 = 1e-10;

/// Overall fit statistics of a linear model with intercept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitStatistics {
    pub r_squared: f64,
    pub adjusted_r_squared: f64,
    /// Residual standard error √(SSR / df).
    pub standard_error: f64,
    pub f_statistic: f64,
    pub f_p_value: f64,
    /// Residual sum of squares.
    pub ssr: f64,
    /// Residual degrees of freedom n − p − 1 (may be ≤ 0).
    pub df: i64,
}

/// Computes R², adjusted R², residual standard error, and the overall F-test
/// for a model with `p` slopes and an intercept.
///
/// # Algorithm
///
/// - R² = 1 − SSR/SST, or 1 when SST = 0.
/// - Adjusted R² = 1 − (1 − R²)(n − 1)/df, or R² when df ≤ 0.
/// - s = √(SSR/df), or 0 when df ≤ 0.
/// - F = ((SST − SSR)/p) / (SSR/df), or 0 when p = 0, SSR = 0, or df ≤ 0.
/// - p-value = 1 − F_cdf(F; p, df), or 1 when p = 0 or df ≤ 0.
pub fn fit_statistics(y: &[f64], predicted: &[f64], p: usize) -> FitStatistics {
    let n = y.len();
    let nf = n as f64;
    let y_mean = y.iter().sum::<f64>() / nf;
    let sst: f64 = y.iter().map(|v| (v - y_mean).powi(2)).sum();
    let ssr: f64 = y
        .iter()
        .zip(predicted.iter())
        .map(|(a, b)| (a - b).powi(2))
        .sum();
    let df = n as i64 - p as i64 - 1;

    let r_squared = if sst == 0.0 { 1.0 } else { 1.0 - ssr / sst };
    let adjusted_r_squared = if df > 0 {
        1.0 - (1.0 - r_squared) * (nf - 1.0) / df as f64
    } else {
        r_squared
    };
    let standard_error = if df > 0 {
        (ssr / df as f64).sqrt()
    } else {
        0.0
    };

    let f_statistic = if p == 0 || ssr == 0.0 || df <= 0 {
        0.0
    } else {
        ((sst - ssr) / p as f64) / (ssr / df as f64)
    };
    let f_p_value = if p > 0 && df > 0 {
        1.0 - special::f_distribution_cdf(f_statistic, p as f64, df as f64)
    } else {
        1.0
    };

    FitStatistics {
        r_squared,
        adjusted_r_squared,
        standard_error,
        f_statistic,
        f_p_value,
        ssr,
        df,
    }
}

/// Two-sided p-values of the intercept and each slope.
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientTests {
    pub intercept_p_value: f64,
    pub coefficient_p_values: Vec<f64>,
}

/// t-tests of the intercept and slopes.
///
/// # Algorithm
///
/// With the intercept-augmented design A = [1 | X]:
///
/// mse = SSR / max(1, df), Cov(b) = mse · (AᵀA)⁺,
/// t = b / max(se, 1e-10), p = 2·(1 − T(|t|; max(1, df))).
///
/// The pseudo-inverse keeps the computation defined for rank-deficient and
/// penalized fits.
///
/// # Returns
///
/// `None` if the decomposition fails or the covariance has a negative or
/// non-finite diagonal.
pub fn coefficient_tests(
    x: &DMatrix<f64>,
    intercept: f64,
    coefficients: &[f64],
    ssr: f64,
    df: i64,
) -> Option<CoefficientTests> {
    let n = x.nrows();
    let p = x.ncols();
    if coefficients.len() != p {
        return None;
    }
    let augmented = DMatrix::from_fn(n, p + 1, |i, j| if j == 0 { 1.0 } else { x[(i, j - 1)] });
    let gram = augmented.transpose() * &augmented;
    let gram_inv = pseudo_inverse(&gram)?;

    let effective_df = df.max(1) as f64;
    let mse = ssr / effective_df;

    let mut p_values = Vec::with_capacity(p + 1);
    for (j, &b) in std::iter::once(&intercept)
        .chain(coefficients.iter())
        .enumerate()
    {
        let variance = mse * gram_inv[(j, j)];
        if !variance.is_finite() || variance < 0.0 {
            return None;
        }
        let se = variance.sqrt().max(MIN_STANDARD_ERROR);
        p_values.push(special::t_two_sided_p_value(b / se, effective_df));
    }

    Some(CoefficientTests {
        intercept_p_value: p_values[0],
        coefficient_p_values: p_values[1..].to_vec(),
    })
}

// ---------------------------------------------------------------------------
// Variance inflation
// ---------------------------------------------------------------------------

/// VIF of one feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VifEntry {
    pub feature: String,
    pub vif: f64,
}

/// Variance inflation factors and the collinearity flag.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VifSummary {
    pub values: Vec<VifEntry>,
    pub collinearity_warning: bool,
}

/// Computes the VIF of every column of `x`.
///
/// # Algorithm
///
/// Column j is regressed on the remaining columns without an added constant,
/// and R²ⱼ is the uncentered coefficient of determination. Then
/// VIFⱼ = 1 / (1 − R²ⱼ) = Σxⱼ² / SSRⱼ.
///
/// When 1 − R²ⱼ is below `tolerance` or not finite (perfect collinearity,
/// all-zero column), `ceiling` is reported instead. If the auxiliary
/// regression cannot be solved the VIF is 1. Any VIF above
/// `warning_threshold` sets the collinearity warning.
///
/// # References
///
/// Marquardt (1970). "Generalized inverses, ridge regression, biased linear
/// estimation, and nonlinear estimation". Technometrics, 12(3), 591–612.
pub fn variance_inflation(
    x: &DMatrix<f64>,
    names: &[String],
    tolerance: f64,
    ceiling: f64,
    warning_threshold: f64,
) -> VifSummary {
    let p = x.ncols();
    if p < 2 {
        return VifSummary::default();
    }

    let mut values = Vec::with_capacity(p);
    for j in 0..p {
        let target: DVector<f64> = x.column(j).into_owned();
        let others = x.clone().remove_column(j);

        let vif = match least_squares(&others, &target) {
            Some(beta) => {
                let residual = &target - &others * beta;
                let unexplained = residual.norm_squared() / target.norm_squared();
                if !unexplained.is_finite() || unexplained < tolerance {
                    ceiling
                } else {
                    1.0 / unexplained
                }
            }
            None => {
                log::warn!("auxiliary regression for VIF of column {j} failed, reporting 1.0");
                1.0
            }
        };
        let feature = names.get(j).cloned().unwrap_or_else(|| format!("X{}", j + 1));
        values.push(VifEntry { feature, vif });
    }

    let collinearity_warning = values.iter().any(|e| e.vif > warning_threshold);
    VifSummary {
        values,
        collinearity_warning,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_fit_statistics() {
        let y = [5.0, 7.0, 9.0, 11.0, 13.0];
        let stats = fit_statistics(&y, &y, 1);
        assert_eq!(stats.r_squared, 1.0);
        assert_eq!(stats.adjusted_r_squared, 1.0);
        assert_eq!(stats.standard_error, 0.0);
        assert_eq!(stats.f_statistic, 0.0);
        assert_eq!(stats.f_p_value, 1.0);
        assert_eq!(stats.df, 3);
    }

    #[test]
    fn constant_target_has_unit_r_squared() {
        let y = [4.0, 4.0, 4.0, 4.0];
        let predicted = [4.0, 4.0, 4.0, 4.0];
        assert_eq!(fit_statistics(&y, &predicted, 1).r_squared, 1.0);
    }

    #[test]
    fn noisy_fit_statistics() {
        let y = [1.0, 3.0, 2.0, 5.0, 4.0];
        // OLS on x = 1..5: slope 0.8, intercept 0.6
        let predicted: Vec<f64> = (1..=5).map(|x| 0.6 + 0.8 * x as f64).collect();
        let stats = fit_statistics(&y, &predicted, 1);
        // SST = 10, SSR = 3.6
        assert!((stats.r_squared - 0.64).abs() < 1e-12);
        assert!((stats.adjusted_r_squared - (1.0 - 0.36 * 4.0 / 3.0)).abs() < 1e-12);
        assert!((stats.standard_error - (3.6_f64 / 3.0).sqrt()).abs() < 1e-12);
        assert!((stats.f_statistic - (6.4 / 1.2)).abs() < 1e-10);
        assert!(stats.f_p_value > 0.05 && stats.f_p_value < 0.2);
    }

    #[test]
    fn degrees_of_freedom_exhausted() {
        let y = [1.0, 2.0];
        let predicted = [1.1, 1.9];
        let stats = fit_statistics(&y, &predicted, 1);
        assert_eq!(stats.df, 0);
        assert_eq!(stats.adjusted_r_squared, stats.r_squared);
        assert_eq!(stats.standard_error, 0.0);
        assert_eq!(stats.f_p_value, 1.0);
    }

    #[test]
    fn slope_test_matches_textbook() {
        let x = DMatrix::from_row_slice(5, 1, &[1.0, 2.0, 3.0, 4.0, 5.0]);
        // SSR = 3.6, df = 3, mse = 1.2, Sxx = 10: se(b1) = √0.12
        let tests = coefficient_tests(&x, 0.6, &[0.8], 3.6, 3).unwrap();
        let t = 0.8 / 0.12_f64.sqrt();
        let expected = special::t_two_sided_p_value(t, 3.0);
        assert!((tests.coefficient_p_values[0] - expected).abs() < 1e-10);
        assert!(tests.intercept_p_value > 0.5);
    }

    #[test]
    fn perfect_fit_p_values_vanish() {
        let x = DMatrix::from_row_slice(4, 1, &[1.0, 2.0, 3.0, 4.0]);
        let tests = coefficient_tests(&x, 3.0, &[2.0], 0.0, 2).unwrap();
        assert!(tests.coefficient_p_values[0] < 1e-12);
    }

    #[test]
    fn collinear_vif_is_capped() {
        let x = DMatrix::from_row_slice(
            5,
            2,
            &[1.0, 2.0, 2.0, 4.0, 3.0, 6.0, 4.0, 8.0, 5.0, 10.0],
        );
        let names = vec!["a".to_string(), "b".to_string()];
        let summary = variance_inflation(&x, &names, 1e-10, 10.0, 5.0);
        assert!(summary.collinearity_warning);
        assert_eq!(summary.values.len(), 2);
        for entry in &summary.values {
            assert_eq!(entry.vif, 10.0);
        }
        assert_eq!(summary.values[1].feature, "b");
    }

    #[test]
    fn orthogonal_vif_is_one() {
        let x = DMatrix::from_row_slice(4, 2, &[1.0, 1.0, -1.0, 1.0, 1.0, -1.0, -1.0, -1.0]);
        let summary = variance_inflation(&x, &[], 1e-10, 10.0, 5.0);
        assert!(!summary.collinearity_warning);
        for entry in &summary.values {
            assert!((entry.vif - 1.0).abs() < 1e-12);
        }
        assert_eq!(summary.values[0].feature, "X1");
    }

    #[test]
    fn single_column_has_no_vif() {
        let x = DMatrix::from_row_slice(3, 1, &[1.0, 2.0, 3.0]);
        assert!(variance_inflation(&x, &[], 1e-10, 10.0, 5.0).values.is_empty());
    }
}
