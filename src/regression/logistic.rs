//! Binary logistic regression.
//!
//! L2-penalized maximum likelihood with an unpenalized intercept, solved by
//! damped Newton-Raphson (iteratively reweighted least squares).

use nalgebra::{DMatrix, DVector};

use crate::error::{ModelingError, Result};
use crate::linalg::pseudo_inverse;

/// Fitted logistic coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticFit {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
    pub iterations: usize,
    pub converged: bool,
}

impl LogisticFit {
    /// Log-odds b₀ + xᵀβ.
    pub fn log_odds(&self, row: &[f64]) -> f64 {
        self.intercept
            + row
                .iter()
                .zip(self.coefficients.iter())
                .map(|(v, b)| v * b)
                .sum::<f64>()
    }

    /// P(class 1 | x) for each row of `x`.
    pub fn probabilities(&self, x: &DMatrix<f64>) -> Vec<f64> {
        x.row_iter()
            .map(|row| {
                let values: Vec<f64> = row.iter().copied().collect();
                sigmoid(self.log_odds(&values))
            })
            .collect()
    }
}

/// Numerically stable logistic function.
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Maps a two-valued target to 0/1 in ascending order of the original values.
///
/// # Errors
///
/// [`ModelingError::NotBinary`] unless exactly two distinct values occur.
pub fn encode_binary(y: &[f64]) -> Result<([f64; 2], Vec<f64>)> {
    let mut distinct: Vec<f64> = y.to_vec();
    distinct.sort_by(|a, b| a.total_cmp(b));
    distinct.dedup();
    if distinct.len() != 2 {
        return Err(ModelingError::NotBinary {
            found: distinct.len(),
        });
    }
    let classes = [distinct[0], distinct[1]];
    let encoded = y
        .iter()
        .map(|&v| if v == classes[1] { 1.0 } else { 0.0 })
        .collect();
    Ok((classes, encoded))
}

/// Fits P(y = 1 | x) = σ(b₀ + xᵀβ).
///
/// # Algorithm
///
/// Minimizes the penalized negative log-likelihood
///
/// L(b) = −Σ [yᵢ log μᵢ + (1 − yᵢ) log(1 − μᵢ)] + ‖β‖² / (2C)
///
/// with Newton steps Δ = H⁻¹g, where g = Aᵀ(μ − y) + λβ̃ and
/// H = AᵀWA + λĨ on the intercept-augmented design A (λ = 1/C, the
/// intercept entry of β̃ and Ĩ is zero). Steps are halved until the
/// objective decreases. The penalty keeps the optimum finite on separable
/// data.
///
/// # Returns
///
/// `None` if `c` is not positive, shapes disagree, or the first Newton
/// system cannot be solved.
pub fn fit_logistic(
    x: &DMatrix<f64>,
    y: &[f64],
    c: f64,
    max_iterations: usize,
    tolerance: f64,
) -> Option<LogisticFit> {
    let n = x.nrows();
    let p = x.ncols();
    if n == 0 || n != y.len() || !(c > 0.0) {
        return None;
    }
    let lambda = 1.0 / c;
    let a = DMatrix::from_fn(n, p + 1, |i, j| if j == 0 { 1.0 } else { x[(i, j - 1)] });
    let target = DVector::from_column_slice(y);

    let objective = |beta: &DVector<f64>| -> f64 {
        let eta = &a * beta;
        let loss: f64 = eta
            .iter()
            .zip(target.iter())
            .map(|(&z, &t)| log1p_exp(z) - t * z)
            .sum();
        let penalty: f64 = beta.iter().skip(1).map(|b| b * b).sum::<f64>() * lambda / 2.0;
        loss + penalty
    };

    let mut beta = DVector::zeros(p + 1);
    let mut current = objective(&beta);
    let mut converged = false;
    let mut iterations = 0;

    while iterations < max_iterations {
        iterations += 1;

        let mu = (&a * &beta).map(sigmoid);
        let weights = mu.map(|m| m * (1.0 - m));

        let mut gradient = a.transpose() * (&mu - &target);
        let mut hessian = DMatrix::zeros(p + 1, p + 1);
        for i in 0..n {
            let row = a.row(i);
            hessian += row.transpose() * row * weights[i];
        }
        for j in 1..=p {
            gradient[j] += lambda * beta[j];
            hessian[(j, j)] += lambda;
        }

        let step = match hessian.clone().cholesky() {
            Some(chol) => chol.solve(&gradient),
            None => pseudo_inverse(&hessian)? * &gradient,
        };

        let mut scale = 1.0;
        let mut accepted = false;
        for _ in 0..30 {
            let candidate = &beta - &step * scale;
            let value = objective(&candidate);
            if value <= current {
                beta = candidate;
                current = value;
                accepted = true;
                break;
            }
            scale *= 0.5;
        }

        // No descent left at machine precision.
        if !accepted || step.amax() * scale < tolerance {
            converged = true;
            break;
        }
    }
    if !converged {
        log::warn!("logistic regression did not converge in {iterations} iterations");
    }

    Some(LogisticFit {
        intercept: beta[0],
        coefficients: beta.iter().skip(1).copied().collect(),
        iterations,
        converged,
    })
}

/// log(1 + eᶻ) without overflow.
fn log1p_exp(z: f64) -> f64 {
    if z > 0.0 {
        z + (-z).exp().ln_1p()
    } else {
        z.exp().ln_1p()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoid_is_stable() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!((sigmoid(800.0) - 1.0).abs() < 1e-15);
        assert!(sigmoid(-800.0) >= 0.0);
        assert!((sigmoid(2.0) + sigmoid(-2.0) - 1.0).abs() < 1e-15);
    }

    #[test]
    fn encodes_sorted_classes() {
        let (classes, encoded) = encode_binary(&[5.0, 2.0, 5.0, 2.0]).unwrap();
        assert_eq!(classes, [2.0, 5.0]);
        assert_eq!(encoded, vec![1.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn rejects_non_binary() {
        assert_eq!(
            encode_binary(&[1.0, 2.0, 3.0]),
            Err(ModelingError::NotBinary { found: 3 })
        );
        assert_eq!(
            encode_binary(&[1.0, 1.0]),
            Err(ModelingError::NotBinary { found: 1 })
        );
    }

    #[test]
    fn separable_data_stays_finite() {
        let x = DMatrix::from_column_slice(8, 1, &[1.0, 2.0, 3.0, 4.0, 6.0, 7.0, 8.0, 9.0]);
        let y = [0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        let fit = fit_logistic(&x, &y, 1.0, 1000, 1e-10).unwrap();
        assert!(fit.converged);
        assert!(fit.coefficients[0] > 0.0 && fit.coefficients[0].is_finite());
        let probs = fit.probabilities(&x);
        for (p, t) in probs.iter().zip(y.iter()) {
            assert_eq!(*p >= 0.5, *t == 1.0);
        }
    }

    #[test]
    fn gradient_vanishes_at_optimum() {
        let x = DMatrix::from_column_slice(
            10,
            1,
            &[0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0, 4.5, 5.0],
        );
        let y = [0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 1.0];
        let fit = fit_logistic(&x, &y, 1.0, 1000, 1e-12).unwrap();
        let probs = fit.probabilities(&x);
        // Intercept score equation: Σ(μ − y) = 0
        let g0: f64 = probs.iter().zip(y.iter()).map(|(m, t)| m - t).sum();
        assert!(g0.abs() < 1e-8, "g0 = {g0}");
        // Slope equation: Σ x(μ − y) + β = 0
        let g1: f64 = probs
            .iter()
            .zip(y.iter())
            .zip(x.iter())
            .map(|((m, t), xi)| xi * (m - t))
            .sum::<f64>()
            + fit.coefficients[0];
        assert!(g1.abs() < 1e-8, "g1 = {g1}");
    }

    #[test]
    fn invalid_penalty() {
        let x = DMatrix::from_column_slice(2, 1, &[0.0, 1.0]);
        assert!(fit_logistic(&x, &[0.0, 1.0], 0.0, 10, 1e-8).is_none());
    }
}
