//! Linear model solvers: ordinary least squares, ridge, lasso, and the
//! polynomial basis expansion.
//!
//! Every solver centers the design and response, estimates the slopes on the
//! centered data, and recovers the unpenalized intercept as ȳ − x̄ᵀβ.

use nalgebra::{DMatrix, DVector};

use crate::linalg::{least_squares, pseudo_inverse};

/// Intercept and slopes of a fitted linear model.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearFit {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearFit {
    /// ŷ = b₀ + Xβ for each row of `x`.
    pub fn predict(&self, x: &DMatrix<f64>) -> Vec<f64> {
        x.row_iter()
            .map(|row| {
                self.intercept
                    + row
                        .iter()
                        .zip(self.coefficients.iter())
                        .map(|(v, b)| v * b)
                        .sum::<f64>()
            })
            .collect()
    }
}

struct Centered {
    x: DMatrix<f64>,
    y: DVector<f64>,
    x_mean: DVector<f64>,
    y_mean: f64,
}

fn center(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<Centered> {
    let n = x.nrows();
    if n == 0 || n != y.len() {
        return None;
    }
    let x_mean: DVector<f64> = x.row_mean().transpose();
    let y_mean = y.mean();
    let mut xc = x.clone();
    for (j, mut column) in xc.column_iter_mut().enumerate() {
        column.add_scalar_mut(-x_mean[j]);
    }
    let yc = y.add_scalar(-y_mean);
    Some(Centered {
        x: xc,
        y: yc,
        x_mean,
        y_mean,
    })
}

fn recover(c: &Centered, beta: DVector<f64>) -> LinearFit {
    LinearFit {
        intercept: c.y_mean - c.x_mean.dot(&beta),
        coefficients: beta.iter().copied().collect(),
    }
}

// ---------------------------------------------------------------------------
// Ordinary least squares
// ---------------------------------------------------------------------------

/// Ordinary least squares with intercept.
///
/// Uses the minimum-norm solution of the centered problem, so rank-deficient
/// designs (duplicated or collinear columns) still produce a fit.
///
/// # Returns
///
/// `None` if the row counts differ or the decomposition fails.
pub fn ordinary_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<LinearFit> {
    let c = center(x, y)?;
    let beta = least_squares(&c.x, &c.y)?;
    Some(recover(&c, beta))
}

// ---------------------------------------------------------------------------
// Ridge
// ---------------------------------------------------------------------------

/// Ridge regression: minimizes ‖yc − Xcβ‖² + α‖β‖².
///
/// # Algorithm
///
/// Solves (XcᵀXc + αI)β = Xcᵀyc by Cholesky; falls back to the
/// pseudo-inverse when α = 0 leaves the system singular.
pub fn ridge(x: &DMatrix<f64>, y: &DVector<f64>, alpha: f64) -> Option<LinearFit> {
    let c = center(x, y)?;
    let p = c.x.ncols();
    let xt = c.x.transpose();
    let gram = &xt * &c.x + DMatrix::identity(p, p) * alpha;
    let rhs = &xt * &c.y;

    let beta = match gram.clone().cholesky() {
        Some(chol) => chol.solve(&rhs),
        None => pseudo_inverse(&gram)? * rhs,
    };
    Some(recover(&c, beta))
}

// ---------------------------------------------------------------------------
// Lasso
// ---------------------------------------------------------------------------

/// Lasso regression: minimizes (1/2n)‖yc − Xcβ‖² + α‖β‖₁.
///
/// # Algorithm
///
/// Cyclic coordinate descent with soft-thresholding. For coordinate j:
///
/// ρⱼ = (1/n) xⱼᵀ(r + xⱼβⱼ), βⱼ ← S(ρⱼ, α) / ((1/n) xⱼᵀxⱼ)
///
/// where S(z, γ) = sign(z)·max(|z| − γ, 0). Iterates until the largest
/// coefficient change falls below `tolerance` (relative to the largest
/// coefficient) or `max_iterations` sweeps are done.
///
/// # References
///
/// Friedman, Hastie & Tibshirani (2010). "Regularization Paths for
/// Generalized Linear Models via Coordinate Descent". Journal of
/// Statistical Software, 33(1).
pub fn lasso(
    x: &DMatrix<f64>,
    y: &DVector<f64>,
    alpha: f64,
    max_iterations: usize,
    tolerance: f64,
) -> Option<LinearFit> {
    let c = center(x, y)?;
    let n = c.x.nrows() as f64;
    let p = c.x.ncols();

    let norms: Vec<f64> = c.x.column_iter().map(|col| col.norm_squared() / n).collect();
    let mut beta = DVector::zeros(p);
    let mut residual = c.y.clone();

    let mut converged = false;
    for _ in 0..max_iterations {
        let mut max_change: f64 = 0.0;
        let mut max_beta: f64 = 0.0;
        for j in 0..p {
            if norms[j] <= 0.0 {
                continue;
            }
            let column = c.x.column(j);
            let old = beta[j];
            let rho = column.dot(&residual) / n + norms[j] * old;
            let new = soft_threshold(rho, alpha) / norms[j];
            if new != old {
                residual.axpy(old - new, &column, 1.0);
                beta[j] = new;
            }
            max_change = max_change.max((new - old).abs());
            max_beta = max_beta.max(new.abs());
        }
        if max_change <= tolerance * max_beta.max(1.0) {
            converged = true;
            break;
        }
    }
    if !converged {
        log::warn!("lasso coordinate descent stopped at the iteration cap ({max_iterations})");
    }

    Some(recover(&c, beta))
}

fn soft_threshold(z: f64, gamma: f64) -> f64 {
    if z > gamma {
        z - gamma
    } else if z < -gamma {
        z + gamma
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Polynomial basis
// ---------------------------------------------------------------------------

/// Expands one predictor into columns x, x², ..., x^degree (no bias column).
pub fn polynomial_features(x: &[f64], degree: usize) -> DMatrix<f64> {
    DMatrix::from_fn(x.len(), degree, |i, k| x[i].powi(k as i32 + 1))
}
