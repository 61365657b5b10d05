//! ARIMA(1,1,1) by exact maximum likelihood.
//!
//! The first difference `w_t = y_t - y_{t-1}` is modeled as a zero-mean
//! ARMA(1,1):
//!
//! ```text
//! w_t = φ w_{t-1} + ε_t + θ ε_{t-1},   ε_t ~ N(0, σ²)
//! ```
//!
//! # Algorithm
//!
//! The likelihood is evaluated exactly with a Kalman filter on the state
//! `α_t = [w_t, θ ε_t]ᵀ`:
//!
//! ```text
//! α_{t+1} = T α_t + R ε_{t+1},   T = [[φ, 1], [0, 0]],   R = [1, θ]ᵀ
//! w_t     = [1, 0] α_t
//! ```
//!
//! started from the stationary covariance. σ² is concentrated out, leaving
//!
//! ```text
//! -2 ln L ∝ N ln σ̂² + Σ ln F_t,   σ̂² = (1/N) Σ v_t² / F_t
//! ```
//!
//! which is minimized with Nelder-Mead over `φ = tanh(u)`, `θ = tanh(v)` so
//! the search stays stationary and invertible.
//!
//! Forecast variance uses the ψ-weights of the integrated model,
//! `(1 - B)(1 - φB) ψ(B) = 1 + θB`:
//!
//! ```text
//! Var(ŷ_{n+h}) = σ² Σ_{j<h} ψ_j²
//! ```
//!
//! # References
//!
//! - Box, G.E.P., Jenkins, G.M. & Reinsel, G.C. (2008). *Time Series
//!   Analysis: Forecasting and Control*, 4th ed.
//! - Durbin, J. & Koopman, S.J. (2012). *Time Series Analysis by State
//!   Space Methods*, 2nd ed., §3.4.

use crate::optimize::{nelder_mead, NelderMeadConfig};

/// A fitted ARIMA(1,1,1) model.
#[derive(Debug, Clone)]
pub struct Arima111 {
    /// AR coefficient of the differenced series, |φ| < 1.
    pub phi: f64,
    /// MA coefficient of the differenced series, |θ| < 1.
    pub theta: f64,
    /// Maximum-likelihood innovation variance.
    pub sigma2: f64,
    /// In-sample residuals, one per observation. The first is the first
    /// observation itself (diffuse level).
    pub residuals: Vec<f64>,
    last_value: f64,
    next_state: [f64; 2],
}

/// Point forecasts with a symmetric normal band.
#[derive(Debug, Clone, PartialEq)]
pub struct ArimaForecast {
    pub mean: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

struct Filtered {
    innovations: Vec<f64>,
    variances: Vec<f64>,
    next_state: [f64; 2],
}

fn kalman(w: &[f64], phi: f64, theta: f64) -> Option<Filtered> {
    let denom = 1.0 - phi * phi;
    if denom <= 0.0 {
        return None;
    }
    // Stationary covariance of the state, in units of σ².
    let mut p00 = (1.0 + 2.0 * phi * theta + theta * theta) / denom;
    let mut p01 = theta;
    let mut p11 = theta * theta;
    let mut a = [0.0, 0.0];

    let mut innovations = Vec::with_capacity(w.len());
    let mut variances = Vec::with_capacity(w.len());

    for &obs in w {
        let f = p00;
        if !f.is_finite() || f <= 0.0 {
            return None;
        }
        let v = obs - a[0];
        innovations.push(v);
        variances.push(f);

        // Update.
        let a0 = a[0] + p00 * v / f;
        let a1 = a[1] + p01 * v / f;
        let q11 = p11 - p01 * p01 / f;

        // Predict. The filtered covariance has zero first row and column.
        a = [phi * a0 + a1, 0.0];
        p00 = q11 + 1.0;
        p01 = theta;
        p11 = theta * theta;
    }

    Some(Filtered {
        innovations,
        variances,
        next_state: a,
    })
}

fn concentrated_sigma2(filtered: &Filtered) -> f64 {
    let n = filtered.innovations.len() as f64;
    filtered
        .innovations
        .iter()
        .zip(filtered.variances.iter())
        .map(|(v, f)| v * v / f)
        .sum::<f64>()
        / n
}

fn neg_log_likelihood(w: &[f64], phi: f64, theta: f64) -> f64 {
    let Some(filtered) = kalman(w, phi, theta) else {
        return f64::NAN;
    };
    let n = w.len() as f64;
    let sigma2 = concentrated_sigma2(&filtered).max(f64::MIN_POSITIVE);
    n * sigma2.ln() + filtered.variances.iter().map(|f| f.ln()).sum::<f64>()
}

/// Fits ARIMA(1,1,1) without a constant.
///
/// # Returns
///
/// `None` if fewer than 3 observations are given, any value is non-finite,
/// or the likelihood cannot be evaluated.
///
/// # Examples
///
/// ```
/// use u_modeling::forecast::fit_arima_111;
/// use u_modeling::optimize::NelderMeadConfig;
///
/// let data: Vec<f64> = (0..40).map(|t| 10.0 + t as f64 + (t as f64 * 1.7).sin()).collect();
/// let model = fit_arima_111(&data, &NelderMeadConfig::default()).unwrap();
/// assert!(model.phi.abs() < 1.0 && model.theta.abs() < 1.0);
/// assert_eq!(model.residuals.len(), data.len());
/// ```
pub fn fit_arima_111(data: &[f64], config: &NelderMeadConfig) -> Option<Arima111> {
    if data.len() < 3 || data.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let w: Vec<f64> = data.windows(2).map(|p| p[1] - p[0]).collect();

    let objective = |z: &[f64]| neg_log_likelihood(&w, z[0].tanh(), z[1].tanh());
    let best = nelder_mead(objective, &[0.0, 0.0], config)?;
    if !best.converged {
        log::warn!(
            "ARIMA likelihood search stopped after {} iterations",
            best.iterations
        );
    }

    let phi = best.point[0].tanh();
    let theta = best.point[1].tanh();
    let filtered = kalman(&w, phi, theta)?;
    let sigma2 = concentrated_sigma2(&filtered);

    let mut residuals = Vec::with_capacity(data.len());
    residuals.push(data[0]);
    residuals.extend_from_slice(&filtered.innovations);

    log::debug!("ARIMA(1,1,1) fitted: phi={phi:.4}, theta={theta:.4}, sigma2={sigma2:.6}");

    Some(Arima111 {
        phi,
        theta,
        sigma2,
        residuals,
        last_value: *data.last()?,
        next_state: filtered.next_state,
    })
}

impl Arima111 {
    /// ψ-weights ψ_0..ψ_{h-1} of the integrated model.
    pub fn psi_weights(&self, h: usize) -> Vec<f64> {
        let mut psi = Vec::with_capacity(h);
        for j in 0..h {
            let value = match j {
                0 => 1.0,
                1 => (1.0 + self.phi) * psi[0] + self.theta,
                _ => (1.0 + self.phi) * psi[j - 1] - self.phi * psi[j - 2],
            };
            psi.push(value);
        }
        psi
    }

    /// Forecasts `periods` steps with a `mean ± z·sd` band.
    pub fn forecast(&self, periods: usize, z: f64) -> ArimaForecast {
        let psi = self.psi_weights(periods);
        let mut state = self.next_state;
        let mut level = self.last_value;
        let mut cumulative = 0.0;

        let mut mean = Vec::with_capacity(periods);
        let mut lower = Vec::with_capacity(periods);
        let mut upper = Vec::with_capacity(periods);

        for weight in psi {
            level += state[0];
            state = [self.phi * state[0] + state[1], 0.0];

            cumulative += weight * weight;
            let half_width = z * (self.sigma2 * cumulative).sqrt();
            mean.push(level);
            lower.push(level - half_width);
            upper.push(level + half_width);
        }

        ArimaForecast { mean, lower, upper }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noise(t: usize) -> f64 {
        let x = (t as f64 * 12.9898).sin() * 43758.5453;
        x - x.floor() - 0.5
    }

    fn drifting(n: usize) -> Vec<f64> {
        (0..n).map(|t| 50.0 + 2.0 * t as f64 + 0.3 * noise(t)).collect()
    }

    #[test]
    fn parameters_stay_admissible() {
        let data = drifting(60);
        let model = fit_arima_111(&data, &NelderMeadConfig::default()).unwrap();
        assert!(model.phi.abs() < 1.0, "phi = {}", model.phi);
        assert!(model.theta.abs() < 1.0, "theta = {}", model.theta);
        assert!(model.sigma2 > 0.0);
    }

    #[test]
    fn first_residual_is_first_observation() {
        let data = drifting(30);
        let model = fit_arima_111(&data, &NelderMeadConfig::default()).unwrap();
        assert_eq!(model.residuals.len(), 30);
        assert_eq!(model.residuals[0], data[0]);
    }

    #[test]
    fn forecast_follows_drift() {
        let data = drifting(60);
        let model = fit_arima_111(&data, &NelderMeadConfig::default()).unwrap();
        let last = *data.last().unwrap();
        let f = model.forecast(5, 1.96);
        assert_eq!(f.mean.len(), 5);
        assert!(f.mean[0] > last && f.mean[0] < last + 4.0, "mean = {:?}", f.mean);
    }

    #[test]
    fn band_widens_with_horizon() {
        let data = drifting(40);
        let model = fit_arima_111(&data, &NelderMeadConfig::default()).unwrap();
        let f = model.forecast(6, 1.96);
        for h in 0..6 {
            assert!(f.lower[h] <= f.mean[h] && f.mean[h] <= f.upper[h]);
            assert!(((f.upper[h] - f.mean[h]) - (f.mean[h] - f.lower[h])).abs() < 1e-9);
        }
        for h in 1..6 {
            assert!(f.upper[h] - f.lower[h] >= f.upper[h - 1] - f.lower[h - 1] - 1e-12);
        }
    }

    #[test]
    fn constant_series_forecasts_constant() {
        let data = vec![7.0; 15];
        let model = fit_arima_111(&data, &NelderMeadConfig::default()).unwrap();
        let f = model.forecast(3, 1.96);
        for h in 0..3 {
            assert!((f.mean[h] - 7.0).abs() < 1e-12);
            assert!((f.upper[h] - f.lower[h]).abs() < 1e-9);
        }
    }

    #[test]
    fn psi_weights_random_walk_limit() {
        let model = Arima111 {
            phi: 0.0,
            theta: 0.0,
            sigma2: 1.0,
            residuals: vec![],
            last_value: 0.0,
            next_state: [0.0, 0.0],
        };
        assert_eq!(model.psi_weights(4), vec![1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn rejects_short_or_non_finite() {
        let config = NelderMeadConfig::default();
        assert!(fit_arima_111(&[1.0, 2.0], &config).is_none());
        assert!(fit_arima_111(&[1.0, f64::INFINITY, 3.0, 4.0], &config).is_none());
    }
}
