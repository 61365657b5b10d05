//! Additive exponential smoothing with estimated parameters.
//!
//! Estimates the smoothing constants α, β (and γ for a seasonal model)
//! jointly with the pre-sample level, trend and seasonal factors by
//! minimizing the in-sample sum of squared one-step-ahead errors.
//!
//! # Algorithm
//!
//! The search runs Nelder-Mead over an unconstrained vector:
//!
//! ```text
//! [logit α, logit β, (logit γ), l₀/σ, b₀/σ, (s₀/σ, …, s_{m-2}/σ)]
//! ```
//!
//! where σ is the sample standard deviation of the series. The last seasonal
//! factor is `-Σ s_i`, so the factors sum to zero and do not compete with the
//! level. The search starts from α = 0.5, β = γ = 0.1 and the heuristic
//! initial state of [`HoltLinear::initial_state`] or
//! [`HoltWinters::initial_state`].

use crate::optimize::{nelder_mead, NelderMeadConfig};
use crate::stats;

use super::holt::{HoltLinear, HoltResult};
use super::holt_winters::{HoltWinters, HoltWintersResult};

const START_ALPHA: f64 = 0.5;
const START_BETA: f64 = 0.1;
const START_GAMMA: f64 = 0.1;

#[derive(Debug, Clone)]
enum States {
    Trend(HoltResult),
    Seasonal(HoltWintersResult),
}

/// An additive trend (and optionally additive seasonal) model fitted to a
/// series.
#[derive(Debug, Clone)]
pub struct EtsFit {
    pub alpha: f64,
    pub beta: f64,
    /// Seasonal smoothing constant, `None` for a non-seasonal model.
    pub gamma: Option<f64>,
    pub period: Option<usize>,
    /// Estimated level one step before the first observation.
    pub initial_level: f64,
    /// Estimated trend one step before the first observation.
    pub initial_trend: f64,
    /// Estimated seasonal factors of the `period` steps before the first
    /// observation; empty for a non-seasonal model.
    pub initial_seasonal: Vec<f64>,
    /// One-step-ahead in-sample forecasts.
    pub fitted: Vec<f64>,
    /// Observation minus fitted value.
    pub residuals: Vec<f64>,
    /// Sum of squared residuals.
    pub sse: f64,
    states: States,
}

impl EtsFit {
    /// Point forecasts for steps 1..=periods.
    pub fn forecast(&self, periods: usize) -> Option<Vec<f64>> {
        (1..=periods)
            .map(|h| match &self.states {
                States::Trend(r) => r.forecast(h),
                States::Seasonal(r) => r.forecast(h),
            })
            .collect()
    }
}

fn unit(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn logit(p: f64) -> f64 {
    (p / (1.0 - p)).ln()
}

fn sse(data: &[f64], fitted: &[f64]) -> f64 {
    data.iter()
        .zip(fitted.iter())
        .map(|(d, f)| (d - f).powi(2))
        .sum()
}

/// Smoothing constants and pre-sample state decoded from a search vector.
struct Candidate {
    constants: Vec<f64>,
    level: f64,
    trend: f64,
    seasonal: Vec<f64>,
}

/// Layout of the search vector for one model shape.
struct Layout {
    period: Option<usize>,
    scale: f64,
}

impl Layout {
    fn n_constants(&self) -> usize {
        if self.period.is_some() {
            3
        } else {
            2
        }
    }

    fn encode(&self, constants: &[f64], level: f64, trend: f64, seasonal: &[f64]) -> Vec<f64> {
        let mut z: Vec<f64> = constants.iter().map(|&c| logit(c)).collect();
        z.push(level / self.scale);
        z.push(trend / self.scale);
        if let Some(m) = self.period {
            z.extend(seasonal.iter().take(m - 1).map(|s| s / self.scale));
        }
        z
    }

    fn decode(&self, z: &[f64]) -> Candidate {
        let k = self.n_constants();
        let constants = z[..k].iter().map(|&v| unit(v)).collect();
        let level = z[k] * self.scale;
        let trend = z[k + 1] * self.scale;
        let seasonal = match self.period {
            Some(_) => {
                let mut s: Vec<f64> = z[k + 2..].iter().map(|v| v * self.scale).collect();
                let last = -s.iter().sum::<f64>();
                s.push(last);
                s
            }
            None => Vec::new(),
        };
        Candidate {
            constants,
            level,
            trend,
            seasonal,
        }
    }

    fn run(&self, data: &[f64], c: &Candidate) -> Option<(States, Vec<f64>)> {
        match self.period {
            Some(m) => {
                let hw = HoltWinters::new(c.constants[0], c.constants[1], c.constants[2], m)?;
                let r = hw.smooth_from(data, c.level, c.trend, &c.seasonal)?;
                let fitted = r.fitted.clone();
                Some((States::Seasonal(r), fitted))
            }
            None => {
                let holt = HoltLinear::new(c.constants[0], c.constants[1])?;
                let r = holt.smooth_from(data, c.level, c.trend)?;
                let fitted = r.fitted.clone();
                Some((States::Trend(r), fitted))
            }
        }
    }

    /// Heuristic starting vector, `None` if the series is too short.
    fn start(&self, data: &[f64]) -> Option<Vec<f64>> {
        match self.period {
            Some(m) => {
                let (level, trend, seasonal) = HoltWinters::initial_state(data, m)?;
                Some(self.encode(&[START_ALPHA, START_BETA, START_GAMMA], level, trend, &seasonal))
            }
            None => {
                let (level, trend) = HoltLinear::initial_state(data)?;
                Some(self.encode(&[START_ALPHA, START_BETA], level, trend, &[]))
            }
        }
    }
}

/// Fits an additive-trend model, seasonal with period `period` when given.
///
/// # Returns
///
/// `None` if the series is too short (fewer than 2 points, or fewer than two
/// full cycles for a seasonal model) or contains non-finite values.
///
/// # Examples
///
/// ```
/// use u_modeling::optimize::NelderMeadConfig;
/// use u_modeling::smoothing::fit_additive;
///
/// let data: Vec<f64> = (0..30).map(|t| 10.0 + 0.5 * t as f64).collect();
/// let fit = fit_additive(&data, None, &NelderMeadConfig::default()).unwrap();
/// let next = fit.forecast(1).unwrap()[0];
/// assert!((next - 25.0).abs() < 1e-6);
/// ```
pub fn fit_additive(
    data: &[f64],
    period: Option<usize>,
    config: &NelderMeadConfig,
) -> Option<EtsFit> {
    if data.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let scale = stats::std_dev(data).filter(|s| *s > 0.0).unwrap_or(1.0);
    let layout = Layout { period, scale };
    let start = layout.start(data)?;

    let objective = |z: &[f64]| match layout.run(data, &layout.decode(z)) {
        Some((_, fitted)) => sse(data, &fitted),
        None => f64::NAN,
    };
    let best = nelder_mead(objective, &start, config)?;
    if !best.converged {
        log::warn!(
            "smoothing parameter search stopped after {} iterations",
            best.iterations
        );
    }

    let candidate = layout.decode(&best.point);
    let (states, fitted) = layout.run(data, &candidate)?;
    let residuals: Vec<f64> = data
        .iter()
        .zip(fitted.iter())
        .map(|(d, f)| d - f)
        .collect();

    Some(EtsFit {
        alpha: candidate.constants[0],
        beta: candidate.constants[1],
        gamma: period.map(|_| candidate.constants[2]),
        period,
        initial_level: candidate.level,
        initial_trend: candidate.trend,
        initial_seasonal: candidate.seasonal,
        sse: sse(data, &fitted),
        fitted,
        residuals,
        states,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seasonal_series(n: usize, period: usize) -> Vec<f64> {
        (0..n)
            .map(|t| {
                let phase = 2.0 * std::f64::consts::PI * (t % period) as f64 / period as f64;
                50.0 + 0.8 * t as f64 + 6.0 * phase.sin()
            })
            .collect()
    }

    fn wobble(t: usize) -> f64 {
        let x = (t as f64 * 12.9898).sin() * 43758.5453;
        x - x.floor() - 0.5
    }

    fn start_sse(data: &[f64], period: Option<usize>) -> f64 {
        let scale = stats::std_dev(data).unwrap();
        let layout = Layout { period, scale };
        let start = layout.start(data).unwrap();
        let (_, fitted) = layout.run(data, &layout.decode(&start)).unwrap();
        sse(data, &fitted)
    }

    #[test]
    fn trend_model_extrapolates_line() {
        let data: Vec<f64> = (0..20).map(|t| 3.0 - 1.5 * t as f64).collect();
        let fit = fit_additive(&data, None, &NelderMeadConfig::default()).unwrap();
        let f = fit.forecast(3).unwrap();
        assert!((f[2] - (3.0 - 1.5 * 22.0)).abs() < 1e-6, "forecast = {f:?}");
        assert!(fit.sse < 1e-12);
        assert!(fit.gamma.is_none());
        assert!(fit.initial_seasonal.is_empty());
    }

    #[test]
    fn seasonal_model_improves_on_starting_point() {
        let data: Vec<f64> = seasonal_series(36, 6)
            .iter()
            .enumerate()
            .map(|(t, v)| v + wobble(t))
            .collect();
        let fit = fit_additive(&data, Some(6), &NelderMeadConfig::default()).unwrap();
        assert!(fit.sse <= start_sse(&data, Some(6)) + 1e-9);
        assert_eq!(fit.period, Some(6));
        let g = fit.gamma.unwrap();
        assert!(g > 0.0 && g < 1.0);
        assert_eq!(fit.forecast(8).unwrap().len(), 8);
    }

    #[test]
    fn initial_state_is_estimated() {
        // A level shift in the first observation moves the estimated state
        // away from the heuristic one while the constants stay admissible.
        let mut data: Vec<f64> = (0..24).map(|t| 20.0 + 0.3 * t as f64 + wobble(t)).collect();
        data[0] += 3.0;
        let fit = fit_additive(&data, None, &NelderMeadConfig::default()).unwrap();
        assert!(fit.sse <= start_sse(&data, None) + 1e-9);
        assert!(fit.alpha > 0.0 && fit.alpha < 1.0);
        assert_eq!(fit.residuals.len(), data.len());
    }

    #[test]
    fn seasonal_factors_sum_to_zero() {
        let data = seasonal_series(24, 4);
        let fit = fit_additive(&data, Some(4), &NelderMeadConfig::default()).unwrap();
        assert_eq!(fit.initial_seasonal.len(), 4);
        assert!(fit.initial_seasonal.iter().sum::<f64>().abs() < 1e-9);
    }

    #[test]
    fn seasonal_model_needs_two_cycles() {
        let data = seasonal_series(11, 6);
        assert!(fit_additive(&data, Some(6), &NelderMeadConfig::default()).is_none());
    }

    #[test]
    fn rejects_non_finite() {
        let data = [1.0, 2.0, f64::NAN, 4.0];
        assert!(fit_additive(&data, None, &NelderMeadConfig::default()).is_none());
    }
}
