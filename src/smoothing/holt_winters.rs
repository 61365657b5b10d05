//! Additive Holt-Winters (Triple Exponential) Smoothing.
//!
//! Holt's method with an additive seasonal component of fixed period.
//!
//! # Algorithm
//!
//! ```text
//! Level:    L_t = α (x_t - S_{t-m}) + (1 - α)(L_{t-1} + T_{t-1})
//! Trend:    T_t = β (L_t - L_{t-1}) + (1 - β) T_{t-1}
//! Season:   S_t = γ (x_t - L_t) + (1 - γ) S_{t-m}
//! Forecast: F_{t+h} = L_t + h T_t + S_{t-m+h_m}
//! ```
//!
//! Every observation is filtered from a pre-sample state. The heuristic
//! state takes the first cycle's mean and the average per-step change
//! between the first two cycles as a line, and the first cycle's deviations
//! from that line as seasonal factors.
//!
//! # Reference
//!
//! Winters, P.R. (1960). "Forecasting Sales by Exponentially Weighted
//! Moving Averages", *Management Science* 6(3), pp. 324-342.

/// Result of Holt-Winters smoothing.
#[derive(Debug, Clone)]
pub struct HoltWintersResult {
    /// Level estimates.
    pub level: Vec<f64>,
    /// Trend estimates.
    pub trend: Vec<f64>,
    /// Seasonal factors, one per observation.
    pub seasonal: Vec<f64>,
    /// Fitted values (one-step-ahead in-sample forecasts).
    pub fitted: Vec<f64>,
    /// Seasonal period m.
    pub period: usize,
}

impl HoltWintersResult {
    /// Forecast h steps ahead (h ≥ 1) from the last observation, using the
    /// seasonal factors of the most recent cycle.
    ///
    /// `None` if h is 0 or fewer than one cycle of states exists.
    pub fn forecast(&self, h: usize) -> Option<f64> {
        let m = self.period;
        if h == 0 || m == 0 || self.seasonal.len() < m {
            return None;
        }
        let last_l = *self.level.last()?;
        let last_t = *self.trend.last()?;
        let idx = self.seasonal.len() - m + ((h - 1) % m);
        Some(last_l + h as f64 * last_t + self.seasonal[idx])
    }
}

/// Additive Holt-Winters smoother.
#[derive(Debug, Clone, Copy)]
pub struct HoltWinters {
    alpha: f64,
    beta: f64,
    gamma: f64,
    period: usize,
}

impl HoltWinters {
    /// Creates a new Holt-Winters smoother.
    ///
    /// # Parameters
    /// - `alpha`: level smoothing constant ∈ (0, 1)
    /// - `beta`: trend smoothing constant ∈ (0, 1)
    /// - `gamma`: seasonal smoothing constant ∈ (0, 1)
    /// - `period`: seasonal period (must be ≥ 2)
    ///
    /// Returns `None` if parameters are invalid.
    pub fn new(alpha: f64, beta: f64, gamma: f64, period: usize) -> Option<Self> {
        for v in [alpha, beta, gamma] {
            if !v.is_finite() || v <= 0.0 || v >= 1.0 {
                return None;
            }
        }
        if period < 2 {
            return None;
        }
        Some(Self {
            alpha,
            beta,
            gamma,
            period,
        })
    }

    /// Returns the seasonal period.
    pub fn period(&self) -> usize {
        self.period
    }

    /// Returns (α, β, γ).
    pub fn parameters(&self) -> (f64, f64, f64) {
        (self.alpha, self.beta, self.gamma)
    }

    /// Heuristic pre-sample state `(level, trend, seasonal)` for `period`.
    ///
    /// The first cycle's mean and the average per-step change between the
    /// first two cycles define a line; the level is that line one step before
    /// the first observation and the seasonal factors are the first cycle's
    /// deviations from it (they sum to zero).
    ///
    /// Returns `None` with `period < 2` or fewer than `2 * period` points.
    pub fn initial_state(data: &[f64], period: usize) -> Option<(f64, f64, Vec<f64>)> {
        let m = period;
        if m < 2 || data.len() < 2 * m {
            return None;
        }
        let mf = m as f64;
        let mean: f64 = data[..m].iter().sum::<f64>() / mf;
        let trend: f64 = (0..m).map(|i| (data[m + i] - data[i]) / mf).sum::<f64>() / mf;
        let centre = (mf - 1.0) / 2.0;
        let seasonal = (0..m)
            .map(|i| data[i] - (mean + trend * (i as f64 - centre)))
            .collect();
        Some((mean - trend * (centre + 1.0), trend, seasonal))
    }

    /// Applies Holt-Winters smoothing from the heuristic initial state.
    ///
    /// Returns `None` with fewer than `2 * period` data points.
    pub fn smooth(&self, data: &[f64]) -> Option<HoltWintersResult> {
        let (level, trend, seasonal) = Self::initial_state(data, self.period)?;
        self.smooth_from(data, level, trend, &seasonal)
    }

    /// Filters every observation starting from the pre-sample `level` and
    /// `trend` and the seasonal factors of the `period` steps before the
    /// first observation.
    ///
    /// Returns `None` for empty data, a seasonal slice whose length is not the
    /// period, or a non-finite initial state.
    pub fn smooth_from(
        &self,
        data: &[f64],
        level: f64,
        trend: f64,
        seasonal: &[f64],
    ) -> Option<HoltWintersResult> {
        let m = self.period;
        if data.is_empty() || seasonal.len() != m {
            return None;
        }
        if !level.is_finite() || !trend.is_finite() || seasonal.iter().any(|s| !s.is_finite()) {
            return None;
        }

        let n = data.len();
        // Seasonal states: m pre-sample factors, then one per observation.
        let mut factors = Vec::with_capacity(m + n);
        factors.extend_from_slice(seasonal);
        let mut levels = Vec::with_capacity(n);
        let mut trends = Vec::with_capacity(n);
        let mut fitted = Vec::with_capacity(n);

        let (mut l_prev, mut b_prev) = (level, trend);
        for (t, &x) in data.iter().enumerate() {
            let s_prev = factors[t];

            let l = self.alpha * (x - s_prev) + (1.0 - self.alpha) * (l_prev + b_prev);
            let b = self.beta * (l - l_prev) + (1.0 - self.beta) * b_prev;
            let s = self.gamma * (x - l) + (1.0 - self.gamma) * s_prev;

            fitted.push(l_prev + b_prev + s_prev);
            levels.push(l);
            trends.push(b);
            factors.push(s);
            l_prev = l;
            b_prev = b;
        }

        Some(HoltWintersResult {
            level: levels,
            trend: trends,
            seasonal: factors.split_off(m),
            fitted,
            period: m,
        })
    }
}
