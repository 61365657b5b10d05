//! Holt's Linear (Double Exponential) Smoothing.
//!
//! Exponential smoothing with an additive trend component for series that
//! drift without a seasonal cycle.
//!
//! # Algorithm
//!
//! ```text
//! Level:   L_t = α x_t + (1 - α)(L_{t-1} + T_{t-1})
//! Trend:   T_t = β (L_t - L_{t-1}) + (1 - β) T_{t-1}
//! Forecast: F_{t+h} = L_t + h T_t
//! ```
//!
//! where α ∈ (0, 1) is the level smoothing constant and
//! β ∈ (0, 1) is the trend smoothing constant.
//!
//! # Reference
//!
//! Holt, C.C. (1957). "Forecasting Seasonals and Trends by
//! Exponentially Weighted Moving Averages", ONR Memo 52.

/// Result of Holt's linear smoothing at each time step.
#[derive(Debug, Clone)]
pub struct HoltResult {
    /// Level estimates.
    pub level: Vec<f64>,
    /// Trend estimates.
    pub trend: Vec<f64>,
    /// Fitted values (level + trend from the previous state).
    pub fitted: Vec<f64>,
}

impl HoltResult {
    /// Forecast h steps ahead from the last observation.
    ///
    /// `None` if the result holds no states.
    pub fn forecast(&self, h: usize) -> Option<f64> {
        let last_l = *self.level.last()?;
        let last_t = *self.trend.last()?;
        Some(last_l + h as f64 * last_t)
    }
}

/// Holt's Linear Exponential Smoothing.
#[derive(Debug, Clone, Copy)]
pub struct HoltLinear {
    alpha: f64,
    beta: f64,
}

impl HoltLinear {
    /// Creates a new Holt smoother.
    ///
    /// # Parameters
    /// - `alpha`: level smoothing constant ∈ (0, 1)
    /// - `beta`: trend smoothing constant ∈ (0, 1)
    ///
    /// Returns `None` if parameters are out of range.
    pub fn new(alpha: f64, beta: f64) -> Option<Self> {
        if !alpha.is_finite() || alpha <= 0.0 || alpha >= 1.0 {
            return None;
        }
        if !beta.is_finite() || beta <= 0.0 || beta >= 1.0 {
            return None;
        }
        Some(Self { alpha, beta })
    }

    /// Returns α.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Returns β.
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Heuristic pre-sample state `(level, trend)`: the state one step
    /// before the first observation that puts the first one-step forecast on
    /// the first observation and the trend on the first difference.
    ///
    /// Returns `None` if data has fewer than 2 points.
    pub fn initial_state(data: &[f64]) -> Option<(f64, f64)> {
        if data.len() < 2 {
            return None;
        }
        let trend = data[1] - data[0];
        Some((data[0] - trend, trend))
    }

    /// Applies Holt's linear smoothing from the heuristic initial state.
    ///
    /// Returns `None` if data has fewer than 2 points.
    pub fn smooth(&self, data: &[f64]) -> Option<HoltResult> {
        let (level, trend) = Self::initial_state(data)?;
        self.smooth_from(data, level, trend)
    }

    /// Filters every observation starting from the pre-sample `level` and
    /// `trend`.
    ///
    /// Returns `None` for empty data or a non-finite initial state.
    pub fn smooth_from(&self, data: &[f64], level: f64, trend: f64) -> Option<HoltResult> {
        if data.is_empty() || !level.is_finite() || !trend.is_finite() {
            return None;
        }

        let n = data.len();
        let mut levels = Vec::with_capacity(n);
        let mut trends = Vec::with_capacity(n);
        let mut fitted = Vec::with_capacity(n);

        let (mut l_prev, mut t_prev) = (level, trend);
        for &x in data {
            let l = self.alpha * x + (1.0 - self.alpha) * (l_prev + t_prev);
            let t = self.beta * (l - l_prev) + (1.0 - self.beta) * t_prev;

            fitted.push(l_prev + t_prev); // one-step-ahead forecast
            levels.push(l);
            trends.push(t);
            l_prev = l;
            t_prev = t;
        }

        Some(HoltResult {
            level: levels,
            trend: trends,
            fitted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_holt_linear_trend() {
        let holt = HoltLinear::new(0.5, 0.5).unwrap();
        let data = [10.0, 12.0, 14.0, 16.0, 18.0];
        let result = holt.smooth(&data).unwrap();

        // Exact line: level and trend stay on it.
        let f1 = result.forecast(1).unwrap();
        assert!((f1 - 20.0).abs() < 1e-10, "forecast(1) = {f1}");
        assert!(result
            .fitted
            .iter()
            .zip(data.iter())
            .all(|(f, d)| (f - d).abs() < 1e-10));
    }

    #[test]
    fn test_holt_constant_series() {
        let holt = HoltLinear::new(0.3, 0.3).unwrap();
        let result = holt.smooth(&[5.0; 20]).unwrap();
        let last_trend = *result.trend.last().unwrap();
        assert!(last_trend.abs() < 1e-12);
    }

    #[test]
    fn test_holt_forecast_multi_step() {
        let holt = HoltLinear::new(0.5, 0.5).unwrap();
        let data = [10.0, 13.0, 14.0, 17.0, 18.0];
        let result = holt.smooth(&data).unwrap();
        let f1 = result.forecast(1).unwrap();
        let f3 = result.forecast(3).unwrap();
        assert!(f1 < f3);
    }

    #[test]
    fn test_holt_insufficient_data() {
        let holt = HoltLinear::new(0.5, 0.5).unwrap();
        assert!(holt.smooth(&[10.0]).is_none());
        assert!(holt.smooth(&[]).is_none());
    }

    #[test]
    fn test_holt_invalid_params() {
        assert!(HoltLinear::new(0.0, 0.5).is_none());
        assert!(HoltLinear::new(1.0, 0.5).is_none());
        assert!(HoltLinear::new(0.5, 0.0).is_none());
        assert!(HoltLinear::new(f64::NAN, 0.5).is_none());
    }

    #[test]
    fn test_holt_smooth_from_explicit_state() {
        let holt = HoltLinear::new(0.4, 0.2).unwrap();
        let data = [5.0, 7.0, 9.0];
        // Pre-sample state on the line through the data.
        let result = holt.smooth_from(&data, 3.0, 2.0).unwrap();
        assert!((result.fitted[0] - 5.0).abs() < 1e-12);
        assert!((result.forecast(2).unwrap() - 13.0).abs() < 1e-10);
        assert!(holt.smooth_from(&data, f64::NAN, 2.0).is_none());
        assert!(holt.smooth_from(&[], 3.0, 2.0).is_none());
    }

    #[test]
    fn test_holt_initial_state() {
        assert_eq!(HoltLinear::initial_state(&[10.0, 13.0, 11.0]), Some((7.0, 3.0)));
        assert_eq!(HoltLinear::initial_state(&[10.0]), None);
    }

    #[test]
    fn test_holt_empty_result_has_no_forecast() {
        let empty = HoltResult {
            level: vec![],
            trend: vec![],
            fitted: vec![],
        };
        assert!(empty.forecast(1).is_none());
    }
}
