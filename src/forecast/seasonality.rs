//! Seasonal period detection from lagged autocorrelation.
//!
//! A candidate period `m` is accepted when the Pearson correlation between
//! the series and itself shifted by `m` exceeds [`ACF_THRESHOLD`]. Weekly
//! (7) is checked first, then monthly-of-year (12); when both pass, the
//! longer period wins.

use crate::correlation::pearson;

/// Autocorrelation a lag must exceed to count as seasonal.
pub const ACF_THRESHOLD: f64 = 0.6;

/// Candidate periods in the order they are tested.
pub const CANDIDATE_PERIODS: [usize; 2] = [7, 12];

/// Pearson correlation of `data[..n-lag]` with `data[lag..]`.
///
/// `None` if fewer than two pairs remain or either slice is constant.
pub fn lagged_autocorrelation(data: &[f64], lag: usize) -> Option<f64> {
    if lag == 0 || data.len() < lag + 2 {
        return None;
    }
    let n = data.len();
    pearson(&data[..n - lag], &data[lag..]).map(|c| c.r)
}

/// Detects a seasonal period, testing each candidate only when at least
/// two full cycles are available.
///
/// # Examples
///
/// ```
/// use u_modeling::forecast::detect_seasonality;
///
/// let weekly: Vec<f64> = (0..28).map(|t| [5.0, 1.0, 1.0, 2.0, 3.0, 8.0, 9.0][t % 7]).collect();
/// assert_eq!(detect_seasonality(&weekly), Some(7));
///
/// let flat = vec![3.0; 30];
/// assert_eq!(detect_seasonality(&flat), None);
/// ```
pub fn detect_seasonality(data: &[f64]) -> Option<usize> {
    let mut detected = None;
    for &period in &CANDIDATE_PERIODS {
        if data.len() < 2 * period {
            continue;
        }
        match lagged_autocorrelation(data, period) {
            Some(r) if r > ACF_THRESHOLD => {
                log::debug!("lag-{period} autocorrelation {r:.3} exceeds threshold");
                detected = Some(period);
            }
            Some(r) => log::debug!("lag-{period} autocorrelation {r:.3} below threshold"),
            None => log::debug!("lag-{period} autocorrelation undefined"),
        }
    }
    detected
}
