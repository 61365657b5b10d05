//! Time series forecasting with automatic seasonality and method selection.
//!
//! A request resolves in three steps:
//!
//! 1. **Seasonality**: `auto` runs [`detect_seasonality`]; an explicit
//!    period of 0 or 1 means none.
//! 2. **Method**: `auto` picks additive exponential smoothing when a season
//!    was found and at least two full cycles exist, ARIMA(1,1,1) otherwise.
//! 3. **Fit and forecast**: ARIMA bounds are its normal-theory 95% band.
//!    Exponential smoothing bounds are `forecast ± 1.96·sd(residuals)`, an
//!    approximation rather than a model-based prediction interval.
//!
//! Forecast dates step forward from the last observation by the spacing of
//! the last two observations, so irregular series get evenly spaced dates.
//!
//! # Examples
//!
//! ```
//! use chrono::NaiveDate;
//! use u_modeling::forecast::{forecast, ForecastMethod, ForecastRequest, TimeSeriesPoint};
//! use u_modeling::EngineConfig;
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let data: Vec<TimeSeriesPoint> = (0..36)
//!     .map(|i| TimeSeriesPoint {
//!         date: start + chrono::Months::new(i),
//!         value: 100.0 + 15.0 * ((i % 12) as f64 * std::f64::consts::PI / 6.0).sin(),
//!     })
//!     .collect();
//!
//! let result = forecast(&ForecastRequest::new(data), &EngineConfig::default()).unwrap();
//! assert_eq!(result.seasonality, Some(12));
//! assert_eq!(result.method, ForecastMethod::Ets);
//! assert_eq!(result.forecast.len(), 7);
//! ```

mod arima;
mod seasonality;

pub use arima::{fit_arima_111, Arima111, ArimaForecast};
pub use seasonality::{detect_seasonality, lagged_autocorrelation, ACF_THRESHOLD, CANDIDATE_PERIODS};

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::{ModelingError, Result};
use crate::optimize::NelderMeadConfig;
use crate::sanitize::{round_to, TransportSafe};
use crate::smoothing::fit_additive;
use crate::special::inverse_normal_cdf;
use crate::stats;

/// Minimum number of observations for any forecast.
pub const MIN_OBSERVATIONS: usize = 10;

/// Default forecast horizon.
pub const DEFAULT_PERIODS: usize = 7;

/// Multiplier of the residual standard deviation for smoothing bounds.
pub const ETS_BAND_MULTIPLIER: f64 = 1.96;

const OUTPUT_DECIMALS: i32 = 4;

// ---------------------------------------------------------------------------
// Request and response records
// ---------------------------------------------------------------------------

/// One dated observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Forecasting model family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastMethod {
    #[default]
    Auto,
    Arima,
    Ets,
    /// Reserved name; requesting it fails with `NotImplemented`.
    Prophet,
}

impl ForecastMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Arima => "arima",
            Self::Ets => "ets",
            Self::Prophet => "prophet",
        }
    }
}

impl fmt::Display for ForecastMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ForecastMethod {
    type Err = ModelingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "arima" => Ok(Self::Arima),
            "ets" => Ok(Self::Ets),
            "prophet" => Ok(Self::Prophet),
            other => Err(ModelingError::UnsupportedOperation(format!(
                "forecast method '{other}'"
            ))),
        }
    }
}

/// How the seasonal period is chosen.
///
/// Serialized as `"auto"`, `"none"` or the period itself; a period is also
/// accepted as a numeric string such as `"12"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "SeasonalityRepr", into = "SeasonalityRepr")]
pub enum Seasonality {
    #[default]
    Auto,
    None,
    Period(usize),
}

impl Seasonality {
    /// Resolves to a concrete period (≥ 2) or none.
    pub fn resolve(&self, values: &[f64]) -> Option<usize> {
        match *self {
            Self::Auto => detect_seasonality(values),
            Self::None => None,
            Self::Period(m) if m >= 2 => Some(m),
            Self::Period(_) => None,
        }
    }
}

impl FromStr for Seasonality {
    type Err = ModelingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "none" => Ok(Self::None),
            other => other.parse::<usize>().map(Self::Period).map_err(|_| {
                ModelingError::UnsupportedOperation(format!("seasonality '{other}'"))
            }),
        }
    }
}

/// Wire form of [`Seasonality`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum SeasonalityRepr {
    Period(usize),
    Name(String),
}

impl TryFrom<SeasonalityRepr> for Seasonality {
    type Error = ModelingError;

    fn try_from(repr: SeasonalityRepr) -> Result<Self> {
        match repr {
            SeasonalityRepr::Period(m) => Ok(Self::Period(m)),
            SeasonalityRepr::Name(name) => name.trim().parse(),
        }
    }
}

impl From<Seasonality> for SeasonalityRepr {
    fn from(seasonality: Seasonality) -> Self {
        match seasonality {
            Seasonality::Auto => Self::Name("auto".to_string()),
            Seasonality::None => Self::Name("none".to_string()),
            Seasonality::Period(m) => Self::Period(m),
        }
    }
}

fn default_periods() -> usize {
    DEFAULT_PERIODS
}

/// A forecasting request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRequest {
    pub data: Vec<TimeSeriesPoint>,
    #[serde(default = "default_periods")]
    pub periods: usize,
    #[serde(default)]
    pub method: ForecastMethod,
    #[serde(default)]
    pub seasonality: Seasonality,
}

impl ForecastRequest {
    /// Request with the default horizon and automatic choices.
    pub fn new(data: Vec<TimeSeriesPoint>) -> Self {
        Self {
            data,
            periods: DEFAULT_PERIODS,
            method: ForecastMethod::Auto,
            seasonality: Seasonality::Auto,
        }
    }

    pub fn with_periods(mut self, periods: usize) -> Self {
        self.periods = periods;
        self
    }

    pub fn with_method(mut self, method: ForecastMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_seasonality(mut self, seasonality: Seasonality) -> Self {
        self.seasonality = seasonality;
        self
    }
}

/// One forecast step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub value: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

/// Forecast with the resolved method and in-sample error metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub forecast: Vec<ForecastPoint>,
    /// Method actually fitted (never `auto`).
    pub method: ForecastMethod,
    pub seasonality: Option<usize>,
    /// Mean absolute in-sample residual.
    pub mae: f64,
    /// Mean absolute in-sample residual as a percentage of the observation.
    pub mape: f64,
}

impl TransportSafe for ForecastPoint {
    fn sanitize_for_transport(self) -> Self {
        Self {
            date: self.date,
            value: self.value.sanitize_for_transport(),
            lower_bound: self.lower_bound.sanitize_for_transport(),
            upper_bound: self.upper_bound.sanitize_for_transport(),
        }
    }
}

impl TransportSafe for ForecastResult {
    fn sanitize_for_transport(self) -> Self {
        Self {
            forecast: self.forecast.sanitize_for_transport(),
            mae: self.mae.sanitize_for_transport(),
            mape: self.mape.sanitize_for_transport(),
            ..self
        }
    }
}

// ---------------------------------------------------------------------------
// Forecasting
// ---------------------------------------------------------------------------

struct Projection {
    mean: Vec<f64>,
    lower: Vec<f64>,
    upper: Vec<f64>,
    residuals: Vec<f64>,
}

/// Resolves seasonality and method, fits the model, and forecasts.
///
/// # Errors
///
/// - `InsufficientData` with fewer than [`MIN_OBSERVATIONS`] points, or for
///   seasonal smoothing with fewer than two full cycles.
/// - `InvalidInput` for non-finite values or unrepresentable forecast dates.
/// - `NotImplemented` for [`ForecastMethod::Prophet`].
pub fn forecast(request: &ForecastRequest, config: &EngineConfig) -> Result<ForecastResult> {
    let n = request.data.len();
    if n < MIN_OBSERVATIONS {
        return Err(ModelingError::InsufficientData {
            required: MIN_OBSERVATIONS,
            actual: n,
        });
    }
    if request.data.iter().any(|p| !p.value.is_finite()) {
        return Err(ModelingError::InvalidInput(
            "time series values must be finite".to_string(),
        ));
    }
    if request.method == ForecastMethod::Prophet {
        return Err(ModelingError::NotImplemented(
            "forecast method 'prophet'".to_string(),
        ));
    }

    let mut points = request.data.clone();
    points.sort_by_key(|p| p.date);
    let values: Vec<f64> = points.iter().map(|p| p.value).collect();

    let seasonality = request.seasonality.resolve(&values);
    let method = match request.method {
        ForecastMethod::Auto => match seasonality {
            Some(m) if n >= 2 * m => ForecastMethod::Ets,
            _ => ForecastMethod::Arima,
        },
        explicit => explicit,
    };
    log::debug!(
        "forecasting {} points: seasonality={:?}, method={}",
        n,
        seasonality,
        method
    );

    let search = NelderMeadConfig {
        max_iterations: config.max_iterations,
        tolerance: config.tolerance,
        ..NelderMeadConfig::default()
    };
    let projection = match method {
        ForecastMethod::Ets => project_ets(&values, seasonality, request.periods, &search)?,
        _ => project_arima(&values, request.periods, &search)?,
    };

    let dates = horizon_dates(&points, request.periods)?;
    let forecast = dates
        .into_iter()
        .zip(projection.mean.iter())
        .zip(projection.lower.iter().zip(projection.upper.iter()))
        .map(|((date, &value), (&lower, &upper))| ForecastPoint {
            date,
            value: round_to(value, OUTPUT_DECIMALS),
            lower_bound: round_to(lower, OUTPUT_DECIMALS),
            upper_bound: round_to(upper, OUTPUT_DECIMALS),
        })
        .collect();

    let (mae, mape) = error_metrics(&values, &projection.residuals);

    Ok(ForecastResult {
        forecast,
        method,
        seasonality,
        mae,
        mape,
    }
    .sanitize_for_transport())
}

fn project_arima(values: &[f64], periods: usize, search: &NelderMeadConfig) -> Result<Projection> {
    let model = fit_arima_111(values, search).ok_or_else(|| {
        ModelingError::InvalidInput("ARIMA(1,1,1) likelihood could not be evaluated".to_string())
    })?;
    let z = inverse_normal_cdf(0.975);
    let ArimaForecast { mean, lower, upper } = model.forecast(periods, z);
    Ok(Projection {
        mean,
        lower,
        upper,
        residuals: model.residuals,
    })
}

fn project_ets(
    values: &[f64],
    seasonality: Option<usize>,
    periods: usize,
    search: &NelderMeadConfig,
) -> Result<Projection> {
    if let Some(m) = seasonality {
        if values.len() < 2 * m {
            return Err(ModelingError::InsufficientData {
                required: 2 * m,
                actual: values.len(),
            });
        }
    }
    let fit = fit_additive(values, seasonality, search).ok_or_else(|| {
        ModelingError::InvalidInput("exponential smoothing could not be fitted".to_string())
    })?;
    let mean = fit.forecast(periods).ok_or_else(|| {
        ModelingError::InvalidInput("exponential smoothing produced no forecast".to_string())
    })?;

    let sd = stats::std_dev(&fit.residuals).unwrap_or_else(|| {
        log::warn!("residual standard deviation undefined; using zero-width bounds");
        0.0
    });
    let half_width = ETS_BAND_MULTIPLIER * sd;
    let lower = mean.iter().map(|v| v - half_width).collect();
    let upper = mean.iter().map(|v| v + half_width).collect();

    Ok(Projection {
        mean,
        lower,
        upper,
        residuals: fit.residuals,
    })
}

/// Dates `last + i·(last - second_to_last)` for `i = 1..=periods`.
fn horizon_dates(points: &[TimeSeriesPoint], periods: usize) -> Result<Vec<NaiveDate>> {
    let unrepresentable =
        || ModelingError::InvalidInput("forecast dates are out of range".to_string());
    let (last, previous) = match points {
        [.., previous, last] => (last.date, previous.date),
        _ => return Err(unrepresentable()),
    };
    let step = last.signed_duration_since(previous);
    (1..=periods)
        .map(|i| {
            let i = i32::try_from(i).map_err(|_| unrepresentable())?;
            step.checked_mul(i)
                .and_then(|offset| last.checked_add_signed(offset))
                .ok_or_else(unrepresentable)
        })
        .collect()
}

/// `(mean |e|, 100 · mean |e / y|)` over the in-sample residuals.
fn error_metrics(values: &[f64], residuals: &[f64]) -> (f64, f64) {
    let abs: Vec<f64> = residuals.iter().map(|e| e.abs()).collect();
    let pct: Vec<f64> = residuals
        .iter()
        .zip(values.iter())
        .map(|(e, y)| (e / y).abs())
        .collect();
    let mae = stats::mean(&abs).unwrap_or(f64::NAN);
    let mape = stats::mean(&pct).map_or(f64::NAN, |m| 100.0 * m);
    (mae, mape)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(i: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i)
    }

    fn series(values: &[f64]) -> Vec<TimeSeriesPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| TimeSeriesPoint {
                date: day(i as i64),
                value,
            })
            .collect()
    }

    fn monthly_pattern(n: usize) -> Vec<f64> {
        let pattern = [12.0, 8.0, 15.0, 20.0, 26.0, 31.0, 35.0, 33.0, 27.0, 21.0, 14.0, 10.0];
        (0..n).map(|t| 100.0 + pattern[t % 12] + 0.2 * t as f64).collect()
    }

    fn noisy_walk(n: usize) -> Vec<f64> {
        let mut level = 20.0;
        (0..n)
            .map(|t| {
                let x = (t as f64 * 78.233).sin() * 43758.5453;
                level += x - x.floor() - 0.5;
                level
            })
            .collect()
    }

    #[test]
    fn too_few_points() {
        let request = ForecastRequest::new(series(&[1.0; 9]));
        let err = forecast(&request, &EngineConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            ModelingError::InsufficientData {
                required: 10,
                actual: 9
            }
        ));
    }

    #[test]
    fn non_finite_rejected() {
        let mut values = vec![1.0; 12];
        values[4] = f64::NAN;
        let request = ForecastRequest::new(series(&values));
        assert!(matches!(
            forecast(&request, &EngineConfig::default()),
            Err(ModelingError::InvalidInput(_))
        ));
    }

    #[test]
    fn prophet_not_implemented() {
        let request =
            ForecastRequest::new(series(&noisy_walk(20))).with_method(ForecastMethod::Prophet);
        assert!(matches!(
            forecast(&request, &EngineConfig::default()),
            Err(ModelingError::NotImplemented(_))
        ));
    }

    #[test]
    fn monthly_season_selects_smoothing() {
        let request = ForecastRequest::new(series(&monthly_pattern(36))).with_periods(12);
        let result = forecast(&request, &EngineConfig::default()).unwrap();
        assert_eq!(result.seasonality, Some(12));
        assert_eq!(result.method, ForecastMethod::Ets);
        assert_eq!(result.forecast.len(), 12);
        // Peak month of the next cycle sits above its trough.
        assert!(result.forecast[6].value > result.forecast[1].value);
    }

    #[test]
    fn explicit_season_too_long_for_smoothing() {
        let request = ForecastRequest::new(series(&noisy_walk(15)))
            .with_method(ForecastMethod::Ets)
            .with_seasonality(Seasonality::Period(12));
        assert!(matches!(
            forecast(&request, &EngineConfig::default()),
            Err(ModelingError::InsufficientData {
                required: 24,
                actual: 15
            })
        ));
    }

    #[test]
    fn explicit_season_with_short_series_falls_back_to_arima() {
        let request = ForecastRequest::new(series(&noisy_walk(15)))
            .with_seasonality(Seasonality::Period(12));
        let result = forecast(&request, &EngineConfig::default()).unwrap();
        assert_eq!(result.method, ForecastMethod::Arima);
        assert_eq!(result.seasonality, Some(12));
    }

    #[test]
    fn no_season_uses_arima_with_ordered_bounds() {
        let request = ForecastRequest::new(series(&noisy_walk(30)))
            .with_seasonality(Seasonality::None)
            .with_periods(5);
        let result = forecast(&request, &EngineConfig::default()).unwrap();
        assert_eq!(result.method, ForecastMethod::Arima);
        assert_eq!(result.seasonality, None);
        for p in &result.forecast {
            assert!(p.lower_bound <= p.value && p.value <= p.upper_bound);
        }
        assert!(result.mae >= 0.0);
    }

    #[test]
    fn smoothing_bounds_are_symmetric() {
        let request = ForecastRequest::new(series(&noisy_walk(25)))
            .with_method(ForecastMethod::Ets)
            .with_seasonality(Seasonality::None);
        let result = forecast(&request, &EngineConfig::default()).unwrap();
        assert_eq!(result.method, ForecastMethod::Ets);
        let widths: Vec<f64> = result
            .forecast
            .iter()
            .map(|p| p.upper_bound - p.lower_bound)
            .collect();
        for w in &widths {
            assert!((w - widths[0]).abs() < 1e-3);
        }
    }

    #[test]
    fn dates_follow_last_spacing_after_sorting() {
        let mut points = series(&noisy_walk(12));
        points.reverse();
        // Last spacing becomes 3 days.
        points[0].date = day(13);
        let request = ForecastRequest::new(points).with_periods(3);
        let result = forecast(&request, &EngineConfig::default()).unwrap();
        let dates: Vec<NaiveDate> = result.forecast.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![day(16), day(19), day(22)]);
    }

    #[test]
    fn values_rounded_to_four_decimals() {
        let request = ForecastRequest::new(series(&noisy_walk(20)));
        let result = forecast(&request, &EngineConfig::default()).unwrap();
        for p in &result.forecast {
            assert_eq!(p.value, round_to(p.value, 4));
            assert_eq!(p.upper_bound, round_to(p.upper_bound, 4));
        }
    }

    #[test]
    fn error_metrics_percentages() {
        let (mae, mape) = error_metrics(&[10.0, 20.0], &[1.0, -4.0]);
        assert!((mae - 2.5).abs() < 1e-12);
        assert!((mape - 15.0).abs() < 1e-12);
    }

    #[test]
    fn parse_names() {
        assert_eq!("ARIMA".parse::<ForecastMethod>().unwrap(), ForecastMethod::Arima);
        assert!("holt".parse::<ForecastMethod>().is_err());
        assert_eq!("12".parse::<Seasonality>().unwrap(), Seasonality::Period(12));
        assert_eq!("none".parse::<Seasonality>().unwrap(), Seasonality::None);
        assert_eq!(Seasonality::Period(1).resolve(&[1.0, 2.0]), None);
    }

    #[test]
    fn seasonality_wire_forms() {
        let parse = |json: &str| serde_json::from_str::<Seasonality>(json);
        assert_eq!(parse("12").unwrap(), Seasonality::Period(12));
        assert_eq!(parse(r#""12""#).unwrap(), Seasonality::Period(12));
        assert_eq!(parse(r#""auto""#).unwrap(), Seasonality::Auto);
        assert_eq!(parse(r#""None""#).unwrap(), Seasonality::None);
        assert!(parse(r#""weekly""#).is_err());

        assert_eq!(serde_json::to_string(&Seasonality::Period(7)).unwrap(), "7");
        assert_eq!(serde_json::to_string(&Seasonality::None).unwrap(), r#""none""#);

        let json = r#"{"data":[{"date":"2024-01-01","value":1.0}],"seasonality":"7"}"#;
        let request: ForecastRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.seasonality, Seasonality::Period(7));
    }

    #[test]
    fn request_defaults_from_json() {
        let json = r#"{"data":[{"date":"2024-01-01","value":1.0}]}"#;
        let request: ForecastRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.periods, 7);
        assert_eq!(request.method, ForecastMethod::Auto);
        assert_eq!(request.seasonality, Seasonality::Auto);
    }
}
