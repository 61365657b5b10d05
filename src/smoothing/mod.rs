//! Exponential smoothing.
//!
//! Additive-trend smoothers with fixed constants, plus a fitting layer that
//! estimates the constants from the data.
//!
//! # Methods
//!
//! - [`HoltLinear`]: double exponential smoothing with trend (Holt, 1957)
//! - [`HoltWinters`]: triple exponential smoothing with additive trend and
//!   seasonality (Winters, 1960)
//! - [`fit_additive`]: either of the above with SSE-optimal constants
//!
//! # References
//!
//! - Holt, C.C. (1957). "Forecasting Seasonals and Trends by
//!   Exponentially Weighted Moving Averages", ONR Memo 52.
//! - Winters, P.R. (1960). "Forecasting Sales by Exponentially Weighted
//!   Moving Averages", *Management Science* 6(3), pp. 324-342.

mod ets;
mod holt;
mod holt_winters;

pub use ets::{fit_additive, EtsFit};
pub use holt::{HoltLinear, HoltResult};
pub use holt_winters::{HoltWinters, HoltWintersResult};
