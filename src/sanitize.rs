//! Transport-boundary sanitization.
//!
//! Response records may carry `NaN` or `±∞` from degenerate inputs. JSON has
//! no representation for those, so every record the engine returns is passed
//! through [`TransportSafe::sanitize_for_transport`], which replaces each
//! non-finite float with 0.0. Callers must not assume any reported statistic
//! was actually finite before this step.
//!
//! # Examples
//!
//! ```
//! use u_modeling::sanitize::{sanitize_for_transport, TransportSafe};
//!
//! assert_eq!(sanitize_for_transport(f64::NAN), 0.0);
//! assert_eq!(sanitize_for_transport(2.5), 2.5);
//!
//! let values = vec![1.0, f64::INFINITY].sanitize_for_transport();
//! assert_eq!(values, vec![1.0, 0.0]);
//! ```

/// Replaces `NaN` and `±∞` with 0.0.
pub fn sanitize_for_transport(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Rounds to `decimals` decimal places (half away from zero).
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// A record whose floats can be made safe for serialization.
pub trait TransportSafe {
    /// Returns the record with every non-finite float replaced by 0.0.
    fn sanitize_for_transport(self) -> Self;
}

impl TransportSafe for f64 {
    fn sanitize_for_transport(self) -> Self {
        sanitize_for_transport(self)
    }
}

impl<T: TransportSafe> TransportSafe for Option<T> {
    fn sanitize_for_transport(self) -> Self {
        self.map(TransportSafe::sanitize_for_transport)
    }
}

impl<T: TransportSafe> TransportSafe for Vec<T> {
    fn sanitize_for_transport(self) -> Self {
        self.into_iter()
            .map(TransportSafe::sanitize_for_transport)
            .collect()
    }
}

impl<T: TransportSafe> TransportSafe for (T, T) {
    fn sanitize_for_transport(self) -> Self {
        (self.0.sanitize_for_transport(), self.1.sanitize_for_transport())
    }
}

impl<T: TransportSafe> TransportSafe for [T; 2] {
    fn sanitize_for_transport(self) -> Self {
        let [a, b] = self;
        [a.sanitize_for_transport(), b.sanitize_for_transport()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_non_finite() {
        assert_eq!(sanitize_for_transport(f64::NAN), 0.0);
        assert_eq!(sanitize_for_transport(f64::INFINITY), 0.0);
        assert_eq!(sanitize_for_transport(f64::NEG_INFINITY), 0.0);
        assert_eq!(sanitize_for_transport(-3.25), -3.25);
    }

    #[test]
    fn nested_containers() {
        let nested = vec![vec![f64::NAN, 1.0], vec![2.0, f64::NEG_INFINITY]];
        assert_eq!(
            nested.sanitize_for_transport(),
            vec![vec![0.0, 1.0], vec![2.0, 0.0]]
        );
        let opt: Option<f64> = Some(f64::INFINITY);
        assert_eq!(opt.sanitize_for_transport(), Some(0.0));
        let none: Option<f64> = None;
        assert_eq!(none.sanitize_for_transport(), None);
    }

    #[test]
    fn rounding() {
        assert_eq!(round_to(0.123_456, 3), 0.123);
        assert_eq!(round_to(0.123_56, 4), 0.1236);
        assert_eq!(round_to(-1.005_01, 2), -1.01);
    }
}
