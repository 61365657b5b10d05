//! Distribution functions used for inference.
//!
//! Thin wrappers over `statrs` that never panic: invalid parameters
//! (non-positive degrees of freedom, NaN arguments) produce `NaN`, which the
//! transport boundary later maps to 0.0.

use statrs::distribution::{ContinuousCDF, FisherSnedecor, Normal, StudentsT};

/// CDF of Student's t-distribution with `df` degrees of freedom.
pub fn t_distribution_cdf(t: f64, df: f64) -> f64 {
    if t.is_nan() {
        return f64::NAN;
    }
    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => {
            if t == f64::INFINITY {
                1.0
            } else if t == f64::NEG_INFINITY {
                0.0
            } else {
                dist.cdf(t)
            }
        }
        Err(_) => f64::NAN,
    }
}

/// Two-sided p-value for a t-statistic: 2·(1 − T(|t|)).
pub fn t_two_sided_p_value(t: f64, df: f64) -> f64 {
    2.0 * (1.0 - t_distribution_cdf(t.abs(), df))
}

/// CDF of the F-distribution with (`d1`, `d2`) degrees of freedom.
pub fn f_distribution_cdf(f: f64, d1: f64, d2: f64) -> f64 {
    if f.is_nan() {
        return f64::NAN;
    }
    if f <= 0.0 {
        return 0.0;
    }
    if f == f64::INFINITY {
        return 1.0;
    }
    match FisherSnedecor::new(d1, d2) {
        Ok(dist) => dist.cdf(f),
        Err(_) => f64::NAN,
    }
}

/// CDF of the standard normal distribution.
pub fn standard_normal_cdf(z: f64) -> f64 {
    if z.is_nan() {
        return f64::NAN;
    }
    Normal::standard().cdf(z)
}

/// Quantile function of the standard normal distribution.
///
/// Returns `NaN` for `p` outside (0, 1).
pub fn inverse_normal_cdf(p: f64) -> f64 {
    if !(p > 0.0 && p < 1.0) {
        return f64::NAN;
    }
    Normal::standard().inverse_cdf(p)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_cdf_symmetry() {
        let lo = t_distribution_cdf(-1.5, 7.0);
        let hi = t_distribution_cdf(1.5, 7.0);
        assert!((lo + hi - 1.0).abs() < 1e-12);
        assert!((t_distribution_cdf(0.0, 3.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn t_cdf_known_value() {
        // t_{0.975, 10} = 2.228138852
        let c = t_distribution_cdf(2.228_138_852, 10.0);
        assert!((c - 0.975).abs() < 1e-6, "cdf = {c}");
    }

    #[test]
    fn t_cdf_infinite_and_invalid() {
        assert_eq!(t_distribution_cdf(f64::INFINITY, 4.0), 1.0);
        assert_eq!(t_distribution_cdf(f64::NEG_INFINITY, 4.0), 0.0);
        assert!(t_distribution_cdf(1.0, 0.0).is_nan());
        assert!(t_distribution_cdf(f64::NAN, 4.0).is_nan());
    }

    #[test]
    fn two_sided_p_value_bounds() {
        assert!((t_two_sided_p_value(0.0, 5.0) - 1.0).abs() < 1e-12);
        assert!(t_two_sided_p_value(50.0, 5.0) < 1e-6);
        assert_eq!(t_two_sided_p_value(f64::INFINITY, 5.0), 0.0);
    }

    #[test]
    fn f_cdf_known_value() {
        // F_{0.95}(2, 10) = 4.102821
        let c = f_distribution_cdf(4.102_821, 2.0, 10.0);
        assert!((c - 0.95).abs() < 1e-5, "cdf = {c}");
        assert_eq!(f_distribution_cdf(0.0, 2.0, 10.0), 0.0);
        assert_eq!(f_distribution_cdf(f64::INFINITY, 2.0, 10.0), 1.0);
    }

    #[test]
    fn normal_quantiles() {
        assert!((inverse_normal_cdf(0.975) - 1.959_963_985).abs() < 1e-6);
        assert!((standard_normal_cdf(1.959_963_985) - 0.975).abs() < 1e-8);
        assert!(inverse_normal_cdf(1.0).is_nan());
    }
}
