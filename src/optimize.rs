//! Derivative-free minimization.
//!
//! The Nelder-Mead downhill simplex is used wherever a model's objective has
//! no convenient closed-form gradient: the concentrated ARIMA likelihood and
//! the in-sample SSE of exponential smoothing.
//!
//! # Reference
//!
//! Nelder, J.A. & Mead, R. (1965). "A Simplex Method for Function
//! Minimization", *The Computer Journal* 7(4), pp. 308-313.

/// Nelder-Mead settings.
#[derive(Debug, Clone, Copy)]
pub struct NelderMeadConfig {
    /// Maximum number of simplex iterations.
    pub max_iterations: usize,
    /// Stop when the spread of objective values across the simplex is below this.
    pub tolerance: f64,
    /// Edge length of the initial simplex along each axis.
    pub initial_step: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            tolerance: 1e-10,
            initial_step: 0.5,
        }
    }
}

/// Result of a Nelder-Mead run.
#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    /// Best point found.
    pub point: Vec<f64>,
    /// Objective value at `point`.
    pub value: f64,
    /// Iterations performed.
    pub iterations: usize,
    /// Whether the tolerance criterion was met before the iteration cap.
    pub converged: bool,
}

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Minimizes `objective` starting from `start`.
///
/// Non-finite objective values are treated as `+∞`, so the objective may
/// signal an infeasible point by returning `NaN` or `∞`.
///
/// Returns `None` if `start` is empty or the objective is non-finite at
/// every vertex of the initial simplex.
pub fn nelder_mead<F>(
    objective: F,
    start: &[f64],
    config: &NelderMeadConfig,
) -> Option<NelderMeadResult>
where
    F: Fn(&[f64]) -> f64,
{
    let dim = start.len();
    if dim == 0 {
        return None;
    }

    let eval = |x: &[f64]| {
        let v = objective(x);
        if v.is_finite() {
            v
        } else {
            f64::INFINITY
        }
    };

    // Initial simplex: start plus one step along each axis.
    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(dim + 1);
    simplex.push(start.to_vec());
    for i in 0..dim {
        let mut vertex = start.to_vec();
        vertex[i] += config.initial_step;
        simplex.push(vertex);
    }
    let mut values: Vec<f64> = simplex.iter().map(|v| eval(v.as_slice())).collect();

    if values.iter().all(|v| v.is_infinite()) {
        return None;
    }

    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iterations {
        iterations += 1;

        // Order vertices by objective value.
        let mut order: Vec<usize> = (0..=dim).collect();
        order.sort_by(|&a, &b| {
            values[a]
                .partial_cmp(&values[b])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        simplex = order.iter().map(|&i| simplex[i].clone()).collect();
        values = order.iter().map(|&i| values[i]).collect();

        let best = values[0];
        let worst = values[dim];
        if worst.is_finite() && (worst - best).abs() <= config.tolerance * (1.0 + best.abs()) {
            converged = true;
            break;
        }

        // Centroid of all but the worst vertex.
        let mut centroid = vec![0.0; dim];
        for vertex in simplex.iter().take(dim) {
            for (c, &x) in centroid.iter_mut().zip(vertex.iter()) {
                *c += x / dim as f64;
            }
        }

        let worst_vertex = simplex[dim].clone();
        let towards = |coef: f64| -> Vec<f64> {
            centroid
                .iter()
                .zip(worst_vertex.iter())
                .map(|(&c, &w)| c + coef * (c - w))
                .collect()
        };

        let reflected = towards(REFLECTION);
        let f_reflected = eval(reflected.as_slice());

        if f_reflected < values[0] {
            let expanded = towards(EXPANSION);
            let f_expanded = eval(expanded.as_slice());
            if f_expanded < f_reflected {
                simplex[dim] = expanded;
                values[dim] = f_expanded;
            } else {
                simplex[dim] = reflected;
                values[dim] = f_reflected;
            }
            continue;
        }

        if f_reflected < values[dim - 1] {
            simplex[dim] = reflected;
            values[dim] = f_reflected;
            continue;
        }

        // Contraction: outside if the reflection improved on the worst point.
        let (contracted, f_contracted) = if f_reflected < values[dim] {
            let c = towards(CONTRACTION);
            let f = eval(c.as_slice());
            (c, f)
        } else {
            let c = towards(-CONTRACTION);
            let f = eval(c.as_slice());
            (c, f)
        };

        if f_contracted < values[dim].min(f_reflected) {
            simplex[dim] = contracted;
            values[dim] = f_contracted;
            continue;
        }

        // Shrink towards the best vertex.
        let best_vertex = simplex[0].clone();
        for i in 1..=dim {
            for (x, &b) in simplex[i].iter_mut().zip(best_vertex.iter()) {
                *x = b + SHRINK * (*x - b);
            }
            values[i] = eval(simplex[i].as_slice());
        }
    }

    let (best_idx, &best_value) = values
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))?;

    Some(NelderMeadResult {
        point: simplex[best_idx].clone(),
        value: best_value,
        iterations,
        converged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimizes_quadratic() {
        let f = |x: &[f64]| (x[0] - 3.0).powi(2) + (x[1] + 1.0).powi(2);
        let r = nelder_mead(f, &[0.0, 0.0], &NelderMeadConfig::default()).unwrap();
        assert!((r.point[0] - 3.0).abs() < 1e-4, "x = {:?}", r.point);
        assert!((r.point[1] + 1.0).abs() < 1e-4, "x = {:?}", r.point);
        assert!(r.converged);
    }

    #[test]
    fn minimizes_rosenbrock() {
        let f = |x: &[f64]| (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2);
        let config = NelderMeadConfig {
            max_iterations: 5000,
            tolerance: 1e-14,
            initial_step: 0.5,
        };
        let r = nelder_mead(f, &[-1.2, 1.0], &config).unwrap();
        assert!((r.point[0] - 1.0).abs() < 1e-3, "x = {:?}", r.point);
        assert!((r.point[1] - 1.0).abs() < 1e-3, "x = {:?}", r.point);
    }

    #[test]
    fn treats_nan_as_infeasible() {
        // Objective undefined for x < 0; minimum at x = 1.
        let f = |x: &[f64]| {
            if x[0] < 0.0 {
                f64::NAN
            } else {
                (x[0] - 1.0).powi(2)
            }
        };
        let r = nelder_mead(f, &[0.2], &NelderMeadConfig::default()).unwrap();
        assert!((r.point[0] - 1.0).abs() < 1e-4);
    }

    #[test]
    fn empty_start() {
        assert!(nelder_mead(|_| 0.0, &[], &NelderMeadConfig::default()).is_none());
    }
}
