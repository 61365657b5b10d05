//! Principal component analysis.
//!
//! Columns are standardized to zero mean and unit (population) variance, then
//! projected onto the leading right singular vectors of the standardized
//! matrix.
//!
//! # Examples
//!
//! ```
//! use u_modeling::pca::pca;
//!
//! let data = vec![
//!     vec![1.0, 2.0, 0.5],
//!     vec![2.0, 4.1, 0.1],
//!     vec![3.0, 5.9, 0.9],
//!     vec![4.0, 8.2, 0.4],
//! ];
//! let result = pca(&data).unwrap();
//! assert_eq!(result.components.len(), 2);
//! assert_eq!(result.transformed[0].len(), 2);
//! assert!(result.explained_variance_ratio[0] > result.explained_variance_ratio[1]);
//! ```

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::{ModelingError, Result};
use crate::linalg::{decompose, shape, NumericMatrix};
use crate::sanitize::TransportSafe;
use crate::stats;

/// Upper bound on the number of components returned.
pub const MAX_COMPONENTS: usize = 2;

/// Result of a principal component analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PcaResult {
    /// Scores: rows × k.
    pub transformed: NumericMatrix,
    /// Share of total variance captured by each retained component.
    pub explained_variance_ratio: Vec<f64>,
    /// Loading vectors: k × columns.
    pub components: NumericMatrix,
}

/// Projects `data` (rows = observations) onto its first
/// `min(2, rows, columns)` principal components.
///
/// # Algorithm
///
/// 1. Zᵢⱼ = (xᵢⱼ − x̄ⱼ) / σⱼ with the population σ; a constant column maps to
///    zeros.
/// 2. Z = U·S·Vᵀ (economy SVD). Each component's sign is fixed so that its
///    largest-magnitude loading is positive.
/// 3. Scores = U·S, ratio = sᵢ² / Σ s².
///
/// # Errors
///
/// `InsufficientData` with fewer than 2 rows; shape errors from
/// [`crate::linalg::shape`].
pub fn pca(data: &NumericMatrix) -> Result<PcaResult> {
    let (rows, cols) = shape(data)?;
    if rows < 2 {
        return Err(ModelingError::InsufficientData {
            required: 2,
            actual: rows,
        });
    }

    let z = standardize(data, rows, cols);
    let factors = decompose(z).ok_or_else(|| {
        ModelingError::InvalidInput("singular value decomposition did not converge".to_string())
    })?;
    let mut u = factors.u;
    let mut vt = factors.vt;
    let s = factors.s;

    let k = MAX_COMPONENTS.min(rows).min(cols).min(s.len());

    for c in 0..k {
        let pivot = (0..cols)
            .map(|j| vt[(c, j)])
            .fold(0.0_f64, |best, v| if v.abs() > best.abs() { v } else { best });
        if pivot < 0.0 {
            vt.row_mut(c).neg_mut();
            u.column_mut(c).neg_mut();
        }
    }

    let total: f64 = s.iter().map(|v| v * v).sum();
    let explained_variance_ratio = (0..k)
        .map(|c| if total > 0.0 { s[c] * s[c] / total } else { 0.0 })
        .collect();

    let transformed = (0..rows)
        .map(|i| (0..k).map(|c| u[(i, c)] * s[c]).collect())
        .collect();
    let components = (0..k)
        .map(|c| (0..cols).map(|j| vt[(c, j)]).collect())
        .collect();

    Ok(PcaResult {
        transformed,
        explained_variance_ratio,
        components,
    })
}

fn standardize(data: &NumericMatrix, rows: usize, cols: usize) -> DMatrix<f64> {
    let mut z = DMatrix::zeros(rows, cols);
    for j in 0..cols {
        let column: Vec<f64> = data.iter().map(|r| r[j]).collect();
        let (Some(mean), Some(sd)) = (stats::mean(&column), stats::population_std_dev(&column))
        else {
            continue;
        };
        if sd > 0.0 {
            for (i, v) in column.iter().enumerate() {
                z[(i, j)] = (v - mean) / sd;
            }
        }
    }
    z
}

impl TransportSafe for PcaResult {
    fn sanitize_for_transport(self) -> Self {
        Self {
            transformed: self.transformed.sanitize_for_transport(),
            explained_variance_ratio: self.explained_variance_ratio.sanitize_for_transport(),
            components: self.components.sanitize_for_transport(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collinear_columns_single_component() {
        let data: NumericMatrix = (0..10)
            .map(|i| {
                let x = i as f64;
                vec![x, 3.0 * x + 1.0]
            })
            .collect();
        let result = pca(&data).unwrap();
        assert!((result.explained_variance_ratio[0] - 1.0).abs() < 1e-10);
        assert!(result.explained_variance_ratio[1].abs() < 1e-10);
        // Both loadings equal 1/√2, positive after sign fixing.
        let c = &result.components[0];
        assert!((c[0] - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-10);
        assert!((c[1] - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-10);
    }

    #[test]
    fn scores_have_zero_mean() {
        let data = vec![
            vec![2.5, 2.4, 1.0],
            vec![0.5, 0.7, 3.0],
            vec![2.2, 2.9, 2.0],
            vec![1.9, 2.2, 0.5],
            vec![3.1, 3.0, 1.5],
            vec![2.3, 2.7, 2.5],
        ];
        let result = pca(&data).unwrap();
        assert_eq!(result.transformed.len(), 6);
        for c in 0..2 {
            let mean: f64 = result.transformed.iter().map(|r| r[c]).sum::<f64>() / 6.0;
            assert!(mean.abs() < 1e-10);
        }
    }

    #[test]
    fn constant_column_is_zeroed() {
        let data = vec![
            vec![1.0, 7.0, 2.0],
            vec![2.0, 7.0, 1.0],
            vec![3.0, 7.0, 5.0],
            vec![4.0, 7.0, 3.0],
        ];
        let result = pca(&data).unwrap();
        for row in &result.transformed {
            assert!(row.iter().all(|v| v.is_finite()));
        }
        for comp in &result.components {
            assert!(comp[1].abs() < 1e-10);
        }
    }

    #[test]
    fn standardized_columns_have_unit_spread() {
        let data = vec![vec![1.0, 10.0], vec![2.0, 30.0], vec![6.0, 20.0], vec![3.0, 40.0]];
        let z = standardize(&data, 4, 2);
        for j in 0..2 {
            let column: Vec<f64> = z.column(j).iter().copied().collect();
            assert!(stats::mean(&column).unwrap().abs() < 1e-12);
            assert!((stats::population_std_dev(&column).unwrap() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn components_limited_by_shape() {
        let data = vec![vec![1.0], vec![2.0], vec![4.0]];
        let result = pca(&data).unwrap();
        assert_eq!(result.components.len(), 1);
        assert!((result.explained_variance_ratio[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn single_row_rejected() {
        let data = vec![vec![1.0, 2.0]];
        assert_eq!(
            pca(&data),
            Err(ModelingError::InsufficientData {
                required: 2,
                actual: 1
            })
        );
    }
}
