//! Linear algebra utilities.
//!
//! Element-wise arithmetic, products, determinants, inverses, eigenvalues and
//! the singular value decomposition over row-major [`NumericMatrix`] values,
//! plus the pseudo-inverse and minimum-norm least-squares helpers that the
//! regression diagnostics are built on.
//!
//! # Examples
//!
//! ```
//! use u_modeling::linalg::{inverse, multiply};
//!
//! let a = vec![vec![4.0, 7.0], vec![2.0, 6.0]];
//! let inv = inverse(&a).unwrap();
//! let identity = multiply(&a, &inv).unwrap();
//! assert!((identity[0][0] - 1.0).abs() < 1e-12);
//! assert!(identity[0][1].abs() < 1e-12);
//! ```

use std::fmt;
use std::str::FromStr;

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::{ModelingError, Result};
use crate::pca::PcaResult;
use crate::sanitize::TransportSafe;

/// Row-major matrix: each inner vector is one row.
pub type NumericMatrix = Vec<Vec<f64>>;

/// Relative singular-value cutoff for the pseudo-inverse.
const PINV_RCOND: f64 = 1e-15;

/// Operations accepted by the matrix endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatrixOperation {
    Add,
    Subtract,
    Multiply,
    Transpose,
    Determinant,
    Inverse,
    Eigenvalues,
    Svd,
    Pca,
    Correlation,
}

impl MatrixOperation {
    /// Lowercase operation name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Multiply => "multiply",
            Self::Transpose => "transpose",
            Self::Determinant => "determinant",
            Self::Inverse => "inverse",
            Self::Eigenvalues => "eigenvalues",
            Self::Svd => "svd",
            Self::Pca => "pca",
            Self::Correlation => "correlation",
        }
    }
}

impl fmt::Display for MatrixOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatrixOperation {
    type Err = ModelingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "add" => Ok(Self::Add),
            "subtract" => Ok(Self::Subtract),
            "multiply" => Ok(Self::Multiply),
            "transpose" => Ok(Self::Transpose),
            "determinant" => Ok(Self::Determinant),
            "inverse" => Ok(Self::Inverse),
            "eigenvalues" => Ok(Self::Eigenvalues),
            "svd" => Ok(Self::Svd),
            "pca" => Ok(Self::Pca),
            "correlation" => Ok(Self::Correlation),
            other => Err(ModelingError::UnsupportedOperation(other.to_string())),
        }
    }
}

/// Request for a matrix operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixRequest {
    pub matrix_a: NumericMatrix,
    #[serde(default)]
    pub matrix_b: Option<NumericMatrix>,
    pub operation: MatrixOperation,
}

/// A complex eigenvalue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComplexValue {
    pub real: f64,
    pub imag: f64,
}

/// Economy-size singular value decomposition A = U·diag(S)·Vᵀ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SvdResult {
    /// Left singular vectors (rows × k).
    pub u: NumericMatrix,
    /// Singular values, descending (length k = min(rows, cols)).
    pub s: Vec<f64>,
    /// Transposed right singular vectors (k × cols).
    pub vt: NumericMatrix,
}

/// Result of a matrix operation, tagged by its shape class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result_type", rename_all = "lowercase")]
pub enum MatrixOutput {
    Matrix { result: NumericMatrix },
    Scalar { result: f64 },
    Eigenvalues { result: Vec<ComplexValue> },
    Svd(SvdResult),
    Pca(PcaResult),
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

/// Returns (rows, cols) after checking the matrix is non-empty, rectangular
/// and finite.
pub fn shape(m: &NumericMatrix) -> Result<(usize, usize)> {
    let dims = shape_allowing_missing(m)?;
    if m.iter().flatten().any(|v| v.is_nan()) {
        return Err(ModelingError::InvalidInput(
            "matrix contains NaN or infinite values".to_string(),
        ));
    }
    Ok(dims)
}

/// Like [`shape`], but `NaN` cells are accepted as missing values.
pub fn shape_allowing_missing(m: &NumericMatrix) -> Result<(usize, usize)> {
    let rows = m.len();
    let cols = m.first().map_or(0, |r| r.len());
    if rows == 0 || cols == 0 {
        return Err(ModelingError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }
    if let Some(i) = m.iter().position(|r| r.len() != cols) {
        return Err(ModelingError::DimensionMismatch(format!(
            "row {i} has {} columns, expected {cols}",
            m[i].len()
        )));
    }
    if m.iter().flatten().any(|v| v.is_infinite()) {
        return Err(ModelingError::InvalidInput(
            "matrix contains NaN or infinite values".to_string(),
        ));
    }
    Ok((rows, cols))
}

/// Converts a validated row-major matrix to `nalgebra`.
pub(crate) fn to_dmatrix(m: &NumericMatrix) -> Result<DMatrix<f64>> {
    let (rows, cols) = shape(m)?;
    Ok(DMatrix::from_fn(rows, cols, |i, j| m[i][j]))
}

/// Converts an `nalgebra` matrix to row-major form.
pub(crate) fn from_dmatrix(m: &DMatrix<f64>) -> NumericMatrix {
    (0..m.nrows())
        .map(|i| (0..m.ncols()).map(|j| m[(i, j)]).collect())
        .collect()
}

fn require_square(m: &DMatrix<f64>, operation: &'static str) -> Result<()> {
    if m.nrows() != m.ncols() {
        return Err(ModelingError::NotSquare {
            operation,
            rows: m.nrows(),
            cols: m.ncols(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Element-wise sum. Shapes must be identical.
pub fn add(a: &NumericMatrix, b: &NumericMatrix) -> Result<NumericMatrix> {
    let (ma, mb) = same_shape(a, b, "addition")?;
    Ok(from_dmatrix(&(ma + mb)))
}

/// Element-wise difference. Shapes must be identical.
pub fn subtract(a: &NumericMatrix, b: &NumericMatrix) -> Result<NumericMatrix> {
    let (ma, mb) = same_shape(a, b, "subtraction")?;
    Ok(from_dmatrix(&(ma - mb)))
}

fn same_shape(
    a: &NumericMatrix,
    b: &NumericMatrix,
    what: &str,
) -> Result<(DMatrix<f64>, DMatrix<f64>)> {
    let ma = to_dmatrix(a)?;
    let mb = to_dmatrix(b)?;
    if ma.shape() != mb.shape() {
        return Err(ModelingError::DimensionMismatch(format!(
            "matrices must have the same dimensions for {what}: {:?} and {:?}",
            ma.shape(),
            mb.shape()
        )));
    }
    Ok((ma, mb))
}

/// Matrix product A·B. Requires cols(A) == rows(B).
pub fn multiply(a: &NumericMatrix, b: &NumericMatrix) -> Result<NumericMatrix> {
    let ma = to_dmatrix(a)?;
    let mb = to_dmatrix(b)?;
    if ma.ncols() != mb.nrows() {
        return Err(ModelingError::DimensionMismatch(format!(
            "matrix dimensions incompatible for multiplication: {:?} and {:?}",
            ma.shape(),
            mb.shape()
        )));
    }
    Ok(from_dmatrix(&(ma * mb)))
}

/// Transpose. Always succeeds for a valid matrix.
pub fn transpose(a: &NumericMatrix) -> Result<NumericMatrix> {
    let ma = to_dmatrix(a)?;
    Ok(from_dmatrix(&ma.transpose()))
}

/// Determinant of a square matrix.
pub fn determinant(a: &NumericMatrix) -> Result<f64> {
    let ma = to_dmatrix(a)?;
    require_square(&ma, "determinant")?;
    Ok(ma.determinant())
}

/// Inverse of a square matrix.
///
/// Fails with [`ModelingError::SingularMatrix`] when no inverse exists.
pub fn inverse(a: &NumericMatrix) -> Result<NumericMatrix> {
    let ma = to_dmatrix(a)?;
    require_square(&ma, "inverse")?;
    ma.try_inverse()
        .map(|inv| from_dmatrix(&inv))
        .ok_or(ModelingError::SingularMatrix)
}

/// Eigenvalues of a square matrix as (real, imaginary) pairs.
///
/// Complex-conjugate pairs of a real non-symmetric matrix are kept; the
/// imaginary part is never dropped.
pub fn eigenvalues(a: &NumericMatrix) -> Result<Vec<ComplexValue>> {
    let ma = to_dmatrix(a)?;
    require_square(&ma, "eigenvalues")?;
    Ok(ma
        .complex_eigenvalues()
        .iter()
        .map(|c| ComplexValue {
            real: c.re,
            imag: c.im,
        })
        .collect())
}

/// Economy-size SVD with singular values in descending order.
pub fn svd(a: &NumericMatrix) -> Result<SvdResult> {
    let ma = to_dmatrix(a)?;
    let decomposition = decompose(ma).ok_or_else(|| {
        ModelingError::InvalidInput("singular value decomposition did not converge".to_string())
    })?;
    Ok(SvdResult {
        u: from_dmatrix(&decomposition.u),
        s: decomposition.s.iter().copied().collect(),
        vt: from_dmatrix(&decomposition.vt),
    })
}

// ---------------------------------------------------------------------------
// Decompositions shared with the statistical components
// ---------------------------------------------------------------------------

/// Owned SVD factors.
pub(crate) struct Factors {
    pub u: DMatrix<f64>,
    pub s: DVector<f64>,
    pub vt: DMatrix<f64>,
}

/// Sorted economy SVD. `None` if the iteration fails or input is non-finite.
pub(crate) fn decompose(m: DMatrix<f64>) -> Option<Factors> {
    if m.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let svd = m.try_svd(true, true, f64::EPSILON, 0)?;
    Some(Factors {
        u: svd.u?,
        s: svd.singular_values,
        vt: svd.v_t?,
    })
}

/// Moore-Penrose pseudo-inverse.
///
/// Singular values below `1e-15 · σ_max` are treated as zero, so the result
/// exists for rank-deficient and non-square matrices.
pub(crate) fn pseudo_inverse(m: &DMatrix<f64>) -> Option<DMatrix<f64>> {
    let (rows, cols) = m.shape();
    if rows == 0 || cols == 0 {
        return None;
    }
    let f = decompose(m.clone())?;
    let s_max = f.s.iter().copied().fold(0.0_f64, f64::max);
    let cutoff = PINV_RCOND * s_max;

    let k = f.s.len();
    let mut s_inv = DMatrix::zeros(k, k);
    for i in 0..k {
        if f.s[i] > cutoff {
            s_inv[(i, i)] = 1.0 / f.s[i];
        }
    }
    Some(f.vt.transpose() * s_inv * f.u.transpose())
}

/// Minimum-norm least-squares solution of X·β ≈ y.
pub(crate) fn least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    if x.nrows() != y.len() {
        return None;
    }
    let pinv = pseudo_inverse(x)?;
    Some(pinv * y)
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

impl TransportSafe for ComplexValue {
    fn sanitize_for_transport(self) -> Self {
        Self {
            real: self.real.sanitize_for_transport(),
            imag: self.imag.sanitize_for_transport(),
        }
    }
}

impl TransportSafe for SvdResult {
    fn sanitize_for_transport(self) -> Self {
        Self {
            u: self.u.sanitize_for_transport(),
            s: self.s.sanitize_for_transport(),
            vt: self.vt.sanitize_for_transport(),
        }
    }
}

impl TransportSafe for MatrixOutput {
    fn sanitize_for_transport(self) -> Self {
        match self {
            Self::Matrix { result } => Self::Matrix {
                result: result.sanitize_for_transport(),
            },
            Self::Scalar { result } => Self::Scalar {
                result: result.sanitize_for_transport(),
            },
            Self::Eigenvalues { result } => Self::Eigenvalues {
                result: result.sanitize_for_transport(),
            },
            Self::Svd(svd) => Self::Svd(svd.sanitize_for_transport()),
            Self::Pca(pca) => Self::Pca(pca.sanitize_for_transport()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: &NumericMatrix, b: &NumericMatrix, tol: f64) -> bool {
        a.len() == b.len()
            && a.iter().zip(b.iter()).all(|(ra, rb)| {
                ra.len() == rb.len()
                    && ra.iter().zip(rb.iter()).all(|(x, y)| (x - y).abs() < tol)
            })
    }

    #[test]
    fn add_and_subtract() {
        let a = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        let b = vec![vec![0.5, 0.5], vec![1.0, -1.0]];
        assert_eq!(add(&a, &b).unwrap(), vec![vec![1.5, 2.5], vec![4.0, 3.0]]);
        assert_eq!(
            subtract(&a, &b).unwrap(),
            vec![vec![0.5, 1.5], vec![2.0, 5.0]]
        );
    }

    #[test]
    fn add_shape_mismatch() {
        let a = vec![vec![1.0, 2.0]];
        let b = vec![vec![1.0], vec![2.0]];
        assert!(matches!(
            add(&a, &b),
            Err(ModelingError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn multiply_rectangular() {
        let a = vec![vec![1.0, 2.0, 3.0]];
        let b = vec![vec![1.0], vec![1.0], vec![1.0]];
        assert_eq!(multiply(&a, &b).unwrap(), vec![vec![6.0]]);
        assert!(matches!(
            multiply(&a, &a),
            Err(ModelingError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn ragged_rows_rejected() {
        let a = vec![vec![1.0, 2.0], vec![3.0]];
        assert!(matches!(
            transpose(&a),
            Err(ModelingError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn transpose_rectangular() {
        let a = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        let t = transpose(&a).unwrap();
        assert_eq!(t, vec![vec![1.0, 4.0], vec![2.0, 5.0], vec![3.0, 6.0]]);
    }

    #[test]
    fn determinant_and_inverse() {
        let a = vec![vec![4.0, 7.0], vec![2.0, 6.0]];
        let det = determinant(&a).unwrap();
        assert!((det - 10.0).abs() < 1e-12);

        let inv = inverse(&a).unwrap();
        let det_inv = determinant(&inv).unwrap();
        assert!((det_inv - 1.0 / det).abs() < 1e-12);

        let product = multiply(&inv, &a).unwrap();
        assert!(approx_eq(
            &product,
            &vec![vec![1.0, 0.0], vec![0.0, 1.0]],
            1e-12
        ));
    }

    #[test]
    fn square_required() {
        let a = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        assert!(matches!(
            determinant(&a),
            Err(ModelingError::NotSquare { .. })
        ));
        assert!(matches!(inverse(&a), Err(ModelingError::NotSquare { .. })));
        assert!(matches!(
            eigenvalues(&a),
            Err(ModelingError::NotSquare { .. })
        ));
    }

    #[test]
    fn singular_inverse() {
        let a = vec![vec![1.0, 2.0], vec![2.0, 4.0]];
        assert_eq!(inverse(&a), Err(ModelingError::SingularMatrix));
    }

    #[test]
    fn eigenvalues_real() {
        let a = vec![vec![2.0, 0.0], vec![0.0, 3.0]];
        let mut ev: Vec<f64> = eigenvalues(&a).unwrap().iter().map(|c| c.real).collect();
        ev.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert!((ev[0] - 2.0).abs() < 1e-10);
        assert!((ev[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn eigenvalues_complex_pair() {
        // 90° rotation has eigenvalues ±i.
        let a = vec![vec![0.0, -1.0], vec![1.0, 0.0]];
        let ev = eigenvalues(&a).unwrap();
        assert_eq!(ev.len(), 2);
        for c in &ev {
            assert!(c.real.abs() < 1e-10);
            assert!((c.imag.abs() - 1.0).abs() < 1e-10);
        }
        assert!((ev[0].imag + ev[1].imag).abs() < 1e-10);
    }

    #[test]
    fn svd_reconstructs() {
        let a = vec![vec![3.0, 1.0, 1.0], vec![-1.0, 3.0, 1.0]];
        let r = svd(&a).unwrap();
        assert_eq!(r.s.len(), 2);
        assert!(r.s[0] >= r.s[1]);
        // U · diag(S) · Vt
        let us: NumericMatrix = r
            .u
            .iter()
            .map(|row| row.iter().zip(r.s.iter()).map(|(u, s)| u * s).collect())
            .collect();
        let rebuilt = multiply(&us, &r.vt).unwrap();
        assert!(approx_eq(&rebuilt, &a, 1e-10));
        // Known singular values √12 and √10.
        assert!((r.s[0] - 12f64.sqrt()).abs() < 1e-10);
        assert!((r.s[1] - 10f64.sqrt()).abs() < 1e-10);
    }

    #[test]
    fn pseudo_inverse_of_singular() {
        let m = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        let p = pseudo_inverse(&m).unwrap();
        let back = &m * &p * &m;
        for (x, y) in back.iter().zip(m.iter()) {
            assert!((x - y).abs() < 1e-10);
        }
    }

    #[test]
    fn least_squares_exact() {
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_vec(vec![1.0, 3.0, 5.0]);
        let beta = least_squares(&x, &y).unwrap();
        assert!((beta[0] - 1.0).abs() < 1e-10);
        assert!((beta[1] - 2.0).abs() < 1e-10);
    }

    #[test]
    fn operation_names() {
        assert_eq!("SVD".parse::<MatrixOperation>().unwrap(), MatrixOperation::Svd);
        assert!(matches!(
            "cholesky".parse::<MatrixOperation>(),
            Err(ModelingError::UnsupportedOperation(_))
        ));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn matrix(max_dim: usize) -> impl Strategy<Value = NumericMatrix> {
        (1..=max_dim, 1..=max_dim).prop_flat_map(|(r, c)| {
            proptest::collection::vec(proptest::collection::vec(-100.0_f64..100.0, c..=c), r..=r)
        })
    }

    proptest! {
        #[test]
        fn transpose_is_involution(a in matrix(6)) {
            let back = transpose(&transpose(&a).unwrap()).unwrap();
            prop_assert_eq!(back, a);
        }

        #[test]
        fn inverse_times_matrix_is_identity(
            data in proptest::collection::vec(-10.0_f64..10.0, 9..=9)
        ) {
            // Diagonally dominant, hence well-conditioned.
            let mut a: NumericMatrix = data.chunks(3).map(|c| c.to_vec()).collect();
            for (i, row) in a.iter_mut().enumerate() {
                row[i] += 40.0;
            }
            let inv = inverse(&a).unwrap();
            let product = multiply(&inv, &a).unwrap();
            for (i, row) in product.iter().enumerate() {
                for (j, &v) in row.iter().enumerate() {
                    let expected = if i == j { 1.0 } else { 0.0 };
                    prop_assert!((v - expected).abs() < 1e-9, "({i},{j}) = {v}");
                }
            }
            let det = determinant(&a).unwrap();
            let det_inv = determinant(&inv).unwrap();
            prop_assert!((det_inv * det - 1.0).abs() < 1e-9);
        }
    }
}
