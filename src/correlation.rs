//! Correlation analysis.
//!
//! Pearson, Spearman, and Kendall tau-b coefficients with two-sided p-values,
//! pairwise correlation reports with missing-value deletion, and the labeled
//! table variant that classifies each pair by strength, direction, and
//! significance.
//!
//! # Examples
//!
//! ```
//! use u_modeling::correlation::{pearson, spearman, kendall_tau_b};
//!
//! let x = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let y = [2.0, 4.0, 5.0, 4.0, 5.0];
//!
//! let p = pearson(&x, &y).unwrap();
//! assert!(p.r > 0.7);
//! assert!(p.p_value < 0.2);
//!
//! let s = spearman(&x, &y).unwrap();
//! assert!(s.r > 0.7);
//!
//! let k = kendall_tau_b(&x, &y).unwrap();
//! assert!(k.r > 0.5);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ModelingError, Result};
use crate::linalg::{shape_allowing_missing, NumericMatrix};
use crate::sanitize::{round_to, TransportSafe};
use crate::special;
use crate::stats;

/// Result of a correlation computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    /// Correlation coefficient in [-1, 1].
    pub r: f64,
    /// Two-tailed p-value for testing H₀: ρ = 0.
    pub p_value: f64,
    /// Number of paired observations used.
    pub n: usize,
}

/// Coefficient family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationMethod {
    #[default]
    Pearson,
    Spearman,
    Kendall,
}

impl CorrelationMethod {
    /// Lowercase method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pearson => "pearson",
            Self::Spearman => "spearman",
            Self::Kendall => "kendall",
        }
    }

    /// Computes this method's coefficient for one pair of columns.
    pub fn compute(&self, x: &[f64], y: &[f64]) -> Option<CorrelationResult> {
        match self {
            Self::Pearson => pearson(x, y),
            Self::Spearman => spearman(x, y),
            Self::Kendall => kendall_tau_b(x, y),
        }
    }
}

impl fmt::Display for CorrelationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CorrelationMethod {
    type Err = ModelingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pearson" => Ok(Self::Pearson),
            "spearman" => Ok(Self::Spearman),
            "kendall" => Ok(Self::Kendall),
            other => Err(ModelingError::UnsupportedOperation(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Pearson
// ---------------------------------------------------------------------------

/// Computes Pearson product-moment correlation coefficient and p-value.
///
/// # Algorithm
///
/// r = cov(x,y) / (σ_x · σ_y)
///
/// p-value via t-test: t = r·√(n-2) / √(1-r²), df = n-2. With only two
/// observations the test has no degrees of freedom and p = 1.
///
/// # Returns
///
/// `None` if either slice has fewer than 2 elements, the slices differ in
/// length, inputs are non-finite, or either variable has zero variance.
///
/// # References
///
/// Pearson (1895). "Note on regression and inheritance in the case of
/// two parents". Proceedings of the Royal Society of London, 58, 240–242.
///
/// # Examples
///
/// ```
/// use u_modeling::correlation::pearson;
///
/// let x = [1.0, 2.0, 3.0, 4.0, 5.0];
/// let y = [2.0, 4.0, 6.0, 8.0, 10.0];
/// let result = pearson(&x, &y).unwrap();
/// assert!((result.r - 1.0).abs() < 1e-10);
/// ```
pub fn pearson(x: &[f64], y: &[f64]) -> Option<CorrelationResult> {
    let n = x.len();
    if n < 2 || n != y.len() {
        return None;
    }

    if x.iter().any(|v| !v.is_finite()) || y.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let cov = stats::covariance(x, y)?;
    let sx = stats::std_dev(x)?;
    let sy = stats::std_dev(y)?;

    if sx < 1e-300 || sy < 1e-300 {
        return None; // zero variance
    }

    let r = (cov / (sx * sy)).clamp(-1.0, 1.0);
    let p_value = correlation_p_value(r, n);

    Some(CorrelationResult { r, p_value, n })
}

// ---------------------------------------------------------------------------
// Spearman
// ---------------------------------------------------------------------------

/// Computes Spearman rank correlation coefficient and p-value.
///
/// # Algorithm
///
/// Ranks both variables using the mid-rank method for ties, then computes
/// Pearson correlation on the ranks. P-value uses the same t-test
/// approximation as Pearson.
///
/// # Returns
///
/// `None` if fewer than 2 observations, slices differ in length, inputs
/// contain non-finite values, or either variable is constant.
///
/// # References
///
/// Spearman (1904). "The proof and measurement of association between two
/// things". The American Journal of Psychology, 15(1), 72–101.
///
/// # Examples
///
/// ```
/// use u_modeling::correlation::spearman;
///
/// let x = [1.0, 2.0, 3.0, 4.0, 5.0];
/// let y = [5.0, 6.0, 7.0, 8.0, 7.0];
/// let result = spearman(&x, &y).unwrap();
/// assert!(result.r > 0.5);
/// ```
pub fn spearman(x: &[f64], y: &[f64]) -> Option<CorrelationResult> {
    let n = x.len();
    if n < 2 || n != y.len() {
        return None;
    }

    if x.iter().any(|v| !v.is_finite()) || y.iter().any(|v| !v.is_finite()) {
        return None;
    }

    pearson(&rank_data(x), &rank_data(y))
}

// ---------------------------------------------------------------------------
// Kendall tau-b
// ---------------------------------------------------------------------------

/// Computes Kendall's tau-b correlation coefficient with tie correction.
///
/// # Algorithm
///
/// τ_b = (C - D) / √[(n₀ - n₁)(n₀ - n₂)]
///
/// where C = concordant pairs, D = discordant pairs,
/// n₀ = n(n-1)/2, n₁ = Σ tᵢ(tᵢ-1)/2 (ties in x), n₂ = Σ uⱼ(uⱼ-1)/2 (ties in y).
///
/// The p-value uses the normal approximation of S = C − D with the
/// tie-corrected variance.
///
/// # Complexity
///
/// O(n²) pair enumeration.
///
/// # Returns
///
/// `None` if fewer than 2 observations, slices differ in length, inputs
/// contain non-finite values, or either variable is entirely tied.
///
/// # Algorithm
///
/// Without ties and for n ≤ 33 (or when at most one pair is discordant) the
/// two-sided p-value is exact: twice the probability that a random
/// permutation has no more inversions than `min(D, n(n-1)/2 - D)`.
/// Otherwise S = C - D is referred to the normal distribution with the
/// tie-corrected variance
///
/// ```text
/// Var(S) = [n(n-1)(2n+5) - Σt(t-1)(2t+5) - Σu(u-1)(2u+5)] / 18
///        + Σt(t-1) · Σu(u-1) / [2n(n-1)]
///        + Σt(t-1)(t-2) · Σu(u-1)(u-2) / [9n(n-1)(n-2)]
/// ```
///
/// # References
///
/// Kendall (1938). "A new measure of rank correlation".
/// Biometrika, 30(1/2), 81–93.
///
/// # Examples
///
/// ```
/// use u_modeling::correlation::kendall_tau_b;
///
/// let x = [1.0, 2.0, 3.0, 4.0, 5.0];
/// let y = [1.0, 2.0, 3.0, 4.0, 5.0];
/// let result = kendall_tau_b(&x, &y).unwrap();
/// assert!((result.r - 1.0).abs() < 1e-10);
/// ```
pub fn kendall_tau_b(x: &[f64], y: &[f64]) -> Option<CorrelationResult> {
    let n = x.len();
    if n < 2 || n != y.len() {
        return None;
    }

    if x.iter().any(|v| !v.is_finite()) || y.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let mut concordant: i64 = 0;
    let mut discordant: i64 = 0;
    let mut ties_x: i64 = 0;
    let mut ties_y: i64 = 0;

    for i in 0..n {
        for j in (i + 1)..n {
            let dx = x[i] - x[j];
            let dy = y[i] - y[j];

            if dx == 0.0 && dy == 0.0 {
                ties_x += 1;
                ties_y += 1;
            } else if dx == 0.0 {
                ties_x += 1;
            } else if dy == 0.0 {
                ties_y += 1;
            } else if dx * dy > 0.0 {
                concordant += 1;
            } else {
                discordant += 1;
            }
        }
    }

    let n0 = (n as i64) * (n as i64 - 1) / 2;
    let denom_sq = (n0 - ties_x) as f64 * (n0 - ties_y) as f64;

    if denom_sq <= 0.0 {
        return None; // all values tied in x or y
    }

    let tau = ((concordant - discordant) as f64 / denom_sq.sqrt()).clamp(-1.0, 1.0);

    let total = n0;
    let tx = TieSums::of(x);
    let ty = TieSums::of(y);

    let p_value = if n < 3 {
        1.0
    } else if tx.pairs == 0.0
        && ty.pairs == 0.0
        && (n <= KENDALL_EXACT_MAX_N || discordant.min(total - discordant) <= 1)
    {
        // `min` keeps the count within the lower half of the symmetric null.
        kendall_exact_p_value(n, discordant.min(total - discordant) as usize)
    } else {
        let nf = n as f64;
        let m = nf * (nf - 1.0);
        let var_s = (m * (2.0 * nf + 5.0) - tx.variance - ty.variance) / 18.0
            + 2.0 * tx.pairs * ty.pairs / m
            + tx.cubic * ty.cubic / (9.0 * m * (nf - 2.0));
        if var_s > 0.0 {
            let z = (concordant - discordant) as f64 / var_s.sqrt();
            2.0 * (1.0 - special::standard_normal_cdf(z.abs()))
        } else {
            1.0
        }
    };

    Some(CorrelationResult {
        r: tau,
        p_value,
        n,
    })
}

// ---------------------------------------------------------------------------
// Correlation report
// ---------------------------------------------------------------------------

/// Pairwise correlation matrix with p-values.
///
/// `None` cells mark pairs where the coefficient is undefined (fewer than 2
/// complete pairs, or a constant column). The diagonal is fixed at
/// `Some(1.0)` / `Some(0.0)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationReport {
    pub columns: Vec<String>,
    pub matrix: Vec<Vec<Option<f64>>>,
    pub p_values: Vec<Vec<Option<f64>>>,
    pub method: CorrelationMethod,
}

/// Computes the pairwise correlation report of the columns of `data`.
///
/// Rows are observations. `NaN` cells are treated as missing and dropped
/// per pair, not per row. Column names default to `X1..Xp` when `columns`
/// is empty.
///
/// # Errors
///
/// `DimensionMismatch` for ragged rows or a column-name count that does not
/// match, `InsufficientData` for an empty matrix.
///
/// # Examples
///
/// ```
/// use u_modeling::correlation::{correlation_report, CorrelationMethod};
///
/// let data = vec![
///     vec![1.0, 2.0, 5.0],
///     vec![2.0, 4.0, 4.0],
///     vec![3.0, 6.0, 3.0],
///     vec![4.0, 8.0, 1.0],
/// ];
/// let report = correlation_report(&data, &[], CorrelationMethod::Pearson).unwrap();
/// assert_eq!(report.columns, vec!["X1", "X2", "X3"]);
/// assert_eq!(report.matrix[0][0], Some(1.0));
/// assert!((report.matrix[0][1].unwrap() - 1.0).abs() < 1e-12);
/// assert!(report.matrix[0][2].unwrap() < -0.9);
/// ```
pub fn correlation_report(
    data: &NumericMatrix,
    columns: &[String],
    method: CorrelationMethod,
) -> Result<CorrelationReport> {
    let (_, cols) = shape_allowing_missing(data)?;
    let columns = column_labels(columns, cols)?;
    let variables = split_columns(data, cols);

    let mut matrix = vec![vec![None; cols]; cols];
    let mut p_values = vec![vec![None; cols]; cols];

    for i in 0..cols {
        matrix[i][i] = Some(1.0);
        p_values[i][i] = Some(0.0);
        for j in (i + 1)..cols {
            let (x, y) = pairwise_complete(&variables[i], &variables[j]);
            let result = method.compute(&x, &y);
            if result.is_none() {
                log::debug!(
                    "{method} correlation undefined for ({}, {}) with {} complete pairs",
                    columns[i],
                    columns[j],
                    x.len()
                );
            }
            let r = result.map(|c| c.r);
            let p = result.map(|c| c.p_value);
            matrix[i][j] = r;
            matrix[j][i] = r;
            p_values[i][j] = p;
            p_values[j][i] = p;
        }
    }

    Ok(CorrelationReport {
        columns,
        matrix,
        p_values,
        method,
    })
}

/// Plain Pearson matrix of the columns of a complete matrix.
///
/// Undefined coefficients are reported as `NaN`.
///
/// # Errors
///
/// `InsufficientData` when the matrix has fewer than 2 columns.
pub fn pearson_matrix(data: &NumericMatrix) -> Result<NumericMatrix> {
    let (_, cols) = crate::linalg::shape(data)?;
    if cols < 2 {
        return Err(ModelingError::InsufficientData {
            required: 2,
            actual: cols,
        });
    }
    let report = correlation_report(data, &[], CorrelationMethod::Pearson)?;
    Ok(report
        .matrix
        .into_iter()
        .map(|row| row.into_iter().map(|c| c.unwrap_or(f64::NAN)).collect())
        .collect())
}

fn column_labels(columns: &[String], cols: usize) -> Result<Vec<String>> {
    if columns.is_empty() {
        return Ok((1..=cols).map(|i| format!("X{i}")).collect());
    }
    if columns.len() != cols {
        return Err(ModelingError::DimensionMismatch(format!(
            "{} column names for {cols} columns",
            columns.len()
        )));
    }
    Ok(columns.to_vec())
}

fn split_columns(data: &NumericMatrix, cols: usize) -> Vec<Vec<f64>> {
    (0..cols)
        .map(|j| data.iter().map(|row| row[j]).collect())
        .collect()
}

/// Keeps only the positions where both values are present (not `NaN`).
pub fn pairwise_complete(x: &[f64], y: &[f64]) -> (Vec<f64>, Vec<f64>) {
    x.iter()
        .zip(y.iter())
        .filter(|(a, b)| !a.is_nan() && !b.is_nan())
        .map(|(&a, &b)| (a, b))
        .unzip()
}

// ---------------------------------------------------------------------------
// Labeled table analysis
// ---------------------------------------------------------------------------

/// A cell of a labeled table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Missing,
}

/// Strength of an association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    Weak,
    Moderate,
    Strong,
}

impl Strength {
    /// |r| < 0.3 weak, < 0.7 moderate, otherwise strong.
    pub fn from_coefficient(r: f64) -> Self {
        let a = r.abs();
        if a < 0.3 {
            Self::Weak
        } else if a < 0.7 {
            Self::Moderate
        } else {
            Self::Strong
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weak => "weak",
            Self::Moderate => "moderate",
            Self::Strong => "strong",
        }
    }
}

/// Direction of an association. Zero counts as negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Positive,
    Negative,
}

impl Direction {
    pub fn from_coefficient(r: f64) -> Self {
        if r > 0.0 {
            Self::Positive
        } else {
            Self::Negative
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
        }
    }
}

/// Classification of one correlated pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interpretation {
    pub first: String,
    pub second: String,
    pub r: f64,
    pub p_value: f64,
    pub strength: Strength,
    pub direction: Direction,
    pub significant: bool,
}

impl fmt::Display for Interpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let significance = if self.significant {
            "statistically significant"
        } else {
            "not statistically significant"
        };
        write!(
            f,
            "{} {} correlation ({significance}, p={})",
            self.strength.as_str(),
            self.direction.as_str(),
            self.p_value
        )
    }
}

/// Correlation analysis of the numeric columns of a labeled table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationAnalysis {
    pub numeric_columns: Vec<String>,
    /// Pearson r rounded to 3 decimals.
    pub correlation_matrix: Vec<Vec<Option<f64>>>,
    /// Two-sided p-values rounded to 4 decimals.
    pub p_values: Vec<Vec<Option<f64>>>,
    /// One entry per defined off-diagonal pair, in upper-triangle order.
    pub interpretations: Vec<Interpretation>,
}

/// Analyzes the numeric columns of a labeled table.
///
/// A column is numeric when it contains at least one number and no text.
/// Missing cells are dropped per pair.
///
/// # Errors
///
/// `DimensionMismatch` if a row's length differs from `columns`,
/// `InsufficientData` if fewer than 2 numeric columns exist.
pub fn analyze_labeled(
    columns: &[String],
    rows: &[Vec<CellValue>],
    significance_level: f64,
) -> Result<CorrelationAnalysis> {
    if let Some(i) = rows.iter().position(|r| r.len() != columns.len()) {
        return Err(ModelingError::DimensionMismatch(format!(
            "row {i} has {} cells, expected {}",
            rows[i].len(),
            columns.len()
        )));
    }

    let numeric: Vec<(String, Vec<f64>)> = columns
        .iter()
        .enumerate()
        .filter_map(|(j, name)| numeric_column(rows, j).map(|v| (name.clone(), v)))
        .collect();

    if numeric.len() < 2 {
        return Err(ModelingError::InsufficientData {
            required: 2,
            actual: numeric.len(),
        });
    }

    let k = numeric.len();
    let mut correlation_matrix = vec![vec![None; k]; k];
    let mut p_values = vec![vec![None; k]; k];
    let mut interpretations = Vec::new();

    for i in 0..k {
        correlation_matrix[i][i] = Some(1.0);
        p_values[i][i] = Some(0.0);
        for j in (i + 1)..k {
            let (x, y) = pairwise_complete(&numeric[i].1, &numeric[j].1);
            let Some(result) = pearson(&x, &y) else {
                continue;
            };
            let r = round_to(result.r, 3);
            let p = round_to(result.p_value, 4);
            correlation_matrix[i][j] = Some(r);
            correlation_matrix[j][i] = Some(r);
            p_values[i][j] = Some(p);
            p_values[j][i] = Some(p);
            interpretations.push(Interpretation {
                first: numeric[i].0.clone(),
                second: numeric[j].0.clone(),
                r,
                p_value: p,
                strength: Strength::from_coefficient(r),
                direction: Direction::from_coefficient(r),
                significant: p < significance_level,
            });
        }
    }

    Ok(CorrelationAnalysis {
        numeric_columns: numeric.into_iter().map(|(name, _)| name).collect(),
        correlation_matrix,
        p_values,
        interpretations,
    })
}

/// Extracts column `j` as numbers with `NaN` for missing cells.
fn numeric_column(rows: &[Vec<CellValue>], j: usize) -> Option<Vec<f64>> {
    let mut has_number = false;
    let mut values = Vec::with_capacity(rows.len());
    for row in rows {
        match &row[j] {
            CellValue::Number(v) if v.is_finite() => {
                has_number = true;
                values.push(*v);
            }
            CellValue::Number(_) | CellValue::Missing => values.push(f64::NAN),
            CellValue::Text(_) => return None,
        }
    }
    has_number.then_some(values)
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Computes two-tailed p-value for a correlation coefficient via t-test.
///
/// t = r·√(n-2) / √(1-r²), df = n-2.
fn correlation_p_value(r: f64, n: usize) -> f64 {
    if n < 3 {
        return 1.0;
    }
    let df = (n - 2) as f64;
    let r2 = r * r;

    // r ≈ ±1 makes the denominator vanish
    if r2 >= 1.0 - 1e-15 {
        return 0.0;
    }

    let t = r * (df / (1.0 - r2)).sqrt();
    special::t_two_sided_p_value(t, df)
}

/// Ranks data using the mid-rank method for ties.
///
/// Returns a Vec of ranks (1-based). Tied values receive the average rank.
fn rank_data(data: &[f64]) -> Vec<f64> {
    let n = data.len();
    let mut indexed: Vec<(usize, f64)> = data.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j < n && indexed[j].1 == indexed[i].1 {
            j += 1;
        }
        // Average rank for the tied group (1-based)
        let avg_rank = (i + j) as f64 / 2.0 + 0.5;
        for item in indexed.iter().take(j).skip(i) {
            ranks[item.0] = avg_rank;
        }
        i = j;
    }

    ranks
}

/// Largest sample for which the exact Kendall null distribution is used.
const KENDALL_EXACT_MAX_N: usize = 33;

/// Tie-group sums of one variable, over groups of size t > 1.
struct TieSums {
    /// Σ t(t-1)/2: pairs tied in this variable.
    pairs: f64,
    /// Σ t(t-1)(t-2).
    cubic: f64,
    /// Σ t(t-1)(2t+5).
    variance: f64,
}

impl TieSums {
    fn of(data: &[f64]) -> Self {
        let mut sorted: Vec<f64> = data.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let mut sums = Self {
            pairs: 0.0,
            cubic: 0.0,
            variance: 0.0,
        };
        let mut i = 0;
        while i < sorted.len() {
            let mut j = i;
            while j < sorted.len() && sorted[j] == sorted[i] {
                j += 1;
            }
            let t = (j - i) as f64;
            if t > 1.0 {
                sums.pairs += t * (t - 1.0) / 2.0;
                sums.cubic += t * (t - 1.0) * (t - 2.0);
                sums.variance += t * (t - 1.0) * (2.0 * t + 5.0);
            }
            i = j;
        }
        sums
    }
}

/// Exact two-sided p-value of Kendall's S for `n` untied pairs with
/// `c = min(D, n(n-1)/2 - D)` discordant pairs.
///
/// Builds P(k inversions) for permutations of 1..j, truncated at c, with
/// the recurrence P_j(k) = (1/j) Σ_{i<j} P_{j-1}(k - i).
fn kendall_exact_p_value(n: usize, c: usize) -> f64 {
    let total = n * (n - 1) / 2;
    if 2 * c >= total {
        return 1.0;
    }
    let mut dist = vec![0.0; c + 1];
    dist[0] = 1.0;
    let mut cumulative = vec![0.0; c + 1];
    for j in 2..=n {
        let mut running = 0.0;
        for (cum, &p) in cumulative.iter_mut().zip(dist.iter()) {
            running += p;
            *cum = running;
        }
        for k in 0..=c {
            let dropped = if k >= j { cumulative[k - j] } else { 0.0 };
            dist[k] = (cumulative[k] - dropped) / j as f64;
        }
    }
    (2.0 * dist.iter().sum::<f64>()).min(1.0)
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

impl TransportSafe for CorrelationReport {
    fn sanitize_for_transport(self) -> Self {
        Self {
            matrix: self.matrix.sanitize_for_transport(),
            p_values: self.p_values.sanitize_for_transport(),
            ..self
        }
    }
}

impl TransportSafe for Interpretation {
    fn sanitize_for_transport(self) -> Self {
        Self {
            r: self.r.sanitize_for_transport(),
            p_value: self.p_value.sanitize_for_transport(),
            ..self
        }
    }
}

impl TransportSafe for CorrelationAnalysis {
    fn sanitize_for_transport(self) -> Self {
        Self {
            correlation_matrix: self.correlation_matrix.sanitize_for_transport(),
            p_values: self.p_values.sanitize_for_transport(),
            interpretations: self.interpretations.sanitize_for_transport(),
            ..self
        }
    }
}
