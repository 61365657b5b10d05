//! Error types for the modeling engine.
//!
//! Only structurally invalid requests surface as errors. Statistics that can
//! degrade gracefully (R² on a constant target, VIF on a singular design,
//! p-values on an ill-conditioned covariance) are substituted with documented
//! defaults by the components instead.

use thiserror::Error;

/// Errors returned by the modeling engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelingError {
    /// Operand shapes are incompatible for the requested operation.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// A square matrix is required.
    #[error("Matrix must be square for {operation}, got {rows}x{cols}")]
    NotSquare {
        operation: &'static str,
        rows: usize,
        cols: usize,
    },

    /// Unknown operation, method, or model name.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// The input layout is not supported by the selected model.
    #[error("Unsupported shape: {0}")]
    UnsupportedShape(String),

    /// Too few rows or observations.
    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// Logistic regression target does not have exactly two classes.
    #[error(
        "Logistic regression requires a binary dependent variable. Found {found} unique values."
    )]
    NotBinary { found: usize },

    /// A required input is absent.
    #[error("Missing parameters: {0}")]
    MissingParameters(String),

    /// Input length does not match the stored model.
    #[error("Shape mismatch: expected {expected} values, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// The method name is reserved but has no implementation.
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// The matrix has no inverse.
    #[error("Matrix is singular")]
    SingularMatrix,

    /// Input values are invalid (non-finite, out of range).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Engine configuration is invalid.
    #[error("Invalid configuration '{name}': {reason}")]
    InvalidConfig { name: &'static str, reason: String },
}

/// Result alias for modeling operations.
pub type Result<T> = std::result::Result<T, ModelingError>;
