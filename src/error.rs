use thiserror::Error;

/// Errors raised by [`crate::compute`] itself. All are fatal to the call and
/// indicate a precondition violation by the caller; none are retryable.
#[derive(Debug, Error)]
pub enum CrossbarError {
    #[error("applied_voltages has {v_rows} rows but resistances has {r_rows} rows")]
    ShapeMismatch { v_rows: usize, r_rows: usize },

    #[error("non-finite or invalid value at {context}: {value}")]
    DomainError { context: &'static str, value: f64 },

    #[error("resistance at (row={row}, col={col}) is zero (short circuit)")]
    ZeroResistance { row: usize, col: usize },

    #[error("sparse solve failed to reach tolerance: residual {residual:.3e} > {tolerance:.3e}")]
    NonConvergent { residual: f64, tolerance: f64 },

    #[error(transparent)]
    Matrix(#[from] crate::matrix::error::MatrixError),
}
