pub mod cholesky;

use crate::error::CrossbarError;
use crate::matrix::csc::CscMatrix;
use cholesky::CholeskyFactor;

/// Numerical tolerance for the residual check: `ε ≈ 1e-9`.
pub const RESIDUAL_TOLERANCE: f64 = 1e-9;

/// Solve `g * v = i_src` for every column of `i_src`, reusing one
/// factorization across all stimuli, and verify the residual against the
/// required tolerance.
pub fn solve(g: &CscMatrix, i_src: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, CrossbarError> {
    let factor = CholeskyFactor::factor(g)?;

    let mut v: Vec<Vec<f64>> = i_src.to_vec();
    factor.solve_columns(&mut v);

    let g_inf = g.inf_norm();
    let mut v_inf = 0.0f64;
    let mut i_inf = 0.0f64;
    let mut max_residual = 0.0f64;
    for (col_v, col_i) in v.iter().zip(i_src.iter()) {
        v_inf = v_inf.max(col_v.iter().fold(0.0, |acc, x| acc.max(x.abs())));
        i_inf = i_inf.max(col_i.iter().fold(0.0, |acc, x| acc.max(x.abs())));

        let mut gv = vec![0.0; g.n];
        g.axpy(col_v, &mut gv);
        for (a, b) in gv.iter().zip(col_i.iter()) {
            max_residual = max_residual.max((a - b).abs());
        }
    }

    let allowed = RESIDUAL_TOLERANCE * (g_inf * v_inf + i_inf);
    if max_residual > allowed.max(RESIDUAL_TOLERANCE) {
        return Err(CrossbarError::NonConvergent {
            residual: max_residual,
            tolerance: allowed.max(RESIDUAL_TOLERANCE),
        });
    }

    Ok(v)
}
