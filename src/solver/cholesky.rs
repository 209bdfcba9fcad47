//! Sparse Cholesky factorization and multi-RHS solve for the symmetric
//! positive definite admittance matrix `G`.
//!
//! Structured as a `factor` numeric step followed by a `solve` step that
//! accepts a dense multi-column RHS and reuses the factorization across
//! columns. Assumes its input is symmetric positive definite (true by
//! construction for the crossbar's `G`, see `assembler`) and therefore
//! never needs partial pivoting, scaling, or block-triangular
//! preordering; it uses the natural (identity) elimination order rather
//! than a fill-reducing one (see DESIGN.md).

use crate::matrix::csc::CscMatrix;
use crate::matrix::error::MatrixError;

/// Lower-triangular Cholesky factor `L` (such that `G = L * L^T`), stored in
/// the same column-sparse layout as `G` itself.
#[derive(Debug, Clone)]
pub struct CholeskyFactor {
    l: CscMatrix,
}

impl CholeskyFactor {
    /// Factor `a` (symmetric positive definite, only the stored entries are
    /// read -- both triangles are expected to be present since `G` is
    /// assembled with explicit symmetric stamps).
    ///
    /// Left-looking column algorithm: column `j` starts from `A`'s lower
    /// column (rows `>= j`) and is updated by every previously computed
    /// column `k < j` with a nonzero `L[j,k]`, found by a binary search
    /// within column `k` (no fill-reducing ordering or elimination tree is
    /// used, see module docs).
    pub fn factor(a: &CscMatrix) -> Result<Self, MatrixError> {
        let n = a.n;
        let mut columns: Vec<Vec<(usize, f64)>> = Vec::with_capacity(n);

        // Sparse accumulator: `work[r]` holds column j's in-progress value at
        // row r, valid only where `mark[r] == j`. Comparing against the
        // current pass index avoids re-zeroing a dense array every column.
        let mut work = vec![0.0f64; n];
        let mut mark = vec![usize::MAX; n];
        let mut touched: Vec<usize> = Vec::with_capacity(n);

        for j in 0..n {
            touched.clear();

            // Seed the work vector with column j of A, rows >= j.
            let (rows, vals) = a.col(j);
            for (&r, &v) in rows.iter().zip(vals.iter()) {
                if r >= j {
                    work[r] = v;
                    mark[r] = j;
                    touched.push(r);
                }
            }

            // Apply rank-1 updates from every earlier column k with L[j,k] != 0.
            for k in 0..j {
                let ljk = match columns[k].binary_search_by_key(&j, |&(r, _)| r) {
                    Ok(pos) => columns[k][pos].1,
                    Err(_) => continue,
                };
                if ljk == 0.0 {
                    continue;
                }
                for &(r, v) in &columns[k] {
                    if r >= j {
                        if mark[r] != j {
                            mark[r] = j;
                            work[r] = 0.0;
                            touched.push(r);
                        }
                        work[r] -= v * ljk;
                    }
                }
            }

            let diag = if mark[j] == j { work[j] } else { 0.0 };
            if !(diag > 0.0) {
                return Err(MatrixError::NotPositiveDefinite { col: j });
            }
            let ljj = diag.sqrt();

            touched.sort_unstable();
            let mut col: Vec<(usize, f64)> = Vec::with_capacity(touched.len());
            col.push((j, ljj));
            for &row in &touched {
                if row == j {
                    continue;
                }
                let v = work[row];
                if v != 0.0 {
                    col.push((row, v / ljj));
                }
            }
            columns.push(col);
        }

        // Compress the growable per-column form into CSC.
        let mut column_pointers = vec![0usize; n + 1];
        for (j, col) in columns.iter().enumerate() {
            column_pointers[j + 1] = column_pointers[j] + col.len();
        }
        let nnz = *column_pointers.last().unwrap();
        let mut row_indices = vec![0usize; nnz];
        let mut values = vec![0f64; nnz];
        for (j, col) in columns.into_iter().enumerate() {
            let start = column_pointers[j];
            for (idx, (r, v)) in col.into_iter().enumerate() {
                row_indices[start + idx] = r;
                values[start + idx] = v;
            }
        }

        let l = CscMatrix {
            n,
            column_pointers,
            row_indices,
            values,
        };
        Ok(Self { l })
    }

    /// Solve `G x = b` in place for a single dense vector, reusing this
    /// factorization (forward solve `L y = b` then backward solve
    /// `L^T x = y`, both expressed as column-oriented sweeps over `L` so no
    /// transpose is ever materialized).
    pub fn solve_in_place(&self, b: &mut [f64]) {
        let n = self.l.n;
        // Forward solve L y = b.
        for j in 0..n {
            let (rows, vals) = self.l.col(j);
            let diag = vals[0];
            b[j] /= diag;
            let bj = b[j];
            for (&r, &v) in rows.iter().zip(vals.iter()).skip(1) {
                b[r] -= v * bj;
            }
        }
        // Backward solve L^T x = y.
        for j in (0..n).rev() {
            let (rows, vals) = self.l.col(j);
            let diag = vals[0];
            let mut acc = b[j];
            for (&r, &v) in rows.iter().zip(vals.iter()).skip(1) {
                acc -= v * b[r];
            }
            b[j] = acc / diag;
        }
    }

    /// Solve `G X = B` for every column of a dense multi-column RHS, reusing
    /// one factorization across all columns instead of refactoring per
    /// column.
    pub fn solve_columns(&self, columns: &mut [Vec<f64>]) {
        for col in columns.iter_mut() {
            self.solve_in_place(col);
        }
    }
}
