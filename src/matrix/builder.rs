use crate::matrix::csc::CscMatrix;
use crate::matrix::error::MatrixError;

/// Builder from triplets (COO -> canonical CSC): accumulate `(col, row,
/// value)` triplets with additive duplicate handling, then compress once
/// into CSC.
///
/// Accumulates final numeric values directly rather than separating a
/// symbolic pattern pass from a numeric fill pass, since the crossbar's `G`
/// is assembled once per `compute` call and never re-stamped.
#[derive(Debug)]
pub struct MatrixBuilder {
    n: usize,
    /// Unsorted triplets (column, row, value); sorted and combined in `build`.
    entries: Vec<(usize, usize, f64)>,
}

impl MatrixBuilder {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            entries: Vec::new(),
        }
    }

    pub fn reserve(&mut self, nnz: usize) {
        self.entries.reserve(nnz);
    }

    /// Accumulate `value` into entry `(row, col)` (additive, matching the
    /// `+=` stamping convention of Kirchhoff's-current-law assembly).
    pub fn add(&mut self, row: usize, col: usize, value: f64) -> Result<(), MatrixError> {
        if row >= self.n {
            return Err(MatrixError::OutOfBoundsIndex {
                index: row,
                max: self.n,
            });
        }
        if col >= self.n {
            return Err(MatrixError::OutOfBoundsIndex {
                index: col,
                max: self.n,
            });
        }
        self.entries.push((col, row, value));
        Ok(())
    }

    /// Combine duplicates (summing) and compress into CSC, sorted by
    /// `(column, row)` with strictly increasing rows within each column.
    pub fn build(mut self) -> Result<CscMatrix, MatrixError> {
        let n = self.n;
        self.entries.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

        let mut combined: Vec<(usize, usize, f64)> = Vec::with_capacity(self.entries.len());
        let mut last_col = usize::MAX;
        let mut last_row = usize::MAX;
        let mut acc = 0.0f64;
        for &(c, r, v) in &self.entries {
            if c == last_col && r == last_row {
                acc += v;
            } else {
                if last_col != usize::MAX && acc != 0.0 {
                    combined.push((last_col, last_row, acc));
                }
                last_col = c;
                last_row = r;
                acc = v;
            }
        }
        if last_col != usize::MAX && acc != 0.0 {
            combined.push((last_col, last_row, acc));
        }

        let mut column_pointers = vec![0usize; n + 1];
        for &(c, _r, _v) in &combined {
            column_pointers[c + 1] += 1;
        }
        for j in 0..n {
            column_pointers[j + 1] += column_pointers[j];
        }

        let nnz = combined.len();
        let mut row_indices = vec![0usize; nnz];
        let mut values = vec![0f64; nnz];
        let mut next = column_pointers.clone();
        for (c, r, v) in combined {
            let p = next[c];
            row_indices[p] = r;
            values[p] = v;
            next[c] += 1;
        }

        let a = CscMatrix {
            n,
            column_pointers,
            row_indices,
            values,
        };
        debug_assert!(a.check_invariants().is_ok());
        Ok(a)
    }
}
