//! KCL assembler: fills the sparse nodal-admittance matrix `G` by applying
//! Kirchhoff's current law at every active crossbar node.
//!
//! Follows a device "stamp" idiom: every node visit performs additive
//! `+=`/`-=` accumulation into a builder rather than direct dense
//! indexing, since `G` is sparse.

use ndarray::Array2;

use crate::error::CrossbarError;
use crate::matrix::builder::MatrixBuilder;
use crate::matrix::csc::CscMatrix;
use crate::shapes::Shape;

/// Which half (or both halves) of the node space are present in the
/// assembled system. When an interconnect resistance is exactly zero,
/// that side's node voltages are known a priori and its half is omitted
/// from `G` entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyDomain {
    /// Both `r_word > 0` and `r_bit > 0`: full `2*size` system.
    Full,
    /// `r_bit == 0`: only wordline nodes are unknown.
    WlOnly,
    /// `r_word == 0`: only bitline nodes are unknown.
    BlOnly,
}

impl AssemblyDomain {
    pub fn size(&self, shape: Shape) -> usize {
        match self {
            AssemblyDomain::Full => 2 * shape.size(),
            AssemblyDomain::WlOnly | AssemblyDomain::BlOnly => shape.size(),
        }
    }

    fn local_wl(&self, shape: Shape, row: usize, col: usize) -> Option<usize> {
        match self {
            AssemblyDomain::Full | AssemblyDomain::WlOnly => Some(shape.wl_index(row, col)),
            AssemblyDomain::BlOnly => None,
        }
    }

    fn local_bl(&self, shape: Shape, row: usize, col: usize) -> Option<usize> {
        match self {
            AssemblyDomain::Full => Some(shape.bl_index(row, col)),
            AssemblyDomain::BlOnly => Some(shape.wl_index(row, col)),
            AssemblyDomain::WlOnly => None,
        }
    }
}

/// Assemble `G` for the given domain. `r_word`/`r_bit` must be strictly
/// positive wherever the corresponding pass is active; the degenerate
/// zero/infinite cases are dispatched before this function is called (see
/// `compute`).
pub fn assemble(
    shape: Shape,
    resistances: &Array2<f64>,
    r_word: f64,
    r_bit: f64,
    domain: AssemblyDomain,
) -> Result<CscMatrix, CrossbarError> {
    let (rows, cols) = (shape.rows, shape.cols);
    let mut builder = MatrixBuilder::new(domain.size(shape));
    builder.reserve(6 * shape.size());

    let run_word = matches!(domain, AssemblyDomain::Full | AssemblyDomain::WlOnly);
    let run_bit = matches!(domain, AssemblyDomain::Full | AssemblyDomain::BlOnly);
    let cross_couple = matches!(domain, AssemblyDomain::Full);

    if run_word {
        let g_w = 1.0 / r_word;
        for i in 0..rows {
            for j in 0..cols {
                let g_d = 1.0 / resistances[[i, j]];
                let node = shape.wl_index(i, j);

                let (diag, left, right) = if cols == 1 {
                    (g_w + g_d, None, None)
                } else if j == 0 {
                    (2.0 * g_w + g_d, None, Some(shape.wl_index(i, j + 1)))
                } else if j == cols - 1 {
                    (g_w + g_d, Some(shape.wl_index(i, j - 1)), None)
                } else {
                    (
                        2.0 * g_w + g_d,
                        Some(shape.wl_index(i, j - 1)),
                        Some(shape.wl_index(i, j + 1)),
                    )
                };

                builder.add(node, node, diag)?;
                if let Some(left) = left {
                    builder.add(node, left, -g_w)?;
                }
                if let Some(right) = right {
                    builder.add(node, right, -g_w)?;
                }
                if cross_couple {
                    let bl = domain.local_bl(shape, i, j).expect("cross-couple implies BL present");
                    builder.add(node, bl, -g_d)?;
                }
            }
        }
    }

    if run_bit {
        let g_b = 1.0 / r_bit;
        for i in 0..rows {
            for j in 0..cols {
                let g_d = 1.0 / resistances[[i, j]];
                let node = domain.local_bl(shape, i, j).expect("bit pass implies BL present");

                let (diag, up, down) = if rows == 1 {
                    (g_b + g_d, None, None)
                } else if i == 0 {
                    (g_b + g_d, None, Some(domain.local_bl(shape, i + 1, j).unwrap()))
                } else if i == rows - 1 {
                    (2.0 * g_b + g_d, Some(domain.local_bl(shape, i - 1, j).unwrap()), None)
                } else {
                    (
                        2.0 * g_b + g_d,
                        Some(domain.local_bl(shape, i - 1, j).unwrap()),
                        Some(domain.local_bl(shape, i + 1, j).unwrap()),
                    )
                };

                builder.add(node, node, diag)?;
                if let Some(up) = up {
                    builder.add(node, up, -g_b)?;
                }
                if let Some(down) = down {
                    builder.add(node, down, -g_b)?;
                }
                if cross_couple {
                    let wl = domain.local_wl(shape, i, j).expect("cross-couple implies WL present");
                    builder.add(node, wl, -g_d)?;
                }
            }
        }
    }

    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    #[test]
    fn full_system_is_symmetric_and_right_sized() {
        let shape = Shape::new(2, 3);
        let r = arr2(&[[10.0, 20.0, 30.0], [40.0, 50.0, 60.0]]);
        let g = assemble(shape, &r, 0.1, 0.1, AssemblyDomain::Full).unwrap();
        assert_eq!(g.n, 12);
        for i in 0..g.n {
            for j in 0..g.n {
                assert!((g.get(i, j) - g.get(j, i)).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn last_column_diag_has_one_fewer_word_line_term() {
        let shape = Shape::new(1, 3);
        let r = arr2(&[[10.0, 20.0, 30.0]]);
        let g = assemble(shape, &r, 0.1, 0.1, AssemblyDomain::Full).unwrap();
        let g_w = 1.0 / 0.1;
        let g_d_last = 1.0 / 30.0;
        let last = shape.wl_index(0, 2);
        assert!((g.get(last, last) - (g_w + g_d_last)).abs() < 1e-9);
    }

    #[test]
    fn bl_only_domain_uses_unoffset_local_indices() {
        let shape = Shape::new(2, 2);
        let r = arr2(&[[1.0, 2.0], [3.0, 4.0]]);
        let g = assemble(shape, &r, 0.0, 0.5, AssemblyDomain::BlOnly).unwrap();
        assert_eq!(g.n, shape.size());
    }

    #[test]
    fn infinite_resistance_device_contributes_zero_conductance() {
        let shape = Shape::new(1, 1);
        let r = arr2(&[[f64::INFINITY]]);
        let g = assemble(shape, &r, 1.0, 1.0, AssemblyDomain::Full).unwrap();
        // cross-coupling term is -g_d = 0, so it should not create a stored
        // entry (builder drops zero values), leaving only the two diagonals.
        assert_eq!(g.nnz(), 2);
    }
}
