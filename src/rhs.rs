//! RHS builder: fills the dense current-injection matrix `I_src` for one
//! or more voltage stimuli.
//!
//! Dense rather than sparse because each column of `I_src` only has
//! structural zeros along one axis (the wordline entry column), so it is
//! filled as a plain `Vec<f64>` per stimulus rather than through the
//! sparse builder.

use ndarray::{Array2, ArrayView2};

use crate::assembler::AssemblyDomain;
use crate::shapes::Shape;

/// Build `I_src` as `p` dense columns of length `domain.size(shape)`.
///
/// `applied_voltages` is `m x p`. `r_word == 0` selects the alternate
/// formula that drives current through every device directly from the
/// (now-known) wordline voltage.
pub fn build(
    shape: Shape,
    applied_voltages: ArrayView2<f64>,
    resistances: &Array2<f64>,
    r_word: f64,
    domain: AssemblyDomain,
) -> Vec<Vec<f64>> {
    let (rows, cols) = (shape.rows, shape.cols);
    let p = applied_voltages.ncols();
    let n = domain.size(shape);

    let mut columns: Vec<Vec<f64>> = (0..p).map(|_| vec![0.0; n]).collect();

    if r_word > 0.0 {
        let wl_local = |i: usize, j: usize| match domain {
            AssemblyDomain::Full | AssemblyDomain::WlOnly => shape.wl_index(i, j),
            AssemblyDomain::BlOnly => unreachable!("r_word > 0 implies the WL pass is active"),
        };
        for i in 0..rows {
            let node = wl_local(i, 0);
            for k in 0..p {
                columns[k][node] = applied_voltages[[i, k]] / r_word;
            }
        }
    } else {
        // r_word == 0: the WL half is omitted; inject directly into the BL
        // (or the full system's BL-equivalent) node through each device.
        for i in 0..rows {
            for j in 0..cols {
                let node = match domain {
                    AssemblyDomain::BlOnly => shape.wl_index(i, j),
                    _ => unreachable!("r_word == 0 implies the WL half was omitted"),
                };
                let g_d_denominator = resistances[[i, j]];
                for k in 0..p {
                    columns[k][node] = applied_voltages[[i, k]] / g_d_denominator;
                }
            }
        }
    }

    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    #[test]
    fn positive_r_word_injects_only_at_leftmost_column() {
        let shape = Shape::new(2, 3);
        let r = arr2(&[[10.0, 20.0, 30.0], [40.0, 50.0, 60.0]]);
        let v = arr2(&[[3.0], [5.0]]);
        let cols = build(shape, v.view(), &r, 0.1, AssemblyDomain::Full);
        assert_eq!(cols.len(), 1);
        let col = &cols[0];
        assert_eq!(col[shape.wl_index(0, 0)], 3.0 / 0.1);
        assert_eq!(col[shape.wl_index(1, 0)], 5.0 / 0.1);
        assert_eq!(col[shape.wl_index(0, 1)], 0.0);
        assert_eq!(col[shape.bl_index(0, 0)], 0.0);
    }

    #[test]
    fn zero_r_word_injects_through_every_device() {
        let shape = Shape::new(1, 2);
        let r = arr2(&[[10.0, 20.0]]);
        let v = arr2(&[[4.0]]);
        let cols = build(shape, v.view(), &r, 0.0, AssemblyDomain::BlOnly);
        let col = &cols[0];
        assert_eq!(col[shape.wl_index(0, 0)], 4.0 / 10.0);
        assert_eq!(col[shape.wl_index(0, 1)], 4.0 / 20.0);
    }

    #[test]
    fn multiple_stimuli_produce_independent_columns() {
        let shape = Shape::new(1, 1);
        let r = arr2(&[[5.0]]);
        let v = arr2(&[[1.0, 2.0, 3.0]]);
        let cols = build(shape, v.view(), &r, 1.0, AssemblyDomain::Full);
        assert_eq!(cols.len(), 3);
        assert_eq!(cols[0][shape.wl_index(0, 0)], 1.0);
        assert_eq!(cols[2][shape.wl_index(0, 0)], 3.0);
    }
}
