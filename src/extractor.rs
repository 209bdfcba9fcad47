//! Solution extractor: reconstructs node voltages and every branch current
//! from the solved `v` and the original problem data.
//!
//! Always computes the rank-3 `(m, n, p)` form; squeezing to `(m, n)` for
//! `p == 1` happens only at the `compute` API boundary, keeping one
//! canonical internal shape with presentation-layer conversions kept out
//! of the numerical core.

use ndarray::{Array2, Array3, ArrayView2};

use crate::shapes::Shape;

/// Node voltages for one node family (wordline or bitline), rank-3
/// `(rows, cols, p)`.
pub fn word_line_voltages(
    shape: Shape,
    solved: &[Vec<f64>],
    applied_voltages: ArrayView2<f64>,
    r_word: f64,
    wl_local: impl Fn(usize, usize) -> usize,
) -> Array3<f64> {
    let (rows, cols) = (shape.rows, shape.cols);
    let p = solved.len();
    let mut out = Array3::zeros((rows, cols, p));
    if r_word == 0.0 {
        for i in 0..rows {
            for j in 0..cols {
                for k in 0..p {
                    out[[i, j, k]] = applied_voltages[[i, k]];
                }
            }
        }
    } else {
        for i in 0..rows {
            for j in 0..cols {
                let node = wl_local(i, j);
                for k in 0..p {
                    out[[i, j, k]] = solved[k][node];
                }
            }
        }
    }
    out
}

/// Node voltages for the bitline family; all zero when `r_bit == 0`.
pub fn bit_line_voltages(
    shape: Shape,
    solved: &[Vec<f64>],
    r_bit: f64,
    bl_local: impl Fn(usize, usize) -> usize,
) -> Array3<f64> {
    let (rows, cols) = (shape.rows, shape.cols);
    let p = solved.len();
    let mut out = Array3::zeros((rows, cols, p));
    if r_bit != 0.0 {
        for i in 0..rows {
            for j in 0..cols {
                let node = bl_local(i, j);
                for k in 0..p {
                    out[[i, j, k]] = solved[k][node];
                }
            }
        }
    }
    out
}

/// Device current: `(v_word - v_bit) / R`. Zero for `R = +inf` with no
/// special-casing, since `x / +inf == 0.0` under IEEE 754.
pub fn device_current(resistances: &Array2<f64>, v_word: &Array3<f64>, v_bit: &Array3<f64>) -> Array3<f64> {
    let (rows, cols, p) = v_word.dim();
    let mut out = Array3::zeros((rows, cols, p));
    for i in 0..rows {
        for j in 0..cols {
            let r = resistances[[i, j]];
            for k in 0..p {
                out[[i, j, k]] = (v_word[[i, j, k]] - v_bit[[i, j, k]]) / r;
            }
        }
    }
    out
}

/// Wordline segment current, immediately left of `(i,j)` (`j = 0` is the
/// segment between the input terminal and the first node).
pub fn word_line_current(
    shape: Shape,
    applied_voltages: ArrayView2<f64>,
    v_word: &Array3<f64>,
    device: &Array3<f64>,
    r_word: f64,
) -> Array3<f64> {
    let (rows, cols) = (shape.rows, shape.cols);
    let p = v_word.dim().2;
    let mut out = Array3::zeros((rows, cols, p));
    if r_word > 0.0 {
        for i in 0..rows {
            for k in 0..p {
                out[[i, 0, k]] = (applied_voltages[[i, k]] - v_word[[i, 0, k]]) / r_word;
                for j in 1..cols {
                    out[[i, j, k]] = (v_word[[i, j - 1, k]] - v_word[[i, j, k]]) / r_word;
                }
            }
        }
    } else {
        // r_word == 0: KCL on the collapsed wordline, cumulative sum of
        // device currents from the right edge inward.
        for i in 0..rows {
            for k in 0..p {
                let mut acc = 0.0;
                for j in (0..cols).rev() {
                    acc += device[[i, j, k]];
                    out[[i, j, k]] = acc;
                }
            }
        }
    }
    out
}

/// Bitline segment current, immediately below `(i,j)` (`i = rows-1` is the
/// segment between the bottom node and ground).
pub fn bit_line_current(shape: Shape, v_bit: &Array3<f64>, device: &Array3<f64>, r_bit: f64) -> Array3<f64> {
    let (rows, cols) = (shape.rows, shape.cols);
    let p = v_bit.dim().2;
    let mut out = Array3::zeros((rows, cols, p));
    if r_bit > 0.0 {
        for j in 0..cols {
            for k in 0..p {
                for i in 0..rows - 1 {
                    out[[i, j, k]] = (v_bit[[i, j, k]] - v_bit[[i + 1, j, k]]) / r_bit;
                }
                out[[rows - 1, j, k]] = v_bit[[rows - 1, j, k]] / r_bit;
            }
        }
    } else {
        // r_bit == 0: KCL on the collapsed bitline, cumulative sum of device
        // currents from the top edge downward.
        for j in 0..cols {
            for k in 0..p {
                let mut acc = 0.0;
                for i in 0..rows {
                    acc += device[[i, j, k]];
                    out[[i, j, k]] = acc;
                }
            }
        }
    }
    out
}

/// Output current drawn at the bottom of each bitline, shape `(p, n)`.
pub fn output_current(bit_line: &Array3<f64>) -> Array2<f64> {
    let (rows, cols, p) = bit_line.dim();
    let last_row = rows - 1;
    let mut out = Array2::zeros((p, cols));
    for j in 0..cols {
        for k in 0..p {
            out[[k, j]] = bit_line[[last_row, j, k]];
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    #[test]
    fn device_current_is_zero_for_infinite_resistance() {
        let r = arr2(&[[f64::INFINITY]]);
        let v_word = Array3::from_elem((1, 1, 1), 5.0);
        let v_bit = Array3::from_elem((1, 1, 1), 1.0);
        let dev = device_current(&r, &v_word, &v_bit);
        assert_eq!(dev[[0, 0, 0]], 0.0);
    }

    #[test]
    fn output_current_matches_bottom_bitline_row() {
        let mut bl = Array3::zeros((2, 3, 1));
        bl[[1, 2, 0]] = 0.1834;
        let out = output_current(&bl);
        assert_eq!(out[[0, 2]], 0.1834);
        assert_eq!(out.dim(), (1, 3));
    }

    #[test]
    fn word_line_current_accumulates_for_zero_r_word() {
        let shape = Shape::new(1, 3);
        let device = Array3::from_shape_vec((1, 3, 1), vec![0.1, 0.2, 0.05]).unwrap();
        let v_word = Array3::zeros((1, 3, 1));
        let wl = word_line_current(shape, arr2(&[[0.0]]).view(), &v_word, &device, 0.0);
        assert!((wl[[0, 2, 0]] - 0.05).abs() < 1e-12);
        assert!((wl[[0, 1, 0]] - 0.25).abs() < 1e-12);
        assert!((wl[[0, 0, 0]] - 0.35).abs() < 1e-12);
    }

    #[test]
    fn bit_line_current_accumulates_for_zero_r_bit() {
        let shape = Shape::new(3, 1);
        let device = Array3::from_shape_vec((3, 1, 1), vec![0.1, 0.2, 0.05]).unwrap();
        let bl = bit_line_current(shape, &Array3::zeros((3, 1, 1)), &device, 0.0);
        assert!((bl[[0, 0, 0]] - 0.1).abs() < 1e-12);
        assert!((bl[[2, 0, 0]] - 0.35).abs() < 1e-12);
    }
}
