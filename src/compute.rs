//! Top-level entry point: validates input, dispatches to one of the five
//! state-machine paths (full system, WL-only, BL-only, ideal short, and
//! insulating), and assembles the public `Solution`.

use ndarray::{Array2, Array3, ArrayView2};

use crate::assembler::{self, AssemblyDomain};
use crate::error::CrossbarError;
use crate::extractor;
use crate::rhs;
use crate::shapes::Shape;
use crate::solver;

/// Classification of one interconnect resistance: the three-way split the
/// state machine dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interconnect {
    Positive,
    Zero,
    Infinite,
}

fn classify(r: f64) -> Interconnect {
    if r.is_infinite() {
        Interconnect::Infinite
    } else if r == 0.0 {
        Interconnect::Zero
    } else {
        Interconnect::Positive
    }
}

/// Node-voltage and branch-current arrays, shaped `(p, n)` for `output` and
/// `(m, n)` / `(m, n, p)` for everything else (squeezed when `p == 1`).
#[derive(Debug, Clone)]
pub struct Solution {
    pub currents: Currents,
    pub voltages: Voltages,
}

#[derive(Debug, Clone)]
pub struct Currents {
    pub output: Array2<f64>,
    pub device: Option<ArrayOutput>,
    pub word_line: Option<ArrayOutput>,
    pub bit_line: Option<ArrayOutput>,
}

#[derive(Debug, Clone, Default)]
pub struct Voltages {
    pub word_line: Option<ArrayOutput>,
    pub bit_line: Option<ArrayOutput>,
}

/// A `(m, n[, p])` array, squeezed to rank 2 when there is exactly one
/// stimulus column. Internally every array stays rank 3; the squeeze is a
/// convenience applied only at this outer boundary.
#[derive(Debug, Clone)]
pub enum ArrayOutput {
    Squeezed(Array2<f64>),
    Batched(Array3<f64>),
}

impl ArrayOutput {
    fn from_rank3(arr: Array3<f64>) -> Self {
        let (m, n, p) = arr.dim();
        if p == 1 {
            ArrayOutput::Squeezed(arr.into_shape_with_order((m, n)).expect("p == 1"))
        } else {
            ArrayOutput::Batched(arr)
        }
    }
}

/// Validate preconditions: shapes agree, every value is finite (or `+inf`
/// for resistances), no resistance is non-positive, and `r_word`/`r_bit`
/// are non-negative.
fn validate(
    applied_voltages: &Array2<f64>,
    resistances: &Array2<f64>,
    r_word: f64,
    r_bit: f64,
) -> Result<(), CrossbarError> {
    let (v_rows, _p) = applied_voltages.dim();
    let (r_rows, r_cols) = resistances.dim();
    if v_rows != r_rows {
        return Err(CrossbarError::ShapeMismatch { v_rows, r_rows });
    }

    for &v in applied_voltages.iter() {
        if !v.is_finite() {
            return Err(CrossbarError::DomainError {
                context: "applied_voltages",
                value: v,
            });
        }
    }

    for i in 0..r_rows {
        for j in 0..r_cols {
            let r = resistances[[i, j]];
            if r.is_nan() || r < 0.0 {
                return Err(CrossbarError::DomainError {
                    context: "resistances",
                    value: r,
                });
            }
            if r == 0.0 {
                return Err(CrossbarError::ZeroResistance { row: i, col: j });
            }
        }
    }

    if r_word.is_nan() || r_word < 0.0 {
        return Err(CrossbarError::DomainError {
            context: "r_word",
            value: r_word,
        });
    }
    if r_bit.is_nan() || r_bit < 0.0 {
        return Err(CrossbarError::DomainError {
            context: "r_bit",
            value: r_bit,
        });
    }

    Ok(())
}

/// Compute steady-state node voltages and branch currents of a resistive
/// crossbar array by nodal analysis.
pub fn compute(
    applied_voltages: &Array2<f64>,
    resistances: &Array2<f64>,
    r_word: f64,
    r_bit: f64,
    return_node_voltages: bool,
    return_all_currents: bool,
) -> Result<Solution, CrossbarError> {
    validate(applied_voltages, resistances, r_word, r_bit)?;

    let (rows, cols) = resistances.dim();
    let shape = Shape::new(rows, cols);
    let p = applied_voltages.ncols();

    match (classify(r_word), classify(r_bit)) {
        (Interconnect::Infinite, Interconnect::Infinite) => {
            Ok(insulating_solution(shape, p, return_node_voltages, return_all_currents))
        }
        (Interconnect::Zero, Interconnect::Zero) => Ok(ideal_solution(
            shape,
            applied_voltages.view(),
            resistances,
            return_node_voltages,
            return_all_currents,
        )),
        (word, bit) => {
            let domain = match (word, bit) {
                (Interconnect::Zero, _) => AssemblyDomain::BlOnly,
                (_, Interconnect::Zero) => AssemblyDomain::WlOnly,
                _ => AssemblyDomain::Full,
            };

            let g = assembler::assemble(shape, resistances, r_word, r_bit, domain)?;
            let i_src = rhs::build(shape, applied_voltages.view(), resistances, r_word, domain);
            let solved = solver::solve(&g, &i_src)?;

            let (wl_local, bl_local): (fn(&Shape, usize, usize) -> usize, fn(&Shape, usize, usize) -> usize) =
                match domain {
                    AssemblyDomain::Full => (|s, i, j| s.wl_index(i, j), |s, i, j| s.bl_index(i, j)),
                    AssemblyDomain::WlOnly => (|s, i, j| s.wl_index(i, j), |s, i, j| s.wl_index(i, j)),
                    AssemblyDomain::BlOnly => (|s, i, j| s.wl_index(i, j), |s, i, j| s.wl_index(i, j)),
                };

            let v_word = extractor::word_line_voltages(
                shape,
                &solved,
                applied_voltages.view(),
                r_word,
                |i, j| wl_local(&shape, i, j),
            );
            let v_bit = extractor::bit_line_voltages(shape, &solved, r_bit, |i, j| bl_local(&shape, i, j));
            let device = extractor::device_current(resistances, &v_word, &v_bit);
            let word_line = extractor::word_line_current(shape, applied_voltages.view(), &v_word, &device, r_word);
            let bit_line = extractor::bit_line_current(shape, &v_bit, &device, r_bit);
            let output = extractor::output_current(&bit_line);

            Ok(Solution {
                currents: Currents {
                    output,
                    device: return_all_currents.then(|| ArrayOutput::from_rank3(device)),
                    word_line: return_all_currents.then(|| ArrayOutput::from_rank3(word_line)),
                    bit_line: return_all_currents.then(|| ArrayOutput::from_rank3(bit_line)),
                },
                voltages: Voltages {
                    word_line: return_node_voltages.then(|| ArrayOutput::from_rank3(v_word)),
                    bit_line: return_node_voltages.then(|| ArrayOutput::from_rank3(v_bit)),
                },
            })
        }
    }
}

/// `r_word == r_bit == 0`: trivial ideal dot-product, no solve. In this
/// limit `output == V_app^T . (1/R)` element-wise-reciprocated and
/// broadcast, with `+inf` resistances contributing zero.
fn ideal_solution(
    shape: Shape,
    applied_voltages: ArrayView2<f64>,
    resistances: &Array2<f64>,
    return_node_voltages: bool,
    return_all_currents: bool,
) -> Solution {
    let (rows, cols) = (shape.rows, shape.cols);
    let p = applied_voltages.ncols();

    let mut device = Array3::zeros((rows, cols, p));
    for i in 0..rows {
        for j in 0..cols {
            let r = resistances[[i, j]];
            for k in 0..p {
                device[[i, j, k]] = applied_voltages[[i, k]] / r;
            }
        }
    }
    // With no interconnect drop anywhere, every segment carries exactly the
    // device current it feeds: word_line[i,j] sums devices j..n-1 on row i,
    // bit_line[i,j] sums devices 0..=i on column j.
    let word_line = extractor::word_line_current(shape, applied_voltages, &Array3::zeros((rows, cols, p)), &device, 0.0);
    let bit_line = extractor::bit_line_current(shape, &Array3::zeros((rows, cols, p)), &device, 0.0);
    let output = extractor::output_current(&bit_line);

    let v_word = Array3::from_shape_fn((rows, cols, p), |(i, _j, k)| applied_voltages[[i, k]]);
    let v_bit = Array3::zeros((rows, cols, p));

    Solution {
        currents: Currents {
            output,
            device: return_all_currents.then(|| ArrayOutput::from_rank3(device)),
            word_line: return_all_currents.then(|| ArrayOutput::from_rank3(word_line)),
            bit_line: return_all_currents.then(|| ArrayOutput::from_rank3(bit_line)),
        },
        voltages: Voltages {
            word_line: return_node_voltages.then(|| ArrayOutput::from_rank3(v_word)),
            bit_line: return_node_voltages.then(|| ArrayOutput::from_rank3(v_bit)),
        },
    }
}

/// `r_word == r_bit == +inf`: no current can flow anywhere. Node voltages
/// are undefined; emits the required warning once.
fn insulating_solution(shape: Shape, p: usize, _return_node_voltages: bool, return_all_currents: bool) -> Solution {
    log::warn!("all interconnects are perfectly insulating; node voltages are undefined");

    let (rows, cols) = (shape.rows, shape.cols);
    let output = Array2::zeros((p, cols));

    // Voltages are always null here regardless of `return_node_voltages`,
    // since they are mathematically undefined.
    Solution {
        currents: Currents {
            output,
            device: return_all_currents.then(|| ArrayOutput::from_rank3(Array3::zeros((rows, cols, p)))),
            word_line: return_all_currents.then(|| ArrayOutput::from_rank3(Array3::zeros((rows, cols, p)))),
            bit_line: return_all_currents.then(|| ArrayOutput::from_rank3(Array3::zeros((rows, cols, p)))),
        },
        voltages: Voltages {
            word_line: None,
            bit_line: None,
        },
    }
}
