//! Nodal-analysis core for resistive crossbar arrays with non-ideal
//! interconnects.
//!
//! Computes steady-state node voltages and branch currents of a
//! rectangular crossbar of two-terminal resistive devices by solving
//! Kirchhoff's current law at every node, including the resistance of the
//! wordline and bitline interconnects themselves. See [`compute`] for the
//! public entry point.

pub mod assembler;
pub mod compute;
pub mod error;
pub mod extractor;
pub mod matrix;
pub mod rhs;
pub mod shapes;
pub mod solver;

pub use compute::{compute, ArrayOutput, Currents, Solution, Voltages};
pub use error::CrossbarError;
pub use shapes::Shape;
