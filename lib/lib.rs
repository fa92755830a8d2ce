//! Dense state-vector simulation of registers of qubits.
//!
//! States are stored as 2<sup>*n*</sup> complex amplitudes. Gates are small
//! unitaries on an ordered subset of register lines, optionally gated by a
//! truth table over a further set of control lines, and are applied by one of
//! several interchangeable [strategies][strategy::Strategy] whose independent
//! work items are fanned out over a bounded worker pool.
//!
//! Line *i* is bit *i* of a basis-state index throughout.

pub mod error;
pub mod config;
pub mod rearrange;
pub mod oracle;
pub mod operator;
pub mod virtual_op;
pub mod evaluator;
pub mod strategy;
pub mod register;
pub mod gate;
pub mod circuit;

pub use num_complex::Complex64 as C64;
pub use error::{ Result, SimError };
