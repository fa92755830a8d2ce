//! The full-space matrix implied by an [`Operator`] on an *n*-qubit register,
//! evaluated on demand.
//!
//! Entry (*r*, *c*) of the 2<sup>*n*</sup> × 2<sup>*n*</sup> matrix is zero
//! unless *r* and *c* agree on every line the operator doesn't touch, in which
//! case it is the base-matrix entry at the local indices of *r* and *c*. For an
//! oracle, rows whose control lines don't match the truth table are rows of the
//! identity instead. Each row therefore has at most 2<sup>*k*</sup> nonzero
//! entries, and nothing of size 4<sup>*n*</sup> is allocated unless
//! [`VirtualOperator::materialize`] is called.

use itertools::Either;
use nalgebra as na;
use num_complex::Complex64 as C64;
use crate::{
    config::check_qubits,
    error::Result,
    evaluator::Evaluator,
    operator::Operator,
    oracle::ControlGate,
    rearrange::BitRearranger,
};

const ZERO: C64 = C64 { re: 0.0, im: 0.0 };
const ONE: C64 = C64 { re: 1.0, im: 0.0 };

/// An [`Operator`] embedded in an `n`-qubit register.
#[derive(Clone, Debug)]
pub struct VirtualOperator<'a> {
    op: &'a Operator,
    n: usize,
    rearr: BitRearranger,
    control: Option<ControlGate<'a>>,
}

impl<'a> VirtualOperator<'a> {
    /// Embed `op` in an `n`-qubit register.
    ///
    /// Fails if `op` touches more lines than the register has, any line is out
    /// of bounds, or `n` exceeds [`MAX_QUBITS`][crate::config::MAX_QUBITS].
    pub fn new(op: &'a Operator, n: usize) -> Result<Self> {
        check_qubits(n)?;
        op.check_bounds(n)?;
        let rearr = BitRearranger::new(n, op.lines());
        let control = op.controls().map(|c| c.gate(n));
        Ok(Self { op, n, rearr, control })
    }

    /// Number of register qubits.
    pub fn n(&self) -> usize { self.n }

    /// Side length of the full matrix, 2^n.
    pub fn dim(&self) -> usize { 1 << self.n }

    pub fn operator(&self) -> &Operator { self.op }

    pub fn rearranger(&self) -> &BitRearranger { &self.rearr }

    /// Return `true` if the base matrix acts on `row` (always, unless `self`
    /// is an oracle whose controls don't match).
    pub fn is_active(&self, row: usize) -> bool {
        self.control.as_ref().map_or(true, |g| g.is_active(row))
    }

    /// Matrix element (`row`, `col`).
    pub fn entry(&self, row: usize, col: usize) -> C64 {
        if !self.is_active(row) {
            return if row == col { ONE } else { ZERO };
        }
        if !self.rearr.same_unselected(row, col) { return ZERO; }
        self.op.matrix[(self.rearr.local_index(row), self.rearr.local_index(col))]
    }

    /// Iterate over the structurally nonzero `(col, value)` pairs of `row`, in
    /// order of the base matrix's columns.
    pub fn row(&self, row: usize) -> impl Iterator<Item = (usize, C64)> + '_ {
        if self.is_active(row) {
            let lr = self.rearr.local_index(row);
            let iter
                = self.rearr.siblings(row)
                .enumerate()
                .map(move |(lc, col)| (col, self.op.matrix[(lr, lc)]));
            Either::Left(iter)
        } else {
            Either::Right(std::iter::once((row, ONE)))
        }
    }

    /// Dot product of `row` with a state vector.
    pub fn row_dot(&self, row: usize, state: &na::DVector<C64>) -> C64 {
        self.row(row).map(|(col, v)| v * state[col]).sum()
    }

    /// Build one dense row.
    pub fn dense_row(&self, row: usize) -> Vec<C64> {
        let mut acc: Vec<C64> = vec![ZERO; self.dim()];
        self.row(row).for_each(|(col, v)| { acc[col] += v; });
        acc
    }

    /// Build the full matrix, one row per work item.
    pub fn materialize(&self, eval: &Evaluator) -> na::DMatrix<C64> {
        let dim = self.dim();
        let rows: Vec<Vec<C64>> = eval.map(dim, |r| self.dense_row(r));
        na::DMatrix::from_row_iterator(dim, dim, rows.into_iter().flatten())
    }
}
