//! Interchangeable ways to apply an [`Operator`] to a state vector.
//!
//! All three strategies produce the same output to within floating-point
//! error; they differ only in cost:
//!
//! | Strategy | Work | Memory | Applies to |
//! |---|---|---|---|
//! | [`Direct`][Strategy::Direct] | *O*(2<sup>*n*</sup>) | *O*(2<sup>*n*</sup>) | one target line, no controls |
//! | [`VirtualRow`][Strategy::VirtualRow] | *O*(2<sup>*n* + *k*</sup>) | *O*(2<sup>*n*</sup>) | anything |
//! | [`Materialized`][Strategy::Materialized] | *O*(4<sup>*n*</sup>) | *O*(4<sup>*n*</sup>) | anything |
//!
//! Work items (index pairs for `Direct`, rows otherwise) are independent and
//! are fanned out over an [`Evaluator`].

use nalgebra as na;
use num_complex::Complex64 as C64;
use tracing::{ debug, trace };
use crate::{
    config::Mode,
    error::{ Result, SimError },
    evaluator::Evaluator,
    operator::Operator,
    virtual_op::VirtualOperator,
};

/// Method used to apply an operator to a state vector.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Update amplitude pairs in place of a single-line operator.
    Direct,
    /// Evaluate each output amplitude as a sparse row of the virtual operator.
    VirtualRow,
    /// Build the full matrix and multiply.
    Materialized,
}

impl Strategy {
    /// Pick a strategy from an operator's shape and the evolution mode.
    pub fn select(line_count: usize, has_controls: bool, mode: Mode) -> Self {
        match mode {
            Mode::Unitary => Self::Materialized,
            Mode::StateVector if line_count == 1 && !has_controls
                => Self::Direct,
            Mode::StateVector => Self::VirtualRow,
        }
    }

    /// Pick a strategy for `op`, honoring `requested` where possible.
    ///
    /// A request for [`Self::Direct`] on an operator it can't handle falls back
    /// to [`Self::VirtualRow`].
    pub fn resolve(requested: Option<Self>, op: &Operator, mode: Mode) -> Self {
        match requested {
            None => Self::select(op.num_lines(), op.is_oracle(), mode),
            Some(Self::Direct) if !direct_applicable(op) => {
                debug!(
                    lines = op.num_lines(),
                    oracle = op.is_oracle(),
                    "direct update not applicable; falling back to virtual rows"
                );
                Self::VirtualRow
            },
            Some(strategy) => strategy,
        }
    }

    /// Apply `op` to the `n`-qubit state vector `state`.
    ///
    /// Fails if `state` does not have exactly 2^`n` entries.
    pub fn apply(
        self,
        op: &Operator,
        state: &na::DVector<C64>,
        n: usize,
        eval: &Evaluator,
    ) -> Result<na::DVector<C64>>
    {
        check_state(state, n)?;
        trace!(strategy = ?self, n, lines = ?op.lines(), "applying operator");
        match self {
            Self::Direct if direct_applicable(op)
                => apply_direct(op, state, n, eval),
            Self::Direct | Self::VirtualRow
                => apply_virtual(op, state, n, eval),
            Self::Materialized
                => apply_materialized(op, state, n, eval),
        }
    }
}

fn check_state(state: &na::DVector<C64>, n: usize) -> Result<()> {
    let len = state.len();
    if !len.is_power_of_two() {
        return Err(SimError::LengthNotPowerOfTwo(len));
    }
    let got = len.trailing_zeros() as usize;
    if got != n {
        return Err(SimError::StateSizeMismatch { expected: n, got });
    }
    Ok(())
}

fn direct_applicable(op: &Operator) -> bool {
    op.num_lines() == 1 && !op.is_oracle()
}

// index pair `p` with a zero inserted at bit `line`
fn insert_zero(p: usize, line: usize) -> usize {
    let low = p & ((1 << line) - 1);
    let high = (p >> line) << (line + 1);
    high | low
}

fn apply_direct(
    op: &Operator,
    state: &na::DVector<C64>,
    n: usize,
    eval: &Evaluator,
) -> Result<na::DVector<C64>>
{
    op.check_bounds(n)?;
    let line = op.lines[0];
    let mask = 1_usize << line;
    let m = &op.matrix;
    let (m00, m01, m10, m11) = (m[(0, 0)], m[(0, 1)], m[(1, 0)], m[(1, 1)]);
    let half = state.len() / 2;
    let pairs: Vec<(C64, C64)>
        = eval.map(half, |p| {
            let i0 = insert_zero(p, line);
            let i1 = i0 | mask;
            let (a0, a1) = (state[i0], state[i1]);
            (m00 * a0 + m01 * a1, m10 * a0 + m11 * a1)
        });
    let mut out: na::DVector<C64> = na::DVector::zeros(state.len());
    for (p, (b0, b1)) in pairs.into_iter().enumerate() {
        let i0 = insert_zero(p, line);
        out[i0] = b0;
        out[i0 | mask] = b1;
    }
    Ok(out)
}

fn apply_virtual(
    op: &Operator,
    state: &na::DVector<C64>,
    n: usize,
    eval: &Evaluator,
) -> Result<na::DVector<C64>>
{
    let virt = VirtualOperator::new(op, n)?;
    let rows: Vec<C64> = eval.map(virt.dim(), |r| virt.row_dot(r, state));
    Ok(na::DVector::from_vec(rows))
}

fn apply_materialized(
    op: &Operator,
    state: &na::DVector<C64>,
    n: usize,
    eval: &Evaluator,
) -> Result<na::DVector<C64>>
{
    let full = materialize(op, n, eval)?;
    Ok(full * state)
}

/// Build the full 2^n × 2^n matrix of `op` embedded in an `n`-qubit register.
pub fn materialize(op: &Operator, n: usize, eval: &Evaluator)
    -> Result<na::DMatrix<C64>>
{
    let virt = VirtualOperator::new(op, n)?;
    debug!(n, dim = virt.dim(), "materializing operator");
    Ok(virt.materialize(eval))
}
