//! Validated gate descriptors: a small dense unitary plus the register lines it
//! acts on.
//!
//! An [`Operator`] holds a 2<sup>*k*</sup> × 2<sup>*k*</sup> "base" matrix and
//! an ordered list of *k* distinct target lines. The order of the lines
//! matters: the *i*-th line supplies bit *i* of the base matrix's row/column
//! index (see [`BitRearranger`][crate::rearrange::BitRearranger]). Optionally,
//! an operator carries [`Controls`], making it an oracle that acts only when
//! the control lines match its truth table.
//!
//! All validation happens here, at construction. Application only re-checks
//! that the lines fit a particular register.
//!
//! # Example
//! ```
//! use lineq_sim::{ C64, operator::Operator };
//! use nalgebra as na;
//!
//! let o = C64::from(0.0);
//! let l = C64::from(1.0);
//! let not = na::DMatrix::from_row_slice(2, 2, &[o, l, l, o]);
//! // a Toffoli gate: flip line 2 when lines 0 and 1 are both set
//! let toffoli = Operator::controlled(not, vec![2], vec![0, 1]).unwrap();
//! assert!(toffoli.is_oracle());
//! assert_eq!(toffoli.num_lines(), 1);
//!
//! // non-unitary matrices are rejected
//! let bad = na::DMatrix::from_row_slice(2, 2, &[l, l, o, l]);
//! assert!(Operator::new(bad, vec![0]).is_err());
//! ```

use itertools::Itertools;
use nalgebra as na;
use crate::{
    C64,
    config::EPSILON,
    error::{ Result, SimError },
    oracle::{ Controls, TruthTable },
};

/// Return `true` if `m` is square and `m† m` is the identity to within `tol`
/// in every entry.
pub fn is_unitary(m: &na::DMatrix<C64>, tol: f64) -> bool {
    if !m.is_square() { return false; }
    let d = m.nrows();
    let prod = m.adjoint() * m;
    let ident: na::DMatrix<C64> = na::DMatrix::identity(d, d);
    prod.iter().zip(ident.iter()).all(|(a, b)| (a - b).norm() <= tol)
}

/// A validated unitary acting on an ordered set of register lines.
#[derive(Clone, Debug, PartialEq)]
pub struct Operator {
    pub(crate) matrix: na::DMatrix<C64>,
    pub(crate) lines: Vec<usize>,
    pub(crate) controls: Option<Controls>,
}

impl Operator {
    /// Create a new operator, checking the base matrix for unitarity to within
    /// [`EPSILON`].
    pub fn new(matrix: na::DMatrix<C64>, lines: Vec<usize>) -> Result<Self> {
        Self::new_with_tol(matrix, lines, EPSILON)
    }

    /// Like [`Self::new`], with an explicit unitarity tolerance.
    pub fn new_with_tol(matrix: na::DMatrix<C64>, lines: Vec<usize>, tol: f64)
        -> Result<Self>
    {
        check_matrix(&matrix, &lines, tol)?;
        Ok(Self { matrix, lines, controls: None })
    }

    /// Create an oracle operator, active only where the control lines match
    /// `controls`' truth table.
    pub fn oracle(
        matrix: na::DMatrix<C64>,
        lines: Vec<usize>,
        controls: Controls,
    ) -> Result<Self>
    {
        Self::oracle_with_tol(matrix, lines, controls, EPSILON)
    }

    /// Like [`Self::oracle`], with an explicit unitarity tolerance.
    pub fn oracle_with_tol(
        matrix: na::DMatrix<C64>,
        lines: Vec<usize>,
        controls: Controls,
        tol: f64,
    ) -> Result<Self>
    {
        check_matrix(&matrix, &lines, tol)?;
        check_unique(&controls.lines)?;
        if let Some(l) = controls.lines.iter().find(|c| lines.contains(*c)) {
            return Err(SimError::ControlTargetOverlap(*l));
        }
        Ok(Self { matrix, lines, controls: Some(controls) })
    }

    /// Create an operator acting on `lines` only when every line in `controls`
    /// is 1.
    pub fn controlled(
        matrix: na::DMatrix<C64>,
        lines: Vec<usize>,
        controls: Vec<usize>,
    ) -> Result<Self>
    {
        Self::oracle(matrix, lines, Controls::all_set(controls))
    }

    /// Create an oracle from bit-string truth-table entries over `controls`.
    ///
    /// Malformed entries are ignored; see [`TruthTable::parse`].
    pub fn from_truth_table<I, S>(
        matrix: na::DMatrix<C64>,
        lines: Vec<usize>,
        controls: Vec<usize>,
        entries: I,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let table = TruthTable::parse(controls.len(), entries);
        Self::oracle(matrix, lines, Controls::new(controls, table))
    }

    /// The base matrix.
    pub fn matrix(&self) -> &na::DMatrix<C64> { &self.matrix }

    /// Target lines, in base-matrix bit order.
    pub fn lines(&self) -> &[usize] { &self.lines }

    /// Number of target lines, *k*.
    pub fn num_lines(&self) -> usize { self.lines.len() }

    pub fn controls(&self) -> Option<&Controls> { self.controls.as_ref() }

    /// Return `true` if `self` carries control lines.
    pub fn is_oracle(&self) -> bool { self.controls.is_some() }

    /// Iterate over all lines touched by `self`, targets first.
    pub fn all_lines(&self) -> impl Iterator<Item = usize> + '_ {
        self.lines.iter()
            .chain(self.controls.iter().flat_map(|c| c.lines.iter()))
            .copied()
    }

    /// Return the inverse operator (the conjugate transpose of the base
    /// matrix, on the same lines and controls).
    pub fn adjoint(&self) -> Self {
        Self {
            matrix: self.matrix.adjoint(),
            lines: self.lines.clone(),
            controls: self.controls.clone(),
        }
    }

    /// Check that every line touched by `self` fits in an `n`-qubit register.
    pub(crate) fn check_bounds(&self, n: usize) -> Result<()> {
        let count = self.all_lines().count();
        if count > n {
            return Err(SimError::GateInputCountMismatch { expected: n, got: count });
        }
        if let Some(line) = self.all_lines().find(|l| *l >= n) {
            return Err(SimError::GateInputsOutOfBound { line, n });
        }
        Ok(())
    }
}

fn check_unique(lines: &[usize]) -> Result<()> {
    if lines.iter().all_unique() {
        Ok(())
    } else {
        Err(SimError::GateInputsNotUnique(lines.to_vec()))
    }
}

fn check_matrix(matrix: &na::DMatrix<C64>, lines: &[usize], tol: f64)
    -> Result<()>
{
    let (rows, cols) = matrix.shape();
    if rows != cols {
        return Err(SimError::NotSquare { rows, cols });
    }
    if !rows.is_power_of_two() {
        return Err(SimError::MatrixNotPowerOfTwo(rows));
    }
    let k = rows.trailing_zeros() as usize;
    if lines.len() != k {
        return Err(SimError::GateInputCountMismatch { expected: k, got: lines.len() });
    }
    check_unique(lines)?;
    if !is_unitary(matrix, tol) {
        return Err(SimError::NotUnitary(tol));
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn c(re: f64, im: f64) -> C64 { C64::new(re, im) }

    fn x() -> na::DMatrix<C64> {
        na::DMatrix::from_row_slice(2, 2, &[
            c(0.0, 0.0), c(1.0, 0.0),
            c(1.0, 0.0), c(0.0, 0.0),
        ])
    }

    #[test]
    fn unitary_check() {
        let s = std::f64::consts::FRAC_1_SQRT_2;
        let h = na::DMatrix::from_row_slice(2, 2, &[
            c(s, 0.0), c(s, 0.0),
            c(s, 0.0), c(-s, 0.0),
        ]);
        assert!(is_unitary(&h, 1e-12));
        assert!(is_unitary(&x(), 1e-12));
        let scaled = h * c(1.1, 0.0);
        assert!(!is_unitary(&scaled, 1e-3));
    }

    #[test]
    fn rejects_bad_shapes() {
        let rect: na::DMatrix<C64> = na::DMatrix::zeros(2, 4);
        assert!(matches!(
            Operator::new(rect, vec![0]),
            Err(SimError::NotSquare { rows: 2, cols: 4 }),
        ));
        let three: na::DMatrix<C64> = na::DMatrix::identity(3, 3);
        assert!(matches!(
            Operator::new(three, vec![0]),
            Err(SimError::MatrixNotPowerOfTwo(3)),
        ));
    }

    #[test]
    fn rejects_bad_lines() {
        let ident: na::DMatrix<C64> = na::DMatrix::identity(4, 4);
        assert!(matches!(
            Operator::new(ident.clone(), vec![0]),
            Err(SimError::GateInputCountMismatch { expected: 2, got: 1 }),
        ));
        assert!(matches!(
            Operator::new(ident, vec![1, 1]),
            Err(SimError::GateInputsNotUnique(_)),
        ));
    }

    #[test]
    fn rejects_control_overlap() {
        assert!(matches!(
            Operator::controlled(x(), vec![1], vec![0, 1]),
            Err(SimError::ControlTargetOverlap(1)),
        ));
        assert!(matches!(
            Operator::controlled(x(), vec![2], vec![0, 0]),
            Err(SimError::GateInputsNotUnique(_)),
        ));
    }

    #[test]
    fn bounds_relative_to_register() {
        let op = Operator::controlled(x(), vec![2], vec![0]).unwrap();
        assert!(op.check_bounds(3).is_ok());
        assert!(matches!(
            op.check_bounds(2),
            Err(SimError::GateInputsOutOfBound { line: 2, n: 2 }),
        ));
        assert!(matches!(
            op.check_bounds(1),
            Err(SimError::GateInputCountMismatch { expected: 1, got: 2 }),
        ));
    }

    #[test]
    fn adjoint_inverts() {
        let t = na::DMatrix::from_row_slice(2, 2, &[
            c(1.0, 0.0), c(0.0, 0.0),
            c(0.0, 0.0), C64::cis(std::f64::consts::FRAC_PI_4),
        ]);
        let op = Operator::new(t, vec![0]).unwrap();
        let prod = op.adjoint().matrix() * op.matrix();
        assert!((prod[(1, 1)] - c(1.0, 0.0)).norm() < 1e-12);
        assert_eq!(op.adjoint().lines(), op.lines());
    }

    #[test]
    fn truth_table_leniency() {
        let op = Operator::from_truth_table(x(), vec![0], vec![1, 2], ["11", "1q", ""])
            .unwrap();
        assert_eq!(op.controls().unwrap().table().len(), 1);
        assert_eq!(op.all_lines().collect::<Vec<_>>(), vec![0, 1, 2]);
    }
}
