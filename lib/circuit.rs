//! Ordered sequences of operators on a fixed-size register.
//!
//! A [`Circuit`] can either be run against a [`Register`], applying its
//! operators one at a time, or collapsed into the single 2<sup>*n*</sup> ×
//! 2<sup>*n*</sup> matrix it implements.
//!
//! # Example
//! ```
//! use lineq_sim::{ circuit::Circuit, gate::Gate, register::Register };
//!
//! let mut circ = Circuit::new(3);
//! circ.push_gate(Gate::H(0)).unwrap()
//!     .push_gate(Gate::CX(0, 1)).unwrap()
//!     .push_gate(Gate::CX(1, 2)).unwrap();
//! let psi = circ.run(&Register::zero(3).unwrap()).unwrap();
//! let probs = psi.probabilities();
//! assert!((probs[0b000] - 0.5).abs() < 1e-12);
//! assert!((probs[0b111] - 0.5).abs() < 1e-12);
//! ```

use nalgebra as na;
use num_complex::Complex64 as C64;
use tracing::{ debug, warn };
use crate::{
    config::{ check_qubits, Config, Mode },
    error::{ Result, SimError },
    evaluator::Evaluator,
    gate::Gate,
    operator::Operator,
    register::Register,
    strategy,
};

/// A sequence of operators acting on `n` qubits, applied in insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Circuit {
    n: usize,
    ops: Vec<Operator>,
}

impl Circuit {
    /// Create a new, empty circuit on `n` qubits.
    pub fn new(n: usize) -> Self { Self { n, ops: Vec::new() } }

    /// Create a new circuit from a sequence of gates.
    pub fn from_gates<I>(n: usize, gates: I) -> Result<Self>
    where I: IntoIterator<Item = Gate>
    {
        let mut circ = Self::new(n);
        for g in gates {
            circ.push_gate(g)?;
        }
        Ok(circ)
    }

    /// Number of qubits.
    pub fn n(&self) -> usize { self.n }

    /// Number of operators.
    pub fn len(&self) -> usize { self.ops.len() }

    pub fn is_empty(&self) -> bool { self.ops.is_empty() }

    pub fn ops(&self) -> &[Operator] { &self.ops }

    /// Append an operator, checking that it fits in the register.
    pub fn push(&mut self, op: Operator) -> Result<&mut Self> {
        op.check_bounds(self.n)?;
        self.ops.push(op);
        Ok(self)
    }

    /// Append a gate; see [`Self::push`].
    pub fn push_gate(&mut self, gate: Gate) -> Result<&mut Self> {
        self.push(gate.operator()?)
    }

    /// Return the inverse circuit: adjoint operators in reverse order.
    pub fn inverse(&self) -> Self {
        let ops = self.ops.iter().rev().map(Operator::adjoint).collect();
        Self { n: self.n, ops }
    }

    /// Run on a register, using the process-wide [`Evaluator`] and default
    /// [`Config`].
    pub fn run(&self, psi: &Register) -> Result<Register> {
        let eval = Evaluator::shared()?;
        self.run_with(psi, &Config::default(), eval)
    }

    /// Run on a register with explicit settings.
    ///
    /// In [`Mode::Unitary`], the overall matrix is built first (see
    /// [`Self::unitary_with`]) and applied once.
    pub fn run_with(&self, psi: &Register, config: &Config, eval: &Evaluator)
        -> Result<Register>
    {
        if psi.num_qubits() != self.n {
            return Err(SimError::QubitCountMismatch {
                expected: self.n,
                got: psi.num_qubits(),
            });
        }
        debug!(n = self.n, ops = self.ops.len(), mode = ?config.mode, "running circuit");
        match config.mode {
            Mode::StateVector => {
                self.ops.iter()
                    .try_fold(psi.clone(), |acc, op| acc.apply_with(op, config, eval))
            },
            Mode::Unitary => {
                let amps = self.unitary_with(eval)? * psi.amplitudes();
                let norm_sqr = amps.norm_squared();
                if (norm_sqr - 1.0).abs() > config.tolerance {
                    warn!(norm_sqr, "state drifted from unit norm");
                }
                Ok(Register::from_raw(self.n, amps))
            },
        }
    }

    /// Compute the full matrix of the circuit with the process-wide
    /// [`Evaluator`].
    pub fn unitary(&self) -> Result<na::DMatrix<C64>> {
        self.unitary_with(Evaluator::shared()?)
    }

    /// Compute the full matrix of the circuit, the product of each operator's
    /// materialized matrix with later operators on the left.
    pub fn unitary_with(&self, eval: &Evaluator) -> Result<na::DMatrix<C64>> {
        check_qubits(self.n)?;
        let dim = 1_usize << self.n;
        self.ops.iter()
            .try_fold(na::DMatrix::identity(dim, dim), |acc, op| {
                strategy::materialize(op, self.n, eval).map(|m| m * acc)
            })
    }
}
