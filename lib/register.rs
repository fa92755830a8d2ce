//! Pure states of an *n*-qubit register as vectors of 2<sup>*n*</sup> complex
//! amplitudes.
//!
//! Line *i* of the register is bit *i* of the basis-state index, and
//! bit-strings are written line 0 first: the string `"10"` is the two-qubit
//! state with line 0 set and line 1 clear, i.e. index 1.
//!
//! Registers are immutable values. Applying an [`Operator`] produces a new
//! register.
//!
//! # Example
//! ```
//! use lineq_sim::{ gate::Gate, register::Register };
//!
//! // ∣00⟩ -> (∣00⟩ + ∣11⟩) / √2
//! let psi = Register::zero(2).unwrap()
//!     .apply(&Gate::H(0).operator().unwrap()).unwrap()
//!     .apply(&Gate::CX(0, 1).operator().unwrap()).unwrap();
//! let probs = psi.measure(&[0, 1]).unwrap();
//! assert!((probs[0b00] - 0.5).abs() < 1e-12);
//! assert!((probs[0b11] - 0.5).abs() < 1e-12);
//! println!("{}", psi); // +0.7071∣00⟩ +0.7071∣11⟩
//! ```

use std::fmt;
use itertools::Itertools;
use nalgebra as na;
use num_complex::Complex64 as C64;
use rand::Rng;
use tracing::warn;
use crate::{
    config::{ check_qubits, Config, EPSILON },
    error::{ Result, SimError },
    evaluator::Evaluator,
    operator::Operator,
    rearrange::BitRearranger,
    strategy::Strategy,
};

/// Render basis-state `index` of an `n`-qubit register as a bit-string, line 0
/// first.
pub fn basis_label(index: usize, n: usize) -> String {
    (0..n)
        .map(|j| if (index >> j) & 1 == 1 { '1' } else { '0' })
        .collect()
}

/// A normalized pure state of `n` qubits.
#[derive(Clone, Debug, PartialEq)]
pub struct Register {
    n: usize,
    amps: na::DVector<C64>,
}

/// Ket notation, omitting terms with magnitude below [`EPSILON`].
impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let terms
            = self.amps.iter()
            .enumerate()
            .filter(|(_, a)| a.norm() >= EPSILON)
            .map(|(k, a)| {
                let label = basis_label(k, self.n);
                if a.im.abs() < EPSILON {
                    format!("{:+.4}∣{}⟩", a.re, label)
                } else {
                    format!("({:+.4}{:+.4}i)∣{}⟩", a.re, a.im, label)
                }
            })
            .join(" ");
        write!(f, "{}", terms)
    }
}

impl Register {
    /// Create a classical basis state from a bit-string.
    pub fn from_bits(bits: &str) -> Result<Self> {
        if bits.is_empty() {
            return Err(SimError::InvalidBitString(bits.to_string()));
        }
        check_qubits(bits.len())?;
        let index
            = bits.chars()
            .enumerate()
            .try_fold(0_usize, |acc, (j, c)| {
                match c {
                    '0' => Ok(acc),
                    '1' => Ok(acc | (1 << j)),
                    _ => Err(SimError::InvalidBitString(bits.to_string())),
                }
            })?;
        Ok(Self::basis(bits.len(), index))
    }

    /// Create the basis state ∣0...0⟩ on `n` qubits.
    pub fn zero(n: usize) -> Result<Self> {
        check_qubits(n)?;
        Ok(Self::basis(n, 0))
    }

    fn basis(n: usize, index: usize) -> Self {
        let mut amps: na::DVector<C64> = na::DVector::zeros(1 << n);
        amps[index] = C64::from(1.0);
        Self { n, amps }
    }

    // no normalization check; callers guarantee a unitary was applied
    pub(crate) fn from_raw(n: usize, amps: na::DVector<C64>) -> Self {
        Self { n, amps }
    }

    /// Create a new state from raw amplitudes, checking normalization to within
    /// [`EPSILON`].
    pub fn new<I>(amps: I) -> Result<Self>
    where I: IntoIterator<Item = C64>
    {
        Self::new_with_tol(amps, EPSILON)
    }

    /// Like [`Self::new`], with an explicit normalization tolerance.
    pub fn new_with_tol<I>(amps: I, tol: f64) -> Result<Self>
    where I: IntoIterator<Item = C64>
    {
        let amps: Vec<C64> = amps.into_iter().collect();
        let len = amps.len();
        if !len.is_power_of_two() {
            return Err(SimError::LengthNotPowerOfTwo(len));
        }
        let n = len.trailing_zeros() as usize;
        check_qubits(n)?;
        let amps = na::DVector::from_vec(amps);
        let norm_sqr = amps.norm_squared();
        if (norm_sqr - 1.0).abs() > tol {
            return Err(SimError::NotNormalized { norm_sqr, tol });
        }
        Ok(Self { n, amps })
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> usize { self.n }

    /// Number of amplitudes, 2^n.
    pub fn dim(&self) -> usize { self.amps.len() }

    pub fn amplitudes(&self) -> &na::DVector<C64> { &self.amps }

    pub fn into_vector(self) -> na::DVector<C64> { self.amps }

    /// Σ|a|² over all amplitudes.
    pub fn norm_sqr(&self) -> f64 { self.amps.norm_squared() }

    /// Return `true` if all amplitudes of `self` and `other` are within `tol`
    /// of each other.
    pub fn approx_eq(&self, other: &Self, tol: f64) -> bool {
        self.n == other.n
            && self.amps.iter().zip(other.amps.iter())
                .all(|(a, b)| (a - b).norm() <= tol)
    }

    /// Probability of every basis state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amps.iter().map(|a| a.norm_sqr()).collect()
    }

    fn check_lines(&self, lines: &[usize]) -> Result<()> {
        if lines.is_empty() {
            return Err(SimError::EmptyMeasurement);
        }
        if !lines.iter().all_unique() {
            return Err(SimError::MeasureLinesNotUnique(lines.to_vec()));
        }
        if let Some(&line) = lines.iter().find(|l| **l >= self.n) {
            return Err(SimError::MeasureLineOutOfBound { line, n: self.n });
        }
        Ok(())
    }

    /// Compute the outcome distribution of measuring `lines` in the Z-basis.
    ///
    /// The returned vector has length 2^`lines.len()`; bit *i* of an outcome
    /// is the value of `lines[i]`. No state collapse is performed.
    pub fn measure(&self, lines: &[usize]) -> Result<Vec<f64>> {
        self.check_lines(lines)?;
        let rearr = BitRearranger::new(self.n, lines);
        let mut probs: Vec<f64> = vec![0.0; rearr.local_dim()];
        self.amps.iter()
            .enumerate()
            .for_each(|(k, a)| { probs[rearr.local_index(k)] += a.norm_sqr(); });
        Ok(probs)
    }

    /// Like [`Self::measure`], but additionally requiring `lines` to be in
    /// ascending order.
    pub fn measure_strict(&self, lines: &[usize]) -> Result<Vec<f64>> {
        self.check_lines(lines)?;
        if !lines.iter().tuple_windows().all(|(a, b)| a < b) {
            return Err(SimError::MeasureLinesNotSorted(lines.to_vec()));
        }
        self.measure(lines)
    }

    /// Draw a single outcome from the distribution given by
    /// [`Self::measure`].
    pub fn sample<R>(&self, lines: &[usize], rng: &mut R) -> Result<usize>
    where R: Rng + ?Sized
    {
        let probs = self.measure(lines)?;
        let r: f64 = rng.gen();
        let mut acc: f64 = 0.0;
        let outcome
            = probs.iter()
            .position(|p| { acc += p; r < acc })
            // rounding can leave the total slightly below 1
            .unwrap_or_else(|| {
                probs.iter().rposition(|p| *p > 0.0).unwrap_or(0)
            });
        Ok(outcome)
    }

    /// Apply an operator, using the process-wide [`Evaluator`] and default
    /// [`Config`].
    pub fn apply(&self, op: &Operator) -> Result<Self> {
        let eval = Evaluator::shared()?;
        self.apply_with(op, &Config::default(), eval)
    }

    /// Apply an operator with explicit settings.
    pub fn apply_with(&self, op: &Operator, config: &Config, eval: &Evaluator)
        -> Result<Self>
    {
        op.check_bounds(self.n)?;
        let strategy = Strategy::resolve(config.strategy, op, config.mode);
        let amps = strategy.apply(op, &self.amps, self.n, eval)?;
        let norm_sqr = amps.norm_squared();
        if (norm_sqr - 1.0).abs() > config.tolerance {
            warn!(norm_sqr, ?strategy, "state drifted from unit norm");
        }
        Ok(Self { n: self.n, amps })
    }

    /// Apply a sequence of operators in order.
    pub fn apply_all<'a, I>(&self, ops: I) -> Result<Self>
    where I: IntoIterator<Item = &'a Operator>
    {
        let eval = Evaluator::shared()?;
        let config = Config::default();
        ops.into_iter()
            .try_fold(self.clone(), |psi, op| psi.apply_with(op, &config, eval))
    }
}
