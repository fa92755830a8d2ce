//! Error type shared by every fallible operation in the crate.
//!
//! Validation happens when a value is built ([`Register`][crate::register::Register],
//! [`Operator`][crate::operator::Operator],
//! [`Evaluator`][crate::evaluator::Evaluator]); application and measurement
//! only re-check constraints relative to a particular register.

use thiserror::Error;

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, SimError>;

#[derive(Debug, Error)]
pub enum SimError {
    /* construction *******************************************************/

    /// A bit-string was empty or contained something other than `0`/`1`.
    #[error("invalid bit-string {0:?}: expected a non-empty string of '0' and '1'")]
    InvalidBitString(String),

    /// An amplitude vector whose length is not a power of two.
    #[error("state vector length {0} is not a power of two")]
    LengthNotPowerOfTwo(usize),

    /// A register of more than [`MAX_QUBITS`][crate::config::MAX_QUBITS]
    /// qubits was requested.
    #[error("{n} qubits exceeds the supported maximum of {max}")]
    TooManyQubits { n: usize, max: usize },

    /// Σ|a|² differs from 1 by more than the tolerance.
    #[error("state vector is not normalized: squared norm {norm_sqr} (tolerance {tol})")]
    NotNormalized { norm_sqr: f64, tol: f64 },

    #[error("base matrix must be square; got {rows} × {cols}")]
    NotSquare { rows: usize, cols: usize },

    #[error("base matrix size {0} is not a power of two")]
    MatrixNotPowerOfTwo(usize),

    #[error("base matrix is not unitary within tolerance {0}")]
    NotUnitary(f64),

    /// Number of lines doesn't match what the matrix (or register) requires.
    #[error("gate expects {expected} input line(s); got {got}")]
    GateInputCountMismatch { expected: usize, got: usize },

    #[error("gate input lines are not unique: {0:?}")]
    GateInputsNotUnique(Vec<usize>),

    #[error("line {0} is used as both a control and a target")]
    ControlTargetOverlap(usize),

    /* application ********************************************************/

    #[error("gate input line {line} is out of bounds for a {n}-qubit register")]
    GateInputsOutOfBound { line: usize, n: usize },

    #[error("cannot measure an empty set of lines")]
    EmptyMeasurement,

    #[error("measured lines are not unique: {0:?}")]
    MeasureLinesNotUnique(Vec<usize>),

    #[error("measured line {line} is out of bounds for a {n}-qubit register")]
    MeasureLineOutOfBound { line: usize, n: usize },

    #[error("measured lines must be in ascending order: {0:?}")]
    MeasureLinesNotSorted(Vec<usize>),

    /// A state vector of one register size was paired with another.
    #[error("state vector has {got} qubit(s) but {expected} were expected")]
    StateSizeMismatch { expected: usize, got: usize },

    /// A circuit built for one register size was run on another.
    #[error("circuit acts on {expected} qubit(s) but the register has {got}")]
    QubitCountMismatch { expected: usize, got: usize },

    /* configuration ******************************************************/

    #[error("concurrency bound must be positive; got {0}")]
    InvalidConcurrency(usize),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
