//! Simulation settings.

use crate::{
    error::{ Result, SimError },
    strategy::Strategy,
};

/// Default numerical tolerance for normalization, unitarity, and equality
/// checks.
pub const EPSILON: f64 = 1e-3;

/// Largest register size with a representable state vector.
pub const MAX_QUBITS: usize = 32;

pub(crate) fn check_qubits(n: usize) -> Result<()> {
    if n > MAX_QUBITS {
        Err(SimError::TooManyQubits { n, max: MAX_QUBITS })
    } else {
        Ok(())
    }
}

/// Whether a circuit evolves a state vector or accumulates its overall
/// unitary.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Apply each operator to the current state vector.
    #[default]
    StateVector,
    /// Build each operator's full 2^n × 2^n matrix. Selects
    /// [`Strategy::Materialized`] for every operator.
    Unitary,
}

/// Settings for applying operators to registers.
///
/// ```
/// use lineq_sim::config::{ Config, Mode };
///
/// let config = Config::default()
///     .with_tolerance(1e-6)
///     .with_max_concurrency(4)
///     .with_mode(Mode::Unitary);
/// assert_eq!(config.max_concurrency, 4);
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Config {
    /// Equality tolerance ε.
    pub tolerance: f64,
    /// Upper bound on worker threads. Must be positive.
    pub max_concurrency: usize,
    pub mode: Mode,
    /// Force a particular strategy instead of choosing per operator.
    ///
    /// [`Strategy::Direct`] still falls back to [`Strategy::VirtualRow`] for
    /// operators it cannot handle.
    pub strategy: Option<Strategy>,
}

/// Tolerance [`EPSILON`], one worker per available core, state-vector mode,
/// and automatic strategy selection.
impl Default for Config {
    fn default() -> Self {
        let max_concurrency
            = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self {
            tolerance: EPSILON,
            max_concurrency,
            mode: Mode::StateVector,
            strategy: None,
        }
    }
}

impl Config {
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = Some(strategy);
        self
    }
}
