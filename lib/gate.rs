//! Common gates, convertible to [`Operator`]s.
//!
//! Controlled gates are built as oracle operators with a single all-ones
//! truth-table entry, so the control lines never enter the base matrix.

use std::f64::consts::FRAC_1_SQRT_2;
use nalgebra as na;
use num_complex::Complex64 as C64;
use once_cell::sync::Lazy;
use rand::Rng;
use crate::{
    error::Result,
    operator::Operator,
};

const Z0: C64 = C64 { re: 0.0, im: 0.0 };
const Z1: C64 = C64 { re: 1.0, im: 0.0 };
const ORT2: C64 = C64 { re: FRAC_1_SQRT_2, im: 0.0 };
const I: C64 = C64 { re: 0.0, im: 1.0 };

static H: Lazy<na::DMatrix<C64>>
    = Lazy::new(|| na::DMatrix::from_row_slice(2, 2, &[ORT2, ORT2, ORT2, -ORT2]));
static X: Lazy<na::DMatrix<C64>>
    = Lazy::new(|| na::DMatrix::from_row_slice(2, 2, &[Z0, Z1, Z1, Z0]));
static Y: Lazy<na::DMatrix<C64>>
    = Lazy::new(|| na::DMatrix::from_row_slice(2, 2, &[Z0, -I, I, Z0]));
static Z: Lazy<na::DMatrix<C64>>
    = Lazy::new(|| na::DMatrix::from_row_slice(2, 2, &[Z1, Z0, Z0, -Z1]));
static S: Lazy<na::DMatrix<C64>>
    = Lazy::new(|| na::DMatrix::from_row_slice(2, 2, &[Z1, Z0, Z0, I]));
static T: Lazy<na::DMatrix<C64>>
    = Lazy::new(|| {
        let ph = C64::cis(std::f64::consts::FRAC_PI_4);
        na::DMatrix::from_row_slice(2, 2, &[Z1, Z0, Z0, ph])
    });
// rows/columns indexed by (line a) + 2 (line b)
static SWAP: Lazy<na::DMatrix<C64>>
    = Lazy::new(|| {
        na::DMatrix::from_row_slice(4, 4, &[
            Z1, Z0, Z0, Z0,
            Z0, Z0, Z1, Z0,
            Z0, Z1, Z0, Z0,
            Z0, Z0, Z0, Z1,
        ])
    });

/// Rotation about X by `angle`, with global phase `e^(i angle / 2)`.
pub fn xrot(angle: f64) -> na::DMatrix<C64> {
    let ang2 = angle / 2.0;
    let prefactor = C64::cis(ang2);
    let ondiag = prefactor * ang2.cos();
    let offdiag = prefactor * -I * ang2.sin();
    na::DMatrix::from_row_slice(2, 2, &[ondiag, offdiag, offdiag, ondiag])
}

/// Rotation about Y by `angle`, with global phase `e^(i angle / 2)`.
pub fn yrot(angle: f64) -> na::DMatrix<C64> {
    let ang2 = angle / 2.0;
    let prefactor = C64::cis(ang2);
    let ondiag = prefactor * ang2.cos();
    let offdiag = prefactor * ang2.sin();
    na::DMatrix::from_row_slice(2, 2, &[ondiag, -offdiag, offdiag, ondiag])
}

/// Phase rotation about Z by `angle`: diag(1, e^(i angle)).
pub fn zrot(angle: f64) -> na::DMatrix<C64> {
    na::DMatrix::from_row_slice(2, 2, &[Z1, Z0, Z0, C64::cis(angle)])
}

/// Single-qubit unitary from its Euler angles, equal to `Z(γ) × X(β) × Z(α)`.
pub fn euler(alpha: f64, beta: f64, gamma: f64) -> na::DMatrix<C64> {
    zrot(gamma) * xrot(beta) * zrot(alpha)
}

/// Description of a single gate on a register of qubit lines.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Gate {
    /// Hadamard
    H(usize),
    /// π rotation about X
    X(usize),
    /// π rotation about Y
    Y(usize),
    /// π rotation about Z
    Z(usize),
    /// π/2 rotation about Z
    S(usize),
    /// π/4 rotation about Z
    T(usize),
    /// Arbitrary rotation about X
    XRot(usize, f64),
    /// Arbitrary rotation about Y
    YRot(usize, f64),
    /// Arbitrary rotation about Z
    ZRot(usize, f64),
    /// Euler-angle rotation; see [`euler`].
    U(usize, f64, f64, f64),
    /// Z-controlled π rotation about X.
    ///
    /// The first qubit index is the control.
    CX(usize, usize),
    /// Z-controlled π rotation about Y.
    ///
    /// The first qubit index is the control.
    CY(usize, usize),
    /// Z-controlled π rotation about Z.
    ///
    /// The first qubit index is the control.
    CZ(usize, usize),
    /// Swap
    Swap(usize, usize),
    /// Doubly controlled π rotation about X.
    ///
    /// The first two qubit indices are the controls.
    Toffoli(usize, usize, usize),
}

impl Gate {
    /// Return `true` if `self` is implemented with control lines.
    pub fn is_controlled(&self) -> bool {
        matches!(self, Self::CX(..) | Self::CY(..) | Self::CZ(..) | Self::Toffoli(..))
    }

    /// All lines the gate touches, targets first.
    pub fn lines(&self) -> Vec<usize> {
        match *self {
            Self::H(k)
            | Self::X(k)
            | Self::Y(k)
            | Self::Z(k)
            | Self::S(k)
            | Self::T(k)
            | Self::XRot(k, _)
            | Self::YRot(k, _)
            | Self::ZRot(k, _)
            | Self::U(k, ..)
            => vec![k],
            Self::CX(c, t)
            | Self::CY(c, t)
            | Self::CZ(c, t)
            => vec![t, c],
            Self::Swap(a, b) => vec![a, b],
            Self::Toffoli(c0, c1, t) => vec![t, c0, c1],
        }
    }

    /// Convert to a validated [`Operator`].
    ///
    /// Fails if two-qubit or three-qubit gate indices are not distinct.
    pub fn operator(&self) -> Result<Operator> {
        match *self {
            Self::H(k) => Operator::new(H.clone(), vec![k]),
            Self::X(k) => Operator::new(X.clone(), vec![k]),
            Self::Y(k) => Operator::new(Y.clone(), vec![k]),
            Self::Z(k) => Operator::new(Z.clone(), vec![k]),
            Self::S(k) => Operator::new(S.clone(), vec![k]),
            Self::T(k) => Operator::new(T.clone(), vec![k]),
            Self::XRot(k, ang) => Operator::new(xrot(ang), vec![k]),
            Self::YRot(k, ang) => Operator::new(yrot(ang), vec![k]),
            Self::ZRot(k, ang) => Operator::new(zrot(ang), vec![k]),
            Self::U(k, alpha, beta, gamma)
                => Operator::new(euler(alpha, beta, gamma), vec![k]),
            Self::CX(c, t) => Operator::controlled(X.clone(), vec![t], vec![c]),
            Self::CY(c, t) => Operator::controlled(Y.clone(), vec![t], vec![c]),
            Self::CZ(c, t) => Operator::controlled(Z.clone(), vec![t], vec![c]),
            Self::Swap(a, b) => Operator::new(SWAP.clone(), vec![a, b]),
            Self::Toffoli(c0, c1, t)
                => Operator::controlled(X.clone(), vec![t], vec![c0, c1]),
        }
    }

    /// Sample a random single-qubit gate (`H`, `X`, `Y`, `Z`, `S`, or `T`) for
    /// a given qubit index.
    pub fn sample_single<R>(idx: usize, rng: &mut R) -> Self
    where R: Rng + ?Sized
    {
        match rng.gen_range(0..6_usize) {
            0 => Self::H(idx),
            1 => Self::X(idx),
            2 => Self::Y(idx),
            3 => Self::Z(idx),
            4 => Self::S(idx),
            5 => Self::T(idx),
            _ => unreachable!(),
        }
    }
}

#[cfg(test)]
mod test {
    use std::f64::consts::{ FRAC_PI_2, FRAC_PI_4, PI };
    use rand::{ rngs::StdRng, SeedableRng };
    use crate::{
        error::SimError,
        operator::is_unitary,
        register::Register,
    };
    use super::*;

    #[test]
    fn catalog_is_unitary() {
        let gates = [
            Gate::H(0), Gate::X(0), Gate::Y(0), Gate::Z(0), Gate::S(0),
            Gate::T(0), Gate::XRot(0, 0.3), Gate::YRot(0, 1.7),
            Gate::ZRot(0, -2.1), Gate::U(0, 0.4, 1.1, -0.9),
            Gate::CX(0, 1), Gate::CY(1, 0), Gate::CZ(0, 2), Gate::Swap(2, 0),
            Gate::Toffoli(0, 1, 2),
        ];
        for g in gates {
            let op = g.operator().unwrap();
            assert!(is_unitary(op.matrix(), 1e-12), "{g:?} is not unitary");
            assert_eq!(op.all_lines().collect::<Vec<_>>(), g.lines());
            assert_eq!(op.is_oracle(), g.is_controlled());
        }
    }

    #[test]
    fn repeated_indices_rejected() {
        assert!(matches!(Gate::CX(1, 1).operator(), Err(SimError::ControlTargetOverlap(1))));
        assert!(matches!(Gate::Swap(0, 0).operator(), Err(SimError::GateInputsNotUnique(_))));
        assert!(matches!(Gate::Toffoli(0, 0, 1).operator(), Err(SimError::GateInputsNotUnique(_))));
    }

    #[test]
    fn swap_exchanges_lines() {
        let psi = Register::from_bits("100").unwrap();
        let out = psi.apply(&Gate::Swap(0, 2).operator().unwrap()).unwrap();
        assert!(out.approx_eq(&Register::from_bits("001").unwrap(), 1e-12));
    }

    #[test]
    fn toffoli_truth_table() {
        let op = Gate::Toffoli(0, 1, 2).operator().unwrap();
        for (input, output) in [
            ("000", "000"), ("100", "100"), ("010", "010"),
            ("110", "111"), ("111", "110"),
        ] {
            let psi = Register::from_bits(input).unwrap().apply(&op).unwrap();
            assert!(
                psi.approx_eq(&Register::from_bits(output).unwrap(), 1e-12),
                "Toffoli ∣{input}⟩ gave {psi}",
            );
        }
    }

    #[test]
    fn rotations_by_pi() {
        // X(π) = e^(iπ/2) (-i X) = X
        let xpi = xrot(PI);
        assert!((xpi - X.clone()).iter().all(|z| z.norm() < 1e-12));
        let ypi = yrot(PI);
        assert!((ypi - Y.clone()).iter().all(|z| z.norm() < 1e-12));
        let zpi = zrot(PI);
        assert!((zpi - Z.clone()).iter().all(|z| z.norm() < 1e-12));
    }

    #[test]
    fn yrot_quarter_turn_is_positive() {
        // Y(π/2) ∣0⟩ = e^(iπ/4) (∣0⟩ + ∣1⟩) / √2
        let psi = Register::zero(1).unwrap()
            .apply(&Gate::YRot(0, FRAC_PI_2).operator().unwrap())
            .unwrap();
        let phase = C64::cis(FRAC_PI_4) * FRAC_1_SQRT_2;
        assert!((psi.amplitudes()[0] - phase).norm() < 1e-12);
        assert!((psi.amplitudes()[1] - phase).norm() < 1e-12);
    }

    #[test]
    fn sampled_gates_are_single_qubit() {
        let mut rng = StdRng::seed_from_u64(10546);
        for _ in 0..50 {
            let g = Gate::sample_single(3, &mut rng);
            assert_eq!(g.lines(), vec![3]);
            assert!(!g.is_controlled());
        }
    }
}
