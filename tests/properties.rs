//! Property-based tests over random states and random unitaries.

use lineq_sim::{
    C64,
    config::Config,
    evaluator::Evaluator,
    operator::Operator,
    oracle::{ Controls, TruthTable },
    register::{ basis_label, Register },
    strategy::Strategy,
};
use nalgebra as na;
use proptest::prelude::*;
use rand::{ rngs::StdRng, seq::SliceRandom, Rng, SeedableRng };

const TOL: f64 = 1e-10;

const ALL: [Strategy; 3]
    = [Strategy::Direct, Strategy::VirtualRow, Strategy::Materialized];

fn random_unitary(k: usize, rng: &mut StdRng) -> na::DMatrix<C64> {
    let d = 1 << k;
    let m = na::DMatrix::from_fn(d, d, |_, _| {
        C64::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0))
    });
    m.qr().q()
}

fn random_register(n: usize, rng: &mut StdRng) -> Register {
    let v: na::DVector<C64> = na::DVector::from_fn(1 << n, |_, _| {
        C64::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0))
    });
    let norm = v.norm();
    Register::new(v.unscale(norm).iter().copied()).unwrap()
}

// all lines of the register in random order; a prefix serves as targets
fn random_lines(n: usize, rng: &mut StdRng) -> Vec<usize> {
    let mut lines: Vec<usize> = (0..n).collect();
    lines.shuffle(rng);
    lines
}

// random unitary on a prefix of the lines, gated by a random truth table over
// the rest
fn random_oracle(n: usize, kraw: usize, rng: &mut StdRng) -> Operator {
    let k = 1 + kraw % (n - 1);
    let lines = random_lines(n, rng);
    let controls = lines[k..].to_vec();
    let width = controls.len();
    let patterns: Vec<usize>
        = (0..1_usize << width).filter(|_| rng.gen_bool(0.5)).collect();
    let table = TruthTable::from_patterns(width, patterns);
    Operator::oracle(random_unitary(k, rng), lines[..k].to_vec(), Controls::new(controls, table))
        .unwrap()
}

// base matrix for the same operator after its lines are reordered so that new
// local bit i is old local bit perm[i]
fn permute_matrix(m: &na::DMatrix<C64>, perm: &[usize]) -> na::DMatrix<C64> {
    let old = |new: usize| {
        perm.iter().enumerate()
            .fold(0, |acc, (i, &p)| acc | (((new >> i) & 1) << p))
    };
    let d = m.nrows();
    na::DMatrix::from_fn(d, d, |r, c| m[(old(r), old(c))])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn application_preserves_norm(n in 1usize..5, kraw in 0usize..4, seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let k = 1 + kraw % n;
        let lines = random_lines(n, &mut rng);
        let op = Operator::new(random_unitary(k, &mut rng), lines[..k].to_vec()).unwrap();
        let psi = random_register(n, &mut rng);
        let out = psi.apply(&op).unwrap();
        prop_assert!((out.norm_sqr() - 1.0).abs() < TOL);
    }

    #[test]
    fn strategies_agree(n in 1usize..5, kraw in 0usize..4, seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let k = 1 + kraw % n;
        let lines = random_lines(n, &mut rng);
        let op = Operator::new(random_unitary(k, &mut rng), lines[..k].to_vec()).unwrap();
        let psi = random_register(n, &mut rng);
        let eval = Evaluator::new(3).unwrap();
        let outs: Vec<Register>
            = ALL.iter()
            .map(|s| {
                let config = Config::default().with_strategy(*s);
                psi.apply_with(&op, &config, &eval).unwrap()
            })
            .collect();
        prop_assert!(outs[0].approx_eq(&outs[1], TOL));
        prop_assert!(outs[1].approx_eq(&outs[2], TOL));
    }

    #[test]
    fn oracle_strategies_agree_and_invert(
        n in 2usize..5,
        kraw in 0usize..3,
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let op = random_oracle(n, kraw, &mut rng);
        let psi = random_register(n, &mut rng);
        let eval = Evaluator::new(3).unwrap();
        let outs: Vec<Register>
            = ALL.iter()
            .map(|s| {
                let config = Config::default().with_strategy(*s);
                psi.apply_with(&op, &config, &eval).unwrap()
            })
            .collect();
        prop_assert!(outs[0].approx_eq(&outs[1], TOL));
        prop_assert!(outs[1].approx_eq(&outs[2], TOL));
        prop_assert!((outs[0].norm_sqr() - 1.0).abs() < TOL);
        for (s, out) in ALL.iter().zip(&outs) {
            let config = Config::default().with_strategy(*s);
            let back = out.apply_with(&op.adjoint(), &config, &eval).unwrap();
            prop_assert!(back.approx_eq(&psi, TOL));
        }
    }

    #[test]
    fn adjoint_round_trip(n in 1usize..5, kraw in 0usize..4, seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let k = 1 + kraw % n;
        let lines = random_lines(n, &mut rng);
        let op = Operator::new(random_unitary(k, &mut rng), lines[..k].to_vec()).unwrap();
        let psi = random_register(n, &mut rng);
        let back = psi.apply(&op).unwrap().apply(&op.adjoint()).unwrap();
        prop_assert!(back.approx_eq(&psi, TOL));
    }

    #[test]
    fn line_order_is_matrix_order(n in 2usize..5, kraw in 0usize..3, seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let k = 2 + kraw % (n - 1);
        let lines = random_lines(n, &mut rng);
        let m = random_unitary(k, &mut rng);
        let mut perm: Vec<usize> = (0..k).collect();
        perm.shuffle(&mut rng);
        let plines: Vec<usize> = perm.iter().map(|&p| lines[p]).collect();
        let a = Operator::new(m.clone(), lines[..k].to_vec()).unwrap();
        let b = Operator::new(permute_matrix(&m, &perm), plines).unwrap();
        let psi = random_register(n, &mut rng);
        prop_assert!(psi.apply(&a).unwrap().approx_eq(&psi.apply(&b).unwrap(), TOL));
    }

    #[test]
    fn worker_count_is_invisible(n in 1usize..5, kraw in 0usize..4, seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let k = 1 + kraw % n;
        let lines = random_lines(n, &mut rng);
        let op = Operator::new(random_unitary(k, &mut rng), lines[..k].to_vec()).unwrap();
        let psi = random_register(n, &mut rng);
        let one = Evaluator::new(1).unwrap();
        let many = Evaluator::new(4).unwrap();
        for s in ALL {
            let config = Config::default().with_strategy(s);
            let a = psi.apply_with(&op, &config, &one).unwrap();
            let b = psi.apply_with(&op, &config, &many).unwrap();
            prop_assert_eq!(a.amplitudes(), b.amplitudes());
        }
    }

    #[test]
    fn oracle_acts_only_on_listed_patterns(
        n in 2usize..5,
        kraw in 0usize..3,
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let k = 1 + kraw % (n - 1);
        let lines = random_lines(n, &mut rng);
        let targets = lines[..k].to_vec();
        let controls = lines[k..].to_vec();
        let width = controls.len();
        let patterns: Vec<usize>
            = (0..1_usize << width).filter(|_| rng.gen_bool(0.5)).collect();
        let m = random_unitary(k, &mut rng);
        let table = TruthTable::from_patterns(width, patterns.iter().copied());
        let oracle
            = Operator::oracle(m.clone(), targets.clone(), Controls::new(controls.clone(), table))
            .unwrap();
        let plain = Operator::new(m, targets).unwrap();
        for index in 0..1_usize << n {
            let psi = Register::from_bits(&basis_label(index, n)).unwrap();
            let pattern
                = controls.iter().enumerate()
                .fold(0, |acc, (j, &c)| acc | (((index >> c) & 1) << j));
            let expected
                = if patterns.contains(&pattern) { psi.apply(&plain).unwrap() } else { psi.clone() };
            prop_assert!(psi.apply(&oracle).unwrap().approx_eq(&expected, TOL));
        }
    }
}

#[test]
fn empty_truth_table_is_identity() {
    let mut rng = StdRng::seed_from_u64(10546);
    let psi = random_register(4, &mut rng);
    let op = Operator::oracle(
        random_unitary(2, &mut rng),
        vec![3, 1],
        Controls::new(vec![0, 2], TruthTable::empty(2)),
    )
    .unwrap();
    let eval = Evaluator::new(2).unwrap();
    for s in ALL {
        let config = Config::default().with_strategy(s);
        assert!(psi.apply_with(&op, &config, &eval).unwrap().approx_eq(&psi, TOL));
    }
}

#[test]
fn marginal_of_five_state() {
    let a = C64::from(1.0 / 5.0_f64.sqrt());
    let z = C64::from(0.0);
    let psi = Register::new([z, a, a, a, a, z, z, a]).unwrap();
    let probs = psi.measure(&[0]).unwrap();
    assert!((probs[0] - 0.4).abs() < TOL);
    assert!((probs[1] - 0.6).abs() < TOL);
}
