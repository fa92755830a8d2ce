use lineq_sim::{
    circuit::Circuit,
    gate::Gate,
    register::{ basis_label, Register },
};
use tracing_subscriber::EnvFilter;

const N: usize = 4;

fn main() -> lineq_sim::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn"))
        )
        .init();

    let mut psi = Register::zero(N)?;
    println!("t=0");
    println!("{}", psi);

    psi = psi.apply(&Gate::H(0).operator()?)?;
    println!("t=1");
    println!("{}", psi);

    for k in 1..N {
        psi = psi.apply(&Gate::CX(k - 1, k).operator()?)?;
        println!("t={}", k + 1);
        println!("{}", psi);
    }

    println!("probabilities:");
    psi.probabilities().iter()
        .enumerate()
        .filter(|(_, p)| **p > 0.0)
        .for_each(|(k, p)| { println!("  ∣{}⟩: {:.4}", basis_label(k, N), p); });

    // uncompute
    let ghz = Circuit::from_gates(
        N,
        std::iter::once(Gate::H(0)).chain((1..N).map(|k| Gate::CX(k - 1, k))),
    )?;
    let back = ghz.inverse().run(&psi)?;
    println!("inverted:");
    println!("{}", back);
    Ok(())
}
