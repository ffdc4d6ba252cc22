//! Measuring a Bell pair in different ways.
//! Shows the four measurement variants, an eigenbasis observable and the
//! metrics on the reduced state.

use nalgebra::DMatrix;
use num_complex::Complex64;
use qureg::{
    ArrayReg, ComputationalBasis, EigenBasis, Locs, RegError, Register, fidelity, measure, measure_collapse,
    measure_collapseto, measure_remove, partial_tr, sample, von_neumann_entropy,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn main() -> Result<(), RegError> {
    println!("--- qureg Example: Bell pair measurements ---");
    let mut rng = StdRng::seed_from_u64(2024);

    // (|00> + |11>)/sqrt(2), four copies in one batched register
    let mut bell = ArrayReg::ghz_state(2, 4)?;
    println!("\n{bell}");

    // --- Non-destructive sampling ---
    let shots = sample(&mut bell, Locs::All, 16, &mut rng)?;
    println!("\n16 shots of batch 0: {:?}", shots[0]);

    // --- Keep: nothing changes ---
    let kept = measure(&ComputationalBasis, &mut bell, [0], &mut rng)?;
    println!("\nQubit 0 without collapse:\n{kept}");

    // --- Entanglement of the halves ---
    let half = partial_tr(&bell, &[1])?;
    println!("Entropy of one half (nats): {:?}", von_neumann_entropy(&half)?);

    // --- Collapse: the partner follows ---
    let first = measure_collapse(&ComputationalBasis, &mut bell, [0], &mut rng)?;
    let second = measure(&ComputationalBasis, &mut bell, [1], &mut rng)?;
    println!("Collapsed qubit 0: {:?}", first.outcomes());
    println!("Qubit 1 afterwards: {:?}", second.outcomes());

    // --- Remove: the measured qubit is gone ---
    let mut pair = ArrayReg::ghz_state(2, 1)?;
    let removed = measure_remove(&ComputationalBasis, &mut pair, [1], &mut rng)?;
    println!("\nRemoved qubit 1 (outcome {:?}):\n{pair}", removed.outcomes());

    // --- Collapse-to: force the measured qubit back to |0> ---
    let mut pair = ArrayReg::ghz_state(2, 1)?;
    let reset = measure_collapseto(&ComputationalBasis, &mut pair, [0], 0usize, &mut rng)?;
    println!("\nReset qubit 0 after outcome {:?}; probabilities {:?}", reset.outcomes(), pair.probs()?[0]);

    // --- Eigenbasis: |+> is the +1 eigenstate of X ---
    let (o, l) = (Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0));
    let x = EigenBasis::from_hermitian(&DMatrix::from_row_slice(2, 2, &[o, l, l, o]))?;
    let mut plus = ArrayReg::uniform_state(1, 1)?;
    let before = plus.clone();
    let value = measure_collapse(&x, &mut plus, Locs::All, &mut rng)?;
    println!("\nX outcome on |+>: {:?}", value.outcomes());
    println!("Fidelity with the state before: {:?}", fidelity(&plus, &before)?);

    Ok(())
}
