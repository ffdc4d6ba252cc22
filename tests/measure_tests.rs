// tests/measure_tests.rs

use nalgebra::DMatrix;
use num_complex::Complex64;
use qureg::{
    ArrayReg, BitStr, ComputationalBasis, DensityReg, EigenBasis, Locs, RegError, Register, focus, measure,
    measure_collapse, measure_collapseto, measure_remove, sample,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

const TOLERANCE: f64 = 1e-10;

fn rng() -> StdRng {
    StdRng::seed_from_u64(0x5eed)
}

fn assert_probs_close(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "length mismatch");
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!((a - e).abs() < TOLERANCE, "index {i}: {a} vs {e}");
    }
}

fn pauli_z() -> DMatrix<Complex64> {
    let (o, l) = (Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0));
    DMatrix::from_row_slice(2, 2, &[l, o, o, -l])
}

fn pauli_x() -> DMatrix<Complex64> {
    let (o, l) = (Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0));
    DMatrix::from_row_slice(2, 2, &[o, l, l, o])
}

#[test]
fn test_basis_state_is_measured_exactly() -> Result<(), RegError> {
    let mut rng = rng();
    let mut r = ArrayReg::product_state("0110".parse()?, 3)?;
    for _ in 0..5 {
        let result = measure_collapse(&ComputationalBasis, &mut r, Locs::All, &mut rng)?;
        assert_eq!(result.outcomes(), &[6, 6, 6]);
    }
    Ok(())
}

#[test]
fn test_collapse_is_idempotent() -> Result<(), RegError> {
    let mut rng = rng();
    let mut r = ArrayReg::uniform_state(3, 4)?;
    let first = measure_collapse(&ComputationalBasis, &mut r, Locs::All, &mut rng)?;
    for _ in 0..5 {
        let again = measure_collapse(&ComputationalBasis, &mut r, Locs::All, &mut rng)?;
        assert_eq!(again, first);
    }
    Ok(())
}

#[test]
fn test_keep_does_not_mutate() -> Result<(), RegError> {
    let mut rng = rng();
    let mut r = ArrayReg::rand_state(3, 2, &mut rng)?;
    let probs_before = r.probs()?;
    let state_before = r.clone();

    measure(&ComputationalBasis, &mut r, Locs::All, &mut rng)?;
    measure(&ComputationalBasis, &mut r, [2, 0], &mut rng)?;

    assert_eq!(r.probs()?, probs_before);
    assert_eq!(r, state_before);
    Ok(())
}

#[test]
fn test_location_results_follow_location_order() -> Result<(), RegError> {
    let mut rng = rng();
    // qubit 0 = 1, qubit 1 = 0, qubit 2 = 1, qubit 3 = 1
    let mut r = ArrayReg::product_state("1101".parse()?, 1)?;
    assert_eq!(measure(&ComputationalBasis, &mut r, [0, 1], &mut rng)?.outcomes(), &[0b01]);
    assert_eq!(measure(&ComputationalBasis, &mut r, [1, 0], &mut rng)?.outcomes(), &[0b10]);
    assert_eq!(measure(&ComputationalBasis, &mut r, 3usize, &mut rng)?.outcomes(), &[1]);
    assert_eq!(r.nactive(), 4);
    Ok(())
}

#[test]
fn test_collapse_on_subset_conditions_partner() -> Result<(), RegError> {
    let mut rng = rng();
    let mut r = ArrayReg::ghz_state(3, 1)?;
    let outcome = measure_collapse(&ComputationalBasis, &mut r, [1], &mut rng)?.outcomes()[0];
    assert_eq!(r.nactive(), 3);
    let expected_index = if outcome == 1 { 0b111 } else { 0 };
    assert!((r.probs()?[0][expected_index] - 1.0).abs() < TOLERANCE);
    Ok(())
}

#[test]
fn test_remove_shrinks_register() -> Result<(), RegError> {
    let mut rng = rng();
    let mut r = ArrayReg::rand_state(5, 2, &mut rng)?;
    let result = measure_remove(&ComputationalBasis, &mut r, [4, 0, 2], &mut rng)?;
    assert_eq!(result.len(), 2);
    assert!(result.outcomes().iter().all(|&o| o < 8));
    assert_eq!((r.nqubits(), r.nactive()), (2, 2));
    for probs in r.probs()? {
        assert!((probs.iter().sum::<f64>() - 1.0).abs() < TOLERANCE);
    }
    Ok(())
}

#[test]
fn test_remove_from_partial_focus() -> Result<(), RegError> {
    let mut rng = rng();
    let mut r = ArrayReg::zero_state(4, 1)?;
    focus(&mut r, &[0, 1, 2])?;
    measure_remove(&ComputationalBasis, &mut r, [1], &mut rng)?;
    assert_eq!((r.nqubits(), r.nactive()), (3, 2));
    Ok(())
}

#[test]
fn test_remove_everything_active() -> Result<(), RegError> {
    let mut rng = rng();
    let mut r = ArrayReg::ghz_state(2, 1)?;
    let result = measure_remove(&ComputationalBasis, &mut r, Locs::All, &mut rng)?;
    assert!(result.outcomes()[0] == 0 || result.outcomes()[0] == 3);
    assert_eq!((r.nqubits(), r.nactive()), (0, 0));
    Ok(())
}

#[test]
fn test_collapseto_forces_configuration() -> Result<(), RegError> {
    let mut rng = rng();
    let mut r = ArrayReg::ghz_state(3, 1)?;
    let result = measure_collapseto(&ComputationalBasis, &mut r, [0, 1], "10".parse::<BitStr>()?, &mut rng)?;
    let outcome = result.outcomes()[0];
    assert!(outcome == 0 || outcome == 3);

    // measured qubits now read 0b10 (qubit 1 set); qubit 2 follows the sampled outcome
    let qubit2 = if outcome == 3 { 1 } else { 0 };
    let mut expected = vec![0.0; 8];
    expected[(qubit2 << 2) | 0b010] = 1.0;
    assert_probs_close(&r.probs()?[0], &expected);
    Ok(())
}

#[test]
fn test_collapseto_rejects_wide_config_without_mutation() -> Result<(), RegError> {
    let mut rng = rng();
    let mut r = ArrayReg::uniform_state(3, 1)?;
    let before = r.clone();
    let err = measure_collapseto(&ComputationalBasis, &mut r, [0, 2], 0b100usize, &mut rng);
    assert!(matches!(err, Err(RegError::DimensionOverflow { config: 4, width: 3, nactive: 2 })));
    assert_eq!(r, before);
    Ok(())
}

#[test]
fn test_eigen_z_reports_eigenvalues() -> Result<(), RegError> {
    let mut rng = rng();
    let z = EigenBasis::from_hermitian(&pauli_z())?;
    let mut r = ArrayReg::product_state("01".parse()?, 1)?;
    // qubit 0 is |1> (eigenvalue -1), qubit 1 is |0> (eigenvalue +1)
    let q0 = measure(&z, &mut r, [0], &mut rng)?.outcomes()[0];
    let q1 = measure(&z, &mut r, [1], &mut rng)?.outcomes()[0];
    assert!((q0 + 1.0).abs() < TOLERANCE);
    assert!((q1 - 1.0).abs() < TOLERANCE);
    Ok(())
}

#[test]
fn test_eigen_collapse_leaves_eigenstate() -> Result<(), RegError> {
    let mut rng = rng();
    let x = EigenBasis::from_hermitian(&pauli_x())?;
    let mut r = ArrayReg::zero_state(1, 1)?;
    let value = measure_collapse(&x, &mut r, Locs::All, &mut rng)?.outcomes()[0];
    assert!((value.abs() - 1.0).abs() < TOLERANCE);

    // an X eigenstate has equal weight on both basis states and repeats its value
    assert_probs_close(&r.probs()?[0], &[0.5, 0.5]);
    for _ in 0..5 {
        let again = measure_collapse(&x, &mut r, Locs::All, &mut rng)?.outcomes()[0];
        assert!((again - value).abs() < TOLERANCE);
    }
    Ok(())
}

#[test]
fn test_eigen_remove_drops_qubit() -> Result<(), RegError> {
    let mut rng = rng();
    let x = EigenBasis::from_hermitian(&pauli_x())?;
    let mut r = ArrayReg::uniform_state(2, 1)?;
    let value = measure_remove(&x, &mut r, [1], &mut rng)?.outcomes()[0];
    // |++> is the +1 eigenstate of X on either qubit
    assert!((value - 1.0).abs() < TOLERANCE);
    assert_eq!(r.nqubits(), 1);
    Ok(())
}

#[test]
fn test_statistics_match_probabilities() -> Result<(), RegError> {
    let mut rng = rng();
    let amps = [0.5_f64.sqrt(), 0.0, 0.3_f64.sqrt(), 0.2_f64.sqrt()]
        .map(|a| Complex64::new(a, 0.0))
        .to_vec();
    let mut r = ArrayReg::from_amplitudes(amps, 1)?;
    let shots = sample(&mut r, Locs::All, 4000, &mut rng)?;
    let mut counts = [0usize; 4];
    for &s in &shots[0] {
        counts[s] += 1;
    }
    assert_eq!(counts[1], 0);
    for (count, p) in counts.iter().zip([0.5, 0.0, 0.3, 0.2]) {
        let freq = *count as f64 / 4000.0;
        assert!((freq - p).abs() < 0.04, "frequency {freq} vs {p}");
    }
    Ok(())
}

#[test]
fn test_density_backend_supports_keep_only() -> Result<(), RegError> {
    let mut rng = rng();
    let mut rho = DensityReg::from_register(&ArrayReg::product_state("10".parse()?, 1)?)?;
    assert_eq!(measure(&ComputationalBasis, &mut rho, Locs::All, &mut rng)?.outcomes(), &[2]);
    assert!(matches!(
        measure_collapse(&ComputationalBasis, &mut rho, Locs::All, &mut rng),
        Err(RegError::UnimplementedCapability { operation: "collapseto", .. })
    ));
    // explicit locations need focus, which density registers do not provide
    assert!(matches!(
        measure(&ComputationalBasis, &mut rho, [0], &mut rng),
        Err(RegError::UnimplementedCapability { operation: "focus", .. })
    ));
    Ok(())
}

#[test]
fn test_failed_eigen_remove_leaves_register_intact() -> Result<(), RegError> {
    let mut rng = rng();
    let x = EigenBasis::from_hermitian(&pauli_x())?;
    let (o, l) = (Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0));
    // batch 0 is |00>, batch 1 is empty
    let mut r = ArrayReg::from_amplitudes(vec![l, o, o, o, o, o, o, o], 2)?;
    let before = r.clone();
    assert!(matches!(
        measure_remove(&x, &mut r, [1], &mut rng),
        Err(RegError::NotNormalized { batch: 1, .. })
    ));
    assert_eq!((r.nqubits(), r.nactive()), (2, 2));
    assert_probs_close(&r.probs()?[0], &before.probs()?[0]);
    for (a, b) in r.state().iter().zip(before.state()) {
        assert!((a - b).norm() < TOLERANCE);
    }
    Ok(())
}

#[test]
fn test_invalid_locations_are_rejected_before_mutation() -> Result<(), RegError> {
    let mut rng = rng();
    let mut r = ArrayReg::ghz_state(3, 1)?;
    let before = r.clone();
    for locs in [vec![0usize, 0], vec![3]] {
        assert!(matches!(
            measure_collapse(&ComputationalBasis, &mut r, locs, &mut rng),
            Err(RegError::InvalidPartition { .. })
        ));
    }
    assert_eq!(r, before);
    Ok(())
}
