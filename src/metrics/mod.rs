// src/metrics/mod.rs

//! Closeness and information measures computed from `density_matrix`/`probs`.
//!
//! All functions are pure: they read the active qubits of each batch and never
//! mutate a register. Two-register metrics need the same number of active
//! qubits and batch counts that are equal or 1; a single-batch register is
//! broadcast against a batched one.

use crate::backend::DensityReg;
use crate::core::{AMPLITUDE_TOLERANCE, RegError, RegResult};
use crate::register::Register;
use nalgebra::DMatrix;
use num_complex::Complex64;

/// Density matrices of the active qubits, one per batch.
pub fn density_matrix<R: Register>(r: &R) -> RegResult<DensityReg> {
    DensityReg::from_register(r)
}

/// Alias for [`density_matrix`].
pub fn rho<R: Register>(r: &R) -> RegResult<DensityReg> {
    density_matrix(r)
}

/// Computational-basis probabilities of the active qubits, one list per batch.
pub fn probs<R: Register>(r: &R) -> RegResult<Vec<Vec<f64>>> {
    r.probs()
}

/// Per-batch fidelity `tr sqrt(sqrt(ρ1) ρ2 sqrt(ρ1))`.
///
/// Both registers are compared on their active qubits only: a focused
/// register is measured against another register of `nactive` qubits, and
/// the inactive qubits are traced out by the backend's density matrix. For
/// fully relaxed registers this is the same as requiring equal `nqubits`.
///
/// # Errors
/// `RegError::ShapeMismatch` for different active sizes or incompatible
/// batch counts.
pub fn fidelity<A: Register, B: Register>(r1: &A, r2: &B) -> RegResult<Vec<f64>> {
    Ok(paired(r1, r2)?
        .iter()
        .map(|(rho1, rho2)| matrix_fidelity(rho1, rho2))
        .collect())
}

/// Per-batch trace distance `½‖ρ1 − ρ2‖_tr`.
///
/// # Errors
/// Same shape rules as [`fidelity`].
pub fn tracedist<A: Register, B: Register>(r1: &A, r2: &B) -> RegResult<Vec<f64>> {
    Ok(paired(r1, r2)?
        .iter()
        .map(|(rho1, rho2)| matrix_tracedist(rho1, rho2))
        .collect())
}

/// Per-batch purity `tr(ρ²)`.
pub fn purity<R: Register>(r: &R) -> RegResult<Vec<f64>> {
    Ok(r.density_matrix()?
        .iter()
        .map(|rho| (rho * rho).trace().re)
        .collect())
}

/// Per-batch von Neumann entropy `-Σ λ ln λ` in nats.
pub fn von_neumann_entropy<R: Register>(r: &R) -> RegResult<Vec<f64>> {
    Ok(r.density_matrix()?
        .iter()
        .map(|rho| {
            hermitian_spectrum(rho)
                .into_iter()
                .filter(|&l| l > AMPLITUDE_TOLERANCE)
                .map(|l| -l * l.ln())
                .sum()
        })
        .collect())
}

/// Fidelity of two density matrices.
///
/// Single-qubit matrices use `sqrt(tr(ρ1 ρ2) + 2 sqrt(det ρ1 det ρ2))`;
/// larger ones the Uhlmann form, to which it is equal on qubits.
pub fn matrix_fidelity(rho1: &DMatrix<Complex64>, rho2: &DMatrix<Complex64>) -> f64 {
    if rho1.nrows() == 2 {
        let overlap = (rho1 * rho2).trace().re;
        let dets = (rho1.determinant() * rho2.determinant()).re.max(0.0);
        return (overlap + 2.0 * dets.sqrt()).max(0.0).sqrt();
    }
    let root = psd_sqrt(rho1);
    let inner = &root * rho2 * &root;
    hermitian_spectrum(&inner)
        .into_iter()
        .filter(|&l| l > AMPLITUDE_TOLERANCE)
        .map(f64::sqrt)
        .sum()
}

/// Trace distance of two density matrices.
pub fn matrix_tracedist(rho1: &DMatrix<Complex64>, rho2: &DMatrix<Complex64>) -> f64 {
    0.5 * hermitian_spectrum(&(rho1 - rho2))
        .into_iter()
        .map(f64::abs)
        .sum::<f64>()
}

fn hermitian_spectrum(m: &DMatrix<Complex64>) -> Vec<f64> {
    m.symmetric_eigenvalues().iter().copied().collect()
}

/// Square root of a positive semidefinite Hermitian matrix; small negative
/// eigenvalues from rounding are clamped to zero.
fn psd_sqrt(m: &DMatrix<Complex64>) -> DMatrix<Complex64> {
    let eigen = m.clone().symmetric_eigen();
    let vectors = eigen.eigenvectors;
    let mut scaled = vectors.clone();
    for (mut column, &l) in scaled.column_iter_mut().zip(eigen.eigenvalues.iter()) {
        column *= Complex64::new(l.max(0.0).sqrt(), 0.0);
    }
    scaled * vectors.adjoint()
}

type MatrixPair = (DMatrix<Complex64>, DMatrix<Complex64>);

/// Density matrices of the active qubits of both registers, batch by batch.
/// Sizes are matched on `nactive`; a single batch is broadcast.
fn paired<A: Register, B: Register>(r1: &A, r2: &B) -> RegResult<Vec<MatrixPair>> {
    if r1.nactive() != r2.nactive() {
        return Err(RegError::shape(format!(
            "cannot compare {} active qubits with {}",
            r1.nactive(),
            r2.nactive()
        )));
    }
    let (b1, b2) = (r1.nbatch(), r2.nbatch());
    if b1 != b2 && b1 != 1 && b2 != 1 {
        return Err(RegError::shape(format!("cannot compare {b1} batches with {b2}")));
    }
    let (m1, m2) = (r1.density_matrix()?, r2.density_matrix()?);
    Ok((0..b1.max(b2))
        .map(|b| (m1[b % m1.len()].clone(), m2[b % m2.len()].clone()))
        .collect())
}
