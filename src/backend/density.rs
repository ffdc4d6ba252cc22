// src/backend/density.rs

use crate::core::{RegError, RegResult, complement};
use crate::register::{Register, summary};
use nalgebra::DMatrix;
use num_complex::Complex64;
use std::fmt;

/// Batched density matrices, one `2^n x 2^n` matrix per batch.
///
/// A density register is always fully active: it supports the read-only
/// capabilities, `partial_tr`, `join` and `repeat`, and reports
/// `UnimplementedCapability` for partitioning and measurement collapse.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityReg {
    matrices: Vec<DMatrix<Complex64>>,
    nqubits: usize,
}

impl DensityReg {
    /// Wraps per-batch density matrices.
    ///
    /// # Errors
    /// `RegError::ShapeMismatch` for an empty list, non-square matrices,
    /// mixed sizes, or sizes that are not a power of two.
    pub fn from_matrices(matrices: Vec<DMatrix<Complex64>>) -> RegResult<Self> {
        let dim = matrices
            .first()
            .map(|m| m.nrows())
            .ok_or_else(|| RegError::shape("a density register needs at least one batch"))?;
        if !dim.is_power_of_two() {
            return Err(RegError::shape(format!("matrix dimension {dim} is not a power of two")));
        }
        if let Some(bad) = matrices.iter().find(|m| m.nrows() != dim || m.ncols() != dim) {
            return Err(RegError::shape(format!(
                "expected {dim}x{dim} matrices, found {}x{}",
                bad.nrows(),
                bad.ncols()
            )));
        }
        Ok(Self { matrices, nqubits: dim.trailing_zeros() as usize })
    }

    /// Density matrices of the active qubits of any register.
    pub fn from_register<R: Register>(r: &R) -> RegResult<Self> {
        Self::from_matrices(r.density_matrix()?)
    }

    /// The density matrix of one batch.
    pub fn matrix(&self, batch: usize) -> Option<&DMatrix<Complex64>> {
        self.matrices.get(batch)
    }

    /// All per-batch matrices.
    pub fn matrices(&self) -> &[DMatrix<Complex64>] {
        &self.matrices
    }
}

/// Traces the qubits at `locs` out of a single density matrix over `nqubits`.
pub(crate) fn trace_out(rho: &DMatrix<Complex64>, nqubits: usize, locs: &[usize]) -> DMatrix<Complex64> {
    let kept = complement(locs, nqubits);
    let gather = |index: usize, positions: &[usize]| {
        positions
            .iter()
            .enumerate()
            .fold(0, |acc, (m, &q)| acc | (((index >> q) & 1) << m))
    };
    let reduced_dim = 1 << kept.len();
    let mut reduced = DMatrix::zeros(reduced_dim, reduced_dim);
    let dim = rho.nrows();
    for i in 0..dim {
        let traced_i = gather(i, locs);
        for j in 0..dim {
            if gather(j, locs) == traced_i {
                reduced[(gather(i, &kept), gather(j, &kept))] += rho[(i, j)];
            }
        }
    }
    reduced
}

impl Register for DensityReg {
    /// Views are independent single-batch copies.
    type View<'a> = DensityReg;
    type Reduced = DensityReg;

    fn nqubits(&self) -> usize {
        self.nqubits
    }

    fn nactive(&self) -> usize {
        self.nqubits
    }

    fn nbatch(&self) -> usize {
        self.matrices.len()
    }

    fn datatype(&self) -> &'static str {
        "Complex<f64>"
    }

    fn partial_tr(&self, locs: &[usize]) -> RegResult<DensityReg> {
        Self::from_matrices(
            self.matrices
                .iter()
                .map(|rho| trace_out(rho, self.nqubits, locs))
                .collect(),
        )
    }

    fn join(&self, other: &Self) -> RegResult<Self> {
        Self::from_matrices(
            self.matrices
                .iter()
                .zip(&other.matrices)
                .map(|(high, low)| high.kronecker(low))
                .collect(),
        )
    }

    fn repeat(&self, n: usize) -> RegResult<Self> {
        let batches = self.matrices.len();
        Self::from_matrices(
            (0..batches * n)
                .map(|b| self.matrices[b % batches].clone())
                .collect(),
        )
    }

    fn probs(&self) -> RegResult<Vec<Vec<f64>>> {
        Ok(self
            .matrices
            .iter()
            .map(|rho| rho.diagonal().iter().map(|d| d.re).collect())
            .collect())
    }

    fn density_matrix(&self) -> RegResult<Vec<DMatrix<Complex64>>> {
        Ok(self.matrices.clone())
    }

    fn view_batch(&self, batch: usize) -> RegResult<DensityReg> {
        let rho = self.matrices.get(batch).ok_or_else(|| {
            RegError::shape(format!("batch {batch} out of range for {} batches", self.nbatch()))
        })?;
        Self::from_matrices(vec![rho.clone()])
    }
}

impl fmt::Display for DensityReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", summary(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ArrayReg;

    #[test]
    fn bell_pair_reduces_to_maximally_mixed() -> RegResult<()> {
        let bell = ArrayReg::ghz_state(2, 1)?;
        let reduced = bell.partial_tr(&[1])?;
        assert_eq!(reduced.nqubits(), 1);
        let rho = &reduced.matrices()[0];
        assert!((rho[(0, 0)].re - 0.5).abs() < 1e-12);
        assert!((rho[(1, 1)].re - 0.5).abs() < 1e-12);
        assert!(rho[(0, 1)].norm() < 1e-12);
        Ok(())
    }

    #[test]
    fn product_state_traces_to_its_factor() -> RegResult<()> {
        // qubit 0 = |1>, qubit 1 = |0>, qubit 2 = |1>
        let reg = ArrayReg::product_state("101".parse()?, 1)?;
        let full = DensityReg::from_register(&reg)?;
        let reduced = full.partial_tr(&[0, 2])?;
        assert_eq!(reduced.probs()?, vec![vec![1.0, 0.0]]);
        Ok(())
    }

    #[test]
    fn join_and_repeat() -> RegResult<()> {
        let one = DensityReg::from_register(&ArrayReg::product_state("1".parse()?, 1)?)?;
        let zero = DensityReg::from_register(&ArrayReg::zero_state(1, 1)?)?;
        let joined = one.join(&zero)?;
        assert_eq!(joined.probs()?, vec![vec![0.0, 0.0, 1.0, 0.0]]);
        let repeated = joined.repeat(2)?;
        assert_eq!(repeated.nbatch(), 2);
        assert_eq!(repeated.view_batch(1)?, joined);
        Ok(())
    }

    #[test]
    fn partitioning_is_not_supported() -> RegResult<()> {
        let mut rho = DensityReg::from_register(&ArrayReg::zero_state(2, 1)?)?;
        assert!(matches!(rho.focus_locs(&[0]), Err(RegError::UnimplementedCapability { operation: "focus", .. })));
        Ok(())
    }
}
