// src/backend/view.rs

use super::array::{ArrayReg, block_density, block_probs};
use super::density::DensityReg;
use crate::core::{RegError, RegResult};
use crate::register::Register;
use nalgebra::DMatrix;
use num_complex::Complex64;

/// One batch of an [`ArrayReg`], borrowed from the parent's storage.
///
/// Views are read-only: the parent stays borrowed while a view lives, and
/// every mutating primitive reports `UnimplementedCapability`. Copy a view
/// into its own register with [`ArrayRegView::to_array_reg`] to mutate it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrayRegView<'a> {
    state: &'a [Complex64],
    nqubits: usize,
    nactive: usize,
}

impl<'a> ArrayRegView<'a> {
    pub(crate) fn new(state: &'a [Complex64], nqubits: usize, nactive: usize) -> Self {
        Self { state, nqubits, nactive }
    }

    /// The borrowed amplitudes.
    pub fn state(&self) -> &'a [Complex64] {
        self.state
    }

    /// Copies the batch into an independent single-batch register with the
    /// same partition.
    pub fn to_array_reg(&self) -> RegResult<ArrayReg> {
        let mut reg = ArrayReg::from_amplitudes(self.state.to_vec(), 1)?;
        if self.nactive != self.nqubits {
            // the copy starts fully active with the same layout; shrinking the
            // active count keeps every qubit in place
            reg.relax_locs(&[], self.nactive)?;
        }
        Ok(reg)
    }
}

impl Register for ArrayRegView<'_> {
    type View<'b>
        = ArrayRegView<'b>
    where
        Self: 'b;
    type Reduced = DensityReg;

    fn nqubits(&self) -> usize {
        self.nqubits
    }

    fn nactive(&self) -> usize {
        self.nactive
    }

    fn nbatch(&self) -> usize {
        1
    }

    fn datatype(&self) -> &'static str {
        "Complex<f64>"
    }

    fn partial_tr(&self, locs: &[usize]) -> RegResult<DensityReg> {
        self.to_array_reg()?.partial_tr(locs)
    }

    fn probs(&self) -> RegResult<Vec<Vec<f64>>> {
        Ok(vec![block_probs(self.state, self.nactive)])
    }

    fn density_matrix(&self) -> RegResult<Vec<DMatrix<Complex64>>> {
        Ok(vec![block_density(self.state, self.nactive)])
    }

    fn view_batch(&self, batch: usize) -> RegResult<ArrayRegView<'_>> {
        if batch != 0 {
            return Err(RegError::shape(format!("batch {batch} out of range for a single-batch view")));
        }
        Ok(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn views_are_read_only() -> RegResult<()> {
        let parent = ArrayReg::ghz_state(2, 2)?;
        let mut view = parent.view_batch(1)?;
        let probs = view.probs()?;
        assert!((probs[0][0] - 0.5).abs() < 1e-12 && (probs[0][3] - 0.5).abs() < 1e-12);
        assert!(matches!(
            view.collapse_configs(&[0]),
            Err(RegError::UnimplementedCapability { operation: "collapseto", .. })
        ));
        Ok(())
    }

    #[test]
    fn copy_keeps_partition() -> RegResult<()> {
        let mut parent = ArrayReg::ghz_state(3, 1)?;
        parent.focus_locs(&[2])?;
        let copy = parent.view_batch(0)?.to_array_reg()?;
        assert_eq!(copy.nactive(), 1);
        assert_eq!(copy.probs()?, parent.probs()?);
        Ok(())
    }
}
