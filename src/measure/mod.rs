// src/measure/mod.rs

//! Measurement dispatch.
//!
//! All four public variants share one path, outer to inner:
//!
//! 1. **Locations**: explicit `locs` are focused first and relaxed afterwards
//!    (to the recorded active count, or that count minus `k` when the measured
//!    qubits were removed). The relax runs even if the measurement failed.
//! 2. **Observable**: an [`EigenBasis`] rotates the active subspace by `V†`,
//!    measures in the computational basis and rotates back by `V` for the
//!    keep and collapse actions. It reports eigenvalues, not basis indices.
//! 3. **Kernel**: [`engine`] samples one basis index per batch and applies
//!    the [`PostAction`].

pub mod engine;
mod results;

pub use engine::PostAction;
pub use results::MeasureResult;

use crate::core::{BitConfig, HERMITIAN_TOLERANCE, Locs, RegError, RegResult, validate_locs};
use crate::partition::{focus, focus_with, relax_to, settle};
use crate::register::Register;
use nalgebra::DMatrix;
use num_complex::Complex64;
use rand::Rng;
use tracing::{debug, instrument};

/// Something that can be measured on the active qubits of a register.
pub trait Observable {
    /// Value reported per batch.
    type Value;

    /// Measures all active qubits and applies `action`.
    fn measure_active<R: Register, G: Rng>(
        &self,
        r: &mut R,
        action: PostAction,
        rng: &mut G,
    ) -> RegResult<Vec<Self::Value>>;
}

/// Measurement in the standard basis; reports basis indices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComputationalBasis;

impl Observable for ComputationalBasis {
    type Value = usize;

    fn measure_active<R: Register, G: Rng>(
        &self,
        r: &mut R,
        action: PostAction,
        rng: &mut G,
    ) -> RegResult<Vec<usize>> {
        engine::measure_active(r, action, rng)
    }
}

/// A Hermitian observable given by its spectral decomposition `H = V E V†`.
///
/// Column `i` of `vectors` is the eigenvector for `values[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct EigenBasis {
    values: Vec<f64>,
    vectors: DMatrix<Complex64>,
}

impl EigenBasis {
    /// Wraps an eigen-decomposition.
    ///
    /// # Errors
    /// `RegError::InvalidObservable` unless `vectors` is a unitary of
    /// power-of-two dimension with one eigenvalue per column.
    pub fn new(values: Vec<f64>, vectors: DMatrix<Complex64>) -> RegResult<Self> {
        let dim = vectors.nrows();
        if vectors.ncols() != dim || !dim.is_power_of_two() {
            return Err(RegError::InvalidObservable {
                message: format!("eigenvectors form a {}x{} matrix", dim, vectors.ncols()),
            });
        }
        if values.len() != dim {
            return Err(RegError::InvalidObservable {
                message: format!("{} eigenvalues for dimension {dim}", values.len()),
            });
        }
        let deviation = &vectors.adjoint() * &vectors - DMatrix::<Complex64>::identity(dim, dim);
        if deviation.iter().any(|c| c.norm() > HERMITIAN_TOLERANCE) {
            return Err(RegError::InvalidObservable {
                message: "eigenvectors are not orthonormal".to_string(),
            });
        }
        Ok(Self { values, vectors })
    }

    /// Diagonalizes a Hermitian operator.
    ///
    /// # Errors
    /// `RegError::InvalidObservable` for non-square, non-power-of-two or
    /// non-Hermitian input.
    pub fn from_hermitian(operator: &DMatrix<Complex64>) -> RegResult<Self> {
        let dim = operator.nrows();
        if operator.ncols() != dim || !dim.is_power_of_two() {
            return Err(RegError::InvalidObservable {
                message: format!("operator is {}x{}", dim, operator.ncols()),
            });
        }
        if (operator - operator.adjoint()).iter().any(|c| c.norm() > HERMITIAN_TOLERANCE) {
            return Err(RegError::InvalidObservable {
                message: "operator is not Hermitian".to_string(),
            });
        }
        let eigen = operator.clone().symmetric_eigen();
        Ok(Self {
            values: eigen.eigenvalues.iter().copied().collect(),
            vectors: eigen.eigenvectors,
        })
    }

    /// Number of qubits the observable acts on.
    pub fn nqubits(&self) -> usize {
        self.vectors.nrows().trailing_zeros() as usize
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn vectors(&self) -> &DMatrix<Complex64> {
        &self.vectors
    }
}

impl Observable for EigenBasis {
    type Value = f64;

    fn measure_active<R: Register, G: Rng>(
        &self,
        r: &mut R,
        action: PostAction,
        rng: &mut G,
    ) -> RegResult<Vec<f64>> {
        if self.nqubits() != r.nactive() {
            return Err(RegError::shape(format!(
                "observable on {} qubits measured on {} active qubits",
                self.nqubits(),
                r.nactive()
            )));
        }
        r.rotate(&self.vectors.adjoint())?;
        let mut outcomes = engine::measure_active(r, action, rng);
        // sampling fails before any post-action, so the rotation is always undone
        if action.restores_basis() || outcomes.is_err() {
            let back = r.rotate(&self.vectors);
            outcomes = settle(outcomes, back);
        }
        Ok(outcomes?.into_iter().map(|o| self.values[o]).collect())
    }
}

/// Location wrapper: focuses `locs`, measures, relaxes.
fn dispatch<O, R, G>(
    op: &O,
    r: &mut R,
    locs: &Locs,
    action: PostAction,
    rng: &mut G,
) -> RegResult<Vec<O::Value>>
where
    O: Observable,
    R: Register,
    G: Rng,
{
    let Some(locs) = locs.as_slice() else {
        return op.measure_active(r, action, rng);
    };
    validate_locs(locs, r.nqubits())?;
    let recorded = r.nactive();
    if action == PostAction::Remove && locs.len() > recorded {
        return Err(RegError::partition(format!(
            "cannot remove {} qubits when only {recorded} are active",
            locs.len()
        )));
    }
    let nqubits = r.nqubits();
    focus(r, locs)?;
    let outcome = op.measure_active(r, action, rng);
    let removed = nqubits - r.nqubits();
    let restored = if removed > 0 {
        relax_to(r, &[], recorded - removed)
    } else {
        relax_to(r, locs, recorded)
    };
    settle(outcome, restored)
}

/// Measures without changing the state (`probs` before and after agree).
///
/// # Errors
/// Partition errors for bad `locs`, capability errors from the backend,
/// `RegError::NotNormalized` for a batch with no probability weight.
#[instrument(skip_all, fields(nqubits = r.nqubits(), nbatch = r.nbatch()))]
pub fn measure<O, R, G>(op: &O, r: &mut R, locs: impl Into<Locs>, rng: &mut G) -> RegResult<MeasureResult<O::Value>>
where
    O: Observable,
    R: Register,
    G: Rng,
{
    dispatch(op, r, &locs.into(), PostAction::Keep, rng).map(MeasureResult::new)
}

/// Measures and collapses each batch onto its outcome in place.
#[instrument(skip_all, fields(nqubits = r.nqubits(), nbatch = r.nbatch()))]
pub fn measure_collapse<O, R, G>(
    op: &O,
    r: &mut R,
    locs: impl Into<Locs>,
    rng: &mut G,
) -> RegResult<MeasureResult<O::Value>>
where
    O: Observable,
    R: Register,
    G: Rng,
{
    dispatch(op, r, &locs.into(), PostAction::Collapse, rng).map(MeasureResult::new)
}

/// Measures, collapses and drops the measured qubits: `nqubits` shrinks by
/// the number measured.
///
/// # Errors
/// `RegError::InvalidPartition` if more qubits are named than are active.
#[instrument(skip_all, fields(nqubits = r.nqubits(), nbatch = r.nbatch()))]
pub fn measure_remove<O, R, G>(
    op: &O,
    r: &mut R,
    locs: impl Into<Locs>,
    rng: &mut G,
) -> RegResult<MeasureResult<O::Value>>
where
    O: Observable,
    R: Register,
    G: Rng,
{
    dispatch(op, r, &locs.into(), PostAction::Remove, rng).map(MeasureResult::new)
}

/// Measures, then forces the measured qubits into `config`.
///
/// The sampled outcome is reported; qubits outside `locs` stay conditioned on
/// it.
///
/// # Errors
/// `RegError::DimensionOverflow` if `config` is wider than the measured
/// qubits; nothing is mutated in that case.
#[instrument(skip_all, fields(nqubits = r.nqubits(), nbatch = r.nbatch()))]
pub fn measure_collapseto<O, R, G>(
    op: &O,
    r: &mut R,
    locs: impl Into<Locs>,
    config: impl Into<BitConfig>,
    rng: &mut G,
) -> RegResult<MeasureResult<O::Value>>
where
    O: Observable,
    R: Register,
    G: Rng,
{
    let locs = locs.into();
    let width = locs.as_slice().map_or(r.nactive(), <[usize]>::len);
    let config = config.into().resolve(width)?;
    debug!(config, width, "forcing measured qubits");
    dispatch(op, r, &locs, PostAction::ResetTo(config), rng).map(MeasureResult::new)
}

/// Draws `nshots` computational-basis samples per batch without changing the
/// state. Returns one list of shots per batch.
#[instrument(skip_all, fields(nshots = nshots))]
pub fn sample<R, G>(r: &mut R, locs: impl Into<Locs>, nshots: usize, rng: &mut G) -> RegResult<Vec<Vec<usize>>>
where
    R: Register,
    G: Rng,
{
    let probs = match locs.into().as_slice() {
        None => r.probs()?,
        Some(locs) => focus_with(r, locs, |focused| focused.probs())?,
    };
    probs
        .iter()
        .enumerate()
        .map(|(batch, p)| {
            (0..nshots)
                .map(|_| {
                    engine::sample_index(p, rng).ok_or_else(|| RegError::NotNormalized {
                        batch,
                        norm: p.iter().sum::<f64>().to_string(),
                    })
                })
                .collect::<RegResult<Vec<usize>>>()
        })
        .collect()
}
