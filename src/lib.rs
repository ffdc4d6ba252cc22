// src/lib.rs

//! `qureg` - A backend-agnostic quantum register contract
//!
//! A register is any container of (possibly batched) quantum amplitudes that
//! implements the [`Register`] capability trait. On top of that trait this
//! library provides the generic machinery that does not depend on storage:
//! active/inactive qubit partitioning, measurement dispatch with eigenbasis
//! rotation, selection and collapse, batch iteration and state metrics.
//!
//! Qubit locations and batch indices are 0-based; qubit 0 is the least
//! significant bit of a basis index.

pub mod backend;
pub mod batch;
pub mod core;
pub mod lazy;
pub mod measure;
pub mod metrics;
pub mod partition;
pub mod register;
pub mod select;
pub mod validation;

// Re-export the most common types for easier top-level use
pub use backend::{ArrayReg, ArrayRegView, DensityReg};
pub use batch::{Batches, batches};
pub use core::{BitConfig, BitStr, Locs, RegError, RegResult};
pub use lazy::{Pipeline, PipelineBuilder, Transform};
pub use measure::{
    ComputationalBasis, EigenBasis, MeasureResult, Observable, PostAction, measure, measure_collapse,
    measure_collapseto, measure_remove, sample,
};
pub use metrics::{fidelity, purity, tracedist, von_neumann_entropy};
pub use partition::{focus, focus_with, relax, relax_to};
pub use register::{Register, basis, invorder, nremain, reorder};
pub use select::{collapse_to, partial_tr, select, select_copy};
pub use validation::{check_normalization, is_normalized};

// Example 1: Measuring half of a Bell pair
// Measuring one qubit of `(|00> + |11>)/sqrt(2)` with collapse fixes the
// other qubit to the same value.
/// ```
/// use qureg::{ArrayReg, ComputationalBasis, Register, RegError, measure_collapse};
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
///
/// let mut rng = StdRng::seed_from_u64(2024);
/// let mut bell = ArrayReg::ghz_state(2, 1)?;
///
/// let first = measure_collapse(&ComputationalBasis, &mut bell, [0], &mut rng)?;
/// let outcome = first.outcomes()[0];
///
/// // the register is fully relaxed again and the partner qubit agrees
/// assert_eq!(bell.nactive(), 2);
/// let second = measure_collapse(&ComputationalBasis, &mut bell, [1], &mut rng)?;
/// assert_eq!(second.outcomes()[0], outcome);
/// # Ok::<(), RegError>(())
/// ```
#[doc(hidden)]
const _: () = ();

// Example 2: Removing measured qubits
// `measure_remove` drops the measured qubits; the rest keep their order.
/// ```
/// use qureg::{ArrayReg, ComputationalBasis, Register, RegError, measure_remove};
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
///
/// let mut rng = StdRng::seed_from_u64(1);
/// // qubits 0..4 = 1, 0, 1, 1
/// let mut r = ArrayReg::product_state("1101".parse()?, 1)?;
/// let removed = measure_remove(&ComputationalBasis, &mut r, [1, 3], &mut rng)?;
/// // qubit 1 is 0 and qubit 3 is 1, reported in location order
/// assert_eq!(removed.outcomes(), &[0b10]);
/// assert_eq!((r.nqubits(), r.nactive()), (2, 2));
/// assert_eq!(r.probs()?[0][0b11], 1.0);
/// # Ok::<(), RegError>(())
/// ```
#[doc(hidden)]
const _: () = ();
