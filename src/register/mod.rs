// src/register/mod.rs

//! The capability contract every register backend implements, plus the
//! operations this layer derives from it.
//!
//! A backend owns its amplitude storage. The generic layer only asks it to
//! report its shape and to run a small set of primitives; everything else in
//! the crate (partitioning, measurement dispatch, selection, metrics) is
//! written against [`Register`] alone.
//!
//! Primitives are called with arguments that the generic layer has already
//! validated: locations are distinct and in range, configurations fit the
//! active region, per-batch lists have length 1 or `nbatch`. Backends may
//! assume this and should not repeat the checks.

use crate::core::{RegError, RegResult};
use nalgebra::DMatrix;
use num_complex::Complex64;
use std::fmt;
use std::ops::Range;
use tracing::debug;

/// Capability interface of a (possibly batched) quantum register.
///
/// The counters are required. Every fallible primitive has a default body
/// that fails with [`RegError::UnimplementedCapability`] naming the primitive
/// and the backend type, so a backend implements exactly what it supports and
/// nothing silently falls back.
pub trait Register: Sized {
    /// Single-batch view returned by [`Register::view_batch`]. Each backend
    /// documents whether views alias its storage and whether they can mutate.
    type View<'a>: Register
    where
        Self: 'a;

    /// Register type holding the result of [`Register::partial_tr`].
    type Reduced: Register;

    /// Total number of qubits.
    fn nqubits(&self) -> usize;

    /// Number of qubits currently addressable by operators.
    fn nactive(&self) -> usize;

    /// Number of independent states held in parallel (at least 1).
    fn nbatch(&self) -> usize;

    /// Name of the amplitude element type.
    fn datatype(&self) -> &'static str;

    /// Type name used in error messages and summaries.
    fn backend_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Appends `n` qubits in `|0>` at the top of the active region.
    fn addbits(&mut self, _n: usize) -> RegResult<()> {
        Err(RegError::unimplemented::<Self>("addbits"))
    }

    /// Inserts `n` qubits in `|0>` at active position `loc`.
    fn insert_qubits(&mut self, _loc: usize, _n: usize) -> RegResult<()> {
        Err(RegError::unimplemented::<Self>("insert_qubits"))
    }

    /// Moves the qubits at `locs` to the front, in the given order, and makes
    /// exactly them active.
    fn focus_locs(&mut self, _locs: &[usize]) -> RegResult<()> {
        Err(RegError::unimplemented::<Self>("focus"))
    }

    /// Returns the leading `locs.len()` qubits to positions `locs` and sets the
    /// active count to `to_nactive`.
    fn relax_locs(&mut self, _locs: &[usize], _to_nactive: usize) -> RegResult<()> {
        Err(RegError::unimplemented::<Self>("relax"))
    }

    /// Projects each batch onto its active configuration and drops the active
    /// qubits: afterwards `nqubits` is the old `nremain` and `nactive` is 0.
    ///
    /// Backends renormalize every batch slice whose squared norm exceeds
    /// [`crate::core::AMPLITUDE_TOLERANCE`]; slices below it are left as they
    /// are. `configs` holds one entry (broadcast) or one per batch.
    fn select_configs(&mut self, _configs: &[usize]) -> RegResult<()> {
        Err(RegError::unimplemented::<Self>("select"))
    }

    /// Collapses each batch onto its active configuration, keeping the qubit
    /// count. Same normalization policy as [`Register::select_configs`].
    fn collapse_configs(&mut self, _configs: &[usize]) -> RegResult<()> {
        Err(RegError::unimplemented::<Self>("collapseto"))
    }

    /// Maps each batch's active basis index `i` to `i ^ mask`.
    fn flip_bits(&mut self, _masks: &[usize]) -> RegResult<()> {
        Err(RegError::unimplemented::<Self>("flip_bits"))
    }

    /// Left-multiplies the active subspace of every batch by `unitary`, a
    /// square matrix of dimension `2^nactive`.
    fn rotate(&mut self, _unitary: &DMatrix<Complex64>) -> RegResult<()> {
        Err(RegError::unimplemented::<Self>("rotate"))
    }

    /// Permutes the active qubits: new position `i` holds old qubit `orders[i]`.
    fn reorder(&mut self, _orders: &[usize]) -> RegResult<()> {
        Err(RegError::unimplemented::<Self>("reorder"))
    }

    /// Reduced state after tracing out the qubits at `locs`.
    fn partial_tr(&self, _locs: &[usize]) -> RegResult<Self::Reduced> {
        Err(RegError::unimplemented::<Self>("partial_tr"))
    }

    /// Tensor product with `other`; `self` occupies the high qubits.
    fn join(&self, _other: &Self) -> RegResult<Self> {
        Err(RegError::unimplemented::<Self>("join"))
    }

    /// Repeats the whole batch `n` times along the batch axis.
    fn repeat(&self, _n: usize) -> RegResult<Self> {
        Err(RegError::unimplemented::<Self>("repeat"))
    }

    /// Per-batch probability distribution over the active basis states, the
    /// remaining qubits summed out.
    fn probs(&self) -> RegResult<Vec<Vec<f64>>> {
        Err(RegError::unimplemented::<Self>("probs"))
    }

    /// Per-batch density matrix of the active qubits.
    fn density_matrix(&self) -> RegResult<Vec<DMatrix<Complex64>>> {
        Err(RegError::unimplemented::<Self>("density_matrix"))
    }

    /// View of batch `batch` (0-based).
    fn view_batch(&self, _batch: usize) -> RegResult<Self::View<'_>> {
        Err(RegError::unimplemented::<Self>("viewbatch"))
    }
}

/// Number of inactive qubits.
pub fn nremain<R: Register>(r: &R) -> usize {
    r.nqubits() - r.nactive()
}

/// The basis index range of an `n`-qubit space.
pub fn basis_range(n: usize) -> RegResult<Range<usize>> {
    let dim = 1usize
        .checked_shl(n as u32)
        .filter(|_| n < usize::BITS as usize)
        .ok_or_else(|| RegError::shape(format!("{n} qubits overflow the basis index type")))?;
    Ok(0..dim)
}

/// Basis index range of the whole register.
pub fn basis<R: Register>(r: &R) -> RegResult<Range<usize>> {
    basis_range(r.nqubits())
}

/// Validated [`Register::reorder`].
///
/// # Errors
/// `RegError::InvalidPartition` unless `orders` is a permutation of the
/// active positions.
pub fn reorder<R: Register>(r: &mut R, orders: &[usize]) -> RegResult<()> {
    let nactive = r.nactive();
    if orders.len() != nactive {
        return Err(RegError::partition(format!(
            "reorder needs {nactive} positions, got {}",
            orders.len()
        )));
    }
    crate::core::validate_locs(orders, nactive)?;
    r.reorder(orders)
}

/// Reverses the order of the active qubits.
pub fn invorder<R: Register>(r: &mut R) -> RegResult<()> {
    let orders: Vec<usize> = (0..r.nactive()).rev().collect();
    r.reorder(&orders)
}

/// Appends `n` fresh qubits in `|0>` to the active region.
pub fn addbits<R: Register>(r: &mut R, n: usize) -> RegResult<()> {
    debug!(n, nqubits = r.nqubits(), "adding qubits");
    r.addbits(n)
}

/// Inserts `n` fresh qubits in `|0>` at active position `loc`.
///
/// # Errors
/// `RegError::InvalidPartition` if `loc > nactive`.
pub fn insert_qubits<R: Register>(r: &mut R, loc: usize, n: usize) -> RegResult<()> {
    if loc > r.nactive() {
        return Err(RegError::partition(format!(
            "insert location {loc} is beyond the {} active qubits",
            r.nactive()
        )));
    }
    r.insert_qubits(loc, n)
}

/// Tensor product of two registers; `high` occupies the high qubits.
///
/// # Errors
/// `RegError::ShapeMismatch` if the batch sizes differ.
pub fn join<R: Register>(high: &R, low: &R) -> RegResult<R> {
    if high.nbatch() != low.nbatch() {
        return Err(RegError::shape(format!(
            "cannot join registers with {} and {} batches",
            high.nbatch(),
            low.nbatch()
        )));
    }
    high.join(low)
}

/// Joins several registers, the first one on the highest qubits.
pub fn join_all<R: Register + Clone>(regs: &[R]) -> RegResult<R> {
    let (first, rest) = regs
        .split_first()
        .ok_or_else(|| RegError::shape("join needs at least one register"))?;
    rest.iter().try_fold(first.clone(), |acc, r| join(&acc, r))
}

/// Repeats the register `n` times along the batch axis.
pub fn repeat<R: Register>(r: &R, n: usize) -> RegResult<R> {
    if n == 0 {
        return Err(RegError::shape("a register needs at least one batch"));
    }
    r.repeat(n)
}

/// Display adapter showing only the qubit, active and batch counts.
pub struct Summary<'a, R>(&'a R);

/// Wraps `r` for display.
pub fn summary<R: Register>(r: &R) -> Summary<'_, R> {
    Summary(r)
}

impl<R: Register> fmt::Display for Summary<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.0;
        let name = r.backend_name().rsplit("::").next().unwrap_or("Register");
        write!(f, "{name}{{{}, {}}}", r.datatype(), r.nbatch())?;
        write!(f, "\n    active qubits: {}/{}", r.nactive(), r.nqubits())
    }
}
