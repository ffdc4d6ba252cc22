// src/partition/mod.rs

//! Active/inactive qubit partitioning.
//!
//! `focus` narrows the active region to a chosen set of qubits and `relax`
//! restores it. Operators that act on "all active qubits" can therefore be
//! applied to any subset of a register, and the global qubit bookkeeping is
//! put back afterwards. Validation happens here, before the backend's
//! primitive is called, so a rejected request never touches the register.

use crate::core::{RegError, RegResult, validate_locs};
use crate::register::Register;
use tracing::{debug, warn};

/// Makes the qubits at `locs` the leading active qubits, in the given order,
/// and sets `nactive = locs.len()`.
///
/// # Errors
/// `RegError::InvalidPartition` if `locs` has duplicates or out-of-range
/// entries; the register is left unchanged.
pub fn focus<R: Register>(r: &mut R, locs: &[usize]) -> RegResult<()> {
    validate_locs(locs, r.nqubits())?;
    debug!(?locs, nqubits = r.nqubits(), "focus");
    r.focus_locs(locs)
}

/// Returns the leading `locs.len()` qubits to positions `locs` and makes the
/// whole register active.
pub fn relax<R: Register>(r: &mut R, locs: &[usize]) -> RegResult<()> {
    let n = r.nqubits();
    relax_to(r, locs, n)
}

/// Inverse of [`focus`]: returns the leading `locs.len()` qubits to positions
/// `locs` and sets `nactive = to_nactive`. Empty `locs` only changes the
/// active count.
///
/// # Errors
/// `RegError::InvalidPartition` for malformed `locs` or `to_nactive > nqubits`.
pub fn relax_to<R: Register>(r: &mut R, locs: &[usize], to_nactive: usize) -> RegResult<()> {
    let nqubits = r.nqubits();
    validate_locs(locs, nqubits)?;
    if to_nactive > nqubits {
        return Err(RegError::partition(format!(
            "cannot make {to_nactive} qubits active in a register of {nqubits}"
        )));
    }
    debug!(?locs, to_nactive, "relax");
    r.relax_locs(locs, to_nactive)
}

/// Scoped focus: runs `f` with `locs` focused, then relaxes back to the
/// active count recorded before focusing.
///
/// The relax step runs even when `f` fails. In that case the error from `f`
/// is returned; a relax failure during recovery is only logged.
pub fn focus_with<R, T, F>(r: &mut R, locs: &[usize], f: F) -> RegResult<T>
where
    R: Register,
    F: FnOnce(&mut R) -> RegResult<T>,
{
    let nactive = r.nactive();
    focus(r, locs)?;
    let outcome = f(r);
    let restored = relax_to(r, locs, nactive);
    settle(outcome, restored)
}

/// Combines the result of a focused operation with the result of the relax
/// that follows it. The operation's own error wins.
pub(crate) fn settle<T>(outcome: RegResult<T>, restored: RegResult<()>) -> RegResult<T> {
    match (outcome, restored) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(err)) => Err(err),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(relax_err)) => {
            warn!(error = %relax_err, "restoring the partition after a failed operation also failed");
            Err(err)
        }
    }
}
