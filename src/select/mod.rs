// src/select/mod.rs

//! Projection onto fixed configurations, forced collapse and partial trace.

use crate::core::{AMPLITUDE_TOLERANCE, BitConfig, RegError, RegResult, validate_locs};
use crate::register::Register;
use tracing::debug;

/// Resolves a per-batch configuration list: one entry is broadcast, otherwise
/// there must be exactly `nbatch` entries.
fn resolve_configs<R: Register>(r: &R, configs: &[BitConfig]) -> RegResult<Vec<usize>> {
    if configs.len() != 1 && configs.len() != r.nbatch() {
        return Err(RegError::shape(format!(
            "{} configurations for {} batches",
            configs.len(),
            r.nbatch()
        )));
    }
    configs.iter().map(|c| c.resolve(r.nactive())).collect()
}

/// Projects each batch onto its active configuration and drops the active
/// qubits. Afterwards `nactive` is 0 and `nqubits` is the old `nremain`.
///
/// Batches with non-negligible weight are renormalized by the backend.
///
/// # Errors
/// `RegError::ShapeMismatch` if `configs` is neither one entry nor one per
/// batch; `RegError::DimensionOverflow` for a configuration wider than the
/// active region.
pub fn select<R: Register>(r: &mut R, configs: &[BitConfig]) -> RegResult<()> {
    let resolved = resolve_configs(r, configs)?;
    debug!(configs = ?resolved, nactive = r.nactive(), "select");
    r.select_configs(&resolved)
}

/// Non-mutating [`select`] on an independent copy.
pub fn select_copy<R: Register + Clone>(r: &R, configs: &[BitConfig]) -> RegResult<R> {
    let mut copy = r.clone();
    select(&mut copy, configs)?;
    Ok(copy)
}

/// Forces the active qubits of every batch into `config`.
///
/// # Errors
/// `RegError::DimensionOverflow` if `config` is wider than the active region;
/// `RegError::NotNormalized` if some batch has no weight on `config`. The
/// register is untouched on error.
pub fn collapse_to<R: Register>(r: &mut R, config: impl Into<BitConfig>) -> RegResult<()> {
    let config = config.into().resolve(r.nactive())?;
    for (batch, probs) in r.probs()?.iter().enumerate() {
        let weight = probs.get(config).copied().unwrap_or(0.0);
        if weight <= AMPLITUDE_TOLERANCE {
            return Err(RegError::NotNormalized {
                batch,
                norm: weight.to_string(),
            });
        }
    }
    debug!(config, "collapse to configuration");
    r.collapse_configs(&[config])
}

/// Reduced state after tracing out the qubits at `locs`. The result has
/// `nqubits(r) - locs.len()` qubits.
///
/// # Errors
/// `RegError::InvalidPartition` for malformed `locs`.
pub fn partial_tr<R: Register>(r: &R, locs: &[usize]) -> RegResult<R::Reduced> {
    validate_locs(locs, r.nqubits())?;
    debug!(?locs, "partial trace");
    r.partial_tr(locs)
}
