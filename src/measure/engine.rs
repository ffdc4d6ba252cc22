// src/measure/engine.rs

//! Canonical computational-basis measurement over all active qubits.
//!
//! Every public measurement variant ends up here once locations have been
//! focused and any eigenbasis rotation applied. The kernel samples one basis
//! index per batch from the backend's probabilities and then applies the
//! requested post-action through the backend primitives.

use crate::core::{AMPLITUDE_TOLERANCE, RegError, RegResult};
use crate::register::Register;
use rand::Rng;
use tracing::{debug, trace};

/// What happens to the register after the outcome has been sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostAction {
    /// State left as it was.
    Keep,
    /// Each batch collapsed onto its sampled outcome.
    Collapse,
    /// Collapsed, then the measured qubits are dropped from the register.
    Remove,
    /// Collapsed, then the measured qubits are set to the given active
    /// configuration.
    ResetTo(usize),
}

impl PostAction {
    /// Whether a basis rotation applied before measuring must be undone
    /// afterwards.
    pub fn restores_basis(&self) -> bool {
        matches!(self, PostAction::Keep | PostAction::Collapse)
    }
}

/// Draws an index from an unnormalized distribution.
///
/// Returns `None` when the total weight is negligible. Floating-point
/// shortfall in the running sum falls back to the last index with weight.
pub(crate) fn sample_index<G: Rng>(probs: &[f64], rng: &mut G) -> Option<usize> {
    let total: f64 = probs.iter().sum();
    if total <= AMPLITUDE_TOLERANCE {
        return None;
    }
    let threshold = rng.random::<f64>() * total;
    let mut cumulative = 0.0;
    for (index, &p) in probs.iter().enumerate() {
        cumulative += p;
        if threshold < cumulative {
            return Some(index);
        }
    }
    probs.iter().rposition(|&p| p > 0.0)
}

/// Samples one outcome per batch from the active-qubit distribution.
pub(crate) fn sample_outcomes<R: Register, G: Rng>(r: &R, rng: &mut G) -> RegResult<Vec<usize>> {
    r.probs()?
        .iter()
        .enumerate()
        .map(|(batch, probs)| {
            sample_index(probs, rng).ok_or_else(|| RegError::NotNormalized {
                batch,
                norm: probs.iter().sum::<f64>().to_string(),
            })
        })
        .collect()
}

/// Measures every active qubit of every batch in the computational basis and
/// applies `action`.
pub(crate) fn measure_active<R: Register, G: Rng>(
    r: &mut R,
    action: PostAction,
    rng: &mut G,
) -> RegResult<Vec<usize>> {
    let outcomes = sample_outcomes(r, rng)?;
    trace!(?outcomes, "sampled computational-basis outcomes");
    debug!(?action, nactive = r.nactive(), nbatch = r.nbatch(), "applying post-measurement action");
    match action {
        PostAction::Keep => {}
        PostAction::Collapse => r.collapse_configs(&outcomes)?,
        PostAction::Remove => r.select_configs(&outcomes)?,
        PostAction::ResetTo(config) => {
            r.collapse_configs(&outcomes)?;
            let masks: Vec<usize> = outcomes.iter().map(|&o| o ^ config).collect();
            r.flip_bits(&masks)?;
        }
    }
    Ok(outcomes)
}
