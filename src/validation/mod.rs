// src/validation/mod.rs

//! Normalization checks over any register.

use crate::core::{NORM_TOLERANCE, RegError, RegResult};
use crate::register::Register;
use tracing::trace;

/// Checks that every batch's active probabilities sum to 1.
///
/// # Arguments
/// * `r` - The register to check.
/// * `tolerance` - Allowed deviation from 1.0. Defaults to [`NORM_TOLERANCE`].
///
/// # Returns
/// * `Ok(())` if every batch is normalized within tolerance.
/// * `Err(RegError::NotNormalized)` naming the first batch that is not.
pub fn check_normalization<R: Register>(r: &R, tolerance: Option<f64>) -> RegResult<()> {
    let effective_tolerance = tolerance.unwrap_or(NORM_TOLERANCE);
    for (batch, probs) in r.probs()?.iter().enumerate() {
        let norm: f64 = probs.iter().sum();
        trace!(batch, norm, "normalization");
        if (norm - 1.0).abs() > effective_tolerance {
            return Err(RegError::NotNormalized { batch, norm: norm.to_string() });
        }
    }
    Ok(())
}

/// Boolean form of [`check_normalization`] with the default tolerance.
/// Backend errors count as "not normalized".
pub fn is_normalized<R: Register>(r: &R) -> bool {
    check_normalization(r, None).is_ok()
}
