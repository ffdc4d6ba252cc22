//! Numeric tolerances shared by backends and the generic layer.

/// Tolerances used when comparing or renormalizing amplitudes.
pub mod tolerances {
    /// Allowed deviation of a batch's total probability from 1.0.
    pub const NORM_TOLERANCE: f64 = 1e-9;
    /// Squared norms below this are treated as zero (no renormalization).
    pub const AMPLITUDE_TOLERANCE: f64 = 1e-12;
    /// Slack used when checking that an observable is Hermitian.
    pub const HERMITIAN_TOLERANCE: f64 = 1e-10;
}
