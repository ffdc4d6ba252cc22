//! Error handling logic

use thiserror::Error;

/// Failures raised by the generic register layer or reported by a backend.
///
/// Capability and partition errors are detected before any backend numeric
/// code runs, so a register that receives one of them is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RegError {
    /// The backend does not natively provide a required primitive.
    #[error("capability `{operation}` is not implemented by backend `{backend}`")]
    UnimplementedCapability {
        /// Name of the missing primitive.
        operation: &'static str,
        /// Type name of the backend register.
        backend: &'static str,
    },

    /// Malformed qubit locations or an out-of-range active count.
    #[error("invalid partition: {message}")]
    InvalidPartition {
        /// What was wrong with the requested partition.
        message: String,
    },

    /// Registers or per-batch arguments with incompatible shapes.
    #[error("shape mismatch: {message}")]
    ShapeMismatch {
        /// Description of the conflicting shapes.
        message: String,
    },

    /// A bit configuration is wider than the active region.
    #[error("bit configuration {config} needs {width} qubits but only {nactive} are active")]
    DimensionOverflow {
        /// The offending configuration value.
        config: usize,
        /// Number of qubits the configuration needs.
        width: usize,
        /// Number of currently active qubits.
        nactive: usize,
    },

    /// A bit-string literal could not be parsed.
    #[error("invalid bit string `{literal}`: {message}")]
    InvalidBitString {
        /// The literal as given.
        literal: String,
        /// Why it was rejected.
        message: String,
    },

    /// An operator cannot be used as a measurement observable.
    #[error("invalid observable: {message}")]
    InvalidObservable {
        /// Why the operator was rejected.
        message: String,
    },

    /// A batch slice is not normalized within tolerance.
    #[error("batch {batch} is not normalized: sum of probabilities is {norm}")]
    NotNormalized {
        /// Index of the offending batch.
        batch: usize,
        /// The observed total probability, formatted.
        norm: String,
    },
}

impl RegError {
    pub(crate) fn unimplemented<R: ?Sized>(operation: &'static str) -> Self {
        RegError::UnimplementedCapability {
            operation,
            backend: std::any::type_name::<R>(),
        }
    }

    pub(crate) fn partition(message: impl Into<String>) -> Self {
        RegError::InvalidPartition { message: message.into() }
    }

    pub(crate) fn shape(message: impl Into<String>) -> Self {
        RegError::ShapeMismatch { message: message.into() }
    }
}

/// Result type used throughout the crate.
pub type RegResult<T> = Result<T, RegError>;
