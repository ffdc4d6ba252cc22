// src/core/mod.rs

//! Core data structures and types

pub mod bits;
pub mod constants;
pub mod error;
pub mod locs;

// Re-export public types for convenient access via `qureg::core::TypeName`
pub use bits::{BitConfig, BitStr, bit_width};
pub use constants::tolerances::{AMPLITUDE_TOLERANCE, HERMITIAN_TOLERANCE, NORM_TOLERANCE};
pub use error::{RegError, RegResult};
pub use locs::{Locs, complement, validate_locs};
