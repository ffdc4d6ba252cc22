// src/backend/mod.rs

//! Reference backends implementing the [`crate::register::Register`] contract.
//!
//! - [`ArrayReg`]: dense batched state vectors; supports every primitive.
//! - [`ArrayRegView`]: a read-only borrowed batch of an `ArrayReg`.
//! - [`DensityReg`]: batched density matrices; the reduced form produced by
//!   `partial_tr` and consumed by the metrics.

mod array;
mod density;
mod view;

pub use array::ArrayReg;
pub use density::DensityReg;
pub use view::ArrayRegView;

