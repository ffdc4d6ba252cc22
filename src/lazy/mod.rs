// src/lazy/mod.rs

//! Partially applied register operations.
//!
//! Each constructor captures its arguments and returns a [`Transform`] that
//! waits for a register, so the same step can be reused across registers and
//! chained into a [`Pipeline`]:
//!
//! ```
//! use qureg::backend::ArrayReg;
//! use qureg::lazy::{self, PipelineBuilder};
//! use qureg::{Register, RegError};
//!
//! let pipeline = PipelineBuilder::new()
//!     .add_stage(lazy::addbits(2))
//!     .add_stage(lazy::focus(vec![0, 3]))
//!     .add_stage(lazy::relax(vec![0, 3]))
//!     .build();
//!
//! let mut r = ArrayReg::zero_state(2, 1)?;
//! pipeline.apply(&mut r)?;
//! assert_eq!((r.nqubits(), r.nactive()), (4, 4));
//! # Ok::<(), RegError>(())
//! ```

use crate::core::{BitConfig, RegResult};
use crate::register::{self, Register};
use crate::{partition, select as selection};
use std::fmt;
use tracing::debug;

/// A reusable unary operation on registers of type `R`.
pub struct Transform<R> {
    name: String,
    apply: Box<dyn Fn(&mut R) -> RegResult<()>>,
}

impl<R> Transform<R> {
    /// Wraps a closure under a display name.
    pub fn new(name: impl Into<String>, apply: impl Fn(&mut R) -> RegResult<()> + 'static) -> Self {
        Self { name: name.into(), apply: Box::new(apply) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs the transform on `r`.
    pub fn apply(&self, r: &mut R) -> RegResult<()> {
        (self.apply)(r)
    }

    /// Runs `self`, then `next`.
    pub fn then(self, next: Transform<R>) -> Transform<R>
    where
        R: 'static,
    {
        let name = format!("{} |> {}", self.name, next.name);
        Transform::new(name, move |r| {
            self.apply(r)?;
            next.apply(r)
        })
    }
}

impl<R> fmt::Debug for Transform<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transform").field("name", &self.name).finish()
    }
}

/// `addbits(n)` waiting for a register.
pub fn addbits<R: Register>(n: usize) -> Transform<R> {
    Transform::new(format!("addbits({n})"), move |r| register::addbits(r, n))
}

/// `focus(locs)` waiting for a register.
pub fn focus<R: Register>(locs: Vec<usize>) -> Transform<R> {
    Transform::new(format!("focus({locs:?})"), move |r| partition::focus(r, &locs))
}

/// Fully relaxing `relax(locs)` waiting for a register.
pub fn relax<R: Register>(locs: Vec<usize>) -> Transform<R> {
    Transform::new(format!("relax({locs:?})"), move |r| partition::relax(r, &locs))
}

/// `relax_to(locs, to_nactive)` waiting for a register.
pub fn relax_to<R: Register>(locs: Vec<usize>, to_nactive: usize) -> Transform<R> {
    Transform::new(format!("relax({locs:?}, to_nactive = {to_nactive})"), move |r| {
        partition::relax_to(r, &locs, to_nactive)
    })
}

/// `select(configs)` waiting for a register.
pub fn select<R: Register>(configs: Vec<BitConfig>) -> Transform<R> {
    Transform::new(format!("select({configs:?})"), move |r| selection::select(r, &configs))
}

/// `collapse_to(config)` waiting for a register.
pub fn collapse_to<R: Register>(config: impl Into<BitConfig>) -> Transform<R> {
    let config = config.into();
    Transform::new(format!("collapse_to({config:?})"), move |r| selection::collapse_to(r, config))
}

/// An ordered sequence of transforms applied as one step.
pub struct Pipeline<R> {
    stages: Vec<Transform<R>>,
}

impl<R> Pipeline<R> {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Appends a stage.
    pub fn add_stage(&mut self, stage: Transform<R>) {
        self.stages.push(stage);
    }

    pub fn stages(&self) -> &[Transform<R>] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Applies every stage in order.
    ///
    /// Stops at the first failing stage and returns its error; stages that
    /// already ran are not undone.
    pub fn apply(&self, r: &mut R) -> RegResult<()> {
        for (index, stage) in self.stages.iter().enumerate() {
            debug!(index, stage = stage.name(), "pipeline stage");
            stage.apply(r)?;
        }
        Ok(())
    }
}

impl<R> Default for Pipeline<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> fmt::Debug for Pipeline<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.stages.iter().map(Transform::name)).finish()
    }
}

impl<R> fmt::Display for Pipeline<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pipeline[{} stages]", self.stages.len())?;
        for (index, stage) in self.stages.iter().enumerate() {
            writeln!(f, "  {index}: {}", stage.name())?;
        }
        Ok(())
    }
}

/// Fluent construction of a [`Pipeline`].
pub struct PipelineBuilder<R> {
    pipeline: Pipeline<R>,
}

impl<R> PipelineBuilder<R> {
    pub fn new() -> Self {
        Self { pipeline: Pipeline::new() }
    }

    pub fn add_stage(mut self, stage: Transform<R>) -> Self {
        self.pipeline.add_stage(stage);
        self
    }

    pub fn add_stages<I>(mut self, stages: I) -> Self
    where
        I: IntoIterator<Item = Transform<R>>,
    {
        for stage in stages {
            self.pipeline.add_stage(stage);
        }
        self
    }

    pub fn build(self) -> Pipeline<R> {
        self.pipeline
    }
}

impl<R> Default for PipelineBuilder<R> {
    fn default() -> Self {
        Self::new()
    }
}
