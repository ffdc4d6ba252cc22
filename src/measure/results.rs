// src/measure/results.rs
use std::fmt;

/// Outcome of a measurement: one value per batch, in batch order.
///
/// For computational-basis measurements the values are basis indices of the
/// measured qubits (`0..2^k`); for eigenbasis observables they are the
/// eigenvalues indexed by those outcomes.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureResult<T> {
    outcomes: Vec<T>,
}

impl<T> MeasureResult<T> {
    pub(crate) fn new(outcomes: Vec<T>) -> Self {
        Self { outcomes }
    }

    /// All outcomes, one per batch.
    pub fn outcomes(&self) -> &[T] {
        &self.outcomes
    }

    /// Outcome of batch `batch`, if it exists.
    pub fn get(&self, batch: usize) -> Option<&T> {
        self.outcomes.get(batch)
    }

    /// Number of batches measured.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Consumes the result, returning the per-batch outcomes.
    pub fn into_outcomes(self) -> Vec<T> {
        self.outcomes
    }
}

impl<T> IntoIterator for MeasureResult<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a MeasureResult<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.iter()
    }
}

impl<T: fmt::Display> fmt::Display for MeasureResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Measurement Results:")?;
        if self.outcomes.is_empty() {
            writeln!(f, "  No batches were measured.")?;
        } else {
            for (batch, outcome) in self.outcomes.iter().enumerate() {
                writeln!(f, "    batch {batch}: {outcome}")?;
            }
        }
        Ok(())
    }
}
