// src/batch/mod.rs

//! Iteration over the batch dimension.
//!
//! A register with `nbatch = B` behaves as a finite, restartable sequence of
//! `B` single-batch views. Whether a view aliases the parent storage, and
//! whether it may mutate it, is up to the backend's `View` type.

use crate::core::RegResult;
use crate::register::Register;
use std::iter::FusedIterator;

/// Iterator over the batch views of a register.
///
/// Yields `r.view_batch(i)` for `i` in `0..nbatch`, then stops. A backend
/// without the `viewbatch` capability yields its error for every index.
#[derive(Debug)]
pub struct Batches<'a, R> {
    register: &'a R,
    next: usize,
    end: usize,
}

/// Iterates the batch views of `r`.
pub fn batches<R: Register>(r: &R) -> Batches<'_, R> {
    Batches { register: r, next: 0, end: r.nbatch() }
}

// Manual impl: deriving would require `R: Clone`.
impl<R> Clone for Batches<'_, R> {
    fn clone(&self) -> Self {
        Self { register: self.register, next: self.next, end: self.end }
    }
}

impl<'a, R: Register> Iterator for Batches<'a, R> {
    type Item = RegResult<R::View<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let (register, batch) = (self.register, self.next);
        self.next += 1;
        Some(register.view_batch(batch))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next;
        (remaining, Some(remaining))
    }
}

impl<R: Register> DoubleEndedIterator for Batches<'_, R> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        self.end -= 1;
        let register = self.register;
        Some(register.view_batch(self.end))
    }
}

impl<R: Register> ExactSizeIterator for Batches<'_, R> {}

impl<R: Register> FusedIterator for Batches<'_, R> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ArrayReg;

    #[test]
    fn yields_one_view_per_batch() -> RegResult<()> {
        let r = ArrayReg::ghz_state(2, 3)?;
        let it = batches(&r);
        assert_eq!(it.len(), 3);
        let views: Vec<_> = it.clone().collect::<RegResult<_>>()?;
        assert_eq!(views.len(), 3);
        for (i, view) in views.iter().enumerate() {
            assert_eq!(*view, r.view_batch(i)?);
        }
        // restartable
        assert_eq!(it.count(), 3);
        Ok(())
    }

    #[test]
    fn reverse_iteration() -> RegResult<()> {
        let r = ArrayReg::zero_state(1, 2)?;
        let mut it = batches(&r);
        assert!(it.next_back().is_some());
        assert!(it.next().is_some());
        assert!(it.next().is_none());
        Ok(())
    }
}
