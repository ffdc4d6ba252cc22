// src/backend/array.rs

use super::density::DensityReg;
use super::view::ArrayRegView;
use crate::core::{AMPLITUDE_TOLERANCE, BitStr, RegError, RegResult, complement};
use crate::register::{Register, basis_range, summary};
use nalgebra::DMatrix;
use num_complex::Complex64;
use num_traits::{One, Zero};
use rand::Rng;
use std::fmt;

/// Dense, batched state-vector register.
///
/// Amplitudes are stored batch after batch, each batch a block of
/// `2^nqubits` entries. Within a block, bit `p` of an index is the qubit at
/// layout position `p`; positions `0..nactive` are the active qubits (in focus
/// order) and the rest are the inactive ones, so the active basis index is the
/// low `nactive` bits.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayReg {
    state: Vec<Complex64>,
    nqubits: usize,
    nactive: usize,
    nbatch: usize,
}

impl ArrayReg {
    /// `nbatch` copies of `|0...0>` on `n` qubits.
    pub fn zero_state(n: usize, nbatch: usize) -> RegResult<Self> {
        Self::basis_state(0, n, nbatch)
    }

    /// `nbatch` copies of the basis state named by `bits`, one qubit per bit.
    pub fn product_state(bits: BitStr, nbatch: usize) -> RegResult<Self> {
        Self::basis_state(bits.value(), bits.len(), nbatch)
    }

    /// `nbatch` copies of the equal superposition over all `2^n` basis states.
    pub fn uniform_state(n: usize, nbatch: usize) -> RegResult<Self> {
        let dim = basis_range(n)?.end;
        let amp = Complex64::new(1.0 / (dim as f64).sqrt(), 0.0);
        Self::from_amplitudes(vec![amp; dim * nbatch.max(1)], nbatch)
    }

    /// `nbatch` copies of `(|0...0> + |1...1>)/sqrt(2)`.
    pub fn ghz_state(n: usize, nbatch: usize) -> RegResult<Self> {
        if n == 0 {
            return Err(RegError::shape("a GHZ state needs at least one qubit"));
        }
        let dim = basis_range(n)?.end;
        let amp = Complex64::new(std::f64::consts::FRAC_1_SQRT_2, 0.0);
        let mut state = vec![Complex64::zero(); dim * nbatch.max(1)];
        for block in state.chunks_mut(dim) {
            block[0] = amp;
            block[dim - 1] = amp;
        }
        Self::from_amplitudes(state, nbatch)
    }

    /// Independent random normalized states, one per batch.
    pub fn rand_state<G: Rng>(n: usize, nbatch: usize, rng: &mut G) -> RegResult<Self> {
        let dim = basis_range(n)?.end;
        let state = (0..dim * nbatch.max(1))
            .map(|_| {
                Complex64::new(
                    rng.random::<f64>() * 2.0 - 1.0,
                    rng.random::<f64>() * 2.0 - 1.0,
                )
            })
            .collect();
        let mut reg = Self::from_amplitudes(state, nbatch)?;
        reg.normalize();
        Ok(reg)
    }

    /// Wraps raw amplitudes, `nbatch` consecutive blocks of a power-of-two
    /// length. All qubits start active.
    ///
    /// # Errors
    /// `RegError::ShapeMismatch` if `nbatch` is zero or the length does not
    /// split into `nbatch` power-of-two blocks.
    pub fn from_amplitudes(state: Vec<Complex64>, nbatch: usize) -> RegResult<Self> {
        if nbatch == 0 {
            return Err(RegError::shape("a register needs at least one batch"));
        }
        if state.len() % nbatch != 0 || !(state.len() / nbatch).is_power_of_two() {
            return Err(RegError::shape(format!(
                "{} amplitudes do not split into {nbatch} blocks of 2^n entries",
                state.len()
            )));
        }
        let nqubits = (state.len() / nbatch).trailing_zeros() as usize;
        Ok(Self { state, nqubits, nactive: nqubits, nbatch })
    }

    fn basis_state(index: usize, n: usize, nbatch: usize) -> RegResult<Self> {
        let dim = basis_range(n)?.end;
        let mut state = vec![Complex64::zero(); dim * nbatch.max(1)];
        for block in state.chunks_mut(dim) {
            block[index] = Complex64::one();
        }
        Self::from_amplitudes(state, nbatch)
    }

    /// All amplitudes, batch after batch.
    pub fn state(&self) -> &[Complex64] {
        &self.state
    }

    /// Amplitudes of one batch.
    pub fn batch_state(&self, batch: usize) -> Option<&[Complex64]> {
        self.state.chunks(self.block_len()).nth(batch)
    }

    /// Rescales every batch to unit norm (negligible batches are left alone).
    pub fn normalize(&mut self) {
        let len = self.block_len();
        self.state.chunks_mut(len).for_each(normalize_block);
    }

    fn block_len(&self) -> usize {
        1 << self.nqubits
    }

    /// Moves qubits between layout positions: new position `p` takes the qubit
    /// at old position `perm[p]`.
    fn permute_layout(&mut self, perm: &[usize]) {
        if perm.iter().enumerate().all(|(p, &q)| p == q) {
            return;
        }
        let len = self.block_len();
        let targets: Vec<usize> = (0..len)
            .map(|old| {
                perm.iter()
                    .enumerate()
                    .fold(0, |acc, (new_pos, &old_pos)| acc | (((old >> old_pos) & 1) << new_pos))
            })
            .collect();
        let mut out = vec![Complex64::zero(); self.state.len()];
        for (block, out_block) in self.state.chunks(len).zip(out.chunks_mut(len)) {
            for (old, &new) in targets.iter().enumerate() {
                out_block[new] = block[old];
            }
        }
        self.state = out;
    }

    fn active_mask(&self) -> usize {
        (1 << self.nactive) - 1
    }
}

/// Picks a batch's entry from a list that is either broadcast or per batch.
pub(crate) fn per_batch(values: &[usize], batch: usize) -> usize {
    if values.len() == 1 { values[0] } else { values[batch] }
}

pub(crate) fn normalize_block(block: &mut [Complex64]) {
    let norm_sq: f64 = block.iter().map(|c| c.norm_sqr()).sum();
    if norm_sq > AMPLITUDE_TOLERANCE {
        let scale = 1.0 / norm_sq.sqrt();
        block.iter_mut().for_each(|c| *c *= scale);
    }
}

/// Marginal distribution of the low `nactive` bits of one batch block.
pub(crate) fn block_probs(block: &[Complex64], nactive: usize) -> Vec<f64> {
    let active_dim = 1 << nactive;
    let mut probs = vec![0.0; active_dim];
    for chunk in block.chunks(active_dim) {
        for (p, amp) in probs.iter_mut().zip(chunk) {
            *p += amp.norm_sqr();
        }
    }
    probs
}

/// Density matrix of the low `nactive` bits of one batch block.
pub(crate) fn block_density(block: &[Complex64], nactive: usize) -> DMatrix<Complex64> {
    let active_dim = 1 << nactive;
    let mut rho = DMatrix::zeros(active_dim, active_dim);
    for chunk in block.chunks(active_dim) {
        for (i, a) in chunk.iter().enumerate() {
            for (j, b) in chunk.iter().enumerate() {
                rho[(i, j)] += a * b.conj();
            }
        }
    }
    rho
}

impl Register for ArrayReg {
    /// Read-only borrow of one batch block. Mutating primitives on the view
    /// report `UnimplementedCapability`; mutate the parent instead.
    type View<'a>
        = ArrayRegView<'a>
    where
        Self: 'a;
    type Reduced = DensityReg;

    fn nqubits(&self) -> usize {
        self.nqubits
    }

    fn nactive(&self) -> usize {
        self.nactive
    }

    fn nbatch(&self) -> usize {
        self.nbatch
    }

    fn datatype(&self) -> &'static str {
        "Complex<f64>"
    }

    fn addbits(&mut self, n: usize) -> RegResult<()> {
        let total = self
            .nqubits
            .checked_add(n)
            .ok_or_else(|| RegError::shape(format!("cannot add {n} qubits to {}", self.nqubits)))?;
        let new_len = basis_range(total)?.end;
        let old_len = self.block_len();
        let na = self.nactive;
        let mask = self.active_mask();
        let mut out = vec![Complex64::zero(); new_len * self.nbatch];
        for (block, out_block) in self.state.chunks(old_len).zip(out.chunks_mut(new_len)) {
            for (idx, amp) in block.iter().enumerate() {
                let rem = idx >> na;
                out_block[(rem << (na + n)) | (idx & mask)] = *amp;
            }
        }
        self.state = out;
        self.nqubits += n;
        self.nactive += n;
        Ok(())
    }

    fn insert_qubits(&mut self, loc: usize, n: usize) -> RegResult<()> {
        let na = self.nactive;
        self.addbits(n)?;
        let orders: Vec<usize> = (0..loc).chain(na..na + n).chain(loc..na).collect();
        self.reorder(&orders)
    }

    fn focus_locs(&mut self, locs: &[usize]) -> RegResult<()> {
        let perm: Vec<usize> = locs
            .iter()
            .copied()
            .chain(complement(locs, self.nqubits))
            .collect();
        self.permute_layout(&perm);
        self.nactive = locs.len();
        Ok(())
    }

    fn relax_locs(&mut self, locs: &[usize], to_nactive: usize) -> RegResult<()> {
        let k = locs.len();
        let mut perm = vec![0; self.nqubits];
        for (j, &loc) in locs.iter().enumerate() {
            perm[loc] = j;
        }
        for (m, q) in complement(locs, self.nqubits).into_iter().enumerate() {
            perm[q] = k + m;
        }
        self.permute_layout(&perm);
        self.nactive = to_nactive;
        Ok(())
    }

    fn select_configs(&mut self, configs: &[usize]) -> RegResult<()> {
        let na = self.nactive;
        let nremain = self.nqubits - na;
        let old_len = self.block_len();
        let new_len = 1 << nremain;
        let mut out = vec![Complex64::zero(); new_len * self.nbatch];
        for (b, (block, out_block)) in self
            .state
            .chunks(old_len)
            .zip(out.chunks_mut(new_len))
            .enumerate()
        {
            let config = per_batch(configs, b);
            for (rem, amp) in out_block.iter_mut().enumerate() {
                *amp = block[(rem << na) | config];
            }
            normalize_block(out_block);
        }
        self.state = out;
        self.nqubits = nremain;
        self.nactive = 0;
        Ok(())
    }

    fn collapse_configs(&mut self, configs: &[usize]) -> RegResult<()> {
        let len = self.block_len();
        let mask = self.active_mask();
        for (b, block) in self.state.chunks_mut(len).enumerate() {
            let config = per_batch(configs, b);
            for (idx, amp) in block.iter_mut().enumerate() {
                if idx & mask != config {
                    *amp = Complex64::zero();
                }
            }
            normalize_block(block);
        }
        Ok(())
    }

    fn flip_bits(&mut self, masks: &[usize]) -> RegResult<()> {
        let len = self.block_len();
        let mut out = vec![Complex64::zero(); self.state.len()];
        for (b, (block, out_block)) in self.state.chunks(len).zip(out.chunks_mut(len)).enumerate() {
            let mask = per_batch(masks, b);
            for (idx, amp) in block.iter().enumerate() {
                out_block[idx ^ mask] = *amp;
            }
        }
        self.state = out;
        Ok(())
    }

    fn rotate(&mut self, unitary: &DMatrix<Complex64>) -> RegResult<()> {
        let active_dim = 1 << self.nactive;
        if unitary.nrows() != active_dim || unitary.ncols() != active_dim {
            return Err(RegError::shape(format!(
                "a {}x{} operator cannot act on {} active qubits",
                unitary.nrows(),
                unitary.ncols(),
                self.nactive
            )));
        }
        let mut buffer = vec![Complex64::zero(); active_dim];
        for chunk in self.state.chunks_mut(active_dim) {
            buffer.copy_from_slice(chunk);
            for (i, amp) in chunk.iter_mut().enumerate() {
                *amp = buffer
                    .iter()
                    .enumerate()
                    .map(|(j, v)| unitary[(i, j)] * v)
                    .sum();
            }
        }
        Ok(())
    }

    fn reorder(&mut self, orders: &[usize]) -> RegResult<()> {
        let perm: Vec<usize> = orders
            .iter()
            .copied()
            .chain(orders.len()..self.nqubits)
            .collect();
        self.permute_layout(&perm);
        Ok(())
    }

    fn partial_tr(&self, locs: &[usize]) -> RegResult<DensityReg> {
        let mut kept = self.clone();
        kept.focus_locs(&complement(locs, self.nqubits))?;
        DensityReg::from_matrices(kept.density_matrix()?)
    }

    fn join(&self, other: &Self) -> RegResult<Self> {
        if self.nactive != self.nqubits || other.nactive != other.nqubits {
            return Err(RegError::shape("join needs fully relaxed registers"));
        }
        let (len_hi, len_lo) = (self.block_len(), other.block_len());
        let low_bits = other.nqubits;
        let len = basis_range(self.nqubits + other.nqubits)?.end;
        let mut out = vec![Complex64::zero(); len * self.nbatch];
        for ((hi, lo), out_block) in self
            .state
            .chunks(len_hi)
            .zip(other.state.chunks(len_lo))
            .zip(out.chunks_mut(len))
        {
            for (i, a) in hi.iter().enumerate() {
                for (j, b) in lo.iter().enumerate() {
                    out_block[(i << low_bits) | j] = a * b;
                }
            }
        }
        Self::from_amplitudes(out, self.nbatch)
    }

    fn repeat(&self, n: usize) -> RegResult<Self> {
        Ok(Self {
            state: self.state.repeat(n),
            nqubits: self.nqubits,
            nactive: self.nactive,
            nbatch: self.nbatch * n,
        })
    }

    fn probs(&self) -> RegResult<Vec<Vec<f64>>> {
        Ok(self
            .state
            .chunks(self.block_len())
            .map(|block| block_probs(block, self.nactive))
            .collect())
    }

    fn density_matrix(&self) -> RegResult<Vec<DMatrix<Complex64>>> {
        Ok(self
            .state
            .chunks(self.block_len())
            .map(|block| block_density(block, self.nactive))
            .collect())
    }

    fn view_batch(&self, batch: usize) -> RegResult<ArrayRegView<'_>> {
        let block = self.batch_state(batch).ok_or_else(|| {
            RegError::shape(format!("batch {batch} out of range for {} batches", self.nbatch))
        })?;
        Ok(ArrayRegView::new(block, self.nqubits, self.nactive))
    }
}

impl fmt::Display for ArrayReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", summary(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_1_SQRT_2;

    const TEST_TOLERANCE: f64 = 1e-12;

    fn assert_probs_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len(), "length mismatch");
        for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
            assert!((a - e).abs() < TEST_TOLERANCE, "index {i}: {a} vs {e}");
        }
    }

    #[test]
    fn addbits_extends_active_region() -> RegResult<()> {
        let mut r = ArrayReg::product_state("11".parse()?, 1)?;
        r.focus_locs(&[0])?;
        r.addbits(1)?;
        assert_eq!((r.nqubits(), r.nactive()), (3, 2));
        // layout: [old qubit 0, new qubit, old qubit 1]
        assert_probs_close(&r.probs()?[0], &[0.0, 1.0, 0.0, 0.0]);
        Ok(())
    }

    #[test]
    fn addbits_rejects_oversized_growth() -> RegResult<()> {
        let mut r = ArrayReg::zero_state(1, 1)?;
        let before = r.clone();
        for n in [usize::MAX, usize::BITS as usize] {
            assert!(matches!(r.addbits(n), Err(RegError::ShapeMismatch { .. })));
            assert!(matches!(r.insert_qubits(0, n), Err(RegError::ShapeMismatch { .. })));
            assert!(matches!(crate::register::addbits(&mut r, n), Err(RegError::ShapeMismatch { .. })));
        }
        assert_eq!(r, before);
        Ok(())
    }

    #[test]
    fn insert_qubits_in_the_middle() -> RegResult<()> {
        let mut r = ArrayReg::product_state("11".parse()?, 1)?;
        r.insert_qubits(1, 1)?;
        assert_eq!(r.nqubits(), 3);
        // qubits 0 and 2 set, inserted qubit 1 is |0>
        assert_probs_close(&r.probs()?[0], &[0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
        Ok(())
    }

    #[test]
    fn select_drops_active_qubits_and_renormalizes() -> RegResult<()> {
        let mut r = ArrayReg::uniform_state(3, 1)?;
        r.focus_locs(&[0])?;
        r.select_configs(&[1])?;
        assert_eq!((r.nqubits(), r.nactive()), (2, 0));
        let total: f64 = r.state().iter().map(|c| c.norm_sqr()).sum();
        assert!((total - 1.0).abs() < TEST_TOLERANCE);
        Ok(())
    }

    #[test]
    fn collapse_and_flip() -> RegResult<()> {
        let mut r = ArrayReg::ghz_state(2, 1)?;
        r.collapse_configs(&[3])?;
        assert_probs_close(&r.probs()?[0], &[0.0, 0.0, 0.0, 1.0]);
        r.flip_bits(&[2])?;
        assert_probs_close(&r.probs()?[0], &[0.0, 1.0, 0.0, 0.0]);
        Ok(())
    }

    #[test]
    fn rotate_by_hadamard() -> RegResult<()> {
        let mut r = ArrayReg::zero_state(1, 1)?;
        let h = Complex64::new(FRAC_1_SQRT_2, 0.0);
        let hadamard = DMatrix::from_row_slice(2, 2, &[h, h, h, -h]);
        r.rotate(&hadamard)?;
        assert_probs_close(&r.probs()?[0], &[0.5, 0.5]);
        assert!(matches!(r.rotate(&DMatrix::identity(4, 4)), Err(RegError::ShapeMismatch { .. })));
        Ok(())
    }

    #[test]
    fn join_puts_first_register_high() -> RegResult<()> {
        let high = ArrayReg::product_state("10".parse()?, 1)?;
        let low = ArrayReg::product_state("1".parse()?, 1)?;
        let joined = high.join(&low)?;
        assert_eq!(joined.nqubits(), 3);
        assert_eq!(joined.state()[0b101], Complex64::one());
        Ok(())
    }

    #[test]
    fn repeat_and_views_share_blocks() -> RegResult<()> {
        let r = ArrayReg::ghz_state(2, 1)?.repeat(3)?;
        assert_eq!(r.nbatch(), 3);
        let view = r.view_batch(2)?;
        assert_eq!(view.nbatch(), 1);
        assert!(std::ptr::eq(view.state().as_ptr(), r.state()[8..].as_ptr()));
        assert!(r.view_batch(3).is_err());
        Ok(())
    }

    #[test]
    fn from_amplitudes_checks_shape() {
        assert!(ArrayReg::from_amplitudes(vec![Complex64::one(); 6], 2).is_err());
        assert!(ArrayReg::from_amplitudes(vec![Complex64::one(); 4], 0).is_err());
        assert!(ArrayReg::from_amplitudes(vec![Complex64::one(); 4], 2).is_ok());
    }
}
