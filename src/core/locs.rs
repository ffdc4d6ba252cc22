// src/core/locs.rs

use super::error::{RegError, RegResult};

/// Which qubits an operation targets.
///
/// Locations index the register's current qubit coordinate space, active
/// qubits first, so after a `focus` location 0 is the first focused qubit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Locs {
    /// Every currently active qubit.
    #[default]
    All,
    /// An ordered set of distinct qubit locations.
    At(Vec<usize>),
}

impl Locs {
    /// Returns the explicit locations, or `None` for [`Locs::All`].
    pub fn as_slice(&self) -> Option<&[usize]> {
        match self {
            Locs::All => None,
            Locs::At(locs) => Some(locs),
        }
    }
}

impl From<Vec<usize>> for Locs {
    fn from(locs: Vec<usize>) -> Self {
        Locs::At(locs)
    }
}

impl From<&[usize]> for Locs {
    fn from(locs: &[usize]) -> Self {
        Locs::At(locs.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Locs {
    fn from(locs: [usize; N]) -> Self {
        Locs::At(locs.to_vec())
    }
}

impl From<usize> for Locs {
    fn from(loc: usize) -> Self {
        Locs::At(vec![loc])
    }
}

/// Checks that `locs` are distinct and lie in `[0, nqubits)`.
///
/// # Errors
/// `RegError::InvalidPartition` naming the first offending location.
pub fn validate_locs(locs: &[usize], nqubits: usize) -> RegResult<()> {
    let mut seen = vec![false; nqubits];
    for &loc in locs {
        if loc >= nqubits {
            return Err(RegError::partition(format!(
                "location {loc} is out of range for a register of {nqubits} qubits"
            )));
        }
        if seen[loc] {
            return Err(RegError::partition(format!("location {loc} appears more than once")));
        }
        seen[loc] = true;
    }
    Ok(())
}

/// Locations in `[0, nqubits)` not named by `locs`, in ascending order.
pub fn complement(locs: &[usize], nqubits: usize) -> Vec<usize> {
    (0..nqubits).filter(|q| !locs.contains(q)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicates_and_out_of_range() {
        assert!(validate_locs(&[0, 2, 1], 3).is_ok());
        assert!(matches!(validate_locs(&[0, 0], 3), Err(RegError::InvalidPartition { .. })));
        assert!(matches!(validate_locs(&[3], 3), Err(RegError::InvalidPartition { .. })));
        assert!(validate_locs(&[], 0).is_ok());
    }

    #[test]
    fn complement_is_sorted() {
        assert_eq!(complement(&[4, 1], 6), vec![0, 2, 3, 5]);
        assert_eq!(Locs::from([1, 2]).as_slice(), Some(&[1usize, 2][..]));
        assert_eq!(Locs::All.as_slice(), None);
    }
}
