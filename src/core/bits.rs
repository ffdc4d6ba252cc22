// src/core/bits.rs

//! Bit configurations: integers or fixed-length bit-string literals naming a
//! computational basis state of the active qubits.

use super::error::{RegError, RegResult};
use std::fmt;
use std::str::FromStr;

/// Number of bits needed to write `value` in binary (0 needs none).
pub fn bit_width(value: usize) -> usize {
    (usize::BITS - value.leading_zeros()) as usize
}

/// A fixed-length bit-string literal.
///
/// The leftmost character is the most significant bit, so `"101100"` names
/// basis index 44 and qubit 0 is the rightmost character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BitStr {
    value: usize,
    len: usize,
}

impl BitStr {
    /// Builds a bit string of `len` bits holding `value`.
    pub fn new(value: usize, len: usize) -> RegResult<Self> {
        if len > usize::BITS as usize || bit_width(value) > len {
            return Err(RegError::InvalidBitString {
                literal: format!("{value}"),
                message: format!("value does not fit in {len} bits"),
            });
        }
        Ok(Self { value, len })
    }

    /// Integer value of the bit string.
    pub fn value(&self) -> usize {
        self.value
    }

    /// Number of bits, leading zeros included.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` for the zero-length literal.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Value of qubit `i` (bit `i` counted from the least significant end).
    pub fn bit(&self, i: usize) -> Option<bool> {
        (i < self.len).then(|| (self.value >> i) & 1 == 1)
    }
}

impl FromStr for BitStr {
    type Err = RegError;

    fn from_str(literal: &str) -> Result<Self, Self::Err> {
        let mut value = 0usize;
        let mut len = 0usize;
        for ch in literal.chars() {
            let bit = match ch {
                '0' => 0,
                '1' => 1,
                '_' => continue,
                other => {
                    return Err(RegError::InvalidBitString {
                        literal: literal.to_string(),
                        message: format!("unexpected character '{other}'"),
                    });
                }
            };
            if len == usize::BITS as usize {
                return Err(RegError::InvalidBitString {
                    literal: literal.to_string(),
                    message: format!("longer than {} bits", usize::BITS),
                });
            }
            value = (value << 1) | bit;
            len += 1;
        }
        Ok(Self { value, len })
    }
}

impl fmt::Display for BitStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in (0..self.len).rev() {
            write!(f, "{}", (self.value >> i) & 1)?;
        }
        Ok(())
    }
}

impl From<BitStr> for usize {
    fn from(bits: BitStr) -> usize {
        bits.value
    }
}

/// A target basis configuration for the active qubits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitConfig {
    /// Plain basis index.
    Int(usize),
    /// Bit-string literal; its length counts even with leading zeros.
    Bits(BitStr),
}

impl BitConfig {
    /// Normalizes the configuration to an integer basis index for a register
    /// with `nactive` active qubits.
    ///
    /// # Errors
    /// `RegError::DimensionOverflow` if the configuration is wider than `nactive`.
    pub fn resolve(&self, nactive: usize) -> RegResult<usize> {
        let (config, width) = match *self {
            BitConfig::Int(value) => (value, bit_width(value)),
            BitConfig::Bits(bits) => (bits.value(), bits.len().max(bit_width(bits.value()))),
        };
        if width > nactive {
            return Err(RegError::DimensionOverflow { config, width, nactive });
        }
        Ok(config)
    }
}

impl From<usize> for BitConfig {
    fn from(value: usize) -> Self {
        BitConfig::Int(value)
    }
}

impl From<BitStr> for BitConfig {
    fn from(bits: BitStr) -> Self {
        BitConfig::Bits(bits)
    }
}
