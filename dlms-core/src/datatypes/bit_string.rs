//! Bit string type for DLMS/COSEM protocol

use crate::error::{DlmsError, DlmsResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Arbitrary string of bits, most significant bit of the first byte first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitString {
    bytes: Vec<u8>,
    num_bits: usize,
}

impl BitString {
    /// Construct a new bit string object.
    ///
    /// # Errors
    ///
    /// Returns an error if `num_bits > bit_string.len() * 8`
    pub fn new(bit_string: Vec<u8>, num_bits: usize) -> DlmsResult<Self> {
        if num_bits > bit_string.len() * 8 {
            return Err(DlmsError::InvalidData(format!(
                "bit_string is too short to hold all bits. Need {} bytes for {} bits",
                num_bits.div_ceil(8),
                num_bits
            )));
        }

        Ok(Self {
            bytes: bit_string,
            num_bits,
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn num_bits(&self) -> usize {
        self.num_bits
    }

    /// Get the bit at a specific position (0-based, MSB first)
    pub fn get_bit(&self, index: usize) -> DlmsResult<bool> {
        if index >= self.num_bits {
            return Err(DlmsError::InvalidData(format!(
                "Bit index {} out of bounds (num_bits: {})",
                index, self.num_bits
            )));
        }
        let bit_index = 7 - (index % 8);
        Ok((self.bytes[index / 8] >> bit_index) & 1 == 1)
    }

    /// Indexes of all bits that are set
    pub fn set_bits(&self) -> Vec<usize> {
        (0..self.num_bits)
            .filter(|&index| matches!(self.get_bit(index), Ok(true)))
            .collect()
    }

    /// Render the bits as a string of `0` and `1`
    pub fn to_binary_string(&self) -> String {
        (0..self.num_bits)
            .map(|index| if matches!(self.get_bit(index), Ok(true)) { '1' } else { '0' })
            .collect()
    }
}

impl fmt::Display for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_binary_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_string_new() {
        let bytes = vec![0xFF, 0x00, 0xAA];
        let bit_string = BitString::new(bytes.clone(), 24).unwrap();
        assert_eq!(bit_string.as_bytes(), &bytes);
        assert_eq!(bit_string.num_bits(), 24);
    }

    #[test]
    fn test_bit_string_invalid() {
        assert!(BitString::new(vec![0xFF], 16).is_err());
    }

    #[test]
    fn test_bit_string_bits() {
        let bit_string = BitString::new(vec![0xA0], 4).unwrap();
        assert!(bit_string.get_bit(0).unwrap());
        assert!(!bit_string.get_bit(1).unwrap());
        assert!(bit_string.get_bit(4).is_err());
        assert_eq!(bit_string.set_bits(), vec![0, 2]);
        assert_eq!(bit_string.to_string(), "1010");
    }
}
