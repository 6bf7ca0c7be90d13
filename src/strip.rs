//! The fixed-capacity, bit-packed storage strip.
//!
//! Bit `b` of the strip lives in byte `b / 8` at offset `b % 8`, counted from the
//! least-significant bit of the byte upwards.

use crate::types::{Symbol, TuringMachineError};
use std::ops::Range;

/// Reads the symbol at `offset` (0..8) of `byte`.
pub fn read_bit(byte: u8, offset: u32) -> Symbol {
    Symbol::from((byte >> offset) & 0x01 == 1)
}

/// Returns `byte` with the bit at `offset` forced to `symbol`. Other bits are unchanged.
pub fn write_bit(byte: u8, offset: u32, symbol: Symbol) -> u8 {
    let mask = 1u8 << offset;
    match symbol {
        Symbol::Zero => byte & !mask,
        Symbol::One => byte | mask,
    }
}

/// A zero-initialised strip of `len` bytes whose length never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Strip {
    bytes: Vec<u8>,
}

impl Strip {
    /// Allocates a zeroed strip of `len` bytes.
    ///
    /// Fails with `InvalidStripLength` for an empty strip, one whose bit length cannot be
    /// addressed by a signed 64-bit head, or one that cannot be allocated.
    pub fn new(len: usize) -> Result<Self, TuringMachineError> {
        let addressable = i64::try_from(len)
            .ok()
            .and_then(|len| len.checked_mul(8))
            .is_some();

        if len == 0 || !addressable {
            return Err(TuringMachineError::InvalidStripLength(len));
        }

        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(len)
            .map_err(|_| TuringMachineError::InvalidStripLength(len))?;
        bytes.resize(len, 0);

        Ok(Self { bytes })
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always `false`; a strip is never empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Number of addressable bit cells.
    pub fn bit_len(&self) -> i64 {
        self.bytes.len() as i64 * 8
    }

    /// Whether `bit` is a valid cell index.
    pub fn contains(&self, bit: i64) -> bool {
        (0..self.bit_len()).contains(&bit)
    }

    /// Reads the symbol at `bit`, or `None` if it lies outside the strip.
    pub fn get(&self, bit: i64) -> Option<Symbol> {
        let (byte, offset) = self.locate(bit)?;
        Some(read_bit(self.bytes[byte], offset))
    }

    /// Writes `symbol` at `bit`. Returns `false` and leaves the strip untouched if
    /// `bit` lies outside the strip.
    pub fn set(&mut self, bit: i64, symbol: Symbol) -> bool {
        match self.locate(bit) {
            Some((byte, offset)) => {
                self.bytes[byte] = write_bit(self.bytes[byte], offset, symbol);
                true
            }
            None => false,
        }
    }

    /// The raw bytes of the strip.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// A byte-range view for rendering. The range is clamped to the strip.
    pub fn view(&self, range: Range<usize>) -> &[u8] {
        let end = range.end.min(self.bytes.len());
        let start = range.start.min(end);
        &self.bytes[start..end]
    }

    /// Number of `1` symbols on the strip.
    pub fn count_ones(&self) -> u64 {
        self.bytes.iter().map(|b| u64::from(b.count_ones())).sum()
    }

    /// Zeroes every cell.
    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }

    fn locate(&self, bit: i64) -> Option<(usize, u32)> {
        if !self.contains(bit) {
            return None;
        }
        Some(((bit / 8) as usize, (bit % 8) as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_strip_is_zeroed() {
        let strip = Strip::new(4).unwrap();
        assert_eq!(strip.len(), 4);
        assert_eq!(strip.bit_len(), 32);
        assert_eq!(strip.bytes(), &[0, 0, 0, 0]);
        assert_eq!(strip.count_ones(), 0);
    }

    #[test]
    fn test_zero_length_is_rejected() {
        assert_eq!(
            Strip::new(0),
            Err(TuringMachineError::InvalidStripLength(0))
        );
    }

    #[test]
    fn test_unaddressable_length_is_rejected() {
        assert_eq!(
            Strip::new(usize::MAX),
            Err(TuringMachineError::InvalidStripLength(usize::MAX))
        );
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_failed_allocation_is_rejected() {
        let len = 1usize << 59;
        assert_eq!(
            Strip::new(len),
            Err(TuringMachineError::InvalidStripLength(len))
        );
    }

    #[test]
    fn test_bit_numbering_starts_at_lsb() {
        let mut strip = Strip::new(2).unwrap();
        assert!(strip.set(0, Symbol::One));
        assert!(strip.set(9, Symbol::One));
        assert_eq!(strip.bytes(), &[0x01, 0x02]);
        assert_eq!(strip.get(9), Some(Symbol::One));
        assert_eq!(strip.get(8), Some(Symbol::Zero));
    }

    #[test]
    fn test_zero_write_clears_bit() {
        let mut strip = Strip::new(1).unwrap();
        strip.set(3, Symbol::One);
        strip.set(4, Symbol::One);
        strip.set(3, Symbol::Zero);
        assert_eq!(strip.bytes(), &[0x10]);
    }

    #[test]
    fn test_out_of_range_access() {
        let mut strip = Strip::new(1).unwrap();
        assert_eq!(strip.get(-1), None);
        assert_eq!(strip.get(8), None);
        assert!(!strip.set(8, Symbol::One));
        assert!(!strip.set(-1, Symbol::One));
        assert_eq!(strip.bytes(), &[0]);
    }

    #[test]
    fn test_view_is_clamped() {
        let mut strip = Strip::new(3).unwrap();
        strip.set(16, Symbol::One);
        assert_eq!(strip.view(1..10), &[0x00, 0x01]);
        assert!(strip.view(5..9).is_empty());
    }

    #[test]
    fn test_clear() {
        let mut strip = Strip::new(2).unwrap();
        strip.set(5, Symbol::One);
        strip.clear();
        assert_eq!(strip.count_ones(), 0);
    }
}
