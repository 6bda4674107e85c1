//! Bounded MSB-first bit buffer and 6-bit symbol packing.
//!
//! Bits are numbered from zero in append order. Symbol packing reads them
//! six at a time, the first bit landing in the symbol's most significant
//! position.
//!
//! # Input bit order
//!
//! [`BitWriter::append`] numbers the bits of its input byte string so that
//! bit `k` is `(input[k / 8] >> (k % 8)) & 1`, then emits bits
//! `count - 1` down to `0`. For an integer passed as its little-endian bytes
//! this is plain MSB-first order. A multi-byte payload comes out last byte
//! first, each byte MSB-first. Frame compatibility depends on this order.

use crate::errors::{FrameError, Result};

/// Bits per satellite symbol
pub const SYMBOL_BITS: usize = 6;

/// Largest value a symbol can hold
pub const SYMBOL_MASK: u8 = (1 << SYMBOL_BITS) - 1;

/// Symbol capacity of a satellite frame buffer
pub const MAX_SYMBOLS: usize = 44;

/// Append-only bit buffer holding at most `N * 8` bits.
///
/// `N` is the symbol capacity; the backing store is `N` bytes, which is
/// always enough for `N` six-bit symbols.
#[derive(Clone, PartialEq, Eq)]
pub struct BitWriter<const N: usize = MAX_SYMBOLS> {
    data: [u8; N],
    len: usize,
}

impl<const N: usize> BitWriter<N> {
    /// Bit capacity
    pub const CAPACITY_BITS: usize = N * 8;

    /// Empty writer.
    pub const fn new() -> Self {
        Self { data: [0u8; N], len: 0 }
    }

    /// Number of bits written.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bits that can still be appended.
    pub fn remaining(&self) -> usize {
        Self::CAPACITY_BITS - self.len
    }

    /// Append the low `count` bits of `input`, highest first.
    ///
    /// See the module docs for how input bits are numbered.
    ///
    /// # Errors
    ///
    /// - `InputTooShort` if `input` holds fewer than `count` bits
    /// - `CapacityExceeded` if the writer cannot take `count` more bits; the
    ///   writer is left unchanged
    pub fn append(&mut self, input: &[u8], count: usize) -> Result<()> {
        if count > input.len().saturating_mul(8) {
            return Err(FrameError::InputTooShort { bits: count, len: input.len() });
        }
        if count > self.remaining() {
            return Err(FrameError::CapacityExceeded {
                requested: count,
                available: self.remaining(),
            });
        }

        for k in (0..count).rev() {
            let bit = (input[k / 8] >> (k % 8)) & 1 == 1;
            self.write(self.len, bit);
            self.len += 1;
        }

        Ok(())
    }

    /// Append the low `count` bits of `value`, most significant first.
    ///
    /// # Errors
    ///
    /// Same as [`append`](Self::append); `count` above 64 is `InputTooShort`.
    pub fn append_bits(&mut self, value: u64, count: usize) -> Result<()> {
        self.append(&value.to_le_bytes(), count)
    }

    /// Bit at `index`.
    ///
    /// # Errors
    ///
    /// - `IndexOutOfRange` if `index` has not been written
    pub fn get_bit(&self, index: usize) -> Result<bool> {
        if index >= self.len {
            return Err(FrameError::IndexOutOfRange { index, len: self.len });
        }
        Ok(self.read(index))
    }

    /// Overwrite an already written bit.
    ///
    /// # Errors
    ///
    /// - `IndexOutOfRange` if `index` has not been written
    pub fn set_bit(&mut self, index: usize, value: bool) -> Result<()> {
        if index >= self.len {
            return Err(FrameError::IndexOutOfRange { index, len: self.len });
        }
        self.write(index, value);
        Ok(())
    }

    /// Forget all bits. Storage is cleared as well.
    pub fn reset(&mut self) {
        self.data = [0u8; N];
        self.len = 0;
    }

    /// Number of symbols [`pack_symbols`](Self::pack_symbols) produces.
    pub fn symbol_count(&self) -> usize {
        self.len.div_ceil(SYMBOL_BITS)
    }

    /// Pack the written bits into 6-bit symbols.
    ///
    /// A trailing partial symbol is left-aligned and zero-padded. Returns the
    /// number of symbols written.
    ///
    /// # Errors
    ///
    /// - `SymbolOverflow` if `out` is shorter than [`symbol_count`](Self::symbol_count)
    pub fn pack_symbols(&self, out: &mut [u8]) -> Result<usize> {
        let needed = self.symbol_count();
        if needed > out.len() {
            return Err(FrameError::SymbolOverflow { needed, capacity: out.len() });
        }

        for (index, symbol) in out[..needed].iter_mut().enumerate() {
            let start = index * SYMBOL_BITS;
            *symbol = 0;
            for offset in 0..SYMBOL_BITS {
                let position = start + offset;
                if position < self.len && self.read(position) {
                    *symbol |= 1 << (SYMBOL_BITS - 1 - offset);
                }
            }
        }

        Ok(needed)
    }

    fn read(&self, index: usize) -> bool {
        (self.data[index / 8] >> (7 - index % 8)) & 1 == 1
    }

    fn write(&mut self, index: usize, value: bool) {
        let mask = 1 << (7 - index % 8);
        if value {
            self.data[index / 8] |= mask;
        } else {
            self.data[index / 8] &= !mask;
        }
    }
}

impl<const N: usize> Default for BitWriter<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> std::fmt::Debug for BitWriter<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitWriter")
            .field("len", &self.len)
            .field("capacity", &Self::CAPACITY_BITS)
            .finish()
    }
}
