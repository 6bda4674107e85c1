//! Fuzz target for BitWriter appends and symbol packing
//!
//! # Invariants
//!
//! - An append that would overflow capacity fails and leaves the writer
//!   unchanged
//! - Length never exceeds capacity
//! - Packed symbols are always 6-bit values

#![no_main]

use arbitrary::Arbitrary;
use eidlink_proto::{BitWriter, MAX_SYMBOLS, SYMBOL_MASK};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Append { input: Vec<u8>, count: u16 },
    AppendBits { value: u64, count: u8 },
    SetBit { index: u16, value: bool },
    Reset,
}

fuzz_target!(|ops: Vec<Op>| {
    let mut writer = BitWriter::<MAX_SYMBOLS>::new();

    for op in ops {
        let before = writer.clone();
        let ok = match op {
            Op::Append { input, count } => writer.append(&input, usize::from(count)).is_ok(),
            Op::AppendBits { value, count } => {
                writer.append_bits(value, usize::from(count)).is_ok()
            },
            Op::SetBit { index, value } => writer.set_bit(usize::from(index), value).is_ok(),
            Op::Reset => {
                writer.reset();
                true
            },
        };

        if !ok {
            assert_eq!(writer, before, "failed operation modified the writer");
        }
        assert!(writer.len() <= BitWriter::<MAX_SYMBOLS>::CAPACITY_BITS);
    }

    let mut symbols = [0u8; MAX_SYMBOLS * 8 / 6 + 1];
    if let Ok(count) = writer.pack_symbols(&mut symbols) {
        assert!(symbols[..count].iter().all(|&s| s <= SYMBOL_MASK));
    }
});
