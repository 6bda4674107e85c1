//! Fuzz target for satellite packet assembly
//!
//! # Invariants
//!
//! - Unsupported payload lengths are rejected without consuming a sequence
//!   number
//! - Built packets have the symbol count of their size class, a channel
//!   below the configured count, and only 6-bit symbols

#![no_main]

use arbitrary::Arbitrary;
use eidlink_core::{EntropyError, Environment, SatConfig, SatPacketBuilder};
use eidlink_proto::{SYMBOL_MASK, SizeClass};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    channel_count: u8,
    random: Option<u8>,
    sequence: u16,
    device_id: u64,
    payload: Vec<u8>,
}

struct FuzzEnv(Option<u8>);

impl Environment for FuzzEnv {
    fn uptime_ms(&self) -> u64 {
        0
    }

    fn random_bytes(&self, buffer: &mut [u8]) -> Result<(), EntropyError> {
        let byte = self.0.ok_or(EntropyError)?;
        buffer.fill(byte);
        Ok(())
    }
}

fuzz_target!(|input: Input| {
    let Ok(config) = SatConfig::new(input.channel_count) else {
        return;
    };
    let mut builder = SatPacketBuilder::new(config);
    builder.set_sequence(input.sequence);

    let result = builder.build_packet(&FuzzEnv(input.random), input.device_id, &input.payload);

    match SizeClass::from_payload_len(input.payload.len()) {
        Ok(size) => {
            let packet = result.expect("supported payloads always encode");
            assert_eq!(packet.len(), size.packet_symbols());
            assert!(packet.channel() < config.channel_count());
            assert!(packet.symbols().iter().all(|&s| s <= SYMBOL_MASK));
            assert_eq!(builder.sequence(), input.sequence.wrapping_add(1));
        },
        Err(_) => {
            assert!(result.is_err());
            assert_eq!(builder.sequence(), input.sequence);
        },
    }
});
