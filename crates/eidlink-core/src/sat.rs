//! Satellite packet assembly.
//!
//! A packet is the physical frame followed by the payload frame, each with
//! its own parity (see `eidlink_proto::sat` for the bit layout). The channel
//! is drawn from the environment's random source.
//!
//! The payload frame's 32-bit tag field is always zero; satellite packets
//! are not authenticated.
//!
//! # Sequence numbers
//!
//! The satellite path keeps its own 16-bit wrapping counter, separate from
//! the BLE sequence source; its low 10 bits go on the wire. The counter is
//! claimed once the payload length and the physical frame have been
//! accepted, so a later failure (for example in FEC of the payload frame)
//! still consumes a sequence number.

use eidlink_proto::{
    FecEncoder, ReedSolomon64, SizeClass, encode_payload_frame, encode_physical_frame,
};
use tracing::{debug, warn};

use crate::{config::SatConfig, env::Environment, error::EidError};

/// Assembled packet: channel plus symbol stream (preamble excluded).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SatPacket {
    channel: u8,
    symbols: Vec<u8>,
}

impl SatPacket {
    /// Channel to transmit on.
    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// 6-bit symbols: physical frame, its parity, payload frame, its parity.
    pub fn symbols(&self) -> &[u8] {
        &self.symbols
    }

    /// Number of symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// True if the packet has no symbols.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Transmit seam for satellite radios.
pub trait SatelliteRadio {
    /// Radio-specific failure
    type Error: std::error::Error;

    /// Send one packet.
    fn transmit_packet(&mut self, packet: &SatPacket) -> Result<(), Self::Error>;
}

/// Builds satellite packets and owns the satellite sequence counter.
#[derive(Debug)]
pub struct SatPacketBuilder<F = ReedSolomon64> {
    fec: F,
    config: SatConfig,
    sequence: u16,
}

impl SatPacketBuilder {
    /// Builder with the software Reed-Solomon encoder.
    pub fn new(config: SatConfig) -> Self {
        Self::with_fec(ReedSolomon64, config)
    }
}

impl<F: FecEncoder> SatPacketBuilder<F> {
    /// Builder using `fec` for parity.
    pub fn with_fec(fec: F, config: SatConfig) -> Self {
        Self { fec, config, sequence: 0 }
    }

    /// Build the packet for `payload` (0, 4, 9 or 13 bytes).
    ///
    /// Only the low 32 bits of `device_id` are sent.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for unsupported payload lengths (sequence not
    ///   consumed) or if the FEC encoder rejects a frame
    pub fn build_packet<E: Environment>(
        &mut self,
        env: &E,
        device_id: u64,
        payload: &[u8],
    ) -> Result<SatPacket, EidError> {
        let channel = self.pick_channel(env);
        let size = SizeClass::from_payload_len(payload.len())?;

        let mut symbols = Vec::with_capacity(size.packet_symbols());
        encode_physical_frame(channel, size, &self.fec, &mut symbols)?;

        let sequence = self.sequence;
        self.sequence = self.sequence.wrapping_add(1);

        encode_payload_frame(sequence, device_id as u32, payload, &self.fec, &mut symbols)?;

        debug!(sequence, channel, symbols = symbols.len(), "satellite packet built");
        Ok(SatPacket { channel, symbols })
    }

    /// Sequence number the next packet will carry (before masking to 10 bits).
    pub fn sequence(&self) -> u16 {
        self.sequence
    }

    /// Restore a persisted sequence counter.
    pub fn set_sequence(&mut self, sequence: u16) {
        self.sequence = sequence;
    }

    fn pick_channel<E: Environment>(&self, env: &E) -> u8 {
        let mut byte = [0u8; 1];
        if env.random_bytes(&mut byte).is_err() {
            warn!("could not pick a random channel, using channel 0");
            return 0;
        }
        byte[0] % self.config.channel_count()
    }
}
