//! Satellite packet framing.
//!
//! A packet is two FEC-protected frames sent back to back as 6-bit
//! symbols. The preamble is an analog pattern added by the radio and is not
//! part of the symbol stream.
//!
//! ```text
//! physical frame:  version(6) ‖ channel(4) ‖ size class(2)     → 2 symbols + 4 parity
//! payload frame:   sequence(10) ‖ device id(32) ‖ tag(32) ‖ payload(len*8)
//!                                                              → 13/18/25/30 symbols + parity
//! ```
//!
//! The 32-bit tag field is always zero: satellite packets are not
//! authenticated. The field is kept so frames stay wire compatible with
//! receivers that expect it.

use crate::{
    bitwriter::{BitWriter, MAX_SYMBOLS},
    errors::{FrameError, Result},
    fec::FecEncoder,
};

/// Protocol version carried in the physical frame
pub const PROTOCOL_VERSION: u8 = 0;

/// Data symbols in the physical frame
pub const PHY_SYMBOLS: usize = 2;

/// Parity symbols protecting the physical frame
pub const PHY_PARITY: usize = 4;

/// Channels addressable by the 4-bit channel field
pub const MAX_CHANNELS: u8 = 1 << CHANNEL_BITS;

/// Largest satellite payload in bytes
pub const MAX_PAYLOAD_LEN: usize = 13;

/// Mask applied to the satellite sequence counter before it goes on the wire
pub const SEQUENCE_MASK: u16 = (1 << SEQUENCE_BITS) - 1;

const VERSION_BITS: usize = 6;
const CHANNEL_BITS: usize = 4;
const SIZE_CLASS_BITS: usize = 2;
const SEQUENCE_BITS: usize = 10;
const DEVICE_ID_BITS: usize = 32;
const AUTH_TAG_BITS: usize = 32;

/// Payload size class, selected by payload length.
///
/// | payload bytes | code | payload symbols | parity symbols |
/// |---------------|------|-----------------|----------------|
/// | 0             | 00   | 13              | 10             |
/// | 4             | 01   | 18              | 12             |
/// | 9             | 10   | 25              | 14             |
/// | 13            | 11   | 30              | 16             |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeClass {
    /// No application payload
    Empty,
    /// 4-byte payload
    Small,
    /// 9-byte payload
    Medium,
    /// 13-byte payload
    Large,
}

impl SizeClass {
    /// Size class for a payload of `len` bytes.
    ///
    /// # Errors
    ///
    /// - `UnsupportedPayloadLength` for anything but 0, 4, 9 or 13
    pub fn from_payload_len(len: usize) -> Result<Self> {
        match len {
            0 => Ok(Self::Empty),
            4 => Ok(Self::Small),
            9 => Ok(Self::Medium),
            13 => Ok(Self::Large),
            other => Err(FrameError::UnsupportedPayloadLength(other)),
        }
    }

    /// 2-bit code written to the physical frame.
    pub const fn code(self) -> u8 {
        match self {
            Self::Empty => 0b00,
            Self::Small => 0b01,
            Self::Medium => 0b10,
            Self::Large => 0b11,
        }
    }

    /// Payload length in bytes.
    pub const fn payload_len(self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Small => 4,
            Self::Medium => 9,
            Self::Large => 13,
        }
    }

    /// Data symbols in the payload frame.
    pub const fn payload_symbols(self) -> usize {
        match self {
            Self::Empty => 13,
            Self::Small => 18,
            Self::Medium => 25,
            Self::Large => 30,
        }
    }

    /// Parity symbols protecting the payload frame.
    pub const fn payload_parity(self) -> usize {
        match self {
            Self::Empty => 10,
            Self::Small => 12,
            Self::Medium => 14,
            Self::Large => 16,
        }
    }

    /// Symbols in the whole packet, both frames with parity.
    pub const fn packet_symbols(self) -> usize {
        PHY_SYMBOLS + PHY_PARITY + self.payload_symbols() + self.payload_parity()
    }
}

/// Append the FEC-protected physical frame to `out`.
///
/// `out` is untouched on error.
///
/// # Errors
///
/// - `InvalidChannel` if `channel` does not fit the 4-bit field
/// - any error from `fec`
pub fn encode_physical_frame(
    channel: u8,
    size: SizeClass,
    fec: &impl FecEncoder,
    out: &mut Vec<u8>,
) -> Result<()> {
    if channel >= MAX_CHANNELS {
        return Err(FrameError::InvalidChannel(channel));
    }

    let mut bits = BitWriter::<MAX_SYMBOLS>::new();
    bits.append(&[PROTOCOL_VERSION], VERSION_BITS)?;
    bits.append(&[channel], CHANNEL_BITS)?;
    bits.append(&[size.code()], SIZE_CLASS_BITS)?;

    let mut symbols = [0u8; PHY_SYMBOLS];
    bits.pack_symbols(&mut symbols)?;

    let mut parity = [0u8; PHY_PARITY];
    fec.encode(&symbols, &mut parity)?;

    out.extend_from_slice(&symbols);
    out.extend_from_slice(&parity);
    Ok(())
}

/// Append the FEC-protected payload frame to `out`.
///
/// Only the low 10 bits of `sequence` are sent. `out` is untouched on error.
///
/// # Errors
///
/// - `UnsupportedPayloadLength` if `payload` has no size class
/// - any error from `fec`
pub fn encode_payload_frame(
    sequence: u16,
    device_id: u32,
    payload: &[u8],
    fec: &impl FecEncoder,
    out: &mut Vec<u8>,
) -> Result<SizeClass> {
    let size = SizeClass::from_payload_len(payload.len())?;

    let mut bits = BitWriter::<MAX_SYMBOLS>::new();
    bits.append(&(sequence & SEQUENCE_MASK).to_le_bytes(), SEQUENCE_BITS)?;
    bits.append(&device_id.to_le_bytes(), DEVICE_ID_BITS)?;
    bits.append(&0u32.to_le_bytes(), AUTH_TAG_BITS)?;
    bits.append(payload, payload.len() * 8)?;

    let mut symbols = [0u8; MAX_SYMBOLS];
    let count = bits.pack_symbols(&mut symbols)?;
    debug_assert_eq!(count, size.payload_symbols());

    let mut parity = [0u8; MAX_SYMBOLS];
    let parity = &mut parity[..size.payload_parity()];
    fec.encode(&symbols[..count], parity)?;

    out.extend_from_slice(&symbols[..count]);
    out.extend_from_slice(parity);
    Ok(size)
}
