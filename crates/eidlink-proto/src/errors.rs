//! Error types for frame encoding and parsing

use thiserror::Error;

/// Result alias for frame operations
pub type Result<T> = std::result::Result<T, FrameError>;

/// Errors from bit packing, FEC and frame layout
///
/// Every variant is an invalid-argument condition: the caller passed
/// something the wire format cannot represent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Append would exceed the bit writer capacity
    #[error("bit writer full: {requested} bits requested, {available} available")]
    CapacityExceeded {
        /// Bits the caller tried to append
        requested: usize,
        /// Bits left before the append
        available: usize,
    },

    /// Fewer input bytes than the requested bit count needs
    #[error("input too short: {bits} bits requested from {len} bytes")]
    InputTooShort {
        /// Bits requested
        bits: usize,
        /// Input length in bytes
        len: usize,
    },

    /// Bit index at or past the written length
    #[error("bit index {index} out of range (length {len})")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Bits written so far
        len: usize,
    },

    /// Symbol output buffer too small
    #[error("symbol buffer too small: need {needed}, have {capacity}")]
    SymbolOverflow {
        /// Symbols produced by the writer
        needed: usize,
        /// Output capacity
        capacity: usize,
    },

    /// Satellite framing supports 0, 4, 9 or 13 byte payloads only
    #[error("unsupported satellite payload length: {0}")]
    UnsupportedPayloadLength(usize),

    /// Payload larger than the frame can carry
    #[error("payload too large: {size} bytes exceeds {max}")]
    PayloadTooLarge {
        /// Payload size in bytes
        size: usize,
        /// Maximum payload size
        max: usize,
    },

    /// Buffer shorter than the fixed header
    #[error("frame too short: expected at least {expected} bytes, got {actual}")]
    FrameTooShort {
        /// Minimum frame size
        expected: usize,
        /// Actual size
        actual: usize,
    },

    /// Service UUID does not identify this protocol
    #[error("unknown service uuid: {0:#06x}")]
    UnknownServiceUuid(u16),

    /// Channel outside the 4-bit channel field
    #[error("invalid channel {0}")]
    InvalidChannel(u8),

    /// Data plus parity does not fit a codeword, or parity count is odd
    #[error("invalid fec parameters: {data} data symbols, {parity} parity symbols")]
    InvalidFecParameters {
        /// Data symbols
        data: usize,
        /// Parity symbols
        parity: usize,
    },

    /// Symbol does not fit in 6 bits
    #[error("symbol out of range: {0:#04x}")]
    SymbolOutOfRange(u8),
}
