//! Error types for cryptographic operations

use thiserror::Error;

/// Errors from key derivation and the cipher collaborator
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Key is neither 16 nor 32 bytes long
    #[error("invalid key length: expected 16 or 32, got {actual}")]
    InvalidKeyLength {
        /// Length that was supplied
        actual: usize,
    },

    /// Label and context do not fit the fixed KDF message buffer (the
    /// message must be shorter than the buffer)
    #[error("kdf message too long: {len} bytes, buffer holds {max}")]
    MessageTooLong {
        /// Assembled message length
        len: usize,
        /// Buffer capacity
        max: usize,
    },

    /// Requested output cannot be expressed as a 32-bit bit length
    #[error("invalid kdf output length: {len}")]
    InvalidOutputLength {
        /// Requested output length in bytes
        len: usize,
    },

    /// Underlying AES/CMAC primitive reported failure
    #[error("{operation} primitive failed")]
    Primitive {
        /// Primitive that failed
        operation: &'static str,
    },
}

impl CryptoError {
    /// Returns true if the caller passed bad input.
    ///
    /// Everything else is a primitive failure the caller may retry.
    pub fn is_invalid_argument(&self) -> bool {
        match self {
            Self::InvalidKeyLength { .. }
            | Self::MessageTooLong { .. }
            | Self::InvalidOutputLength { .. } => true,
            Self::Primitive { .. } => false,
        }
    }
}
